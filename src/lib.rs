//! Normalization of embedded audio tags into Vorbis-style and ID3v2-style
//! multimaps, plus the directory scanner and output layers used by the
//! `tagnorm` binary.

pub mod cli;
pub mod config;
pub mod frames;
pub mod report;
pub mod scanner;
pub mod tags;
pub mod writer;

pub use tags::{merge, normalize, normalize_with, NormalizeOptions, RawFrame, TextTags};
