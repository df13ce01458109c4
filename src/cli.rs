use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

/// Command-line options for tagnorm.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Normalize embedded audio tags into Vorbis and ID3v2 key/value maps."
)]
pub struct CliArgs {
    /// Root directory to scan; defaults to current working directory.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Output file to append normalized tags to; defaults to tags.txt under the root.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// When set, perform the scan without writing to the output file.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Comma-separated list of file extensions to scan (case-insensitive).
    #[arg(long, default_value = "mp3")]
    pub extensions: String,

    /// Output formatting strategy for normalized tags.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Limit recursion depth when scanning.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Follow directory symlinks while scanning.
    #[arg(long, default_value_t = false)]
    pub follow_symlinks: bool,

    /// Write a JSON summary report to the specified file.
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Reduce log verbosity to errors only.
    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    /// Ignore `<file>.frames.json` fallback frame dumps.
    #[arg(long, default_value_t = false)]
    pub no_sidecars: bool,

    /// Skip tag values that are blank after trimming.
    #[arg(long, default_value_t = false)]
    pub drop_empty_values: bool,
}

impl CliArgs {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
