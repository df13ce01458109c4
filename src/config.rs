use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::{CliArgs, OutputFormat};
use crate::scanner::ScanOptions;
use crate::tags::NormalizeOptions;

const DEFAULT_OUTPUT: &str = "tags.txt";
const DEFAULT_EXTENSION: &str = "mp3";

#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub output: PathBuf,
    pub dry_run: bool,
    pub output_format: OutputFormat,
    pub summary_json: Option<PathBuf>,
    pub quiet: bool,
    pub scan: ScanOptions,
    pub normalize: NormalizeOptions,
}

impl Config {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let root = resolve_root(args.root)?;
        let output = under_root(&root, args.output.unwrap_or_else(|| DEFAULT_OUTPUT.into()));
        let summary_json = args.summary_json.map(|path| under_root(&root, path));

        Ok(Self {
            output,
            dry_run: args.dry_run,
            output_format: args.format,
            summary_json,
            quiet: args.quiet,
            scan: ScanOptions {
                max_depth: args.max_depth,
                follow_symlinks: args.follow_symlinks,
                extensions: parse_extensions(&args.extensions),
                sidecars: !args.no_sidecars,
            },
            normalize: NormalizeOptions {
                drop_empty_values: args.drop_empty_values,
            },
            root,
        })
    }
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("could not resolve current working directory")?;
    let resolved = match root {
        Some(path) => cwd.join(path),
        None => cwd,
    };

    anyhow::ensure!(
        resolved.is_dir(),
        "The provided root path '{}' is not an existing directory.",
        resolved.display()
    );
    Ok(resolved)
}

// `join` keeps absolute paths as they are.
fn under_root(root: &Path, path: PathBuf) -> PathBuf {
    root.join(path)
}

fn parse_extensions(raw: &str) -> Vec<String> {
    let exts: Vec<String> = raw
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase())
        .collect();

    if exts.is_empty() {
        vec![DEFAULT_EXTENSION.to_string()]
    } else {
        exts
    }
}
