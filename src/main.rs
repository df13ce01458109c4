use anyhow::{Context, Result};
use env_logger::Builder;
use log::LevelFilter;
use std::path::Path;

use tagnorm::scanner::AudioFile;
use tagnorm::{cli, config, frames, report, scanner, writer};
use tagnorm::{merge, normalize_with, NormalizeOptions, TextTags};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli_args = cli::CliArgs::parse();

    let config = config::Config::from_args(cli_args)?;
    init_logging(config.quiet);
    let mut writer =
        writer::OutputWriter::create(&config.output, config.output_format, config.dry_run)?;
    let mut scanner = scanner::Scanner::new(&config.root, config.scan.clone());
    let mut report = report::Report::default();

    for entry in scanner.by_ref() {
        match entry {
            Ok(file) => {
                report.record_scan();
                process_file(&file, &config.normalize, &mut writer, &mut report)?;
            }
            Err(error) => {
                report.record_walk_error();
                match error.path() {
                    Some(path) => log::warn!("Traversal error on '{}': {error}", path.display()),
                    None => log::warn!("Traversal error: {error}"),
                }
            }
        }
    }

    let depth_skips = scanner.depth_skips();
    if !depth_skips.is_empty() {
        report.record_depth_skips(depth_skips);
        if let Some(limit) = config.scan.max_depth {
            log::warn!(
                "Max depth {limit} prevented descending into {} directories.",
                depth_skips.len()
            );
            for path in depth_skips {
                log::info!("Skipped due to depth limit: {}", path.display());
            }
        }
    }

    writer.flush()?;
    report.emit_summary();

    if let Some(summary_path) = &config.summary_json {
        write_summary(summary_path, &report)?;
    }

    Ok(())
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "error" } else { "info" };

    let mut builder =
        Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if quiet {
        builder.filter_level(LevelFilter::Error);
    }
    let _ = builder.try_init();
}

fn process_file(
    file: &AudioFile,
    options: &NormalizeOptions,
    writer: &mut writer::OutputWriter,
    report: &mut report::Report,
) -> Result<()> {
    let embedded = match frames::read_embedded(&file.path) {
        Ok(frames) => frames,
        Err(error) => {
            report.record_tag_error();
            log::warn!("Failed to read embedded tags: {error:#}");
            if file.sidecar.is_none() {
                return Ok(());
            }
            Vec::new()
        }
    };

    let mut tags = normalize_with(embedded, options);

    if let Some(sidecar) = &file.sidecar {
        match frames::read_sidecar(sidecar) {
            Ok(fallback) => {
                tags = merge(&tags, &normalize_with(fallback, options));
                report.record_sidecar_merge();
            }
            Err(error) => {
                report.record_sidecar_error();
                log::warn!("Ignoring sidecar: {error:#}");
            }
        }
    }

    handle_tags(&file.path, &tags, writer, report)
}

fn handle_tags(
    path: &Path,
    tags: &TextTags,
    writer: &mut writer::OutputWriter,
    report: &mut report::Report,
) -> Result<()> {
    if tags.is_empty() {
        report.record_untagged();
        log::info!("No text tags found in '{}'", path.display());
        return Ok(());
    }

    let rendered = match writer.render(&writer::TagEntry { path, tags }) {
        Ok(rendered) => rendered,
        Err(error) => {
            report.record_entry_error();
            log::warn!("Skipping output entry: {error:#}");
            return Ok(());
        }
    };
    writer.write_rendered(&rendered)?;
    report.record_normalized();
    log::info!(
        "Normalized '{file}' -- {vorbis} vorbis keys, {id3v2} id3v2 keys",
        file = path.display(),
        vorbis = tags.vorbis().len(),
        id3v2 = tags.id3v2().len()
    );

    Ok(())
}

fn write_summary(path: &Path, report: &report::Report) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!(
                "failed to create directories for summary '{}'",
                parent.display()
            )
        })?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create summary file '{}'", path.display()))?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)
        .with_context(|| format!("failed to write JSON summary to '{}'", path.display()))?;
    Ok(())
}
