//! The trim command: candidate selection, parallel trimming and reporting.

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use nds_trim_core::{HeaderProbe, TrimConfig, TrimError, TrimOutcome, trim_file};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::copy::copy_for_trimming;
use crate::json::{FileJson, TrimRunJson};
use crate::util::{collect_candidates, format_bytes};

/// Per-run switches that are not part of the detection engine.
pub struct RunOptions {
    pub config: TrimConfig,
    pub ignore_extension: bool,
    pub copy: bool,
    pub jobs: Option<usize>,
    pub json: bool,
}

struct FileReport {
    path: PathBuf,
    target: PathBuf,
    result: Result<TrimOutcome>,
}

impl FileReport {
    fn trim_error(&self) -> Option<&TrimError> {
        self.result.as_ref().err()?.downcast_ref::<TrimError>()
    }

    fn is_warning(&self) -> bool {
        self.trim_error().is_some_and(TrimError::is_warning)
    }

    fn is_failure(&self) -> bool {
        self.result.is_err() && !self.is_warning()
    }

    fn difference(&self) -> i64 {
        self.result.as_ref().map_or(0, TrimOutcome::difference)
    }
}

fn trim_one(path: &Path, options: &RunOptions) -> FileReport {
    let target = if options.copy {
        match copy_for_trimming(path) {
            Ok(target) => target,
            Err(e) => {
                return FileReport {
                    path: path.to_path_buf(),
                    target: path.to_path_buf(),
                    result: Err(e),
                };
            }
        }
    } else {
        path.to_path_buf()
    };

    let result = trim_file(&target, &options.config).map_err(anyhow::Error::from);
    FileReport {
        path: path.to_path_buf(),
        target,
        result,
    }
}

pub fn trim_roms(paths: Vec<PathBuf>, options: &RunOptions) -> Result<ExitCode> {
    let candidates = collect_candidates(&paths, options.ignore_extension);

    if candidates.is_empty() {
        if options.json {
            let payload = TrimRunJson {
                status: "ok",
                command: "trim",
                files: Vec::new(),
                total_difference: 0,
            };
            println!("{}", serde_json::to_string(&payload)?);
        } else {
            eprintln!(
                "{} {}",
                style("Warning:").yellow().bold(),
                style("Nothing to trim: no existing ROM images were given.").dim()
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    if !options.json {
        eprintln!(
            "{}",
            style(format!("==> Trimming {} ROM image(s)", candidates.len()))
                .cyan()
                .bold()
        );
        print_mode(options);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs.unwrap_or(0))
        .build()
        .context("Failed to start worker threads")?;

    let progress = if options.json {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(candidates.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap(),
        );
        bar
    };

    let total = AtomicI64::new(0);
    let reports: Vec<FileReport> = pool.install(|| {
        candidates
            .par_iter()
            .map(|path| {
                progress.set_message(display_name(path));
                let report = trim_one(path, options);
                total.fetch_add(report.difference(), Ordering::Relaxed);
                progress.inc(1);
                report
            })
            .collect()
    });
    progress.finish_and_clear();

    let total = total.into_inner();
    let failures = reports.iter().filter(|r| r.is_failure()).count();

    if options.json {
        let status = if failures == 0 { "ok" } else { "partial" };
        let payload = TrimRunJson {
            status,
            command: "trim",
            files: reports.iter().map(file_json).collect(),
            total_difference: total,
        };
        println!("{}", serde_json::to_string(&payload)?);
    } else {
        for report in &reports {
            print_report(report);
        }
        println!("Total difference: {}", total);
        if total < 0 {
            eprintln!(
                "\n{} {}",
                style("[SUCCESS]").green().bold(),
                style(format!("Saved {}", format_bytes(total.unsigned_abs()))).cyan()
            );
        }
        if failures > 0 {
            eprintln!(
                "\n{} {}",
                style("[ERROR]").red().bold(),
                style(format!("{failures} file(s) could not be trimmed")).red()
            );
        }
    }

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_mode(options: &RunOptions) {
    let config = &options.config;
    if config.ignore_header {
        eprintln!("    Paranoia mode, ignoring the header end offset");
    } else if config.paranoid {
        eprintln!("    Paranoia mode");
    }
    if options.ignore_extension {
        eprintln!("    Ignoring file extensions");
    }
    if options.copy {
        eprintln!("    Trimming copies, originals stay untouched");
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_report(report: &FileReport) {
    println!("{}", style(report.target.display()).bold());

    match &report.result {
        Ok(outcome) => {
            print_detection(outcome);
            println!(
                "    Previously: {}, Now: {}, Difference: {}",
                outcome.original_len,
                outcome.new_len,
                outcome.difference()
            );
            if outcome.changed() {
                eprintln!(
                    "    {} {} -> {}",
                    style("[OK]").green().bold(),
                    style(format_bytes(outcome.original_len)).dim(),
                    style(format_bytes(outcome.new_len)).cyan()
                );
            } else {
                eprintln!("    {} Already trimmed", style("[OK]").green().bold());
            }
        }
        Err(e) if report.is_warning() => {
            eprintln!("    {} {}", style("[WARN]").yellow().bold(), style(e).yellow());
            eprintln!("    The file was not touched.");
        }
        Err(e) => {
            eprintln!("    {} {}", style("[ERROR]").red().bold(), style(e).red());
            for cause in e.chain().skip(1) {
                eprintln!("      - {}", style(cause).red());
            }
            if let Some(hint) = report.trim_error().and_then(failure_hint) {
                eprintln!("    {}", style(hint).dim());
            }
        }
    }
}

fn failure_hint(error: &TrimError) -> Option<&'static str> {
    match error {
        TrimError::Open { .. } => {
            Some("Check the file still exists and that you have read and write permissions for it.")
        }
        TrimError::Read { .. } | TrimError::Truncate { .. } => {
            Some("Check you have write permissions for this file.")
        }
        TrimError::DetectionFailed { .. } => None,
    }
}

fn print_detection(outcome: &TrimOutcome) {
    let detection = &outcome.detection;

    match detection.header {
        Some(HeaderProbe::Trusted(offset)) if offset.is_exact() => {
            eprintln!("    Header end offset {} is correct", style(offset.declared).cyan());
        }
        Some(HeaderProbe::Trusted(offset)) => {
            eprintln!(
                "    Header end offset {} is short by {}, corrected to {}",
                style(offset.declared).cyan(),
                offset.discrepancy,
                style(offset.boundary()).cyan()
            );
            if offset.looks_like_wifi_title() {
                eprintln!("    {}", style("This is probably a wi-fi enabled title.").dim());
            }
        }
        Some(HeaderProbe::BeyondEof { declared, len }) => {
            eprintln!(
                "    {} header end offset {} lies beyond the file size {}, scanning instead",
                style("Warning:").yellow().bold(),
                declared,
                len
            );
        }
        Some(HeaderProbe::MissingField { len }) => {
            eprintln!(
                "    {} file is too short ({} bytes) to hold the header end offset, scanning instead",
                style("Warning:").yellow().bold(),
                len
            );
        }
        None => {}
    }

    if let Some(scan) = detection.scan {
        eprintln!(
            "    Scan ({:?}, {} reads) found content up to {}",
            scan.engine,
            scan.reads,
            style(scan.boundary).cyan()
        );
    }
    if detection.clamped {
        eprintln!(
            "    The header suggests the image is larger than the scan found; keeping {} bytes",
            style(detection.boundary).cyan()
        );
    }
    if outcome.original_len > 0 && !outcome.original_len.is_power_of_two() {
        eprintln!(
            "    {}",
            style("Original size is not a power of two; the image was probably trimmed before.")
                .dim()
        );
    }
}

fn file_json(report: &FileReport) -> FileJson {
    let path = report.path.display().to_string();
    let target = report.target.display().to_string();

    match &report.result {
        Ok(outcome) => FileJson {
            path,
            target,
            status: if outcome.changed() { "trimmed" } else { "unchanged" },
            original_len: Some(outcome.original_len),
            new_len: Some(outcome.new_len),
            difference: outcome.difference(),
            detection: Some(outcome.detection),
            error_kind: None,
            error: None,
        },
        Err(e) => FileJson {
            path,
            target,
            status: if report.is_warning() { "warning" } else { "error" },
            original_len: None,
            new_len: None,
            difference: 0,
            detection: None,
            error_kind: Some(report.trim_error().map_or("copy", TrimError::kind)),
            error: Some(format!("{e:#}")),
        },
    }
}
