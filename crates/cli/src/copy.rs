//! Trimming into a copy instead of the original image.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const COPY_SUFFIX: &str = " trim";

/// First free sibling path of the form `<stem> trim<N>.<ext>`, counting from 0.
pub fn choose_copy_path(input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .context("Input path must include a file name (cannot derive copy path)")?;

    for n in 0u32.. {
        let mut name: OsString = stem.to_os_string();
        name.push(format!("{COPY_SUFFIX}{n}"));
        if let Some(ext) = input.extension() {
            name.push(".");
            name.push(ext);
        }
        let candidate = input.with_file_name(name);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    anyhow::bail!("No free copy name left for {}", input.display())
}

/// Copy `input` to a fresh sibling path and return that path.
pub fn copy_for_trimming(input: &Path) -> Result<PathBuf> {
    let target = choose_copy_path(input)?;
    std::fs::copy(input, &target).with_context(|| {
        format!(
            "Failed to copy {} to {}",
            input.display(),
            target.display()
        )
    })?;
    tracing::debug!(from = %input.display(), to = %target.display(), "created copy");
    Ok(target)
}
