//! Scan command - index the configured roots

use super::{Context, Result};
use crate::FiletagError;
use crate::config::FiletagConfig;
use crate::ingest::{IngestReport, Scanner};
use crate::output;
use std::path::PathBuf;

/// Scan `roots`, or the configured roots when none are given
///
/// # Errors
/// Returns `FiletagError::InvalidInput` when there is nothing to scan, and an
/// ingestion error if a root is missing or the store rejects a write.
pub fn run(ctx: &Context<'_>, config: &FiletagConfig, roots: &[PathBuf]) -> Result<IngestReport> {
    let roots = if roots.is_empty() { config.roots.as_slice() } else { roots };
    if roots.is_empty() {
        return Err(FiletagError::InvalidInput(
            "no scan roots configured; add one with `filetag config add-root <PATH>`".into(),
        ));
    }

    let scanner = Scanner::new(ctx.db, config.scan_filter()?);
    for root in roots {
        ctx.out.info(format!("Scanning {}", root.display()));
    }
    Ok(scanner.scan_roots(roots)?)
}

/// Execute the scan command and print the report
///
/// # Errors
/// See [`run`].
pub fn execute(ctx: &Context<'_>, config: &FiletagConfig, roots: &[PathBuf]) -> Result<()> {
    let report = run(ctx, config, roots)?;
    ctx.out.item(&report, output::report)?;
    Ok(())
}
