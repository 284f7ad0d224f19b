//! `pdfsweep run` – sweep the node range and write the manifest.

use anyhow::{Context, Result};
use pdfsweep_core::config::SweepConfig;
use pdfsweep_core::fetch::CurlFetcher;
use pdfsweep_core::manifest;
use pdfsweep_core::sweep;

use crate::cli::narrate;

pub fn run_sweep(cfg: &SweepConfig) -> Result<()> {
    cfg.validate().context("invalid configuration")?;

    println!("PDFs will be saved in '{}' directory.", cfg.output_dir.display());
    println!("Scanning for existing PDFs to determine resume point...");
    let resume = sweep::prepare_output_dir(cfg)?;
    println!("{}", narrate::resume_summary(&resume, cfg.end_node));

    let mut fetcher = CurlFetcher::new(cfg).context("initialize HTTP client")?;
    let report = sweep::run_sweep(cfg, &mut fetcher, resume, |event| {
        println!("{}", narrate::describe(event));
    })?;

    println!();
    println!("Download process has completed.");
    tracing::info!(
        "run finished: {} requested, {} saved, {} skipped, {} failed",
        report.attempted,
        report.saved,
        report.skipped,
        report.failed
    );

    match manifest::write_manifest(&cfg.output_dir, &cfg.manifest_name, &report.successes)? {
        Some(path) => {
            println!();
            println!("Found {} PDF files in total.", report.successes.len());
            println!("Successful node IDs: {}", narrate::id_list(&report.successes));
            println!("List of successful node IDs saved to '{}'", path.display());
        }
        None => {
            println!();
            println!("No PDF files were found in the specified node range.");
        }
    }
    Ok(())
}
