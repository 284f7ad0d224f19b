//! The fetch-and-persist loop.
//!
//! Walks `start_from..=end_node` one node at a time: skip nodes whose artifact
//! already exists, fetch the rest, record every saved ID, pause between nodes.
//! At most one request is in flight. Transport failures and rejected responses
//! never stop the loop; filesystem failures do.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

use crate::config::SweepConfig;
use crate::fetch::{FetchOutcome, NodeFetcher};
use crate::resume::{self, ResumeState};
use crate::NodeId;

/// Progress notifications for whoever narrates the sweep.
#[derive(Debug)]
pub enum SweepEvent<'a> {
    AlreadyPresent { node: NodeId, path: &'a Path },
    Requesting { node: NodeId, url: &'a str },
    Finished { node: NodeId, outcome: &'a FetchOutcome },
}

/// Totals for one run plus the final success set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Every ID known to be downloaded: recovered at startup or saved now.
    pub successes: BTreeSet<NodeId>,
    /// Nodes for which a request was sent.
    pub attempted: u64,
    pub saved: u64,
    /// Nodes whose artifact appeared on disk after the resume scan.
    pub already_present: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Create the output directory if needed and compute where this run resumes.
pub fn prepare_output_dir(cfg: &SweepConfig) -> Result<ResumeState> {
    std::fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("create output dir {}", cfg.output_dir.display()))?;
    resume::scan_output_dir(&cfg.output_dir, &cfg.naming(), cfg.start_node)
}

/// Run the loop from `resume.start_from` through `cfg.end_node`.
pub fn run_sweep<F, O>(
    cfg: &SweepConfig,
    fetcher: &mut F,
    resume: ResumeState,
    mut observer: O,
) -> Result<SweepReport>
where
    F: NodeFetcher + ?Sized,
    O: FnMut(&SweepEvent<'_>),
{
    let naming = cfg.naming();
    let delay = cfg.retry_delay();
    let mut report = SweepReport {
        successes: resume.recovered,
        ..SweepReport::default()
    };

    if resume.start_from > cfg.end_node {
        tracing::info!(
            start_from = resume.start_from,
            end_node = cfg.end_node,
            "nothing left to sweep"
        );
    }

    for node in resume.start_from..=cfg.end_node {
        let path = naming.path_for(&cfg.output_dir, node);

        // Only reachable if something else wrote the artifact after the resume scan.
        // Directories are ignored here as they are by the scan.
        if path.is_file() {
            tracing::debug!(node, path = %path.display(), "artifact already present");
            report.successes.insert(node);
            report.already_present += 1;
            observer(&SweepEvent::AlreadyPresent { node, path: &path });
        } else {
            let url = cfg.url_for(node);
            observer(&SweepEvent::Requesting { node, url: &url });
            report.attempted += 1;

            let outcome = fetcher
                .fetch(&url, &path)
                .with_context(|| format!("node {}", node))?;
            match &outcome {
                FetchOutcome::Saved(artifact) => {
                    tracing::info!(node, bytes = artifact.bytes, path = %artifact.path.display(), "saved");
                    report.successes.insert(node);
                    report.saved += 1;
                }
                FetchOutcome::Skipped(reason) => {
                    tracing::info!(node, %url, "not an artifact: {}", reason);
                    report.skipped += 1;
                }
                FetchOutcome::Failed(err) => {
                    tracing::warn!(
                        node,
                        %url,
                        code = err.curl_error().code(),
                        timeout = err.is_timeout(),
                        "request failed: {}",
                        err
                    );
                    report.failed += 1;
                }
            }
            observer(&SweepEvent::Finished {
                node,
                outcome: &outcome,
            });
        }

        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }

    tracing::info!(
        attempted = report.attempted,
        saved = report.saved,
        skipped = report.skipped,
        failed = report.failed,
        total = report.successes.len(),
        "sweep finished"
    );
    Ok(report)
}
