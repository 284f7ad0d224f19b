//! User-facing progress lines. Structured logs go to the log file; these go to stdout.

use pdfsweep_core::fetch::FetchOutcome;
use pdfsweep_core::resume::ResumeState;
use pdfsweep_core::sweep::SweepEvent;
use pdfsweep_core::NodeId;

pub fn resume_summary(state: &ResumeState, end_node: NodeId) -> String {
    let mut out = if state.recovered.is_empty() {
        format!(
            "No existing PDFs found. Starting PDF scan from node {}.",
            state.start_from
        )
    } else {
        format!(
            "Found {} existing PDFs. Resuming scan from node {}.",
            state.recovered.len(),
            state.start_from
        )
    };
    if state.is_exhausted(end_node) {
        out.push_str(&format!(
            "\nAll nodes up to {} have been checked. Process will now complete.",
            end_node
        ));
    }
    out
}

pub fn describe(event: &SweepEvent<'_>) -> String {
    match event {
        SweepEvent::AlreadyPresent { node, .. } => {
            format!("Node {}: PDF already exists. Adding to list and skipping.", node)
        }
        SweepEvent::Requesting { url, .. } => format!("Requesting {}...", url),
        SweepEvent::Finished { node, outcome } => match outcome {
            FetchOutcome::Saved(a) => format!(
                "Successfully downloaded and saved: {} ({} bytes)",
                a.path.display(),
                a.bytes
            ),
            FetchOutcome::Skipped(reason) => {
                format!("Node {} did not return a PDF. {}", node, reason)
            }
            FetchOutcome::Failed(err) => format!("An error occurred for node {}: {}", node, err),
        },
    }
}

/// `[1, 2, 3]`
pub fn id_list<'a>(ids: impl IntoIterator<Item = &'a NodeId>) -> String {
    let parts: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
    format!("[{}]", parts.join(", "))
}
