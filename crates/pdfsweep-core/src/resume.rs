//! Rebuild prior progress from the artifacts already on disk.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

use crate::naming::ArtifactNaming;
use crate::NodeId;

/// What a previous run left behind, and where this run should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeState {
    /// IDs of artifacts found on disk. May lie outside the configured range.
    pub recovered: BTreeSet<NodeId>,
    /// First node this run attempts.
    pub start_from: NodeId,
}

impl ResumeState {
    /// Fresh state for an empty directory.
    pub fn fresh(start_node: NodeId) -> Self {
        Self {
            recovered: BTreeSet::new(),
            start_from: start_node,
        }
    }

    pub fn from_recovered(recovered: BTreeSet<NodeId>, start_node: NodeId) -> Self {
        let start_from = resume_point(&recovered, start_node);
        Self {
            recovered,
            start_from,
        }
    }

    /// True when there is no node left to attempt in `..=end_node`.
    pub fn is_exhausted(&self, end_node: NodeId) -> bool {
        self.start_from > end_node
    }
}

/// `max(start_node, max(recovered) + 1)`, or `start_node` when nothing was recovered.
pub fn resume_point(recovered: &BTreeSet<NodeId>, start_node: NodeId) -> NodeId {
    match recovered.last() {
        Some(&last) => start_node.max(last.saturating_add(1)),
        None => start_node,
    }
}

/// Collect the IDs of every artifact in `dir` whose name `naming` recognizes.
///
/// Read-only. Subdirectories, temp files and names that are not valid UTF-8 are ignored.
pub fn recover_ids(dir: &Path, naming: &ArtifactNaming) -> Result<BTreeSet<NodeId>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("scan output dir {}", dir.display()))?;
    let mut ids = BTreeSet::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("scan output dir {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", entry.path().display()))?;
        if file_type.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(id) = naming.parse_id(name) {
            ids.insert(id);
        }
    }
    Ok(ids)
}

/// Scan `dir` and compute the resume point for a range starting at `start_node`.
pub fn scan_output_dir(
    dir: &Path,
    naming: &ArtifactNaming,
    start_node: NodeId,
) -> Result<ResumeState> {
    let recovered = recover_ids(dir, naming)?;
    let state = ResumeState::from_recovered(recovered, start_node);
    tracing::debug!(
        dir = %dir.display(),
        recovered = state.recovered.len(),
        start_from = state.start_from,
        "resume scan complete"
    );
    Ok(state)
}
