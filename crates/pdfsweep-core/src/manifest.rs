//! Manifest of downloaded node IDs: plain text, one decimal ID per line, ascending.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::temp_path;
use crate::NodeId;

/// Render the manifest body. `BTreeSet` iteration gives ascending, duplicate-free order.
pub fn format_manifest(successes: &BTreeSet<NodeId>) -> String {
    let mut out = String::with_capacity(successes.len() * 6);
    for id in successes {
        out.push_str(&id.to_string());
        out.push('\n');
    }
    out
}

/// Write the manifest to `dir/name`, replacing any previous one.
///
/// Returns `Ok(None)` without touching the disk when `successes` is empty.
pub fn write_manifest(
    dir: &Path,
    name: &str,
    successes: &BTreeSet<NodeId>,
) -> Result<Option<PathBuf>> {
    if successes.is_empty() {
        tracing::info!("no successful nodes; manifest not written");
        return Ok(None);
    }
    let path = dir.join(name);
    let tmp = temp_path(&path);
    fs::write(&tmp, format_manifest(successes))
        .with_context(|| format!("write manifest {}", tmp.display()))?;
    fs::rename(&tmp, &path).with_context(|| format!("replace manifest {}", path.display()))?;
    tracing::info!(path = %path.display(), count = successes.len(), "manifest written");
    Ok(Some(path))
}

/// Parse a manifest back into a set. Blank lines are ignored; anything else must be an ID.
pub fn read_manifest(path: &Path) -> Result<BTreeSet<NodeId>> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read manifest {}", path.display()))?;
    let mut ids = BTreeSet::new();
    for (i, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let id: NodeId = line
            .parse()
            .with_context(|| format!("{}:{}: not a node id: {:?}", path.display(), i + 1, line))?;
        ids.insert(id);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_sorted_one_per_line() {
        let ids: BTreeSet<NodeId> = [5203, 17, 5200].into_iter().collect();
        assert_eq!(format_manifest(&ids), "17\n5200\n5203\n");
    }

    #[test]
    fn empty_set_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_manifest(dir.path(), "successful_nodes.txt", &BTreeSet::new()).unwrap();
        assert!(written.is_none());
        assert!(!dir.path().join("successful_nodes.txt").exists());
    }

    #[test]
    fn write_replaces_previous_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("successful_nodes.txt");
        fs::write(&path, "1\n2\n3\n4\n").unwrap();

        let ids: BTreeSet<NodeId> = [100].into_iter().collect();
        let written = write_manifest(dir.path(), "successful_nodes.txt", &ids).unwrap();
        assert_eq!(written.as_deref(), Some(path.as_path()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "100\n");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn read_back_matches_written() {
        let dir = tempfile::tempdir().unwrap();
        let ids: BTreeSet<NodeId> = [9, 3, 7].into_iter().collect();
        let path = write_manifest(dir.path(), "m.txt", &ids).unwrap().unwrap();
        assert_eq!(read_manifest(&path).unwrap(), ids);
    }

    #[test]
    fn read_rejects_garbage_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.txt");
        fs::write(&path, "1\n\nabc\n").unwrap();
        let err = read_manifest(&path).unwrap_err();
        assert!(format!("{:#}", err).contains(":3: not a node id"));
    }

    #[test]
    fn write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ids: BTreeSet<NodeId> = [1].into_iter().collect();
        let missing = dir.path().join("gone");
        assert!(write_manifest(&missing, "m.txt", &ids).is_err());
    }
}
