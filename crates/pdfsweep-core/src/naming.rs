//! Artifact filenames: `<prefix><id>.<extension>`, and the reverse parse used by the resume scan.

use std::path::{Path, PathBuf};

use crate::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNaming {
    prefix: String,
    extension: String,
}

impl ArtifactNaming {
    /// A leading dot on `extension` is ignored (`".pdf"` and `"pdf"` are the same).
    pub fn new(prefix: impl Into<String>, extension: impl AsRef<str>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.as_ref().trim_start_matches('.').to_string(),
        }
    }

    pub fn file_name(&self, id: NodeId) -> String {
        format!("{}{}.{}", self.prefix, id, self.extension)
    }

    pub fn path_for(&self, dir: &Path, id: NodeId) -> PathBuf {
        dir.join(self.file_name(id))
    }

    /// Returns the node ID embedded in `file_name`, or `None` unless the name is
    /// exactly prefix, one or more ASCII digits, a dot and the extension.
    pub fn parse_id(&self, file_name: &str) -> Option<NodeId> {
        let rest = file_name.strip_prefix(self.prefix.as_str())?;
        let digits = rest
            .strip_suffix(self.extension.as_str())?
            .strip_suffix('.')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // Too many digits for u64: not one of ours.
        digits.parse().ok()
    }
}
