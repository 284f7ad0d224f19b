//! Sweep configuration loaded from `~/.config/pdfsweep/config.toml`.
//!
//! Every key is optional in the file; missing keys fall back to the defaults
//! below. Command-line flags are layered on top with [`ConfigOverrides`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::naming::ArtifactNaming;
use crate::NodeId;

/// Placeholder replaced by the decimal node ID in `base_url_template`.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Rejected configuration values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base_url_template is empty")]
    EmptyTemplate,
    #[error("base_url_template does not render to an http(s) URL: {0}")]
    InvalidUrl(String),
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,
    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Everything one sweep needs to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// URL for each node; `{id}` is replaced by the node ID. Without a
    /// placeholder the ID is appended as a final path segment.
    pub base_url_template: String,
    /// Directory receiving artifacts and the manifest. Created if absent.
    pub output_dir: PathBuf,
    /// First node of the inclusive range.
    pub start_node: NodeId,
    /// Last node of the inclusive range.
    pub end_node: NodeId,
    /// Connect timeout, and how long a request may go without receiving a byte.
    pub request_timeout_secs: u64,
    /// Pause after every node, whatever the outcome.
    pub retry_delay_ms: u64,
    /// Artifact filename prefix (`<prefix><id>.<extension>`).
    pub file_prefix: String,
    /// Artifact filename extension, without the dot.
    pub file_extension: String,
    /// Manifest filename inside `output_dir`.
    pub manifest_name: String,
    /// Substring the Content-Type header must contain for a body to be saved.
    pub accepted_content_type: String,
    /// Receive buffer size in bytes handed to libcurl.
    pub chunk_size: usize,
    /// User-Agent sent with every request.
    pub user_agent: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            base_url_template: "https://ir.lucidmotors.com/node/{id}/pdf".to_string(),
            output_dir: PathBuf::from("lucid_pdfs"),
            start_node: 5200,
            end_node: 9999,
            request_timeout_secs: 15,
            retry_delay_ms: 100,
            file_prefix: "lucid_node_".to_string(),
            file_extension: "pdf".to_string(),
            manifest_name: "successful_nodes.txt".to_string(),
            accepted_content_type: "application/pdf".to_string(),
            chunk_size: 8192,
            user_agent: concat!("pdfsweep/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SweepConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn naming(&self) -> ArtifactNaming {
        ArtifactNaming::new(&self.file_prefix, &self.file_extension)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.manifest_name)
    }

    /// Render the URL for one node.
    pub fn url_for(&self, id: NodeId) -> String {
        if self.base_url_template.contains(ID_PLACEHOLDER) {
            self.base_url_template
                .replace(ID_PLACEHOLDER, &id.to_string())
        } else {
            format!("{}/{}", self.base_url_template.trim_end_matches('/'), id)
        }
    }

    /// Check values that would make every request or write fail.
    /// An empty range (`start_node > end_node`) is valid: there is simply nothing left to do.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url_template.trim().is_empty() {
            return Err(ConfigError::EmptyTemplate);
        }
        let sample = self.url_for(self.start_node);
        match url::Url::parse(&sample) {
            Ok(u) if matches!(u.scheme(), "http" | "https") && u.host().is_some() => {}
            _ => return Err(ConfigError::InvalidUrl(sample)),
        }
        if self.file_prefix.is_empty() {
            return Err(ConfigError::EmptyField("file_prefix"));
        }
        if self.file_extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::EmptyField("file_extension"));
        }
        if self.manifest_name.is_empty() {
            return Err(ConfigError::EmptyField("manifest_name"));
        }
        if self.accepted_content_type.is_empty() {
            return Err(ConfigError::EmptyField("accepted_content_type"));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        // libcurl reads zero as "no connect timeout" and "no stall detection".
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize config")
    }
}

/// Command-line values that replace the corresponding config keys when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub start_node: Option<NodeId>,
    pub end_node: Option<NodeId>,
    pub output_dir: Option<PathBuf>,
    pub base_url_template: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub retry_delay_ms: Option<u64>,
}

impl ConfigOverrides {
    pub fn apply(self, cfg: &mut SweepConfig) {
        if let Some(v) = self.start_node {
            cfg.start_node = v;
        }
        if let Some(v) = self.end_node {
            cfg.end_node = v;
        }
        if let Some(v) = self.output_dir {
            cfg.output_dir = v;
        }
        if let Some(v) = self.base_url_template {
            cfg.base_url_template = v;
        }
        if let Some(v) = self.request_timeout_secs {
            cfg.request_timeout_secs = v;
        }
        if let Some(v) = self.retry_delay_ms {
            cfg.retry_delay_ms = v;
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pdfsweep")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SweepConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SweepConfig::default();
        let toml = default_cfg.to_toml_string()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<SweepConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: SweepConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
