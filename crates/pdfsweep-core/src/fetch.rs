//! One GET per node: classify the response head, stream accepted bodies to disk.
//!
//! [`NodeFetcher`] is the only place the sweep touches the network. [`CurlFetcher`]
//! implements it with a single reused libcurl easy handle, so consecutive nodes on
//! the same host share a connection.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::str;

use anyhow::Result;

use crate::classify::{ResponseHead, SkipReason, Verdict};
use crate::config::SweepConfig;
use crate::storage::{ArtifactWriter, StorageError};

/// Network-level failure: connect, DNS, timeout, reset, malformed response.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct TransportError(#[from] curl::Error);

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        self.0.is_operation_timedout()
    }

    pub fn curl_error(&self) -> &curl::Error {
        &self.0
    }
}

/// Artifact written by a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifact {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Result of attempting one node. Only filesystem failures escape as `Err`.
#[derive(Debug)]
pub enum FetchOutcome {
    Saved(SavedArtifact),
    Skipped(SkipReason),
    Failed(TransportError),
}

pub trait NodeFetcher {
    /// GET `url`; when the response is accepted, persist its body at `dest`.
    ///
    /// Per-node problems (non-200, wrong Content-Type, transport errors) are
    /// reported in the outcome. `Err` means the artifact could not be written.
    fn fetch(&mut self, url: &str, dest: &Path) -> Result<FetchOutcome, StorageError>;
}

/// libcurl-backed fetcher.
pub struct CurlFetcher {
    easy: curl::easy::Easy,
    accepted_content_type: String,
}

impl CurlFetcher {
    pub fn new(cfg: &SweepConfig) -> Result<Self> {
        let timeout = cfg.request_timeout();
        let mut easy = curl::easy::Easy::new();
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(timeout)?;
        // No total deadline: a large PDF may take longer than `timeout`, a stalled one may not.
        easy.low_speed_limit(1)?;
        easy.low_speed_time(timeout)?;
        easy.buffer_size(cfg.chunk_size)?;
        easy.useragent(&cfg.user_agent)?;
        Ok(Self {
            easy,
            accepted_content_type: cfg.accepted_content_type.clone(),
        })
    }
}

/// Receives body chunks for one transfer and decides, on the first chunk,
/// whether the response is kept.
struct BodySink<'a> {
    dest: &'a Path,
    accepted: &'a str,
    writer: Option<ArtifactWriter>,
    rejected: Option<SkipReason>,
    storage_err: Option<StorageError>,
}

impl<'a> BodySink<'a> {
    fn new(dest: &'a Path, accepted: &'a str) -> Self {
        Self {
            dest,
            accepted,
            writer: None,
            rejected: None,
            storage_err: None,
        }
    }

    /// Bytes consumed; anything short of `data.len()` makes curl abort the transfer.
    fn accept_chunk(&mut self, head: &ResponseHead, data: &[u8]) -> usize {
        if self.writer.is_none() {
            match head.verdict(self.accepted) {
                Verdict::Skip(reason) => {
                    // The body of a rejected response is never read.
                    self.rejected = Some(reason);
                    return 0;
                }
                Verdict::Accept => match ArtifactWriter::create(self.dest) {
                    Ok(w) => self.writer = Some(w),
                    Err(e) => {
                        self.storage_err = Some(e);
                        return 0;
                    }
                },
            }
        }
        if let Some(w) = self.writer.as_mut() {
            if let Err(e) = w.write_chunk(data) {
                self.storage_err = Some(e);
                return 0;
            }
        }
        data.len()
    }

    /// Turn the transfer result into an outcome, finalizing the artifact when accepted.
    fn finish(
        self,
        head: &ResponseHead,
        performed: Result<(), curl::Error>,
    ) -> Result<FetchOutcome, StorageError> {
        if let Some(e) = self.storage_err {
            return Err(e);
        }
        if let Err(e) = performed {
            if let Some(reason) = self.rejected {
                return Ok(FetchOutcome::Skipped(reason));
            }
            // Dropping a partial writer removes its temp file.
            if let Some(w) = &self.writer {
                tracing::debug!(dest = %self.dest.display(), bytes = w.written(), "discarding partial body");
            }
            return Ok(FetchOutcome::Failed(e.into()));
        }
        match head.verdict(self.accepted) {
            Verdict::Skip(reason) => Ok(FetchOutcome::Skipped(reason)),
            Verdict::Accept => {
                // An accepted response with an empty body never reached the sink.
                let writer = match self.writer {
                    Some(w) => w,
                    None => ArtifactWriter::create(self.dest)?,
                };
                let bytes = writer.finalize()?;
                Ok(FetchOutcome::Saved(SavedArtifact {
                    path: self.dest.to_path_buf(),
                    bytes,
                }))
            }
        }
    }
}

fn perform(
    easy: &mut curl::easy::Easy,
    head: &RefCell<ResponseHead>,
    sink: &mut BodySink<'_>,
) -> Result<(), curl::Error> {
    let mut transfer = easy.transfer();
    transfer.header_function(|data| {
        if let Ok(line) = str::from_utf8(data) {
            head.borrow_mut().observe_line(line);
        }
        true
    })?;
    transfer.write_function(|data| Ok(sink.accept_chunk(&head.borrow(), data)))?;
    transfer.perform()
}

impl NodeFetcher for CurlFetcher {
    fn fetch(&mut self, url: &str, dest: &Path) -> Result<FetchOutcome, StorageError> {
        if let Err(e) = self.easy.url(url) {
            return Ok(FetchOutcome::Failed(e.into()));
        }
        let head = RefCell::new(ResponseHead::default());
        let mut sink = BodySink::new(dest, &self.accepted_content_type);
        let performed = perform(&mut self.easy, &head, &mut sink);
        let head = head.into_inner();
        match &performed {
            Ok(()) => tracing::debug!(url, status = ?head.status, "response received"),
            Err(e) => tracing::debug!(url, "transfer ended: {}", e),
        }
        sink.finish(&head, performed)
    }
}
