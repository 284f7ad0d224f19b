//! Sequential node-range PDF fetcher.
//!
//! A sweep walks an inclusive range of numeric node IDs, requests one URL per
//! node and keeps the bodies served as PDFs. Progress lives entirely on disk:
//! the next run rescans the output directory and resumes after the highest
//! artifact found.

pub mod classify;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod manifest;
pub mod naming;
pub mod resume;
pub mod storage;
pub mod sweep;

/// Candidate ID of one remote document.
pub type NodeId = u64;
