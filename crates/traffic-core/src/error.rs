//! Crate-scoped error type.
//!
//! Sub-crates define their own error enums and convert `CoreError` into one
//! of their variants via `From`, rather than matching on it directly —
//! `traffic-core` itself rarely fails; it mostly supplies the `NodeId` a
//! higher-level crate's error needs to report.

use thiserror::Error;

use crate::NodeId;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `traffic-core`.
pub type CoreResult<T> = Result<T, CoreError>;
