//! Error types for Axon operations.
//!
//! [`AxonError`] wraps the error of every subsystem so that callers of
//! [`Session`](crate::Session) handle a single type.

use std::io;

use thiserror::Error;

use crate::{
    constraint::ConnectionError, model::RecordError, scaffold::ScaffoldError, store::StoreError,
    tree::OwnershipError,
};

/// The main error type for Axon operations.
///
/// # Recoverable Variants
///
/// `Connection` and `Scaffold` describe rejected user actions. The diagram is
/// unchanged when they are returned and the caller is expected to report them
/// rather than abort.
#[derive(Debug, Error)]
pub enum AxonError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Connection rejected: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Ownership error: {0}")]
    Ownership(#[from] OwnershipError),

    #[error("Scaffold error: {0}")]
    Scaffold(#[from] ScaffoldError),

    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for AxonError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
