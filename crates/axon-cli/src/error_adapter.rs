//! Error adapter for converting AxonError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use axon::{AxonError, constraint::ConnectionError, model::RecordError};

/// Adapter rendering an [`AxonError`] as a miette diagnostic.
pub struct ErrorAdapter(pub AxonError);

impl fmt::Debug for ErrorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            AxonError::Io(_) => "axon::io",
            AxonError::Record(_) => "axon::record",
            AxonError::Connection(_) => "axon::connection",
            AxonError::Store(_) => "axon::store",
            AxonError::Ownership(_) => "axon::ownership",
            AxonError::Scaffold(_) => "axon::scaffold",
            AxonError::Json(_) => "axon::json",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            AxonError::Connection(ConnectionError::NextToContainer { endpoint })
            | AxonError::Connection(ConnectionError::NextToConfiguration { endpoint }) => {
                format!("remove the NNNext relationship touching `{endpoint}`")
            }
            AxonError::Record(RecordError::UnsupportedVersion(_)) => {
                "upgrade axon to read this document".to_string()
            }
            AxonError::Record(RecordError::Inconsistent(_)) => {
                "every `owner` must list the element in its `ownedElements`".to_string()
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}
