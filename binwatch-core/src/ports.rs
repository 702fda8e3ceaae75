//! Traits describing the remote store and the errors it can produce.

use std::fmt;

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::RawPair;

/// The two documents read on every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// The container document holding price and weight.
    Container,
    /// The bare trash indicator document.
    Trash,
}

impl fmt::Display for Resource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Resource::Container => "container",
            Resource::Trash => "trash",
        };
        write!(formatter, "{slug}")
    }
}

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while reading the remote store.
///
/// The synchronizer treats every variant the same way; the split only exists to produce
/// useful messages and to keep providers testable.
pub enum FetchError {
    /// The store answered with a non-success status.
    #[error("Failed to fetch {resource} data: {status} {reason}")]
    HttpStatus {
        /// Document that failed.
        resource: Resource,
        /// Numeric HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },
    /// The container read succeeded but the document is `null`.
    #[error("no container data available from the server")]
    EmptyContainer,
    /// Transport failed before a response arrived.
    #[error("Network error while fetching {resource} data: {source}")]
    Network {
        /// Document that failed.
        resource: Resource,
        /// Underlying client error.
        #[source]
        source: ReqwestError,
    },
    /// The body was not the JSON shape the store is expected to return.
    #[error("Malformed {resource} data: {message}")]
    Decode {
        /// Document that failed.
        resource: Resource,
        /// Decoder message.
        message: String,
    },
}

#[async_trait]
/// Read side of the remote document store.
pub trait ContainerSource: Send + Sync {
    /// Read both documents and return them untransformed.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when either read fails or the container document is empty.
    /// No partial data is returned in that case.
    async fn fetch(&self) -> Result<RawPair, FetchError>;
}
