//! Error types for the query server and client.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Cannot bind query socket {path}: {source}")]
    Bind {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to replace {path}: not a socket")]
    NotASocket { path: PathBuf },

    #[error("Cannot connect to query socket {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Accept failed: {0}")]
    Accept(#[source] std::io::Error),

    #[error("Failed to read query: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to write response: {0}")]
    Write(#[source] std::io::Error),

    #[error("Timed out during {operation}")]
    Timeout { operation: &'static str },

    #[error("Query exceeds {limit} bytes")]
    QueryTooLong { limit: usize },

    #[error("Query pattern must not contain a newline")]
    InvalidPattern,
}

pub type ServerResult<T> = Result<T, ServerError>;
