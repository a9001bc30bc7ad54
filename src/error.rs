//! Error types for the catalog API
//!
//! Domain errors carry their own status and payload. Everything else is an
//! internal failure that is logged and reported as a generic 500.

use hyper::StatusCode;
use serde_json::{json, Value};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    NotFound { message: String },

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("failed to read store '{path}': {source}")]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse store '{path}': {source}")]
    StoreParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ApiError {
    pub fn item_not_found() -> Self {
        Self::NotFound {
            message: "Item Not Found".to_string(),
        }
    }

    /// Domain errors are expected outcomes and are passed to the client as-is
    pub const fn is_domain(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::MethodNotAllowed)
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::StoreRead { .. } | Self::StoreParse { .. } | Self::Serialize(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON body sent to the client. Internal details never leave the process.
    pub fn payload(&self) -> Value {
        match self {
            Self::NotFound { message } => json!({ "message": message }),
            Self::MethodNotAllowed => json!({ "message": "Method Not Allowed" }),
            _ => json!({ "message": "Server Error" }),
        }
    }
}
