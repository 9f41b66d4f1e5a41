mod context;
mod exit_codes;
mod format;

pub use context::ErrorContext;
pub use exit_codes::get_exit_code;
pub use format::{format_error_chain, format_error_with_color};

use crate::rpc::RpcError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DsLockError {
    #[error("Device reported {0}")]
    Rpc(RpcError),

    #[error("Device reported {} errors: {}", .errors.len(), summarize_errors(.errors))]
    Aggregate { errors: Vec<RpcError>, raw: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid datastore: {0}")]
    InvalidDatastore(String),

    #[error("Invalid retry count: {0}")]
    InvalidRetryCount(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DsLockError {
    /// Remote errors carried by an escalated reply, in device order.
    pub fn rpc_errors(&self) -> &[RpcError] {
        match self {
            DsLockError::Rpc(error) => std::slice::from_ref(error),
            DsLockError::Aggregate { errors, .. } => errors,
            _ => &[],
        }
    }

    pub fn primary_rpc_error(&self) -> Option<&RpcError> {
        self.rpc_errors().first()
    }

    pub fn is_lock_denied(&self) -> bool {
        self.primary_rpc_error()
            .map(RpcError::is_lock_denied)
            .unwrap_or(false)
    }
}

impl From<RpcError> for DsLockError {
    fn from(error: RpcError) -> Self {
        DsLockError::Rpc(error)
    }
}

impl From<config::ConfigError> for DsLockError {
    fn from(error: config::ConfigError) -> Self {
        DsLockError::ConfigError(error.to_string())
    }
}

fn summarize_errors(errors: &[RpcError]) -> String {
    errors
        .iter()
        .map(|error| error.tag.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, DsLockError>;
