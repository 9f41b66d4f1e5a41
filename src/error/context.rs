// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::DsLockError;
use crate::rpc::{ErrorSeverity, RpcError};
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a DsLockError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a DsLockError) -> Self {
        let (suggestion, details) = match error {
            DsLockError::Rpc(rpc_error) if rpc_error.is_lock_denied() => {
                lock_denied_context(rpc_error)
            }
            DsLockError::Rpc(rpc_error) => {
                let suggestion = if rpc_error.severity == ErrorSeverity::Warning {
                    Some(
                        "The device only reported a warning. Use --raise errors to continue on \
                         warnings."
                            .to_string(),
                    )
                } else {
                    None
                };
                (suggestion, Some(describe(rpc_error)))
            }
            DsLockError::Aggregate { errors, .. } => {
                let suggestion = errors
                    .first()
                    .filter(|primary| primary.is_lock_denied())
                    .and_then(|primary| lock_denied_context(primary).0);
                let details = Some(format!(
                    "Errors in device order:\n{}",
                    errors
                        .iter()
                        .map(|e| format!("  - {}", describe(e)))
                        .collect::<Vec<_>>()
                        .join("\n")
                ));
                (suggestion, details)
            }
            DsLockError::Transport(msg) => {
                let suggestion = Some(
                    "Check the session to the device is still established and retry the \
                     operation."
                        .to_string(),
                );
                let details = Some(format!("Channel failure: {msg}"));
                (suggestion, details)
            }
            DsLockError::InvalidDatastore(_) => {
                let suggestion = Some(
                    "Datastore names look like 'running', 'candidate' or 'startup'.".to_string(),
                );
                (suggestion, None)
            }
            DsLockError::InvalidRetryCount(_) => {
                let suggestion = Some(
                    "Use a whole number of retries, or 'unbounded' to keep waiting until the \
                     device answers differently."
                        .to_string(),
                );
                (suggestion, None)
            }
            DsLockError::ConfigError(_) | DsLockError::InvalidConfig(_) => {
                let suggestion = Some(
                    "Check config.toml in the dslock home directory and any DSLOCK_LOCKING__* \
                     environment variables."
                        .to_string(),
                );
                (suggestion, None)
            }
            DsLockError::Io(io_err) => {
                let suggestion = match io_err.kind() {
                    std::io::ErrorKind::PermissionDenied => {
                        Some("Check permissions on the dslock home directory.".to_string())
                    }
                    std::io::ErrorKind::NotFound => Some(
                        "Ensure the file or directory exists and the path is correct.".to_string(),
                    ),
                    _ => None,
                };
                let details = Some(format!("I/O error: {io_err}"));
                (suggestion, details)
            }
            DsLockError::Json(_) => (None, None),
        };

        ErrorContext {
            error,
            suggestion,
            details,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

fn lock_denied_context(error: &RpcError) -> (Option<String>, Option<String>) {
    let holder = match error.holding_session() {
        Some(0) => "a non-NETCONF entity".to_string(),
        Some(session) => format!("session {session}"),
        None => "another session".to_string(),
    };
    let suggestion = Some(
        "Retry with --blocking to wait for the lock, optionally bounded with --retries."
            .to_string(),
    );
    let details = Some(format!("The datastore is locked by {holder}."));
    (suggestion, details)
}

fn describe(error: &RpcError) -> String {
    let mut text = format!("{} [{}]", error.tag, error.severity);
    if let Some(message) = &error.message {
        text.push_str(&format!(": {message}"));
    }
    if let Some(path) = &error.path {
        text.push_str(&format!(" (path {path})"));
    }
    text
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
