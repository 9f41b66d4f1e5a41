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
use crate::rpc::message::MessageId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Error tag reported when the datastore is already locked by another session.
pub const LOCK_DENIED: &str = "lock-denied";

const SESSION_ID_INFO: &str = "session-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Error,
    Warning,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Error => f.write_str("error"),
            ErrorSeverity::Warning => f.write_str("warning"),
        }
    }
}

/// Protocol layer the device attributes an error to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Transport,
    Rpc,
    #[default]
    Protocol,
    Application,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorType::Transport => "transport",
            ErrorType::Rpc => "rpc",
            ErrorType::Protocol => "protocol",
            ErrorType::Application => "application",
        };
        f.write_str(label)
    }
}

/// One structured error reported by the device in a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub error_type: ErrorType,
    pub tag: String,
    pub severity: ErrorSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub info: BTreeMap<String, String>,
}

impl RpcError {
    pub fn new(tag: impl Into<String>, severity: ErrorSeverity) -> Self {
        Self {
            error_type: ErrorType::default(),
            tag: tag.into(),
            severity,
            app_tag: None,
            path: None,
            message: None,
            info: BTreeMap::new(),
        }
    }

    pub fn lock_denied(holding_session: Option<u32>) -> Self {
        let mut error = Self::new(LOCK_DENIED, ErrorSeverity::Error)
            .with_message("Lock failed, lock is already held");
        if let Some(session) = holding_session {
            error = error.with_info(SESSION_ID_INFO, session.to_string());
        }
        error
    }

    pub fn with_type(mut self, error_type: ErrorType) -> Self {
        self.error_type = error_type;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info.insert(key.into(), value.into());
        self
    }

    pub fn is_lock_denied(&self) -> bool {
        self.tag == LOCK_DENIED
    }

    pub fn is_error(&self) -> bool {
        self.severity == ErrorSeverity::Error
    }

    /// Session holding the lock, as reported in the `session-id` error-info of a
    /// `lock-denied` error. Zero means a non-NETCONF entity holds it.
    pub fn holding_session(&self) -> Option<u32> {
        if !self.is_lock_denied() {
            return None;
        }
        self.info
            .get(SESSION_ID_INFO)
            .and_then(|value| value.trim().parse().ok())
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.error_type, self.severity, self.tag)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " at {path}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RpcError {}

/// Outcome of one request as delivered by the channel.
///
/// `errors` keeps the order the device reported them in; the first one is the
/// primary error used for severity checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcReply {
    message_id: MessageId,
    errors: Vec<RpcError>,
    raw: String,
}

impl RpcReply {
    pub fn new(message_id: MessageId, errors: Vec<RpcError>, raw: impl Into<String>) -> Self {
        Self {
            message_id,
            errors,
            raw: raw.into(),
        }
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    /// Primary error, if any.
    pub fn error(&self) -> Option<&RpcError> {
        self.errors.first()
    }

    pub fn errors(&self) -> &[RpcError] {
        &self.errors
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Converts a failed reply into the error escalation raises: the single error
    /// itself, or an aggregate carrying every error in order.
    pub fn into_error(self) -> DsLockError {
        let RpcReply {
            mut errors, raw, ..
        } = self;
        if errors.len() > 1 {
            DsLockError::Aggregate { errors, raw }
        } else if let Some(error) = errors.pop() {
            DsLockError::Rpc(error)
        } else {
            DsLockError::Transport("reply without errors cannot be escalated".to_string())
        }
    }
}
