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

use crate::error::{DsLockError, Result};
use crate::rpc::reply::{ErrorSeverity, RpcReply};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Governs whether a failed reply is raised as an error or returned to the caller.
///
/// This is passed with every call; nothing stores it between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RaiseMode {
    /// Never raise; the caller inspects the reply.
    Suppress,
    /// Raise only when the primary error has severity `error`.
    #[default]
    RaiseOnError,
    /// Raise for any error, warnings included.
    RaiseAlways,
}

impl RaiseMode {
    /// Whether a reply with this outcome must be raised under this mode.
    pub fn should_raise(self, reply: &RpcReply) -> bool {
        let Some(primary) = reply.error() else {
            return false;
        };

        match self {
            RaiseMode::Suppress => false,
            RaiseMode::RaiseAlways => true,
            RaiseMode::RaiseOnError => primary.severity == ErrorSeverity::Error,
        }
    }

    /// Applies this mode to a reply: either hands it back or raises it.
    pub fn escalate(self, reply: RpcReply) -> Result<RpcReply> {
        if self.should_raise(&reply) {
            Err(reply.into_error())
        } else {
            Ok(reply)
        }
    }
}

impl fmt::Display for RaiseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RaiseMode::Suppress => "suppress",
            RaiseMode::RaiseOnError => "errors",
            RaiseMode::RaiseAlways => "all",
        };
        f.write_str(label)
    }
}

impl FromStr for RaiseMode {
    type Err = DsLockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "suppress" | "none" => Ok(RaiseMode::Suppress),
            "errors" | "raise-on-error" => Ok(RaiseMode::RaiseOnError),
            "all" | "raise-always" => Ok(RaiseMode::RaiseAlways),
            other => Err(DsLockError::InvalidConfig(format!(
                "Raise mode '{other}' is invalid. Use 'suppress', 'errors' or 'all'."
            ))),
        }
    }
}
