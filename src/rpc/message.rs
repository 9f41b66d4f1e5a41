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

use crate::rpc::datastore::Datastore;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const BASE_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Correlation identity linking a request to its reply on the channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operations this crate issues against a datastore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum Operation {
    Lock { target: Datastore },
    Unlock { target: Datastore },
}

impl Operation {
    pub fn lock(target: Datastore) -> Self {
        Operation::Lock { target }
    }

    pub fn unlock(target: Datastore) -> Self {
        Operation::Unlock { target }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Lock { .. } => "lock",
            Operation::Unlock { .. } => "unlock",
        }
    }

    pub fn target(&self) -> &Datastore {
        match self {
            Operation::Lock { target } | Operation::Unlock { target } => target,
        }
    }

    /// Operation element, e.g. `<lock><target><candidate/></target></lock>`.
    pub fn to_xml(&self) -> String {
        let name = self.name();
        let target = self.target();
        format!("<{name}><target><{target}/></target></{name}>")
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.target())
    }
}

/// A single logical request. Retries of the same logical request reuse the
/// message id; a fresh request gets a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcRequest {
    message_id: MessageId,
    operation: Operation,
}

impl RpcRequest {
    pub fn new(operation: Operation) -> Self {
        Self {
            message_id: MessageId::generate(),
            operation,
        }
    }

    pub fn with_message_id(operation: Operation, message_id: MessageId) -> Self {
        Self {
            message_id,
            operation,
        }
    }

    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn to_xml(&self) -> String {
        format!(
            "<rpc message-id=\"{}\" xmlns=\"{BASE_NAMESPACE}\">{}</rpc>",
            self.message_id,
            self.operation.to_xml()
        )
    }
}
