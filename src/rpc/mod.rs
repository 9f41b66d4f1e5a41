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

//! Request/reply plumbing between the locking operations and a managed device.

pub mod channel;
pub mod datastore;
pub mod message;
pub mod raise;
pub mod reply;
pub mod scripted;

pub use channel::RpcChannel;
pub use datastore::Datastore;
pub use message::{MessageId, Operation, RpcRequest};
pub use raise::RaiseMode;
pub use reply::{ErrorSeverity, ErrorType, LOCK_DENIED, RpcError, RpcReply};
pub use scripted::{ScriptedChannel, ScriptedReply, SentRequest};
