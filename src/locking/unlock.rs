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

use crate::error::Result;
use crate::rpc::{Datastore, Operation, RaiseMode, RpcChannel, RpcReply, RpcRequest};
use log::debug;

/// The `unlock` operation. One request, no retries; escalation is the channel's.
pub struct UnlockOperation<'a, C: RpcChannel + ?Sized> {
    channel: &'a C,
}

impl<'a, C: RpcChannel + ?Sized> UnlockOperation<'a, C> {
    pub fn new(channel: &'a C) -> Self {
        Self { channel }
    }

    pub fn release(&self, target: &Datastore, raise: RaiseMode) -> Result<RpcReply> {
        debug!("Releasing lock on {target}");
        let rpc = RpcRequest::new(Operation::unlock(target.clone()));
        self.channel.send(&rpc, raise)
    }
}
