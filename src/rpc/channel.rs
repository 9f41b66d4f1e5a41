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
use crate::rpc::message::RpcRequest;
use crate::rpc::raise::RaiseMode;
use crate::rpc::reply::RpcReply;

/// Synchronous request/reply channel to a managed device.
///
/// Implementations apply `raise` to the reply before returning it, typically via
/// [`RaiseMode::escalate`]. Transport failures are always returned as errors.
pub trait RpcChannel {
    /// Sends a new logical request, registering its message id for the reply.
    fn send(&self, request: &RpcRequest, raise: RaiseMode) -> Result<RpcReply>;

    /// Retries a logical request that was already answered, re-arming the same
    /// message id. Fails if the id was never sent or still awaits a reply.
    fn resend(&self, request: &RpcRequest, raise: RaiseMode) -> Result<RpcReply>;
}

impl<C: RpcChannel + ?Sized> RpcChannel for &C {
    fn send(&self, request: &RpcRequest, raise: RaiseMode) -> Result<RpcReply> {
        (**self).send(request, raise)
    }

    fn resend(&self, request: &RpcRequest, raise: RaiseMode) -> Result<RpcReply> {
        (**self).resend(request, raise)
    }
}

impl<C: RpcChannel + ?Sized> RpcChannel for Box<C> {
    fn send(&self, request: &RpcRequest, raise: RaiseMode) -> Result<RpcReply> {
        (**self).send(request, raise)
    }

    fn resend(&self, request: &RpcRequest, raise: RaiseMode) -> Result<RpcReply> {
        (**self).resend(request, raise)
    }
}
