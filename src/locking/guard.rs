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
use crate::locking::unlock::UnlockOperation;
use crate::rpc::{Datastore, RaiseMode, RpcChannel, RpcReply};
use log::warn;

/// RAII guard for a held datastore lock.
///
/// `release` surfaces the unlock outcome. A guard dropped without `release`,
/// including while unwinding from a panic, still attempts the unlock and logs a
/// warning if it fails.
pub struct DatastoreLockGuard<'a, C: RpcChannel + ?Sized> {
    unlock: UnlockOperation<'a, C>,
    target: Datastore,
    raise: RaiseMode,
    lock_reply: RpcReply,
    released: bool,
}

impl<'a, C: RpcChannel + ?Sized> DatastoreLockGuard<'a, C> {
    pub fn new(channel: &'a C, target: Datastore, raise: RaiseMode, lock_reply: RpcReply) -> Self {
        Self {
            unlock: UnlockOperation::new(channel),
            target,
            raise,
            lock_reply,
            released: false,
        }
    }

    pub fn target(&self) -> &Datastore {
        &self.target
    }

    /// Reply to the `lock` request that produced this guard.
    pub fn lock_reply(&self) -> &RpcReply {
        &self.lock_reply
    }

    pub fn release(mut self) -> Result<RpcReply> {
        self.released = true;
        self.unlock.release(&self.target, self.raise)
    }
}

impl<C: RpcChannel + ?Sized> Drop for DatastoreLockGuard<'_, C> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(err) = self.unlock.release(&self.target, self.raise) {
            warn!("Failed to release lock on {}: {err}", self.target);
        }
    }
}
