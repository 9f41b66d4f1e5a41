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

use crate::locking::retry::RetryLimit;
use crate::rpc::Datastore;
use std::time::Duration;

/// Pause between attempts of a blocking lock unless the caller picks another.
pub const DEFAULT_BLOCKING_WAIT: Duration = Duration::from_millis(10);

/// Indicates whether a lock request may wait for a competing session to let go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquireMode {
    Blocking,
    #[default]
    NonBlocking,
}

impl AcquireMode {
    pub fn from_blocking(blocking: bool) -> Self {
        if blocking {
            AcquireMode::Blocking
        } else {
            AcquireMode::NonBlocking
        }
    }

    pub fn is_blocking(self) -> bool {
        matches!(self, AcquireMode::Blocking)
    }
}

/// Parameters of one lock call. Built per call and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRequest {
    target: Datastore,
    mode: AcquireMode,
    retries: RetryLimit,
    interval: Duration,
}

impl LockRequest {
    pub fn new(target: Datastore) -> Self {
        Self {
            target,
            mode: AcquireMode::NonBlocking,
            retries: RetryLimit::Unbounded,
            interval: DEFAULT_BLOCKING_WAIT,
        }
    }

    pub fn blocking(mut self, retries: RetryLimit) -> Self {
        self.mode = AcquireMode::Blocking;
        self.retries = retries;
        self
    }

    pub fn with_mode(mut self, mode: AcquireMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_retries(mut self, retries: RetryLimit) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn target(&self) -> &Datastore {
        &self.target
    }

    pub fn mode(&self) -> AcquireMode {
        self.mode
    }

    pub fn retries(&self) -> RetryLimit {
        self.retries
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for LockRequest {
    fn default() -> Self {
        Self::new(Datastore::default())
    }
}
