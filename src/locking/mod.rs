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

pub mod acquisition;
pub mod guard;
pub mod lock;
pub mod retry;
pub mod scope;
pub mod unlock;
pub mod wait_observer;

pub use acquisition::{AcquireMode, DEFAULT_BLOCKING_WAIT, LockRequest};
pub use guard::DatastoreLockGuard;
pub use lock::LockOperation;
pub use retry::{RetryLimit, parse_retry_override};
pub use scope::{LockScope, SCOPE_RAISE_MODE, ScopeError};
pub use unlock::UnlockOperation;
pub use wait_observer::{LockStatusSink, LockWaitObserver, StatusReporterObserver};
