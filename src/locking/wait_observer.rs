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

//! Observer interfaces for blocking lock instrumentation.
//!
//! Observers let callers surface contention to users without touching the
//! retry loop. They never influence whether the loop continues.

use crate::locking::retry::RetryLimit;
use crate::rpc::{Datastore, RpcReply};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Observer hooks for blocking lock events.
pub trait LockWaitObserver {
    fn on_wait_start(&self, _target: &Datastore, _retries: RetryLimit) {}

    /// Called after a `lock-denied` reply, before waiting for the next attempt.
    fn on_retry(&self, _target: &Datastore, _attempt: u64, _holding_session: Option<u32>) {}

    fn on_acquired(&self, _target: &Datastore, _attempts: u64, _waited: Duration) {}

    /// Called when the loop stops without the lock; `reply` is the final outcome.
    fn on_gave_up(&self, _target: &Datastore, _attempts: u64, _reply: &RpcReply) {}
}

/// Destination for user-facing lock status lines.
pub trait LockStatusSink {
    fn step(&self, message: &str);
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Bridges lock wait events to a [`LockStatusSink`].
pub struct StatusReporterObserver<'a> {
    reporter: &'a dyn LockStatusSink,
    notified_contention: AtomicBool,
}

impl<'a> StatusReporterObserver<'a> {
    pub fn new(reporter: &'a dyn LockStatusSink) -> Self {
        Self {
            reporter,
            notified_contention: AtomicBool::new(false),
        }
    }
}

impl LockWaitObserver for StatusReporterObserver<'_> {
    fn on_wait_start(&self, target: &Datastore, retries: RetryLimit) {
        self.reporter
            .step(&format!("Waiting for {target} lock (retries {retries})"));
    }

    fn on_retry(&self, target: &Datastore, attempt: u64, holding_session: Option<u32>) {
        if !self.notified_contention.swap(true, Ordering::Relaxed) {
            let holder = match holding_session {
                Some(0) => " by a non-NETCONF entity".to_string(),
                Some(session) => format!(" by session {session}"),
                None => String::new(),
            };
            self.reporter
                .step(&format!("Lock on {target} is held{holder}, retrying"));
        } else if attempt % 10 == 0 {
            self.reporter.step(&format!(
                "Still waiting for {target} lock (attempt {attempt})"
            ));
        }
    }

    fn on_acquired(&self, target: &Datastore, attempts: u64, waited: Duration) {
        let waited = format_duration(waited);
        self.reporter.success(&format!(
            "Acquired {target} lock after {attempts} attempt(s), waited {waited}"
        ));
    }

    fn on_gave_up(&self, target: &Datastore, attempts: u64, reply: &RpcReply) {
        let reason = reply
            .error()
            .map(|error| error.tag.clone())
            .unwrap_or_else(|| "no reply".to_string());
        self.reporter.error(&format!(
            "Gave up on {target} lock after {attempts} attempt(s): {reason}"
        ));
    }
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.1}s", duration.as_secs_f32())
    } else {
        format!("{:.0}ms", duration.as_millis())
    }
}
