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
use crate::locking::acquisition::LockRequest;
use crate::locking::wait_observer::LockWaitObserver;
use crate::rpc::{Operation, RaiseMode, RpcChannel, RpcReply, RpcRequest};
use log::debug;
use retry::{OperationResult, delay::Fixed, retry_with_index};
use std::time::Instant;

/// Attempts between periodic progress messages while blocking.
const PROGRESS_LOG_EVERY: u64 = 10;

/// Why one attempt of the blocking loop did not produce the lock.
enum AttemptFailure {
    Refused(RpcReply),
    Channel(DsLockError),
}

/// The `lock` operation, single-shot or blocking.
pub struct LockOperation<'a, C: RpcChannel + ?Sized> {
    channel: &'a C,
    observer: Option<&'a dyn LockWaitObserver>,
}

impl<'a, C: RpcChannel + ?Sized> LockOperation<'a, C> {
    pub fn new(channel: &'a C) -> Self {
        Self {
            channel,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Option<&'a dyn LockWaitObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Locks `request.target()`.
    ///
    /// A non-blocking request sends exactly one `lock` and hands escalation to the
    /// channel. A blocking request keeps retrying the same logical request while the
    /// device answers `lock-denied`, with every attempt sent under
    /// [`RaiseMode::Suppress`]; `raise` is then applied once to the final reply.
    pub fn acquire(&self, request: &LockRequest, raise: RaiseMode) -> Result<RpcReply> {
        let rpc = RpcRequest::new(Operation::lock(request.target().clone()));
        if !request.mode().is_blocking() {
            return self.channel.send(&rpc, raise);
        }

        debug!(
            "Using blocking lock behaviour for {} (retries {}, interval {:?})",
            request.target(),
            request.retries(),
            request.interval()
        );
        let reply = self.acquire_blocking(&rpc, request)?;
        raise.escalate(reply)
    }

    fn acquire_blocking(&self, rpc: &RpcRequest, request: &LockRequest) -> Result<RpcReply> {
        let target = request.target();
        let max_attempts = request.retries().max_attempts();
        if let Some(observer) = self.observer {
            observer.on_wait_start(target, request.retries());
        }

        let started = Instant::now();
        let mut attempts: u64 = 0;
        let delays = Fixed::from(request.interval())
            .take(request.retries().max_waits());

        let outcome = retry_with_index(delays, |current_try| {
            attempts = current_try;
            let sent = if current_try == 1 {
                self.channel.send(rpc, RaiseMode::Suppress)
            } else {
                self.channel.resend(rpc, RaiseMode::Suppress)
            };
            let reply = match sent {
                Ok(reply) => reply,
                Err(err) => return OperationResult::Err(AttemptFailure::Channel(err)),
            };

            let holding_session = match reply.error() {
                None => return OperationResult::Ok(reply),
                Some(primary) if !primary.is_lock_denied() => {
                    return OperationResult::Err(AttemptFailure::Refused(reply));
                }
                Some(primary) => primary.holding_session(),
            };

            let exhausted = max_attempts.is_some_and(|max| current_try >= max);
            if !exhausted {
                if progress_due(current_try) {
                    debug!("Attempted to acquire lock on {target} {current_try} times so far");
                }
                if let Some(observer) = self.observer {
                    observer.on_retry(target, current_try, holding_session);
                }
            }
            OperationResult::Retry(AttemptFailure::Refused(reply))
        });

        match outcome {
            Ok(reply) => {
                debug!("Acquired lock on {target} after {attempts} attempt(s)");
                if let Some(observer) = self.observer {
                    observer.on_acquired(target, attempts, started.elapsed());
                }
                Ok(reply)
            }
            Err(failure) => match failure.error {
                AttemptFailure::Refused(reply) => {
                    debug!("Gave up locking {target} after {attempts} attempt(s)");
                    if let Some(observer) = self.observer {
                        observer.on_gave_up(target, attempts, &reply);
                    }
                    Ok(reply)
                }
                AttemptFailure::Channel(err) => Err(err),
            },
        }
    }
}

fn progress_due(attempt: u64) -> bool {
    attempt % PROGRESS_LOG_EVERY == 0
}
