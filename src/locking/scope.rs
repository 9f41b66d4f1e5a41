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

//! Lock/unlock pairing around a block of work.

use crate::error::{DsLockError, Result};
use crate::locking::acquisition::LockRequest;
use crate::locking::guard::DatastoreLockGuard;
use crate::locking::lock::LockOperation;
use crate::locking::wait_observer::LockWaitObserver;
use crate::rpc::{Datastore, RaiseMode, RpcChannel};
use std::fmt;

/// Policy for both ends of a scope: any failure, warnings included, is raised.
pub const SCOPE_RAISE_MODE: RaiseMode = RaiseMode::RaiseAlways;

/// Outcome of a scope that did not complete cleanly.
///
/// A failure of the protected work never hides a failure of the release, and the
/// reverse: `Work` carries both when both happened.
#[derive(Debug)]
pub enum ScopeError<E> {
    /// The lock was not acquired; the work never ran and nothing was released.
    Acquire(DsLockError),
    /// The work failed. `release` holds the unlock failure, if there was one.
    Work {
        error: E,
        release: Option<DsLockError>,
    },
    /// The work succeeded but the unlock failed.
    Release(DsLockError),
}

impl<E> ScopeError<E> {
    pub fn work_error(&self) -> Option<&E> {
        match self {
            ScopeError::Work { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn into_work_error(self) -> Option<E> {
        match self {
            ScopeError::Work { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn release_error(&self) -> Option<&DsLockError> {
        match self {
            ScopeError::Work { release, .. } => release.as_ref(),
            ScopeError::Release(err) => Some(err),
            ScopeError::Acquire(_) => None,
        }
    }

    pub fn is_acquire(&self) -> bool {
        matches!(self, ScopeError::Acquire(_))
    }
}

impl<E: fmt::Display> fmt::Display for ScopeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeError::Acquire(err) => write!(f, "Failed to acquire lock: {err}"),
            ScopeError::Work {
                error,
                release: None,
            } => write!(f, "Work under lock failed: {error}"),
            ScopeError::Work {
                error,
                release: Some(release),
            } => write!(
                f,
                "Work under lock failed: {error}; releasing the lock also failed: {release}"
            ),
            ScopeError::Release(err) => write!(f, "Failed to release lock: {err}"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for ScopeError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScopeError::Acquire(err) | ScopeError::Release(err) => Some(err),
            ScopeError::Work { error, .. } => Some(error),
        }
    }
}

/// Pairs a lock with a guaranteed unlock around caller-supplied work.
///
/// The scope borrows the channel. Both the lock and the unlock run under
/// [`SCOPE_RAISE_MODE`].
pub struct LockScope<'a, C: RpcChannel + ?Sized> {
    channel: &'a C,
    request: LockRequest,
    observer: Option<&'a dyn LockWaitObserver>,
}

impl<'a, C: RpcChannel + ?Sized> LockScope<'a, C> {
    pub fn new(channel: &'a C, request: LockRequest) -> Self {
        Self {
            channel,
            request,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Option<&'a dyn LockWaitObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn target(&self) -> &Datastore {
        self.request.target()
    }

    /// Acquires the lock and hands back a guard that unlocks on release or drop.
    pub fn enter(&self) -> Result<DatastoreLockGuard<'a, C>> {
        let reply = LockOperation::new(self.channel)
            .with_observer(self.observer)
            .acquire(&self.request, SCOPE_RAISE_MODE)?;
        Ok(DatastoreLockGuard::new(
            self.channel,
            self.request.target().clone(),
            SCOPE_RAISE_MODE,
            reply,
        ))
    }

    /// Runs `work` while holding the lock. The unlock is attempted exactly once
    /// after `work` returns, whatever it returned; if `work` panics the guard
    /// unlocks during unwinding.
    pub fn run<T, E, F>(&self, work: F) -> std::result::Result<T, ScopeError<E>>
    where
        F: FnOnce(&Datastore) -> std::result::Result<T, E>,
    {
        let guard = self.enter().map_err(ScopeError::Acquire)?;
        let outcome = work(guard.target());
        let released = guard.release().map(|_| ());

        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(ScopeError::Release(err)),
            (Err(error), released) => Err(ScopeError::Work {
                error,
                release: released.err(),
            }),
        }
    }
}
