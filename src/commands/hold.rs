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

use crate::commands::reporter::ConsoleReporter;
use crate::commands::{LockOverrides, print_json, scripted_channel};
use crate::config::DsLockConfig;
use crate::error::{DsLockError, Result};
use crate::locking::{LockScope, ScopeError, StatusReporterObserver};
use crate::rpc::ScriptedReply;
use colored::*;
use log::{info, warn};

/// Takes the lock, runs an empty protected block, and releases it.
pub struct HoldCommand<'a> {
    config: &'a DsLockConfig,
}

impl<'a> HoldCommand<'a> {
    pub fn new(config: &'a DsLockConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(
        &self,
        overrides: &LockOverrides,
        replies: &[ScriptedReply],
        json: bool,
    ) -> Result<()> {
        let request = overrides.resolve(&self.config.locking)?;
        let target = request.target().clone();
        let channel = scripted_channel(replies);
        let reporter = ConsoleReporter::new(json);
        let observer = StatusReporterObserver::new(&reporter);

        LockScope::new(&channel, request)
            .with_observer(Some(&observer))
            .run(|target| {
                info!("Holding lock on {target}");
                Ok::<(), DsLockError>(())
            })
            .map_err(into_single_error)?;

        if json {
            return print_json("hold", &target, channel.sent_count(), None);
        }

        println!(
            "{} Held {target} lock and released it ({} request(s))",
            "✓".green().bold(),
            channel.sent_count()
        );
        Ok(())
    }
}

fn into_single_error(error: ScopeError<DsLockError>) -> DsLockError {
    match error {
        ScopeError::Acquire(err) | ScopeError::Release(err) => err,
        ScopeError::Work { error, release } => {
            if let Some(release) = release {
                warn!("Releasing the lock also failed: {release}");
            }
            error
        }
    }
}
