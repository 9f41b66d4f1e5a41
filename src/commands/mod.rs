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

//! Rehearsal commands that drive the lock protocol against scripted device replies.

pub mod hold;
pub mod lock;
pub mod reporter;
pub mod unlock;

use crate::config::LockingConfig;
use crate::error::Result;
use crate::locking::{AcquireMode, LockRequest, RetryLimit, parse_retry_override};
use crate::rpc::{Datastore, RpcReply, ScriptedChannel, ScriptedReply};
use clap::Args;
use serde::Serialize;
use std::time::Duration;

/// Command-line overrides for the `[locking]` configuration section.
#[derive(Args, Debug, Clone, Default)]
pub struct LockOverrides {
    /// Datastore to lock (e.g., "candidate", "running")
    #[arg(long, value_name = "DATASTORE")]
    pub target: Option<Datastore>,

    /// Keep retrying while the device answers lock-denied
    #[arg(long)]
    pub blocking: bool,

    /// Send a single lock request even if the configuration enables blocking
    #[arg(long, conflicts_with = "blocking")]
    pub no_blocking: bool,

    /// Retries after the first attempt when blocking, or "unbounded"
    #[arg(long, value_name = "N", value_parser = parse_retry_override)]
    pub retries: Option<RetryLimit>,

    /// Wait between blocking attempts in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,
}

impl LockOverrides {
    /// Layers the overrides on top of the configured defaults.
    pub fn resolve(&self, config: &LockingConfig) -> Result<LockRequest> {
        let mut request = config.lock_request()?;
        if let Some(target) = &self.target {
            request = LockRequest::new(target.clone())
                .with_mode(request.mode())
                .with_retries(request.retries())
                .with_interval(request.interval());
        }
        if self.blocking {
            request = request.with_mode(AcquireMode::Blocking);
        } else if self.no_blocking {
            request = request.with_mode(AcquireMode::NonBlocking);
        }
        if let Some(retries) = self.retries {
            request = request.with_retries(retries);
        }
        if let Some(interval_ms) = self.interval_ms {
            request = request.with_interval(Duration::from_millis(interval_ms));
        }
        Ok(request)
    }
}

/// Target resolution for commands that only need a datastore.
pub fn resolve_target(target: Option<&Datastore>, config: &LockingConfig) -> Result<Datastore> {
    match target {
        Some(target) => Ok(target.clone()),
        None => Ok(config.lock_request()?.target().clone()),
    }
}

pub fn scripted_channel(replies: &[ScriptedReply]) -> ScriptedChannel {
    ScriptedChannel::new(replies.iter().cloned())
}

#[derive(Serialize)]
struct OperationOutput<'a> {
    operation: &'a str,
    target: &'a str,
    requests: usize,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<&'a RpcReply>,
}

pub(crate) fn print_json(
    operation: &str,
    target: &Datastore,
    requests: usize,
    reply: Option<&RpcReply>,
) -> Result<()> {
    let output = OperationOutput {
        operation,
        target: target.as_str(),
        requests,
        ok: reply.is_none_or(RpcReply::ok),
        reply,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
