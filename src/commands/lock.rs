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
use crate::error::Result;
use crate::locking::{LockOperation, StatusReporterObserver};
use crate::rpc::{RaiseMode, RpcReply, ScriptedReply};
use colored::*;

pub struct LockCommand<'a> {
    config: &'a DsLockConfig,
}

impl<'a> LockCommand<'a> {
    pub fn new(config: &'a DsLockConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(
        &self,
        overrides: &LockOverrides,
        raise: RaiseMode,
        replies: &[ScriptedReply],
        json: bool,
    ) -> Result<()> {
        let request = overrides.resolve(&self.config.locking)?;
        let channel = scripted_channel(replies);
        let reporter = ConsoleReporter::new(json);
        let observer = StatusReporterObserver::new(&reporter);

        let reply = LockOperation::new(&channel)
            .with_observer(Some(&observer))
            .acquire(&request, raise)?;
        let requests = channel.sent_count();

        if json {
            return print_json("lock", request.target(), requests, Some(&reply));
        }

        if reply.ok() {
            println!(
                "{} Locked {} ({requests} request(s))",
                "✓".green().bold(),
                request.target()
            );
        } else {
            print_suppressed("lock", &reply);
        }
        Ok(())
    }
}

/// Reports a reply that carried errors the raise policy let through.
pub(crate) fn print_suppressed(operation: &str, reply: &RpcReply) {
    println!(
        "{} {operation} returned {} error(s) that were not raised:",
        "⚠".yellow(),
        reply.errors().len()
    );
    for error in reply.errors() {
        println!("  - {error}");
    }
}
