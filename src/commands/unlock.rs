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

use crate::commands::lock::print_suppressed;
use crate::commands::{print_json, resolve_target, scripted_channel};
use crate::config::DsLockConfig;
use crate::error::Result;
use crate::locking::UnlockOperation;
use crate::rpc::{Datastore, RaiseMode, ScriptedReply};
use colored::*;

pub struct UnlockCommand<'a> {
    config: &'a DsLockConfig,
}

impl<'a> UnlockCommand<'a> {
    pub fn new(config: &'a DsLockConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(
        &self,
        target: Option<&Datastore>,
        raise: RaiseMode,
        replies: &[ScriptedReply],
        json: bool,
    ) -> Result<()> {
        let target = resolve_target(target, &self.config.locking)?;
        let channel = scripted_channel(replies);

        let reply = UnlockOperation::new(&channel).release(&target, raise)?;

        if json {
            return print_json("unlock", &target, channel.sent_count(), Some(&reply));
        }

        if reply.ok() {
            println!("{} Unlocked {target}", "✓".green().bold());
        } else {
            print_suppressed("unlock", &reply);
        }
        Ok(())
    }
}
