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

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use dslock::commands::LockOverrides;
use dslock::commands::hold::HoldCommand;
use dslock::commands::lock::LockCommand;
use dslock::commands::unlock::UnlockCommand;
use dslock::config::new_dslock_config;
use dslock::error::{DsLockError, Result, format_error_with_color, get_exit_code};
use dslock::logging;
use dslock::rpc::{Datastore, RaiseMode, ScriptedReply};

#[derive(Parser)]
#[command(name = "dslock")]
#[command(author, version, about = "Datastore lock rehearsal tool", long_about = None)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lock a datastore
    #[command(long_about = "Lock a datastore

Replies are consumed in order, one per request sent. A reply is 'ok', an error
tag such as 'lock-denied' or 'in-use', 'lock-denied@<session>', '<tag>:warning',
'transport:<detail>', or several errors joined with '+'.

Examples:
  dslock lock --reply ok
  dslock lock --blocking --retries 3 --reply lock-denied,lock-denied,ok
  dslock lock --raise suppress --reply in-use")]
    Lock {
        #[command(flatten)]
        overrides: LockOverrides,

        /// Escalation policy: suppress, errors, or all
        #[arg(long, value_name = "MODE", default_value_t = RaiseMode::RaiseOnError)]
        raise: RaiseMode,

        /// Scripted device replies, in order
        #[arg(long = "reply", value_name = "SPEC", value_delimiter = ',', required = true)]
        replies: Vec<ScriptedReply>,

        /// Output the final reply as JSON
        #[arg(long)]
        json: bool,
    },

    /// Unlock a datastore
    Unlock {
        /// Datastore to unlock
        #[arg(long, value_name = "DATASTORE")]
        target: Option<Datastore>,

        /// Escalation policy: suppress, errors, or all
        #[arg(long, value_name = "MODE", default_value_t = RaiseMode::RaiseOnError)]
        raise: RaiseMode,

        /// Scripted device replies, in order
        #[arg(long = "reply", value_name = "SPEC", value_delimiter = ',', required = true)]
        replies: Vec<ScriptedReply>,

        /// Output the final reply as JSON
        #[arg(long)]
        json: bool,
    },

    /// Lock a datastore, run an empty protected block, then unlock it
    Hold {
        #[command(flatten)]
        overrides: LockOverrides,

        /// Scripted device replies for the lock and unlock requests, in order
        #[arg(long = "reply", value_name = "SPEC", value_delimiter = ',', required = true)]
        replies: Vec<ScriptedReply>,

        /// Output the outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

fn setup_logger(cli: &Cli) {
    logging::setup_logger(cli.verbose);
}

fn exit_with_error(error: &DsLockError) -> ! {
    eprintln!(
        "{}",
        format_error_with_color(error, std::io::stderr().is_terminal())
    );
    std::process::exit(get_exit_code(error));
}

fn main() {
    let cli = Cli::parse();

    // Initialize logger based on CLI flags and environment
    setup_logger(&cli);

    let config = match new_dslock_config() {
        Ok(config) => config,
        Err(e) => exit_with_error(&e),
    };

    let result: Result<()> = (|| match cli.command {
        Commands::Lock {
            overrides,
            raise,
            replies,
            json,
        } => {
            let command = LockCommand::new(&config)?;
            command.execute(&overrides, raise, &replies, json)
        }
        Commands::Unlock {
            target,
            raise,
            replies,
            json,
        } => {
            let command = UnlockCommand::new(&config)?;
            command.execute(target.as_ref(), raise, &replies, json)
        }
        Commands::Hold {
            overrides,
            replies,
            json,
        } => {
            let command = HoldCommand::new(&config)?;
            command.execute(&overrides, &replies, json)
        }
    })();

    if let Err(e) = result {
        exit_with_error(&e);
    }
}
