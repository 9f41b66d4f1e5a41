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

use crate::locking::LockStatusSink;
use colored::*;

/// Writes lock status lines to stderr so stdout stays machine-readable.
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl LockStatusSink for ConsoleReporter {
    fn step(&self, message: &str) {
        if !self.quiet {
            eprintln!("  {message}");
        }
    }

    fn success(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {message}", "✓".green().bold());
        }
    }

    fn error(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {message}", "✗".red());
        }
    }
}
