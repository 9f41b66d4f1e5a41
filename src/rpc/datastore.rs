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
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of a configuration datastore on the managed device.
///
/// The name is opaque to the locking layer; only its shape is checked so it can be
/// rendered as an element name inside the request `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Datastore(String);

impl Datastore {
    pub const RUNNING: &'static str = "running";
    pub const CANDIDATE: &'static str = "candidate";
    pub const STARTUP: &'static str = "startup";

    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DsLockError::InvalidDatastore(
                "datastore name must not be empty".to_string(),
            ));
        }

        let mut chars = trimmed.chars();
        let valid_start = chars
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false);
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid_start || !valid_rest {
            return Err(DsLockError::InvalidDatastore(format!(
                "'{trimmed}' is not a valid datastore name"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn running() -> Self {
        Self(Self::RUNNING.to_string())
    }

    pub fn candidate() -> Self {
        Self(Self::CANDIDATE.to_string())
    }

    pub fn startup() -> Self {
        Self(Self::STARTUP.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Datastore {
    fn default() -> Self {
        Self::candidate()
    }
}

impl fmt::Display for Datastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Datastore {
    type Err = DsLockError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Datastore {
    type Error = DsLockError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Datastore> for String {
    fn from(value: Datastore) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_names() {
        assert_eq!(Datastore::candidate().as_str(), "candidate");
        assert_eq!(Datastore::running().as_str(), "running");
        assert_eq!(Datastore::startup().as_str(), "startup");
        assert_eq!(Datastore::default(), Datastore::candidate());
    }

    #[test]
    fn parse_trims_whitespace() {
        let datastore: Datastore = " running ".parse().unwrap();
        assert_eq!(datastore, Datastore::running());
    }

    #[test]
    fn parse_rejects_empty_and_malformed_names() {
        assert!(matches!(
            Datastore::new(""),
            Err(DsLockError::InvalidDatastore(_))
        ));
        assert!(matches!(
            Datastore::new("<running/>"),
            Err(DsLockError::InvalidDatastore(_))
        ));
        assert!(matches!(
            Datastore::new("1st"),
            Err(DsLockError::InvalidDatastore(_))
        ));
    }

    #[test]
    fn deserializes_through_validation() {
        let ok: Datastore = serde_json::from_str("\"candidate\"").unwrap();
        assert_eq!(ok, Datastore::candidate());
        assert!(serde_json::from_str::<Datastore>("\"\"").is_err());
    }
}
