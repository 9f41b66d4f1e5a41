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
use std::fmt;
use std::num::NonZeroU32;

/// Upper bound on retries of a blocking lock.
///
/// `Bounded(n)` allows `n` retries after the first attempt, so at most `n + 1`
/// requests. `Unbounded` keeps retrying until the device succeeds or reports
/// something other than `lock-denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryLimit {
    Bounded(NonZeroU32),
    #[default]
    Unbounded,
}

impl RetryLimit {
    /// Maps a raw count where zero or negative means unbounded.
    pub fn from_count(count: i64) -> Self {
        if count <= 0 {
            return RetryLimit::Unbounded;
        }
        let clamped = u32::try_from(count).unwrap_or(u32::MAX);
        NonZeroU32::new(clamped)
            .map(RetryLimit::Bounded)
            .unwrap_or(RetryLimit::Unbounded)
    }

    pub fn bounded(retries: u32) -> Self {
        NonZeroU32::new(retries)
            .map(RetryLimit::Bounded)
            .unwrap_or(RetryLimit::Unbounded)
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, RetryLimit::Unbounded)
    }

    /// Total requests allowed, `None` when unbounded.
    pub fn max_attempts(&self) -> Option<u64> {
        match self {
            RetryLimit::Bounded(retries) => Some(u64::from(retries.get()) + 1),
            RetryLimit::Unbounded => None,
        }
    }

    /// Number of waits between attempts, as a count usable with `Iterator::take`.
    pub(crate) fn max_waits(&self) -> usize {
        match self {
            RetryLimit::Bounded(retries) => usize::try_from(retries.get()).unwrap_or(usize::MAX),
            RetryLimit::Unbounded => usize::MAX,
        }
    }

    /// Raw count in the configuration encoding, zero meaning unbounded.
    pub fn as_count(&self) -> i64 {
        match self {
            RetryLimit::Bounded(retries) => i64::from(retries.get()),
            RetryLimit::Unbounded => 0,
        }
    }
}

impl fmt::Display for RetryLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryLimit::Bounded(retries) => write!(f, "{retries}"),
            RetryLimit::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Parses a retry override from the command line or environment.
pub fn parse_retry_override(value: &str) -> Result<RetryLimit> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("unbounded") {
        return Ok(RetryLimit::Unbounded);
    }

    if let Ok(count) = trimmed.parse::<i64>() {
        return Ok(RetryLimit::from_count(count));
    }

    Err(DsLockError::InvalidRetryCount(format!(
        "Retry value '{trimmed}' is invalid. Use an integer or the word 'unbounded'."
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_counts_are_unbounded() {
        assert_eq!(RetryLimit::from_count(0), RetryLimit::Unbounded);
        assert_eq!(RetryLimit::from_count(-5), RetryLimit::Unbounded);
        assert_eq!(RetryLimit::bounded(0), RetryLimit::Unbounded);
    }

    #[test]
    fn positive_counts_are_bounded() {
        let limit = RetryLimit::from_count(3);
        assert_eq!(limit, RetryLimit::bounded(3));
        assert_eq!(limit.max_attempts(), Some(4));
        assert_eq!(limit.max_waits(), 3);
        assert_eq!(limit.as_count(), 3);
    }

    #[test]
    fn oversized_counts_clamp() {
        let limit = RetryLimit::from_count(i64::MAX);
        assert_eq!(limit, RetryLimit::bounded(u32::MAX));
    }

    #[test]
    fn unbounded_has_no_attempt_ceiling() {
        assert_eq!(RetryLimit::Unbounded.max_attempts(), None);
        assert_eq!(RetryLimit::Unbounded.as_count(), 0);
        assert!(RetryLimit::default().is_unbounded());
    }

    #[test]
    fn parse_overrides() {
        assert_eq!(parse_retry_override("5").unwrap(), RetryLimit::bounded(5));
        assert_eq!(parse_retry_override("0").unwrap(), RetryLimit::Unbounded);
        assert_eq!(
            parse_retry_override("Unbounded").unwrap(),
            RetryLimit::Unbounded
        );
        let err = parse_retry_override("often").unwrap_err();
        assert!(err.to_string().contains("'unbounded'"));
    }

    #[test]
    fn display_labels() {
        assert_eq!(RetryLimit::bounded(2).to_string(), "2");
        assert_eq!(RetryLimit::Unbounded.to_string(), "unbounded");
    }
}
