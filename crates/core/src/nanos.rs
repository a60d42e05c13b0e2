// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! A `UnixNanos` type for working with timestamps in nanoseconds since the UNIX epoch.
//!
//! Command enqueue times, rate-window send times and persisted counter records are all
//! expressed as [`UnixNanos`]. Millisecond helpers are provided because exchange timeouts
//! and rate windows are configured in milliseconds.
//!
//! # Limitations
//!
//! * Negative timestamps are not representable.
//! * Adding durations saturates at [`UnixNanos::max`], subtracting saturates at zero.

use std::{
    fmt::Display,
    ops::{Add, AddAssign, Sub},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::datetime::NANOSECONDS_IN_MILLISECOND;

/// Represents a duration in nanoseconds.
pub type DurationNanos = u64;

/// Represents a timestamp in nanoseconds since the UNIX epoch.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnixNanos(u64);

impl UnixNanos {
    /// Creates a new [`UnixNanos`] instance.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Creates a new [`UnixNanos`] instance from milliseconds since the UNIX epoch.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(NANOSECONDS_IN_MILLISECOND))
    }

    /// Creates a new [`UnixNanos`] instance with the maximum valid value.
    #[must_use]
    pub const fn max() -> Self {
        Self(u64::MAX)
    }

    /// Returns `true` if the value of this instance is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the underlying value as `u64`.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the value truncated to whole milliseconds.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0 / NANOSECONDS_IN_MILLISECOND
    }

    /// Converts the underlying value to a datetime (UTC).
    ///
    /// Values beyond `i64::MAX` (approximately year 2262) are clamped.
    #[must_use]
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        let nanos = i64::try_from(self.0).unwrap_or(i64::MAX);
        DateTime::from_timestamp_nanos(nanos)
    }

    /// Converts the underlying value to an ISO 8601 (RFC 3339) string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.to_datetime_utc().to_rfc3339()
    }

    /// Calculates the duration in nanoseconds since another [`UnixNanos`] instance.
    ///
    /// Returns `None` if `other` is later than `self`.
    #[must_use]
    pub const fn duration_since(&self, other: &Self) -> Option<DurationNanos> {
        self.0.checked_sub(other.0)
    }

    /// Returns the absolute distance between two timestamps in whole milliseconds.
    ///
    /// The order of the operands does not matter, which tolerates a caller clock
    /// that is slightly behind a recorded timestamp.
    #[must_use]
    pub const fn abs_diff_millis(&self, other: &Self) -> u64 {
        self.0.abs_diff(other.0) / NANOSECONDS_IN_MILLISECOND
    }

    /// Returns this timestamp shifted forward by `millis`, saturating at the maximum.
    #[must_use]
    pub const fn add_millis(&self, millis: u64) -> Self {
        Self(
            self.0
                .saturating_add(millis.saturating_mul(NANOSECONDS_IN_MILLISECOND)),
        )
    }

    /// Returns this timestamp shifted backward by `millis`, saturating at zero.
    #[must_use]
    pub const fn sub_millis(&self, millis: u64) -> Self {
        Self(
            self.0
                .saturating_sub(millis.saturating_mul(NANOSECONDS_IN_MILLISECOND)),
        )
    }
}

impl From<u64> for UnixNanos {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<UnixNanos> for u64 {
    fn from(value: UnixNanos) -> Self {
        value.0
    }
}

impl Add<DurationNanos> for UnixNanos {
    type Output = Self;

    fn add(self, rhs: DurationNanos) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl AddAssign<DurationNanos> for UnixNanos {
    fn add_assign(&mut self, rhs: DurationNanos) {
        self.0 = self.0.saturating_add(rhs);
    }
}

impl Sub<DurationNanos> for UnixNanos {
    type Output = Self;

    fn sub(self, rhs: DurationNanos) -> Self::Output {
        Self(self.0.saturating_sub(rhs))
    }
}

impl Display for UnixNanos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_new_and_accessors() {
        let nanos = UnixNanos::new(1_500_000_000);
        assert_eq!(nanos.as_u64(), 1_500_000_000);
        assert_eq!(nanos.as_millis(), 1_500);
        assert!(!nanos.is_zero());
        assert!(UnixNanos::default().is_zero());
    }

    #[rstest]
    fn test_from_millis() {
        assert_eq!(UnixNanos::from_millis(1_500), UnixNanos::new(1_500_000_000));
        assert_eq!(UnixNanos::from_millis(u64::MAX), UnixNanos::max());
    }

    #[rstest]
    #[case(1_000, 4_000, 3)]
    #[case(4_000, 1_000, 3)]
    #[case(5_000, 5_000, 0)]
    fn test_abs_diff_millis(#[case] a_ms: u64, #[case] b_ms: u64, #[case] expected: u64) {
        let a = UnixNanos::from_millis(a_ms);
        let b = UnixNanos::from_millis(b_ms);
        assert_eq!(a.abs_diff_millis(&b), expected);
    }

    #[rstest]
    fn test_abs_diff_millis_truncates_sub_millisecond() {
        let a = UnixNanos::new(0);
        let b = UnixNanos::new(1_999_999);
        assert_eq!(a.abs_diff_millis(&b), 1);
    }

    #[rstest]
    fn test_duration_since() {
        let earlier = UnixNanos::new(100);
        let later = UnixNanos::new(250);
        assert_eq!(later.duration_since(&earlier), Some(150));
        assert_eq!(earlier.duration_since(&later), None);
    }

    #[rstest]
    fn test_add_and_sub_millis_saturate() {
        let ts = UnixNanos::from_millis(10);
        assert_eq!(ts.add_millis(5), UnixNanos::from_millis(15));
        assert_eq!(ts.sub_millis(5), UnixNanos::from_millis(5));
        assert_eq!(ts.sub_millis(50), UnixNanos::default());
        assert_eq!(UnixNanos::max().add_millis(1), UnixNanos::max());
    }

    #[rstest]
    fn test_arithmetic_operators() {
        let mut ts = UnixNanos::new(10);
        assert_eq!(ts + 5, UnixNanos::new(15));
        assert_eq!(ts - 20, UnixNanos::new(0));
        ts += 7;
        assert_eq!(ts, UnixNanos::new(17));
    }

    #[rstest]
    fn test_to_rfc3339() {
        let ts = UnixNanos::new(1_700_000_000_000_000_000);
        assert_eq!(ts.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[rstest]
    fn test_serde_is_transparent() {
        let ts = UnixNanos::new(42);
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "42");
        let parsed: UnixNanos = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ts);
    }
}
