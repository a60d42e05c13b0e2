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

//! Common date and time functions.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{FixedOffset, NaiveDate, Offset, SecondsFormat, Utc};

use crate::UnixNanos;

/// Number of milliseconds in one second.
pub const MILLISECONDS_IN_SECOND: u64 = 1_000;

/// Number of nanoseconds in one second.
pub const NANOSECONDS_IN_SECOND: u64 = 1_000_000_000;

/// Number of nanoseconds in one millisecond.
pub const NANOSECONDS_IN_MILLISECOND: u64 = 1_000_000;

/// Number of nanoseconds in one microsecond.
pub const NANOSECONDS_IN_MICROSECOND: u64 = 1_000;

/// Number of seconds in one hour.
pub const SECONDS_IN_HOUR: i32 = 3_600;


/// Converts milliseconds (ms) to nanoseconds (ns), saturating on overflow.
#[must_use]
pub const fn millis_to_nanos(millis: u64) -> u64 {
    millis.saturating_mul(NANOSECONDS_IN_MILLISECOND)
}

/// Converts nanoseconds (ns) to milliseconds (ms).
#[must_use]
pub const fn nanos_to_millis(nanos: u64) -> u64 {
    nanos / NANOSECONDS_IN_MILLISECOND
}

/// Converts a UNIX nanoseconds timestamp to an ISO 8601 (RFC 3339) format string.
#[inline]
#[must_use]
pub fn unix_nanos_to_iso8601(unix_nanos: UnixNanos) -> String {
    let datetime = unix_nanos.to_datetime_utc();
    datetime.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Returns the current wall-clock time as [`UnixNanos`].
///
/// A system clock set before the UNIX epoch yields zero.
#[must_use]
pub fn unix_nanos_now() -> UnixNanos {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));
    UnixNanos::new(nanos)
}

/// Returns the exchange-local calendar date (the trading day) for `ts`.
///
/// `utc_offset_secs` is the exchange's fixed offset from UTC, e.g. `8 * 3600` for
/// Shanghai and Shenzhen. Offsets outside +/- 24h fall back to UTC.
#[must_use]
pub fn trading_day(ts: UnixNanos, utc_offset_secs: i32) -> NaiveDate {
    let offset = FixedOffset::east_opt(utc_offset_secs).unwrap_or_else(|| Utc.fix());
    ts.to_datetime_utc().with_timezone(&offset).date_naive()
}

/// Returns `true` if both timestamps fall on the same exchange-local trading day.
#[must_use]
pub fn is_same_trading_day(a: UnixNanos, b: UnixNanos, utc_offset_secs: i32) -> bool {
    trading_day(a, utc_offset_secs) == trading_day(b, utc_offset_secs)
}
