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

//! Real-time and static `Clock` implementations.
//!
//! The flow-control engine never reads wall-clock time itself: every scheduling decision is a
//! function of the timestamp a [`Clock`] hands it, so tests drive a [`TestClock`] and get the
//! exact decisions production would make at the same instants.

use std::{
    fmt::Debug,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Utc};
use flowgate_core::{
    UnixNanos,
    datetime::{NANOSECONDS_IN_MICROSECOND, NANOSECONDS_IN_MILLISECOND, unix_nanos_now},
};

/// Represents a type of clock.
///
/// Implementations are `Send + Sync` so one clock can be shared between the producer and
/// consumer threads.
pub trait Clock: Debug + Send + Sync {
    /// Returns the current date and time as a timezone-aware `DateTime<UTC>`.
    fn utc_now(&self) -> DateTime<Utc> {
        self.timestamp_ns().to_datetime_utc()
    }

    /// Returns the current UNIX timestamp in nanoseconds (ns).
    fn timestamp_ns(&self) -> UnixNanos;

    /// Returns the current UNIX timestamp in microseconds (μs).
    fn timestamp_us(&self) -> u64 {
        self.timestamp_ns().as_u64() / NANOSECONDS_IN_MICROSECOND
    }

    /// Returns the current UNIX timestamp in milliseconds (ms).
    fn timestamp_ms(&self) -> u64 {
        self.timestamp_ns().as_u64() / NANOSECONDS_IN_MILLISECOND
    }
}

/// A static test clock.
///
/// Stores the current timestamp internally which can be set or advanced explicitly.
#[derive(Debug, Default)]
pub struct TestClock {
    time: AtomicU64,
}

impl TestClock {
    /// Creates a new [`TestClock`] instance at the UNIX epoch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            time: AtomicU64::new(0),
        }
    }

    /// Creates a new [`TestClock`] instance at `time_ns`.
    #[must_use]
    pub const fn at(time_ns: UnixNanos) -> Self {
        Self {
            time: AtomicU64::new(time_ns.as_u64()),
        }
    }

    /// Sets the clock to `to_time_ns`.
    pub fn set_time(&self, to_time_ns: UnixNanos) {
        self.time.store(to_time_ns.as_u64(), Ordering::SeqCst);
    }

    /// Advances the clock by `millis`, returning the new time.
    pub fn advance_millis(&self, millis: u64) -> UnixNanos {
        let delta = millis.saturating_mul(NANOSECONDS_IN_MILLISECOND);
        let previous = self
            .time
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(delta))
            })
            .unwrap_or_else(|t| t);
        UnixNanos::new(previous.saturating_add(delta))
    }
}

impl Clock for TestClock {
    fn timestamp_ns(&self) -> UnixNanos {
        UnixNanos::new(self.time.load(Ordering::SeqCst))
    }
}

/// A real-time clock which uses system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveClock;

impl LiveClock {
    /// Creates a new [`LiveClock`] instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for LiveClock {
    fn timestamp_ns(&self) -> UnixNanos {
        unix_nanos_now()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn test_clock() -> TestClock {
        TestClock::new()
    }

    #[rstest]
    fn test_set_time(test_clock: TestClock) {
        assert_eq!(test_clock.timestamp_ns(), UnixNanos::default());
        test_clock.set_time(UnixNanos::from_millis(1_500));
        assert_eq!(test_clock.timestamp_ms(), 1_500);
        assert_eq!(test_clock.timestamp_us(), 1_500_000);
    }

    #[rstest]
    fn test_advance_millis(test_clock: TestClock) {
        assert_eq!(test_clock.advance_millis(250), UnixNanos::from_millis(250));
        assert_eq!(test_clock.advance_millis(250), UnixNanos::from_millis(500));
        assert_eq!(test_clock.timestamp_ns(), UnixNanos::from_millis(500));
    }

    #[rstest]
    fn test_shared_between_threads() {
        let clock = Arc::new(TestClock::at(UnixNanos::from_millis(10)));
        let writer = Arc::clone(&clock);
        std::thread::spawn(move || writer.set_time(UnixNanos::from_millis(20)))
            .join()
            .unwrap();
        assert_eq!(clock.timestamp_ms(), 20);
    }

    #[rstest]
    fn test_utc_now(test_clock: TestClock) {
        test_clock.set_time(UnixNanos::new(1_650_000_000_000_000_000));
        assert_eq!(test_clock.utc_now().timestamp(), 1_650_000_000);
    }

    #[rstest]
    fn test_live_clock_is_monotonic_enough() {
        let clock = LiveClock::new();
        let t1 = clock.timestamp_ns();
        let t2 = clock.timestamp_ns();
        assert!(t2 >= t1);
        assert!(t1.as_u64() > 0);
    }
}
