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

//! The daily counter storage abstraction and its fixed-size record.

use std::fmt::Debug;

use ahash::AHashMap;
use bytes::{Buf, BufMut};
use flowgate_core::{UnixNanos, datetime::is_same_trading_day};
use flowgate_model::identifiers::{MarketId, market_id::MARKET_ID_MAX_LEN};

/// The encoded length in bytes of a [`CounterRecord`].
pub const RECORD_LEN: usize = 8 + MARKET_ID_MAX_LEN + 8;

/// Durable storage for per-market daily command counters.
///
/// Writes are best effort: a failed write is logged by the implementation and never surfaces
/// to the scheduling path.
pub trait CounterStore: Debug + Send {
    /// Returns the count recorded for `market` on the trading day containing `now`, or 0 when
    /// nothing was recorded that day.
    fn restore(&mut self, market: MarketId, now: UnixNanos, utc_offset_secs: i32) -> u64;

    /// Records `count` as the cumulative daily count for `market` at `now`.
    fn record(&mut self, market: MarketId, count: u64, now: UnixNanos);
}

/// One persisted counter: when it was last written, for which market, and the count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterRecord {
    pub ts_last: UnixNanos,
    pub market: Option<MarketId>,
    pub count: u64,
}

impl CounterRecord {
    /// Creates a new [`CounterRecord`] instance.
    #[must_use]
    pub const fn new(ts_last: UnixNanos, market: MarketId, count: u64) -> Self {
        Self {
            ts_last,
            market: Some(market),
            count,
        }
    }

    /// Returns the count if the record was written on the same trading day as `now`.
    #[must_use]
    pub fn count_for_day(&self, now: UnixNanos, utc_offset_secs: i32) -> u64 {
        if is_same_trading_day(self.ts_last, now, utc_offset_secs) {
            self.count
        } else {
            0
        }
    }

    /// Writes the record into `slot`, which must be [`RECORD_LEN`] bytes long.
    pub fn encode_into(&self, mut slot: &mut [u8]) {
        debug_assert_eq!(slot.len(), RECORD_LEN);
        slot.put_u64_le(self.ts_last.as_u64());
        let market = self.market.as_ref().map_or("", |m| m.as_str()).as_bytes();
        slot.put_slice(market);
        slot.put_bytes(0, MARKET_ID_MAX_LEN - market.len());
        slot.put_u64_le(self.count);
    }

    /// Reads a record from `slot`.
    ///
    /// An empty market field decodes as a vacant record.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot is too short or holds an invalid market ID.
    pub fn decode(mut slot: &[u8]) -> anyhow::Result<Self> {
        anyhow::ensure!(
            slot.len() >= RECORD_LEN,
            "Counter record truncated: {} bytes, expected {RECORD_LEN}",
            slot.len()
        );
        let ts_last = UnixNanos::new(slot.get_u64_le());
        let mut market = [0u8; MARKET_ID_MAX_LEN];
        slot.copy_to_slice(&mut market);
        let count = slot.get_u64_le();

        let end = market.iter().position(|b| *b == 0).unwrap_or(MARKET_ID_MAX_LEN);
        let market = if end == 0 {
            None
        } else {
            let value = std::str::from_utf8(&market[..end])?;
            Some(MarketId::new_checked(value)?)
        };

        Ok(Self {
            ts_last,
            market,
            count,
        })
    }

    #[must_use]
    pub const fn is_vacant(&self) -> bool {
        self.market.is_none()
    }
}

/// A volatile [`CounterStore`] holding records in memory.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    records: AHashMap<MarketId, CounterRecord>,
}

impl InMemoryCounterStore {
    /// Creates a new empty [`InMemoryCounterStore`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with `records`, as if restored from a previous run.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = CounterRecord>) -> Self {
        let records = records
            .into_iter()
            .filter_map(|r| r.market.map(|m| (m, r)))
            .collect();
        Self { records }
    }

    /// Returns the last record written for `market`.
    #[must_use]
    pub fn get(&self, market: &MarketId) -> Option<&CounterRecord> {
        self.records.get(market)
    }
}

impl CounterStore for InMemoryCounterStore {
    fn restore(&mut self, market: MarketId, now: UnixNanos, utc_offset_secs: i32) -> u64 {
        self.records
            .get(&market)
            .map_or(0, |r| r.count_for_day(now, utc_offset_secs))
    }

    fn record(&mut self, market: MarketId, count: u64, now: UnixNanos) {
        self.records
            .insert(market, CounterRecord::new(now, market, count));
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use flowgate_core::datetime::SECONDS_IN_HOUR;
    use flowgate_model::identifiers::stubs::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    const CST: i32 = 8 * SECONDS_IN_HOUR;

    // 2024-03-01T01:30:00Z, 09:30 in UTC+8
    const MORNING: UnixNanos = UnixNanos::new(1_709_256_600_000_000_000);

    #[rstest]
    fn test_record_round_trip(market_sh: MarketId) {
        let record = CounterRecord::new(MORNING, market_sh, 4_200);
        let mut slot = [0u8; RECORD_LEN];
        record.encode_into(&mut slot);
        assert_eq!(CounterRecord::decode(&slot).unwrap(), record);
    }

    #[rstest]
    fn test_zeroed_slot_is_vacant() {
        let record = CounterRecord::decode(&[0u8; RECORD_LEN]).unwrap();
        assert!(record.is_vacant());
        assert_eq!(record.count, 0);
    }

    #[rstest]
    fn test_decode_truncated() {
        assert!(CounterRecord::decode(&[0u8; 10]).is_err());
    }

    #[rstest]
    fn test_restore_same_trading_day(market_sh: MarketId) {
        let mut store = InMemoryCounterStore::new();
        store.record(market_sh, 17, MORNING);

        // 14:59 local time on the same day
        let afternoon = MORNING.add_millis(5 * 3_600_000 + 29 * 60_000);
        assert_eq!(store.restore(market_sh, afternoon, CST), 17);
    }

    #[rstest]
    fn test_restore_next_trading_day_resets(market_sh: MarketId) {
        let store_records = [CounterRecord::new(MORNING, market_sh, 17)];
        let mut store = InMemoryCounterStore::with_records(store_records);

        let next_day = MORNING.add_millis(24 * 3_600_000);
        assert_eq!(store.restore(market_sh, next_day, CST), 0);
    }

    #[rstest]
    fn test_restore_unknown_market(market_sz: MarketId) {
        let mut store = InMemoryCounterStore::new();
        assert_eq!(store.restore(market_sz, MORNING, CST), 0);
        assert!(store.get(&market_sz).is_none());
    }

    #[rstest]
    fn test_trading_day_follows_offset(market_sh: MarketId) {
        let mut store = InMemoryCounterStore::new();
        // 2024-03-01T15:30:00Z is already 2024-03-01 23:30 in UTC+8
        let late = MORNING.add_millis(14 * 3_600_000);
        store.record(market_sh, 5, late);

        // 2024-03-01T16:30:00Z is 2024-03-02 00:30 in UTC+8, but still 03-01 in UTC
        let after_midnight_local = late.add_millis(3_600_000);
        assert_eq!(store.restore(market_sh, after_midnight_local, CST), 0);
        assert_eq!(store.restore(market_sh, after_midnight_local, 0), 5);
    }
}
