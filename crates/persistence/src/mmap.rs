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

//! A memory-mapped [`CounterStore`].
//!
//! File layout (little-endian):
//!
//! | Offset | Size     | Field                                   |
//! |--------|----------|-----------------------------------------|
//! | 0      | 4        | magic `FGDC`                            |
//! | 4      | 4        | format version                          |
//! | 8      | 4        | slot count                              |
//! | 12     | 4        | reserved                                |
//! | 16     | 24 × 64  | [`CounterRecord`] slots                 |

use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
};

use ahash::AHashMap;
use bytes::{Buf, BufMut};
use flowgate_core::UnixNanos;
use flowgate_model::identifiers::MarketId;
use memmap2::MmapMut;

use crate::counter::{CounterRecord, CounterStore, RECORD_LEN};

/// The magic bytes at the start of a counter file.
pub const COUNTER_FILE_MAGIC: [u8; 4] = *b"FGDC";

/// The counter file format version.
pub const COUNTER_FILE_VERSION: u32 = 1;

/// The length in bytes of the counter file header.
pub const HEADER_LEN: usize = 16;

/// The number of market records a counter file holds.
pub const MAX_MARKET_SLOTS: usize = 64;

/// The total length in bytes of a counter file.
pub const COUNTER_FILE_LEN: usize = HEADER_LEN + MAX_MARKET_SLOTS * RECORD_LEN;

const COMPONENT: &str = "CounterStore";

/// A [`CounterStore`] backed by a memory-mapped file.
///
/// Records are written in place and flushed asynchronously; losing the last write on a crash
/// is accepted.
#[derive(Debug)]
pub struct MmapCounterStore {
    path: PathBuf,
    mmap: MmapMut,
    slots: AHashMap<MarketId, usize>,
    _file: File,
}

impl MmapCounterStore {
    /// Opens the counter file at `path`, creating and initializing it when absent or empty.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened, sized or mapped.
    /// - An existing file has the wrong length, magic, version or slot count.
    /// - A slot holds an invalid or duplicate market ID.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let len = file.metadata()?.len();
        let is_new = len == 0;
        if is_new {
            file.set_len(COUNTER_FILE_LEN as u64)?;
        } else if len != COUNTER_FILE_LEN as u64 {
            anyhow::bail!(
                "Invalid counter file {}: length {len}, expected {COUNTER_FILE_LEN}",
                path.display()
            );
        }

        // SAFETY: The file is opened read-write by this process and sized above; the mapping
        // is only accessed through `&mut self`. Concurrent modification by another process
        // is outside the supported deployment.
        #[allow(unsafe_code)]
        let mut mmap = unsafe { MmapMut::map_mut(&file)? };

        if is_new {
            write_header(&mut mmap[..HEADER_LEN]);
            mmap.flush()?;
        } else {
            check_header(&mmap[..HEADER_LEN])?;
        }

        let mut slots = AHashMap::new();
        for index in 0..MAX_MARKET_SLOTS {
            let record = CounterRecord::decode(slot_bytes(&mmap, index))?;
            if let Some(market) = record.market {
                if slots.insert(market, index).is_some() {
                    anyhow::bail!("Invalid counter file: duplicate record for market {market}");
                }
            }
        }

        log::info!(
            component = COMPONENT;
            "Opened {} with {} market record(s)",
            path.display(),
            slots.len(),
        );

        Ok(Self {
            path,
            mmap,
            slots,
            _file: file,
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the record stored for `market`, if any.
    #[must_use]
    pub fn get(&self, market: &MarketId) -> Option<CounterRecord> {
        let index = *self.slots.get(market)?;
        CounterRecord::decode(slot_bytes(&self.mmap, index)).ok()
    }

    fn slot_for(&mut self, market: MarketId) -> Option<usize> {
        if let Some(index) = self.slots.get(&market) {
            return Some(*index);
        }
        let index = (0..MAX_MARKET_SLOTS).find(|i| !self.slots.values().any(|used| used == i))?;
        self.slots.insert(market, index);
        Some(index)
    }
}

impl CounterStore for MmapCounterStore {
    fn restore(&mut self, market: MarketId, now: UnixNanos, utc_offset_secs: i32) -> u64 {
        let Some(record) = self.get(&market) else {
            return 0;
        };
        let count = record.count_for_day(now, utc_offset_secs);
        if count == 0 && record.count > 0 {
            log::info!(
                component = COMPONENT;
                "Discarded {market} count {} from previous trading day ({})",
                record.count,
                record.ts_last,
            );
        }
        count
    }

    fn record(&mut self, market: MarketId, count: u64, now: UnixNanos) {
        let Some(index) = self.slot_for(market) else {
            log::error!(
                component = COMPONENT;
                "No free slot to record {market} count {count}, file holds {MAX_MARKET_SLOTS}",
            );
            return;
        };

        let start = HEADER_LEN + index * RECORD_LEN;
        let record = CounterRecord::new(now, market, count);
        record.encode_into(&mut self.mmap[start..start + RECORD_LEN]);

        if let Err(e) = self.mmap.flush_async_range(start, RECORD_LEN) {
            log::error!(
                component = COMPONENT;
                "Failed to flush {market} count {count} to {}: {e}",
                self.path.display(),
            );
        }
    }
}

fn slot_bytes(mmap: &MmapMut, index: usize) -> &[u8] {
    let start = HEADER_LEN + index * RECORD_LEN;
    &mmap[start..start + RECORD_LEN]
}

fn write_header(mut header: &mut [u8]) {
    header.put_slice(&COUNTER_FILE_MAGIC);
    header.put_u32_le(COUNTER_FILE_VERSION);
    header.put_u32_le(MAX_MARKET_SLOTS as u32);
    header.put_u32_le(0);
}

fn check_header(mut header: &[u8]) -> anyhow::Result<()> {
    let mut magic = [0u8; 4];
    header.copy_to_slice(&mut magic);
    anyhow::ensure!(
        magic == COUNTER_FILE_MAGIC,
        "Invalid counter file magic: {magic:?}"
    );

    let version = header.get_u32_le();
    anyhow::ensure!(
        version == COUNTER_FILE_VERSION,
        "Unsupported counter file version: {version}"
    );

    let slots = header.get_u32_le() as usize;
    anyhow::ensure!(
        slots == MAX_MARKET_SLOTS,
        "Invalid counter file slot count: {slots}, expected {MAX_MARKET_SLOTS}"
    );
    Ok(())
}
