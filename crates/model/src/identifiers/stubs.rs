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

//! Fixture functions to provide stub identifiers for testing.

use rstest::fixture;

use crate::identifiers::{BatchId, InstrumentCode, MarketId, WorkerTag};

// ---- MarketId ----

#[fixture]
pub fn market_sh() -> MarketId {
    MarketId::from("SH")
}

#[fixture]
pub fn market_sz() -> MarketId {
    MarketId::from("SZ")
}

// ---- InstrumentCode ----

#[fixture]
pub fn code_600000_sh() -> InstrumentCode {
    InstrumentCode::from("600000.SH")
}

#[fixture]
pub fn code_000001_sz() -> InstrumentCode {
    InstrumentCode::from("000001.SZ")
}

// ---- BatchId ----

#[fixture]
pub fn batch_id_sh_11() -> BatchId {
    BatchId::from("SH-11-000001")
}

// ---- WorkerTag ----

#[fixture]
pub fn worker_tag() -> WorkerTag {
    WorkerTag::new(1)
}
