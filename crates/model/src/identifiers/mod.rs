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

//! Identifiers for the command domain model.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[macro_use]
mod macros;

pub mod batch_id;
pub mod instrument_code;
pub mod market_id;
pub mod worker_tag;

#[cfg(any(test, feature = "stubs"))]
pub mod stubs;

// Re-exports
pub use crate::identifiers::{
    batch_id::BatchId, instrument_code::InstrumentCode, market_id::MarketId, worker_tag::WorkerTag,
};

impl_from_str_for_identifier!(batch_id::BatchId);
impl_from_str_for_identifier!(instrument_code::InstrumentCode);
impl_from_str_for_identifier!(market_id::MarketId);

impl_serialization_for_identifier!(batch_id::BatchId);
impl_serialization_for_identifier!(instrument_code::InstrumentCode);
impl_serialization_for_identifier!(market_id::MarketId);

impl_as_ref_for_identifier!(batch_id::BatchId);
impl_as_ref_for_identifier!(instrument_code::InstrumentCode);
impl_as_ref_for_identifier!(market_id::MarketId);
