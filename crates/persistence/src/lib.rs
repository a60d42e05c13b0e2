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

//! Durable daily command counters for the flowgate broker middleware.
//!
//! Each market's cumulative daily command count is kept in a fixed-size record so that a
//! restarted process resumes counting from where it left off within the same trading day:
//!
//! - [`counter::CounterStore`]: the storage abstraction the flow-control router writes through.
//! - [`counter::InMemoryCounterStore`]: a volatile store for tests and stateless deployments.
//! - [`mmap::MmapCounterStore`]: a memory-mapped file store with best-effort durability.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod counter;
pub mod mmap;

// Re-exports
pub use crate::{
    counter::{CounterRecord, CounterStore, InMemoryCounterStore},
    mmap::MmapCounterStore,
};
