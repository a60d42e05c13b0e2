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

//! Core foundational types and utilities for the flowgate broker middleware.
//!
//! The `flowgate-core` crate is deliberately small. It supplies the building blocks shared by
//! every other crate in the workspace:
//!
//! - A strongly-typed UNIX nanosecond timestamp ([`UnixNanos`]).
//! - Time unit constants, conversions and exchange trading-day derivation.
//! - Correctness validation functions used when building configurations.
//!
//! All scheduling decisions in the workspace are a pure function of a caller supplied
//! [`UnixNanos`], so nothing in this crate reads the wall clock except
//! [`datetime::unix_nanos_now`].

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod correctness;
pub mod datetime;
pub mod nanos;

// Re-exports
pub use crate::nanos::{DurationNanos, UnixNanos};
