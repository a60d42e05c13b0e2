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

//! The command domain model for the flowgate broker middleware.
//!
//! Commands cross the process boundary as a [`CommandEnvelope`]: a function-kind tag, the
//! originating worker tag, a request ID and a fixed-layout little-endian payload. This crate
//! owns the explicit decode/encode step at that boundary so the rest of the workspace only
//! ever handles owned, typed values:
//!
//! - [`identifiers`]: market, instrument code, batch and worker identifiers.
//! - [`enums`]: function kinds, order sides and flow-control priority tiers.
//! - [`orders`] and [`withdraw`]: typed payloads and their fixed layouts.
//! - [`response`]: the pure request-to-response transformation used for rejections.
//!
//! # Feature flags
//!
//! - `stubs`: Enables `rstest` fixtures and envelope builders for use in downstream tests.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod codec;
pub mod envelope;
pub mod enums;
pub mod identifiers;
pub mod orders;
pub mod response;
pub mod withdraw;

#[cfg(any(test, feature = "stubs"))]
pub mod stubs;

// Re-exports
pub use crate::{
    codec::CodecError,
    envelope::{Command, CommandEnvelope},
    response::to_response,
};
