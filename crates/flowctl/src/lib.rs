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

//! Per-market admission control and priority scheduling for the flowgate broker middleware.
//!
//! The [`router::FlowControlRouter`] accepts every command bound for the exchange gateway and
//! decides what to release next:
//!
//! - Order and cancel traffic for a configured market is scheduled on that market's
//!   [`queue::AdmissionQueue`], which keeps releases under the exchange rate limit, ranks
//!   cancels above create/redeem above ordinary orders, enforces daily limits and fails
//!   requests that have waited (or will wait) past their timeout.
//! - Everything else flows through an unthrottled [`passthrough::PassThroughQueue`].
//!
//! Rejections never surface as Rust errors across the push/pop boundary: the caller always
//! receives either the admitted command or a response envelope carrying the error text.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod channel;
pub mod classify;
pub mod config;
pub mod error;
pub mod item;
pub mod notional;
pub mod passthrough;
pub mod queue;
pub mod router;

// Re-exports
pub use crate::{
    channel::{CommandSender, InboundCommand},
    config::{FlowControlConfig, MarketFlowConfig},
    error::RejectReason,
    item::{CommandShape, FlowControlItem},
    notional::{NotionalModel, PriceVolumeNotional},
    queue::AdmissionQueue,
    router::FlowControlRouter,
};
