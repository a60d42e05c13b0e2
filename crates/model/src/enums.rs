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

//! Enumerations for the command domain model.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, FromRepr};

/// The function kind tag carried by every [`CommandEnvelope`](crate::CommandEnvelope).
#[repr(u8)]
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionKind {
    /// A request to place one order, or a batch of orders.
    OrderRequest = 1,
    /// The response to an [`FunctionKind::OrderRequest`].
    OrderResponse = 2,
    /// A request to cancel one order, or a batch of orders.
    WithdrawRequest = 3,
    /// The response to a [`FunctionKind::WithdrawRequest`].
    WithdrawResponse = 4,
    /// A query for account assets.
    QueryAsset = 5,
    /// A query for positions.
    QueryPosition = 6,
    /// A query for order status.
    QueryOrder = 7,
    /// A query for trades.
    QueryTrade = 8,
    /// An internal signal such as a heartbeat.
    InternalSignal = 9,
}

impl FunctionKind {
    /// Returns `true` for order and cancel requests, the traffic subject to exchange rate limits.
    #[must_use]
    pub const fn is_order_flow(&self) -> bool {
        matches!(self, Self::OrderRequest | Self::WithdrawRequest)
    }

    /// Returns `true` if this kind is a response.
    #[must_use]
    pub const fn is_response(&self) -> bool {
        matches!(self, Self::OrderResponse | Self::WithdrawResponse)
    }

    /// Returns the response kind paired with this request kind, if any.
    #[must_use]
    pub const fn response_kind(&self) -> Option<Self> {
        match self {
            Self::OrderRequest => Some(Self::OrderResponse),
            Self::WithdrawRequest => Some(Self::WithdrawResponse),
            _ => None,
        }
    }
}

/// The side of a single order leg.
///
/// `Create` and `Redeem` are fund subscription and redemption commands; they travel as order
/// requests but carry no meaningful price.
#[repr(u8)]
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    /// The order is a BUY.
    Buy = 1,
    /// The order is a SELL.
    Sell = 2,
    /// The order is a fund CREATE (subscription).
    Create = 3,
    /// The order is a fund REDEEM (redemption).
    Redeem = 4,
}

impl OrderSide {
    /// Returns `true` for fund subscription and redemption sides.
    #[must_use]
    pub const fn is_create_or_redeem(&self) -> bool {
        matches!(self, Self::Create | Self::Redeem)
    }
}

/// The release priority class of an order-flow command.
///
/// Cancels always outrank create/redeem, which always outrank ordinary buy/sell traffic.
#[repr(u8)]
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowPriority {
    /// Ordinary buy and sell traffic.
    Other = 1,
    /// Fund subscription and redemption.
    CreateOrRedeem = 2,
    /// Cancels, never timed out.
    Withdraw = 3,
}

impl FlowPriority {
    /// Returns the numeric weight used to build composite sort keys.
    #[must_use]
    pub const fn weight(&self) -> u64 {
        *self as u64
    }
}
