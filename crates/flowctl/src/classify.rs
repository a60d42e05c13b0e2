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

//! Classification of inbound commands into flow-controlled and pass-through traffic.

use flowgate_model::{
    Command, CommandEnvelope,
    enums::FlowPriority,
    identifiers::MarketId,
    orders::OrderRequest,
    withdraw::WithdrawRequest,
};
use flowgate_core::UnixNanos;
use rust_decimal::Decimal;

use crate::{
    item::{CommandShape, FlowControlItem},
    notional::NotionalModel,
};

/// The scheduling attributes of an order or cancel request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowClass {
    pub market: MarketId,
    pub priority: FlowPriority,
    pub sub_command_count: u32,
    pub notional: Decimal,
    /// The timeout carried by the request itself (0 = none).
    pub request_timeout_ms: u64,
    pub shape: CommandShape,
}

impl FlowClass {
    /// Builds the queue item for `envelope` accepted at `enqueue_time`.
    #[must_use]
    pub fn into_item(
        self,
        envelope: CommandEnvelope,
        timeout_budget_ms: u64,
        enqueue_time: UnixNanos,
    ) -> FlowControlItem {
        FlowControlItem::new(
            envelope,
            self.priority,
            self.sub_command_count,
            self.notional,
            timeout_budget_ms,
            self.shape,
            enqueue_time,
        )
    }
}

/// How the router should handle a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Forward without rate limiting.
    PassThrough,
    /// Schedule on the admission queue of the classified market.
    FlowControlled(FlowClass),
}

/// Classifies `envelope`.
///
/// Only order and withdraw requests which decode and name a market are flow controlled.
/// A request whose payload cannot be decoded is logged and passed through unchanged.
#[must_use]
pub fn classify(envelope: &CommandEnvelope, model: &dyn NotionalModel) -> Classification {
    match envelope.decode_command() {
        Ok(Command::Order(request)) => classify_order(&request, model),
        Ok(Command::Withdraw(request)) => classify_withdraw(&request),
        Ok(Command::Other(_)) => Classification::PassThrough,
        Err(e) => {
            log::error!(
                component = "FlowControlRouter";
                "Cannot decode {} payload for request {}, passing through: {e}",
                envelope.kind,
                envelope.request_id,
            );
            Classification::PassThrough
        }
    }
}

fn classify_order(request: &OrderRequest, model: &dyn NotionalModel) -> Classification {
    let (Some(first), Some(market)) = (request.legs.first(), request.market()) else {
        return Classification::PassThrough;
    };

    let priority = if first.side.is_create_or_redeem() {
        FlowPriority::CreateOrRedeem
    } else {
        FlowPriority::Other
    };
    let shape = if request.is_batch() {
        CommandShape::BatchOrder
    } else {
        CommandShape::Single
    };

    Classification::FlowControlled(FlowClass {
        market,
        priority,
        sub_command_count: request.sub_command_count(),
        notional: model.notional(priority, &request.legs),
        request_timeout_ms: u64::from(request.timeout_ms),
        shape,
    })
}

fn classify_withdraw(request: &WithdrawRequest) -> Classification {
    let Some(market) = request.market() else {
        return Classification::PassThrough;
    };

    let shape = if request.is_batch() {
        CommandShape::BatchWithdraw
    } else {
        CommandShape::Single
    };

    Classification::FlowControlled(FlowClass {
        market,
        priority: FlowPriority::Withdraw,
        sub_command_count: request.sub_command_count(),
        notional: Decimal::ZERO,
        request_timeout_ms: u64::from(request.timeout_ms),
        shape,
    })
}
