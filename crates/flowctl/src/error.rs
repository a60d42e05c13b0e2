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

//! Rejection reasons produced by admission queues.

use flowgate_model::{CommandEnvelope, identifiers::MarketId, to_response};

/// Why an admission queue answered a request with an error response instead of releasing it.
///
/// The `Display` text is written into the response payload's error field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("Batch order of {count} orders exceeds {market} flow limit of {limit} per window")]
    BatchOrderTooLarge {
        market: MarketId,
        count: u32,
        limit: u32,
    },
    #[error("Batch cancel of {count} orders exceeds {market} flow limit of {limit} per window")]
    BatchWithdrawTooLarge {
        market: MarketId,
        count: u32,
        limit: u32,
    },
    #[error("Request of {count} commands exceeds {market} flow limit of {limit} per window")]
    BatchTooLarge {
        market: MarketId,
        count: u32,
        limit: u32,
    },
    #[error("Daily limit exceeded on {market}: {sent} sent, {count} more would exceed {limit}")]
    DailyLimitExceeded {
        market: MarketId,
        sent: u64,
        count: u32,
        limit: u64,
    },
    #[error("Flow control timeout on {market}: waited {waited_ms}ms, budget {budget_ms}ms")]
    Timeout {
        market: MarketId,
        waited_ms: u64,
        budget_ms: u64,
    },
    #[error(
        "Flow control timeout on {market}: predicted wait {predicted_ms}ms, budget {budget_ms}ms"
    )]
    PredictedTimeout {
        market: MarketId,
        predicted_ms: u64,
        budget_ms: u64,
    },
}

impl RejectReason {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::PredictedTimeout { .. })
    }

    #[must_use]
    pub const fn is_batch_too_large(&self) -> bool {
        matches!(
            self,
            Self::BatchOrderTooLarge { .. }
                | Self::BatchWithdrawTooLarge { .. }
                | Self::BatchTooLarge { .. }
        )
    }
}

/// Builds the error response for `envelope` carrying `reason`.
///
/// Envelopes reaching an admission queue were decoded on push, so building the response does
/// not fail in practice; if it does, the response kind is flipped and the payload is returned
/// unchanged so the request is never forwarded as live.
#[must_use]
pub fn reject(envelope: &CommandEnvelope, reason: &RejectReason) -> CommandEnvelope {
    match to_response(envelope, &reason.to_string()) {
        Ok(response) => response,
        Err(e) => {
            log::error!("Cannot build response for request {}: {e}", envelope.request_id);
            let mut response = envelope.clone();
            if let Some(kind) = envelope.kind.response_kind() {
                response.kind = kind;
            }
            response
        }
    }
}
