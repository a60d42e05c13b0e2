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

//! The scheduling unit held by an admission queue.

use std::cmp::Ordering;

use flowgate_core::{UnixNanos, datetime::MILLISECONDS_IN_SECOND};
use flowgate_model::{CommandEnvelope, enums::FlowPriority};
use rust_decimal::Decimal;

/// The scale separating priority tiers in a composite sort key.
pub const SORT_KEY_PRIORITY_SCALE: u64 = 100_000_000;

/// The shape of the request an item wraps, which selects the wording of a push-time rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandShape {
    Single,
    BatchOrder,
    BatchWithdraw,
}

/// The outcome of evaluating an item against its timeout budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeoutVerdict {
    /// The item may still be released.
    Live,
    /// The item has already waited its whole budget.
    Expired { waited_ms: u64, budget_ms: u64 },
    /// The item will exceed its budget before the commands ahead of it drain.
    Predicted { predicted_ms: u64, budget_ms: u64 },
}

/// Returns the effective timeout budget in milliseconds (0 = never times out).
///
/// A market timeout of 0 disables timeouts for the whole market. A request timeout of 0 means
/// the request carries no deadline of its own, so the market timeout applies.
#[must_use]
pub fn effective_timeout_budget(request_timeout_ms: u64, market_timeout_ms: u64) -> u64 {
    match (request_timeout_ms, market_timeout_ms) {
        (_, 0) => 0,
        (0, market) => market,
        (request, market) => request.min(market),
    }
}

/// One enqueued command and the metadata needed to rank and expire it.
#[derive(Clone, Debug)]
pub struct FlowControlItem {
    /// When the command was accepted.
    pub enqueue_time: UnixNanos,
    pub priority: FlowPriority,
    /// The number of atomic exchange commands represented.
    pub sub_command_count: u32,
    pub notional: Decimal,
    /// The deadline in milliseconds (0 = never times out).
    pub timeout_budget_ms: u64,
    pub shape: CommandShape,
    pub envelope: CommandEnvelope,
}

impl FlowControlItem {
    /// Creates a new [`FlowControlItem`] instance.
    #[must_use]
    pub const fn new(
        envelope: CommandEnvelope,
        priority: FlowPriority,
        sub_command_count: u32,
        notional: Decimal,
        timeout_budget_ms: u64,
        shape: CommandShape,
        enqueue_time: UnixNanos,
    ) -> Self {
        Self {
            enqueue_time,
            priority,
            sub_command_count,
            notional,
            timeout_budget_ms,
            shape,
            envelope,
        }
    }

    /// Returns the composite sort key `priority × 10^8 + notional`.
    #[must_use]
    pub fn sort_key(&self) -> Decimal {
        Decimal::from(self.priority.weight() * SORT_KEY_PRIORITY_SCALE) + self.notional
    }

    /// Compares release precedence: priority tier first, then notional amount.
    ///
    /// Equivalent to comparing [`Self::sort_key`] while notional amounts stay below the tier
    /// scale, and keeps tiers separated beyond it.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.notional.cmp(&other.notional))
    }

    /// Evaluates the item at `now` with `ahead_count` commands ranked ahead of it.
    ///
    /// Cancels never time out. Otherwise the item expires once it has waited its budget, or
    /// once its wait plus one second per `tps_limit` commands ahead would reach the budget.
    #[must_use]
    pub fn timeout_verdict(
        &self,
        now: UnixNanos,
        ahead_count: u64,
        tps_limit: u32,
    ) -> TimeoutVerdict {
        let budget_ms = self.timeout_budget_ms;
        if budget_ms == 0 || self.priority == FlowPriority::Withdraw {
            return TimeoutVerdict::Live;
        }

        let waited_ms = now.abs_diff_millis(&self.enqueue_time);
        if waited_ms >= budget_ms {
            return TimeoutVerdict::Expired {
                waited_ms,
                budget_ms,
            };
        }

        if ahead_count > 0 && tps_limit > 0 {
            let queued_ms = (ahead_count / u64::from(tps_limit)) * MILLISECONDS_IN_SECOND;
            let predicted_ms = waited_ms.saturating_add(queued_ms);
            if predicted_ms >= budget_ms {
                return TimeoutVerdict::Predicted {
                    predicted_ms,
                    budget_ms,
                };
            }
        }
        TimeoutVerdict::Live
    }
}
