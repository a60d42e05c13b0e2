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

//! The per-market admission queue: rate-gated, priority-ordered release with timeout eviction.
//!
//! Each call to [`AdmissionQueue::try_pop`] runs two phases and returns the first result:
//!
//! - **Primary**: the highest ranked pending item is timed out, rejected by the daily hard
//!   limit, released if the rate window has room for all of its sub-commands, or left queued.
//! - **Secondary**: push-time rejections are drained, then the lowest ranked pending item is
//!   evicted if the commands ranked ahead of it would hold it past its timeout.

#[cfg(test)]
mod tests;

use std::collections::VecDeque;

use flowgate_core::{UnixNanos, datetime::millis_to_nanos};
use flowgate_model::{CommandEnvelope, identifiers::MarketId};
use ustr::Ustr;

use crate::{
    config::MarketFlowConfig,
    error::{RejectReason, reject},
    item::{CommandShape, FlowControlItem, TimeoutVerdict, effective_timeout_budget},
};

/// Schedules order-flow commands for a single market.
#[derive(Debug)]
pub struct AdmissionQueue {
    component: Ustr,
    market: MarketId,
    tps_limit: u32,
    daily_warning_threshold: u64,
    daily_hard_limit: u64,
    request_timeout_ms: u64,
    window_ns: u64,
    send_window: VecDeque<UnixNanos>,
    pending: VecDeque<FlowControlItem>,
    rejected: VecDeque<CommandEnvelope>,
    pending_sub_command_count: u64,
    daily_sent_count: u64,
    last_warned_count: u64,
    last_triggered_queue_depth: u64,
    is_dirty: bool,
    is_blocked: bool,
}

impl AdmissionQueue {
    /// Creates a new [`AdmissionQueue`] instance for the market in `config`.
    #[must_use]
    pub fn new(config: &MarketFlowConfig, window_ms: u64) -> Self {
        let component = Ustr::from(&format!("AdmissionQueue[{}]", config.market));
        log::info!(
            component = component.as_str();
            "Created with tps_limit={}, daily_warning_threshold={}, daily_hard_limit={}, \
             request_timeout_ms={}, window_ms={window_ms}",
            config.tps_limit,
            config.daily_warning_threshold,
            config.daily_hard_limit,
            config.request_timeout_ms,
        );

        Self {
            component,
            market: config.market,
            tps_limit: config.tps_limit,
            daily_warning_threshold: config.daily_warning_threshold,
            daily_hard_limit: config.daily_hard_limit,
            request_timeout_ms: config.request_timeout_ms,
            window_ns: millis_to_nanos(window_ms),
            send_window: VecDeque::new(),
            pending: VecDeque::new(),
            rejected: VecDeque::new(),
            pending_sub_command_count: 0,
            daily_sent_count: 0,
            last_warned_count: 0,
            last_triggered_queue_depth: 0,
            is_dirty: false,
            is_blocked: false,
        }
    }

    #[must_use]
    pub const fn market(&self) -> MarketId {
        self.market
    }

    #[must_use]
    pub const fn tps_limit(&self) -> u32 {
        self.tps_limit
    }

    /// Returns the number of pending items.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns the total sub-commands across pending items.
    #[must_use]
    pub const fn pending_sub_command_count(&self) -> u64 {
        self.pending_sub_command_count
    }

    /// Returns the sub-commands released today.
    #[must_use]
    pub const fn daily_sent_count(&self) -> u64 {
        self.daily_sent_count
    }

    /// Returns `true` once a request has been rejected by the daily hard limit.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.is_blocked
    }

    /// Returns `true` if nothing is pending and no rejection is waiting to be drained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.rejected.is_empty()
    }

    /// Returns the number of sub-commands sent within the rate window ending at `now`.
    #[must_use]
    pub fn window_usage(&self, now: UnixNanos) -> u64 {
        let window_ns = self.window_ns;
        self.send_window
            .iter()
            .filter(|ts| ts.as_u64().saturating_add(window_ns) > now.as_u64())
            .count() as u64
    }

    /// Returns the timeout budget for a request carrying `request_timeout_ms`.
    #[must_use]
    pub fn timeout_budget_ms(&self, request_timeout_ms: u64) -> u64 {
        effective_timeout_budget(request_timeout_ms, self.request_timeout_ms)
    }

    /// Sets the daily sent count restored from durable state.
    pub fn set_daily_sent_count(&mut self, count: u64) {
        if count > 0 {
            log::info!(
                component = self.component.as_str();
                "Restored daily sent count {count}",
            );
        }
        self.daily_sent_count = count;
        self.last_warned_count = 0;
        self.is_blocked = false;
    }

    /// Enqueues `item`.
    ///
    /// A request with more sub-commands than the rate limit can never be released; it is
    /// rejected immediately and its response is drained by the secondary phase.
    pub fn push(&mut self, item: FlowControlItem) {
        let count = item.sub_command_count;
        if self.tps_limit > 0 && count > self.tps_limit {
            let (market, limit) = (self.market, self.tps_limit);
            let reason = match item.shape {
                CommandShape::BatchOrder => RejectReason::BatchOrderTooLarge {
                    market,
                    count,
                    limit,
                },
                CommandShape::BatchWithdraw => RejectReason::BatchWithdrawTooLarge {
                    market,
                    count,
                    limit,
                },
                CommandShape::Single => RejectReason::BatchTooLarge {
                    market,
                    count,
                    limit,
                },
            };
            log::warn!(
                component = self.component.as_str();
                "Rejected request {}: {reason}",
                item.envelope.request_id,
            );
            self.rejected.push_back(reject(&item.envelope, &reason));
            return;
        }

        self.pending_sub_command_count += u64::from(count);
        self.pending.push_back(item);
        self.is_dirty = true;
    }

    /// Runs the primary then the secondary phase at `now`.
    pub fn try_pop(&mut self, now: UnixNanos) -> Option<CommandEnvelope> {
        self.try_pop_primary(now)
            .or_else(|| self.try_pop_secondary(now))
    }

    /// Times out, rejects or releases the highest ranked pending item.
    ///
    /// Returns `None` when nothing is pending or the rate window is full.
    pub fn try_pop_primary(&mut self, now: UnixNanos) -> Option<CommandEnvelope> {
        self.sort_pending();
        let head = self.pending.front()?;

        if let Some(reason) = self.timeout_reason(head, now, 0) {
            let item = self.pop_front()?;
            return Some(self.reject_timeout(&item, &reason));
        }

        let count = u64::from(head.sub_command_count);
        if self.daily_hard_limit > 0 && self.daily_sent_count + count > self.daily_hard_limit {
            let item = self.pop_front()?;
            let reason = RejectReason::DailyLimitExceeded {
                market: self.market,
                sent: self.daily_sent_count,
                count: item.sub_command_count,
                limit: self.daily_hard_limit,
            };
            log::warn!(
                component = self.component.as_str();
                "Rejected request {}: {reason}",
                item.envelope.request_id,
            );
            self.last_warned_count = 0;
            self.is_blocked = true;
            return Some(reject(&item.envelope, &reason));
        }

        if self.tps_limit == 0 || self.window_usage(now) + count <= u64::from(self.tps_limit) {
            let item = self.pop_front()?;
            self.record_send(now, item.sub_command_count);
            return Some(item.envelope);
        }

        if self.last_triggered_queue_depth != self.pending_sub_command_count {
            log::debug!(
                component = self.component.as_str();
                "Rate limited, {} sub-command(s) pending",
                self.pending_sub_command_count,
            );
        }
        self.last_triggered_queue_depth = self.pending_sub_command_count;
        None
    }

    /// Drains a push-time rejection, or evicts the lowest ranked pending item if it will time
    /// out behind the items ranked ahead of it.
    pub fn try_pop_secondary(&mut self, now: UnixNanos) -> Option<CommandEnvelope> {
        if let Some(response) = self.rejected.pop_front() {
            return Some(response);
        }

        self.sort_pending();
        let tail = self.pending.back()?;
        let ahead_count = self.pending_sub_command_count - u64::from(tail.sub_command_count);
        let reason = self.timeout_reason(tail, now, ahead_count)?;
        let item = self.pop_back()?;
        Some(self.reject_timeout(&item, &reason))
    }

    /// Returns at most one operator warning, naming `node_name`.
    ///
    /// A newly reached daily threshold (or a hard-limit block) takes precedence over a
    /// rate-limit notice, which is cleared once reported.
    pub fn drain_warning(&mut self, node_name: &str) -> Option<String> {
        let is_threshold_reached = self.daily_warning_threshold > 0
            && self.daily_sent_count >= self.daily_warning_threshold;
        let is_hard_limit_reached =
            self.daily_hard_limit > 0 && self.daily_sent_count >= self.daily_hard_limit;

        if (is_threshold_reached || self.is_blocked)
            && self.last_warned_count != self.daily_sent_count
        {
            self.last_warned_count = self.daily_sent_count;
            let mut warning = format!(
                "{node_name}: {} daily command count reached {}",
                self.market, self.daily_sent_count,
            );
            if is_threshold_reached {
                warning.push_str(&format!(
                    " (warning threshold {})",
                    self.daily_warning_threshold
                ));
            }
            if self.is_blocked || is_hard_limit_reached {
                warning.push_str(&format!(
                    ", trading blocked by daily hard limit {}",
                    self.daily_hard_limit
                ));
            }
            return Some(warning);
        }

        if self.last_triggered_queue_depth > 0 {
            let depth = std::mem::take(&mut self.last_triggered_queue_depth);
            return Some(format!(
                "{node_name}: {} flow control triggered, {depth} sub-command(s) pending",
                self.market,
            ));
        }
        None
    }

    fn sort_pending(&mut self) {
        if self.is_dirty {
            self.pending
                .make_contiguous()
                .sort_by(|a, b| b.rank_cmp(a));
            self.is_dirty = false;
        }
    }

    fn pop_front(&mut self) -> Option<FlowControlItem> {
        let item = self.pending.pop_front()?;
        self.pending_sub_command_count -= u64::from(item.sub_command_count);
        Some(item)
    }

    fn pop_back(&mut self) -> Option<FlowControlItem> {
        let item = self.pending.pop_back()?;
        self.pending_sub_command_count -= u64::from(item.sub_command_count);
        Some(item)
    }

    fn record_send(&mut self, now: UnixNanos, count: u32) {
        let window_ns = self.window_ns;
        self.send_window
            .retain(|ts| ts.as_u64().saturating_add(window_ns) > now.as_u64());
        self.send_window
            .extend(std::iter::repeat_n(now, count as usize));
        self.daily_sent_count += u64::from(count);
    }

    fn timeout_reason(
        &self,
        item: &FlowControlItem,
        now: UnixNanos,
        ahead_count: u64,
    ) -> Option<RejectReason> {
        match item.timeout_verdict(now, ahead_count, self.tps_limit) {
            TimeoutVerdict::Live => None,
            TimeoutVerdict::Expired {
                waited_ms,
                budget_ms,
            } => Some(RejectReason::Timeout {
                market: self.market,
                waited_ms,
                budget_ms,
            }),
            TimeoutVerdict::Predicted {
                predicted_ms,
                budget_ms,
            } => Some(RejectReason::PredictedTimeout {
                market: self.market,
                predicted_ms,
                budget_ms,
            }),
        }
    }

    fn reject_timeout(&self, item: &FlowControlItem, reason: &RejectReason) -> CommandEnvelope {
        log::warn!(
            component = self.component.as_str();
            "Timed out request {}: {reason}",
            item.envelope.request_id,
        );
        reject(&item.envelope, reason)
    }
}
