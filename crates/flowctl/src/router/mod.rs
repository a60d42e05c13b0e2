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

//! Provides the `FlowControlRouter`, the single entry and exit point of the flow-control layer.


use std::{fmt::Debug, time::Duration};

use flowgate_common::clock::Clock;
use flowgate_core::{UnixNanos, datetime::unix_nanos_now};
use flowgate_model::{CommandEnvelope, identifiers::MarketId};
use flowgate_persistence::{CounterStore, InMemoryCounterStore, MmapCounterStore};
use indexmap::IndexMap;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    channel::{CommandSender, InboundCommand, inbound_channel},
    classify::{Classification, classify},
    config::FlowControlConfig,
    notional::{NotionalModel, PriceVolumeNotional},
    passthrough::PassThroughQueue,
    queue::AdmissionQueue,
};

const COMPONENT: &str = "FlowControlRouter";

/// Routes order flow to per-market admission queues and everything else through an
/// unthrottled FIFO.
///
/// `try_pop` polls in a fixed order: the primary phase of every market (in configuration
/// order), then the pass-through queue, then the secondary phase of every market.
pub struct FlowControlRouter {
    config: FlowControlConfig,
    queues: IndexMap<MarketId, AdmissionQueue>,
    passthrough: PassThroughQueue,
    store: Box<dyn CounterStore>,
    notional_model: Box<dyn NotionalModel>,
    sender: CommandSender,
    rx: UnboundedReceiver<InboundCommand>,
}

impl Debug for FlowControlRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(FlowControlRouter))
            .field("markets", &self.queues.keys().collect::<Vec<_>>())
            .field("passthrough_len", &self.passthrough.len())
            .field("store", &self.store)
            .field("notional_model", &self.notional_model)
            .finish()
    }
}

impl FlowControlRouter {
    /// Creates a new [`FlowControlRouter`] instance, restoring today's daily counts from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn new(config: FlowControlConfig, store: Box<dyn CounterStore>) -> anyhow::Result<Self> {
        Self::new_at(config, store, unix_nanos_now())
    }

    /// Creates a new [`FlowControlRouter`] instance, restoring the daily counts of the trading
    /// day containing `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn new_at(
        config: FlowControlConfig,
        mut store: Box<dyn CounterStore>,
        now: UnixNanos,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        let mut queues = IndexMap::with_capacity(config.markets.len());
        for market_config in config.markets.iter().filter(|m| m.enabled) {
            let mut queue = AdmissionQueue::new(market_config, config.window_ms);
            let count = store.restore(
                market_config.market,
                now,
                config.trading_day_utc_offset_secs,
            );
            queue.set_daily_sent_count(count);
            queues.insert(market_config.market, queue);
        }

        log::info!(
            component = COMPONENT;
            "Flow controlling {} market(s): {:?}",
            queues.len(),
            queues.keys().collect::<Vec<_>>(),
        );

        let (sender, rx) = inbound_channel();
        Ok(Self {
            config,
            queues,
            passthrough: PassThroughQueue::new(),
            store,
            notional_model: Box::new(PriceVolumeNotional),
            sender,
            rx,
        })
    }

    /// Creates a new [`FlowControlRouter`] instance, persisting daily counts to the configured
    /// `state_path` or keeping them in memory when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter file cannot be opened or `config` is invalid.
    pub fn from_config(config: FlowControlConfig) -> anyhow::Result<Self> {
        let store: Box<dyn CounterStore> = match &config.state_path {
            Some(path) => Box::new(MmapCounterStore::open(path)?),
            None => Box::new(InMemoryCounterStore::new()),
        };
        Self::new(config, store)
    }

    /// Sets the model used to rank orders within a priority tier.
    #[must_use]
    pub fn with_notional_model(mut self, model: Box<dyn NotionalModel>) -> Self {
        self.notional_model = model;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &FlowControlConfig {
        &self.config
    }

    /// Returns a sender other threads can use to hand commands to this router.
    #[must_use]
    pub fn sender(&self) -> CommandSender {
        self.sender.clone()
    }

    /// Returns the flow-controlled markets in polling order.
    pub fn markets(&self) -> impl Iterator<Item = MarketId> + '_ {
        self.queues.keys().copied()
    }

    #[must_use]
    pub fn queue(&self, market: &MarketId) -> Option<&AdmissionQueue> {
        self.queues.get(market)
    }

    /// Routes `envelope`, accepted at `ts_accepted`.
    pub fn push(&mut self, envelope: CommandEnvelope, ts_accepted: UnixNanos) {
        let class = match classify(&envelope, self.notional_model.as_ref()) {
            Classification::FlowControlled(class) => class,
            Classification::PassThrough => {
                self.passthrough.push(envelope);
                return;
            }
        };

        let Some(queue) = self.queues.get_mut(&class.market) else {
            log::trace!(
                component = COMPONENT;
                "No flow control for {}, passing through request {}",
                class.market,
                envelope.request_id,
            );
            self.passthrough.push(envelope);
            return;
        };

        let budget_ms = queue.timeout_budget_ms(class.request_timeout_ms);
        queue.push(class.into_item(envelope, budget_ms, ts_accepted));
    }

    /// Returns the next admitted command or rejection response at `now`, if any.
    pub fn try_pop(&mut self, now: UnixNanos) -> Option<CommandEnvelope> {
        self.drain_inbound();

        for (market, queue) in &mut self.queues {
            let sent_before = queue.daily_sent_count();
            if let Some(envelope) = queue.try_pop_primary(now) {
                let sent = queue.daily_sent_count();
                if sent != sent_before {
                    self.store.record(*market, sent, now);
                }
                return Some(envelope);
            }
        }

        if let Some(envelope) = self.passthrough.pop() {
            return Some(envelope);
        }

        self.queues
            .values_mut()
            .find_map(|queue| queue.try_pop_secondary(now))
    }

    /// Polls until a command is available, reading time from `clock`.
    ///
    /// Sleeps `idle_sleep_us` between unsuccessful polls, or spins when it is zero.
    pub fn pop(&mut self, clock: &dyn Clock) -> CommandEnvelope {
        let idle_sleep = Duration::from_micros(self.config.idle_sleep_us);
        loop {
            if let Some(envelope) = self.try_pop(clock.timestamp_ns()) {
                return envelope;
            }
            if idle_sleep.is_zero() {
                std::hint::spin_loop();
            } else {
                std::thread::sleep(idle_sleep);
            }
        }
    }

    /// Returns the total sub-commands pending across markets.
    #[must_use]
    pub fn pending_depth(&self) -> u64 {
        self.queues
            .values()
            .map(AdmissionQueue::pending_sub_command_count)
            .sum()
    }

    #[must_use]
    pub fn pending_depth_for(&self, market: &MarketId) -> Option<u64> {
        self.queues
            .get(market)
            .map(AdmissionQueue::pending_sub_command_count)
    }

    /// Returns the total sub-commands released today across markets.
    #[must_use]
    pub fn total_released_today(&self) -> u64 {
        self.queues
            .values()
            .map(AdmissionQueue::daily_sent_count)
            .sum()
    }

    #[must_use]
    pub fn released_today_for(&self, market: &MarketId) -> Option<u64> {
        self.queues.get(market).map(AdmissionQueue::daily_sent_count)
    }

    #[must_use]
    pub fn passthrough_len(&self) -> usize {
        self.passthrough.len()
    }

    /// Returns the first pending operator warning across markets, naming `node_name`.
    pub fn drain_warnings(&mut self, node_name: &str) -> Option<String> {
        self.queues
            .values_mut()
            .find_map(|queue| queue.drain_warning(node_name))
    }

    fn drain_inbound(&mut self) {
        while let Ok(command) = self.rx.try_recv() {
            self.push(command.envelope, command.ts_accepted);
        }
    }
}
