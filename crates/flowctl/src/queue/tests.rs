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

use flowgate_core::UnixNanos;
use flowgate_model::{
    CommandEnvelope,
    enums::{FunctionKind, OrderSide},
    identifiers::MarketId,
    stubs::*,
};
use proptest::prelude::*;
use rstest::rstest;

use super::AdmissionQueue;
use crate::{
    classify::{Classification, classify},
    config::MarketFlowConfig,
    notional::PriceVolumeNotional,
};

const T0: UnixNanos = UnixNanos::new(1_700_000_000_000_000_000);
const WINDOW_MS: u64 = 1_500;

fn sh() -> MarketId {
    MarketId::from("SH")
}

fn queue(tps_limit: u32) -> AdmissionQueue {
    AdmissionQueue::new(&MarketFlowConfig::new(sh(), tps_limit), WINDOW_MS)
}

fn enqueue(queue: &mut AdmissionQueue, envelope: CommandEnvelope, now: UnixNanos) {
    let Classification::FlowControlled(class) = classify(&envelope, &PriceVolumeNotional) else {
        panic!("request {} is not flow controlled", envelope.request_id);
    };
    let budget = queue.timeout_budget_ms(class.request_timeout_ms);
    queue.push(class.into_item(envelope, budget, now));
}

fn buy(request_id: u64, price_raw: i64) -> CommandEnvelope {
    order_envelope(request_id, "600000.SH", OrderSide::Buy, price_raw, 100, 0)
}

/// Polls at `now` until nothing is returned, as `(request_id, is_response)` pairs.
fn drain(queue: &mut AdmissionQueue, now: UnixNanos) -> Vec<(u64, bool)> {
    std::iter::from_fn(|| queue.try_pop(now))
        .map(|envelope| (envelope.request_id, envelope.is_response()))
        .collect()
}

fn drain_ids(queue: &mut AdmissionQueue, now: UnixNanos) -> Vec<u64> {
    drain(queue, now).into_iter().map(|(id, _)| id).collect()
}

#[rstest]
fn test_new_queue_is_empty() {
    let mut queue = queue(10);
    assert_eq!(queue.market(), sh());
    assert_eq!(queue.tps_limit(), 10);
    assert!(queue.is_empty());
    assert_eq!(queue.pending_len(), 0);
    assert_eq!(queue.pending_sub_command_count(), 0);
    assert_eq!(queue.daily_sent_count(), 0);
    assert_eq!(queue.window_usage(T0), 0);
    assert!(queue.try_pop(T0).is_none());
    assert!(queue.drain_warning("gw").is_none());
}

#[rstest]
fn test_batch_size_limit_scenario() {
    let mut queue = queue(10);
    enqueue(&mut queue, batch_order_envelope(1, "600000.SH", OrderSide::Buy, 1, 0), T0);
    enqueue(&mut queue, batch_order_envelope(2, "600000.SH", OrderSide::Buy, 10, 0), T0);
    enqueue(&mut queue, batch_order_envelope(3, "600000.SH", OrderSide::Buy, 11, 0), T0);
    enqueue(&mut queue, batch_withdraw_envelope(4, "SH-11-000001"), T0);

    assert_eq!(queue.pending_len(), 2);
    assert_eq!(queue.pending_sub_command_count(), 11);

    let mut polled = drain(&mut queue, T0);
    polled.extend(drain(&mut queue, T0.add_millis(10_000)));

    assert_eq!(polled, vec![(2, false), (3, true), (4, true), (1, false)]);
    assert!(queue.is_empty());
    assert_eq!(queue.daily_sent_count(), 11);
}

#[rstest]
#[case(
    batch_order_envelope(1, "600000.SH", OrderSide::Buy, 4, 0),
    "Batch order of 4 orders exceeds SH flow limit of 3 per window"
)]
#[case(
    batch_withdraw_envelope(2, "SH-4-abc"),
    "Batch cancel of 4 orders exceeds SH flow limit of 3 per window"
)]
fn test_batch_too_large_rejected_at_push(
    #[case] envelope: CommandEnvelope,
    #[case] expected: &str,
) {
    let mut queue = queue(3);
    let response_kind = envelope.kind.response_kind();
    enqueue(&mut queue, envelope, T0);

    assert_eq!(queue.pending_len(), 0);
    assert_eq!(queue.pending_sub_command_count(), 0);
    assert!(!queue.is_empty());

    let response = queue.try_pop(T0).unwrap();
    assert_eq!(Some(response.kind), response_kind);
    assert_eq!(response.error_message().as_deref(), Some(expected));
    assert!(queue.try_pop(T0).is_none());
    assert!(queue.is_empty());
    assert_eq!(queue.daily_sent_count(), 0);
    assert_eq!(queue.window_usage(T0), 0);
}

#[rstest]
fn test_unlimited_rate_admits_any_batch() {
    let mut queue = queue(0);
    enqueue(&mut queue, batch_order_envelope(1, "600000.SH", OrderSide::Sell, 50, 0), T0);
    assert_eq!(drain(&mut queue, T0), vec![(1, false)]);
    assert_eq!(queue.daily_sent_count(), 50);
}

#[rstest]
fn test_burst_releases_limit_per_window() {
    let mut queue = queue(3);
    for request_id in 1..=5 {
        enqueue(&mut queue, buy(request_id, 100_000), T0);
    }

    assert_eq!(drain_ids(&mut queue, T0), vec![1, 2, 3]);
    assert_eq!(queue.window_usage(T0), 3);
    assert!(queue.try_pop(T0.add_millis(WINDOW_MS - 1)).is_none());
    assert_eq!(drain_ids(&mut queue, T0.add_millis(WINDOW_MS)), vec![4, 5]);
    assert_eq!(queue.daily_sent_count(), 5);
}

#[rstest]
fn test_window_releases_as_oldest_send_expires() {
    let mut queue = queue(2);
    let t1 = T0.add_millis(1_000);

    enqueue(&mut queue, buy(1, 100_000), T0);
    assert_eq!(drain_ids(&mut queue, T0), vec![1]);

    enqueue(&mut queue, buy(2, 100_000), t1);
    enqueue(&mut queue, buy(3, 100_000), t1);
    enqueue(&mut queue, buy(4, 100_000), t1);
    assert_eq!(drain_ids(&mut queue, t1), vec![2]);
    assert_eq!(queue.window_usage(t1), 2);

    assert!(queue.try_pop(T0.add_millis(WINDOW_MS - 1)).is_none());
    assert_eq!(drain_ids(&mut queue, T0.add_millis(WINDOW_MS)), vec![3]);
    assert_eq!(queue.send_window.len(), 2);
    assert_eq!(drain_ids(&mut queue, t1.add_millis(WINDOW_MS)), vec![4]);
}

#[rstest]
fn test_window_usage_does_not_prune() {
    let mut queue = queue(5);
    enqueue(&mut queue, batch_order_envelope(1, "600000.SH", OrderSide::Buy, 4, 0), T0);
    assert_eq!(drain_ids(&mut queue, T0), vec![1]);

    assert_eq!(queue.window_usage(T0.add_millis(WINDOW_MS - 1)), 4);
    assert_eq!(queue.window_usage(T0.add_millis(WINDOW_MS)), 0);
    assert_eq!(queue.send_window.len(), 4);
}

#[rstest]
fn test_priority_ordering() {
    let mut queue = queue(0);
    let pushes = [
        buy(3, 10_000),
        order_envelope(4, "600000.SH", OrderSide::Sell, 30_000, 100, 0),
        buy(5, 20_000),
        order_envelope(6, "510300.SH", OrderSide::Create, 0, 1_000, 0),
        buy(7, 10_000),
        order_envelope(8, "600000.SH", OrderSide::Sell, 40_000, 100, 0),
        order_envelope(9, "510300.SH", OrderSide::Redeem, 0, 1_000, 0),
        withdraw_envelope(10, "600000.SH", "ORD-0003"),
    ];
    for envelope in pushes {
        enqueue(&mut queue, envelope, T0);
    }

    assert_eq!(drain_ids(&mut queue, T0), vec![10, 6, 9, 8, 4, 5, 3, 7]);
}

#[rstest]
fn test_cancels_never_time_out() {
    let config = MarketFlowConfig::new(sh(), 1).with_request_timeout_ms(100);
    let mut queue = AdmissionQueue::new(&config, WINDOW_MS);
    for request_id in 1..=3 {
        enqueue(&mut queue, withdraw_envelope(request_id, "600000.SH", "ORD-0001"), T0);
    }
    enqueue(&mut queue, buy(4, 100_000), T0);

    // The buy will wait behind two cancels at one per window
    assert_eq!(drain(&mut queue, T0), vec![(1, false), (4, true)]);
    assert_eq!(drain(&mut queue, T0.add_millis(60_000)), vec![(2, false)]);
    assert_eq!(drain(&mut queue, T0.add_millis(120_000)), vec![(3, false)]);
    assert!(queue.is_empty());
}

#[rstest]
fn test_head_times_out() {
    let config = MarketFlowConfig::new(sh(), 1).with_request_timeout_ms(500);
    let mut queue = AdmissionQueue::new(&config, WINDOW_MS);
    enqueue(&mut queue, buy(1, 100_000), T0);
    enqueue(&mut queue, buy(2, 100_000), T0);

    assert_eq!(drain_ids(&mut queue, T0), vec![1]);
    assert!(queue.try_pop(T0.add_millis(499)).is_none());

    let response = queue.try_pop(T0.add_millis(500)).unwrap();
    assert_eq!(response.request_id, 2);
    assert_eq!(response.kind, FunctionKind::OrderResponse);
    assert_eq!(
        response.error_message().as_deref(),
        Some("Flow control timeout on SH: waited 500ms, budget 500ms")
    );
    assert_eq!(queue.pending_sub_command_count(), 0);
    assert_eq!(queue.daily_sent_count(), 1);
}

#[rstest]
fn test_request_timeout_ignored_when_market_timeout_disabled() {
    let mut queue = queue(1);
    for request_id in 1..=2 {
        enqueue(
            &mut queue,
            order_envelope(request_id, "600000.SH", OrderSide::Buy, 100_000, 100, 500),
            T0,
        );
    }

    assert_eq!(drain(&mut queue, T0), vec![(1, false)]);
    assert!(queue.try_pop(T0.add_millis(600)).is_none());
    assert_eq!(queue.pending_sub_command_count(), 1);
    assert_eq!(drain(&mut queue, T0.add_millis(1_500)), vec![(2, false)]);
}

#[rstest]
fn test_shorter_request_timeout_applies_under_market_timeout() {
    let config = MarketFlowConfig::new(sh(), 1).with_request_timeout_ms(1_000);
    let mut queue = AdmissionQueue::new(&config, WINDOW_MS);
    enqueue(&mut queue, buy(1, 100_000), T0);
    enqueue(
        &mut queue,
        order_envelope(2, "600000.SH", OrderSide::Buy, 100_000, 100, 200),
        T0,
    );

    assert_eq!(drain(&mut queue, T0), vec![(1, false)]);
    assert_eq!(drain(&mut queue, T0.add_millis(200)), vec![(2, true)]);
}

#[rstest]
fn test_tail_evicted_on_predicted_timeout() {
    let config = MarketFlowConfig::new(sh(), 2).with_request_timeout_ms(1_000);
    let mut queue = AdmissionQueue::new(&config, WINDOW_MS);
    for request_id in 1..=5 {
        enqueue(&mut queue, buy(request_id, 100_000), T0);
    }

    let mut responses = Vec::new();
    let polled: Vec<(u64, bool)> = std::iter::from_fn(|| queue.try_pop(T0))
        .inspect(|envelope| {
            if let Some(error) = envelope.error_message() {
                responses.push(error);
            }
        })
        .map(|envelope| (envelope.request_id, envelope.is_response()))
        .collect();

    assert_eq!(polled, vec![(1, false), (2, false), (5, true)]);
    assert_eq!(
        responses,
        vec!["Flow control timeout on SH: predicted wait 1000ms, budget 1000ms".to_string()]
    );
    assert_eq!(queue.pending_sub_command_count(), 2);
    assert_eq!(drain(&mut queue, T0.add_millis(1_000)), vec![(3, true), (4, true)]);
}

#[rstest]
#[case(0, 0, 0)]
#[case(0, 300, 0)]
#[case(500, 0, 500)]
#[case(500, 300, 300)]
#[case(200, 300, 200)]
fn test_timeout_budget(#[case] market_ms: u64, #[case] request_ms: u64, #[case] expected: u64) {
    let config = MarketFlowConfig::new(sh(), 10).with_request_timeout_ms(market_ms);
    let queue = AdmissionQueue::new(&config, WINDOW_MS);
    assert_eq!(queue.timeout_budget_ms(request_ms), expected);
}

#[rstest]
fn test_poll_without_eligible_item_is_idempotent() {
    let mut queue = queue(1);
    enqueue(&mut queue, buy(1, 100_000), T0);
    enqueue(&mut queue, buy(2, 100_000), T0);
    assert_eq!(drain_ids(&mut queue, T0), vec![1]);

    let snapshot = |queue: &AdmissionQueue| {
        (
            queue
                .pending
                .iter()
                .map(|item| item.envelope.request_id)
                .collect::<Vec<_>>(),
            queue.pending_sub_command_count(),
            queue.send_window.clone(),
            queue.daily_sent_count(),
        )
    };

    let before = snapshot(&queue);
    for offset_ms in [0, 10, 1_000, 1_499] {
        assert!(queue.try_pop(T0.add_millis(offset_ms)).is_none());
        assert_eq!(snapshot(&queue), before);
    }
}

#[rstest]
fn test_daily_hard_limit_and_threshold_warnings() {
    let config = MarketFlowConfig::new(sh(), 0).with_daily_limits(3, 5);
    let mut queue = AdmissionQueue::new(&config, WINDOW_MS);
    for request_id in 1..=6 {
        enqueue(&mut queue, buy(request_id, 100_000), T0);
    }
    assert!(queue.drain_warning("gw-01").is_none());

    for _ in 0..3 {
        assert!(!queue.try_pop(T0).unwrap().is_response());
    }
    assert_eq!(
        queue.drain_warning("gw-01").as_deref(),
        Some("gw-01: SH daily command count reached 3 (warning threshold 3)")
    );
    assert!(queue.drain_warning("gw-01").is_none());

    for _ in 0..2 {
        assert!(!queue.try_pop(T0).unwrap().is_response());
    }
    let blocked = "gw-01: SH daily command count reached 5 (warning threshold 3), \
                   trading blocked by daily hard limit 5";
    assert_eq!(queue.drain_warning("gw-01").as_deref(), Some(blocked));
    assert!(queue.drain_warning("gw-01").is_none());

    let rejected = queue.try_pop(T0).unwrap();
    assert_eq!(rejected.request_id, 6);
    assert_eq!(
        rejected.error_message().as_deref(),
        Some("Daily limit exceeded on SH: 5 sent, 1 more would exceed 5")
    );
    assert!(queue.is_blocked());
    assert_eq!(queue.daily_sent_count(), 5);

    // The rejection re-arms the warning
    assert_eq!(queue.drain_warning("gw-01").as_deref(), Some(blocked));
    assert!(queue.drain_warning("gw-01").is_none());
}

#[rstest]
fn test_daily_hard_limit_counts_sub_commands() {
    let config = MarketFlowConfig::new(sh(), 0).with_daily_limits(0, 5);
    let mut queue = AdmissionQueue::new(&config, WINDOW_MS);
    queue.set_daily_sent_count(4);
    enqueue(&mut queue, batch_order_envelope(1, "600000.SH", OrderSide::Buy, 2, 0), T0);
    enqueue(&mut queue, buy(2, 100_000), T0);

    assert_eq!(drain(&mut queue, T0), vec![(1, true), (2, false)]);
    assert!(queue.is_blocked());
    assert_eq!(queue.daily_sent_count(), 5);
    assert_eq!(
        queue.drain_warning("gw").as_deref(),
        Some("gw: SH daily command count reached 5, trading blocked by daily hard limit 5")
    );
}

#[rstest]
fn test_rate_limit_warning() {
    let mut queue = queue(1);
    for request_id in 1..=3 {
        enqueue(&mut queue, buy(request_id, 100_000), T0);
    }
    assert_eq!(drain_ids(&mut queue, T0), vec![1]);

    assert_eq!(
        queue.drain_warning("gw").as_deref(),
        Some("gw: SH flow control triggered, 2 sub-command(s) pending")
    );
    assert!(queue.drain_warning("gw").is_none());
}

#[rstest]
fn test_restored_daily_count_accumulates() {
    let mut queue = queue(10);
    queue.set_daily_sent_count(7);
    enqueue(&mut queue, batch_order_envelope(1, "600000.SH", OrderSide::Buy, 3, 0), T0);
    assert_eq!(drain_ids(&mut queue, T0), vec![1]);
    assert_eq!(queue.daily_sent_count(), 10);
}

#[derive(Clone, Debug)]
enum QueueOp {
    Push { kind: u8, count: u32, timeout_ms: u32 },
    Poll { advance_ms: u64 },
}

fn queue_op_strategy() -> impl Strategy<Value = QueueOp> {
    prop_oneof![
        (0u8..4, 1u32..=15, 0u32..=2_000).prop_map(|(kind, count, timeout_ms)| {
            QueueOp::Push {
                kind,
                count,
                timeout_ms,
            }
        }),
        (0u64..=2_000).prop_map(|advance_ms| QueueOp::Poll { advance_ms }),
    ]
}

fn op_envelope(request_id: u64, kind: u8, count: u32, timeout_ms: u32) -> CommandEnvelope {
    match kind {
        0 => batch_order_envelope(
            request_id,
            "600000.SH",
            OrderSide::Buy,
            count as usize,
            timeout_ms,
        ),
        1 => order_envelope(request_id, "510300.SH", OrderSide::Create, 0, 100, timeout_ms),
        2 => batch_withdraw_envelope(request_id, &format!("SH-{count}-{request_id}")),
        _ => withdraw_envelope(request_id, "600000.SH", "ORD-0001"),
    }
}

/// Returns the tier and notional of a generated push, keyed the way the queue ranks them.
fn ranked_envelope(request_id: u64, tier: u8, price_units: i64) -> (CommandEnvelope, (u8, i64)) {
    match tier {
        2 => (withdraw_envelope(request_id, "600000.SH", "ORD-0001"), (2, 0)),
        1 => (
            order_envelope(request_id, "510300.SH", OrderSide::Create, 0, 100, 0),
            (1, 0),
        ),
        _ => (buy(request_id, price_units * 10_000), (0, price_units)),
    }
}

proptest! {
    #[test]
    fn prop_pending_count_never_drifts(
        tps_limit in 0u32..=10,
        market_timeout_ms in 0u64..=1_500,
        daily_hard_limit in prop_oneof![Just(0u64), 60u64..=200],
        ops in prop::collection::vec(queue_op_strategy(), 1..100),
    ) {
        let config = MarketFlowConfig::new(sh(), tps_limit)
            .with_daily_limits(0, daily_hard_limit)
            .with_request_timeout_ms(market_timeout_ms);
        let mut queue = AdmissionQueue::new(&config, WINDOW_MS);
        let mut now = T0;
        let mut pushed = 0usize;
        let mut returned = 0usize;

        for (request_id, op) in (1u64..).zip(ops) {
            match op {
                QueueOp::Push { kind, count, timeout_ms } => {
                    enqueue(&mut queue, op_envelope(request_id, kind, count, timeout_ms), now);
                    pushed += 1;
                }
                QueueOp::Poll { advance_ms } => {
                    now = now.add_millis(advance_ms);
                    returned += drain(&mut queue, now).len();
                }
            }

            let expected: u64 = queue
                .pending
                .iter()
                .map(|item| u64::from(item.sub_command_count))
                .sum();
            prop_assert_eq!(queue.pending_sub_command_count(), expected);
            prop_assert_eq!(pushed, returned + queue.pending_len() + queue.rejected.len());
            if tps_limit > 0 {
                prop_assert!(queue.pending.iter().all(|item| item.sub_command_count <= tps_limit));
                prop_assert!(queue.window_usage(now) <= u64::from(tps_limit));
            }
            if daily_hard_limit > 0 {
                prop_assert!(queue.daily_sent_count() <= daily_hard_limit);
            }
        }
    }

    #[test]
    fn prop_release_order_follows_rank(
        pushes in prop::collection::vec((0u8..3, 1i64..=5), 1..20),
    ) {
        let mut queue = queue(0);
        let mut expected = Vec::with_capacity(pushes.len());
        for (request_id, (tier, price_units)) in (1u64..).zip(pushes) {
            let (envelope, rank) = ranked_envelope(request_id, tier, price_units);
            enqueue(&mut queue, envelope, T0);
            expected.push((request_id, rank));
        }
        expected.sort_by_key(|(_, rank)| std::cmp::Reverse(*rank));
        let expected: Vec<u64> = expected.into_iter().map(|(id, _)| id).collect();

        prop_assert_eq!(drain_ids(&mut queue, T0), expected);
    }
}
