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

//! Envelope builders and fixtures to facilitate testing.

use bytes::Bytes;
use rstest::fixture;

use crate::{
    envelope::CommandEnvelope,
    enums::{FunctionKind, OrderSide},
    identifiers::{BatchId, InstrumentCode, WorkerTag},
    orders::{OrderLeg, OrderRequest},
    withdraw::WithdrawRequest,
};

/// The worker tag stamped on every stub envelope.
pub const STUB_WORKER: WorkerTag = WorkerTag::new(1);

/// Returns a single-leg order request envelope.
#[must_use]
pub fn order_envelope(
    request_id: u64,
    code: &str,
    side: OrderSide,
    price_raw: i64,
    volume: i64,
    timeout_ms: u32,
) -> CommandEnvelope {
    let leg = OrderLeg::new(InstrumentCode::from(code), side, price_raw, volume);
    CommandEnvelope::order(STUB_WORKER, request_id, &OrderRequest::new(timeout_ms, vec![leg]))
}

/// Returns a batch order request envelope of `count` identical legs.
#[must_use]
pub fn batch_order_envelope(
    request_id: u64,
    code: &str,
    side: OrderSide,
    count: usize,
    timeout_ms: u32,
) -> CommandEnvelope {
    let leg = OrderLeg::new(InstrumentCode::from(code), side, 100_000, 100);
    let request = OrderRequest::new(timeout_ms, vec![leg; count]);
    CommandEnvelope::order(STUB_WORKER, request_id, &request)
}

/// Returns a single-order withdraw request envelope.
#[must_use]
pub fn withdraw_envelope(request_id: u64, code: &str, order_ref: &str) -> CommandEnvelope {
    let request = WithdrawRequest::single(0, InstrumentCode::from(code), order_ref);
    CommandEnvelope::withdraw(STUB_WORKER, request_id, &request)
}

/// Returns a batch withdraw request envelope.
#[must_use]
pub fn batch_withdraw_envelope(request_id: u64, batch_id: &str) -> CommandEnvelope {
    let request = WithdrawRequest::batch(0, BatchId::from(batch_id));
    CommandEnvelope::withdraw(STUB_WORKER, request_id, &request)
}

/// Returns an envelope with an opaque (empty) payload.
#[must_use]
pub fn query_envelope(request_id: u64, kind: FunctionKind) -> CommandEnvelope {
    CommandEnvelope::new(kind, STUB_WORKER, request_id, Bytes::new())
}

#[fixture]
pub fn buy_600000_sh() -> CommandEnvelope {
    order_envelope(1, "600000.SH", OrderSide::Buy, 100_000, 100, 0)
}

#[fixture]
pub fn withdraw_600000_sh() -> CommandEnvelope {
    withdraw_envelope(2, "600000.SH", "ORD-0001")
}
