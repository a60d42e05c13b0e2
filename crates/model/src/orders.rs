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

//! Order request payloads.
//!
//! Layout (little-endian):
//!
//! | Offset | Size | Field                  |
//! |--------|------|------------------------|
//! | 0      | 4    | timeout (ms)           |
//! | 4      | 4    | leg count              |
//! | 8      | 40n  | legs                   |
//! | 8+40n  | 128  | error message          |
//!
//! Each leg is the instrument code (16), side (1), reserved (7), raw price (8) and volume (8).

use bytes::{Buf, BufMut, Bytes, BytesMut};
use flowgate_core::correctness::{FAILED, check_predicate_true};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    codec::{
        CODE_LEN, CodecError, ERROR_MSG_LEN, PRICE_PRECISION, ensure_consumed, ensure_remaining,
        get_fixed_str, invalid_field, put_fixed_str,
    },
    enums::OrderSide,
    identifiers::{InstrumentCode, MarketId},
};

/// The encoded length in bytes of one [`OrderLeg`].
pub const ORDER_LEG_LEN: usize = CODE_LEN + 1 + 7 + 8 + 8;

const ORDER_FIXED_LEN: usize = 4 + 4 + ERROR_MSG_LEN;

/// The maximum raw price of an [`OrderLeg`] (a price of 10^12).
pub const ORDER_PRICE_RAW_MAX: i64 = 10_000_000_000_000_000;

/// The maximum volume of an [`OrderLeg`].
pub const ORDER_VOLUME_MAX: i64 = 1_000_000_000_000;

/// One atomic order sent to the exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLeg {
    pub code: InstrumentCode,
    pub side: OrderSide,
    /// The price as a fixed-point integer with [`PRICE_PRECISION`] decimal places.
    pub price_raw: i64,
    pub volume: i64,
}

impl OrderLeg {
    /// Creates a new [`OrderLeg`] instance with correctness checking.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `price_raw` is negative or greater than [`ORDER_PRICE_RAW_MAX`].
    /// - `volume` is not positive or greater than [`ORDER_VOLUME_MAX`].
    pub fn new_checked(
        code: InstrumentCode,
        side: OrderSide,
        price_raw: i64,
        volume: i64,
    ) -> anyhow::Result<Self> {
        check_predicate_true(price_raw >= 0, "`price_raw` was negative")?;
        check_predicate_true(
            price_raw <= ORDER_PRICE_RAW_MAX,
            "`price_raw` exceeded ORDER_PRICE_RAW_MAX",
        )?;
        check_predicate_true(volume > 0, "`volume` was not positive")?;
        check_predicate_true(volume <= ORDER_VOLUME_MAX, "`volume` exceeded ORDER_VOLUME_MAX")?;
        Ok(Self {
            code,
            side,
            price_raw,
            volume,
        })
    }

    /// Creates a new [`OrderLeg`] instance.
    ///
    /// # Panics
    ///
    /// This function panics if the leg is invalid.
    #[must_use]
    pub fn new(code: InstrumentCode, side: OrderSide, price_raw: i64, volume: i64) -> Self {
        Self::new_checked(code, side, price_raw, volume).expect(FAILED)
    }

    /// Returns the leg price as a decimal.
    #[must_use]
    pub fn price(&self) -> Decimal {
        Decimal::new(self.price_raw, PRICE_PRECISION)
    }

    /// Returns the leg notional value (price × volume), saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.price().saturating_mul(Decimal::from(self.volume))
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        put_fixed_str(buf, self.code.as_str(), CODE_LEN);
        buf.put_u8(self.side as u8);
        buf.put_bytes(0, 7);
        buf.put_i64_le(self.price_raw);
        buf.put_i64_le(self.volume);
    }

    fn decode_from<B: Buf>(buf: &mut B) -> Result<Self, CodecError> {
        ensure_remaining(buf, ORDER_LEG_LEN)?;
        let code = get_fixed_str(buf, CODE_LEN, "code")?;
        let code = InstrumentCode::new_checked(code).map_err(|e| invalid_field("code", &e))?;
        let side = buf.get_u8();
        let side = OrderSide::from_repr(side).ok_or(CodecError::UnknownSide(side))?;
        buf.advance(7);
        let price_raw = buf.get_i64_le();
        let volume = buf.get_i64_le();
        Self::new_checked(code, side, price_raw, volume).map_err(|e| invalid_field("leg", &e))
    }
}

/// A request to place one order, or a batch of orders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// The per-request timeout in milliseconds (0 = none).
    pub timeout_ms: u32,
    pub legs: Vec<OrderLeg>,
    /// The error message, empty for a live request.
    pub error: String,
}

impl OrderRequest {
    /// Creates a new [`OrderRequest`] instance with an empty error field.
    #[must_use]
    pub fn new(timeout_ms: u32, legs: Vec<OrderLeg>) -> Self {
        Self {
            timeout_ms,
            legs,
            error: String::new(),
        }
    }

    /// Returns `true` if the request carries more than one leg.
    #[must_use]
    pub fn is_batch(&self) -> bool {
        self.legs.len() > 1
    }

    /// Returns the number of atomic exchange commands in the request.
    #[must_use]
    pub fn sub_command_count(&self) -> u32 {
        u32::try_from(self.legs.len()).unwrap_or(u32::MAX)
    }

    /// Returns the market the request trades on, taken from the first leg.
    #[must_use]
    pub fn market(&self) -> Option<MarketId> {
        self.legs.first().and_then(|leg| leg.code.market())
    }

    /// Returns the encoded length in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        ORDER_FIXED_LEN + self.legs.len() * ORDER_LEG_LEN
    }

    /// Encodes the request into its fixed layout.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u32_le(self.timeout_ms);
        buf.put_u32_le(self.sub_command_count());
        for leg in &self.legs {
            leg.encode_into(&mut buf);
        }
        put_fixed_str(&mut buf, &self.error, ERROR_MSG_LEN);
        buf.freeze()
    }

    /// Decodes a request from its fixed layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is truncated, carries trailing bytes or holds an
    /// invalid field.
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        let mut buf = payload;
        ensure_remaining(&buf, ORDER_FIXED_LEN)?;
        let timeout_ms = buf.get_u32_le();
        let leg_count = buf.get_u32_le() as usize;

        // Bound the allocation by what the buffer can actually hold
        ensure_remaining(&buf, leg_count.saturating_mul(ORDER_LEG_LEN) + ERROR_MSG_LEN)?;
        let legs = (0..leg_count)
            .map(|_| OrderLeg::decode_from(&mut buf))
            .collect::<Result<Vec<_>, _>>()?;
        let error = get_fixed_str(&mut buf, ERROR_MSG_LEN, "error")?;
        ensure_consumed(&buf, "payload")?;

        Ok(Self {
            timeout_ms,
            legs,
            error,
        })
    }
}
