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

//! Withdraw (cancel) request payloads.
//!
//! Layout (little-endian): timeout ms (4), target tag (1), reserved (3), instrument code (16),
//! order reference (32), error message (128). A batch cancel leaves the code slot empty and
//! carries the batch ID in the order reference slot.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::{
    codec::{
        CODE_LEN, CodecError, ERROR_MSG_LEN, ORDER_REF_LEN, ensure_consumed, ensure_remaining,
        get_fixed_str, invalid_field, put_fixed_str,
    },
    identifiers::{BatchId, InstrumentCode, MarketId},
};

/// The encoded length in bytes of a [`WithdrawRequest`].
pub const WITHDRAW_REQUEST_LEN: usize = 4 + 1 + 3 + CODE_LEN + ORDER_REF_LEN + ERROR_MSG_LEN;

const TARGET_SINGLE: u8 = 1;
const TARGET_BATCH: u8 = 2;

/// What a withdraw request cancels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawTarget {
    /// A single live order.
    Single {
        code: InstrumentCode,
        order_ref: String,
    },
    /// Every order of a previously placed batch.
    Batch(BatchId),
}

/// A request to cancel one order, or a batch of orders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub timeout_ms: u32,
    pub target: WithdrawTarget,
    pub error: String,
}

impl WithdrawRequest {
    /// Creates a new single-order [`WithdrawRequest`] instance.
    #[must_use]
    pub fn single(timeout_ms: u32, code: InstrumentCode, order_ref: &str) -> Self {
        Self {
            timeout_ms,
            target: WithdrawTarget::Single {
                code,
                order_ref: order_ref.to_string(),
            },
            error: String::new(),
        }
    }

    /// Creates a new batch [`WithdrawRequest`] instance.
    #[must_use]
    pub fn batch(timeout_ms: u32, batch_id: BatchId) -> Self {
        Self {
            timeout_ms,
            target: WithdrawTarget::Batch(batch_id),
            error: String::new(),
        }
    }

    #[must_use]
    pub const fn is_batch(&self) -> bool {
        matches!(self.target, WithdrawTarget::Batch(_))
    }

    /// Returns the number of atomic exchange cancels the request represents.
    #[must_use]
    pub const fn sub_command_count(&self) -> u32 {
        match &self.target {
            WithdrawTarget::Single { .. } => 1,
            WithdrawTarget::Batch(batch_id) => batch_id.sub_command_count(),
        }
    }

    /// Returns the market of the cancelled order(s).
    #[must_use]
    pub fn market(&self) -> Option<MarketId> {
        match &self.target {
            WithdrawTarget::Single { code, .. } => code.market(),
            WithdrawTarget::Batch(batch_id) => Some(batch_id.market()),
        }
    }

    /// Encodes the request into its fixed layout.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(WITHDRAW_REQUEST_LEN);
        buf.put_u32_le(self.timeout_ms);
        match &self.target {
            WithdrawTarget::Single { code, order_ref } => {
                buf.put_u8(TARGET_SINGLE);
                buf.put_bytes(0, 3);
                put_fixed_str(&mut buf, code.as_str(), CODE_LEN);
                put_fixed_str(&mut buf, order_ref, ORDER_REF_LEN);
            }
            WithdrawTarget::Batch(batch_id) => {
                buf.put_u8(TARGET_BATCH);
                buf.put_bytes(0, 3 + CODE_LEN);
                put_fixed_str(&mut buf, batch_id.as_str(), ORDER_REF_LEN);
            }
        }
        put_fixed_str(&mut buf, &self.error, ERROR_MSG_LEN);
        buf.freeze()
    }

    /// Decodes a request from its fixed layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload has the wrong size, an unknown target tag, an invalid
    /// instrument code or a malformed batch ID.
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        let mut buf = payload;
        ensure_remaining(&buf, WITHDRAW_REQUEST_LEN)?;
        let timeout_ms = buf.get_u32_le();
        let tag = buf.get_u8();
        buf.advance(3);
        let code = get_fixed_str(&mut buf, CODE_LEN, "code")?;
        let order_ref = get_fixed_str(&mut buf, ORDER_REF_LEN, "order_ref")?;
        let error = get_fixed_str(&mut buf, ERROR_MSG_LEN, "error")?;
        ensure_consumed(&buf, "payload")?;

        let target = match tag {
            TARGET_SINGLE => WithdrawTarget::Single {
                code: InstrumentCode::new_checked(code).map_err(|e| invalid_field("code", &e))?,
                order_ref,
            },
            TARGET_BATCH => {
                let batch_id =
                    BatchId::new_checked(&order_ref).map_err(|e| CodecError::MalformedBatchId {
                        value: order_ref.clone(),
                        reason: e.to_string(),
                    })?;
                WithdrawTarget::Batch(batch_id)
            }
            other => {
                return Err(CodecError::InvalidField {
                    field: "target",
                    reason: format!("unknown target tag {other}"),
                });
            }
        };

        Ok(Self {
            timeout_ms,
            target,
            error,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::identifiers::stubs::*;

    #[rstest]
    fn test_single_encode_decode(code_000001_sz: InstrumentCode) {
        let request = WithdrawRequest::single(500, code_000001_sz, "ORD-0001");
        let encoded = request.encode();
        assert_eq!(encoded.len(), WITHDRAW_REQUEST_LEN);

        let decoded = WithdrawRequest::decode(&encoded).unwrap();
        assert_eq!(decoded, request);
        assert!(!decoded.is_batch());
        assert_eq!(decoded.sub_command_count(), 1);
        assert_eq!(decoded.market(), Some(MarketId::new("SZ")));
    }

    #[rstest]
    fn test_batch_encode_decode(batch_id_sh_11: BatchId) {
        let request = WithdrawRequest::batch(0, batch_id_sh_11);
        let decoded = WithdrawRequest::decode(&request.encode()).unwrap();
        assert_eq!(decoded, request);
        assert!(decoded.is_batch());
        assert_eq!(decoded.sub_command_count(), 11);
        assert_eq!(decoded.market(), Some(MarketId::new("SH")));
    }

    #[rstest]
    fn test_malformed_batch_id(batch_id_sh_11: BatchId) {
        let mut raw = WithdrawRequest::batch(0, batch_id_sh_11).encode().to_vec();
        let ref_offset = 8 + CODE_LEN;
        raw[ref_offset..ref_offset + ORDER_REF_LEN].fill(0);
        raw[ref_offset..ref_offset + 5].copy_from_slice(b"SH-xx");

        let result = WithdrawRequest::decode(&raw);
        assert!(matches!(result, Err(CodecError::MalformedBatchId { .. })));
    }

    #[rstest]
    fn test_unknown_target_tag(code_000001_sz: InstrumentCode) {
        let mut raw = WithdrawRequest::single(0, code_000001_sz, "X").encode().to_vec();
        raw[4] = 7;
        assert!(matches!(
            WithdrawRequest::decode(&raw),
            Err(CodecError::InvalidField { field: "target", .. })
        ));
    }

    #[rstest]
    fn test_decode_truncated() {
        let result = WithdrawRequest::decode(&[0u8; 10]);
        assert_eq!(
            result,
            Err(CodecError::Truncated {
                needed: WITHDRAW_REQUEST_LEN,
                available: 10
            })
        );
    }
}
