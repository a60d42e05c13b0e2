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

//! The versioned command envelope exchanged with the gateway transport.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{
    codec::{CodecError, ENVELOPE_HEADER_LEN, ENVELOPE_VERSION, ensure_consumed, ensure_remaining},
    enums::FunctionKind,
    identifiers::WorkerTag,
    orders::OrderRequest,
    withdraw::WithdrawRequest,
};

/// An owned unit of work: a function kind, the originating worker, a request ID and the raw
/// fixed-layout payload.
///
/// Framing (little-endian): version (1), kind (1), worker (2), payload length (4),
/// request ID (8), payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandEnvelope {
    pub kind: FunctionKind,
    pub worker: WorkerTag,
    pub request_id: u64,
    pub payload: Bytes,
}

/// A decoded command payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Order(OrderRequest),
    Withdraw(WithdrawRequest),
    /// A command whose payload is carried opaquely (queries, signals, responses).
    Other(FunctionKind),
}

impl CommandEnvelope {
    /// Creates a new [`CommandEnvelope`] instance.
    #[must_use]
    pub const fn new(
        kind: FunctionKind,
        worker: WorkerTag,
        request_id: u64,
        payload: Bytes,
    ) -> Self {
        Self {
            kind,
            worker,
            request_id,
            payload,
        }
    }

    /// Creates an order request envelope.
    #[must_use]
    pub fn order(worker: WorkerTag, request_id: u64, request: &OrderRequest) -> Self {
        Self::new(FunctionKind::OrderRequest, worker, request_id, request.encode())
    }

    /// Creates a withdraw request envelope.
    #[must_use]
    pub fn withdraw(worker: WorkerTag, request_id: u64, request: &WithdrawRequest) -> Self {
        Self::new(FunctionKind::WithdrawRequest, worker, request_id, request.encode())
    }

    /// Returns the framed length in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        ENVELOPE_HEADER_LEN + self.payload.len()
    }

    /// Encodes the envelope with its framing header.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is longer than the header can describe.
    pub fn encode(&self) -> Result<Bytes, CodecError> {
        let payload_len =
            u32::try_from(self.payload.len()).map_err(|_| CodecError::InvalidField {
                field: "payload",
                reason: format!("length {} exceeds u32::MAX", self.payload.len()),
            })?;

        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u8(ENVELOPE_VERSION);
        buf.put_u8(self.kind as u8);
        buf.put_u16_le(self.worker.as_u16());
        buf.put_u32_le(payload_len);
        buf.put_u64_le(self.request_id);
        buf.put_slice(&self.payload);
        Ok(buf.freeze())
    }

    /// Decodes one framed envelope; the buffer must hold exactly one envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is truncated, has trailing bytes, an unsupported version
    /// or an unknown function kind.
    pub fn decode(frame: &[u8]) -> Result<Self, CodecError> {
        let mut buf = frame;
        ensure_remaining(&buf, ENVELOPE_HEADER_LEN)?;

        let version = buf.get_u8();
        if version != ENVELOPE_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        let kind = buf.get_u8();
        let kind = FunctionKind::from_repr(kind).ok_or(CodecError::UnknownKind(kind))?;
        let worker = WorkerTag::new(buf.get_u16_le());
        let payload_len = buf.get_u32_le() as usize;
        let request_id = buf.get_u64_le();

        ensure_remaining(&buf, payload_len)?;
        let payload = Bytes::copy_from_slice(&buf[..payload_len]);
        buf.advance(payload_len);
        ensure_consumed(&buf, "frame")?;

        Ok(Self::new(kind, worker, request_id, payload))
    }

    /// Decodes the payload as an order request or response.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is not order flow or the payload is invalid.
    pub fn decode_order(&self) -> Result<OrderRequest, CodecError> {
        match self.kind {
            FunctionKind::OrderRequest | FunctionKind::OrderResponse => {
                OrderRequest::decode(&self.payload)
            }
            actual => Err(CodecError::UnexpectedKind {
                expected: FunctionKind::OrderRequest,
                actual,
            }),
        }
    }

    /// Decodes the payload as a withdraw request or response.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is not a withdraw or the payload is invalid.
    pub fn decode_withdraw(&self) -> Result<WithdrawRequest, CodecError> {
        match self.kind {
            FunctionKind::WithdrawRequest | FunctionKind::WithdrawResponse => {
                WithdrawRequest::decode(&self.payload)
            }
            actual => Err(CodecError::UnexpectedKind {
                expected: FunctionKind::WithdrawRequest,
                actual,
            }),
        }
    }

    /// Decodes order-flow requests into typed commands; every other kind is [`Command::Other`].
    ///
    /// # Errors
    ///
    /// Returns an error if an order or withdraw request payload is invalid.
    pub fn decode_command(&self) -> Result<Command, CodecError> {
        match self.kind {
            FunctionKind::OrderRequest => self.decode_order().map(Command::Order),
            FunctionKind::WithdrawRequest => self.decode_withdraw().map(Command::Withdraw),
            other => Ok(Command::Other(other)),
        }
    }

    /// Returns the error message of an order or withdraw payload, if one is set.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        let error = match self.kind {
            FunctionKind::OrderRequest | FunctionKind::OrderResponse => {
                self.decode_order().ok()?.error
            }
            FunctionKind::WithdrawRequest | FunctionKind::WithdrawResponse => {
                self.decode_withdraw().ok()?.error
            }
            _ => return None,
        };
        (!error.is_empty()).then_some(error)
    }

    #[must_use]
    pub const fn is_response(&self) -> bool {
        self.kind.is_response()
    }
}
