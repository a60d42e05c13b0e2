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

//! Fixed-layout binary codec primitives shared by the command payloads.
//!
//! All integers are little-endian. Strings occupy fixed-width, NUL-padded slots so that a
//! payload's size depends only on its shape, never on its text content.

use bytes::{Buf, BufMut, BytesMut};

use crate::enums::FunctionKind;

/// The current envelope framing version.
pub const ENVELOPE_VERSION: u8 = 1;

/// The length in bytes of the envelope header.
pub const ENVELOPE_HEADER_LEN: usize = 16;

/// The width in bytes of the error message slot carried by every request payload.
pub const ERROR_MSG_LEN: usize = 128;

/// The width in bytes of an instrument code slot.
pub const CODE_LEN: usize = 16;

/// The width in bytes of an order reference slot.
pub const ORDER_REF_LEN: usize = 32;

/// The number of decimal places carried by raw fixed-point prices.
pub const PRICE_PRECISION: u32 = 4;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Codec error: buffer truncated, needed {needed} bytes, had {available}")]
    Truncated { needed: usize, available: usize },
    #[error("Codec error: unsupported envelope version {0}")]
    UnsupportedVersion(u8),
    #[error("Codec error: unknown function kind {0}")]
    UnknownKind(u8),
    #[error("Codec error: unknown order side {0}")]
    UnknownSide(u8),
    #[error("Codec error: invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("Codec error: malformed batch ID '{value}': {reason}")]
    MalformedBatchId { value: String, reason: String },
    #[error("Codec error: expected {expected} payload, was {actual}")]
    UnexpectedKind {
        expected: FunctionKind,
        actual: FunctionKind,
    },
    #[error("Codec error: {0} has no response kind")]
    NoResponseKind(FunctionKind),
}

/// Returns an error unless `buf` has at least `needed` bytes remaining.
///
/// # Errors
///
/// Returns [`CodecError::Truncated`] when the buffer is too short.
pub fn ensure_remaining<B: Buf>(buf: &B, needed: usize) -> Result<(), CodecError> {
    let available = buf.remaining();
    if available < needed {
        return Err(CodecError::Truncated { needed, available });
    }
    Ok(())
}

/// Returns an error if `buf` still has unread bytes.
///
/// # Errors
///
/// Returns [`CodecError::InvalidField`] naming `field` when trailing bytes remain.
pub fn ensure_consumed<B: Buf>(buf: &B, field: &'static str) -> Result<(), CodecError> {
    if buf.has_remaining() {
        return Err(CodecError::InvalidField {
            field,
            reason: format!("{} trailing bytes", buf.remaining()),
        });
    }
    Ok(())
}

/// Returns the longest prefix of `value` that fits in `max_len` bytes without splitting a
/// UTF-8 character.
#[must_use]
pub fn truncate_on_char_boundary(value: &str, max_len: usize) -> &str {
    if value.len() <= max_len {
        return value;
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Writes `value` into a fixed `width` slot, truncating on a char boundary and NUL padding.
pub fn put_fixed_str(buf: &mut BytesMut, value: &str, width: usize) {
    let value = truncate_on_char_boundary(value, width);
    buf.put_slice(value.as_bytes());
    buf.put_bytes(0, width - value.len());
}

/// Reads a fixed `width` slot written by [`put_fixed_str`].
///
/// The value ends at the first NUL byte, or at the slot end when the slot is full.
///
/// # Errors
///
/// Returns an error if the buffer is truncated or the slot is not valid UTF-8.
pub fn get_fixed_str<B: Buf>(
    buf: &mut B,
    width: usize,
    field: &'static str,
) -> Result<String, CodecError> {
    ensure_remaining(buf, width)?;
    let mut slot = vec![0u8; width];
    buf.copy_to_slice(&mut slot);

    let end = slot.iter().position(|b| *b == 0).unwrap_or(width);
    slot.truncate(end);
    String::from_utf8(slot).map_err(|e| CodecError::InvalidField {
        field,
        reason: e.to_string(),
    })
}

/// Maps an identifier construction error onto a [`CodecError::InvalidField`].
pub(crate) fn invalid_field(field: &'static str, e: &anyhow::Error) -> CodecError {
    CodecError::InvalidField {
        field,
        reason: e.to_string(),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", 0)]
    #[case("abc", 3)]
    #[case("abcdef", 4)]
    #[case("价格", 3)]
    #[case("a价格", 4)]
    fn test_truncate_on_char_boundary(#[case] value: &str, #[case] expected_len: usize) {
        let result = truncate_on_char_boundary(value, 4);
        assert_eq!(result.len(), expected_len);
        assert!(value.starts_with(result));
    }

    #[rstest]
    fn test_fixed_str_round_trip() {
        let mut buf = BytesMut::new();
        put_fixed_str(&mut buf, "600000.SH", CODE_LEN);
        assert_eq!(buf.len(), CODE_LEN);

        let mut bytes = buf.freeze();
        let value = get_fixed_str(&mut bytes, CODE_LEN, "code").unwrap();
        assert_eq!(value, "600000.SH");
        assert!(!bytes.has_remaining());
    }

    #[rstest]
    fn test_fixed_str_full_slot_has_no_terminator() {
        let mut buf = BytesMut::new();
        put_fixed_str(&mut buf, "0123456789ABCDEFXYZ", CODE_LEN);
        assert_eq!(buf.len(), CODE_LEN);

        let value = get_fixed_str(&mut buf.freeze(), CODE_LEN, "code").unwrap();
        assert_eq!(value, "0123456789ABCDEF");
    }

    #[rstest]
    fn test_get_fixed_str_truncated() {
        let mut bytes: &[u8] = b"short";
        let result = get_fixed_str(&mut bytes, CODE_LEN, "code");
        assert_eq!(
            result,
            Err(CodecError::Truncated {
                needed: CODE_LEN,
                available: 5
            })
        );
    }

    #[rstest]
    fn test_get_fixed_str_invalid_utf8() {
        let mut bytes: &[u8] = &[0xff, 0xfe, 0, 0];
        let result = get_fixed_str(&mut bytes, 4, "code");
        assert!(matches!(
            result,
            Err(CodecError::InvalidField { field: "code", .. })
        ));
    }
}
