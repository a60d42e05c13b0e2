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

//! Turning a request into its rejection response.

use crate::{
    codec::{CodecError, ERROR_MSG_LEN, truncate_on_char_boundary},
    envelope::CommandEnvelope,
    enums::FunctionKind,
};

/// Returns the response to `request` carrying `error`, leaving `request` untouched.
///
/// The response keeps the worker tag, request ID and payload layout of the request, so it is
/// exactly the same size and travels back over the same transport. The error text is
/// truncated on a char boundary to fit the error slot.
///
/// # Errors
///
/// Returns an error if `request` is not an order or withdraw request, or its payload cannot be
/// decoded.
pub fn to_response(request: &CommandEnvelope, error: &str) -> Result<CommandEnvelope, CodecError> {
    let error = truncate_on_char_boundary(error, ERROR_MSG_LEN).to_string();
    let payload = match request.kind {
        FunctionKind::OrderRequest => {
            let mut order = request.decode_order()?;
            order.error = error;
            order.encode()
        }
        FunctionKind::WithdrawRequest => {
            let mut withdraw = request.decode_withdraw()?;
            withdraw.error = error;
            withdraw.encode()
        }
        other => return Err(CodecError::NoResponseKind(other)),
    };
    let kind = request
        .kind
        .response_kind()
        .ok_or(CodecError::NoResponseKind(request.kind))?;

    Ok(CommandEnvelope::new(
        kind,
        request.worker,
        request.request_id,
        payload,
    ))
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::{enums::OrderSide, stubs::*};

    #[rstest]
    fn test_order_response(buy_600000_sh: CommandEnvelope) {
        let response = to_response(&buy_600000_sh, "rejected").unwrap();
        assert_eq!(response.kind, FunctionKind::OrderResponse);
        assert_eq!(response.worker, buy_600000_sh.worker);
        assert_eq!(response.request_id, buy_600000_sh.request_id);
        assert_eq!(response.payload.len(), buy_600000_sh.payload.len());
        assert_eq!(response.error_message().as_deref(), Some("rejected"));

        // The request is unchanged
        assert_eq!(buy_600000_sh.kind, FunctionKind::OrderRequest);
        assert_eq!(buy_600000_sh.error_message(), None);
    }

    #[rstest]
    fn test_withdraw_response(withdraw_600000_sh: CommandEnvelope) {
        let response = to_response(&withdraw_600000_sh, "timed out").unwrap();
        assert_eq!(response.kind, FunctionKind::WithdrawResponse);
        assert_eq!(response.payload.len(), withdraw_600000_sh.payload.len());
        assert_eq!(response.error_message().as_deref(), Some("timed out"));
    }

    #[rstest]
    #[case(FunctionKind::QueryAsset)]
    #[case(FunctionKind::OrderResponse)]
    #[case(FunctionKind::InternalSignal)]
    fn test_no_response_kind(#[case] kind: FunctionKind) {
        let envelope = query_envelope(1, kind);
        assert_eq!(
            to_response(&envelope, "x"),
            Err(CodecError::NoResponseKind(kind))
        );
    }

    #[rstest]
    fn test_long_error_truncated(buy_600000_sh: CommandEnvelope) {
        let error = "限".repeat(100);
        let response = to_response(&buy_600000_sh, &error).unwrap();
        let message = response.error_message().unwrap();
        assert_eq!(message.len(), 126);
        assert!(error.starts_with(&message));
    }

    proptest! {
        #[test]
        fn prop_response_preserves_payload_size(
            legs in 1usize..20,
            error in ".{0,200}",
            withdraw in any::<bool>(),
        ) {
            let request = if withdraw {
                batch_withdraw_envelope(7, &format!("SZ-{legs}-abc"))
            } else {
                batch_order_envelope(7, "000001.SZ", OrderSide::Sell, legs, 1_000)
            };
            let response = to_response(&request, &error).unwrap();
            prop_assert_eq!(response.payload.len(), request.payload.len());
            prop_assert!(response.kind.is_response());
            prop_assert_eq!(response.request_id, request.request_id);
        }
    }
}
