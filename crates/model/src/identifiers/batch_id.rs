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

//! Represents a standardized batch identifier.

use std::{
    fmt::{Debug, Display, Formatter},
    hash::Hash,
};

use flowgate_core::correctness::{FAILED, check_string_max_len, check_valid_string};
use ustr::Ustr;

use crate::identifiers::MarketId;

/// The maximum length in bytes of a batch ID (the width of the order reference field).
pub const BATCH_ID_MAX_LEN: usize = 32;

/// Represents a standardized batch identifier of the form `<market>-<count>-<opaque_id>`.
///
/// Batch cancels reference the batch they cancel by this ID, which is the only place the
/// market and the number of sub-commands can be recovered from.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct BatchId {
    value: Ustr,
    market: MarketId,
    sub_command_count: u32,
}

impl BatchId {
    /// Creates a new [`BatchId`] instance with correctness checking.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `value` is not a valid ASCII string of at most [`BATCH_ID_MAX_LEN`] bytes.
    /// - `value` does not have three `-` separated components.
    /// - The market component is not a valid [`MarketId`].
    /// - The count component is not a positive integer.
    /// - The opaque component is empty.
    pub fn new_checked<T: AsRef<str>>(value: T) -> anyhow::Result<Self> {
        let value = value.as_ref();
        check_valid_string(value, stringify!(value))?;
        check_string_max_len(value, BATCH_ID_MAX_LEN, stringify!(value))?;

        let mut parts = value.splitn(3, '-');
        let (Some(market), Some(count), Some(opaque)) = (parts.next(), parts.next(), parts.next())
        else {
            anyhow::bail!(
                "{FAILED}: invalid batch ID '{value}', expected '<market>-<count>-<opaque_id>'"
            );
        };

        let market = MarketId::new_checked(market)?;
        let sub_command_count: u32 = count
            .parse()
            .map_err(|e| anyhow::anyhow!("{FAILED}: invalid batch ID count '{count}': {e}"))?;
        if sub_command_count == 0 {
            anyhow::bail!("{FAILED}: invalid batch ID '{value}', count was zero");
        }
        if opaque.is_empty() {
            anyhow::bail!("{FAILED}: invalid batch ID '{value}', opaque ID was empty");
        }

        Ok(Self {
            value: Ustr::from(value),
            market,
            sub_command_count,
        })
    }

    /// Creates a new [`BatchId`] instance.
    ///
    /// # Panics
    ///
    /// This function panics if `value` is not a valid batch ID.
    pub fn new<T: AsRef<str>>(value: T) -> Self {
        Self::new_checked(value).expect(FAILED)
    }

    /// Formats a batch ID from its components.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting value is not a valid batch ID.
    pub fn from_parts(
        market: MarketId,
        sub_command_count: u32,
        opaque: &str,
    ) -> anyhow::Result<Self> {
        Self::new_checked(format!("{market}-{sub_command_count}-{opaque}"))
    }

    /// Returns the inner value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.value.as_str()
    }

    /// Returns the market the batch was placed on.
    #[must_use]
    pub const fn market(&self) -> MarketId {
        self.market
    }

    /// Returns the number of atomic exchange commands in the batch.
    #[must_use]
    pub const fn sub_command_count(&self) -> u32 {
        self.sub_command_count
    }
}

impl Debug for BatchId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.value)
    }
}

impl Display for BatchId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}
