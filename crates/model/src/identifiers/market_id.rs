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

//! Represents a valid exchange market ID.

use std::{
    fmt::{Debug, Display, Formatter},
    hash::Hash,
};

use flowgate_core::correctness::{FAILED, check_string_max_len, check_valid_string};
use ustr::Ustr;

/// The maximum length in bytes of a market ID (the width of its persisted slot).
pub const MARKET_ID_MAX_LEN: usize = 8;

/// Represents a valid exchange market ID, e.g. `SH` or `SZ`.
///
/// Each market trades under an independent exchange rate limit.
#[repr(C)]
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct MarketId(Ustr);

impl MarketId {
    /// Creates a new [`MarketId`] instance with correctness checking.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not a valid ASCII string of at most
    /// [`MARKET_ID_MAX_LEN`] bytes.
    pub fn new_checked<T: AsRef<str>>(value: T) -> anyhow::Result<Self> {
        let value = value.as_ref();
        check_valid_string(value, stringify!(value))?;
        check_string_max_len(value, MARKET_ID_MAX_LEN, stringify!(value))?;
        Ok(Self(Ustr::from(value)))
    }

    /// Creates a new [`MarketId`] instance.
    ///
    /// # Panics
    ///
    /// This function panics if `value` is not a valid market ID.
    pub fn new<T: AsRef<str>>(value: T) -> Self {
        Self::new_checked(value).expect(FAILED)
    }

    /// Returns the inner identifier value.
    #[must_use]
    pub fn inner(&self) -> Ustr {
        self.0
    }

    /// Returns the inner value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Debug for MarketId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl Display for MarketId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
