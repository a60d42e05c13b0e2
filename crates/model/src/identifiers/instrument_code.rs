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

//! Represents a valid exchange instrument code.

use std::{
    fmt::{Debug, Display, Formatter},
    hash::Hash,
};

use flowgate_core::correctness::{FAILED, check_string_max_len, check_valid_string};
use ustr::Ustr;

use crate::identifiers::MarketId;

/// The maximum length in bytes of an instrument code (the width of its payload field).
pub const INSTRUMENT_CODE_MAX_LEN: usize = 16;

/// Represents an exchange instrument code of the form `<symbol>.<market>`, e.g. `600000.SH`.
///
/// The market suffix decides which admission queue an order is scheduled on.
#[repr(C)]
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct InstrumentCode(Ustr);

impl InstrumentCode {
    /// Creates a new [`InstrumentCode`] instance with correctness checking.
    ///
    /// The market suffix is not required here; codes without one are still valid payload
    /// values, they simply cannot be routed to a market.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not a valid ASCII string of at most
    /// [`INSTRUMENT_CODE_MAX_LEN`] bytes.
    pub fn new_checked<T: AsRef<str>>(value: T) -> anyhow::Result<Self> {
        let value = value.as_ref();
        check_valid_string(value, stringify!(value))?;
        check_string_max_len(value, INSTRUMENT_CODE_MAX_LEN, stringify!(value))?;
        Ok(Self(Ustr::from(value)))
    }

    /// Creates a new [`InstrumentCode`] instance.
    ///
    /// # Panics
    ///
    /// This function panics if `value` is not a valid instrument code.
    pub fn new<T: AsRef<str>>(value: T) -> Self {
        Self::new_checked(value).expect(FAILED)
    }

    /// Returns the inner value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the symbol part of the code (everything before the last `.`).
    #[must_use]
    pub fn symbol(&self) -> &str {
        self.as_str()
            .rsplit_once('.')
            .map_or(self.as_str(), |(symbol, _)| symbol)
    }

    /// Returns the market the instrument trades on, derived from the code suffix.
    ///
    /// Returns `None` when the code has no `.<market>` suffix or the suffix is not a valid
    /// market ID.
    #[must_use]
    pub fn market(&self) -> Option<MarketId> {
        let (_, suffix) = self.as_str().rsplit_once('.')?;
        MarketId::new_checked(suffix).ok()
    }
}

impl Debug for InstrumentCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl Display for InstrumentCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
