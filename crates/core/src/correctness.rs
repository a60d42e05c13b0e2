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

//! Functions for correctness checks similar to the *design by contract* philosophy.
//!
//! A condition is a predicate which must be true just prior to the execution of some section of
//! code for correct behavior as per the design specification.
//!
//! Each check returns an `anyhow::Result` so configuration builders can propagate the failure
//! with `?` rather than panicking.

use anyhow::{Result, bail};

/// A message prefix that can be used with calls to `expect` or other assertion-related functions.
pub const FAILED: &str = "Condition failed";

/// Checks the `predicate` is true.
///
/// # Errors
///
/// Returns an error if the validation check fails.
pub fn check_predicate_true(predicate: bool, fail_msg: &str) -> Result<()> {
    if !predicate {
        bail!("{FAILED}: {fail_msg}")
    }
    Ok(())
}

/// Checks the string `s` has semantic meaning and contains only ASCII characters.
///
/// # Errors
///
/// Returns an error if:
/// - `s` is an empty string.
/// - `s` consists solely of whitespace characters.
/// - `s` contains one or more non-ASCII characters.
pub fn check_valid_string(s: &str, param: &str) -> Result<()> {
    if s.is_empty() {
        bail!("{FAILED}: invalid string for '{param}', was empty")
    } else if s.chars().all(char::is_whitespace) {
        bail!("{FAILED}: invalid string for '{param}', was all whitespace")
    } else if !s.is_ascii() {
        bail!("{FAILED}: invalid string for '{param}' contained a non-ASCII char, was '{s}'")
    }
    Ok(())
}

/// Checks the string `s` is no longer than `max_len` bytes.
///
/// # Errors
///
/// Returns an error if the validation check fails.
pub fn check_string_max_len(s: &str, max_len: usize, param: &str) -> Result<()> {
    if s.len() > max_len {
        bail!(
            "{FAILED}: invalid string for '{param}' exceeded {max_len} bytes, was '{s}' ({} bytes)",
            s.len()
        )
    }
    Ok(())
}

/// Checks the `u64` value is positive (> 0).
///
/// # Errors
///
/// Returns an error if the validation check fails.
pub fn check_positive_u64(value: u64, param: &str) -> Result<()> {
    if value == 0 {
        bail!("{FAILED}: invalid u64 for '{param}' not positive, was {value}")
    }
    Ok(())
}

/// Checks `lhs` is strictly less than `rhs`, treating a zero on either side as "not set".
///
/// Limits configured as zero are disabled, so an ordering constraint between two limits
/// only applies when both are set.
///
/// # Errors
///
/// Returns an error if both values are set and `lhs >= rhs`.
pub fn check_ordered_when_set(lhs: u64, rhs: u64, lhs_param: &str, rhs_param: &str) -> Result<()> {
    if lhs != 0 && rhs != 0 && lhs >= rhs {
        bail!(
            "{FAILED}: '{lhs_param}' of {lhs} was not less than '{rhs_param}' of {rhs}"
        )
    }
    Ok(())
}
