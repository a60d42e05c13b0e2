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

//! Notional amount models used to rank orders within a priority tier.

use std::fmt::Debug;

use flowgate_model::{enums::FlowPriority, orders::OrderLeg};
use rust_decimal::Decimal;

/// Computes the notional amount used to break ties within a priority tier.
///
/// Larger amounts are released first within the same tier.
pub trait NotionalModel: Debug + Send + Sync {
    /// Returns the notional amount of `legs` scheduled under `priority`.
    fn notional(&self, priority: FlowPriority, legs: &[OrderLeg]) -> Decimal;
}

/// The default [`NotionalModel`]: `Σ price × volume` for ordinary buy/sell traffic and zero for
/// cancels and create/redeem, whose prices carry no meaning.
#[derive(Clone, Copy, Debug, Default)]
pub struct PriceVolumeNotional;

impl NotionalModel for PriceVolumeNotional {
    fn notional(&self, priority: FlowPriority, legs: &[OrderLeg]) -> Decimal {
        match priority {
            FlowPriority::Other => legs
                .iter()
                .map(OrderLeg::notional)
                .fold(Decimal::ZERO, Decimal::saturating_add),
            FlowPriority::CreateOrRedeem | FlowPriority::Withdraw => Decimal::ZERO,
        }
    }
}

/// A [`NotionalModel`] ranking create/redeem traffic by volume instead of leaving it tied.
#[derive(Clone, Copy, Debug, Default)]
pub struct VolumeWeightedCreateRedeem;

impl NotionalModel for VolumeWeightedCreateRedeem {
    fn notional(&self, priority: FlowPriority, legs: &[OrderLeg]) -> Decimal {
        match priority {
            FlowPriority::CreateOrRedeem => legs
                .iter()
                .map(|leg| Decimal::from(leg.volume))
                .fold(Decimal::ZERO, Decimal::saturating_add),
            _ => PriceVolumeNotional.notional(priority, legs),
        }
    }
}
