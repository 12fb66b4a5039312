// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Engine configuration.

use serde::{Deserialize, Serialize};

/// What happens to a suite's availability flag when it is booked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteHoldPolicy {
    /// Clear the flag on every new booking and restore it once the suite
    /// has no active bookings left. A held suite rejects further bookings
    /// even for dates that do not overlap.
    #[default]
    HoldOnBooking,
    /// Never touch the flag; availability is decided by date overlap alone.
    IntervalOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub suite_hold: SuiteHoldPolicy,
    /// ISO currency code used when formatting amounts for display.
    pub currency: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            suite_hold: SuiteHoldPolicy::default(),
            currency: "USD".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_suite_hold(mut self, suite_hold: SuiteHoldPolicy) -> Self {
        self.suite_hold = suite_hold;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}
