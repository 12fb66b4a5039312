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

//! Merchant reporting over bookings.
//!
//! Revenue counts the full `total_amount` of settled bookings, that is
//! bookings in `COMPLETED` or `CHECKED_OUT`.

use crate::booking::{Booking, BookingStatus};
use crate::catalog::Suite;
use crate::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn is_settled(booking: &Booking) -> bool {
    matches!(
        booking.status,
        BookingStatus::Completed | BookingStatus::CheckedOut
    )
}

fn count(bookings: &[Booking], status: BookingStatus) -> usize {
    bookings.iter().filter(|b| b.status == status).count()
}

/// Totals across every hotel of one merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub total_hotels: usize,
    pub total_bookings: usize,
    pub completed_bookings: usize,
    pub pending_bookings: usize,
    pub cancelled_bookings: usize,
    pub total_revenue: Money,
}

impl RevenueSummary {
    pub fn from_bookings(total_hotels: usize, bookings: &[Booking]) -> Self {
        let settled: Vec<Money> = bookings
            .iter()
            .filter(|b| is_settled(b))
            .map(|b| b.total_amount)
            .collect();

        Self {
            total_hotels,
            total_bookings: bookings.len(),
            completed_bookings: settled.len(),
            pending_bookings: count(bookings, BookingStatus::Pending),
            cancelled_bookings: count(bookings, BookingStatus::Cancelled),
            total_revenue: Money::sum_of(&settled),
        }
    }
}

/// Snapshot of one hotel for its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelDashboard {
    pub total_suites: usize,
    pub available_suites: usize,
    pub unavailable_suites: usize,
    pub total_bookings: usize,
    pub pending_bookings: usize,
    pub confirmed_bookings: usize,
    pub checked_in_guests: usize,
    /// Settled bookings last updated on the reporting day (UTC).
    pub today_revenue: Money,
}

impl HotelDashboard {
    pub fn build(suites: &[Suite], bookings: &[Booking], today: NaiveDate) -> Self {
        let available_suites = suites.iter().filter(|s| s.is_available).count();
        let today_revenue = bookings
            .iter()
            .filter(|b| is_settled(b) && b.updated_at.date_naive() == today)
            .map(|b| b.total_amount)
            .sum();

        Self {
            total_suites: suites.len(),
            available_suites,
            unavailable_suites: suites.len() - available_suites,
            total_bookings: bookings.len(),
            pending_bookings: count(bookings, BookingStatus::Pending),
            confirmed_bookings: count(bookings, BookingStatus::Confirmed),
            checked_in_guests: count(bookings, BookingStatus::CheckedIn),
            today_revenue,
        }
    }
}
