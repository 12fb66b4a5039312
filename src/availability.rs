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

//! Date-range conflict detection.
//!
//! Stays are half-open intervals `[check_in, check_out)`: a booking that checks
//! out at 11:00 does not conflict with one that checks in at 11:00.

use crate::booking::Booking;
use chrono::{DateTime, Utc};

/// Half-open interval intersection.
pub fn overlaps(
    a_check_in: DateTime<Utc>,
    a_check_out: DateTime<Utc>,
    b_check_in: DateTime<Utc>,
    b_check_out: DateTime<Utc>,
) -> bool {
    a_check_in < b_check_out && a_check_out > b_check_in
}

/// Returns `true` if `booking` is active and its stay intersects the
/// candidate range.
pub fn conflicts(booking: &Booking, check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> bool {
    booking.is_active() && overlaps(booking.check_in, booking.check_out, check_in, check_out)
}

/// Returns `true` if none of `bookings` conflicts with the candidate range.
pub fn is_available<'a, I>(bookings: I, check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> bool
where
    I: IntoIterator<Item = &'a Booking>,
{
    !bookings
        .into_iter()
        .any(|booking| conflicts(booking, check_in, check_out))
}
