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

//! Per-suite booking calendar.
//!
//! A [`SuiteCalendar`] owns every booking of one suite behind a single
//! [`Mutex`]. The overlap check and the write it guards run under the same
//! lock, so two concurrent requests for the same dates cannot both succeed.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use hotel_booking_rs::{SuiteCalendar, SuiteId};
//!
//! let calendar = SuiteCalendar::new(SuiteId::new());
//! let check_in = Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap();
//! let check_out = Utc.with_ymd_and_hms(2025, 3, 3, 11, 0, 0).unwrap();
//! assert!(calendar.is_available(check_in, check_out));
//! ```

use crate::availability;
use crate::base::{BookingId, SuiteId};
use crate::booking::Booking;
use crate::error::BookingError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

#[derive(Debug)]
struct CalendarData {
    suite_id: SuiteId,
    bookings: Vec<Booking>,
}

impl CalendarData {
    fn new(suite_id: SuiteId) -> Self {
        Self {
            suite_id,
            bookings: Vec::new(),
        }
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.bookings.iter().all(|b| b.suite_id == self.suite_id),
            "Invariant violated: calendar for {} holds a foreign booking",
            self.suite_id
        );
        debug_assert!(
            self.bookings.iter().enumerate().all(|(i, a)| {
                !a.is_active()
                    || self.bookings[i + 1..]
                        .iter()
                        .all(|b| !availability::conflicts(b, a.check_in, a.check_out))
            }),
            "Invariant violated: overlapping active bookings on suite {}",
            self.suite_id
        );
    }

    fn position(&self, id: BookingId) -> Option<usize> {
        self.bookings.iter().position(|b| b.id == id)
    }

    /// Active bookings other than `skip` that intersect the range.
    fn is_free(
        &self,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        skip: Option<BookingId>,
    ) -> bool {
        availability::is_available(
            self.bookings.iter().filter(|b| Some(b.id) != skip),
            check_in,
            check_out,
        )
    }

    fn reserve(&mut self, booking: Booking) -> Result<(), BookingError> {
        if booking.suite_id != self.suite_id {
            return Err(BookingError::InvalidArgument(
                "booking belongs to another suite".to_string(),
            ));
        }
        if self.position(booking.id).is_some() {
            return Err(BookingError::Conflict("booking already exists".to_string()));
        }
        if booking.is_active() && !self.is_free(booking.check_in, booking.check_out, None) {
            return Err(BookingError::dates_unavailable());
        }
        self.bookings.push(booking);
        self.assert_invariants();
        Ok(())
    }

    fn modify(
        &mut self,
        id: BookingId,
        change: &mut dyn FnMut(&mut Booking) -> Result<(), BookingError>,
    ) -> Result<Booking, BookingError> {
        let index = self.position(id).ok_or_else(BookingError::booking_not_found)?;

        // Work on a copy so a rejected change leaves the stored booking intact.
        let mut updated = self.bookings[index].clone();
        change(&mut updated)?;

        if updated.id != id || updated.suite_id != self.suite_id {
            return Err(BookingError::InvalidArgument(
                "booking id and suite cannot change".to_string(),
            ));
        }
        if updated.is_active() && !self.is_free(updated.check_in, updated.check_out, Some(id)) {
            return Err(BookingError::dates_unavailable());
        }

        self.bookings[index] = updated.clone();
        self.assert_invariants();
        Ok(updated)
    }
}

/// All bookings of one suite.
#[derive(Debug)]
pub struct SuiteCalendar {
    inner: Mutex<CalendarData>,
}

impl SuiteCalendar {
    pub fn new(suite_id: SuiteId) -> Self {
        Self {
            inner: Mutex::new(CalendarData::new(suite_id)),
        }
    }

    pub fn suite_id(&self) -> SuiteId {
        self.inner.lock().suite_id
    }

    /// Inserts `booking` if it does not overlap an active booking.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Conflict`] - dates taken, or the id is already present.
    /// - [`BookingError::InvalidArgument`] - booking is for another suite.
    pub fn reserve(&self, booking: Booking) -> Result<(), BookingError> {
        self.inner.lock().reserve(booking)
    }

    /// Applies `change` to a booking and commits it only if the result still
    /// fits the calendar.
    pub fn modify(
        &self,
        id: BookingId,
        change: &mut dyn FnMut(&mut Booking) -> Result<(), BookingError>,
    ) -> Result<Booking, BookingError> {
        self.inner.lock().modify(id, change)
    }

    pub fn get(&self, id: BookingId) -> Option<Booking> {
        let data = self.inner.lock();
        data.position(id).map(|i| data.bookings[i].clone())
    }

    pub fn remove(&self, id: BookingId) -> Option<Booking> {
        let mut data = self.inner.lock();
        let index = data.position(id)?;
        Some(data.bookings.remove(index))
    }

    pub fn is_available(&self, check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> bool {
        self.inner.lock().is_free(check_in, check_out, None)
    }

    /// Returns `true` while any booking still claims the suite.
    pub fn has_active(&self) -> bool {
        self.inner.lock().bookings.iter().any(Booking::is_active)
    }

    /// Copies out every booking in insertion order.
    pub fn snapshot(&self) -> Vec<Booking> {
        self.inner.lock().bookings.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().bookings.is_empty()
    }
}
