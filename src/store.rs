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

//! Booking persistence.
//!
//! [`BookingRepository`] is the seam between the engine and storage. Every
//! implementation must make [`BookingRepository::create_if_available`] and
//! [`BookingRepository::modify`] atomic with respect to the overlap check:
//! the engine's own availability read is only a fast-fail pre-check.
//!
//! # Thread Safety
//!
//! [`InMemoryBookingStore`] keeps one [`SuiteCalendar`] per suite in a
//! [`DashMap`]. Calendars are cloned out of the map before they are locked,
//! so no map shard is held while a calendar mutex is taken and bookings on
//! different suites never contend.

use crate::base::{BookingId, HotelId, SuiteId};
use crate::booking::Booking;
use crate::calendar::SuiteCalendar;
use crate::error::BookingError;
use crate::index::BookingIndex;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// A change applied to a stored booking under the suite lock.
pub type BookingChange<'a> = &'a mut dyn FnMut(&mut Booking) -> Result<(), BookingError>;

/// Storage for bookings.
pub trait BookingRepository: Send + Sync {
    /// Persists `booking` unless an active booking on the same suite overlaps
    /// it, checking and writing as one atomic step.
    ///
    /// # Errors
    ///
    /// [`BookingError::Conflict`] if the dates are taken.
    fn create_if_available(&self, booking: Booking) -> Result<Booking, BookingError>;

    fn get(&self, id: BookingId) -> Result<Option<Booking>, BookingError>;

    fn find_by_suite(&self, suite_id: SuiteId) -> Result<Vec<Booking>, BookingError>;

    fn find_by_hotel(&self, hotel_id: HotelId) -> Result<Vec<Booking>, BookingError>;

    fn find_all(&self) -> Result<Vec<Booking>, BookingError>;

    fn is_available(
        &self,
        suite_id: SuiteId,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> Result<bool, BookingError>;

    /// Applies `change` to a copy of the booking and stores it only if the
    /// result still does not overlap another active booking.
    fn modify(&self, id: BookingId, change: BookingChange<'_>) -> Result<Booking, BookingError>;

    /// Removes a booking regardless of its status.
    fn delete(&self, id: BookingId) -> Result<Booking, BookingError>;
}

/// In-process [`BookingRepository`].
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    calendars: DashMap<SuiteId, Arc<SuiteCalendar>>,
    index: BookingIndex,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn calendar(&self, suite_id: SuiteId) -> Option<Arc<SuiteCalendar>> {
        self.calendars.get(&suite_id).map(|entry| Arc::clone(&entry))
    }

    fn calendar_or_create(&self, suite_id: SuiteId) -> Arc<SuiteCalendar> {
        let entry = self
            .calendars
            .entry(suite_id)
            .or_insert_with(|| Arc::new(SuiteCalendar::new(suite_id)));
        Arc::clone(&entry)
    }

    fn calendar_of(&self, id: BookingId) -> Result<Arc<SuiteCalendar>, BookingError> {
        self.index
            .suite_of(id)
            .and_then(|suite_id| self.calendar(suite_id))
            .ok_or_else(BookingError::booking_not_found)
    }

    fn all_calendars(&self) -> Vec<Arc<SuiteCalendar>> {
        self.calendars
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    fn collect_where(&self, keep: impl Fn(&Booking) -> bool) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .all_calendars()
            .iter()
            .flat_map(|calendar| calendar.snapshot())
            .filter(|booking| keep(booking))
            .collect();
        bookings.sort_by_key(|booking| (booking.created_at, booking.id));
        bookings
    }

    /// Number of stored bookings.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl BookingRepository for InMemoryBookingStore {
    fn create_if_available(&self, booking: Booking) -> Result<Booking, BookingError> {
        let (id, suite_id) = (booking.id, booking.suite_id);
        self.index.claim(id, suite_id)?;

        let calendar = self.calendar_or_create(suite_id);
        if let Err(err) = calendar.reserve(booking.clone()) {
            self.index.release(id);
            return Err(err);
        }
        Ok(booking)
    }

    fn get(&self, id: BookingId) -> Result<Option<Booking>, BookingError> {
        Ok(self
            .index
            .suite_of(id)
            .and_then(|suite_id| self.calendar(suite_id))
            .and_then(|calendar| calendar.get(id)))
    }

    fn find_by_suite(&self, suite_id: SuiteId) -> Result<Vec<Booking>, BookingError> {
        Ok(self
            .calendar(suite_id)
            .map(|calendar| calendar.snapshot())
            .unwrap_or_default())
    }

    fn find_by_hotel(&self, hotel_id: HotelId) -> Result<Vec<Booking>, BookingError> {
        Ok(self.collect_where(|booking| booking.hotel_id == hotel_id))
    }

    fn find_all(&self) -> Result<Vec<Booking>, BookingError> {
        Ok(self.collect_where(|_| true))
    }

    fn is_available(
        &self,
        suite_id: SuiteId,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> Result<bool, BookingError> {
        Ok(self
            .calendar(suite_id)
            .is_none_or(|calendar| calendar.is_available(check_in, check_out)))
    }

    fn modify(&self, id: BookingId, change: BookingChange<'_>) -> Result<Booking, BookingError> {
        self.calendar_of(id)?.modify(id, change)
    }

    fn delete(&self, id: BookingId) -> Result<Booking, BookingError> {
        let removed = self
            .calendar_of(id)?
            .remove(id)
            .ok_or_else(BookingError::booking_not_found)?;
        self.index.release(id);
        Ok(removed)
    }
}
