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

//! Thread-safe booking id index.
//!
//! Maps every booking id to the suite whose calendar holds it, so lookups
//! by id do not scan all calendars.

use crate::base::{BookingId, SuiteId};
use crate::error::BookingError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// A concurrent booking id index with duplicate detection.
///
/// Guards are released before returning, so callers never hold an index
/// shard while they lock a calendar.
#[derive(Debug)]
pub struct BookingIndex {
    suites: DashMap<BookingId, SuiteId>,
}

impl BookingIndex {
    pub fn new() -> Self {
        Self {
            suites: DashMap::new(),
        }
    }

    /// Claims `booking_id` for `suite_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Conflict`] if the id is already indexed.
    pub fn claim(&self, booking_id: BookingId, suite_id: SuiteId) -> Result<(), BookingError> {
        // Entry API keeps check-and-insert atomic under concurrent claims
        match self.suites.entry(booking_id) {
            Entry::Occupied(_) => Err(BookingError::Conflict("booking already exists".to_string())),
            Entry::Vacant(entry) => {
                entry.insert(suite_id);
                Ok(())
            }
        }
    }

    pub fn suite_of(&self, booking_id: BookingId) -> Option<SuiteId> {
        self.suites.get(&booking_id).map(|entry| *entry)
    }

    pub fn release(&self, booking_id: BookingId) -> Option<SuiteId> {
        self.suites.remove(&booking_id).map(|(_, suite_id)| suite_id)
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}

impl Default for BookingIndex {
    fn default() -> Self {
        Self::new()
    }
}
