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

//! Hotels and suites as seen by the booking engine.
//!
//! The engine only reads hotel records and writes the suite availability
//! flag. Everything else about a hotel lives with the catalog owner.

use crate::base::{HotelId, OwnerId, SuiteId};
use crate::error::BookingError;
use crate::money::Money;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotel {
    pub id: HotelId,
    pub owner_id: OwnerId,
    pub name: String,
    pub is_open: bool,
    pub is_approved: bool,
}

impl Hotel {
    /// New hotels start open but await admin approval.
    pub fn new(owner_id: OwnerId, name: impl Into<String>) -> Self {
        Self {
            id: HotelId::new(),
            owner_id,
            name: name.into(),
            is_open: true,
            is_approved: false,
        }
    }

    pub fn is_owned_by(&self, owner_id: &OwnerId) -> bool {
        &self.owner_id == owner_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    Standard,
    Deluxe,
    Executive,
    Presidential,
    Family,
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoomType::Standard => "STANDARD",
            RoomType::Deluxe => "DELUXE",
            RoomType::Executive => "EXECUTIVE",
            RoomType::Presidential => "PRESIDENTIAL",
            RoomType::Family => "FAMILY",
        };
        f.write_str(name)
    }
}

/// A bookable unit inside a hotel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suite {
    pub id: SuiteId,
    pub hotel_id: HotelId,
    pub name: String,
    pub price: Money,
    pub room_number: u32,
    pub room_type: RoomType,
    #[serde(default)]
    pub facilities: Vec<String>,
    /// Coarse "can be booked" switch. The engine may clear it on booking
    /// depending on [`crate::SuiteHoldPolicy`].
    pub is_available: bool,
}

impl Suite {
    pub fn new(
        hotel_id: HotelId,
        name: impl Into<String>,
        price: Money,
        room_number: u32,
        room_type: RoomType,
    ) -> Self {
        Self {
            id: SuiteId::new(),
            hotel_id,
            name: name.into(),
            price,
            room_number,
            room_type,
            facilities: Vec::new(),
            is_available: true,
        }
    }
}

/// Read access to hotels plus the open/closed switch.
pub trait HotelDirectory: Send + Sync {
    fn hotel(&self, id: HotelId) -> Result<Option<Hotel>, BookingError>;

    fn hotels_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Hotel>, BookingError>;

    fn set_open(&self, id: HotelId, is_open: bool) -> Result<Hotel, BookingError>;
}

/// Suite storage.
pub trait SuiteDirectory: Send + Sync {
    fn suite(&self, id: SuiteId) -> Result<Option<Suite>, BookingError>;

    fn suites_by_hotel(&self, hotel_id: HotelId) -> Result<Vec<Suite>, BookingError>;

    /// Inserts or replaces a suite.
    fn save(&self, suite: Suite) -> Result<Suite, BookingError>;

    fn remove(&self, id: SuiteId) -> Result<Option<Suite>, BookingError>;

    /// Clears the availability flag if it is set, as one atomic step.
    /// Returns `false` when the suite is missing or already held.
    fn hold_if_available(&self, id: SuiteId) -> Result<bool, BookingError>;

    /// Sets the availability flag back. A missing suite is ignored.
    fn release_hold(&self, id: SuiteId) -> Result<(), BookingError>;
}

/// In-process hotel and suite directory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    hotels: DashMap<HotelId, Hotel>,
    suites: DashMap<SuiteId, Suite>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hotel as-is, replacing any hotel with the same id.
    pub fn add_hotel(&self, hotel: Hotel) -> Hotel {
        self.hotels.insert(hotel.id, hotel.clone());
        hotel
    }

    /// Marks a hotel approved by an admin.
    pub fn approve_hotel(&self, id: HotelId) -> Result<Hotel, BookingError> {
        let mut hotel = self
            .hotels
            .get_mut(&id)
            .ok_or_else(BookingError::hotel_not_found)?;
        hotel.is_approved = true;
        Ok(hotel.clone())
    }
}

impl HotelDirectory for InMemoryCatalog {
    fn hotel(&self, id: HotelId) -> Result<Option<Hotel>, BookingError> {
        Ok(self.hotels.get(&id).map(|hotel| hotel.clone()))
    }

    fn hotels_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Hotel>, BookingError> {
        let mut hotels: Vec<Hotel> = self
            .hotels
            .iter()
            .filter(|hotel| hotel.is_owned_by(owner_id))
            .map(|hotel| hotel.clone())
            .collect();
        hotels.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(hotels)
    }

    fn set_open(&self, id: HotelId, is_open: bool) -> Result<Hotel, BookingError> {
        let mut hotel = self
            .hotels
            .get_mut(&id)
            .ok_or_else(BookingError::hotel_not_found)?;
        hotel.is_open = is_open;
        Ok(hotel.clone())
    }
}

impl SuiteDirectory for InMemoryCatalog {
    fn suite(&self, id: SuiteId) -> Result<Option<Suite>, BookingError> {
        Ok(self.suites.get(&id).map(|suite| suite.clone()))
    }

    fn suites_by_hotel(&self, hotel_id: HotelId) -> Result<Vec<Suite>, BookingError> {
        let mut suites: Vec<Suite> = self
            .suites
            .iter()
            .filter(|suite| suite.hotel_id == hotel_id)
            .map(|suite| suite.clone())
            .collect();
        suites.sort_by_key(|suite| suite.room_number);
        Ok(suites)
    }

    fn save(&self, suite: Suite) -> Result<Suite, BookingError> {
        self.suites.insert(suite.id, suite.clone());
        Ok(suite)
    }

    fn remove(&self, id: SuiteId) -> Result<Option<Suite>, BookingError> {
        Ok(self.suites.remove(&id).map(|(_, suite)| suite))
    }

    fn hold_if_available(&self, id: SuiteId) -> Result<bool, BookingError> {
        // The shard write lock makes the read and the flip one step.
        Ok(match self.suites.get_mut(&id) {
            Some(mut suite) if suite.is_available => {
                suite.is_available = false;
                true
            }
            _ => false,
        })
    }

    fn release_hold(&self, id: SuiteId) -> Result<(), BookingError> {
        if let Some(mut suite) = self.suites.get_mut(&id) {
            suite.is_available = true;
        }
        Ok(())
    }
}
