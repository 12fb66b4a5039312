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

//! # Hotel Booking
//!
//! This library provides a booking engine for hotel suites: date-range
//! availability, the booking lifecycle (confirm, check-in, check-out, cancel)
//! and walk-in bookings made at the front desk.
//!
//! ## Core Components
//!
//! - [`BookingEngine`]: Orchestrates booking creation and lifecycle operations
//! - [`Booking`]: A reservation and its [`BookingStatus`] state machine
//! - [`Money`]: Two-decimal monetary amounts with half-up rounding
//! - [`BookingRepository`]: Storage seam; [`InMemoryBookingStore`] never
//!   stores two overlapping active bookings on one suite
//! - [`BookingError`]: Error types for rejected operations
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::{TimeZone, Utc};
//! use hotel_booking_rs::{
//!     BookingEngine, BookingRequest, BookingStatus, EngineConfig, Hotel, InMemoryCatalog,
//!     Money, OwnerId, RoomType, Suite,
//! };
//!
//! let catalog = Arc::new(InMemoryCatalog::new());
//! let owner = OwnerId::new("merchant_001");
//! let hotel = catalog.add_hotel(Hotel::new(owner.clone(), "Seaside"));
//! catalog.approve_hotel(hotel.id).unwrap();
//!
//! let engine = BookingEngine::in_memory(catalog, EngineConfig::default());
//! let suite = engine
//!     .register_suite(&owner, Suite::new(hotel.id, "Ocean View", Money::from(120), 101, RoomType::Deluxe))
//!     .unwrap();
//!
//! let booking = engine
//!     .create_booking(BookingRequest {
//!         hotel_id: hotel.id,
//!         suite_id: suite.id,
//!         guest_name: "Alice".to_string(),
//!         guest_phone: "08045678901".to_string(),
//!         guest_email: None,
//!         check_in: Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap(),
//!         check_out: Utc.with_ymd_and_hms(2025, 3, 3, 11, 0, 0).unwrap(),
//!         total_amount: "240.00".parse().unwrap(),
//!         discount_amount: Money::zero(),
//!         number_of_guests: 2,
//!         special_requests: None,
//!     })
//!     .unwrap();
//! assert_eq!(booking.status, BookingStatus::Pending);
//!
//! let confirmed = engine.confirm_booking(booking.id).unwrap();
//! assert_eq!(confirmed.status, BookingStatus::Confirmed);
//! ```
//!
//! ## Thread Safety
//!
//! The engine is `Send + Sync`. Bookings on different suites proceed in
//! parallel; bookings on the same suite serialize on that suite's calendar.

pub mod availability;
mod base;
pub mod booking;
pub mod calendar;
pub mod catalog;
mod config;
mod engine;
pub mod error;
mod index;
pub mod money;
pub mod report;
pub mod store;

pub use base::{BookingId, HotelId, OwnerId, SuiteId};
pub use booking::{
    Booking, BookingChannel, BookingRequest, BookingStatus, BookingUpdate, Guest, Transition,
};
pub use calendar::SuiteCalendar;
pub use catalog::{Hotel, HotelDirectory, InMemoryCatalog, RoomType, Suite, SuiteDirectory};
pub use config::{EngineConfig, SuiteHoldPolicy};
pub use engine::BookingEngine;
pub use error::{BookingError, InvalidTransition};
pub use index::BookingIndex;
pub use money::{Money, MoneyError};
pub use report::{HotelDashboard, RevenueSummary};
pub use store::{BookingChange, BookingRepository, InMemoryBookingStore};
