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

//! Booking orchestration.
//!
//! The [`BookingEngine`] is the central component that turns booking
//! requests into stored bookings and drives them through their lifecycle.
//!
//! # Creating Bookings
//!
//! Guest and walk-in bookings run the same checks in order:
//!
//! 1. The hotel exists (walk-ins: and belongs to the calling owner).
//! 2. The hotel is open.
//! 3. The suite exists, belongs to the hotel and its availability flag is set.
//! 4. The request itself is valid (dates, guest details, amounts).
//! 5. No active booking on the suite overlaps the requested dates.
//! 6. Under [`SuiteHoldPolicy::HoldOnBooking`] the suite flag is taken with
//!    [`SuiteDirectory::hold_if_available`]; of two racing requests only one
//!    gets it.
//! 7. The booking is stored through
//!    [`BookingRepository::create_if_available`], which repeats step 5
//!    atomically. A rejected insert gives the hold back.
//!
//! Once a booking is stored or a transition committed, a failure to update
//! the suite flag is logged and the stored result is returned.
//!
//! # Thread Safety
//!
//! The engine holds only shared collaborators and is `Send + Sync`; wrap it
//! in an [`Arc`] and call it from any thread.

use crate::base::{BookingId, HotelId, OwnerId, SuiteId};
use crate::booking::{Booking, BookingChannel, BookingRequest, BookingStatus, BookingUpdate, Transition};
use crate::catalog::{Hotel, HotelDirectory, InMemoryCatalog, Suite, SuiteDirectory};
use crate::config::{EngineConfig, SuiteHoldPolicy};
use crate::error::BookingError;
use crate::money::Money;
use crate::report::{HotelDashboard, RevenueSummary};
use crate::store::{BookingRepository, InMemoryBookingStore};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hotel booking engine.
///
/// # Invariants
///
/// - No two active bookings on one suite overlap; enforced by the repository.
/// - Bookings change status only through [`Transition`]s.
/// - Walk-ins are created only by the owner of the hotel.
pub struct BookingEngine {
    hotels: Arc<dyn HotelDirectory>,
    suites: Arc<dyn SuiteDirectory>,
    bookings: Arc<dyn BookingRepository>,
    config: EngineConfig,
}

impl BookingEngine {
    pub fn new(
        hotels: Arc<dyn HotelDirectory>,
        suites: Arc<dyn SuiteDirectory>,
        bookings: Arc<dyn BookingRepository>,
        config: EngineConfig,
    ) -> Self {
        Self {
            hotels,
            suites,
            bookings,
            config,
        }
    }

    /// Engine over `catalog` for hotels and suites and a fresh in-memory
    /// booking store.
    pub fn in_memory(catalog: Arc<InMemoryCatalog>, config: EngineConfig) -> Self {
        Self::new(
            catalog.clone(),
            catalog,
            Arc::new(InMemoryBookingStore::new()),
            config,
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Formats `amount` in the configured currency.
    pub fn format_amount(&self, amount: Money) -> String {
        amount.format_currency(&self.config.currency)
    }

    // === Creation ===

    /// Books a suite for a guest. The booking starts `PENDING`.
    ///
    /// # Errors
    ///
    /// - [`BookingError::NotFound`] - unknown hotel or suite.
    /// - [`BookingError::PreconditionFailed`] - hotel closed or suite flag cleared.
    /// - [`BookingError::InvalidArgument`] - bad dates, guest details or amounts,
    ///   or a suite from another hotel.
    /// - [`BookingError::Conflict`] - dates overlap an active booking.
    pub fn create_booking(&self, request: BookingRequest) -> Result<Booking, BookingError> {
        let hotel = self.load_hotel(request.hotel_id)?;
        self.place(&hotel, request, Booking::online)
    }

    /// Books a suite at the front desk. The booking starts `CHECKED_IN`
    /// with channel `WALK_IN`.
    ///
    /// # Errors
    ///
    /// As [`Self::create_booking`], plus [`BookingError::Forbidden`] when
    /// `owner_id` does not own the hotel and [`BookingError::InvalidArgument`]
    /// when it is blank.
    pub fn create_walk_in_booking(
        &self,
        owner_id: &OwnerId,
        request: BookingRequest,
    ) -> Result<Booking, BookingError> {
        let hotel = self.owned_hotel(owner_id, request.hotel_id)?;
        self.place(&hotel, request, |request| {
            Booking::walk_in(request, owner_id.clone())
        })
    }

    fn place(
        &self,
        hotel: &Hotel,
        request: BookingRequest,
        build: impl FnOnce(BookingRequest) -> Booking,
    ) -> Result<Booking, BookingError> {
        if !hotel.is_open {
            warn!(hotel_id = %hotel.id, "booking rejected: hotel closed");
            return Err(BookingError::PreconditionFailed(
                "hotel currently closed".to_string(),
            ));
        }

        let suite = self.suite_in_hotel(hotel.id, request.suite_id)?;
        if !suite.is_available {
            warn!(suite_id = %suite.id, "booking rejected: suite not available");
            return Err(BookingError::PreconditionFailed(
                "suite not available".to_string(),
            ));
        }

        request.validate()?;

        // Fast-fail only; the store repeats this check under the suite lock.
        if !self
            .bookings
            .is_available(suite.id, request.check_in, request.check_out)?
        {
            warn!(suite_id = %suite.id, "booking rejected: dates overlap");
            return Err(BookingError::dates_unavailable());
        }

        let held = self.hold_suite(suite.id)?;
        let booking = match self.bookings.create_if_available(build(request)) {
            Ok(booking) => booking,
            Err(err) => {
                warn!(suite_id = %suite.id, error = %err, "booking insert rejected");
                if held {
                    self.undo_hold(suite.id);
                }
                return Err(err);
            }
        };

        info!(
            booking_id = %booking.id,
            hotel_id = %booking.hotel_id,
            suite_id = %booking.suite_id,
            channel = %booking.channel,
            status = %booking.status,
            "booking created"
        );
        Ok(booking)
    }

    // === Lifecycle ===

    /// `PENDING` -> `CONFIRMED`.
    pub fn confirm_booking(&self, id: BookingId) -> Result<Booking, BookingError> {
        self.transition(id, Transition::Confirm)
    }

    /// `PENDING` or `CONFIRMED` -> `CHECKED_IN`.
    pub fn check_in_guest(&self, id: BookingId) -> Result<Booking, BookingError> {
        self.transition(id, Transition::CheckIn)
    }

    /// `CHECKED_IN` -> `CHECKED_OUT`.
    pub fn check_out_guest(&self, id: BookingId) -> Result<Booking, BookingError> {
        self.transition(id, Transition::CheckOut)
    }

    /// Cancels a booking that has not finished.
    pub fn cancel_booking(&self, id: BookingId) -> Result<Booking, BookingError> {
        self.transition(id, Transition::Cancel)
    }

    /// `PENDING` or `CONFIRMED` -> `NO_SHOW`.
    pub fn mark_no_show(&self, id: BookingId) -> Result<Booking, BookingError> {
        self.transition(id, Transition::MarkNoShow)
    }

    /// `CHECKED_OUT` -> `COMPLETED`.
    pub fn complete_booking(&self, id: BookingId) -> Result<Booking, BookingError> {
        self.transition(id, Transition::Complete)
    }

    fn transition(&self, id: BookingId, transition: Transition) -> Result<Booking, BookingError> {
        let booking = self
            .bookings
            .modify(id, &mut |booking: &mut Booking| {
                booking.apply(transition).map_err(BookingError::from)
            })
            .inspect_err(|err| warn!(booking_id = %id, error = %err, "transition rejected"))?;

        info!(booking_id = %id, status = %booking.status, "booking transitioned");

        if !booking.is_active() {
            self.release_after_commit(booking.suite_id);
        }
        Ok(booking)
    }

    // === Suite hold ===

    /// Takes the suite's hold flag under [`SuiteHoldPolicy::HoldOnBooking`].
    /// Returns whether this call took it.
    fn hold_suite(&self, suite_id: SuiteId) -> Result<bool, BookingError> {
        if self.config.suite_hold != SuiteHoldPolicy::HoldOnBooking {
            return Ok(false);
        }
        if !self.suites.hold_if_available(suite_id)? {
            warn!(suite_id = %suite_id, "booking rejected: suite held concurrently");
            return Err(BookingError::PreconditionFailed(
                "suite not available".to_string(),
            ));
        }
        debug!(suite_id = %suite_id, "suite held");
        Ok(true)
    }

    /// Gives back a hold whose booking was not stored.
    fn undo_hold(&self, suite_id: SuiteId) {
        if let Err(err) = self.suites.release_hold(suite_id) {
            warn!(suite_id = %suite_id, error = %err, "failed to undo suite hold");
        }
    }

    /// Restores the flag once the suite has no active booking left. While
    /// the flag is cleared no new booking can take the suite, so the count
    /// cannot go stale before the release.
    fn release_suite(&self, suite_id: SuiteId) -> Result<(), BookingError> {
        if self.config.suite_hold != SuiteHoldPolicy::HoldOnBooking {
            return Ok(());
        }
        if self
            .bookings
            .find_by_suite(suite_id)?
            .iter()
            .any(Booking::is_active)
        {
            return Ok(());
        }
        self.suites.release_hold(suite_id)?;
        debug!(suite_id = %suite_id, "suite released");
        Ok(())
    }

    /// Releases after a committed change. The change stands even if the
    /// flag cannot be restored.
    fn release_after_commit(&self, suite_id: SuiteId) {
        if let Err(err) = self.release_suite(suite_id) {
            warn!(suite_id = %suite_id, error = %err, "failed to release suite hold");
        }
    }

    // === Queries ===

    pub fn get_booking_details(&self, id: BookingId) -> Result<Booking, BookingError> {
        self.bookings
            .get(id)?
            .ok_or_else(BookingError::booking_not_found)
    }

    /// Returns `true` if no active booking on the suite overlaps the range.
    pub fn check_suite_availability_for_dates(
        &self,
        suite_id: SuiteId,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> Result<bool, BookingError> {
        let available = self.bookings.is_available(suite_id, check_in, check_out)?;
        debug!(suite_id = %suite_id, available, "availability checked");
        Ok(available)
    }

    /// Bookings currently holding a room: `PENDING`, `CONFIRMED` or `CHECKED_IN`.
    pub fn get_booked_rooms_by_hotel(&self, hotel_id: HotelId) -> Result<Vec<Booking>, BookingError> {
        Ok(self
            .bookings
            .find_by_hotel(hotel_id)?
            .into_iter()
            .filter(|booking| booking.status.is_occupying())
            .collect())
    }

    /// Every booking across all hotels owned by `owner_id`.
    pub fn get_bookings_for_merchant(&self, owner_id: &OwnerId) -> Result<Vec<Booking>, BookingError> {
        require_owner(owner_id)?;
        let mut bookings = Vec::new();
        for hotel in self.hotels.hotels_by_owner(owner_id)? {
            bookings.extend(self.bookings.find_by_hotel(hotel.id)?);
        }
        bookings.sort_by_key(|booking| (booking.created_at, booking.id));
        Ok(bookings)
    }

    pub fn get_bookings_by_guest_phone(&self, phone: &str) -> Result<Vec<Booking>, BookingError> {
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(BookingError::InvalidArgument("guest phone is required".to_string()));
        }
        Ok(self
            .bookings
            .find_all()?
            .into_iter()
            .filter(|booking| booking.guest.phone == phone)
            .collect())
    }

    pub fn get_bookings_by_status(
        &self,
        hotel_id: HotelId,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, BookingError> {
        Ok(self
            .bookings
            .find_by_hotel(hotel_id)?
            .into_iter()
            .filter(|booking| booking.status == status)
            .collect())
    }

    /// Walk-in bookings created by `owner_id`.
    pub fn get_walk_ins_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Booking>, BookingError> {
        require_owner(owner_id)?;
        Ok(self
            .bookings
            .find_all()?
            .into_iter()
            .filter(|booking| {
                booking.channel == BookingChannel::WalkIn
                    && booking.created_by_owner.as_ref() == Some(owner_id)
            })
            .collect())
    }

    /// Bookings of one hotel, for its owner.
    pub fn get_merchant_bookings_by_hotel(
        &self,
        owner_id: &OwnerId,
        hotel_id: HotelId,
    ) -> Result<Vec<Booking>, BookingError> {
        self.owned_hotel(owner_id, hotel_id)?;
        self.bookings.find_by_hotel(hotel_id)
    }

    /// Bookings whose whole stay lies inside `[start, end]`, optionally
    /// limited to one hotel.
    pub fn get_bookings_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        hotel_id: Option<HotelId>,
    ) -> Result<Vec<Booking>, BookingError> {
        if start > end {
            return Err(BookingError::InvalidArgument(
                "range start must not be after range end".to_string(),
            ));
        }
        let bookings = match hotel_id {
            Some(hotel_id) => self.bookings.find_by_hotel(hotel_id)?,
            None => self.bookings.find_all()?,
        };
        Ok(bookings
            .into_iter()
            .filter(|booking| booking.check_in >= start && booking.check_out <= end)
            .collect())
    }

    // === Administration ===

    /// Applies an allow-listed update. Date changes are re-checked for
    /// overlap atomically.
    pub fn update_booking(
        &self,
        id: BookingId,
        update: &BookingUpdate,
    ) -> Result<Booking, BookingError> {
        let booking = self
            .bookings
            .modify(id, &mut |booking: &mut Booking| update.apply_to(booking))
            .inspect_err(|err| warn!(booking_id = %id, error = %err, "update rejected"))?;
        info!(booking_id = %id, dates_changed = update.changes_dates(), "booking updated");
        Ok(booking)
    }

    /// Removes a booking without going through the state machine.
    pub fn delete_booking(&self, id: BookingId) -> Result<Booking, BookingError> {
        let booking = self.bookings.delete(id)?;
        info!(booking_id = %id, status = %booking.status, "booking deleted");
        if booking.is_active() {
            self.release_after_commit(booking.suite_id);
        }
        Ok(booking)
    }

    pub fn set_hotel_open(
        &self,
        owner_id: &OwnerId,
        hotel_id: HotelId,
        is_open: bool,
    ) -> Result<Hotel, BookingError> {
        self.owned_hotel(owner_id, hotel_id)?;
        let hotel = self.hotels.set_open(hotel_id, is_open)?;
        info!(hotel_id = %hotel_id, is_open, "hotel availability set");
        Ok(hotel)
    }

    /// Owner override of the suite availability flag.
    pub fn set_suite_availability(
        &self,
        owner_id: &OwnerId,
        hotel_id: HotelId,
        suite_id: SuiteId,
        is_available: bool,
    ) -> Result<Suite, BookingError> {
        self.owned_hotel(owner_id, hotel_id)?;
        let mut suite = self.suite_in_hotel(hotel_id, suite_id)?;
        suite.is_available = is_available;
        let suite = self.suites.save(suite)?;
        info!(suite_id = %suite_id, is_available, "suite availability set");
        Ok(suite)
    }

    /// Adds a suite to an approved hotel owned by `owner_id`.
    pub fn register_suite(&self, owner_id: &OwnerId, suite: Suite) -> Result<Suite, BookingError> {
        let hotel = self.owned_hotel(owner_id, suite.hotel_id)?;
        if !hotel.is_approved {
            return Err(BookingError::PreconditionFailed(
                "hotel is not approved".to_string(),
            ));
        }
        if suite.name.trim().is_empty() {
            return Err(BookingError::InvalidArgument("suite name is required".to_string()));
        }
        if suite.room_number == 0 {
            return Err(BookingError::InvalidArgument(
                "room number must be positive".to_string(),
            ));
        }
        if !suite.price.is_finite() || !suite.price.is_positive() {
            return Err(BookingError::InvalidArgument(
                "suite price must be a positive finite amount".to_string(),
            ));
        }
        if self
            .suites
            .suites_by_hotel(hotel.id)?
            .iter()
            .any(|other| other.id != suite.id && other.room_number == suite.room_number)
        {
            return Err(BookingError::Conflict(
                "room number already exists in this hotel".to_string(),
            ));
        }

        let suite = self.suites.save(suite)?;
        info!(hotel_id = %hotel.id, suite_id = %suite.id, room_number = suite.room_number, "suite registered");
        Ok(suite)
    }

    /// Deletes a suite that has no active bookings.
    pub fn delete_suite(
        &self,
        owner_id: &OwnerId,
        hotel_id: HotelId,
        suite_id: SuiteId,
    ) -> Result<Suite, BookingError> {
        self.owned_hotel(owner_id, hotel_id)?;
        self.suite_in_hotel(hotel_id, suite_id)?;

        if self
            .bookings
            .find_by_suite(suite_id)?
            .iter()
            .any(Booking::is_active)
        {
            return Err(BookingError::PreconditionFailed(
                "cannot delete suite with active bookings".to_string(),
            ));
        }

        let suite = self
            .suites
            .remove(suite_id)?
            .ok_or_else(BookingError::suite_not_found)?;
        info!(hotel_id = %hotel_id, suite_id = %suite_id, "suite deleted");
        Ok(suite)
    }

    // === Reports ===

    pub fn merchant_revenue_summary(&self, owner_id: &OwnerId) -> Result<RevenueSummary, BookingError> {
        require_owner(owner_id)?;
        let hotels = self.hotels.hotels_by_owner(owner_id)?;
        let mut bookings = Vec::new();
        for hotel in &hotels {
            bookings.extend(self.bookings.find_by_hotel(hotel.id)?);
        }
        let summary = RevenueSummary::from_bookings(hotels.len(), &bookings);
        info!(
            total_bookings = summary.total_bookings,
            total_revenue = %self.format_amount(summary.total_revenue),
            "revenue summary computed"
        );
        Ok(summary)
    }

    pub fn hotel_dashboard(
        &self,
        owner_id: &OwnerId,
        hotel_id: HotelId,
        today: NaiveDate,
    ) -> Result<HotelDashboard, BookingError> {
        self.owned_hotel(owner_id, hotel_id)?;
        let suites = self.suites.suites_by_hotel(hotel_id)?;
        let bookings = self.bookings.find_by_hotel(hotel_id)?;
        Ok(HotelDashboard::build(&suites, &bookings, today))
    }

    // === Lookups ===

    fn load_hotel(&self, hotel_id: HotelId) -> Result<Hotel, BookingError> {
        self.hotels
            .hotel(hotel_id)?
            .ok_or_else(BookingError::hotel_not_found)
    }

    fn owned_hotel(&self, owner_id: &OwnerId, hotel_id: HotelId) -> Result<Hotel, BookingError> {
        require_owner(owner_id)?;
        let hotel = self.load_hotel(hotel_id)?;
        if !hotel.is_owned_by(owner_id) {
            warn!(hotel_id = %hotel_id, "owner does not own hotel");
            return Err(BookingError::not_authorized());
        }
        Ok(hotel)
    }

    fn suite_in_hotel(&self, hotel_id: HotelId, suite_id: SuiteId) -> Result<Suite, BookingError> {
        let suite = self
            .suites
            .suite(suite_id)?
            .ok_or_else(BookingError::suite_not_found)?;
        if suite.hotel_id != hotel_id {
            return Err(BookingError::InvalidArgument(
                "suite does not belong to this hotel".to_string(),
            ));
        }
        Ok(suite)
    }
}

fn require_owner(owner_id: &OwnerId) -> Result<(), BookingError> {
    if owner_id.is_blank() {
        return Err(BookingError::InvalidArgument("invalid owner id".to_string()));
    }
    Ok(())
}
