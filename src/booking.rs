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

//! Booking records and the booking lifecycle.
//!
//! Bookings follow a state machine:
//!
//! ```text
//!  PENDING ──confirm──► CONFIRMED ──check_in──► CHECKED_IN ──check_out──► CHECKED_OUT ──complete──► COMPLETED
//!  PENDING ──check_in──► CHECKED_IN
//!  PENDING | CONFIRMED ──no_show──► NO_SHOW
//!  PENDING | CONFIRMED | CHECKED_IN ──cancel──► CANCELLED
//! ```
//!
//! Walk-in bookings are created directly in [`BookingStatus::CheckedIn`].
//! Every successful transition stamps [`Booking::updated_at`].

use crate::base::{BookingId, HotelId, OwnerId, SuiteId};
use crate::error::{BookingError, InvalidTransition};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 7] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::CheckedIn,
        BookingStatus::CheckedOut,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::NoShow,
    ];

    /// Active bookings claim their suite for their dates.
    ///
    /// Only `CANCELLED`, `COMPLETED` and `CHECKED_OUT` release the suite.
    pub fn is_active(self) -> bool {
        !matches!(
            self,
            BookingStatus::Cancelled | BookingStatus::Completed | BookingStatus::CheckedOut
        )
    }

    /// Bookings reported as currently booked rooms.
    pub fn is_occupying(self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::CheckedIn
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::CheckedIn => "CHECKED_IN",
            BookingStatus::CheckedOut => "CHECKED_OUT",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::NoShow => "NO_SHOW",
        }
    }

    /// Returns the status reached by `transition`, or the guard violation.
    pub fn next(self, transition: Transition) -> Result<BookingStatus, InvalidTransition> {
        use BookingStatus::*;

        let allowed = match transition {
            Transition::Confirm => matches!(self, Pending),
            Transition::CheckIn => matches!(self, Pending | Confirmed),
            Transition::CheckOut => matches!(self, CheckedIn),
            Transition::Cancel => match self {
                Pending | Confirmed | CheckedIn => true,
                CheckedOut | Completed | Cancelled | NoShow => false,
            },
            Transition::MarkNoShow => matches!(self, Pending | Confirmed),
            Transition::Complete => matches!(self, CheckedOut),
        };

        if allowed {
            Ok(transition.target())
        } else {
            Err(InvalidTransition {
                from: self,
                to: transition.target(),
            })
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Confirm,
    CheckIn,
    CheckOut,
    Cancel,
    MarkNoShow,
    Complete,
}

impl Transition {
    pub fn target(self) -> BookingStatus {
        match self {
            Transition::Confirm => BookingStatus::Confirmed,
            Transition::CheckIn => BookingStatus::CheckedIn,
            Transition::CheckOut => BookingStatus::CheckedOut,
            Transition::Cancel => BookingStatus::Cancelled,
            Transition::MarkNoShow => BookingStatus::NoShow,
            Transition::Complete => BookingStatus::Completed,
        }
    }
}

/// How the booking reached the hotel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingChannel {
    Online,
    WalkIn,
}

impl fmt::Display for BookingChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingChannel::Online => f.write_str("ONLINE"),
            BookingChannel::WalkIn => f.write_str("WALK_IN"),
        }
    }
}

/// Guest contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// Input for creating a booking.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookingRequest {
    pub hotel_id: HotelId,
    pub suite_id: SuiteId,
    pub guest_name: String,
    pub guest_phone: String,
    #[serde(default)]
    pub guest_email: Option<String>,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub total_amount: Money,
    #[serde(default)]
    pub discount_amount: Money,
    #[serde(default = "default_guests")]
    pub number_of_guests: u32,
    #[serde(default)]
    pub special_requests: Option<String>,
}

fn default_guests() -> u32 {
    1
}

impl BookingRequest {
    /// Checks dates, guest details and amounts.
    pub fn validate(&self) -> Result<(), BookingError> {
        validate_dates(self.check_in, self.check_out)?;
        if self.guest_name.trim().is_empty() {
            return Err(BookingError::InvalidArgument("guest name is required".to_string()));
        }
        if self.guest_phone.trim().is_empty() {
            return Err(BookingError::InvalidArgument("guest phone is required".to_string()));
        }
        validate_guests(self.number_of_guests)?;
        validate_amounts(self.total_amount, self.discount_amount)
    }
}

fn validate_dates(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> Result<(), BookingError> {
    if check_in >= check_out {
        return Err(BookingError::InvalidArgument(
            "check-in must be before check-out".to_string(),
        ));
    }
    Ok(())
}

fn validate_guests(number_of_guests: u32) -> Result<(), BookingError> {
    if number_of_guests < 1 {
        return Err(BookingError::InvalidArgument(
            "number of guests must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_amounts(total: Money, discount: Money) -> Result<(), BookingError> {
    if !total.is_finite() || !total.is_positive() {
        return Err(BookingError::InvalidArgument(
            "total amount must be a positive finite amount".to_string(),
        ));
    }
    if !discount.is_finite() || discount.is_negative() {
        return Err(BookingError::InvalidArgument(
            "discount amount must be a non-negative finite amount".to_string(),
        ));
    }
    if discount > total {
        return Err(BookingError::InvalidArgument(
            "discount amount cannot exceed total amount".to_string(),
        ));
    }
    Ok(())
}

/// A reservation of one suite for a half-open time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub hotel_id: HotelId,
    pub suite_id: SuiteId,
    pub guest: Guest,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub channel: BookingChannel,
    pub status: BookingStatus,
    pub total_amount: Money,
    pub discount_amount: Money,
    pub number_of_guests: u32,
    pub special_requests: Option<String>,
    /// Owner who created the booking; set only for walk-ins.
    pub created_by_owner: Option<OwnerId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Guest-initiated booking awaiting confirmation.
    pub fn online(request: BookingRequest) -> Self {
        Self::from_request(request, BookingChannel::Online, BookingStatus::Pending, None)
    }

    /// Booking made at the front desk; the guest is already checked in.
    pub fn walk_in(request: BookingRequest, owner: OwnerId) -> Self {
        Self::from_request(
            request,
            BookingChannel::WalkIn,
            BookingStatus::CheckedIn,
            Some(owner),
        )
    }

    fn from_request(
        request: BookingRequest,
        channel: BookingChannel,
        status: BookingStatus,
        created_by_owner: Option<OwnerId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BookingId::new(),
            hotel_id: request.hotel_id,
            suite_id: request.suite_id,
            guest: Guest {
                name: request.guest_name,
                phone: request.guest_phone,
                email: request.guest_email,
            },
            check_in: request.check_in,
            check_out: request.check_out,
            channel,
            status,
            total_amount: request.total_amount,
            discount_amount: request.discount_amount,
            number_of_guests: request.number_of_guests,
            special_requests: request.special_requests,
            created_by_owner,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Total less discount.
    pub fn amount_due(&self) -> Money {
        self.total_amount - self.discount_amount
    }

    /// Applies a guarded lifecycle step.
    pub fn apply(&mut self, transition: Transition) -> Result<(), InvalidTransition> {
        self.status = self.status.next(transition)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Allow-listed changes to an existing booking.
///
/// Status, channel, hotel, suite and owner are not updatable here; unknown
/// fields are rejected at deserialization.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BookingUpdate {
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_email: Option<String>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub total_amount: Option<Money>,
    pub discount_amount: Option<Money>,
    pub number_of_guests: Option<u32>,
    pub special_requests: Option<String>,
}

impl BookingUpdate {
    pub fn is_empty(&self) -> bool {
        self.guest_name.is_none()
            && self.guest_phone.is_none()
            && self.guest_email.is_none()
            && self.check_in.is_none()
            && self.check_out.is_none()
            && self.total_amount.is_none()
            && self.discount_amount.is_none()
            && self.number_of_guests.is_none()
            && self.special_requests.is_none()
    }

    pub fn changes_dates(&self) -> bool {
        self.check_in.is_some() || self.check_out.is_some()
    }

    /// Validates each supplied field and writes them into `booking`.
    ///
    /// On error `booking` is left untouched.
    pub fn apply_to(&self, booking: &mut Booking) -> Result<(), BookingError> {
        if self.is_empty() {
            return Err(BookingError::InvalidArgument(
                "no data provided for update".to_string(),
            ));
        }

        if self.guest_name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(BookingError::InvalidArgument("guest name is required".to_string()));
        }
        if self.guest_phone.as_deref().is_some_and(|phone| phone.trim().is_empty()) {
            return Err(BookingError::InvalidArgument("guest phone is required".to_string()));
        }

        let check_in = self.check_in.unwrap_or(booking.check_in);
        let check_out = self.check_out.unwrap_or(booking.check_out);
        validate_dates(check_in, check_out)?;

        let number_of_guests = self.number_of_guests.unwrap_or(booking.number_of_guests);
        validate_guests(number_of_guests)?;

        let total = self.total_amount.unwrap_or(booking.total_amount);
        let discount = self.discount_amount.unwrap_or(booking.discount_amount);
        validate_amounts(total, discount)?;

        if let Some(name) = &self.guest_name {
            booking.guest.name = name.clone();
        }
        if let Some(phone) = &self.guest_phone {
            booking.guest.phone = phone.clone();
        }
        if let Some(email) = &self.guest_email {
            booking.guest.email = Some(email.clone());
        }
        if let Some(requests) = &self.special_requests {
            booking.special_requests = Some(requests.clone());
        }
        booking.check_in = check_in;
        booking.check_out = check_out;
        booking.number_of_guests = number_of_guests;
        booking.total_amount = total;
        booking.discount_amount = discount;
        booking.updated_at = Utc::now();
        Ok(())
    }
}
