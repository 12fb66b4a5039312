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

//! Error types for booking operations.

use crate::booking::BookingStatus;
use crate::money::MoneyError;
use thiserror::Error;

/// Booking engine errors.
///
/// Every variant carries a human-readable reason. None of them are retried
/// internally; retry policy belongs to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Hotel, suite or booking does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed input such as inverted dates or blank identifiers
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Hotel closed, suite unavailable or an illegal state transition
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// Requested dates overlap an active booking
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller does not own the hotel
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Failure reported by a storage collaborator, propagated unchanged
    #[error("storage failure: {0}")]
    Storage(String),
}

impl BookingError {
    pub(crate) fn hotel_not_found() -> Self {
        Self::NotFound("hotel not found".to_string())
    }

    pub(crate) fn suite_not_found() -> Self {
        Self::NotFound("suite not found".to_string())
    }

    pub(crate) fn booking_not_found() -> Self {
        Self::NotFound("booking not found".to_string())
    }

    pub(crate) fn dates_unavailable() -> Self {
        Self::Conflict("suite not available for selected dates".to_string())
    }

    pub(crate) fn not_authorized() -> Self {
        Self::Forbidden("not authorized".to_string())
    }
}

/// A lifecycle transition was requested from a state whose guard rejects it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: BookingStatus,
    pub to: BookingStatus,
}

impl From<InvalidTransition> for BookingError {
    fn from(err: InvalidTransition) -> Self {
        BookingError::PreconditionFailed(err.to_string())
    }
}

impl From<MoneyError> for BookingError {
    fn from(err: MoneyError) -> Self {
        BookingError::InvalidArgument(err.to_string())
    }
}
