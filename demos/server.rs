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

//! REST API server example for the hotel booking engine.
//!
//! Run with: cargo run --example server
//!
//! The server seeds one approved hotel with three suites owned by
//! `merchant_001` and prints their ids on startup.
//!
//! # Example requests
//!
//! ```bash
//! # Seeded hotel and suites
//! curl http://localhost:3000/catalog
//!
//! # Online booking
//! curl -X POST http://localhost:3000/bookings \
//!   -H "Content-Type: application/json" \
//!   -d '{"hotel_id": "<hotel>", "suite_id": "<suite>", "guest_name": "Ada",
//!        "guest_phone": "0800", "check_in": "2025-03-01T14:00:00Z",
//!        "check_out": "2025-03-03T11:00:00Z", "total_amount": "300.00"}'
//!
//! # Lifecycle step
//! curl -X POST http://localhost:3000/bookings/<id>/confirm
//!
//! # Availability
//! curl "http://localhost:3000/suites/<suite>/availability?check_in=2025-03-01T14:00:00Z&check_out=2025-03-02T11:00:00Z"
//!
//! # Merchant views
//! curl http://localhost:3000/owners/merchant_001/bookings
//! curl http://localhost:3000/owners/merchant_001/revenue
//! ```

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use hotel_booking_rs::{
    Booking, BookingEngine, BookingError, BookingId, BookingRequest, EngineConfig, Hotel, HotelId,
    InMemoryCatalog, Money, OwnerId, RevenueSummary, RoomType, Suite, SuiteDirectory, SuiteId,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

// === Request/Response DTOs ===

/// Query string for availability checks.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub suite_id: SuiteId,
    pub available: bool,
}

/// Seeded catalog returned by `GET /catalog`.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub owner_id: OwnerId,
    pub hotel: Hotel,
    pub suites: Vec<Suite>,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the booking engine.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BookingEngine>,
    pub catalog: Arc<InMemoryCatalog>,
    pub owner_id: OwnerId,
    pub hotel: Hotel,
}

// === Error Handling ===

/// Wrapper for converting `BookingError` into HTTP responses.
pub struct AppError(BookingError);

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            BookingError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            BookingError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            BookingError::PreconditionFailed(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "PRECONDITION_FAILED")
            }
            BookingError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            BookingError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            BookingError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE"),
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// GET /catalog - Seeded hotel and its suites.
async fn get_catalog(State(state): State<AppState>) -> Result<Json<CatalogResponse>, AppError> {
    let suites = state.catalog.suites_by_hotel(state.hotel.id)?;
    Ok(Json(CatalogResponse {
        owner_id: state.owner_id.clone(),
        hotel: state.hotel.clone(),
        suites,
    }))
}

/// POST /bookings - Create an online booking.
async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state.engine.create_booking(request)?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// POST /owners/{owner}/walk-ins - Front-desk booking by the hotel owner.
async fn create_walk_in(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state
        .engine
        .create_walk_in_booking(&OwnerId::new(owner), request)?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /bookings/{id} - Booking details.
async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.engine.get_booking_details(id)?))
}

/// POST /bookings/{id}/{action} - Apply a lifecycle step.
async fn apply_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(BookingId, String)>,
) -> Result<Json<Booking>, AppError> {
    let engine = &state.engine;
    let booking = match action.as_str() {
        "confirm" => engine.confirm_booking(id)?,
        "check-in" => engine.check_in_guest(id)?,
        "check-out" => engine.check_out_guest(id)?,
        "cancel" => engine.cancel_booking(id)?,
        "no-show" => engine.mark_no_show(id)?,
        "complete" => engine.complete_booking(id)?,
        other => {
            return Err(BookingError::InvalidArgument(format!("unknown action: {other}")).into());
        }
    };
    Ok(Json(booking))
}

/// GET /suites/{id}/availability - Date-range availability for a suite.
async fn get_availability(
    State(state): State<AppState>,
    Path(suite_id): Path<SuiteId>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let available = state.engine.check_suite_availability_for_dates(
        suite_id,
        query.check_in,
        query.check_out,
    )?;
    Ok(Json(AvailabilityResponse {
        suite_id,
        available,
    }))
}

/// GET /hotels/{id}/booked-rooms - Bookings currently holding a room.
async fn get_booked_rooms(
    State(state): State<AppState>,
    Path(hotel_id): Path<HotelId>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.engine.get_booked_rooms_by_hotel(hotel_id)?))
}

/// GET /owners/{owner}/bookings - Every booking across the owner's hotels.
async fn get_merchant_bookings(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(
        state
            .engine
            .get_bookings_for_merchant(&OwnerId::new(owner))?,
    ))
}

/// GET /owners/{owner}/revenue - Revenue summary across the owner's hotels.
async fn get_revenue(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<RevenueSummary>, AppError> {
    Ok(Json(
        state
            .engine
            .merchant_revenue_summary(&OwnerId::new(owner))?,
    ))
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/catalog", get(get_catalog))
        .route("/bookings", post(create_booking))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/{action}", post(apply_action))
        .route("/suites/{id}/availability", get(get_availability))
        .route("/hotels/{id}/booked-rooms", get(get_booked_rooms))
        .route("/owners/{owner}/walk-ins", post(create_walk_in))
        .route("/owners/{owner}/bookings", get(get_merchant_bookings))
        .route("/owners/{owner}/revenue", get(get_revenue))
        .with_state(state)
}

// === Seed Data ===

fn seed(engine: &BookingEngine, catalog: &InMemoryCatalog) -> Result<(OwnerId, Hotel), BookingError> {
    let owner_id = OwnerId::new("merchant_001");
    let hotel = catalog.add_hotel(Hotel::new(owner_id.clone(), "Seaside Hotel"));
    let hotel = catalog.approve_hotel(hotel.id)?;

    let rooms = [
        (101, "Garden Room", RoomType::Standard, 120),
        (201, "Ocean Deluxe", RoomType::Deluxe, 220),
        (301, "Penthouse", RoomType::Presidential, 900),
    ];
    for (room_number, name, room_type, price) in rooms {
        engine.register_suite(
            &owner_id,
            Suite::new(hotel.id, name, Money::from(price), room_number, room_type),
        )?;
    }
    Ok((owner_id, hotel))
}

// === Main ===

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let catalog = Arc::new(InMemoryCatalog::new());
    let engine = Arc::new(BookingEngine::in_memory(
        catalog.clone(),
        EngineConfig::default(),
    ));
    let (owner_id, hotel) = seed(&engine, &catalog)?;

    for suite in catalog.suites_by_hotel(hotel.id)? {
        info!(hotel_id = %hotel.id, suite_id = %suite.id, room_number = suite.room_number, "seeded suite");
    }

    let app = create_router(AppState {
        engine,
        catalog,
        owner_id,
        hotel,
    });

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    println!("Booking API server running on http://127.0.0.1:3000");
    println!();
    println!("Endpoints:");
    println!("  GET  /catalog                       - Seeded hotel and suites");
    println!("  POST /bookings                      - Create an online booking");
    println!("  GET  /bookings/:id                  - Booking details");
    println!("  POST /bookings/:id/:action          - confirm, check-in, check-out, cancel, no-show, complete");
    println!("  GET  /suites/:id/availability       - Availability for a date range");
    println!("  GET  /hotels/:id/booked-rooms       - Bookings holding a room");
    println!("  POST /owners/:owner/walk-ins        - Front-desk booking");
    println!("  GET  /owners/:owner/bookings        - Merchant bookings");
    println!("  GET  /owners/:owner/revenue         - Merchant revenue summary");

    axum::serve(listener, app).await?;
    Ok(())
}
