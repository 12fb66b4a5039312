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

//! Engine public API integration tests.

use chrono::{DateTime, TimeZone, Utc};
use hotel_booking_rs::{
    BookingChannel, BookingEngine, BookingError, BookingRequest, BookingStatus, BookingUpdate,
    EngineConfig, Hotel, HotelDirectory, InMemoryCatalog, Money, OwnerId, RoomType, Suite,
    SuiteDirectory, SuiteHoldPolicy,
};
use std::sync::Arc;

struct Setup {
    engine: BookingEngine,
    catalog: Arc<InMemoryCatalog>,
    owner: OwnerId,
    hotel: Hotel,
    suite: Suite,
}

fn setup(policy: SuiteHoldPolicy) -> Setup {
    let catalog = Arc::new(InMemoryCatalog::new());
    let owner = OwnerId::new("merchant_001");
    let hotel = catalog.add_hotel(Hotel::new(owner.clone(), "Seaside"));
    let hotel = catalog.approve_hotel(hotel.id).unwrap();
    let engine = BookingEngine::in_memory(
        catalog.clone(),
        EngineConfig::default().with_suite_hold(policy),
    );
    let suite = engine
        .register_suite(
            &owner,
            Suite::new(hotel.id, "Ocean View", Money::from(120), 101, RoomType::Deluxe),
        )
        .unwrap();
    Setup {
        engine,
        catalog,
        owner,
        hotel,
        suite,
    }
}

fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
}

fn make_request(s: &Setup, check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> BookingRequest {
    BookingRequest {
        hotel_id: s.hotel.id,
        suite_id: s.suite.id,
        guest_name: "Alice Johnson".to_string(),
        guest_phone: "08045678901".to_string(),
        guest_email: Some("alice@example.com".to_string()),
        check_in,
        check_out,
        total_amount: "240.00".parse().unwrap(),
        discount_amount: Money::zero(),
        number_of_guests: 2,
        special_requests: None,
    }
}

fn suite_flag(s: &Setup) -> bool {
    s.catalog.suite(s.suite.id).unwrap().unwrap().is_available
}

// === Creation ===

#[test]
fn guest_booking_starts_pending_and_holds_suite() {
    let s = setup(SuiteHoldPolicy::HoldOnBooking);
    let booking = s
        .engine
        .create_booking(make_request(&s, ts(1, 14), ts(3, 11)))
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.channel, BookingChannel::Online);
    assert_eq!(booking.created_by_owner, None);
    assert!(!suite_flag(&s));
    assert_eq!(s.engine.get_booking_details(booking.id).unwrap(), booking);
}

#[test]
fn overlapping_request_conflicts_and_creates_nothing() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);
    s.engine
        .create_booking(make_request(&s, ts(1, 14), ts(3, 11)))
        .unwrap();

    let result = s
        .engine
        .create_booking(make_request(&s, ts(2, 10), ts(4, 10)));
    assert_eq!(
        result,
        Err(BookingError::Conflict(
            "suite not available for selected dates".to_string()
        ))
    );
    assert_eq!(s.engine.get_bookings_for_merchant(&s.owner).unwrap().len(), 1);
}

#[test]
fn touching_request_is_accepted_by_interval() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);
    s.engine
        .create_booking(make_request(&s, ts(1, 14), ts(3, 11)))
        .unwrap();
    let second = s
        .engine
        .create_booking(make_request(&s, ts(3, 11), ts(5, 11)))
        .unwrap();
    assert_eq!(second.status, BookingStatus::Pending);
    assert!(suite_flag(&s));
}

#[test]
fn held_suite_rejects_touching_request() {
    let s = setup(SuiteHoldPolicy::HoldOnBooking);
    s.engine
        .create_booking(make_request(&s, ts(1, 14), ts(3, 11)))
        .unwrap();
    let result = s
        .engine
        .create_booking(make_request(&s, ts(3, 11), ts(5, 11)));
    assert_eq!(
        result,
        Err(BookingError::PreconditionFailed("suite not available".to_string()))
    );
}

#[test]
fn closed_hotel_rejects_booking() {
    let s = setup(SuiteHoldPolicy::HoldOnBooking);
    s.engine.set_hotel_open(&s.owner, s.hotel.id, false).unwrap();

    let result = s
        .engine
        .create_booking(make_request(&s, ts(1, 14), ts(3, 11)));
    assert_eq!(
        result,
        Err(BookingError::PreconditionFailed("hotel currently closed".to_string()))
    );
}

#[test]
fn unknown_hotel_and_suite_are_not_found() {
    let s = setup(SuiteHoldPolicy::HoldOnBooking);

    let mut request = make_request(&s, ts(1, 14), ts(3, 11));
    request.hotel_id = hotel_booking_rs::HotelId::new();
    assert!(matches!(
        s.engine.create_booking(request),
        Err(BookingError::NotFound(_))
    ));

    let mut request = make_request(&s, ts(1, 14), ts(3, 11));
    request.suite_id = hotel_booking_rs::SuiteId::new();
    assert!(matches!(
        s.engine.create_booking(request),
        Err(BookingError::NotFound(_))
    ));
}

#[test]
fn suite_from_another_hotel_is_invalid() {
    let s = setup(SuiteHoldPolicy::HoldOnBooking);
    let other = s.catalog.add_hotel(Hotel::new(s.owner.clone(), "Hillside"));

    let mut request = make_request(&s, ts(1, 14), ts(3, 11));
    request.hotel_id = other.id;
    assert!(matches!(
        s.engine.create_booking(request),
        Err(BookingError::InvalidArgument(_))
    ));
}

#[test]
fn inverted_dates_are_invalid() {
    let s = setup(SuiteHoldPolicy::HoldOnBooking);
    let result = s
        .engine
        .create_booking(make_request(&s, ts(3, 11), ts(1, 14)));
    assert!(matches!(result, Err(BookingError::InvalidArgument(_))));
    assert!(suite_flag(&s));
}

// === Walk-ins ===

#[test]
fn walk_in_by_owner_is_checked_in() {
    let s = setup(SuiteHoldPolicy::HoldOnBooking);
    let booking = s
        .engine
        .create_walk_in_booking(&s.owner, make_request(&s, ts(1, 14), ts(2, 11)))
        .unwrap();

    assert_eq!(booking.status, BookingStatus::CheckedIn);
    assert_eq!(booking.channel, BookingChannel::WalkIn);
    assert_eq!(booking.created_by_owner, Some(s.owner.clone()));
    assert_eq!(s.engine.get_walk_ins_by_owner(&s.owner).unwrap(), vec![booking]);
}

#[test]
fn walk_in_by_other_owner_is_forbidden() {
    let s = setup(SuiteHoldPolicy::HoldOnBooking);
    let result = s.engine.create_walk_in_booking(
        &OwnerId::new("merchant_002"),
        make_request(&s, ts(1, 14), ts(2, 11)),
    );
    assert_eq!(
        result,
        Err(BookingError::Forbidden("not authorized".to_string()))
    );
    assert!(suite_flag(&s));
}

// === Lifecycle ===

#[test]
fn full_stay_lifecycle() {
    let s = setup(SuiteHoldPolicy::HoldOnBooking);
    let booking = s
        .engine
        .create_booking(make_request(&s, ts(1, 14), ts(3, 11)))
        .unwrap();

    let confirmed = s.engine.confirm_booking(booking.id).unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert!(confirmed.updated_at >= booking.updated_at);

    let checked_in = s.engine.check_in_guest(booking.id).unwrap();
    assert_eq!(checked_in.status, BookingStatus::CheckedIn);
    assert!(!suite_flag(&s));

    let checked_out = s.engine.check_out_guest(booking.id).unwrap();
    assert_eq!(checked_out.status, BookingStatus::CheckedOut);
    assert!(suite_flag(&s));

    let completed = s.engine.complete_booking(booking.id).unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);
}

#[test]
fn cancel_allowed_before_check_out() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);

    let pending = s
        .engine
        .create_booking(make_request(&s, ts(1, 14), ts(2, 11)))
        .unwrap();
    assert_eq!(
        s.engine.cancel_booking(pending.id).unwrap().status,
        BookingStatus::Cancelled
    );

    let confirmed = s
        .engine
        .create_booking(make_request(&s, ts(3, 14), ts(4, 11)))
        .unwrap();
    s.engine.confirm_booking(confirmed.id).unwrap();
    assert!(s.engine.cancel_booking(confirmed.id).is_ok());

    let checked_in = s
        .engine
        .create_booking(make_request(&s, ts(5, 14), ts(6, 11)))
        .unwrap();
    s.engine.check_in_guest(checked_in.id).unwrap();
    assert!(s.engine.cancel_booking(checked_in.id).is_ok());
}

#[test]
fn cancel_rejected_after_stay() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);
    let booking = s
        .engine
        .create_walk_in_booking(&s.owner, make_request(&s, ts(1, 14), ts(2, 11)))
        .unwrap();
    s.engine.check_out_guest(booking.id).unwrap();

    assert_eq!(
        s.engine.cancel_booking(booking.id),
        Err(BookingError::PreconditionFailed(
            "invalid transition from CHECKED_OUT to CANCELLED".to_string()
        ))
    );

    s.engine.complete_booking(booking.id).unwrap();
    assert!(matches!(
        s.engine.cancel_booking(booking.id),
        Err(BookingError::PreconditionFailed(_))
    ));
}

#[test]
fn check_in_rejected_after_check_out_or_cancel() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);

    let stayed = s
        .engine
        .create_walk_in_booking(&s.owner, make_request(&s, ts(1, 14), ts(2, 11)))
        .unwrap();
    s.engine.check_out_guest(stayed.id).unwrap();
    assert!(matches!(
        s.engine.check_in_guest(stayed.id),
        Err(BookingError::PreconditionFailed(_))
    ));

    let cancelled = s
        .engine
        .create_booking(make_request(&s, ts(3, 14), ts(4, 11)))
        .unwrap();
    s.engine.cancel_booking(cancelled.id).unwrap();
    assert!(matches!(
        s.engine.check_in_guest(cancelled.id),
        Err(BookingError::PreconditionFailed(_))
    ));
}

#[test]
fn no_show_blocks_cancellation_and_keeps_dates() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);
    let booking = s
        .engine
        .create_booking(make_request(&s, ts(1, 14), ts(3, 11)))
        .unwrap();
    s.engine.mark_no_show(booking.id).unwrap();

    assert!(s.engine.cancel_booking(booking.id).is_err());
    assert!(!s
        .engine
        .check_suite_availability_for_dates(s.suite.id, ts(2, 0), ts(2, 12))
        .unwrap());
}

#[test]
fn unknown_booking_is_not_found() {
    let s = setup(SuiteHoldPolicy::HoldOnBooking);
    let id = hotel_booking_rs::BookingId::new();
    assert_eq!(
        s.engine.confirm_booking(id),
        Err(BookingError::NotFound("booking not found".to_string()))
    );
    assert!(matches!(
        s.engine.get_booking_details(id),
        Err(BookingError::NotFound(_))
    ));
}

#[test]
fn cancelled_booking_frees_dates() {
    let s = setup(SuiteHoldPolicy::HoldOnBooking);
    let first = s
        .engine
        .create_booking(make_request(&s, ts(1, 14), ts(3, 11)))
        .unwrap();
    s.engine.cancel_booking(first.id).unwrap();

    assert!(suite_flag(&s));
    assert!(s
        .engine
        .create_booking(make_request(&s, ts(2, 0), ts(4, 0)))
        .is_ok());
}

// === Queries ===

#[test]
fn booked_rooms_exclude_finished_bookings() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);
    let pending = s
        .engine
        .create_booking(make_request(&s, ts(1, 14), ts(2, 11)))
        .unwrap();
    let cancelled = s
        .engine
        .create_booking(make_request(&s, ts(3, 14), ts(4, 11)))
        .unwrap();
    s.engine.cancel_booking(cancelled.id).unwrap();
    let no_show = s
        .engine
        .create_booking(make_request(&s, ts(5, 14), ts(6, 11)))
        .unwrap();
    s.engine.mark_no_show(no_show.id).unwrap();

    let booked = s.engine.get_booked_rooms_by_hotel(s.hotel.id).unwrap();
    assert_eq!(booked.iter().map(|b| b.id).collect::<Vec<_>>(), vec![pending.id]);

    let cancelled_list = s
        .engine
        .get_bookings_by_status(s.hotel.id, BookingStatus::Cancelled)
        .unwrap();
    assert_eq!(cancelled_list.len(), 1);
    assert_eq!(cancelled_list[0].id, cancelled.id);
}

#[test]
fn merchant_sees_bookings_of_all_hotels() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);
    let second_hotel = s.catalog.add_hotel(Hotel::new(s.owner.clone(), "Hillside"));
    s.catalog.approve_hotel(second_hotel.id).unwrap();
    let second_suite = s
        .engine
        .register_suite(
            &s.owner,
            Suite::new(second_hotel.id, "Garden", Money::from(90), 1, RoomType::Standard),
        )
        .unwrap();

    s.engine
        .create_booking(make_request(&s, ts(1, 14), ts(2, 11)))
        .unwrap();
    let mut request = make_request(&s, ts(1, 14), ts(2, 11));
    request.hotel_id = second_hotel.id;
    request.suite_id = second_suite.id;
    s.engine.create_booking(request).unwrap();

    assert_eq!(s.engine.get_bookings_for_merchant(&s.owner).unwrap().len(), 2);
    assert!(s
        .engine
        .get_bookings_for_merchant(&OwnerId::new("merchant_002"))
        .unwrap()
        .is_empty());
    assert_eq!(s.catalog.hotels_by_owner(&s.owner).unwrap().len(), 2);
}

#[test]
fn bookings_by_guest_phone() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);
    s.engine
        .create_booking(make_request(&s, ts(1, 14), ts(2, 11)))
        .unwrap();
    let mut other = make_request(&s, ts(3, 14), ts(4, 11));
    other.guest_phone = "0700".to_string();
    s.engine.create_booking(other).unwrap();

    assert_eq!(s.engine.get_bookings_by_guest_phone("08045678901").unwrap().len(), 1);
    assert!(matches!(
        s.engine.get_bookings_by_guest_phone(" "),
        Err(BookingError::InvalidArgument(_))
    ));
}

#[test]
fn merchant_bookings_by_hotel_checks_ownership() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);
    let booking = s
        .engine
        .create_booking(make_request(&s, ts(1, 14), ts(2, 11)))
        .unwrap();

    let listed = s
        .engine
        .get_merchant_bookings_by_hotel(&s.owner, s.hotel.id)
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, booking.id);

    assert!(matches!(
        s.engine
            .get_merchant_bookings_by_hotel(&OwnerId::new("merchant_002"), s.hotel.id),
        Err(BookingError::Forbidden(_))
    ));
    assert!(matches!(
        s.engine
            .get_merchant_bookings_by_hotel(&s.owner, hotel_booking_rs::HotelId::new()),
        Err(BookingError::NotFound(_))
    ));
    assert!(matches!(
        s.engine
            .get_merchant_bookings_by_hotel(&OwnerId::new(""), s.hotel.id),
        Err(BookingError::InvalidArgument(_))
    ));
}

#[test]
fn bookings_by_date_range_keep_stays_inside_window() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);
    let inside = s
        .engine
        .create_booking(make_request(&s, ts(2, 14), ts(4, 11)))
        .unwrap();
    s.engine
        .create_booking(make_request(&s, ts(5, 14), ts(8, 11)))
        .unwrap();

    let window = s
        .engine
        .get_bookings_by_date_range(ts(1, 0), ts(6, 0), None)
        .unwrap();
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].id, inside.id);

    let edges = s
        .engine
        .get_bookings_by_date_range(ts(2, 14), ts(8, 11), Some(s.hotel.id))
        .unwrap();
    assert_eq!(edges.len(), 2);

    assert!(s
        .engine
        .get_bookings_by_date_range(ts(1, 0), ts(30, 0), Some(hotel_booking_rs::HotelId::new()))
        .unwrap()
        .is_empty());
    assert!(matches!(
        s.engine.get_bookings_by_date_range(ts(6, 0), ts(1, 0), None),
        Err(BookingError::InvalidArgument(_))
    ));
}

// === Administration ===

#[test]
fn update_moves_dates_when_free() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);
    let first = s
        .engine
        .create_booking(make_request(&s, ts(1, 14), ts(3, 11)))
        .unwrap();
    s.engine
        .create_booking(make_request(&s, ts(5, 14), ts(7, 11)))
        .unwrap();

    let update = BookingUpdate {
        check_out: Some(ts(4, 11)),
        special_requests: Some("late checkout".to_string()),
        ..Default::default()
    };
    let updated = s.engine.update_booking(first.id, &update).unwrap();
    assert_eq!(updated.check_out, ts(4, 11));
    assert_eq!(updated.status, BookingStatus::Pending);

    let clash = BookingUpdate {
        check_out: Some(ts(6, 0)),
        ..Default::default()
    };
    assert!(matches!(
        s.engine.update_booking(first.id, &clash),
        Err(BookingError::Conflict(_))
    ));
    assert_eq!(
        s.engine.get_booking_details(first.id).unwrap().check_out,
        ts(4, 11)
    );
}

#[test]
fn empty_update_is_invalid() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);
    let booking = s
        .engine
        .create_booking(make_request(&s, ts(1, 14), ts(3, 11)))
        .unwrap();
    assert!(matches!(
        s.engine.update_booking(booking.id, &BookingUpdate::default()),
        Err(BookingError::InvalidArgument(_))
    ));
}

#[test]
fn suite_availability_override_requires_owner() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);

    let suite = s
        .engine
        .set_suite_availability(&s.owner, s.hotel.id, s.suite.id, false)
        .unwrap();
    assert!(!suite.is_available);
    assert!(matches!(
        s.engine
            .create_booking(make_request(&s, ts(1, 14), ts(3, 11))),
        Err(BookingError::PreconditionFailed(_))
    ));

    assert_eq!(
        s.engine
            .set_suite_availability(&OwnerId::new("intruder"), s.hotel.id, s.suite.id, true),
        Err(BookingError::Forbidden("not authorized".to_string()))
    );
}

#[test]
fn delete_suite_blocked_by_active_bookings() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);
    let booking = s
        .engine
        .create_booking(make_request(&s, ts(1, 14), ts(3, 11)))
        .unwrap();

    assert!(matches!(
        s.engine.delete_suite(&s.owner, s.hotel.id, s.suite.id),
        Err(BookingError::PreconditionFailed(_))
    ));

    s.engine.cancel_booking(booking.id).unwrap();
    let removed = s.engine.delete_suite(&s.owner, s.hotel.id, s.suite.id).unwrap();
    assert_eq!(removed.id, s.suite.id);
    assert!(s.catalog.suite(s.suite.id).unwrap().is_none());
}

#[test]
fn register_suite_validates_hotel_and_room() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);

    let duplicate_room = Suite::new(s.hotel.id, "Twin", Money::from(100), 101, RoomType::Standard);
    assert!(matches!(
        s.engine.register_suite(&s.owner, duplicate_room),
        Err(BookingError::Conflict(_))
    ));

    let zero_room = Suite::new(s.hotel.id, "Zero", Money::from(100), 0, RoomType::Standard);
    assert!(matches!(
        s.engine.register_suite(&s.owner, zero_room),
        Err(BookingError::InvalidArgument(_))
    ));

    let free = Suite::new(s.hotel.id, "Free", Money::zero(), 102, RoomType::Standard);
    assert!(matches!(
        s.engine.register_suite(&s.owner, free),
        Err(BookingError::InvalidArgument(_))
    ));

    let pending_hotel = s.catalog.add_hotel(Hotel::new(s.owner.clone(), "Unapproved"));
    let suite = Suite::new(pending_hotel.id, "Loft", Money::from(100), 1, RoomType::Family);
    assert!(matches!(
        s.engine.register_suite(&s.owner, suite),
        Err(BookingError::PreconditionFailed(_))
    ));
}

// === Reports ===

#[test]
fn revenue_summary_and_dashboard() {
    let s = setup(SuiteHoldPolicy::IntervalOnly);

    let stay = s
        .engine
        .create_walk_in_booking(&s.owner, make_request(&s, ts(1, 14), ts(2, 11)))
        .unwrap();
    s.engine.check_out_guest(stay.id).unwrap();
    let pending = s
        .engine
        .create_booking(make_request(&s, ts(3, 14), ts(4, 11)))
        .unwrap();
    let cancelled = s
        .engine
        .create_booking(make_request(&s, ts(5, 14), ts(6, 11)))
        .unwrap();
    s.engine.cancel_booking(cancelled.id).unwrap();

    let summary = s.engine.merchant_revenue_summary(&s.owner).unwrap();
    assert_eq!(summary.total_hotels, 1);
    assert_eq!(summary.total_bookings, 3);
    assert_eq!(summary.completed_bookings, 1);
    assert_eq!(summary.pending_bookings, 1);
    assert_eq!(summary.cancelled_bookings, 1);
    assert_eq!(summary.total_revenue.to_string(), "240.00");

    let dashboard = s
        .engine
        .hotel_dashboard(&s.owner, s.hotel.id, Utc::now().date_naive())
        .unwrap();
    assert_eq!(dashboard.total_suites, 1);
    assert_eq!(dashboard.available_suites, 1);
    assert_eq!(dashboard.total_bookings, 3);
    assert_eq!(dashboard.pending_bookings, 1);
    assert_eq!(dashboard.today_revenue.to_string(), "240.00");

    assert_eq!(s.engine.get_booking_details(pending.id).unwrap().status, BookingStatus::Pending);
    assert!(matches!(
        s.engine
            .hotel_dashboard(&OwnerId::new("intruder"), s.hotel.id, Utc::now().date_naive()),
        Err(BookingError::Forbidden(_))
    ));
}
