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

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use csv::{ReaderBuilder, Trim, Writer};
use hotel_booking_rs::{
    BookingEngine, BookingError, BookingId, BookingRequest, EngineConfig, Hotel, HotelId,
    InMemoryCatalog, Money, MoneyError, OwnerId, RoomType, Suite, SuiteHoldPolicy, SuiteId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Booking Replay - Run booking commands from a CSV file
///
/// Reads hotel, suite and booking commands from a CSV file and writes the
/// resulting bookings to stdout. Rejected commands are logged and skipped.
#[derive(Parser, Debug)]
#[command(name = "hotel-booking-rs")]
#[command(about = "Replays hotel booking commands from CSV", long_about = None)]
struct Args {
    /// Path to CSV file with commands
    ///
    /// Expected format: op,hotel,suite,booking,owner,check_in,check_out,amount,guest,phone
    /// Example: cargo run -- commands.csv > bookings.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// What a new booking does to the suite availability flag
    #[arg(long, value_enum, default_value_t = HoldArg::Hold)]
    suite_hold: HoldArg,

    /// Currency code for logged amounts
    #[arg(long, default_value = "USD")]
    currency: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HoldArg {
    /// Clear the flag on booking, restore it when the suite frees up
    Hold,
    /// Decide availability from dates alone
    Interval,
}

impl From<HoldArg> for SuiteHoldPolicy {
    fn from(arg: HoldArg) -> Self {
        match arg {
            HoldArg::Hold => SuiteHoldPolicy::HoldOnBooking,
            HoldArg::Interval => SuiteHoldPolicy::IntervalOnly,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = EngineConfig::default()
        .with_suite_hold(args.suite_hold.into())
        .with_currency(args.currency);

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let replay = match replay_commands(BufReader::new(file), config) {
        Ok(replay) => replay,
        Err(e) => {
            eprintln!("Error reading commands: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_bookings(&replay, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Labels in `hotel`, `suite` and `booking` are names local to the file;
/// the replay maps them to generated ids.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    op: String,
    #[serde(default)]
    hotel: Option<String>,
    #[serde(default)]
    suite: Option<String>,
    #[serde(default)]
    booking: Option<String>,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    check_in: Option<String>,
    #[serde(default)]
    check_out: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    guest: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

/// Why a command row was skipped.
#[derive(Debug, Error)]
enum CommandError {
    #[error("unknown operation {0:?}")]
    UnknownOp(String),
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("unknown label {0:?}")]
    UnknownLabel(String),
    #[error("label {0:?} already used")]
    DuplicateLabel(String),
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error(transparent)]
    Booking(#[from] BookingError),
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, CommandError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(CommandError::MissingField(field))
}

fn timestamp(value: &Option<String>, field: &'static str) -> Result<DateTime<Utc>, CommandError> {
    let raw = required(value, field)?;
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| CommandError::InvalidTimestamp(raw.to_string()))
}

/// Engine plus the label tables built while replaying.
struct Replay {
    engine: BookingEngine,
    catalog: Arc<InMemoryCatalog>,
    hotels: HashMap<String, HotelId>,
    suites: HashMap<String, SuiteId>,
    bookings: HashMap<String, BookingId>,
    /// Booking labels in creation order.
    booking_order: Vec<String>,
}

impl Replay {
    fn new(config: EngineConfig) -> Self {
        let catalog = Arc::new(InMemoryCatalog::new());
        Self {
            engine: BookingEngine::in_memory(catalog.clone(), config),
            catalog,
            hotels: HashMap::new(),
            suites: HashMap::new(),
            bookings: HashMap::new(),
            booking_order: Vec::new(),
        }
    }

    fn hotel_id(&self, record: &CsvRecord) -> Result<HotelId, CommandError> {
        let label = required(&record.hotel, "hotel")?;
        self.hotels
            .get(label)
            .copied()
            .ok_or_else(|| CommandError::UnknownLabel(label.to_string()))
    }

    fn suite_id(&self, record: &CsvRecord) -> Result<SuiteId, CommandError> {
        let label = required(&record.suite, "suite")?;
        self.suites
            .get(label)
            .copied()
            .ok_or_else(|| CommandError::UnknownLabel(label.to_string()))
    }

    fn booking_id(&self, record: &CsvRecord) -> Result<BookingId, CommandError> {
        let label = required(&record.booking, "booking")?;
        self.bookings
            .get(label)
            .copied()
            .ok_or_else(|| CommandError::UnknownLabel(label.to_string()))
    }

    fn owner(record: &CsvRecord) -> Result<OwnerId, CommandError> {
        required(&record.owner, "owner").map(OwnerId::new)
    }

    fn booking_request(&self, record: &CsvRecord) -> Result<BookingRequest, CommandError> {
        Ok(BookingRequest {
            hotel_id: self.hotel_id(record)?,
            suite_id: self.suite_id(record)?,
            guest_name: required(&record.guest, "guest")?.to_string(),
            guest_phone: required(&record.phone, "phone")?.to_string(),
            guest_email: None,
            check_in: timestamp(&record.check_in, "check_in")?,
            check_out: timestamp(&record.check_out, "check_out")?,
            total_amount: Money::parse_optional(record.amount.as_deref())?,
            discount_amount: Money::zero(),
            number_of_guests: 1,
            special_requests: None,
        })
    }

    fn remember_booking(&mut self, record: &CsvRecord, id: BookingId) -> Result<(), CommandError> {
        let label = required(&record.booking, "booking")?.to_string();
        self.booking_order.push(label.clone());
        self.bookings.insert(label, id);
        Ok(())
    }

    fn check_new_booking_label(&self, record: &CsvRecord) -> Result<(), CommandError> {
        let label = required(&record.booking, "booking")?;
        if self.bookings.contains_key(label) {
            return Err(CommandError::DuplicateLabel(label.to_string()));
        }
        Ok(())
    }

    fn apply(&mut self, record: &CsvRecord) -> Result<(), CommandError> {
        match record.op.to_lowercase().as_str() {
            "hotel" => {
                let owner = Self::owner(record)?;
                let label = required(&record.hotel, "hotel")?;
                if self.hotels.contains_key(label) {
                    return Err(CommandError::DuplicateLabel(label.to_string()));
                }
                let hotel = self.catalog.add_hotel(Hotel::new(owner, label));
                self.catalog.approve_hotel(hotel.id)?;
                self.hotels.insert(label.to_string(), hotel.id);
            }
            op @ ("open" | "close") => {
                let owner = Self::owner(record)?;
                let hotel_id = self.hotel_id(record)?;
                self.engine.set_hotel_open(&owner, hotel_id, op == "open")?;
            }
            "suite" => {
                let owner = Self::owner(record)?;
                let hotel_id = self.hotel_id(record)?;
                let label = required(&record.suite, "suite")?;
                if self.suites.contains_key(label) {
                    return Err(CommandError::DuplicateLabel(label.to_string()));
                }
                let price = Money::parse_optional(record.amount.as_deref())?;
                // Labels are unique, so numbering by label count is unique per hotel.
                let room_number = self.suites.len() as u32 + 1;
                let suite = self.engine.register_suite(
                    &owner,
                    Suite::new(hotel_id, label, price, room_number, RoomType::Standard),
                )?;
                self.suites.insert(label.to_string(), suite.id);
            }
            "book" => {
                self.check_new_booking_label(record)?;
                let booking = self.engine.create_booking(self.booking_request(record)?)?;
                self.remember_booking(record, booking.id)?;
            }
            "walk_in" => {
                self.check_new_booking_label(record)?;
                let owner = Self::owner(record)?;
                let booking = self
                    .engine
                    .create_walk_in_booking(&owner, self.booking_request(record)?)?;
                self.remember_booking(record, booking.id)?;
            }
            "confirm" => {
                self.engine.confirm_booking(self.booking_id(record)?)?;
            }
            "check_in" => {
                self.engine.check_in_guest(self.booking_id(record)?)?;
            }
            "check_out" => {
                self.engine.check_out_guest(self.booking_id(record)?)?;
            }
            "cancel" => {
                self.engine.cancel_booking(self.booking_id(record)?)?;
            }
            "no_show" => {
                self.engine.mark_no_show(self.booking_id(record)?)?;
            }
            "complete" => {
                self.engine.complete_booking(self.booking_id(record)?)?;
            }
            other => return Err(CommandError::UnknownOp(other.to_string())),
        }
        Ok(())
    }
}

/// Replays commands from a CSV reader.
///
/// Streams rows one at a time. Malformed rows and rejected commands are
/// logged at `warn` and skipped.
///
/// # CSV Format
///
/// Columns: `op, hotel, suite, booking, owner, check_in, check_out, amount, guest, phone`
/// - `op`: hotel, open, close, suite, book, walk_in, confirm, check_in,
///   check_out, cancel, no_show, complete
/// - `check_in`, `check_out`: RFC 3339 timestamps
/// - `amount`: booking total or suite price
///
/// # Example
///
/// ```csv
/// op,hotel,suite,booking,owner,check_in,check_out,amount,guest,phone
/// hotel,h1,,,m1,,,,,
/// suite,h1,s1,,m1,,,120.00,,
/// book,h1,s1,b1,,2025-03-01T14:00:00Z,2025-03-03T11:00:00Z,240.00,Alice,0801
/// confirm,,,b1,,,,,,
/// ```
///
/// # Errors
///
/// Returns a CSV error only if the header cannot be read.
fn replay_commands<R: Read>(reader: R, config: EngineConfig) -> Result<Replay, csv::Error> {
    let mut replay = Replay::new(config);

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    // Fail fast on an unreadable header.
    rdr.headers()?;

    for (line, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        let row = line + 2;
        match result {
            Ok(record) => {
                if let Err(e) = replay.apply(&record) {
                    warn!(row, op = %record.op, error = %e, "skipping command");
                }
            }
            Err(e) => {
                warn!(row, error = %e, "skipping malformed row");
            }
        }
    }

    info!(bookings = replay.booking_order.len(), "replay finished");
    Ok(replay)
}

/// One output row per booking.
#[derive(Debug, Serialize)]
struct BookingRow<'a> {
    booking: &'a str,
    id: BookingId,
    channel: String,
    status: String,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    total: Money,
}

/// Writes every replayed booking, in creation order.
///
/// # CSV Format
///
/// Columns: `booking, id, channel, status, check_in, check_out, total`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
fn write_bookings<W: Write>(replay: &Replay, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for label in &replay.booking_order {
        let Some(id) = replay.bookings.get(label) else {
            continue;
        };
        let Ok(booking) = replay.engine.get_booking_details(*id) else {
            continue;
        };
        wtr.serialize(BookingRow {
            booking: label,
            id: booking.id,
            channel: booking.channel.to_string(),
            status: booking.status.to_string(),
            check_in: booking.check_in,
            check_out: booking.check_out,
            total: booking.total_amount,
        })?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotel_booking_rs::BookingStatus;
    use std::io::Cursor;

    const HEADER: &str = "op,hotel,suite,booking,owner,check_in,check_out,amount,guest,phone\n";
    const SETUP: &str = "hotel,h1,,,m1,,,,,\n\
                         suite,h1,s1,,m1,,,120.00,,\n";

    fn run(rows: &str, policy: SuiteHoldPolicy) -> Replay {
        let csv = format!("{HEADER}{SETUP}{rows}");
        let config = EngineConfig::default().with_suite_hold(policy);
        replay_commands(Cursor::new(csv), config).unwrap()
    }

    fn status(replay: &Replay, label: &str) -> BookingStatus {
        let id = replay.bookings[label];
        replay.engine.get_booking_details(id).unwrap().status
    }

    #[test]
    fn replay_booking_lifecycle() {
        let replay = run(
            "book,h1,s1,b1,,2025-03-01T14:00:00Z,2025-03-03T11:00:00Z,240.00,Alice,0801\n\
             confirm,,,b1,,,,,,\n\
             check_in,,,b1,,,,,,\n",
            SuiteHoldPolicy::HoldOnBooking,
        );
        assert_eq!(status(&replay, "b1"), BookingStatus::CheckedIn);
    }

    #[test]
    fn overlapping_booking_is_skipped() {
        let replay = run(
            "book,h1,s1,b1,,2025-03-01T14:00:00Z,2025-03-03T11:00:00Z,240.00,Alice,0801\n\
             book,h1,s1,b2,,2025-03-02T10:00:00Z,2025-03-04T10:00:00Z,240.00,Bob,0802\n\
             book,h1,s1,b3,,2025-03-03T11:00:00Z,2025-03-05T11:00:00Z,240.00,Carol,0803\n",
            SuiteHoldPolicy::IntervalOnly,
        );
        assert_eq!(replay.booking_order, vec!["b1", "b3"]);
    }

    #[test]
    fn walk_in_requires_owner() {
        let replay = run(
            "walk_in,h1,s1,w1,m2,2025-03-01T14:00:00Z,2025-03-02T11:00:00Z,80,Dan,0804\n\
             walk_in,h1,s1,w2,m1,2025-03-01T14:00:00Z,2025-03-02T11:00:00Z,80,Dan,0804\n",
            SuiteHoldPolicy::HoldOnBooking,
        );
        assert!(!replay.bookings.contains_key("w1"));
        assert_eq!(status(&replay, "w2"), BookingStatus::CheckedIn);
    }

    #[test]
    fn skip_malformed_and_unknown_rows() {
        let replay = run(
            "teleport,h1,s1,b9,,,,,,\n\
             book,h1,s1,b1,,not-a-date,2025-03-03T11:00:00Z,240.00,Alice,0801\n\
             book,h1,s1,b2,,2025-03-01T14:00:00Z,2025-03-03T11:00:00Z,abc,Alice,0801\n\
             cancel,,,missing,,,,,,\n\
             book,h1,s1,b3,,2025-03-01T14:00:00Z,2025-03-03T11:00:00Z,240.00,Alice,0801\n",
            SuiteHoldPolicy::HoldOnBooking,
        );
        assert_eq!(replay.booking_order, vec!["b3"]);
    }

    #[test]
    fn closed_hotel_rejects_bookings() {
        let replay = run(
            "close,h1,,,m1,,,,,\n\
             book,h1,s1,b1,,2025-03-01T14:00:00Z,2025-03-03T11:00:00Z,240.00,Alice,0801\n\
             open,h1,,,m1,,,,,\n\
             book,h1,s1,b2,,2025-03-01T14:00:00Z,2025-03-03T11:00:00Z,240.00,Alice,0801\n",
            SuiteHoldPolicy::HoldOnBooking,
        );
        assert_eq!(replay.booking_order, vec!["b2"]);
    }

    #[test]
    fn write_bookings_to_csv() {
        let replay = run(
            "book,h1,s1,b1,,2025-03-01T14:00:00Z,2025-03-03T11:00:00Z,240,Alice,0801\n\
             cancel,,,b1,,,,,,\n",
            SuiteHoldPolicy::HoldOnBooking,
        );

        let mut output = Vec::new();
        write_bookings(&replay, &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("booking,id,channel,status,check_in,check_out,total\n"));
        assert!(output.contains("b1,"));
        assert!(output.contains(",ONLINE,CANCELLED,"));
        assert!(output.contains(",240.00"));
    }
}
