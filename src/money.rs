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

//! Fixed-point money.
//!
//! [`Money`] wraps a [`Decimal`] that is always rounded half-up (away from zero
//! on ties) to exactly two fractional digits. The special values `Infinity`,
//! `-Infinity` and `NaN` are carried alongside finite amounts and bypass
//! rounding, so arithmetic is total:
//!
//! - `∞ − ∞`, `∞ × 0` and `0 ÷ 0` are `NaN`.
//! - `x ÷ 0` for non-zero `x` is an infinity carrying the sign of `x`.
//! - Results that overflow the decimal range saturate to a signed infinity.
//! - `NaN` propagates through every operation.
//!
//! # Example
//!
//! ```
//! use hotel_booking_rs::Money;
//! use rust_decimal_macros::dec;
//!
//! let price: Money = "99.995".parse().unwrap();
//! assert_eq!(price.to_string(), "100.00");
//!
//! let total = price * dec!(3);
//! assert_eq!(total.to_string(), "300.00");
//! assert_eq!(total.format_currency("USD"), "$300.00");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Money construction errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Input is not a number or numeric string
    #[error("invalid monetary value: {0:?}, must be a number or numeric string")]
    InvalidValue(String),
}

#[derive(Debug, Clone, Copy)]
enum Repr {
    Finite(Decimal),
    Infinity,
    NegInfinity,
    NaN,
}

/// Immutable monetary amount with two fractional digits.
#[derive(Clone, Copy)]
pub struct Money(Repr);

impl Money {
    /// Number of fractional digits every finite amount carries.
    pub const SCALE: u32 = 2;

    pub const INFINITY: Money = Money(Repr::Infinity);
    pub const NEG_INFINITY: Money = Money(Repr::NegInfinity);
    pub const NAN: Money = Money(Repr::NaN);

    /// `0.00`
    pub fn zero() -> Self {
        Self::from_decimal(Decimal::ZERO)
    }

    /// Rounds `value` half-up to two decimals.
    ///
    /// Magnitudes too large to keep two fractional digits within the
    /// 28-digit decimal mantissa saturate to a signed infinity.
    pub fn from_decimal(value: Decimal) -> Self {
        let mut rounded =
            value.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(Self::SCALE);
        if rounded.scale() != Self::SCALE {
            return Self::signed_infinity(value.is_sign_negative());
        }
        if rounded.is_zero() {
            rounded.set_sign_positive(true);
        }
        Money(Repr::Finite(rounded))
    }

    /// Parses an optional input, treating a missing value as `0.00`.
    pub fn parse_optional(value: Option<&str>) -> Result<Self, MoneyError> {
        match value {
            Some(s) => s.parse(),
            None => Ok(Self::zero()),
        }
    }

    /// Returns the underlying decimal for finite amounts.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self.0 {
            Repr::Finite(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self.0, Repr::Finite(_))
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.0, Repr::Infinity | Repr::NegInfinity)
    }

    pub fn is_nan(&self) -> bool {
        matches!(self.0, Repr::NaN)
    }

    /// `true` only for a finite amount equal to `0.00`.
    pub fn is_zero(&self) -> bool {
        matches!(self.0, Repr::Finite(d) if d.is_zero())
    }

    /// `true` for amounts above zero, including `Infinity`.
    pub fn is_positive(&self) -> bool {
        match self.0 {
            Repr::Finite(d) => d > Decimal::ZERO,
            Repr::Infinity => true,
            Repr::NegInfinity | Repr::NaN => false,
        }
    }

    /// `true` for amounts below zero, including `-Infinity`.
    pub fn is_negative(&self) -> bool {
        match self.0 {
            Repr::Finite(d) => d < Decimal::ZERO,
            Repr::NegInfinity => true,
            Repr::Infinity | Repr::NaN => false,
        }
    }

    pub fn abs(&self) -> Self {
        match self.0 {
            Repr::Finite(d) => Self::from_decimal(d.abs()),
            Repr::Infinity | Repr::NegInfinity => Self::INFINITY,
            Repr::NaN => Self::NAN,
        }
    }

    /// Sums `amounts`; an empty slice sums to `0.00`.
    pub fn sum_of(amounts: &[Money]) -> Self {
        amounts.iter().copied().sum()
    }

    /// Largest of `amounts`, or `None` when empty. Any `NaN` yields `NaN`.
    pub fn max_of(amounts: &[Money]) -> Option<Self> {
        Self::extreme(amounts, Ordering::Greater)
    }

    /// Smallest of `amounts`, or `None` when empty. Any `NaN` yields `NaN`.
    pub fn min_of(amounts: &[Money]) -> Option<Self> {
        Self::extreme(amounts, Ordering::Less)
    }

    fn extreme(amounts: &[Money], wanted: Ordering) -> Option<Self> {
        let (first, rest) = amounts.split_first()?;
        let mut best = *first;
        for amount in rest {
            match amount.partial_cmp(&best) {
                Some(order) if order == wanted => best = *amount,
                Some(_) => {}
                None => return Some(Self::NAN),
            }
        }
        if best.is_nan() {
            return Some(Self::NAN);
        }
        Some(best)
    }

    /// Fee of `percentage` percent of this amount.
    pub fn percentage_fee(&self, percentage: Decimal) -> Self {
        *self * (percentage / Decimal::ONE_HUNDRED)
    }

    /// Fixed fee, re-rounded.
    pub fn fixed_fee(fee: Money) -> Self {
        match fee.0 {
            Repr::Finite(d) => Self::from_decimal(d),
            _ => fee,
        }
    }

    /// Formats the amount with a currency symbol and thousands separators.
    ///
    /// Known codes map to their symbol (`USD` → `$`, `NGN` → `₦`, `EUR` → `€`,
    /// `GBP` → `£`); any other code is used as its own prefix.
    pub fn format_currency(&self, currency: &str) -> String {
        let symbol = match currency {
            "USD" => "$",
            "NGN" => "₦",
            "EUR" => "€",
            "GBP" => "£",
            other => other,
        };
        match self.0 {
            Repr::Finite(d) => format!("{symbol}{}", group_thousands(d)),
            _ => format!("{symbol}{self}"),
        }
    }

    fn signed_infinity(negative: bool) -> Self {
        if negative {
            Self::NEG_INFINITY
        } else {
            Self::INFINITY
        }
    }

    fn from_special(s: &str) -> Option<Self> {
        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        match body.to_ascii_lowercase().as_str() {
            "inf" | "infinity" => Some(Self::signed_infinity(negative)),
            "nan" | "snan" => Some(Self::NAN),
            _ => None,
        }
    }
}

fn group_thousands(value: Decimal) -> String {
    let digits = value.abs().to_string();
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.is_sign_negative() && !value.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    /// Blank input is `0.00`; scientific notation and `Infinity`/`NaN`
    /// spellings are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::zero());
        }
        if let Some(special) = Self::from_special(trimmed) {
            return Ok(special);
        }
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Self::from_decimal)
            .map_err(|_| MoneyError::InvalidValue(s.to_string()))
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self::from_decimal(value)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self::from_decimal(Decimal::from(value))
    }
}

impl TryFrom<f64> for Money {
    type Error = MoneyError;

    /// Converts through the shortest decimal representation of the float, so
    /// `2.005_f64` becomes `2.01` rather than the binary approximation.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_nan() {
            return Ok(Self::NAN);
        }
        if value.is_infinite() {
            return Ok(Self::signed_infinity(value.is_sign_negative()));
        }
        value.to_string().parse()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Repr::Finite(d) => write!(f, "{d}"),
            Repr::Infinity => f.write_str("Infinity"),
            Repr::NegInfinity => f.write_str("-Infinity"),
            Repr::NaN => f.write_str("NaN"),
        }
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money(\"{self}\")")
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.0, other.0) {
            (Repr::NaN, _) | (_, Repr::NaN) => None,
            (Repr::Finite(a), Repr::Finite(b)) => Some(a.cmp(&b)),
            (Repr::Infinity, Repr::Infinity) | (Repr::NegInfinity, Repr::NegInfinity) => {
                Some(Ordering::Equal)
            }
            (Repr::Infinity, _) | (_, Repr::NegInfinity) => Some(Ordering::Greater),
            (Repr::NegInfinity, _) | (_, Repr::Infinity) => Some(Ordering::Less),
        }
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        match self.0 {
            Repr::Finite(d) => Money::from_decimal(-d),
            Repr::Infinity => Money::NEG_INFINITY,
            Repr::NegInfinity => Money::INFINITY,
            Repr::NaN => Money::NAN,
        }
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        match (self.0, rhs.0) {
            (Repr::NaN, _) | (_, Repr::NaN) => Money::NAN,
            (Repr::Infinity, Repr::NegInfinity) | (Repr::NegInfinity, Repr::Infinity) => {
                Money::NAN
            }
            (Repr::Infinity, _) | (_, Repr::Infinity) => Money::INFINITY,
            (Repr::NegInfinity, _) | (_, Repr::NegInfinity) => Money::NEG_INFINITY,
            (Repr::Finite(a), Repr::Finite(b)) => match a.checked_add(b) {
                Some(sum) => Money::from_decimal(sum),
                None => Money::signed_infinity(a.is_sign_negative()),
            },
        }
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        self + (-rhs)
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, factor: Decimal) -> Money {
        match self.0 {
            Repr::NaN => Money::NAN,
            Repr::Infinity | Repr::NegInfinity if factor.is_zero() => Money::NAN,
            Repr::Infinity | Repr::NegInfinity => {
                Money::signed_infinity(self.is_negative() != factor.is_sign_negative())
            }
            Repr::Finite(a) => match a.checked_mul(factor) {
                Some(product) => Money::from_decimal(product),
                None => Money::signed_infinity(a.is_sign_negative() != factor.is_sign_negative()),
            },
        }
    }
}

impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, divisor: Decimal) -> Money {
        match self.0 {
            Repr::NaN => Money::NAN,
            Repr::Infinity | Repr::NegInfinity => {
                Money::signed_infinity(self.is_negative() != divisor.is_sign_negative())
            }
            Repr::Finite(a) if divisor.is_zero() => {
                if a.is_zero() {
                    Money::NAN
                } else {
                    Money::signed_infinity(a.is_sign_negative())
                }
            }
            Repr::Finite(a) => match a.checked_div(divisor) {
                Some(quotient) => Money::from_decimal(quotient),
                None => Money::signed_infinity(a.is_sign_negative() != divisor.is_sign_negative()),
            },
        }
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, amount| acc + amount)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

struct MoneyVisitor;

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or numeric string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Ok(Money::from_decimal(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::try_from(v).map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::zero())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(MoneyVisitor)
    }
}
