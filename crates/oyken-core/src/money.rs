//! Currency amounts held as integer cents.
//!
//! Amounts cross the JSON boundary as decimal numbers of currency units
//! (`1234.5`) and are stored in CSV as fixed two-digit decimals (`1234.50`).
//! Arithmetic stays in integer cents so that `base + (actual - base)` always
//! gives back `actual`.

use std::{
  fmt,
  iter::Sum,
  ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A signed amount of money in hundredths of the currency unit.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Cents(pub i64);

impl Cents {
  pub const ZERO: Cents = Cents(0);

  /// Largest magnitude accepted from input: one trillion currency units.
  /// Sums of many such amounts still fit in an `i64`.
  pub const MAX_INPUT: Cents = Cents(100_000_000_000_000);

  /// Round a (possibly fractional) number of cents to the nearest cent,
  /// halves away from zero.
  pub fn round_from(cents: f64) -> Self {
    if cents.is_finite() {
      Cents(cents.round() as i64)
    } else {
      Cents::ZERO
    }
  }

  /// Convert from a decimal number of currency units.
  pub fn from_units(units: f64) -> Self { Self::round_from(units * 100.0) }

  /// Like [`Cents::from_units`], but `None` for non-finite values and for
  /// magnitudes beyond [`Cents::MAX_INPUT`].
  pub fn checked_from_units(units: f64) -> Option<Self> {
    let cents = units * 100.0;
    (cents.is_finite() && cents.abs() <= Self::MAX_INPUT.0 as f64)
      .then(|| Self::round_from(cents))
  }

  /// The amount as a decimal number of currency units.
  pub fn as_units(self) -> f64 { self.0 as f64 / 100.0 }

  pub fn is_positive(self) -> bool { self.0 > 0 }

  pub fn is_negative(self) -> bool { self.0 < 0 }

  /// Multiply by a scalar, rounding to the nearest cent.
  pub fn scale(self, factor: f64) -> Self {
    Self::round_from(self.0 as f64 * factor)
  }

  /// Parse a decimal amount as typed by an operator or found in a CSV cell.
  ///
  /// Accepts a leading/trailing `€`, surrounding whitespace, and a decimal
  /// comma when no decimal point is present. Returns `None` for anything that
  /// is not a finite number within [`Cents::MAX_INPUT`]; an empty string is
  /// also `None`.
  pub fn parse(input: &str) -> Option<Self> {
    let trimmed = input.trim().trim_matches('€').trim();
    if trimmed.is_empty() {
      return None;
    }
    let normalised = if trimmed.contains(',') && !trimmed.contains('.') {
      trimmed.replace(',', ".")
    } else {
      trimmed.to_owned()
    };
    normalised
      .parse::<f64>()
      .ok()
      .and_then(Self::checked_from_units)
  }
}

impl fmt::Display for Cents {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = if self.0 < 0 { "-" } else { "" };
    let abs = self.0.unsigned_abs();
    f.pad(&format!("{sign}{}.{:02}", abs / 100, abs % 100))
  }
}

impl Add for Cents {
  type Output = Cents;

  fn add(self, rhs: Cents) -> Cents { Cents(self.0.saturating_add(rhs.0)) }
}

impl Sub for Cents {
  type Output = Cents;

  fn sub(self, rhs: Cents) -> Cents { Cents(self.0.saturating_sub(rhs.0)) }
}

impl Neg for Cents {
  type Output = Cents;

  fn neg(self) -> Cents { Cents(self.0.saturating_neg()) }
}

impl AddAssign for Cents {
  fn add_assign(&mut self, rhs: Cents) { *self = *self + rhs; }
}

impl SubAssign for Cents {
  fn sub_assign(&mut self, rhs: Cents) { *self = *self - rhs; }
}

impl Sum for Cents {
  fn sum<I: Iterator<Item = Cents>>(iter: I) -> Cents {
    iter.fold(Cents::ZERO, Add::add)
  }
}

impl<'a> Sum<&'a Cents> for Cents {
  fn sum<I: Iterator<Item = &'a Cents>>(iter: I) -> Cents {
    iter.copied().sum()
  }
}

// ─── Serde ───────────────────────────────────────────────────────────────────

impl Serialize for Cents {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(self.as_units())
  }
}

/// JSON clients send either a number or a decimal string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
  Number(f64),
  Text(String),
}

impl<'de> Deserialize<'de> for Cents {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    match RawAmount::deserialize(deserializer)? {
      RawAmount::Number(n) => Cents::checked_from_units(n).ok_or_else(|| {
        serde::de::Error::custom(format!("amount out of range: {n}"))
      }),
      RawAmount::Text(s) => Cents::parse(&s).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid amount: {s:?}"))
      }),
    }
  }
}
