//! Variance between an actual value and a baseline, with a qualitative
//! signal.

use serde::{Deserialize, Serialize};

/// Percentage at or beyond which a change is a surge (or an alert downwards).
pub const SURGE_THRESHOLD: f64 = 30.0;

/// Percentage below which (in absolute value) a change is flat.
pub const FLAT_THRESHOLD: f64 = 1.0;

/// Absolute and relative change of `actual` against `base`.
///
/// With a non-positive baseline the percentage is 0 when nothing happened
/// either, and a full 100 % swing when something appeared from nothing.
pub fn diff_and_percent(actual: f64, base: f64) -> (f64, f64) {
  let diff = actual - base;
  let percent = if base > 0.0 {
    diff * 100.0 / base
  } else if actual > 0.0 {
    100.0
  } else {
    0.0
  };
  (diff, percent)
}

/// Band of a percentage change. Exact boundary values belong to the outer
/// band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
  Surge,
  Rise,
  Flat,
  Drop,
  Alert,
}

impl Signal {
  pub fn classify(percent: f64) -> Self {
    if percent >= SURGE_THRESHOLD {
      Signal::Surge
    } else if percent >= FLAT_THRESHOLD {
      Signal::Rise
    } else if percent <= -SURGE_THRESHOLD {
      Signal::Alert
    } else if percent <= -FLAT_THRESHOLD {
      Signal::Drop
    } else {
      Signal::Flat
    }
  }
}

/// Direction of a change, independent of its magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
  Favorable,
  Unfavorable,
  Neutral,
}

impl Trend {
  pub fn of(diff: f64) -> Self {
    if diff > 0.0 {
      Trend::Favorable
    } else if diff < 0.0 {
      Trend::Unfavorable
    } else {
      Trend::Neutral
    }
  }
}

/// A fully-evaluated comparison of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Variance {
  pub actual:  f64,
  pub base:    f64,
  pub diff:    f64,
  pub percent: f64,
  pub signal:  Signal,
  pub trend:   Trend,
}

impl Variance {
  pub fn between(actual: f64, base: f64) -> Self {
    let (diff, percent) = diff_and_percent(actual, base);
    Self {
      actual,
      base,
      diff,
      percent,
      signal: Signal::classify(percent),
      trend: Trend::of(diff),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rise_scenario() {
    let (diff, percent) = diff_and_percent(1200.0, 1000.0);
    assert_eq!(diff, 200.0);
    assert_eq!(percent, 20.0);
    assert_eq!(Signal::classify(percent), Signal::Rise);
  }

  #[test]
  fn zero_baseline_policy() {
    assert_eq!(diff_and_percent(500.0, 0.0), (500.0, 100.0));
    assert_eq!(diff_and_percent(0.0, 0.0), (0.0, 0.0));
    assert_eq!(diff_and_percent(-5.0, 0.0).1, 0.0);
    assert_eq!(diff_and_percent(10.0, -4.0).1, 100.0);
  }

  #[test]
  fn diff_reconstructs_actual() {
    // Cent-valued inputs, as produced from `Cents`, reconstruct exactly.
    let pairs = [
      (120_000.0, 100_000.0),
      (1.0, 3.0),
      (0.0, 45_678.0),
      (987_654_321.0, 123.0),
      (19.0, 7.0),
    ];
    for (actual, base) in pairs {
      let (diff, _) = diff_and_percent(actual, base);
      assert_eq!(base + diff, actual, "actual={actual} base={base}");
    }
  }

  #[test]
  fn classification_boundaries() {
    assert_eq!(Signal::classify(30.0), Signal::Surge);
    assert_eq!(Signal::classify(29.99), Signal::Rise);
    assert_eq!(Signal::classify(1.0), Signal::Rise);
    assert_eq!(Signal::classify(0.99), Signal::Flat);
    assert_eq!(Signal::classify(0.0), Signal::Flat);
    assert_eq!(Signal::classify(-0.99), Signal::Flat);
    assert_eq!(Signal::classify(-1.0), Signal::Drop);
    assert_eq!(Signal::classify(-29.99), Signal::Drop);
    assert_eq!(Signal::classify(-30.0), Signal::Alert);
  }

  #[test]
  fn trend_follows_sign() {
    assert_eq!(Variance::between(5.0, 4.0).trend, Trend::Favorable);
    assert_eq!(Variance::between(3.0, 4.0).trend, Trend::Unfavorable);
    assert_eq!(Variance::between(4.0, 4.0).trend, Trend::Neutral);
  }

  #[test]
  fn nothing_to_something_is_a_surge() {
    let v = Variance::between(500.0, 0.0);
    assert_eq!(v.percent, 100.0);
    assert_eq!(v.signal, Signal::Surge);
  }
}
