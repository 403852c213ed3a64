//! # Measurement Values
//!
//! [`MeasurementValue`] is an exact feet / inches / fraction quantity, the
//! way a tape measure reads. It parses the trade notation users type
//! (`12' 6-1/2"`, `6 3/4`, `3/8`, `14.25`), keeps itself normalized, and
//! renders back to either fraction or decimal form.
//!
//! ## Representation
//!
//! Components are stored sign-magnitude: every non-zero component carries
//! the sign of the whole value, and the magnitudes satisfy
//! `|inches| < 12` and `|numerator| < denominator`. The total length is
//! always `feet * 12 + inches + numerator / denominator` inches.
//!
//! ## Arithmetic
//!
//! Two measurements can be added or subtracted. Multiplication and division
//! take a bare `f64` scalar: to "multiply" by another measurement, reduce it
//! to its total inches first. Scaled results are rounded to the nearest 1/16".
//!
//! ## Example
//!
//! ```rust
//! use tape_core::measurement::MeasurementValue;
//!
//! let wall = MeasurementValue::parse("12' 6\"").unwrap();
//! let door = MeasurementValue::parse("3' 1-1/2\"").unwrap();
//!
//! let remaining = wall - door;
//! assert_eq!(remaining.to_fraction_string(), "9' 4-1/2\"");
//!
//! let half = remaining * 0.5;
//! assert_eq!(half.to_fraction_string(), "4' 8-1/4\"");
//! ```

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Denominator used for whole values and for rounding decimal input
pub const DEFAULT_DENOMINATOR: i64 = 16;

/// Largest magnitude (in inches) accepted from floating-point input.
///
/// Keeps every intermediate of normalization well inside `i128`.
pub const MAX_MAGNITUDE_INCHES: f64 = 1.0e12;

const INCHES_PER_FOOT: i128 = 12;

static FEET_INCHES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s+(\d+)(?:(?:\s*-\s*|\s+)(\d+)/(\d+))?$").expect("feet-inches pattern")
});

static INCHES_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:(?:\s*-\s*|\s+)(\d+)/(\d+))?$").expect("inches pattern"));

static FRACTION_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)/(\d+)$").expect("fraction pattern"));

static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+\.?\d*|\.\d+)$").expect("decimal pattern"));

/// An exact length in feet, inches, and a fraction of an inch.
///
/// Always normalized; equal lengths compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MeasurementValue {
    feet: i64,
    inches: i64,
    numerator: i64,
    denominator: i64,
}

impl MeasurementValue {
    /// The zero length, `0"`
    pub const ZERO: MeasurementValue = MeasurementValue {
        feet: 0,
        inches: 0,
        numerator: 0,
        denominator: DEFAULT_DENOMINATOR,
    };

    /// Build a measurement from raw components, normalizing them.
    ///
    /// Components may be out of range or carry mixed signs; overflow is
    /// carried into the next larger unit and negatives borrow from it.
    ///
    /// ```rust
    /// use tape_core::measurement::MeasurementValue;
    ///
    /// let m = MeasurementValue::new(1, -3, 0, 16).unwrap();
    /// assert_eq!(m.to_fraction_string(), "9\"");
    ///
    /// let m = MeasurementValue::new(0, 30, 20, 16).unwrap();
    /// assert_eq!(m.to_fraction_string(), "2' 7-1/4\"");
    /// ```
    pub fn new(feet: i64, inches: i64, numerator: i64, denominator: i64) -> CalcResult<Self> {
        if denominator == 0 {
            return Err(CalcError::format(
                format!("{}/{}", numerator, denominator),
                "fraction denominator cannot be zero",
            ));
        }
        Self::from_parts(
            feet.into(),
            inches.into(),
            numerator.into(),
            denominator.into(),
        )
        .ok_or_else(|| {
            CalcError::format(
                format!("{}' {}-{}/{}\"", feet, inches, numerator, denominator),
                "measurement is out of range",
            )
        })
    }

    /// Parse trade measurement notation.
    ///
    /// Accepted forms, tried in order after `"` is dropped and `'` becomes a
    /// space:
    ///
    /// 1. feet and inches: `12 6`, `12' 6"`, `12' 6 1/2"`, `12' 6-1/2"`
    /// 2. inches only: `6`, `6 1/2`, `6-1/2"`
    /// 3. fraction only: `3/4`
    /// 4. decimal inches: `14.25`, `.5`
    ///
    /// A trailing `'` with nothing after it marks feet alone (`12'`,
    /// `2.5'`), and a `'` followed only by a fraction is feet plus that
    /// fraction (`5' 1/2"`). A leading `-` negates the whole value.
    ///
    /// ```rust
    /// use tape_core::measurement::MeasurementValue;
    ///
    /// let a = MeasurementValue::parse("12' 6\"").unwrap();
    /// let b = MeasurementValue::parse("12'6\"").unwrap();
    /// assert_eq!(a, b);
    /// assert_eq!(a.to_total_inches(), 150.0);
    ///
    /// assert!(MeasurementValue::parse("six feet").is_err());
    /// ```
    pub fn parse(text: &str) -> CalcResult<Self> {
        let trimmed = text.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };

        if body.is_empty() {
            return Err(CalcError::format(text, "empty measurement"));
        }

        let value = match body.rfind('\'') {
            Some(idx) if !body[idx + 1..].chars().any(|c| c.is_ascii_digit()) => {
                parse_feet_only(&canonicalize(body), text)?
            }
            Some(idx) if FRACTION_ONLY.is_match(&canonicalize(&body[idx + 1..])) => {
                let feet = canonicalize(&body[..idx]);
                parse_feet_fraction(&feet, &canonicalize(&body[idx + 1..]), text)?
            }
            _ => parse_canonical(&canonicalize(body), text)?,
        };

        Ok(if negative { -value } else { value })
    }

    /// Convert decimal inches to the nearest 1/16".
    ///
    /// Non-finite input becomes zero and magnitudes are clamped to
    /// [`MAX_MAGNITUDE_INCHES`].
    ///
    /// ```rust
    /// use tape_core::measurement::MeasurementValue;
    ///
    /// let m = MeasurementValue::from_decimal_inches(58.65);
    /// assert_eq!(m.to_fraction_string(), "4' 10-5/8\"");
    ///
    /// // 11.99" rounds up into a whole foot
    /// let m = MeasurementValue::from_decimal_inches(11.99);
    /// assert_eq!(m.to_fraction_string(), "1' 0\"");
    /// ```
    pub fn from_decimal_inches(value: f64) -> Self {
        let value = if value.is_finite() {
            value.clamp(-MAX_MAGNITUDE_INCHES, MAX_MAGNITUDE_INCHES)
        } else {
            0.0
        };

        let feet = (value / 12.0).trunc();
        let remainder = value - feet * 12.0;
        let whole_inches = remainder.trunc();
        let sixteenths = ((remainder - whole_inches) * DEFAULT_DENOMINATOR as f64).round();

        Self::from_parts(
            feet as i128,
            whole_inches as i128,
            sixteenths as i128,
            DEFAULT_DENOMINATOR.into(),
        )
        .unwrap_or(Self::ZERO)
    }

    /// Total length in inches
    pub fn to_total_inches(&self) -> f64 {
        (self.feet as f64) * 12.0
            + self.inches as f64
            + self.numerator as f64 / self.denominator as f64
    }

    /// Re-run normalization. Values are kept normalized, so this is idempotent.
    pub fn normalize(&self) -> Self {
        Self::from_parts(
            self.feet.into(),
            self.inches.into(),
            self.numerator.into(),
            self.denominator.into(),
        )
        .unwrap_or(*self)
    }

    pub fn feet(&self) -> i64 {
        self.feet
    }

    pub fn inches(&self) -> i64 {
        self.inches
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.feet == 0 && self.inches == 0 && self.numerator == 0
    }

    pub fn is_negative(&self) -> bool {
        self.feet < 0 || self.inches < 0 || self.numerator < 0
    }

    /// Absolute length
    pub fn abs(&self) -> Self {
        if self.is_negative() {
            -*self
        } else {
            *self
        }
    }

    /// Divide by a bare scalar.
    ///
    /// # Errors
    ///
    /// [`CalcError::DivideByZero`] when `divisor` is zero.
    pub fn checked_div(&self, divisor: f64) -> CalcResult<Self> {
        if divisor == 0.0 {
            return Err(CalcError::divide_by_zero(format!("{} / 0", self)));
        }
        Ok(Self::from_decimal_inches(self.to_total_inches() / divisor))
    }

    /// Render as `F' I-N/D"`.
    ///
    /// Feet appear only when non-zero and the fraction only when non-zero.
    /// Inches are always shown, so a bare fraction renders as `0-3/8"`.
    pub fn to_fraction_string(&self) -> String {
        let feet = self.feet.unsigned_abs();
        let inches = self.inches.unsigned_abs();
        let numerator = self.numerator.unsigned_abs();

        let mut out = String::new();
        if self.is_negative() {
            out.push('-');
        }
        if feet != 0 {
            out.push_str(&format!("{}' ", feet));
        }
        if numerator == 0 {
            out.push_str(&format!("{}\"", inches));
        } else {
            out.push_str(&format!("{}-{}/{}\"", inches, numerator, self.denominator));
        }
        out
    }

    /// Render total inches with four decimal places
    pub fn to_decimal_string(&self) -> String {
        format!("{:.4}", self.to_total_inches())
    }

    /// Normalize raw components held in `i128`.
    ///
    /// Returns `None` when the result does not fit the `i64` fields.
    fn from_parts(feet: i128, inches: i128, numerator: i128, denominator: i128) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let (numerator, denominator) = if denominator < 0 {
            (numerator.checked_neg()?, denominator.checked_neg()?)
        } else {
            (numerator, denominator)
        };

        let whole = feet.checked_mul(INCHES_PER_FOOT)?.checked_add(inches)?;
        let total = whole.checked_mul(denominator)?.checked_add(numerator)?;

        let sign: i128 = if total < 0 { -1 } else { 1 };
        let magnitude = total.checked_abs()?;

        let whole_inches = magnitude / denominator;
        let rest = magnitude % denominator;
        let (numerator, denominator) = if rest == 0 {
            (0, i128::from(DEFAULT_DENOMINATOR))
        } else {
            let divisor = gcd(rest, denominator);
            (rest / divisor, denominator / divisor)
        };

        Some(MeasurementValue {
            feet: i64::try_from(sign * (whole_inches / INCHES_PER_FOOT)).ok()?,
            inches: i64::try_from(sign * (whole_inches % INCHES_PER_FOOT)).ok()?,
            numerator: i64::try_from(sign * numerator).ok()?,
            denominator: i64::try_from(denominator).ok()?,
        })
    }

    /// Value expressed as a count of `1/denominator` inch units.
    fn units_of(&self, denominator: i128) -> Option<i128> {
        let scale = denominator / i128::from(self.denominator);
        let whole = i128::from(self.feet)
            .checked_mul(INCHES_PER_FOOT)?
            .checked_add(self.inches.into())?;
        whole
            .checked_mul(denominator)?
            .checked_add(i128::from(self.numerator).checked_mul(scale)?)
    }

    /// Exact sum of `self` and `sign * rhs`.
    fn combine(self, rhs: Self, sign: i128) -> Self {
        let exact = (|| {
            let lhs_den = i128::from(self.denominator);
            let rhs_den = i128::from(rhs.denominator);
            let denominator = (lhs_den / gcd(lhs_den, rhs_den)).checked_mul(rhs_den)?;
            let units = self
                .units_of(denominator)?
                .checked_add(rhs.units_of(denominator)?.checked_mul(sign)?)?;
            Self::from_parts(0, 0, units, denominator)
        })();

        exact.unwrap_or_else(|| {
            Self::from_decimal_inches(self.to_total_inches() + sign as f64 * rhs.to_total_inches())
        })
    }
}

impl Default for MeasurementValue {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Drop `"`, turn `'` into a space, collapse whitespace.
fn canonicalize(text: &str) -> String {
    let spaced: String = text
        .chars()
        .filter(|c| *c != '"')
        .map(|c| if c == '\'' { ' ' } else { c })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_canonical(canonical: &str, original: &str) -> CalcResult<MeasurementValue> {
    if let Some(caps) = FEET_INCHES.captures(canonical) {
        let feet = capture_int(&caps, 1, original)?;
        let inches = capture_int(&caps, 2, original)?;
        let (numerator, denominator) = capture_fraction(&caps, 3, original)?;
        return in_range(MeasurementValue::new(feet, inches, numerator, denominator)?, original);
    }

    if let Some(caps) = INCHES_ONLY.captures(canonical) {
        let inches = capture_int(&caps, 1, original)?;
        let (numerator, denominator) = capture_fraction(&caps, 2, original)?;
        return in_range(MeasurementValue::new(0, inches, numerator, denominator)?, original);
    }

    if let Some(caps) = FRACTION_ONLY.captures(canonical) {
        let (numerator, denominator) = capture_fraction(&caps, 1, original)?;
        return MeasurementValue::new(0, 0, numerator, denominator);
    }

    if DECIMAL.is_match(canonical) {
        let inches: f64 = canonical
            .parse()
            .map_err(|_| CalcError::format(original, "invalid decimal number"))?;
        return decimal_in_range(inches, original).map(MeasurementValue::from_decimal_inches);
    }

    Err(CalcError::format(original, "not a recognized measurement"))
}

fn parse_feet_only(canonical: &str, original: &str) -> CalcResult<MeasurementValue> {
    if DECIMAL.is_match(canonical) {
        let feet: f64 = canonical
            .parse()
            .map_err(|_| CalcError::format(original, "invalid decimal number"))?;
        return decimal_in_range(feet * 12.0, original).map(MeasurementValue::from_decimal_inches);
    }
    Err(CalcError::format(original, "not a recognized measurement"))
}

/// Feet before a `'` plus a bare fraction after it, e.g. `5' 1/2"`.
fn parse_feet_fraction(feet: &str, fraction: &str, original: &str) -> CalcResult<MeasurementValue> {
    let feet: i64 = match feet {
        f if !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()) => f
            .parse()
            .map_err(|_| CalcError::format(original, "number is too large"))?,
        _ => return Err(CalcError::format(original, "not a recognized measurement")),
    };
    match FRACTION_ONLY.captures(fraction) {
        Some(caps) => {
            let (numerator, denominator) = capture_fraction(&caps, 1, original)?;
            in_range(MeasurementValue::new(feet, 0, numerator, denominator)?, original)
        }
        None => Err(CalcError::format(original, "not a recognized measurement")),
    }
}

fn in_range(value: MeasurementValue, original: &str) -> CalcResult<MeasurementValue> {
    decimal_in_range(value.abs().to_total_inches(), original).map(|_| value)
}

fn decimal_in_range(inches: f64, original: &str) -> CalcResult<f64> {
    if inches.abs() > MAX_MAGNITUDE_INCHES {
        return Err(CalcError::format(original, "measurement is out of range"));
    }
    Ok(inches)
}

fn capture_int(caps: &Captures<'_>, group: usize, original: &str) -> CalcResult<i64> {
    caps.get(group)
        .map(|m| m.as_str())
        .unwrap_or("0")
        .parse()
        .map_err(|_| CalcError::format(original, "number is too large"))
}

/// Numerator and denominator starting at `group`, or `0/16` when absent.
fn capture_fraction(caps: &Captures<'_>, group: usize, original: &str) -> CalcResult<(i64, i64)> {
    if caps.get(group).is_none() {
        return Ok((0, DEFAULT_DENOMINATOR));
    }
    let numerator = capture_int(caps, group, original)?;
    let denominator = capture_int(caps, group + 1, original)?;
    if denominator == 0 {
        return Err(CalcError::format(original, "fraction denominator cannot be zero"));
    }
    Ok((numerator, denominator))
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.max(1)
}

impl Add for MeasurementValue {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        self.combine(rhs, 1)
    }
}

impl Sub for MeasurementValue {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        self.combine(rhs, -1)
    }
}

impl Mul<f64> for MeasurementValue {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self::from_decimal_inches(self.to_total_inches() * rhs)
    }
}

impl Neg for MeasurementValue {
    type Output = Self;
    fn neg(self) -> Self::Output {
        MeasurementValue {
            feet: self.feet.saturating_neg(),
            inches: -self.inches,
            numerator: -self.numerator,
            denominator: self.denominator,
        }
    }
}

impl fmt::Display for MeasurementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fraction_string())
    }
}

impl FromStr for MeasurementValue {
    type Err = CalcError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<MeasurementValue> for String {
    fn from(value: MeasurementValue) -> Self {
        value.to_fraction_string()
    }
}

impl TryFrom<String> for MeasurementValue {
    type Error = CalcError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
