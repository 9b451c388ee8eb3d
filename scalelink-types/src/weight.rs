//! Weight readings reported by the scale

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Scale factor for a device division code.
///
/// | code | kg per count |
/// |------|--------------|
/// | 0    | 0.0001       |
/// | 1    | 0.001        |
/// | 2    | 0.01         |
/// | 3    | 0.1          |
/// | 4    | 1.0          |
///
/// Any other code falls back to `1.0`.
pub fn divisor(division_code: u8) -> f64 {
    match division_code {
        0 => 0.0001,
        1 => 0.001,
        2 => 0.01,
        3 => 0.1,
        4 => 1.0,
        _ => 1.0,
    }
}

/// A single decoded weight reading
///
/// Built fresh from every successful response and never cached.
///
/// # Examples
///
/// ```
/// use scalelink_types::WeightReading;
///
/// let reading = WeightReading::new(12345, 2, true);
/// assert!((reading.weight_kg() - 123.45).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightReading {
    /// Raw signed count as sent by the device
    pub raw: i32,

    /// Division code selecting the scale factor (see [`divisor`])
    pub division_code: u8,

    /// Device reports the weight as settled
    pub stable: bool,
}

impl WeightReading {
    pub fn new(raw: i32, division_code: u8, stable: bool) -> Self {
        Self {
            raw,
            division_code,
            stable,
        }
    }

    /// Weight in kilograms
    pub fn weight_kg(&self) -> f64 {
        f64::from(self.raw) * divisor(self.division_code)
    }

    /// Number of fractional digits implied by the division code
    fn precision(&self) -> usize {
        match self.division_code {
            0 => 4,
            1 => 3,
            2 => 2,
            3 => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for WeightReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.*} kg ({})",
            self.precision(),
            self.weight_kg(),
            if self.stable { "stable" } else { "unstable" }
        )
    }
}

/// A weight parsed from its ASCII decimal form, e.g. `"123.45"`
///
/// The fractional digit count is mapped onto a division code so that the
/// value can be carried as a [`WeightReading`] without losing precision:
/// `"123.45"` becomes `raw = 12345`, `division_code = 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalWeight {
    pub raw: i32,
    pub division_code: u8,
}

impl DecimalWeight {
    /// Largest number of fractional digits a division code can express
    pub const MAX_FRACTION_DIGITS: usize = 4;

    /// Weight in kilograms
    pub fn weight_kg(&self) -> f64 {
        f64::from(self.raw) * divisor(self.division_code)
    }

    /// Attach a stability verdict and produce a reading
    pub fn into_reading(self, stable: bool) -> WeightReading {
        WeightReading::new(self.raw, self.division_code, stable)
    }
}

impl FromStr for DecimalWeight {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // Devices pad the field with spaces
        let text = s.trim_matches(|c: char| c == ' ' || c == '\t');

        let (negative, digits) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (digits, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(Error::Parse(format!("no digits in {:?}", s)));
        }

        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(Error::Parse(format!("not a decimal number: {:?}", s)));
        }

        if frac_part.len() > Self::MAX_FRACTION_DIGITS {
            return Err(Error::Validation(format!(
                "{} fractional digits in {:?} (max: {})",
                frac_part.len(),
                s,
                Self::MAX_FRACTION_DIGITS
            )));
        }

        let mut magnitude: i64 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            magnitude = magnitude * 10 + i64::from(b - b'0');
            if magnitude > i64::from(i32::MAX) + 1 {
                return Err(Error::Validation(format!("weight out of range: {:?}", s)));
            }
        }

        let signed = if negative { -magnitude } else { magnitude };
        let raw = i32::try_from(signed)
            .map_err(|_| Error::Validation(format!("weight out of range: {:?}", s)))?;

        Ok(Self {
            raw,
            division_code: (Self::MAX_FRACTION_DIGITS - frac_part.len()) as u8,
        })
    }
}
