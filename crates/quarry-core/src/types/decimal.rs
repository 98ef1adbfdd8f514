use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// DecimalParseError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum DecimalParseError {
    #[error("decimal text is empty")]
    Empty,

    #[error("invalid decimal digit at position {position}")]
    InvalidDigit { position: usize },

    #[error("decimal fraction exceeds {} digits", Decimal::FRACTION_DIGITS)]
    FractionTooLong,

    #[error("decimal magnitude out of range")]
    Overflow,
}

///
/// Decimal
///
/// Fixed-point number stored as a signed integer scaled by 10^6.
/// Ordering and equality follow the scaled representation.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Decimal(i64);

impl Decimal {
    pub const FRACTION_DIGITS: usize = 6;
    pub const SCALE: i64 = 1_000_000;
    pub const ZERO: Self = Self(0);

    /// Construct from the raw scaled representation.
    #[must_use]
    pub const fn from_rep(rep: i64) -> Self {
        Self(rep)
    }

    /// Construct from a signed whole part and a six-digit fraction.
    ///
    /// The fraction takes the sign of `negative`; returns `None` on overflow
    /// or when `fraction` has more than six digits.
    #[must_use]
    pub fn from_parts(negative: bool, magnitude: u64, fraction: u32) -> Option<Self> {
        if i64::from(fraction) >= Self::SCALE {
            return None;
        }
        let whole = i64::try_from(magnitude).ok()?.checked_mul(Self::SCALE)?;
        let rep = whole.checked_add(i64::from(fraction))?;

        Some(Self(if negative { -rep } else { rep }))
    }

    #[must_use]
    pub const fn rep(self) -> i64 {
        self.0
    }

    /// Whole part, truncated toward zero.
    #[must_use]
    pub const fn magnitude(self) -> i64 {
        self.0 / Self::SCALE
    }

    /// Fractional digits as an unsigned six-digit value.
    #[must_use]
    pub const fn fraction(self) -> u32 {
        // remainder magnitude is always below SCALE
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let frac = (self.0 % Self::SCALE).unsigned_abs() as u32;
        frac
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let whole = (self.0 / Self::SCALE).unsigned_abs();

        write!(
            f,
            "{sign}{whole}.{:0width$}",
            self.fraction(),
            width = Self::FRACTION_DIGITS
        )
    }
}

impl FromStr for Decimal {
    type Err = DecimalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, body, offset) = match s.strip_prefix('-') {
            Some(rest) => (true, rest, 1),
            None => (false, s, 0),
        };
        if body.is_empty() {
            return Err(DecimalParseError::Empty);
        }

        let (whole_text, frac_text) = body.split_once('.').unwrap_or((body, ""));
        if frac_text.len() > Self::FRACTION_DIGITS {
            return Err(DecimalParseError::FractionTooLong);
        }

        let mut magnitude: u64 = 0;
        for (i, c) in whole_text.char_indices() {
            let digit = c
                .to_digit(10)
                .ok_or(DecimalParseError::InvalidDigit { position: offset + i })?;
            magnitude = magnitude
                .checked_mul(10)
                .and_then(|m| m.checked_add(u64::from(digit)))
                .ok_or(DecimalParseError::Overflow)?;
        }

        let frac_offset = offset + whole_text.len() + 1;
        let mut fraction: u32 = 0;
        for (i, c) in frac_text.char_indices() {
            let digit = c.to_digit(10).ok_or(DecimalParseError::InvalidDigit {
                position: frac_offset + i,
            })?;
            fraction = fraction * 10 + digit;
        }
        for _ in frac_text.len()..Self::FRACTION_DIGITS {
            fraction *= 10;
        }

        Self::from_parts(negative, magnitude, fraction).ok_or(DecimalParseError::Overflow)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pads_fraction_to_six_digits() {
        let d = Decimal::from_parts(true, 1, 250_000).expect("valid decimal");

        assert_eq!(d.to_string(), "-1.250000");
        assert_eq!(Decimal::ZERO.to_string(), "0.000000");
    }

    #[test]
    fn parse_accepts_short_fractions() {
        let d: Decimal = "12.5".parse().expect("parse decimal");

        assert_eq!(d.rep(), 12_500_000);
        assert_eq!(d.magnitude(), 12);
        assert_eq!(d.fraction(), 500_000);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!("".parse::<Decimal>(), Err(DecimalParseError::Empty));
        assert_eq!(
            "1.1234567".parse::<Decimal>(),
            Err(DecimalParseError::FractionTooLong)
        );
        assert_eq!(
            "-1x".parse::<Decimal>(),
            Err(DecimalParseError::InvalidDigit { position: 2 })
        );
    }

    #[test]
    fn negative_fraction_only_values_keep_sign() {
        let d: Decimal = "-0.5".parse().expect("parse decimal");

        assert!(d.is_negative());
        assert_eq!(d.to_string(), "-0.500000");
    }

    #[test]
    fn ordering_follows_rep() {
        let a: Decimal = "-2.0".parse().expect("parse decimal");
        let b: Decimal = "-1.999999".parse().expect("parse decimal");
        let c: Decimal = "0.000001".parse().expect("parse decimal");

        assert!(a < b);
        assert!(b < c);
    }
}
