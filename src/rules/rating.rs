//! # Case Rating Validation
//!
//! A case rating is either one digit from 1 to 5 (`"3"`) or an inclusive
//! range inside that span (`"2-4"`). Both the add path and the bulk update
//! path validate ratings, with slightly different strictness.

use crate::errors::ServiceError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// How strictly a rating string is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingPolicy {
    /// When false, any rating whose text starts with `0` is rejected outright.
    pub allow_leading_zero: bool,
}

impl RatingPolicy {
    /// Policy applied when a single rule is added.
    pub const STRICT: RatingPolicy = RatingPolicy {
        allow_leading_zero: false,
    };

    /// Policy applied to every rule of a bulk update. Leading zeros are only
    /// caught by the range check, so `"03"` passes while `"0-3"` does not.
    pub const BULK: RatingPolicy = RatingPolicy {
        allow_leading_zero: true,
    };
}

/// A parsed case rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingSpec {
    Single(u8),
    Range { low: u8, high: u8 },
}

impl RatingSpec {
    /// Parse `text` under `policy`, returning `None` if it is not a valid rating.
    pub fn parse_with(text: &str, policy: RatingPolicy) -> Option<RatingSpec> {
        if !policy.allow_leading_zero && text.starts_with('0') {
            return None;
        }
        if text.contains("--") {
            return None;
        }

        if text.contains('-') {
            let parts: Vec<&str> = text.split('-').collect();
            let [low, high] = parts.as_slice() else {
                return None;
            };
            let low = parse_digits(low)?;
            let high = parse_digits(high)?;
            if low < u64::from(MIN_RATING) || high > u64::from(MAX_RATING) || low > high {
                return None;
            }
            Some(RatingSpec::Range {
                low: low as u8,
                high: high as u8,
            })
        } else {
            let rating = parse_digits(text)?;
            if !(u64::from(MIN_RATING)..=u64::from(MAX_RATING)).contains(&rating) {
                return None;
            }
            Some(RatingSpec::Single(rating as u8))
        }
    }

    pub fn low(&self) -> u8 {
        match *self {
            RatingSpec::Single(r) => r,
            RatingSpec::Range { low, .. } => low,
        }
    }

    pub fn high(&self) -> u8 {
        match *self {
            RatingSpec::Single(r) => r,
            RatingSpec::Range { high, .. } => high,
        }
    }

    /// Whether a case with the given rating falls under this rating.
    pub fn contains(&self, rating: u8) -> bool {
        (self.low()..=self.high()).contains(&rating)
    }
}

impl FromStr for RatingSpec {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RatingSpec::parse_with(s, RatingPolicy::STRICT).ok_or_else(|| {
            ServiceError::Validation(format!(
                "'{s}' is not a valid case rating; expected a number from 1 to 5 or a range such as 1-5"
            ))
        })
    }
}

impl fmt::Display for RatingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingSpec::Single(r) => write!(f, "{r}"),
            RatingSpec::Range { low, high } => write!(f, "{low}-{high}"),
        }
    }
}

/// Non-empty ASCII digit string to integer. Overflow counts as invalid.
fn parse_digits(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Shared validator behind both entry points.
pub fn validate_rating(text: &str, policy: RatingPolicy) -> bool {
    RatingSpec::parse_with(text, policy).is_some()
}

/// Add-time validator. Anything but a JSON string is rejected.
pub fn validate_case_rating(case_rating: &Value) -> bool {
    match case_rating {
        Value::String(text) => validate_rating(text, RatingPolicy::STRICT),
        _ => false,
    }
}

/// Bulk-update validator. A missing rating is rejected.
pub fn validate_case_rating_format(case_rating: Option<&Value>) -> bool {
    match case_rating {
        Some(Value::String(text)) => validate_rating(text, RatingPolicy::BULK),
        _ => false,
    }
}
