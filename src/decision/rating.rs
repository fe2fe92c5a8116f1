//! The 1–5 rating shared by scores and weights.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value in `1..=5`.
///
/// The only constructor clamps, so an out-of-range rating cannot exist.
///
/// # Example
///
/// ```
/// use deecide::decision::Rating;
///
/// assert_eq!(Rating::clamped(7).value(), 5);
/// assert_eq!(Rating::clamped(0).value(), 1);
/// assert_eq!(Rating::from_reply(None).value(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", from = "i64")]
pub struct Rating(u8);

impl Rating {
    /// Lowest rating.
    pub const MIN: Self = Self(1);
    /// Highest rating.
    pub const MAX: Self = Self(5);
    /// Used when an interpreter reply carries no usable number.
    pub const DEFAULT: Self = Self(3);

    /// Clamp any integer into `1..=5`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn clamped(value: i64) -> Self {
        // In range after the clamp, so the cast is lossless.
        let clamped = value.clamp(i64::from(Self::MIN.0), i64::from(Self::MAX.0));
        Self(clamped as u8)
    }

    /// Default an absent interpreter value to 3, then clamp.
    #[must_use]
    pub fn from_reply(value: Option<i64>) -> Self {
        value.map_or(Self::DEFAULT, Self::clamped)
    }

    /// The underlying value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl From<i64> for Rating {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;
    use test_case::test_case;

    assert_impl_all!(Rating: Send, Sync, Copy, Ord, std::hash::Hash);

    #[test_case(-3 => 1; "negative")]
    #[test_case(0 => 1; "zero")]
    #[test_case(1 => 1; "lower bound")]
    #[test_case(3 => 3; "middle")]
    #[test_case(5 => 5; "upper bound")]
    #[test_case(7 => 5; "above")]
    #[test_case(i64::MAX => 5; "huge")]
    fn test_clamped(raw: i64) -> u8 {
        Rating::clamped(raw).value()
    }

    #[test]
    fn test_from_reply_defaults_to_three() {
        assert_eq!(Rating::from_reply(None), Rating::DEFAULT);
        assert_eq!(Rating::from_reply(Some(9)), Rating::MAX);
    }

    #[test]
    fn test_serde_clamps_on_the_way_in() {
        let rating: Rating = serde_json::from_str("12").unwrap();
        assert_eq!(rating.value(), 5);
        assert_eq!(serde_json::to_string(&Rating::clamped(2)).unwrap(), "2");
    }

    #[test]
    fn test_display() {
        assert_eq!(Rating::clamped(4).to_string(), "4");
    }
}
