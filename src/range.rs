use crate::errors::InvalidRange;
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;

/// How many times we expect the remote MockServer to have received a request matching a
/// [`RequestPattern`], checked via [`MockServerClient::verify`].
///
/// Both bounds are inclusive. You can use one of the presets
/// ```rust
/// use mockserver_client::VerificationRange;
///
/// assert_eq!(VerificationRange::never(), VerificationRange::between(0, 0));
/// assert_eq!(VerificationRange::once(), VerificationRange::exactly(1));
/// assert_eq!(VerificationRange::twice(), 2u64.into());
/// ```
/// or spell out the bounds
/// ```rust
/// use mockserver_client::VerificationRange;
///
/// // Between 1 and 3 (included) times
/// let range = VerificationRange::between(1, 3);
/// assert_eq!(VerificationRange::try_from(1..=3), Ok(range));
/// // The lower bound cannot exceed the upper one
/// assert!(VerificationRange::try_from(3..=1).is_err());
/// ```
///
/// A `VerificationRange` is serialized as MockServer expects it: `{"atLeast": n, "atMost": m}`.
///
/// [`RequestPattern`]: crate::RequestPattern
/// [`MockServerClient::verify`]: crate::MockServerClient::verify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRange {
    at_least: u64,
    at_most: u64,
}

impl VerificationRange {
    /// The request must never have been received.
    pub fn never() -> Self {
        Self::exactly(0)
    }

    /// The request must have been received exactly once.
    pub fn once() -> Self {
        Self::exactly(1)
    }

    /// The request must have been received exactly twice.
    pub fn twice() -> Self {
        Self::exactly(2)
    }

    pub fn exactly(n: u64) -> Self {
        Self {
            at_least: n,
            at_most: n,
        }
    }

    /// Between `at_least` and `at_most` calls, both included.
    ///
    /// It panics if `at_least` is greater than `at_most` - use the `TryFrom<RangeInclusive<u64>>`
    /// implementation if you would rather handle the error.
    pub fn between(at_least: u64, at_most: u64) -> Self {
        assert!(
            at_least <= at_most,
            "at_least ({}) must not be greater than at_most ({})!",
            at_least,
            at_most
        );
        Self { at_least, at_most }
    }

    pub fn at_least(&self) -> u64 {
        self.at_least
    }

    pub fn at_most(&self) -> u64 {
        self.at_most
    }

    pub fn contains(&self, n_calls: u64) -> bool {
        (self.at_least..=self.at_most).contains(&n_calls)
    }
}

impl From<u64> for VerificationRange {
    fn from(n: u64) -> Self {
        VerificationRange::exactly(n)
    }
}

impl TryFrom<RangeInclusive<u64>> for VerificationRange {
    type Error = InvalidRange;

    fn try_from(range: RangeInclusive<u64>) -> Result<Self, Self::Error> {
        let (at_least, at_most) = range.into_inner();
        if at_least > at_most {
            return Err(InvalidRange { at_least, at_most });
        }
        Ok(Self { at_least, at_most })
    }
}

impl fmt::Display for VerificationRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.at_least == self.at_most {
            write!(f, "x == {}", self.at_least)
        } else {
            write!(f, "{} <= x <= {}", self.at_least, self.at_most)
        }
    }
}
