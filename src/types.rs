//! Domain-specific newtypes for type safety.
//!
//! Play counts, track lengths in seconds and playback positions in
//! milliseconds are all plain integers underneath; wrapping them keeps the
//! units from being mixed up. `derive_more` supplies the arithmetic.

use std::fmt;
use std::ops::AddAssign;

use derive_more::{Add as DeriveAdd, From, Into};

// ============================================================================
// Macros for reducing boilerplate
// ============================================================================

/// Generates common methods for numeric newtypes.
macro_rules! impl_newtype_common {
    ($type:ty) => {
        impl $type {
            /// Create a new instance.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Get the inner value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }

            /// Check if the value is zero.
            #[must_use]
            pub const fn is_zero(self) -> bool {
                self.0 == 0
            }
        }

        impl AddAssign for $type {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::default(), |acc, x| acc + x)
            }
        }
    };
}

// ============================================================================
// PlayCount
// ============================================================================

/// Number of qualifying plays of a song (or of all songs by an artist).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, DeriveAdd, From, Into,
)]
pub struct PlayCount(pub i64);

impl_newtype_common!(PlayCount);

impl fmt::Display for PlayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Seconds
// ============================================================================

/// A duration in whole seconds, the unit song lengths are stored in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, DeriveAdd, From, Into,
)]
pub struct Seconds(pub i64);

impl_newtype_common!(Seconds);

impl Seconds {
    /// Listening time for `plays` plays of something this long.
    #[must_use]
    pub const fn times(self, plays: PlayCount) -> Self {
        Self(self.0 * plays.0)
    }

    /// Split into `(hours, minutes, seconds)`.
    #[must_use]
    pub const fn hms(self) -> (i64, i64, i64) {
        (self.0 / 3600, (self.0 % 3600) / 60, self.0 % 60)
    }

    /// Long form used in the stats footer, e.g. `2 hours, 5 minutes, 9 seconds`.
    #[must_use]
    pub fn spelled_out(self) -> String {
        let (h, m, s) = self.hms();
        format!("{h} hours, {m} minutes, {s} seconds")
    }
}

/// Formats as `H:MM:SS`; hours are not padded.
impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.hms();
        write!(f, "{h}:{m:02}:{s:02}")
    }
}

// ============================================================================
// Milliseconds
// ============================================================================

/// A playback position or track length in milliseconds, as reported by the
/// streaming service.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, DeriveAdd, From, Into,
)]
pub struct Milliseconds(pub i64);

impl_newtype_common!(Milliseconds);

impl Milliseconds {
    /// Truncate to whole seconds.
    #[must_use]
    pub const fn to_seconds(self) -> Seconds {
        Seconds(self.0 / 1000)
    }
}

/// Formats as `MM:SS` within the hour, the way a player's progress bar does.
impl fmt::Display for Milliseconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (_, m, s) = self.to_seconds().hms();
        write!(f, "{m:02}:{s:02}")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod play_count {
        use super::*;

        #[test]
        fn basic_operations() {
            let count = PlayCount::new(42);
            assert_eq!(count.get(), 42);
            assert!(!count.is_zero());
            assert!(PlayCount::default().is_zero());
        }

        #[test]
        fn arithmetic_and_sum() {
            let mut c = PlayCount::new(10) + PlayCount::new(5);
            assert_eq!(c, PlayCount::new(15));
            c += PlayCount::new(3);
            assert_eq!(c, PlayCount::new(18));

            let total: PlayCount = [1, 2, 3].into_iter().map(PlayCount::new).sum();
            assert_eq!(total, PlayCount::new(6));
        }

        #[test]
        fn display() {
            assert_eq!(PlayCount::new(100).to_string(), "100");
        }
    }

    mod seconds {
        use super::*;

        #[test]
        fn hms_split() {
            assert_eq!(Seconds::new(3_725).hms(), (1, 2, 5));
            assert_eq!(Seconds::new(59).hms(), (0, 0, 59));
        }

        #[test]
        fn display_pads_minutes_and_seconds_only() {
            assert_eq!(Seconds::new(0).to_string(), "0:00:00");
            assert_eq!(Seconds::new(3_725).to_string(), "1:02:05");
            assert_eq!(Seconds::new(36_000 * 3 + 61).to_string(), "30:01:01");
        }

        #[test]
        fn times_play_count() {
            assert_eq!(Seconds::new(200).times(PlayCount::new(3)), Seconds::new(600));
        }

        #[test]
        fn spelled_out() {
            assert_eq!(
                Seconds::new(7_509).spelled_out(),
                "2 hours, 5 minutes, 9 seconds"
            );
        }
    }

    mod milliseconds {
        use super::*;

        #[test]
        fn truncates_to_seconds() {
            assert_eq!(Milliseconds::new(15_999).to_seconds(), Seconds::new(15));
        }

        #[test]
        fn display_as_player_clock() {
            assert_eq!(Milliseconds::new(83_000).to_string(), "01:23");
            assert_eq!(Milliseconds::new(0).to_string(), "00:00");
        }
    }
}
