// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Defines time related datatypes.
//!
//! Unlike the teacher's `time::Timestamp` (a `NonZeroU64` nanosecond counter
//! with a reserved zero sentinel for "never observed"), every method in this
//! crate receives its timestamps as arguments rather than reading a clock, so
//! there is no need for a sentinel value or nanosecond-scale resolution.
//! `Timestamp` here is a thin newtype over [`Duration`] since an arbitrary
//! epoch, chosen to match the spec's "seconds since an arbitrary epoch" model
//! directly.

use core::{fmt, ops::Add, ops::Sub, time::Duration};

/// An absolute point in time, opaque except for comparison against other
/// `Timestamp`s sourced from the same caller-chosen epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(Duration);

impl Timestamp {
    /// The zero point of whatever epoch the caller has chosen.
    pub const ZERO: Timestamp = Timestamp(Duration::ZERO);

    /// Constructs a `Timestamp` `secs` seconds after the epoch.
    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        Timestamp(Duration::from_secs_f64(secs.max(0.0)))
    }

    /// Constructs a `Timestamp` from a raw [`Duration`] since the epoch.
    #[inline]
    pub const fn from_duration(duration: Duration) -> Self {
        Timestamp(duration)
    }

    /// Returns the number of seconds since the epoch as a float.
    #[inline]
    pub fn as_secs_f64(&self) -> f64 {
        self.0.as_secs_f64()
    }

    /// Returns the duration elapsed since `earlier`, or `None` if `earlier`
    /// is after `self`.
    #[inline]
    pub fn checked_duration_since(&self, earlier: Timestamp) -> Option<Duration> {
        self.0.checked_sub(earlier.0)
    }

    /// Returns the duration elapsed since `earlier`, saturating to zero if
    /// `earlier` is after `self`.
    #[inline]
    pub fn saturating_duration_since(&self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({:?})", self.0)
    }
}

impl Sub for Timestamp {
    type Output = Duration;

    /// Panics if `rhs` is later than `self`; callers that cannot guarantee
    /// ordering should use [`Timestamp::checked_duration_since`] instead.
    #[inline]
    fn sub(self, rhs: Timestamp) -> Duration {
        self.0 - rhs.0
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    #[inline]
    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0 + rhs)
    }
}
