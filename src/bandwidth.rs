// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! A small fixed-point bandwidth type, adapted from the teacher's
//! `recovery::bandwidth::Bandwidth`. The teacher stores bits-per-second at
//! microsecond precision to share a representation with bit-oriented link
//! rates; this core only ever reasons about bytes/s (the spec's BBR section
//! works entirely in bytes), so the internal unit is simplified to
//! bytes-per-second directly.

use core::time::Duration;
use num_rational::Ratio;

/// A data rate, represented internally as whole bytes per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Bandwidth {
    bytes_per_second: u64,
}

impl Bandwidth {
    pub const ZERO: Bandwidth = Bandwidth { bytes_per_second: 0 };

    /// Constructs a `Bandwidth` from a byte count delivered over `interval`.
    ///
    /// Returns [`Bandwidth::ZERO`] if `interval` is zero, since a rate is
    /// undefined for an instantaneous transfer.
    #[inline]
    pub fn new(bytes: u64, interval: Duration) -> Self {
        if interval.is_zero() {
            return Bandwidth::ZERO;
        }

        // scale by 1e9 before dividing to retain sub-second precision
        let nanos = interval.as_nanos().max(1);
        let scaled = (bytes as u128 * 1_000_000_000u128) / nanos;
        Self {
            bytes_per_second: scaled.min(u64::MAX as u128) as u64,
        }
    }

    #[inline]
    pub const fn from_bytes_per_second(bytes_per_second: u64) -> Self {
        Self { bytes_per_second }
    }

    #[inline]
    pub const fn as_bytes_per_second(&self) -> u64 {
        self.bytes_per_second
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.bytes_per_second == 0
    }
}

impl core::ops::Mul<Ratio<u64>> for Bandwidth {
    type Output = Bandwidth;

    #[inline]
    fn mul(self, rhs: Ratio<u64>) -> Bandwidth {
        Bandwidth {
            bytes_per_second: (rhs * self.bytes_per_second).to_integer(),
        }
    }
}

/// Multiplying a rate by a duration yields the number of bytes that would be
/// delivered over that interval at that rate -- used to compute the
/// bandwidth-delay product.
impl core::ops::Mul<Duration> for Bandwidth {
    type Output = u64;

    #[inline]
    fn mul(self, rhs: Duration) -> u64 {
        let micros = rhs.as_micros().min(u64::MAX as u128) as u64;
        self.bytes_per_second
            .saturating_mul(micros)
            .saturating_div(1_000_000)
    }
}
