// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! RTT estimation is an external collaborator per the spec: the core depends
//! only on the [`RttSource`] trait. A concrete EWMA estimator ships as the
//! controller's default, adapted and heavily trimmed from the teacher's
//! `recovery::RttEstimator` (RFC 9002 section 5.3) down to the handful of
//! operations the controller actually calls.

use core::time::Duration;
use std::collections::HashMap;

use crate::algorithm::stats::StatValue;

/// The initial RTT assumed before any sample has been observed, per
/// RFC 9002 section 6.2.2.
pub const DEFAULT_INITIAL_RTT: Duration = Duration::from_millis(333);

/// The smoothing factor applied to new RTT samples, per RFC 6298 (`1/8`).
const SRTT_ALPHA_DENOM: u32 = 8;
/// The smoothing factor applied to RTT variance samples, per RFC 6298 (`1/4`).
const RTTVAR_BETA_DENOM: u32 = 4;

/// The external contract the controller depends on for RTT feedback.
///
/// Implementations reject non-positive samples by returning `false` and
/// leaving their state unchanged, so the controller never needs to validate
/// samples itself before calling `update_rtt`.
pub trait RttSource {
    /// Feeds a new RTT sample (in seconds) into the estimator. Returns
    /// `false` without mutating state if `sample` is not positive.
    fn update_rtt(&mut self, sample: Duration) -> bool;

    /// Returns a flat map of whichever of `min_rtt`, `smoothed_rtt`, and
    /// `rtt_var` (all in seconds) are currently available.
    fn stats(&self) -> HashMap<&'static str, StatValue>;

    /// Restores the estimator to its initial, sample-free state.
    fn reset(&mut self);
}

/// A minimal EWMA round-trip-time estimator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RttEstimator {
    initial_rtt: Duration,
    latest_rtt: Duration,
    min_rtt: Duration,
    smoothed_rtt: Duration,
    rttvar: Duration,
    has_sample: bool,
}

impl Default for RttEstimator {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_RTT)
    }
}

impl RttEstimator {
    /// Constructs an estimator that reports `initial_rtt` until a sample
    /// arrives.
    #[inline]
    pub fn new(initial_rtt: Duration) -> Self {
        Self {
            initial_rtt,
            latest_rtt: initial_rtt,
            min_rtt: initial_rtt,
            smoothed_rtt: initial_rtt,
            rttvar: initial_rtt / 2,
            has_sample: false,
        }
    }

    /// The most recent RTT sample fed in, or the initial RTT if none has.
    #[inline]
    pub const fn latest_rtt(&self) -> Duration {
        self.latest_rtt
    }

    /// The smallest RTT observed over the estimator's lifetime.
    #[inline]
    pub const fn min_rtt(&self) -> Duration {
        self.min_rtt
    }

    /// The exponentially weighted moving average of observed RTTs.
    #[inline]
    pub const fn smoothed_rtt(&self) -> Duration {
        self.smoothed_rtt
    }

    /// The exponentially weighted moving average of RTT variance.
    #[inline]
    pub const fn rttvar(&self) -> Duration {
        self.rttvar
    }

    #[inline]
    pub const fn has_sample(&self) -> bool {
        self.has_sample
    }
}

impl RttSource for RttEstimator {
    #[inline]
    fn update_rtt(&mut self, sample: Duration) -> bool {
        if sample.is_zero() {
            return false;
        }

        self.latest_rtt = sample;
        self.min_rtt = self.min_rtt.min(sample);

        if !self.has_sample {
            //= RFC 6298 section 2
            //# smoothed_rtt = sample
            //# rttvar = sample / 2
            self.smoothed_rtt = sample;
            self.rttvar = sample / 2;
            self.has_sample = true;
        } else {
            let diff = self.smoothed_rtt.abs_diff(sample);
            self.rttvar = (self.rttvar * (RTTVAR_BETA_DENOM - 1) + diff) / RTTVAR_BETA_DENOM;
            self.smoothed_rtt =
                (self.smoothed_rtt * (SRTT_ALPHA_DENOM - 1) + sample) / SRTT_ALPHA_DENOM;
        }

        tracing::trace!(
            sample_secs = sample.as_secs_f64(),
            smoothed_rtt_secs = self.smoothed_rtt.as_secs_f64(),
            "rtt sample observed"
        );

        true
    }

    #[inline]
    fn stats(&self) -> HashMap<&'static str, StatValue> {
        let mut stats = HashMap::new();
        if self.has_sample {
            stats.insert("min_rtt", StatValue::Float(self.min_rtt.as_secs_f64()));
            stats.insert(
                "smoothed_rtt",
                StatValue::Float(self.smoothed_rtt.as_secs_f64()),
            );
            stats.insert("rtt_var", StatValue::Float(self.rttvar.as_secs_f64()));
        }
        stats
    }

    #[inline]
    fn reset(&mut self) {
        *self = Self::new(self.initial_rtt);
    }
}

#[cfg(test)]
mod tests;
