// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! An implementation of the algorithm described in RFC 5681 and refined by
//! RFC 9002 section 7: a classic loss-based window controller with slow
//! start, congestion avoidance, and fast recovery.
//!
//!```text
//!                 New Path or      +------------+
//!            persistent congestion |   Slow     |
//!        (O)---------------------->|   Start    |
//!                                  +------------+
//!                                        |
//!                                Loss    |
//!                                        v
//! +------------+        Loss       +------------+
//! | Congestion |------------------>|   Fast     |
//! | Avoidance  |<-------------------  Recovery  |
//! +------------+  Ack of pn beyond +------------+
//!                 recovery episode
//!```
//!
//! Unlike the teacher's `CubicCongestionController` (RFC 8312, Hybrid Slow
//! Start), this implements the simpler additive-increase/multiplicative-decrease
//! behavior the spec calls for -- CUBIC's cubic growth function and Hybrid
//! Slow Start delay-based exit are both out of scope here.

use crate::{
    algorithm::{CongestionAlgorithm, Stats, StatValue},
    time::Timestamp,
    window::CongestionWindow,
    REDUCTION_FACTOR,
};

/// A loss-based congestion controller following RFC 5681 / RFC 9002.
#[derive(Clone, Debug)]
pub struct NewReno {
    window: CongestionWindow,
    in_recovery: bool,
    recovery_packet_number: u64,
    acked_packets: u64,
    lost_packets: u64,
    total_bytes_sent: u64,
    total_bytes_acked: u64,
    total_bytes_lost: u64,
}

impl Default for NewReno {
    #[inline]
    fn default() -> Self {
        Self {
            window: CongestionWindow::default(),
            in_recovery: false,
            recovery_packet_number: 0,
            acked_packets: 0,
            lost_packets: 0,
            total_bytes_sent: 0,
            total_bytes_acked: 0,
            total_bytes_lost: 0,
        }
    }
}

/// The RFC 9002 section 7.3 state the controller reports itself as being in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CongestionState {
    SlowStart,
    CongestionAvoidance,
    FastRecovery,
}

impl CongestionState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CongestionState::SlowStart => "slow_start",
            CongestionState::CongestionAvoidance => "congestion_avoidance",
            CongestionState::FastRecovery => "fast_recovery",
        }
    }
}

impl NewReno {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` iff a loss episode is currently being recovered from.
    #[inline]
    pub const fn in_recovery(&self) -> bool {
        self.in_recovery
    }

    /// The RFC 9002 section 7.3 state this controller reports.
    #[inline]
    pub fn congestion_state(&self) -> CongestionState {
        if self.in_recovery {
            CongestionState::FastRecovery
        } else if self.window.in_slow_start() {
            CongestionState::SlowStart
        } else {
            CongestionState::CongestionAvoidance
        }
    }

    #[inline]
    fn loss_rate(&self) -> f64 {
        if self.total_bytes_sent == 0 {
            0.0
        } else {
            self.total_bytes_lost as f64 / self.total_bytes_sent as f64
        }
    }
}

impl CongestionAlgorithm for NewReno {
    #[inline]
    fn on_packet_sent(&mut self, _pn: u64, bytes: u32, _sent_time: Timestamp) {
        self.total_bytes_sent += bytes as u64;
    }

    #[inline]
    fn on_packet_acked(&mut self, pn: u64, bytes: u32, _sent_time: Timestamp, _ack_time: Timestamp) {
        self.acked_packets += 1;
        self.total_bytes_acked += bytes as u64;

        if self.in_recovery && pn > self.recovery_packet_number {
            tracing::debug!(pn, "new_reno: leaving fast recovery");
            self.in_recovery = false;
        }

        if self.in_recovery {
            // A single congestion event does not grow the window while the
            // recovery episode it triggered is still open.
            return;
        }

        if self.window.in_slow_start() {
            self.window.slow_start_increase(bytes);
        } else {
            self.window.congestion_avoidance_increase(bytes);
        }
    }

    #[inline]
    fn on_packet_lost(&mut self, pn: u64, bytes: u32, _sent_time: Timestamp, _loss_time: Timestamp) {
        self.lost_packets += 1;
        self.total_bytes_lost += bytes as u64;

        if self.in_recovery && pn <= self.recovery_packet_number {
            // Same congestion event as an already-handled loss.
            return;
        }

        tracing::debug!(pn, "new_reno: entering fast recovery");
        self.in_recovery = true;
        self.recovery_packet_number = pn;
        // The only in-core caller of `reduce`, always with a factor in (0, 1);
        // the `InvalidReductionFactor` error is unreachable here.
        self.window
            .reduce(REDUCTION_FACTOR)
            .expect("REDUCTION_FACTOR is a constant within (0, 1)");
    }

    #[inline]
    fn congestion_window(&self) -> u32 {
        self.window.size()
    }

    #[inline]
    fn ssthresh(&self) -> u32 {
        self.window.ssthresh()
    }

    #[inline]
    fn can_send(&self, bytes: u32, in_flight: u32) -> bool {
        self.window.can_send(bytes, in_flight)
    }

    #[inline]
    fn sending_rate(&self) -> Option<f64> {
        None
    }

    #[inline]
    fn in_slow_start(&self) -> bool {
        self.window.in_slow_start()
    }

    #[inline]
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn stats(&self) -> Stats {
        let mut stats = Stats::new();
        stats.insert("algorithm", StatValue::Str("NewReno"));
        stats.insert(
            "congestion_window",
            StatValue::UInt(self.congestion_window() as u64),
        );
        stats.insert(
            "slow_start_threshold",
            StatValue::UInt(self.ssthresh() as u64),
        );
        stats.insert("in_recovery", StatValue::Bool(self.in_recovery));
        stats.insert(
            "state",
            StatValue::Str(self.congestion_state().as_str()),
        );
        stats.insert("acked_packets", StatValue::UInt(self.acked_packets));
        stats.insert("lost_packets", StatValue::UInt(self.lost_packets));
        stats.insert(
            "total_bytes_sent",
            StatValue::UInt(self.total_bytes_sent),
        );
        stats.insert(
            "total_bytes_acked",
            StatValue::UInt(self.total_bytes_acked),
        );
        stats.insert(
            "total_bytes_lost",
            StatValue::UInt(self.total_bytes_lost),
        );
        stats.insert("loss_rate", StatValue::Float(self.loss_rate()));
        stats
    }

    #[inline]
    fn name(&self) -> &'static str {
        "NewReno"
    }
}

#[cfg(test)]
mod tests;
