// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! A model-based congestion controller loosely following BBR v1
//! (draft-cardwell-iccrg-bbr-congestion-control-02), the same family the
//! teacher implements a fuller BBR v2 of in `recovery::bbr`. This is a
//! considerably smaller state machine than the teacher's -- no ECN
//! integration, no full-pipe/loss-round estimators, no randomized cycle
//! start -- matching the spec's four-state, single-bandwidth-filter model
//! rather than the teacher's production BBRv2.

use std::collections::VecDeque;

use num_rational::Ratio;

use crate::{
    algorithm::{CongestionAlgorithm, Stats, StatValue},
    bandwidth::Bandwidth,
    time::Timestamp,
    INITIAL_WINDOW, MSS,
};
use core::time::Duration;

/// Number of samples retained in the bandwidth max-filter.
const BANDWIDTH_SAMPLE_CAPACITY: usize = 10;
/// How often the gain cycle advances while in `ProbeBw`.
const CYCLE_DURATION: Duration = Duration::from_secs(1);
/// How long `ProbeBw` runs before probing RTT again.
const PROBE_RTT_ENTRY_INTERVAL: Duration = Duration::from_secs(10);
/// How long `ProbeRtt` holds the reduced window before returning to `ProbeBw`.
const PROBE_RTT_DURATION: Duration = Duration::from_millis(200);
/// The floor cwnd is never allowed to drop below while probing RTT, in packets.
const MIN_PIPE_CWND_PACKETS: u32 = 4;
/// The bandwidth growth ratio below which `Startup` is considered to have
/// stalled (bandwidth-delay product has filled the pipe).
const STARTUP_GROWTH_TARGET: f64 = 1.25;

const HIGH_GAIN: Ratio<u64> = Ratio::new_raw(577, 200); // 2.885
const DRAIN_GAIN: Ratio<u64> = Ratio::new_raw(200, 577); // 1 / 2.885
const PROBE_RTT_GAIN: Ratio<u64> = Ratio::new_raw(1, 1);
const GAIN_CYCLE: [Ratio<u64>; 8] = [
    Ratio::new_raw(5, 4), // 1.25
    Ratio::new_raw(3, 4), // 0.75
    Ratio::new_raw(1, 1),
    Ratio::new_raw(1, 1),
    Ratio::new_raw(1, 1),
    Ratio::new_raw(1, 1),
    Ratio::new_raw(1, 1),
    Ratio::new_raw(1, 1),
];

/// The phase of BBR's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BbrState {
    Startup,
    Drain,
    ProbeBw,
    ProbeRtt,
}

impl BbrState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BbrState::Startup => "Startup",
            BbrState::Drain => "Drain",
            BbrState::ProbeBw => "ProbeBw",
            BbrState::ProbeRtt => "ProbeRtt",
        }
    }
}

/// A model-based congestion controller: `Startup -> Drain -> ProbeBw <-> ProbeRtt`.
#[derive(Clone, Debug)]
pub struct Bbr {
    state: BbrState,
    cwnd: u32,
    bandwidth_samples: VecDeque<Bandwidth>,
    max_bandwidth: Bandwidth,
    min_rtt: Option<Duration>,
    rt_prop: Option<Duration>,
    pacing_rate: Bandwidth,
    cycle_index: usize,
    /// Last time the `ProbeBw` gain cycle advanced.
    cycle_start: Timestamp,
    /// Time `ProbeBw` was (re-)entered; drives the 10s `ProbeRtt` re-entry
    /// timer, kept separate from `cycle_start` -- see `SPEC_FULL.md`
    /// section 9 for why a single shared timestamp cannot satisfy both the
    /// 1s cycle-rotation and 10s probe-rtt-entry durations simultaneously.
    probe_bw_start: Timestamp,
    prior_cwnd: u32,
    probe_rtt_start: Timestamp,
    acked_packets: u64,
    lost_packets: u64,
    total_bytes_sent: u64,
    total_bytes_acked: u64,
    total_bytes_lost: u64,
}

impl Default for Bbr {
    #[inline]
    fn default() -> Self {
        Self {
            state: BbrState::Startup,
            cwnd: INITIAL_WINDOW,
            bandwidth_samples: VecDeque::with_capacity(BANDWIDTH_SAMPLE_CAPACITY),
            max_bandwidth: Bandwidth::ZERO,
            min_rtt: None,
            rt_prop: None,
            pacing_rate: Bandwidth::ZERO,
            cycle_index: 0,
            cycle_start: Timestamp::ZERO,
            probe_bw_start: Timestamp::ZERO,
            prior_cwnd: INITIAL_WINDOW,
            probe_rtt_start: Timestamp::ZERO,
            acked_packets: 0,
            lost_packets: 0,
            total_bytes_sent: 0,
            total_bytes_acked: 0,
            total_bytes_lost: 0,
        }
    }
}

impl Bbr {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub const fn state(&self) -> BbrState {
        self.state
    }

    #[inline]
    pub fn max_bandwidth(&self) -> Bandwidth {
        self.max_bandwidth
    }

    #[inline]
    pub fn min_rtt(&self) -> Duration {
        self.min_rtt.unwrap_or(Duration::ZERO)
    }

    #[inline]
    pub fn rt_prop(&self) -> Duration {
        self.rt_prop.unwrap_or(Duration::ZERO)
    }

    #[inline]
    pub fn pacing_rate(&self) -> Bandwidth {
        self.pacing_rate
    }

    #[inline]
    pub const fn cycle_index(&self) -> usize {
        self.cycle_index
    }

    /// The cwnd/pacing gain for the current state (identical for both, per
    /// the spec's gain table).
    fn gain(&self) -> Ratio<u64> {
        match self.state {
            BbrState::Startup => HIGH_GAIN,
            BbrState::Drain => DRAIN_GAIN,
            BbrState::ProbeBw => GAIN_CYCLE[self.cycle_index],
            BbrState::ProbeRtt => PROBE_RTT_GAIN,
        }
    }

    /// `max(4*MSS, BDP * gain)`, falling back to `10*MSS` when bandwidth or
    /// RTT propagation has not yet been observed.
    fn target_cwnd(&self, gain: Ratio<u64>) -> u32 {
        let min_pipe_cwnd = MIN_PIPE_CWND_PACKETS * MSS;

        match self.rt_prop {
            Some(rt_prop) if !self.max_bandwidth.is_zero() => {
                let bdp = self.max_bandwidth * rt_prop;
                let target = (gain * bdp).to_integer();
                (min_pipe_cwnd as u64).max(target).min(u32::MAX as u64) as u32
            }
            _ => 10 * MSS,
        }
    }

    fn record_bandwidth_sample(&mut self, bytes: u32, rtt: Duration) {
        let sample = Bandwidth::new(bytes as u64, rtt);
        if self.bandwidth_samples.len() == BANDWIDTH_SAMPLE_CAPACITY {
            self.bandwidth_samples.pop_front();
        }
        self.bandwidth_samples.push_back(sample);
        self.max_bandwidth = self
            .bandwidth_samples
            .iter()
            .copied()
            .max()
            .unwrap_or(Bandwidth::ZERO);
    }

    fn update_rtt(&mut self, rtt: Duration) {
        self.min_rtt = Some(self.min_rtt.map_or(rtt, |m| m.min(rtt)));
        self.rt_prop = Some(self.rt_prop.map_or(rtt, |m| m.min(rtt)));
    }

    fn check_state_transitions(&mut self, now: Timestamp) {
        match self.state {
            BbrState::Startup => {
                if self.bandwidth_samples.len() >= 3 {
                    let newest = self.bandwidth_samples.back().copied().unwrap();
                    let oldest = self.bandwidth_samples[self.bandwidth_samples.len() - 3];
                    let stalled = if oldest.is_zero() {
                        newest.is_zero()
                    } else {
                        (newest.as_bytes_per_second() as f64 / oldest.as_bytes_per_second() as f64)
                            < STARTUP_GROWTH_TARGET
                    };
                    if stalled {
                        tracing::debug!("bbr: startup growth stalled, entering drain");
                        self.state = BbrState::Drain;
                    }
                }
            }
            BbrState::Drain => {
                if self.cwnd <= self.target_cwnd(Ratio::from_integer(1)) {
                    tracing::debug!("bbr: drain complete, entering probe_bw");
                    self.enter_probe_bw(now);
                }
            }
            BbrState::ProbeBw => {
                if now.saturating_duration_since(self.cycle_start) >= CYCLE_DURATION {
                    self.cycle_index = (self.cycle_index + 1) % GAIN_CYCLE.len();
                    self.cycle_start = now;
                }
                if now.saturating_duration_since(self.probe_bw_start) > PROBE_RTT_ENTRY_INTERVAL {
                    tracing::debug!("bbr: entering probe_rtt");
                    self.prior_cwnd = self.cwnd;
                    self.probe_rtt_start = now;
                    self.state = BbrState::ProbeRtt;
                }
            }
            BbrState::ProbeRtt => {
                if now.saturating_duration_since(self.probe_rtt_start) >= PROBE_RTT_DURATION {
                    tracing::debug!("bbr: probe_rtt complete, returning to probe_bw");
                    self.cwnd = self.prior_cwnd;
                    self.enter_probe_bw(now);
                }
            }
        }
    }

    fn enter_probe_bw(&mut self, now: Timestamp) {
        self.state = BbrState::ProbeBw;
        self.cycle_index = 0;
        self.cycle_start = now;
        self.probe_bw_start = now;
    }

    #[inline]
    fn loss_rate(&self) -> f64 {
        let total = self.acked_packets + self.lost_packets;
        if total == 0 {
            0.0
        } else {
            self.lost_packets as f64 / total as f64
        }
    }
}

impl CongestionAlgorithm for Bbr {
    #[inline]
    fn on_packet_sent(&mut self, _pn: u64, bytes: u32, _sent_time: Timestamp) {
        self.total_bytes_sent += bytes as u64;
    }

    fn on_packet_acked(&mut self, _pn: u64, bytes: u32, sent_time: Timestamp, ack_time: Timestamp) {
        self.acked_packets += 1;
        self.total_bytes_acked += bytes as u64;

        if let Some(rtt) = ack_time.checked_duration_since(sent_time).filter(|d| !d.is_zero()) {
            self.record_bandwidth_sample(bytes, rtt);
            self.update_rtt(rtt);
        }

        self.check_state_transitions(ack_time);

        let gain = self.gain();
        let target = self.target_cwnd(gain);
        self.cwnd = if self.state == BbrState::ProbeRtt {
            (MIN_PIPE_CWND_PACKETS * MSS).max((target as f64 * 0.5).floor() as u32)
        } else {
            target
        };

        self.pacing_rate = if self.max_bandwidth.is_zero() {
            Bandwidth::ZERO
        } else {
            self.max_bandwidth * gain
        };
    }

    #[inline]
    fn on_packet_lost(&mut self, _pn: u64, bytes: u32, _sent_time: Timestamp, _loss_time: Timestamp) {
        self.lost_packets += 1;
        self.total_bytes_lost += bytes as u64;
        // BBR does not react to loss with a window reduction; loss is
        // tracked for statistics only.
    }

    #[inline]
    fn congestion_window(&self) -> u32 {
        self.cwnd
    }

    #[inline]
    fn ssthresh(&self) -> u32 {
        u32::MAX
    }

    #[inline]
    fn can_send(&self, bytes: u32, in_flight: u32) -> bool {
        in_flight.saturating_add(bytes) <= self.cwnd
    }

    #[inline]
    fn sending_rate(&self) -> Option<f64> {
        if self.pacing_rate.is_zero() {
            None
        } else {
            Some(self.pacing_rate.as_bytes_per_second() as f64)
        }
    }

    #[inline]
    fn in_slow_start(&self) -> bool {
        self.state == BbrState::Startup
    }

    #[inline]
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn stats(&self) -> Stats {
        let mut stats = Stats::new();
        stats.insert("algorithm", StatValue::Str("BBR"));
        stats.insert("congestion_window", StatValue::UInt(self.cwnd as u64));
        stats.insert("slow_start_threshold", StatValue::UInt(self.ssthresh() as u64));
        stats.insert("state", StatValue::Str(self.state.as_str()));
        stats.insert(
            "bandwidth_estimate",
            StatValue::Float(self.max_bandwidth.as_bytes_per_second() as f64),
        );
        stats.insert(
            "max_bandwidth",
            StatValue::Float(self.max_bandwidth.as_bytes_per_second() as f64),
        );
        stats.insert("min_rtt", StatValue::Float(self.min_rtt().as_secs_f64()));
        stats.insert("rt_prop", StatValue::Float(self.rt_prop().as_secs_f64()));
        stats.insert(
            "pacing_rate",
            StatValue::Float(self.pacing_rate.as_bytes_per_second() as f64),
        );
        stats.insert("cycle_index", StatValue::UInt(self.cycle_index as u64));
        stats.insert("acked_packets", StatValue::UInt(self.acked_packets));
        stats.insert("lost_packets", StatValue::UInt(self.lost_packets));
        stats.insert("total_bytes_sent", StatValue::UInt(self.total_bytes_sent));
        stats.insert("total_bytes_acked", StatValue::UInt(self.total_bytes_acked));
        stats.insert("total_bytes_lost", StatValue::UInt(self.total_bytes_lost));
        stats.insert("loss_rate", StatValue::Float(self.loss_rate()));
        stats
    }

    #[inline]
    fn name(&self) -> &'static str {
        "BBR"
    }
}

#[cfg(test)]
mod tests;
