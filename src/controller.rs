// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! [`CongestionController`], the coordinator that owns the packet ledger and
//! bytes-in-flight counter, drives RTT estimation, dispatches normalized
//! events to a pluggable [`CongestionAlgorithm`], and answers admission
//! queries. Adapted from the shape of the teacher's
//! `congestion_controller::CongestionController` trait plus
//! `recovery::manager::Manager`'s packet-tracking role, collapsed into a
//! single concrete coordinator since this crate ships one congestion core
//! rather than a generic per-path abstraction.

use std::collections::BTreeMap;

use crate::{
    algorithm::{CongestionAlgorithm, Stats, StatValue},
    loss::LossDetector,
    rtt::{RttEstimator, RttSource},
    time::Timestamp,
    LEDGER_RETENTION, STATS_HISTORY_CAP, STATS_PERIOD,
};

/// A single sent packet's ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacketRecord {
    pub bytes: u32,
    pub sent_time: Timestamp,
    pub acked: bool,
    pub lost: bool,
}

/// An entry in the controller's rolling history.
#[derive(Clone, Debug)]
pub enum HistoryEntry {
    /// A snapshot appended by [`CongestionController::collect_periodic_stats`].
    PeriodicStats { timestamp: Timestamp, stats: Stats },
    /// Recorded by [`CongestionController::switch_algorithm`].
    AlgorithmSwitch {
        old: &'static str,
        new: &'static str,
        old_stats: Stats,
    },
}

/// Owns the packet ledger, bytes-in-flight counter, RTT estimator, and the
/// active [`CongestionAlgorithm`]; the single entry point send-path and
/// receive-path code drive.
pub struct CongestionController {
    ledger: BTreeMap<u64, PacketRecord>,
    bytes_in_flight: u32,
    algorithm: Box<dyn CongestionAlgorithm>,
    rtt: Box<dyn RttSource>,
    loss_detector: Option<Box<dyn LossDetector>>,
    history: Vec<HistoryEntry>,
    last_stats: Option<Timestamp>,
}

impl CongestionController {
    /// Constructs a controller driving `algorithm`, with a default
    /// [`RttEstimator`] and no loss detector attached.
    pub fn new(algorithm: Box<dyn CongestionAlgorithm>) -> Self {
        Self {
            ledger: BTreeMap::new(),
            bytes_in_flight: 0,
            algorithm,
            rtt: Box::new(RttEstimator::default()),
            loss_detector: None,
            history: Vec::new(),
            last_stats: None,
        }
    }

    /// Substitutes the RTT estimator behind the [`RttSource`] contract.
    #[must_use]
    pub fn with_rtt_source(mut self, rtt: Box<dyn RttSource>) -> Self {
        self.rtt = rtt;
        self
    }

    /// Attaches a [`LossDetector`] consulted from [`Self::on_ack_received`].
    #[must_use]
    pub fn with_loss_detector(mut self, detector: Box<dyn LossDetector>) -> Self {
        self.loss_detector = Some(detector);
        self
    }

    #[inline]
    pub const fn bytes_in_flight(&self) -> u32 {
        self.bytes_in_flight
    }

    #[inline]
    pub fn congestion_window(&self) -> u32 {
        self.algorithm.congestion_window()
    }

    #[inline]
    pub fn is_in_slow_start(&self) -> bool {
        self.algorithm.in_slow_start()
    }

    #[inline]
    pub fn get_sending_rate(&self) -> Option<f64> {
        self.algorithm.sending_rate()
    }

    #[inline]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Records a newly transmitted packet and forwards the event to the
    /// algorithm.
    pub fn on_packet_sent(&mut self, pn: u64, bytes: u32, sent_time: Timestamp) {
        self.ledger.insert(
            pn,
            PacketRecord {
                bytes,
                sent_time,
                acked: false,
                lost: false,
            },
        );
        self.bytes_in_flight = self.bytes_in_flight.saturating_add(bytes);
        self.algorithm.on_packet_sent(pn, bytes, sent_time);
        tracing::trace!(pn, bytes, "packet sent");
    }

    /// Marks `pn` acked, feeds the RTT estimator, and forwards the event to
    /// the algorithm. A no-op if `pn` is unknown or already acked; `bytes`
    /// and `sent_time` are validated against the ledger rather than trusted
    /// from the caller.
    pub fn on_packet_acked(&mut self, pn: u64, _bytes: u32, _sent_time: Timestamp, ack_time: Timestamp) {
        let Some(record) = self.ledger.get_mut(&pn) else {
            tracing::trace!(pn, "ack for unknown packet number ignored");
            return;
        };
        if record.acked {
            return;
        }
        record.acked = true;
        let bytes = record.bytes;
        let sent_time = record.sent_time;

        self.bytes_in_flight = self.bytes_in_flight.saturating_sub(bytes);

        if let Some(rtt) = ack_time
            .checked_duration_since(sent_time)
            .filter(|d| !d.is_zero())
        {
            self.rtt.update_rtt(rtt);
        }

        self.algorithm.on_packet_acked(pn, bytes, sent_time, ack_time);
    }

    /// Marks `pn` lost and forwards the event to the algorithm. A no-op if
    /// `pn` is unknown or already lost.
    pub fn on_packet_lost(&mut self, pn: u64, _bytes: u32, _sent_time: Timestamp, loss_time: Timestamp) {
        let Some(record) = self.ledger.get_mut(&pn) else {
            tracing::trace!(pn, "loss report for unknown packet number ignored");
            return;
        };
        if record.lost {
            return;
        }
        record.lost = true;
        let bytes = record.bytes;
        let sent_time = record.sent_time;
        let already_acked = record.acked;

        if !already_acked {
            self.bytes_in_flight = self.bytes_in_flight.saturating_sub(bytes);
        }

        self.algorithm.on_packet_lost(pn, bytes, sent_time, loss_time);
    }

    /// Applies an ack for every packet number in `pns` using the ledger's
    /// stored size/send time, then consults the attached loss detector (if
    /// any) and applies whatever it reports lost.
    pub fn on_ack_received(&mut self, pns: &[u64], ack_time: Timestamp) {
        self.batch_ack(pns, ack_time);

        if let Some(mut detector) = self.loss_detector.take() {
            let detected = detector.detect_lost_packets(ack_time);
            self.loss_detector = Some(detector);
            self.handle_lost_packets(&detected.lost_packets, ack_time);
        }
    }

    /// Convenience wrapper applying an ack to every packet number in `pns`.
    pub fn batch_ack(&mut self, pns: &[u64], ack_time: Timestamp) {
        for &pn in pns {
            if let Some(record) = self.ledger.get(&pn) {
                let (bytes, sent_time) = (record.bytes, record.sent_time);
                self.on_packet_acked(pn, bytes, sent_time, ack_time);
            }
        }
    }

    /// Convenience wrapper marking every packet number in `pns` lost as of `now`.
    pub fn batch_loss(&mut self, pns: &[u64], now: Timestamp) {
        self.handle_lost_packets(pns, now);
    }

    fn handle_lost_packets(&mut self, pns: &[u64], loss_time: Timestamp) {
        for &pn in pns {
            if let Some(record) = self.ledger.get(&pn) {
                let (bytes, sent_time) = (record.bytes, record.sent_time);
                self.on_packet_lost(pn, bytes, sent_time, loss_time);
            }
        }
    }

    /// `true` iff `in_flight (or the controller's own counter) + bytes`
    /// would fit within the algorithm's current window.
    #[inline]
    pub fn can_send(&self, bytes: u32, in_flight: Option<u32>) -> bool {
        let in_flight = in_flight.unwrap_or(self.bytes_in_flight);
        self.algorithm.can_send(bytes, in_flight)
    }

    /// `max(0, cwnd - bytes_in_flight)`.
    #[inline]
    pub fn available_window(&self) -> u32 {
        self.algorithm
            .congestion_window()
            .saturating_sub(self.bytes_in_flight)
    }

    /// Atomically replaces the active algorithm. The ledger and
    /// `bytes_in_flight` persist; the new algorithm starts from its own
    /// initial state (the old algorithm's window is not transferred).
    pub fn switch_algorithm(&mut self, new_algorithm: Box<dyn CongestionAlgorithm>) {
        let old = self.algorithm.name();
        let new = new_algorithm.name();
        let old_stats = self.algorithm.stats();

        tracing::debug!(old, new, "switching congestion algorithm");

        self.algorithm = new_algorithm;
        self.history.push(HistoryEntry::AlgorithmSwitch {
            old,
            new,
            old_stats,
        });
    }

    /// Resets the algorithm and RTT estimator, and clears the ledger,
    /// bytes-in-flight counter, and history.
    pub fn reset(&mut self) {
        self.algorithm.reset();
        self.rtt.reset();
        self.ledger.clear();
        self.bytes_in_flight = 0;
        self.history.clear();
        self.last_stats = None;
    }

    /// Removes terminal (acked or lost) records older than
    /// [`LEDGER_RETENTION`] as of `now`.
    pub fn cleanup_packet_history(&mut self, now: Timestamp) {
        self.ledger.retain(|_, record| {
            if !record.acked && !record.lost {
                return true;
            }
            match now.checked_duration_since(record.sent_time) {
                Some(age) => age <= LEDGER_RETENTION,
                None => true,
            }
        });
    }

    /// If at least [`STATS_PERIOD`] has elapsed since the last snapshot,
    /// appends a `stats()` snapshot to the history, capping it at
    /// [`STATS_HISTORY_CAP`] entries by dropping the oldest.
    pub fn collect_periodic_stats(&mut self, now: Timestamp) {
        if let Some(last) = self.last_stats {
            if now.saturating_duration_since(last) < STATS_PERIOD {
                return;
            }
        }

        let stats = self.stats();
        self.history.push(HistoryEntry::PeriodicStats {
            timestamp: now,
            stats,
        });

        if self.history.len() > STATS_HISTORY_CAP {
            let excess = self.history.len() - STATS_HISTORY_CAP;
            self.history.drain(0..excess);
        }

        self.last_stats = Some(now);
    }

    /// A flat map merging the algorithm's stats, the RTT estimator's stats,
    /// and controller-level counters.
    pub fn stats(&self) -> Stats {
        let mut stats = self.algorithm.stats();
        stats.extend(self.rtt.stats());

        let cwnd = self.algorithm.congestion_window();
        let sent_packets_count = self.ledger.len() as u64;
        let unacked_packets = self
            .ledger
            .values()
            .filter(|r| !r.acked && !r.lost)
            .count() as u64;
        let lost_packets_total = self.ledger.values().filter(|r| r.lost).count() as u64;
        let utilization = if cwnd == 0 {
            0.0
        } else {
            self.bytes_in_flight as f64 / cwnd as f64
        };

        stats.insert("bytes_in_flight", StatValue::UInt(self.bytes_in_flight as u64));
        stats.insert(
            "available_window",
            StatValue::UInt(self.available_window() as u64),
        );
        stats.insert("sent_packets_count", StatValue::UInt(sent_packets_count));
        stats.insert("unacked_packets", StatValue::UInt(unacked_packets));
        stats.insert("lost_packets_total", StatValue::UInt(lost_packets_total));
        stats.insert("utilization", StatValue::Float(utilization));
        stats
    }
}

#[cfg(test)]
mod tests;
