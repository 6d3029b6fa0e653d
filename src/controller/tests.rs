// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::algorithm::{Bbr, NewReno};

fn t(secs: f64) -> Timestamp {
    Timestamp::from_secs_f64(secs)
}

fn new_reno_controller() -> CongestionController {
    CongestionController::new(Box::new(NewReno::new()))
}

#[test]
fn slow_start_ack_grows_window() {
    let mut c = new_reno_controller();
    c.on_packet_sent(1, 1200, t(0.0));
    c.on_packet_acked(1, 1200, t(0.0), t(0.1));

    assert_eq!(c.congestion_window(), 13_200);
    assert!(c.is_in_slow_start());
    assert_eq!(c.stats().get("acked_packets").unwrap().as_u64(), Some(1));
    assert_eq!(
        c.stats().get("total_bytes_acked").unwrap().as_u64(),
        Some(1200)
    );
}

#[test]
fn single_loss_enters_recovery() {
    let mut c = new_reno_controller();
    c.on_packet_sent(1, 1200, t(0.0));
    c.on_packet_lost(1, 1200, t(0.0), t(0.1));

    assert_eq!(c.congestion_window(), 6_000);
    assert_eq!(c.stats().get("in_recovery").unwrap().as_bool(), Some(true));
    assert_eq!(
        c.stats().get("state").unwrap().as_str(),
        Some("fast_recovery")
    );

    // Same episode: a second loss must not reduce the window again.
    c.on_packet_sent(0, 1200, t(0.0));
    c.on_packet_lost(0, 1200, t(0.0), t(0.1));
    assert_eq!(c.congestion_window(), 6_000);
}

#[test]
fn ack_beyond_recovery_packet_exits_recovery() {
    let mut c = new_reno_controller();
    c.on_packet_sent(1, 1200, t(0.0));
    c.on_packet_sent(5, 1200, t(0.0));
    c.on_packet_lost(1, 1200, t(0.0), t(0.1));
    c.on_packet_acked(5, 1200, t(0.0), t(0.2));

    assert_eq!(c.stats().get("in_recovery").unwrap().as_bool(), Some(false));
    assert_eq!(c.stats().get("state").unwrap().as_str(), Some("slow_start"));
}

#[test]
fn bytes_in_flight_tracks_sends_acks_and_losses() {
    let mut c = new_reno_controller();
    c.on_packet_sent(1, 1200, t(0.0));
    c.on_packet_sent(2, 1200, t(0.0));
    c.on_packet_sent(3, 1200, t(0.0));
    assert_eq!(c.bytes_in_flight(), 3_600);

    c.on_packet_acked(1, 1200, t(0.0), t(0.1));
    assert_eq!(c.bytes_in_flight(), 2_400);

    c.on_packet_lost(2, 1200, t(0.0), t(0.1));
    assert_eq!(c.bytes_in_flight(), 1_200);

    c.on_packet_acked(3, 1200, t(0.0), t(0.1));
    assert_eq!(c.bytes_in_flight(), 0);

    // Duplicate ack of an already-terminal packet is a no-op.
    c.on_packet_acked(3, 1200, t(0.0), t(0.1));
    assert_eq!(c.bytes_in_flight(), 0);
}

#[test]
fn switch_algorithm_preserves_ledger() {
    let mut c = new_reno_controller();
    c.on_packet_sent(1, 1200, t(0.0));
    c.on_packet_sent(2, 1200, t(0.0));
    c.on_packet_acked(1, 1200, t(0.0), t(0.1));

    c.switch_algorithm(Box::new(Bbr::new()));

    assert_eq!(c.stats().get("algorithm").unwrap().as_str(), Some("BBR"));
    assert_eq!(
        c.stats().get("sent_packets_count").unwrap().as_u64(),
        Some(2)
    );
    assert_eq!(c.history().len(), 1);
    assert!(matches!(c.history()[0], HistoryEntry::AlgorithmSwitch { .. }));
}

#[test]
fn periodic_stats_history_is_capped() {
    let mut c = new_reno_controller();
    for i in 0..301 {
        c.collect_periodic_stats(t(i as f64));
    }
    assert_eq!(c.history().len(), STATS_HISTORY_CAP);
}

#[test]
fn periodic_stats_respects_throttle() {
    let mut c = new_reno_controller();
    c.collect_periodic_stats(t(0.0));
    c.collect_periodic_stats(t(0.5));
    assert_eq!(c.history().len(), 1);
    c.collect_periodic_stats(t(1.0));
    assert_eq!(c.history().len(), 2);
}

#[test]
fn ledger_cleanup_respects_retention_horizon() {
    let mut c = new_reno_controller();
    c.on_packet_sent(1, 1200, t(0.0));
    c.on_packet_acked(1, 1200, t(0.0), t(0.1));

    c.cleanup_packet_history(t(59.0));
    assert_eq!(c.stats().get("sent_packets_count").unwrap().as_u64(), Some(1));

    c.cleanup_packet_history(t(60.1));
    assert_eq!(c.stats().get("sent_packets_count").unwrap().as_u64(), Some(0));
}

#[test]
fn reset_clears_ledger_and_history() {
    let mut c = new_reno_controller();
    c.on_packet_sent(1, 1200, t(0.0));
    c.on_packet_lost(1, 1200, t(0.0), t(0.1));
    c.collect_periodic_stats(t(0.2));

    c.reset();

    assert_eq!(c.bytes_in_flight(), 0);
    assert_eq!(c.congestion_window(), 12_000);
    assert!(c.history().is_empty());
}

#[test]
fn batch_ack_and_batch_loss_use_ledger_metadata() {
    let mut c = new_reno_controller();
    c.on_packet_sent(1, 1200, t(0.0));
    c.on_packet_sent(2, 1200, t(0.0));
    c.on_packet_sent(3, 1200, t(0.0));

    c.batch_ack(&[1, 2], t(0.1));
    c.batch_loss(&[3], t(0.1));

    assert_eq!(c.bytes_in_flight(), 0);
}

#[test]
fn unknown_packet_number_is_ignored() {
    let mut c = new_reno_controller();
    c.on_packet_acked(42, 1200, t(0.0), t(0.1));
    c.on_packet_lost(7, 1200, t(0.0), t(0.1));
    assert_eq!(c.bytes_in_flight(), 0);
}
