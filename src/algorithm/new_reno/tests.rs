// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::time::Timestamp;

fn t(secs: f64) -> Timestamp {
    Timestamp::from_secs_f64(secs)
}

#[test]
fn slow_start_ack_grows_window() {
    let mut algo = NewReno::new();
    algo.on_packet_sent(1, 1200, t(0.0));
    algo.on_packet_acked(1, 1200, t(0.0), t(0.1));

    assert_eq!(algo.congestion_window(), 13_200);
    assert!(algo.in_slow_start());
    assert_eq!(algo.stats().get("acked_packets").unwrap().as_u64(), Some(1));
    assert_eq!(
        algo.stats().get("total_bytes_acked").unwrap().as_u64(),
        Some(1200)
    );
}

#[test]
fn single_loss_enters_recovery_and_halves_window() {
    let mut algo = NewReno::new();
    algo.on_packet_lost(1, 1200, t(0.0), t(0.1));

    assert_eq!(algo.congestion_window(), 6_000);
    assert_eq!(algo.ssthresh(), 6_000);
    assert!(algo.in_recovery());
    assert_eq!(algo.congestion_state(), CongestionState::FastRecovery);
    assert_eq!(algo.stats().get("lost_packets").unwrap().as_u64(), Some(1));

    // A second loss within the same episode (pn <= recovery_packet_number)
    // must not reduce the window again.
    algo.on_packet_lost(0, 1200, t(0.0), t(0.1));
    assert_eq!(algo.congestion_window(), 6_000);
}

#[test]
fn ack_beyond_recovery_packet_exits_recovery() {
    let mut algo = NewReno::new();
    algo.on_packet_lost(1, 1200, t(0.0), t(0.1));
    algo.on_packet_acked(5, 1200, t(0.0), t(0.2));

    assert!(!algo.in_recovery());
    assert_eq!(algo.congestion_state(), CongestionState::SlowStart);
}

#[test]
fn window_does_not_grow_while_in_recovery() {
    let mut algo = NewReno::new();
    algo.on_packet_lost(5, 1200, t(0.0), t(0.1));
    let cwnd_after_loss = algo.congestion_window();

    // ack of a packet number at or before the recovery marker keeps the
    // episode open; window must not grow.
    algo.on_packet_acked(3, 1200, t(0.0), t(0.15));
    assert_eq!(algo.congestion_window(), cwnd_after_loss);
}

#[test]
fn congestion_avoidance_increase_is_sublinear() {
    let mut algo = NewReno::new();
    // Force congestion avoidance by driving ssthresh below cwnd via a loss,
    // then re-inflate cwnd back up past ssthresh manually isn't possible from
    // outside, so instead assert via repeated acks that growth eventually
    // slows once ssthresh is reached.
    algo.on_packet_lost(1, 1200, t(0.0), t(0.1));
    algo.on_packet_acked(2, 1200, t(0.0), t(0.2)); // exits recovery, grows slow-start
    let before = algo.congestion_window();
    // Keep acking until cwnd reaches ssthresh and congestion avoidance kicks in
    for pn in 3..50 {
        algo.on_packet_acked(pn, 1200, t(0.0), t(0.2));
        if !algo.in_slow_start() {
            break;
        }
    }
    assert!(algo.congestion_window() >= before);
}

#[test]
fn reset_restores_fresh_state() {
    let mut algo = NewReno::new();
    algo.on_packet_lost(1, 1200, t(0.0), t(0.1));
    algo.reset();
    assert_eq!(algo.congestion_window(), 12_000);
    assert!(!algo.in_recovery());
}

#[test]
fn sending_rate_is_absent() {
    let algo = NewReno::new();
    assert_eq!(algo.sending_rate(), None);
}

#[test]
fn loss_rate_is_byte_ratio() {
    let mut algo = NewReno::new();
    algo.on_packet_sent(1, 1200, t(0.0));
    algo.on_packet_sent(2, 1200, t(0.0));
    algo.on_packet_lost(1, 1200, t(0.0), t(0.1));
    let stats = algo.stats();
    assert_eq!(stats.get("loss_rate").unwrap().as_f64(), Some(0.5));
}
