// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::*;

fn t(secs: f64) -> Timestamp {
    Timestamp::from_secs_f64(secs)
}

#[test]
fn initial_ack_stays_in_startup_with_high_gain_pacing() {
    let mut bbr = Bbr::new();
    bbr.on_packet_acked(1, 1200, t(0.0), t(0.1));

    assert_eq!(bbr.state(), BbrState::Startup);
    assert!(bbr.in_slow_start());

    let stats = bbr.stats();
    let bandwidth = stats.get("bandwidth_estimate").unwrap().as_f64().unwrap();
    assert!((bandwidth - 12_000.0).abs() < 1.0);

    let min_rtt = stats.get("min_rtt").unwrap().as_f64().unwrap();
    assert!((min_rtt - 0.1).abs() < 1e-9);

    let pacing_rate = stats.get("pacing_rate").unwrap().as_f64().unwrap();
    assert!((pacing_rate - 34_620.0).abs() < 5.0);
}

#[test]
fn bandwidth_max_filter_tracks_largest_recent_sample() {
    let mut bbr = Bbr::new();
    // bytes chosen so bytes/0.1s yields 24_000, 24_000, 36_000 bytes/s
    bbr.on_packet_acked(1, 2_400, t(0.0), t(0.1));
    bbr.on_packet_acked(2, 2_400, t(0.2), t(0.3));
    bbr.on_packet_acked(3, 3_600, t(0.4), t(0.5));

    assert_eq!(bbr.max_bandwidth().as_bytes_per_second(), 36_000);
}

#[test]
fn startup_exits_to_drain_once_bandwidth_growth_stalls() {
    let mut bbr = Bbr::new();
    // Three acks at a constant rate: growth ratio is 1.0, below the 1.25
    // startup growth target, so startup should give way to drain.
    bbr.on_packet_acked(1, 1200, t(0.0), t(0.1));
    bbr.on_packet_acked(2, 1200, t(0.1), t(0.2));
    bbr.on_packet_acked(3, 1200, t(0.2), t(0.3));

    assert_eq!(bbr.state(), BbrState::Drain);
    assert!(!bbr.in_slow_start());
}

#[test]
fn loss_does_not_reduce_the_window() {
    let mut bbr = Bbr::new();
    let before = bbr.congestion_window();
    bbr.on_packet_lost(1, 1200, t(0.0), t(0.1));
    assert_eq!(bbr.congestion_window(), before);
    assert_eq!(bbr.stats().get("lost_packets").unwrap().as_u64(), Some(1));
}

#[test]
fn ssthresh_is_effectively_unbounded() {
    let bbr = Bbr::new();
    assert_eq!(bbr.ssthresh(), u32::MAX);
}

#[test]
fn reset_restores_fresh_state() {
    let mut bbr = Bbr::new();
    bbr.on_packet_acked(1, 1200, t(0.0), t(0.1));
    bbr.reset();

    assert_eq!(bbr.state(), BbrState::Startup);
    assert_eq!(bbr.congestion_window(), INITIAL_WINDOW);
    assert_eq!(bbr.max_bandwidth(), Bandwidth::ZERO);
}

#[test]
fn pacing_rate_is_zero_until_bandwidth_is_observed() {
    let bbr = Bbr::new();
    assert_eq!(bbr.sending_rate(), None);
}

#[test]
fn sample_with_zero_rtt_is_skipped() {
    let mut bbr = Bbr::new();
    bbr.on_packet_acked(1, 1200, t(0.0), t(0.0));
    assert_eq!(bbr.max_bandwidth(), Bandwidth::ZERO);
    assert_eq!(bbr.stats().get("acked_packets").unwrap().as_u64(), Some(1));
}
