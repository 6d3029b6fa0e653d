// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::*;

#[test]
fn fresh_estimator_reports_no_stats() {
    let estimator = RttEstimator::default();
    assert!(estimator.stats().is_empty());
    assert!(!estimator.has_sample());
}

#[test]
fn zero_sample_is_rejected() {
    let mut estimator = RttEstimator::default();
    assert!(!estimator.update_rtt(Duration::ZERO));
    assert!(!estimator.has_sample());
    assert!(estimator.stats().is_empty());
}

#[test]
fn first_sample_seeds_smoothed_and_var() {
    let mut estimator = RttEstimator::default();
    assert!(estimator.update_rtt(Duration::from_millis(100)));
    assert_eq!(estimator.smoothed_rtt(), Duration::from_millis(100));
    assert_eq!(estimator.rttvar(), Duration::from_millis(50));
    assert_eq!(estimator.min_rtt(), Duration::from_millis(100));

    let stats = estimator.stats();
    assert_eq!(
        stats.get("smoothed_rtt"),
        Some(&StatValue::Float(0.1))
    );
}

#[test]
fn min_rtt_tracks_minimum() {
    let mut estimator = RttEstimator::default();
    estimator.update_rtt(Duration::from_millis(100));
    estimator.update_rtt(Duration::from_millis(50));
    estimator.update_rtt(Duration::from_millis(200));
    assert_eq!(estimator.min_rtt(), Duration::from_millis(50));
}

#[test]
fn reset_restores_initial_state() {
    let mut estimator = RttEstimator::new(Duration::from_millis(200));
    estimator.update_rtt(Duration::from_millis(50));
    estimator.reset();
    assert!(!estimator.has_sample());
    assert_eq!(estimator.smoothed_rtt(), Duration::from_millis(200));
}
