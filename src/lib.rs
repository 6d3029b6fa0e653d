// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The congestion control core for a QUIC endpoint.
//!
//! This crate decides, at any instant, how many bytes may be outstanding on a
//! connection, how fast they may be paced onto the wire, and how these bounds
//! evolve in response to acknowledgements and loss signals. It does not
//! implement QUIC framing, crypto, loss *detection*, or I/O; those are
//! external collaborators that feed events into [`CongestionController`].

pub mod algorithm;
pub mod bandwidth;
pub mod error;
pub mod loss;
pub mod rtt;
pub mod time;
pub mod window;

mod controller;

pub use algorithm::{new_reno::NewReno, stats::StatValue, Bbr, CongestionAlgorithm, Stats};
pub use controller::{CongestionController, HistoryEntry, PacketRecord};
pub use error::CongestionError;
pub use loss::{DetectedLoss, LossDetector};
pub use rtt::{RttEstimator, RttSource};
pub use time::Timestamp;
pub use window::CongestionWindow;

/// Maximum Segment Size assumed throughout the core, in bytes.
pub const MSS: u32 = 1200;

/// The smallest a congestion window is ever allowed to shrink to.
pub const MIN_WINDOW: u32 = 2 * MSS;

/// The largest a congestion window is ever allowed to grow to (64 MiB).
pub const MAX_WINDOW: u32 = 64 * 1024 * 1024;

/// The congestion window a fresh algorithm or controller starts with.
pub const INITIAL_WINDOW: u32 = 10 * MSS;

/// The multiplicative decrease factor NewReno applies to `cwnd` on loss.
pub const REDUCTION_FACTOR: f64 = 0.5;

/// How long a terminal (acked or lost) packet record is retained before
/// [`CongestionController::cleanup_packet_history`] sweeps it away.
pub const LEDGER_RETENTION: core::time::Duration = core::time::Duration::from_secs(60);

/// Capacity of the bounded statistics history kept by the controller.
pub const STATS_HISTORY_CAP: usize = 300;

/// Minimum spacing between successive entries appended by
/// [`CongestionController::collect_periodic_stats`].
pub const STATS_PERIOD: core::time::Duration = core::time::Duration::from_secs(1);
