// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The uniform algorithm contract every congestion control variant
//! implements, and the two variants that ship with this crate.
//!
//! Expressed as a trait object (`Box<dyn CongestionAlgorithm>`) rather than a
//! sum type over `{NewReno, Bbr}` so [`crate::CongestionController::switch_algorithm`]
//! can hot-swap the concrete implementation without the controller itself
//! being generic over it -- see `SPEC_FULL.md` section 9.

pub mod bbr;
pub mod new_reno;
pub mod stats;

pub use bbr::Bbr;
pub use new_reno::NewReno;
pub use stats::{StatValue, Stats};

use crate::time::Timestamp;

/// An algorithm for controlling congestion.
///
/// All three event methods (`on_packet_sent`, `on_packet_acked`,
/// `on_packet_lost`) must be total: they must not panic on duplicate or
/// unknown packet numbers. The [`crate::CongestionController`] guarantees it
/// only forwards each terminal event (ack/loss) once per packet, but an
/// algorithm used outside the controller should still tolerate repeats.
pub trait CongestionAlgorithm: core::fmt::Debug + Send {
    /// Invoked when a packet is transmitted.
    fn on_packet_sent(&mut self, pn: u64, bytes: u32, sent_time: Timestamp);

    /// Invoked when a packet is newly acknowledged.
    fn on_packet_acked(&mut self, pn: u64, bytes: u32, sent_time: Timestamp, ack_time: Timestamp);

    /// Invoked when a packet is newly declared lost.
    fn on_packet_lost(&mut self, pn: u64, bytes: u32, sent_time: Timestamp, loss_time: Timestamp);

    /// The current congestion window, in bytes.
    fn congestion_window(&self) -> u32;

    /// The current slow-start threshold, in bytes.
    fn ssthresh(&self) -> u32;

    /// `true` iff `in_flight + bytes` would fit within the current window.
    fn can_send(&self, bytes: u32, in_flight: u32) -> bool;

    /// The algorithm's target send rate in bytes/s, if it models one.
    /// Window-only algorithms (NewReno) return `None`.
    fn sending_rate(&self) -> Option<f64>;

    /// `true` iff the algorithm considers itself in a slow-start-like phase.
    fn in_slow_start(&self) -> bool;

    /// Resets the algorithm to its freshly constructed state.
    fn reset(&mut self);

    /// A flat map of statistics; must include at least `algorithm` plus
    /// counters for acked/lost packets, byte totals, and `loss_rate`.
    fn stats(&self) -> Stats;

    /// The algorithm's name, e.g. `"NewReno"` or `"BBR"`.
    fn name(&self) -> &'static str;
}
