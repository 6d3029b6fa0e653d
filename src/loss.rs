// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Loss detection is entirely out of scope for this crate: it is an external
//! collaborator the controller may optionally consult. No concrete
//! implementation ships here; callers either attach one via
//! [`CongestionController::with_loss_detector`](crate::CongestionController::with_loss_detector)
//! or report losses explicitly through `on_packet_lost`/`batch_loss`.

use crate::time::Timestamp;

/// The packet numbers a [`LossDetector`] has determined are lost as of a
/// given point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DetectedLoss {
    pub lost_packets: Vec<u64>,
}

/// The external loss-detection contract the controller may consult from
/// `on_ack_received`.
pub trait LossDetector {
    /// Returns the packet numbers deemed lost as of `now`.
    fn detect_lost_packets(&mut self, now: Timestamp) -> DetectedLoss;
}
