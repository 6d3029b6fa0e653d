// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The error taxonomy for this crate is intentionally narrow: almost
//! everything a misbehaving or merely out-of-order peer can trigger
//! (duplicate acks, unknown packet numbers, non-positive RTT samples) is
//! handled as a silent no-op rather than an error, per the spec. The single
//! exception is [`CongestionWindow::reduce`](crate::window::CongestionWindow::reduce)
//! being called with a factor outside `(0, 1)`.

/// Errors surfaced synchronously by fallible operations in the congestion core.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum CongestionError {
    /// [`CongestionWindow::reduce`](crate::window::CongestionWindow::reduce) was called with a
    /// factor that was not strictly between `0.0` and `1.0`.
    #[error("invalid congestion window reduction factor {factor}: must be in (0, 1)")]
    InvalidReductionFactor { factor: f64 },
}
