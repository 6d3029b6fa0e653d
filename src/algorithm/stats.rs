// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The loosely-typed statistics map every [`super::CongestionAlgorithm`] and
//! the [`crate::CongestionController`] report through. A typed struct per
//! algorithm was considered (see `SPEC_FULL.md` Design Notes) but rejected:
//! callers merge per-algorithm stats with controller- and RTT-estimator-level
//! stats into one flat, by-name-addressable map (per spec section 6).

use std::collections::HashMap;

/// A single statistics value. Kept deliberately small -- just enough
/// variants to cover every value reported in the spec's statistics table.
#[derive(Clone, Debug, PartialEq)]
pub enum StatValue {
    Str(&'static str),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl StatValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            StatValue::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StatValue::Float(v) => Some(*v),
            StatValue::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StatValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            StatValue::Str(v) => Some(*v),
            _ => None,
        }
    }
}

/// A flat, by-name-addressable map of statistics.
pub type Stats = HashMap<&'static str, StatValue>;
