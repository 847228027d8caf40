// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Statistic payloads and the resolved dependency view handed to each
//! statistic during an evaluation pass.

use ndarray::ArrayD;
use std::collections::HashMap;

use crate::kind::StatKind;

/// Concrete value produced by a statistic.
///
/// The counter stays an integer instead of being coerced into a float array;
/// everything else matches the shape of the observed batches.
#[derive(Clone, Debug, PartialEq)]
pub enum StatValue {
    Count(u64),
    Tensor(ArrayD<f32>),
}

impl StatValue {
    pub fn as_count(&self) -> Option<u64> {
        match self {
            StatValue::Count(n) => Some(*n),
            StatValue::Tensor(_) => None,
        }
    }

    pub fn as_tensor(&self) -> Option<&ArrayD<f32>> {
        match self {
            StatValue::Tensor(t) => Some(t),
            StatValue::Count(_) => None,
        }
    }
}

/// Values of already-evaluated statistics within the current pass.
///
/// The graph publishes each node's value right after evaluating it, so a
/// statistic always reads the post-update value of its dependencies and
/// never a live handle. A missing entry means the dependency has not
/// produced a value yet; callers propagate that absence.
pub struct Deps<'a> {
    values: &'a HashMap<StatKind, StatValue>,
}

impl<'a> Deps<'a> {
    pub(crate) fn new(values: &'a HashMap<StatKind, StatValue>) -> Self {
        Self { values }
    }

    pub fn value(&self, kind: &StatKind) -> Option<&StatValue> {
        self.values.get(kind)
    }

    pub fn tensor(&self, kind: &StatKind) -> Option<&ArrayD<f32>> {
        self.value(kind).and_then(StatValue::as_tensor)
    }

    pub fn count(&self, kind: &StatKind) -> Option<u64> {
        self.value(kind).and_then(StatValue::as_count)
    }
}
