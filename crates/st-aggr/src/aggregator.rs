// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Public façade over the statistic graph.

use ndarray::ArrayD;

use crate::error::{Error, Result};
use crate::graph::{StatGraph, Summary};
use crate::kind::{common_stats, StatKind};

/// Keeps the requested statistics of a single tensor stream up to date.
///
/// Observations must share one shape for the lifetime of the aggregator;
/// shape changes are a caller contract violation and are not validated.
#[derive(Debug)]
pub struct Aggregator {
    graph: StatGraph,
}

impl Aggregator {
    pub fn new<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = StatKind>,
    {
        let mut graph = StatGraph::new();
        for kind in kinds {
            graph.add(kind, true);
        }
        Self { graph }
    }

    /// Aggregator over [`common_stats`]: mean, sample variance, sample
    /// std-dev, min, max.
    pub fn with_common_stats() -> Self {
        Self::new(common_stats())
    }

    pub fn update(&mut self, x: &ArrayD<f32>) -> Result<()> {
        self.graph.update(x)
    }

    pub fn summary(&mut self) -> Result<Summary> {
        self.graph.summary()
    }
}

/// Positional fan-out of [`Aggregator`] over a fixed-size ordered collection
/// of tensors, e.g. one statistic set per model output.
///
/// One independent graph is built per slot on the first update; later
/// updates must keep the same arity.
#[derive(Debug)]
pub struct MultiAggregator {
    kinds: Vec<StatKind>,
    slots: Vec<Aggregator>,
}

impl MultiAggregator {
    pub fn new<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = StatKind>,
    {
        Self {
            kinds: kinds.into_iter().collect(),
            slots: Vec::new(),
        }
    }

    pub fn with_common_stats() -> Self {
        Self::new(common_stats())
    }

    /// Number of slots observed so far; zero before the first update.
    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn update(&mut self, values: &[ArrayD<f32>]) -> Result<()> {
        if self.slots.is_empty() {
            self.slots = values
                .iter()
                .map(|_| Aggregator::new(self.kinds.iter().cloned()))
                .collect();
        } else if values.len() != self.slots.len() {
            return Err(Error::SlotMismatch {
                expected: self.slots.len(),
                got: values.len(),
            });
        }
        for (slot, value) in self.slots.iter_mut().zip(values) {
            slot.update(value)?;
        }
        Ok(())
    }

    /// Per-slot summaries in slot order.
    pub fn summary(&mut self) -> Result<Vec<Summary>> {
        self.slots.iter_mut().map(Aggregator::summary).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    fn scalar(v: f32) -> ArrayD<f32> {
        ArrayD::from_elem(IxDyn(&[]), v)
    }

    #[test]
    fn summary_before_any_update_marks_everything_absent() {
        let mut aggr = Aggregator::with_common_stats();
        let summary = aggr.summary().unwrap();
        assert_eq!(summary.len(), 5);
        assert!(summary.values().all(Option::is_none));
    }

    #[test]
    fn slot_arity_is_fixed_by_the_first_update() {
        let mut aggr = MultiAggregator::new([StatKind::Sum]);
        aggr.update(&[scalar(1.0), scalar(2.0)]).unwrap();
        assert_eq!(aggr.num_slots(), 2);
        let err = aggr.update(&[scalar(1.0)]).unwrap_err();
        assert_eq!(
            err,
            Error::SlotMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn slots_accumulate_independently() {
        let mut aggr = MultiAggregator::new([StatKind::Sum]);
        aggr.update(&[scalar(1.0), scalar(10.0)]).unwrap();
        aggr.update(&[scalar(2.0), scalar(20.0)]).unwrap();
        let summaries = aggr.summary().unwrap();
        assert_eq!(summaries.len(), 2);
        let sums: Vec<f32> = summaries
            .iter()
            .map(|s| {
                *s["sum"]
                    .as_ref()
                    .and_then(|v| v.as_tensor())
                    .unwrap()
                    .first()
                    .unwrap()
            })
            .collect();
        assert_eq!(sums, vec![3.0, 30.0]);
    }
}
