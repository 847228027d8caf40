// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Accumulators behind each [`StatKind`].
//!
//! The variance chain is incremental and numerically stable: `Mean` applies
//! the Welford update `mean += (x - mean) / n` against the already-bumped
//! counter, and `Mse` folds `(x - prev_mean) * (x - new_mean)` into a running
//! accumulator, where `prev_mean` is the mean cached at the end of the
//! *previous* pass. `Variance` and `StdDev` carry no state of their own and
//! derive everything from their dependencies at query time.

use ndarray::ArrayD;

use crate::kind::StatKind;
use crate::value::{Deps, StatValue};

/// A unit of incremental computation owned by one graph node.
///
/// `update` consumes one observation; `get` returns the current value or
/// `None` when nothing has been observed yet. Both receive the resolved
/// values of the node's dependencies for the current pass.
pub trait Statistic: std::fmt::Debug {
    fn update(&mut self, x: &ArrayD<f32>, deps: &Deps<'_>);
    fn get(&self, deps: &Deps<'_>) -> Option<StatValue>;
}

/// Instantiates the accumulator for a kind.
pub(crate) fn build(kind: &StatKind) -> Box<dyn Statistic> {
    match kind {
        StatKind::Count => Box::new(Count::default()),
        StatKind::Mean => Box::new(Mean::default()),
        StatKind::Mse => Box::new(Mse::default()),
        StatKind::Variance { order } => Box::new(Variance::new(*order)),
        StatKind::StdDev { order } => Box::new(StdDev::new(*order)),
        StatKind::Min => Box::new(Fold::new(f32::min)),
        StatKind::Max => Box::new(Fold::new(f32::max)),
        StatKind::Sum => Box::new(Fold::new(|a, b| a + b)),
    }
}

#[derive(Debug, Default)]
pub struct Count {
    n: Option<u64>,
}

impl Statistic for Count {
    fn update(&mut self, _x: &ArrayD<f32>, _deps: &Deps<'_>) {
        *self.n.get_or_insert(0) += 1;
    }

    fn get(&self, _deps: &Deps<'_>) -> Option<StatValue> {
        self.n.map(StatValue::Count)
    }
}

/// Incremental mean. Reads the counter *after* it was bumped for the current
/// observation, which the topological evaluation order guarantees.
#[derive(Debug, Default)]
pub struct Mean {
    mean: Option<ArrayD<f32>>,
}

impl Statistic for Mean {
    fn update(&mut self, x: &ArrayD<f32>, deps: &Deps<'_>) {
        let Some(n) = deps.count(&StatKind::Count) else {
            return;
        };
        let mean = self.mean.get_or_insert_with(|| ArrayD::zeros(x.raw_dim()));
        let delta = x - &*mean;
        *mean += &(delta / n as f32);
    }

    fn get(&self, _deps: &Deps<'_>) -> Option<StatValue> {
        self.mean.clone().map(StatValue::Tensor)
    }
}

/// Welford mean-squared-error accumulator.
///
/// `prev_mean` is the dependency's mean as of the previous pass; within the
/// current pass the dependency has already been updated, so `deps` carries
/// the new mean. The very first observation only primes `prev_mean`.
#[derive(Debug, Default)]
pub struct Mse {
    prev_mean: Option<ArrayD<f32>>,
    mse: Option<ArrayD<f32>>,
}

impl Statistic for Mse {
    fn update(&mut self, x: &ArrayD<f32>, deps: &Deps<'_>) {
        let Some(mean) = deps.tensor(&StatKind::Mean) else {
            return;
        };
        if let Some(prev) = self.prev_mean.as_ref() {
            let cross = (x - prev) * (x - mean);
            match self.mse.as_mut() {
                Some(acc) => *acc += &cross,
                None => self.mse = Some(cross),
            }
        }
        self.prev_mean = Some(mean.clone());
    }

    fn get(&self, _deps: &Deps<'_>) -> Option<StatValue> {
        match (&self.mse, &self.prev_mean) {
            (Some(mse), _) => Some(StatValue::Tensor(mse.clone())),
            // one observation seen, nothing accumulated yet
            (None, Some(prev)) => Some(StatValue::Tensor(ArrayD::zeros(prev.raw_dim()))),
            (None, None) => None,
        }
    }
}

/// Variance of a given order, derived purely from the MSE chain.
#[derive(Debug)]
pub struct Variance {
    order: u32,
}

impl Variance {
    pub fn new(order: u32) -> Self {
        Self { order }
    }
}

impl Statistic for Variance {
    fn update(&mut self, _x: &ArrayD<f32>, _deps: &Deps<'_>) {}

    fn get(&self, deps: &Deps<'_>) -> Option<StatValue> {
        let mse = deps.tensor(&StatKind::Mse)?;
        let n = deps.count(&StatKind::Count)?;
        if n <= u64::from(self.order) {
            return Some(StatValue::Tensor(ArrayD::zeros(mse.raw_dim())));
        }
        Some(StatValue::Tensor(mse / (n - u64::from(self.order)) as f32))
    }
}

#[derive(Debug)]
pub struct StdDev {
    order: u32,
}

impl StdDev {
    pub fn new(order: u32) -> Self {
        Self { order }
    }
}

impl Statistic for StdDev {
    fn update(&mut self, _x: &ArrayD<f32>, _deps: &Deps<'_>) {}

    fn get(&self, deps: &Deps<'_>) -> Option<StatValue> {
        let var = deps.tensor(&StatKind::Variance { order: self.order })?;
        Some(StatValue::Tensor(var.mapv(f32::sqrt)))
    }
}

/// Dependency-free accumulator folding each observation into a running
/// result elementwise; backs min, max and sum.
#[derive(Debug)]
pub struct Fold {
    combine: fn(f32, f32) -> f32,
    result: Option<ArrayD<f32>>,
}

impl Fold {
    pub fn new(combine: fn(f32, f32) -> f32) -> Self {
        Self {
            combine,
            result: None,
        }
    }
}

impl Statistic for Fold {
    fn update(&mut self, x: &ArrayD<f32>, _deps: &Deps<'_>) {
        let combine = self.combine;
        match self.result.as_mut() {
            Some(acc) => acc.zip_mut_with(x, |a, &b| *a = combine(*a, b)),
            None => self.result = Some(x.clone()),
        }
    }

    fn get(&self, _deps: &Deps<'_>) -> Option<StatValue> {
        self.result.clone().map(StatValue::Tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;
    use std::collections::HashMap;

    fn scalar(v: f32) -> ArrayD<f32> {
        ArrayD::from_elem(IxDyn(&[]), v)
    }

    fn scalar_of(value: &StatValue) -> f32 {
        *value.as_tensor().expect("tensor value").first().unwrap()
    }

    #[test]
    fn count_is_absent_until_first_update() {
        let mut count = Count::default();
        let empty = HashMap::new();
        assert_eq!(count.get(&Deps::new(&empty)), None);
        count.update(&scalar(7.0), &Deps::new(&empty));
        count.update(&scalar(7.0), &Deps::new(&empty));
        assert_eq!(count.get(&Deps::new(&empty)), Some(StatValue::Count(2)));
    }

    #[test]
    fn mean_tracks_the_running_average() {
        let mut mean = Mean::default();
        let mut values = HashMap::new();
        for (n, x) in [1.0f32, 2.0, 3.0, 4.0, 5.0].into_iter().enumerate() {
            values.insert(StatKind::Count, StatValue::Count(n as u64 + 1));
            mean.update(&scalar(x), &Deps::new(&values));
        }
        let got = mean.get(&Deps::new(&values)).expect("mean after updates");
        assert!((scalar_of(&got) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn mse_matches_the_two_pass_sum_of_squares() {
        let data = [2.0f32, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let mut count = Count::default();
        let mut mean = Mean::default();
        let mut mse = Mse::default();
        let mut values = HashMap::new();
        for x in data {
            let x = scalar(x);
            count.update(&x, &Deps::new(&values));
            let n = count.get(&Deps::new(&values)).unwrap();
            values.insert(StatKind::Count, n);
            mean.update(&x, &Deps::new(&values));
            let m = mean.get(&Deps::new(&values)).unwrap();
            values.insert(StatKind::Mean, m);
            mse.update(&x, &Deps::new(&values));
        }
        let exact_mean = data.iter().sum::<f32>() / data.len() as f32;
        let exact_m2: f32 = data.iter().map(|x| (x - exact_mean).powi(2)).sum();
        let got = mse.get(&Deps::new(&values)).expect("mse after updates");
        assert!((scalar_of(&got) - exact_m2).abs() < 1e-4);
    }

    #[test]
    fn mse_is_zero_shaped_after_a_single_observation() {
        let mut mse = Mse::default();
        let mut values = HashMap::new();
        values.insert(StatKind::Mean, StatValue::Tensor(scalar(3.0)));
        mse.update(&scalar(3.0), &Deps::new(&values));
        let got = mse.get(&Deps::new(&values)).expect("primed mse");
        assert_eq!(scalar_of(&got), 0.0);
    }

    #[test]
    fn variance_short_circuits_when_count_is_too_small() {
        let var = Variance::new(1);
        let mut values = HashMap::new();
        values.insert(StatKind::Mse, StatValue::Tensor(scalar(0.0)));
        values.insert(StatKind::Count, StatValue::Count(1));
        let got = var.get(&Deps::new(&values)).expect("zero variance");
        assert_eq!(scalar_of(&got), 0.0);
    }

    #[test]
    fn fold_covers_min_max_and_sum() {
        let empty = HashMap::new();
        let deps = Deps::new(&empty);
        let mut min = Fold::new(f32::min);
        let mut max = Fold::new(f32::max);
        let mut sum = Fold::new(|a, b| a + b);
        for x in [3.0f32, -1.0, 4.0, -1.0, 5.0] {
            let x = scalar(x);
            min.update(&x, &deps);
            max.update(&x, &deps);
            sum.update(&x, &deps);
        }
        assert_eq!(scalar_of(&min.get(&deps).unwrap()), -1.0);
        assert_eq!(scalar_of(&max.get(&deps).unwrap()), 5.0);
        assert_eq!(scalar_of(&sum.get(&deps).unwrap()), 10.0);
    }
}
