// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Statistic descriptors: the closed set of kinds a graph can hold.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a statistic inside a graph.
///
/// Two kinds with equal variants and parameters are the same node; the graph
/// never instantiates a kind twice. `Display` yields the key under which the
/// statistic appears in a summary.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    /// Number of observations seen so far.
    Count,
    /// Incremental mean, updated as `mean += (x - mean) / n`.
    Mean,
    /// Welford accumulator of `(x - prev_mean) * (x - new_mean)` terms.
    Mse,
    /// Variance derived from the shared MSE chain. `order` is the
    /// denominator correction: 0 divides by `n` (population), 1 by `n - 1`
    /// (sample, Bessel-corrected).
    Variance { order: u32 },
    /// Elementwise square root of the variance of the same order.
    StdDev { order: u32 },
    /// Elementwise running minimum.
    Min,
    /// Elementwise running maximum.
    Max,
    /// Elementwise running sum.
    Sum,
}

impl StatKind {
    /// Kinds this statistic reads during `update` or `get`. The graph
    /// guarantees each of them is evaluated strictly earlier in every pass.
    pub fn dependencies(&self) -> Vec<StatKind> {
        match self {
            StatKind::Count | StatKind::Min | StatKind::Max | StatKind::Sum => Vec::new(),
            StatKind::Mean => vec![StatKind::Count],
            StatKind::Mse => vec![StatKind::Mean],
            StatKind::Variance { .. } => vec![StatKind::Mse, StatKind::Count],
            StatKind::StdDev { order } => vec![StatKind::Variance { order: *order }],
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatKind::Count => write!(f, "count"),
            StatKind::Mean => write!(f, "mean"),
            StatKind::Mse => write!(f, "mse"),
            StatKind::Variance { order: 0 } => write!(f, "variance"),
            StatKind::Variance { order: 1 } => write!(f, "sample_variance"),
            StatKind::Variance { order } => write!(f, "variance({order})"),
            StatKind::StdDev { order: 0 } => write!(f, "std_dev"),
            StatKind::StdDev { order: 1 } => write!(f, "sample_std_dev"),
            StatKind::StdDev { order } => write!(f, "std_dev({order})"),
            StatKind::Min => write!(f, "min"),
            StatKind::Max => write!(f, "max"),
            StatKind::Sum => write!(f, "sum"),
        }
    }
}

/// The common summary set: mean, sample variance, sample std-dev, min, max.
pub fn common_stats() -> Vec<StatKind> {
    vec![
        StatKind::Mean,
        StatKind::Variance { order: 1 },
        StatKind::StdDev { order: 1 },
        StatKind::Min,
        StatKind::Max,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_order_convention() {
        assert_eq!(StatKind::Variance { order: 0 }.to_string(), "variance");
        assert_eq!(
            StatKind::Variance { order: 1 }.to_string(),
            "sample_variance"
        );
        assert_eq!(StatKind::Variance { order: 2 }.to_string(), "variance(2)");
        assert_eq!(StatKind::StdDev { order: 0 }.to_string(), "std_dev");
        assert_eq!(StatKind::StdDev { order: 1 }.to_string(), "sample_std_dev");
    }

    #[test]
    fn stddev_depends_on_variance_of_same_order() {
        assert_eq!(
            StatKind::StdDev { order: 1 }.dependencies(),
            vec![StatKind::Variance { order: 1 }]
        );
        assert_eq!(
            StatKind::Variance { order: 0 }.dependencies(),
            vec![StatKind::Mse, StatKind::Count]
        );
    }

    #[test]
    fn common_stats_are_the_sample_variants() {
        let kinds = common_stats();
        assert_eq!(kinds.len(), 5);
        assert!(kinds.contains(&StatKind::Variance { order: 1 }));
        assert!(kinds.contains(&StatKind::StdDev { order: 1 }));
        assert!(!kinds.contains(&StatKind::Count));
    }
}
