// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Dependency-ordered incremental summary statistics over tensors.
//!
//! Feeding a stream of equally shaped `ArrayD<f32>` batches into an
//! [`Aggregator`] keeps a set of running statistics (count, mean, variance,
//! std-dev, min, max, sum) up to date in a single pass per batch. Statistics
//! declare which other statistics they read ([`StatKind::dependencies`]); the
//! internal [`StatGraph`] deduplicates them, transparently instantiates any
//! missing dependency as an invisible node, and freezes a topological
//! evaluation order the first time the graph is exercised. Variance and
//! std-dev are derived from a shared Welford-style mean-squared-error
//! accumulator, so the population and sample variants differ only by their
//! denominator correction.

pub mod aggregator;
pub mod error;
pub mod graph;
pub mod kind;
pub mod stat;
pub mod value;

pub use self::aggregator::{Aggregator, MultiAggregator};
pub use self::error::{Error, Result};
pub use self::graph::{StatGraph, Summary};
pub use self::kind::{common_stats, StatKind};
pub use self::stat::Statistic;
pub use self::value::{Deps, StatValue};
