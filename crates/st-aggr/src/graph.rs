// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Dependency graph of statistic instances.
//!
//! Kinds are added in caller order and deduplicated by identity. Sealing the
//! graph resolves every transitive dependency (auto-added as an invisible
//! node), then freezes a depth-first postorder topological ordering seeded
//! from the insertion order. The sealed order is a function of the declared
//! dependency sets and the insertion order alone, so two graphs built from
//! the same kind list always evaluate identically.

use ndarray::ArrayD;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::kind::StatKind;
use crate::stat::{self, Statistic};
use crate::value::{Deps, StatValue};

/// Summary of the visible statistics: label to current value, `None` while a
/// statistic has not received any observation.
pub type Summary = BTreeMap<String, Option<StatValue>>;

#[derive(Debug)]
struct Node {
    kind: StatKind,
    stat: Box<dyn Statistic>,
    visible: bool,
}

/// Owns every statistic instance and the frozen evaluation order.
#[derive(Debug, Default)]
pub struct StatGraph {
    nodes: Vec<Node>,
    index: HashMap<StatKind, usize>,
    sealed: bool,
}

impl StatGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes currently held, invisible dependencies included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn contains(&self, kind: &StatKind) -> bool {
        self.index.contains_key(kind)
    }

    /// Kinds in current node order; after sealing this is the evaluation
    /// order.
    pub fn kinds(&self) -> Vec<StatKind> {
        self.nodes.iter().map(|node| node.kind.clone()).collect()
    }

    /// Registers a kind. An already-present kind only has its visibility
    /// flag overwritten; a new kind is instantiated, appended and reopens a
    /// sealed graph.
    pub fn add(&mut self, kind: StatKind, visible: bool) {
        if let Some(&idx) = self.index.get(&kind) {
            self.nodes[idx].visible = visible;
            return;
        }
        self.push_node(kind, visible);
        self.sealed = false;
    }

    fn push_node(&mut self, kind: StatKind, visible: bool) {
        let statistic = stat::build(&kind);
        self.index.insert(kind.clone(), self.nodes.len());
        self.nodes.push(Node {
            kind,
            stat: statistic,
            visible,
        });
    }

    /// Resolves missing dependencies and freezes the evaluation order.
    /// Idempotent; called implicitly by [`update`](Self::update) and
    /// [`summary`](Self::summary).
    pub fn seal(&mut self) -> Result<()> {
        if self.sealed {
            return Ok(());
        }

        let mut pending: Vec<StatKind> = self.nodes.iter().map(|node| node.kind.clone()).collect();
        while let Some(kind) = pending.pop() {
            for dep in kind.dependencies() {
                if !self.index.contains_key(&dep) {
                    trace!(dependency = %dep, "auto-adding invisible dependency");
                    self.push_node(dep.clone(), false);
                    pending.push(dep);
                }
            }
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut done = HashSet::new();
        let mut in_progress = HashSet::new();
        for idx in 0..self.nodes.len() {
            let kind = self.nodes[idx].kind.clone();
            self.visit(&kind, &mut order, &mut done, &mut in_progress)?;
        }

        let mut slots: Vec<Option<Node>> = self.nodes.drain(..).map(Some).collect();
        self.nodes = order
            .iter()
            .map(|&idx| slots[idx].take().expect("node scheduled exactly once"))
            .collect();
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.kind.clone(), idx))
            .collect();
        self.sealed = true;
        debug!(nodes = self.nodes.len(), "sealed statistic graph");
        Ok(())
    }

    fn visit(
        &self,
        kind: &StatKind,
        order: &mut Vec<usize>,
        done: &mut HashSet<StatKind>,
        in_progress: &mut HashSet<StatKind>,
    ) -> Result<()> {
        if done.contains(kind) {
            return Ok(());
        }
        if !in_progress.insert(kind.clone()) {
            return Err(Error::Cycle(kind.to_string()));
        }
        for dep in kind.dependencies() {
            self.visit(&dep, order, done, in_progress)?;
        }
        in_progress.remove(kind);
        done.insert(kind.clone());
        order.push(self.index[kind]);
        Ok(())
    }

    /// Feeds one observation through every node in evaluation order. Each
    /// node's fresh value is published into the pass-local view immediately,
    /// so dependents read post-update values within the same pass.
    pub fn update(&mut self, x: &ArrayD<f32>) -> Result<()> {
        self.seal()?;
        let mut resolved: HashMap<StatKind, StatValue> =
            HashMap::with_capacity(self.nodes.len());
        for node in &mut self.nodes {
            node.stat.update(x, &Deps::new(&resolved));
            let value = node.stat.get(&Deps::new(&resolved));
            if let Some(value) = value {
                resolved.insert(node.kind.clone(), value);
            }
        }
        Ok(())
    }

    /// Queries every visible node in evaluation order without touching any
    /// accumulator state.
    pub fn summary(&mut self) -> Result<Summary> {
        self.seal()?;
        let mut resolved: HashMap<StatKind, StatValue> =
            HashMap::with_capacity(self.nodes.len());
        let mut summary = Summary::new();
        for node in &self.nodes {
            let value = node.stat.get(&Deps::new(&resolved));
            if node.visible {
                summary.insert(node.kind.to_string(), value.clone());
            }
            if let Some(value) = value {
                resolved.insert(node.kind.clone(), value);
            }
        }
        Ok(summary)
    }
}
