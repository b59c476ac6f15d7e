//! Canonical node ordering.
//!
//! [`Game::reindex_capture`] sorts nodes by priority (ties keep their
//! current relative order) and returns the `old -> new` [`Mapping`].
//! Handing that mapping to [`Game::apply_permutation`] puts every node
//! back where it was.

use tracing::instrument;

use super::{Game, NodeId};
use crate::error::{GameError, Result};

/// A validated permutation of `0..len`, stored as `mapping[old] = new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping(Vec<NodeId>);

impl Mapping {
    /// Validate `targets` as a bijection over `0..targets.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidMapping`] on an out-of-range or
    /// repeated target.
    pub fn new(targets: Vec<NodeId>) -> Result<Self> {
        let n_nodes = targets.len();
        let mut seen = vec![false; n_nodes];
        for (from, &to) in targets.iter().enumerate() {
            match seen.get_mut(to) {
                None => {
                    return Err(GameError::InvalidMapping {
                        n_nodes,
                        reason: format!("{from} maps to {to}, outside the range"),
                    });
                }
                Some(hit) if *hit => {
                    return Err(GameError::InvalidMapping {
                        n_nodes,
                        reason: format!("{to} is the target of more than one node"),
                    });
                }
                Some(hit) => *hit = true,
            }
        }
        Ok(Self(targets))
    }

    #[must_use]
    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.0
    }

    /// The `new -> old` direction of this mapping.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut inv = vec![0; self.0.len()];
        for (from, &to) in self.0.iter().enumerate() {
            inv[to] = from;
        }
        Self(inv)
    }
}

impl Game {
    /// Move every node `old` to position `new_of_old[old]`, rewriting
    /// both adjacency sides. Per-node edge order is preserved.
    fn relabel(&mut self, new_of_old: &[NodeId]) {
        let n = self.n_nodes();
        let mut owner = self.owner.clone();
        let mut priority = self.priority.clone();
        let mut out = vec![Vec::new(); n];
        let mut inc = vec![Vec::new(); n];
        let mut label = vec![None; n];

        for old in 0..n {
            let new = new_of_old[old];
            owner[new] = self.owner[old];
            priority[new] = self.priority[old];
            out[new] = self.out[old].iter().map(|&v| new_of_old[v]).collect();
            inc[new] = self.inc[old].iter().map(|&u| new_of_old[u]).collect();
            label[new] = self.label[old].take();
        }

        self.owner = owner;
        self.priority = priority;
        self.out = out;
        self.inc = inc;
        self.label = label;
    }

    fn canonical_order(&self) -> Vec<NodeId> {
        let mut order: Vec<NodeId> = (0..self.n_nodes()).collect();
        order.sort_by_key(|&node| self.priority[node]);
        let mut new_of_old = vec![0; order.len()];
        for (new, &old) in order.iter().enumerate() {
            new_of_old[old] = new;
        }
        new_of_old
    }

    /// Sort nodes by priority and return the `old -> new` mapping.
    #[instrument(skip(self), fields(nodes = self.n_nodes()))]
    pub fn reindex_capture(&mut self) -> Mapping {
        let new_of_old = self.canonical_order();
        self.relabel(&new_of_old);
        Mapping(new_of_old)
    }

    /// Sort nodes by priority and keep that order.
    pub fn reindex(&mut self) {
        let new_of_old = self.canonical_order();
        self.relabel(&new_of_old);
    }

    /// Undo a captured `old -> new` mapping: the node currently at
    /// `mapping[i]` moves to position `i`.
    ///
    /// Passing `mapping.inverse()` replays the original reordering instead.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidMapping`] if the mapping does not cover
    /// exactly this game's nodes.
    pub fn apply_permutation(&mut self, mapping: &Mapping) -> Result<()> {
        if mapping.len() != self.n_nodes() {
            return Err(GameError::InvalidMapping {
                n_nodes: self.n_nodes(),
                reason: format!("mapping covers {} nodes", mapping.len()),
            });
        }
        self.relabel(mapping.inverse().as_slice());
        Ok(())
    }
}
