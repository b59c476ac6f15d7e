//! Parity game model.
//!
//! # Overview
//!
//! A [`Game`] is a finite directed graph over the dense node range
//! `0..n_nodes()`. Every node has an owning [`Player`] and a priority.
//! Adjacency is stored twice, as successor and predecessor lists, and the
//! two sides are kept in lock step: `v` is in `successors(u)` exactly when
//! `u` is in `predecessors(v)`, each at most once.
//!
//! [`Game::add_edge`] and [`Game::remove_edge`] are the only places that
//! touch both adjacency sides. Node deletion never happens in place;
//! it goes through [`Game::extract_subgame`], which builds a fresh dense
//! game and leaves the caller to drop the old one.
//!
//! ## Submodules
//!
//! - [`pgsolver`]: the textual `parity <max_id>;` format.
//! - [`reindex`]: canonical reordering and its inverse.
//! - [`subgame`]: induced subgame extraction with dense renumbering.
//! - [`invariants`]: structural checks used by tests and `--check`.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

pub mod invariants;
pub mod pgsolver;
pub mod reindex;
pub mod subgame;

pub use invariants::InvariantViolation;
pub use reindex::Mapping;

/// Dense node identifier in `0..n_nodes`.
pub type NodeId = usize;

/// Node priority. Its parity decides which player profits from it.
pub type Priority = u32;

/// One of the two players.
///
/// `Even` is player 0 on the wire and wins plays whose dominating
/// priority is even; `Odd` is player 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Even,
    Odd,
}

impl Player {
    /// Decode the wire owner bit.
    #[must_use]
    pub const fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            0 => Some(Self::Even),
            1 => Some(Self::Odd),
            _ => None,
        }
    }

    /// Encode as the wire owner bit.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::Even => 0,
            Self::Odd => 1,
        }
    }

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Even => Self::Odd,
            Self::Odd => Self::Even,
        }
    }

    /// The player favoured by a priority.
    #[must_use]
    pub const fn of_priority(priority: Priority) -> Self {
        if priority % 2 == 0 { Self::Even } else { Self::Odd }
    }
}

/// A parity game with symmetric successor/predecessor adjacency.
///
/// Equality compares owners, priorities, names and successor lists.
/// Predecessor lists follow from the successors, and their order only
/// records the order edges were inserted in.
#[derive(Debug, Clone, Default, Eq)]
pub struct Game {
    owner: Vec<Player>,
    priority: Vec<Priority>,
    out: Vec<Vec<NodeId>>,
    inc: Vec<Vec<NodeId>>,
    label: Vec<Option<String>>,
}

impl PartialEq for Game {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
            && self.priority == other.priority
            && self.out == other.out
            && self.label == other.label
    }
}

impl Game {
    /// A game with `n_nodes` edgeless nodes, all owned by `Even` at priority 0.
    #[must_use]
    pub fn new(n_nodes: usize) -> Self {
        Self {
            owner: vec![Player::Even; n_nodes],
            priority: vec![0; n_nodes],
            out: vec![Vec::new(); n_nodes],
            inc: vec![Vec::new(); n_nodes],
            label: vec![None; n_nodes],
        }
    }

    /// Append a node and return its id. Keeps the id range dense.
    pub fn add_node(&mut self, priority: Priority, owner: Player) -> NodeId {
        let id = self.owner.len();
        self.owner.push(owner);
        self.priority.push(priority);
        self.out.push(Vec::new());
        self.inc.push(Vec::new());
        self.label.push(None);
        id
    }

    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.owner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owner.is_empty()
    }

    /// Total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.out.iter().map(Vec::len).sum()
    }

    pub(crate) fn check_node(&self, node: NodeId) -> Result<()> {
        if node < self.n_nodes() {
            Ok(())
        } else {
            Err(GameError::NodeOutOfRange {
                node,
                n_nodes: self.n_nodes(),
            })
        }
    }

    /// # Panics
    ///
    /// Panics if `node` is out of range.
    #[must_use]
    pub fn owner(&self, node: NodeId) -> Player {
        self.owner[node]
    }

    /// Overwrite the owner of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NodeOutOfRange`] for an unknown node.
    pub fn set_owner(&mut self, node: NodeId, owner: Player) -> Result<()> {
        self.check_node(node)?;
        self.owner[node] = owner;
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if `node` is out of range.
    #[must_use]
    pub fn priority(&self, node: NodeId) -> Priority {
        self.priority[node]
    }

    /// Overwrite the priority of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NodeOutOfRange`] for an unknown node.
    pub fn set_priority(&mut self, node: NodeId, priority: Priority) -> Result<()> {
        self.check_node(node)?;
        self.priority[node] = priority;
        Ok(())
    }

    /// The optional name carried by `node`.
    #[must_use]
    pub fn label(&self, node: NodeId) -> Option<&str> {
        self.label.get(node).and_then(Option::as_deref)
    }

    /// Attach or clear the name of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NodeOutOfRange`] for an unknown node.
    pub fn set_label(&mut self, node: NodeId, label: Option<String>) -> Result<()> {
        self.check_node(node)?;
        self.label[node] = label;
        Ok(())
    }

    #[must_use]
    pub fn owners(&self) -> &[Player] {
        &self.owner
    }

    #[must_use]
    pub fn priorities(&self) -> &[Priority] {
        &self.priority
    }

    pub(crate) fn priorities_mut(&mut self) -> &mut [Priority] {
        &mut self.priority
    }

    pub(crate) fn owners_mut(&mut self) -> &mut [Player] {
        &mut self.owner
    }

    /// Successors of `node`, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `node` is out of range.
    #[must_use]
    pub fn successors(&self, node: NodeId) -> &[NodeId] {
        &self.out[node]
    }

    /// Predecessors of `node`, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `node` is out of range.
    #[must_use]
    pub fn predecessors(&self, node: NodeId) -> &[NodeId] {
        &self.inc[node]
    }

    #[must_use]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out.get(node).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn in_degree(&self, node: NodeId) -> usize {
        self.inc.get(node).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.out.get(from).is_some_and(|succ| succ.contains(&to))
    }

    /// Every edge as a `(from, to)` pair, grouped by source node.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.out
            .iter()
            .enumerate()
            .flat_map(|(from, succ)| succ.iter().map(move |&to| (from, to)))
    }

    /// Insert `from -> to` on both adjacency sides.
    ///
    /// Returns `false` and leaves the game untouched if the edge already
    /// exists or either endpoint is out of range. This is the only place
    /// duplicate edges are rejected.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        if from >= self.n_nodes() || to >= self.n_nodes() || self.has_edge(from, to) {
            return false;
        }
        self.out[from].push(to);
        self.inc[to].push(from);
        true
    }

    /// Remove `from -> to` from both adjacency sides.
    ///
    /// Returns `false` if there was no such edge.
    pub fn remove_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        let Some(pos) = self.out.get(from).and_then(|succ| succ.iter().position(|&v| v == to))
        else {
            return false;
        };
        self.out[from].remove(pos);
        if let Some(back) = self.inc[to].iter().position(|&u| u == from) {
            self.inc[to].remove(back);
        }
        true
    }

    /// `true` if `node` has an edge to itself.
    #[must_use]
    pub fn has_self_loop(&self, node: NodeId) -> bool {
        self.has_edge(node, node)
    }

    /// Largest priority in use, or `None` for an empty game.
    #[must_use]
    pub fn max_priority(&self) -> Option<Priority> {
        self.priority.iter().copied().max()
    }
}
