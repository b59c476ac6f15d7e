//! Structural invariant checks for [`Game`].

use super::{Game, NodeId};

/// A single violated structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("edge {from} -> {to} points outside the node range")]
    EdgeOutOfRange { from: NodeId, to: NodeId },

    #[error("edge {from} -> {to} is stored more than once")]
    DuplicateEdge { from: NodeId, to: NodeId },

    #[error("edge {from} -> {to} is missing its predecessor entry")]
    MissingPredecessor { from: NodeId, to: NodeId },

    #[error("predecessor entry {from} -> {to} has no matching successor")]
    DanglingPredecessor { from: NodeId, to: NodeId },

    #[error("node {node} has no outgoing edge")]
    DeadEnd { node: NodeId },
}

impl Game {
    /// Collect every violated structural invariant.
    ///
    /// An empty result means the adjacency is symmetric, duplicate free,
    /// within range, and every node can move.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let n = self.n_nodes();
        let mut violations = Vec::new();

        for from in 0..n {
            let succ = self.successors(from);
            if succ.is_empty() {
                violations.push(InvariantViolation::DeadEnd { node: from });
            }
            for (i, &to) in succ.iter().enumerate() {
                if to >= n {
                    violations.push(InvariantViolation::EdgeOutOfRange { from, to });
                    continue;
                }
                if succ[..i].contains(&to) {
                    violations.push(InvariantViolation::DuplicateEdge { from, to });
                    continue;
                }
                let back = self.predecessors(to).iter().filter(|&&u| u == from).count();
                if back != 1 {
                    violations.push(InvariantViolation::MissingPredecessor { from, to });
                }
            }
        }

        for to in 0..n {
            for &from in self.predecessors(to) {
                if from >= n || !self.successors(from).contains(&to) {
                    violations.push(InvariantViolation::DanglingPredecessor { from, to });
                }
            }
        }

        violations
    }

    /// `true` when [`Game::check_invariants`] finds nothing.
    #[must_use]
    pub fn is_valid_game(&self) -> bool {
        !self.is_empty() && self.check_invariants().is_empty()
    }
}
