//! Priority and owner rewrites that keep the game's solution intact.
//!
//! Games here follow the max-parity convention: a play is won by the
//! player matching the parity of the highest priority seen infinitely
//! often. Any rewrite that keeps each node's parity and never swaps the
//! relative order of two priorities therefore keeps every winner.
//!
//! - [`Game::renumber`] closes gaps: `{0, 4, 7}` becomes `{0, 2, 3}`.
//! - [`Game::compress`] also merges neighbouring values of equal parity:
//!   `{0, 2, 3, 5, 6}` becomes `{0, 0, 1, 1, 2}`. The merge is global.
//!   There is no SCC-aware variant: merging per component can put two
//!   values in opposite order in different components, and one global
//!   relabelling cannot honour both.
//! - [`Game::inflate`] gives every node its own priority.
//! - [`Game::evenodd`] shifts all priorities by one and swaps owners, so
//!   the winner of every node swaps too.
//! - [`Game::minmax`] mirrors priorities around an even pivot, turning a
//!   max-parity game into the equivalent min-parity game and back.

use std::collections::BTreeMap;

use tracing::debug;

use crate::game::{Game, NodeId, Priority};

/// Smallest value at or above `floor` with the parity of `like`.
const fn with_parity(floor: Priority, like: Priority) -> Priority {
    if floor % 2 == like % 2 { floor } else { floor + 1 }
}

impl Game {
    /// Number of distinct priorities in use.
    #[must_use]
    pub fn distinct_priorities(&self) -> usize {
        let mut values = self.priorities().to_vec();
        values.sort_unstable();
        values.dedup();
        values.len()
    }

    fn remap_values(&mut self, step: impl Fn(Priority, Priority) -> Priority) {
        let mut values = self.priorities().to_vec();
        values.sort_unstable();
        values.dedup();

        let mut table = BTreeMap::new();
        let mut prev: Option<Priority> = None;
        for p in values {
            let next = prev.map_or(p % 2, |last| step(last, p));
            table.insert(p, next);
            prev = Some(next);
        }
        for p in self.priorities_mut() {
            if let Some(&mapped) = table.get(p) {
                *p = mapped;
            }
        }
    }

    /// Map the used priorities onto the smallest strictly increasing,
    /// parity-preserving sequence. Returns the distinct count.
    pub fn renumber(&mut self) -> usize {
        self.remap_values(|last, p| with_parity(last + 1, p));
        let distinct = self.distinct_priorities();
        debug!(distinct, "renumbered priorities");
        distinct
    }

    /// Like [`Game::renumber`], but runs of consecutive used values with
    /// the same parity collapse into one. Returns the distinct count.
    pub fn compress(&mut self) -> usize {
        self.remap_values(with_parity);
        let distinct = self.distinct_priorities();
        debug!(distinct, "compressed priorities");
        distinct
    }

    /// Give every node a distinct priority, keeping parity and order.
    /// Nodes sharing a priority are spread in id order. Returns the
    /// distinct count, which equals the node count.
    pub fn inflate(&mut self) -> usize {
        // The result depends only on order and parity; compacting first
        // keeps `last + 1` in range.
        self.renumber();
        let mut order: Vec<NodeId> = (0..self.n_nodes()).collect();
        order.sort_by_key(|&node| self.priority(node));

        let priorities = self.priorities_mut();
        let mut prev: Option<Priority> = None;
        for node in order {
            let p = priorities[node];
            let next = prev.map_or(p % 2, |last| with_parity(last + 1, p));
            priorities[node] = next;
            prev = Some(next);
        }
        let distinct = self.distinct_priorities();
        debug!(distinct, "inflated priorities");
        distinct
    }

    // Shifting and mirroring need one unit of headroom.
    fn ensure_headroom(&mut self) {
        if self.max_priority() == Some(Priority::MAX) {
            self.renumber();
        }
    }

    /// Swap the players: every priority moves up by one and every owner
    /// flips, so whoever won a node before now loses it.
    pub fn evenodd(&mut self) {
        self.ensure_headroom();
        for p in self.priorities_mut() {
            *p += 1;
        }
        for owner in self.owners_mut() {
            *owner = owner.opponent();
        }
        debug!("swapped players");
    }

    /// Reverse priority significance around the smallest even value at or
    /// above the maximum. Parity is kept, order is reversed.
    pub fn minmax(&mut self) {
        self.ensure_headroom();
        let Some(max) = self.max_priority() else {
            return;
        };
        let pivot = with_parity(max, 0);
        for p in self.priorities_mut() {
            *p = pivot - *p;
        }
        debug!(pivot, "mirrored priorities");
    }
}
