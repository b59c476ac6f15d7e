//! Induced subgame extraction.

use tracing::instrument;

use super::{Game, NodeId, Player};
use crate::error::{GameError, Result};

impl Game {
    /// Build the subgame induced by `keep`.
    ///
    /// Kept nodes are renumbered densely in ascending order of their
    /// current id; duplicates in `keep` are ignored. An edge survives iff
    /// both endpoints are kept. Priorities and names are copied. Owners
    /// are copied too unless `owner_override` is given, in which case it
    /// is indexed by source node id and supplies every kept node's owner.
    ///
    /// # Errors
    ///
    /// - [`GameError::EmptyKeepSet`] if `keep` is empty.
    /// - [`GameError::NodeOutOfRange`] if `keep` names an unknown node.
    /// - [`GameError::OwnerOverrideLength`] if the override does not have
    ///   one entry per source node.
    #[instrument(skip_all, fields(nodes = self.n_nodes(), keep = keep.len()))]
    pub fn extract_subgame(
        &self,
        keep: &[NodeId],
        owner_override: Option<&[Player]>,
    ) -> Result<Self> {
        if keep.is_empty() {
            return Err(GameError::EmptyKeepSet);
        }
        if let Some(owners) = owner_override {
            if owners.len() != self.n_nodes() {
                return Err(GameError::OwnerOverrideLength {
                    expected: self.n_nodes(),
                    actual: owners.len(),
                });
            }
        }

        let mut kept = keep.to_vec();
        kept.sort_unstable();
        kept.dedup();

        let mut new_id = vec![None; self.n_nodes()];
        for (new, &old) in kept.iter().enumerate() {
            self.check_node(old)?;
            new_id[old] = Some(new);
        }

        let mut sub = Self::new(kept.len());
        for (new, &old) in kept.iter().enumerate() {
            sub.owner[new] = owner_override.map_or(self.owner[old], |owners| owners[old]);
            sub.priority[new] = self.priority[old];
            sub.label[new].clone_from(&self.label[old]);
        }
        for (new, &old) in kept.iter().enumerate() {
            for &to in &self.out[old] {
                if let Some(target) = new_id[to] {
                    sub.out[new].push(target);
                    sub.inc[target].push(new);
                }
            }
        }

        Ok(sub)
    }

    /// Extract everything except `node`.
    ///
    /// # Errors
    ///
    /// See [`Game::extract_subgame`]; removing the only node yields
    /// [`GameError::EmptyKeepSet`].
    pub fn without_node(&self, node: NodeId) -> Result<Self> {
        self.check_node(node)?;
        let keep: Vec<NodeId> = (0..self.n_nodes()).filter(|&i| i != node).collect();
        self.extract_subgame(&keep, None)
    }
}
