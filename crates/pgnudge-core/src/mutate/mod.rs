//! Randomised structural edits.
//!
//! # Overview
//!
//! [`Mutator::run`] keeps drawing a random node and a random [`Action`]
//! from the active [`Profile`] until the requested number of edits has
//! actually been applied. An action whose precondition does not hold is
//! a silent no-op and does not count; the loop simply draws again.
//!
//! Every profile contains [`Action::FlipOwner`], which applies to any
//! node, so each draw succeeds with probability at least `1 / 6` and the
//! loop terminates almost surely. [`Action::RemoveNode`] also applies to
//! any node once the game has two or more. [`Mutator::with_max_draws`] turns that
//! into a hard bound that fails with [`GameError::MutationStalled`].
//!
//! Actions that delete a node replace the working game with a freshly
//! extracted one before the next draw, so node ids stay dense. Removing a
//! node may leave a predecessor without successors; use
//! [`Game::check_invariants`] to detect that.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{GameError, Result};
use crate::game::{Game, NodeId};

mod source;

pub use source::{ScriptedSource, UniformSource};

/// One kind of random edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Drop one random outgoing edge of a node with at least two.
    RemoveEdge,
    /// Route a node's predecessors straight to its single successor,
    /// then delete the node.
    Contract,
    /// Delete the node. Only a game's last node is kept.
    RemoveNode,
    /// Hand the node to the other player.
    FlipOwner,
    /// Replace one predecessor's edge into the node by edges to all of
    /// the node's successors.
    Forward,
    /// Add an edge to a random target, if it is new.
    AddEdge,
}

impl Action {
    pub const ALL: [Self; 6] = [
        Self::RemoveEdge,
        Self::Contract,
        Self::RemoveNode,
        Self::FlipOwner,
        Self::Forward,
        Self::AddEdge,
    ];

    /// Numeric action code used in logs.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::RemoveEdge => 0,
            Self::Contract => 1,
            Self::RemoveNode => 2,
            Self::FlipOwner => 3,
            Self::Forward => 4,
            Self::AddEdge => 5,
        }
    }

    /// `true` if the action applies to every node of every game with at
    /// least two nodes.
    #[must_use]
    pub const fn always_applicable(self) -> bool {
        matches!(self, Self::RemoveNode | Self::FlipOwner)
    }

    /// `true` if applying the action removes a node.
    #[must_use]
    pub const fn removes_node(self) -> bool {
        matches!(self, Self::Contract | Self::RemoveNode)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RemoveEdge => "remove-edge",
            Self::Contract => "contract",
            Self::RemoveNode => "remove-node",
            Self::FlipOwner => "flip-owner",
            Self::Forward => "forward",
            Self::AddEdge => "add-edge",
        };
        f.write_str(name)
    }
}

/// Which actions the mutator may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// Profile 0: removals and owner flips only; the game never grows.
    RemoveOnly,
    /// Profile 1: edge removal, owner flips and edge addition; no node
    /// is ever deleted.
    Rewire,
    /// Profile 2: every action.
    Full,
}

impl Profile {
    /// Decode a numeric profile.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownProfile`] for anything but 0, 1 or 2.
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Self::RemoveOnly),
            1 => Ok(Self::Rewire),
            2 => Ok(Self::Full),
            other => Err(GameError::UnknownProfile(other.to_string())),
        }
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::RemoveOnly => 0,
            Self::Rewire => 1,
            Self::Full => 2,
        }
    }

    /// The actions eligible under this profile.
    #[must_use]
    pub const fn actions(self) -> &'static [Action] {
        match self {
            Self::RemoveOnly => &[
                Action::RemoveEdge,
                Action::Contract,
                Action::RemoveNode,
                Action::FlipOwner,
            ],
            Self::Rewire => &[Action::RemoveEdge, Action::FlipOwner, Action::AddEdge],
            Self::Full => &Action::ALL,
        }
    }
}

impl FromStr for Profile {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "remove-only" => Ok(Self::RemoveOnly),
            "rewire" => Ok(Self::Rewire),
            "full" => Ok(Self::Full),
            other => other
                .parse::<i64>()
                .map_err(|_| GameError::UnknownProfile(other.to_string()))
                .and_then(Self::from_code),
        }
    }
}

/// What a mutation run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationReport {
    /// Applied actions with the node they were drawn for, in order. Node
    /// ids refer to the game as it was when the action applied.
    pub applied: Vec<(Action, NodeId)>,
    /// Total node/action draws, including no-ops.
    pub draws: u64,
}

/// Applies random edits under a [`Profile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutator {
    profile: Profile,
    max_draws: Option<u64>,
}

impl Mutator {
    #[must_use]
    pub fn new(profile: Profile) -> Self {
        debug_assert!(
            profile.actions().iter().any(|a| a.always_applicable()),
            "profile {profile:?} has no always-applicable action"
        );
        Self {
            profile,
            max_draws: None,
        }
    }

    /// Give up with [`GameError::MutationStalled`] after `cap` draws.
    #[must_use]
    pub const fn with_max_draws(mut self, cap: u64) -> Self {
        self.max_draws = Some(cap);
        self
    }

    #[must_use]
    pub const fn profile(&self) -> Profile {
        self.profile
    }

    /// Apply exactly `edits` successful edits to `game`.
    ///
    /// # Errors
    ///
    /// - [`GameError::MutationStalled`] if the draw cap is hit, or the
    ///   game has no nodes to draw from.
    /// - Extraction errors from node deletion, which the action
    ///   preconditions rule out in practice.
    #[instrument(skip(self, game, rng), fields(profile = ?self.profile, nodes = game.n_nodes()))]
    pub fn run<S: UniformSource + ?Sized>(
        &self,
        mut game: Game,
        edits: usize,
        rng: &mut S,
    ) -> Result<(Game, MutationReport)> {
        let actions = self.profile.actions();
        let mut report = MutationReport::default();
        let mut remaining = edits;

        while remaining > 0 {
            if game.is_empty() || self.max_draws.is_some_and(|cap| report.draws >= cap) {
                return Err(GameError::MutationStalled {
                    draws: report.draws,
                    remaining,
                });
            }
            report.draws += 1;

            let node = rng.uniform(0, game.n_nodes() - 1);
            let action = actions[rng.index(actions.len())];
            if apply(&mut game, action, node, rng)? {
                debug!(%action, node, nodes = game.n_nodes(), "applied mutation");
                report.applied.push((action, node));
                remaining -= 1;
            }
        }

        Ok((game, report))
    }
}

/// Try `action` on `node`. Returns `false` if its precondition fails, in
/// which case the game is untouched.
fn apply<S: UniformSource + ?Sized>(
    game: &mut Game,
    action: Action,
    node: NodeId,
    rng: &mut S,
) -> Result<bool> {
    match action {
        Action::RemoveEdge => {
            let degree = game.out_degree(node);
            if degree < 2 {
                return Ok(false);
            }
            let to = game.successors(node)[rng.index(degree)];
            Ok(game.remove_edge(node, to))
        }
        Action::Contract => {
            let &[to] = game.successors(node) else {
                return Ok(false);
            };
            if to == node {
                return Ok(false);
            }
            for from in game.predecessors(node).to_vec() {
                game.add_edge(from, to);
            }
            *game = game.without_node(node)?;
            Ok(true)
        }
        Action::RemoveNode => {
            if game.n_nodes() < 2 {
                return Ok(false);
            }
            *game = game.without_node(node)?;
            Ok(true)
        }
        Action::FlipOwner => {
            let owner = game.owner(node).opponent();
            game.set_owner(node, owner)?;
            Ok(true)
        }
        Action::Forward => {
            let in_degree = game.in_degree(node);
            if in_degree == 0 || game.out_degree(node) == 0 {
                return Ok(false);
            }
            let from = game.predecessors(node)[rng.index(in_degree)];
            if from == node {
                return Ok(false);
            }
            game.remove_edge(from, node);
            for to in game.successors(node).to_vec() {
                game.add_edge(from, to);
            }
            Ok(true)
        }
        Action::AddEdge => {
            let to = rng.uniform(0, game.n_nodes() - 1);
            Ok(game.add_edge(node, to))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{InvariantViolation, Player};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ring(n: usize) -> Game {
        let mut game = Game::new(n);
        for i in 0..n {
            game.add_edge(i, (i + 1) % n);
        }
        game
    }

    fn apply_one(game: &mut Game, action: Action, node: NodeId, draws: Vec<usize>) -> bool {
        let mut source = ScriptedSource::new(draws);
        apply(game, action, node, &mut source).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn profile_codes_round_trip() {
        for profile in [Profile::RemoveOnly, Profile::Rewire, Profile::Full] {
            let decoded = Profile::from_code(i64::from(profile.code()))
                .unwrap_or_else(|e| panic!("{e}"));
            assert_eq!(decoded, profile);
        }
        assert!(matches!(Profile::from_code(3), Err(GameError::UnknownProfile(p)) if p == "3"));
        assert!(matches!(Profile::from_code(-1), Err(GameError::UnknownProfile(p)) if p == "-1"));
        assert_eq!("rewire".parse::<Profile>().ok(), Some(Profile::Rewire));
        assert_eq!("0".parse::<Profile>().ok(), Some(Profile::RemoveOnly));
        assert!("bogus".parse::<Profile>().is_err());
    }

    #[test]
    fn unknown_profile_names_echo_the_input() {
        let err = " everything ".parse::<Profile>().err();
        assert!(matches!(&err, Some(GameError::UnknownProfile(p)) if p == "everything"));
        let message = err.map(|e| e.to_string()).unwrap_or_default();
        assert_eq!(message, "unknown mutation profile everything");
        let err = "9".parse::<Profile>().err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("unknown mutation profile 9"));
    }

    #[test]
    fn profile_action_sets_match_codes() {
        let codes = |p: Profile| p.actions().iter().map(|a| a.code()).collect::<Vec<_>>();
        assert_eq!(codes(Profile::RemoveOnly), vec![0, 1, 2, 3]);
        assert_eq!(codes(Profile::Rewire), vec![0, 3, 5]);
        assert_eq!(codes(Profile::Full), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn every_profile_can_always_progress() {
        for profile in [Profile::RemoveOnly, Profile::Rewire, Profile::Full] {
            assert!(profile.actions().iter().any(|a| a.always_applicable()));
            assert!(!profile.actions().is_empty());
        }
        assert!(!Profile::Rewire.actions().iter().any(|a| a.removes_node()));
        let always: Vec<_> = Action::ALL.into_iter().filter(|a| a.always_applicable()).collect();
        assert_eq!(always, vec![Action::RemoveNode, Action::FlipOwner]);
    }

    #[test]
    fn remove_edge_needs_two_successors() {
        let mut game = ring(3);
        assert!(!apply_one(&mut game, Action::RemoveEdge, 0, vec![]));
        game.add_edge(0, 2);
        assert!(apply_one(&mut game, Action::RemoveEdge, 0, vec![1]));
        assert_eq!(game.successors(0), &[1]);
        assert!(game.predecessors(2).iter().all(|&p| p != 0));
        assert!(game.check_invariants().is_empty());
    }

    #[test]
    fn contract_forwards_predecessors() {
        // 0 -> 1 -> 2 -> 0, plus 2 -> 1
        let mut game = ring(3);
        game.add_edge(2, 1);
        game.set_priority(2, 9).unwrap_or_else(|e| panic!("{e}"));
        assert!(apply_one(&mut game, Action::Contract, 1, vec![]));
        // old 0 -> new 0, old 2 -> new 1
        assert_eq!(game.n_nodes(), 2);
        assert_eq!(game.priority(1), 9);
        assert_eq!(game.successors(0), &[1]);
        assert_eq!(game.successors(1), &[0, 1]);
        assert!(game.is_valid_game());
    }

    #[test]
    fn contract_skips_self_loops_and_branches() {
        let mut game = Game::new(1);
        game.add_edge(0, 0);
        assert!(!apply_one(&mut game, Action::Contract, 0, vec![]));
        let mut game = ring(3);
        game.add_edge(0, 2);
        assert!(!apply_one(&mut game, Action::Contract, 0, vec![]));
    }

    #[test]
    fn remove_node_deletes_even_a_sole_successor() {
        // 0 -> 1 -> 2 -> 0: node 0 loses its only successor.
        let mut game = ring(3);
        assert!(apply_one(&mut game, Action::RemoveNode, 1, vec![]));
        assert_eq!(game.n_nodes(), 2);
        assert!(game.successors(0).is_empty());
        assert_eq!(game.successors(1), &[0]);
        assert_eq!(
            game.check_invariants(),
            vec![InvariantViolation::DeadEnd { node: 0 }]
        );
    }

    #[test]
    fn remove_node_keeps_other_edges() {
        let mut game = ring(3);
        game.add_edge(0, 2);
        assert!(apply_one(&mut game, Action::RemoveNode, 1, vec![]));
        assert_eq!(game.n_nodes(), 2);
        assert!(game.is_valid_game());
    }

    #[test]
    fn remove_node_never_empties_the_game() {
        let mut game = Game::new(1);
        game.add_edge(0, 0);
        assert!(!apply_one(&mut game, Action::RemoveNode, 0, vec![]));
    }

    #[test]
    fn flip_owner_always_applies() {
        let mut game = ring(2);
        assert!(apply_one(&mut game, Action::FlipOwner, 1, vec![]));
        assert_eq!(game.owner(1), Player::Odd);
    }

    #[test]
    fn forward_rewires_one_predecessor() {
        // 0 -> 1, 1 -> 2, 1 -> 0, 2 -> 2
        let mut game = Game::new(3);
        for (u, v) in [(0, 1), (1, 2), (1, 0), (2, 2)] {
            game.add_edge(u, v);
        }
        assert!(apply_one(&mut game, Action::Forward, 1, vec![0]));
        assert_eq!(game.successors(0), &[2, 0]);
        assert!(game.predecessors(1).is_empty());
        assert!(game.check_invariants().is_empty());
    }

    #[test]
    fn forward_rejects_self_predecessor() {
        let mut game = Game::new(1);
        game.add_edge(0, 0);
        assert!(!apply_one(&mut game, Action::Forward, 0, vec![0]));
        assert!(game.has_self_loop(0));
    }

    #[test]
    fn add_edge_counts_only_new_edges() {
        let mut game = ring(2);
        assert!(!apply_one(&mut game, Action::AddEdge, 0, vec![1]));
        assert!(apply_one(&mut game, Action::AddEdge, 0, vec![0]));
        assert!(game.has_self_loop(0));
    }

    #[test]
    fn run_applies_requested_edits() {
        let mut rng = StdRng::seed_from_u64(42);
        let mutator = Mutator::new(Profile::Full);
        let (game, report) = mutator
            .run(ring(6), 5, &mut rng)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(report.applied.len(), 5);
        assert!(report.draws >= 5);
        assert!(game
            .check_invariants()
            .iter()
            .all(|v| matches!(v, InvariantViolation::DeadEnd { .. })));
    }

    #[test]
    fn rewire_never_removes_nodes() {
        let mut rng = StdRng::seed_from_u64(3);
        let (game, _) = Mutator::new(Profile::Rewire)
            .run(ring(5), 40, &mut rng)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(game.n_nodes(), 5);
        assert!(game.is_valid_game());
    }

    #[test]
    fn run_is_deterministic_for_a_seed() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            Mutator::new(Profile::Full)
                .run(ring(8), 4, &mut rng)
                .unwrap_or_else(|e| panic!("{e}"))
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn draw_cap_reports_stall() {
        // Node 0 of a single self-loop: only FlipOwner can apply, and the
        // scripted source always picks the first action (RemoveEdge).
        let mut game = Game::new(1);
        game.add_edge(0, 0);
        let mut source = ScriptedSource::new(vec![]);
        let err = Mutator::new(Profile::RemoveOnly)
            .with_max_draws(10)
            .run(game, 1, &mut source);
        assert!(matches!(
            err,
            Err(GameError::MutationStalled { draws: 10, remaining: 1 })
        ));
    }

    #[test]
    fn empty_game_stalls_immediately() {
        let mut source = ScriptedSource::new(vec![]);
        let err = Mutator::new(Profile::Full).run(Game::new(0), 1, &mut source);
        assert!(matches!(err, Err(GameError::MutationStalled { draws: 0, .. })));
    }

    #[test]
    fn zero_edits_is_a_no_op() {
        let mut source = ScriptedSource::new(vec![]);
        let (game, report) = Mutator::new(Profile::Full)
            .run(ring(3), 0, &mut source)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(game, ring(3));
        assert_eq!(report.draws, 0);
    }
}
