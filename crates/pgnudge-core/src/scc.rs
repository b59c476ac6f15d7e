//! Bottom strongly connected component search.
//!
//! # Overview
//!
//! Only the part of the game reachable from the start node matters: it is
//! copied into a petgraph [`DiGraph`] and decomposed with Tarjan's
//! algorithm. petgraph emits components in reverse topological order, so
//! every edge between two components points from a higher component index
//! to a lower one, and index order doubles as a sink-first traversal of
//! the condensation.
//!
//! The search then walks the condensation from the start node's component,
//! always stepping across an outgoing inter-component edge, until it lands
//! on a component with no such edge. That bottom component is closed under
//! successors, so extracting it yields a self-contained game.

use std::collections::VecDeque;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{instrument, warn};

use crate::error::Result;
use crate::game::{Game, NodeId};

struct Condensation {
    /// Game node ids per component, in Tarjan order (sinks first).
    members: Vec<Vec<NodeId>>,
    /// Distinct successor components, each with a lower index.
    successors: Vec<Vec<usize>>,
    start: usize,
}

fn reachable_from(game: &Game, start: NodeId) -> Vec<NodeId> {
    let mut seen = vec![false; game.n_nodes()];
    let mut order = vec![start];
    let mut queue = VecDeque::from([start]);
    seen[start] = true;
    while let Some(node) = queue.pop_front() {
        for &next in game.successors(node) {
            if !seen[next] {
                seen[next] = true;
                order.push(next);
                queue.push_back(next);
            }
        }
    }
    order
}

fn condense(game: &Game, start: NodeId) -> Condensation {
    let reachable = reachable_from(game, start);

    let mut graph = DiGraph::<NodeId, ()>::with_capacity(reachable.len(), reachable.len());
    let mut index = vec![None; game.n_nodes()];
    for &node in &reachable {
        index[node] = Some(graph.add_node(node));
    }
    for &from in &reachable {
        for &to in game.successors(from) {
            if let (Some(a), Some(b)) = (index[from], index[to]) {
                graph.add_edge(a, b, ());
            }
        }
    }

    let components: Vec<Vec<NodeIndex>> = tarjan_scc(&graph);
    let mut component_of = vec![0; graph.node_count()];
    let mut members = Vec::with_capacity(components.len());
    for (c, component) in components.iter().enumerate() {
        let mut ids: Vec<NodeId> = component
            .iter()
            .map(|&idx| {
                component_of[idx.index()] = c;
                graph[idx]
            })
            .collect();
        ids.sort_unstable();
        members.push(ids);
    }

    let mut successors = vec![Vec::new(); components.len()];
    for edge in graph.raw_edges() {
        let from = component_of[edge.source().index()];
        let to = component_of[edge.target().index()];
        if from != to && !successors[from].contains(&to) {
            successors[from].push(to);
        }
    }

    let start = index[start].map_or(0, |idx| component_of[idx.index()]);
    Condensation {
        members,
        successors,
        start,
    }
}

/// Find a bottom SCC reachable from `start`.
///
/// With `require_nontrivial`, a singleton without a self-loop is not an
/// acceptable answer and the walk steers toward components that can reach
/// an acceptable bottom. If no acceptable bottom is reachable at all the
/// trivial one is returned and a warning is logged. The result is sorted.
///
/// # Errors
///
/// Returns [`crate::GameError::NodeOutOfRange`] for an unknown start node.
#[instrument(skip(game), fields(nodes = game.n_nodes()))]
pub fn bottom_scc(game: &Game, start: NodeId, require_nontrivial: bool) -> Result<Vec<NodeId>> {
    game.check_node(start)?;
    let cond = condense(game, start);

    let acceptable = |c: usize| {
        let members = &cond.members[c];
        !require_nontrivial || members.len() > 1 || game.has_self_loop(members[0])
    };

    // Successors always have lower indices, so ascending order settles
    // them before their predecessors.
    let mut reaches_acceptable = vec![false; cond.members.len()];
    for c in 0..cond.members.len() {
        reaches_acceptable[c] = if cond.successors[c].is_empty() {
            acceptable(c)
        } else {
            cond.successors[c].iter().any(|&s| reaches_acceptable[s])
        };
    }

    let mut current = cond.start;
    while let Some(&first) = cond.successors[current].first() {
        current = cond.successors[current]
            .iter()
            .copied()
            .find(|&s| reaches_acceptable[s])
            .unwrap_or(first);
    }

    if !acceptable(current) {
        warn!(
            start,
            node = cond.members[current][0],
            "only a trivial bottom component is reachable"
        );
    }
    Ok(cond.members[current].clone())
}
