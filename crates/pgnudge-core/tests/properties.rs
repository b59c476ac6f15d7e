use std::collections::BTreeSet;

use pgnudge_core::{Action, Game, InvariantViolation, Labels, Mutator, Profile, bottom_scc};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use generators::*;

fn assert_order_and_parity(before: &Game, after: &Game, strict: bool) -> Result<(), TestCaseError> {
    for u in 0..before.n_nodes() {
        prop_assert_eq!(before.priority(u) % 2, after.priority(u) % 2);
        for v in 0..before.n_nodes() {
            if before.priority(u) < before.priority(v) {
                if strict {
                    prop_assert!(after.priority(u) < after.priority(v));
                } else {
                    prop_assert!(after.priority(u) <= after.priority(v));
                }
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn mutation_keeps_adjacency_consistent(
        game in arb_game(),
        seed in any::<u64>(),
        profile in 0i64..3,
        edits in 1usize..8,
    ) {
        let profile = Profile::from_code(profile).unwrap_or(Profile::Full);
        let before = game.n_nodes();
        let mut rng = StdRng::seed_from_u64(seed);
        let (mutated, report) = Mutator::new(profile)
            .run(game, edits, &mut rng)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(report.applied.len(), edits);
        let violations = mutated.check_invariants();
        prop_assert!(
            violations.iter().all(|v| matches!(v, InvariantViolation::DeadEnd { .. })),
            "{:?}",
            violations
        );
        // Only deleting a node outright can strand a predecessor.
        if !report.applied.iter().any(|(action, _)| *action == Action::RemoveNode) {
            prop_assert!(violations.is_empty(), "{:?}", violations);
        }
        match profile {
            Profile::Rewire => prop_assert_eq!(mutated.n_nodes(), before),
            Profile::RemoveOnly | Profile::Full => prop_assert!(mutated.n_nodes() <= before),
        }
        prop_assert!(report.applied.iter().all(|(action, _)| profile.actions().contains(action)));
    }

    #[test]
    fn extraction_keeps_exactly_internal_edges((game, keep) in arb_game_and_subset()) {
        let sub = game.extract_subgame(&keep, None).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let kept: Vec<usize> = keep.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

        prop_assert_eq!(sub.n_nodes(), kept.len());
        let expected: BTreeSet<(usize, usize)> = game
            .edges()
            .filter_map(|(u, v)| {
                let a = kept.binary_search(&u).ok()?;
                let b = kept.binary_search(&v).ok()?;
                Some((a, b))
            })
            .collect();
        let actual: BTreeSet<(usize, usize)> = sub.edges().collect();
        prop_assert_eq!(actual, expected);
        for (new, &old) in kept.iter().enumerate() {
            prop_assert_eq!(sub.priority(new), game.priority(old));
            prop_assert_eq!(sub.owner(new), game.owner(old));
        }
    }

    #[test]
    fn bottom_scc_is_closed_and_extractable((game, start) in arb_game_and_node()) {
        let scc = bottom_scc(&game, start, true).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(!scc.is_empty());
        for &node in &scc {
            for succ in game.successors(node) {
                prop_assert!(scc.contains(succ), "{node} -> {succ} leaves the component");
            }
        }
        let sub = game.extract_subgame(&scc, None).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(sub.is_valid_game());
    }

    #[test]
    fn reindex_then_permute_is_identity(game in arb_game()) {
        let mut work = game.clone();
        let mapping = work.reindex_capture();
        prop_assert!(work.priorities().windows(2).all(|w| w[0] <= w[1]));
        work.apply_permutation(&mapping).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(work, game);
    }

    #[test]
    fn pgsolver_text_round_trips(game in arb_game()) {
        let text = game.pgsolver(Labels::Omit).to_string();
        let parsed: Game = text.parse().map_err(|e: pgnudge_core::GameError| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(&parsed, &game);
        prop_assert_eq!(parsed.pgsolver(Labels::Omit).to_string(), text);
    }

    #[test]
    fn node_lines_parse_in_any_order((game, order) in arb_game_and_order()) {
        let text = game.pgsolver(Labels::Omit).to_string();
        let mut lines = text.lines();
        let header = lines.next().unwrap_or_default();
        let body: Vec<&str> = lines.collect();
        let mut shuffled = format!("{header}\n");
        for &i in &order {
            shuffled.push_str(body[i]);
            shuffled.push('\n');
        }

        let parsed: Game = shuffled.parse().map_err(|e: pgnudge_core::GameError| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(&parsed, &game);
        prop_assert_eq!(parsed.pgsolver(Labels::Omit).to_string(), text);
        for node in 0..game.n_nodes() {
            let mut expected = game.predecessors(node).to_vec();
            let mut actual = parsed.predecessors(node).to_vec();
            expected.sort_unstable();
            actual.sort_unstable();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn renumber_and_inflate_preserve_strict_order(game in arb_game()) {
        let mut renumbered = game.clone();
        renumbered.renumber();
        assert_order_and_parity(&game, &renumbered, true)?;

        let mut inflated = game.clone();
        inflated.inflate();
        assert_order_and_parity(&game, &inflated, true)?;
        prop_assert_eq!(inflated.distinct_priorities(), game.n_nodes());
    }

    #[test]
    fn compress_is_no_wider_than_renumber(game in arb_game()) {
        let mut compressed = game.clone();
        let mut renumbered = game.clone();
        compressed.compress();
        renumbered.renumber();
        assert_order_and_parity(&game, &compressed, false)?;
        prop_assert!(compressed.max_priority() <= renumbered.max_priority());
        prop_assert!(compressed.distinct_priorities() <= renumbered.distinct_priorities());
    }

    #[test]
    fn minmax_reverses_order(game in arb_game()) {
        let mut mirrored = game.clone();
        mirrored.minmax();
        for u in 0..game.n_nodes() {
            prop_assert_eq!(game.priority(u) % 2, mirrored.priority(u) % 2);
            for v in 0..game.n_nodes() {
                if game.priority(u) < game.priority(v) {
                    prop_assert!(mirrored.priority(u) > mirrored.priority(v));
                }
            }
        }
        let mut twice = mirrored.clone();
        twice.minmax();
        let mut original = game.clone();
        twice.compress();
        original.compress();
        prop_assert_eq!(twice.priorities(), original.priorities());
    }

    #[test]
    fn evenodd_twice_restores_owners(game in arb_game()) {
        let mut swapped = game.clone();
        swapped.evenodd();
        for u in 0..game.n_nodes() {
            prop_assert_ne!(game.priority(u) % 2, swapped.priority(u) % 2);
            prop_assert_eq!(game.owner(u).opponent(), swapped.owner(u));
        }
        swapped.evenodd();
        prop_assert_eq!(swapped.owners(), game.owners());
    }

    #[test]
    fn add_edge_twice_changes_nothing_more((game, node) in arb_game_and_node(), target in any::<prop::sample::Index>()) {
        let mut work = game.clone();
        let to = target.index(work.n_nodes());
        let first = work.add_edge(node, to);
        let after_first = work.clone();
        prop_assert!(!work.add_edge(node, to));
        prop_assert_eq!(&work, &after_first);
        prop_assert_eq!(first, !game.has_edge(node, to));
        prop_assert!(work.check_invariants().is_empty());
    }
}
