#![no_main]

use libfuzzer_sys::fuzz_target;
use pgnudge_core::{Game, Labels};

fuzz_target!(|data: &[u8]| {
    let Ok(src) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut game) = src.parse::<Game>() else {
        return;
    };

    assert!(game.check_invariants().is_empty());

    // Rendering with names must parse back to the same game.
    let rendered = game.pgsolver(Labels::Keep).to_string();
    let reparsed: Game = rendered.parse().expect("rendered game must parse");
    assert_eq!(reparsed.n_nodes(), game.n_nodes());
    assert_eq!(reparsed.edges().collect::<Vec<_>>(), game.edges().collect::<Vec<_>>());

    let mapping = game.reindex_capture();
    game.compress();
    game.apply_permutation(&mapping).expect("captured mapping must apply");
    assert_eq!(game.n_nodes(), reparsed.n_nodes());
});
