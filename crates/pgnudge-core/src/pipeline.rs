//! End-to-end nudge pipeline and its configuration.
//!
//! Stages run in a fixed order:
//!
//! 1. random mutation (`modify`)
//! 2. restriction to a bottom SCC reachable from a random node
//! 3. canonical reordering, remembering the mapping
//! 4. `evenodd`, `minmax`, `inflate`, `compress`, `renumber`
//! 5. keep the canonical order (`keep_order`) or restore the original one

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::Result;
use crate::game::{Game, NodeId};
use crate::mutate::{MutationReport, Mutator, Profile, UniformSource};
use crate::scc::bottom_scc;

/// Every knob of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Mutation profile; `None` skips mutation.
    pub modify: Option<Profile>,
    /// Successful edits to apply when mutating.
    pub edits: usize,
    /// Draw cap for the mutator.
    pub max_draws: Option<u64>,
    pub bottom_scc: bool,
    pub evenodd: bool,
    pub minmax: bool,
    pub inflate: bool,
    pub compress: bool,
    pub renumber: bool,
    /// Keep the priority order instead of restoring the input order.
    pub keep_order: bool,
    /// Seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Write node names back out.
    pub labels: bool,
    /// Fail the run if the result is not a valid game.
    pub check: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            modify: None,
            edits: 1,
            max_draws: None,
            bottom_scc: false,
            evenodd: false,
            minmax: false,
            inflate: false,
            compress: false,
            renumber: false,
            keep_order: false,
            seed: None,
            labels: false,
            check: false,
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid TOML or unknown keys.
    pub fn from_toml_str(src: &str) -> anyhow::Result<Self> {
        toml::from_str(src).context("invalid pipeline configuration")
    }

    /// Load a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let src = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&src).with_context(|| format!("in {}", path.display()))
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub game: Game,
    pub mutation: Option<MutationReport>,
    /// Members of the chosen bottom SCC, as ids of the mutated game.
    pub bottom: Option<Vec<NodeId>>,
}

/// Run every configured stage over `game`.
///
/// # Errors
///
/// Propagates mutation stalls and extraction failures.
#[instrument(skip_all, fields(nodes = game.n_nodes()))]
pub fn run<S: UniformSource + ?Sized>(
    config: &PipelineConfig,
    mut game: Game,
    rng: &mut S,
) -> Result<PipelineOutcome> {
    let mut mutation = None;
    if let Some(profile) = config.modify {
        let mut mutator = Mutator::new(profile);
        if let Some(cap) = config.max_draws {
            mutator = mutator.with_max_draws(cap);
        }
        let (mutated, report) = mutator.run(game, config.edits, rng)?;
        info!(
            profile = profile.code(),
            applied = report.applied.len(),
            draws = report.draws,
            nodes = mutated.n_nodes(),
            "mutated game"
        );
        game = mutated;
        mutation = Some(report);
    }

    let mut bottom = None;
    if config.bottom_scc && !game.is_empty() {
        let start = rng.uniform(0, game.n_nodes() - 1);
        let scc = bottom_scc(&game, start, true)?;
        game = game.extract_subgame(&scc, None)?;
        info!(start, nodes = game.n_nodes(), "restricted to bottom SCC");
        bottom = Some(scc);
    }

    let mapping = game.reindex_capture();

    if config.evenodd {
        game.evenodd();
    }
    if config.minmax {
        game.minmax();
    }
    if config.inflate {
        game.inflate();
    }
    if config.compress {
        game.compress();
    }
    if config.renumber {
        game.renumber();
    }

    if config.keep_order {
        game.reindex();
    } else {
        game.apply_permutation(&mapping)?;
    }

    Ok(PipelineOutcome {
        game,
        mutation,
        bottom,
    })
}
