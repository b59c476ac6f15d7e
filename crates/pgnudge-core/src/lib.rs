#![forbid(unsafe_code)]
//! pgnudge-core library.
//!
//! Reads parity games, perturbs them, restricts them to a bottom SCC and
//! rewrites their priorities without changing who wins where. The output
//! is meant as stress-test and regression input for parity game solvers.
//!
//! # Conventions
//!
//! - **Errors**: [`GameError`] for library operations, `anyhow::Result`
//!   for configuration loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod error;
pub mod game;
pub mod mutate;
pub mod pipeline;
pub mod priority;
pub mod scc;

pub use error::{ErrorCode, GameError, Result};
pub use game::pgsolver::Labels;
pub use game::{Game, InvariantViolation, Mapping, NodeId, Player, Priority};
pub use mutate::{Action, MutationReport, Mutator, Profile, ScriptedSource, UniformSource};
pub use pipeline::{PipelineConfig, PipelineOutcome};
pub use scc::bottom_scc;
