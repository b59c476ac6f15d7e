#![forbid(unsafe_code)]

mod output;

use std::env;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use pgnudge_core::pipeline::{self, PipelineConfig};
use pgnudge_core::{Game, Labels, Profile};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "pgnudge: change a parity game a bit",
    long_about = "Read a parity game in pgsolver format, optionally mutate it, restrict it to a \
                  bottom SCC and rewrite its priorities, then write it back out.",
    after_help = "EXAMPLES:\n    # One random edit that never grows the game\n    pgnudge -m 0 in.pg out.pg\n\n    # Reproducible bottom SCC with compressed priorities\n    pgnudge --seed 7 -b -c < in.pg > out.pg"
)]
struct Cli {
    /// Input game (stdin when absent).
    input: Option<PathBuf>,

    /// Output game (stdout when absent).
    output: Option<PathBuf>,

    /// Apply one random edit with profile 0 (remove only), 1 (rewire) or 2 (full).
    #[arg(short, long, value_name = "PROFILE", allow_negative_numbers = true)]
    modify: Option<i64>,

    /// Number of successful edits when modifying.
    #[arg(long, value_name = "N")]
    edits: Option<usize>,

    /// Give up modifying after this many draws.
    #[arg(long, value_name = "N")]
    max_draws: Option<u64>,

    /// Replace the game by a random bottom SCC.
    #[arg(short, long)]
    bottom_scc: bool,

    /// Give every node a distinct priority.
    #[arg(short, long)]
    inflate: bool,

    /// Merge priorities that need not be distinguished.
    #[arg(short, long)]
    compress: bool,

    /// Close gaps between priorities.
    #[arg(short, long)]
    renumber: bool,

    /// Keep nodes ordered by priority instead of restoring the input order.
    #[arg(short, long)]
    order: bool,

    /// Swap the players.
    #[arg(long)]
    evenodd: bool,

    /// Turn a max-parity game into a min-parity game and back.
    #[arg(long)]
    minmax: bool,

    /// Seed the random generator for a reproducible run.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Write node names back out.
    #[arg(long)]
    labels: bool,

    /// Fail unless the result is a valid parity game.
    #[arg(long)]
    check: bool,

    /// Read defaults from a TOML file; flags override it.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Layer the command-line flags over `config`.
    fn apply(&self, config: &mut PipelineConfig) -> anyhow::Result<()> {
        if let Some(code) = self.modify {
            config.modify = Some(Profile::from_code(code)?);
        }
        if let Some(edits) = self.edits {
            config.edits = edits;
        }
        if self.max_draws.is_some() {
            config.max_draws = self.max_draws;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.bottom_scc |= self.bottom_scc;
        config.inflate |= self.inflate;
        config.compress |= self.compress;
        config.renumber |= self.renumber;
        config.keep_order |= self.order;
        config.evenodd |= self.evenodd;
        config.minmax |= self.minmax;
        config.labels |= self.labels;
        config.check |= self.check;
        Ok(())
    }

    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };
        self.apply(&mut config)?;
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PGNUDGE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "pgnudge=debug,pgnudge_core=debug,info"
        } else {
            "pgnudge=info,pgnudge_core=info,warn"
        })
    });

    let format = env::var("PGNUDGE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn read_game(input: Option<&PathBuf>) -> anyhow::Result<Game> {
    match input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Game::parse_pgsolver(BufReader::new(file))
                .with_context(|| format!("parsing error in {}", path.display()))
        }
        None => Game::parse_pgsolver(io::stdin().lock()).context("parsing error in <stdin>"),
    }
}

fn write_game(game: &Game, output: Option<&PathBuf>, labels: Labels) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            game.write_pgsolver(BufWriter::new(file), labels)
                .with_context(|| format!("failed to write {}", path.display()))
        }
        None => game
            .write_pgsolver(io::stdout().lock(), labels)
            .context("failed to write <stdout>"),
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = cli.pipeline_config()?;
    let game = read_game(cli.input.as_ref())?;
    info!(nodes = game.n_nodes(), edges = game.edge_count(), "read game");

    let seed = *config.seed.get_or_insert_with(rand::random);
    debug!(seed, "seeded random generator");
    let mut rng = StdRng::seed_from_u64(seed);

    let outcome = pipeline::run(&config, game, &mut rng)?;

    if config.check {
        let violations = outcome.game.check_invariants();
        if let Some(first) = violations.first() {
            bail!(
                "result is not a valid parity game: {first} ({} violations)",
                violations.len()
            );
        }
    }

    let labels = if config.labels { Labels::Keep } else { Labels::Omit };
    write_game(&outcome.game, cli.output.as_ref(), labels)?;
    info!(
        nodes = outcome.game.n_nodes(),
        edges = outcome.game.edge_count(),
        seed,
        "wrote game"
    );
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::render_error(&err);
            ExitCode::FAILURE
        }
    }
}
