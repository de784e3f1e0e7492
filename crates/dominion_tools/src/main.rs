//! Hex Dominion - Development Tools
//!
//! # Usage
//!
//! ```bash
//! # Play one headless game and print a JSON summary
//! cargo run -p dominion_tools -- simulate --seed 7 --players 3
//!
//! # Balance run across 500 seeds
//! cargo run -p dominion_tools -- batch --count 500 --opponents frontier
//!
//! # Check config files
//! cargo run -p dominion_tools -- validate assets/configs
//!
//! # Show a saved game
//! cargo run -p dominion_tools -- inspect saves/turn12.ron --map
//! ```
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (or `--verbose`);
//! results go to stdout.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dominion_core::data::GameConfig;
use dominion_tools::render::{render_ascii, AsciiConfig};
use dominion_tools::report::GameSummary;
use dominion_tools::simulate::{self, SimulationOptions, StrategyKind};
use dominion_tools::{saves, validate, Result};

#[derive(Parser)]
#[command(name = "dominion")]
#[command(about = "Development tools for Hex Dominion")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr when RUST_LOG is unset
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct GameArgs {
    /// RON config file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Map seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of parties (2-4)
    #[arg(short, long)]
    players: Option<u8>,

    /// Map radius
    #[arg(short, long)]
    radius: Option<u32>,

    /// Strategy for the human seat
    #[arg(long, value_enum, default_value_t = StrategyKind::Frontier)]
    human: StrategyKind,

    /// Strategy for computer opponents
    #[arg(long, value_enum, default_value_t = StrategyKind::Random)]
    opponents: StrategyKind,

    /// Stop after this many turns
    #[arg(long, default_value = "100")]
    max_turns: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one headless game
    Simulate {
        #[command(flatten)]
        game: GameArgs,

        /// Write the final state to this save file (.ron or binary)
        #[arg(long)]
        save: Option<PathBuf>,

        /// Print the final map
        #[arg(long)]
        map: bool,
    },

    /// Play many games in parallel and aggregate the results
    Batch {
        #[command(flatten)]
        game: GameArgs,

        /// Number of games
        #[arg(short = 'n', long, default_value = "100")]
        count: u64,

        /// Write per-game summaries to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate RON config files
    Validate {
        /// A config file or a directory of them
        #[arg(default_value = "assets/configs")]
        path: PathBuf,
    },

    /// Summarize a save file
    Inspect {
        /// Save file (.ron or binary)
        path: PathBuf,

        /// Print the map
        #[arg(long)]
        map: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Simulate { game, save, map } => {
            let (config, options) = game_setup(&game)?;
            let mut state = simulate::prepare_game(config, &options)?;
            simulate::play(&mut state, &options)?;
            if let Some(path) = save {
                saves::save_to_file(&state, &path)?;
            }
            if map {
                eprintln!("{}", render_ascii(state.territories(), AsciiConfig::default()));
            }
            println!("{}", serde_json::to_string_pretty(&GameSummary::from_game(&state))?);
        }
        Commands::Batch { game, count, output } => {
            let (config, options) = game_setup(&game)?;
            let (results, summary) = simulate::run_batch(&config, count, config.seed, &options)?;
            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&results)?;
                std::fs::write(&path, json).map_err(|e| dominion_tools::ToolError::Io {
                    path: path.clone(),
                    source: e,
                })?;
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Validate { path } => validate_path(&path)?,
        Commands::Inspect { path, map } => {
            let game = saves::load_from_file(&path)?;
            if map {
                println!("{}", render_ascii(game.territories(), AsciiConfig::default()));
            }
            println!("{}", serde_json::to_string_pretty(&GameSummary::from_game(&game))?);
        }
    }
    Ok(())
}

fn game_setup(args: &GameArgs) -> Result<(GameConfig, SimulationOptions)> {
    let mut config = match &args.config {
        Some(path) => validate::validate_config_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(players) = args.players {
        config = config.with_players(players);
    }
    if let Some(radius) = args.radius {
        config = config.with_radius(radius);
    }
    let options = SimulationOptions {
        human: args.human,
        opponents: args.opponents,
        max_turns: args.max_turns,
    };
    Ok((config, options))
}

fn validate_path(path: &Path) -> Result<()> {
    tracing::info!("Validating config files in: {}", path.display());
    if path.is_file() {
        validate::validate_config_file(path)?;
        tracing::info!("Validation passed");
        return Ok(());
    }

    let report = validate::validate_data_directory(path)?;
    for (file, reason) in &report.invalid {
        println!("FAIL {}: {reason}", file.display());
    }
    println!("{} valid, {} invalid", report.valid.len(), report.invalid.len());
    if !report.is_ok() {
        std::process::exit(1);
    }
    tracing::info!("Validation passed");
    Ok(())
}
