//! Checkers-MCTS: play checkers against a Monte Carlo Tree Search engine.
//!
//! ## Usage
//!
//! - `checkers-mcts` - Start the text protocol on stdin/stdout
//! - `checkers-mcts console` - Same as above
//! - `checkers-mcts demo` - Watch the engine play itself
//!
//! Set `RUST_LOG=debug` to see search progress.

use std::io;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use checkers_mcts::board::{Board, Player};
use checkers_mcts::constants::MAX_GAME_LEN;
use checkers_mcts::difficulty::Difficulty;
use checkers_mcts::mcts::MctsEngine;
use checkers_mcts::protocol::Console;

/// Checkers-MCTS: a Monte Carlo Tree Search checkers engine
#[derive(Parser)]
#[command(name = "checkers-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Search strength
    #[arg(long, value_enum, default_value_t = Difficulty::Medium, global = true)]
    difficulty: Difficulty,

    /// Seed for reproducible searches
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Stop each search after this many milliseconds
    #[arg(long, global = true)]
    time_limit_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the text protocol for playing against the engine
    Console,
    /// Let the engine play both sides
    Demo {
        /// Stop the game after this many plies
        #[arg(long, default_value_t = MAX_GAME_LEN)]
        max_plies: usize,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let board = Board::new();
    let mut engine = match cli.seed {
        Some(seed) => MctsEngine::with_seed(board, cli.difficulty, seed),
        None => MctsEngine::new(board, cli.difficulty),
    };
    if let Some(ms) = cli.time_limit_ms {
        engine.set_settings(engine.settings().with_time_limit(Duration::from_millis(ms)));
    }

    match cli.command {
        Some(Commands::Console) | None => {
            let mut console = Console::with_engine(engine);
            console
                .run(io::stdin().lock(), &mut io::stdout())
                .context("console session failed")
        }
        Some(Commands::Demo { max_plies }) => run_demo(engine, max_plies),
    }
}

fn run_demo(mut engine: MctsEngine, max_plies: usize) -> anyhow::Result<()> {
    println!("Checkers-MCTS self-play\n");

    let mut board = Board::new();
    println!("{board}\n");

    for ply in 1..=max_plies {
        let player = board.current_player();
        let legal = board.legal_moves(player);
        if legal.is_empty() {
            println!("{player} has no legal move");
            break;
        }

        engine.set_board(board.clone());
        let mv = engine
            .choose_move(&legal)
            .context("engine returned no move")?;
        board
            .apply_move(&mv)
            .with_context(|| format!("engine chose an unplayable move {mv}"))?;

        println!("{ply}. {player} plays {mv}");
        println!("{board}\n");
    }

    println!(
        "Final material: red {} black {}",
        board.piece_count(Player::Red),
        board.piece_count(Player::Black)
    );
    Ok(())
}
