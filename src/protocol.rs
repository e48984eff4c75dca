//! Line-oriented text protocol for playing against the engine.
//!
//! The format borrows from GTP: one command per line, an optional numeric id
//! in front, `=` for success and `?` for failure, and a blank line after each
//! response.
//!
//! ## Supported Commands
//!
//! - `name` - Return engine name
//! - `version` - Return engine version
//! - `list_commands` - List all supported commands
//! - `known_command <cmd>` - Check if a command is supported
//! - `quit` - Exit the loop
//! - `new` - Start a new game from the opening position
//! - `showboard` - Print the board
//! - `moves` - List legal moves for the side to move
//! - `play <move>` - Play a move, e.g. `c3-d4` or `e3xc5xa7`
//! - `genmove` - Let the engine choose and play a move
//! - `difficulty <easy|medium|hard>` - Change search strength
//! - `seed <n>` - Reseed the engine's random generator
//!
//! ## Example
//!
//! ```ignore
//! use checkers_mcts::protocol::Console;
//! let mut console = Console::new(Difficulty::Easy, None);
//! console.run(std::io::stdin().lock(), &mut std::io::stdout())?;
//! ```

use std::io::{BufRead, Write};

use clap::ValueEnum;

use crate::board::Board;
use crate::difficulty::Difficulty;
use crate::mcts::MctsEngine;
use crate::moves::Move;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "difficulty",
    "genmove",
    "known_command",
    "list_commands",
    "moves",
    "name",
    "new",
    "play",
    "quit",
    "seed",
    "showboard",
    "version",
];

/// Game session driven by text commands.
pub struct Console {
    /// Current game position
    board: Board,
    /// Search engine, handed the current board before each search
    engine: MctsEngine,
}

impl Console {
    /// Create a session at the opening position.
    pub fn new(difficulty: Difficulty, seed: Option<u64>) -> Self {
        let board = Board::new();
        let engine = match seed {
            Some(seed) => MctsEngine::with_seed(board.clone(), difficulty, seed),
            None => MctsEngine::new(board.clone(), difficulty),
        };
        Self::with_engine(engine)
    }

    /// Create a session around an already configured engine.
    pub fn with_engine(engine: MctsEngine) -> Self {
        Self {
            board: engine.board().clone(),
            engine,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Read commands from `input` until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, output: &mut impl Write) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let (success, message) = self.execute(&command, &parts[1..]);

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&arg.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "new" => {
                self.board = Board::new();
                (true, String::new())
            }

            "showboard" => (true, format!("\n{}", self.board)),

            "moves" => {
                let moves = self.board.legal_moves(self.board.current_player());
                let listed: Vec<String> = moves.iter().map(Move::to_string).collect();
                (true, listed.join(" "))
            }

            "play" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let mv = match arg.parse::<Move>() {
                    Ok(mv) => mv,
                    Err(err) => return (false, err.to_string()),
                };
                let legal = self.board.legal_moves(self.board.current_player());
                if !legal.contains(&mv) {
                    return (false, format!("illegal move {mv}"));
                }
                match self.board.apply_move(&mv) {
                    Ok(()) => (true, String::new()),
                    Err(err) => (false, err.to_string()),
                }
            }

            "genmove" => {
                let legal = self.board.legal_moves(self.board.current_player());
                if legal.is_empty() {
                    return (true, "none".to_string());
                }

                self.engine.set_board(self.board.clone());
                let Some(mv) = self.engine.choose_move(&legal) else {
                    return (false, "engine returned no move".to_string());
                };
                match self.board.apply_move(&mv) {
                    Ok(()) => (true, mv.to_string()),
                    Err(err) => (false, err.to_string()),
                }
            }

            "difficulty" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match Difficulty::from_str(arg, true) {
                    Ok(difficulty) => {
                        self.engine.set_difficulty(difficulty);
                        (true, String::new())
                    }
                    Err(_) => (false, format!("unknown difficulty {arg}")),
                }
            }

            "seed" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<u64>() {
                    Ok(seed) => {
                        self.engine.set_seed(seed);
                        (true, String::new())
                    }
                    Err(_) => (false, "invalid seed".to_string()),
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}
