//! Command-line interface for board_keeper.

use std::path::PathBuf;

use board_keeper::{Backend, DEFAULT_CONFIG_FILE};
use clap::{Parser, Subcommand};

/// Board Keeper - persisted chess board and hit-counter persistence demo
#[derive(Parser, Debug)]
#[command(name = "board_keeper")]
#[command(about = "Persisted chess board mirrored into a text presenter", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Work with the board of a session
    Board {
        /// Session id. Defaults to the last opened session, then "default".
        #[arg(short, long)]
        session: Option<String>,

        /// Board action
        #[command(subcommand)]
        action: BoardAction,
    },

    /// Click or inspect a hit counter
    Counter {
        /// Storage backend (memory, text-file, file-stream, binary, json-file,
        /// prefs, prefs-json, document, sqlite)
        backend: Backend,

        /// Counter action
        #[command(subcommand)]
        action: CounterAction,
    },

    /// List the counter backends
    Backends,
}

/// Board actions
#[derive(Subcommand, Debug)]
pub enum BoardAction {
    /// Start a new game in the session, replacing any saved pieces
    New,

    /// Resume (or create) the session and print the board
    Show,

    /// Click the piece on FROM, then the square TO (e.g. `move e2 e4`)
    Move {
        /// Source square
        from: String,

        /// Destination square
        to: String,
    },

    /// Reset the board to the standard setup
    Reset {
        /// Delete every piece of the session instead
        #[arg(long)]
        clear: bool,
    },
}

/// Counter actions
#[derive(Subcommand, Debug)]
pub enum CounterAction {
    /// Count one click
    Click {
        /// Count as a shift-click
        #[arg(long, conflicts_with = "control")]
        shift: bool,

        /// Count as a control-click
        #[arg(long)]
        control: bool,
    },

    /// Print the stored counts
    Show,
}
