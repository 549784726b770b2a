//! Board Keeper - Unified CLI
//!
//! Drives a persisted board session or one of the hit counters.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use board_keeper::{
    AppConfig, Backend, EventBus, GameController, HitCounter, LocalSessionBootstrap, Modifier,
    PositionValue, SessionBootstrap, TextPresenter, open_counter,
};
use clap::Parser;
use cli::{BoardAction, Cli, Command, CounterAction};
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_SESSION: &str = "default";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Board { session, action } => run_board(config, session, action).await,
        Command::Counter { backend, action } => run_counter(&config, backend, action),
        Command::Backends => {
            for backend in Backend::iter() {
                println!("{}", backend);
            }
            Ok(())
        }
    }
}

/// Opens the session's board and applies one action.
#[instrument(skip(config))]
async fn run_board(config: AppConfig, session: Option<String>, action: BoardAction) -> Result<()> {
    let bootstrap = LocalSessionBootstrap::new(config.clone());
    let session_id = match session {
        Some(id) => id,
        None => bootstrap
            .last_session_id()?
            .unwrap_or_else(|| DEFAULT_SESSION.to_string()),
    };
    info!(session_id = %session_id, "Opening board");

    let store = bootstrap.open(&session_id).await?;
    let presenter = TextPresenter::new(config.prefab_catalog()?);
    let (emitter, events) = EventBus::channel();
    let mut controller = GameController::new(store, presenter, events);
    controller.start()?;

    match action {
        BoardAction::Show => {}
        BoardAction::New => controller.new_game()?,
        BoardAction::Reset { clear: false } => controller.reset_game()?,
        BoardAction::Reset { clear: true } => {
            let changes = controller.store().teardown()?;
            controller.process_pending()?;
            println!("Removed {} pieces from session {}", changes.deleted().len(), session_id);
            return Ok(());
        }
        BoardAction::Move { from, to } => {
            let from = PositionValue::from_square_name(&from)?;
            let to = PositionValue::from_square_name(&to)?;
            let piece = controller
                .sync()
                .piece_at(from)
                .map(|p| *p.id())
                .with_context(|| format!("No piece on {}", from))?;
            emitter.piece_clicked(piece);
            emitter.square_clicked(to);
            let handled = controller.process_pending()?;
            debug!(handled, "Clicks processed");
            if controller.sync().piece(piece).map(|p| *p.position()) != Some(to) {
                warn!(piece = %piece, "Piece did not reach its destination");
            }
        }
    }

    print!("{}", controller.sync().presenter().render());
    Ok(())
}

/// Loads a counter and applies one action.
#[instrument(skip(config))]
fn run_counter(config: &AppConfig, backend: Backend, action: CounterAction) -> Result<()> {
    let mut counter = open_counter(backend, config)?;
    counter.load_on_startup()?;

    if let CounterAction::Click { shift, control } = action {
        let modifier = if shift {
            Modifier::Shift
        } else if control {
            Modifier::Control
        } else {
            Modifier::None
        };
        counter.on_interaction(modifier)?;
    }

    print_counts(counter.as_ref());
    Ok(())
}

fn print_counts(counter: &dyn HitCounter) {
    let counts = counter.counts();
    println!(
        "{}: unmodified={} shift={} control={}",
        counter.backend(),
        counts.unmodified,
        counts.shift,
        counts.control
    );
}
