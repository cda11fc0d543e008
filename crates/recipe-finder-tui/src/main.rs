//! Recipe Finder - a terminal recipe search with local favorites.
//!
//! Searches recipes by ingredient, keeps a list of favorites on disk and
//! can pre-cache the web front end's static assets for offline use.

mod app;
mod commands;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use recipe_finder_core::Config;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name inside the log directory (rotated daily)
const LOG_FILE_PREFIX: &str = "recipe-finder.log";

/// Initialize the tracing subscriber.
///
/// The TUI owns the terminal, so log lines go to a file under the log
/// directory. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = match config.log_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            return None;
        }
    };
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Logging disabled: cannot create {}: {}", log_dir.display(), e);
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

fn load_config() -> Config {
    match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config, using defaults: {:#}", e);
            let mut config = Config::default();
            config.apply_env(|name| std::env::var(name).ok());
            config
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = load_config();
    let _guard = init_tracing(&config);

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--install-assets") => return commands::install_assets(&config).await,
        Some("--fetch") => {
            let path = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Usage: recipe-finder --fetch <path>"))?;
            return commands::fetch(&config, path).await;
        }
        Some("--help") | Some("-h") => {
            commands::print_usage();
            return Ok(());
        }
        Some(other) => {
            commands::print_usage();
            anyhow::bail!("Unknown argument: {}", other);
        }
        None => {}
    }

    info!("Recipe Finder starting");

    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        warn!(error = %e, "Exited with error");
        eprintln!("Error: {}", e);
    }

    info!("Recipe Finder shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Yield so the search task can make progress on this worker
        tokio::task::yield_now().await;

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
