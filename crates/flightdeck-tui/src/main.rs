//! Flightdeck - double-tap Shift quick launcher for the terminal.
//!
//! The TUI hosts a single editable line of text. Select some of it, tap Shift
//! twice, and pick a site from the overlay to search for the selection.

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        EventStream, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use flightdeck_core::config::{Config, Directories};
use flightdeck_core::keymap::{KeymapCache, validate};
use flightdeck_core::{JsonFileStore, Session, template};
use futures_util::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use std::io;
use std::time::Instant;

mod app;
mod cli;
mod colors;
mod host;
mod input;
mod page;
mod render;
mod watcher;

use app::App;
use cli::{Cli, Commands};
use host::TuiHost;
use page::Page;
use render::TuiRenderer;

const SAMPLE_TEXT: &str = "rust borrow checker";

/// Set up logging with file output. TUI must log to file since it uses the terminal for display.
fn setup_logging(debug_flag: bool) {
    let level = if debug_flag || cfg!(debug_assertions) {
        "debug"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_filename = format!("flightdeck-{timestamp}.log");
    let log_path = std::path::Path::new("/tmp").join(&log_filename);

    let symlink_path = std::path::Path::new("/tmp/flightdeck.log");
    let _ = std::fs::remove_file(symlink_path);
    let _ = std::os::unix::fs::symlink(&log_path, symlink_path);

    let file_appender = tracing_appender::rolling::never("/tmp", &log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    std::mem::forget(guard);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();
}

fn load_config(dirs: &Directories) -> Config {
    match Config::load(&dirs.config_file) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load config, using defaults: {e}");
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    let dirs = Directories::new().context("could not determine the config directory")?;
    dirs.ensure_exists()
        .with_context(|| format!("creating {}", dirs.config.display()))?;
    let config = load_config(&dirs);

    match cli.command {
        Some(Commands::Keymaps) => list_keymaps(&dirs),
        Some(Commands::Resolve { key, query }) => resolve_key(&dirs, &key, &query)?,
        Some(Commands::Tui) | None => run_tui(&dirs, &config).await?,
    }

    Ok(())
}

fn list_keymaps(dirs: &Directories) {
    let mut cache = KeymapCache::new(JsonFileStore::new(&dirs.keymaps_file));
    let keymap = cache.get();
    let issues = validate(&keymap);

    println!("Keymaps ({}):", dirs.keymaps_file.display());
    println!();
    for (key, entry) in keymap.iter() {
        let mark = if issues.iter().any(|i| i.key == key) {
            "!"
        } else {
            " "
        };
        println!("{mark} {key:<4} {:<20} {}", entry.label, entry.template);
    }

    if !issues.is_empty() {
        println!();
        for issue in &issues {
            println!("! {issue}");
        }
    }
}

fn resolve_key(dirs: &Directories, key: &str, query: &str) -> Result<()> {
    let mut cache = KeymapCache::new(JsonFileStore::new(&dirs.keymaps_file));
    let keymap = cache.get();
    let entry = keymap
        .get(key)
        .with_context(|| format!("no keymap entry for {key:?}"))?;
    let url = template::resolve(&entry.template, query.trim())?;
    println!("{url}");
    Ok(())
}

// Event loop with setup/teardown - key handling lives in App
async fn run_tui(dirs: &Directories, config: &Config) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;

    // Bare Shift presses are only reported with the kitty keyboard protocol
    let bare_shift = supports_keyboard_enhancement().unwrap_or(false);
    if bare_shift {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    } else {
        tracing::warn!("Terminal does not report bare modifier keys, use F2 to open the launcher");
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let host = TuiHost::new(Page::new(SAMPLE_TEXT), config.apps.browser.clone());
    let session = Session::new(
        JsonFileStore::new(&dirs.keymaps_file),
        TuiRenderer::default(),
        host,
        config.session_config(),
    );
    let mut app = App::new(session, bare_shift);
    let size = terminal.size()?;
    app.resize(size.width, size.height);

    let (keymap_tx, mut keymap_rx) = tokio::sync::mpsc::unbounded_channel();
    let _watcher = watcher::spawn_keymap_watcher(dirs.keymaps_file.clone(), keymap_tx);

    let mut event_stream = EventStream::new();
    let mut needs_render = true;

    loop {
        if needs_render {
            terminal.draw(|f| app.draw(f))?;
            needs_render = false;
        }

        let deadline = app.session.next_deadline();
        let timer = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at.into()).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            Some(event_result) = event_stream.next() => {
                let event = match event_result {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::error!("Event stream error: {}", e);
                        continue;
                    }
                };
                needs_render = app.handle_event(&event, Instant::now());
            }

            Some(keymap) = keymap_rx.recv() => {
                tracing::info!("Keymap file reloaded");
                app.session.on_keymaps_changed(keymap);
                needs_render = true;
            }

            () = timer => {
                app.session.tick(Instant::now());
                needs_render = true;
            }
        }

        if app.should_quit {
            break;
        }
    }

    app.session.teardown();

    if bare_shift {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    Ok(())
}
