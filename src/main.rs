//! Keyview - a TUI for browsing a local password vault
//!
//! The vault itself lives in a separate daemon; keyview talks to it
//! through a single command endpoint and renders the returned credential
//! snapshot as a flat list or a paginated grid.

mod api;
mod config;
mod models;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{CommandError, VaultClient};
use crate::config::Config;
use crate::models::CredentialSnapshot;
use crate::ui::{App, FetchTicket, InputMode, KeyBindings, Layout};

const DEFAULT_DAEMON_URL: &str = "http://127.0.0.1:7656";

/// Keyview - password vault TUI
#[derive(Parser, Debug)]
#[command(name = "keyview")]
#[command(about = "A terminal UI for browsing a local password vault")]
#[command(version)]
struct Args {
    /// Vault daemon command endpoint (e.g., http://127.0.0.1:7656)
    #[arg(short, long, env = "KEYVIEW_DAEMON_URL")]
    daemon: Option<String>,

    /// Rendering layout for the credential snapshot
    #[arg(short, long, value_enum)]
    layout: Option<Layout>,

    /// Use vim-style keybindings (j/k navigation)
    #[arg(long, default_value = "false")]
    vim: bool,
}

/// Completion of one spawned fetch, tagged with its submission ticket
struct FetchOutcome {
    ticket: FetchTicket,
    result: Result<CredentialSnapshot, CommandError>,
}

type FetchSender = mpsc::UnboundedSender<FetchOutcome>;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (for debugging, set RUST_LOG=debug)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let mut config = Config::load().unwrap_or_default();

    let daemon_url = args
        .daemon
        .or_else(|| config.daemon_url.clone())
        .unwrap_or_else(|| DEFAULT_DAEMON_URL.to_string());
    let layout = args.layout.or(config.layout).unwrap_or_default();
    let key_bindings = if args.vim {
        KeyBindings::Vim
    } else {
        KeyBindings::Arrows
    };

    if config.remember_daemon(&daemon_url) {
        let _ = config.save();
    }

    let client = Arc::new(VaultClient::new(&daemon_url));

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run
    let mut app = App::new(layout, key_bindings, client.daemon_url());
    let result = run_app(&mut terminal, &mut app, client).await;
    app.close();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {:?}", e);
    }

    Ok(())
}

/// Main event loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: Arc<VaultClient>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<FetchOutcome>();
    let mut revisions = app.subscribe();
    revisions.borrow_and_update();

    // First paint: empty snapshot, idle status
    terminal.draw(|f| ui::components::render(f, app))?;

    loop {
        // Apply completed fetches before deciding whether to redraw
        while let Ok(outcome) = rx.try_recv() {
            match outcome.result {
                Ok(snapshot) => app.resolve_fetch(outcome.ticket, snapshot),
                Err(e) => app.fail_fetch(outcome.ticket, e),
            }
        }

        // Redraw only when a subscriber-visible mutation happened
        if revisions.has_changed()? {
            revisions.borrow_and_update();
            terminal.draw(|f| ui::components::render(f, app))?;
        }

        // Handle events with timeout
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match app.input_mode() {
                    InputMode::Query => handle_query_mode(app, &client, &tx, key.code),
                    InputMode::Rows => handle_rows_mode(app, key.code),
                }

                if app.should_quit() {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Handle input while editing the query field
fn handle_query_mode(app: &mut App, client: &Arc<VaultClient>, tx: &FetchSender, key: KeyCode) {
    match key {
        KeyCode::Enter => submit_fetch(app, client, tx),
        KeyCode::Tab => app.enter_rows_mode(),
        KeyCode::Esc => app.quit(),
        KeyCode::Backspace => app.pop_query_char(),
        KeyCode::Char(c) => app.push_query_char(c),
        _ => {}
    }
}

/// Issue one fetch per submission event. No debounce and no
/// deduplication: rapid resubmission produces overlapping requests, and
/// the ticket decides which completion gets applied.
fn submit_fetch(app: &mut App, client: &Arc<VaultClient>, tx: &FetchSender) {
    let Some(ticket) = app.begin_fetch() else {
        return;
    };
    tracing::debug!(seq = ticket.seq(), "fetching credentials");

    let client = Arc::clone(client);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.fetch_credentials().await;
        let _ = tx.send(FetchOutcome { ticket, result });
    });
}

/// Handle input while navigating credential rows
fn handle_rows_mode(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('q') => {
            app.quit();
            return;
        }
        KeyCode::Tab | KeyCode::Esc => {
            app.enter_query_mode();
            return;
        }
        KeyCode::Char(' ') => {
            app.toggle_selected();
            return;
        }
        KeyCode::Char('y') => {
            yank_cursor_row(app);
            return;
        }
        _ => {}
    }

    if app.key_bindings.is_up(key) {
        app.move_up();
    } else if app.key_bindings.is_down(key) {
        app.move_down();
    } else if app.key_bindings.is_left(key) {
        app.prev_page();
    } else if app.key_bindings.is_right(key) {
        app.next_page();
    }
}

/// Copy the cursor row's display name to the clipboard
fn yank_cursor_row(app: &mut App) {
    let Some(row) = app.cursor_row() else {
        return;
    };
    ui::copy_with_clear(&row.name);
    app.set_notice(format!("Copied \"{}\" (clipboard clears in 10s)", row.name));
}
