//! Two-thread TUI orchestration.
//!
//! Terminal I/O runs on a dedicated OS thread; network work runs as tokio
//! tasks. Both report back to the main loop over `tokio::sync::mpsc`
//! channels, and the loop applies their results in arrival order.

mod input;

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::app::App;
use crate::tasks::{Settled, Ticket};
use crate::view;

pub use input::{handle_key, handle_term_event};

/// Terminal events forwarded from the UI reader thread.
pub enum TermEvent {
    Key(crossterm::event::KeyEvent),
    Resize(u16, u16),
}

/// Spawn `tasks` against `api`; outcomes arrive on `tx`.
fn spawn_tasks(
    api: &ApiClient,
    tx: &mpsc::Sender<Settled>,
    app: &mut App,
    tickets: Vec<Ticket>,
) {
    for ticket in tickets {
        app.pending += 1;
        debug!(task = ticket.task.name(), mount = ticket.mount, "Spawning task");
        let api = api.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let settled = ticket.run(&api).await;
            // The loop is gone once the user quit; nothing left to update.
            let _ = tx.send(settled).await;
        });
    }
}

/// Run the interactive TUI until the user quits.
pub async fn run(api: ApiClient, mut app: App, initial: Vec<Ticket>) -> anyhow::Result<()> {
    // 1. Enter raw mode, create terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 2. Channels + cancellation token
    let cancel = CancellationToken::new();
    let (term_tx, mut term_rx) = mpsc::channel::<TermEvent>(64);
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<Settled>(64);

    // 3. Spawn dedicated OS thread for crossterm::event::read()
    let cancel_clone = cancel.clone();
    let ui_thread = std::thread::spawn(move || {
        loop {
            if cancel_clone.is_cancelled() {
                break;
            }
            // Poll with 50ms timeout so we can check cancellation
            if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                match event::read() {
                    Ok(Event::Key(key)) => {
                        // Windows emits Press + Release per keystroke
                        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                            continue;
                        }
                        if term_tx.blocking_send(TermEvent::Key(key)).is_err() {
                            break;
                        }
                    }
                    Ok(Event::Resize(w, h)) => {
                        if term_tx.blocking_send(TermEvent::Resize(w, h)).is_err() {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
    });

    // 4. First load of the mounted page
    info!(page = app.route().path(), "TUI started");
    spawn_tasks(&api, &outcome_tx, &mut app, initial);
    let mut tick = tokio::time::interval(Duration::from_millis(50));

    let result: anyhow::Result<()> = loop {
        tokio::select! {
            _ = tick.tick() => {
                let due = app.tick(Instant::now());
                spawn_tasks(&api, &outcome_tx, &mut app, due);
                if let Err(e) = terminal.draw(|f| view::draw(f, &app)) {
                    break Err(e.into());
                }
            }
            Some(term_event) = term_rx.recv() => {
                let tasks = input::handle_term_event(&mut app, term_event);
                spawn_tasks(&api, &outcome_tx, &mut app, tasks);
            }
            Some(settled) = outcome_rx.recv() => {
                let tasks = app.handle_outcome(settled);
                spawn_tasks(&api, &outcome_tx, &mut app, tasks);
            }
        }
        if app.should_quit {
            break Ok(());
        }
    };

    // 5. Shutdown: signal UI thread to stop
    cancel.cancel();
    let _ = ui_thread.join(); // fast: <50ms due to poll timeout
    drop(outcome_rx);

    // 6. Restore terminal
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    info!(pending = app.pending, "TUI stopped");
    result
}
