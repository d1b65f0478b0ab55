//! Input handling for TUI key events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

use super::TermEvent;
use crate::app::App;
use crate::pages::Field;
use crate::tasks::Ticket;

/// Process a terminal event, returning the tasks it started.
pub fn handle_term_event(app: &mut App, event: TermEvent) -> Vec<Ticket> {
    match event {
        TermEvent::Key(key) => handle_key(app, key),
        TermEvent::Resize(_, _) => Vec::new(), // terminal auto-handles resize on next draw
    }
}

/// Route a key press: plain characters go to the focused text field,
/// everything else through the page keymap.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Vec<Ticket> {
    let typing = app.focused_field().is_some_and(Field::is_text);
    if typing {
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                app.insert_char(c);
                return Vec::new();
            }
            KeyCode::Backspace => {
                app.delete_char();
                return Vec::new();
            }
            _ => {}
        }
    }
    match app.keymap.lookup(key) {
        Some(command) => {
            trace!(?command, "Key command");
            app.execute(command)
        }
        None => Vec::new(),
    }
}
