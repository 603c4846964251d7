use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::time::Duration;

use crate::app::{Action, App, Screen};

/// Poll for keyboard events with timeout
pub fn poll_event(timeout_ms: u64) -> anyhow::Result<Option<Event>> {
    if event::poll(Duration::from_millis(timeout_ms))? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle terminal input. Returns the action to run when a fetch may be needed.
pub fn handle_event(app: &mut App, event: Event) -> Option<Action> {
    let Event::Key(key) = event else {
        // Resize handled by ratatui automatically
        return None;
    };

    // Only handle key press events (not release)
    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Keys are ignored while a fetch is in flight
    if app.is_loading() {
        return None;
    }

    match &app.screen {
        Screen::Viewer => handle_viewer(app, key.code),
        Screen::OpenDocument => handle_open_document(app, key.code),
        Screen::Message(_, _) => {
            // Any key dismisses the message
            app.go_back();
            None
        }
    }
}

fn handle_viewer(app: &mut App, code: KeyCode) -> Option<Action> {
    let navigable = app.cursor.shows_navigation();

    match code {
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') if navigable => Some(Action::Next),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p')
            if navigable && app.cursor.can_go_previous() =>
        {
            Some(Action::Previous)
        }
        KeyCode::Home | KeyCode::Char('g') if navigable => Some(Action::First),
        KeyCode::End | KeyCode::Char('G') if navigable => Some(Action::Last),
        KeyCode::Tab if app.documents.len() > 1 => Some(Action::NextDocument),
        KeyCode::BackTab if app.documents.len() > 1 => Some(Action::PreviousDocument),
        KeyCode::Char('r') => app.selected.map(|_| Action::First),
        KeyCode::Char('o') => {
            app.open_prompt();
            None
        }
        KeyCode::Char('m') => {
            app.toggle_display_mode();
            None
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
            None
        }
        _ => None,
    }
}

fn handle_open_document(app: &mut App, code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char(c) => {
            app.input.push(c);
            None
        }
        KeyCode::Backspace => {
            app.input.pop();
            None
        }
        KeyCode::Enter => app.submit_prompt(),
        KeyCode::Esc => {
            app.go_back();
            None
        }
        _ => None,
    }
}
