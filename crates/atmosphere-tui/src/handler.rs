use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),

        // Edit search
        KeyCode::Char('/') | KeyCode::Char('i') => {
            app.input_mode = InputMode::Editing;
            app.query_cursor = app.controller.query().chars().count();
        }

        // Card focus
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => {
            app.focus_next()
        }
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => {
            app.focus_prev()
        }
        KeyCode::Enter | KeyCode::Char(' ') => app.select_focused(),

        // Card actions
        KeyCode::Char('d') | KeyCode::Char('x') | KeyCode::Delete => app.delete_focused(),
        KeyCode::Char('p') | KeyCode::Char('+') => app.pin(),

        KeyCode::Char('L') | KeyCode::Char('t') => app.toggle_language(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_search();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            if app.query_cursor > 0 {
                app.query_cursor -= 1;
                let query = app.controller.query_mut();
                let byte_pos = char_to_byte_index(query, app.query_cursor);
                query.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let query = app.controller.query_mut();
            if app.query_cursor < query.chars().count() {
                let byte_pos = char_to_byte_index(query, app.query_cursor);
                query.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.query_cursor = app.query_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.controller.query().chars().count();
            app.query_cursor = (app.query_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.query_cursor = 0;
        }
        KeyCode::End => {
            app.query_cursor = app.controller.query().chars().count();
        }
        KeyCode::Char(c) => {
            let query = app.controller.query_mut();
            let byte_pos = char_to_byte_index(query, app.query_cursor);
            query.insert(byte_pos, c);
            app.query_cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let hit = app
                .card_areas
                .iter()
                .find(|(rect, _)| point_in_rect(x, y, *rect))
                .map(|(rect, id)| (*rect, id.clone()));

            if let Some((rect, id)) = hit {
                // The top-right corner of a card is its delete mark
                let on_close = y == rect.y && x + 4 >= rect.x + rect.width;
                if let Some(index) = app.controller.pinned().iter().position(|c| c.id == id) {
                    app.focused_card = index;
                }
                if on_close {
                    app.delete_focused();
                } else {
                    app.select(&id);
                }
            }
        }
        MouseEventKind::ScrollDown => app.focus_next(),
        MouseEventKind::ScrollUp => app.focus_prev(),
        _ => {}
    }
}
