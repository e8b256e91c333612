use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

const WHEEL_LINES: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Transcript scrolling works in both modes
    match key.code {
        KeyCode::PageUp => return app.viewport.page_up(),
        KeyCode::PageDown => return app.viewport.page_down(),
        KeyCode::Up if app.input_mode == InputMode::Editing => return app.viewport.scroll_up(1),
        KeyCode::Down if app.input_mode == InputMode::Editing => return app.viewport.scroll_down(1),
        _ => {}
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('i') | KeyCode::Char('a') | KeyCode::Enter | KeyCode::Tab => {
            app.input_mode = InputMode::Editing;
            app.cursor_end();
        }

        KeyCode::Char('j') | KeyCode::Down => app.viewport.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.viewport.scroll_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => app.viewport.page_down(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.viewport.page_up(),
        KeyCode::Char('g') | KeyCode::Home => app.viewport.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.viewport.scroll_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.submit_input(),
        _ if !app.input_enabled() => {}
        KeyCode::Backspace => app.delete_before_cursor(),
        KeyCode::Delete => app.delete_at_cursor(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.viewport.scroll_down(WHEEL_LINES),
        MouseEventKind::ScrollUp => app.viewport.scroll_up(WHEEL_LINES),
        _ => {}
    }
}
