use std::sync::Arc;

use ratatui::layout::Rect;
use repoboard_core::{ChatService, ChatViewport, ConversationController};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Message being composed
    pub input: String,
    pub cursor: usize, // char index into input

    pub controller: ConversationController,
    pub viewport: ChatViewport,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub endpoint: String,

    // Updated during render for mouse hit-testing
    pub chat_area: Option<Rect>,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl App {
    pub fn new(service: Arc<dyn ChatService>, endpoint: impl Into<String>) -> Self {
        let mut controller = ConversationController::new(service);
        let viewport = ChatViewport::attach(&mut controller);

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            input: String::new(),
            cursor: 0,
            controller,
            viewport,
            animation_frame: 0,
            endpoint: endpoint.into(),
            chat_area: None,
        }
    }

    /// Hand the composed message to the controller. The input is only
    /// cleared when the controller took it.
    pub fn submit_input(&mut self) {
        if self.controller.submit(&self.input) {
            self.input.clear();
            self.cursor = 0;
        }
    }

    /// Editing is disabled while a reply is pending.
    pub fn input_enabled(&self) -> bool {
        !self.controller.is_awaiting()
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete_at_cursor(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.controller.is_awaiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        } else {
            self.animation_frame = 0;
        }
    }
}
