//! Presentation sync
//!
//! View state derived from the conversation. [`ChatViewport`] subscribes to
//! the message log and snaps to the newest turn whenever one is appended;
//! between appends the user may scroll freely.

use tokio::sync::watch;

use crate::controller::ConversationController;
use crate::conversation::LogObserver;
use crate::state::Message;

/// Publishes the index of each appended turn.
struct ScrollFollow {
    newest: watch::Sender<usize>,
}

impl LogObserver for ScrollFollow {
    fn on_append(&mut self, index: usize, _message: &Message) {
        self.newest.send_replace(index);
    }
}

/// Scroll position of a transcript drawn into a fixed-height area.
#[derive(Debug)]
pub struct ChatViewport {
    newest: watch::Receiver<usize>,
    follow_pending: bool,
    offset: u16,
    max_offset: u16,
    height: u16,
}

impl ChatViewport {
    /// Attach to a controller's log. The first layout starts at the bottom.
    pub fn attach(controller: &mut ConversationController) -> Self {
        let (tx, rx) = watch::channel(controller.messages().len().saturating_sub(1));
        controller.subscribe(Box::new(ScrollFollow { newest: tx }));
        Self {
            newest: rx,
            follow_pending: true,
            offset: 0,
            max_offset: 0,
            height: 0,
        }
    }

    /// Record the transcript size for this frame. Applies a pending
    /// scroll-to-newest and clamps manual scrolling.
    pub fn layout(&mut self, total_lines: u16, height: u16) {
        self.height = height;
        self.max_offset = total_lines.saturating_sub(height);

        if self.newest.has_changed().unwrap_or(false) {
            self.newest.borrow_and_update();
            self.follow_pending = true;
        }

        if self.follow_pending {
            self.offset = self.max_offset;
            self.follow_pending = false;
        } else {
            self.offset = self.offset.min(self.max_offset);
        }
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.offset = self.offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.offset = self.offset.saturating_add(lines).min(self.max_offset);
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.height.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.height.max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset;
    }

    pub fn at_bottom(&self) -> bool {
        self.offset >= self.max_offset
    }
}
