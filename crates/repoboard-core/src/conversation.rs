//! Append-only message log

use crate::state::Message;

/// Notified after every append, on the thread doing the append.
pub trait LogObserver: Send {
    fn on_append(&mut self, index: usize, message: &Message);
}

/// Ordered conversation turns. Entries are never edited, removed or reordered.
#[derive(Default)]
pub struct Conversation {
    messages: Vec<Message>,
    observers: Vec<Box<dyn LogObserver>>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log holding only the greeting turn.
    pub fn seeded() -> Self {
        let mut log = Self::new();
        log.append(Message::greeting());
        log
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        let index = self.messages.len() - 1;
        let message = &self.messages[index];
        for observer in &mut self.observers {
            observer.on_append(index, message);
        }
    }

    /// Register an observer. Turns already in the log are not replayed.
    pub fn subscribe(&mut self, observer: Box<dyn LogObserver>) {
        self.observers.push(observer);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("messages", &self.messages)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Role;
    use std::sync::{Arc, Mutex};

    struct Recorder(Arc<Mutex<Vec<(usize, Role)>>>);

    impl LogObserver for Recorder {
        fn on_append(&mut self, index: usize, message: &Message) {
            self.0.lock().unwrap().push((index, message.role()));
        }
    }

    #[test]
    fn test_seeded_log_has_greeting() {
        let log = Conversation::seeded();
        assert_eq!(log.len(), 1);
        assert_eq!(log.messages()[0].role(), Role::Assistant);
    }

    #[test]
    fn test_append_keeps_order_and_notifies() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut log = Conversation::seeded();
        log.subscribe(Box::new(Recorder(seen.clone())));

        log.append(Message::user("hello"));
        log.append(Message::assistant("hi", None));

        assert_eq!(log.len(), 3);
        assert_eq!(log.messages()[1].text(), "hello");
        assert_eq!(log.last().map(|m| m.text()), Some("hi"));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(1, Role::User), (2, Role::Assistant)]
        );
    }
}
