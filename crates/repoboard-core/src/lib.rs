pub mod client;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod service;
pub mod state;
pub mod sync;

// Re-export main types for convenience
pub use client::HttpChatService;
pub use config::{Config, ConfigError};
pub use controller::{ConversationController, RequestState};
pub use conversation::{Conversation, LogObserver};
pub use service::{ChatError, ChatReply, ChatService};
pub use state::{Message, Repo, RepoResult, RepoSummary, Role};
pub use sync::ChatViewport;
