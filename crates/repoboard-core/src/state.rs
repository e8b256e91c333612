//! UI-agnostic conversation types
//!
//! These are the turns the message log stores and every front end renders.
//! They carry no terminal or widget types.

use serde::{Deserialize, Serialize};

/// Text shown when a request fails for any reason.
pub const ERROR_TEXT: &str =
    "Sorry, I encountered an error. Please try again or use the search feature.";

/// Seeded first turn of every conversation.
pub const GREETING_TEXT: &str = "👋 Hi! I'm RepoBoard AI. I can help you discover GitHub repositories!\n\nTry asking me:\n• \"Find Python libraries\"\n• \"Show me trending repos\"\n• \"What machine learning tools are there?\"\n• \"Search for React frameworks\"";

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    text: String,
    repos: Option<Vec<RepoResult>>,
    is_error: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            repos: None,
            is_error: false,
        }
    }

    /// An assistant turn. An empty result list is stored as no results.
    pub fn assistant(text: impl Into<String>, repos: Option<Vec<RepoResult>>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            repos: repos.filter(|r| !r.is_empty()),
            is_error: false,
        }
    }

    /// The synthetic turn standing in for a failed exchange.
    pub fn error() -> Self {
        Self {
            role: Role::Assistant,
            text: ERROR_TEXT.to_string(),
            repos: None,
            is_error: true,
        }
    }

    pub fn greeting() -> Self {
        Self::assistant(GREETING_TEXT, None)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Content split on line breaks. Blank lines are kept.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// Repository matches, `None` when the turn carried no results.
    pub fn repos(&self) -> Option<&[RepoResult]> {
        self.repos.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// One repository match returned by the chat service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoResult {
    pub repo: Repo,
    pub summary: Option<RepoSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    pub url: String,
    pub full_name: String,
    pub star_count: u64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub text: String,
    pub category: String,
    pub tags: Vec<String>,
}
