//! The chat service boundary
//!
//! [`ChatService`] is what the controller talks to. The wire structs here
//! mirror the service's JSON; [`parse_reply`] turns a response body into a
//! [`ChatReply`] or a contract error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::{Repo, RepoResult, RepoSummary};

/// Everything that can go wrong during one exchange.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chat service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("unexpected response body: {0}")]
    Contract(#[from] serde_json::Error),

    #[error("chat request did not complete: {0}")]
    Interrupted(String),
}

/// A well-formed reply from the service.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub repos: Option<Vec<RepoResult>>,
}

#[async_trait]
pub trait ChatService: Send + Sync {
    async fn send(&self, message: &str) -> Result<ChatReply, ChatError>;
}

#[derive(Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
    #[serde(default)]
    repos: Option<Vec<WireRepoResult>>,
}

#[derive(Deserialize)]
struct WireRepoResult {
    repo: WireRepo,
    #[serde(default)]
    summary: Option<WireSummary>,
}

#[derive(Deserialize)]
struct WireRepo {
    url: String,
    full_name: String,
    stars: u64,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct WireSummary {
    summary: String,
    category: String,
    #[serde(default)]
    tags: Vec<String>,
}

impl From<WireRepoResult> for RepoResult {
    fn from(wire: WireRepoResult) -> Self {
        RepoResult {
            repo: Repo {
                url: wire.repo.url,
                full_name: wire.repo.full_name,
                star_count: wire.repo.stars,
                description: wire.repo.description,
            },
            summary: wire.summary.map(|s| RepoSummary {
                text: s.summary,
                category: s.category,
                tags: s.tags,
            }),
        }
    }
}

/// Parse a response body. Anything other than the expected shape is a
/// [`ChatError::Contract`].
pub fn parse_reply(body: &str) -> Result<ChatReply, ChatError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    Ok(ChatReply {
        text: response.response,
        repos: response
            .repos
            .map(|repos| repos.into_iter().map(RepoResult::from).collect()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_with_repos() {
        let body = r#"{
            "response": "Here are some:",
            "repos": [
                {"repo": {"url": "https://x", "full_name": "a/b", "stars": 10},
                 "summary": {"summary": "desc", "category": "lib"}},
                {"repo": {"url": "https://y", "full_name": "c/d", "stars": 3}}
            ]
        }"#;

        let reply = parse_reply(body).unwrap();
        assert_eq!(reply.text, "Here are some:");

        let repos = reply.repos.unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].repo.full_name, "a/b");
        assert_eq!(repos[0].repo.star_count, 10);
        let summary = repos[0].summary.as_ref().unwrap();
        assert_eq!(summary.text, "desc");
        assert_eq!(summary.category, "lib");
        assert!(summary.tags.is_empty());
        assert_eq!(repos[1].repo.full_name, "c/d");
        assert!(repos[1].summary.is_none());
    }

    #[test]
    fn test_parse_reply_without_repos() {
        let reply = parse_reply(r#"{"response": "Hello!"}"#).unwrap();
        assert_eq!(reply.text, "Hello!");
        assert!(reply.repos.is_none());

        let reply = parse_reply(r#"{"response": "Hello!", "repos": null}"#).unwrap();
        assert!(reply.repos.is_none());
    }

    #[test]
    fn test_parse_reply_ignores_extra_fields() {
        let body = r#"{
            "response": "ok",
            "repos": [{
                "repo": {"url": "https://x", "full_name": "a/b", "stars": 1,
                         "description": "A thing", "forks": 4, "topics": ["x"]},
                "summary": {"summary": "s", "category": "tool", "tags": ["cli", "rust"],
                            "skill_level": "beginner"}
            }]
        }"#;

        let repos = parse_reply(body).unwrap().repos.unwrap();
        assert_eq!(repos[0].repo.description.as_deref(), Some("A thing"));
        assert_eq!(repos[0].summary.as_ref().unwrap().tags, vec!["cli", "rust"]);
    }

    #[test]
    fn test_parse_reply_rejects_malformed_bodies() {
        for body in [
            "not json",
            "{}",
            r#"{"response": 42}"#,
            r#"{"response": "x", "repos": [{"repo": {"url": "u"}}]}"#,
            r#"{"response": "x", "repos": [{"repo": {"url": "u", "full_name": "a/b", "stars": -1}}]}"#,
        ] {
            let err = parse_reply(body).unwrap_err();
            assert!(matches!(err, ChatError::Contract(_)), "body {body:?} gave {err}");
        }
    }
}
