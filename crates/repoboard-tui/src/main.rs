use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use repoboard_core::{Config, ConfigError, ConversationController, HttpChatService, Message, Role};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

const TICK_RATE: Duration = Duration::from_millis(300);

#[derive(Parser)]
#[command(name = "repoboard")]
#[command(about = "Discover GitHub repositories by chatting with RepoBoard AI")]
struct Cli {
    /// Chat endpoint of the RepoBoard API
    #[arg(long, env = "REPOBOARD_ENDPOINT")]
    endpoint: Option<String>,

    /// Give up on a reply after this many seconds (default: wait indefinitely)
    #[arg(long)]
    timeout: Option<u64>,

    /// Write the effective endpoint and timeout to the config file
    #[arg(long)]
    save_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the reply
    Ask {
        /// Your question
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = resolve_config(Config::load(), cli.save_config)?;
    let config = config.with_overrides(cli.endpoint, cli.timeout);

    match &cli.command {
        Some(Commands::Ask { .. }) => init_stderr_logging(),
        None => init_file_logging(config.log_file().as_deref()),
    }
    if let Some(err) = config_error {
        tracing::warn!(error = %err, "ignoring unreadable config file");
    }

    if cli.save_config {
        let path = config.save()?;
        println!("Saved config to {}", path.display());
    }

    let service = HttpChatService::new(config.endpoint(), config.request_timeout())
        .context("failed to build HTTP client")?;
    tracing::info!(endpoint = service.endpoint(), timeout = ?config.request_timeout(), "starting");

    match cli.command {
        Some(Commands::Ask { message }) => ask(Arc::new(service), &message).await,
        None => run_tui(Arc::new(service)).await,
    }
}

/// An unreadable config file falls back to defaults, unless the caller is
/// about to save over it.
fn resolve_config(
    loaded: std::result::Result<Config, ConfigError>,
    save_config: bool,
) -> Result<(Config, Option<ConfigError>)> {
    match loaded {
        Ok(config) => Ok((config, None)),
        Err(err) if save_config => {
            Err(err).context("refusing to overwrite a config file that could not be read")
        }
        Err(err) => Ok((Config::new(), Some(err))),
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn"))
        .with_writer(std::io::stderr)
        .init();
}

/// The terminal owns stderr while the UI runs, so logs go to a file. Without
/// a usable path logging stays off.
fn init_file_logging(path: Option<&Path>) {
    let Some(path) = path else {
        return;
    };

    let file = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(path));

    if let Ok(file) = file {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter("repoboard=info,repoboard_core=info"))
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }
}

async fn run_tui(service: Arc<HttpChatService>) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(TICK_RATE);
    let endpoint = service.endpoint().to_string();
    let mut app = App::new(service, endpoint);

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_app(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            event = events.next() => match event {
                Some(event) => handler::handle_event(app, event),
                None => break,
            },
            () = app.controller.settle(), if app.controller.is_awaiting() => {}
        }
    }
    Ok(())
}

async fn ask(service: Arc<HttpChatService>, message: &str) -> Result<()> {
    let mut controller = ConversationController::new(service);
    if !controller.submit(message) {
        bail!("nothing to send: message is blank");
    }
    controller.settle().await;

    // Skip the greeting
    for msg in controller.messages().iter().skip(1) {
        print!("{}", format_turn(msg));
    }

    match controller.messages().last() {
        Some(last) if last.is_error() => bail!("chat request failed"),
        _ => Ok(()),
    }
}

fn format_turn(msg: &Message) -> String {
    let mut out = String::new();
    out.push_str(match msg.role() {
        Role::User => "You:\n",
        Role::Assistant => "RepoBoard:\n",
    });
    for line in msg.lines() {
        out.push_str(line);
        out.push('\n');
    }

    if let Some(repos) = msg.repos() {
        out.push_str("\nFound Repositories:\n");
        for item in repos {
            out.push_str(&format!("  {} ({})\n", item.repo.full_name, item.repo.url));
            match (&item.summary, &item.repo.description) {
                (Some(summary), _) => {
                    out.push_str(&format!("    {}\n", summary.text));
                    out.push_str(&format!("    ★ {}  {}\n", item.repo.star_count, summary.category));
                }
                (None, Some(description)) => {
                    out.push_str(&format!("    {}\n", description));
                    out.push_str(&format!("    ★ {}\n", item.repo.star_count));
                }
                (None, None) => out.push_str(&format!("    ★ {}\n", item.repo.star_count)),
            }
        }
    }

    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use repoboard_core::{Repo, RepoResult, RepoSummary};

    #[test]
    fn test_format_turn_with_repos() {
        let msg = Message::assistant(
            "Here are some:",
            Some(vec![
                RepoResult {
                    repo: Repo {
                        url: "https://x".to_string(),
                        full_name: "a/b".to_string(),
                        star_count: 10,
                        description: None,
                    },
                    summary: Some(RepoSummary {
                        text: "desc".to_string(),
                        category: "lib".to_string(),
                        tags: Vec::new(),
                    }),
                },
                RepoResult {
                    repo: Repo {
                        url: "https://y".to_string(),
                        full_name: "c/d".to_string(),
                        star_count: 3,
                        description: None,
                    },
                    summary: None,
                },
            ]),
        );

        assert_eq!(
            format_turn(&msg),
            "RepoBoard:\nHere are some:\n\nFound Repositories:\n  a/b (https://x)\n    desc\n    ★ 10  lib\n  c/d (https://y)\n    ★ 3\n\n"
        );
    }

    #[test]
    fn test_format_user_turn() {
        assert_eq!(format_turn(&Message::user("hi")), "You:\nhi\n\n");
    }

    #[test]
    fn test_cli_parses_ask() {
        let cli = Cli::try_parse_from(["repoboard", "--timeout", "30", "ask", "Find Python libraries"]).unwrap();
        assert_eq!(cli.timeout, Some(30));
        assert!(matches!(cli.command, Some(Commands::Ask { ref message }) if message == "Find Python libraries"));
    }

    #[test]
    fn test_unreadable_config_falls_back_to_defaults() {
        let (config, error) = resolve_config(Err(ConfigError::NoConfigDir), false).unwrap();
        assert_eq!(config.endpoint(), Config::new().endpoint());
        assert!(matches!(error, Some(ConfigError::NoConfigDir)));
    }

    #[test]
    fn test_save_config_refuses_unreadable_file() {
        let err = resolve_config(Err(ConfigError::NoConfigDir), true).unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));
    }

    #[test]
    fn test_readable_config_is_kept_when_saving() {
        let loaded = Config::new().with_overrides(Some("http://example.test/chat".to_string()), None);
        let (config, error) = resolve_config(Ok(loaded), true).unwrap();
        assert_eq!(config.endpoint(), "http://example.test/chat");
        assert!(error.is_none());
    }
}
