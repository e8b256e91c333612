use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use repoboard_core::{Message, RepoResult, Role};

use crate::app::{App, InputMode};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" 💬 Chat with RepoBoard AI ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!(" {} ", app.endpoint), Style::default().fg(Color::Gray)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let lines = transcript_lines(
        app.controller.messages(),
        app.controller.is_awaiting(),
        app.animation_frame,
    );

    // Inner size minus borders
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);

    // Measure with the same wrapping the transcript is drawn with
    let transcript = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    let total = u16::try_from(transcript.line_count(inner_width)).unwrap_or(u16::MAX);
    app.viewport.layout(total, inner_height);

    let title = if app.viewport.at_bottom() {
        " Ask me anything about GitHub repositories! ".to_string()
    } else {
        " Scrolled back (G for newest) ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    let chat = transcript.block(block).scroll((app.viewport.offset(), 0));

    frame.render_widget(chat, area);
}

/// Transcript rows for the log, plus the thinking indicator while a reply
/// is pending. The indicator is drawn here only; it never enters the log.
pub fn transcript_lines(messages: &[Message], awaiting: bool, animation_frame: u8) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in messages {
        lines.push(role_line(msg.role()));

        let text_style = if msg.is_error() {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        for line in msg.lines() {
            lines.push(Line::from(Span::styled(line.to_string(), text_style)));
        }

        if let Some(repos) = msg.repos() {
            push_repo_results(&mut lines, repos);
        }
        lines.push(Line::default());
    }

    if awaiting {
        lines.push(role_line(Role::Assistant));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat(usize::from(animation_frame) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn role_line(role: Role) -> Line<'static> {
    match role {
        Role::User => Line::from(Span::styled(
            "You:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Role::Assistant => Line::from(Span::styled(
            "RepoBoard:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    }
}

fn push_repo_results(lines: &mut Vec<Line<'static>>, repos: &[RepoResult]) {
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Found Repositories:",
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
    )));

    for item in repos {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                item.repo.full_name.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", item.repo.url),
            Style::default().fg(Color::DarkGray),
        )));

        let blurb = match (&item.summary, &item.repo.description) {
            (Some(summary), _) => Some(summary.text.as_str()),
            (None, Some(description)) => Some(description.as_str()),
            (None, None) => None,
        };
        if let Some(blurb) = blurb {
            lines.push(Line::from(format!("  {}", blurb)));
        }

        let mut stats = vec![Span::styled(
            format!("  ★ {}", item.repo.star_count),
            Style::default().fg(Color::Yellow),
        )];
        if let Some(summary) = &item.summary {
            stats.push(Span::styled(
                format!("  {}", summary.category),
                Style::default().fg(Color::Green),
            ));
            if !summary.tags.is_empty() {
                let tags: Vec<String> = summary.tags.iter().map(|t| format!("#{}", t)).collect();
                stats.push(Span::styled(
                    format!("  {}", tags.join(" ")),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }
        lines.push(Line::from(stats));
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let enabled = app.input_enabled();
    let editing = app.input_mode == InputMode::Editing;

    let border_color = if !enabled {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Gray
    };
    let title = if enabled {
        " Ask me about repositories... (e.g., 'Find Python libraries') "
    } else {
        " Waiting for reply... "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width > 0 && app.cursor >= inner_width {
        app.cursor - inner_width + 1
    } else {
        0
    };
    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let text_color = if enabled { Color::Cyan } else { Color::DarkGray };
    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(text_color))
        .block(block);
    frame.render_widget(input, area);

    if editing && enabled {
        let cursor_x = (app.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" CHAT ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" INPUT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints: &[(&str, &str)] = match app.input_mode {
        InputMode::Editing => &[(" Enter ", " send "), (" ↑/↓ ", " scroll "), (" Esc ", " stop typing ")],
        InputMode::Normal => &[
            (" j/k ", " scroll "),
            (" g/G ", " top/newest "),
            (" i ", " type "),
            (" q ", " quit "),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::styled(" ", label_style)];
    for (key, label) in hints {
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(*label, label_style));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ratatui::{backend::TestBackend, Terminal};
    use repoboard_core::service::{ChatError, ChatReply};
    use repoboard_core::{ChatService, Repo, RepoSummary};
    use std::sync::Arc;

    struct Reply(String);

    #[async_trait]
    impl ChatService for Reply {
        async fn send(&self, _message: &str) -> Result<ChatReply, ChatError> {
            Ok(ChatReply {
                text: self.0.clone(),
                repos: None,
            })
        }
    }

    fn screen_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    fn plain(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    fn repo(name: &str, summary: Option<RepoSummary>) -> RepoResult {
        RepoResult {
            repo: Repo {
                url: format!("https://github.com/{}", name),
                full_name: name.to_string(),
                star_count: 10,
                description: Some("fallback description".to_string()),
            },
            summary,
        }
    }

    #[test]
    fn test_thinking_indicator_follows_last_message() {
        let messages = vec![Message::greeting(), Message::user("Find Python libraries")];

        let idle = plain(&transcript_lines(&messages, false, 0));
        assert!(!idle.iter().any(|l| l.starts_with("Thinking")));

        let busy = plain(&transcript_lines(&messages, true, 2));
        assert_eq!(busy[busy.len() - 2], "RepoBoard:");
        assert_eq!(busy[busy.len() - 1], "Thinking...");
    }

    #[test]
    fn test_repo_results_section() {
        let messages = vec![Message::assistant(
            "Here are some:",
            Some(vec![
                repo(
                    "a/b",
                    Some(RepoSummary {
                        text: "desc".to_string(),
                        category: "lib".to_string(),
                        tags: vec!["python".to_string()],
                    }),
                ),
                repo("c/d", None),
            ]),
        )];

        let text = plain(&transcript_lines(&messages, false, 0));
        assert!(text.contains(&"Found Repositories:".to_string()));
        assert!(text.contains(&"  a/b".to_string()));
        assert!(text.contains(&"  desc".to_string()));
        assert!(text.contains(&"  ★ 10  lib  #python".to_string()));
        assert!(text.contains(&"  c/d".to_string()));
        assert!(text.contains(&"  fallback description".to_string()));
        assert!(text.contains(&"  ★ 10".to_string()));
    }

    #[test]
    fn test_no_results_section_without_repos() {
        let messages = vec![Message::assistant("Nothing found", Some(Vec::new())), Message::error()];

        let text = plain(&transcript_lines(&messages, false, 0));
        assert!(!text.iter().any(|l| l == "Found Repositories:"));
        assert!(text.iter().any(|l| l.starts_with("Sorry, I encountered an error.")));
    }

    #[test]
    fn test_multiline_content_gets_one_row_per_line() {
        let messages = vec![Message::assistant("one\n\nthree", None)];
        let text = plain(&transcript_lines(&messages, false, 0));
        assert_eq!(text, vec!["RepoBoard:", "one", "", "three", ""]);
    }

    #[tokio::test]
    async fn test_newest_turn_visible_after_word_wrapped_reply() {
        // Each row wraps at word boundaries into three rows at this width
        let mut text = vec!["aaaaaaaaa bbbbbbbbb ccccccccc"; 12].join("\n");
        text.push_str("\nNEWEST_MARKER");
        let mut app = App::new(Arc::new(Reply(text)), "http://localhost:8000/chat");

        app.input = "show me".to_string();
        app.submit_input();
        app.controller.settle().await;

        let mut terminal = Terminal::new(TestBackend::new(18, 20)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let rows = screen_rows(&terminal);
        assert!(
            rows.iter().any(|row| row.contains("NEWEST_MARKER")),
            "newest turn is off-screen:\n{}",
            rows.join("\n")
        );
        assert!(app.viewport.at_bottom());
    }

    #[test]
    fn test_wrapped_height_counts_word_wrapping() {
        let lines = vec![Line::from("aaaaaaaaa bbbbbbbbb ccccccccc")];
        let transcript = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
        assert_eq!(transcript.line_count(16), 3);
    }
}
