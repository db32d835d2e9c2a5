//! Console output formatter for sessions and messages

use chrono::{DateTime, Local};
use colored::Colorize;
use parley_domain::util::preview;
use parley_domain::{ArticleCard, ErrorInfo, Message, MessageStatus, Role, Session};

/// Formats chat state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Numbered session list, most recent first. The number is what
    /// `/switch` and `/delete` accept.
    pub fn session_list(sessions: &[Session], active_id: Option<&str>) -> String {
        if sessions.is_empty() {
            return format!("{}\n", "No sessions yet.".dimmed());
        }

        let mut output = String::new();
        for (index, session) in sessions.iter().enumerate() {
            let marker = if Some(session.id.as_str()) == active_id {
                "*".green().bold().to_string()
            } else {
                " ".to_string()
            };
            output.push_str(&format!(
                "{} {:>2}. {}  {}\n",
                marker,
                index + 1,
                session.title.bold(),
                format!(
                    "({} messages, {})",
                    session.messages.len(),
                    Self::timestamp(session.updated_at)
                )
                .dimmed()
            ));
        }
        output
    }

    /// Full transcript of a session
    pub fn transcript(session: &Session) -> String {
        let mut output = Self::header(&session.title);
        output.push('\n');
        if session.messages.is_empty() {
            output.push_str(&format!("{}\n", "(empty)".dimmed()));
        }
        for message in &session.messages {
            output.push_str(&Self::message(message));
            output.push('\n');
        }
        output
    }

    pub fn message(message: &Message) -> String {
        let mut output = format!("{}\n", Self::role_label(message.role));
        match message.status {
            MessageStatus::Loading if message.content.is_empty() => {
                output.push_str(&format!("{}\n", "...".dimmed()));
            }
            _ if !message.content.is_empty() => {
                output.push_str(&message.content);
                output.push('\n');
            }
            _ => {}
        }
        if let Some(card) = &message.card_data {
            output.push_str(&Self::card(card));
        }
        if message.status == MessageStatus::Error {
            let fallback = ErrorInfo::new("Reply failed");
            output.push_str(&Self::error(message.error_info.as_ref().unwrap_or(&fallback)));
        }
        output
    }

    pub fn role_label(role: Role) -> String {
        match role {
            Role::User => "you ›".cyan().bold().to_string(),
            Role::Assistant => "assistant ›".magenta().bold().to_string(),
        }
    }

    pub fn card(card: &ArticleCard) -> String {
        let mut output = format!("  {} {}\n", "▌".yellow(), card.title.bold());
        output.push_str(&format!("  {} {}\n", "▌".yellow(), card.description));
        output.push_str(&format!("  {} {}\n", "▌".yellow(), card.url.underline().blue()));
        output
    }

    pub fn error(info: &ErrorInfo) -> String {
        let code = info
            .code
            .as_deref()
            .map(|c| format!(" [{}]", c))
            .unwrap_or_default();
        let mut output = format!("{} {}{}\n", "x".red().bold(), info.message.red(), code.dimmed());
        if info.retryable {
            output.push_str(&format!("  {}\n", "Type /retry to try again".dimmed()));
        }
        output
    }

    /// One-line summary used when switching sessions
    pub fn session_summary(session: &Session) -> String {
        let last = session
            .last_message()
            .map(|m| preview(&m.content, 50))
            .unwrap_or_default();
        format!("{} {}", session.title.bold(), last.dimmed())
    }

    fn header(title: &str) -> String {
        let line = "─".repeat(title.chars().count().clamp(12, 60) + 4);
        format!("{}\n  {}\n{}", line.dimmed(), title.bold(), line.dimmed())
    }

    fn timestamp(millis: i64) -> String {
        DateTime::from_timestamp_millis(millis)
            .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_domain::{MessagePatch, NewMessage};

    fn session(id: &str, title: &str, messages: usize) -> Session {
        let mut session = Session::new(id);
        session.title = title.to_string();
        for i in 0..messages {
            session
                .messages
                .push(NewMessage::user(format!("m{i}")).into_message(format!("{id}-{i}")));
        }
        session
    }

    #[test]
    fn session_list_numbers_and_marks_active() {
        let sessions = vec![session("a", "Rust questions", 2), session("b", "Lunch", 0)];
        let output = ConsoleFormatter::session_list(&sessions, Some("b"));
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" 1. "));
        assert!(lines[0].contains("Rust questions"));
        assert!(lines[0].contains("2 messages"));
        assert!(lines[1].contains(" 2. "));
        assert!(lines[1].contains('*'));
        assert!(!lines[0].contains('*'));
    }

    #[test]
    fn empty_session_list_says_so() {
        assert!(ConsoleFormatter::session_list(&[], None).contains("No sessions yet."));
    }

    #[test]
    fn failed_message_shows_error_and_retry_hint() {
        let mut message = NewMessage::assistant_placeholder().into_message("x".into());
        message.apply(MessagePatch::new().error(ErrorInfo::new("Too many requests").with_code("RATE_LIMIT")));
        let output = ConsoleFormatter::message(&message);
        assert!(output.contains("Too many requests"));
        assert!(output.contains("RATE_LIMIT"));
        assert!(output.contains("/retry"));
    }

    #[test]
    fn card_lists_title_and_url() {
        let card = ArticleCard {
            title: "Modern CSS layout".into(),
            description: "Grid and flexbox".into(),
            image: None,
            url: "https://example.com/css".into(),
        };
        let output = ConsoleFormatter::card(&card);
        assert!(output.contains("Modern CSS layout"));
        assert!(output.contains("https://example.com/css"));
    }

    #[test]
    fn transcript_includes_every_message() {
        let output = ConsoleFormatter::transcript(&session("s", "Chat", 3));
        for i in 0..3 {
            assert!(output.contains(&format!("m{i}")));
        }
    }
}
