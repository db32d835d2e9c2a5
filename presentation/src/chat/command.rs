//! Slash command parsing for the chat REPL

/// A session given by list number (1-based) or by identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRef {
    Index(usize),
    Id(String),
}

impl SessionRef {
    fn parse(arg: &str) -> Self {
        match arg.parse::<usize>() {
            Ok(n) if n > 0 => SessionRef::Index(n),
            _ => SessionRef::Id(arg.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    New,
    Sessions,
    Switch(SessionRef),
    Rename(String),
    /// `None` deletes the active session
    Delete(Option<SessionRef>),
    History,
    Regenerate,
    Retry,
    ClearAll,
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse a line starting with `/`. The error is a message for the user.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        let command = match name {
            "/new" | "/n" => ReplCommand::New,
            "/sessions" | "/ls" => ReplCommand::Sessions,
            "/switch" | "/s" => {
                if arg.is_empty() {
                    return Err("Usage: /switch <number|id>".to_string());
                }
                ReplCommand::Switch(SessionRef::parse(arg))
            }
            "/rename" => {
                if arg.is_empty() {
                    return Err("Usage: /rename <title>".to_string());
                }
                ReplCommand::Rename(arg.to_string())
            }
            "/delete" | "/rm" => {
                ReplCommand::Delete((!arg.is_empty()).then(|| SessionRef::parse(arg)))
            }
            "/history" => ReplCommand::History,
            "/regen" | "/regenerate" => ReplCommand::Regenerate,
            "/retry" => ReplCommand::Retry,
            "/clear-all" => ReplCommand::ClearAll,
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            other => {
                return Err(format!(
                    "Unknown command: {}\nType /help for available commands",
                    other
                ));
            }
        };
        Ok(command)
    }

    pub fn help() -> &'static str {
        "Commands:
  /new                 Start a new session
  /sessions, /ls       List sessions (most recent first)
  /switch <n|id>       Switch to a session
  /rename <title>      Rename the active session
  /delete [n|id]       Delete a session (default: the active one)
  /history             Show the active session
  /regen               Regenerate the last reply
  /retry               Retry the last failed reply
  /clear-all           Delete every session
  /help, /h, /?        Show this help
  /quit, /exit, /q     Exit chat

Press Ctrl-C while a reply streams to stop it."
    }
}
