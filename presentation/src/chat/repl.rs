//! REPL (Read-Eval-Print Loop) for interactive chat

use super::command::{ReplCommand, SessionRef};
use crate::config::ReplConfig;
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::TurnReporter;
use colored::Colorize;
use parley_application::{OrchestratorError, ResponseOrchestrator, SessionStore};
use parley_domain::{MessageStatus, Role, TurnOutcome};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Interactive chat REPL
pub struct ChatRepl {
    orchestrator: Arc<ResponseOrchestrator>,
    config: ReplConfig,
    backend: String,
}

impl ChatRepl {
    /// Create a new ChatRepl. `backend` names where replies come from and
    /// is shown in the welcome banner.
    pub fn new(orchestrator: Arc<ResponseOrchestrator>, backend: impl Into<String>) -> Self {
        Self {
            orchestrator,
            config: ReplConfig::default(),
            backend: backend.into(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    fn store(&self) -> &SessionStore {
        self.orchestrator.store()
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(ref path) = self.config.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line);

                    if line.starts_with('/') {
                        if self.handle_command(&mut rl, line).await {
                            break;
                        }
                        continue;
                    }

                    println!();
                    self.report(self.ask(line).await);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = self.config.history_file {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    /// Send one message in the active session and stream the reply.
    pub async fn ask(&self, question: &str) -> Result<TurnOutcome, OrchestratorError> {
        let reporter = TurnReporter::new(self.config.show_spinner);
        self.drive(self.orchestrator.send(question, &reporter)).await
    }

    /// Await a turn, turning Ctrl-C into a stop request.
    async fn drive<F>(&self, turn: F) -> Result<TurnOutcome, OrchestratorError>
    where
        F: Future<Output = Result<TurnOutcome, OrchestratorError>>,
    {
        tokio::pin!(turn);
        loop {
            tokio::select! {
                outcome = &mut turn => return outcome,
                signal = tokio::signal::ctrl_c() => match signal {
                    Ok(()) => {
                        if !self.orchestrator.stop() {
                            debug!("Ctrl-C with no turn in flight");
                        }
                    }
                    Err(e) => {
                        warn!("Cannot listen for Ctrl-C: {}", e);
                        return turn.await;
                    }
                },
            }
        }
    }

    fn report(&self, result: Result<TurnOutcome, OrchestratorError>) {
        match result {
            Ok(outcome) => debug!("Turn ended: {}", outcome.state()),
            Err(e) => eprintln!("{} {}\n", "x".red().bold(), e),
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│                 Parley Chat                 │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Replies from: {}", self.backend.cyan());
        match self.store().active_session() {
            Some(session) => println!("Session: {}", ConsoleFormatter::session_summary(&session)),
            None => println!("Session: {}", "(a new one starts with your first message)".dimmed()),
        }
        println!();
        println!("Type /help for commands.");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&self, rl: &mut DefaultEditor, line: &str) -> bool {
        let command = match ReplCommand::parse(line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                return false;
            }
        };

        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => {
                println!();
                println!("{}", ReplCommand::help());
                println!();
            }
            ReplCommand::New => {
                let session = self.store().create_session();
                println!("Started {}", session.title.bold());
            }
            ReplCommand::Sessions => {
                let active = self.store().active_session_id();
                print!(
                    "{}",
                    ConsoleFormatter::session_list(&self.store().sorted_sessions(), active.as_deref())
                );
            }
            ReplCommand::Switch(target) => match self.resolve(&target) {
                Ok(id) => {
                    self.store().switch_active(&id);
                    if let Some(session) = self.store().session(&id) {
                        println!("Switched to {}", ConsoleFormatter::session_summary(&session));
                    }
                }
                Err(message) => println!("{}", message),
            },
            ReplCommand::Rename(title) => match self.store().active_session_id() {
                Some(id) => {
                    self.store().rename_session(&id, title.as_str());
                    println!("Renamed to {}", title.bold());
                }
                None => println!("No active session to rename"),
            },
            ReplCommand::Delete(target) => {
                let id = match target {
                    Some(target) => self.resolve(&target),
                    None => self
                        .store()
                        .active_session_id()
                        .ok_or_else(|| "No active session to delete".to_string()),
                };
                match id {
                    Ok(id) => {
                        self.store().delete_session(&id);
                        println!("Session deleted");
                    }
                    Err(message) => println!("{}", message),
                }
            }
            ReplCommand::History => match self.store().active_session() {
                Some(session) => print!("{}", ConsoleFormatter::transcript(&session)),
                None => println!("No active session"),
            },
            ReplCommand::Regenerate => self.regenerate().await,
            ReplCommand::Retry => self.retry().await,
            ReplCommand::ClearAll => {
                let confirmed = matches!(
                    rl.readline("Delete every session? [y/N] "),
                    Ok(answer) if answer.trim().eq_ignore_ascii_case("y")
                );
                if confirmed {
                    self.store().clear_all().await;
                    println!("All sessions deleted");
                } else {
                    println!("Cancelled");
                }
            }
        }
        false
    }

    async fn regenerate(&self) {
        let messages = self.store().active_messages();
        let Some(target) = messages.iter().rev().find(|m| m.role == Role::Assistant) else {
            println!("Nothing to regenerate");
            return;
        };
        println!();
        let reporter = TurnReporter::new(self.config.show_spinner);
        let result = self
            .drive(self.orchestrator.regenerate(&target.id, &reporter))
            .await;
        self.report(result);
    }

    async fn retry(&self) {
        let messages = self.store().active_messages();
        let Some(target) = messages
            .iter()
            .rev()
            .find(|m| m.status == MessageStatus::Error)
        else {
            println!("No failed reply to retry");
            return;
        };
        println!();
        let reporter = TurnReporter::new(self.config.show_spinner);
        let result = self.drive(self.orchestrator.retry(&target.id, &reporter)).await;
        self.report(result);
    }

    /// Map a list number or (unique prefix of an) id onto a session id
    fn resolve(&self, target: &SessionRef) -> Result<String, String> {
        let sessions = self.store().sorted_sessions();
        match target {
            SessionRef::Index(n) => sessions
                .get(n - 1)
                .map(|s| s.id.clone())
                .ok_or_else(|| format!("No session #{} (see /sessions)", n)),
            SessionRef::Id(id) => {
                let mut matches = sessions.iter().filter(|s| s.id.starts_with(id.as_str()));
                match (matches.next(), matches.next()) {
                    (Some(session), None) => Ok(session.id.clone()),
                    (Some(_), Some(_)) => Err(format!("'{}' matches more than one session", id)),
                    (None, _) => Err(format!("No session with id '{}'", id)),
                }
            }
        }
    }
}
