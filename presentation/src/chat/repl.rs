//! REPL (Read-Eval-Print Loop) for interactive chat

use super::renderer::{RenderMode, TerminalRenderer};
use crate::config::{OutputConfig, ReplConfig};
use crate::output::{ConsoleFormatter, Palette};
use colored::Colorize;
use medbot_application::{ChatError, ChatUseCase, ConversationStore, ThemePreference};
use medbot_domain::{Role, Theme};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A slash command typed at the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Quit,
    New,
    History,
    /// Open a saved chat by its 0-based list position
    Load(usize),
    /// Delete a saved chat by its 0-based list position
    Delete(usize),
    Clear,
    Regenerate,
    Speak,
    Theme,
    Tools,
    /// Known command with a bad argument; carries the usage hint
    Usage(&'static str),
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line starting with `/`.
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        match name {
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/new" => ReplCommand::New,
            "/history" | "/ls" => ReplCommand::History,
            "/load" | "/open" => match parse_position(arg) {
                Some(i) => ReplCommand::Load(i),
                None => ReplCommand::Usage("/load <number>"),
            },
            "/delete" | "/rm" => match parse_position(arg) {
                Some(i) => ReplCommand::Delete(i),
                None => ReplCommand::Usage("/delete <number>"),
            },
            "/clear" => ReplCommand::Clear,
            "/regenerate" | "/retry" => ReplCommand::Regenerate,
            "/speak" => ReplCommand::Speak,
            "/theme" => ReplCommand::Theme,
            "/tools" => ReplCommand::Tools,
            other => ReplCommand::Unknown(other.to_string()),
        }
    }
}

/// `"3"` as shown in `/history` -> list index 2
fn parse_position(arg: Option<&str>) -> Option<usize> {
    arg?.parse::<usize>().ok()?.checked_sub(1)
}

/// Cancel `token` when the user presses Ctrl-C. Abort the returned handle
/// once the guarded operation finishes.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Ctrl-C received, cancelling request");
            token.cancel();
        }
    })
}

/// Interactive chat REPL
pub struct ChatRepl {
    chat: ChatUseCase,
    conversations: ConversationStore,
    theme: ThemePreference,
    theme_override: Option<Theme>,
    palette: Palette,
    config: ReplConfig,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(
        chat: ChatUseCase,
        conversations: ConversationStore,
        theme: ThemePreference,
        output: &OutputConfig,
        config: ReplConfig,
    ) -> Self {
        let active = output.theme.unwrap_or_else(|| theme.load());
        Self {
            chat,
            conversations,
            theme,
            theme_override: output.theme,
            palette: Palette::for_theme(active),
            config,
        }
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load history
        let history_path = self.config.history_path();
        if let Some(ref path) = history_path {
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
                        if self.handle_command(ReplCommand::parse(line), &mut rl).await {
                            break;
                        }
                        continue;
                    }

                    self.ask(line).await;
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

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    /// Send one message in the current conversation and print the reply.
    ///
    /// Returns whether a reply completed.
    pub async fn ask(&mut self, message: &str) -> bool {
        println!();
        let mut renderer = self.renderer();
        let cancel = CancellationToken::new();
        let watcher = cancel_on_ctrl_c(cancel.clone());

        let result = self
            .chat
            .send(
                self.conversations.current_mut(),
                message,
                &mut renderer,
                &cancel,
            )
            .await;
        watcher.abort();

        let completed = self.after_reply(result);
        println!();
        completed
    }

    fn renderer(&self) -> TerminalRenderer {
        let renderer = TerminalRenderer::new(self.palette, RenderMode::detect());
        if self.config.show_progress {
            renderer.with_spinner("MedBot is thinking...")
        } else {
            renderer
        }
    }

    fn after_reply(&mut self, result: Result<String, ChatError>) -> bool {
        match result {
            Ok(_) => {
                if let Err(e) = self.conversations.save_current() {
                    warn!("Could not save chat history: {}", e);
                    eprintln!("{} {}", "Could not save chat history:".yellow(), e);
                }
                true
            }
            // The renderer has already reported stream failures
            Err(ChatError::Stream(_)) => false,
            Err(e) => {
                eprintln!("{} {}", "Error:".color(self.palette.error), e);
                false
            }
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            MedBot AI - Chat Mode            │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Ask any medical question. Ctrl-C cancels a reply in progress.");
        println!("Type /help for commands.");
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  /new              - Start a new chat");
        println!("  /history          - List saved chats");
        println!("  /load <n>         - Open saved chat n");
        println!("  /delete <n>       - Delete saved chat n");
        println!("  /clear            - Delete all saved chats");
        println!("  /regenerate       - Ask again for the last reply");
        println!("  /speak            - Get audio for the last reply");
        println!("  /theme            - Toggle dark/light theme");
        println!("  /tools            - Show the study tools");
        println!("  /help, /h, /?     - Show this help");
        println!("  /quit, /exit, /q  - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&mut self, command: ReplCommand, rl: &mut DefaultEditor) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => self.print_help(),
            ReplCommand::New => {
                self.conversations.new_chat();
                println!("Started a new chat.");
            }
            ReplCommand::History => {
                println!(
                    "{}",
                    ConsoleFormatter::format_history(
                        self.conversations.history(),
                        self.conversations.current().id()
                    )
                );
            }
            ReplCommand::Load(index) => match self.conversations.open_nth(index) {
                Ok(conversation) => {
                    println!(
                        "{}",
                        ConsoleFormatter::format_conversation(conversation, self.palette)
                    );
                }
                Err(e) => eprintln!("{}", e),
            },
            ReplCommand::Delete(index) => self.delete(index),
            ReplCommand::Clear => self.clear(rl),
            ReplCommand::Regenerate => self.regenerate().await,
            ReplCommand::Speak => self.speak().await,
            ReplCommand::Theme => self.toggle_theme(),
            ReplCommand::Tools => println!("{}", ConsoleFormatter::format_tools()),
            ReplCommand::Usage(usage) => println!("Usage: {}", usage),
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        false
    }

    fn delete(&mut self, index: usize) {
        let Some(conversation) = self.conversations.history().nth(index) else {
            eprintln!("No saved chat #{}", index + 1);
            return;
        };
        let id = conversation.id().to_string();
        let title = conversation.title().to_string();
        let was_current = self.conversations.current().id() == id;

        match self.conversations.delete(&id) {
            Ok(_) => {
                println!("Deleted \"{}\".", title);
                if was_current {
                    println!("Started a new chat.");
                }
            }
            Err(e) => eprintln!("Could not delete chat: {}", e),
        }
    }

    fn clear(&mut self, rl: &mut DefaultEditor) {
        if self.conversations.history().is_empty() {
            println!("No saved chats.");
            return;
        }
        let confirmed = rl
            .readline("Delete all saved chats? [y/N] ")
            .map(|answer| answer.trim().eq_ignore_ascii_case("y"))
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        match self.conversations.clear() {
            Ok(()) => println!("Chat history cleared."),
            Err(e) => eprintln!("Could not clear chat history: {}", e),
        }
    }

    async fn regenerate(&mut self) {
        println!();
        let mut renderer = self.renderer();
        let cancel = CancellationToken::new();
        let watcher = cancel_on_ctrl_c(cancel.clone());

        let result = self
            .chat
            .regenerate(self.conversations.current_mut(), &mut renderer, &cancel)
            .await;
        watcher.abort();

        self.after_reply(result);
        println!();
    }

    async fn speak(&self) {
        let Some(reply) = self
            .conversations
            .current()
            .messages()
            .iter()
            .rev()
            .find(|m| m.role() == Role::Assistant)
        else {
            println!("Nothing to speak yet.");
            return;
        };

        match self.chat.speak(reply.content()).await {
            Ok(url) => println!("{} {}", "Audio:".color(self.palette.accent), url),
            Err(e) => eprintln!("Something went wrong: {}", e),
        }
    }

    fn toggle_theme(&mut self) {
        if let Some(forced) = self.theme_override {
            println!("Theme is fixed to {} by configuration.", forced);
            return;
        }
        match self.theme.toggle() {
            Ok(theme) => {
                self.palette = Palette::for_theme(theme);
                println!("Theme: {}", theme);
            }
            Err(e) => eprintln!("Could not save theme: {}", e),
        }
    }
}
