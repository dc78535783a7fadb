//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use arrrg_derive::CommandLine;

/// Default request-duration ceiling in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 200;

/// Command-line arguments for the repolore-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the question-answering service.
    #[arrrg(optional, "Service base URL (default: $REPOLORE_BASE_URL)", "URL")]
    pub base_url: Option<String>,

    /// Repository identifier to open at startup.
    #[arrrg(optional, "Repository to open at startup", "REPO")]
    pub repo: Option<String>,

    /// Instructions sent with every question.
    #[arrrg(optional, "Instructions sent with every question", "TEXT")]
    pub instructions: Option<String>,

    /// Directory holding per-repository conversation history.
    #[arrrg(optional, "Conversation history directory", "DIR")]
    pub history_dir: Option<String>,

    /// Request ceiling in seconds.
    #[arrrg(optional, "Request ceiling in seconds (default: 200)", "SECONDS")]
    pub timeout_secs: Option<u32>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL of the service; `None` defers to the client's env-var
    /// fallback.
    pub base_url: Option<String>,

    /// Repository identifier to open at startup, if any.
    pub repo: Option<String>,

    /// Instructions sent with every question. May be empty.
    pub instructions: String,

    /// Directory holding per-repository conversation history.
    pub history_dir: PathBuf,

    /// Total request-duration ceiling.
    pub timeout: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: deferred to the client (env var, then localhost)
    /// - History: `$HOME/.repolore/history`
    /// - Timeout: 200 seconds
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: None,
            repo: None,
            instructions: String::new(),
            history_dir: default_history_dir(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            use_color: true,
        }
    }

    /// Sets the service base URL.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Sets the startup repository.
    pub fn with_repo(mut self, repo: String) -> Self {
        self.repo = Some(repo);
        self
    }

    /// Sets the per-question instructions.
    pub fn with_instructions(mut self, instructions: String) -> Self {
        self.instructions = instructions;
        self
    }

    /// Sets the history directory.
    pub fn with_history_dir(mut self, history_dir: PathBuf) -> Self {
        self.history_dir = history_dir;
        self
    }

    /// Sets the request-duration ceiling.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            base_url: args.base_url,
            repo: args.repo,
            instructions: args.instructions.unwrap_or_default(),
            history_dir: args
                .history_dir
                .map(PathBuf::from)
                .unwrap_or_else(default_history_dir),
            timeout: Duration::from_secs(
                args.timeout_secs
                    .map(u64::from)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            use_color: !args.no_color,
        }
    }
}

fn default_history_dir() -> PathBuf {
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".repolore").join("history"),
        None => PathBuf::from(".repolore-history"),
    }
}
