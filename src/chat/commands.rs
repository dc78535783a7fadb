//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the session without submitting a question.

/// A parsed chat command.
///
/// These commands control the chat session and never reach the service's
/// ask endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Switch the active repository.
    Repo(String),

    /// List the indexed repositories.
    Repos,

    /// List the repositories available for indexing.
    IndexableRepos,

    /// Index a repository by path.
    Scan(String),

    /// Set or clear the instructions sent with every question.
    /// `None` clears the current instructions.
    Instructions(Option<String>),

    /// Print the stored conversation log for the active repository.
    History,

    /// Display session statistics.
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be submitted as a question.
///
/// # Examples
///
/// ```
/// # use repolore::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/repo my-project").is_some());
/// assert!(parse_command("What does X do?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "repo" => match argument {
            Some(repo) => ChatCommand::Repo(repo.to_string()),
            None => ChatCommand::Invalid("/repo requires a repository identifier".to_string()),
        },
        "repos" => ChatCommand::Repos,
        "indexable" => ChatCommand::IndexableRepos,
        "scan" => match argument {
            Some(path) => ChatCommand::Scan(path.to_string()),
            None => ChatCommand::Invalid("/scan requires a repository path".to_string()),
        },
        "instructions" => ChatCommand::Instructions(argument.map(|s| s.to_string())),
        "history" => ChatCommand::History,
        "stats" | "status" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{command}")),
    };

    Some(result)
}

/// Returns the help text describing available commands.
pub fn help_text() -> String {
    [
        "Available commands:",
        "  /repo <identifier>    Switch the active repository",
        "  /repos                List indexed repositories",
        "  /indexable            List repositories available for indexing",
        "  /scan <path>          Index a repository by path",
        "  /instructions [text]  Set (or clear) per-question instructions",
        "  /history              Show the stored conversation for this repository",
        "  /stats                Show session statistics",
        "  /help                 Show this help",
        "  /quit                 Exit",
        "",
        "Anything else is submitted as a question against the active repository.",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_input_is_not_a_command() {
        assert!(parse_command("What does X do?").is_none());
        assert!(parse_command("").is_none());
    }

    #[test]
    fn quit_aliases() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
    }

    #[test]
    fn repo_requires_an_argument() {
        assert_eq!(
            parse_command("/repo my-project"),
            Some(ChatCommand::Repo("my-project".to_string()))
        );
        assert!(matches!(
            parse_command("/repo"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/repo   "),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn scan_requires_an_argument() {
        assert_eq!(
            parse_command("/scan /home/user/project"),
            Some(ChatCommand::Scan("/home/user/project".to_string()))
        );
        assert!(matches!(
            parse_command("/scan"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn instructions_argument_is_optional() {
        assert_eq!(
            parse_command("/instructions answer briefly"),
            Some(ChatCommand::Instructions(Some(
                "answer briefly".to_string()
            )))
        );
        assert_eq!(
            parse_command("/instructions"),
            Some(ChatCommand::Instructions(None))
        );
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(parse_command("/REPOS"), Some(ChatCommand::Repos));
        assert_eq!(parse_command("/Help"), Some(ChatCommand::Help));
    }

    #[test]
    fn unknown_command_is_invalid() {
        assert!(matches!(
            parse_command("/frobnicate"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn help_text_mentions_every_command() {
        let help = help_text();
        for command in ["/repo", "/repos", "/indexable", "/scan", "/instructions", "/history", "/stats", "/help", "/quit"] {
            assert!(help.contains(command), "missing {command}");
        }
    }
}
