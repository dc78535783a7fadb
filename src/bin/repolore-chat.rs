//! Interactive chat for asking questions about indexed repositories.
//!
//! This binary provides a streaming REPL against a repository
//! question-answering service. Conversation history is kept per
//! repository and survives restarts.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage against a local service
//! repolore-chat --repo my-project
//!
//! # Point at a remote service
//! repolore-chat --base-url http://qa.internal:3000/
//!
//! # Send instructions with every question
//! repolore-chat --repo my-project --instructions "cite file paths"
//!
//! # Disable colors (useful for piping output)
//! repolore-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/repo <identifier>` - Switch the active repository
//! - `/repos` - List indexed repositories
//! - `/scan <path>` - Index a repository by path
//! - `/history` - Show the stored conversation
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use repolore::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, help_text,
    parse_command,
};
use repolore::{ConversationLog, ConversationStore, DirStorage, EntryKind, RepoLore};

/// Main entry point for the repolore-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("repolore-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let use_color = config.use_color;

    let client = RepoLore::with_options(config.base_url.clone(), Some(config.timeout))?;
    let store = ConversationStore::new(Box::new(DirStorage::new(config.history_dir.clone())));

    let mut session = ChatSession::new(client, store, config.repo.clone().unwrap_or_default());
    if !config.instructions.is_empty() {
        session.set_instructions(Some(config.instructions.clone()));
    }
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    println!("repolore chat");
    if session.repo_identifier().is_empty() {
        println!("No repository selected. Use /repo <identifier>; /repos lists them.");
    } else {
        println!("Repository: {}", session.repo_identifier());
        print_log(&session.history());
    }
    println!("Type /help for commands, /quit to exit\n");

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Repo(repo) => {
                            let log = session.set_repository(repo);
                            renderer.print_info(&format!(
                                "Repository: {}",
                                session.repo_identifier()
                            ));
                            print_log(&log);
                        }
                        ChatCommand::Repos => match session.client().repos().await {
                            Ok(list) => print_repo_list("Indexed repositories", &list.repos),
                            Err(err) => renderer.print_error(&err.to_string()),
                        },
                        ChatCommand::IndexableRepos => {
                            match session.client().indexable_repos().await {
                                Ok(list) => {
                                    print_repo_list("Indexable repositories", &list.repos)
                                }
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Scan(path) => match session.client().scan(&path).await {
                            Ok(scanned) => {
                                let log = session.set_repository(scanned.repo_identifier);
                                renderer.print_info(&format!(
                                    "Indexed as: {}",
                                    session.repo_identifier()
                                ));
                                print_log(&log);
                            }
                            Err(err) => renderer.print_error(&err.to_string()),
                        },
                        ChatCommand::Instructions(text) => {
                            let cleared = text.is_none();
                            session.set_instructions(text);
                            if cleared {
                                renderer.print_info("Instructions cleared.");
                            } else {
                                renderer.print_info(&format!(
                                    "Instructions set to: {}",
                                    session.instructions()
                                ));
                            }
                        }
                        ChatCommand::History => {
                            print_log(&session.history());
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {line}");
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                if session.repo_identifier().is_empty() {
                    renderer.print_error("No repository selected. Use /repo <identifier> first.");
                    continue;
                }

                // Regular input - submit as a question
                println!("Answer:");
                if let Err(e) = session.submit(line, &mut renderer).await {
                    renderer.print_error(&e.to_string());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {err}"));
                break;
            }
        }
    }

    Ok(())
}

fn print_log(log: &ConversationLog) {
    for entry in &log.entries {
        match entry.kind {
            EntryKind::Question => println!("You: {}", entry.content),
            EntryKind::Answer => println!("Answer: {}\n", entry.content),
        }
    }
}

fn print_repo_list(title: &str, repos: &[String]) {
    if repos.is_empty() {
        println!("    {title}: (none)");
        return;
    }
    println!("    {title}:");
    for repo in repos {
        println!("      - {repo}");
    }
}

fn print_stats(session: &ChatSession) {
    let stats = session.stats();
    let repo = if stats.repo_identifier.is_empty() {
        "(none)"
    } else {
        stats.repo_identifier.as_str()
    };
    println!("    Session Statistics:");
    println!("      Repository: {repo}");
    println!("      Stored entries: {}", stats.entry_count);
    println!("      State: {}", stats.state);
    match stats.instructions {
        Some(ref instructions) => println!("      Instructions: {instructions}"),
        None => println!("      Instructions: (none)"),
    }
    println!("      Questions this session: {}", stats.submissions);
    println!("      Stream failures: {}", stats.stream_failures);
}
