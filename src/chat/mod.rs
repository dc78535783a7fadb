//! Chat application module for interactive question-answering sessions.
//!
//! This module provides a streaming REPL chat interface built on top of
//! the repolore client library. It supports:
//!
//! - Streaming answers with incremental display
//! - Per-repository conversation history that survives restarts
//! - Slash commands for switching repositories and session control
//! - Configurable service URL, instructions, and history location
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Core session management and the streaming state machine
//! - [`render`]: The presentation seam and terminal renderer
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod render;
mod session;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use render::{PlainTextRenderer, Renderer};
pub use session::{ChatSession, SessionState, SessionStats};
