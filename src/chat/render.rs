//! Output rendering for the chat session.
//!
//! This module provides the presentation seam between the session
//! controller and whatever is displaying it. The controller republishes
//! the full accumulated answer on every fragment; renderers decide how
//! to show it (the terminal renderer prints only the unseen suffix so
//! streaming looks incremental).

use std::io::{self, Stdout, Write};

use crate::chat::session::SessionState;

/// ANSI escape code for dim text (used for the waiting indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code to clear the current line.
const ANSI_CLEAR_LINE: &str = "\r\x1b[2K";

/// Trait for presenting a chat session.
///
/// The controller calls these methods in a fixed order per submission:
/// `state_changed(Awaiting)`, then `state_changed(Streaming)` once the
/// first fragment arrives, then `show_live_answer` with the growing
/// answer after every fragment, then `state_changed(Idle)` and
/// `finish_response` when the stream ends.
pub trait Renderer: Send {
    /// The session state machine moved to `state`.
    fn state_changed(&mut self, state: SessionState);

    /// The live answer grew; `live_answer` is the full text accumulated
    /// so far, not just the newest fragment.
    fn show_live_answer(&mut self, live_answer: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when an exchange is complete and committed.
    fn finish_response(&mut self);
}

/// Plain text renderer with optional ANSI styling.
///
/// Shows a dotted waiting indicator between submission and the first
/// fragment, then prints answer text incrementally as it streams.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    printed: usize,
    waiting: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI styling enabled.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
            printed: 0,
            waiting: false,
        }
    }

    /// Creates a new PlainTextRenderer with the specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            printed: 0,
            waiting: false,
        }
    }

    /// Flushes stdout so streamed content displays immediately.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn clear_waiting(&mut self) {
        if self.waiting {
            if self.use_color {
                print!("{ANSI_CLEAR_LINE}");
            } else {
                print!("\r    \r");
            }
            self.waiting = false;
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn state_changed(&mut self, state: SessionState) {
        match state {
            SessionState::Awaiting => {
                self.waiting = true;
                if self.use_color {
                    print!("{ANSI_DIM}...{ANSI_RESET}");
                } else {
                    print!("...");
                }
                self.flush();
            }
            SessionState::Streaming => {
                self.clear_waiting();
                self.flush();
            }
            SessionState::Idle => {}
        }
    }

    fn show_live_answer(&mut self, live_answer: &str) {
        let start = self.printed.min(live_answer.len());
        print!("{}", &live_answer[start..]);
        self.printed = live_answer.len();
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        self.clear_waiting();
        eprintln!("\nError: {error}");
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
    }

    fn finish_response(&mut self) {
        self.clear_waiting();
        println!();
        self.printed = 0;
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn live_answer_suffix_tracking() {
        let mut renderer = PlainTextRenderer::with_color(false);
        renderer.show_live_answer("It ");
        renderer.show_live_answer("It computes ");
        assert_eq!(renderer.printed, "It computes ".len());
        renderer.finish_response();
        assert_eq!(renderer.printed, 0);
    }
}
