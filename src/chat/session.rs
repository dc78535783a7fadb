//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which drives a single
//! question submission end to end: state machine, live-answer
//! accumulation, and committing the exchange to the conversation store.

use std::fmt;

use crate::chat::render::Renderer;
use crate::client::{FragmentSink, RepoLore};
use crate::error::{Error, Result};
use crate::observability::{SESSION_STREAM_FAILURES, SESSION_SUBMITS};
use crate::store::ConversationStore;
use crate::types::{ConversationEntry, ConversationLog};

/// The session's position in its streaming state machine.
///
/// Errors do not get their own terminal state: a failed stream is
/// absorbed and the session returns to `Idle`, ready for resubmission.
/// The most recent failure is available via [`ChatSession::last_error`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No question in flight.
    Idle,

    /// Request sent, no answer bytes received yet.
    Awaiting,

    /// Answer fragments are arriving.
    Streaming,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Awaiting => write!(f, "awaiting"),
            SessionState::Streaming => write!(f, "streaming"),
        }
    }
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The active repository identifier.
    pub repo_identifier: String,

    /// Entries in the active repository's stored log.
    pub entry_count: usize,

    /// Current state machine state.
    pub state: SessionState,

    /// Instructions sent with every question, if set.
    pub instructions: Option<String>,

    /// Questions accepted by `submit` this session.
    pub submissions: u64,

    /// Streams that ended in an absorbed failure.
    pub stream_failures: u64,
}

/// Delivers fragments into the session's live answer and keeps the
/// renderer current.
struct LiveAnswerSink<'a> {
    state: &'a mut SessionState,
    live_answer: &'a mut String,
    renderer: &'a mut dyn Renderer,
}

impl FragmentSink for LiveAnswerSink<'_> {
    fn on_fragment(&mut self, fragment: &str) {
        if *self.state == SessionState::Awaiting {
            *self.state = SessionState::Streaming;
            self.renderer.state_changed(SessionState::Streaming);
        }
        self.live_answer.push_str(fragment);
        self.renderer.show_live_answer(self.live_answer);
    }
}

/// A chat session against one repository at a time.
///
/// The session owns the conversation store and an HTTP client; each
/// accepted submission produces exactly one `Question` entry and exactly
/// one `Answer` entry in the active repository's log, in that order,
/// whether the stream succeeds or fails.
pub struct ChatSession {
    client: RepoLore,
    store: ConversationStore,
    repo_identifier: String,
    instructions: String,
    state: SessionState,
    live_answer: String,
    last_error: Option<Error>,
    submissions: u64,
    stream_failures: u64,
}

impl ChatSession {
    /// Creates a session over the given client and store, with
    /// `repo_identifier` as the active repository.
    pub fn new(
        client: RepoLore,
        store: ConversationStore,
        repo_identifier: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store,
            repo_identifier: repo_identifier.into(),
            instructions: String::new(),
            state: SessionState::Idle,
            live_answer: String::new(),
            last_error: None,
            submissions: 0,
            stream_failures: 0,
        }
    }

    /// Submits a question against the active repository and streams the
    /// answer through `renderer`.
    ///
    /// This method:
    /// 1. Silently ignores blank questions and re-entrant submissions.
    /// 2. Commits the `Question` entry before any network activity, so
    ///    the question survives a failed stream.
    /// 3. Streams the answer, accumulating fragments and republishing
    ///    the growing live answer to the renderer.
    /// 4. Commits an `Answer` entry with whatever accumulated — complete,
    ///    partial, or empty — and returns to `Idle`.
    ///
    /// Network failures are absorbed here (shown through the renderer,
    /// retained in [`last_error`]); the session never ends a submission
    /// in anything but `Idle`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the conversation store cannot persist
    /// an entry.
    ///
    /// [`last_error`]: ChatSession::last_error
    pub async fn submit(&mut self, question: &str, renderer: &mut dyn Renderer) -> Result<()> {
        let question = question.trim();
        if question.is_empty() || self.state != SessionState::Idle {
            return Ok(());
        }
        SESSION_SUBMITS.click();
        self.submissions += 1;

        // The commit target is fixed now; switching the active repository
        // while the stream runs must not redirect this exchange.
        let repo_identifier = self.repo_identifier.clone();

        self.store
            .append(&repo_identifier, ConversationEntry::question(question))?;

        self.live_answer.clear();
        self.last_error = None;
        self.state = SessionState::Awaiting;
        renderer.state_changed(SessionState::Awaiting);

        let outcome = {
            let mut sink = LiveAnswerSink {
                state: &mut self.state,
                live_answer: &mut self.live_answer,
                renderer: &mut *renderer,
            };
            self.client
                .ask_streamed(&repo_identifier, question, &self.instructions, &mut sink)
                .await
        };

        if let Err(err) = outcome {
            SESSION_STREAM_FAILURES.click();
            self.stream_failures += 1;
            renderer.print_error(&err.to_string());
            self.last_error = Some(err);
        }

        // Success and failure commit alike; a partial or empty answer is
        // still an answer.
        let answer = std::mem::take(&mut self.live_answer);
        self.state = SessionState::Idle;
        renderer.state_changed(SessionState::Idle);
        renderer.finish_response();
        self.store
            .append(&repo_identifier, ConversationEntry::answer(answer))?;
        Ok(())
    }

    /// Switches the active repository and returns its stored log.
    ///
    /// Logs are independent per repository; the previous repository's
    /// log is untouched.
    pub fn set_repository(&mut self, repo_identifier: impl Into<String>) -> ConversationLog {
        self.repo_identifier = repo_identifier.into();
        self.store.load(&self.repo_identifier)
    }

    /// Returns the stored log for the active repository.
    pub fn history(&self) -> ConversationLog {
        self.store.load(&self.repo_identifier)
    }

    /// The active repository identifier.
    pub fn repo_identifier(&self) -> &str {
        &self.repo_identifier
    }

    /// Sets or clears the instructions sent with every question.
    pub fn set_instructions(&mut self, instructions: Option<String>) {
        self.instructions = instructions.unwrap_or_default();
    }

    /// The current instructions. May be empty.
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// The current state machine state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The answer text accumulated by the in-flight stream, if any.
    pub fn live_answer(&self) -> &str {
        &self.live_answer
    }

    /// The most recent absorbed stream failure, if any.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            repo_identifier: self.repo_identifier.clone(),
            entry_count: self.history().len(),
            state: self.state,
            instructions: if self.instructions.is_empty() {
                None
            } else {
                Some(self.instructions.clone())
            },
            submissions: self.submissions,
            stream_failures: self.stream_failures,
        }
    }

    /// Gives access to the underlying client for the thin endpoints
    /// (scan, repository listings).
    pub fn client(&self) -> &RepoLore {
        &self.client
    }
}
