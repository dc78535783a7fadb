// Public modules
pub mod chat;
pub mod client;
pub mod decoder;
pub mod error;
pub mod store;
pub mod types;

mod observability;

#[cfg(test)]
mod test_http;

// Re-exports
pub use client::{FragmentSink, RepoLore};
pub use decoder::StreamTextDecoder;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use store::{ConversationStore, DirStorage, MemoryStorage, Storage};
pub use types::*;
