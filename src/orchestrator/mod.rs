//! Session lifecycle: per-chat store, interaction flow, and idle eviction.

pub mod flow;
pub mod reaper;
pub mod session_store;

pub use session_store::{CreateOutcome, SessionStore};
