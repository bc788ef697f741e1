//! Filesystem-backed named-document stores.
//!
//! One store per document kind: free-form prompts, JSON context documents,
//! the reserved single-slot "current" snapshot, and the statistics slot.
//! Documents are keyed by name; concurrent writers to the same name are not
//! serialized (last writer wins), which is acceptable for a single-operator
//! tool. Every store creates its directory at construction, and reading keeps
//! three failure modes distinct: absent, unreadable, and malformed.

pub mod contexts;
pub mod current;
pub mod prompts;
pub mod stats;

pub use contexts::{ContextDocument, ContextStore};
pub use current::CurrentStore;
pub use prompts::PromptStore;
pub use stats::StatsStore;
