//! Core library for the chatlens completion debugging proxy.
//!
//! This crate provides the building blocks for a single-operator debugging
//! proxy that sits between a chat client and one OpenAI-compatible upstream
//! provider. The architecture keeps the interesting logic in one place: the
//! completion forwarder applies configuration-driven defaults to an outbound
//! request, issues a single bounded upstream call, and derives a timing and
//! throughput record from the response. Everything around it is deliberately
//! plain plumbing.
//!
//! # Architecture Overview
//!
//! - **Wire types**: OpenAI-compatible request/response structures plus the
//!   derived response metadata record
//! - **Completion forwarding**: defaults resolution, one synchronous upstream
//!   exchange per invocation, metadata derivation
//! - **Named-document storage**: filesystem stores for prompts, saved
//!   contexts, the current snapshot slots, and statistics
//! - **Configuration system**: immutable-after-load YAML configuration with
//!   an application-level override layer

pub mod config;
pub mod core_types;
pub mod errors;
pub mod forwarder;
pub mod storage;

pub use config::ConfigManager;
pub use core_types::{
    ChatMessage, Choice, CompletionRequest, CompletionResponse, ResponseMetadata, Role, ToolCall,
    Usage,
};
pub use errors::ChatLensError;
pub use forwarder::{CompletionClient, CompletionForwarder};
pub use storage::{ContextStore, CurrentStore, PromptStore, StatsStore};

#[cfg(test)]
pub mod test_utils;
