//! Route handlers for the HTTP surface.
//!
//! Handlers contain no logic of their own: they delegate to the forwarder
//! and the stores, translate errors into statuses via `ApiError`, and keep
//! the response bodies stable for the external inspection UI.

pub mod completions;
pub mod config;
pub mod contexts;
pub mod current;
pub mod prompts;
