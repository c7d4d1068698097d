//! todos - a local task list
//!
//! This library holds the task model, its persistent store and the
//! projections used by the `todos` CLI and its interactive board.
//!
//! # Core Concepts
//!
//! - **Tasks**: validated records with a title, due date and priority
//! - **Store**: one JSON collection per key, rewritten whole under a lock
//! - **Views**: filter, sort and render passes plus summary counts
//! - **Controller**: user intents in, refreshed boards and notifications out
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `todos.toml`
//! - `controller`: Intent handling and two-phase deletion
//! - `error`: Error types and result aliases
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON output envelopes
//! - `repository`: Task CRUD over a store
//! - `store`: Key/value blob storage (file and in-memory)
//! - `task`: Task records, drafts and validation
//! - `ui`: Terminal board
//! - `view`: Filtering, sorting and display projections

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod lock;
pub mod output;
pub mod repository;
pub mod store;
pub mod task;
pub mod ui;
pub mod view;

pub use error::{Error, Result};
