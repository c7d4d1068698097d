//! Command-line interface for todos
//!
//! This module defines the CLI structure using clap derive macros.
//! Task commands live in `task`, the interactive board in `board`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

mod board;
mod task;

/// todos - a local task list
///
/// Create, filter, sort, complete and delete tasks stored as a single JSON
/// collection in a local directory.
#[derive(Parser, Debug)]
#[command(name = "todos")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the task store (defaults to the platform data dir)
    #[arg(long, global = true, env = "TODOS_STORE")]
    pub store: Option<PathBuf>,

    /// Key the collection is stored under (overrides todos.toml)
    #[arg(long, global = true, env = "TODOS_KEY")]
    pub key: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a task
    Add {
        /// Task title
        title: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long, default_value = "")]
        due: String,

        /// Priority: low, medium, high
        #[arg(short, long, default_value = "")]
        priority: String,

        /// Optional description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// List tasks
    #[command(alias = "ls")]
    List {
        /// Filter: all, active, completed
        #[arg(short, long)]
        filter: Option<String>,

        /// Sort: createdAt, dueDate, priority
        #[arg(short, long)]
        sort: Option<String>,
    },

    /// Toggle a task between active and completed
    Toggle {
        /// Task ID
        id: String,
    },

    /// Delete a task (asks for confirmation)
    #[command(alias = "rm")]
    Delete {
        /// Task ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show total, active and completed counts
    Stats,

    /// Open the interactive board
    Board {
        /// Initial filter: all, active, completed
        #[arg(short, long)]
        filter: Option<String>,

        /// Initial sort: createdAt, dueDate, priority
        #[arg(short, long)]
        sort: Option<String>,
    },
}

/// Store location and output flags shared by every command
pub(crate) struct GlobalOptions {
    pub store: Option<PathBuf>,
    pub key: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let globals = GlobalOptions {
            store: self.store,
            key: self.key,
            json: self.json,
            quiet: self.quiet,
        };
        match self.command {
            Commands::Add {
                title,
                due,
                priority,
                description,
            } => task::run_add(
                task::AddOptions {
                    title,
                    due,
                    priority,
                    description,
                },
                &globals,
            ),
            Commands::List { filter, sort } => {
                task::run_list(task::ListOptions { filter, sort }, &globals)
            }
            Commands::Toggle { id } => task::run_toggle(task::ToggleOptions { id }, &globals),
            Commands::Delete { id, yes } => {
                task::run_delete(task::DeleteOptions { id, yes }, &globals)
            }
            Commands::Stats => task::run_stats(&globals),
            Commands::Board { filter, sort } => {
                board::run(board::BoardOptions { filter, sort }, &globals)
            }
        }
    }
}
