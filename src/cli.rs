use clap::{Parser, Subcommand};

use crate::view::{SortKey, StatusFilter};

/// tasktrack: manage tasks stored in a hosted REST collection
#[derive(Parser, Debug, Clone)]
#[command(name = "tasktrack", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Path to config file (default: .tasktrack/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Base URL of the task collection (overrides TASKTRACK_API_URL and config)
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// List tasks, optionally searched, filtered and sorted
    List {
        /// Case-insensitive title search
        #[arg(long)]
        search: Option<String>,

        /// Status filter (all, pending, completed)
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// Sort column (task_name, due_date, createdAt); repeat to flip direction
        #[arg(long = "sort")]
        sort: Vec<SortKey>,

        /// Print the visible tasks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single task
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Create a task
    Add {
        /// Task title
        #[arg(long)]
        name: String,

        /// Due date (YYYY-MM-DD), today or later
        #[arg(long)]
        due: String,
    },

    /// Edit a task's title and due date; omitted fields keep their current value
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// Due date (YYYY-MM-DD), today or later
        #[arg(long)]
        due: Option<String>,
    },

    /// Flip a task between pending and completed
    Toggle { id: String },

    /// Delete a task
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Interactive session with live search, filters and sorting
    Browse,
}
