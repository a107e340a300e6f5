//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for filetag using the `clap` crate.
//!
//! # Commands
//!
//! - **status**: Counts of indexed files, folders and tags (default)
//! - **scan**: Walk the configured roots into the index
//! - **search**: Find files or folders with a tag query
//! - **files** / **folders**: Show indexed entities
//! - **tags**: Manage tags (list, show, create, modify, delete, complete)
//! - **attach** / **detach**: Add or remove tags on a file or folder
//! - **config**: Show the configuration and manage scan roots
//!
//! # Design Features
//!
//! - Global `--quiet` flag for scripting-friendly output
//! - Global `--json` flag prints projections as JSON
//! - `--db` overrides the configured database for a single run
//! - `-v` may be repeated to raise the log level
//! - Listings take `--sort`, `--limit` and `--offset`
//!
//! # Examples
//!
//! ```no_run
//! use filetag::cli::{Cli, Commands};
//!
//! let cli = Cli::parse_args();
//! match cli.get_command() {
//!     Commands::Search { query, .. } => println!("searching for {query}"),
//!     _ => {}
//! }
//! ```

use crate::db::{Id, ListOptions, Sort};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Which kind of entity a tag operation targets
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    File,
    Folder,
}

#[derive(Parser, Debug)]
#[command(name = "filetag")]
#[command(about = "Tag, search and browse indexed files", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Use this database file instead of the configured one
    #[arg(long = "db", value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Shared ordering and paging arguments for listings
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    /// Sort keys, e.g. `-count,name` (a leading `-` sorts descending)
    #[arg(
        long = "sort",
        value_name = "KEYS",
        value_delimiter = ',',
        allow_hyphen_values = true
    )]
    pub sort: Vec<Sort>,

    /// Show at most this many rows
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,

    /// Skip this many rows first
    #[arg(long = "offset", value_name = "N", default_value_t = 0)]
    pub offset: usize,
}

impl ListArgs {
    /// True when no ordering or paging was asked for
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn options(&self) -> ListOptions {
        ListOptions {
            sort: self.sort.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show how many files, folders and tags are indexed
    Status,

    /// Scan directories into the index
    Scan {
        /// Directories to scan instead of the configured roots
        #[arg(value_name = "ROOT")]
        roots: Vec<PathBuf>,
    },

    /// Find entities matching a tag query
    #[command(visible_alias = "s")]
    Search {
        /// Query, e.g. `"holiday AND (beach OR mountain) AND NOT 2019"`
        #[arg(value_name = "QUERY")]
        query: String,

        /// Use the simple dialect (`+required included -excluded`)
        #[arg(long = "simple")]
        simple: bool,

        /// Let terms match names as well as tags
        #[arg(long = "names")]
        names: bool,

        /// Search folders instead of files
        #[arg(long = "folders")]
        folders: bool,
    },

    /// Show indexed files (all of them when no filter is given)
    Files {
        /// File ids to show
        #[arg(value_name = "ID")]
        ids: Vec<Id>,

        /// Only files that are not inside any folder
        #[arg(long = "orphaned", conflicts_with_all = ["ids", "path"])]
        orphaned: bool,

        /// Look a file up by its path
        #[arg(long = "path", value_name = "PATH", conflicts_with = "ids")]
        path: Option<String>,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Show indexed folders (all of them when no filter is given)
    Folders {
        /// Folder ids to show; a single id shows its full page
        #[arg(value_name = "ID")]
        ids: Vec<Id>,

        /// Only folders that are not inside any folder
        #[arg(long = "root", conflicts_with_all = ["ids", "path"])]
        root: bool,

        /// Look a folder up by its path
        #[arg(long = "path", value_name = "PATH", conflicts_with = "ids")]
        path: Option<String>,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Manage tags
    #[command(visible_alias = "t")]
    Tags {
        #[command(subcommand)]
        command: TagsCommands,
    },

    /// Add tags to a file or folder, creating unknown tags
    Attach {
        #[arg(value_enum, value_name = "KIND")]
        target: Target,

        #[arg(value_name = "ID")]
        id: Id,

        #[arg(value_name = "TAG", required = true)]
        tags: Vec<String>,
    },

    /// Remove tags from a file or folder
    Detach {
        #[arg(value_enum, value_name = "KIND")]
        target: Target,

        #[arg(value_name = "ID")]
        id: Id,

        #[arg(value_name = "TAG", required = true)]
        tags: Vec<String>,
    },

    /// Show the configuration and manage scan roots
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TagsCommands {
    /// List every tag with its usage count
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Show one tag by id or name
    Show {
        #[arg(value_name = "TAG")]
        tag: String,
    },

    /// Create a tag
    Create {
        #[arg(value_name = "NAME")]
        name: String,

        #[arg(short = 'd', long = "description")]
        description: Option<String>,
    },

    /// Rename a tag or change its description
    Modify {
        #[arg(value_name = "TAG")]
        tag: String,

        #[arg(short = 'n', long = "name")]
        name: Option<String>,

        #[arg(short = 'd', long = "description")]
        description: Option<String>,
    },

    /// Delete a tag and detach it everywhere
    #[command(visible_alias = "rm")]
    Delete {
        #[arg(value_name = "TAG")]
        tag: String,
    },

    /// Suggest tags whose name contains a fragment
    Complete {
        #[arg(value_name = "FRAGMENT")]
        fragment: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Add a directory to the scan roots
    AddRoot {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Remove a directory from the scan roots
    #[command(visible_alias = "rm-root")]
    RemoveRoot {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the command to execute, defaulting to `status`
    #[must_use]
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Status)
    }

    /// Log filter directive implied by `-v`
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
