//! Filetag CLI application entry point
//!
//! Indexes directories into a tag database and queries it from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show what is indexed (default command)
//! filetag
//!
//! # Index the configured roots, or the given directories
//! filetag config add-root ~/Pictures
//! filetag scan
//!
//! # Tag things
//! filetag attach file 12 holiday beach
//! filetag attach folder 3 2020
//!
//! # Search with the full or the simple dialect
//! filetag search 'holiday AND (beach OR mountain) AND NOT 2019'
//! filetag search --simple '+holiday beach -2019'
//!
//! # Show a folder page as JSON
//! filetag --json folders 3
//! ```
//!
//! # Configuration
//!
//! On first run, filetag prompts for initial setup. Configuration is stored in
//! the user's config directory (`~/.config/filetag/config.toml` on Linux).
//! Set `RUST_LOG` or pass `-v` for diagnostic logging on stderr.

use filetag::{
    FiletagError,
    cli::{Cli, Commands},
    commands::{self, Context},
    config::FiletagConfig,
    db::Database,
    output::Output,
};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, FiletagError>;

fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose > 0 {
        EnvFilter::new(cli.log_level())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = FiletagConfig::load_or_setup()?;
    let out = Output::new(cli.json, cli.quiet || config.quiet);
    let command = cli.get_command();

    if let Commands::Config { command } = &command {
        let config_path = FiletagConfig::config_path()?;
        return commands::config::execute(&mut config, &config_path, command, out);
    }

    let db_path = cli.db.clone().unwrap_or_else(|| config.database.clone());
    debug!(path = %db_path.display(), "opening database");
    let db = Database::open(&db_path)?;
    let ctx = Context::new(&db, config.converter(), out);

    match &command {
        Commands::Status => commands::list::status(&ctx),
        Commands::Scan { roots } => commands::scan::execute(&ctx, &config, roots),
        Commands::Search {
            query,
            simple,
            names,
            folders,
        } => commands::search::execute(&ctx, query, *simple, *names, *folders),
        Commands::Files {
            ids,
            orphaned,
            path,
            list,
        } => commands::list::files(&ctx, ids, *orphaned, path.as_deref(), list),
        Commands::Folders {
            ids,
            root,
            path,
            list,
        } => commands::list::folders(&ctx, ids, *root, path.as_deref(), list),
        Commands::Tags { command } => commands::tags::execute(&ctx, command),
        Commands::Attach { target, id, tags } => {
            commands::attach::execute(&ctx, *target, *id, tags, false)
        }
        Commands::Detach { target, id, tags } => {
            commands::attach::execute(&ctx, *target, *id, tags, true)
        }
        Commands::Config { .. } => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let kind = e.kind();
            error!(?kind, "command failed");
            eprintln!("Error: {e}");
            ExitCode::from(kind.exit_code())
        }
    }
}
