//! Search command - find files or folders matching a tag query

use super::{Context, Result};
use crate::output;
use crate::search::{Query, SearchOptions, search_files, search_folders};
use tracing::debug;

/// Parse `text` in the requested dialect
///
/// # Errors
/// Returns `SearchError::MalformedQuery` if the full dialect does not parse.
pub fn parse_query(text: &str, simple: bool) -> Result<Query> {
    let query = if simple {
        Query::parse_simple(text)
    } else {
        Query::parse(text)?
    };
    debug!(?query, "parsed query");
    Ok(query)
}

/// Execute the search command
///
/// # Errors
/// Returns an error if the query is malformed or the store cannot be queried.
pub fn execute(
    ctx: &Context<'_>,
    text: &str,
    simple: bool,
    names: bool,
    folders: bool,
) -> Result<()> {
    let query = parse_query(text, simple)?;
    let options = SearchOptions { match_names: names };

    if folders {
        let found = search_folders(ctx.db, &query, options)?;
        ctx.out.info(format!("{} folder(s) match", found.len()));
        let projected = ctx.converter.folders(ctx.db, &found)?;
        ctx.out.items(&projected, output::folder_line)?;
    } else {
        let found = search_files(ctx.db, &query, options)?;
        ctx.out.info(format!("{} file(s) match", found.len()));
        let projected = ctx.converter.files(ctx.db, &found)?;
        ctx.out.items(&projected, output::file_line)?;
    }
    Ok(())
}
