//! `search` - search without downloading.

use anyhow::{Context, Result};

use crate::output;

use super::AppContext;

pub fn run(ctx: &AppContext, query: &[String]) -> Result<()> {
    let rows = ctx.store.search(query).context("Search failed")?;
    if rows.is_empty() {
        println!("No matches");
        return Ok(());
    }

    if ctx.batch {
        // machine-readable output for scripting
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{}", output::search_header());
        for row in &rows {
            println!("{}", output::search_row(row));
        }
    }
    Ok(())
}
