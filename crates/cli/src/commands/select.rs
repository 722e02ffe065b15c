//! `later` and `now` - search, select, track (and maybe download).

use anyhow::{Context, Result};

use mediathek_core::{transfer_from_config, DownloadStatus, Downloader, FilmEntry};

use crate::output;
use crate::picker;

use super::AppContext;

/// Searches and tracks the selection as queued for a later run.
pub async fn run_later(ctx: &AppContext, query: &[String]) -> Result<()> {
    let selected = search_and_pick(ctx, query)?;
    let added = track(ctx, &selected)?;
    println!("{added} of {} entries marked for download", selected.len());
    Ok(())
}

/// Searches, tracks and downloads the selection right away.
pub async fn run_now(ctx: &AppContext, query: &[String]) -> Result<()> {
    let selected = search_and_pick(ctx, query)?;
    if selected.is_empty() {
        return Ok(());
    }
    track(ctx, &selected)?;

    let config = ctx.config.downloads.clone();
    let transfer = transfer_from_config(&config);
    let downloader = Downloader::new(ctx.store.clone(), transfer, config);
    let summary = downloader.run(selected).await;
    println!(
        "Downloads finished: {} complete, {} failed",
        summary.complete, summary.failed
    );
    Ok(())
}

fn search_and_pick(ctx: &AppContext, query: &[String]) -> Result<Vec<FilmEntry>> {
    let rows = ctx.store.search(query).context("Search failed")?;
    if rows.is_empty() {
        println!("No matches");
        return Ok(Vec::new());
    }
    if ctx.batch {
        return Ok(rows);
    }

    println!("{}", output::search_header());
    let lines: Vec<String> = rows.iter().map(output::search_row).collect();
    let picked = picker::pick(&lines)?;
    Ok(picked.into_iter().map(|i| rows[i].clone()).collect())
}

fn track(ctx: &AppContext, selected: &[FilmEntry]) -> Result<usize> {
    ctx.store
        .save_downloads(selected, DownloadStatus::Queued)
        .context("Failed to track selection")
}
