//! `download` - process pending downloads.

use anyhow::{Context, Result};

use mediathek_core::{transfer_from_config, DownloadStatus, Downloader};

use super::AppContext;

/// Runs transfers for queued and failed rows, plus rows stuck Active from
/// an interrupted earlier run.
pub async fn run(ctx: &AppContext) -> Result<()> {
    let pending = ctx
        .store
        .read_download_entries(&[
            DownloadStatus::Queued,
            DownloadStatus::Failed,
            DownloadStatus::Active,
        ])
        .context("Failed to read pending downloads")?;
    if pending.is_empty() {
        println!("No pending downloads");
        return Ok(());
    }

    let config = ctx.config.downloads.clone();
    let transfer = transfer_from_config(&config);
    let downloader = Downloader::new(ctx.store.clone(), transfer, config);
    let summary = downloader.run(pending).await;
    println!(
        "Downloads finished: {} complete, {} failed of {}",
        summary.complete, summary.failed, summary.total
    );
    Ok(())
}
