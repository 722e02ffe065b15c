//! `list` and `edit` - inspect and prune the pending list.

use anyhow::{Context, Result};

use mediathek_core::DownloadStatus;

use crate::output;
use crate::picker;

use super::AppContext;

pub fn run(ctx: &AppContext, status: Option<&str>) -> Result<()> {
    let statuses = parse_statuses(status)?;
    let rows = ctx
        .store
        .read_download_list(&statuses)
        .context("Failed to read downloads")?;
    if rows.is_empty() {
        println!("No tracked downloads");
        return Ok(());
    }
    println!("{}", output::download_header());
    for row in &rows {
        println!("{}", output::download_row(row));
    }
    Ok(())
}

/// Shows the tracked list and deletes the picked rows.
pub fn run_edit(ctx: &AppContext) -> Result<()> {
    let rows = ctx
        .store
        .read_download_list(&[])
        .context("Failed to read downloads")?;
    if rows.is_empty() {
        println!("No tracked downloads");
        return Ok(());
    }

    println!("{}", output::download_header());
    let lines: Vec<String> = rows.iter().map(output::download_row).collect();
    let picked = picker::pick(&lines)?;
    if picked.is_empty() {
        println!("Nothing selected");
        return Ok(());
    }

    let ids: Vec<String> = picked.into_iter().map(|i| rows[i].id.clone()).collect();
    let removed = ctx
        .store
        .delete_downloads(&ids)
        .context("Failed to delete downloads")?;
    println!("{removed} entries removed");
    Ok(())
}

fn parse_statuses(raw: Option<&str>) -> Result<Vec<DownloadStatus>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().parse().map_err(anyhow::Error::msg))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_statuses_accepts_codes_and_names() {
        let statuses = parse_statuses(Some("V,failed")).unwrap();
        assert_eq!(
            statuses,
            vec![DownloadStatus::Queued, DownloadStatus::Failed]
        );
        assert!(parse_statuses(None).unwrap().is_empty());
        assert!(parse_statuses(Some("bogus")).is_err());
    }
}
