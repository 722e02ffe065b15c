//! `update` - refresh the catalog.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;

use mediathek_core::{
    update_catalog, CompositeFilter, FilmFilter, IngestOptions, InheritFields, UpdateSource,
};

use super::AppContext;

pub async fn run(ctx: &AppContext, source: Option<&str>) -> Result<()> {
    let catalog = &ctx.config.catalog;
    let spec = source.unwrap_or(&catalog.source);
    let source = UpdateSource::from_spec(spec, &catalog.snapshot_path);

    let filter: Arc<dyn FilmFilter> = Arc::new(CompositeFilter::retention(
        Local::now().date_naive(),
        catalog.max_age_days,
        catalog.min_duration_minutes,
    ));
    let options = IngestOptions {
        inherit: if catalog.inherit_all_fields {
            InheritFields::All
        } else {
            InheritFields::StationTopic
        },
        ..IngestOptions::default()
    };

    let report = update_catalog(Arc::clone(&ctx.store), source, filter, options)
        .await
        .context("Catalog refresh failed")?;
    println!(
        "Catalog refreshed: kept {} of {} entries",
        report.kept, report.parsed
    );
    Ok(())
}
