//! Build the static site

use anyhow::Result;

use crate::builder::{BuildReport, Builder};
use crate::Site;

/// Build the site, always from scratch
pub fn run(site: &Site) -> Result<BuildReport> {
    let start = std::time::Instant::now();

    let report = Builder::new(site).build()?;

    let skipped = report
        .patches
        .iter()
        .filter(|p| !p.outcome.is_applied())
        .count();
    if skipped > 0 {
        tracing::warn!("{} script(s) left unpatched", skipped);
    }

    let duration = start.elapsed();
    tracing::info!(
        "Built {} articles and {} static files in {:.2}s",
        report.articles.len(),
        report.assets_copied,
        duration.as_secs_f64()
    );

    Ok(report)
}
