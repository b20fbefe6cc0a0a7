//! `stackwright refresh` - Download the schema corpus.

use stackwright_config::AppConfig;

use crate::runtime;

pub async fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let refresher = runtime::refresher(&config);

    let report = if force {
        Some(refresher.refresh().await?)
    } else {
        refresher.refresh_if_stale().await?
    };

    match report {
        Some(report) => {
            println!(
                "✅ {} schemas written to {} ({} entries skipped)",
                report.written.len(),
                refresher.dir().display(),
                report.skipped.len()
            );
        }
        None => println!(
            "Schema corpus in {} is up to date (use --force to download anyway)",
            refresher.dir().display()
        ),
    }

    Ok(())
}
