//! Keeping the on-disk schema corpus current.
//!
//! AWS publishes every resource provider schema for a region as one zip
//! (`CloudformationSchema.zip`). [`CorpusRefresher`] downloads it, normalizes
//! each document and writes it as YAML next to a `.lastupdated` stamp.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::SchemaError;
use crate::normalize::normalize_schema;

const STAMP_FILE: &str = ".lastupdated";

/// Outcome of unpacking one schema bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Corpus files written, in archive order.
    pub written: Vec<String>,
    /// Archive entries that were not schema documents or failed to parse.
    pub skipped: Vec<String>,
}

/// Downloads and unpacks the regional schema bundle into a corpus directory.
pub struct CorpusRefresher {
    dir: PathBuf,
    region: String,
    interval: Duration,
    base_url: Option<String>,
    client: reqwest::Client,
}

impl CorpusRefresher {
    pub fn new(dir: impl Into<PathBuf>, region: impl Into<String>, interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            region: region.into(),
            interval,
            base_url: None,
            client: reqwest::Client::new(),
        }
    }

    /// Fetch the bundle from `{base_url}/CloudformationSchema.zip` instead of
    /// the regional AWS endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn url(&self) -> String {
        match &self.base_url {
            Some(base) => format!("{base}/CloudformationSchema.zip"),
            None => bundle_url(&self.region),
        }
    }

    /// Unix timestamp of the last successful refresh, 0 if there was none or
    /// the stamp is unreadable. Creates the corpus directory if missing.
    pub fn last_updated(&self) -> Result<i64, SchemaError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| SchemaError::io(&self.dir, e))?;
        let stamp = self.dir.join(STAMP_FILE);
        match std::fs::read_to_string(&stamp) {
            Ok(raw) => Ok(raw.trim().parse().unwrap_or(0)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(SchemaError::io(stamp, e)),
        }
    }

    pub fn mark_updated(&self, now: i64) -> Result<(), SchemaError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| SchemaError::io(&self.dir, e))?;
        let stamp = self.dir.join(STAMP_FILE);
        std::fs::write(&stamp, now.to_string()).map_err(|e| SchemaError::io(stamp, e))
    }

    pub fn needs_refresh(&self, now: i64) -> Result<bool, SchemaError> {
        let age = now.saturating_sub(self.last_updated()?);
        let interval = i64::try_from(self.interval.as_secs()).unwrap_or(i64::MAX);
        Ok(age > interval)
    }

    /// Download the bundle, rewrite the corpus and stamp it.
    pub async fn refresh(&self) -> Result<RefreshReport, SchemaError> {
        let url = self.url();
        info!(url = %url, dir = %self.dir.display(), "Refreshing schema corpus");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SchemaError::Download {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SchemaError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| SchemaError::Download {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        debug!(bytes = bytes.len(), "Schema bundle downloaded");

        std::fs::create_dir_all(&self.dir).map_err(|e| SchemaError::io(&self.dir, e))?;
        let report = extract_bundle(&bytes, &self.dir)?;
        self.mark_updated(chrono::Utc::now().timestamp())?;

        info!(
            written = report.written.len(),
            skipped = report.skipped.len(),
            "Schema corpus refreshed"
        );
        Ok(report)
    }

    /// Refresh only when the stamp is older than the interval. Returns
    /// `None` when the corpus is already current.
    pub async fn refresh_if_stale(&self) -> Result<Option<RefreshReport>, SchemaError> {
        if !self.needs_refresh(chrono::Utc::now().timestamp())? {
            debug!(dir = %self.dir.display(), "Schema corpus is up to date");
            return Ok(None);
        }
        self.refresh().await.map(Some)
    }
}

/// Regional download location of the schema bundle.
pub fn bundle_url(region: &str) -> String {
    format!("https://schema.cloudformation.{region}.amazonaws.com/CloudformationSchema.zip")
}

/// Unpack a schema bundle into `dir`, normalizing every document.
pub fn extract_bundle(bytes: &[u8], dir: &Path) -> Result<RefreshReport, SchemaError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| SchemaError::Archive(e.to_string()))?;

    let mut report = RefreshReport::default();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| SchemaError::Archive(e.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();

        let Some(target) = target_file_name(&name) else {
            debug!(entry = %name, "Skipping non-schema archive entry");
            report.skipped.push(name);
            continue;
        };

        let mut raw = String::new();
        if let Err(e) = entry.read_to_string(&mut raw) {
            warn!(entry = %name, error = %e, "Unreadable archive entry");
            report.skipped.push(name);
            continue;
        }

        let document = match parse_document(&name, &raw) {
            Ok(doc) => doc,
            Err(reason) => {
                warn!(entry = %name, error = %reason, "Skipping unparseable schema");
                report.skipped.push(name);
                continue;
            }
        };

        let yaml = serde_yaml::to_string(&normalize_schema(document)).map_err(|e| {
            SchemaError::Write {
                file: target.clone(),
                reason: e.to_string(),
            }
        })?;
        let path = dir.join(&target);
        std::fs::write(&path, yaml).map_err(|e| SchemaError::io(path, e))?;
        report.written.push(target);
    }

    Ok(report)
}

/// Corpus file name for an archive entry, `None` for non-schema entries.
/// Directory components are dropped.
fn target_file_name(entry: &str) -> Option<String> {
    let file = Path::new(entry).file_name()?.to_str()?;
    let stem = file
        .strip_suffix(".json")
        .or_else(|| file.strip_suffix(".yaml"))
        .or_else(|| file.strip_suffix(".yml"))?;
    if stem.is_empty() {
        return None;
    }
    Some(format!("{stem}.yml"))
}

fn parse_document(name: &str, raw: &str) -> Result<Value, String> {
    if name.ends_with(".json") {
        serde_json::from_str(raw).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(raw).map_err(|e| e.to_string())
    }
}
