//! # Report Persistence
//!
//! Writes the final report to `reports/seo_audit_{host}_{YYYY-MM-DD_HH-MM-SS}.md`
//! inside a fixed markdown envelope. Write failures come back as
//! [`AuditError::PersistFailed`] values; nothing here panics.

use crate::errors::AuditError;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use url::Url;

const UNKNOWN_HOST: &str = "unknown_host";

/// Stores a finished report somewhere durable.
#[async_trait]
pub trait ReportPersister: Send + Sync + Debug {
    /// Saves `content` for the audited `url`, returning where it was written.
    async fn persist(&self, url: &str, content: &str) -> Result<PathBuf, AuditError>;
}

/// Derives a filesystem-safe identifier from the URL's host.
///
/// The URL parser lowercases hosts of `http`/`https` URLs, so
/// `https://www.Example.com/page` yields `example_com`. A leading `www.` is
/// stripped, dots become underscores and a non-default port is appended.
pub fn host_identifier(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return UNKNOWN_HOST.to_string();
    };
    let Some(host) = parsed.host_str() else {
        return UNKNOWN_HOST.to_string();
    };
    let host = host.strip_prefix("www.").unwrap_or(host);
    let mut id: String = host
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if let Some(port) = parsed.port() {
        id.push_str(&format!("_{port}"));
    }
    if id.trim_matches('_').is_empty() {
        return UNKNOWN_HOST.to_string();
    }
    id
}

pub fn report_filename(url: &str, timestamp: &DateTime<Local>) -> String {
    format!(
        "seo_audit_{}_{}.md",
        host_identifier(url),
        timestamp.format("%Y-%m-%d_%H-%M-%S")
    )
}

/// Wraps the report body in the standard envelope.
pub fn render_report_markdown(url: &str, content: &str, timestamp: &DateTime<Local>) -> String {
    format!(
        "# SEO Audit Report\n\n**URL:** {url}  \n**Generated:** {}  \n**Agent:** AI SEO Audit Team  \n\n---\n\n{content}\n\n---\n\n*Report generated by AI SEO Audit Team*\n",
        timestamp.format("%Y-%m-%d %H:%M:%S")
    )
}

/// The line recorded in the conversation after a save attempt.
pub fn save_confirmation(result: &Result<PathBuf, AuditError>) -> String {
    match result {
        Ok(path) => format!(
            "SEO audit report successfully saved to: {}",
            path.display()
        ),
        Err(e) => e.to_string(),
    }
}

/// Writes reports as markdown files under a single directory.
#[derive(Debug, Clone)]
pub struct MarkdownReportPersister {
    reports_dir: PathBuf,
}

impl MarkdownReportPersister {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Saves the report as if it were generated at `timestamp`.
    pub async fn persist_at(
        &self,
        url: &str,
        content: &str,
        timestamp: DateTime<Local>,
    ) -> Result<PathBuf, AuditError> {
        tokio::fs::create_dir_all(&self.reports_dir)
            .await
            .map_err(|e| {
                AuditError::PersistFailed(format!(
                    "cannot create '{}': {e}",
                    self.reports_dir.display()
                ))
            })?;

        let path = self.reports_dir.join(report_filename(url, &timestamp));
        let markdown = render_report_markdown(url, content, &timestamp);
        tokio::fs::write(&path, markdown).await.map_err(|e| {
            AuditError::PersistFailed(format!("cannot write '{}': {e}", path.display()))
        })?;
        Ok(path)
    }
}

#[async_trait]
impl ReportPersister for MarkdownReportPersister {
    async fn persist(&self, url: &str, content: &str) -> Result<PathBuf, AuditError> {
        let result = self.persist_at(url, content, Local::now()).await;
        match &result {
            Ok(path) => info!("[persist] Report saved to: {}", path.display()),
            Err(e) => error!("[persist] {e}"),
        }
        result
    }
}
