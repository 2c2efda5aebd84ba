//! # Report Persistence Tests
//!
//! Verifies the markdown report files written by `MarkdownReportPersister`.

use chrono::{Duration, Local, TimeZone};
use seo_audit::{
    persist::{MarkdownReportPersister, ReportPersister},
    ErrorKind,
};

#[tokio::test]
async fn test_persist_writes_enveloped_report() {
    // --- 1. Arrange ---
    let dir = tempfile::tempdir().unwrap();
    let reports_dir = dir.path().join("reports");
    let persister = MarkdownReportPersister::new(&reports_dir);

    // --- 2. Act ---
    let path = persister
        .persist("https://www.Example.com/pricing", "## Executive Summary\n\nAll good.")
        .await
        .unwrap();

    // --- 3. Assert ---
    assert!(path.starts_with(&reports_dir));
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("seo_audit_example_com_"), "{name}");
    assert!(name.ends_with(".md"));

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("# SEO Audit Report"));
    assert!(written.contains("**URL:** https://www.Example.com/pricing"));
    assert!(written.contains("## Executive Summary\n\nAll good."));
}

#[tokio::test]
async fn test_distinct_seconds_give_distinct_files() {
    let dir = tempfile::tempdir().unwrap();
    let persister = MarkdownReportPersister::new(dir.path());
    let first_ts = Local.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();

    let first = persister
        .persist_at("https://example.com", "first", first_ts)
        .await
        .unwrap();
    let second = persister
        .persist_at("https://example.com", "second", first_ts + Duration::seconds(1))
        .await
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    assert!(std::fs::read_to_string(&first).unwrap().contains("first"));
    assert!(std::fs::read_to_string(&second).unwrap().contains("second"));
}

#[tokio::test]
async fn test_unwritable_directory_is_persist_failed() {
    // A regular file where the reports directory should be.
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("reports");
    std::fs::write(&blocker, "not a directory").unwrap();
    let persister = MarkdownReportPersister::new(&blocker);

    let err = persister
        .persist("https://example.com", "body")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PersistFailed);
    assert!(err.to_string().starts_with("Failed to save report: "));
}
