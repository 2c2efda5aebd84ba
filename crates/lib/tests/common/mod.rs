#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared setup for the pipeline tests: tracing, and a pipeline wired entirely
//! from the mocks in `seo-audit-test-utils`.

use dotenvy::dotenv;
use seo_audit::{persist::ReportPersister, SeoAuditPipeline};
use seo_audit_test_utils::{
    page_audit_json, report_markdown, sample_content, search_results, serp_json, MockAiProvider,
    MockFetcher, MockSearchProvider, RecordingPersister, OPTIMIZATION_ADVISOR_KEY,
    PAGE_AUDITOR_KEY, SERP_ANALYST_KEY,
};
use std::sync::{Arc, Once};

pub const TARGET_URL: &str = "https://www.clayworks.example/mugs";
pub const PRIMARY_KEYWORD: &str = "handmade ceramic mugs";

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        tracing_subscriber::fmt::init();
    });
}

/// The doubles behind a test pipeline, kept for assertions.
pub struct Harness {
    pub ai: MockAiProvider,
    pub fetcher: MockFetcher,
    pub search: MockSearchProvider,
    pub persister: RecordingPersister,
}

impl Harness {
    /// Every stage answers with a valid response and `serp_count` competitors.
    pub fn happy(serp_count: usize) -> Self {
        let ai = MockAiProvider::new();
        ai.add_response(PAGE_AUDITOR_KEY, &page_audit_json(PRIMARY_KEYWORD));
        ai.add_response(SERP_ANALYST_KEY, &serp_json(PRIMARY_KEYWORD, serp_count));
        ai.add_response(OPTIMIZATION_ADVISOR_KEY, &report_markdown());
        Self {
            ai,
            fetcher: MockFetcher::ok(sample_content(TARGET_URL)),
            search: MockSearchProvider::with_results(search_results(serp_count.min(10))),
            persister: RecordingPersister::new(),
        }
    }

    pub fn pipeline(&self) -> SeoAuditPipeline {
        self.pipeline_with(Arc::new(self.persister.clone()), 1)
    }

    pub fn pipeline_with(
        &self,
        persister: Arc<dyn ReportPersister>,
        validation_attempts: usize,
    ) -> SeoAuditPipeline {
        SeoAuditPipeline::builder()
            .ai_provider(Box::new(self.ai.clone()))
            .fetcher(Arc::new(self.fetcher.clone()))
            .search_provider(Arc::new(self.search.clone()))
            .persister(persister)
            .validation_attempts(validation_attempts)
            .build()
            .unwrap()
    }
}
