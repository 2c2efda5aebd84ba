//! # Shared Constants
//!
//! This module provides a centralized location for constants that are shared across
//! the `seo-audit` workspace. Using these constants helps to avoid "magic strings"
//! and ensures consistency.

/// The application name sessions are registered under.
pub const APP_NAME: &str = "seo_audit_team";

/// Sentinel for required values that could not be determined.
pub const NOT_AVAILABLE: &str = "Not available";

/// The exact length of `SerpAnalysis::top_10_results`.
pub const SERP_RESULT_COUNT: usize = 10;

/// Content type given to synthesized competitor entries.
pub const PLACEHOLDER_CONTENT_TYPE: &str = "Placeholder";

/// The default reports directory. The cli resolves a relative one against the
/// directory of the running executable.
pub const REPORTS_DIR: &str = "reports";

/// Default bound on the single page fetch.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default number of characters kept in the content preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 1000;

/// Model calls a structured stage may make. `1` means a rejected answer fails the run.
pub const DEFAULT_VALIDATION_ATTEMPTS: usize = 1;

/// Browser-like identification sent with the page fetch.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Keys of the per-run shared state store.
pub mod state_keys {
    pub const TARGET_URL: &str = "target_url";
    pub const CONVERSATION_HISTORY: &str = "conversation_history";
    pub const PAGE_AUDIT: &str = "page_audit";
    pub const SERP_ANALYSIS: &str = "serp_analysis";
    pub const REPORT_FILE: &str = "report_file";
}
