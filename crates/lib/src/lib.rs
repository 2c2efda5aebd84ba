//! # SEO Audit
//!
//! A three-stage audit pipeline for a single web page. A page auditor fetches the
//! page and extracts a structured audit with its keyword focus, a SERP analyst
//! searches that keyword and summarizes the competition, and an optimization
//! advisor turns both into a prioritized markdown report that is saved to disk.
//!
//! Each stage talks to a language model through [`providers::ai::AiProvider`];
//! the page fetch, web search and report storage sit behind their own traits so
//! the pipeline can be assembled from real adapters or test doubles.
//!
//! ```no_run
//! # async fn demo(
//! #     provider: Box<dyn seo_audit::providers::ai::AiProvider>,
//! #     fetcher: std::sync::Arc<dyn seo_audit::fetch::ContentFetcher>,
//! #     search: std::sync::Arc<dyn seo_audit::providers::search::SearchProvider>,
//! # ) -> Result<(), seo_audit::AuditError> {
//! use seo_audit::{persist::MarkdownReportPersister, SeoAuditPipeline};
//! use std::sync::Arc;
//!
//! let pipeline = SeoAuditPipeline::builder()
//!     .ai_provider(provider)
//!     .fetcher(fetcher)
//!     .search_provider(search)
//!     .persister(Arc::new(MarkdownReportPersister::new("reports")))
//!     .build()?;
//! let report = pipeline.run("seo_user", "https://example.com").await;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod errors;
pub mod fetch;
pub mod persist;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod response;
pub mod session;
pub mod stages;
pub mod state;
pub mod types;

pub use errors::{AuditError, ErrorKind, PromptError, StageName};
pub use pipeline::{AuditOutcome, SeoAuditPipeline, SeoAuditPipelineBuilder};
pub use types::{normalize_serp_results, PageAuditOutput, SerpAnalysis, SerpResult};
