//! Pipeline assembly and the interactive prompt loop.

use crate::config::{AppConfig, ExtractorKind};
use anyhow::{anyhow, Context, Result};
use seo_audit::{
    persist::MarkdownReportPersister,
    providers::{
        ai::AiProvider,
        factory::create_provider,
        search::grounded::GroundedSearchProvider,
    },
    AuditError, AuditOutcome, SeoAuditPipeline,
};
use seo_audit_html::{DomExtractor, ExtractOptions, PageExtractor, RegexExtractor};
use seo_audit_web::{FetchSettings, HttpContentFetcher};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::info;

const QUIT_KEYWORDS: [&str; 3] = ["quit", "exit", "q"];
const RULE: &str = "==================================================";
const THIN_RULE: &str = "--------------------------------------------------";

fn provider(config: &AppConfig, key: &str, google_search: bool) -> Result<Box<dyn AiProvider>> {
    let provider_config = config
        .providers
        .get(key)
        .ok_or_else(|| anyhow!("Provider '{key}' is not defined under 'providers'."))?;
    create_provider(provider_config, google_search)
        .with_context(|| format!("Failed to configure provider '{key}'"))
}

/// Builds the three-stage pipeline with real adapters from the configuration.
pub fn build_pipeline(config: &AppConfig) -> Result<SeoAuditPipeline> {
    let options = ExtractOptions {
        preview_chars: config.fetch.preview_chars,
        ..Default::default()
    };
    let extractor: Arc<dyn PageExtractor> = match config.fetch.extractor {
        ExtractorKind::Regex => Arc::new(RegexExtractor::new(options)?),
        ExtractorKind::Dom => Arc::new(DomExtractor::new(options)?),
    };
    let fetcher = HttpContentFetcher::with_extractor(
        &FetchSettings {
            timeout_secs: config.fetch.timeout_secs,
            user_agent: config.fetch.user_agent.clone(),
            preview_chars: config.fetch.preview_chars,
        },
        extractor,
    )?;
    let search = GroundedSearchProvider::new(provider(config, &config.search, true)?);
    let reports_dir = config.resolved_reports_dir();

    let pipeline = SeoAuditPipeline::builder()
        .page_auditor_provider(provider(config, &config.stages.page_auditor, false)?)
        .serp_analyst_provider(provider(config, &config.stages.serp_analyst, false)?)
        .optimization_advisor_provider(provider(
            config,
            &config.stages.optimization_advisor,
            false,
        )?)
        .fetcher(Arc::new(fetcher))
        .search_provider(Arc::new(search))
        .persister(Arc::new(MarkdownReportPersister::new(reports_dir.clone())))
        .validation_attempts(config.validation_attempts)
        .build()?;
    info!(
        "Pipeline ready ({:?} extractor); reports go to '{}'.",
        config.fetch.extractor,
        reports_dir.display()
    );
    Ok(pipeline)
}

pub fn is_quit(input: &str) -> bool {
    let input = input.trim();
    QUIT_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(input))
}

pub fn is_valid_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Prints a finished (or failed) audit the way the interactive loop shows it.
pub fn write_outcome(out: &mut impl Write, result: &Result<AuditOutcome, AuditError>) -> Result<()> {
    match result {
        Ok(outcome) => {
            writeln!(out, "\n✅ SEO Audit Complete!")?;
            writeln!(out, "{RULE}")?;
            writeln!(out, "{}", outcome.report)?;
            match (&outcome.saved_to, &outcome.save_error) {
                (Some(path), _) => writeln!(out, "\n📝 Report saved to: {}", path.display())?,
                (None, Some(e)) => writeln!(out, "\n⚠️  Could not save report: {e}")?,
                (None, None) => {}
            }
        }
        Err(e) => {
            writeln!(out, "\n❌ Error during audit: {e}")?;
            writeln!(out, "Please try again with a different URL.")?;
        }
    }
    Ok(())
}

/// Audits one URL and prints the result. Returns whether the audit succeeded.
pub async fn audit_once(
    pipeline: &SeoAuditPipeline,
    user_id: &str,
    url: &str,
    out: &mut impl Write,
) -> Result<bool> {
    writeln!(out, "\n🚀 Starting SEO audit for: {url}")?;
    writeln!(out, "{THIN_RULE}")?;
    out.flush()?;
    let result = pipeline.audit(user_id, url).await;
    write_outcome(out, &result)?;
    Ok(result.is_ok())
}

/// Reads URLs from `input` until a quit keyword or end of input.
pub async fn run_interactive(
    pipeline: &SeoAuditPipeline,
    user_id: &str,
    mut input: impl BufRead,
    mut out: impl Write,
) -> Result<()> {
    writeln!(out, "🔍 SEO Audit Team - Interactive Mode")?;
    writeln!(out, "{RULE}")?;

    loop {
        write!(out, "\n📝 Enter URL to audit (or 'quit' to exit): ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        let line = line.trim();

        if is_quit(line) {
            writeln!(out, "👋 Goodbye!")?;
            break;
        }
        if !is_valid_url(line) {
            writeln!(out, "❌ Please enter a valid URL starting with http:// or https://")?;
            continue;
        }

        audit_once(pipeline, user_id, line, &mut out).await?;
        writeln!(out, "\n{RULE}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_keywords() {
        assert!(is_quit("quit"));
        assert!(is_quit("  EXIT "));
        assert!(is_quit("Q"));
        assert!(!is_quit("quite"));
    }

    #[test]
    fn test_url_prefix() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://example.com"));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("ftp://example.com"));
    }
}
