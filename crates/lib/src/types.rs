//! # Audit Data Model
//!
//! The structured records that flow between stages. Every record is created fresh
//! per pipeline run and validated before the next stage may read it.
//!
//! Required fields carry no serde default, so a model response that omits one (or
//! sets it to `null`) fails deserialization. List fields default to empty.

use crate::constants::{NOT_AVAILABLE, PLACEHOLDER_CONTENT_TYPE, SERP_RESULT_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Page audit ---

/// A heading level the auditor reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingTag {
    #[serde(alias = "H1")]
    H1,
    #[serde(alias = "H2")]
    H2,
    #[serde(alias = "H3")]
    H3,
    #[serde(alias = "H4")]
    H4,
}

impl HeadingTag {
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingTag::H1 => "h1",
            HeadingTag::H2 => "h2",
            HeadingTag::H3 => "h3",
            HeadingTag::H4 => "h4",
        }
    }
}

impl fmt::Display for HeadingTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingItem {
    pub tag: HeadingTag,
    pub text: String,
}

/// Link statistics. A missing count means "unknown", not zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkCounts {
    #[serde(default)]
    pub internal: Option<u64>,
    #[serde(default)]
    pub external: Option<u64>,
    #[serde(default)]
    pub broken: Option<u64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResults {
    pub title_tag: String,
    pub meta_description: String,
    pub primary_heading: String,
    #[serde(default)]
    pub secondary_headings: Vec<HeadingItem>,
    #[serde(default)]
    pub word_count: Option<u64>,
    pub content_summary: String,
    pub link_counts: LinkCounts,
    #[serde(default)]
    pub technical_findings: Vec<String>,
    #[serde(default)]
    pub content_opportunities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetKeywords {
    pub primary_keyword: String,
    #[serde(default)]
    pub secondary_keywords: Vec<String>,
    pub search_intent: String,
    #[serde(default)]
    pub supporting_topics: Vec<String>,
}

/// The sole artifact of the page-audit stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAuditOutput {
    pub audit_results: AuditResults,
    pub target_keywords: TargetKeywords,
}

impl PageAuditOutput {
    /// Replaces blank required strings with the [`NOT_AVAILABLE`] sentinel.
    pub fn fill_sentinels(&mut self) {
        let audit = &mut self.audit_results;
        for field in [
            &mut audit.title_tag,
            &mut audit.meta_description,
            &mut audit.primary_heading,
            &mut audit.content_summary,
        ] {
            fill_blank(field);
        }
        fill_blank(&mut self.target_keywords.primary_keyword);
        fill_blank(&mut self.target_keywords.search_intent);
        audit
            .secondary_headings
            .retain(|heading| !heading.text.trim().is_empty());
    }

    /// Checks every required string is populated.
    pub fn validate(&self) -> Result<(), String> {
        let audit = &self.audit_results;
        let keywords = &self.target_keywords;
        let violations: Vec<&str> = [
            ("audit_results.title_tag", &audit.title_tag),
            ("audit_results.meta_description", &audit.meta_description),
            ("audit_results.primary_heading", &audit.primary_heading),
            ("audit_results.content_summary", &audit.content_summary),
            ("target_keywords.primary_keyword", &keywords.primary_keyword),
            ("target_keywords.search_intent", &keywords.search_intent),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(format!("required fields are empty: {}", violations.join(", ")))
        }
    }
}

// --- SERP analysis ---

/// A raw organic result as returned by a search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerpResult {
    pub rank: u32,
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub content_type: String,
}

impl SerpResult {
    /// A synthesized competitor entry standing in for a missing organic result.
    pub fn placeholder(keyword: &str, rank: u32) -> Self {
        Self {
            rank,
            title: format!("{keyword} - Placeholder Result #{rank}"),
            url: format!("https://example.com/placeholder-{rank}"),
            snippet: format!(
                "No organic result was available at position {rank} for \"{keyword}\"."
            ),
            content_type: PLACEHOLDER_CONTENT_TYPE.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.content_type == PLACEHOLDER_CONTENT_TYPE
    }
}

/// The sole artifact of the SERP-analysis stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerpAnalysis {
    pub primary_keyword: String,
    pub top_10_results: Vec<SerpResult>,
    #[serde(default)]
    pub title_patterns: Vec<String>,
    #[serde(default)]
    pub content_formats: Vec<String>,
    #[serde(default)]
    pub people_also_ask: Vec<String>,
    #[serde(default)]
    pub key_themes: Vec<String>,
    #[serde(default)]
    pub differentiation_opportunities: Vec<String>,
}

impl SerpAnalysis {
    /// Checks the competitor list is exactly [`SERP_RESULT_COUNT`] long, ranked 1..=10,
    /// with every required string populated.
    pub fn validate(&self) -> Result<(), String> {
        if self.primary_keyword.trim().is_empty() {
            return Err("primary_keyword is empty".to_string());
        }
        if self.top_10_results.len() != SERP_RESULT_COUNT {
            return Err(format!(
                "top_10_results has {} entries, expected {SERP_RESULT_COUNT}",
                self.top_10_results.len()
            ));
        }
        for (i, result) in self.top_10_results.iter().enumerate() {
            let expected_rank = i as u32 + 1;
            if result.rank != expected_rank {
                return Err(format!(
                    "top_10_results[{i}] has rank {}, expected {expected_rank}",
                    result.rank
                ));
            }
            let blank = [
                ("title", &result.title),
                ("url", &result.url),
                ("snippet", &result.snippet),
                ("content_type", &result.content_type),
            ]
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());
            if let Some((name, _)) = blank {
                return Err(format!("top_10_results[{i}].{name} is empty"));
            }
        }
        Ok(())
    }

    /// Number of synthesized entries in the competitor list.
    pub fn placeholder_count(&self) -> usize {
        self.top_10_results
            .iter()
            .filter(|r| r.is_placeholder())
            .count()
    }
}

/// Normalizes a competitor list to exactly [`SERP_RESULT_COUNT`] entries.
///
/// Entries are ordered by the rank the model assigned (unranked `0` entries last),
/// truncated, padded with [`SerpResult::placeholder`] and renumbered from 1.
pub fn normalize_serp_results(keyword: &str, mut results: Vec<SerpResult>) -> Vec<SerpResult> {
    results.sort_by_key(|r| if r.rank == 0 { u32::MAX } else { r.rank });
    results.truncate(SERP_RESULT_COUNT);

    for result in results.iter_mut() {
        fill_blank(&mut result.title);
        fill_blank(&mut result.url);
        fill_blank(&mut result.snippet);
        fill_blank(&mut result.content_type);
    }

    while results.len() < SERP_RESULT_COUNT {
        results.push(SerpResult::placeholder(keyword, 0));
    }

    for (i, result) in results.iter_mut().enumerate() {
        let rank = i as u32 + 1;
        if result.is_placeholder() && result.rank == 0 {
            *result = SerpResult::placeholder(keyword, rank);
        }
        result.rank = rank;
    }
    results
}

fn fill_blank(value: &mut String) {
    if value.trim().is_empty() {
        *value = NOT_AVAILABLE.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serp(rank: u32, title: &str) -> SerpResult {
        SerpResult {
            rank,
            title: title.to_string(),
            url: format!("https://{title}.example.org"),
            snippet: "snippet".to_string(),
            content_type: "Blog post".to_string(),
        }
    }

    #[test]
    fn test_normalize_pads_empty_list_to_ten() {
        let results = normalize_serp_results("ai tools", vec![]);
        assert_eq!(results.len(), SERP_RESULT_COUNT);
        assert!(results.iter().all(SerpResult::is_placeholder));
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[9].rank, 10);
        assert_eq!(results[9].url, "https://example.com/placeholder-10");
    }

    #[test]
    fn test_normalize_keeps_real_results_first() {
        let results = normalize_serp_results(
            "ai tools",
            vec![serp(3, "c"), serp(1, "a"), serp(2, "b")],
        );
        assert_eq!(results.len(), SERP_RESULT_COUNT);
        let titles: Vec<&str> = results.iter().take(3).map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert!(results[3..].iter().all(SerpResult::is_placeholder));
        assert_eq!(results[3].rank, 4);
        assert!(results[3].title.contains("#4"));
    }

    #[test]
    fn test_normalize_truncates_to_ten() {
        let many = (1..=15).map(|i| serp(i, &format!("r{i}"))).collect();
        let results = normalize_serp_results("ai tools", many);
        assert_eq!(results.len(), SERP_RESULT_COUNT);
        assert_eq!(results.last().unwrap().title, "r10");
        assert!(results.iter().all(|r| !r.is_placeholder()));
    }

    #[test]
    fn test_normalize_moves_unranked_entries_last_and_fills_blanks() {
        let mut unranked = serp(0, "z");
        unranked.snippet = "  ".to_string();
        let results = normalize_serp_results("kw", vec![unranked, serp(1, "a")]);
        assert_eq!(results[0].title, "a");
        assert_eq!(results[1].title, "z");
        assert_eq!(results[1].rank, 2);
        assert_eq!(results[1].snippet, NOT_AVAILABLE);
    }

    #[test]
    fn test_serp_analysis_validate_rejects_short_list() {
        let analysis = SerpAnalysis {
            primary_keyword: "kw".to_string(),
            top_10_results: vec![serp(1, "a")],
            title_patterns: vec![],
            content_formats: vec![],
            people_also_ask: vec![],
            key_themes: vec![],
            differentiation_opportunities: vec![],
        };
        let err = analysis.validate().unwrap_err();
        assert!(err.contains("has 1 entries"));
    }

    #[test]
    fn test_page_audit_missing_required_field_fails_to_parse() {
        let json = r#"{
            "audit_results": {
                "title_tag": "Home",
                "meta_description": "Desc",
                "content_summary": "Summary",
                "link_counts": {}
            },
            "target_keywords": { "primary_keyword": "kw", "search_intent": "informational" }
        }"#;
        let err = serde_json::from_str::<PageAuditOutput>(json).unwrap_err();
        assert!(err.to_string().contains("primary_heading"));
    }

    #[test]
    fn test_page_audit_null_required_field_fails_to_parse() {
        let json = r#"{
            "audit_results": {
                "title_tag": null,
                "meta_description": "Desc",
                "primary_heading": "H1",
                "content_summary": "Summary",
                "link_counts": {}
            },
            "target_keywords": { "primary_keyword": "kw", "search_intent": "informational" }
        }"#;
        assert!(serde_json::from_str::<PageAuditOutput>(json).is_err());
    }

    #[test]
    fn test_fill_sentinels_then_validate() {
        let json = r#"{
            "audit_results": {
                "title_tag": "",
                "meta_description": " ",
                "primary_heading": "Welcome",
                "secondary_headings": [{"tag": "H2", "text": "About"}, {"tag": "h3", "text": ""}],
                "content_summary": "Summary",
                "link_counts": {"internal": 4}
            },
            "target_keywords": { "primary_keyword": "kw", "search_intent": "" }
        }"#;
        let mut output: PageAuditOutput = serde_json::from_str(json).unwrap();
        assert!(output.validate().is_err());

        output.fill_sentinels();
        assert!(output.validate().is_ok());
        assert_eq!(output.audit_results.title_tag, NOT_AVAILABLE);
        assert_eq!(output.target_keywords.search_intent, NOT_AVAILABLE);
        assert_eq!(output.audit_results.secondary_headings.len(), 1);
        assert_eq!(output.audit_results.secondary_headings[0].tag, HeadingTag::H2);
        assert_eq!(output.audit_results.link_counts.internal, Some(4));
        assert_eq!(output.audit_results.link_counts.external, None);
    }

    #[test]
    fn test_negative_word_count_is_rejected() {
        let json = r#"{
            "audit_results": {
                "title_tag": "t", "meta_description": "m", "primary_heading": "h",
                "word_count": -5, "content_summary": "s", "link_counts": {}
            },
            "target_keywords": { "primary_keyword": "kw", "search_intent": "i" }
        }"#;
        assert!(serde_json::from_str::<PageAuditOutput>(json).is_err());
    }
}
