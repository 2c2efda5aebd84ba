use crate::{
    collapse_whitespace, count_links, parse_page_url, preview, ExtractError, ExtractOptions,
    Heading, PageExtractor, PageSignals, NO_META_DESCRIPTION, NO_TITLE,
};
use regex::Regex;

/// Pattern-based extraction over the raw markup.
///
/// Fast and dependency-light, but only sees what the patterns describe: a
/// `content` attribute placed before `name` on the description tag is missed.
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    options: ExtractOptions,
    title: Regex,
    meta_description: Regex,
    non_visible: Regex,
    tag: Regex,
    heading: Regex,
    href: Regex,
}

impl RegexExtractor {
    pub fn new(options: ExtractOptions) -> Result<Self, ExtractError> {
        Ok(Self {
            options,
            title: Regex::new(r"(?is)<title[^>]*>(.*?)</title>")?,
            meta_description: Regex::new(
                r#"(?i)<meta[^>]*name=["']description["'][^>]*content=["']([^"']*)["']"#,
            )?,
            non_visible: Regex::new(
                r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!--.*?-->",
            )?,
            tag: Regex::new(r"<[^>]+>")?,
            heading: Regex::new(r"(?is)<h([1-4])\b[^>]*>(.*?)</h[1-4]\s*>")?,
            href: Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']*)["']"#)?,
        })
    }

    fn strip_tags(&self, html: &str) -> String {
        collapse_whitespace(&self.tag.replace_all(html, " "))
    }
}

impl PageExtractor for RegexExtractor {
    fn extract(&self, page_url: &str, html: &str) -> Result<PageSignals, ExtractError> {
        let base = parse_page_url(page_url)?;

        let title = self
            .title
            .captures(html)
            .map(|c| collapse_whitespace(&c[1]))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string());
        let meta_description = self
            .meta_description
            .captures(html)
            .map(|c| c[1].trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NO_META_DESCRIPTION.to_string());

        let visible = self.non_visible.replace_all(html, " ");
        let text = self.strip_tags(&visible);
        let word_count = text.split_whitespace().count();

        let headings = self
            .heading
            .captures_iter(&visible)
            .filter_map(|c| {
                let level = c[1].parse().ok()?;
                let text = self.strip_tags(&c[2]);
                (!text.is_empty()).then_some(Heading { level, text })
            })
            .take(self.options.max_headings)
            .collect();

        let (internal_links, external_links) = count_links(
            &base,
            self.href
                .captures_iter(&visible)
                .filter_map(|c| c.get(1).map(|m| m.as_str())),
        );

        Ok(PageSignals {
            title,
            meta_description,
            preview: preview(&text, self.options.preview_chars),
            text,
            word_count,
            headings,
            internal_links,
            external_links,
        })
    }
}
