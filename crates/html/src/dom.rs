use crate::{
    collapse_whitespace, count_links, parse_page_url, preview, ExtractError, ExtractOptions,
    Heading, PageExtractor, PageSignals, NO_META_DESCRIPTION, NO_TITLE,
};
use scraper::{ElementRef, Html, Selector};

const NON_VISIBLE: [&str; 4] = ["script", "style", "noscript", "template"];

/// Extraction over a parsed DOM.
#[derive(Debug, Clone)]
pub struct DomExtractor {
    options: ExtractOptions,
    title: Selector,
    meta: Selector,
    headings: Selector,
    anchors: Selector,
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        detail: e.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

impl DomExtractor {
    pub fn new(options: ExtractOptions) -> Result<Self, ExtractError> {
        Ok(Self {
            options,
            title: selector("title")?,
            meta: selector("meta[name][content]")?,
            headings: selector("h1, h2, h3, h4")?,
            anchors: selector("a[href]")?,
        })
    }

    fn visible_text(document: &Html) -> String {
        let chunks: Vec<&str> = document
            .root_element()
            .descendants()
            .filter_map(|node| {
                let text = node.value().as_text()?;
                let hidden = node
                    .parent()
                    .and_then(|parent| parent.value().as_element().map(|e| e.name()))
                    .is_some_and(|name| NON_VISIBLE.contains(&name));
                (!hidden).then_some(&**text)
            })
            .collect();
        collapse_whitespace(&chunks.join(" "))
    }
}

impl PageExtractor for DomExtractor {
    fn extract(&self, page_url: &str, html: &str) -> Result<PageSignals, ExtractError> {
        let base = parse_page_url(page_url)?;
        let document = Html::parse_document(html);

        let title = document
            .select(&self.title)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string());
        let meta_description = document
            .select(&self.meta)
            .find(|meta| {
                meta.value()
                    .attr("name")
                    .is_some_and(|name| name.eq_ignore_ascii_case("description"))
            })
            .and_then(|meta| meta.value().attr("content"))
            .map(|content| content.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NO_META_DESCRIPTION.to_string());

        let text = Self::visible_text(&document);
        let word_count = text.split_whitespace().count();

        let headings = document
            .select(&self.headings)
            .filter_map(|heading| {
                let level = heading.value().name().strip_prefix('h')?.parse().ok()?;
                let text = element_text(heading);
                (!text.is_empty()).then_some(Heading { level, text })
            })
            .take(self.options.max_headings)
            .collect();

        let (internal_links, external_links) = count_links(
            &base,
            document
                .select(&self.anchors)
                .filter_map(|a| a.value().attr("href")),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_attribute_order_does_not_matter() {
        let extractor = DomExtractor::new(ExtractOptions::default()).unwrap();
        let html = r#"<html><head><meta content="Reversed order" name="Description"></head><body></body></html>"#;
        let signals = extractor.extract("https://example.com", html).unwrap();
        assert_eq!(signals.meta_description, "Reversed order");
        assert_eq!(signals.title, NO_TITLE);
        assert_eq!(signals.word_count, 0);
    }
}
