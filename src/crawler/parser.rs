//! HTML helpers shared by the page handlers
//!
//! This module handles:
//! - Compiling CSS selectors up front
//! - Extracting followable links from a rendered page
//! - Normalizing element text

use crate::url::DomainScope;
use crate::TrawlError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Compiles a CSS selector, reporting the offending pattern on failure
pub fn compile_selector(pattern: &str) -> Result<Selector, TrawlError> {
    Selector::parse(pattern).map_err(|e| TrawlError::Selector {
        selector: pattern.to_string(),
        message: format!("{:?}", e),
    })
}

/// Collects the visible text of an element with whitespace collapsed
pub fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Trims and collapses internal whitespace runs to single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts all followable links from the page that fall inside `scope`
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only anchors
/// - Anything outside the crawl's domain scope
///
/// Links are returned in document order and may contain duplicates.
///
/// # Example
///
/// ```
/// use job_trawl::crawler::extract_links;
/// use job_trawl::url::DomainScope;
/// use url::Url;
///
/// let html = r#"<a href="/job_detail/1.html">Job</a><a href="https://other.com/">x</a>"#;
/// let base = Url::parse("https://www.zhipin.com/web/geek/job").unwrap();
/// let scope = DomainScope::from_start_url("https://www.zhipin.com/");
/// assert_eq!(
///     extract_links(html, &base, &scope),
///     vec!["https://www.zhipin.com/job_detail/1.html".to_string()]
/// );
/// ```
pub fn extract_links(html: &str, base_url: &Url, scope: &DomainScope) -> Vec<String> {
    let document = Html::parse_document(html);
    let a_selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&a_selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .filter(|link| scope.allows(link))
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
