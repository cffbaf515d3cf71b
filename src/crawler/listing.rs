//! Listing page handling
//!
//! Search-result pages are served in several markup variants. The handler
//! tries each known card selector in order and harvests the first one that
//! matches anything, then computes the URL of the next results page.

use crate::crawler::parser::{compile_selector, resolve_link};
use crate::url::classify_page;
use crate::TrawlError;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::form_urlencoded;
use url::Url;

/// Job card link selectors, most specific first
pub const LISTING_LINK_SELECTORS: &[&str] = &[
    "a.job-card-left",
    "a[ka*='job_list']",
    ".job-list-box a[href*='/job_detail/']",
];

/// Harvests detail links from listing pages and builds pagination URLs
pub struct ListingHandler {
    selectors: Vec<(String, Selector)>,
    detail_marker: String,
    url_template: String,
}

impl ListingHandler {
    /// Creates a handler with the default card selectors
    pub fn new(url_template: &str, detail_marker: &str) -> Result<Self, TrawlError> {
        Self::with_selectors(LISTING_LINK_SELECTORS, url_template, detail_marker)
    }

    /// Creates a handler with a custom selector chain
    pub fn with_selectors(
        patterns: &[&str],
        url_template: &str,
        detail_marker: &str,
    ) -> Result<Self, TrawlError> {
        let selectors = patterns
            .iter()
            .map(|pattern| Ok((pattern.to_string(), compile_selector(pattern)?)))
            .collect::<Result<Vec<_>, TrawlError>>()?;

        Ok(Self {
            selectors,
            detail_marker: detail_marker.to_string(),
            url_template: url_template.to_string(),
        })
    }

    /// Returns the detail URLs linked from a listing page
    ///
    /// Only the first selector with any hits is used. Its hrefs are resolved
    /// against `base_url`, kept if they point at a detail page, and deduped in
    /// document order.
    ///
    /// The crawler also merges every other detail anchor on the page, so the
    /// first-selector rule only decides which links this count reports.
    pub fn harvest_detail_links(&self, html: &str, base_url: &Url) -> Vec<String> {
        let document = Html::parse_document(html);

        for (pattern, selector) in &self.selectors {
            let hits: Vec<_> = document.select(selector).collect();
            if hits.is_empty() {
                continue;
            }

            let mut seen = HashSet::new();
            let links: Vec<String> = hits
                .iter()
                .filter_map(|element| element.value().attr("href"))
                .filter_map(|href| resolve_link(href, base_url))
                .filter(|link| classify_page(link, &self.detail_marker).is_detail())
                .filter(|link| seen.insert(link.clone()))
                .collect();

            tracing::debug!(
                "Selector '{}' matched {} cards, {} detail links",
                pattern,
                hits.len(),
                links.len()
            );
            return links;
        }

        tracing::debug!("No job card selector matched on {}", base_url);
        Vec::new()
    }

    /// Builds the URL of listing page `page` for this handler's template
    pub fn next_listing_url(&self, query: &str, city_code: &str, page: u32) -> String {
        build_listing_url(&self.url_template, query, city_code, page)
    }
}

/// Substitutes `{query}`, `{city}` and `{page}` into a listing URL template
///
/// The query and city are form-url-encoded.
///
/// # Example
///
/// ```
/// use job_trawl::config::DEFAULT_LISTING_TEMPLATE;
/// use job_trawl::crawler::build_listing_url;
///
/// assert_eq!(
///     build_listing_url(DEFAULT_LISTING_TEMPLATE, "Java", "101300600", 2),
///     "https://www.zhipin.com/web/geek/job?query=Java&city=101300600&page=2"
/// );
/// ```
pub fn build_listing_url(template: &str, query: &str, city_code: &str, page: u32) -> String {
    template
        .replace("{query}", &encode(query))
        .replace("{city}", &encode(city_code))
        .replace("{page}", &page.to_string())
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
