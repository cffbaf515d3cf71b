//! URL handling module for Job-Trawl
//!
//! This module provides domain extraction, crawl domain scoping, and
//! page-type classification.

mod domain;

use url::Url;

// Re-export main functions
pub use domain::{extract_domain, DomainScope};

/// Path segment that identifies a job detail page on the default target site
pub const DEFAULT_DETAIL_MARKER: &str = "/job_detail/";

/// Page type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// A single job posting
    Detail,
    /// A paginated search-results page
    Listing,
}

impl PageKind {
    pub fn is_detail(&self) -> bool {
        matches!(self, Self::Detail)
    }
}

/// Classifies a URL as a detail or listing page
///
/// A URL is a detail page if its path contains `marker`. URLs that do not
/// parse are tested as raw strings.
///
/// # Examples
///
/// ```
/// use job_trawl::url::{classify_page, PageKind, DEFAULT_DETAIL_MARKER};
///
/// assert_eq!(
///     classify_page("https://www.zhipin.com/job_detail/abc.html", DEFAULT_DETAIL_MARKER),
///     PageKind::Detail
/// );
/// assert_eq!(
///     classify_page("https://www.zhipin.com/web/geek/job?query=Java", DEFAULT_DETAIL_MARKER),
///     PageKind::Listing
/// );
/// ```
pub fn classify_page(url: &str, marker: &str) -> PageKind {
    let is_detail = match Url::parse(url) {
        Ok(parsed) => parsed.path().contains(marker),
        Err(_) => url.contains(marker),
    };

    if is_detail {
        PageKind::Detail
    } else {
        PageKind::Listing
    }
}
