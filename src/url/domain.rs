use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use job_trawl::url::extract_domain;
///
/// let url = Url::parse("https://www.zhipin.com/web/geek/job").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.zhipin.com".to_string()));
///
/// let url = Url::parse("https://WWW.ZHIPIN.COM/").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.zhipin.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// The set of hosts a crawl run is allowed to follow links into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainScope {
    /// Only links whose host equals this domain are followed
    Restricted(String),

    /// The start URL had no usable host, so scoping is off and every
    /// http(s) link passes
    Unrestricted,
}

impl DomainScope {
    /// Derives the scope from a run's start URL
    ///
    /// An unparsable start URL, or one without a host, yields `Unrestricted`.
    /// Callers are expected to log that degraded mode.
    pub fn from_start_url(start_url: &str) -> Self {
        match Url::parse(start_url).ok().as_ref().and_then(extract_domain) {
            Some(domain) => Self::Restricted(domain),
            None => Self::Unrestricted,
        }
    }

    /// Returns true if `url` may be followed under this scope
    pub fn allows(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(_) => return false,
        };

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return false;
        }

        match self {
            Self::Restricted(domain) => extract_domain(&parsed).as_deref() == Some(domain.as_str()),
            Self::Unrestricted => true,
        }
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Restricted(_))
    }
}
