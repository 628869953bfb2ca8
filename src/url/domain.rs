use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (`mailto:`, `data:` and similar), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkcrawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the host used for domain scoping
///
/// This is the lowercase host followed by `:port` when the URL names a port
/// other than the scheme's default, so `https://example.org` and
/// `https://example.org:443` share a key while `http://127.0.0.1:8080`
/// and `http://127.0.0.1:9090` do not.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkcrawl::url::host_key;
///
/// let url = Url::parse("https://example.org:443/").unwrap();
/// assert_eq!(host_key(&url), Some("example.org".to_string()));
///
/// let url = Url::parse("http://localhost:8080/").unwrap();
/// assert_eq!(host_key(&url), Some("localhost:8080".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    let domain = extract_domain(url)?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", domain, port),
        None => domain,
    })
}
