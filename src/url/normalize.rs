/// Returns the portion of a URL string used to de-duplicate fetches
///
/// The fragment never reaches the server, so `page#top` and `page#bottom`
/// name the same fetch. Everything before the first `#` is kept verbatim.
///
/// # Examples
///
/// ```
/// use linkcrawl::url::fetch_key;
///
/// assert_eq!(fetch_key("https://example.org/page#top"), "https://example.org/page");
/// assert_eq!(fetch_key("https://example.org/page"), "https://example.org/page");
/// ```
pub fn fetch_key(url: &str) -> &str {
    match url.find('#') {
        Some(idx) => &url[..idx],
        None => url,
    }
}

/// Returns true for the schemes the crawler is willing to fetch
pub fn is_http_scheme(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}
