//! HTML link extraction
//!
//! Pulls every `<a href>` out of a document and resolves it against the URL
//! the document was served from.

use scraper::{Html, Selector};
use url::Url;

/// Extracts all anchor links from an HTML document
///
/// # Extraction Rules
///
/// - Only `<a href="...">` elements are considered, in document order
/// - Relative hrefs are resolved against `base_url`
/// - Absolute hrefs are kept whatever their scheme (`mailto:`, `file:`, ...);
///   deciding what to fetch is the crawl policy's job
/// - Hrefs that cannot be resolved are skipped
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The final (post-redirect) URL of the page
///
/// # Example
///
/// ```
/// use linkcrawl::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="https://www.example.org/foo">foo</a><a href="/bar">bar</a>"#;
/// let base_url = Url::parse("https://www.example.org").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(
///     links,
///     vec!["https://www.example.org/foo", "https://www.example.org/bar"]
/// );
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(e) => {
            tracing::error!("Invalid anchor selector: {:?}", e);
            return Vec::new();
        }
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves an href to an absolute URL string
///
/// Returns None if the href cannot be parsed even relative to `base_url`.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    match base_url.join(href) {
        Ok(absolute_url) => Some(absolute_url.to_string()),
        Err(e) => {
            tracing::trace!("Skipping unresolvable href {:?}: {}", href, e);
            None
        }
    }
}
