//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters left as-is in path segments and query values
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/news/") // -> "/site/news/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Encode a single path segment or query value
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// URL of the news listing
pub fn news_url(config: &SiteConfig) -> String {
    url_for(config, &config.news.path)
}

/// URL of a post detail page
pub fn post_url(config: &SiteConfig, slug: &str) -> String {
    url_for(
        config,
        &format!("{}/{}", config.news.path, encode_component(slug)),
    )
}

/// Filter value for a category title
///
/// Lowercases and replaces the first space only, matching the links the
/// existing site already publishes.
pub fn category_key(title: &str) -> String {
    title.to_lowercase().replacen(' ', "-", 1)
}

/// Listing URL carrying a category filter
pub fn category_url(config: &SiteConfig, title: &str) -> String {
    format!(
        "{}?category={}",
        news_url(config),
        encode_component(&category_key(title))
    )
}
