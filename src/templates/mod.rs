//! Built-in news templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping stays on for every
//! `.html` template; the rendered rich-content body is the only value marked
//! safe.

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::error::Result;
use crate::helpers::{html_escape, news_url, truncate, url_for};

/// Template renderer with the embedded news theme
pub struct TemplateRenderer {
    tera: Tera,
    site: SiteData,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();
        // Escapes &<>"' only; `/` stays literal in URLs
        tera.set_escape_fn(html_escape);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("news/layout.html")),
            ("news.html", include_str!("news/news.html")),
            ("post.html", include_str!("news/post.html")),
            ("not_found.html", include_str!("news/not_found.html")),
            ("error.html", include_str!("news/error.html")),
            // Partials
            (
                "partials/page_header.html",
                include_str!("news/partials/page_header.html"),
            ),
            (
                "partials/macros.html",
                include_str!("news/partials/macros.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self {
            tera,
            site: SiteData::from_config(config),
        })
    }

    /// Render a template with the site data plus one named value
    pub fn render<T: Serialize>(&self, template_name: &str, key: &str, value: &T) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert(key, value);
        Ok(self.tera.render(template_name, &context)?)
    }

    /// Render a template that only needs the site data
    pub fn render_plain(&self, template_name: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", &self.site);
        Ok(self.tera.render(template_name, &context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(truncate(&s, length, Some(&omission))))
}

/// Site-wide values available to every template as `site`
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub root: String,
    pub news_title: String,
    pub news_subtitle: String,
    pub news_url: String,
    pub version: &'static str,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            root: url_for(config, ""),
            news_title: config.news.title.clone(),
            news_subtitle: config.news.subtitle.clone(),
            news_url: news_url(config),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_templates_load() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();
        let html = renderer.render_plain("not_found.html").unwrap();
        assert!(html.contains("404"));
        assert!(html.contains(r#"href="/news""#));
    }

    #[test]
    fn test_truncate_chars_filter() {
        let mut args = HashMap::new();
        args.insert("length".to_string(), json!(8));
        let out = truncate_chars_filter(&json!("Hello World"), &args).unwrap();
        assert_eq!(out, json!("Hello..."));
    }
}
