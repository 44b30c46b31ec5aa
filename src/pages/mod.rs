//! Page renderer - turns query results into news pages
//!
//! Every render is request-scoped: documents are fetched, projected into
//! view models and rendered, then dropped. Nothing is cached between renders.

mod detail;
mod listing;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

pub use detail::{AuthorCard, DetailView};
pub use listing::{split_posts, CategoryCard, ListingView, PostCard};

use crate::config::SiteConfig;
use crate::content::{ContentSource, ImageResolver, PortableTextRenderer, PostCategory};
use crate::error::Result;
use crate::helpers::{category_url, date_xml, format_date, localize};
use crate::templates::TemplateRenderer;

/// Renders listing, detail and error pages from a content source
pub struct PageRenderer {
    config: SiteConfig,
    source: Arc<dyn ContentSource>,
    images: ImageResolver,
    body: PortableTextRenderer,
    templates: TemplateRenderer,
    tz: Tz,
}

impl PageRenderer {
    pub fn new(config: SiteConfig, source: Arc<dyn ContentSource>) -> Result<Self> {
        let images = ImageResolver::new(&config.content);
        let body = PortableTextRenderer::new(images.clone(), config.images.featured.0);
        let templates = TemplateRenderer::new(&config)?;
        let tz = config.tz();

        Ok(Self {
            config,
            source,
            images,
            body,
            templates,
            tz,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Render the news listing page
    pub async fn render_listing(&self) -> Result<String> {
        let listing = self.listing().await?;
        self.templates.render("news.html", "listing", &listing)
    }

    /// Render the detail page for `slug`; a missing post is [`crate::Error::NotFound`]
    pub async fn render_detail(&self, slug: &str) -> Result<String> {
        let post = self.detail(slug).await?;
        self.templates.render("post.html", "post", &post)
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.templates.render_plain("not_found.html")
    }

    pub fn render_error(&self) -> Result<String> {
        self.templates.render_plain("error.html")
    }

    /// Slugs to pre-render, each exactly once, in query order
    ///
    /// Posts without a usable slug are skipped.
    pub async fn static_paths(&self) -> Result<Vec<String>> {
        let entries = self.source.slugs().await?;
        let mut seen = HashSet::new();
        let slugs: Vec<String> = entries
            .into_iter()
            .map(|entry| entry.slug)
            .filter(|slug| !slug.is_empty())
            .filter(|slug| seen.insert(slug.clone()))
            .collect();
        tracing::debug!("Enumerated {} static paths", slugs.len());
        Ok(slugs)
    }

    fn display_date(&self, date: Option<&DateTime<Utc>>) -> (Option<String>, Option<String>) {
        match date {
            Some(date) => {
                let local = localize(date, self.tz);
                (
                    Some(format_date(&local, &self.config.date_format)),
                    Some(date_xml(&local)),
                )
            }
            None => (None, None),
        }
    }

    fn badge(&self, category: Option<&PostCategory>) -> Option<Badge> {
        category.map(|category| Badge {
            title: category.title.clone(),
            url: category_url(&self.config, &category.title),
        })
    }
}

/// Category badge linking to the filtered listing
#[derive(Debug, Clone, Serialize)]
pub struct Badge {
    pub title: String,
    pub url: String,
}

/// Resolved image with the dimensions it was requested at
#[derive(Debug, Clone, Serialize)]
pub struct SizedImage {
    pub src: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}
