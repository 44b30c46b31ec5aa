//! News listing page

use serde::Serialize;

use super::{Badge, PageRenderer};
use crate::content::{CategorySummary, PostSummary};
use crate::error::Result;
use crate::helpers::{category_url, full_url_for, post_url};

/// Everything the listing template needs
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub canonical: String,
    pub featured: Option<PostCard>,
    pub recent: Vec<PostCard>,
    pub categories: Vec<CategoryCard>,
}

/// A post as shown on the listing page
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub title: String,
    pub slug: Option<String>,
    pub url: String,
    pub image: String,
    pub image_alt: String,
    pub image_width: u32,
    pub image_height: u32,
    pub category: Option<Badge>,
    pub date: Option<String>,
    pub datetime: Option<String>,
    pub read_time: String,
    pub author: Option<String>,
    pub excerpt: String,
}

/// A sidebar category entry
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub count: usize,
    pub url: String,
}

/// Split newest-first posts into the featured post and up to `recent` more
pub fn split_posts(posts: &[PostSummary], recent: usize) -> (Option<&PostSummary>, &[PostSummary]) {
    match posts.split_first() {
        Some((featured, rest)) => (Some(featured), &rest[..rest.len().min(recent)]),
        None => (None, &[]),
    }
}

impl PageRenderer {
    /// Fetch posts and categories concurrently and build the listing view
    ///
    /// Both queries must succeed; either failure aborts the render.
    pub async fn listing(&self) -> Result<ListingView> {
        let (posts, categories) =
            tokio::try_join!(self.source.posts(), self.source.categories())?;
        tracing::debug!(
            "Fetched {} posts and {} categories",
            posts.len(),
            categories.len()
        );

        let (featured, recent) = split_posts(&posts, self.config.news.recent_count);

        Ok(ListingView {
            canonical: full_url_for(&self.config, &self.config.news.path),
            featured: featured.map(|post| self.post_card(post)).transpose()?,
            recent: recent
                .iter()
                .map(|post| self.post_card(post))
                .collect::<Result<_>>()?,
            categories: categories
                .iter()
                .map(|category| self.category_card(category))
                .collect(),
        })
    }

    fn post_card(&self, post: &PostSummary) -> Result<PostCard> {
        let (width, height) = self.config.images.card;
        let image = self.images.resolve_or(
            post.featured_image.as_ref(),
            width,
            height,
            &self.config.news.default_banner,
        )?;
        let image_alt = match &post.featured_image {
            Some(image) => image.alt().unwrap_or(&post.title).to_string(),
            None => "Blog Banner".to_string(),
        };
        let slug = post.slug.as_str().map(str::to_string);
        let (date, datetime) = self.display_date(post.published_at.as_ref());

        Ok(PostCard {
            title: post.title.clone(),
            url: post_url(&self.config, slug.as_deref().unwrap_or_default()),
            slug,
            image,
            image_alt,
            image_width: width,
            image_height: height,
            category: self.badge(post.primary_category()),
            date,
            datetime,
            read_time: post.read_time.clone(),
            author: post.author.as_ref().map(|a| a.name.clone()),
            excerpt: post.excerpt.clone().unwrap_or_default(),
        })
    }

    fn category_card(&self, category: &CategorySummary) -> CategoryCard {
        CategoryCard {
            id: category.id.clone(),
            title: category.title.clone(),
            description: category.description.clone().unwrap_or_default(),
            count: category.count,
            url: category_url(&self.config, &category.title),
        }
    }
}
