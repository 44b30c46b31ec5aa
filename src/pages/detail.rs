//! Post detail page

use serde::Serialize;

use super::{Badge, PageRenderer, SizedImage};
use crate::content::{Author, ImageRef, Post};
use crate::error::{Error, Result};
use crate::helpers::{encode_component, full_url_for, news_url};

/// Everything the post template needs
#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub slug: String,
    pub canonical: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub category: Option<Badge>,
    pub date: Option<String>,
    pub datetime: Option<String>,
    pub read_time: String,
    pub author: Option<String>,
    pub featured_image: Option<SizedImage>,
    pub author_card: Option<AuthorCard>,
    pub body: String,
    pub tags: Vec<String>,
    pub back_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorCard {
    pub name: String,
    pub avatar: Option<SizedImage>,
    pub bio: Option<String>,
}

impl PageRenderer {
    /// Fetch a post by slug and build its view
    pub async fn detail(&self, slug: &str) -> Result<DetailView> {
        let post = self.source.post(slug).await?.ok_or_else(|| Error::NotFound {
            slug: slug.to_string(),
        })?;
        self.detail_view(post)
    }

    fn detail_view(&self, post: Post) -> Result<DetailView> {
        let featured_image = post
            .featured_image
            .as_ref()
            .map(|image| {
                let alt = image.alt().unwrap_or(&post.title);
                self.sized(image, alt, self.config.images.featured)
            })
            .transpose()?;
        let author_card = post
            .author
            .as_ref()
            .map(|author| self.author_card(author))
            .transpose()?;
        let body = self.body.render(&post.content)?;
        let (date, datetime) = self.display_date(post.published_at.as_ref());

        let slug = post.slug.as_str().unwrap_or_default().to_string();
        Ok(DetailView {
            canonical: full_url_for(
                &self.config,
                &format!("{}/{}", self.config.news.path, encode_component(&slug)),
            ),
            slug,
            category: self.badge(post.primary_category()),
            author: post.author.map(|a| a.name),
            excerpt: post.excerpt.filter(|e| !e.is_empty()),
            title: post.title,
            date,
            datetime,
            read_time: post.read_time,
            featured_image,
            author_card,
            body,
            tags: post.tags,
            back_url: news_url(&self.config),
        })
    }

    fn author_card(&self, author: &Author) -> Result<AuthorCard> {
        Ok(AuthorCard {
            name: author.name.clone(),
            avatar: author
                .image
                .as_ref()
                .map(|image| self.sized(image, &author.name, self.config.images.avatar))
                .transpose()?,
            bio: author.bio.clone().filter(|b| !b.is_empty()),
        })
    }

    fn sized(&self, image: &ImageRef, alt: &str, (width, height): (u32, u32)) -> Result<SizedImage> {
        Ok(SizedImage {
            src: self.images.resolve(image, width, height)?,
            alt: alt.to_string(),
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SiteConfig;
    use crate::content::{ContentSource, MemoryStore};
    use crate::pages::PageRenderer;
    use serde_json::json;
    use std::sync::Arc;

    fn renderer() -> PageRenderer {
        let store = MemoryStore::from_documents([
            json!({"_id": "a1", "_type": "author", "name": "Ada", "bio": "Editor",
                   "image": {"asset": {"_ref": "image-face-200x200-png"}}}),
            json!({"_id": "c1", "_type": "category", "title": "Market News", "description": "Moves"}),
            json!({
                "_id": "p1",
                "_type": "blogPost",
                "title": "Rates & <Rallies>",
                "slug": {"current": "rates"},
                "excerpt": "Short take",
                "publishedAt": "2024-02-10T08:00:00Z",
                "author": {"_ref": "a1"},
                "categories": [{"_ref": "c1"}],
                "featuredImage": {"asset": {"_ref": "image-hero-2400x1200-jpg"}, "alt": "Hero shot"},
                "tags": ["rates", "macro"],
                "content": [
                    {"_type": "block", "style": "normal",
                     "children": [{"_type": "span", "text": "Body text"}]}
                ]
            }),
            json!({
                "_id": "p2",
                "_type": "blogPost",
                "title": "Bare",
                "slug": {"current": "bare"}
            }),
        ]);
        let source: Arc<dyn ContentSource> = Arc::new(store);
        PageRenderer::new(SiteConfig::default(), source).unwrap()
    }

    #[tokio::test]
    async fn test_detail_for_existing_slug() {
        let view = renderer().detail("rates").await.unwrap();
        assert_eq!(view.slug, "rates");
        assert_eq!(view.category.unwrap().title, "Market News");
        assert_eq!(view.tags, ["rates", "macro"]);
        assert_eq!(view.body, "<p>Body text</p>");

        assert_eq!(view.canonical, "http://localhost:4000/news/rates");
        let hero = view.featured_image.unwrap();
        assert_eq!(hero.alt, "Hero shot");
        assert_eq!((hero.width, hero.height), (1200, 600));
        assert!(hero.src.ends_with("hero-2400x1200.jpg?w=1200&h=600&fit=crop"));

        let card = view.author_card.unwrap();
        assert_eq!(card.name, "Ada");
        assert_eq!(card.bio.as_deref(), Some("Editor"));
        let avatar = card.avatar.unwrap();
        assert_eq!(avatar.width, 60);
        assert_eq!(avatar.alt, "Ada");
    }

    #[tokio::test]
    async fn test_detail_missing_slug_is_not_found() {
        let err = renderer().detail("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(renderer().render_detail("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_detail_optional_sections_omitted() {
        let html = renderer().render_detail("bare").await.unwrap();
        assert!(html.contains("Bare"));
        assert!(!html.contains("author-card"));
        assert!(!html.contains(r#"class="tags"#));
        assert!(!html.contains("<time"));
        assert!(html.contains("Back to News"));
    }

    #[tokio::test]
    async fn test_detail_markup_escapes_title() {
        let html = renderer().render_detail("rates").await.unwrap();
        assert!(html.contains("Rates &amp; &lt;Rallies&gt;"));
        assert!(html.contains("<p>Body text</p>"));
        assert!(html.contains("author-card"));
        assert!(html.contains(r#"href="/news?category=market-news""#));
        assert!(html.contains("2/10/2024"));
        assert!(html.contains(">macro<"));
    }
}
