//! GROQ queries for the news pages

use serde_json::{Map, Value};
use std::fmt;

const POST_BY_SLUG: &str = r#"*[_type == "blogPost" && slug.current == $slug][0] {
  _id,
  title,
  slug,
  excerpt,
  content,
  publishedAt,
  author->{name, image, bio},
  categories[]->{title, description},
  featuredImage,
  tags,
  "readTime": "5 min read"
}"#;

const POST_LIST: &str = r#"*[_type == "blogPost"] | order(publishedAt desc) {
  _id,
  title,
  slug,
  excerpt,
  publishedAt,
  author->{name},
  categories[]->{title},
  featuredImage,
  "readTime": "5 min read"
}"#;

const CATEGORIES: &str = r#"*[_type == "category"] {
  _id,
  title,
  description,
  "count": count(*[_type == "blogPost" && references(^._id)])
}"#;

const SLUGS: &str = r#"*[_type == "blogPost" && defined(slug.current)] {
  "slug": slug.current
}"#;

/// Document type of posts
pub const POST_TYPE: &str = "blogPost";

/// Document type of categories
pub const CATEGORY_TYPE: &str = "category";

/// The read queries issued by the page renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// A single post with author and categories dereferenced; `null` if absent
    PostBySlug(String),
    /// All posts, newest first, with a light author/category projection
    PostList,
    /// All categories with the number of posts referencing each
    Categories,
    /// Slugs of every post that defines one
    Slugs,
}

impl Query {
    pub fn post_by_slug(slug: impl Into<String>) -> Self {
        Query::PostBySlug(slug.into())
    }

    /// GROQ source text
    pub fn groq(&self) -> &'static str {
        match self {
            Query::PostBySlug(_) => POST_BY_SLUG,
            Query::PostList => POST_LIST,
            Query::Categories => CATEGORIES,
            Query::Slugs => SLUGS,
        }
    }

    /// Bound parameters, keyed without the `$` sigil
    ///
    /// The slug is bound as a JSON string, so any input is matched literally.
    pub fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        if let Query::PostBySlug(slug) = self {
            params.insert("slug".to_string(), Value::String(slug.clone()));
        }
        params
    }

    /// Query-string pairs for the HTTP query endpoint
    pub fn to_url_params(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("query".to_string(), self.groq().to_string())];
        for (name, value) in self.params() {
            pairs.push((format!("${name}"), value.to_string()));
        }
        pairs
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::PostBySlug(slug) => write!(f, "post-by-slug({slug:?})"),
            Query::PostList => write!(f, "post-list"),
            Query::Categories => write!(f, "categories"),
            Query::Slugs => write!(f, "slugs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_by_slug_binds_parameter() {
        let query = Query::post_by_slug("hello-world");
        assert!(query.groq().contains("slug.current == $slug"));
        assert!(query.groq().contains("author->{name, image, bio}"));
        assert_eq!(
            query.params().get("slug"),
            Some(&Value::String("hello-world".into()))
        );
    }

    #[test]
    fn test_slug_is_encoded_as_literal() {
        let query = Query::post_by_slug(r#"x" || true || ""#);
        let pairs = query.to_url_params();
        assert_eq!(pairs[1].0, "$slug");
        assert_eq!(pairs[1].1, r#""x\" || true || \"""#);
        // The GROQ text itself never contains the input
        assert!(!pairs[0].1.contains("|| true"));
    }

    #[test]
    fn test_list_orders_newest_first() {
        let groq = Query::PostList.groq();
        assert!(groq.contains("order(publishedAt desc)"));
        assert!(groq.contains("author->{name}"));
        assert!(groq.contains("categories[]->{title}"));
        assert!(Query::PostList.params().is_empty());
    }

    #[test]
    fn test_categories_count_references() {
        let groq = Query::Categories.groq();
        assert!(groq.contains(r#"_type == "category""#));
        assert!(groq.contains("count(*[_type == \"blogPost\" && references(^._id)])"));
    }

    #[test]
    fn test_slugs_require_defined() {
        assert!(Query::Slugs.groq().contains("defined(slug.current)"));
        assert_eq!(Query::Slugs.to_string(), "slugs");
    }
}
