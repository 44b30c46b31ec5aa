//! In-process content store backed by a dataset export
//!
//! Loads the NDJSON produced by a dataset export and answers the same query
//! shapes as the hosted API, performing reference joins and counts locally.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::path::Path;

use super::client::ContentSource;
use super::model::{parse_datetime, READ_TIME};
use super::query::{Query, CATEGORY_TYPE, POST_TYPE};
use crate::error::Result;

/// Documents keyed by `_id`, in export order
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: IndexMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-parsed documents
    pub fn from_documents<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut store = Self::new();
        for doc in documents {
            store.insert(doc);
        }
        store
    }

    /// Load an NDJSON export file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let store = Self::parse_ndjson(&content)?;
        tracing::info!(
            "Loaded {} documents from {:?}",
            store.len(),
            path.as_ref()
        );
        Ok(store)
    }

    /// Parse NDJSON, one document per line
    pub fn parse_ndjson(content: &str) -> Result<Self> {
        let mut store = Self::new();
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let doc: Value = serde_json::from_str(line)?;
            store.insert(doc);
        }
        Ok(store)
    }

    /// Insert or replace a document; drafts and documents without `_id` are skipped
    pub fn insert(&mut self, doc: Value) {
        let Some(id) = doc.get("_id").and_then(Value::as_str).map(str::to_string) else {
            tracing::warn!("Skipping document without _id");
            return;
        };
        if id.starts_with("drafts.") {
            tracing::debug!("Skipping draft {}", id);
            return;
        }
        self.documents.insert(id, doc);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn of_type<'a>(&'a self, doc_type: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.documents
            .values()
            .filter(move |doc| doc.get("_type").and_then(Value::as_str) == Some(doc_type))
    }

    /// Follow a `{ _ref }` value to its document
    fn deref(&self, reference: Option<&Value>) -> Option<&Value> {
        let id = reference?.get("_ref")?.as_str()?;
        self.documents.get(id)
    }

    /// `ref->{fields}`; dangling or missing references yield null
    fn join(&self, reference: Option<&Value>, fields: &[&str]) -> Value {
        match self.deref(reference) {
            Some(doc) => project(doc, fields),
            None => Value::Null,
        }
    }

    /// `refs[]->{fields}`
    fn join_all(&self, references: Option<&Value>, fields: &[&str]) -> Value {
        match references.and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .map(|item| self.join(Some(item), fields))
                .collect(),
            None => Value::Null,
        }
    }

    fn post_summary(&self, post: &Value) -> Value {
        let mut out = project_map(post, &["_id", "title", "slug", "excerpt", "publishedAt"]);
        out.insert("author".into(), self.join(post.get("author"), &["name"]));
        out.insert(
            "categories".into(),
            self.join_all(post.get("categories"), &["title"]),
        );
        out.insert("featuredImage".into(), field(post, "featuredImage"));
        out.insert("readTime".into(), json!(READ_TIME));
        Value::Object(out)
    }

    fn post_detail(&self, post: &Value) -> Value {
        let mut out = project_map(post, &["_id", "title", "slug", "excerpt", "content", "publishedAt"]);
        out.insert(
            "author".into(),
            self.join(post.get("author"), &["name", "image", "bio"]),
        );
        out.insert(
            "categories".into(),
            self.join_all(post.get("categories"), &["title", "description"]),
        );
        out.insert("featuredImage".into(), field(post, "featuredImage"));
        out.insert("tags".into(), field(post, "tags"));
        out.insert("readTime".into(), json!(READ_TIME));
        Value::Object(out)
    }

    fn post_list(&self) -> Value {
        let mut posts: Vec<&Value> = self.of_type(POST_TYPE).collect();
        // Stable sort keeps export order among equal timestamps
        posts.sort_by(|a, b| compare_published(b, a));
        posts.into_iter().map(|p| self.post_summary(p)).collect()
    }

    fn post_by_slug(&self, slug: &str) -> Value {
        self.of_type(POST_TYPE)
            .find(|p| slug_of(p) == Some(slug))
            .map(|p| self.post_detail(p))
            .unwrap_or(Value::Null)
    }

    fn categories(&self) -> Value {
        self.of_type(CATEGORY_TYPE)
            .map(|category| {
                let id = category.get("_id").and_then(Value::as_str).unwrap_or_default();
                let count = self
                    .of_type(POST_TYPE)
                    .filter(|post| references(post, id))
                    .count();
                let mut out = project_map(category, &["_id", "title", "description"]);
                out.insert("count".into(), json!(count));
                Value::Object(out)
            })
            .collect()
    }

    fn slugs(&self) -> Value {
        self.of_type(POST_TYPE)
            .filter_map(slug_of)
            .map(|slug| json!({ "slug": slug }))
            .collect()
    }
}

#[async_trait]
impl ContentSource for MemoryStore {
    async fn fetch_raw(&self, query: &Query) -> Result<Value> {
        tracing::debug!("Answering {} from memory", query);
        Ok(match query {
            Query::PostBySlug(slug) => self.post_by_slug(slug),
            Query::PostList => self.post_list(),
            Query::Categories => self.categories(),
            Query::Slugs => self.slugs(),
        })
    }
}

fn field(doc: &Value, name: &str) -> Value {
    doc.get(name).cloned().unwrap_or(Value::Null)
}

fn project_map(doc: &Value, fields: &[&str]) -> Map<String, Value> {
    fields
        .iter()
        .map(|name| (name.to_string(), field(doc, name)))
        .collect()
}

fn project(doc: &Value, fields: &[&str]) -> Value {
    Value::Object(project_map(doc, fields))
}

fn slug_of(doc: &Value) -> Option<&str> {
    doc.get("slug")?.get("current")?.as_str()
}

/// Whether any `_ref` anywhere in the document points at `id`
fn references(doc: &Value, id: &str) -> bool {
    match doc {
        Value::Object(map) => map.iter().any(|(key, value)| {
            (key == "_ref" && value.as_str() == Some(id)) || references(value, id)
        }),
        Value::Array(items) => items.iter().any(|item| references(item, id)),
        _ => false,
    }
}

/// Ascending order on `publishedAt`; missing dates sort first
fn compare_published(a: &Value, b: &Value) -> Ordering {
    let key = |doc: &Value| {
        doc.get("publishedAt")
            .and_then(Value::as_str)
            .and_then(parse_datetime)
    };
    key(a).cmp(&key(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::model::{CategorySummary, Post, PostSummary, SlugEntry};

    fn fixture() -> MemoryStore {
        MemoryStore::parse_ndjson(
            r#"
{"_id":"author-1","_type":"author","name":"Ada","bio":"Writes things","image":{"asset":{"_ref":"image-a1-60x60-png"}}}
{"_id":"cat-1","_type":"category","title":"Market News","description":"Markets"}
{"_id":"cat-2","_type":"category","title":"Product","description":"Releases"}
{"_id":"post-old","_type":"blogPost","title":"Old","slug":{"current":"old"},"publishedAt":"2024-01-01T00:00:00Z","categories":[{"_ref":"cat-1","_key":"a"}]}
{"_id":"post-new","_type":"blogPost","title":"New","slug":{"current":"new"},"publishedAt":"2024-06-01T00:00:00Z","author":{"_ref":"author-1"},"categories":[{"_ref":"cat-1","_key":"a"},{"_ref":"cat-2","_key":"b"}],"tags":["launch"]}
{"_id":"post-noslug","_type":"blogPost","title":"Untitled","publishedAt":"2023-01-01T00:00:00Z"}
{"_id":"drafts.post-new","_type":"blogPost","title":"Draft","slug":{"current":"draft"}}
"#,
        )
        .unwrap()
    }

    fn source(store: MemoryStore) -> Box<dyn ContentSource> {
        Box::new(store)
    }

    #[test]
    fn test_drafts_are_skipped() {
        let store = fixture();
        assert_eq!(store.len(), 6);
    }

    #[tokio::test]
    async fn test_post_list_newest_first() {
        let source = source(fixture());
        let posts: Vec<PostSummary> = source.posts().await.unwrap();
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["New", "Old", "Untitled"]);
        assert_eq!(posts[0].author.as_ref().unwrap().name, "Ada");
        assert!(posts[0].author.as_ref().unwrap().bio.is_none());
        assert_eq!(posts[0].categories.len(), 2);
        assert_eq!(posts[0].read_time, READ_TIME);
    }

    #[tokio::test]
    async fn test_post_by_slug_joins_references() {
        let source = source(fixture());
        let post: Post = source.post("new").await.unwrap().unwrap();
        assert_eq!(post.slug.as_str(), Some("new"));
        let author = post.author.unwrap();
        assert_eq!(author.bio.as_deref(), Some("Writes things"));
        assert!(author.image.is_some());
        assert_eq!(post.categories[1].description.as_deref(), Some("Releases"));
        assert_eq!(post.tags, ["launch"]);
    }

    #[tokio::test]
    async fn test_missing_slug_is_none() {
        let source = source(fixture());
        assert!(source.post("nope").await.unwrap().is_none());
        assert!(source.post("draft").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_category_counts_follow_references() {
        let mut store = fixture();
        let counts = |cats: Vec<CategorySummary>| {
            cats.into_iter()
                .map(|c| (c.id, c.count))
                .collect::<Vec<_>>()
        };

        let before = counts(source(store.clone()).categories().await.unwrap());
        assert_eq!(before, [("cat-1".to_string(), 2), ("cat-2".to_string(), 1)]);

        store.insert(json!({
            "_id": "post-more",
            "_type": "blogPost",
            "title": "More",
            "slug": {"current": "more"},
            "categories": [{"_ref": "cat-2", "_key": "x"}]
        }));
        let after = counts(source(store).categories().await.unwrap());
        assert_eq!(after, [("cat-1".to_string(), 2), ("cat-2".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_slugs_exclude_undefined() {
        let source = source(fixture());
        let slugs: Vec<SlugEntry> = source.slugs().await.unwrap();
        let slugs: Vec<_> = slugs.into_iter().map(|s| s.slug).collect();
        assert_eq!(slugs, ["old", "new"]);
    }

    #[tokio::test]
    async fn test_dangling_reference_is_dropped() {
        let store = MemoryStore::from_documents([json!({
            "_id": "p",
            "_type": "blogPost",
            "title": "Dangling",
            "slug": {"current": "dangling"},
            "author": {"_ref": "missing"},
            "categories": [{"_ref": "missing"}]
        })]);
        let post = source(store).post("dangling").await.unwrap().unwrap();
        assert!(post.author.is_none());
        assert!(post.categories.is_empty());
    }
}
