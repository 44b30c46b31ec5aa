//! Document projections returned by the content queries
//!
//! Each struct mirrors the projection of one query in [`super::query`]. GROQ
//! yields explicit `null` for missing fields and dangling references, so the
//! deserializers here treat `null` the same as an absent field.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::portable_text::Block;

/// Placeholder read time projected by the post queries
pub const READ_TIME: &str = "5 min read";

/// A post as projected by the listing query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default, deserialize_with = "null_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_default")]
    pub slug: Slug,

    #[serde(default)]
    pub excerpt: Option<String>,

    #[serde(
        rename = "publishedAt",
        default,
        deserialize_with = "lenient_datetime"
    )]
    pub published_at: Option<DateTime<Utc>>,

    /// Author with only `name` populated
    #[serde(default)]
    pub author: Option<Author>,

    /// Categories with only `title` populated
    #[serde(default, deserialize_with = "compact_vec")]
    pub categories: Vec<PostCategory>,

    #[serde(rename = "featuredImage", default)]
    pub featured_image: Option<ImageRef>,

    #[serde(rename = "readTime", default, deserialize_with = "null_default")]
    pub read_time: String,
}

impl PostSummary {
    /// First category, used for the badge on cards and headers
    pub fn primary_category(&self) -> Option<&PostCategory> {
        self.categories.first()
    }
}

/// A post as projected by the detail query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default, deserialize_with = "null_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_default")]
    pub slug: Slug,

    #[serde(default)]
    pub excerpt: Option<String>,

    /// Rich-content body
    #[serde(default, deserialize_with = "compact_vec")]
    pub content: Vec<Block>,

    #[serde(
        rename = "publishedAt",
        default,
        deserialize_with = "lenient_datetime"
    )]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub author: Option<Author>,

    #[serde(default, deserialize_with = "compact_vec")]
    pub categories: Vec<PostCategory>,

    #[serde(rename = "featuredImage", default)]
    pub featured_image: Option<ImageRef>,

    #[serde(default, deserialize_with = "compact_vec")]
    pub tags: Vec<String>,

    #[serde(rename = "readTime", default, deserialize_with = "null_default")]
    pub read_time: String,
}

impl Post {
    /// First category, shown as the header badge
    pub fn primary_category(&self) -> Option<&PostCategory> {
        self.categories.first()
    }
}

/// Slug object (`slug.current`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(default)]
    pub current: Option<String>,
}

impl Slug {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: Some(current.into()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.current.as_deref().filter(|s| !s.is_empty())
    }
}

/// Dereferenced author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,

    #[serde(default)]
    pub image: Option<ImageRef>,

    #[serde(default)]
    pub bio: Option<String>,
}

/// Dereferenced category inside a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCategory {
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// A category with its derived post count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default, deserialize_with = "null_default")]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub count: usize,
}

/// One row of the static path query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugEntry {
    pub slug: String,
}

/// Opaque image pointer embedded in a document
///
/// Accepts the shapes the content API hands out: a bare asset id, an image
/// object wrapping an asset reference, or the asset reference itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Id(String),
    Image {
        asset: AssetRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
    Asset(AssetRef),
}

impl ImageRef {
    /// Asset id such as `image-abc123-800x600-jpg`
    pub fn asset_id(&self) -> Option<&str> {
        match self {
            ImageRef::Id(id) => Some(id.as_str()),
            ImageRef::Image { asset, .. } | ImageRef::Asset(asset) => asset.id(),
        }
    }

    /// Fully-qualified URL when the asset was already expanded
    pub fn url(&self) -> Option<&str> {
        match self {
            ImageRef::Id(_) => None,
            ImageRef::Image { asset, .. } | ImageRef::Asset(asset) => asset.url.as_deref(),
        }
    }

    pub fn alt(&self) -> Option<&str> {
        match self {
            ImageRef::Image { alt, .. } => alt.as_deref(),
            _ => None,
        }
    }
}

/// Reference to an image asset document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl AssetRef {
    pub fn id(&self) -> Option<&str> {
        self.reference.as_deref().or(self.id.as_deref())
    }
}

/// Treat an explicit `null` as the type's default
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept `null` for the whole list and drop `null` entries
fn compact_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

/// Accept RFC 3339 datetimes and plain `YYYY-MM-DD` dates
///
/// Anything else is logged and treated as absent.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::String(raw)) => raw,
        Some(other) => {
            tracing::warn!("Ignoring non-string publish date {}", other);
            return Ok(None);
        }
    };
    let parsed = parse_datetime(&raw);
    if parsed.is_none() {
        tracing::warn!("Ignoring unparseable publish date {:?}", raw);
    }
    Ok(parsed)
}

/// Parse a publish timestamp as stored by the content platform
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_with_nulls() {
        let post: PostSummary = serde_json::from_value(json!({
            "_id": "p1",
            "title": null,
            "slug": {"current": "hello"},
            "excerpt": null,
            "publishedAt": "2024-03-01T09:30:00.000Z",
            "author": null,
            "categories": [null, {"title": "Markets"}],
            "featuredImage": null,
            "readTime": "5 min read"
        }))
        .unwrap();

        assert_eq!(post.title, "");
        assert_eq!(post.slug.as_str(), Some("hello"));
        assert!(post.author.is_none());
        assert_eq!(post.categories.len(), 1);
        assert_eq!(post.primary_category().unwrap().title, "Markets");
        assert!(post.featured_image.is_none());
    }

    #[test]
    fn test_unparseable_date_is_absent() {
        let posts: Vec<PostSummary> = serde_json::from_value(json!([
            {"_id": "p1", "title": "Dated", "publishedAt": "2024-05-01T00:00:00Z"},
            {"_id": "p2", "title": "Vague", "publishedAt": "May 2024"},
            {"_id": "p3", "title": "Numeric", "publishedAt": 1714521600}
        ]))
        .unwrap();

        assert!(posts[0].published_at.is_some());
        assert!(posts[1].published_at.is_none());
        assert!(posts[2].published_at.is_none());
    }

    #[test]
    fn test_detail_missing_optionals() {
        let post: Post = serde_json::from_value(json!({
            "_id": "p1",
            "title": "Hello",
            "slug": {"current": "hello"},
            "content": null,
            "tags": null,
            "categories": null,
            "publishedAt": "2024-03-01"
        }))
        .unwrap();

        assert!(post.content.is_empty());
        assert!(post.tags.is_empty());
        assert!(post.categories.is_empty());
        assert_eq!(
            post.published_at.unwrap().format("%Y-%m-%d").to_string(),
            "2024-03-01"
        );
    }

    #[test]
    fn test_image_ref_shapes() {
        let image: ImageRef = serde_json::from_value(json!({
            "_type": "image",
            "asset": {"_ref": "image-abc-800x600-jpg", "_type": "reference"},
            "alt": "Cover"
        }))
        .unwrap();
        assert_eq!(image.asset_id(), Some("image-abc-800x600-jpg"));
        assert_eq!(image.alt(), Some("Cover"));

        let bare: ImageRef = serde_json::from_value(json!("image-abc-800x600-jpg")).unwrap();
        assert_eq!(bare.asset_id(), Some("image-abc-800x600-jpg"));

        let expanded: ImageRef = serde_json::from_value(json!({
            "_id": "image-abc-800x600-jpg",
            "url": "https://cdn.sanity.io/images/p/d/abc-800x600.jpg"
        }))
        .unwrap();
        assert!(expanded.url().is_some());
    }

    #[test]
    fn test_empty_slug_is_undefined() {
        assert_eq!(Slug::new("").as_str(), None);
        assert_eq!(Slug::default().as_str(), None);
    }
}
