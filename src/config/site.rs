//! Site configuration (_config.yml)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Project used when no environment override is present
pub const DEFAULT_PROJECT_ID: &str = "c10s91qu";

/// Dataset used when no environment override is present
pub const DEFAULT_DATASET: &str = "production";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,

    // Date format (Moment.js style tokens)
    pub date_format: String,

    // Extra tracing directives appended to the log filter
    pub log_filter: Option<String>,

    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub images: ImageSizes,
    #[serde(default)]
    pub studio: StudioConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "incoXchange".to_string(),
            description: String::new(),
            language: "en".to_string(),
            timezone: String::new(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            date_format: "M/D/YYYY".to_string(),

            log_filter: None,

            news: NewsConfig::default(),
            images: ImageSizes::default(),
            studio: StudioConfig::default(),
            content: ContentConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject route settings that would overlap when the router is built
    pub fn validate(&self) -> Result<()> {
        let news = self.news.path.trim_matches('/');
        if news.is_empty() {
            bail!("news.path must not be empty or \"/\"");
        }
        if news.contains([':', '*']) {
            bail!("news.path {:?} must not contain ':' or '*'", self.news.path);
        }

        let studio = match self.studio.base_path.trim_matches('/') {
            "" => "studio",
            path => path,
        };
        let first_segment = |path: &str| path.split('/').next().unwrap_or_default().to_string();
        if first_segment(news) == first_segment(studio) {
            bail!(
                "news.path {:?} overlaps studio.base_path {:?}",
                self.news.path,
                self.studio.base_path
            );
        }
        Ok(())
    }

    /// Parse the configured timezone, falling back to UTC
    pub fn tz(&self) -> chrono_tz::Tz {
        if self.timezone.is_empty() {
            return chrono_tz::UTC;
        }
        match self.timezone.parse() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
                chrono_tz::UTC
            }
        }
    }
}

/// News section settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub path: String,
    pub title: String,
    pub subtitle: String,
    /// Number of posts listed after the featured one
    pub recent_count: usize,
    pub default_banner: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            path: "news".to_string(),
            title: "News".to_string(),
            subtitle: "Stay up to date with the latest updates, announcements, and industry news."
                .to_string(),
            recent_count: 6,
            default_banner: "/blog-banner-default.jpg".to_string(),
        }
    }
}

/// Requested dimensions for each image slot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSizes {
    pub card: (u32, u32),
    pub featured: (u32, u32),
    pub avatar: (u32, u32),
}

impl Default for ImageSizes {
    fn default() -> Self {
        Self {
            card: (800, 450),
            featured: (1200, 600),
            avatar: (60, 60),
        }
    }
}

/// Studio hosting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub base_path: String,
    /// Directory holding a built studio bundle
    pub dir: Option<String>,
    /// Where to send visitors when no bundle is configured
    pub hosted_url: Option<String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            base_path: "/studio".to_string(),
            dir: None,
            hosted_url: None,
        }
    }
}

/// Content API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    /// Name of the environment variable holding a read token
    pub token_env: String,
    /// Dataset export (NDJSON) to serve instead of the remote API
    pub export: Option<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            project_id: DEFAULT_PROJECT_ID.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
            api_version: "2024-01-01".to_string(),
            use_cdn: true,
            token_env: "SANITY_API_READ_TOKEN".to_string(),
            export: None,
        }
    }
}

impl ContentConfig {
    /// Apply project and dataset overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides using the given variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| lookup(name).filter(|v| !v.is_empty()))
        };

        if let Some(project_id) = pick(&["SANITY_PROJECT_ID", "NEXT_PUBLIC_SANITY_PROJECT_ID"]) {
            self.project_id = project_id;
        }
        if let Some(dataset) = pick(&["SANITY_DATASET", "NEXT_PUBLIC_SANITY_DATASET"]) {
            self.dataset = dataset;
        }
    }

    /// Read the API token, if one is configured
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env).ok().filter(|t| !t.is_empty())
    }
}
