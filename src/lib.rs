//! newsdesk: news pages rendered from the Sanity content API
//!
//! This crate fetches posts, categories and authors with GROQ queries,
//! projects them into view models and renders them with embedded Tera
//! templates, either per request or as a pre-rendered static site.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod pages;
pub mod server;
pub mod templates;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use content::{ContentSource, MemoryStore, SanityClient};
use pages::PageRenderer;

/// The main application
#[derive(Debug, Clone)]
pub struct Newsdesk {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static asset directory
    pub static_dir: PathBuf,
}

impl Newsdesk {
    /// Create a new instance from a directory
    ///
    /// Reads `_config.yml` and `.env` when present; content project and
    /// dataset can be overridden from the environment.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        let env_path = base_dir.join(".env");
        if env_path.exists() {
            dotenvy::from_path(&env_path)?;
        }

        let config_path = base_dir.join("_config.yml");
        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.content.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance from an already-built configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Self {
            config,
            base_dir,
            public_dir,
            static_dir,
        }
    }

    /// Content source: the export file when configured, the hosted API otherwise
    pub fn content_source(&self) -> Result<Arc<dyn ContentSource>> {
        match &self.config.content.export {
            Some(export) => {
                let path = self.base_dir.join(export);
                Ok(Arc::new(MemoryStore::load(path)?))
            }
            None => {
                let client = SanityClient::new(&self.config.content);
                tracing::info!("Using content API at {}", client.endpoint());
                Ok(Arc::new(client))
            }
        }
    }

    /// Page renderer bound to this site's content source
    pub fn renderer(&self) -> Result<PageRenderer> {
        PageRenderer::new(self.config.clone(), self.content_source()?)
    }

    /// Generate the static site
    pub async fn generate(&self) -> anyhow::Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> anyhow::Result<()> {
        commands::clean::run(self)
    }
}
