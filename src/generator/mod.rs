//! Generator module - pre-renders the news pages into static HTML files

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::pages::PageRenderer;
use crate::Newsdesk;

/// Counts from one generation run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub pages: usize,
    pub assets: usize,
    pub skipped: Vec<String>,
}

/// Static site generator
pub struct Generator<'a> {
    desk: &'a Newsdesk,
    renderer: PageRenderer,
}

impl<'a> Generator<'a> {
    pub fn new(desk: &'a Newsdesk, renderer: PageRenderer) -> Self {
        Self { desk, renderer }
    }

    /// Generate the listing, one page per enumerated slug, and the 404 page
    pub async fn generate(&self) -> Result<GenerateReport> {
        let mut report = GenerateReport::default();
        let public_dir = &self.desk.public_dir;
        fs::create_dir_all(public_dir)?;

        report.assets = self.copy_static_assets()?;

        let news_dir = public_dir.join(self.desk.config.news.path.trim_matches('/'));
        let listing = self
            .renderer
            .render_listing()
            .await
            .context("Failed to render news listing")?;
        write_page(&news_dir.join("index.html"), &listing)?;
        report.pages += 1;

        for slug in self.renderer.static_paths().await? {
            if !is_safe_segment(&slug) {
                tracing::warn!("Skipping slug that is not a single path segment: {:?}", slug);
                report.skipped.push(slug);
                continue;
            }

            match self.renderer.render_detail(&slug).await {
                Ok(html) => {
                    write_page(&news_dir.join(&slug).join("index.html"), &html)?;
                    report.pages += 1;
                }
                // Deleted between the slug query and the detail query
                Err(e) if e.is_not_found() => {
                    tracing::warn!("Post {:?} disappeared during generation", slug);
                    report.skipped.push(slug);
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to render post {slug:?}"));
                }
            }
        }

        write_page(&public_dir.join("404.html"), &self.renderer.render_not_found()?)?;

        tracing::info!(
            "Generated {} pages and copied {} assets",
            report.pages,
            report.assets
        );
        Ok(report)
    }

    /// Copy the static directory into the public directory
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.desk.static_dir;
        if !static_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(static_dir)?;
            let target: PathBuf = self.desk.public_dir.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &target)?;
            copied += 1;
        }

        tracing::debug!("Copied {} static assets", copied);
        Ok(copied)
    }
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::debug!("Wrote {:?}", path);
    Ok(())
}

fn is_safe_segment(slug: &str) -> bool {
    !slug.is_empty() && slug != "." && slug != ".." && !slug.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::{ContentSource, MemoryStore};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn desk(dir: &TempDir) -> Newsdesk {
        Newsdesk::with_config(dir.path().to_path_buf(), SiteConfig::default())
    }

    fn renderer(desk: &Newsdesk) -> PageRenderer {
        let store = MemoryStore::from_documents([
            json!({"_id": "p1", "_type": "blogPost", "title": "One", "slug": {"current": "one"},
                   "publishedAt": "2024-01-02T00:00:00Z"}),
            json!({"_id": "p2", "_type": "blogPost", "title": "Two", "slug": {"current": "two"},
                   "publishedAt": "2024-01-01T00:00:00Z"}),
            json!({"_id": "p3", "_type": "blogPost", "title": "No slug"}),
            json!({"_id": "p4", "_type": "blogPost", "title": "Bad", "slug": {"current": "../escape"}}),
        ]);
        let source: Arc<dyn ContentSource> = Arc::new(store);
        PageRenderer::new(desk.config.clone(), source).unwrap()
    }

    #[tokio::test]
    async fn test_generate_writes_pages() {
        let dir = TempDir::new().unwrap();
        let desk = desk(&dir);
        fs::create_dir_all(&desk.static_dir).unwrap();
        fs::write(desk.static_dir.join("blog-banner-default.jpg"), b"jpg").unwrap();

        let report = Generator::new(&desk, renderer(&desk))
            .generate()
            .await
            .unwrap();

        assert_eq!(report.pages, 3);
        assert_eq!(report.assets, 1);
        assert_eq!(report.skipped, ["../escape"]);

        let public = &desk.public_dir;
        let listing = fs::read_to_string(public.join("news/index.html")).unwrap();
        assert!(listing.contains("One"));
        assert!(public.join("news/one/index.html").exists());
        assert!(public.join("news/two/index.html").exists());
        assert!(public.join("404.html").exists());
        assert!(public.join("blog-banner-default.jpg").exists());
        assert!(!dir.path().join("escape").exists());
    }

    #[test]
    fn test_safe_segment() {
        assert!(is_safe_segment("hello-world"));
        assert!(!is_safe_segment(".."));
        assert!(!is_safe_segment("a/b"));
        assert!(!is_safe_segment(""));
    }
}
