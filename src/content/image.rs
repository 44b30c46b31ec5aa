//! Image reference resolution

use lazy_static::lazy_static;
use regex::Regex;

use super::model::ImageRef;
use crate::config::ContentConfig;
use crate::error::{Error, Result};

lazy_static! {
    static ref ASSET_ID: Regex =
        Regex::new(r"^image-([A-Za-z0-9]+)-(\d+)x(\d+)-([a-z0-9]+)$").unwrap();
}

const CDN_BASE: &str = "https://cdn.sanity.io/images";

/// Builds CDN URLs for image references
///
/// URL generation is local; nothing is fetched until a browser loads the URL.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    project_id: String,
    dataset: String,
}

impl ImageResolver {
    pub fn new(config: &ContentConfig) -> Self {
        Self {
            project_id: config.project_id.clone(),
            dataset: config.dataset.clone(),
        }
    }

    /// Resolve a reference to a URL sized to `width` x `height`
    pub fn resolve(&self, image: &ImageRef, width: u32, height: u32) -> Result<String> {
        let base = self.base_url(image)?;
        let sep = if base.contains('?') { '&' } else { '?' };
        Ok(format!("{base}{sep}w={width}&h={height}&fit=crop"))
    }

    /// Resolve a reference scaled to `width`, keeping its aspect ratio
    pub fn resolve_width(&self, image: &ImageRef, width: u32) -> Result<String> {
        let base = self.base_url(image)?;
        let sep = if base.contains('?') { '&' } else { '?' };
        Ok(format!("{base}{sep}w={width}&fit=max"))
    }

    /// Resolve an optional reference, falling back to `default` when absent
    pub fn resolve_or(
        &self,
        image: Option<&ImageRef>,
        width: u32,
        height: u32,
        default: &str,
    ) -> Result<String> {
        match image {
            Some(image) => self.resolve(image, width, height),
            None => Ok(default.to_string()),
        }
    }

    fn base_url(&self, image: &ImageRef) -> Result<String> {
        if let Some(url) = image.url() {
            return Ok(url.to_string());
        }
        let id = image
            .asset_id()
            .ok_or_else(|| Error::InvalidImageRef(format!("{image:?}")))?;
        self.asset_url(id)
    }

    /// Unsized CDN URL for an asset id
    fn asset_url(&self, asset_id: &str) -> Result<String> {
        let caps = ASSET_ID
            .captures(asset_id)
            .ok_or_else(|| Error::InvalidImageRef(asset_id.to_string()))?;

        Ok(format!(
            "{}/{}/{}/{}-{}x{}.{}",
            CDN_BASE, self.project_id, self.dataset, &caps[1], &caps[2], &caps[3], &caps[4]
        ))
    }
}
