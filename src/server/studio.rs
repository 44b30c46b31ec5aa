//! Content studio host
//!
//! Serves a prebuilt studio bundle under the configured base path, with
//! client-side routes falling back to its `index.html`. Without a bundle the
//! base path redirects to the hosted studio for the same project.

use axum::{response::Redirect, routing::get, Router};
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::SiteConfig;

/// Routes for the studio, ready to merge into the site router
pub fn routes<S>(config: &SiteConfig, base_dir: &Path) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let base = base_path(&config.studio.base_path);

    if let Some(dir) = &config.studio.dir {
        let dir = base_dir.join(dir);
        if dir.join("index.html").exists() {
            tracing::info!("Serving studio bundle from {:?} at {}", dir, base);
            let index = ServeFile::new(dir.join("index.html"));
            return Router::new().nest_service(&base, ServeDir::new(&dir).fallback(index));
        }
        tracing::warn!("Studio bundle {:?} has no index.html, redirecting instead", dir);
    }

    let target = hosted_url(config);
    tracing::debug!("Studio at {} redirects to {}", base, target);
    let rest = target.clone();
    Router::new()
        .route(&base, get(move || async move { Redirect::temporary(&target) }))
        .route(
            &format!("{}/*rest", base),
            get(move || async move { Redirect::temporary(&rest) }),
        )
}

/// Hosted studio URL, derived from the project id unless configured
pub fn hosted_url(config: &SiteConfig) -> String {
    match &config.studio.hosted_url {
        Some(url) if !url.is_empty() => url.clone(),
        _ => format!("https://{}.sanity.studio/", config.content.project_id),
    }
}

fn base_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/studio".to_string()
    } else {
        format!("/{}", trimmed)
    }
}
