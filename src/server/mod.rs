//! HTTP server rendering news pages per request

mod studio;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::Error;
use crate::helpers::news_url;
use crate::pages::PageRenderer;
use crate::Newsdesk;

/// Server state
struct ServerState {
    renderer: PageRenderer,
    static_dir: PathBuf,
}

impl ServerState {
    /// Map a render failure to a response
    fn error_response(&self, err: Error) -> Response {
        if err.is_not_found() {
            tracing::debug!("{}", err);
            let body = self
                .renderer
                .render_not_found()
                .unwrap_or_else(|_| "Not found".to_string());
            return (StatusCode::NOT_FOUND, Html(body)).into_response();
        }

        tracing::error!("Render failed: {}", err);
        let body = self
            .renderer
            .render_error()
            .unwrap_or_else(|_| "Server error".to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
    }
}

/// Start the server
pub async fn start(desk: &Newsdesk, ip: &str, port: u16, open: bool) -> Result<()> {
    let renderer = desk.renderer()?;
    let app = router(desk, renderer);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", ip, port, news_url(&desk.config));
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router
pub fn router(desk: &Newsdesk, renderer: PageRenderer) -> Router {
    let listing_path = news_url(&desk.config);
    let detail_path = format!("{}/:slug", listing_path.trim_end_matches('/'));
    let home = listing_path.clone();

    let state = Arc::new(ServerState {
        renderer,
        static_dir: desk.static_dir.clone(),
    });

    Router::new()
        .route("/", get(move || async move { Redirect::temporary(&home) }))
        .route(&listing_path, get(listing_handler))
        .route(&detail_path, get(detail_handler))
        .merge(studio::routes(&desk.config, &desk.base_dir))
        .fallback(fallback_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// News listing; the `category` query parameter in links is not applied
async fn listing_handler(State(state): State<Arc<ServerState>>) -> Response {
    match state.renderer.render_listing().await {
        Ok(html) => Html(html).into_response(),
        Err(e) => state.error_response(e),
    }
}

async fn detail_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    match state.renderer.render_detail(&slug).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => state.error_response(e),
    }
}

/// Serve static assets, rendering the 404 page for anything else
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: axum::extract::Request,
) -> Response {
    if state.static_dir.exists() {
        let mut service = ServeDir::new(&state.static_dir);
        if let Ok(response) = service.try_call(request).await {
            if response.status() != StatusCode::NOT_FOUND {
                return response.into_response();
            }
        }
    }

    state.error_response(Error::NotFound {
        slug: String::new(),
    })
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::{ContentSource, MemoryStore, Query};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct FailingSource;

    #[async_trait]
    impl ContentSource for FailingSource {
        async fn fetch_raw(&self, _query: &Query) -> crate::Result<Value> {
            Err(Error::Api {
                status: 503,
                message: "unavailable".to_string(),
            })
        }
    }

    fn app_with(source: Arc<dyn ContentSource>) -> (tempfile::TempDir, Router) {
        let dir = tempfile::TempDir::new().unwrap();
        let desk = Newsdesk::with_config(dir.path().to_path_buf(), SiteConfig::default());
        let renderer = PageRenderer::new(desk.config.clone(), source).unwrap();
        let app = router(&desk, renderer);
        (dir, app)
    }

    fn app() -> (tempfile::TempDir, Router) {
        app_with(Arc::new(MemoryStore::from_documents([json!({
            "_id": "p1",
            "_type": "blogPost",
            "title": "Launch Day",
            "slug": {"current": "launch-day"},
            "publishedAt": "2024-04-01T00:00:00Z"
        })])))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String, Option<String>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned(), location)
    }

    #[tokio::test]
    async fn test_listing_route() {
        let (_dir, app) = app();
        let (status, body, _) = get(app, "/news?category=market-news").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Launch Day"));
    }

    #[tokio::test]
    async fn test_detail_route() {
        let (_dir, app) = app();
        let (status, body, _) = get(app, "/news/launch-day").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Back to News"));
    }

    #[tokio::test]
    async fn test_missing_post_is_404() {
        let (_dir, app) = app();
        let (status, body, _) = get(app, "/news/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("404"));
    }

    #[tokio::test]
    async fn test_root_redirects_to_news() {
        let (_dir, app) = app();
        let (status, _, location) = get(app, "/").await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location.as_deref(), Some("/news"));
    }

    #[tokio::test]
    async fn test_remote_failure_is_500() {
        let (_dir, app) = app_with(Arc::new(FailingSource));
        let (status, body, _) = get(app, "/news").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Something went wrong"));
    }

    #[tokio::test]
    async fn test_static_asset_and_unknown_path() {
        let (dir, app) = app();
        std::fs::create_dir_all(dir.path().join("static")).unwrap();
        std::fs::write(dir.path().join("static/blog-banner-default.jpg"), b"jpg").unwrap();

        let (status, body, _) = get(app.clone(), "/blog-banner-default.jpg").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "jpg");

        let (status, _, _) = get(app, "/missing.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
