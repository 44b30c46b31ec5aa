//! List site content

use anyhow::Result;

use crate::helpers::{format_date, localize, post_url};
use crate::Newsdesk;

/// List site content by type
pub async fn run(desk: &Newsdesk, content_type: &str) -> Result<()> {
    let source = desk.content_source()?;
    let tz = desk.config.tz();

    match content_type {
        "post" | "posts" => {
            let posts = source.posts().await?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                let date = post
                    .published_at
                    .map(|d| format_date(&localize(&d, tz), "YYYY-MM-DD"))
                    .unwrap_or_else(|| "----------".to_string());
                println!(
                    "  {} - {} [{}]",
                    date,
                    post.title,
                    post.slug.as_str().unwrap_or("no slug")
                );
            }
        }
        "category" | "categories" => {
            let mut categories = source.categories().await?;
            println!("Categories ({}):", categories.len());
            categories.sort_by(|a, b| b.count.cmp(&a.count));
            for category in categories {
                println!("  {} ({})", category.title, category.count);
            }
        }
        "route" | "routes" => {
            let renderer = desk.renderer()?;
            let slugs = renderer.static_paths().await?;
            println!("Routes ({}):", slugs.len() + 1);
            println!("  {}", crate::helpers::news_url(&desk.config));
            for slug in slugs {
                println!("  {}", post_url(&desk.config, &slug));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, category, route",
                content_type
            );
        }
    }

    Ok(())
}
