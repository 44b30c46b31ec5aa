//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# newsdesk configuration

# Site
title: incoXchange
description: ''
language: en
timezone: ''

# URL
url: http://localhost:4000
root: /

# Directory
public_dir: public
static_dir: static

# Date format (Moment.js tokens)
date_format: M/D/YYYY

# Extra tracing directives, e.g. "tower_http=warn"
log_filter:

news:
  path: news
  title: News
  subtitle: Stay up to date with the latest updates, announcements, and industry news.
  recent_count: 6
  default_banner: /blog-banner-default.jpg

images:
  card: [800, 450]
  featured: [1200, 600]
  avatar: [60, 60]

studio:
  base_path: /studio
  # dir: studio/dist
  # hosted_url: https://example.sanity.studio/

# SANITY_PROJECT_ID / SANITY_DATASET override project_id / dataset
content:
  project_id: c10s91qu
  dataset: production
  api_version: '2024-01-01'
  use_cdn: true
  token_env: SANITY_API_READ_TOKEN
  # Serve a dataset export instead of the hosted API
  # export: content/sample.ndjson
"#;

const ENV_EXAMPLE: &str = r#"SANITY_PROJECT_ID=c10s91qu
SANITY_DATASET=production
# SANITY_API_READ_TOKEN=
"#;

const SAMPLE_EXPORT: &str = r#"{"_id":"author-newsroom","_type":"author","name":"Newsroom","bio":"Updates from the team."}
{"_id":"category-announcements","_type":"category","title":"Announcements","description":"Company and product news."}
{"_id":"post-hello-world","_type":"blogPost","title":"Hello World","slug":{"_type":"slug","current":"hello-world"},"excerpt":"Your first post, served from a local dataset export.","publishedAt":"2024-01-01T09:00:00Z","author":{"_type":"reference","_ref":"author-newsroom"},"categories":[{"_type":"reference","_ref":"category-announcements","_key":"c1"}],"tags":["welcome"],"content":[{"_type":"block","_key":"b1","style":"normal","markDefs":[],"children":[{"_type":"span","_key":"s1","text":"Edit this post in the studio, or replace this export with your own.","marks":[]}]}]}
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("static"))?;
    fs::create_dir_all(target_dir.join("content"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    fs::write(&config_path, CONFIG)?;
    fs::write(target_dir.join(".env.example"), ENV_EXAMPLE)?;
    fs::write(target_dir.join("content/sample.ndjson"), SAMPLE_EXPORT)?;

    Ok(())
}
