//! Content module - queries, documents and rich-content rendering

mod client;
mod image;
mod memory;
mod model;
mod portable_text;
mod query;

pub use client::{ContentSource, SanityClient};
pub use image::ImageResolver;
pub use memory::MemoryStore;
pub use model::{
    AssetRef, Author, CategorySummary, ImageRef, Post, PostCategory, PostSummary, Slug, SlugEntry,
    READ_TIME,
};
pub use portable_text::{Block, PortableTextRenderer};
pub use query::Query;
