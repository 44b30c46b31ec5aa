//! Helper functions for page rendering
//!
//! URL building, date formatting and escaping shared by the page
//! renderer and the template filters.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
