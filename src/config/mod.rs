//! Configuration module

mod site;

pub use site::ContentConfig;
pub use site::ImageSizes;
pub use site::NewsConfig;
pub use site::SiteConfig;
pub use site::StudioConfig;
