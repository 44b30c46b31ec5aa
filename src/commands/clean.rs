//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Newsdesk;

/// Remove the generated public directory
pub fn run(desk: &Newsdesk) -> Result<()> {
    if desk.public_dir.exists() {
        fs::remove_dir_all(&desk.public_dir)?;
        tracing::info!("Deleted: {:?}", desk.public_dir);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_clean_removes_public_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let desk = Newsdesk::with_config(dir.path().to_path_buf(), SiteConfig::default());
        fs::create_dir_all(desk.public_dir.join("news")).unwrap();

        run(&desk).unwrap();
        assert!(!desk.public_dir.exists());
        // Second run is a no-op
        run(&desk).unwrap();
    }
}
