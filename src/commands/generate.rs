//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Newsdesk;

/// Pre-render the news pages into the public directory
pub async fn run(desk: &Newsdesk) -> Result<()> {
    let start = std::time::Instant::now();

    let renderer = desk.renderer()?;
    let report = Generator::new(desk, renderer).generate().await?;

    if !report.skipped.is_empty() {
        tracing::warn!(
            "Skipped {} posts: {}",
            report.skipped.len(),
            report.skipped.join(", ")
        );
    }

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} pages in {:.2}s",
        report.pages,
        duration.as_secs_f64()
    );

    Ok(())
}
