//! Analytics summary command

use colored::Colorize;
use std::sync::Arc;

use crate::interfaces::cli::CliError;
use crate::services::AnalyticsService;
use crate::storage::SeaOrmStorage;

pub async fn show_stats(storage: Arc<SeaOrmStorage>) -> Result<(), CliError> {
    let stats = AnalyticsService::new(storage).stats().await?;

    println!("{}", "Click analytics".bold().green());
    println!();
    println!(
        "  {} {}",
        "Total clicks:".bold(),
        stats.total_clicks.to_string().cyan()
    );
    println!(
        "  {} {}",
        "Last 24 hours:".bold(),
        stats.clicks_last_24h.to_string().cyan()
    );

    if !stats.clicks_by_platform.is_empty() {
        println!();
        println!("{}", "By platform:".bold());
        for item in &stats.clicks_by_platform {
            println!("  {:<16} {}", item.platform.blue(), item.count);
        }
    }

    if !stats.trend.is_empty() {
        println!();
        println!("{}", "Trend:".bold());
        for point in &stats.trend {
            println!("  {} {}", point.date.dimmed(), point.count);
        }
    }

    if !stats.top_links.is_empty() {
        println!();
        println!("{}", "Top links:".bold());
        for (rank, link) in stats.top_links.iter().enumerate() {
            println!(
                "  {}. {} {} ({})",
                rank + 1,
                link.platform.blue(),
                link.url.underline(),
                link.count.to_string().cyan()
            );
        }
    }

    Ok(())
}
