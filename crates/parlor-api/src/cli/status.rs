//! System status command.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Display store counts, cache occupancy, and where data lives.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let stats = state.session_service.stats().await?;

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "store": {
                "turns": stats.stored_turns,
                "sessions": stats.stored_sessions,
            },
            "cache": {
                "size": stats.cached_sessions,
                "max_size": stats.cache_capacity,
            },
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Parlor v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Store ──").dim());
    println!("  Sessions: {}", style(stats.stored_sessions).bold());
    println!("  Turns:    {}", style(stats.stored_turns).bold());
    println!();

    // Each CLI process starts with an empty cache.
    println!("  {}", style("── Session cache ──").dim());
    println!(
        "  Capacity: {}",
        style(stats.cache_capacity).bold()
    );
    println!(
        "  Cached:   {}",
        style(stats.cached_sessions).green()
    );
    println!();

    println!("  {}", style("── System ──").dim());
    println!(
        "  Data dir: {}",
        style(state.data_dir.display()).dim()
    );
    println!(
        "  Database: {}",
        style("SQLite (WAL mode)").dim()
    );
    println!();

    Ok(())
}
