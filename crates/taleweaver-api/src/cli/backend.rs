//! `check-backend` command.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Probe the generation backend and report the outcome.
///
/// A configured but unreachable backend is an error exit; no backend at all
/// is reported but not treated as failure.
pub async fn check_backend(state: &AppState, json: bool) -> Result<()> {
    let status = state.tale_service.check_backend().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!();
        match (&status.provider, status.reachable) {
            (None, _) => println!(
                "  {} No generation backend configured ({})",
                style("i").blue().bold(),
                style(state.data_dir.join("config.toml").display()).dim()
            ),
            (Some(provider), true) => println!(
                "  {} {} reachable (model {})",
                style("✓").green(),
                style(provider).cyan(),
                status.model.as_deref().unwrap_or("unknown")
            ),
            (Some(provider), false) => println!(
                "  {} {} unreachable: {}",
                style("✗").red(),
                style(provider).cyan(),
                status.error.as_deref().unwrap_or("unknown error")
            ),
        }
        println!(
            "  {} Template fallback {}",
            style("·").dim(),
            if status.fallback_enabled { "enabled" } else { "disabled" }
        );
        println!();
    }

    if status.provider.is_some() && !status.reachable {
        anyhow::bail!("generation backend unreachable");
    }
    Ok(())
}
