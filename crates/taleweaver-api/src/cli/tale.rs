//! Tale CLI commands: generate, list public, list mine.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use taleweaver_types::tale::{GenerateTaleRequest, TaleView, UserId};

use crate::state::AppState;

/// Generate a draft and print it.
pub async fn generate(
    state: &AppState,
    request: GenerateTaleRequest,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let spinner = (!json && !quiet).then(|| {
        let spinner = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(template);
        }
        spinner.set_message("Weaving a tale...");
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        spinner
    });

    let result = state.tale_service.generate(request).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let tale = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tale)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&tale.title).cyan().bold());
    println!(
        "  {}",
        style(format!(
            "ages {} · {} · {}",
            tale.params.child_age, tale.params.mood, tale.params.topic
        ))
        .dim()
    );
    println!();
    for paragraph in tale.content.split("\n\n") {
        println!("  {}", paragraph.trim());
        println!();
    }

    Ok(())
}

/// List public tales, optionally marking the ones `viewer` likes.
pub async fn list_public(state: &AppState, viewer: Option<String>, json: bool) -> Result<()> {
    let viewer = viewer.map(UserId::new);
    let tales = state.tale_service.list_public_tales(viewer.as_ref()).await?;
    print_tales(&tales, json, "No public tales yet.")
}

/// List the tales `user` authored.
pub async fn list_mine(state: &AppState, user: String, json: bool) -> Result<()> {
    let tales = state.tale_service.list_my_tales(&UserId::new(user)).await?;
    print_tales(&tales, json, "No tales found for this user.")
}

fn print_tales(tales: &[TaleView], json: bool, empty_message: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tales)?);
        return Ok(());
    }

    if tales.is_empty() {
        println!();
        println!("  {} {empty_message}", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Title").fg(Color::White),
        Cell::new("Ages").fg(Color::White),
        Cell::new("Mood").fg(Color::White),
        Cell::new("Author").fg(Color::White),
        Cell::new("Visibility").fg(Color::White),
        Cell::new("Likes").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for view in tales {
        let tale = &view.tale;
        let visibility = if tale.is_public {
            Cell::new("● public").fg(Color::Green)
        } else {
            Cell::new("○ private").fg(Color::Yellow)
        };
        let likes = match view.is_liked {
            Some(true) => Cell::new(format!("♥ {}", view.likes)).fg(Color::Red),
            _ => Cell::new(view.likes),
        };

        table.add_row(vec![
            Cell::new(truncate(&tale.title, 40)).fg(Color::Cyan),
            Cell::new(tale.child_age),
            Cell::new(tale.mood),
            Cell::new(&tale.author),
            visibility,
            likes,
            Cell::new(tale.created_at.format("%Y-%m-%d %H:%M")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} tale{}",
        style(tales.len()).bold(),
        if tales.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Shorten to at most `max` characters, ending in `...` when cut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
