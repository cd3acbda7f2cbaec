//! `album search`: filter albums like the grid search box.

use album_core::gallery::filter_albums;
use album_core::store::AiTagStore;
use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::CommandContext;

/// Prints albums matching `term`, including matches on stored AI tags.
pub fn execute(ctx: &CommandContext, term: &str, json_output: bool) -> Result<()> {
    let catalog = ctx.catalog()?;
    let ai_tags = AiTagStore::new(ctx.state()?);
    let found = filter_albums(catalog.albums(), term, &ai_tags);

    if json_output {
        let ids: Vec<&str> = found.iter().map(|a| a.id.as_str()).collect();
        println!("{}", json!({ "term": term.trim(), "albums": ids }));
        return Ok(());
    }

    if found.is_empty() {
        println!("{}", format!("No albums match '{}'", term.trim()).yellow());
        return Ok(());
    }
    for album in found {
        println!("{} {}", album.id.bold(), album.title);
        let extra = ai_tags.get(&album.id);
        if !extra.is_empty() {
            println!("  {} {}", "AI tags:".dimmed(), extra.join(", "));
        }
    }
    Ok(())
}
