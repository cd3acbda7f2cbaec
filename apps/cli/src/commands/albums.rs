//! `album albums`: list the catalog.

use album_core::gallery::{has_video, thumb_for};
use anyhow::Result;
use colored::Colorize;

use super::CommandContext;

/// Prints every album with its media.
pub fn execute(ctx: &CommandContext, json_output: bool) -> Result<()> {
    let catalog = ctx.catalog()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(catalog.albums())?);
        return Ok(());
    }

    println!("{}", format!("{} album(s)", catalog.len()).bold().cyan());
    for album in catalog.albums() {
        println!();
        println!("{} {}", album.id.bold(), format!("- {}", album.title).dimmed());
        if !album.description.is_empty() {
            println!("  {}", album.description);
        }
        if !album.tags.is_empty() {
            println!("  Tags: {}", album.tags.join(", ").yellow());
        }
        if has_video(album) {
            println!("  {}", "Contains video".magenta());
        }
        for (i, item) in album.media.iter().enumerate() {
            println!("  {}. [{}] {}", i + 1, item.media_type, item.src);
            let thumb = thumb_for(item, &album.cover);
            if thumb != item.src {
                println!("     {} {}", "thumb:".dimmed(), thumb.dimmed());
            }
        }
    }
    Ok(())
}
