//! `album caption`: caption one image or a whole album through the server.

use album_core::gallery::{CaptionSource, caption_album};
use album_core::store::{AiTagStore, CaptionStore};
use anyhow::{Context, Result, bail};
use colored::Colorize;
use serde_json::json;

use super::CommandContext;

/// Captions `image_url`, or every image of `album_id`.
pub async fn execute(
    ctx: &CommandContext,
    image_url: Option<String>,
    album_id: Option<String>,
    json_output: bool,
) -> Result<()> {
    let client = ctx.client().with_retries(1);
    let kv = ctx.state()?;
    let captions = CaptionStore::new(kv.clone());

    if let Some(album_id) = album_id {
        let catalog = ctx.catalog()?;
        let album = catalog.find(&album_id).with_context(|| format!("Unknown album '{album_id}'"))?;
        let ai_tags = AiTagStore::new(kv);
        let report = caption_album(album, &client, &captions, &ai_tags).await;

        if json_output {
            let items: Vec<_> = report
                .captions
                .iter()
                .map(|(index, src, c)| json!({ "index": index, "src": src, "caption": c.caption, "tags": c.tags }))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "album": album.id,
                    "captions": items,
                    "tags": report.tags,
                    "cached": report.cached,
                    "failed": report.failed,
                }))?
            );
        } else {
            for (index, _, caption) in &report.captions {
                println!("{} {}", format!("#{}", index + 1).bold(), caption.caption);
                if !caption.tags.is_empty() {
                    println!("   {}", caption.tags.join(", ").dimmed());
                }
            }
            println!();
            println!(
                "{} captioned, {} from cache, {} failed",
                report.captions.len().to_string().green(),
                report.cached,
                if report.failed > 0 { report.failed.to_string().red() } else { "0".normal() }
            );
        }
        if report.failed > 0 && report.captions.is_empty() {
            bail!("No image in '{}' could be captioned", album.id);
        }
        return Ok(());
    }

    let Some(image_url) = image_url else {
        bail!("Give an image URL or --album <id>");
    };

    let caption = match captions.get(&image_url) {
        Some(stored) => stored,
        None => {
            let fresh = client.caption(&image_url).await?;
            captions.set(&image_url, &fresh);
            fresh
        }
    };

    if json_output {
        println!("{}", serde_json::to_string(&caption)?);
    } else {
        println!("{}", caption.caption);
        if !caption.tags.is_empty() {
            println!("{}", caption.tags.join(", ").dimmed());
        }
    }
    Ok(())
}
