//! `album health`: probe the server.

use anyhow::{Result, bail};
use colored::Colorize;

use super::CommandContext;

/// Exits non-zero unless the server reports `ok`.
pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let client = ctx.client();
    match client.health().await {
        Ok(true) => {
            println!("{} {}", "✓".green(), client.base());
            Ok(())
        }
        Ok(false) => bail!("{} answered but is not healthy", client.base()),
        Err(e) => bail!("{} is unreachable: {e:#}", client.base()),
    }
}
