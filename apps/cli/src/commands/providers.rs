//! `album providers`: which upstreams the server would use.

use album_core::ai::AiService;
use album_core::config::Config;
use album_models::ProviderKind;
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;

/// Prints configured keys and the effective ask/caption chains.
pub fn execute(json_output: bool) -> Result<()> {
    let config = Config::load().context("Failed to load server configuration")?;
    let service = AiService::from_config(&config)?;
    let providers = &config.providers;

    if json_output {
        let kinds: Vec<_> = ProviderKind::ALL
            .iter()
            .map(|&kind| {
                let factory = providers.provider_config(kind);
                json!({
                    "id": kind.id(),
                    "configured": providers.has_key(kind),
                    "model": factory.effective_model(),
                    "vision": kind.supports_vision(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "providers": kinds,
                "ask": service.ask_provider_ids(),
                "caption": service.caption_provider_ids(),
                "timeoutSecs": providers.timeout_secs,
            }))?
        );
        return Ok(());
    }

    println!("{}", "Providers".bold().cyan());
    for kind in ProviderKind::ALL {
        let factory = providers.provider_config(kind);
        let status = if providers.has_key(kind) {
            "✓ key set".green()
        } else {
            format!("✗ {} unset", kind.env_key()).dimmed()
        };
        println!("  {:<11} {:<40} {}", kind.id(), factory.effective_model(), status);
    }
    println!();
    println!("Ask order:     {}", chain(&service.ask_provider_ids()));
    println!("Caption order: {}", chain(&service.caption_provider_ids()));
    println!("Timeout:       {}s", providers.timeout_secs);
    Ok(())
}

fn chain(ids: &[&str]) -> String {
    if ids.is_empty() { "(none)".yellow().to_string() } else { ids.join(" → ") }
}
