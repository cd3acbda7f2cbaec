//! `album ask`: the chat widget in a terminal.

use album_core::ai::MAX_QUESTION_CHARS;
use album_core::chat::{ChatBrain, RouteError, Topic, md_to_html};
use album_core::gallery::{Album, Catalog, build_album_context};
use album_core::store::TopicStore;
use anyhow::{Context, Result, anyhow, bail};
use colored::Colorize;
use serde_json::json;
use tracing::debug;

use super::CommandContext;
use crate::render::terminal_text;

/// Output options for `ask`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AskOutput {
    /// Print the raw HTML rendering.
    pub html: bool,
    /// Print one JSON object.
    pub json: bool,
}

/// Routes `question`, sends it with album context and prints the answer.
pub async fn execute(
    ctx: &CommandContext,
    question: &str,
    album_id: Option<String>,
    topic: Option<String>,
    output: AskOutput,
) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        bail!("Question is empty");
    }
    let chars = question.chars().count();
    if chars > MAX_QUESTION_CHARS {
        bail!("Question too long ({chars} characters, max {MAX_QUESTION_CHARS})");
    }

    let catalog = ctx.catalog()?;
    let album = match album_id.as_deref() {
        Some(id) => Some(catalog.find(id).with_context(|| format!("Unknown album '{id}'"))?),
        None => None,
    };

    let brain = ChatBrain::new(TopicStore::new(ctx.state()?));
    if let Some(topic) = topic {
        brain.force_topic(topic.parse::<Topic>().map_err(|e| anyhow!(e))?);
    }

    let routed = match brain.route(question, album) {
        Ok(routed) => routed,
        Err(RouteError::Clarify { choices }) => {
            if output.json {
                println!("{}", json!({ "clarify": choices }));
            } else {
                println!("{}", "Which topic do you mean?".bold());
                for choice in choices {
                    println!("  {}  {}", format!("--topic {}", choice.id).cyan(), choice.label);
                }
            }
            return Ok(());
        }
    };

    let context_album = album.or_else(|| album_for_topic(&catalog, routed.topic)).or_else(|| catalog.albums().first());
    let context = context_album.map(build_album_context).unwrap_or_default();
    debug!(topic = ?routed.topic, album = ?context_album.map(|a| a.id.as_str()), "Sending question");

    // The directives are dropped when they would push the question over the limit.
    let prompt = if routed.guarded.chars().count() <= MAX_QUESTION_CHARS { routed.guarded.as_str() } else { question };
    let reply = ctx.client().with_retries(1).ask(prompt, &context).await?;
    let answer = if reply.answer.trim().is_empty() { "No answer.".to_string() } else { reply.answer };

    if output.json {
        println!(
            "{}",
            json!({
                "topic": routed.topic,
                "provider": reply.provider,
                "answer": answer,
                "html": md_to_html(&answer),
            })
        );
    } else if output.html {
        println!("{}", md_to_html(&answer));
    } else {
        let label = routed.topic.map_or("Assistant", Topic::id);
        let provider = reply.provider.map(|p| format!(" via {p}")).unwrap_or_default();
        println!("{}", format!("{label}{provider}").bold().cyan());
        println!("{}", terminal_text(&answer));
    }
    Ok(())
}

fn album_for_topic(catalog: &Catalog, topic: Option<Topic>) -> Option<&Album> {
    let topic = topic?;
    catalog.albums().iter().find(|a| Topic::for_album(a) == Some(topic))
}
