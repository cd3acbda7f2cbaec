//! Terminal rendering of chat answers.

use album_core::chat::md_to_html;
use colored::Colorize;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static STRONG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<strong>(.*?)</strong>").expect("valid regex"));
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"<h[1-3]>(.*?)</h[1-3]>").expect("valid regex"));
static ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"<ol>(.*?)</ol>").expect("valid regex"));
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<a href="[^"]*"[^>]*>(.*?)</a>"#).expect("valid regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Renders a Markdown answer as plain terminal text.
///
/// Goes through the same HTML renderer the site uses, then maps the few
/// produced tags onto bullets, numbers and bold text.
pub fn terminal_text(md: &str) -> String {
    let html = md_to_html(md);
    let html = HEADING.replace_all(&html, |c: &Captures<'_>| format!("{}\n", c[1].bold()));
    let html = STRONG.replace_all(&html, |c: &Captures<'_>| c[1].bold().to_string());
    let html = LINK.replace_all(&html, "$1");
    let html = ORDERED.replace_all(&html, |c: &Captures<'_>| {
        c[1].split("<li>")
            .filter(|item| !item.is_empty())
            .enumerate()
            .map(|(i, item)| format!("\n  {}. {}", i + 1, item.trim_end_matches("</li>")))
            .collect::<String>()
    });
    let text = html
        .replace("<li>", "\n  • ")
        .replace("<br>", "\n")
        .replace("</p>\n<p>", "\n\n");
    let text = TAG.replace_all(&text, "");
    text.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&").trim_start_matches('\n').trim_end().to_string()
}
