//! Ultra-light Markdown to HTML for chat answers.
//!
//! Only the handful of constructs that models actually emit in short answers
//! are handled. Input is escaped first so the output is safe to inject.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static AUTOLINK: Lazy<Regex> = Lazy::new(|| Regex::new(r#"https?://[^\s)"']+"#).expect("valid regex"));
static H2_H3: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*(###?)[ \t]+(.+)$").expect("valid regex"));
static H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*#[ \t]+(.+)$").expect("valid regex"));
static BOLD_STARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));
static BOLD_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"__([^_]+)__").expect("valid regex"));
static EM_STAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(])\*([^*\n]+)\*([\s).,!?:;]|$)").expect("valid regex"));
static EM_UNDERSCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(])_([^_\n]+)_([\s).,!?:;]|$)").expect("valid regex"));
static UNDERLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+\+([^+\n]+)\+\+").expect("valid regex"));
static STRIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~([^~\n]+)~~").expect("valid regex"));
static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));
static OL_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*\d+\.\s(.+)$").expect("valid regex"));
static UL_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*[-*]\s(.+)$").expect("valid regex"));
static LI_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(<li>)([^:<]+?):\s*").expect("valid regex"));
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").expect("valid regex"));
static BLOCK_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<(ul|ol|h1|h2|h3)").expect("valid regex"));

/// Renders a model answer as HTML.
pub fn md_to_html(md: &str) -> String {
    if md.is_empty() {
        return String::new();
    }

    let text = md.replace(['\u{201C}', '\u{201D}'], "\"").replace(['\u{2018}', '\u{2019}'], "'");
    let text = escape_html(&text);

    let text = AUTOLINK.replace_all(&text, r#"<a href="$0" target="_blank" rel="noopener noreferrer">$0</a>"#);
    let text = H2_H3.replace_all(&text, |caps: &Captures<'_>| {
        let level = if &caps[1] == "###" { 3 } else { 2 };
        format!("<h{level}>{}</h{level}>", &caps[2])
    });
    let text = H1.replace_all(&text, "<h1>$1</h1>");

    let text = BOLD_STARS.replace_all(&text, "<strong>$1</strong>");
    let text = BOLD_UNDERSCORES.replace_all(&text, "<strong>$1</strong>");
    let text = emphasize(&text, &EM_STAR);
    let text = emphasize(&text, &EM_UNDERSCORE);
    let text = UNDERLINE.replace_all(&text, "<u>$1</u>");
    let text = STRIKE.replace_all(&text, "<del>$1</del>");
    let text = CODE.replace_all(&text, "<code>$1</code>");

    let text = group_lists(&text);
    let text = LI_LABEL.replace_all(&text, "$1<strong>$2:</strong> ");

    PARAGRAPH_BREAK
        .split(&text)
        .map(|chunk| {
            if BLOCK_START.is_match(chunk) {
                chunk.to_string()
            } else {
                format!("<p>{}</p>", chunk.replace('\n', "<br>"))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Applies an emphasis pattern whose third group is a boundary character.
///
/// The boundary is left unconsumed so it can open the next match.
fn emphasize(text: &str, re: &Regex) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(caps) = re.captures_at(text, pos) {
        let (Some(whole), Some(boundary)) = (caps.get(0), caps.get(3)) else {
            break;
        };
        out.push_str(&text[pos..whole.start()]);
        out.push_str(&caps[1]);
        out.push_str("<em>");
        out.push_str(&caps[2]);
        out.push_str("</em>");
        pos = if boundary.is_empty() { whole.end() } else { boundary.start() };
    }
    out.push_str(&text[pos..]);
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    const fn tag(self) -> &'static str {
        match self {
            Self::Ordered => "ol",
            Self::Unordered => "ul",
        }
    }
}

/// Folds runs of consecutive list lines into single `<ol>`/`<ul>` lines.
fn group_lists(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut open: Option<(ListKind, Vec<String>)> = None;

    for line in text.split('\n') {
        let item = OL_ITEM
            .captures(line)
            .map(|c| (ListKind::Ordered, c[1].trim().to_string()))
            .or_else(|| UL_ITEM.captures(line).map(|c| (ListKind::Unordered, c[1].trim().to_string())));

        if let Some((kind, body)) = item {
            if let Some((current, items)) = open.as_mut()
                && *current == kind
            {
                items.push(body);
                continue;
            }
            if let Some(list) = open.take() {
                lines.push(render_list(list));
            }
            open = Some((kind, vec![body]));
        } else {
            if let Some(list) = open.take() {
                lines.push(render_list(list));
            }
            lines.push(line.to_string());
        }
    }
    if let Some(list) = open {
        lines.push(render_list(list));
    }
    lines.join("\n")
}

fn render_list((kind, items): (ListKind, Vec<String>)) -> String {
    let tag = kind.tag();
    let body: String = items.iter().map(|i| format!("<li>{i}</li>")).collect();
    format!("<{tag}>{body}</{tag}>")
}
