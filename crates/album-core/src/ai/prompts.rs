//! Prompt text and reply parsing for the proxy.

use album_abstraction::ChatMessage;
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum number of tags kept from a tag reply.
pub const MAX_TAGS: usize = 8;

static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[-*•]+|\d+[.)])\s*").expect("valid regex"));

const ASK_SYSTEM: &str = "You are a concise technical assistant for a portfolio site. \
     Only use the provided album context. If unknown, say so briefly.";

const CAPTION_SYSTEM: &str = "Describe the image in one concise sentence. Avoid opinions; be specific.";
const CAPTION_USER: &str = "Describe this image in one sentence.";

const TAGS_SYSTEM: &str = "Return 3–6 comma-separated tags. Use short, concrete nouns/adjectives only.";

/// Messages for an `ask` call.
pub fn ask_messages(question: &str, context: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(ASK_SYSTEM),
        ChatMessage::user(format!(
            "Album context:\n{context}\n\nQuestion: {question}\n\
             Answer in 2–6 sentences with concrete details if present."
        )),
    ]
}

/// Messages for the vision caption call.
pub fn caption_messages(image_url: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(CAPTION_SYSTEM), ChatMessage::user_with_image(CAPTION_USER, image_url)]
}

/// Messages for the follow-up tag call.
pub fn tag_messages(caption: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(TAGS_SYSTEM), ChatMessage::user(format!("Caption: {caption}\nReturn only tags."))]
}

/// Splits a tag reply into at most `MAX_TAGS` clean tags.
///
/// Accepts comma or newline separated lists, strips list bullets, quotes and
/// leading `#`, and drops case-insensitive duplicates.
pub fn parse_tags(reply: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for raw in reply.split([',', '\n']) {
        let unbulleted = BULLET.replace(raw.trim(), "");
        let tag = unbulleted
            .trim()
            .trim_matches(|c: char| matches!(c, '"' | '\'' | '`'))
            .trim_start_matches('#')
            .trim();
        if tag.is_empty() || tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            continue;
        }
        tags.push(tag.to_string());
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comma_list() {
        assert_eq!(parse_tags("road, night , rain,,"), vec!["road", "night", "rain"]);
    }

    #[test]
    fn test_parse_bullets_quotes_and_hashes() {
        assert_eq!(
            parse_tags("- \"lidar\"\n* #radar\n1. 'camera'\n• Jetson"),
            vec!["lidar", "radar", "camera", "Jetson"]
        );
    }

    #[test]
    fn test_parse_dedups_case_insensitively_and_caps() {
        assert_eq!(parse_tags("Car, car, CAR, bus"), vec!["Car", "bus"]);
        assert_eq!(parse_tags("4k, 3d map"), vec!["4k", "3d map"]);
        let many = (0..20).map(|i| format!("t{i}")).collect::<Vec<_>>().join(",");
        assert_eq!(parse_tags(&many).len(), MAX_TAGS);
    }

    #[test]
    fn test_ask_messages_embed_context() {
        let messages = ask_messages("What is it?", "Title: X");
        assert_eq!(messages[0].role, "system");
        let user = messages[1].content.text();
        assert!(user.starts_with("Album context:\nTitle: X\n\nQuestion: What is it?\n"));
    }

    #[test]
    fn test_caption_messages_carry_image() {
        let messages = caption_messages("https://x/a.jpg");
        assert!(messages[1].content.has_images());
        assert!(tag_messages("A car.")[1].content.text().contains("Caption: A car."));
    }
}
