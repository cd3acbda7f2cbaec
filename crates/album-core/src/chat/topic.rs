//! Topic routing for the "ask the album" widget.
//!
//! Questions are classified into one of two portfolio topics. Short questions
//! that match neither topic are bounced back with a clarification request
//! instead of being sent upstream.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::gallery::Album;
use crate::store::TopicStore;

static AAVSS_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\baavss\b").expect("valid regex"));
static DATASET_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(sri\s*lanka|dataset)\b").expect("valid regex"));

const AAVSS_KEYWORDS: &[&str] = &[
    "aavss",
    "vehicle safety",
    "autonomous vehicle safety",
    "jetson",
    "sensor fusion",
    "fusion",
    "lidar",
    "radar",
    "camera",
    "nvidia",
    "driver monitoring",
    "dms",
    "adas",
    "can bus",
    "v2x",
];

const DATASET_KEYWORDS: &[&str] = &[
    "dataset",
    "sri lanka",
    "colombo",
    "kandy",
    "galle",
    "annotations",
    "segmentation",
    "bounding box",
    "lane",
    "night",
    "rain",
    "fog",
    "traffic signs",
    "autonomous driving dataset",
];

/// One of the two portfolio topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// Advanced Autonomous Vehicle Safety System.
    #[serde(rename = "AAVSS")]
    Aavss,
    /// Sri Lanka autonomous driving dataset.
    #[serde(rename = "Sri_Lanka_Dataset")]
    SriLankaDataset,
}

impl Topic {
    /// Every topic, in clarification order.
    pub const ALL: [Self; 2] = [Self::Aavss, Self::SriLankaDataset];

    /// Stable id used in storage.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Aavss => "AAVSS",
            Self::SriLankaDataset => "Sri_Lanka_Dataset",
        }
    }

    /// Human label for clarification choices.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Aavss => "AAVSS",
            Self::SriLankaDataset => "Sri Lankan Dataset",
        }
    }

    /// The topic an album belongs to, if any.
    pub fn for_album(album: &Album) -> Option<Self> {
        match album.id.as_str() {
            "aavss" => Some(Self::Aavss),
            "dataset" => Some(Self::SriLankaDataset),
            _ => None,
        }
    }

    fn scope(self) -> &'static str {
        match self {
            Self::Aavss => "Topic=AAVSS. Only answer about AAVSS unless explicitly asked to compare.",
            Self::SriLankaDataset => {
                "Topic=Sri Lankan Autonomous Driving Dataset. Only answer about the dataset unless explicitly asked to compare."
            }
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "aavss" => Ok(Self::Aavss),
            "sri_lanka_dataset" | "dataset" | "sri_lankan_dataset" => Ok(Self::SriLankaDataset),
            other => Err(format!("unknown topic '{other}'")),
        }
    }
}

/// A clarification choice offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicChoice {
    /// Topic id.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
}

/// Routing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The question is too short to classify; ask the user to pick.
    #[error("Please pick a topic")]
    Clarify {
        /// The topics to offer.
        choices: Vec<TopicChoice>,
    },
}

/// A question ready to send upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    /// The detected topic, if any.
    pub topic: Option<Topic>,
    /// The templated question.
    pub guarded: String,
}

/// Classifies a question.
///
/// An explicit `aavss` word wins, then `sri lanka`/`dataset`. Otherwise
/// keyword hits are counted and the larger side wins. A tie falls back to the
/// open album's topic, then to `stored`.
pub fn detect_topic(question: &str, album: Option<&Album>, stored: Option<Topic>) -> Option<Topic> {
    let text = question.to_lowercase();
    if AAVSS_WORD.is_match(&text) {
        return Some(Topic::Aavss);
    }
    if DATASET_WORD.is_match(&text) {
        return Some(Topic::SriLankaDataset);
    }

    let a = AAVSS_KEYWORDS.iter().filter(|k| text.contains(*k)).count();
    let d = DATASET_KEYWORDS.iter().filter(|k| text.contains(*k)).count();
    if a > d {
        return Some(Topic::Aavss);
    }
    if d > a {
        return Some(Topic::SriLankaDataset);
    }

    album.and_then(Topic::for_album).or(stored)
}

/// Three words or fewer.
pub fn is_short(question: &str) -> bool {
    question.split_whitespace().count() <= 3
}

/// Wraps a question with scope, style and persona directives.
pub fn build_guarded_question(topic: Option<Topic>, question: &str) -> String {
    let style = if is_short(question) {
        "Style=concise bullets, 1–5 lines max."
    } else {
        "Style=clear, structured, short paragraphs."
    };
    let scope = topic.map_or(
        "Topic=Auto-detect. Prefer single-topic answer; do not mix topics unless asked.",
        Topic::scope,
    );
    let persona = "Persona=Friendly expert, human tone. Be concrete and practical.";
    format!("[{scope}] [{style}] [{persona}] Q: {question}")
}

/// Session-scoped router remembering the last topic.
#[derive(Clone)]
pub struct ChatBrain {
    topics: TopicStore,
}

impl ChatBrain {
    /// Creates a router over `topics`.
    pub fn new(topics: TopicStore) -> Self {
        Self { topics }
    }

    /// The remembered topic, if any.
    pub fn stored_topic(&self) -> Option<Topic> {
        self.topics.get().parse().ok()
    }

    /// Routes a question, remembering the detected topic.
    ///
    /// # Errors
    /// Returns `RouteError::Clarify` for a short question with no topic.
    pub fn route(&self, question: &str, album: Option<&Album>) -> Result<Routed, RouteError> {
        let topic = detect_topic(question, album, self.stored_topic());
        if topic.is_none() && is_short(question) {
            debug!(question = %question, "Asking for clarification");
            return Err(RouteError::Clarify {
                choices: Topic::ALL
                    .iter()
                    .map(|t| TopicChoice { id: t.id(), label: t.label() })
                    .collect(),
            });
        }
        if let Some(topic) = topic {
            self.topics.set(topic.id());
        }
        debug!(topic = ?topic, "Routed question");
        Ok(Routed { topic, guarded: build_guarded_question(topic, question) })
    }

    /// Pins the topic, typically after a clarification answer.
    pub fn force_topic(&self, topic: Topic) {
        self.topics.set(topic.id());
    }
}
