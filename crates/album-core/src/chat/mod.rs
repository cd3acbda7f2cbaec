//! Chat widget logic: topic routing and answer rendering.

pub mod markdown;
pub mod topic;

pub use markdown::md_to_html;
pub use topic::{
    ChatBrain, RouteError, Routed, Topic, TopicChoice, build_guarded_question, detect_topic, is_short,
};
