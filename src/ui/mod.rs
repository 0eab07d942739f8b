//! Chat front ends that talk to the agent in-process.
//!
//! - [`terminal`]: line-oriented chat on stdin/stdout
//! - [`web`]: a single embedded HTML page plus a JSON message endpoint

pub mod terminal;
pub mod web;

pub use terminal::run_chat;
pub use web::run_ui;

pub const TITLE: &str = "🌱 GreenThumb Plant Agent";

pub const DESCRIPTION: &str = "I remember your garden and provide expert botanical advice.";

pub const EXAMPLES: [&str; 4] = [
    "Is Aloe Vera toxic to cats?",
    "What's wrong with my sansevieria?",
    "How often should I water my ficus elastica?",
    "List my current plants.",
];

/// The reply shown in place of an answer when a turn fails.
pub fn sprout_error(err: &impl std::fmt::Display) -> String {
    format!("🌱 I ran into a bit of a sprout-error: {err}")
}
