//! CLI output formatting.
//!
//! # Entity Display Contract
//!
//! Every listed entity follows the same two-level pattern:
//!
//! 1. **Header line**: positional index + identity (+ state in brackets)
//! 2. **Context lines**: indented detail such as category, summary, id
//!
//! # Output Format
//!
//! ## Stories
//!
//! ```text
//! 001 The Quiet Year [Live]
//!     Category: Burnout
//!     Summary: I kept saying yes until there was nothing left to say it with.
//! 002 Shared Path [Draft]
//!     Category: Loss
//!     Summary: Some days were harder than...
//! ```
//!
//! ## Reading a story
//!
//! ```text
//! The Year Everything Was Urgent
//!     Category: Burnout
//!     Slipped: ...
//!     Harder: ...
//!     Helped: ...
//!     Today: ...
//! Nothing is broken.
//! That's enough for today.
//! ```
//!
//! ## Inbox
//!
//! ```text
//! 001 1700000000000 (2023-11-14 22:13, with photo)
//!     Slipped: I stopped answering messages and...
//!     Helped: Walking every morning.
//! ```
//!
//! ## Categories
//!
//! ```text
//! 001 burnout: Burnout (1 story)
//! 002 loss: Loss (0 stories)
//! ```
//!
//! # Architecture
//!
//! Each listing has a `format_*` function (returns `Vec<String>`) for
//! testability. Format functions are pure: no I/O, no side effects.
//! [`print_lines`] writes any of them to stdout.

use crate::imaging::Dimensions;
use crate::lifecycle::AppState;
use crate::model::{Story, Submission};
use crate::permissions::{CapabilitySet, Role};
use crate::platform::{Deleted, StoryView};

/// Longest excerpt shown in a context line.
const EXCERPT_CHARS: usize = 60;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn excerpt(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max).collect();
        format!("{}...", kept.trim_end())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Render a millisecond timestamp as UTC `YYYY-MM-DD HH:MM`.
fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn category_label<'a>(state: &'a AppState, id: &'a str) -> &'a str {
    state.category(id).map(|c| c.label.as_str()).unwrap_or(id)
}

// ============================================================================
// Listings
// ============================================================================

pub fn format_status(state: &AppState, role: Option<Role>, capabilities: CapabilitySet) -> Vec<String> {
    let live = state.stories.iter().filter(|s| s.is_published).count();
    let mut lines = vec![
        state.branding.site_name.clone(),
        format!(
            "{}Stories: {} ({} live, {} draft)",
            indent(1),
            state.stories.len(),
            live,
            state.stories.len() - live
        ),
        format!("{}Categories: {}", indent(1), state.categories.len()),
        format!("{}Submissions: {}", indent(1), state.submissions.len()),
        format!("{}Accounts: {}", indent(1), state.accounts.len()),
    ];
    match role {
        Some(role) => {
            let granted: Vec<String> = capabilities.iter().map(|c| c.to_string()).collect();
            lines.push(format!("Signed in as {role}"));
            lines.push(format!("{}Can: {}", indent(1), granted.join(", ")));
        }
        None => lines.push("Not signed in".to_string()),
    }
    lines
}

pub fn format_stories<'a>(
    state: &AppState,
    stories: impl IntoIterator<Item = &'a Story>,
) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, story) in stories.into_iter().enumerate() {
        lines.push(format!(
            "{} {} [{}]",
            format_index(i + 1),
            story.title,
            story.state()
        ));
        lines.push(format!("{}Id: {}", indent(1), story.id));
        lines.push(format!(
            "{}Category: {}",
            indent(1),
            category_label(state, &story.category)
        ));
        if !story.summary.is_empty() {
            lines.push(format!(
                "{}Summary: {}",
                indent(1),
                excerpt(&story.summary, EXCERPT_CHARS)
            ));
        }
        if !story.gallery.is_empty() {
            lines.push(format!(
                "{}Gallery: {}",
                indent(1),
                plural(story.gallery.len(), "photo", "photos")
            ));
        }
    }
    if lines.is_empty() {
        lines.push("No stories".to_string());
    }
    lines
}

/// A published story in full, as a visitor reads it.
pub fn format_story_view(view: &StoryView) -> Vec<String> {
    let mut lines = vec![
        view.story.title.clone(),
        format!("{}Category: {}", indent(1), view.category),
    ];
    for (name, text) in view.story.sections.named() {
        lines.push(format!("{}{}: {}", indent(1), capitalize(name), text));
    }
    lines.push(view.grounding.to_string());
    if let Some(hint) = view.pause_hint {
        lines.push(hint.to_string());
    }
    lines
}

pub fn format_inbox(submissions: &[Submission]) -> Vec<String> {
    if submissions.is_empty() {
        return vec!["Inbox empty".to_string()];
    }
    let mut lines = Vec::new();
    for (i, sub) in submissions.iter().enumerate() {
        let photo = if sub.image.is_some() { ", with photo" } else { "" };
        lines.push(format!(
            "{} {} ({}{})",
            format_index(i + 1),
            sub.id,
            format_timestamp(sub.timestamp),
            photo
        ));
        lines.push(format!(
            "{}Slipped: {}",
            indent(1),
            excerpt(&sub.slipped, EXCERPT_CHARS)
        ));
        lines.push(format!(
            "{}Helped: {}",
            indent(1),
            excerpt(&sub.helped, EXCERPT_CHARS)
        ));
    }
    lines
}

pub fn format_categories(state: &AppState) -> Vec<String> {
    state
        .categories
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let count = state.stories.iter().filter(|s| s.category == c.id).count();
            format!(
                "{} {}: {} ({})",
                format_index(i + 1),
                c.id,
                c.label,
                plural(count, "story", "stories")
            )
        })
        .collect()
}

pub fn format_deleted(deleted: &Deleted) -> Vec<String> {
    match deleted {
        Deleted::Story(story) => vec![format!("Deleted story \"{}\"", story.title)],
        Deleted::Submission(sub) => vec![format!("Discarded submission {}", sub.id)],
        Deleted::Category { category, moved } => {
            let mut lines = vec![format!("Deleted category {}", category.id)];
            if !moved.is_empty() {
                lines.push(format!(
                    "{}Moved {}: {}",
                    indent(1),
                    plural(moved.len(), "story", "stories"),
                    moved.join(", ")
                ));
            }
            lines
        }
    }
}

pub fn format_crop(source: Dimensions, output: (u32, u32), bytes: usize) -> Vec<String> {
    vec![
        format!("Source: {}x{}", source.width, source.height),
        format!("Output: {}x{} JPEG ({} bytes)", output.0, output.1, bytes),
    ]
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::permissions::capabilities_for;

    fn submission(id: &str, image: Option<&str>) -> Submission {
        Submission {
            id: id.into(),
            slipped: "I stopped answering messages.".into(),
            helped: "Walking every morning.".into(),
            image: image.map(str::to_string),
            timestamp: 1_700_000_000_000,
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn excerpt_short() {
        assert_eq!(excerpt("Short text", 40), "Short text");
    }

    #[test]
    fn excerpt_long() {
        let text = "a".repeat(50);
        assert_eq!(excerpt(&text, 40), format!("{}...", "a".repeat(40)));
    }

    #[test]
    fn excerpt_counts_characters() {
        let text = "ü".repeat(10);
        assert_eq!(excerpt(&text, 10), text);
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn timestamp_is_utc() {
        assert_eq!(format_timestamp(1_700_000_000_000), "2023-11-14 22:13");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "story", "stories"), "1 story");
        assert_eq!(plural(0, "story", "stories"), "0 stories");
    }

    // =========================================================================
    // Listings
    // =========================================================================

    #[test]
    fn stories_show_state_and_category_label() {
        let mut state = AppState::seeded();
        state.set_published("2", false).unwrap();
        let lines = format_stories(&state, &state.stories);
        assert!(lines[0].starts_with("001 ") && lines[0].ends_with("[Live]"));
        assert_eq!(lines[1], "    Id: 1");
        assert_eq!(lines[2], "    Category: Burnout");
        assert!(lines.iter().any(|l| l.ends_with("[Draft]")));
    }

    #[test]
    fn empty_story_list() {
        let state = AppState::seeded();
        assert_eq!(format_stories(&state, &[]), vec!["No stories"]);
    }

    #[test]
    fn story_view_lists_sections_then_grounding() {
        let state = AppState::seeded();
        let story = state.story("1").unwrap();
        let view = StoryView {
            story,
            category: "Burnout",
            grounding: "Nothing is broken.",
            pause_hint: None,
        };
        let lines = format_story_view(&view);
        assert_eq!(lines[0], story.title);
        assert_eq!(lines[1], "    Category: Burnout");
        assert_eq!(lines[2], format!("    Slipped: {}", story.sections.slipped));
        assert!(lines[5].starts_with("    Today: "));
        assert_eq!(lines.last().unwrap(), "Nothing is broken.");
    }

    #[test]
    fn story_view_ends_with_pause_hint() {
        let state = AppState::seeded();
        let view = StoryView {
            story: state.story("2").unwrap(),
            category: "Loss",
            grounding: "Nothing is broken.",
            pause_hint: Some(crate::visitor::PAUSE_HINT),
        };
        let lines = format_story_view(&view);
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[7], crate::visitor::PAUSE_HINT);
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("slipped"), "Slipped");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn inbox_lines() {
        let lines = format_inbox(&[submission("7", Some("data:image/png;base64,AA")), submission("6", None)]);
        assert_eq!(lines[0], "001 7 (2023-11-14 22:13, with photo)");
        assert_eq!(lines[1], "    Slipped: I stopped answering messages.");
        assert_eq!(lines[3], "002 6 (2023-11-14 22:13)");
    }

    #[test]
    fn empty_inbox() {
        assert_eq!(format_inbox(&[]), vec!["Inbox empty"]);
    }

    #[test]
    fn categories_with_counts() {
        let state = AppState::seeded();
        let lines = format_categories(&state);
        assert_eq!(lines[0], "001 burnout: Burnout (1 story)");
        assert_eq!(lines[3], "004 quiet-days: Quiet Days (0 stories)");
    }

    #[test]
    fn status_for_anonymous_and_editor() {
        let state = AppState::seeded();
        let lines = format_status(&state, None, capabilities_for(None));
        assert_eq!(lines.last().unwrap(), "Not signed in");
        assert_eq!(lines[1], "    Stories: 3 (3 live, 0 draft)");

        let lines = format_status(&state, Some(Role::Editor), capabilities_for(Some(Role::Editor)));
        assert!(lines.iter().any(|l| l == "Signed in as EDITOR"));
    }

    #[test]
    fn deleted_category_lists_moves() {
        let lines = format_deleted(&Deleted::Category {
            category: Category::new("loss", "Loss"),
            moved: vec!["2".into(), "9".into()],
        });
        assert_eq!(lines, vec!["Deleted category loss", "    Moved 2 stories: 2, 9"]);
    }
}
