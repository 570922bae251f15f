//! Identifier conventions.
//!
//! - Category ids are slugs of their label: lower-cased, with each run of
//!   whitespace replaced by a single dash (`"Starting Over"` → `starting-over`).
//! - Stories promoted from a submission take the submission id behind a fixed
//!   prefix (`1700000000000` → `story-1700000000000`).
//! - Everything else created at runtime (submissions, stories, gallery items,
//!   accounts) gets a time-derived id: the current Unix time in milliseconds,
//!   bumped past the last id handed out so two ids minted in the same
//!   millisecond never collide.

/// Prefix of stories created by promoting a submission.
pub const PROMOTED_STORY_PREFIX: &str = "story-";

/// Slug of a category label.
///
/// ```
/// # use after_stories::naming::category_slug;
/// assert_eq!(category_slug("  Starting   Over "), "starting-over");
/// assert_eq!(category_slug("Loss"), "loss");
/// ```
pub fn category_slug(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Id of the story produced by promoting the submission `submission_id`.
pub fn promoted_story_id(submission_id: &str) -> String {
    format!("{PROMOTED_STORY_PREFIX}{submission_id}")
}

/// Monotonic source of time-derived ids.
#[derive(Debug, Clone, Default)]
pub struct IdClock {
    last: i64,
}

impl IdClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id given the current time in milliseconds. Returns the numeric
    /// stamp, which doubles as the entity timestamp.
    pub fn next_at(&mut self, now_millis: i64) -> i64 {
        let stamp = now_millis.max(self.last + 1);
        self.last = stamp;
        stamp
    }

    /// Next id stamped with the wall clock.
    pub fn next(&mut self) -> i64 {
        self.next_at(chrono::Utc::now().timestamp_millis())
    }
}
