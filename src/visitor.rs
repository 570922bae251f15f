//! Reader-side state: the returning-visitor flag, the per-visit read count
//! and the grounding sentence shown under each story.
//!
//! The first-visit flag is the only visitor state that persists. It is read
//! once when a visit starts and written once if it was absent. The read count
//! lives for the visit only.

use crate::store::{KeyValueBackend, Store, VISITED_KEY};
use rand::Rng;

/// Sentences shown under a story, one picked at random per view.
pub const GROUNDING_SENTENCES: [&str; 5] = [
    "You\u{2019}re allowed to move slowly.",
    "Nothing is broken.",
    "Your timing is not wrong.",
    "Deep breaths are productive too.",
    "The world can wait for a moment.",
];

/// Greeting for a returning visitor.
pub const WELCOME_BACK: &str = "Welcome back. Nothing changed.";

/// Hint shown once a visitor has moved past their first story.
pub const PAUSE_HINT: &str = "That\u{2019}s enough for today.";

/// One visitor's session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visit {
    returning: bool,
    stories_read: u32,
}

impl Visit {
    /// Start a visit: note whether the visitor has been here before, and mark
    /// them as having been.
    pub fn begin<B: KeyValueBackend>(store: &mut Store<B>) -> Self {
        let returning = store.contains(VISITED_KEY);
        if !returning {
            if let Err(e) = store.save(VISITED_KEY, &true) {
                tracing::error!(error = %e, "failed to record first visit");
            }
        }
        tracing::debug!(returning, "visit started");
        Self {
            returning,
            stories_read: 0,
        }
    }

    pub fn is_returning(&self) -> bool {
        self.returning
    }

    pub fn stories_read(&self) -> u32 {
        self.stories_read
    }

    /// Count one story view and return the new total.
    pub fn record_read(&mut self) -> u32 {
        self.stories_read = self.stories_read.saturating_add(1);
        self.stories_read
    }

    /// Whether the visitor has read a story before the current one.
    pub fn should_suggest_pause(&self) -> bool {
        self.stories_read > 1
    }

    /// [`PAUSE_HINT`] once the visitor has read past their first story.
    pub fn pause_hint(&self) -> Option<&'static str> {
        self.should_suggest_pause().then_some(PAUSE_HINT)
    }

    pub fn greeting(&self) -> Option<&'static str> {
        self.returning.then_some(WELCOME_BACK)
    }
}

/// Pick a grounding sentence.
pub fn grounding_sentence(rng: &mut impl Rng) -> &'static str {
    GROUNDING_SENTENCES[rng.random_range(0..GROUNDING_SENTENCES.len())]
}
