//! Content lifecycle: the application state and its transitions.
//!
//! [`AppState`] holds every persisted collection. The methods here are pure
//! state transitions: they validate, mutate in memory and report which
//! collections changed. They never touch storage and never check
//! permissions; [`Platform`](crate::platform::Platform) does both around
//! them.
//!
//! ## Story states
//!
//! ```text
//!   create / promote          publish
//!  ─────────────────► Draft ◄─────────► Live
//!                       │     unpublish   │
//!                       └──── delete ─────┴──► (gone)
//! ```
//!
//! ## Submission states
//!
//! ```text
//!  Pending ──promote──► (new Draft story, submission removed)
//!     └─────discard───► (removed)
//! ```
//!
//! A declined transition returns [`CommandError`] and leaves the state
//! exactly as it was.

use crate::model::{AdminUser, Branding, Category, Sections, Story, Submission};
use crate::naming::{category_slug, promoted_story_id};
use crate::permissions::{Capability, Role};
use crate::seed;
use crate::store::{
    ACCOUNTS_KEY, BRANDING_KEY, CATEGORIES_KEY, KeyValueBackend, STORIES_KEY, SUBMISSIONS_KEY,
    Store, StoreError,
};
use std::collections::HashSet;
use thiserror::Error;

/// Title every promoted story starts with.
pub const PROMOTED_TITLE: &str = "Shared Path";
/// `harder` section of a promoted story.
pub const PROMOTED_HARDER: &str = "Shared by a visitor.";
/// `today` section of a promoted story.
pub const PROMOTED_TODAY: &str = "Still unfolding.";
/// Category used when promoting with no categories defined.
pub const FALLBACK_CATEGORY: &str = "uncategorized";
/// Characters of `slipped` kept in a promoted summary.
pub const SUMMARY_CHARS: usize = 100;

/// Why a command was declined.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Not permitted: requires {capability}.")]
    Forbidden { capability: Capability },
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("{0}")]
    Validation(String),
    #[error("No {kind} with id {id}.")]
    NotFound { kind: &'static str, id: String },
    #[error("At least one category must exist.")]
    LastCategory,
    #[error("Cannot delete main admin account.")]
    ProtectedAccount,
    #[error("A submission is already being sent.")]
    SubmissionInFlight,
    #[error("No image edit in progress.")]
    NoEditSession,
    #[error("No story is open in the editor.")]
    NoDraft,
}

impl CommandError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// One persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Stories,
    Categories,
    Submissions,
    Accounts,
    Branding,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Stories,
        Collection::Categories,
        Collection::Submissions,
        Collection::Accounts,
        Collection::Branding,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Stories => STORIES_KEY,
            Self::Categories => CATEGORIES_KEY,
            Self::Submissions => SUBMISSIONS_KEY,
            Self::Accounts => ACCOUNTS_KEY,
            Self::Branding => BRANDING_KEY,
        }
    }
}

/// Every persisted collection, in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub stories: Vec<Story>,
    pub categories: Vec<Category>,
    /// Newest first.
    pub submissions: Vec<Submission>,
    pub accounts: Vec<AdminUser>,
    pub branding: Branding,
}

impl Default for AppState {
    fn default() -> Self {
        Self::seeded()
    }
}

impl AppState {
    /// Seed content with no submissions.
    pub fn seeded() -> Self {
        Self {
            stories: seed::default_stories(),
            categories: seed::default_categories(),
            submissions: Vec::new(),
            accounts: seed::default_accounts(),
            branding: seed::default_branding(),
        }
    }

    /// Load every collection, substituting seed content for anything missing
    /// or corrupt. An empty category list counts as missing.
    ///
    /// Collections fall back independently, so stories may name categories
    /// that did not survive; [`AppState::rehome_stories`] repairs that.
    pub fn load<B: KeyValueBackend>(store: &Store<B>) -> Self {
        let mut categories: Vec<Category> =
            store.load_or_else(CATEGORIES_KEY, seed::default_categories);
        if categories.is_empty() {
            categories = seed::default_categories();
        }
        Self {
            stories: store.load_or_else(STORIES_KEY, seed::default_stories),
            categories,
            submissions: store.load_or_else(SUBMISSIONS_KEY, Vec::new),
            accounts: store.load_or_else(ACCOUNTS_KEY, seed::default_accounts),
            branding: store.load_or_else(BRANDING_KEY, seed::default_branding),
        }
    }

    /// Write one collection in full.
    pub fn save<B: KeyValueBackend>(
        &self,
        store: &mut Store<B>,
        collection: Collection,
    ) -> std::result::Result<(), StoreError> {
        let key = collection.key();
        match collection {
            Collection::Stories => store.save(key, &self.stories),
            Collection::Categories => store.save(key, &self.categories),
            Collection::Submissions => store.save(key, &self.submissions),
            Collection::Accounts => store.save(key, &self.accounts),
            Collection::Branding => store.save(key, &self.branding),
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn story(&self, id: &str) -> Option<&Story> {
        self.stories.iter().find(|s| s.id == id)
    }

    pub fn submission(&self, id: &str) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn account(&self, id: &str) -> Option<&AdminUser> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// First account whose password matches.
    pub fn account_for_password(&self, password: &str) -> Option<&AdminUser> {
        self.accounts.iter().find(|a| a.password == password)
    }

    pub fn first_category_id(&self) -> Option<&str> {
        self.categories.first().map(|c| c.id.as_str())
    }

    /// Published stories in store order, optionally limited to one category.
    pub fn public_stories<'a, 'c>(
        &'a self,
        category: Option<&'c str>,
    ) -> impl Iterator<Item = &'a Story> + use<'a, 'c> {
        self.stories
            .iter()
            .filter(move |s| s.is_published && category.is_none_or(|c| s.category == c))
    }

    // =========================================================================
    // Submissions
    // =========================================================================

    /// Record a new submission at the head of the inbox.
    pub fn insert_submission(&mut self, submission: Submission) -> Collection {
        self.submissions.insert(0, submission);
        Collection::Submissions
    }

    /// Replace a submission with the draft story it becomes.
    ///
    /// Both collections change: the caller writes submissions and stories.
    pub fn promote_submission(&mut self, id: &str) -> Result<&Story> {
        let index = self
            .submissions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CommandError::not_found("submission", id))?;
        let story = promote(&self.submissions[index], &self.categories);
        if self.story(&story.id).is_some() {
            return Err(CommandError::Validation(format!(
                "Story \"{}\" already exists.",
                story.id
            )));
        }
        self.submissions.remove(index);
        self.stories.push(story);
        Ok(&self.stories[self.stories.len() - 1])
    }

    pub fn discard_submission(&mut self, id: &str) -> Result<Submission> {
        let index = self
            .submissions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CommandError::not_found("submission", id))?;
        Ok(self.submissions.remove(index))
    }

    // =========================================================================
    // Stories
    // =========================================================================

    /// Replace the story with the same id, or append it. Returns the story it
    /// replaced.
    pub fn upsert_story(&mut self, story: Story) -> Result<Option<Story>> {
        validate_story(&story, &self.categories)?;
        match self.stories.iter_mut().find(|s| s.id == story.id) {
            Some(existing) => Ok(Some(std::mem::replace(existing, story))),
            None => {
                self.stories.push(story);
                Ok(None)
            }
        }
    }

    pub fn set_published(&mut self, id: &str, published: bool) -> Result<&Story> {
        let story = self
            .stories
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CommandError::not_found("story", id))?;
        story.is_published = published;
        Ok(story)
    }

    pub fn remove_story(&mut self, id: &str) -> Result<Story> {
        let index = self
            .stories
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CommandError::not_found("story", id))?;
        Ok(self.stories.remove(index))
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Append a category whose id is the slug of `label`.
    pub fn add_category(&mut self, label: &str) -> Result<&Category> {
        let label = label.trim();
        if label.is_empty() {
            return Err(CommandError::Validation("Category name is required.".into()));
        }
        let id = category_slug(label);
        if self.category(&id).is_some() {
            return Err(CommandError::Validation(format!(
                "Category \"{id}\" already exists."
            )));
        }
        self.categories.push(Category::new(id, label));
        let added = self.categories.len() - 1;
        Ok(&self.categories[added])
    }

    /// Change a category's label. The id, and so every story reference, stays.
    pub fn rename_category(&mut self, id: &str, label: &str) -> Result<&Category> {
        let label = label.trim();
        if label.is_empty() {
            return Err(CommandError::Validation("Category name is required.".into()));
        }
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CommandError::not_found("category", id))?;
        category.label = label.to_string();
        Ok(category)
    }

    /// Remove a category and move its stories to the first remaining one.
    ///
    /// Returns the removed category and the ids of the stories that moved.
    /// Refuses when it is the only category.
    pub fn delete_category(&mut self, id: &str) -> Result<(Category, Vec<String>)> {
        if self.categories.len() <= 1 {
            return Err(CommandError::LastCategory);
        }
        let index = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CommandError::not_found("category", id))?;
        let removed = self.categories.remove(index);
        let moved = self.rehome_stories();
        Ok((removed, moved))
    }

    /// Move every story whose category does not resolve to the first
    /// category. Returns the ids of the stories that moved.
    pub fn rehome_stories(&mut self) -> Vec<String> {
        let Some(fallback) = self.first_category_id().map(str::to_string) else {
            return Vec::new();
        };
        let known: HashSet<String> = self.categories.iter().map(|c| c.id.clone()).collect();
        let mut moved = Vec::new();
        for story in self.stories.iter_mut().filter(|s| !known.contains(&s.category)) {
            story.category = fallback.clone();
            moved.push(story.id.clone());
        }
        moved
    }

    // =========================================================================
    // Accounts and branding
    // =========================================================================

    pub fn add_account(&mut self, account: AdminUser) -> Result<&AdminUser> {
        if account.label.trim().is_empty() {
            return Err(CommandError::Validation("Account label is required.".into()));
        }
        if account.password.is_empty() {
            return Err(CommandError::Validation("Password is required.".into()));
        }
        // Sign-in matches on password alone, so a second account with the
        // same password could never sign in.
        if self.account_for_password(&account.password).is_some() {
            return Err(CommandError::Validation("Password is already in use.".into()));
        }
        if self.account(&account.id).is_some() {
            return Err(CommandError::Validation(format!(
                "Account \"{}\" already exists.",
                account.id
            )));
        }
        self.accounts.push(account);
        let added = self.accounts.len() - 1;
        Ok(&self.accounts[added])
    }

    /// Remove an account. Accounts with the ADMIN role are never removed.
    pub fn delete_account(&mut self, id: &str) -> Result<AdminUser> {
        let index = self
            .accounts
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| CommandError::not_found("account", id))?;
        if self.accounts[index].role == Role::Admin {
            return Err(CommandError::ProtectedAccount);
        }
        Ok(self.accounts.remove(index))
    }
}

// =============================================================================
// Pure mappings and checks
// =============================================================================

/// First [`SUMMARY_CHARS`] characters of `text` followed by `...`.
///
/// The ellipsis is appended even when nothing was cut.
pub fn promoted_summary(text: &str) -> String {
    let mut summary: String = text.chars().take(SUMMARY_CHARS).collect();
    summary.push_str("...");
    summary
}

/// The draft story a submission becomes.
pub fn promote(submission: &Submission, categories: &[Category]) -> Story {
    Story {
        id: promoted_story_id(&submission.id),
        title: PROMOTED_TITLE.to_string(),
        summary: promoted_summary(&submission.slipped),
        category: categories
            .first()
            .map(|c| c.id.clone())
            .unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
        image: submission.image.clone().unwrap_or_default(),
        sections: Sections {
            slipped: submission.slipped.clone(),
            harder: PROMOTED_HARDER.to_string(),
            helped: submission.helped.clone(),
            today: PROMOTED_TODAY.to_string(),
        },
        gallery: Vec::new(),
        is_published: false,
    }
}

/// Check a story before it is stored.
pub fn validate_story(story: &Story, categories: &[Category]) -> Result<()> {
    if story.id.is_empty() {
        return Err(CommandError::Validation("Story id is required.".into()));
    }
    if story.title.trim().is_empty() {
        return Err(CommandError::Validation("Title is required.".into()));
    }
    if story.summary.trim().is_empty() {
        return Err(CommandError::Validation("Summary is required.".into()));
    }
    if let Some((name, _)) = story
        .sections
        .named()
        .into_iter()
        .find(|(_, text)| text.trim().is_empty())
    {
        return Err(CommandError::Validation(format!(
            "The \"{name}\" section is required."
        )));
    }
    if !categories.iter().any(|c| c.id == story.category) {
        return Err(CommandError::Validation(format!(
            "Unknown category \"{}\".",
            story.category
        )));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = story.gallery.iter().find(|item| !seen.insert(item.id.as_str())) {
        return Err(CommandError::Validation(format!(
            "Duplicate gallery item \"{}\".",
            dup.id
        )));
    }
    Ok(())
}

/// Check a visitor submission's text.
pub fn validate_submission(slipped: &str, helped: &str) -> Result<()> {
    if slipped.trim().is_empty() {
        return Err(CommandError::Validation(
            "Tell us what happened before sending.".into(),
        ));
    }
    if helped.trim().is_empty() {
        return Err(CommandError::Validation(
            "Tell us what helped before sending.".into(),
        ));
    }
    Ok(())
}
