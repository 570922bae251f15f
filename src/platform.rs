//! The platform controller.
//!
//! [`Platform`] owns everything a running instance holds: the persisted
//! [`AppState`], the signed-in role, the story open in the editor, the crop
//! session, the in-flight visitor submission and the visitor's session. Every
//! command goes through it.
//!
//! ## Command flow
//!
//! ```text
//! command ──► authorize(capability) ──► AppState transition ──► persist(collections)
//!                  │                            │
//!                  └── Forbidden                └── Validation / NotFound / ...
//! ```
//!
//! A declined command returns a [`CommandError`] and changes nothing. A
//! successful one writes each collection it touched in full. A failed write
//! is logged and the in-memory state stays authoritative; the next mutation
//! of that collection writes it again.
//!
//! ## Destructive commands
//!
//! Deleting a story or category and discarding a submission are two-step:
//! `request_*` checks the command and returns a [`DeletionRequest`] carrying
//! a confirmation prompt; [`Platform::confirm_deletion`] performs it. Nothing
//! changes between the two.

use crate::config::PlatformConfig;
use crate::imaging::{
    AspectRatio, CropEditor, CropSession, DataUrl, EditTarget, ImageBackend,
};
use crate::lifecycle::{AppState, Collection, CommandError, FALLBACK_CATEGORY, Result};
use crate::model::{AdminUser, Branding, BrandingUpdate, Category, GalleryItem, Story, Submission};
use crate::naming::IdClock;
use crate::permissions::{Capability, CapabilitySet, Role, capabilities_for};
use crate::store::{KeyValueBackend, Store};
use crate::visitor::{Visit, grounding_sentence};

/// What a confirmed deletion will remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionTarget {
    Story(String),
    Submission(String),
    Category(String),
}

/// A checked, not yet performed, destructive command.
///
/// Only the `request_*` methods construct one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    target: DeletionTarget,
    prompt: String,
}

impl DeletionRequest {
    pub fn target(&self) -> &DeletionTarget {
        &self.target
    }

    /// Question to put to the user before confirming.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// What a confirmed deletion removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deleted {
    Story(Story),
    Submission(Submission),
    Category {
        category: Category,
        /// Ids of the stories moved to the first remaining category.
        moved: Vec<String>,
    },
}

/// Handle for a visitor submission between sending and its resolution.
#[derive(Debug, PartialEq, Eq)]
pub struct SubmissionTicket {
    id: String,
}

impl SubmissionTicket {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Outcome of applying a crop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The result was written to its target.
    Delivered(EditTarget),
    /// The target no longer existed; the result was dropped.
    Discarded(EditTarget),
}

/// A published story as shown to a visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryView<'a> {
    pub story: &'a Story,
    /// Label of the story's category.
    pub category: &'a str,
    pub grounding: &'static str,
    /// Set when the visitor has already read a story this visit.
    pub pause_hint: Option<&'static str>,
}

/// Owns the application state and runs every command against it.
pub struct Platform<B: KeyValueBackend> {
    store: Store<B>,
    state: AppState,
    config: PlatformConfig,
    role: Option<Role>,
    draft: Option<Story>,
    images: CropEditor,
    pending_submission: Option<Submission>,
    clock: IdClock,
    visit: Visit,
}

impl<B: KeyValueBackend> Platform<B> {
    /// Load state from `backend` with stock configuration.
    pub fn open(backend: B) -> Self {
        Self::with_config(backend, PlatformConfig::default())
    }

    pub fn with_config(backend: B, config: PlatformConfig) -> Self {
        let mut store = Store::new(backend);
        let mut state = AppState::load(&store);
        let moved = state.rehome_stories();
        if !moved.is_empty() {
            tracing::warn!(stories = ?moved, "stories filed under missing categories were moved");
            if let Err(e) = state.save(&mut store, Collection::Stories) {
                tracing::error!(error = %e, "failed to write repaired stories");
            }
        }
        let visit = Visit::begin(&mut store);
        tracing::debug!(
            stories = state.stories.len(),
            categories = state.categories.len(),
            submissions = state.submissions.len(),
            "platform opened"
        );
        Self {
            store,
            state,
            images: CropEditor::new(config.crop_limits()),
            config,
            role: None,
            draft: None,
            pending_submission: None,
            clock: IdClock::new(),
            visit,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &Store<B> {
        &self.store
    }

    /// Close the platform and hand back its storage.
    pub fn into_backend(self) -> B {
        self.store.into_backend()
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn capabilities(&self) -> CapabilitySet {
        capabilities_for(self.role)
    }

    pub fn visit(&self) -> &Visit {
        &self.visit
    }

    /// The single permission gate.
    fn authorize(&self, capability: Capability) -> Result<()> {
        if self.capabilities().allows(capability) {
            Ok(())
        } else {
            tracing::debug!(%capability, role = ?self.role, "command declined");
            Err(CommandError::Forbidden { capability })
        }
    }

    fn persist(&mut self, collections: &[Collection]) {
        for &collection in collections {
            if let Err(e) = self.state.save(&mut self.store, collection) {
                tracing::error!(key = collection.key(), error = %e, "failed to write collection");
            }
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Sign in with the password of an account.
    pub fn authenticate(&mut self, password: &str) -> Result<Role> {
        let role = self
            .state
            .account_for_password(password)
            .map(|account| account.role)
            .ok_or(CommandError::InvalidCredentials)?;
        self.role = Some(role);
        tracing::info!(%role, "signed in");
        Ok(role)
    }

    /// Sign out, closing the editor and any crop session.
    pub fn logout(&mut self) {
        if let Some(role) = self.role.take() {
            tracing::info!(%role, "signed out");
        }
        self.draft = None;
        self.images.cancel();
    }

    // =========================================================================
    // Visitors
    // =========================================================================

    /// Published stories in store order, optionally limited to one category.
    pub fn public_stories(&self, category: Option<&str>) -> Vec<&Story> {
        self.state.public_stories(category).collect()
    }

    /// Open a published story for reading.
    pub fn view_story(&mut self, id: &str) -> Result<StoryView<'_>> {
        if !self.state.story(id).is_some_and(|s| s.is_published) {
            return Err(CommandError::not_found("story", id));
        }
        self.visit.record_read();
        let grounding = grounding_sentence(&mut rand::rng());
        let pause_hint = self.visit.pause_hint();
        let story = self
            .state
            .story(id)
            .ok_or_else(|| CommandError::not_found("story", id))?;
        let category = self
            .state
            .category(&story.category)
            .map_or(story.category.as_str(), |c| c.label.as_str());
        Ok(StoryView {
            story,
            category,
            grounding,
            pause_hint,
        })
    }

    /// Start sending a visitor submission.
    ///
    /// Refused while an earlier submission is still unresolved.
    pub fn begin_submission(
        &mut self,
        slipped: &str,
        helped: &str,
        image: Option<String>,
    ) -> Result<SubmissionTicket> {
        if self.pending_submission.is_some() {
            tracing::debug!("submission ignored, one already in flight");
            return Err(CommandError::SubmissionInFlight);
        }
        crate::lifecycle::validate_submission(slipped, helped)?;
        if let Some(url) = &image {
            let is_image = DataUrl::parse(url).map(|d| d.is_image()).unwrap_or(false);
            if !is_image {
                return Err(CommandError::Validation(
                    "Attached file must be an image.".into(),
                ));
            }
        }
        let stamp = self.clock.next();
        let submission = Submission {
            id: stamp.to_string(),
            slipped: slipped.to_string(),
            helped: helped.to_string(),
            image,
            timestamp: stamp,
        };
        let ticket = SubmissionTicket {
            id: submission.id.clone(),
        };
        self.pending_submission = Some(submission);
        Ok(ticket)
    }

    pub fn submission_in_flight(&self) -> bool {
        self.pending_submission.is_some()
    }

    /// Resolve an in-flight submission by recording it.
    pub fn complete_submission(&mut self, ticket: SubmissionTicket) -> Result<&Submission> {
        let submission = match self.pending_submission.take() {
            Some(s) if s.id == ticket.id => s,
            other => {
                self.pending_submission = other;
                return Err(CommandError::not_found("submission", &ticket.id));
            }
        };
        tracing::info!(id = %submission.id, "submission received");
        let collection = self.state.insert_submission(submission);
        self.persist(&[collection]);
        Ok(&self.state.submissions[0])
    }

    /// Send and record a visitor submission in one step.
    pub fn submit_story(
        &mut self,
        slipped: &str,
        helped: &str,
        image: Option<String>,
    ) -> Result<&Submission> {
        let ticket = self.begin_submission(slipped, helped, image)?;
        self.complete_submission(ticket)
    }

    // =========================================================================
    // Submission review
    // =========================================================================

    /// Turn a submission into a stored draft story and open a copy of it in
    /// the editor.
    pub fn promote_submission(&mut self, id: &str) -> Result<&Story> {
        self.authorize(Capability::ReviewSubmissions)?;
        let story = self.state.promote_submission(id)?.clone();
        self.persist(&[Collection::Submissions, Collection::Stories]);
        tracing::info!(submission = id, story = %story.id, "submission promoted");
        Ok(&*self.draft.insert(story))
    }

    pub fn request_discard_submission(&self, id: &str) -> Result<DeletionRequest> {
        self.authorize(Capability::ReviewSubmissions)?;
        if self.state.submission(id).is_none() {
            return Err(CommandError::not_found("submission", id));
        }
        Ok(DeletionRequest {
            target: DeletionTarget::Submission(id.to_string()),
            prompt: "Discard this submission?".into(),
        })
    }

    // =========================================================================
    // Stories
    // =========================================================================

    pub fn draft(&self) -> Option<&Story> {
        self.draft.as_ref()
    }

    /// The open draft, for field edits.
    pub fn draft_mut(&mut self) -> Option<&mut Story> {
        self.draft.as_mut()
    }

    /// Close the editor without saving. Returns whether a draft was open.
    pub fn close_draft(&mut self) -> bool {
        self.draft.take().is_some()
    }

    /// Open a blank draft filed under the first category.
    pub fn create_story(&mut self) -> Result<&Story> {
        self.authorize(Capability::EditContent)?;
        let category = self
            .state
            .first_category_id()
            .unwrap_or(FALLBACK_CATEGORY)
            .to_string();
        let story = Story::blank(self.clock.next().to_string(), category);
        tracing::debug!(id = %story.id, "draft opened");
        Ok(&*self.draft.insert(story))
    }

    /// Open a copy of a stored story in the editor.
    pub fn edit_story(&mut self, id: &str) -> Result<&Story> {
        self.authorize(Capability::EditContent)?;
        let story = self
            .state
            .story(id)
            .cloned()
            .ok_or_else(|| CommandError::not_found("story", id))?;
        Ok(&*self.draft.insert(story))
    }

    /// Store a story, replacing any story with the same id.
    ///
    /// Changing the published flag (a new story counts as unpublished) also
    /// needs the publish capability.
    pub fn save_story(&mut self, story: Story) -> Result<()> {
        self.authorize(Capability::EditContent)?;
        let was_published = self.state.story(&story.id).is_some_and(|s| s.is_published);
        if story.is_published != was_published {
            self.authorize(Capability::Publish)?;
        }
        let id = story.id.clone();
        let replaced = self.state.upsert_story(story)?;
        self.persist(&[Collection::Stories]);
        tracing::info!(%id, new = replaced.is_none(), "story saved");
        Ok(())
    }

    /// Save the open draft and close the editor. On failure the draft stays
    /// open.
    pub fn save_draft(&mut self) -> Result<()> {
        let story = self.draft.take().ok_or(CommandError::NoDraft)?;
        match self.save_story(story.clone()) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.draft = Some(story);
                Err(e)
            }
        }
    }

    /// Move a stored story between Draft and Live.
    pub fn set_published(&mut self, id: &str, published: bool) -> Result<()> {
        self.authorize(Capability::Publish)?;
        let state = self.state.set_published(id, published)?.state();
        self.persist(&[Collection::Stories]);
        tracing::info!(%id, %state, "story state changed");
        Ok(())
    }

    pub fn request_story_deletion(&self, id: &str) -> Result<DeletionRequest> {
        self.authorize(Capability::DeleteStory)?;
        let story = self
            .state
            .story(id)
            .ok_or_else(|| CommandError::not_found("story", id))?;
        Ok(DeletionRequest {
            target: DeletionTarget::Story(id.to_string()),
            prompt: format!("Delete \"{}\" permanently?", story.title),
        })
    }

    // =========================================================================
    // Gallery on the open draft
    // =========================================================================

    fn draft_gallery_item(&mut self, item_id: &str) -> Result<&mut GalleryItem> {
        self.authorize(Capability::EditContent)?;
        self.draft
            .as_mut()
            .ok_or(CommandError::NoDraft)?
            .gallery
            .iter_mut()
            .find(|g| g.id == item_id)
            .ok_or_else(|| CommandError::not_found("gallery item", item_id))
    }

    pub fn set_gallery_caption(&mut self, item_id: &str, caption: &str) -> Result<()> {
        self.draft_gallery_item(item_id)?.caption = caption.to_string();
        Ok(())
    }

    pub fn remove_gallery_item(&mut self, item_id: &str) -> Result<GalleryItem> {
        self.draft_gallery_item(item_id)?;
        let gallery = &mut self.draft.as_mut().ok_or(CommandError::NoDraft)?.gallery;
        let index = gallery
            .iter()
            .position(|g| g.id == item_id)
            .ok_or_else(|| CommandError::not_found("gallery item", item_id))?;
        Ok(gallery.remove(index))
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn add_category(&mut self, label: &str) -> Result<Category> {
        self.authorize(Capability::ManageCategories)?;
        let added = self.state.add_category(label)?.clone();
        self.persist(&[Collection::Categories]);
        tracing::info!(id = %added.id, "category added");
        Ok(added)
    }

    pub fn edit_category(&mut self, id: &str, label: &str) -> Result<Category> {
        self.authorize(Capability::ManageCategories)?;
        let edited = self.state.rename_category(id, label)?.clone();
        self.persist(&[Collection::Categories]);
        Ok(edited)
    }

    pub fn request_category_deletion(&self, id: &str) -> Result<DeletionRequest> {
        self.authorize(Capability::ManageCategories)?;
        if self.state.categories.len() <= 1 {
            return Err(CommandError::LastCategory);
        }
        let category = self
            .state
            .category(id)
            .ok_or_else(|| CommandError::not_found("category", id))?;
        let affected = self.state.stories.iter().filter(|s| s.category == id).count();
        Ok(DeletionRequest {
            target: DeletionTarget::Category(id.to_string()),
            prompt: format!(
                "Delete category \"{}\"? {affected} stories will move to the first remaining category.",
                category.label
            ),
        })
    }

    // =========================================================================
    // Confirmation
    // =========================================================================

    /// Perform a requested deletion. Permissions are checked again.
    pub fn confirm_deletion(&mut self, request: DeletionRequest) -> Result<Deleted> {
        match request.target {
            DeletionTarget::Story(id) => {
                self.authorize(Capability::DeleteStory)?;
                let story = self.state.remove_story(&id)?;
                self.persist(&[Collection::Stories]);
                tracing::info!(%id, "story deleted");
                Ok(Deleted::Story(story))
            }
            DeletionTarget::Submission(id) => {
                self.authorize(Capability::ReviewSubmissions)?;
                let submission = self.state.discard_submission(&id)?;
                self.persist(&[Collection::Submissions]);
                tracing::info!(%id, "submission discarded");
                Ok(Deleted::Submission(submission))
            }
            DeletionTarget::Category(id) => {
                self.authorize(Capability::ManageCategories)?;
                let (category, moved) = self.state.delete_category(&id)?;
                self.persist(&[Collection::Categories, Collection::Stories]);
                // Keep the open draft pointing at a category that exists
                if let Some(draft) = self.draft.as_mut().filter(|d| d.category == id) {
                    if let Some(first) = self.state.first_category_id() {
                        draft.category = first.to_string();
                    }
                }
                tracing::info!(%id, moved = moved.len(), "category deleted");
                Ok(Deleted::Category { category, moved })
            }
        }
    }

    // =========================================================================
    // Accounts and branding
    // =========================================================================

    pub fn add_account(&mut self, label: &str, role: Role, password: &str) -> Result<AdminUser> {
        self.authorize(Capability::ManageSite)?;
        let account = AdminUser {
            id: self.clock.next().to_string(),
            role,
            password: password.to_string(),
            label: label.trim().to_string(),
        };
        let added = self.state.add_account(account)?.clone();
        self.persist(&[Collection::Accounts]);
        tracing::info!(id = %added.id, %role, "account added");
        Ok(added)
    }

    pub fn delete_account(&mut self, id: &str) -> Result<AdminUser> {
        self.authorize(Capability::ManageSite)?;
        let removed = self.state.delete_account(id)?;
        self.persist(&[Collection::Accounts]);
        tracing::info!(%id, "account deleted");
        Ok(removed)
    }

    pub fn update_branding(&mut self, update: BrandingUpdate) -> Result<&Branding> {
        self.authorize(Capability::ManageSite)?;
        if update.site_name.as_ref().is_some_and(|n| n.trim().is_empty()) {
            return Err(CommandError::Validation("Site name is required.".into()));
        }
        self.state.branding.apply(update);
        self.persist(&[Collection::Branding]);
        Ok(&self.state.branding)
    }

    // =========================================================================
    // Image editing
    // =========================================================================

    /// Configured aspect ratio for a target.
    pub fn aspect_for(&self, target: &EditTarget) -> AspectRatio {
        self.config.aspect_for(target)
    }

    pub fn image_session(&self) -> Option<&CropSession> {
        self.images.session()
    }

    /// Open a crop session, replacing any open one.
    pub fn start_image_edit(
        &mut self,
        source: String,
        aspect: AspectRatio,
        target: EditTarget,
    ) -> Result<()> {
        match &target {
            EditTarget::BrandingLogo => self.authorize(Capability::ManageSite)?,
            EditTarget::StoryCover | EditTarget::GalleryPhoto => {
                self.authorize(Capability::EditContent)?;
                if self.draft.is_none() {
                    return Err(CommandError::NoDraft);
                }
            }
            EditTarget::GalleryItem(item_id) => {
                self.authorize(Capability::EditContent)?;
                let draft = self.draft.as_ref().ok_or(CommandError::NoDraft)?;
                if !draft.gallery.iter().any(|g| &g.id == item_id) {
                    return Err(CommandError::not_found("gallery item", item_id));
                }
            }
        }
        if !aspect.is_valid() {
            return Err(CommandError::Validation(format!(
                "Invalid aspect ratio {aspect}."
            )));
        }
        tracing::debug!(%target, %aspect, "image edit started");
        self.images.start(source, aspect, target);
        Ok(())
    }

    pub fn adjust_zoom(&mut self, zoom: f64) -> Result<f64> {
        self.images.adjust_zoom(zoom).ok_or(CommandError::NoEditSession)
    }

    pub fn adjust_offset(&mut self, x: f64, y: f64) -> Result<(f64, f64)> {
        self.images
            .adjust_offset(x, y)
            .ok_or(CommandError::NoEditSession)
    }

    pub fn cancel_image_edit(&mut self) -> bool {
        self.images.cancel()
    }

    /// Run the open crop and deliver the result to its target.
    pub fn apply_image_edit(&mut self, backend: &impl ImageBackend) -> Result<Delivery> {
        let output = self.config.output_settings();
        let edit = self
            .images
            .apply(backend, &output)
            .ok_or(CommandError::NoEditSession)?;
        let url = edit.url;
        let delivered = match &edit.target {
            EditTarget::StoryCover => match self.draft.as_mut() {
                Some(draft) => {
                    draft.image = url;
                    true
                }
                None => false,
            },
            EditTarget::GalleryPhoto => match self.draft.as_mut() {
                Some(draft) => {
                    draft.gallery.push(GalleryItem {
                        id: self.clock.next().to_string(),
                        url,
                        caption: String::new(),
                    });
                    true
                }
                None => false,
            },
            EditTarget::GalleryItem(item_id) => {
                let item = self
                    .draft
                    .as_mut()
                    .and_then(|d| d.gallery.iter_mut().find(|g| &g.id == item_id));
                match item {
                    Some(item) => {
                        item.url = url;
                        true
                    }
                    None => false,
                }
            }
            EditTarget::BrandingLogo => {
                self.state.branding.logo_url = Some(url);
                self.persist(&[Collection::Branding]);
                true
            }
        };
        if delivered {
            tracing::debug!(target = %edit.target, "image edit delivered");
            Ok(Delivery::Delivered(edit.target))
        } else {
            tracing::debug!(target = %edit.target, "image edit target gone, result dropped");
            Ok(Delivery::Discarded(edit.target))
        }
    }
}
