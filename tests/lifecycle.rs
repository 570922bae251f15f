//! End-to-end content lifecycle against the on-disk store.
//!
//! Each test opens a platform over a temp directory, runs commands the way
//! the CLI would, then reopens the directory to check what survived.

use after_stories::imaging::{AspectRatio, DataUrl, EditTarget, RustBackend};
use after_stories::lifecycle::CommandError;
use after_stories::model::{Category, Story, Submission};
use after_stories::permissions::Role;
use after_stories::platform::{Deleted, Delivery, Platform};
use after_stories::store::{CATEGORIES_KEY, FileBackend, STORIES_KEY, SUBMISSIONS_KEY};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GenericImageView, ImageEncoder, RgbImage};
use tempfile::TempDir;

fn open(dir: &TempDir) -> Platform<FileBackend> {
    Platform::open(FileBackend::open(dir.path()).unwrap())
}

fn png_data_url(width: u32, height: u32) -> String {
    let img = RgbImage::from_pixel(width, height, image::Rgb([90, 120, 160]));
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    DataUrl::new("image/png", bytes).to_url()
}

fn decoded_dimensions(url: &str) -> (u32, u32) {
    let data = DataUrl::parse(url).unwrap();
    assert_eq!(data.mime, "image/jpeg");
    image::load_from_memory(&data.bytes).unwrap().dimensions()
}

// =============================================================================
// Submission to published story
// =============================================================================

#[test]
fn submission_becomes_published_story() {
    let dir = TempDir::new().unwrap();

    // A visitor sends a story with a photo
    let mut platform = open(&dir);
    let sub_id = platform
        .submit_story(
            "I stopped answering messages and the weeks blurred into one.",
            "A neighbour who knocked every Sunday.",
            Some(png_data_url(64, 48)),
        )
        .unwrap()
        .id
        .clone();
    drop(platform);

    // The admin promotes it, crops a cover and saves the draft
    let mut platform = open(&dir);
    assert_eq!(platform.authenticate("admin@after"), Ok(Role::Admin));
    let draft = platform.promote_submission(&sub_id).unwrap();
    assert_eq!(draft.title, "Shared Path");
    assert!(!draft.is_published);
    let photo = draft.image.clone();

    platform
        .start_image_edit(photo, AspectRatio::COVER, EditTarget::StoryCover)
        .unwrap();
    platform.adjust_zoom(2.0).unwrap();
    let delivery = platform.apply_image_edit(&RustBackend::new()).unwrap();
    assert_eq!(delivery, Delivery::Delivered(EditTarget::StoryCover));
    assert_eq!(decoded_dimensions(&platform.draft().unwrap().image), (1200, 675));

    platform.save_draft().unwrap();
    let story_id = format!("story-{sub_id}");
    assert!(platform.public_stories(None).iter().all(|s| s.id != story_id));
    drop(platform);

    // An approver publishes it
    let mut platform = open(&dir);
    platform.authenticate("approver123").unwrap();
    platform.set_published(&story_id, true).unwrap();
    drop(platform);

    let platform = open(&dir);
    assert!(platform.state().submissions.is_empty());
    let story = platform.state().story(&story_id).unwrap();
    assert!(story.is_published);
    assert_eq!(story.sections.today, "Still unfolding.");
    assert!(platform.public_stories(None).iter().any(|s| s.id == story_id));
}

#[test]
fn approver_promotion_is_stored_at_once() {
    let dir = TempDir::new().unwrap();
    let mut platform = open(&dir);
    let sub_id = platform
        .submit_story("The shop closed in March.", "My sister's couch.", None)
        .unwrap()
        .id
        .clone();
    platform.authenticate("approver123").unwrap();
    platform.promote_submission(&sub_id).unwrap();
    platform.logout();
    drop(platform);

    let platform = open(&dir);
    assert!(platform.state().submission(&sub_id).is_none());
    let stories: Vec<Story> = platform.store().load(STORIES_KEY).unwrap();
    let story = stories
        .iter()
        .find(|s| s.id == format!("story-{sub_id}"))
        .unwrap();
    assert!(!story.is_published);
    assert_eq!(story.sections.helped, "My sister's couch.");
}

#[test]
fn submissions_persist_newest_first() {
    let dir = TempDir::new().unwrap();
    let mut platform = open(&dir);
    platform.submit_story("first", "first help", None).unwrap();
    platform.submit_story("second", "second help", None).unwrap();
    drop(platform);

    let platform = open(&dir);
    let subs: Vec<Submission> = platform.store().load(SUBMISSIONS_KEY).unwrap();
    let texts: Vec<_> = subs.iter().map(|s| s.slipped.as_str()).collect();
    assert_eq!(texts, vec!["second", "first"]);
}

// =============================================================================
// Categories
// =============================================================================

#[test]
fn category_cascade_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let mut platform = open(&dir);
    platform.authenticate("editor123").unwrap();

    let request = platform.request_category_deletion("loss").unwrap();
    let deleted = platform.confirm_deletion(request).unwrap();
    assert!(matches!(deleted, Deleted::Category { ref moved, .. } if moved == &["2"]));
    drop(platform);

    let platform = open(&dir);
    let categories: Vec<Category> = platform.store().load(CATEGORIES_KEY).unwrap();
    assert_eq!(categories.len(), 3);
    assert_eq!(categories[0].id, "burnout");
    let stories: Vec<Story> = platform.store().load(STORIES_KEY).unwrap();
    let moved = stories.iter().find(|s| s.id == "2").unwrap();
    assert_eq!(moved.category, "burnout");
}

#[test]
fn last_category_is_kept() {
    let dir = TempDir::new().unwrap();
    let mut platform = open(&dir);
    platform.authenticate("editor123").unwrap();
    for id in ["loss", "starting-over", "quiet-days"] {
        let request = platform.request_category_deletion(id).unwrap();
        platform.confirm_deletion(request).unwrap();
    }
    assert_eq!(
        platform.request_category_deletion("burnout"),
        Err(CommandError::LastCategory)
    );
    assert!(platform.state().stories.iter().all(|s| s.category == "burnout"));
}

// =============================================================================
// Recovery from damaged storage
// =============================================================================

#[test]
fn corrupt_files_fall_back_to_seed() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("after_stories.json"), "[{\"id\": ").unwrap();
    std::fs::write(dir.path().join("after_admin_users.json"), "42").unwrap();

    let mut platform = open(&dir);
    assert_eq!(platform.state().stories.len(), 3);
    assert_eq!(platform.authenticate("editor123"), Ok(Role::Editor));
}

#[test]
fn lost_categories_file_rehomes_stories() {
    let dir = TempDir::new().unwrap();
    let mut platform = open(&dir);
    platform.authenticate("admin@after").unwrap();
    platform.add_category("Hope").unwrap();
    platform.create_story().unwrap();
    let draft = platform.draft_mut().unwrap();
    draft.title = "Green Shoots".into();
    draft.summary = "Small things came back.".into();
    draft.category = "hope".into();
    draft.sections.slipped = "Everything stopped.".into();
    draft.sections.harder = "Nobody noticed.".into();
    draft.sections.helped = "A garden plot.".into();
    draft.sections.today = "Tomatoes.".into();
    let id = draft.id.clone();
    platform.save_draft().unwrap();
    drop(platform);

    std::fs::write(dir.path().join("after_categories.json"), "garbage").unwrap();

    let platform = open(&dir);
    let story = platform.state().story(&id).unwrap();
    assert_eq!(story.category, "burnout");
    assert!(platform.state().category(&story.category).is_some());
    drop(platform);

    let stories: Vec<Story> = open(&dir).store().load(STORIES_KEY).unwrap();
    assert_eq!(stories.iter().find(|s| s.id == id).unwrap().category, "burnout");
}

#[test]
fn declined_commands_write_nothing() {
    let dir = TempDir::new().unwrap();
    let mut platform = open(&dir);
    platform.authenticate("editor123").unwrap();
    assert!(platform.set_published("1", false).is_err());
    assert!(platform.request_story_deletion("1").is_err());
    assert!(!dir.path().join("after_stories.json").exists());
}

#[test]
fn returning_visitor_is_remembered() {
    let dir = TempDir::new().unwrap();
    assert!(!open(&dir).visit().is_returning());
    assert!(open(&dir).visit().is_returning());
}
