//! Entity types persisted by the store.
//!
//! Every type here is serialized as JSON under its own storage key, using the
//! camelCase field names of the persisted layout (`isPublished`, `siteName`,
//! `logoUrl`, ...). Encoded images are `data:` URLs held as plain strings; an
//! empty string means "no image".

use crate::permissions::Role;
use serde::{Deserialize, Serialize};

/// A grouping stories are filed under. `id` is a slug derived from the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub label: String,
}

impl Category {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A photo attached to a story. Ids are unique within the owning story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub caption: String,
}

/// The four narrative parts every story is told in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sections {
    /// How things slipped.
    pub slipped: String,
    /// What made it harder.
    pub harder: String,
    /// What helped.
    pub helped: String,
    /// Where things stand today.
    pub today: String,
}

impl Sections {
    /// Field name and value pairs in reading order.
    pub fn named(&self) -> [(&'static str, &str); 4] {
        [
            ("slipped", &self.slipped),
            ("harder", &self.harder),
            ("helped", &self.helped),
            ("today", &self.today),
        ]
    }
}

/// A curated story. Drafts have `is_published == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub title: String,
    pub summary: String,
    /// Id of the [`Category`] this story is filed under.
    pub category: String,
    /// Cover image as a data URL, or empty.
    #[serde(default)]
    pub image: String,
    pub sections: Sections,
    #[serde(default)]
    pub gallery: Vec<GalleryItem>,
    #[serde(default)]
    pub is_published: bool,
}

impl Story {
    /// A blank draft filed under `category`.
    pub fn blank(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            summary: String::new(),
            category: category.into(),
            image: String::new(),
            sections: Sections::default(),
            gallery: Vec::new(),
            is_published: false,
        }
    }

    pub fn state(&self) -> StoryState {
        if self.is_published {
            StoryState::Live
        } else {
            StoryState::Draft
        }
    }
}

/// Publication state of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryState {
    Draft,
    Live,
}

impl std::fmt::Display for StoryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::Live => write!(f, "Live"),
        }
    }
}

/// An anonymous visitor's story awaiting review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub slipped: String,
    pub helped: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// An editorial account. Credentials are plain text by design of the
/// original platform; there is no server to verify against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub role: Role,
    pub password: String,
    pub label: String,
}

/// Site-wide identity settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub site_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_video_url: Option<String>,
}

/// A partial branding change. `None` leaves a field alone; for the optional
/// assets, `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandingUpdate {
    pub site_name: Option<String>,
    pub logo_url: Option<Option<String>>,
    pub promo_video_url: Option<Option<String>>,
}

impl Branding {
    pub fn apply(&mut self, update: BrandingUpdate) {
        if let Some(name) = update.site_name {
            self.site_name = name;
        }
        if let Some(logo) = update.logo_url {
            self.logo_url = logo;
        }
        if let Some(video) = update.promo_video_url {
            self.promo_video_url = video;
        }
    }
}
