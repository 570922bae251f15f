//! Shared test utilities for the after-stories test suite.
//!
//! Provides fixtures and lookup helpers that panic with a useful message
//! instead of returning `Option`, so assertions read as a single line.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let mut platform = platform_as(Role::Editor);
//! platform.add_category("Hope").unwrap();
//!
//! let category = find_category(&platform.state().categories, "hope");
//! assert_eq!(category.label, "Hope");
//! ```

use crate::model::{Category, Sections, Story};
use crate::permissions::Role;
use crate::platform::Platform;
use crate::seed;
use crate::store::MemoryBackend;

// =========================================================================
// Fixtures
// =========================================================================

/// Seed password of the account holding `role`.
pub fn password_for(role: Role) -> String {
    seed::default_accounts()
        .into_iter()
        .find(|a| a.role == role)
        .map(|a| a.password)
        .unwrap_or_else(|| panic!("no seed account for {role}"))
}

/// A fresh in-memory platform signed in as `role`.
pub fn platform_as(role: Role) -> Platform<MemoryBackend> {
    let mut platform = Platform::open(MemoryBackend::new());
    platform
        .authenticate(&password_for(role))
        .unwrap_or_else(|e| panic!("seed login for {role} failed: {e}"));
    platform
}

/// A valid unpublished story filed under `category`.
pub fn story_in(id: &str, category: &str) -> Story {
    Story {
        id: id.to_string(),
        title: format!("Story {id}"),
        summary: "A short summary.".to_string(),
        category: category.to_string(),
        image: String::new(),
        sections: Sections {
            slipped: "It slipped.".to_string(),
            harder: "It got harder.".to_string(),
            helped: "Something helped.".to_string(),
            today: "Today is quieter.".to_string(),
        },
        gallery: Vec::new(),
        is_published: false,
    }
}

// =========================================================================
// Lookup helpers
// =========================================================================

/// Find a story by id. Panics with the available ids if not found.
pub fn find_story<'a>(stories: &'a [Story], id: &str) -> &'a Story {
    stories.iter().find(|s| s.id == id).unwrap_or_else(|| {
        let ids: Vec<&str> = stories.iter().map(|s| s.id.as_str()).collect();
        panic!("story '{id}' not found. Available: {ids:?}")
    })
}

/// Find a category by id. Panics with the available ids if not found.
pub fn find_category<'a>(categories: &'a [Category], id: &str) -> &'a Category {
    categories.iter().find(|c| c.id == id).unwrap_or_else(|| {
        let ids: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
        panic!("category '{id}' not found. Available: {ids:?}")
    })
}
