//! # After
//!
//! The core of a story platform for recovery narratives. Visitors read
//! anonymized stories about what happened when life did not go as planned,
//! and may send their own. A small editorial team curates, edits and
//! publishes them.
//!
//! # Architecture: One Controller Over a Key-Value Store
//!
//! ```text
//! command ──► Platform ──► authorize ──► AppState ──► Store ──► backend
//!                │                                     (one JSON value per key)
//!                └──► CropEditor ──► ImageBackend ──► data: URL
//! ```
//!
//! - **Durable**: every collection lives under its own key and is rewritten
//!   in full on each mutation. Missing or corrupt values fall back to seed
//!   content, so a damaged store never stops the platform from opening.
//! - **Role-gated**: each mutating command names one capability and passes a
//!   single gate before anything changes.
//! - **Testable**: lifecycle transitions are pure functions over
//!   [`lifecycle::AppState`]; storage and image decoding sit behind traits
//!   with in-memory and recording implementations.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | Persisted entities: stories, categories, submissions, accounts, branding |
//! | [`store`] | `KeyValueBackend` trait, memory and file backends, typed `Store` with default fallback |
//! | [`seed`] | Default content a fresh or damaged store starts from |
//! | [`permissions`] | Roles and the capability table |
//! | [`naming`] | Category slugs, promoted-story ids, time-derived ids |
//! | [`lifecycle`] | `AppState` and its transitions: promotion, cascade, upsert, guards |
//! | [`platform`] | The controller: session, permission gate, persistence, editor, crop wiring |
//! | [`imaging`] | Crop-to-aspect image transforms and the interactive crop session |
//! | [`visitor`] | Returning-visitor flag, read counter, grounding sentences |
//! | [`config`] | `after.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Images as `data:` URLs
//!
//! Covers, gallery photos and the logo are stored inline as base64 JPEG
//! `data:` URLs inside the JSON collections. There is no media directory to
//! keep in sync with the stories that reference it.
//!
//! ## Deterministic Crops
//!
//! Every image goes through one transform: a fixed-width canvas of the target
//! aspect, filled with the site's paper colour, with the source drawn at its
//! natural size, scaled and offset from centre. The same inputs always
//! produce the same pixels. A source that cannot be decoded is kept as it
//! was rather than failing the edit.
//!
//! ## Plain-Text Credentials
//!
//! Accounts sign in with a password alone and passwords are stored as typed.
//! The platform has no server to authenticate against; roles exist to keep
//! honest collaborators in their lanes, not to stop an attacker.

pub mod config;
pub mod imaging;
pub mod lifecycle;
pub mod model;
pub mod naming;
pub mod output;
pub mod permissions;
pub mod platform;
pub mod seed;
pub mod store;
pub mod visitor;

#[cfg(test)]
pub(crate) mod test_helpers;
