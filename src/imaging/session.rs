//! Interactive crop sessions.
//!
//! A crop session is the transient state between choosing an image and
//! committing it: the source, the aspect ratio it will be cut to, where the
//! result should go, and the live zoom and offset. [`CropEditor`] holds at most
//! one session. Starting a new one replaces whatever was open, the same as
//! cancelling it first.
//!
//! ```text
//! start ──► [open] ──adjust_zoom / adjust_offset──► [open]
//!              │                                      │
//!              ├── cancel ──► (nothing)               │
//!              └── apply ───► CompletedEdit { target, url }
//! ```
//!
//! Applying consumes the session and runs exactly one transform. The result is
//! returned to the caller tagged with its [`EditTarget`]; delivering it (and
//! deciding whether the target still exists) is the caller's job.

use super::backend::ImageBackend;
use super::operations::transform_data_url;
use super::params::{AspectRatio, Background, CropParams, Quality, TransformParams};

/// Where a finished crop is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// Cover photo of the story open in the editor.
    StoryCover,
    /// New gallery photo on the story open in the editor.
    GalleryPhoto,
    /// Re-crop of an existing gallery item, by id.
    GalleryItem(String),
    /// Site logo.
    BrandingLogo,
}

impl std::fmt::Display for EditTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoryCover => write!(f, "story cover"),
            Self::GalleryPhoto => write!(f, "gallery photo"),
            Self::GalleryItem(id) => write!(f, "gallery item {id}"),
            Self::BrandingLogo => write!(f, "branding logo"),
        }
    }
}

/// Bounds on the interactive controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropLimits {
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Offsets are clamped to `-offset_limit..=offset_limit`.
    pub offset_limit: f64,
}

impl Default for CropLimits {
    fn default() -> Self {
        Self {
            zoom_min: 0.1,
            zoom_max: 3.0,
            offset_limit: 300.0,
        }
    }
}

/// Output settings shared by every session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputSettings {
    pub target_width: u32,
    pub quality: Quality,
    pub background: Background,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            target_width: 1200,
            quality: Quality::default(),
            background: Background::PAPER,
        }
    }
}

/// An open crop session.
#[derive(Debug, Clone, PartialEq)]
pub struct CropSession {
    pub source: String,
    pub aspect: AspectRatio,
    pub target: EditTarget,
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl CropSession {
    pub fn crop(&self) -> CropParams {
        CropParams {
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            scale: self.zoom,
        }
    }
}

/// A committed crop, ready to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedEdit {
    pub target: EditTarget,
    /// Encoded result, or the untouched source if it could not be decoded.
    pub url: String,
}

/// Single-slot holder for the open crop session.
#[derive(Debug, Clone, Default)]
pub struct CropEditor {
    slot: Option<CropSession>,
    limits: CropLimits,
}

impl CropEditor {
    pub fn new(limits: CropLimits) -> Self {
        Self { slot: None, limits }
    }

    pub fn limits(&self) -> CropLimits {
        self.limits
    }

    pub fn session(&self) -> Option<&CropSession> {
        self.slot.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.slot.is_some()
    }

    /// Open a session at zoom 1 and no offset, replacing any open session.
    pub fn start(&mut self, source: String, aspect: AspectRatio, target: EditTarget) {
        if let Some(previous) = self.slot.take() {
            tracing::debug!(target = %previous.target, "replacing open crop session");
        }
        self.slot = Some(CropSession {
            source,
            aspect,
            target,
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        });
    }

    /// Set the zoom, clamped to the configured range. Returns the applied
    /// value, or `None` with no session open.
    pub fn adjust_zoom(&mut self, zoom: f64) -> Option<f64> {
        let limits = self.limits;
        let session = self.slot.as_mut()?;
        if zoom.is_finite() {
            session.zoom = zoom.clamp(limits.zoom_min, limits.zoom_max);
        }
        Some(session.zoom)
    }

    /// Set both offsets, each clamped to the configured limit.
    pub fn adjust_offset(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        let limit = self.limits.offset_limit;
        let session = self.slot.as_mut()?;
        if x.is_finite() {
            session.offset_x = x.clamp(-limit, limit);
        }
        if y.is_finite() {
            session.offset_y = y.clamp(-limit, limit);
        }
        Some((session.offset_x, session.offset_y))
    }

    /// Close the session without side effects. Returns whether one was open.
    pub fn cancel(&mut self) -> bool {
        self.slot.take().is_some()
    }

    /// Close the session and run its transform.
    pub fn apply(
        &mut self,
        backend: &impl ImageBackend,
        output: &OutputSettings,
    ) -> Option<CompletedEdit> {
        let session = self.slot.take()?;
        let params = TransformParams {
            aspect: session.aspect,
            target_width: output.target_width,
            crop: session.crop(),
            quality: output.quality,
            background: output.background,
        };
        let url = transform_data_url(backend, &session.source, &params);
        Some(CompletedEdit {
            target: session.target,
            url,
        })
    }
}
