//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between [`operations`](super::operations), which plans a
//! transform, and the [`backend`](super::backend), which does the pixel work.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1 to 100, default 85). Clamped on construction.
//! - [`AspectRatio`]: Output width:height, e.g. 16:9 for covers.
//! - [`CropParams`]: Offset (output pixels) and scale applied to the source.
//! - [`Background`]: Fill colour behind the source.
//! - [`TransformParams`]: Everything a single transform needs.
//! - [`RenderParams`]: A planned transform: canvas size plus placement.

use super::calculations::Placement;
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Output aspect ratio as whole-number width and height terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Story cover photos.
    pub const COVER: Self = Self::new(16, 9);
    /// Gallery photos.
    pub const GALLERY: Self = Self::new(4, 3);
    /// Square branding assets.
    pub const SQUARE: Self = Self::new(1, 1);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn as_f64(self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl From<[u32; 2]> for AspectRatio {
    fn from([width, height]: [u32; 2]) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    /// Parses `W:H`, e.g. `16:9`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(':')
            .ok_or_else(|| format!("expected W:H, got {s:?}"))?;
        let width = w.trim().parse().map_err(|_| format!("bad width in {s:?}"))?;
        let height = h.trim().parse().map_err(|_| format!("bad height in {s:?}"))?;
        let ratio = Self { width, height };
        if !ratio.is_valid() {
            return Err(format!("aspect terms must be non-zero: {s:?}"));
        }
        Ok(ratio)
    }
}

/// How the source sits on the output canvas.
///
/// - `offset_x`, `offset_y`: shift from centred, in output pixels.
/// - `scale`: 1.0 draws the source at its natural pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropParams {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl CropParams {
    /// Centred at natural size.
    pub const IDENTITY: Self = Self {
        offset_x: 0.0,
        offset_y: 0.0,
        scale: 1.0,
    };
}

impl Default for CropParams {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Opaque RGB fill colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background(pub [u8; 3]);

impl Background {
    /// Warm off-white the site is painted in.
    pub const PAPER: Self = Self([0xFD, 0xFB, 0xF7]);

    pub fn rgb(self) -> [u8; 3] {
        self.0
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::PAPER
    }
}

impl FromStr for Background {
    type Err = String;

    /// Parses `#RRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| format!("expected #RRGGBB, got {s:?}"))?;
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

/// Full description of one transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParams {
    pub aspect: AspectRatio,
    pub target_width: u32,
    pub crop: CropParams,
    pub quality: Quality,
    pub background: Background,
}

/// A planned transform, ready for a backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// `None` when no part of the source lands on the canvas.
    pub placement: Option<Placement>,
    pub background: Background,
    pub quality: Quality,
}
