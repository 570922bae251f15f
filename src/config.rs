//! Platform configuration module.
//!
//! Handles loading, validating, and merging `after.toml`. Stock defaults are
//! serialized to a [`toml::Value`], the user file (if any) is merged on top,
//! and the result is deserialized and validated.
//!
//! ## Config File Location
//!
//! ```text
//! data/
//! ├── after.toml          # Optional overrides
//! ├── after_stories.json
//! └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [images]
//! target_width = 1200        # Output width in pixels
//! quality = 85               # JPEG quality (1-100)
//! background = "#FDFBF7"     # Canvas fill behind the source
//! cover_aspect = [16, 9]     # Story cover photos
//! gallery_aspect = [4, 3]    # Gallery photos
//! logo_aspect = [1, 1]       # Branding logo
//!
//! [crop]
//! zoom_min = 0.1
//! zoom_max = 3.0
//! offset_limit = 300.0       # Offsets clamp to +/- this many output pixels
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::{
    AspectRatio, Background, CropLimits, CropParams, EditTarget, OutputSettings, Quality,
    TransformParams,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the data directory.
pub const CONFIG_FILE: &str = "after.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Platform configuration loaded from `after.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformConfig {
    /// Image transform output settings.
    pub images: ImagesConfig,
    /// Interactive crop control limits.
    pub crop: CropConfig,
}

impl PlatformConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let images = &self.images;
        if images.target_width == 0 {
            return Err(ConfigError::Validation(
                "images.target_width must be positive".into(),
            ));
        }
        if !(1..=100).contains(&images.quality) {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        for (name, ratio) in [
            ("cover_aspect", images.cover_aspect),
            ("gallery_aspect", images.gallery_aspect),
            ("logo_aspect", images.logo_aspect),
        ] {
            if ratio[0] == 0 || ratio[1] == 0 {
                return Err(ConfigError::Validation(format!(
                    "images.{name} values must be non-zero"
                )));
            }
        }
        images
            .background
            .parse::<Background>()
            .map_err(|e| ConfigError::Validation(format!("images.background: {e}")))?;

        let crop = &self.crop;
        if !(crop.zoom_min > 0.0 && crop.zoom_min <= crop.zoom_max && crop.zoom_max.is_finite()) {
            return Err(ConfigError::Validation(
                "crop zoom range must be positive and ordered".into(),
            ));
        }
        if !(crop.offset_limit >= 0.0 && crop.offset_limit.is_finite()) {
            return Err(ConfigError::Validation(
                "crop.offset_limit must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Aspect ratio a crop for `target` is cut to.
    pub fn aspect_for(&self, target: &EditTarget) -> AspectRatio {
        let terms = match target {
            EditTarget::StoryCover => self.images.cover_aspect,
            EditTarget::GalleryPhoto | EditTarget::GalleryItem(_) => self.images.gallery_aspect,
            EditTarget::BrandingLogo => self.images.logo_aspect,
        };
        AspectRatio::from(terms)
    }

    pub fn output_settings(&self) -> OutputSettings {
        OutputSettings {
            target_width: self.images.target_width,
            quality: Quality::new(self.images.quality),
            // Validated on load; an unparsable value only reaches here from
            // a hand-built config.
            background: self.images.background.parse().unwrap_or_default(),
        }
    }

    pub fn crop_limits(&self) -> CropLimits {
        CropLimits {
            zoom_min: self.crop.zoom_min,
            zoom_max: self.crop.zoom_max,
            offset_limit: self.crop.offset_limit,
        }
    }

    /// Full transform parameters for a one-shot crop.
    pub fn transform_params(&self, aspect: AspectRatio, crop: CropParams) -> TransformParams {
        let output = self.output_settings();
        TransformParams {
            aspect,
            target_width: output.target_width,
            crop,
            quality: output.quality,
            background: output.background,
        }
    }
}

/// Image output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Output width in pixels; height follows from the aspect ratio.
    pub target_width: u32,
    /// JPEG quality (1-100).
    pub quality: u32,
    /// Canvas fill as `#RRGGBB`.
    pub background: String,
    pub cover_aspect: [u32; 2],
    pub gallery_aspect: [u32; 2],
    pub logo_aspect: [u32; 2],
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            target_width: 1200,
            quality: 85,
            background: "#FDFBF7".to_string(),
            cover_aspect: [16, 9],
            gallery_aspect: [4, 3],
            logo_aspect: [1, 1],
        }
    }
}

/// Crop control limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub offset_limit: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            zoom_min: 0.1,
            zoom_max: 3.0,
            offset_limit: 300.0,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a TOML value, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PlatformConfig::default())?)
}

/// Deep-merge two TOML values. Tables merge recursively; anything else in
/// `overlay` replaces `base`.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read `after.toml` from `dir` as a raw value, or `None` if absent.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge `overlay` onto `base`, deserialize, and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PlatformConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PlatformConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config for a data directory.
pub fn load_config(dir: &Path) -> Result<PlatformConfig, ConfigError> {
    let config = resolve_config(stock_defaults_value()?, load_raw_config(dir)?)?;
    tracing::debug!(dir = %dir.display(), "config loaded");
    Ok(config)
}

/// Documented stock config, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# After Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as after.toml in the data directory.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Image output
# ---------------------------------------------------------------------------
[images]
# Output width in pixels. Height is width * h / w, rounded down.
target_width = 1200

# JPEG encoding quality (1 = worst, 100 = best).
quality = 85

# Canvas colour behind the source, visible wherever the source does not
# cover the frame.
background = "#FDFBF7"

# Aspect ratios as [width, height].
cover_aspect = [16, 9]
gallery_aspect = [4, 3]
logo_aspect = [1, 1]

# ---------------------------------------------------------------------------
# Crop controls
# ---------------------------------------------------------------------------
[crop]
# Zoom slider range. 1.0 draws the source at its natural size.
zoom_min = 0.1
zoom_max = 3.0

# Offsets clamp to +/- this many output pixels.
offset_limit = 300.0
"##
}
