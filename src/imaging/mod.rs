//! Image transform engine in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Crop + scale** | `crop_imm` + `resize_exact` (Lanczos3) |
//! | **Composite** | `imageops::overlay` onto a filled canvas |
//! | **Encode** | JPEG at quality 85 |
//! | **Transport** | `data:` URLs (base64) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for canvas geometry (unit testable)
//! - **Parameters**: Data structures describing a transform
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend
//! - **Session**: the single-slot interactive crop editor

pub mod backend;
mod calculations;
pub mod data_url;
pub mod operations;
mod params;
pub mod rust_backend;
pub mod session;

pub use backend::{BackendError, Dimensions, EncodedRaster, ImageBackend};
pub use calculations::{Placement, canvas_dimensions, plan_placement};
pub use data_url::DataUrl;
pub use operations::{plan_render, transform_bytes, transform_data_url};
pub use params::{AspectRatio, Background, CropParams, Quality, RenderParams, TransformParams};
pub use rust_backend::RustBackend;
pub use session::{CompletedEdit, CropEditor, CropLimits, CropSession, EditTarget, OutputSettings};
