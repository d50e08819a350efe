//! Geometry: rotated bounding boxes and crop extraction.
//!
//! Every function here is pure and returns a new buffer; sources are never
//! modified.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise on screen, and are
//!   normalized to `[0, 360)` before use
//! - Crop rectangles are in pixels of the rotated canvas
//! - Origin is the top-left corner
//! - Pixels not covered by the source are transparent

mod crop;
mod rotation;

pub use crop::{crop_to_bounding_box, cropped_dimensions, CropRect};
pub use rotation::{apply_rotation, compute_rotated_bounds, normalize_rotation, TRANSPARENT};

pub(crate) use rotation::is_identity_angle;
