//! Camera geometry records

use serde::{Deserialize, Serialize};

/// Distortion model attached to an intrinsics record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistortionModel {
    /// No distortion compensation
    None,
    /// Brown-Conrady model, five coefficients
    BrownConrady,
}

impl Default for DistortionModel {
    fn default() -> Self {
        Self::None
    }
}

/// Camera geometry for one capture mode
///
/// A `width`/`height` of -1 marks a record that applies to every resolution
/// (the per-imager entries of the calibration record).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub width: i32,
    pub height: i32,
    /// Focal length of the image plane, as a multiple of pixel width
    pub fx: f32,
    /// Focal length of the image plane, as a multiple of pixel height
    pub fy: f32,
    /// Principal point, pixel offset from the left edge
    pub ppx: f32,
    /// Principal point, pixel offset from the top edge
    pub ppy: f32,
    /// Distortion coefficients, meaning given by `model`
    pub coeffs: [f32; 5],
    pub model: DistortionModel,
}

impl Intrinsics {
    /// Zero-filled record for a mode with no calibration available
    pub fn uncalibrated(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

/// Rotation and translation relating one camera frame to another
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Extrinsics {
    /// Row-major 3x3 rotation matrix
    pub rotation: [f32; 9],
    /// Translation vector, millimeters
    pub translation: [f32; 3],
}
