//! Parallax Core - data model for the depth-camera bring-up layer
//!
//! This crate provides the foundational types for the parallax driver:
//! - Camera geometry records (intrinsics, extrinsics, distortion model)
//! - The closed set of rectified capture resolutions and its pixel lookup
//! - Calibration table kinds and the decoded calibration record
//! - Resolution-to-intrinsics selection used during device enumeration

pub mod calibration;
pub mod geometry;
pub mod resolution;

pub use calibration::{Calibration, CalibrationTableId};
pub use geometry::{DistortionModel, Extrinsics, Intrinsics};
pub use resolution::{RectResolution, RECT_RESOLUTION_SLOTS};
