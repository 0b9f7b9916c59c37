//! Calibration table kinds and the decoded calibration record

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::geometry::{Extrinsics, Intrinsics};
use crate::resolution::{RectResolution, RECT_RESOLUTION_SLOTS};

/// Calibration table kinds stored in the on-board flash
///
/// Only `Coefficients` has a structural decode; the other kinds are
/// recognized so a fetch can be attempted and tracked, but their layouts
/// are opaque to this driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationTableId {
    Coefficients,
    DepthCalibration,
    RgbCalibration,
    FisheyeCalibration,
    ImuCalibration,
    LensShading,
    Projector,
}

impl CalibrationTableId {
    /// Every table kind the device is known to store
    pub const KNOWN: [CalibrationTableId; 7] = [
        CalibrationTableId::Coefficients,
        CalibrationTableId::DepthCalibration,
        CalibrationTableId::RgbCalibration,
        CalibrationTableId::FisheyeCalibration,
        CalibrationTableId::ImuCalibration,
        CalibrationTableId::LensShading,
        CalibrationTableId::Projector,
    ];

    /// Numeric id used on the wire and in the flash TOC
    pub fn raw(self) -> u16 {
        match self {
            Self::Coefficients => 25,
            Self::DepthCalibration => 31,
            Self::RgbCalibration => 32,
            Self::FisheyeCalibration => 33,
            Self::ImuCalibration => 34,
            Self::LensShading => 35,
            Self::Projector => 36,
        }
    }

    pub fn from_raw(raw: u16) -> Option<Self> {
        Self::KNOWN.iter().copied().find(|id| id.raw() == raw)
    }
}

/// Decoded device calibration
///
/// Built fresh for every calibration read: all fields start at their
/// defaults and every presence flag starts false, so an aborted or failed
/// read never leaves stale data behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// major.minor version captured from the coefficients table header
    pub version: u16,
    /// Left imager intrinsics, resolution-independent (width/height -1)
    pub left_imager_intrinsic: Intrinsics,
    /// Right imager intrinsics, resolution-independent (width/height -1)
    pub right_imager_intrinsic: Intrinsics,
    /// Depth intrinsics per rectified-resolution slot
    pub depth_intrinsic: [Intrinsics; RECT_RESOLUTION_SLOTS],
    pub left_imager_extrinsic: Extrinsics,
    pub right_imager_extrinsic: Extrinsics,
    pub depth_extrinsic: Extrinsics,
    data_present: HashMap<CalibrationTableId, bool>,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            version: 0,
            left_imager_intrinsic: Intrinsics::default(),
            right_imager_intrinsic: Intrinsics::default(),
            depth_intrinsic: [Intrinsics::default(); RECT_RESOLUTION_SLOTS],
            left_imager_extrinsic: Extrinsics::default(),
            right_imager_extrinsic: Extrinsics::default(),
            depth_extrinsic: Extrinsics::default(),
            data_present: CalibrationTableId::KNOWN
                .iter()
                .map(|&id| (id, false))
                .collect(),
        }
    }
}

impl Calibration {
    /// Whether `id` was decoded during the last read
    ///
    /// True means "attempted without error": the parse of an unsupported
    /// kind is a warn-and-skip no-op that still marks the kind present, so
    /// a true flag does not guarantee any field was populated.
    pub fn present(&self, id: CalibrationTableId) -> bool {
        self.data_present.get(&id).copied().unwrap_or(false)
    }

    /// Mark `id` as attempted without error
    pub fn set_present(&mut self, id: CalibrationTableId) {
        self.data_present.insert(id, true);
    }

    /// Select depth intrinsics for a requested capture resolution
    ///
    /// Matching is exact equality against the rectified-resolution set.
    /// Anything else, including any request while the coefficients table is
    /// absent, yields a zero-filled record carrying the requested
    /// dimensions: the documented "no calibration for this mode" value.
    pub fn depth_intrinsics_for(&self, width: i32, height: i32) -> Intrinsics {
        if self.present(CalibrationTableId::Coefficients) {
            if let Some(res) = RectResolution::from_dims(width, height) {
                return self.depth_intrinsic[res.slot()];
            }
        }
        Intrinsics::uncalibrated(width, height)
    }
}
