//! Rectified capture resolutions
//!
//! The device calibrates a closed set of rectified resolutions. Their slot
//! numbers index both the on-wire `rect_params` array of the coefficients
//! table and the in-memory depth-intrinsics array, so the two stay aligned
//! by construction.

use serde::{Deserialize, Serialize};

/// Number of rectified-resolution slots carried by the coefficients table
///
/// Slots 8..11 are reserved on the wire and name no resolution.
pub const RECT_RESOLUTION_SLOTS: usize = 12;

/// A rectified resolution calibrated on the device
///
/// Discriminants are the wire slot numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RectResolution {
    Res1920x1080 = 0,
    Res1280x720 = 1,
    Res640x480 = 2,
    Res848x480 = 3,
    Res640x360 = 4,
    Res424x240 = 5,
    Res320x240 = 6,
    Res480x270 = 7,
}

impl RectResolution {
    /// Every named rectified resolution, the process-wide lookup set
    pub const ALL: [RectResolution; 8] = [
        RectResolution::Res1920x1080,
        RectResolution::Res1280x720,
        RectResolution::Res640x480,
        RectResolution::Res848x480,
        RectResolution::Res640x360,
        RectResolution::Res424x240,
        RectResolution::Res320x240,
        RectResolution::Res480x270,
    ];

    /// Pixel dimensions of this resolution
    pub fn dims(self) -> (i32, i32) {
        match self {
            Self::Res1920x1080 => (1920, 1080),
            Self::Res1280x720 => (1280, 720),
            Self::Res640x480 => (640, 480),
            Self::Res848x480 => (848, 480),
            Self::Res640x360 => (640, 360),
            Self::Res424x240 => (424, 240),
            Self::Res320x240 => (320, 240),
            Self::Res480x270 => (480, 270),
        }
    }

    /// Exact-match lookup of a requested capture resolution
    ///
    /// No nearest-match or interpolation: a resolution outside the closed
    /// set has no calibrated entry.
    pub fn from_dims(width: i32, height: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|res| res.dims() == (width, height))
    }

    /// Slot number within `rect_params` and the depth-intrinsics array
    pub fn slot(self) -> usize {
        self as usize
    }
}
