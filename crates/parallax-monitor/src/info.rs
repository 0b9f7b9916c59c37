//! Device-info assembly
//!
//! Composes the identity, calibration and capture-mode data gathered at
//! bring-up into one record for the configuration layer.

use parallax_core::{Calibration, Intrinsics};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::calibration::read_calibration;
use crate::identity::{identity_field, GvdField};
use crate::transport::{DepthDevice, DeviceLock, TransportError};

/// Depth value corresponding to one unit in the Z image, meters
pub const NOMINAL_DEPTH_SCALE: f32 = 0.001;

struct CamMode {
    dims: (i32, i32),
    fps: &'static [u32],
}

/// Depth (Z) capture modes supported by this camera family
const DEPTH_MODES: [CamMode; 7] = [
    CamMode { dims: (1280, 720), fps: &[6, 15, 30] },
    CamMode { dims: (848, 480), fps: &[6, 15, 30, 60] },
    CamMode { dims: (640, 480), fps: &[6, 15, 30, 60] },
    CamMode { dims: (640, 360), fps: &[6, 15, 30, 60, 120] },
    CamMode { dims: (480, 270), fps: &[6, 15, 30, 60, 120] },
    CamMode { dims: (424, 240), fps: &[6, 15, 30, 60, 120] },
    CamMode { dims: (320, 240), fps: &[6, 15, 30, 60, 120] },
];

/// One advertised depth mode with its selected intrinsics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthMode {
    pub width: i32,
    pub height: i32,
    pub fps: Vec<u32>,
    pub intrinsics: Intrinsics,
}

/// Bring-up summary for one device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub serial: String,
    pub firmware_version: String,
    pub nominal_depth_scale: f32,
    pub depth_modes: Vec<DepthMode>,
}

/// Assemble the bring-up info for one device
///
/// Identity fields must be readable. A calibration that cannot be read at
/// all is logged and replaced with defaults so the device still
/// enumerates, with uncalibrated geometry on every mode.
pub fn describe_device<D: DepthDevice>(
    device: &D,
    lock: &DeviceLock,
    name: &str,
) -> Result<DeviceInfo, TransportError> {
    let serial = identity_field(device, lock, GvdField::AsicModuleSerial)?;
    let firmware_version = identity_field(device, lock, GvdField::FirmwareVersion)?;

    let calib = match read_calibration(device, lock) {
        Ok(calib) => calib,
        Err(err) => {
            error!(error = %err, "calibration read failed, proceeding with no intrinsics");
            Calibration::default()
        }
    };

    let depth_modes = DEPTH_MODES
        .iter()
        .map(|mode| {
            let (width, height) = mode.dims;
            DepthMode {
                width,
                height,
                fps: mode.fps.to_vec(),
                intrinsics: calib.depth_intrinsics_for(width, height),
            }
        })
        .collect();

    info!(
        name = %name,
        serial = %serial,
        firmware = %firmware_version,
        "device bring-up complete"
    );

    Ok(DeviceInfo {
        name: name.to_string(),
        serial,
        firmware_version,
        nominal_depth_scale: NOMINAL_DEPTH_SCALE,
        depth_modes,
    })
}
