//! Extension-unit register access
//!
//! Scalar device parameters live at fixed control addresses on the vendor
//! extension unit, a sibling channel to the firmware monitor. Sizes are
//! fixed per field, so reads and writes are single direct transfers with
//! no length ambiguity and no monitor lock involved.

use tracing::debug;

use crate::transport::{DepthDevice, TransportError};

/// Extension-unit control addresses: the device-table binding for this
/// camera family
pub mod xu {
    /// Laser power, one byte
    pub const LASER_POWER: u8 = 0x02;
    /// Left/right imager exposure, two bytes little-endian
    pub const LR_EXPOSURE: u8 = 0x03;
}

pub fn get_laser_power<D: DepthDevice>(device: &D) -> Result<u8, TransportError> {
    let mut value = [0u8; 1];
    device.control_read(xu::LASER_POWER, &mut value)?;
    Ok(value[0])
}

pub fn set_laser_power<D: DepthDevice>(device: &D, power: u8) -> Result<(), TransportError> {
    debug!(power, "setting laser power");
    device.control_write(xu::LASER_POWER, &[power])
}

pub fn get_lr_exposure<D: DepthDevice>(device: &D) -> Result<u16, TransportError> {
    let mut value = [0u8; 2];
    device.control_read(xu::LR_EXPOSURE, &mut value)?;
    Ok(u16::from_le_bytes(value))
}

pub fn set_lr_exposure<D: DepthDevice>(device: &D, exposure: u16) -> Result<(), TransportError> {
    debug!(exposure, "setting lr exposure");
    device.control_write(xu::LR_EXPOSURE, &exposure.to_le_bytes())
}
