//! Parallax Monitor - firmware monitor protocol and control plane
//!
//! Everything that talks to a physical camera during bring-up:
//! - Monitor command transport, one serialized transaction per device
//! - Flash calibration table codec (headers, TOC, coefficients layout)
//! - Calibration retrieval and decoding into the in-memory record
//! - Identity-blob text-field extraction (serial, firmware version)
//! - Extension-unit register access (laser power, exposure)
//! - Device-info assembly for the configuration layer

pub mod calibration;
pub mod identity;
pub mod info;
pub mod registers;
pub mod tables;
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;

pub use calibration::{
    fetch_calibration_table, parse_calibration_table, read_calibration, CalibrationError,
};
pub use identity::{
    decode_field, decode_field_at, fetch_identity_blob, identity_field, GvdField, GVD_SIZE,
};
pub use info::{describe_device, DepthMode, DeviceInfo, NOMINAL_DEPTH_SCALE};
pub use registers::{get_laser_power, get_lr_exposure, set_laser_power, set_lr_exposure};
pub use tables::{CoefficientsTable, TableHeader, TableLink, TableOfContents};
pub use transport::{
    execute, DepthDevice, DeviceLock, MonitorCommand, MonitorResponse, TransportError,
    MONITOR_BUFFER_SIZE,
};
