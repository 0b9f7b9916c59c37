//! Identity blob and text-field extraction
//!
//! The firmware's GVD command returns a fixed-size metadata region holding,
//! among other things, the module serial and the firmware version at fixed
//! byte offsets.

use tracing::warn;

use crate::transport::{execute, fw_cmd, DepthDevice, DeviceLock, MonitorCommand, TransportError};

/// Fixed size of the version/identity blob
pub const GVD_SIZE: usize = 1024;

/// Known text fields within the identity blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GvdField {
    /// 4-byte firmware version, rendered as dot-separated decimal octets
    /// with the highest byte first
    FirmwareVersion,
    /// 6-byte module serial, rendered as lowercase hex in byte order
    AsicModuleSerial,
}

impl GvdField {
    /// Byte offset of this field within the blob
    pub fn offset(self) -> usize {
        match self {
            Self::FirmwareVersion => 12,
            Self::AsicModuleSerial => 64,
        }
    }

    pub fn from_offset(offset: usize) -> Option<Self> {
        match offset {
            12 => Some(Self::FirmwareVersion),
            64 => Some(Self::AsicModuleSerial),
            _ => None,
        }
    }
}

/// Fetch the identity blob, normalized to exactly `GVD_SIZE` bytes
///
/// A short firmware response is zero-padded; anything past `GVD_SIZE` is
/// dropped with a warning.
pub fn fetch_identity_blob<D: DepthDevice>(
    device: &D,
    lock: &DeviceLock,
) -> Result<Vec<u8>, TransportError> {
    let response = execute(device, lock, &MonitorCommand::new(fw_cmd::GVD))?;

    if response.data.len() > GVD_SIZE {
        warn!(
            received = response.data.len(),
            "identity blob longer than expected, truncating"
        );
    }

    let mut blob = vec![0u8; GVD_SIZE];
    let n = response.data.len().min(GVD_SIZE);
    blob[..n].copy_from_slice(&response.data[..n]);
    Ok(blob)
}

/// Decode one known identity field from a fetched blob
pub fn decode_field(blob: &[u8], field: GvdField) -> String {
    let offset = field.offset();
    match field {
        GvdField::AsicModuleSerial => match blob.get(offset..offset + 6) {
            Some(bytes) => hex::encode(bytes),
            None => String::new(),
        },
        GvdField::FirmwareVersion => match blob.get(offset..offset + 4) {
            Some(bytes) => format!("{}.{}.{}.{}", bytes[3], bytes[2], bytes[1], bytes[0]),
            None => String::new(),
        },
    }
}

/// Decode whatever field is declared at `offset`
///
/// An unrecognized offset is not an error: the result is empty and a
/// diagnostic is logged.
pub fn decode_field_at(blob: &[u8], offset: usize) -> String {
    match GvdField::from_offset(offset) {
        Some(field) => decode_field(blob, field),
        None => {
            warn!(offset, "identity field at offset is not supported");
            String::new()
        }
    }
}

/// Fetch the identity blob and extract one field
pub fn identity_field<D: DepthDevice>(
    device: &D,
    lock: &DeviceLock,
    field: GvdField,
) -> Result<String, TransportError> {
    let blob = fetch_identity_blob(device, lock)?;
    Ok(decode_field(&blob, field))
}
