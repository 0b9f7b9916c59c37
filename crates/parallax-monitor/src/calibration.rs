//! Calibration retrieval and decoding
//!
//! Fetches raw calibration tables through the firmware monitor and decodes
//! them into the in-memory record. A corrupt or missing table spoils only
//! itself: the read logs the failure, leaves that kind absent, and carries
//! on. Transport failures are different; they abort the read.

use parallax_core::{
    Calibration, CalibrationTableId, DistortionModel, Intrinsics, RectResolution,
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::tables::{payload_checksum, CoefficientsTable};
use crate::transport::{execute, fw_cmd, DepthDevice, DeviceLock, MonitorCommand, TransportError};

#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("table {table_id:?} size mismatch: got {actual} bytes, expected {expected}")]
    SizeMismatch {
        table_id: CalibrationTableId,
        expected: usize,
        actual: usize,
    },
    #[error("table {table_id:?} checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        table_id: CalibrationTableId,
        stored: u32,
        computed: u32,
    },
}

/// Fetch one table's raw bytes from flash
pub fn fetch_calibration_table<D: DepthDevice>(
    device: &D,
    lock: &DeviceLock,
    table_id: CalibrationTableId,
) -> Result<Vec<u8>, TransportError> {
    let command = MonitorCommand::with_param1(fw_cmd::GET_INTERNAL_CAL, table_id.raw() as u32);
    let response = execute(device, lock, &command)?;
    Ok(response.data)
}

/// Decode one raw table into the calibration record
///
/// Only the coefficients kind is decoded structurally; every other kind is
/// recognized but skipped with a diagnostic. The record is untouched when
/// validation fails. Whatever kind gets through without an error is marked
/// present, the skipped ones included.
pub fn parse_calibration_table(
    calib: &mut Calibration,
    table_id: CalibrationTableId,
    raw: &[u8],
) -> Result<(), CalibrationError> {
    match table_id {
        CalibrationTableId::Coefficients => {
            let table =
                CoefficientsTable::read_from(raw).ok_or(CalibrationError::SizeMismatch {
                    table_id,
                    expected: CoefficientsTable::SIZE,
                    actual: raw.len(),
                })?;

            let computed = payload_checksum(raw);
            if table.header.crc32 != computed {
                return Err(CalibrationError::ChecksumMismatch {
                    table_id,
                    stored: table.header.crc32,
                    computed,
                });
            }

            debug!(
                version = table.header.version,
                table_type = table.header.table_type,
                size = table.header.table_size,
                baseline = table.baseline,
                "decoding coefficients table"
            );

            calib.version = table.header.version;
            calib.left_imager_intrinsic = imager_intrinsics(&table.intrinsic_left);
            calib.right_imager_intrinsic = imager_intrinsics(&table.intrinsic_right);

            // Only focal length and principal point vary across rectified
            // resolutions. Distortion is zero by construction for rectified
            // depth, whatever the raw slot holds.
            for res in RectResolution::ALL {
                let (width, height) = res.dims();
                let [fx, fy, ppx, ppy] = table.rect_params[res.slot()];
                calib.depth_intrinsic[res.slot()] = Intrinsics {
                    width,
                    height,
                    fx,
                    fy,
                    ppx,
                    ppy,
                    coeffs: [0.0; 5],
                    model: DistortionModel::BrownConrady,
                };
            }
        }
        other => {
            warn!(
                table_id = ?other,
                raw_id = other.raw(),
                "calibration table kind not supported, skipping decode"
            );
        }
    }

    calib.set_present(table_id);
    Ok(())
}

/// Table kinds fetched during a calibration read
const TABLES_OF_INTEREST: [CalibrationTableId; 1] = [CalibrationTableId::Coefficients];

/// Read and decode the device calibration
///
/// A table that fails validation is logged and left absent while the
/// remaining kinds are still attempted; transport failures abort the whole
/// read. Callers must treat an all-default record as valid input and
/// proceed with uncalibrated geometry.
pub fn read_calibration<D: DepthDevice>(
    device: &D,
    lock: &DeviceLock,
) -> Result<Calibration, TransportError> {
    let mut calib = Calibration::default();

    for table_id in TABLES_OF_INTEREST {
        let raw = fetch_calibration_table(device, lock, table_id)?;
        if let Err(err) = parse_calibration_table(&mut calib, table_id, &raw) {
            error!(table_id = ?table_id, error = %err, "calibration table rejected");
        }
    }

    Ok(calib)
}

/// Map the nine packed cells of a per-imager block onto an intrinsics
/// record
///
/// Flat row-major cell order: fx, fy, ppx, ppy, then the five distortion
/// coefficients. Width/height -1 marks the record resolution-independent.
fn imager_intrinsics(cells: &[f32; 9]) -> Intrinsics {
    Intrinsics {
        width: -1,
        height: -1,
        fx: cells[0],
        fy: cells[1],
        ppx: cells[2],
        ppy: cells[3],
        coeffs: [cells[4], cells[5], cells[6], cells[7], cells[8]],
        model: DistortionModel::BrownConrady,
    }
}
