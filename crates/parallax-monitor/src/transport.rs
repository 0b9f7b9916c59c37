//! Monitor command transport
//!
//! Serializes fixed-shape command/response transactions to the device's
//! firmware monitor endpoint. Access is guarded by a timed mutex scoped to
//! the physical device: one request/response exchange in flight at a time,
//! with the lock held for the full round trip and released on every exit
//! path.

use parking_lot::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

/// Nominal monitor response buffer size in bytes
///
/// Firmware may produce fewer bytes than this; the actual received length
/// travels with the response.
pub const MONITOR_BUFFER_SIZE: usize = 1024;

/// How long to wait for exclusive access to a device's monitor channel
pub const MONITOR_LOCK_TIMEOUT: Duration = Duration::from_millis(3000);

/// Request frame bytes ahead of the outbound payload: opcode plus four
/// 32-bit parameters
pub const MONITOR_HEADER_SIZE: usize = 17;

/// Per-device lock guarding the monitor command channel
///
/// Owned and supplied by the caller, never by this crate. Independent
/// devices carry independent locks and may be driven fully in parallel.
pub type DeviceLock = Mutex<()>;

/// Firmware monitor opcodes used by this driver
pub mod fw_cmd {
    /// "Get Version and Date": fetch the identity/version blob
    pub const GVD: u8 = 0x10;
    /// Read a calibration table; param1 carries the numeric table kind
    pub const GET_INTERNAL_CAL: u8 = 0x15;
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("monitor channel lock not acquired within {0:?}")]
    LockTimeout(Duration),
    #[error("control transfer failed: {0}")]
    Transfer(String),
    #[error("device unreachable: {0}")]
    Unreachable(String),
}

/// Opaque handle to one physical depth camera
///
/// Implemented by the USB layer; this crate only needs the two control
/// channels. `monitor_transaction` issues one blocking request/response
/// exchange on the firmware monitor endpoint and returns how many bytes
/// the firmware actually produced, which may be less than `response.len()`.
/// `control_read`/`control_write` transfer fixed-size scalar registers over
/// the vendor extension unit, a sibling channel with no serialization
/// requirement against the monitor.
pub trait DepthDevice {
    fn monitor_transaction(
        &self,
        request: &[u8],
        response: &mut [u8],
    ) -> Result<usize, TransportError>;

    fn control_read(&self, control: u8, value: &mut [u8]) -> Result<(), TransportError>;

    fn control_write(&self, control: u8, value: &[u8]) -> Result<(), TransportError>;
}

/// One firmware monitor command
#[derive(Debug, Clone, Default)]
pub struct MonitorCommand {
    pub opcode: u8,
    pub param1: u32,
    pub param2: u32,
    pub param3: u32,
    pub param4: u32,
    /// Outbound payload following the parameters
    pub data: Vec<u8>,
}

impl MonitorCommand {
    pub fn new(opcode: u8) -> Self {
        Self {
            opcode,
            ..Self::default()
        }
    }

    pub fn with_param1(opcode: u8, param1: u32) -> Self {
        Self {
            opcode,
            param1,
            ..Self::default()
        }
    }

    /// Encode the request frame: opcode byte, four little-endian
    /// parameters, then the outbound payload
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(MONITOR_HEADER_SIZE + self.data.len());
        frame.push(self.opcode);
        frame.extend_from_slice(&self.param1.to_le_bytes());
        frame.extend_from_slice(&self.param2.to_le_bytes());
        frame.extend_from_slice(&self.param3.to_le_bytes());
        frame.extend_from_slice(&self.param4.to_le_bytes());
        frame.extend_from_slice(&self.data);
        frame
    }
}

/// Raw monitor response, truncated to the length the firmware reported
#[derive(Debug, Clone)]
pub struct MonitorResponse {
    pub data: Vec<u8>,
}

/// Issue one monitor transaction with the default lock timeout
pub fn execute<D: DepthDevice>(
    device: &D,
    lock: &DeviceLock,
    command: &MonitorCommand,
) -> Result<MonitorResponse, TransportError> {
    execute_with_timeout(device, lock, command, MONITOR_LOCK_TIMEOUT)
}

/// Issue one monitor transaction
///
/// Blocks until the device responds or the transport gives up. The device
/// lock is held for the full request/response round trip; the guard makes
/// release unconditional, transport errors included. No retry is performed
/// here: one call, one transport attempt.
pub fn execute_with_timeout<D: DepthDevice>(
    device: &D,
    lock: &DeviceLock,
    command: &MonitorCommand,
    lock_timeout: Duration,
) -> Result<MonitorResponse, TransportError> {
    let request = command.encode();

    trace!(
        opcode = command.opcode,
        param1 = command.param1,
        out_len = command.data.len(),
        "sending monitor command"
    );

    let _guard = lock
        .try_lock_for(lock_timeout)
        .ok_or(TransportError::LockTimeout(lock_timeout))?;

    let mut response = vec![0u8; MONITOR_BUFFER_SIZE];
    let received = device.monitor_transaction(&request, &mut response)?;

    debug!(opcode = command.opcode, received, "monitor command completed");

    response.truncate(received.min(MONITOR_BUFFER_SIZE));
    Ok(MonitorResponse { data: response })
}
