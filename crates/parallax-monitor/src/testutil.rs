//! Shared test doubles: a scripted mock device and synthetic table blobs

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use parallax_core::RECT_RESOLUTION_SLOTS;

use crate::tables::{CoefficientsTable, TableHeader};
use crate::transport::{fw_cmd, DepthDevice, TransportError};

/// In-memory device double
///
/// Serves a fixed identity blob and calibration tables keyed by numeric
/// table id, and backs the extension-unit registers with a map. Detects
/// overlapping monitor transactions, which the per-device lock must never
/// allow.
pub(crate) struct MockDevice {
    pub gvd: Vec<u8>,
    pub tables: HashMap<u32, Vec<u8>>,
    pub registers: Mutex<HashMap<u8, Vec<u8>>>,
    fail_transport: bool,
    fail_calibration: bool,
    in_flight: AtomicBool,
    pub overlap_detected: AtomicBool,
    pub transaction_count: AtomicUsize,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            gvd: vec![0u8; 1024],
            tables: HashMap::new(),
            registers: Mutex::new(HashMap::new()),
            fail_transport: false,
            fail_calibration: false,
            in_flight: AtomicBool::new(false),
            overlap_detected: AtomicBool::new(false),
            transaction_count: AtomicUsize::new(0),
        }
    }

    pub fn with_gvd(mut self, gvd: Vec<u8>) -> Self {
        self.gvd = gvd;
        self
    }

    pub fn with_table(mut self, table_id: u16, raw: Vec<u8>) -> Self {
        self.tables.insert(table_id as u32, raw);
        self
    }

    /// Every transaction fails
    pub fn failing(mut self) -> Self {
        self.fail_transport = true;
        self
    }

    /// Only calibration-table fetches fail; identity still works
    pub fn failing_calibration(mut self) -> Self {
        self.fail_calibration = true;
        self
    }

    fn transact(&self, request: &[u8], response: &mut [u8]) -> Result<usize, TransportError> {
        self.transaction_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_transport {
            return Err(TransportError::Unreachable("mock transport failure".into()));
        }

        let opcode = request[0];
        let param1 = u32::from_le_bytes([request[1], request[2], request[3], request[4]]);

        let data = match opcode {
            fw_cmd::GVD => self.gvd.clone(),
            fw_cmd::GET_INTERNAL_CAL => {
                if self.fail_calibration {
                    return Err(TransportError::Transfer("mock calibration fault".into()));
                }
                self.tables.get(&param1).cloned().unwrap_or_default()
            }
            _ => Vec::new(),
        };

        let n = data.len().min(response.len());
        response[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }
}

impl DepthDevice for MockDevice {
    fn monitor_transaction(
        &self,
        request: &[u8],
        response: &mut [u8],
    ) -> Result<usize, TransportError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlap_detected.store(true, Ordering::SeqCst);
        }
        // give a racing caller a window to overlap if the lock fails to
        // serialize us
        thread::sleep(Duration::from_millis(1));
        let result = self.transact(request, response);
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    fn control_read(&self, control: u8, value: &mut [u8]) -> Result<(), TransportError> {
        if self.fail_transport {
            return Err(TransportError::Unreachable("mock transport failure".into()));
        }
        let registers = self.registers.lock();
        if let Some(stored) = registers.get(&control) {
            let n = stored.len().min(value.len());
            value[..n].copy_from_slice(&stored[..n]);
        }
        Ok(())
    }

    fn control_write(&self, control: u8, value: &[u8]) -> Result<(), TransportError> {
        if self.fail_transport {
            return Err(TransportError::Unreachable("mock transport failure".into()));
        }
        self.registers.lock().insert(control, value.to_vec());
        Ok(())
    }
}

/// A coefficients table with a distinctive, exactly-representable value in
/// every decoded field (header crc32 left zero; `sample_coefficients_raw`
/// seals it)
pub(crate) fn sample_coefficients_table() -> CoefficientsTable {
    let mut intrinsic_left = [0.0f32; 9];
    let mut intrinsic_right = [0.0f32; 9];
    for i in 0..9 {
        intrinsic_left[i] = 100.0 + i as f32;
        intrinsic_right[i] = 200.0 + i as f32;
    }

    let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

    let mut rect_params = [[0.0f32; 4]; RECT_RESOLUTION_SLOTS];
    for (slot, params) in rect_params.iter_mut().enumerate() {
        *params = [
            1000.0 + slot as f32,
            2000.0 + slot as f32,
            3000.0 + slot as f32,
            4000.0 + slot as f32,
        ];
    }

    CoefficientsTable {
        header: TableHeader {
            version: 0x0102,
            table_type: 25,
            table_size: CoefficientsTable::SIZE as u32,
            param: 0,
            crc32: 0,
        },
        intrinsic_left,
        intrinsic_right,
        world2left_rot: identity,
        world2right_rot: identity,
        baseline: 55.0,
        brown_model: 1,
        rect_params,
    }
}

/// Encode `sample_coefficients_table` into a valid 512-byte blob with a
/// correct payload checksum
pub(crate) fn sample_coefficients_raw() -> Vec<u8> {
    encode_coefficients_table(&sample_coefficients_table())
}

/// Serialize a coefficients table, sealing the header with the payload's
/// CRC-32
pub(crate) fn encode_coefficients_table(table: &CoefficientsTable) -> Vec<u8> {
    let mut buf = vec![0u8; CoefficientsTable::SIZE];

    write_matrix(&mut buf, 16, &table.intrinsic_left);
    write_matrix(&mut buf, 52, &table.intrinsic_right);
    write_matrix(&mut buf, 88, &table.world2left_rot);
    write_matrix(&mut buf, 124, &table.world2right_rot);
    buf[160..164].copy_from_slice(&table.baseline.to_le_bytes());
    buf[252..256].copy_from_slice(&table.brown_model.to_le_bytes());
    for (slot, params) in table.rect_params.iter().enumerate() {
        for (i, param) in params.iter().enumerate() {
            let at = 256 + slot * 16 + i * 4;
            buf[at..at + 4].copy_from_slice(&param.to_le_bytes());
        }
    }

    let mut header = table.header;
    header.crc32 = crc32fast::hash(&buf[TableHeader::SIZE..]);
    header.write_to(&mut buf);
    buf
}

fn write_matrix(buf: &mut [u8], offset: usize, cells: &[f32; 9]) {
    for (i, cell) in cells.iter().enumerate() {
        let at = offset + i * 4;
        buf[at..at + 4].copy_from_slice(&cell.to_le_bytes());
    }
}
