//! Packed flash-table layouts and validation
//!
//! Every table stored in device flash opens with a common 16-byte header;
//! the payload layout depends on the table kind. Fields are decoded one by
//! one with explicit endianness instead of overlaying structs, so the wire
//! contract (offsets, sizes, byte order) stays host-independent. The
//! version field is big-endian on the wire; everything else little-endian.

use parallax_core::{CalibrationTableId, RECT_RESOLUTION_SLOTS};

/// Common header at the start of every flash table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableHeader {
    /// major.minor, big-endian on the wire
    pub version: u16,
    /// Numeric table kind
    pub table_type: u16,
    /// Total table size in bytes, this header included
    pub table_size: u32,
    /// Content defined by the table type
    pub param: u32,
    /// CRC-32 of every byte after the header
    pub crc32: u32,
}

impl TableHeader {
    pub const SIZE: usize = 16;

    /// Decode the first header-sized window of `buf`
    pub fn read_from(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            version: u16::from_be_bytes([buf[0], buf[1]]),
            table_type: u16::from_le_bytes([buf[2], buf[3]]),
            table_size: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            param: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
            crc32: u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]),
        })
    }

    /// Encode into the 16-byte wire layout
    pub fn write_to(&self, buf: &mut [u8]) -> usize {
        buf[0..2].copy_from_slice(&self.version.to_be_bytes());
        buf[2..4].copy_from_slice(&self.table_type.to_le_bytes());
        buf[4..8].copy_from_slice(&self.table_size.to_le_bytes());
        buf[8..12].copy_from_slice(&self.param.to_le_bytes());
        buf[12..16].copy_from_slice(&self.crc32.to_le_bytes());
        Self::SIZE
    }
}

/// CRC-32 of a raw table's payload, everything after the header
pub fn payload_checksum(raw: &[u8]) -> u32 {
    crc32fast::hash(&raw[TableHeader::SIZE.min(raw.len())..])
}

/// Compare the header checksum against the table payload
pub fn verify_table_checksum(header: &TableHeader, raw: &[u8]) -> bool {
    raw.len() >= TableHeader::SIZE && header.crc32 == payload_checksum(raw)
}

/// Exact packed size for table kinds with a known layout
///
/// A raw blob of any other length fails validation outright; truncated or
/// padded tables are never partially accepted.
pub fn expected_table_size(id: CalibrationTableId) -> Option<usize> {
    match id {
        CalibrationTableId::Coefficients => Some(CoefficientsTable::SIZE),
        _ => None,
    }
}

/// One table-of-contents entry pointing at a table blob in flash
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableLink {
    /// Enumerated table id
    pub table_id: u16,
    /// Determined uniquely by each table
    pub param: u16,
    /// Table location offset in flash memory
    pub offset: u32,
}

impl TableLink {
    pub const SIZE: usize = 8;

    pub fn read_from(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            table_id: u16::from_le_bytes([buf[0], buf[1]]),
            param: u16::from_le_bytes([buf[2], buf[3]]),
            offset: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        })
    }

    pub fn write_to(&self, buf: &mut [u8]) -> usize {
        buf[0..2].copy_from_slice(&self.table_id.to_le_bytes());
        buf[2..4].copy_from_slice(&self.param.to_le_bytes());
        buf[4..8].copy_from_slice(&self.offset.to_le_bytes());
        Self::SIZE
    }
}

/// Number of data-table links in the calibration TOC
pub const TOC_LINK_COUNT: usize = 7;

/// Flash table of contents: a header followed by one link per data table
///
/// Entries are looked up by their declared table id; position in the array
/// carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOfContents {
    pub header: TableHeader,
    pub links: [TableLink; TOC_LINK_COUNT],
}

impl TableOfContents {
    pub const SIZE: usize = TableHeader::SIZE + TOC_LINK_COUNT * TableLink::SIZE;

    pub fn read_from(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        let header = TableHeader::read_from(buf)?;
        let mut links = [TableLink::default(); TOC_LINK_COUNT];
        for (i, link) in links.iter_mut().enumerate() {
            let at = TableHeader::SIZE + i * TableLink::SIZE;
            *link = TableLink::read_from(&buf[at..])?;
        }
        Some(Self { header, links })
    }

    /// Locate a table blob by its declared id
    pub fn find(&self, id: CalibrationTableId) -> Option<TableLink> {
        self.links.iter().copied().find(|link| link.table_id == id.raw())
    }
}

// field offsets within the packed coefficients table
const INTRINSIC_LEFT_OFFSET: usize = 16;
const INTRINSIC_RIGHT_OFFSET: usize = 52;
const WORLD2LEFT_ROT_OFFSET: usize = 88;
const WORLD2RIGHT_ROT_OFFSET: usize = 124;
const BASELINE_OFFSET: usize = 160;
const BROWN_MODEL_OFFSET: usize = 252;
const RECT_PARAMS_OFFSET: usize = 256;

/// The stereo coefficients table, the one kind decoded structurally
///
/// Reserved regions at 164..252 and 448..512 are skipped on decode.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientsTable {
    pub header: TableHeader,
    /// Left camera intrinsic cells, normalized, flat row-major
    pub intrinsic_left: [f32; 9],
    /// Right camera intrinsic cells, normalized, flat row-major
    pub intrinsic_right: [f32; 9],
    /// Inverse rotation of the left camera
    pub world2left_rot: [f32; 9],
    /// Inverse rotation of the right camera
    pub world2right_rot: [f32; 9],
    /// Distance between the imagers, millimeters
    pub baseline: f32,
    /// 0 - legacy distortion model, 1 - Brown-Conrady
    pub brown_model: u32,
    /// (fx, fy, ppx, ppy) per rectified-resolution slot
    pub rect_params: [[f32; 4]; RECT_RESOLUTION_SLOTS],
}

impl CoefficientsTable {
    /// Exact packed size; any other raw length is rejected
    pub const SIZE: usize = 512;

    pub fn read_from(buf: &[u8]) -> Option<Self> {
        if buf.len() != Self::SIZE {
            return None;
        }
        let header = TableHeader::read_from(buf)?;

        let mut rect_params = [[0.0f32; 4]; RECT_RESOLUTION_SLOTS];
        for (slot, params) in rect_params.iter_mut().enumerate() {
            let base = RECT_PARAMS_OFFSET + slot * 16;
            for (i, param) in params.iter_mut().enumerate() {
                *param = read_f32_le(buf, base + i * 4);
            }
        }

        Some(Self {
            header,
            intrinsic_left: read_matrix(buf, INTRINSIC_LEFT_OFFSET),
            intrinsic_right: read_matrix(buf, INTRINSIC_RIGHT_OFFSET),
            world2left_rot: read_matrix(buf, WORLD2LEFT_ROT_OFFSET),
            world2right_rot: read_matrix(buf, WORLD2RIGHT_ROT_OFFSET),
            baseline: read_f32_le(buf, BASELINE_OFFSET),
            brown_model: u32::from_le_bytes([
                buf[BROWN_MODEL_OFFSET],
                buf[BROWN_MODEL_OFFSET + 1],
                buf[BROWN_MODEL_OFFSET + 2],
                buf[BROWN_MODEL_OFFSET + 3],
            ]),
            rect_params,
        })
    }
}

fn read_f32_le(buf: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn read_matrix(buf: &[u8], offset: usize) -> [f32; 9] {
    let mut cells = [0.0f32; 9];
    for (i, cell) in cells.iter_mut().enumerate() {
        *cell = read_f32_le(buf, offset + i * 4);
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{sample_coefficients_raw, sample_coefficients_table};

    #[test]
    fn test_header_version_is_big_endian() {
        let header = TableHeader {
            version: 0x0102,
            table_type: 25,
            table_size: 512,
            param: 7,
            crc32: 0xDEAD_BEEF,
        };
        let mut buf = [0u8; TableHeader::SIZE];
        assert_eq!(header.write_to(&mut buf), TableHeader::SIZE);

        // version big-endian, the rest little-endian
        assert_eq!(buf[0..2], [0x01, 0x02]);
        assert_eq!(buf[2..4], [25, 0]);
        assert_eq!(buf[4..8], [0x00, 0x02, 0x00, 0x00]);
        assert_eq!(buf[12..16], [0xEF, 0xBE, 0xAD, 0xDE]);

        assert_eq!(TableHeader::read_from(&buf), Some(header));
    }

    #[test]
    fn test_header_rejects_short_input() {
        assert_eq!(TableHeader::read_from(&[0u8; 15]), None);
    }

    #[test]
    fn test_checksum_verification() {
        let raw = sample_coefficients_raw();
        let header = TableHeader::read_from(&raw).unwrap();
        assert!(verify_table_checksum(&header, &raw));

        let mut corrupted = raw.clone();
        corrupted[100] ^= 0xFF;
        assert!(!verify_table_checksum(&header, &corrupted));
    }

    #[test]
    fn test_expected_table_size() {
        assert_eq!(
            expected_table_size(CalibrationTableId::Coefficients),
            Some(512)
        );
        assert_eq!(expected_table_size(CalibrationTableId::RgbCalibration), None);
        assert_eq!(expected_table_size(CalibrationTableId::LensShading), None);
    }

    #[test]
    fn test_toc_lookup_by_id_not_position() {
        let mut buf = vec![0u8; TableOfContents::SIZE];
        TableHeader {
            version: 0x0100,
            table_type: 1,
            table_size: TableOfContents::SIZE as u32,
            param: 0,
            crc32: 0,
        }
        .write_to(&mut buf);

        // links deliberately out of enumeration order
        let ids = [36u16, 25, 31, 33, 32, 35, 34];
        for (i, id) in ids.iter().enumerate() {
            TableLink {
                table_id: *id,
                param: i as u16,
                offset: 0x100 * (i as u32 + 1),
            }
            .write_to(&mut buf[TableHeader::SIZE + i * TableLink::SIZE..]);
        }

        let toc = TableOfContents::read_from(&buf).unwrap();
        let link = toc.find(CalibrationTableId::Coefficients).unwrap();
        assert_eq!(link.table_id, 25);
        assert_eq!(link.offset, 0x200);

        let link = toc.find(CalibrationTableId::Projector).unwrap();
        assert_eq!(link.offset, 0x100);
    }

    #[test]
    fn test_toc_missing_id() {
        let buf = vec![0u8; TableOfContents::SIZE];
        let toc = TableOfContents::read_from(&buf).unwrap();
        // zeroed links declare table id 0, which is no known kind
        assert_eq!(toc.find(CalibrationTableId::Coefficients), None);
    }

    #[test]
    fn test_coefficients_field_offsets() {
        let raw = sample_coefficients_raw();
        let expected = sample_coefficients_table();
        let table = CoefficientsTable::read_from(&raw).unwrap();

        assert_eq!(table.intrinsic_left, expected.intrinsic_left);
        assert_eq!(table.intrinsic_right, expected.intrinsic_right);
        assert_eq!(table.world2left_rot, expected.world2left_rot);
        assert_eq!(table.world2right_rot, expected.world2right_rot);
        assert_eq!(table.baseline, expected.baseline);
        assert_eq!(table.brown_model, expected.brown_model);
        assert_eq!(table.rect_params, expected.rect_params);
        assert_eq!(table.header.table_type, 25);
        assert_eq!(table.header.crc32, payload_checksum(&raw));
    }

    #[test]
    fn test_coefficients_requires_exact_size() {
        let raw = sample_coefficients_raw();
        assert!(CoefficientsTable::read_from(&raw[..511]).is_none());

        let mut padded = raw.clone();
        padded.push(0);
        assert!(CoefficientsTable::read_from(&padded).is_none());
    }
}
