//! Container header and descriptor-table parsing.
//!
//! Record contents are not validated beyond structural size: offsets and
//! sizes are taken at face value, and directory conventions are applied
//! later by the tree builder.

use crate::store::Store;

use super::error::{WadError, WadResult};
use super::lump::{self, Lump, DESCRIPTOR_LEN, HEADER_LEN, NAME_LEN};

/// Parsed container header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Opaque 4-byte identifier, kept verbatim.
    pub magic: [u8; 4],
    /// Number of descriptor records.
    pub count: u32,
    /// Byte offset of the descriptor table. Doubles as the append cursor
    /// for new file data.
    pub table_offset: u32,
}

/// Read the 12-byte header at the start of the store.
pub fn read_header<S: Store>(store: &S) -> WadResult<Header> {
    let mut buf = [0u8; HEADER_LEN];
    if store.read_at(&mut buf, 0)? < buf.len() {
        return Err(WadError::Truncated);
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&buf[0..4]);

    Ok(Header {
        magic,
        count: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
        table_offset: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
    })
}

/// Read the descriptor table in on-disk order.
///
/// Records are read one at a time so a bogus count fails with
/// [`WadError::Truncated`] instead of a huge allocation.
pub fn read_table<S: Store>(store: &S, header: &Header) -> WadResult<Vec<Lump>> {
    let mut lumps = Vec::with_capacity(header.count.min(1 << 16) as usize);
    let mut record = [0u8; DESCRIPTOR_LEN];

    for i in 0..header.count as u64 {
        let at = header.table_offset as u64 + i * DESCRIPTOR_LEN as u64;
        if store.read_at(&mut record, at)? < record.len() {
            return Err(WadError::Truncated);
        }

        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&record[8..16]);

        lumps.push(Lump {
            offset: u32::from_le_bytes(record[0..4].try_into().unwrap()),
            size: u32::from_le_bytes(record[4..8].try_into().unwrap()),
            name: lump::decode_name(&name),
        });
    }

    Ok(lumps)
}
