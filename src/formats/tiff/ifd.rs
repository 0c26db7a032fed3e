//! Image File Directory (IFD) structures

use std::collections::HashMap;

use crate::io::ByteOrder;
use super::tags::field_types;

/// Represents an Image File Directory entry
///
/// The value field is kept as raw bytes: whether it holds the values
/// themselves or an offset to them depends on the field type and count,
/// and decoding it needs the file's byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Raw value field (4 bytes used for classic TIFF, 8 for BigTIFF)
    pub value: [u8; 8],
}

impl IFDEntry {
    /// Creates a new IFD entry
    pub fn new(tag: u16, field_type: u16, count: u64, value: [u8; 8]) -> Self {
        Self {
            tag,
            field_type,
            count,
            value,
        }
    }

    /// Returns the size in bytes of one value, or `None` for an unknown field type
    pub fn field_type_size(&self) -> Option<usize> {
        field_types::size_of(self.field_type)
    }

    /// Total size in bytes of all values, or `None` if unknown or overflowing
    pub fn byte_len(&self) -> Option<u64> {
        (self.field_type_size()? as u64).checked_mul(self.count)
    }

    /// Returns whether the values are stored inline in the value field
    pub fn is_inline(&self, is_big_tiff: bool) -> bool {
        let inline_size = if is_big_tiff { 8 } else { 4 };
        matches!(self.byte_len(), Some(len) if len <= inline_size)
    }

    /// Interprets the value field as an offset into the file
    pub fn value_offset(&self, byte_order: ByteOrder, is_big_tiff: bool) -> u64 {
        if is_big_tiff {
            byte_order.u64_from(self.value)
        } else {
            byte_order.u32_from([self.value[0], self.value[1], self.value[2], self.value[3]]) as u64
        }
    }
}

/// Represents an Image File Directory
#[derive(Debug, Clone)]
pub struct IFD {
    /// Offset to this IFD in file
    pub offset: u64,
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
    /// Offset of the next IFD (0 terminates the chain)
    pub next_ifd_offset: u64,
    /// Tag map for quick lookup
    tag_map: HashMap<u16, usize>,
}

impl IFD {
    /// Creates a new IFD
    pub fn new(offset: u64) -> Self {
        Self {
            offset,
            entries: Vec::new(),
            next_ifd_offset: 0,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry to this IFD
    ///
    /// A repeated tag replaces the lookup for the earlier one.
    pub fn add_entry(&mut self, entry: IFDEntry) {
        let index = self.entries.len();
        self.tag_map.insert(entry.tag, index);
        self.entries.push(entry);
    }

    /// Gets an entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag).and_then(|&idx| self.entries.get(idx))
    }

    /// Returns whether the tag is present
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Returns number of entries
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}
