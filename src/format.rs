// SPDX-License-Identifier: MIT
//! MERFISH binary header
//!
//! ```text
//! Offset  Size  Field                   Constraint
//! 0       1     version                 must be 1
//! 1       1     is_corrupt              must be 0
//! 2       4     num_entries             u32, little-endian
//! 6       4     header_reserved_length  must be 429
//! 10      429   reserved region         skipped
//! 439     ...   records                 194 bytes each
//! ```

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use crate::error::FormatError;
use crate::layout::RECORD_SIZE;

/// The only header version this reader understands
pub const SUPPORTED_VERSION: u8 = 1;

/// Required length of the reserved region
pub const HEADER_RESERVED_LENGTH: u32 = 429;

/// Size of the fixed header fields preceding the reserved region
pub const HEADER_FIXED_SIZE: u64 = 10;

/// Offset of the first record in every valid file
pub const DATA_OFFSET: u64 = HEADER_FIXED_SIZE + HEADER_RESERVED_LENGTH as u64;

/// Validated file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub is_corrupt: u8,

    /// Number of records following the header
    pub num_entries: u32,

    pub header_reserved_length: u32,

    /// Byte offset of the first record, known only after validation
    pub data_offset: u64,
}

impl Header {
    /// Total file length implied by the header
    pub fn expected_file_len(&self) -> u64 {
        self.data_offset + RECORD_SIZE as u64 * u64::from(self.num_entries)
    }

    /// Compare the implied file length with the real one.
    pub fn verify_file_len(&self, actual: u64) -> Result<(), FormatError> {
        let expected = self.expected_file_len();
        if expected != actual {
            return Err(FormatError::FileSizeMismatch { expected, actual });
        }
        Ok(())
    }

    /// Offset of the record at `index`
    #[inline]
    pub fn record_offset(&self, index: u64) -> u64 {
        self.data_offset + RECORD_SIZE as u64 * index
    }
}

/// Read and validate the header from a source positioned at file start.
///
/// Validation runs in file order (version, corruption flag, reserved length)
/// and stops at the first failure. On success the source is left at
/// `data_offset`.
pub fn decode_header<R: Read + Seek>(source: &mut R) -> Result<Header, FormatError> {
    let version = source
        .read_u8()
        .map_err(|e| FormatError::from_read(e, "version", 1))?;
    if version != SUPPORTED_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }

    let is_corrupt = source
        .read_u8()
        .map_err(|e| FormatError::from_read(e, "is_corrupt", 1))?;
    if is_corrupt != 0 {
        return Err(FormatError::CorruptFile(is_corrupt));
    }

    let num_entries = source
        .read_u32::<LittleEndian>()
        .map_err(|e| FormatError::from_read(e, "num_entries", 4))?;

    let header_reserved_length = source
        .read_u32::<LittleEndian>()
        .map_err(|e| FormatError::from_read(e, "header_reserved_length", 4))?;
    if header_reserved_length != HEADER_RESERVED_LENGTH {
        return Err(FormatError::UnexpectedHeaderLength(header_reserved_length));
    }

    source.seek(SeekFrom::Current(i64::from(header_reserved_length)))?;
    let data_offset = source.stream_position()?;

    debug!(
        version,
        num_entries,
        header_reserved_length,
        data_offset,
        "Decoded header"
    );

    Ok(Header {
        version,
        is_corrupt,
        num_entries,
        header_reserved_length,
        data_offset,
    })
}
