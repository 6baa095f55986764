// SPDX-License-Identifier: MIT
//! Streaming record reader
//!
//! Decodes one record at a time from a byte source, so memory stays bounded
//! by a single record regardless of file size.

use std::io::{Read, Seek, SeekFrom};

use crate::error::FormatError;
use crate::format::Header;
use crate::record::Record;

/// Lazy, finite, forward-only sequence of records
///
/// Yields exactly `count` items unless a read fails, in which case the error
/// is yielded once and the stream ends.
pub struct RecordStream<R> {
    source: R,
    remaining: u64,
    index: u64,
    failed: bool,
}

impl<R: Read + Seek> RecordStream<R> {
    /// Position `source` at the header's data offset and stream all its records.
    pub fn open(source: R, header: &Header) -> Result<Self, FormatError> {
        Self::open_at(source, header.data_offset, u64::from(header.num_entries))
    }

    /// Stream `count` records starting at byte `offset`.
    pub fn open_at(mut source: R, offset: u64, count: u64) -> Result<Self, FormatError> {
        source.seek(SeekFrom::Start(offset))?;
        Ok(Self {
            source,
            remaining: count,
            index: 0,
            failed: false,
        })
    }
}

impl<R> RecordStream<R> {
    /// Number of records yielded so far
    pub fn position(&self) -> u64 {
        self.index
    }

    /// Number of records still to be read
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Give back the underlying source
    pub fn into_inner(self) -> R {
        self.source
    }
}

impl<R: Read> Iterator for RecordStream<R> {
    type Item = Result<Record, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 {
            return None;
        }

        match Record::read_from(&mut self.source) {
            Ok(record) => {
                self.remaining -= 1;
                self.index += 1;
                Some(Ok(record))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        // Upper bound includes a possible trailing error item.
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (0, Some(remaining))
    }
}
