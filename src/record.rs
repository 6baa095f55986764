// SPDX-License-Identifier: MIT
//! Record decoding
//!
//! Every field is read in layout order so the cursor lands exactly
//! [`RECORD_SIZE`] bytes after the record start. Only `abs_position` is
//! interpreted downstream; the rest is carried through as decoded.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::FormatError;
use crate::layout::RECORD_SIZE;

/// One decoded 194-byte record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub barcode: u64,
    pub barcode_id: u16,
    pub fov_id: u16,
    pub total_magnitude: f32,
    pub pixel_centroid: [u16; 2],
    pub weighted_pixel_centroid: [f32; 2],

    /// Absolute stage position `[x, y]`
    pub abs_position: [f32; 2],

    pub area: u16,
    pub pixel_trace_mean: [f32; 16],
    pub pixel_trace_std: [f32; 16],
    pub is_exact: u8,
    pub error_bit: u8,
    pub error_dir: u8,
    pub av_distance: f32,
    pub cell_id: u32,
    pub in_nucleus: u8,
    pub dist_nucleus: f64,
    pub dist_periphery: f64,
}

impl Record {
    /// Decode a record from exactly [`RECORD_SIZE`] bytes.
    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Result<Self, FormatError> {
        let mut cursor: &[u8] = bytes;
        Self::decode_fields(&mut cursor)
            .map_err(|e| FormatError::from_read(e, "record", RECORD_SIZE))
    }

    /// Read one record-width block from `reader` and decode it.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, FormatError> {
        let mut block = [0u8; RECORD_SIZE];
        reader
            .read_exact(&mut block)
            .map_err(|e| FormatError::from_read(e, "record", RECORD_SIZE))?;
        Self::decode(&block)
    }

    /// Position as an `(x, y)` pair
    #[inline]
    pub fn position(&self) -> (f32, f32) {
        (self.abs_position[0], self.abs_position[1])
    }

    fn decode_fields(cursor: &mut &[u8]) -> std::io::Result<Self> {
        let barcode = cursor.read_u64::<LittleEndian>()?;
        let barcode_id = cursor.read_u16::<LittleEndian>()?;
        let fov_id = cursor.read_u16::<LittleEndian>()?;
        let total_magnitude = cursor.read_f32::<LittleEndian>()?;

        let mut pixel_centroid = [0u16; 2];
        cursor.read_u16_into::<LittleEndian>(&mut pixel_centroid)?;
        let mut weighted_pixel_centroid = [0f32; 2];
        cursor.read_f32_into::<LittleEndian>(&mut weighted_pixel_centroid)?;
        let mut abs_position = [0f32; 2];
        cursor.read_f32_into::<LittleEndian>(&mut abs_position)?;

        let area = cursor.read_u16::<LittleEndian>()?;

        let mut pixel_trace_mean = [0f32; 16];
        cursor.read_f32_into::<LittleEndian>(&mut pixel_trace_mean)?;
        let mut pixel_trace_std = [0f32; 16];
        cursor.read_f32_into::<LittleEndian>(&mut pixel_trace_std)?;

        let is_exact = cursor.read_u8()?;
        let error_bit = cursor.read_u8()?;
        let error_dir = cursor.read_u8()?;
        let av_distance = cursor.read_f32::<LittleEndian>()?;
        let cell_id = cursor.read_u32::<LittleEndian>()?;
        let in_nucleus = cursor.read_u8()?;
        let dist_nucleus = cursor.read_f64::<LittleEndian>()?;
        let dist_periphery = cursor.read_f64::<LittleEndian>()?;

        Ok(Self {
            barcode,
            barcode_id,
            fov_id,
            total_magnitude,
            pixel_centroid,
            weighted_pixel_centroid,
            abs_position,
            area,
            pixel_trace_mean,
            pixel_trace_std,
            is_exact,
            error_bit,
            error_dir,
            av_distance,
            cell_id,
            in_nucleus,
            dist_nucleus,
            dist_periphery,
        })
    }
}
