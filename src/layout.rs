// SPDX-License-Identifier: MIT
//! Packed record layout
//!
//! The external writer emits records as a packed struct with no alignment
//! padding. This table is the single source of truth for field order and
//! widths; offsets are derived from it, never stored.

use crate::error::FormatError;

/// Encoded width of one record in bytes
pub const RECORD_SIZE: usize = 194;

/// Scalar element type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl FieldType {
    /// Width of one element in bytes
    pub const fn width(self) -> usize {
        match self {
            FieldType::U8 | FieldType::I8 => 1,
            FieldType::U16 | FieldType::I16 => 2,
            FieldType::U32 | FieldType::I32 | FieldType::F32 => 4,
            FieldType::U64 | FieldType::I64 | FieldType::F64 => 8,
        }
    }

    /// Name used by the writer's layout descriptor
    pub fn name(self) -> &'static str {
        match self {
            FieldType::U8 => "uint8",
            FieldType::U16 => "uint16",
            FieldType::U32 => "uint32",
            FieldType::U64 => "uint64",
            FieldType::I8 => "int8",
            FieldType::I16 => "int16",
            FieldType::I32 => "int32",
            FieldType::I64 => "int64",
            FieldType::F32 => "single",
            FieldType::F64 => "double",
        }
    }
}

/// One field of the record: `count` consecutive elements of `ty`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    pub count: usize,
}

impl Field {
    const fn new(name: &'static str, ty: FieldType, count: usize) -> Self {
        Self { name, ty, count }
    }

    /// Encoded width of the whole field
    pub const fn width(&self) -> usize {
        self.ty.width() * self.count
    }
}

/// Record fields in file order
pub const RECORD_FIELDS: &[Field] = &[
    Field::new("barcode", FieldType::U64, 1),
    Field::new("barcode_id", FieldType::U16, 1),
    Field::new("fov_id", FieldType::U16, 1),
    Field::new("total_magnitude", FieldType::F32, 1),
    Field::new("pixel_centroid", FieldType::U16, 2),
    Field::new("weighted_pixel_centroid", FieldType::F32, 2),
    Field::new("abs_position", FieldType::F32, 2),
    Field::new("area", FieldType::U16, 1),
    Field::new("pixel_trace_mean", FieldType::F32, 16),
    Field::new("pixel_trace_std", FieldType::F32, 16),
    Field::new("is_exact", FieldType::U8, 1),
    Field::new("error_bit", FieldType::U8, 1),
    Field::new("error_dir", FieldType::U8, 1),
    Field::new("av_distance", FieldType::F32, 1),
    Field::new("cellID", FieldType::U32, 1),
    Field::new("inNucleus", FieldType::U8, 1),
    Field::new("distNucleus", FieldType::F64, 1),
    Field::new("distPeriphery", FieldType::F64, 1),
];

/// Sum of field widths, with no padding between fields
pub const fn layout_width(fields: &[Field]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < fields.len() {
        total += fields[i].width();
        i += 1;
    }
    total
}

const _: () = assert!(
    layout_width(RECORD_FIELDS) == RECORD_SIZE,
    "record layout must be exactly RECORD_SIZE bytes"
);

/// Verify a field table against [`RECORD_SIZE`].
pub fn check_layout_width(fields: &[Field]) -> Result<(), FormatError> {
    let actual = layout_width(fields);
    if actual != RECORD_SIZE {
        return Err(FormatError::LayoutSizeMismatch {
            expected: RECORD_SIZE,
            actual,
        });
    }
    Ok(())
}

/// Startup precondition: the static record layout is 194 bytes wide.
pub fn check_layout() -> Result<(), FormatError> {
    check_layout_width(RECORD_FIELDS)
}

/// Fields paired with their byte offset inside a record
pub fn field_offsets() -> impl Iterator<Item = (usize, &'static Field)> {
    RECORD_FIELDS.iter().scan(0usize, |offset, field| {
        let start = *offset;
        *offset += field.width();
        Some((start, field))
    })
}

/// Byte offset of a named field
pub fn offset_of(name: &str) -> Option<usize> {
    field_offsets()
        .find(|(_, field)| field.name == name)
        .map(|(offset, _)| offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_layout_is_194_bytes() {
        assert_eq!(layout_width(RECORD_FIELDS), 194);
        assert!(check_layout().is_ok());
    }

    #[test]
    fn test_padding_is_detected() {
        let mut fields = RECORD_FIELDS.to_vec();
        // Natural alignment would move `pixel_trace_mean` (f32 at 38) to 40.
        fields.insert(8, Field::new("padding", FieldType::U8, 2));

        let err = check_layout_width(&fields).unwrap_err();
        assert!(matches!(
            err,
            FormatError::LayoutSizeMismatch {
                expected: 194,
                actual: 196
            }
        ));
    }

    #[test]
    fn test_known_offsets() {
        assert_eq!(offset_of("barcode"), Some(0));
        assert_eq!(offset_of("total_magnitude"), Some(12));
        assert_eq!(offset_of("abs_position"), Some(28));
        assert_eq!(offset_of("area"), Some(36));
        assert_eq!(offset_of("pixel_trace_std"), Some(102));
        assert_eq!(offset_of("av_distance"), Some(169));
        assert_eq!(offset_of("distPeriphery"), Some(186));
        assert_eq!(offset_of("missing"), None);
    }

    #[test]
    fn test_last_field_ends_at_record_size() {
        let (offset, field) = field_offsets().last().unwrap();
        assert_eq!(offset + field.width(), RECORD_SIZE);
    }
}
