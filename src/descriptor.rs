// SPDX-License-Identifier: MIT
//! Reserved-region layout descriptor
//!
//! Files from the acquisition pipeline store an ASCII description of the
//! record layout in the reserved region: comma-separated triples of
//! `name,1 N,type`, padded to the fixed region length. The bounding-box path
//! never reads it; it is only used to inspect files.

use std::io::{Read, Seek, SeekFrom};

use thiserror::Error;

use crate::error::FormatError;
use crate::format::{Header, HEADER_FIXED_SIZE};
use crate::layout::{Field, FieldType};

#[derive(Debug, Error, PartialEq)]
pub enum DescriptorError {
    #[error("Descriptor is not valid UTF-8")]
    NotUtf8,

    #[error("Descriptor has {0} tokens, expected a multiple of 3")]
    Malformed(usize),

    #[error("Invalid element count {count:?} for field {field}")]
    InvalidCount { field: String, count: String },

    #[error("Unknown element type {ty:?} for field {field}")]
    UnknownType { field: String, ty: String },
}

/// One field as described by the writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorField {
    pub name: String,
    pub count: usize,
    pub ty: FieldType,
}

/// Parsed reserved-region descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDescriptor {
    pub fields: Vec<DescriptorField>,
}

impl LayoutDescriptor {
    /// Parse descriptor bytes, ignoring trailing NUL and whitespace padding.
    pub fn parse(bytes: &[u8]) -> Result<Self, DescriptorError> {
        let text = std::str::from_utf8(bytes).map_err(|_| DescriptorError::NotUtf8)?;
        let text = text.trim_end_matches(|c: char| c == '\0' || c.is_whitespace());
        if text.is_empty() {
            return Ok(Self { fields: Vec::new() });
        }

        let tokens: Vec<&str> = text.split(',').map(str::trim).collect();
        if tokens.len() % 3 != 0 {
            return Err(DescriptorError::Malformed(tokens.len()));
        }

        let fields = tokens
            .chunks_exact(3)
            .map(|triple| parse_field(triple[0], triple[1], triple[2]))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }

    /// Record width implied by the descriptor
    pub fn record_size(&self) -> usize {
        self.fields.iter().map(|f| f.ty.width() * f.count).sum()
    }

    /// Whether the descriptor agrees with a static field table in order, name and width.
    pub fn matches_layout(&self, layout: &[Field]) -> bool {
        self.fields.len() == layout.len()
            && self.fields.iter().zip(layout).all(|(d, f)| {
                d.name == f.name && d.count == f.count && d.ty.width() == f.ty.width()
            })
    }
}

fn parse_field(name: &str, count: &str, ty: &str) -> Result<DescriptorField, DescriptorError> {
    // The count is written as a MATLAB size, e.g. "1 16"; the last dimension is the length.
    let parsed_count = count
        .split_whitespace()
        .last()
        .and_then(|n| n.parse::<usize>().ok())
        .ok_or_else(|| DescriptorError::InvalidCount {
            field: name.to_string(),
            count: count.to_string(),
        })?;

    let parsed_ty = match ty {
        "uint8" | "char" | "bool" => FieldType::U8,
        "uint16" => FieldType::U16,
        "uint32" => FieldType::U32,
        "uint64" => FieldType::U64,
        "int8" => FieldType::I8,
        "int16" => FieldType::I16,
        "int32" => FieldType::I32,
        "int64" => FieldType::I64,
        "single" | "float" => FieldType::F32,
        "double" => FieldType::F64,
        _ => {
            return Err(DescriptorError::UnknownType {
                field: name.to_string(),
                ty: ty.to_string(),
            })
        }
    };

    Ok(DescriptorField {
        name: name.to_string(),
        count: parsed_count,
        ty: parsed_ty,
    })
}

/// Read the raw reserved region of a validated header.
///
/// Leaves the source positioned at the header's data offset.
pub fn read_reserved_region<R: Read + Seek>(
    source: &mut R,
    header: &Header,
) -> Result<Vec<u8>, FormatError> {
    let len = header.header_reserved_length as usize;
    source.seek(SeekFrom::Start(HEADER_FIXED_SIZE))?;
    let mut region = vec![0u8; len];
    source
        .read_exact(&mut region)
        .map_err(|e| FormatError::from_read(e, "reserved region", len))?;
    Ok(region)
}

/// Read and parse the descriptor stored in the reserved region.
pub fn read_descriptor<R: Read + Seek>(
    source: &mut R,
    header: &Header,
) -> Result<LayoutDescriptor, crate::error::Error> {
    let region = read_reserved_region(source, header)?;
    Ok(LayoutDescriptor::parse(&region)?)
}
