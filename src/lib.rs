// SPDX-License-Identifier: MIT
//! # MERFISH Binary Bounding Box
//!
//! Streaming decoder for MERFISH barcode files and an aggregator that computes
//! the axis-aligned bounding box of every record's absolute position.
//!
//! ## Format Overview
//!
//! The files are produced by an external acquisition pipeline. This crate only
//! reads them, and only version 1.
//!
//! ```text
//! MERFISH barcode file, version 1
//! ===============================
//!
//! Header (439 bytes, little-endian):
//! - Version: 1 (1 byte)
//! - Corrupt flag: 0 (1 byte)
//! - Entry count (4 bytes)
//! - Reserved length: 429 (4 bytes)
//! - Reserved region: layout descriptor text (429 bytes)
//!
//! Records (194 bytes each, packed, entry count times):
//! - barcode u64, barcode_id u16, fov_id u16, total_magnitude f32
//! - pixel_centroid [u16; 2], weighted_pixel_centroid [f32; 2]
//! - abs_position [f32; 2], area u16
//! - pixel_trace_mean [f32; 16], pixel_trace_std [f32; 16]
//! - is_exact u8, error_bit u8, error_dir u8, av_distance f32
//! - cellID u32, inNucleus u8, distNucleus f64, distPeriphery f64
//! ```
//!
//! ## Pipeline
//!
//! byte source → [`decode_header`] → [`RecordStream`] → [`BoundingBoxAggregator`]
//! → [`BoundingBox`]
//!
//! Records are decoded one at a time, so memory use does not grow with the
//! file. Large files can be split into partitions and aggregated on a rayon
//! pool (see [`parallel`]); partial boxes merge to the same result.
//!
//! ## Usage
//!
//! ```no_run
//! use merfish_bbox::{Config, pipeline};
//!
//! let config = Config {
//!     input: "a.bin".into(),
//!     ..Config::default()
//! };
//! let summary = pipeline::run(&config).unwrap();
//! println!("{}", merfish_bbox::report::render_text(&summary));
//! ```

pub mod bbox;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod format;
pub mod layout;
pub mod parallel;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod stream;

// Re-export main types
pub use bbox::{aggregate, fold, BoundingBox, BoundingBoxAggregator, NanPolicy};
pub use config::{Config, ConfigError, OutputFormat};
pub use descriptor::{DescriptorError, LayoutDescriptor};
pub use error::{AggregationError, Error, FormatError};
pub use format::{decode_header, Header, DATA_OFFSET, HEADER_RESERVED_LENGTH};
pub use layout::{check_layout, RECORD_SIZE};
pub use pipeline::Summary;
pub use record::Record;
pub use stream::RecordStream;
