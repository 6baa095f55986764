// SPDX-License-Identifier: MIT
//! End-to-end run: open, decode header, stream records, aggregate
//!
//! The file handle is owned by the run and dropped on every exit path,
//! including decode failures.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::{debug, info};

use crate::bbox::{aggregate, BoundingBox, NanPolicy};
use crate::config::Config;
use crate::error::{Error, FormatError};
use crate::format::{decode_header, Header};
use crate::layout::check_layout;
use crate::parallel;
use crate::stream::RecordStream;

/// Result of a successful run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub header: Header,
    pub bounding_box: BoundingBox,
}

impl Summary {
    pub fn num_entries(&self) -> u32 {
        self.header.num_entries
    }
}

/// Sequential decode and aggregation over any seekable source.
pub fn summarize<R: Read + Seek>(mut source: R, policy: NanPolicy) -> Result<Summary, Error> {
    check_layout()?;
    let header = decode_header(&mut source)?;
    let stream = RecordStream::open(source, &header)?;
    let bounding_box = aggregate(stream, policy)?;
    Ok(Summary {
        header,
        bounding_box,
    })
}

/// Open a file for reading, tagging failures with its path.
pub fn open(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Run the configured pipeline against `config.input`.
pub fn run(config: &Config) -> Result<Summary, Error> {
    config.validate()?;
    check_layout()?;

    let path = config.input.as_path();
    info!(path = %path.display(), threads = config.threads, "Starting bounding-box run");

    let file = open(path)?;
    let file_len = file.metadata().map_err(FormatError::from)?.len();
    let mut reader = BufReader::new(file);
    let header = decode_header(&mut reader)?;

    if config.check_file_size {
        header.verify_file_len(file_len)?;
    } else if header.expected_file_len() != file_len {
        debug!(
            expected = header.expected_file_len(),
            actual = file_len,
            "File length differs from header"
        );
    }

    let bounding_box = match config.threads {
        1 => {
            let stream = RecordStream::open(reader, &header)?;
            aggregate(stream, config.nan_policy)?
        }
        0 => {
            drop(reader);
            parallel::bounding_box(
                path,
                &header,
                rayon::current_num_threads(),
                config.nan_policy,
            )?
        }
        n => {
            drop(reader);
            parallel::bounding_box_with_threads(path, &header, n, config.nan_policy)?
        }
    };

    info!(
        num_entries = header.num_entries,
        min_x = bounding_box.min_x,
        max_x = bounding_box.max_x,
        min_y = bounding_box.min_y,
        max_y = bounding_box.max_y,
        "Finished bounding-box run"
    );

    Ok(Summary {
        header,
        bounding_box,
    })
}
