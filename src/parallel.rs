// SPDX-License-Identifier: MIT
//! Partitioned aggregation
//!
//! Splits the record range into contiguous partitions. Each partition opens
//! its own handle, decodes its byte range in order, and folds a partial box;
//! partial boxes are then merged pairwise. Because min/max is order
//! independent the result equals the sequential fold.

use std::fs::File;
use std::io::BufReader;
use std::ops::Range;
use std::path::Path;

use rayon::prelude::*;
use tracing::debug;

use crate::bbox::{BoundingBox, BoundingBoxAggregator, NanPolicy};
use crate::error::{AggregationError, Error};
use crate::format::Header;
use crate::stream::RecordStream;

/// Split `0..num_entries` into at most `partitions` contiguous, non-empty ranges.
pub fn partition_ranges(num_entries: u64, partitions: usize) -> Vec<Range<u64>> {
    let partitions = (partitions.max(1) as u64).min(num_entries);
    if partitions == 0 {
        return Vec::new();
    }

    let base = num_entries / partitions;
    let extra = num_entries % partitions;
    let mut ranges = Vec::with_capacity(partitions as usize);
    let mut start = 0;
    for i in 0..partitions {
        let len = base + u64::from(i < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// Aggregate the file at `path` over `partitions` partitions on the current rayon pool.
pub fn bounding_box(
    path: &Path,
    header: &Header,
    partitions: usize,
    policy: NanPolicy,
) -> Result<BoundingBox, Error> {
    let ranges = partition_ranges(u64::from(header.num_entries), partitions);
    if ranges.is_empty() {
        return Err(AggregationError::EmptyInput.into());
    }
    debug!(partitions = ranges.len(), "Aggregating partitions");

    // Every partition runs to completion; the error from the lowest record
    // range wins, matching the first failure of a sequential pass.
    let results: Vec<Result<BoundingBox, Error>> = ranges
        .into_par_iter()
        .map(|range| fold_range(path, header, range, policy))
        .collect();
    let partials = results.into_iter().collect::<Result<Vec<_>, Error>>()?;

    partials
        .into_iter()
        .reduce(BoundingBox::merge)
        .ok_or_else(|| AggregationError::EmptyInput.into())
}

/// Like [`bounding_box`] but on a dedicated pool of `threads` workers.
pub fn bounding_box_with_threads(
    path: &Path,
    header: &Header,
    threads: usize,
    policy: NanPolicy,
) -> Result<BoundingBox, Error> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    pool.install(|| bounding_box(path, header, threads, policy))
}

fn fold_range(
    path: &Path,
    header: &Header,
    range: Range<u64>,
    policy: NanPolicy,
) -> Result<BoundingBox, Error> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let stream = RecordStream::open_at(
        BufReader::new(file),
        header.record_offset(range.start),
        range.end - range.start,
    )?;

    let mut aggregator = BoundingBoxAggregator::starting_at(policy, range.start);
    for record in stream {
        aggregator.push(&record?)?;
    }
    Ok(aggregator.finish()?)
}
