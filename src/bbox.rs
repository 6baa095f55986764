// SPDX-License-Identifier: MIT
//! Bounding-box aggregation over record positions
//!
//! The fold is a running min/max, so it is commutative and associative:
//! partial boxes over disjoint record ranges combine with [`BoundingBox::merge`]
//! into the same result as one sequential pass.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AggregationError, Error, FormatError};
use crate::record::Record;

/// What to do when a position coordinate is NaN
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum NanPolicy {
    /// Fold with IEEE min/max and flag the box as unreliable
    #[default]
    Propagate,
    /// Abort on the first NaN coordinate
    Reject,
}

/// Axis-aligned box around every folded position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,

    /// Set when any folded coordinate was NaN; the bounds are then unreliable
    pub nan_seen: bool,
}

impl BoundingBox {
    /// Degenerate box around a single point
    pub fn from_point(x: f32, y: f32) -> Self {
        Self {
            min_x: x,
            max_x: x,
            min_y: y,
            max_y: y,
            nan_seen: x.is_nan() || y.is_nan(),
        }
    }

    /// Grow the box to include `(x, y)`.
    #[inline]
    pub fn include(&mut self, x: f32, y: f32) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
        self.nan_seen |= x.is_nan() || y.is_nan();
    }

    /// Combine two partial boxes.
    pub fn merge(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
            nan_seen: self.nan_seen || other.nan_seen,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Fold one record into an optional running box.
pub fn fold(state: Option<BoundingBox>, record: &Record) -> BoundingBox {
    let (x, y) = record.position();
    match state {
        None => BoundingBox::from_point(x, y),
        Some(mut bbox) => {
            bbox.include(x, y);
            bbox
        }
    }
}

/// Stateful aggregator applying a [`NanPolicy`]
#[derive(Debug, Clone)]
pub struct BoundingBoxAggregator {
    state: Option<BoundingBox>,
    policy: NanPolicy,
    next_index: u64,
}

impl BoundingBoxAggregator {
    pub fn new(policy: NanPolicy) -> Self {
        Self::starting_at(policy, 0)
    }

    /// Aggregator whose first record has file index `first_index`
    ///
    /// Used by partitions so NaN errors report the record's global index.
    pub fn starting_at(policy: NanPolicy, first_index: u64) -> Self {
        Self {
            state: None,
            policy,
            next_index: first_index,
        }
    }

    /// Fold in one record.
    pub fn push(&mut self, record: &Record) -> Result<(), AggregationError> {
        let (x, y) = record.position();
        self.push_position(x, y)
    }

    /// Fold in a bare position.
    pub fn push_position(&mut self, x: f32, y: f32) -> Result<(), AggregationError> {
        let index = self.next_index;
        self.next_index += 1;

        if x.is_nan() || y.is_nan() {
            match self.policy {
                NanPolicy::Reject => return Err(AggregationError::NanPosition { index }),
                NanPolicy::Propagate => {
                    if !self.state.is_some_and(|b| b.nan_seen) {
                        warn!(index, "NaN position observed; bounding box is unreliable");
                    }
                }
            }
        }

        self.state = Some(match self.state {
            None => BoundingBox::from_point(x, y),
            Some(mut bbox) => {
                bbox.include(x, y);
                bbox
            }
        });
        Ok(())
    }

    /// Current partial box, if any record has been folded
    pub fn current(&self) -> Option<BoundingBox> {
        self.state
    }

    /// Finalize; fails on an empty input rather than returning a zeroed box.
    pub fn finish(self) -> Result<BoundingBox, AggregationError> {
        self.state.ok_or(AggregationError::EmptyInput)
    }
}

/// Aggregate a fallible record stream into a bounding box.
///
/// Decode errors abort immediately; no partial box is returned.
pub fn aggregate<I>(records: I, policy: NanPolicy) -> Result<BoundingBox, Error>
where
    I: IntoIterator<Item = Result<Record, FormatError>>,
{
    let mut aggregator = BoundingBoxAggregator::new(policy);
    for record in records {
        aggregator.push(&record?)?;
    }
    Ok(aggregator.finish()?)
}
