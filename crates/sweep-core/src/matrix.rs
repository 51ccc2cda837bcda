//! Experiment matrix enumeration
//!
//! [`enumerate`] turns [`Axes`] into the cross product
//! `{(cpu, size, benchmark) : size in sizes[cpu], benchmark in benchmarks}`.
//! The result is lazy and restartable: every call to [`Matrix::iter`] walks
//! the same points in the same order (CPU models, then sizes, then
//! benchmarks, each in declaration order).

use crate::axes::Axes;
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

/// Root of the result tree when no other is configured
pub const RESULTS_ROOT: &str = "results";

/// One combination of axis values, borrowed from the [`Axes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixPoint<'a> {
    pub cpu: &'a str,
    pub size: &'a str,
    pub benchmark: &'a str,
}

impl MatrixPoint<'_> {
    /// `results/<cpu>/<size>/<benchmark>`
    #[must_use]
    pub fn output_dir(&self) -> String {
        self.output_dir_under(RESULTS_ROOT)
    }

    /// `<root>/<cpu>/<size>/<benchmark>`, always with forward slashes
    #[must_use]
    pub fn output_dir_under(&self, root: &str) -> String {
        let root = root.trim_end_matches('/');
        format!("{root}/{}/{}/{}", self.cpu, self.size, self.benchmark)
    }

    #[must_use]
    pub fn to_axis_point(&self) -> AxisPoint {
        AxisPoint {
            cpu: self.cpu.to_string(),
            size: self.size.to_string(),
            benchmark: self.benchmark.to_string(),
        }
    }
}

/// Owned form of [`MatrixPoint`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisPoint {
    pub cpu: String,
    pub size: String,
    pub benchmark: String,
}

impl AxisPoint {
    #[must_use]
    pub fn as_point(&self) -> MatrixPoint<'_> {
        MatrixPoint {
            cpu: &self.cpu,
            size: &self.size,
            benchmark: &self.benchmark,
        }
    }
}

/// Restartable view over the cross product of some [`Axes`]
#[derive(Debug, Clone, Copy)]
pub struct Matrix<'a> {
    axes: &'a Axes,
}

/// Enumerate the experiment matrix. Pure; submits nothing.
#[must_use]
pub fn enumerate(axes: &Axes) -> Matrix<'_> {
    Matrix { axes }
}

impl<'a> Matrix<'a> {
    #[must_use]
    pub fn iter(&self) -> MatrixIter<'a> {
        MatrixIter {
            axes: self.axes,
            cpu: 0,
            size: 0,
            benchmark: 0,
            remaining: self.axes.job_count(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.axes.job_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> IntoIterator for Matrix<'a> {
    type Item = MatrixPoint<'a>;
    type IntoIter = MatrixIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &Matrix<'a> {
    type Item = MatrixPoint<'a>;
    type IntoIter = MatrixIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`Matrix::iter`]
#[derive(Debug, Clone)]
pub struct MatrixIter<'a> {
    axes: &'a Axes,
    cpu: usize,
    size: usize,
    benchmark: usize,
    remaining: usize,
}

impl<'a> Iterator for MatrixIter<'a> {
    type Item = MatrixPoint<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let axes = self.axes;
        let benchmarks = &axes.benchmarks;
        loop {
            let cpu = axes.cpus.get(self.cpu)?;
            let sizes = axes.sizes.get(cpu).map_or(&[][..], Vec::as_slice);

            if self.size >= sizes.len() || benchmarks.is_empty() {
                // CPU without sizes: nothing to emit, move on.
                self.cpu += 1;
                self.size = 0;
                self.benchmark = 0;
                continue;
            }

            let point = MatrixPoint {
                cpu,
                size: &sizes[self.size],
                benchmark: &benchmarks[self.benchmark],
            };

            self.benchmark += 1;
            if self.benchmark == benchmarks.len() {
                self.benchmark = 0;
                self.size += 1;
            }
            self.remaining = self.remaining.saturating_sub(1);
            return Some(point);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for MatrixIter<'_> {}

impl FusedIterator for MatrixIter<'_> {}
