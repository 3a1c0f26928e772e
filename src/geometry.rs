// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// A 2D point. Depending on context, `(x, y)` holds either
/// `(lon, lat)` degrees or projected meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Error conditions reported by the [EdgeGeometry] constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("x/y length mismatch: {x} != {y}")]
    CoordLengthMismatch { x: usize, y: usize },

    #[error("edge_start must not be empty")]
    EmptyRowIndex,

    #[error("edge_start[0] must be 0, got {0}")]
    NonZeroFirstRow(usize),

    #[error("edge_start must be non-decreasing (edge_start[{at}] = {value} < {previous})")]
    DecreasingRowIndex {
        at: usize,
        value: usize,
        previous: usize,
    },

    #[error("edge_start[{edges}] = {last} does not match the point count {points}")]
    RowIndexPointMismatch {
        edges: usize,
        last: usize,
        points: usize,
    },
}

/// Stores polyline geometry for all edges of a graph in compressed
/// sparse row (CSR) form.
///
/// The points of edge `e` lie at indices `edge_start[e]..edge_start[e + 1]`
/// inside the flat `x`/`y` arrays. `edge_start` has one entry per edge plus
/// a trailing entry equal to the total point count.
#[derive(Debug, Clone)]
pub struct EdgeGeometry {
    edge_start: Vec<usize>,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl EdgeGeometry {
    /// Constructs an edge geometry store from CSR-format arrays, validating
    /// the layout invariants.
    pub fn new(edge_start: Vec<usize>, x: Vec<f64>, y: Vec<f64>) -> Result<Self, GeometryError> {
        if x.len() != y.len() {
            return Err(GeometryError::CoordLengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        let Some(&first) = edge_start.first() else {
            return Err(GeometryError::EmptyRowIndex);
        };
        if first != 0 {
            return Err(GeometryError::NonZeroFirstRow(first));
        }
        for (i, pair) in edge_start.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(GeometryError::DecreasingRowIndex {
                    at: i + 1,
                    value: pair[1],
                    previous: pair[0],
                });
            }
        }
        let last = edge_start[edge_start.len() - 1];
        if last != x.len() {
            return Err(GeometryError::RowIndexPointMismatch {
                edges: edge_start.len() - 1,
                last,
                points: x.len(),
            });
        }

        Ok(Self { edge_start, x, y })
    }

    /// Returns the number of edges with geometry.
    pub fn edge_count(&self) -> usize {
        self.edge_start.len() - 1
    }

    /// Returns the total number of geometry points across all edges.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns `true` if the store holds no points at all.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Returns the CSR row-pointer array (length `edge_count() + 1`).
    pub fn edge_start(&self) -> &[usize] {
        &self.edge_start
    }

    /// Returns the first point index (inclusive) of edge `edge_id`.
    pub fn start_index(&self, edge_id: usize) -> usize {
        self.edge_start[edge_id]
    }

    /// Returns the point index one past the last point of edge `edge_id`.
    pub fn end_index(&self, edge_id: usize) -> usize {
        self.edge_start[edge_id + 1]
    }

    /// Returns the number of points in the given edge's polyline.
    pub fn point_count(&self, edge_id: usize) -> usize {
        self.end_index(edge_id) - self.start_index(edge_id)
    }

    /// Returns the x-coordinate at the given flat point index.
    pub fn x(&self, idx: usize) -> f64 {
        self.x[idx]
    }

    /// Returns the y-coordinate at the given flat point index.
    pub fn y(&self, idx: usize) -> f64 {
        self.y[idx]
    }

    /// Returns the point at the given flat point index.
    pub fn point(&self, idx: usize) -> Point {
        Point::new(self.x[idx], self.y[idx])
    }
}
