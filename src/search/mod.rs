// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::attributes::{AttributeError, EdgeAttributes};
use crate::graph::GraphError;

mod astar;
mod dijkstra;
mod pq;

pub use astar::Astar;
pub use dijkstra::Dijkstra;
pub use pq::IndexMinPq;

/// The quantity minimized by a shortest-path search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Minimize distance traveled, in meters.
    Distance,
    /// Minimize travel time, in seconds.
    Time,
}

/// Error conditions which may occur when preparing or running a
/// shortest-path search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error("x/y arrays must have the same length ({x} != {y})")]
    CoordLengthMismatch { x: usize, y: usize },

    #[error("vertex store holds {store} vertices but the graph has {graph}")]
    StoreSizeMismatch { store: usize, graph: usize },

    #[error("vmax must be positive for the time heuristic, got {0}")]
    NonPositiveVmax(f64),

    /// Internal inconsistency: a vertex is reachable yet carries the
    /// parent-edge sentinel. Indicates a bug in the relaxation loop.
    #[error("vertex {0} is reachable but has no parent edge")]
    MissingParentEdge(usize),
}

/// Projected x/y coordinates for each vertex, consumed by the
/// [Astar] heuristic. The store length must equal the graph's
/// vertex count.
#[derive(Debug, Clone)]
pub struct VertexStore {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl VertexStore {
    /// Creates a vertex store from parallel coordinate arrays
    /// of equal length.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, SearchError> {
        if x.len() != y.len() {
            return Err(SearchError::CoordLengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        Ok(Self { x, y })
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.x.len()
    }

    /// Returns the x-coordinate of vertex `v`.
    pub fn x(&self, v: usize) -> f64 {
        self.x[v]
    }

    /// Returns the y-coordinate of vertex `v`.
    pub fn y(&self, v: usize) -> f64 {
        self.y[v]
    }
}

/// Cost of traversing edge `id` under the selected metric.
pub(crate) fn edge_cost(
    attrs: &EdgeAttributes,
    metric: Metric,
    id: usize,
) -> Result<f64, AttributeError> {
    match metric {
        Metric::Distance => attrs.distance_meters(id),
        Metric::Time => attrs.time_seconds(id),
    }
}
