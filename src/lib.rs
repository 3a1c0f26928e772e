// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

pub mod attributes;
pub mod distance;
pub mod engine;
pub mod geojson;
pub mod geometry;
pub mod graph;
pub mod grid;
pub mod instructions;
pub mod osm;
pub mod projection;
pub mod query;
pub mod reconstruct;
pub mod search;
pub mod server;

pub use attributes::{AttributeError, EdgeAttributes};
pub use distance::haversine_meters;
pub use engine::{Algorithm, EngineError, Route, RoutingEngine};
pub use geometry::{EdgeGeometry, GeometryError, Point};
pub use graph::{Edge, Graph, GraphError, UNASSIGNED_EDGE_ID};
pub use grid::{Grid, GridError, SegmentSnapResult, SegmentSnapper, DEFAULT_MAX_RING};
pub use instructions::{Instruction, InstructionOptions, Maneuver};
pub use osm::{compile_buffer, compile_file, Network};
pub use projection::LocalProjection;
pub use query::{route_lat_lon, QueryError, QueryOutcome};
pub use search::{Astar, Dijkstra, Metric, SearchError, VertexStore};
