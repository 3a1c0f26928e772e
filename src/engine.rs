// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::attributes::EdgeAttributes;
use crate::graph::{Graph, GraphError};
use crate::search::{Astar, Dijkstra, Metric, SearchError, VertexStore};

/// The shortest-path driver used to answer a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Dijkstra's algorithm - single-source, runs to completion.
    Dijkstra,
    /// A* search - point-to-point, guided by a coordinate heuristic.
    AStar,
}

/// The result of a routing computation.
#[derive(Debug, Clone)]
pub struct Route {
    /// `true` if a path from start to goal exists.
    pub found: bool,
    pub start_vertex: usize,
    pub goal_vertex: usize,
    pub metric: Metric,
    pub algorithm: Algorithm,
    /// Total cost (meters or seconds, depending on the metric);
    /// infinity when no path was found.
    pub total_cost: f64,
    /// Edge ids in traversal order; empty when no path was found
    /// or when start equals goal.
    pub edge_ids: Vec<usize>,
}

/// Error conditions reported by [RoutingEngine].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("attribute store tracks {attrs} edges but the graph has {edges}")]
    AttributeCountMismatch { attrs: usize, edges: usize },

    #[error("a* routing requires a vertex store")]
    MissingVertexStore,

    #[error("time a* routing requires vmax > 0, got {0}")]
    NonPositiveVmax(f64),
}

/// Computes shortest-path routes over a compiled graph, under any of the
/// four `{distance, time} x {dijkstra, a*}` combinations.
///
/// The engine borrows the compiled, read-only network state; per-query
/// scratch (the search arrays) is allocated on each call.
#[derive(Debug)]
pub struct RoutingEngine<'a> {
    graph: &'a Graph,
    attrs: &'a EdgeAttributes,
    vertex_store: Option<&'a VertexStore>,
    vmax_mps: f64,
}

impl<'a> RoutingEngine<'a> {
    /// Creates an engine for Dijkstra-only routing. The A* entry points
    /// will fail with [EngineError::MissingVertexStore].
    pub fn new(graph: &'a Graph, attrs: &'a EdgeAttributes) -> Result<Self, EngineError> {
        Self::build(graph, attrs, None, 0.0)
    }

    /// Creates an engine with full A* support.
    ///
    /// `vmax_mps` is the maximum traversal speed used by the time
    /// heuristic; it is ignored by distance queries.
    pub fn with_vertex_store(
        graph: &'a Graph,
        attrs: &'a EdgeAttributes,
        vertex_store: &'a VertexStore,
        vmax_mps: f64,
    ) -> Result<Self, EngineError> {
        Self::build(graph, attrs, Some(vertex_store), vmax_mps)
    }

    fn build(
        graph: &'a Graph,
        attrs: &'a EdgeAttributes,
        vertex_store: Option<&'a VertexStore>,
        vmax_mps: f64,
    ) -> Result<Self, EngineError> {
        if attrs.edge_count() < graph.edge_count() {
            return Err(EngineError::AttributeCountMismatch {
                attrs: attrs.edge_count(),
                edges: graph.edge_count(),
            });
        }
        if let Some(vs) = vertex_store {
            if vs.vertex_count() != graph.vertex_count() {
                return Err(SearchError::StoreSizeMismatch {
                    store: vs.vertex_count(),
                    graph: graph.vertex_count(),
                }
                .into());
            }
        }
        Ok(Self {
            graph,
            attrs,
            vertex_store,
            vmax_mps,
        })
    }

    /// Shortest-distance route using Dijkstra's algorithm.
    pub fn route_distance_dijkstra(&self, start: usize, goal: usize) -> Result<Route, EngineError> {
        self.route(start, goal, Metric::Distance, Algorithm::Dijkstra)
    }

    /// Shortest-time route using Dijkstra's algorithm.
    pub fn route_time_dijkstra(&self, start: usize, goal: usize) -> Result<Route, EngineError> {
        self.route(start, goal, Metric::Time, Algorithm::Dijkstra)
    }

    /// Shortest-distance route using A* search.
    pub fn route_distance_astar(&self, start: usize, goal: usize) -> Result<Route, EngineError> {
        self.route(start, goal, Metric::Distance, Algorithm::AStar)
    }

    /// Shortest-time route using A* search.
    pub fn route_time_astar(&self, start: usize, goal: usize) -> Result<Route, EngineError> {
        self.route(start, goal, Metric::Time, Algorithm::AStar)
    }

    /// Core routing method dispatching to the selected driver.
    pub fn route(
        &self,
        start: usize,
        goal: usize,
        metric: Metric,
        algorithm: Algorithm,
    ) -> Result<Route, EngineError> {
        let vertices = self.graph.vertex_count();
        for v in [start, goal] {
            if v >= vertices {
                return Err(GraphError::VertexOutOfRange {
                    vertex: v,
                    vertices,
                }
                .into());
            }
        }

        if start == goal {
            return Ok(Route {
                found: true,
                start_vertex: start,
                goal_vertex: goal,
                metric,
                algorithm,
                total_cost: 0.0,
                edge_ids: Vec::new(),
            });
        }

        let (found, total_cost, edge_ids) = match algorithm {
            Algorithm::Dijkstra => {
                let sp = Dijkstra::new(self.graph, self.attrs, metric, start)?;
                let found = sp.has_path_to(goal)?;
                let cost = sp.dist_to(goal)?;
                let path = if found {
                    sp.path_edge_ids_to(goal)?
                } else {
                    Vec::new()
                };
                (found, cost, path)
            }

            Algorithm::AStar => {
                let vs = self.vertex_store.ok_or(EngineError::MissingVertexStore)?;
                if metric == Metric::Time && !(self.vmax_mps > 0.0) {
                    return Err(EngineError::NonPositiveVmax(self.vmax_mps));
                }
                // For distance queries the euclidean heuristic needs no
                // speed bound; 1.0 is passed as a never-consulted filler.
                let vmax = match metric {
                    Metric::Time => self.vmax_mps,
                    Metric::Distance => 1.0,
                };

                let sp = Astar::new(self.graph, self.attrs, vs, metric, start, goal, vmax)?;
                let found = sp.has_path_to_goal();
                let path = if found {
                    sp.path_edge_ids_to_goal()?
                } else {
                    Vec::new()
                };
                (found, sp.cost_to_goal(), path)
            }
        };

        Ok(Route {
            found,
            start_vertex: start,
            goal_vertex: goal,
            metric,
            algorithm,
            total_cost,
            edge_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Graph, EdgeAttributes, VertexStore) {
        let mut g = Graph::new(3);
        let mut attrs = EdgeAttributes::new();

        let e01 = g.add(0, 1, 0.0).unwrap();
        let e12 = g.add(1, 2, 0.0).unwrap();
        let e02 = g.add(0, 2, 0.0).unwrap();
        attrs.set_edge_count(g.edge_count());

        attrs.set_distance_meters(e01, 5.0).unwrap();
        attrs.set_time_seconds(e01, 5.0).unwrap();
        attrs.set_distance_meters(e12, 5.0).unwrap();
        attrs.set_time_seconds(e12, 5.0).unwrap();
        attrs.set_distance_meters(e02, 9.0).unwrap();
        attrs.set_time_seconds(e02, 20.0).unwrap();

        let vs = VertexStore::new(vec![0.0, 5.0, 10.0], vec![0.0; 3]).unwrap();
        (g, attrs, vs)
    }

    #[test]
    fn four_combinations_on_the_triangle() {
        let (g, attrs, vs) = triangle();
        let engine = RoutingEngine::with_vertex_store(&g, &attrs, &vs, 10.0).unwrap();

        let r = engine.route_distance_dijkstra(0, 2).unwrap();
        assert!(r.found);
        assert!((r.total_cost - 9.0).abs() < 1e-9);
        assert_eq!(r.edge_ids, vec![2]);

        let r = engine.route_time_dijkstra(0, 2).unwrap();
        assert!((r.total_cost - 10.0).abs() < 1e-9);
        assert_eq!(r.edge_ids, vec![0, 1]);

        let r = engine.route_distance_astar(0, 2).unwrap();
        assert!((r.total_cost - 9.0).abs() < 1e-9);

        let r = engine.route_time_astar(0, 2).unwrap();
        assert!((r.total_cost - 10.0).abs() < 1e-9);
    }

    #[test]
    fn same_start_and_goal_is_trivially_found() {
        let (g, attrs, _) = triangle();
        let engine = RoutingEngine::new(&g, &attrs).unwrap();

        let r = engine.route_distance_dijkstra(1, 1).unwrap();
        assert!(r.found);
        assert_eq!(r.total_cost, 0.0);
        assert!(r.edge_ids.is_empty());
    }

    #[test]
    fn astar_without_store_fails() {
        let (g, attrs, _) = triangle();
        let engine = RoutingEngine::new(&g, &attrs).unwrap();
        assert_eq!(
            engine.route_distance_astar(0, 2).unwrap_err(),
            EngineError::MissingVertexStore,
        );
    }

    #[test]
    fn time_astar_requires_positive_vmax() {
        let (g, attrs, vs) = triangle();
        let engine = RoutingEngine::with_vertex_store(&g, &attrs, &vs, 0.0).unwrap();
        assert_eq!(
            engine.route_time_astar(0, 2).unwrap_err(),
            EngineError::NonPositiveVmax(0.0),
        );
        // Distance A* is unaffected by the zero vmax.
        assert!(engine.route_distance_astar(0, 2).unwrap().found);
    }

    #[test]
    fn attribute_count_must_cover_graph() {
        let mut g = Graph::new(2);
        g.add(0, 1, 0.0).unwrap();
        let attrs = EdgeAttributes::new();
        assert_eq!(
            RoutingEngine::new(&g, &attrs).unwrap_err(),
            EngineError::AttributeCountMismatch { attrs: 0, edges: 1 },
        );
    }

    #[test]
    fn no_path_reported_as_not_found() {
        let mut g = Graph::new(2);
        let mut attrs = EdgeAttributes::new();
        g.add(1, 0, 0.0).unwrap();
        attrs.set_edge_count(1);
        attrs.set_distance_meters(0, 1.0).unwrap();

        let engine = RoutingEngine::new(&g, &attrs).unwrap();
        let r = engine.route_distance_dijkstra(0, 1).unwrap();
        assert!(!r.found);
        assert_eq!(r.total_cost, f64::INFINITY);
        assert!(r.edge_ids.is_empty());
    }
}
