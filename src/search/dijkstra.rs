// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::attributes::EdgeAttributes;
use crate::graph::{Graph, GraphError, UNASSIGNED_EDGE_ID};

use super::pq::IndexMinPq;
use super::{edge_cost, Metric, SearchError};

/// Single-source shortest paths over a [Graph] using
/// [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm).
///
/// The search runs to completion on construction, relaxing edges with an
/// [IndexMinPq] keyed by vertex. Costs are taken from the attribute columns
/// selected by the [Metric]; the graph's own edge weights are not consulted.
///
/// Complexity is `O((V + E) log V)`.
pub struct Dijkstra<'a> {
    g: &'a Graph,
    dist_to: Vec<f64>,
    parent_edge: Vec<i64>,
    s: usize,
}

impl<'a> Dijkstra<'a> {
    /// Computes shortest paths from the source vertex `s` to every
    /// reachable vertex.
    pub fn new(
        g: &'a Graph,
        attrs: &EdgeAttributes,
        metric: Metric,
        s: usize,
    ) -> Result<Self, SearchError> {
        let vertices = g.vertex_count();
        if s >= vertices {
            return Err(GraphError::VertexOutOfRange {
                vertex: s,
                vertices,
            }
            .into());
        }

        let mut dist_to = vec![f64::INFINITY; vertices];
        let mut parent_edge = vec![UNASSIGNED_EDGE_ID; vertices];
        let mut pq = IndexMinPq::new(vertices);

        dist_to[s] = 0.0;
        pq.insert(s, 0.0);

        while let Some((v, _)) = pq.del_min() {
            for e in g.out_edges(v)? {
                let w = e.other_end();
                let id = e.edge_id() as usize;

                let candidate = dist_to[v] + edge_cost(attrs, metric, id)?;
                if candidate < dist_to[w] {
                    dist_to[w] = candidate;
                    parent_edge[w] = id as i64;

                    if pq.contains(w) {
                        pq.decrease_key(w, candidate);
                    } else {
                        pq.insert(w, candidate);
                    }
                }
            }
        }

        Ok(Self {
            g,
            dist_to,
            parent_edge,
            s,
        })
    }

    fn validate_vertex(&self, v: usize) -> Result<(), SearchError> {
        if v >= self.dist_to.len() {
            Err(GraphError::VertexOutOfRange {
                vertex: v,
                vertices: self.dist_to.len(),
            }
            .into())
        } else {
            Ok(())
        }
    }

    /// Returns the cost of the shortest path from the source to `v`,
    /// or infinity if `v` is unreachable.
    pub fn dist_to(&self, v: usize) -> Result<f64, SearchError> {
        self.validate_vertex(v)?;
        Ok(self.dist_to[v])
    }

    /// Returns `true` if a path from the source to `v` exists.
    pub fn has_path_to(&self, v: usize) -> Result<bool, SearchError> {
        self.validate_vertex(v)?;
        Ok(self.dist_to[v] < f64::INFINITY)
    }

    /// Returns the edge ids of the shortest path from the source to `t`,
    /// in traversal order. Empty when `t` is unreachable or equals
    /// the source.
    pub fn path_edge_ids_to(&self, t: usize) -> Result<Vec<usize>, SearchError> {
        self.validate_vertex(t)?;
        if self.dist_to[t] == f64::INFINITY || t == self.s {
            return Ok(Vec::new());
        }

        let mut path = Vec::new();
        let mut cur = t;
        while cur != self.s {
            let id = self.parent_edge[cur];
            if id == UNASSIGNED_EDGE_ID {
                return Err(SearchError::MissingParentEdge(cur));
            }
            let id = id as usize;
            path.push(id);
            cur = self.g.edge_by_id(id)?.first_end();
        }

        path.reverse();
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Triangle fixture: 0->1 (d=5, t=5), 1->2 (d=5, t=5), 0->2 (d=9, t=20).
    fn triangle() -> (Graph, EdgeAttributes, [usize; 3]) {
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

        (g, attrs, [e01, e12, e02])
    }

    #[test]
    fn distance_and_time_choose_different_paths() {
        let (g, attrs, [e01, e12, e02]) = triangle();

        let dist = Dijkstra::new(&g, &attrs, Metric::Distance, 0).unwrap();
        assert!(dist.has_path_to(2).unwrap());
        assert!((dist.dist_to(2).unwrap() - 9.0).abs() < 1e-9);
        assert_eq!(dist.path_edge_ids_to(2).unwrap(), vec![e02]);

        let time = Dijkstra::new(&g, &attrs, Metric::Time, 0).unwrap();
        assert!(time.has_path_to(2).unwrap());
        assert!((time.dist_to(2).unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(time.path_edge_ids_to(2).unwrap(), vec![e01, e12]);
    }

    #[test]
    fn unreachable_vertex() {
        let mut g = Graph::new(3);
        let mut attrs = EdgeAttributes::new();
        g.add(0, 1, 0.0).unwrap();
        attrs.set_edge_count(g.edge_count());
        attrs.set_distance_meters(0, 1.0).unwrap();

        let sp = Dijkstra::new(&g, &attrs, Metric::Distance, 0).unwrap();
        assert!(!sp.has_path_to(2).unwrap());
        assert_eq!(sp.dist_to(2).unwrap(), f64::INFINITY);
        assert!(sp.path_edge_ids_to(2).unwrap().is_empty());
    }

    #[test]
    fn source_to_itself() {
        let (g, attrs, _) = triangle();
        let sp = Dijkstra::new(&g, &attrs, Metric::Distance, 0).unwrap();
        assert_eq!(sp.dist_to(0).unwrap(), 0.0);
        assert!(sp.path_edge_ids_to(0).unwrap().is_empty());
    }

    #[test]
    fn invalid_source_is_an_argument_error() {
        let (g, attrs, _) = triangle();
        assert!(matches!(
            Dijkstra::new(&g, &attrs, Metric::Distance, 3),
            Err(SearchError::Graph(GraphError::VertexOutOfRange { .. })),
        ));
    }

    #[test]
    fn path_sums_to_cost() {
        let (g, attrs, _) = triangle();
        let sp = Dijkstra::new(&g, &attrs, Metric::Distance, 0).unwrap();
        let path = sp.path_edge_ids_to(2).unwrap();
        let sum: f64 = path
            .iter()
            .map(|&id| attrs.distance_meters(id).unwrap())
            .sum();
        assert!((sum - sp.dist_to(2).unwrap()).abs() < 1e-9);
    }

    #[test]
    fn path_edges_chain_from_source_to_target() {
        let (g, attrs, _) = triangle();
        let sp = Dijkstra::new(&g, &attrs, Metric::Time, 0).unwrap();
        let path = sp.path_edge_ids_to(2).unwrap();
        assert!(!path.is_empty());

        let first = g.edge_by_id(path[0]).unwrap();
        assert_eq!(first.first_end(), 0);

        for pair in path.windows(2) {
            let a = g.edge_by_id(pair[0]).unwrap();
            let b = g.edge_by_id(pair[1]).unwrap();
            assert_eq!(a.other_end(), b.first_end());
        }

        let last = g.edge_by_id(path[path.len() - 1]).unwrap();
        assert_eq!(last.other_end(), 2);
    }
}
