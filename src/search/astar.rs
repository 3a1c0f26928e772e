// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::attributes::EdgeAttributes;
use crate::graph::{Graph, GraphError, UNASSIGNED_EDGE_ID};

use super::pq::IndexMinPq;
use super::{edge_cost, Metric, SearchError, VertexStore};

/// Point-to-point shortest path over a [Graph] using the
/// [A* search algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm).
///
/// Shares the relaxation shape of [Dijkstra](super::Dijkstra) but keys the
/// open set by `f(v) = g(v) + h(v)` and terminates as soon as the goal is
/// popped. The heuristic is the straight-line distance to the goal taken
/// from the [VertexStore] - divided by `vmax` for the time metric, which
/// keeps it admissible as long as `vmax` is a true upper bound on
/// traversal speed.
///
/// Whenever the heuristic is admissible, the returned cost equals the
/// Dijkstra cost for the same query.
pub struct Astar<'a> {
    g: &'a Graph,
    g_score: Vec<f64>,
    parent_edge: Vec<i64>,
    s: usize,
    goal: usize,
}

impl<'a> Astar<'a> {
    /// Computes the shortest path from `s` to `goal`.
    ///
    /// `vmax_mps` is only consulted by the [Metric::Time] heuristic and
    /// must be strictly positive in that case.
    pub fn new(
        g: &'a Graph,
        attrs: &EdgeAttributes,
        vs: &VertexStore,
        metric: Metric,
        s: usize,
        goal: usize,
        vmax_mps: f64,
    ) -> Result<Self, SearchError> {
        let vertices = g.vertex_count();
        for v in [s, goal] {
            if v >= vertices {
                return Err(GraphError::VertexOutOfRange {
                    vertex: v,
                    vertices,
                }
                .into());
            }
        }
        if vs.vertex_count() != vertices {
            return Err(SearchError::StoreSizeMismatch {
                store: vs.vertex_count(),
                graph: vertices,
            });
        }
        if metric == Metric::Time && !(vmax_mps > 0.0) {
            return Err(SearchError::NonPositiveVmax(vmax_mps));
        }

        let heuristic = |v: usize| -> f64 {
            let straight = (vs.x(v) - vs.x(goal)).hypot(vs.y(v) - vs.y(goal));
            match metric {
                Metric::Distance => straight,
                Metric::Time => straight / vmax_mps,
            }
        };

        let mut g_score = vec![f64::INFINITY; vertices];
        let mut parent_edge = vec![UNASSIGNED_EDGE_ID; vertices];
        let mut open = IndexMinPq::new(vertices);

        g_score[s] = 0.0;
        open.insert(s, heuristic(s));

        while let Some((v, _)) = open.del_min() {
            if v == goal {
                break;
            }

            for e in g.out_edges(v)? {
                let w = e.other_end();
                let id = e.edge_id() as usize;

                let candidate = g_score[v] + edge_cost(attrs, metric, id)?;
                if candidate < g_score[w] {
                    g_score[w] = candidate;
                    parent_edge[w] = id as i64;

                    let f = candidate + heuristic(w);
                    if open.contains(w) {
                        open.decrease_key(w, f);
                    } else {
                        open.insert(w, f);
                    }
                }
            }
        }

        Ok(Self {
            g,
            g_score,
            parent_edge,
            s,
            goal,
        })
    }

    /// Returns `true` if a path from the source to the goal exists.
    pub fn has_path_to_goal(&self) -> bool {
        self.g_score[self.goal] < f64::INFINITY
    }

    /// Returns the total cost of the shortest path to the goal,
    /// or infinity if the goal is unreachable.
    pub fn cost_to_goal(&self) -> f64 {
        self.g_score[self.goal]
    }

    /// Returns the edge ids of the shortest path from the source to the
    /// goal, in traversal order. Empty when the goal is unreachable or
    /// equals the source.
    pub fn path_edge_ids_to_goal(&self) -> Result<Vec<usize>, SearchError> {
        if !self.has_path_to_goal() || self.goal == self.s {
            return Ok(Vec::new());
        }

        let mut path = Vec::new();
        let mut cur = self.goal;
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
    use super::super::Dijkstra;
    use super::*;

    /// Triangle fixture with vertex coordinates on a straight line,
    /// as in the Dijkstra tests.
    fn triangle() -> (Graph, EdgeAttributes, VertexStore, [usize; 3]) {
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

        let vs = VertexStore::new(vec![0.0, 5.0, 10.0], vec![0.0, 0.0, 0.0]).unwrap();
        (g, attrs, vs, [e01, e12, e02])
    }

    #[test]
    fn distance_matches_dijkstra() {
        let (g, attrs, vs, [_, _, e02]) = triangle();

        let d = Dijkstra::new(&g, &attrs, Metric::Distance, 0).unwrap();
        let a = Astar::new(&g, &attrs, &vs, Metric::Distance, 0, 2, 1.0).unwrap();

        assert!(a.has_path_to_goal());
        assert!((a.cost_to_goal() - d.dist_to(2).unwrap()).abs() < 1e-9);
        assert_eq!(a.path_edge_ids_to_goal().unwrap(), vec![e02]);
    }

    #[test]
    fn time_matches_dijkstra_with_admissible_vmax() {
        let (g, attrs, vs, [e01, e12, _]) = triangle();

        let d = Dijkstra::new(&g, &attrs, Metric::Time, 0).unwrap();
        let a = Astar::new(&g, &attrs, &vs, Metric::Time, 0, 2, 10.0).unwrap();

        assert!(a.has_path_to_goal());
        assert!((a.cost_to_goal() - 10.0).abs() < 1e-9);
        assert!((a.cost_to_goal() - d.dist_to(2).unwrap()).abs() < 1e-9);
        assert_eq!(a.path_edge_ids_to_goal().unwrap(), vec![e01, e12]);
    }

    #[test]
    fn time_requires_positive_vmax() {
        let (g, attrs, vs, _) = triangle();
        assert!(matches!(
            Astar::new(&g, &attrs, &vs, Metric::Time, 0, 2, 0.0),
            Err(SearchError::NonPositiveVmax(_)),
        ));
        assert!(matches!(
            Astar::new(&g, &attrs, &vs, Metric::Time, 0, 2, -3.0),
            Err(SearchError::NonPositiveVmax(_)),
        ));
    }

    #[test]
    fn store_size_must_match_graph() {
        let (g, attrs, _, _) = triangle();
        let short = VertexStore::new(vec![0.0], vec![0.0]).unwrap();
        assert!(matches!(
            Astar::new(&g, &attrs, &short, Metric::Distance, 0, 2, 1.0),
            Err(SearchError::StoreSizeMismatch { store: 1, graph: 3 }),
        ));
    }

    #[test]
    fn unreachable_goal() {
        let mut g = Graph::new(3);
        let mut attrs = EdgeAttributes::new();
        g.add(0, 1, 0.0).unwrap();
        attrs.set_edge_count(g.edge_count());
        attrs.set_distance_meters(0, 1.0).unwrap();
        let vs = VertexStore::new(vec![0.0, 1.0, 2.0], vec![0.0; 3]).unwrap();

        let a = Astar::new(&g, &attrs, &vs, Metric::Distance, 0, 2, 1.0).unwrap();
        assert!(!a.has_path_to_goal());
        assert_eq!(a.cost_to_goal(), f64::INFINITY);
        assert!(a.path_edge_ids_to_goal().unwrap().is_empty());
    }

    #[test]
    fn agrees_with_dijkstra_on_a_grid() {
        // 4x4 grid with euclidean distances; all-pairs comparison.
        let side = 4usize;
        let v = side * side;
        let mut g = Graph::new(v);
        let mut attrs = EdgeAttributes::new();
        let mut xs = vec![0.0; v];
        let mut ys = vec![0.0; v];

        let mut connect = |g: &mut Graph, attrs: &mut EdgeAttributes, a: usize, b: usize, d: f64| {
            let id = g.add(a, b, 0.0).unwrap();
            attrs.set_edge_count(g.edge_count());
            attrs.set_distance_meters(id, d).unwrap();
        };

        for r in 0..side {
            for c in 0..side {
                let i = r * side + c;
                // Skewed coordinates make edge lengths uneven.
                xs[i] = c as f64 * 100.0 + (r as f64) * 7.0;
                ys[i] = r as f64 * 100.0 + (c as f64) * 3.0;
            }
        }
        for r in 0..side {
            for c in 0..side {
                let i = r * side + c;
                if c + 1 < side {
                    let j = i + 1;
                    let d = (xs[i] - xs[j]).hypot(ys[i] - ys[j]);
                    connect(&mut g, &mut attrs, i, j, d);
                    connect(&mut g, &mut attrs, j, i, d);
                }
                if r + 1 < side {
                    let j = i + side;
                    let d = (xs[i] - xs[j]).hypot(ys[i] - ys[j]);
                    connect(&mut g, &mut attrs, i, j, d);
                    connect(&mut g, &mut attrs, j, i, d);
                }
            }
        }

        let vs = VertexStore::new(xs, ys).unwrap();
        for s in 0..v {
            let d = Dijkstra::new(&g, &attrs, Metric::Distance, s).unwrap();
            for t in 0..v {
                let a = Astar::new(&g, &attrs, &vs, Metric::Distance, s, t, 1.0).unwrap();
                assert_eq!(d.has_path_to(t).unwrap(), a.has_path_to_goal());
                assert!((d.dist_to(t).unwrap() - a.cost_to_goal()).abs() < 1e-6);
            }
        }
    }
}
