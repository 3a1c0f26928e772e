// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Edge id of an [Edge] which has not yet been inserted into a [Graph].
pub const UNASSIGNED_EDGE_ID: i64 = -1;

/// Error conditions reported by [Graph] and [Edge] operations.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("vertex {vertex} out of range - graph has {vertices} vertices")]
    VertexOutOfRange { vertex: usize, vertices: usize },

    #[error("edge id {id} out of range - graph has {edges} edges")]
    EdgeOutOfRange { id: usize, edges: usize },

    #[error("edge weight is NaN")]
    NanWeight,

    #[error("edge weight {0} is negative")]
    NegativeWeight(f64),

    #[error("edge already carries id {0} - ids are assigned exactly once, by the inserting graph")]
    EdgeAlreadyAssigned(i64),
}

/// A directed, weighted edge of a [Graph].
///
/// An edge connects vertex `v` to vertex `w` with a non-negative weight.
/// Endpoints and weight are immutable; the id is assigned exactly once,
/// by [Graph::add_edge]. A freshly constructed edge carries
/// [UNASSIGNED_EDGE_ID].
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    v: usize,
    w: usize,
    weight: f64,
    id: i64,
}

impl Edge {
    /// Creates a directed edge `v -> w` with the given weight.
    /// The weight must be non-negative and not NaN.
    pub fn new(v: usize, w: usize, weight: f64) -> Result<Self, GraphError> {
        if weight.is_nan() {
            return Err(GraphError::NanWeight);
        }
        if weight < 0.0 {
            return Err(GraphError::NegativeWeight(weight));
        }
        Ok(Self {
            v,
            w,
            weight,
            id: UNASSIGNED_EDGE_ID,
        })
    }

    /// Returns the source (tail) vertex of this directed edge.
    pub fn first_end(&self) -> usize {
        self.v
    }

    /// Returns the destination (head) vertex of this directed edge.
    pub fn other_end(&self) -> usize {
        self.w
    }

    /// Returns the weight of this edge.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns the id assigned by the owning graph,
    /// or [UNASSIGNED_EDGE_ID] if the edge has not been inserted yet.
    pub fn edge_id(&self) -> i64 {
        self.id
    }
}

/// A directed weighted graph with dense vertex labels `0..V` in which every
/// edge receives a unique sequential id (`0..E`) at insertion time.
///
/// Adjacency lists store outgoing edges; indegrees are tracked explicitly.
/// Edge ids are stable for the lifetime of the graph, and [Graph::edges]
/// yields edges in id order.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adj_out: Vec<Vec<usize>>,
    indegree: Vec<usize>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Creates an empty graph with `vertices` vertices and no edges.
    pub fn new(vertices: usize) -> Self {
        Self {
            adj_out: vec![Vec::new(); vertices],
            indegree: vec![0; vertices],
            edges: Vec::with_capacity(vertices.max(4)),
        }
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.adj_out.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn validate_vertex(&self, v: usize) -> Result<(), GraphError> {
        if v >= self.adj_out.len() {
            Err(GraphError::VertexOutOfRange {
                vertex: v,
                vertices: self.adj_out.len(),
            })
        } else {
            Ok(())
        }
    }

    /// Inserts an edge and assigns it the next sequential id.
    ///
    /// The edge must not already belong to a graph (its id must be
    /// [UNASSIGNED_EDGE_ID]) and both endpoints must be valid vertices.
    /// Returns the assigned id.
    pub fn add_edge(&mut self, mut edge: Edge) -> Result<usize, GraphError> {
        if edge.id != UNASSIGNED_EDGE_ID {
            return Err(GraphError::EdgeAlreadyAssigned(edge.id));
        }
        self.validate_vertex(edge.v)?;
        self.validate_vertex(edge.w)?;

        let id = self.edges.len();
        edge.id = id as i64;

        self.adj_out[edge.v].push(id);
        self.indegree[edge.w] += 1;
        self.edges.push(edge);
        Ok(id)
    }

    /// Convenience form of [Graph::add_edge] constructing the [Edge] in place.
    pub fn add(&mut self, v: usize, w: usize, weight: f64) -> Result<usize, GraphError> {
        self.add_edge(Edge::new(v, w, weight)?)
    }

    /// Returns the number of edges pointing to vertex `v`.
    pub fn indegree(&self, v: usize) -> Result<usize, GraphError> {
        self.validate_vertex(v)?;
        Ok(self.indegree[v])
    }

    /// Returns the number of edges leaving vertex `v`.
    pub fn outdegree(&self, v: usize) -> Result<usize, GraphError> {
        self.validate_vertex(v)?;
        Ok(self.adj_out[v].len())
    }

    /// Returns an iterator over the outgoing edges of vertex `v`,
    /// in no particular order.
    pub fn out_edges(&self, v: usize) -> Result<impl Iterator<Item = &Edge> + '_, GraphError> {
        self.validate_vertex(v)?;
        Ok(self.adj_out[v].iter().map(move |&id| &self.edges[id]))
    }

    /// Retrieves an edge by its assigned id.
    pub fn edge_by_id(&self, id: usize) -> Result<&Edge, GraphError> {
        self.edges.get(id).ok_or(GraphError::EdgeOutOfRange {
            id,
            edges: self.edges.len(),
        })
    }

    /// Returns an iterator over all edges, in id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter()
    }

    /// Returns a new graph with every edge flipped (`v -> w` becomes
    /// `w -> v`) and the same weights.
    pub fn reverse(&self) -> Graph {
        let mut r = Graph::new(self.vertex_count());
        for e in &self.edges {
            let id = r.edges.len();
            r.adj_out[e.w].push(id);
            r.indegree[e.v] += 1;
            r.edges.push(Edge {
                v: e.w,
                w: e.v,
                weight: e.weight,
                id: id as i64,
            });
        }
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_assigns_sequential_ids() {
        let mut g = Graph::new(4);
        assert_eq!(g.add(0, 1, 1.0).unwrap(), 0);
        assert_eq!(g.add(1, 2, 1.0).unwrap(), 1);
        assert_eq!(g.add(2, 3, 1.0).unwrap(), 2);
        assert_eq!(g.edge_count(), 3);

        for id in 0..3 {
            assert_eq!(g.edge_by_id(id).unwrap().edge_id(), id as i64);
        }
    }

    #[test]
    fn degrees_are_tracked() {
        let mut g = Graph::new(3);
        g.add(0, 1, 1.0).unwrap();
        g.add(0, 2, 1.0).unwrap();
        g.add(2, 1, 1.0).unwrap();

        assert_eq!(g.outdegree(0).unwrap(), 2);
        assert_eq!(g.outdegree(1).unwrap(), 0);
        assert_eq!(g.outdegree(2).unwrap(), 1);

        assert_eq!(g.indegree(0).unwrap(), 0);
        assert_eq!(g.indegree(1).unwrap(), 2);
        assert_eq!(g.indegree(2).unwrap(), 1);
    }

    #[test]
    fn edge_id_is_write_once() {
        let e = Edge::new(0, 1, 2.5).unwrap();
        assert_eq!(e.edge_id(), UNASSIGNED_EDGE_ID);

        let mut g = Graph::new(2);
        let id = g.add_edge(e).unwrap();
        assert_eq!(id, 0);
        assert_eq!(g.edge_by_id(0).unwrap().edge_id(), 0);

        // Re-inserting an already-assigned edge is an argument error.
        let assigned = g.edge_by_id(0).unwrap().clone();
        let mut other = Graph::new(2);
        assert_eq!(
            other.add_edge(assigned),
            Err(GraphError::EdgeAlreadyAssigned(0)),
        );
    }

    #[test]
    fn add_edge_validates_arguments() {
        let mut g = Graph::new(2);
        assert!(matches!(
            g.add(0, 2, 1.0),
            Err(GraphError::VertexOutOfRange { vertex: 2, .. }),
        ));
        assert!(matches!(g.add(0, 1, -1.0), Err(GraphError::NegativeWeight(_))));
        assert!(matches!(g.add(0, 1, f64::NAN), Err(GraphError::NanWeight)));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn edges_iterate_in_id_order() {
        let mut g = Graph::new(3);
        g.add(2, 0, 1.0).unwrap();
        g.add(0, 1, 1.0).unwrap();
        g.add(1, 2, 1.0).unwrap();

        let ids: Vec<i64> = g.edges().map(|e| e.edge_id()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn reverse_flips_edges_and_keeps_weights() {
        let mut g = Graph::new(4);
        g.add(0, 1, 1.5).unwrap();
        g.add(0, 2, 2.5).unwrap();
        g.add(2, 3, 3.5).unwrap();

        let r = g.reverse();
        assert_eq!(r.vertex_count(), g.vertex_count());
        assert_eq!(r.edge_count(), g.edge_count());

        let has = |g: &Graph, v: usize, w: usize, weight: f64| {
            g.out_edges(v)
                .unwrap()
                .any(|e| e.other_end() == w && e.weight() == weight)
        };
        assert!(has(&r, 1, 0, 1.5));
        assert!(has(&r, 2, 0, 2.5));
        assert!(has(&r, 3, 2, 3.5));
        assert!(!has(&r, 0, 1, 1.5));
    }

    #[test]
    fn edge_by_id_validates_range() {
        let g = Graph::new(1);
        assert_eq!(
            g.edge_by_id(0).unwrap_err(),
            GraphError::EdgeOutOfRange { id: 0, edges: 0 },
        );
    }
}
