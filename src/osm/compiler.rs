// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::path::Path;

use crate::attributes::EdgeAttributes;
use crate::distance::haversine_meters;
use crate::geometry::EdgeGeometry;
use crate::graph::Graph;

use super::model::{Feature, Way};
use super::{open_reader, speed, xml, Error};

/// The complete, immutable result of compiling an OSM extract:
/// the graph topology, the per-edge attribute columns, the per-edge
/// polyline store and the vertex coordinates.
///
/// Geometry is kept in degrees with `x = lon` and `y = lat`; the lat/lon
/// query pipeline projects a planar copy per compiled network.
///
/// A `Network` has no interior mutability and may be shared freely
/// between concurrent readers.
#[derive(Debug)]
pub struct Network {
    pub graph: Graph,
    pub attrs: EdgeAttributes,
    pub geometry: EdgeGeometry,
    /// Latitude of each routing vertex (degrees, WGS84).
    pub vertex_lat: Vec<f64>,
    /// Longitude of each routing vertex (degrees, WGS84).
    pub vertex_lon: Vec<f64>,
}

impl Network {
    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Compiles the OSM file at `path` into a routable [Network].
///
/// The file is streamed three times - nodes, vertex discovery, edge
/// emission - so compressed inputs are re-opened and re-sniffed per pass.
pub fn compile_file<P: AsRef<Path>>(path: P) -> Result<Network, Error> {
    let path = path.as_ref();
    compile_passes(|| Ok(xml::features_from_file(open_reader(path)?)))
}

/// Compiles an in-memory OSM XML buffer into a routable [Network].
pub fn compile_buffer(data: &[u8]) -> Result<Network, Error> {
    compile_passes(|| Ok(xml::features_from_buffer(data)))
}

/// Runs the three compilation passes, obtaining a fresh feature stream
/// from `open` for each pass.
fn compile_passes<I, F>(mut open: F) -> Result<Network, Error>
where
    I: Iterator<Item = Result<Feature, quick_xml::Error>>,
    F: FnMut() -> Result<I, Error>,
{
    let nodes = pass1_read_nodes(open()?)?;
    let signals = pass2_count_usage(open()?, &nodes)?;
    let mapping = build_vertex_mapping(&nodes, &signals);
    let network = pass3_build_edges(open()?, &nodes, mapping)?;

    log::info!(
        target: "osmroute.compile",
        "compiled network: {} vertices, {} edges, {} geometry points",
        network.vertex_count(),
        network.edge_count(),
        network.geometry.len(),
    );
    Ok(network)
}

/// All OSM nodes of the extract, keyed densely, with their coordinates
/// in parallel arrays.
struct NodeStore {
    lat: Vec<f64>,
    lon: Vec<f64>,
    index: HashMap<i64, usize>,
}

impl NodeStore {
    fn len(&self) -> usize {
        self.lat.len()
    }

    fn add(&mut self, id: i64, lat: f64, lon: f64) -> Result<(), Error> {
        if self.index.contains_key(&id) {
            return Err(Error::DuplicateNode(id));
        }
        self.index.insert(id, self.lat.len());
        self.lat.push(lat);
        self.lon.push(lon);
        Ok(())
    }

    /// Resolves an OSM node id referenced by way `way` to its dense index.
    /// A dangling reference is a fatal compile error.
    fn index_of(&self, way: i64, node: i64) -> Result<usize, Error> {
        self.index
            .get(&node)
            .copied()
            .ok_or(Error::MissingNode { way, node })
    }
}

/// Per-node signals gathered in pass 2, deciding which nodes become
/// routing vertices.
struct VertexSignals {
    /// How many routable ways touch each node.
    use_count: Vec<u32>,
    /// Whether the node is the first or last reference of a routable way.
    is_endpoint: Vec<bool>,
}

/// The node-to-vertex assignment derived from the pass-2 signals,
/// with dense vertex coordinate arrays.
struct VertexMapping {
    node_to_vertex: Vec<Option<usize>>,
    vertex_lat: Vec<f64>,
    vertex_lon: Vec<f64>,
}

impl VertexMapping {
    fn vertex_count(&self) -> usize {
        self.vertex_lat.len()
    }
}

/// Returns the assumed traversal speed of a way, or `None` when the way
/// is not part of the road network (non-routable or absent `highway`
/// tag, or fewer than 2 node references).
fn way_speed(w: &Way) -> Option<f64> {
    if w.nodes.len() < 2 {
        return None;
    }
    speed::speed_mps(w.tag("highway")?)
}

/// Pass 1: record every `<node>` with its coordinates.
fn pass1_read_nodes<I>(features: I) -> Result<NodeStore, Error>
where
    I: Iterator<Item = Result<Feature, quick_xml::Error>>,
{
    let mut nodes = NodeStore {
        lat: Vec::new(),
        lon: Vec::new(),
        index: HashMap::new(),
    };

    for f in features {
        if let Feature::Node(n) = f? {
            nodes.add(n.id, n.lat, n.lon)?;
        }
    }
    Ok(nodes)
}

/// Pass 2: mark way endpoints and count per-node road usage.
/// A node becomes a routing vertex iff it is an endpoint or is touched
/// by at least two routable ways.
fn pass2_count_usage<I>(features: I, nodes: &NodeStore) -> Result<VertexSignals, Error>
where
    I: Iterator<Item = Result<Feature, quick_xml::Error>>,
{
    let mut signals = VertexSignals {
        use_count: vec![0; nodes.len()],
        is_endpoint: vec![false; nodes.len()],
    };

    for f in features {
        let Feature::Way(w) = f? else { continue };
        if way_speed(&w).is_none() {
            continue;
        }

        let first = nodes.index_of(w.id, w.nodes[0])?;
        let last = nodes.index_of(w.id, w.nodes[w.nodes.len() - 1])?;
        signals.is_endpoint[first] = true;
        signals.is_endpoint[last] = true;

        for &node_ref in &w.nodes {
            signals.use_count[nodes.index_of(w.id, node_ref)?] += 1;
        }
    }
    Ok(signals)
}

fn build_vertex_mapping(nodes: &NodeStore, signals: &VertexSignals) -> VertexMapping {
    let mut node_to_vertex = vec![None; nodes.len()];
    let mut vertex_lat = Vec::new();
    let mut vertex_lon = Vec::new();

    for node in 0..nodes.len() {
        if signals.is_endpoint[node] || signals.use_count[node] >= 2 {
            node_to_vertex[node] = Some(vertex_lat.len());
            vertex_lat.push(nodes.lat[node]);
            vertex_lon.push(nodes.lon[node]);
        }
    }

    VertexMapping {
        node_to_vertex,
        vertex_lat,
        vertex_lon,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnewayDirection {
    Forward,
    Reverse,
    Both,
}

fn parse_oneway(value: Option<&str>) -> OnewayDirection {
    match value {
        Some("yes") | Some("true") | Some("1") => OnewayDirection::Forward,
        Some("-1") => OnewayDirection::Reverse,
        _ => OnewayDirection::Both,
    }
}

/// Emits one or two directed edges for a road segment between two routing
/// vertices, filling the attribute columns as it goes.
fn emit_segment_edges(
    graph: &mut Graph,
    attrs: &mut EdgeAttributes,
    from_v: usize,
    to_v: usize,
    dist_meters: f64,
    time_seconds: f64,
    oneway: OnewayDirection,
    name: Option<&str>,
) -> Result<(), Error> {
    if from_v == to_v {
        return Ok(()); // degenerate same-vertex segment
    }

    let mut emit_one = |graph: &mut Graph, attrs: &mut EdgeAttributes, v, w| -> Result<(), Error> {
        let id = graph.add(v, w, 0.0)?;
        attrs.set_edge_count(graph.edge_count());
        attrs.set_distance_meters(id, dist_meters)?;
        attrs.set_time_seconds(id, time_seconds)?;
        attrs.set_street_name(id, name)?;
        Ok(())
    };

    match oneway {
        OnewayDirection::Forward => emit_one(graph, attrs, from_v, to_v),
        OnewayDirection::Reverse => emit_one(graph, attrs, to_v, from_v),
        OnewayDirection::Both => {
            emit_one(graph, attrs, from_v, to_v)?;
            emit_one(graph, attrs, to_v, from_v)
        }
    }
}

/// Copies segment geometry onto the global flat arrays, reversed when the
/// emitted edge runs against the way's traversal direction.
fn append_geometry(
    geom_x: &mut Vec<f64>,
    geom_y: &mut Vec<f64>,
    seg_x: &[f64],
    seg_y: &[f64],
    reverse: bool,
) {
    if reverse {
        geom_x.extend(seg_x.iter().rev());
        geom_y.extend(seg_y.iter().rev());
    } else {
        geom_x.extend_from_slice(seg_x);
        geom_y.extend_from_slice(seg_y);
    }
}

/// Pass 3: walk each routable way, accumulate haversine distance and
/// segment geometry between routing vertices, and emit directed edges
/// with their attributes and polylines.
fn pass3_build_edges<I>(
    features: I,
    nodes: &NodeStore,
    mapping: VertexMapping,
) -> Result<Network, Error>
where
    I: Iterator<Item = Result<Feature, quick_xml::Error>>,
{
    let mut graph = Graph::new(mapping.vertex_count());
    let mut attrs = EdgeAttributes::new();

    // CSR assembly: one row-pointer entry per emitted edge.
    let mut edge_start: Vec<usize> = vec![0];
    let mut geom_x: Vec<f64> = Vec::new();
    let mut geom_y: Vec<f64> = Vec::new();

    for f in features {
        let Feature::Way(w) = f? else { continue };
        let Some(way_speed_mps) = way_speed(&w) else {
            continue;
        };

        let oneway = parse_oneway(w.tag("oneway"));
        let name = w.tag("name");

        let mut start_vertex: Option<usize> = None;
        let mut prev_node = 0usize;
        let mut accum = 0.0;
        let mut seg_x: Vec<f64> = Vec::new();
        let mut seg_y: Vec<f64> = Vec::new();

        for &node_ref in &w.nodes {
            let node = nodes.index_of(w.id, node_ref)?;
            let vertex = mapping.node_to_vertex[node];

            // Skip leading nodes until the way's first routing vertex.
            let Some(sv) = start_vertex else {
                if let Some(v) = vertex {
                    start_vertex = Some(v);
                    prev_node = node;
                    accum = 0.0;
                    seg_x.clear();
                    seg_y.clear();
                    seg_x.push(nodes.lon[node]);
                    seg_y.push(nodes.lat[node]);
                }
                continue;
            };

            accum += haversine_meters(
                nodes.lat[prev_node],
                nodes.lon[prev_node],
                nodes.lat[node],
                nodes.lon[node],
            );
            prev_node = node;
            seg_x.push(nodes.lon[node]);
            seg_y.push(nodes.lat[node]);

            let Some(v) = vertex else { continue };

            if v == sv {
                // The way looped back onto the segment's start vertex;
                // restart rather than emit a self-loop.
                seg_x.clear();
                seg_y.clear();
                seg_x.push(nodes.lon[node]);
                seg_y.push(nodes.lat[node]);
                accum = 0.0;
                continue;
            }

            let before = graph.edge_count();
            emit_segment_edges(
                &mut graph,
                &mut attrs,
                sv,
                v,
                accum,
                accum / way_speed_mps,
                oneway,
                name,
            )?;

            for id in before..graph.edge_count() {
                let edge = graph.edge_by_id(id)?;
                let reverse = !(edge.first_end() == sv && edge.other_end() == v);
                append_geometry(&mut geom_x, &mut geom_y, &seg_x, &seg_y, reverse);
                edge_start.push(geom_x.len());
            }

            // Restart the segment from this vertex.
            seg_x.clear();
            seg_y.clear();
            seg_x.push(nodes.lon[node]);
            seg_y.push(nodes.lat[node]);
            start_vertex = Some(v);
            accum = 0.0;
        }
    }

    if edge_start.len() != graph.edge_count() + 1 {
        return Err(Error::RowIndexMismatch {
            rows: edge_start.len(),
            edges: graph.edge_count(),
        });
    }

    let geometry = EdgeGeometry::new(edge_start, geom_x, geom_y)?;
    Ok(Network {
        graph,
        attrs,
        geometry,
        vertex_lat: mapping.vertex_lat,
        vertex_lon: mapping.vertex_lon,
    })
}
