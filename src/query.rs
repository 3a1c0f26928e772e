// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::attributes::AttributeError;
use crate::engine::{Algorithm, EngineError, Route, RoutingEngine};
use crate::geometry::{EdgeGeometry, GeometryError, Point};
use crate::grid::{GridError, SegmentSnapResult, SegmentSnapper};
use crate::instructions::{self, Instruction, InstructionOptions};
use crate::osm::Network;
use crate::projection::{LengthMismatch, LocalProjection};
use crate::reconstruct;
use crate::search::{Metric, VertexStore};

/// Grid cell size used for snapping, tuned for regional extracts.
pub const SNAP_CELL_SIZE_METERS: f64 = 1000.0;

/// Error conditions of the lat/lon query pipeline. A query that simply
/// finds no road or no path is not an error - see [route_lat_lon].
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Projection(#[from] LengthMismatch),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

/// A successful lat/lon query: the route polyline in `(lon, lat)` degrees,
/// the underlying route, and its turn-by-turn instructions.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub geometry: Vec<Point>,
    pub route: Route,
    pub instructions: Vec<Instruction>,
}

/// Answers a free-form point-to-point query over a compiled network.
///
/// Pipeline: build a projection centered on the network's mean vertex
/// position, project vertices and edge geometry into planar meters, snap
/// both query points onto road segments, route between the snapped edges
/// (short-circuiting when they coincide), reconstruct the polyline and
/// inverse-project it back to degrees.
///
/// Returns `Ok(None)` when either point fails to snap or no path connects
/// the snapped edges.
pub fn route_lat_lon(
    net: &Network,
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
) -> Result<Option<QueryOutcome>, QueryError> {
    if net.vertex_count() == 0 || net.geometry.is_empty() {
        return Ok(None);
    }

    // Center the projection on the network for minimal distortion.
    let lat0 = LocalProjection::mean_latitude(&net.vertex_lat);
    let lon0 = LocalProjection::mean_longitude(&net.vertex_lon);
    let projection = LocalProjection::new(lat0, lon0);

    // Project vertices.
    let vertex_count = net.vertex_count();
    let mut vx = vec![0.0; vertex_count];
    let mut vy = vec![0.0; vertex_count];
    projection.project_all(&net.vertex_lat, &net.vertex_lon, &mut vx, &mut vy)?;

    // Project the edge-geometry point cloud. The compiled store keeps
    // (x, y) = (lon, lat) degrees.
    let geo = &net.geometry;
    let mut gx = vec![0.0; geo.len()];
    let mut gy = vec![0.0; geo.len()];
    for i in 0..geo.len() {
        let (x, y) = projection.project(geo.y(i), geo.x(i));
        gx[i] = x;
        gy[i] = y;
    }
    let projected_geom = EdgeGeometry::new(geo.edge_start().to_vec(), gx, gy)?;

    let snapper = SegmentSnapper::new(&net.graph, &projected_geom, SNAP_CELL_SIZE_METERS)?;

    // Snap both query points.
    let (q1x, q1y) = projection.project(lat1, lon1);
    let (q2x, q2y) = projection.project(lat2, lon2);
    let Some(start_snap) = snapper.snap(q1x, q1y) else {
        return Ok(None);
    };
    let Some(goal_snap) = snapper.snap(q2x, q2y) else {
        return Ok(None);
    };

    // Same-edge short-circuit: the route is a portion of a single edge.
    if start_snap.edge_id == goal_snap.edge_id {
        let xy = reconstruct::sub_edge(
            &projected_geom,
            start_snap.edge_id,
            start_snap.t,
            goal_snap.t,
        );

        let edge_len = net.attrs.distance_meters(start_snap.edge_id)?;
        let route = Route {
            found: true,
            start_vertex: start_snap.from_vertex,
            goal_vertex: goal_snap.to_vertex,
            metric: Metric::Distance,
            algorithm: Algorithm::AStar,
            total_cost: (goal_snap.t - start_snap.t).abs() * edge_len,
            edge_ids: vec![start_snap.edge_id],
        };

        let instructions = instructions::generate(
            &route,
            &projected_geom,
            &net.attrs,
            InstructionOptions::default(),
        )?;
        return Ok(Some(QueryOutcome {
            geometry: unproject(&projection, &xy),
            route,
            instructions,
        }));
    }

    // The vmax placeholder only feeds the never-used time heuristic;
    // this pipeline routes by distance.
    let vertex_store = VertexStore::new(vx, vy).map_err(EngineError::from)?;
    let engine = RoutingEngine::with_vertex_store(&net.graph, &net.attrs, &vertex_store, 1.0)?;

    let Some(route) = try_route(&engine, &start_snap, &goal_snap, net)? else {
        return Ok(None);
    };

    let xy = reconstruct::reconstruct(&route, &projected_geom, &start_snap, &goal_snap);
    let instructions = instructions::generate(
        &route,
        &projected_geom,
        &net.attrs,
        InstructionOptions::default(),
    )?;

    Ok(Some(QueryOutcome {
        geometry: unproject(&projection, &xy),
        route,
        instructions,
    }))
}

/// Tries all four combinations of snapped start/goal endpoint vertices
/// and keeps the route minimizing the total cost including the partial
/// distances along the snapped edges.
fn try_route(
    engine: &RoutingEngine<'_>,
    start: &SegmentSnapResult,
    goal: &SegmentSnapResult,
    net: &Network,
) -> Result<Option<Route>, QueryError> {
    let start_edge_len = net.attrs.distance_meters(start.edge_id)?;
    let goal_edge_len = net.attrs.distance_meters(goal.edge_id)?;

    let mut best: Option<Route> = None;
    let mut best_total = f64::INFINITY;

    for sv in [start.from_vertex, start.to_vertex] {
        for gv in [goal.from_vertex, goal.to_vertex] {
            let r = engine.route_distance_astar(sv, gv)?;
            if !r.found {
                continue;
            }

            // Walking back to the edge's from-end costs t * L,
            // walking forward to its to-end costs (1 - t) * L.
            let partial_start = if sv == start.from_vertex {
                start.t * start_edge_len
            } else {
                (1.0 - start.t) * start_edge_len
            };
            let partial_goal = if gv == goal.from_vertex {
                goal.t * goal_edge_len
            } else {
                (1.0 - goal.t) * goal_edge_len
            };

            let total = partial_start + r.total_cost + partial_goal;
            if total < best_total {
                best_total = total;
                best = Some(r);
            }
        }
    }

    Ok(best)
}

fn unproject(projection: &LocalProjection, xy: &[Point]) -> Vec<Point> {
    xy.iter()
        .map(|p| {
            let (lat, lon) = projection.inverse(p.x, p.y);
            Point::new(lon, lat)
        })
        .collect()
}
