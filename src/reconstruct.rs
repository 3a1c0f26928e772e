// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::engine::Route;
use crate::geometry::{EdgeGeometry, Point};
use crate::grid::SegmentSnapResult;

/// Appends a point, suppressing consecutive duplicates.
///
/// Points are compared bit-exactly: duplicates only ever arise from
/// identical array reads, so a tolerance would be wrong here.
fn push_point(polyline: &mut Vec<Point>, p: Point) {
    if polyline.last() != Some(&p) {
        polyline.push(p);
    }
}

fn segment_length(g: &EdgeGeometry, i: usize) -> f64 {
    (g.x(i + 1) - g.x(i)).hypot(g.y(i + 1) - g.y(i))
}

fn polyline_length(g: &EdgeGeometry, edge_id: usize) -> f64 {
    let s = g.start_index(edge_id);
    let e = g.end_index(edge_id);
    (s..e.saturating_sub(1)).map(|i| segment_length(g, i)).sum()
}

/// Computes the point at normalized arc-length position `t` along an
/// edge's polyline.
///
/// `t = 0` is the first point, `t = 1` the last; values in between walk
/// the polyline by accumulated segment length and interpolate linearly
/// within the containing segment. `t >= 1` (and rounding fallout near 1)
/// degrade to the last point. Degenerate edges return their only point.
pub fn interpolate_on_edge(g: &EdgeGeometry, edge_id: usize, t: f64) -> Point {
    let start = g.start_index(edge_id);
    let end = g.end_index(edge_id);

    if end - start < 2 {
        return g.point(start);
    }

    let total = polyline_length(g, edge_id);
    let target = t * total;
    let mut acc = 0.0;

    for i in start..end - 1 {
        let len = segment_length(g, i);
        if acc + len >= target {
            let lt = if len > 0.0 { (target - acc) / len } else { 0.0 };
            return Point::new(
                g.x(i) + lt * (g.x(i + 1) - g.x(i)),
                g.y(i) + lt * (g.y(i + 1) - g.y(i)),
            );
        }
        acc += len;
    }

    g.point(end - 1)
}

/// Extracts the portion of an edge polyline between arc-length parameters
/// `t0` and `t1`, in the `t0 -> t1` direction (the result is reversed when
/// `t0 > t1`).
pub fn sub_edge(g: &EdgeGeometry, edge_id: usize, t0: f64, t1: f64) -> Vec<Point> {
    let s = g.start_index(edge_id);
    let e = g.end_index(edge_id);
    if e - s < 2 {
        return vec![g.point(s)];
    }

    let reverse = t0 > t1;
    let (t0, t1) = if reverse { (t1, t0) } else { (t0, t1) };

    let seg_count = e - s - 1;
    let seg_len: Vec<f64> = (0..seg_count).map(|i| segment_length(g, s + i)).collect();
    let total: f64 = seg_len.iter().sum();
    if total == 0.0 {
        return vec![g.point(s)];
    }

    let d0 = t0 * total;
    let d1 = t1 * total;

    let mut out: Vec<Point> = Vec::new();
    let mut acc = 0.0;

    for i in 0..seg_count {
        let len = seg_len[i];
        if len == 0.0 {
            continue;
        }

        let next = acc + len;
        if next <= d0 {
            acc = next;
            continue; // entirely before the interval
        }
        if acc >= d1 {
            break; // entirely after the interval
        }

        let x0 = g.x(s + i);
        let y0 = g.y(s + i);
        let x1 = g.x(s + i + 1);
        let y1 = g.y(s + i + 1);

        let a = ((d0 - acc) / len).max(0.0);
        let b = ((d1 - acc) / len).min(1.0);

        if out.is_empty() {
            out.push(Point::new(x0 + a * (x1 - x0), y0 + a * (y1 - y0)));
        }

        if b < 1.0 {
            out.push(Point::new(x0 + b * (x1 - x0), y0 + b * (y1 - y0)));
            break;
        }
        out.push(Point::new(x1, y1));

        acc = next;
    }

    if reverse {
        out.reverse();
    }
    out
}

/// Reconstructs the continuous polyline of a computed route.
///
/// The first edge is trimmed from the snapped start position forward, every
/// middle edge contributes its full polyline (skipping the junction point),
/// and the last edge is trimmed up to the snapped goal position. When both
/// snaps share an edge, only that edge's geometry between the two positions
/// is used. Consecutive duplicate points are suppressed throughout.
///
/// A route with no edges (including a not-found route) yields an empty
/// polyline.
pub fn reconstruct(
    r: &Route,
    g: &EdgeGeometry,
    start: &SegmentSnapResult,
    goal: &SegmentSnapResult,
) -> Vec<Point> {
    if !r.found || r.edge_ids.is_empty() {
        return Vec::new();
    }

    let mut polyline: Vec<Point> = Vec::new();
    let first = r.edge_ids[0];

    // Same-edge short-circuit: only the portion between the two t values.
    if start.edge_id == goal.edge_id {
        let p_start = interpolate_on_edge(g, start.edge_id, start.t);
        let p_goal = interpolate_on_edge(g, goal.edge_id, goal.t);

        push_point(&mut polyline, p_start);
        for i in g.start_index(start.edge_id)..g.end_index(start.edge_id) {
            let p = g.point(i);
            if p != p_start && p != p_goal {
                push_point(&mut polyline, p);
            }
        }
        push_point(&mut polyline, p_goal);
        return polyline;
    }

    // First edge: trim from start.t forward.
    let s = g.start_index(first);
    let e = g.end_index(first);
    let target = start.t * polyline_length(g, first);

    let mut seg = s;
    let mut acc = 0.0;
    for i in s..e - 1 {
        let len = segment_length(g, i);
        if acc + len >= target {
            seg = i;
            break;
        }
        acc += len;
    }

    push_point(&mut polyline, interpolate_on_edge(g, first, start.t));
    for i in seg + 1..e {
        push_point(&mut polyline, g.point(i));
    }

    // Middle edges: full geometry, skipping each leading junction point.
    for &edge_id in &r.edge_ids[1..r.edge_ids.len() - 1] {
        for i in g.start_index(edge_id) + 1..g.end_index(edge_id) {
            push_point(&mut polyline, g.point(i));
        }
    }

    // Last edge: points preceding the goal position, then the goal itself.
    let last = r.edge_ids[r.edge_ids.len() - 1];
    if goal.edge_id == last {
        let ls = g.start_index(last);
        let le = g.end_index(last);
        let goal_target = goal.t * polyline_length(g, last);
        let p_goal = interpolate_on_edge(g, last, goal.t);

        let mut gseg = ls;
        let mut acc = 0.0;
        for i in ls..le - 1 {
            let len = segment_length(g, i);
            if acc + len >= goal_target {
                gseg = i;
                break;
            }
            acc += len;
        }

        for i in ls..=gseg {
            let p = g.point(i);
            if p != p_goal {
                push_point(&mut polyline, p);
            }
        }
        push_point(&mut polyline, p_goal);
    } else {
        for i in g.start_index(last) + 1..g.end_index(last) {
            push_point(&mut polyline, g.point(i));
        }
    }

    polyline
}
