// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::geometry::EdgeGeometry;
use crate::graph::Graph;

/// Default number of expanding rings searched before a query
/// gives up. Bounds the work of a single snap deterministically.
pub const DEFAULT_MAX_RING: usize = 32;

/// Error conditions reported when building a spatial index.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("cell size must be positive, got {0}")]
    NonPositiveCellSize(f64),

    #[error("no points to index")]
    Empty,

    #[error("x/y arrays must have the same length ({x} != {y})")]
    LengthMismatch { x: usize, y: usize },

    #[error("geometry covers {geometry} edges but the graph has {graph}")]
    EdgeCountMismatch { geometry: usize, graph: usize },
}

/// Shared uniform-grid frame: bounding box, cell size and dimensions,
/// plus the coordinate-to-cell mapping.
#[derive(Debug, Clone, Copy)]
struct GridFrame {
    min_x: f64,
    min_y: f64,
    cell_size: f64,
    grid_w: usize,
    grid_h: usize,
}

impl GridFrame {
    fn from_bounds(
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        cell_size: f64,
    ) -> Result<Self, GridError> {
        if !(cell_size > 0.0) {
            return Err(GridError::NonPositiveCellSize(cell_size));
        }
        let grid_w = (((max_x - min_x) / cell_size).ceil() as usize).max(1);
        let grid_h = (((max_y - min_y) / cell_size).ceil() as usize).max(1);
        Ok(Self {
            min_x,
            min_y,
            cell_size,
            grid_w,
            grid_h,
        })
    }

    fn cell_count(&self) -> usize {
        self.grid_w * self.grid_h
    }

    fn cell_x(&self, x: f64) -> usize {
        let c = ((x - self.min_x) / self.cell_size) as isize;
        c.clamp(0, self.grid_w as isize - 1) as usize
    }

    fn cell_y(&self, y: f64) -> usize {
        let c = ((y - self.min_y) / self.cell_size) as isize;
        c.clamp(0, self.grid_h as isize - 1) as usize
    }

    fn cell_id(&self, x: f64, y: f64) -> usize {
        self.cell_y(y) * self.grid_w + self.cell_x(x)
    }
}

/// Visits the cells of the square ring at Chebyshev radius `r` around
/// `(cx, cy)`, skipping out-of-bounds cells, and yields their cell ids.
fn for_each_ring_cell(frame: &GridFrame, cx: usize, cy: usize, r: usize, mut f: impl FnMut(usize)) {
    let r = r as isize;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx.abs() != r && dy.abs() != r {
                continue; // interior cell, already visited in an earlier ring
            }
            let x = cx as isize + dx;
            let y = cy as isize + dy;
            if x < 0 || y < 0 || x >= frame.grid_w as isize || y >= frame.grid_h as isize {
                continue;
            }
            f(y as usize * frame.grid_w + x as usize);
        }
    }
}

/// Result of a nearest-vertex query on a [Grid].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexSnap {
    pub vertex: usize,
    pub distance_meters: f64,
}

/// A uniform-grid spatial index over vertex coordinates, answering
/// nearest-vertex queries.
///
/// Vertices are bucketed into fixed-size cells laid out in CSR form:
/// the vertices of cell `c` sit at `cell_verts[cell_start[c]..cell_start[c + 1]]`.
/// Queries search outward in expanding square rings and stop as soon as the
/// best match is provably closer than anything an outer ring can hold.
#[derive(Debug, Clone)]
pub struct Grid<'a> {
    frame: GridFrame,
    vx: &'a [f64],
    vy: &'a [f64],
    cell_start: Vec<usize>,
    cell_verts: Vec<usize>,
}

impl<'a> Grid<'a> {
    /// Builds the index over vertex coordinates, with cells of
    /// `cell_size_meters` on each side.
    pub fn build(vx: &'a [f64], vy: &'a [f64], cell_size_meters: f64) -> Result<Self, GridError> {
        if vx.len() != vy.len() {
            return Err(GridError::LengthMismatch {
                x: vx.len(),
                y: vy.len(),
            });
        }
        if vx.is_empty() {
            return Err(GridError::Empty);
        }

        let (mut min_x, mut min_y) = (vx[0], vy[0]);
        let (mut max_x, mut max_y) = (vx[0], vy[0]);
        for i in 1..vx.len() {
            min_x = min_x.min(vx[i]);
            max_x = max_x.max(vx[i]);
            min_y = min_y.min(vy[i]);
            max_y = max_y.max(vy[i]);
        }
        let frame = GridFrame::from_bounds(min_x, min_y, max_x, max_y, cell_size_meters)?;

        // Two-pass CSR: count per cell, prefix-sum, then write.
        let mut counts = vec![0usize; frame.cell_count()];
        for i in 0..vx.len() {
            counts[frame.cell_id(vx[i], vy[i])] += 1;
        }

        let mut cell_start = vec![0usize; frame.cell_count() + 1];
        for c in 0..frame.cell_count() {
            cell_start[c + 1] = cell_start[c] + counts[c];
        }

        let mut cell_verts = vec![0usize; vx.len()];
        let mut write = cell_start.clone();
        for i in 0..vx.len() {
            let cid = frame.cell_id(vx[i], vy[i]);
            cell_verts[write[cid]] = i;
            write[cid] += 1;
        }

        Ok(Self {
            frame,
            vx,
            vy,
            cell_start,
            cell_verts,
        })
    }

    /// Finds the vertex nearest to `(qx, qy)`, searching at most
    /// [DEFAULT_MAX_RING] rings.
    pub fn snap_nearest_vertex(&self, qx: f64, qy: f64) -> Option<VertexSnap> {
        self.snap_nearest_vertex_within(qx, qy, DEFAULT_MAX_RING)
    }

    /// Finds the vertex nearest to `(qx, qy)`, searching at most
    /// `max_ring` rings around the query cell.
    pub fn snap_nearest_vertex_within(
        &self,
        qx: f64,
        qy: f64,
        max_ring: usize,
    ) -> Option<VertexSnap> {
        let cx = self.frame.cell_x(qx);
        let cy = self.frame.cell_y(qy);

        let mut best: Option<VertexSnap> = None;

        for r in 0..=max_ring {
            for_each_ring_cell(&self.frame, cx, cy, r, |cid| {
                for k in self.cell_start[cid]..self.cell_start[cid + 1] {
                    let v = self.cell_verts[k];
                    let d = (qx - self.vx[v]).hypot(qy - self.vy[v]);
                    if best.map_or(true, |b| d < b.distance_meters) {
                        best = Some(VertexSnap {
                            vertex: v,
                            distance_meters: d,
                        });
                    }
                }
            });

            // No vertex in an outer ring can be closer than r * cell_size.
            if let Some(b) = best {
                if b.distance_meters <= r as f64 * self.frame.cell_size {
                    break;
                }
            }
        }

        best
    }
}

/// Reference to one polyline segment: the owning edge and the flat index
/// of the segment's first point.
#[derive(Debug, Clone, Copy)]
struct SegmentRef {
    edge: u32,
    first_point: u32,
}

/// The result of snapping a query point to the nearest road segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSnapResult {
    /// The edge owning the matched segment.
    pub edge_id: usize,
    /// The edge's source vertex.
    pub from_vertex: usize,
    /// The edge's destination vertex.
    pub to_vertex: usize,
    /// Normalized arc-length position of the snap along the whole edge
    /// polyline (not along the single matched segment), in `[0, 1]`.
    pub t: f64,
    /// Euclidean distance from the query point to the segment, in meters.
    pub distance_meters: f64,
}

/// A uniform-grid spatial index over polyline *segments*, answering
/// nearest-segment queries for map matching.
///
/// Every consecutive point pair of every edge is indexed under the cell
/// containing its midpoint, in the same two-pass CSR layout as [Grid].
/// A query projects the point orthogonally onto each candidate segment
/// (clamping to the endpoints) and keeps the closest match, expanding
/// rings until the early-termination bound is met.
pub struct SegmentSnapper<'a> {
    graph: &'a Graph,
    geom: &'a EdgeGeometry,
    frame: GridFrame,
    cell_start: Vec<usize>,
    cell_segments: Vec<SegmentRef>,
}

impl<'a> SegmentSnapper<'a> {
    /// Builds the index over all segments of `geom`, with cells of
    /// `cell_size_meters` on each side. The geometry must describe
    /// exactly the graph's edges.
    pub fn new(
        graph: &'a Graph,
        geom: &'a EdgeGeometry,
        cell_size_meters: f64,
    ) -> Result<Self, GridError> {
        if geom.edge_count() != graph.edge_count() {
            return Err(GridError::EdgeCountMismatch {
                geometry: geom.edge_count(),
                graph: graph.edge_count(),
            });
        }
        if geom.is_empty() {
            return Err(GridError::Empty);
        }

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for i in 0..geom.len() {
            min_x = min_x.min(geom.x(i));
            max_x = max_x.max(geom.x(i));
            min_y = min_y.min(geom.y(i));
            max_y = max_y.max(geom.y(i));
        }
        let frame = GridFrame::from_bounds(min_x, min_y, max_x, max_y, cell_size_meters)?;

        // First pass: count segments per midpoint cell.
        let mut counts = vec![0usize; frame.cell_count()];
        Self::for_each_segment(geom, |_, i| {
            let mx = (geom.x(i) + geom.x(i + 1)) * 0.5;
            let my = (geom.y(i) + geom.y(i + 1)) * 0.5;
            counts[frame.cell_id(mx, my)] += 1;
        });

        let mut cell_start = vec![0usize; frame.cell_count() + 1];
        for c in 0..frame.cell_count() {
            cell_start[c + 1] = cell_start[c] + counts[c];
        }

        // Second pass: write packed segment references.
        let mut cell_segments = vec![
            SegmentRef {
                edge: 0,
                first_point: 0,
            };
            cell_start[frame.cell_count()]
        ];
        let mut write = cell_start.clone();
        Self::for_each_segment(geom, |e, i| {
            let mx = (geom.x(i) + geom.x(i + 1)) * 0.5;
            let my = (geom.y(i) + geom.y(i + 1)) * 0.5;
            let cid = frame.cell_id(mx, my);
            cell_segments[write[cid]] = SegmentRef {
                edge: e as u32,
                first_point: i as u32,
            };
            write[cid] += 1;
        });

        Ok(Self {
            graph,
            geom,
            frame,
            cell_start,
            cell_segments,
        })
    }

    fn for_each_segment(geom: &EdgeGeometry, mut f: impl FnMut(usize, usize)) {
        for e in 0..geom.edge_count() {
            let start = geom.start_index(e);
            let end = geom.end_index(e);
            for i in start..end.saturating_sub(1) {
                f(e, i);
            }
        }
    }

    /// Snaps `(qx, qy)` to the nearest road segment, searching at most
    /// [DEFAULT_MAX_RING] rings. Returns `None` when nothing is found.
    pub fn snap(&self, qx: f64, qy: f64) -> Option<SegmentSnapResult> {
        self.snap_within(qx, qy, DEFAULT_MAX_RING)
    }

    /// Snaps `(qx, qy)` to the nearest road segment, searching at most
    /// `max_ring` rings around the query cell.
    pub fn snap_within(&self, qx: f64, qy: f64, max_ring: usize) -> Option<SegmentSnapResult> {
        let cx = self.frame.cell_x(qx);
        let cy = self.frame.cell_y(qy);

        let mut best_dist = f64::INFINITY;
        let mut best: Option<(usize, usize, f64)> = None; // (edge, first point, segment-local t)

        for r in 0..=max_ring {
            for_each_ring_cell(&self.frame, cx, cy, r, |cid| {
                for k in self.cell_start[cid]..self.cell_start[cid + 1] {
                    let seg = self.cell_segments[k];
                    let idx = seg.first_point as usize;

                    let x0 = self.geom.x(idx);
                    let y0 = self.geom.y(idx);
                    let x1 = self.geom.x(idx + 1);
                    let y1 = self.geom.y(idx + 1);

                    let sx = x1 - x0;
                    let sy = y1 - y0;
                    let denom = sx * sx + sy * sy;
                    if denom == 0.0 {
                        continue; // degenerate segment
                    }

                    // Orthogonal projection, clamped to the segment.
                    let seg_t = (((qx - x0) * sx + (qy - y0) * sy) / denom).clamp(0.0, 1.0);
                    let px = x0 + seg_t * sx;
                    let py = y0 + seg_t * sy;
                    let dist = (qx - px).hypot(qy - py);

                    if dist < best_dist {
                        best_dist = dist;
                        best = Some((seg.edge as usize, idx, seg_t));
                    }
                }
            });

            // No segment first appearing in an outer ring can lie in a cell
            // whose nearest boundary is closer than r * cell_size.
            if best.is_some() && best_dist <= r as f64 * self.frame.cell_size {
                break;
            }
        }

        let (edge_id, idx, seg_t) = best?;
        let edge = self.graph.edge_by_id(edge_id).ok()?;
        Some(SegmentSnapResult {
            edge_id,
            from_vertex: edge.first_end(),
            to_vertex: edge.other_end(),
            t: self.edge_normalized_t(edge_id, idx, seg_t),
            distance_meters: best_dist,
        })
    }

    /// Converts a projection onto segment `(seg_start_idx, seg_start_idx + 1)`
    /// with local parameter `seg_t` into the normalized arc-length parameter
    /// along the entire edge polyline. Degenerate edges yield 0.
    fn edge_normalized_t(&self, edge_id: usize, seg_start_idx: usize, seg_t: f64) -> f64 {
        let s = self.geom.start_index(edge_id);
        let e = self.geom.end_index(edge_id);
        if e - s < 2 {
            return 0.0;
        }

        let mut total = 0.0;
        let mut before = 0.0;
        for i in s..e - 1 {
            let len = (self.geom.x(i + 1) - self.geom.x(i))
                .hypot(self.geom.y(i + 1) - self.geom.y(i));
            total += len;
            if i < seg_start_idx {
                before += len;
            }
        }

        let seg_len = (self.geom.x(seg_start_idx + 1) - self.geom.x(seg_start_idx))
            .hypot(self.geom.y(seg_start_idx + 1) - self.geom.y(seg_start_idx));

        let along = before + seg_t * seg_len;
        if total > 0.0 {
            along / total
        } else {
            0.0
        }
    }
}
