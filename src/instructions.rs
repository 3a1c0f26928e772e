// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::attributes::{AttributeError, EdgeAttributes};
use crate::engine::Route;
use crate::geometry::EdgeGeometry;

/// Street name substituted when an edge carries none.
pub const UNNAMED_ROAD: &str = "unnamed road";

/// The kind of maneuver described by an [Instruction].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maneuver {
    /// Begin the route on a street.
    Start,
    /// Continue onto a differently-named street without a significant turn.
    Continue,
    /// Turn left onto a different street.
    Left,
    /// Turn right onto a different street.
    Right,
    /// Bear left while staying on the same street (sharp bend).
    KeepLeft,
    /// Bear right while staying on the same street (sharp bend).
    KeepRight,
    /// Destination reached.
    Arrive,
}

/// A single turn-by-turn navigation instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub maneuver: Maneuver,
    /// The street to follow; [UNNAMED_ROAD] when the edge has no name.
    pub street: String,
    /// Meters traveled since the previous instruction (for [Maneuver::Arrive],
    /// the remaining meters to the destination).
    pub distance_meters: f64,
}

impl Instruction {
    /// Renders this instruction as human-readable text.
    ///
    /// The distance suffix is omitted under 1 m and the street name is
    /// replaced by a generic phrase when absent.
    pub fn to_text(&self) -> String {
        let unnamed = self.street.eq_ignore_ascii_case(UNNAMED_ROAD) || self.street.is_empty();
        let d = if self.distance_meters > 1.0 {
            format!(" for {:.0} m", self.distance_meters)
        } else {
            String::new()
        };

        match self.maneuver {
            Maneuver::Start => {
                if unnamed {
                    "Start".to_string()
                } else {
                    format!("Start on {}", self.street)
                }
            }
            Maneuver::Continue => {
                if unnamed {
                    format!("Continue straight{d}")
                } else {
                    format!("Continue on {}{d}", self.street)
                }
            }
            Maneuver::Left => {
                if unnamed {
                    format!("Turn left{d}")
                } else {
                    format!("Turn left onto {}{d}", self.street)
                }
            }
            Maneuver::Right => {
                if unnamed {
                    format!("Turn right{d}")
                } else {
                    format!("Turn right onto {}{d}", self.street)
                }
            }
            Maneuver::KeepLeft => {
                if unnamed {
                    format!("Keep left{d}")
                } else {
                    format!("Keep left on {}{d}", self.street)
                }
            }
            Maneuver::KeepRight => {
                if unnamed {
                    format!("Keep right{d}")
                } else {
                    format!("Keep right on {}{d}", self.street)
                }
            }
            Maneuver::Arrive => "You have arrived".to_string(),
        }
    }
}

/// Tuning knobs for [generate].
#[derive(Debug, Clone, Copy)]
pub struct InstructionOptions {
    /// Emit keep-left/keep-right instructions for sharp bends even when
    /// the street name does not change.
    pub emit_sharp_bends: bool,
    /// Minimum absolute turn angle, in radians, for a bend to count
    /// as sharp.
    pub bend_threshold_rad: f64,
    /// Minimum meters since the last instruction before a same-street
    /// bend instruction may be emitted. Guards against instruction spam
    /// on winding roads.
    pub spam_guard_meters: f64,
}

impl Default for InstructionOptions {
    fn default() -> Self {
        Self {
            emit_sharp_bends: true,
            bend_threshold_rad: 50.0_f64.to_radians(),
            spam_guard_meters: 120.0,
        }
    }
}

/// Turn classification between two consecutive edges.
struct TurnInfo {
    maneuver: Maneuver,
    is_sharp: bool,
}

/// Generates the ordered maneuver stream for a route.
///
/// The first instruction is always [Maneuver::Start] with the first edge's
/// street, the last is always [Maneuver::Arrive] with the remaining
/// distance. In between, a street-name change always emits (a turn when the
/// bend is sharp, [Maneuver::Continue] otherwise), and - when enabled - a
/// sharp bend on an unchanged street emits a keep instruction once the spam
/// guard distance has accumulated.
///
/// An empty or not-found route yields an empty list.
pub fn generate(
    r: &Route,
    g: &EdgeGeometry,
    attrs: &EdgeAttributes,
    options: InstructionOptions,
) -> Result<Vec<Instruction>, AttributeError> {
    let mut out = Vec::new();
    if !r.found || r.edge_ids.is_empty() {
        return Ok(out);
    }

    let mut current_street = safe(attrs.street_name(r.edge_ids[0])?);
    out.push(Instruction {
        maneuver: Maneuver::Start,
        street: current_street.clone(),
        distance_meters: 0.0,
    });

    // Meters accumulated since the last emitted instruction.
    let mut acc = 0.0;

    for pair in r.edge_ids.windows(2) {
        let (e0, e1) = (pair[0], pair[1]);
        acc += attrs.distance_meters(e0)?;

        let next_street = safe(attrs.street_name(e1)?);
        let turn = turn_between_edges(g, e0, e1, options.bend_threshold_rad);

        if !next_street.eq_ignore_ascii_case(&current_street) {
            // A name change always emits.
            out.push(Instruction {
                maneuver: turn.maneuver,
                street: next_street.clone(),
                distance_meters: acc,
            });
            acc = 0.0;
            current_street = next_street;
            continue;
        }

        if options.emit_sharp_bends && turn.is_sharp && acc >= options.spam_guard_meters {
            let keep = match turn.maneuver {
                Maneuver::Left => Maneuver::KeepLeft,
                Maneuver::Right => Maneuver::KeepRight,
                _ => Maneuver::Continue,
            };
            out.push(Instruction {
                maneuver: keep,
                street: current_street.clone(),
                distance_meters: acc,
            });
            acc = 0.0;
        }
    }

    acc += attrs.distance_meters(r.edge_ids[r.edge_ids.len() - 1])?;
    out.push(Instruction {
        maneuver: Maneuver::Arrive,
        street: String::new(),
        distance_meters: acc,
    });

    Ok(out)
}

/// Classifies the turn between two consecutive edges from the angle between
/// the exit direction of `prev_edge` and the entry direction of `next_edge`.
/// A positive angle turns left, a negative one right.
fn turn_between_edges(
    g: &EdgeGeometry,
    prev_edge: usize,
    next_edge: usize,
    threshold_rad: f64,
) -> TurnInfo {
    let (Some(v1), Some(v2)) = (last_segment_vector(g, prev_edge), first_segment_vector(g, next_edge))
    else {
        return TurnInfo {
            maneuver: Maneuver::Continue,
            is_sharp: false,
        };
    };

    let cross = v1.0 * v2.1 - v1.1 * v2.0;
    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let angle = cross.atan2(dot);

    if angle.abs() < threshold_rad {
        return TurnInfo {
            maneuver: Maneuver::Continue,
            is_sharp: false,
        };
    }

    TurnInfo {
        maneuver: if angle > 0.0 {
            Maneuver::Left
        } else {
            Maneuver::Right
        },
        is_sharp: true,
    }
}

/// Direction vector of an edge's first segment,
/// or `None` for degenerate edges.
fn first_segment_vector(g: &EdgeGeometry, edge_id: usize) -> Option<(f64, f64)> {
    let s = g.start_index(edge_id);
    let e = g.end_index(edge_id);
    if e - s < 2 {
        return None;
    }
    Some((g.x(s + 1) - g.x(s), g.y(s + 1) - g.y(s)))
}

/// Direction vector of an edge's last segment,
/// or `None` for degenerate edges.
fn last_segment_vector(g: &EdgeGeometry, edge_id: usize) -> Option<(f64, f64)> {
    let s = g.start_index(edge_id);
    let e = g.end_index(edge_id);
    if e - s < 2 {
        return None;
    }
    Some((g.x(e - 1) - g.x(e - 2), g.y(e - 1) - g.y(e - 2)))
}

fn safe(name: Option<&str>) -> String {
    name.unwrap_or(UNNAMED_ROAD).to_string()
}
