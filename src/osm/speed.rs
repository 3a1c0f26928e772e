// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! The closed set of routable `highway` classes, and the speed each
//! class is assumed to be traveled at.
//!
//! Membership in the table doubles as the routability test: a way whose
//! `highway` value has no entry here is not part of the road network.

const KMH_TO_MPS: f64 = 1.0 / 3.6;

/// The highest speed in the table, in meters per second. A valid
/// admissible upper bound for the time-metric A* heuristic.
pub const MAX_SPEED_MPS: f64 = 110.0 * KMH_TO_MPS;

/// Returns the assumed traversal speed in meters per second for a
/// routable `highway` class, or `None` for non-routable values.
pub fn speed_mps(highway: &str) -> Option<f64> {
    let kmh: f64 = match highway {
        "motorway" => 110.0,
        "trunk" => 90.0,
        "primary" => 80.0,
        "secondary" => 70.0,
        "tertiary" => 60.0,
        "unclassified" => 50.0,
        "residential" => 40.0,
        "living_street" => 10.0,
        "service" => 20.0,
        "motorway_link" => 60.0,
        "trunk_link" => 50.0,
        "primary_link" => 50.0,
        "secondary_link" => 50.0,
        "tertiary_link" => 50.0,
        _ => return None,
    };
    Some(kmh * KMH_TO_MPS)
}

/// Returns `true` if the `highway` tag value denotes a drivable road.
pub fn is_routable(highway: &str) -> bool {
    speed_mps(highway).is_some()
}
