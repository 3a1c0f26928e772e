// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Mean radius of Earth, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Calculates the great-circle distance between two lat-lon positions
/// on Earth using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Inputs are in degrees, the result is in meters.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lam = (lon2 - lon1).to_radians();

    let sin_dphi_half = (d_phi * 0.5).sin();
    let sin_dlam_half = (d_lam * 0.5).sin();

    let a = sin_dphi_half * sin_dphi_half
        + phi1.cos() * phi2.cos() * sin_dlam_half * sin_dlam_half;

    2.0 * EARTH_RADIUS_METERS * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One degree of latitude along a meridian, R * pi / 180.
    const DEGREE_OF_LATITUDE: f64 = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;

    #[test]
    fn zero_distance() {
        assert_eq!(haversine_meters(46.24, -63.13, 46.24, -63.13), 0.0);
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_meters(0.0, 0.0, 1.0, 0.0);
        assert!((d - DEGREE_OF_LATITUDE).abs() < 1e-6);
    }

    #[test]
    fn one_degree_of_longitude_on_the_equator() {
        // On the equator a degree of longitude spans the same arc
        // as a degree of latitude anywhere.
        let d = haversine_meters(0.0, 0.0, 0.0, 1.0);
        assert!((d - DEGREE_OF_LATITUDE).abs() < 1e-6);
    }

    #[test]
    fn symmetric() {
        let ab = haversine_meters(46.2382, -63.1311, 46.25, -63.12);
        let ba = haversine_meters(46.25, -63.12, 46.2382, -63.1311);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn shrinks_with_latitude() {
        // A degree of longitude at 60 degrees north is roughly half
        // of the equatorial one.
        let equator = haversine_meters(0.0, 0.0, 0.0, 1.0);
        let north = haversine_meters(60.0, 0.0, 60.0, 1.0);
        assert!(north < 0.51 * equator);
        assert!(north > 0.49 * equator);
    }
}
