// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::distance::EARTH_RADIUS_METERS;

/// Error returned by the bulk projection operation when the
/// input and output arrays disagree in length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("array length mismatch: lat={lat}, lon={lon}, x={x}, y={y}")]
pub struct LengthMismatch {
    pub lat: usize,
    pub lon: usize,
    pub x: usize,
    pub y: usize,
}

/// Local tangent-plane projection (equirectangular).
///
/// Converts lat/lon (degrees) into x/y meters relative to a reference point
/// and back. Suitable for regional extracts (roughly province/state scale);
/// the error grows with distance from the reference point.
#[derive(Debug, Clone, Copy)]
pub struct LocalProjection {
    lat0: f64,
    lon0: f64,
    cos_lat0: f64,
}

impl LocalProjection {
    /// Creates a projection centered on the given reference latitude/longitude,
    /// both in degrees.
    pub fn new(lat0_deg: f64, lon0_deg: f64) -> Self {
        let lat0 = lat0_deg.to_radians();
        Self {
            lat0,
            lon0: lon0_deg.to_radians(),
            cos_lat0: lat0.cos(),
        }
    }

    /// Projects a latitude/longitude (degrees) into `(x, y)` meters.
    pub fn project(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();

        let x = EARTH_RADIUS_METERS * (lon - self.lon0) * self.cos_lat0;
        let y = EARTH_RADIUS_METERS * (lat - self.lat0);
        (x, y)
    }

    /// Computes the inverse projection, from `(x, y)` meters back to
    /// `(lat, lon)` degrees.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = self.lon0 + x / (EARTH_RADIUS_METERS * self.cos_lat0);
        let lat = self.lat0 + y / EARTH_RADIUS_METERS;
        (lat.to_degrees(), lon.to_degrees())
    }

    /// Projects whole arrays of lat/lon (degrees) into x/y arrays (meters).
    /// All four slices must have the same length.
    pub fn project_all(
        &self,
        lat: &[f64],
        lon: &[f64],
        x: &mut [f64],
        y: &mut [f64],
    ) -> Result<(), LengthMismatch> {
        if lat.len() != lon.len() || lat.len() != x.len() || lat.len() != y.len() {
            return Err(LengthMismatch {
                lat: lat.len(),
                lon: lon.len(),
                x: x.len(),
                y: y.len(),
            });
        }

        for i in 0..lat.len() {
            let (xi, yi) = self.project(lat[i], lon[i]);
            x[i] = xi;
            y[i] = yi;
        }
        Ok(())
    }

    /// Computes a good reference latitude: the arithmetic mean.
    pub fn mean_latitude(lat_deg: &[f64]) -> f64 {
        lat_deg.iter().sum::<f64>() / lat_deg.len() as f64
    }

    /// Computes a good reference longitude: the arithmetic mean.
    pub fn mean_longitude(lon_deg: &[f64]) -> f64 {
        lon_deg.iter().sum::<f64>() / lon_deg.len() as f64
    }
}
