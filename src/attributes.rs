// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Error conditions reported by [EdgeAttributes] mutators and accessors.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum AttributeError {
    #[error("edge id {id} out of range - attribute store tracks {edges} edges")]
    EdgeOutOfRange { id: usize, edges: usize },

    #[error("{0} is NaN")]
    NanValue(&'static str),

    #[error("{0} must be non-negative, got {1}")]
    NegativeValue(&'static str, f64),
}

/// Stores per-edge attributes in parallel columns indexed by edge id:
/// distance in meters, travel time in seconds and an optional street name.
///
/// The valid id range is `0..edge_count()`. The store is kept in sync with a
/// graph by calling [EdgeAttributes::set_edge_count] after each batch of edge
/// insertions; the count never shrinks.
#[derive(Debug, Clone, Default)]
pub struct EdgeAttributes {
    distance_meters: Vec<f64>,
    time_seconds: Vec<f64>,
    street_name: Vec<Option<String>>,
}

impl EdgeAttributes {
    /// Creates an empty attribute store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty attribute store with room for `capacity` edges.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            distance_meters: Vec::with_capacity(capacity),
            time_seconds: Vec::with_capacity(capacity),
            street_name: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of edges tracked. Valid ids are `0..edge_count()`.
    pub fn edge_count(&self) -> usize {
        self.distance_meters.len()
    }

    /// Ensures the backing columns can hold at least `min_edge_count` edges
    /// without reallocating. Storage grows geometrically.
    pub fn ensure_capacity(&mut self, min_edge_count: usize) {
        let additional = min_edge_count.saturating_sub(self.distance_meters.len());
        self.distance_meters.reserve(additional);
        self.time_seconds.reserve(additional);
        self.street_name.reserve(additional);
    }

    /// Expands the valid edge id range to `0..new_edge_count`. New entries
    /// default to zero distance, zero time and no street name. The range
    /// never shrinks.
    pub fn set_edge_count(&mut self, new_edge_count: usize) {
        if new_edge_count > self.distance_meters.len() {
            self.distance_meters.resize(new_edge_count, 0.0);
            self.time_seconds.resize(new_edge_count, 0.0);
            self.street_name.resize(new_edge_count, None);
        }
    }

    fn validate_edge_id(&self, id: usize) -> Result<(), AttributeError> {
        if id >= self.distance_meters.len() {
            Err(AttributeError::EdgeOutOfRange {
                id,
                edges: self.distance_meters.len(),
            })
        } else {
            Ok(())
        }
    }

    /// Sets the distance in meters for the given edge.
    /// Rejects NaN and negative values.
    pub fn set_distance_meters(&mut self, id: usize, meters: f64) -> Result<(), AttributeError> {
        self.validate_edge_id(id)?;
        if meters.is_nan() {
            return Err(AttributeError::NanValue("distance"));
        }
        if meters < 0.0 {
            return Err(AttributeError::NegativeValue("distance", meters));
        }
        self.distance_meters[id] = meters;
        Ok(())
    }

    /// Returns the distance in meters for the given edge.
    pub fn distance_meters(&self, id: usize) -> Result<f64, AttributeError> {
        self.validate_edge_id(id)?;
        Ok(self.distance_meters[id])
    }

    /// Sets the travel time in seconds for the given edge.
    /// Rejects NaN and negative values.
    pub fn set_time_seconds(&mut self, id: usize, seconds: f64) -> Result<(), AttributeError> {
        self.validate_edge_id(id)?;
        if seconds.is_nan() {
            return Err(AttributeError::NanValue("time"));
        }
        if seconds < 0.0 {
            return Err(AttributeError::NegativeValue("time", seconds));
        }
        self.time_seconds[id] = seconds;
        Ok(())
    }

    /// Returns the travel time in seconds for the given edge.
    pub fn time_seconds(&self, id: usize) -> Result<f64, AttributeError> {
        self.validate_edge_id(id)?;
        Ok(self.time_seconds[id])
    }

    /// Sets (or clears) the street name for the given edge.
    pub fn set_street_name(&mut self, id: usize, name: Option<&str>) -> Result<(), AttributeError> {
        self.validate_edge_id(id)?;
        self.street_name[id] = name.map(str::to_string);
        Ok(())
    }

    /// Returns the street name for the given edge, if any.
    pub fn street_name(&self, id: usize) -> Result<Option<&str>, AttributeError> {
        self.validate_edge_id(id)?;
        Ok(self.street_name[id].as_deref())
    }
}
