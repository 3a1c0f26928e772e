// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde_json::{json, Value};

use crate::geometry::Point;
use crate::instructions::Instruction;

/// Renders a computed route as a GeoJSON `Feature` with a `LineString`
/// geometry and the rendered instruction texts under
/// `properties.instructions`.
///
/// `points` must already be in GeoJSON coordinate order: `x = lon`,
/// `y = lat`.
pub fn route_feature(points: &[Point], instructions: &[Instruction]) -> Value {
    let coordinates: Vec<Value> = points.iter().map(|p| json!([p.x, p.y])).collect();
    let texts: Vec<Value> = instructions
        .iter()
        .map(|i| Value::String(i.to_text()))
        .collect();

    json!({
        "type": "Feature",
        "geometry": {
            "type": "LineString",
            "coordinates": coordinates,
        },
        "properties": {
            "instructions": texts,
        },
    })
}

/// Renders an error message as the JSON error body used by the
/// HTTP surface.
pub fn error_body(message: &str) -> Value {
    json!({ "error": message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::Maneuver;

    #[test]
    fn feature_shape() {
        let points = vec![Point::new(-63.1311, 46.2382), Point::new(-63.12, 46.25)];
        let instructions = vec![
            Instruction {
                maneuver: Maneuver::Start,
                street: "Main Street".to_string(),
                distance_meters: 0.0,
            },
            Instruction {
                maneuver: Maneuver::Arrive,
                street: String::new(),
                distance_meters: 250.0,
            },
        ];

        let feature = route_feature(&points, &instructions);
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "LineString");

        // Coordinates are [lon, lat] pairs.
        let coords = feature["geometry"]["coordinates"].as_array().unwrap();
        assert_eq!(coords.len(), 2);
        assert_eq!(coords[0][0], -63.1311);
        assert_eq!(coords[0][1], 46.2382);

        let texts = feature["properties"]["instructions"].as_array().unwrap();
        assert_eq!(texts[0], "Start on Main Street");
        assert_eq!(texts[1], "You have arrived");
    }

    #[test]
    fn empty_route_is_still_valid_geojson() {
        let feature = route_feature(&[], &[]);
        assert_eq!(
            feature["geometry"]["coordinates"].as_array().unwrap().len(),
            0,
        );
    }

    #[test]
    fn error_body_shape() {
        let body = error_body("No route found");
        assert_eq!(body["error"], "No route found");
        // Quotes and backslashes survive serialization intact.
        let tricky = error_body(r#"bad "input" \ here"#);
        let text = serde_json::to_string(&tricky).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&text).unwrap()["error"],
            r#"bad "input" \ here"#,
        );
    }
}
