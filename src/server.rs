// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use serde::Deserialize;
use serde_json::json;

use crate::geojson;
use crate::osm::Network;
use crate::query;

/// Serves the routing API over HTTP until the process is terminated.
///
/// Endpoints:
/// - `GET /` - JSON index document describing the API.
/// - `GET /route?lat1=&lon1=&lat2=&lon2=` - GeoJSON route between two
///   points, or `{"error": "No route found"}`.
///
/// The compiled network is shared read-only across all workers; every
/// request runs an independent query with its own scratch state.
pub async fn serve(network: Network, address: &str, port: u16) -> std::io::Result<()> {
    let data = web::Data::new(network);

    log::info!(target: "osmroute.server", "listening on http://{address}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(data.clone())
            .service(
                web::resource("/route")
                    .route(web::get().to(handle_route))
                    .default_service(web::route().to(handle_method_not_allowed)),
            )
            .service(
                web::resource("/")
                    .route(web::get().to(handle_index))
                    .default_service(web::route().to(handle_method_not_allowed)),
            )
    })
    .bind((address, port))?
    .run()
    .await
}

async fn handle_index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "endpoints": {
            "/route": "GET ?lat1=&lon1=&lat2=&lon2="
        }
    }))
}

async fn handle_method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(geojson::error_body("Method not allowed"))
}

/// Raw `/route` query parameters. Kept as strings so that malformed
/// values produce this crate's own 400 error body instead of the
/// extractor's default.
#[derive(Debug, Default, Deserialize)]
struct RouteParams {
    lat1: Option<String>,
    lon1: Option<String>,
    lat2: Option<String>,
    lon2: Option<String>,
}

async fn handle_route(
    network: web::Data<Network>,
    params: web::Query<RouteParams>,
) -> HttpResponse {
    let coords = match parse_coordinates(&params) {
        Ok(coords) => coords,
        Err(message) => return HttpResponse::BadRequest().json(geojson::error_body(&message)),
    };
    let [lat1, lon1, lat2, lon2] = coords;

    match query::route_lat_lon(&network, lat1, lon1, lat2, lon2) {
        Ok(Some(outcome)) if !outcome.geometry.is_empty() => HttpResponse::Ok()
            .json(geojson::route_feature(&outcome.geometry, &outcome.instructions)),

        // A miss is not an error: 200 with an error body.
        Ok(_) => HttpResponse::Ok().json(geojson::error_body("No route found")),

        Err(e) => {
            log::error!(target: "osmroute.server", "route query failed: {e}");
            HttpResponse::InternalServerError().json(geojson::error_body("Internal server error"))
        }
    }
}

/// Extracts `lat1`, `lon1`, `lat2`, `lon2` from the query parameters,
/// in that order.
fn parse_coordinates(params: &RouteParams) -> Result<[f64; 4], String> {
    let pairs = [
        ("lat1", &params.lat1),
        ("lon1", &params.lon1),
        ("lat2", &params.lat2),
        ("lon2", &params.lon2),
    ];

    let mut out = [0.0; 4];
    for (slot, (key, value)) in out.iter_mut().zip(pairs) {
        let raw = value
            .as_deref()
            .ok_or_else(|| "Missing required parameters: lat1, lon1, lat2, lon2".to_string())?;
        *slot = raw
            .parse::<f64>()
            .map_err(|_| format!("Invalid coordinate {key}: {raw:?}"))?;
        if !slot.is_finite() {
            return Err(format!("Invalid coordinate {key}: {raw:?}"));
        }
    }
    Ok(out)
}
