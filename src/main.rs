// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use osmroute::{geojson, osm, query, server};

#[derive(Parser)]
#[command(about = "Regional road-network routing over OpenStreetMap extracts")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Compute a single route and print it as GeoJSON
    Route {
        /// The path to the OSM file (.osm, .osm.gz or .osm.bz2)
        osm_file: PathBuf,

        /// Latitude of the start point
        start_lat: f64,

        /// Longitude of the start point
        start_lon: f64,

        /// Latitude of the end point
        end_lat: f64,

        /// Longitude of the end point
        end_lon: f64,
    },

    /// Compile the network once, then serve the routing API over HTTP
    Serve {
        /// The path to the OSM file (.osm, .osm.gz or .osm.bz2)
        osm_file: PathBuf,

        #[arg(short, long, default_value = "127.0.0.1")]
        address: String,

        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
}

#[actix_web::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Route {
            osm_file,
            start_lat,
            start_lon,
            end_lat,
            end_lon,
        } => {
            let network = osm::compile_file(&osm_file)?;

            match query::route_lat_lon(&network, start_lat, start_lon, end_lat, end_lon)? {
                Some(outcome) if !outcome.geometry.is_empty() => {
                    let feature =
                        geojson::route_feature(&outcome.geometry, &outcome.instructions);
                    println!("{}", serde_json::to_string_pretty(&feature)?);
                    Ok(ExitCode::SUCCESS)
                }
                _ => {
                    eprintln!("No route found");
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::Serve {
            osm_file,
            address,
            port,
        } => {
            let network = osm::compile_file(&osm_file)?;
            server::serve(network, &address, port).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
