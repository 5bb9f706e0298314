#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the incident map toolchain.
//!
//! - `map` turns a grouped incident file into `confidential.json`,
//!   `features.geojson` and (optionally) `index.html`.
//! - `resolve` geocodes a single block address and prints its bounding
//!   feature.
//! - `parse-report` extracts district incidents from a weekly report PDF
//!   or its extracted text.
//!
//! Uses `indicatif-log-bridge` (via [`incident_map_cli_utils::init_logger`])
//! so that log lines and the progress bar never fight for the terminal.

mod report;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use incident_map_cli_utils::IndicatifProgress;
use incident_map_geocoder::address::{address_range, full_address};
use incident_map_geocoder::service_registry::{NominatimService, nominatim_service};
use incident_map_geocoder::{Geocoder, NominatimGeocoder};
use incident_map_mapper::config::MapperConfig;
use incident_map_mapper::{IncidentMapper, input, output};

#[derive(Parser)]
#[command(name = "incident_map", about = "Incident report mapping tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Geocoding service selection shared by every command that geocodes.
#[derive(Args)]
struct GeocoderArgs {
    /// TOML service definition replacing the built-in public Nominatim
    #[arg(long)]
    service: Option<PathBuf>,
    /// Nominatim search endpoint (overrides the service definition)
    #[arg(long)]
    base_url: Option<String>,
    /// `User-Agent` sent with every lookup (overrides the service definition)
    #[arg(long)]
    user_agent: Option<String>,
}

impl GeocoderArgs {
    fn service(self) -> Result<NominatimService, Box<dyn std::error::Error>> {
        let service = match &self.service {
            Some(path) => NominatimService::from_toml_file(path)?,
            None => nominatim_service(),
        };
        Ok(service.with_overrides(self.base_url, self.user_agent))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Map every incident in a grouped JSON file to a bounding polygon
    Map {
        /// Grouped incident file (`{ "<district>": [ { date, incident, location } ] }`)
        #[arg(long)]
        input: PathBuf,
        /// Mapper config TOML (`jurisdiction`, `output_dir`, `template`, ...)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output directory (overrides the config file)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// City and state appended to each address (overrides the config file)
        #[arg(long)]
        jurisdiction: Option<String>,
        /// Map page copied to `index.html` (overrides the config file)
        #[arg(long)]
        template: Option<PathBuf>,
        #[command(flatten)]
        geocoder: GeocoderArgs,
    },
    /// Geocode one (block) address and print its bounding feature
    Resolve {
        /// Partial address, e.g. "22XX S SHILOH RD"
        address: String,
        /// City and state appended to the address
        #[arg(long, default_value = "Garland TX")]
        jurisdiction: String,
        #[command(flatten)]
        geocoder: GeocoderArgs,
    },
    /// Extract district incidents from weekly report text
    ParseReport {
        /// Weekly report: a `.pdf` file, or text already extracted from one
        #[arg(long)]
        input: PathBuf,
        /// Comma-separated district numbers (overrides `DISTRICTS_OF_INTEREST` env var)
        #[arg(long)]
        districts: Option<String>,
        /// Directory receiving `districts_incidents_week_<N>.json`
        #[arg(long, default_value = "exported-incidents")]
        output_dir: PathBuf,
        /// Also write the plain-text weekly summary
        #[arg(long)]
        summary: bool,
        /// City and state used in the summary heading
        #[arg(long, default_value = "Garland TX")]
        jurisdiction: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = incident_map_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Map {
            input,
            config,
            output_dir,
            jurisdiction,
            template,
            geocoder,
        } => {
            let mut config = match &config {
                Some(path) => MapperConfig::from_toml_file(path)?,
                None => MapperConfig::default(),
            };
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(j) = jurisdiction {
                config.jurisdiction = j;
            }
            if template.is_some() {
                config.template = template;
            }

            let service = geocoder.service()?;
            log::info!("Geocoding with {} ({})", service.name, service.base_url);
            let geocoder = NominatimGeocoder::new(&service)?;

            let records = input::load_grouped(&input)?;
            let mapper = IncidentMapper::new(config, geocoder);

            let start = Instant::now();
            let progress = IndicatifProgress::records_bar(&multi, "Mapping incidents");
            let result = mapper.process_all(&records, &progress).await;

            output::write_outputs(mapper.config(), &result)?;

            let stats = result.stats;
            log::info!(
                "Done in {:.1}s: {} mapped, {} confidential, {} unresolved, {} malformed",
                start.elapsed().as_secs_f64(),
                stats.mapped,
                stats.confidential,
                stats.unresolved,
                stats.malformed
            );
        }
        Commands::Resolve {
            address,
            jurisdiction,
            geocoder,
        } => {
            let geocoder = NominatimGeocoder::new(&geocoder.service()?)?;
            let full = full_address(&address, &jurisdiction);
            let range = address_range(&full);

            println!("low address:  {}", range.low);
            let low = geocoder.resolve(&range.low).await;
            println!("low point:    {low:?}");

            println!("high address: {}", range.high);
            let high = geocoder.resolve(&range.high).await;
            println!("high point:   {high:?}");

            match incident_map_spatial::synthesize(low, high) {
                Some(bbox) => {
                    if low == high {
                        log::warn!(
                            "Low and high ends resolved identically, using a buffered square"
                        );
                    }
                    println!("{}", serde_json::to_string_pretty(&bbox.to_feature())?);
                }
                None => {
                    log::error!(
                        "Could not create bounding box: one or both geocoded points are missing"
                    );
                }
            }
        }
        Commands::ParseReport {
            input,
            districts,
            output_dir,
            summary,
            jurisdiction,
        } => {
            report::run(&input, districts, &output_dir, summary, &jurisdiction)?;
        }
    }

    Ok(())
}
