#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line tools for land availability.
//!
//! ```text
//! land_availability site-size --school-type primary_school --pupils 210
//! land_availability rank rows.json --school-type primary_school
//! land_availability search snapshot.json --x 390000 --y 405000
//! ```
//!
//! `RUST_LOG` controls log output. `--config` loads per-category search
//! radii from a TOML file.

mod snapshot;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use land_availability_amenity_models::SchoolType;
use land_availability_proximity::{CategoryRegistry, ProximityConfig, ProximityMaintainer};
use land_availability_ranking::{SchoolRequirement, area_per_pupil, rank_school_sites, school_site_size};
use land_availability_ranking_models::FeatureVector;
use land_availability_search::{SearchLimits, SearchParams};

use crate::snapshot::Snapshot;

#[derive(Parser)]
#[command(
    name = "land_availability",
    about = "School site sizing, ranking and location search"
)]
struct Cli {
    /// TOML file with per-category search radii
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the recommended site area for a school
    SiteSize {
        /// `primary_school` or `secondary_school`
        #[arg(long, value_parser = parse_school_type)]
        school_type: SchoolType,
        /// Total pupils, including post-16
        #[arg(long, default_value = "0")]
        pupils: u32,
        /// Sixth form pupils
        #[arg(long, default_value = "0")]
        post16: u32,
    },
    /// Rank candidate sites given as a JSON array of feature objects
    Rank {
        /// JSON file of feature rows keyed by criterion label
        input: PathBuf,
        /// `primary_school` or `secondary_school`
        #[arg(long, value_parser = parse_school_type)]
        school_type: SchoolType,
        /// Total pupils, including post-16
        #[arg(long, default_value = "0")]
        pupils: u32,
        /// Sixth form pupils
        #[arg(long, default_value = "0")]
        post16: u32,
    },
    /// Search the locations of a JSON snapshot
    Search {
        /// JSON snapshot with codepoints, addresses, amenities and locations
        snapshot: PathBuf,
        #[arg(long)]
        postcode: Option<String>,
        #[arg(long)]
        x: Option<String>,
        #[arg(long)]
        y: Option<String>,
        /// Search radius in meters
        #[arg(long)]
        range_distance: Option<String>,
        /// `GeoJSON` Polygon or `MultiPolygon` to search within
        #[arg(long)]
        polygon: Option<String>,
        /// Rank results for this school type
        #[arg(long)]
        school_type: Option<String>,
        #[arg(long)]
        pupils: Option<String>,
        #[arg(long)]
        post16: Option<String>,
        #[arg(long)]
        page: Option<String>,
        #[arg(long)]
        page_size: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::SiteSize {
            school_type,
            pupils,
            post16,
        } => {
            let requirement = SchoolRequirement {
                school_type,
                pupils,
                post16,
            };
            let area = school_site_size(pupils, post16, school_type);
            let query = requirement.query();

            println!("Site size:      {area:.2} m2");
            println!(
                "Suitable range: {:.2} - {:.2} m2",
                query.lower_site_req, query.upper_site_req
            );
            if let Some(per_pupil) = area_per_pupil(area, pupils) {
                println!("Per pupil:      {per_pupil:.2} m2");
            }
        }
        Commands::Rank {
            input,
            school_type,
            pupils,
            post16,
        } => {
            let content = std::fs::read_to_string(&input)?;
            let rows: Vec<FeatureVector> = serde_json::from_str(&content)?;
            let requirement = SchoolRequirement {
                school_type,
                pupils,
                post16,
            };
            let ranking = rank_school_sites(&rows, &requirement);

            println!(
                "Site requirement: {:.2} - {:.2} m2",
                ranking.lower_site_req, ranking.upper_site_req
            );
            println!("{:<6} {:<6} {:<10} AREA SUITABLE", "RANK", "ROW", "SCORE");
            println!("{}", "-".repeat(38));
            for (position, candidate) in ranking.candidates.iter().enumerate() {
                println!(
                    "{:<6} {:<6} {:<10.4} {}",
                    position + 1,
                    candidate.index,
                    candidate.score,
                    candidate.area_suitable
                );
            }
        }
        Commands::Search {
            snapshot,
            postcode,
            x,
            y,
            range_distance,
            polygon,
            school_type,
            pupils,
            post16,
            page,
            page_size,
        } => {
            let params = SearchParams {
                postcode,
                x,
                y,
                range_distance,
                polygon,
                school_type,
                pupils,
                post16,
                page,
                page_size,
            };
            let search = params.validate(&SearchLimits::default())?;

            let maintainer = maintainer(cli.config.as_deref())?;
            let catalog = Snapshot::read(&snapshot)?.into_catalog(maintainer)?;
            let results = catalog.search(&search)?;

            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}

fn maintainer(config: Option<&Path>) -> Result<ProximityMaintainer, Box<dyn std::error::Error>> {
    let registry = match config {
        Some(path) => CategoryRegistry::from_config(ProximityConfig::load(path)?),
        None => CategoryRegistry::with_defaults(),
    };
    Ok(ProximityMaintainer::new(registry))
}

fn parse_school_type(raw: &str) -> Result<SchoolType, String> {
    raw.parse()
        .map_err(|_| format!("unknown school type {raw:?}, expected primary_school or secondary_school"))
}
