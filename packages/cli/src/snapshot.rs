//! JSON snapshot of reference data, amenities and parcels that the `search`
//! command loads into an in-memory catalog.

use std::path::Path;

use land_availability_amenity_models::Amenity;
use land_availability_catalog::{Catalog, CatalogError};
use land_availability_location_models::{Address, CodePoint, LocationDraft};
use land_availability_proximity::{MaintenanceReport, ProximityMaintainer};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub codepoints: Vec<CodePoint>,
    pub addresses: Vec<Address>,
    pub amenities: Vec<Amenity>,
    pub locations: Vec<LocationDraft>,
}

impl Snapshot {
    pub fn read(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Builds a catalog in dependency order: postcodes first so broadband
    /// records can be placed, then amenities, then parcels.
    pub fn into_catalog(self, maintainer: ProximityMaintainer) -> Result<Catalog, CatalogError> {
        let mut catalog = Catalog::in_memory(maintainer);

        for codepoint in self.codepoints {
            catalog.upsert_codepoint(codepoint)?;
        }
        for address in self.addresses {
            catalog.upsert_address(address)?;
        }

        let mut report = MaintenanceReport::default();
        for amenity in self.amenities {
            report.merge(match amenity {
                Amenity::Broadband(broadband) => catalog.upsert_broadband(broadband)?,
                other => catalog.upsert_amenity(other)?,
            });
        }

        let locations = self.locations.len();
        for draft in self.locations {
            catalog.upsert_location(draft)?;
        }

        log::info!("Loaded snapshot: {locations} location(s), amenity maintenance {report}");
        Ok(catalog)
    }
}
