//! In-memory store backed by ordered maps.
//!
//! Writes never fail. Iteration order is deterministic (by key), which the
//! search results and tests rely on.

use std::collections::{BTreeMap, BTreeSet};

use land_availability_amenity_models::{Amenity, AmenityCategory, AmenityId};
use land_availability_location_models::{Address, CodePoint, Location};

use crate::{AmenityStore, LocationStore, PersistenceError, ReferenceStore};

/// In-memory implementation of every storage trait.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    locations: BTreeMap<String, Location>,
    amenities: BTreeMap<AmenityCategory, BTreeMap<String, Amenity>>,
    codepoints: BTreeMap<String, CodePoint>,
    addresses: BTreeMap<String, Address>,
    /// postcode -> address UPRNs
    addresses_by_postcode: BTreeMap<String, BTreeSet<String>>,
}

impl MemoryDatabase {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored locations.
    #[must_use]
    pub fn location_count(&self) -> usize {
        self.locations.len()
    }
}

impl LocationStore for MemoryDatabase {
    fn location(&self, uprn: &str) -> Result<Option<Location>, PersistenceError> {
        Ok(self.locations.get(uprn).cloned())
    }

    fn save_location(&mut self, location: &Location) -> Result<(), PersistenceError> {
        self.locations
            .insert(location.uprn.clone(), location.clone());
        Ok(())
    }

    fn delete_location(&mut self, uprn: &str) -> Result<bool, PersistenceError> {
        Ok(self.locations.remove(uprn).is_some())
    }

    fn locations_linked_to(&self, amenity: &AmenityId) -> Result<Vec<String>, PersistenceError> {
        Ok(self
            .locations
            .values()
            .filter(|location| location.links_to(amenity))
            .map(|location| location.uprn.clone())
            .collect())
    }

    fn all_locations(&self) -> Result<Vec<Location>, PersistenceError> {
        Ok(self.locations.values().cloned().collect())
    }
}

impl AmenityStore for MemoryDatabase {
    fn amenity(
        &self,
        category: AmenityCategory,
        key: &str,
    ) -> Result<Option<Amenity>, PersistenceError> {
        Ok(self
            .amenities
            .get(&category)
            .and_then(|by_key| by_key.get(key))
            .cloned())
    }

    fn save_amenity(&mut self, amenity: &Amenity) -> Result<Option<Amenity>, PersistenceError> {
        Ok(self
            .amenities
            .entry(amenity.category())
            .or_default()
            .insert(amenity.key().to_string(), amenity.clone()))
    }

    fn delete_amenity(
        &mut self,
        category: AmenityCategory,
        key: &str,
    ) -> Result<Option<Amenity>, PersistenceError> {
        Ok(self
            .amenities
            .get_mut(&category)
            .and_then(|by_key| by_key.remove(key)))
    }

    fn count_amenities(&self, category: AmenityCategory) -> Result<usize, PersistenceError> {
        Ok(self.amenities.get(&category).map_or(0, BTreeMap::len))
    }
}

impl ReferenceStore for MemoryDatabase {
    fn codepoint(&self, postcode: &str) -> Result<Option<CodePoint>, PersistenceError> {
        Ok(self.codepoints.get(postcode).cloned())
    }

    fn save_codepoint(&mut self, codepoint: &CodePoint) -> Result<(), PersistenceError> {
        self.codepoints
            .insert(codepoint.postcode.clone(), codepoint.clone());
        Ok(())
    }

    fn save_address(&mut self, address: &Address) -> Result<(), PersistenceError> {
        if let Some(previous) = self.addresses.insert(address.uprn.clone(), address.clone())
            && let Some(old_postcode) = previous.postcode
            && let Some(uprns) = self.addresses_by_postcode.get_mut(&old_postcode)
        {
            uprns.remove(&address.uprn);
        }

        if let Some(postcode) = &address.postcode {
            self.addresses_by_postcode
                .entry(postcode.clone())
                .or_default()
                .insert(address.uprn.clone());
        }

        Ok(())
    }

    fn addresses_for_postcode(&self, postcode: &str) -> Result<Vec<Address>, PersistenceError> {
        let Some(uprns) = self.addresses_by_postcode.get(postcode) else {
            return Ok(Vec::new());
        };

        let mut addresses = Vec::with_capacity(uprns.len());
        for uprn in uprns {
            match self.addresses.get(uprn) {
                Some(address) => addresses.push(address.clone()),
                None => log::warn!("Postcode {postcode} indexes missing address {uprn}"),
            }
        }
        Ok(addresses)
    }
}
