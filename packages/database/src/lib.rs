#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Storage traits for locations, amenities and postcode reference data.
//!
//! The proximity maintainer and the catalog only talk to these traits, so
//! the persistence technology stays swappable. [`memory::MemoryDatabase`]
//! is the in-process implementation used by the CLI and the tests.

pub mod memory;

use land_availability_amenity_models::{Amenity, AmenityCategory, AmenityId};
use land_availability_location_models::{Address, CodePoint, Location};

pub use memory::MemoryDatabase;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The backing store rejected or failed the operation.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of what went wrong.
        message: String,
    },
}

/// Persistence for land parcels.
pub trait LocationStore {
    /// Loads the location with parcel key `uprn`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the store cannot be read.
    fn location(&self, uprn: &str) -> Result<Option<Location>, PersistenceError>;

    /// Inserts or replaces a location.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the write fails.
    fn save_location(&mut self, location: &Location) -> Result<(), PersistenceError>;

    /// Deletes a location, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the write fails.
    fn delete_location(&mut self, uprn: &str) -> Result<bool, PersistenceError>;

    /// Parcel keys of every location whose link for the amenity's category
    /// references it.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the store cannot be read.
    fn locations_linked_to(&self, amenity: &AmenityId) -> Result<Vec<String>, PersistenceError>;

    /// Every stored location, ordered by parcel key.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the store cannot be read.
    fn all_locations(&self) -> Result<Vec<Location>, PersistenceError>;
}

/// Persistence for amenities, keyed by category and natural key.
pub trait AmenityStore {
    /// Loads the amenity `key` of `category`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the store cannot be read.
    fn amenity(
        &self,
        category: AmenityCategory,
        key: &str,
    ) -> Result<Option<Amenity>, PersistenceError>;

    /// Inserts or replaces an amenity. Returns the replaced record, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the write fails.
    fn save_amenity(&mut self, amenity: &Amenity) -> Result<Option<Amenity>, PersistenceError>;

    /// Deletes an amenity, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the write fails.
    fn delete_amenity(
        &mut self,
        category: AmenityCategory,
        key: &str,
    ) -> Result<Option<Amenity>, PersistenceError>;

    /// Number of stored amenities of `category`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the store cannot be read.
    fn count_amenities(&self, category: AmenityCategory) -> Result<usize, PersistenceError>;
}

/// Persistence for postcode centroids and postal addresses.
pub trait ReferenceStore {
    /// Loads the code point for a normalized postcode.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the store cannot be read.
    fn codepoint(&self, postcode: &str) -> Result<Option<CodePoint>, PersistenceError>;

    /// Inserts or replaces a code point.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the write fails.
    fn save_codepoint(&mut self, codepoint: &CodePoint) -> Result<(), PersistenceError>;

    /// Inserts or replaces an address.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the write fails.
    fn save_address(&mut self, address: &Address) -> Result<(), PersistenceError>;

    /// Every address with the normalized `postcode`, ordered by UPRN.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the store cannot be read.
    fn addresses_for_postcode(&self, postcode: &str) -> Result<Vec<Address>, PersistenceError>;
}
