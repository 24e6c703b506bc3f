//! Registry of linkable amenity categories.
//!
//! One descriptor per category drives the generic nearest-link procedure,
//! instead of a separate update routine for each amenity type.

use land_availability_amenity_models::{AmenityCategory, AmenityShape, SchoolType};
use land_availability_spatial::Layer;

use crate::config::ProximityConfig;

/// How the maintainer treats one amenity category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryDescriptor {
    /// The category described.
    pub category: AmenityCategory,
    /// Maximum link distance in meters.
    pub radius_m: f64,
    /// Geometry shape stored for the category.
    pub shape: AmenityShape,
    /// Schools are split into one layer per school type.
    pub school_type: Option<SchoolType>,
}

impl CategoryDescriptor {
    /// The spatial index layer holding amenities of this category.
    #[must_use]
    pub const fn layer(&self) -> Layer {
        Layer::Amenity(self.category)
    }
}

/// Category descriptors with configured radii.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryRegistry {
    config: ProximityConfig,
}

impl CategoryRegistry {
    /// A registry using the default radius for every category.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// A registry applying the radius overrides from `config`.
    #[must_use]
    pub const fn from_config(config: ProximityConfig) -> Self {
        Self { config }
    }

    /// The descriptor for `category`.
    #[must_use]
    pub fn descriptor(&self, category: AmenityCategory) -> CategoryDescriptor {
        CategoryDescriptor {
            category,
            radius_m: self.config.radius_for(category),
            shape: category.shape(),
            school_type: category.school_type(),
        }
    }

    /// Descriptors of every category a location keeps a link for.
    pub fn linkable(&self) -> impl Iterator<Item = CategoryDescriptor> + '_ {
        AmenityCategory::linkable()
            .iter()
            .map(|category| self.descriptor(*category))
    }
}
