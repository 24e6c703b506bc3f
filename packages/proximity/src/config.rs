//! Per-category search radius configuration.
//!
//! ```toml
//! [radii]
//! bus_stop = 1500.0
//! motorway = 8000.0
//! ```
//!
//! Categories that are not listed keep their default radius.

use std::collections::BTreeMap;
use std::path::Path;

use land_availability_amenity_models::AmenityCategory;
use serde::Deserialize;

/// Errors from loading a [`ProximityConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config is not valid TOML or has the wrong shape.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A radius is configured for a category that does not exist.
    #[error("Unknown amenity category in [radii]: {name}")]
    UnknownCategory {
        /// The key as written in the config.
        name: String,
    },

    /// A radius is negative or not finite.
    #[error("Invalid radius {radius_m} for {category}")]
    InvalidRadius {
        /// Category the radius was configured for.
        category: AmenityCategory,
        /// The rejected radius.
        radius_m: f64,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    radii: BTreeMap<String, f64>,
}

/// Radius overrides for the proximity maintainer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximityConfig {
    radii: BTreeMap<AmenityCategory, f64>,
}

impl ProximityConfig {
    /// Parses a TOML config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document does not parse, names an
    /// unknown category or has an invalid radius.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;

        let mut config = Self::default();
        for (name, radius_m) in raw.radii {
            let category = name
                .parse::<AmenityCategory>()
                .map_err(|_| ConfigError::UnknownCategory { name: name.clone() })?;
            config.set_radius(category, radius_m)?;
        }
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!(
            "Loaded {} radius override(s) from {}",
            config.radii.len(),
            path.display()
        );
        Ok(config)
    }

    /// Overrides the radius for `category`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRadius`] if `radius_m` is negative or
    /// not finite.
    pub fn set_radius(
        &mut self,
        category: AmenityCategory,
        radius_m: f64,
    ) -> Result<(), ConfigError> {
        if !radius_m.is_finite() || radius_m < 0.0 {
            return Err(ConfigError::InvalidRadius { category, radius_m });
        }
        self.radii.insert(category, radius_m);
        Ok(())
    }

    /// The configured radius for `category`, or its default.
    #[must_use]
    pub fn radius_for(&self, category: AmenityCategory) -> f64 {
        self.radii
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_radius_m())
    }
}
