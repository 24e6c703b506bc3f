#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Amenity category taxonomy and amenity record types.
//!
//! Every amenity that a land parcel can be "near" (bus stops, schools,
//! substations, ...) is modelled here, together with the per-category
//! defaults (search radius, accepted geometry shape) used by the proximity
//! maintainer. Geometries are planar coordinates in a projected,
//! meter-based CRS, so Euclidean distance is in meters.

pub mod numeric;

use geo::{Geometry, Point};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The kind of school an amenity or a ranking query refers to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum SchoolType {
    /// Primary school (ages 4-11)
    #[serde(rename = "primary_school", alias = "PRIMARY", alias = "primary")]
    #[strum(to_string = "primary_school", serialize = "PRIMARY", serialize = "primary")]
    Primary,
    /// Secondary school (ages 11-16, optionally with a sixth form)
    #[serde(rename = "secondary_school", alias = "SECONDARY", alias = "secondary")]
    #[strum(
        to_string = "secondary_school",
        serialize = "SECONDARY",
        serialize = "secondary"
    )]
    Secondary,
}

impl SchoolType {
    /// Returns the amenity category that schools of this type are indexed
    /// under.
    #[must_use]
    pub const fn category(self) -> AmenityCategory {
        match self {
            Self::Primary => AmenityCategory::PrimarySchool,
            Self::Secondary => AmenityCategory::SecondarySchool,
        }
    }
}

/// The geometry shape an amenity category is stored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmenityShape {
    /// A single point (stops, junctions, postcode centroids).
    Point,
    /// A line or multi-line (overhead power lines).
    Line,
    /// A polygon or multi-polygon (greenbelt areas).
    Polygon,
    /// Any geometry type (substation sites are mapped both ways).
    Any,
}

impl AmenityShape {
    /// Whether `geometry` has a shape acceptable for this category.
    #[must_use]
    pub fn accepts(self, geometry: &Geometry<f64>) -> bool {
        match self {
            Self::Point => matches!(geometry, Geometry::Point(_) | Geometry::MultiPoint(_)),
            Self::Line => matches!(
                geometry,
                Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_)
            ),
            Self::Polygon => matches!(
                geometry,
                Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::Rect(_)
            ),
            Self::Any => true,
        }
    }
}

/// Amenity categories a land parcel keeps proximity information for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AmenityCategory {
    /// Bus stops (NaPTAN bus stop points)
    BusStop,
    /// National rail stations
    TrainStop,
    /// Electricity substations
    Substation,
    /// Overhead power lines
    OverheadLine,
    /// Motorway junctions
    Motorway,
    /// Broadband coverage per postcode
    Broadband,
    /// Green belt areas (overlap only, no nearest link)
    Greenbelt,
    /// Primary schools
    PrimarySchool,
    /// Secondary schools
    SecondarySchool,
    /// Metro and underground stations
    MetroTube,
}

impl AmenityCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::BusStop,
            Self::TrainStop,
            Self::Substation,
            Self::OverheadLine,
            Self::Motorway,
            Self::Broadband,
            Self::Greenbelt,
            Self::PrimarySchool,
            Self::SecondarySchool,
            Self::MetroTube,
        ]
    }

    /// Categories a location stores a nearest link for. Greenbelt is
    /// tracked as an overlap flag instead.
    #[must_use]
    pub const fn linkable() -> &'static [Self] {
        &[
            Self::BusStop,
            Self::TrainStop,
            Self::Substation,
            Self::OverheadLine,
            Self::Motorway,
            Self::Broadband,
            Self::PrimarySchool,
            Self::SecondarySchool,
            Self::MetroTube,
        ]
    }

    /// Default maximum search distance in meters. Amenities further away
    /// than this are never linked.
    #[must_use]
    pub const fn default_radius_m(self) -> f64 {
        match self {
            Self::BusStop
            | Self::TrainStop
            | Self::Substation
            | Self::PrimarySchool
            | Self::SecondarySchool
            | Self::MetroTube => 1000.0,
            Self::OverheadLine => 3000.0,
            Self::Motorway => 6000.0,
            Self::Broadband | Self::Greenbelt => 500.0,
        }
    }

    /// The geometry shape amenities of this category are stored with.
    #[must_use]
    pub const fn shape(self) -> AmenityShape {
        match self {
            Self::BusStop
            | Self::TrainStop
            | Self::Motorway
            | Self::Broadband
            | Self::PrimarySchool
            | Self::SecondarySchool
            | Self::MetroTube => AmenityShape::Point,
            Self::OverheadLine => AmenityShape::Line,
            Self::Greenbelt => AmenityShape::Polygon,
            Self::Substation => AmenityShape::Any,
        }
    }

    /// The school type sub-filter for the school categories.
    #[must_use]
    pub const fn school_type(self) -> Option<SchoolType> {
        match self {
            Self::PrimarySchool => Some(SchoolType::Primary),
            Self::SecondarySchool => Some(SchoolType::Secondary),
            _ => None,
        }
    }

    /// Name of the natural key attribute for this category.
    #[must_use]
    pub const fn natural_key_name(self) -> &'static str {
        match self {
            Self::BusStop => "amic_code",
            Self::TrainStop => "atcode_code",
            Self::Substation => "name",
            Self::OverheadLine => "gdo_gid",
            Self::Motorway => "identifier",
            Self::Broadband => "postcode",
            Self::Greenbelt => "code",
            Self::PrimarySchool | Self::SecondarySchool => "urn",
            Self::MetroTube => "atco_code",
        }
    }
}

/// A bus stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusStop {
    /// AMIC code (natural key).
    pub amic_code: String,
    /// Stop name.
    pub name: Option<String>,
    /// Direction of travel or landmark description.
    pub direction: Option<String>,
    /// Area code.
    pub area: Option<String>,
    /// Road the stop is on.
    pub road: Option<String>,
    /// National gazetteer locality code.
    pub nptg_code: Option<String>,
    /// Stop position.
    pub point: Point<f64>,
}

/// A rail station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainStop {
    /// ATCO code (natural key).
    pub atcode_code: String,
    /// `NaPTAN` code.
    pub naptan_code: Option<String>,
    /// Station name.
    pub name: Option<String>,
    /// Main road access.
    pub main_road: Option<String>,
    /// Side road access.
    pub side_road: Option<String>,
    /// Stop type code (e.g. `"R"` for rail).
    pub stop_type: Option<String>,
    /// National gazetteer locality code.
    pub nptg_code: Option<String>,
    /// Local reference.
    pub local_reference: Option<String>,
    /// Station position.
    pub point: Point<f64>,
}

/// An electricity substation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substation {
    /// Substation name (natural key).
    pub name: String,
    /// Operating voltage.
    pub operating: Option<String>,
    /// Last action timestamp, as supplied.
    pub action_dtt: Option<String>,
    /// Asset status.
    pub status: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Owner flag.
    pub owner_flag: Option<String>,
    /// Asset GID.
    pub gdo_gid: Option<String>,
    /// Site geometry (point or footprint).
    pub geometry: Geometry<f64>,
}

/// An overhead power line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadLine {
    /// Asset GID (natural key).
    pub gdo_gid: String,
    /// Route asset code.
    pub route_asset: Option<String>,
    /// Tower span description.
    pub towers: Option<String>,
    /// Last action timestamp, as supplied.
    pub action_dtt: Option<String>,
    /// Asset status.
    pub status: Option<String>,
    /// Operating voltage.
    pub operating: Option<String>,
    /// First circuit.
    pub circuit_1: Option<String>,
    /// Second circuit.
    pub circuit_2: Option<String>,
    /// Line geometry.
    pub geometry: Geometry<f64>,
}

/// A motorway junction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motorway {
    /// Junction identifier (natural key).
    pub identifier: String,
    /// Junction number.
    pub number: Option<String>,
    /// Junction position.
    pub point: Point<f64>,
}

/// Broadband coverage statistics for a postcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Broadband {
    /// Normalized postcode (natural key).
    pub postcode: String,
    /// Percentage of premises with at least 30 Mbit/s.
    #[serde(default, deserialize_with = "numeric::deserialize_lenient_f64")]
    pub speed_30_mb_percentage: Option<f64>,
    /// Minimum download speed.
    #[serde(default, deserialize_with = "numeric::deserialize_lenient_f64")]
    pub min_download_speed: Option<f64>,
    /// Average download speed.
    #[serde(default, deserialize_with = "numeric::deserialize_lenient_f64")]
    pub avg_download_speed: Option<f64>,
    /// Maximum download speed.
    #[serde(default, deserialize_with = "numeric::deserialize_lenient_f64")]
    pub max_download_speed: Option<f64>,
    /// Minimum upload speed.
    #[serde(default, deserialize_with = "numeric::deserialize_lenient_f64")]
    pub min_upload_speed: Option<f64>,
    /// Average upload speed.
    #[serde(default, deserialize_with = "numeric::deserialize_lenient_f64")]
    pub avg_upload_speed: Option<f64>,
    /// Maximum upload speed.
    #[serde(default, deserialize_with = "numeric::deserialize_lenient_f64")]
    pub max_upload_speed: Option<f64>,
    /// Postcode centroid, taken from the matching code point.
    pub point: Point<f64>,
}

impl Broadband {
    /// Whether at least some premises in the postcode get 30 Mbit/s.
    #[must_use]
    pub fn is_fast(&self) -> bool {
        self.speed_30_mb_percentage.is_some_and(|pct| pct > 0.0)
    }
}

/// A green belt area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Greenbelt {
    /// Feature code (natural key).
    pub code: String,
    /// Local authority name.
    pub la_name: Option<String>,
    /// Green belt name.
    pub gb_name: Option<String>,
    /// ONS area code.
    pub ons_code: Option<String>,
    /// Survey year.
    pub year: Option<String>,
    /// Area in hectares.
    pub area_ha: Option<f64>,
    /// Perimeter in kilometers.
    pub perimeter_km: Option<f64>,
    /// Area geometry.
    pub geometry: Geometry<f64>,
}

/// A school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    /// Unique reference number (natural key).
    pub urn: String,
    /// Local authority name.
    pub la_name: Option<String>,
    /// School name.
    pub school_name: Option<String>,
    /// Primary or secondary.
    pub school_type: SchoolType,
    /// Pupil capacity.
    pub school_capacity: Option<u32>,
    /// Number of pupils on roll.
    pub school_pupils: Option<u32>,
    /// Normalized postcode.
    pub postcode: Option<String>,
    /// School position.
    pub point: Point<f64>,
}

/// A metro or underground station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetroTube {
    /// ATCO code (natural key).
    pub atco_code: String,
    /// `NaPTAN` code.
    pub naptan_code: Option<String>,
    /// Station name.
    pub name: Option<String>,
    /// Locality name.
    pub locality: Option<String>,
    /// Station position.
    pub point: Point<f64>,
}

/// Any amenity a land parcel can be linked to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Amenity {
    /// A bus stop.
    BusStop(BusStop),
    /// A rail station.
    TrainStop(TrainStop),
    /// An electricity substation.
    Substation(Substation),
    /// An overhead power line.
    OverheadLine(OverheadLine),
    /// A motorway junction.
    Motorway(Motorway),
    /// Broadband coverage for a postcode.
    Broadband(Broadband),
    /// A green belt area.
    Greenbelt(Greenbelt),
    /// A primary or secondary school.
    School(School),
    /// A metro or underground station.
    MetroTube(MetroTube),
}

impl Amenity {
    /// The category this amenity is indexed and linked under.
    ///
    /// Schools are split by their [`SchoolType`].
    #[must_use]
    pub const fn category(&self) -> AmenityCategory {
        match self {
            Self::BusStop(_) => AmenityCategory::BusStop,
            Self::TrainStop(_) => AmenityCategory::TrainStop,
            Self::Substation(_) => AmenityCategory::Substation,
            Self::OverheadLine(_) => AmenityCategory::OverheadLine,
            Self::Motorway(_) => AmenityCategory::Motorway,
            Self::Broadband(_) => AmenityCategory::Broadband,
            Self::Greenbelt(_) => AmenityCategory::Greenbelt,
            Self::School(school) => school.school_type.category(),
            Self::MetroTube(_) => AmenityCategory::MetroTube,
        }
    }

    /// The category-specific natural key.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::BusStop(a) => &a.amic_code,
            Self::TrainStop(a) => &a.atcode_code,
            Self::Substation(a) => &a.name,
            Self::OverheadLine(a) => &a.gdo_gid,
            Self::Motorway(a) => &a.identifier,
            Self::Broadband(a) => &a.postcode,
            Self::Greenbelt(a) => &a.code,
            Self::School(a) => &a.urn,
            Self::MetroTube(a) => &a.atco_code,
        }
    }

    /// The amenity geometry.
    #[must_use]
    pub fn geometry(&self) -> Geometry<f64> {
        match self {
            Self::BusStop(a) => a.point.into(),
            Self::TrainStop(a) => a.point.into(),
            Self::Motorway(a) => a.point.into(),
            Self::Broadband(a) => a.point.into(),
            Self::School(a) => a.point.into(),
            Self::MetroTube(a) => a.point.into(),
            Self::Substation(a) => a.geometry.clone(),
            Self::OverheadLine(a) => a.geometry.clone(),
            Self::Greenbelt(a) => a.geometry.clone(),
        }
    }

    /// Identity of this amenity across categories.
    #[must_use]
    pub fn id(&self) -> AmenityId {
        AmenityId::new(self.category(), self.key())
    }
}

/// Category-qualified amenity identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AmenityId {
    /// Amenity category.
    pub category: AmenityCategory,
    /// Natural key within the category.
    pub key: String,
}

impl AmenityId {
    /// Creates an identity from a category and natural key.
    #[must_use]
    pub fn new(category: AmenityCategory, key: impl Into<String>) -> Self {
        Self {
            category,
            key: key.into(),
        }
    }
}

impl std::fmt::Display for AmenityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.category, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, point};

    #[test]
    fn linkable_excludes_greenbelt_only() {
        let linkable = AmenityCategory::linkable();
        assert_eq!(linkable.len(), AmenityCategory::all().len() - 1);
        assert!(!linkable.contains(&AmenityCategory::Greenbelt));
    }

    #[test]
    fn default_radii_match_category_table() {
        assert!((AmenityCategory::BusStop.default_radius_m() - 1000.0).abs() < f64::EPSILON);
        assert!((AmenityCategory::OverheadLine.default_radius_m() - 3000.0).abs() < f64::EPSILON);
        assert!((AmenityCategory::Motorway.default_radius_m() - 6000.0).abs() < f64::EPSILON);
        assert!((AmenityCategory::Broadband.default_radius_m() - 500.0).abs() < f64::EPSILON);
        assert!((AmenityCategory::MetroTube.default_radius_m() - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn school_category_follows_school_type() {
        let school = Amenity::School(School {
            urn: "100001".to_string(),
            la_name: None,
            school_name: Some("Dataland Primary".to_string()),
            school_type: SchoolType::Secondary,
            school_capacity: Some(900),
            school_pupils: Some(850),
            postcode: None,
            point: point!(x: 10.0, y: 20.0),
        });
        assert_eq!(school.category(), AmenityCategory::SecondarySchool);
        assert_eq!(school.key(), "100001");
        assert_eq!(
            AmenityCategory::SecondarySchool.school_type(),
            Some(SchoolType::Secondary)
        );
    }

    #[test]
    fn parses_school_type_aliases() {
        assert_eq!(
            "primary_school".parse::<SchoolType>().unwrap(),
            SchoolType::Primary
        );
        assert_eq!(
            "SECONDARY".parse::<SchoolType>().unwrap(),
            SchoolType::Secondary
        );
        assert!("nursery".parse::<SchoolType>().is_err());
        assert_eq!(SchoolType::Secondary.to_string(), "secondary_school");
    }

    #[test]
    fn shape_rejects_mismatched_geometry() {
        let line: Geometry<f64> = LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]).into();
        let pt: Geometry<f64> = point!(x: 0.0, y: 0.0).into();
        assert!(AmenityShape::Line.accepts(&line));
        assert!(!AmenityShape::Point.accepts(&line));
        assert!(AmenityShape::Point.accepts(&pt));
        assert!(AmenityShape::Any.accepts(&line));
    }

    #[test]
    fn category_round_trips_through_strings() {
        for category in AmenityCategory::all() {
            let parsed: AmenityCategory = category.as_ref().parse().unwrap();
            assert_eq!(parsed, *category);
        }
        assert_eq!(AmenityCategory::MetroTube.to_string(), "metro_tube");
    }
}
