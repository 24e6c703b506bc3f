//! `GeoJSON` parsing for geometries supplied as text.

use geo::{Geometry, MultiPolygon};
use geojson::GeoJson;

/// Errors from parsing a `GeoJSON` geometry.
#[derive(Debug, thiserror::Error)]
pub enum GeometryParseError {
    /// The text is not valid `GeoJSON`.
    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    /// The document has no geometry (a feature collection, or a feature
    /// without geometry).
    #[error("GeoJSON document does not contain a single geometry")]
    NoGeometry,
    /// The geometry is not a polygon or multi-polygon.
    #[error("Expected a Polygon or MultiPolygon, found {found}")]
    NotPolygonal {
        /// Type of the geometry that was found.
        found: &'static str,
    },
}

/// Parses a `GeoJSON` geometry or feature into a [`Geometry`].
///
/// # Errors
///
/// Returns [`GeometryParseError`] if the text is not valid `GeoJSON` or does
/// not hold exactly one geometry.
pub fn parse_geojson_geometry(geojson_str: &str) -> Result<Geometry<f64>, GeometryParseError> {
    let geojson: GeoJson = geojson_str.parse()?;
    let geometry = match geojson {
        GeoJson::Geometry(geometry) => geometry,
        GeoJson::Feature(feature) => feature.geometry.ok_or(GeometryParseError::NoGeometry)?,
        GeoJson::FeatureCollection(_) => return Err(GeometryParseError::NoGeometry),
    };
    Ok(geometry.try_into()?)
}

/// Parses a `GeoJSON` string into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
///
/// # Errors
///
/// Returns [`GeometryParseError`] if the text does not parse or is not
/// polygonal.
pub fn parse_geojson_to_multipolygon(
    geojson_str: &str,
) -> Result<MultiPolygon<f64>, GeometryParseError> {
    match parse_geojson_geometry(geojson_str)? {
        Geometry::MultiPolygon(mp) => Ok(mp),
        Geometry::Polygon(p) => Ok(MultiPolygon(vec![p])),
        other => Err(GeometryParseError::NotPolygonal {
            found: geometry_type_name(&other),
        }),
    }
}

const fn geometry_type_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
