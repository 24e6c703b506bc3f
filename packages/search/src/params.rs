//! Raw query parameters and their validation.

use geo::Point;
use land_availability_amenity_models::SchoolType;
use land_availability_location_models::normalize_postcode;
use land_availability_ranking::SchoolRequirement;
use land_availability_spatial::parse_geojson_to_multipolygon;
use serde::{Deserialize, Serialize};

use crate::{LocationSearch, Origin, SearchError, SpatialFilter};

/// Bounds applied to search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Smallest accepted page size.
    pub min_page_size: usize,
    /// Largest accepted page size.
    pub max_page_size: usize,
    /// Page size when none is given.
    pub default_page_size: usize,
    /// Search radius in meters when a point or postcode is given without
    /// one.
    pub default_radius_m: f64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            min_page_size: 1,
            max_page_size: 100,
            default_page_size: 10,
            default_radius_m: 1000.0,
        }
    }
}

/// Query parameters as received, before validation.
///
/// `x`/`y` are easting and northing in the projected CRS. `polygon` is a
/// `GeoJSON` Polygon or `MultiPolygon`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Postcode to search around.
    pub postcode: Option<String>,
    /// Easting of the point to search around.
    pub x: Option<String>,
    /// Northing of the point to search around.
    pub y: Option<String>,
    /// Search radius in meters.
    pub range_distance: Option<String>,
    /// Area to search within.
    pub polygon: Option<String>,
    /// `primary_school` or `secondary_school`; enables ranking.
    pub school_type: Option<String>,
    /// Pupils of the school to site.
    pub pupils: Option<String>,
    /// Sixth form pupils of the school to site.
    pub post16: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    /// Results per page.
    pub page_size: Option<String>,
}

impl SearchParams {
    /// Checks and converts the parameters into a [`LocationSearch`].
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] for non-numeric numbers, a page below 1, a
    /// page size outside the limits, an unknown school type, a negative
    /// radius, an unparseable polygon, or when no spatial filter is given.
    pub fn validate(&self, limits: &SearchLimits) -> Result<LocationSearch, SearchError> {
        let filter = self.spatial_filter(limits)?;

        let page = parse_opt::<usize>("page", self.page.as_deref())?.unwrap_or(1);
        if page < 1 {
            return Err(invalid("page", "must be at least 1"));
        }

        let page_size = parse_opt::<usize>("page_size", self.page_size.as_deref())?
            .unwrap_or(limits.default_page_size);
        if page_size < limits.min_page_size || page_size > limits.max_page_size {
            return Err(invalid(
                "page_size",
                format!(
                    "must be between {} and {}",
                    limits.min_page_size, limits.max_page_size
                ),
            ));
        }

        let ranking = match non_empty(self.school_type.as_deref()) {
            Some(raw) => {
                let school_type = raw
                    .parse::<SchoolType>()
                    .map_err(|_| invalid("school_type", format!("unknown school type {raw:?}")))?;
                Some(SchoolRequirement {
                    school_type,
                    pupils: parse_opt("pupils", self.pupils.as_deref())?.unwrap_or(0),
                    post16: parse_opt("post16", self.post16.as_deref())?.unwrap_or(0),
                })
            }
            None => None,
        };

        Ok(LocationSearch {
            filter,
            ranking,
            page,
            page_size,
        })
    }

    fn spatial_filter(&self, limits: &SearchLimits) -> Result<SpatialFilter, SearchError> {
        let postcode = non_empty(self.postcode.as_deref());
        let x = parse_opt::<f64>("x", self.x.as_deref())?;
        let y = parse_opt::<f64>("y", self.y.as_deref())?;
        let polygon = non_empty(self.polygon.as_deref());

        if let Some(geojson) = polygon {
            if postcode.is_some() || x.is_some() || y.is_some() {
                return Err(invalid(
                    "polygon",
                    "cannot be combined with a point or postcode",
                ));
            }
            let area = parse_geojson_to_multipolygon(geojson)
                .map_err(|e| invalid("polygon", e.to_string()))?;
            return Ok(SpatialFilter::Within(area));
        }

        let origin = match (postcode, x, y) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(invalid("postcode", "cannot be combined with x/y"));
            }
            (Some(postcode), None, None) => Origin::Postcode(normalize_postcode(postcode)),
            (None, Some(x), Some(y)) => Origin::Point(Point::new(x, y)),
            (None, Some(_), None) => return Err(invalid("y", "required with x")),
            (None, None, Some(_)) => return Err(invalid("x", "required with y")),
            (None, None, None) => return Err(SearchError::MissingFilter),
        };

        let radius_m = parse_opt::<f64>("range_distance", self.range_distance.as_deref())?
            .unwrap_or(limits.default_radius_m);
        if radius_m < 0.0 {
            return Err(invalid("range_distance", "must not be negative"));
        }

        Ok(SpatialFilter::Around { origin, radius_m })
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> SearchError {
    SearchError::InvalidParameter {
        field,
        message: message.into(),
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parses an optional numeric parameter. Blank counts as absent; NaN and
/// infinities are rejected.
fn parse_opt<T>(field: &'static str, raw: Option<&str>) -> Result<Option<T>, SearchError>
where
    T: std::str::FromStr + NumericParam,
{
    let Some(raw) = non_empty(raw) else {
        return Ok(None);
    };
    raw.parse::<T>()
        .ok()
        .filter(NumericParam::is_finite)
        .map(Some)
        .ok_or_else(|| invalid(field, format!("{raw:?} is not a valid number")))
}

trait NumericParam {
    fn is_finite(&self) -> bool;
}

impl NumericParam for f64 {
    fn is_finite(&self) -> bool {
        Self::is_finite(*self)
    }
}

impl NumericParam for usize {
    fn is_finite(&self) -> bool {
        true
    }
}

impl NumericParam for u32 {
    fn is_finite(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn around_point() -> SearchParams {
        SearchParams {
            x: Some("390000".to_string()),
            y: Some("405000".to_string()),
            ..SearchParams::default()
        }
    }

    fn field_of(err: SearchError) -> &'static str {
        match err {
            SearchError::InvalidParameter { field, .. } => field,
            other => panic!("expected an invalid parameter, got {other:?}"),
        }
    }

    #[test]
    fn applies_defaults() {
        let search = around_point().validate(&SearchLimits::default()).unwrap();
        assert_eq!(search.page, 1);
        assert_eq!(search.page_size, 10);
        assert!(search.ranking.is_none());
        match search.filter {
            SpatialFilter::Around {
                origin: Origin::Point(point),
                radius_m,
            } => {
                assert!((point.x() - 390_000.0).abs() < f64::EPSILON);
                assert!((radius_m - 1000.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected filter {other:?}"),
        }
    }

    #[test]
    fn rejects_page_size_out_of_bounds() {
        let limits = SearchLimits::default();
        for raw in ["0", "101"] {
            let params = SearchParams {
                page_size: Some(raw.to_string()),
                ..around_point()
            };
            assert_eq!(field_of(params.validate(&limits).unwrap_err()), "page_size");
        }
        let params = SearchParams {
            page_size: Some("100".to_string()),
            ..around_point()
        };
        assert_eq!(params.validate(&limits).unwrap().page_size, 100);
    }

    #[test]
    fn rejects_non_numeric_and_zero_page() {
        let limits = SearchLimits::default();
        let params = SearchParams {
            page: Some("two".to_string()),
            ..around_point()
        };
        assert_eq!(field_of(params.validate(&limits).unwrap_err()), "page");

        let params = SearchParams {
            page: Some("0".to_string()),
            ..around_point()
        };
        assert_eq!(field_of(params.validate(&limits).unwrap_err()), "page");
    }

    #[test]
    fn parses_ranking_parameters() {
        let params = SearchParams {
            school_type: Some("secondary_school".to_string()),
            pupils: Some("210".to_string()),
            post16: Some("60".to_string()),
            ..around_point()
        };
        let ranking = params
            .validate(&SearchLimits::default())
            .unwrap()
            .ranking
            .unwrap();
        assert_eq!(ranking.school_type, SchoolType::Secondary);
        assert_eq!(ranking.pupils, 210);
        assert_eq!(ranking.post16, 60);
    }

    #[test]
    fn rejects_unknown_school_type() {
        let params = SearchParams {
            school_type: Some("nursery".to_string()),
            ..around_point()
        };
        assert_eq!(
            field_of(params.validate(&SearchLimits::default()).unwrap_err()),
            "school_type"
        );
    }

    #[test]
    fn rejects_negative_radius() {
        let params = SearchParams {
            range_distance: Some("-5".to_string()),
            ..around_point()
        };
        assert_eq!(
            field_of(params.validate(&SearchLimits::default()).unwrap_err()),
            "range_distance"
        );
    }

    #[test]
    fn requires_a_spatial_filter() {
        let err = SearchParams::default()
            .validate(&SearchLimits::default())
            .unwrap_err();
        assert!(matches!(err, SearchError::MissingFilter));
    }

    #[test]
    fn normalizes_postcode_origin() {
        let params = SearchParams {
            postcode: Some(" ol4 1aa ".to_string()),
            range_distance: Some("2500".to_string()),
            ..SearchParams::default()
        };
        let search = params.validate(&SearchLimits::default()).unwrap();
        assert_eq!(
            search.filter,
            SpatialFilter::Around {
                origin: Origin::Postcode("OL41AA".to_string()),
                radius_m: 2500.0,
            }
        );
    }

    #[test]
    fn parses_polygon_filter() {
        let params = SearchParams {
            polygon: Some(
                r#"{"type":"Polygon","coordinates":[[[0,0],[10,0],[10,10],[0,10],[0,0]]]}"#
                    .to_string(),
            ),
            ..SearchParams::default()
        };
        let search = params.validate(&SearchLimits::default()).unwrap();
        assert!(matches!(search.filter, SpatialFilter::Within(_)));

        let params = SearchParams {
            polygon: Some("not geojson".to_string()),
            ..SearchParams::default()
        };
        assert_eq!(
            field_of(params.validate(&SearchLimits::default()).unwrap_err()),
            "polygon"
        );
    }

    #[test]
    fn deserializes_from_query_json() {
        let params: SearchParams =
            serde_json::from_str(r#"{"postcode":"M1 1AE","page":"2","page_size":"20"}"#).unwrap();
        let search = params.validate(&SearchLimits::default()).unwrap();
        assert_eq!(search.page, 2);
        assert_eq!(search.page_size, 20);
    }
}
