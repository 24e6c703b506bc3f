//! Resolves a validated [`LocationSearch`] against the catalog.

use geo::Geometry;
use land_availability_database::{AmenityStore, LocationStore, ReferenceStore};
use land_availability_location_models::Location;
use land_availability_ranking::{FeatureExtractor, ScoringCriteria, rank};
use land_availability_ranking_models::FeatureVector;
use land_availability_search::{
    LocationSearch, Origin, Page, SearchError, SearchHit, SearchResults, SpatialFilter,
};
use land_availability_spatial::{Layer, SpatialIndex};

use crate::{Catalog, CatalogError};

impl<S, I> Catalog<S, I>
where
    S: LocationStore + AmenityStore + ReferenceStore,
    I: SpatialIndex,
{
    /// Runs a location search and returns the requested page.
    ///
    /// Radius searches are ordered closest first and polygon searches by
    /// parcel key. With a school requirement, all matches are ranked
    /// together and reordered best first before paging.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Search`] if a postcode origin has no code
    /// point, or [`CatalogError::Persistence`] if the store cannot be read.
    pub fn search(&self, search: &LocationSearch) -> Result<SearchResults, CatalogError> {
        let mut hits = match &search.filter {
            SpatialFilter::Around { origin, radius_m } => {
                let point = match origin {
                    Origin::Point(point) => *point,
                    Origin::Postcode(postcode) => {
                        self.store
                            .codepoint(postcode)?
                            .ok_or_else(|| SearchError::UnknownPostcode {
                                postcode: postcode.clone(),
                            })?
                            .point
                    }
                };

                let mut hits = vec![];
                for nearby in
                    self.index
                        .query_nearby(Layer::Locations, &Geometry::Point(point), *radius_m)
                {
                    if let Some(location) = self.load_hit(&nearby.key)? {
                        hits.push(hit(location, Some(nearby.distance_m)));
                    }
                }
                hits
            }
            SpatialFilter::Within(area) => {
                let mut hits = vec![];
                for key in self
                    .index
                    .query_intersecting(Layer::Locations, &Geometry::MultiPolygon(area.clone()))
                {
                    if let Some(location) = self.load_hit(&key)? {
                        hits.push(hit(location, None));
                    }
                }
                hits
            }
        };

        let (lower_site_req, upper_site_req) = match &search.ranking {
            Some(requirement) => {
                let extractor = FeatureExtractor::new(&self.store);
                let features: Vec<FeatureVector> = hits
                    .iter()
                    .map(|hit| extractor.extract(&hit.location))
                    .collect();

                let ranking = rank(
                    &features,
                    &requirement.query(),
                    &ScoringCriteria::for_school_type(requirement.school_type),
                );

                let mut slots: Vec<Option<SearchHit>> = hits.into_iter().map(Some).collect();
                hits = ranking
                    .candidates
                    .iter()
                    .filter_map(|candidate| {
                        let mut hit = slots.get_mut(candidate.index)?.take()?;
                        hit.score = Some(candidate.score);
                        hit.area_suitable = Some(candidate.area_suitable);
                        Some(hit)
                    })
                    .collect();

                (Some(ranking.lower_site_req), Some(ranking.upper_site_req))
            }
            None => (None, None),
        };

        log::debug!(
            "Search matched {} location(s), returning page {}",
            hits.len(),
            search.page
        );

        Ok(SearchResults {
            page: Page::slice(hits, search.page, search.page_size),
            lower_site_req,
            upper_site_req,
        })
    }

    fn load_hit(&self, uprn: &str) -> Result<Option<Location>, CatalogError> {
        let location = self.store.location(uprn)?;
        if location.is_none() {
            log::warn!("Indexed location {uprn} is missing from the store");
        }
        Ok(location)
    }
}

const fn hit(location: Location, distance_m: Option<f64>) -> SearchHit {
    SearchHit {
        location,
        distance_m,
        score: None,
        area_suitable: None,
    }
}

#[cfg(test)]
mod tests {
    use geo::point;
    use land_availability_amenity_models::{AmenityCategory, SchoolType};
    use land_availability_proximity::ProximityMaintainer;
    use land_availability_ranking::SchoolRequirement;
    use land_availability_search::{SearchLimits, SearchParams};

    use super::*;
    use crate::tests::{codepoint, draft, school, square};

    fn populated() -> Catalog {
        let mut catalog = Catalog::in_memory(ProximityMaintainer::default());
        catalog
            .upsert_codepoint(codepoint("OL4 1AA", 50.0, 50.0))
            .unwrap();
        for (uprn, x) in [("a", 0.0), ("b", 200.0), ("c", 600.0), ("d", 5000.0)] {
            catalog.upsert_location(draft(uprn, square(x, 0.0, 100.0))).unwrap();
        }
        catalog
    }

    fn around(x: f64, y: f64, radius_m: f64) -> LocationSearch {
        LocationSearch {
            filter: SpatialFilter::Around {
                origin: Origin::Point(point!(x: x, y: y)),
                radius_m,
            },
            ranking: None,
            page: 1,
            page_size: 10,
        }
    }

    fn uprns(results: &SearchResults) -> Vec<&str> {
        results
            .page
            .items
            .iter()
            .map(|hit| hit.location.uprn.as_str())
            .collect()
    }

    #[test]
    fn radius_search_is_closest_first() {
        let catalog = populated();
        let results = catalog.search(&around(650.0, 50.0, 1000.0)).unwrap();

        assert_eq!(uprns(&results), vec!["c", "b", "a"]);
        assert_eq!(results.page.items[0].distance_m, Some(0.0));
        assert_eq!(results.page.items[1].distance_m, Some(350.0));
        assert!(results.lower_site_req.is_none());
        assert!(results.page.items[0].score.is_none());
    }

    #[test]
    fn postcode_origin_resolves_through_codepoints() {
        let catalog = populated();
        let params = SearchParams {
            postcode: Some("ol41aa".to_string()),
            range_distance: Some("150".to_string()),
            ..SearchParams::default()
        };
        let search = params.validate(&SearchLimits::default()).unwrap();
        let results = catalog.search(&search).unwrap();
        assert_eq!(uprns(&results), vec!["a", "b"]);
    }

    #[test]
    fn unknown_postcode_is_an_error() {
        let catalog = populated();
        let search = LocationSearch {
            filter: SpatialFilter::Around {
                origin: Origin::Postcode("ZZ99ZZ".to_string()),
                radius_m: 100.0,
            },
            ..around(0.0, 0.0, 0.0)
        };
        assert!(matches!(
            catalog.search(&search),
            Err(CatalogError::Search(SearchError::UnknownPostcode { .. }))
        ));
    }

    #[test]
    fn polygon_search_is_ordered_by_key() {
        let catalog = populated();
        let search = LocationSearch {
            filter: SpatialFilter::Within(square(150.0, 0.0, 500.0)),
            ..around(0.0, 0.0, 0.0)
        };
        let results = catalog.search(&search).unwrap();
        assert_eq!(uprns(&results), vec!["b", "c"]);
        assert!(results.page.items.iter().all(|hit| hit.distance_m.is_none()));
    }

    #[test]
    fn pages_through_matches() {
        let catalog = populated();
        let search = LocationSearch {
            page: 2,
            page_size: 2,
            ..around(650.0, 50.0, 1000.0)
        };
        let results = catalog.search(&search).unwrap();
        assert_eq!(uprns(&results), vec!["a"]);
        assert_eq!(results.page.total, 3);
        assert_eq!(results.page.page_count(), 2);
    }

    #[test]
    fn ranked_search_reorders_and_scores() {
        let mut catalog = populated();
        catalog
            .upsert_amenity(school("S1", SchoolType::Secondary, 750.0, 50.0))
            .unwrap();
        assert!(catalog
            .store()
            .location("c")
            .unwrap()
            .unwrap()
            .nearest(AmenityCategory::SecondarySchool)
            .is_some());

        let search = LocationSearch {
            ranking: Some(SchoolRequirement {
                school_type: SchoolType::Secondary,
                pupils: 600,
                post16: 0,
            }),
            ..around(0.0, 50.0, 1000.0)
        };
        let results = catalog.search(&search).unwrap();

        assert_eq!(results.page.items.len(), 3);
        assert!(results.lower_site_req.is_some());
        assert!(results.upper_site_req.is_some());
        let scores: Vec<f64> = results
            .page
            .items
            .iter()
            .map(|hit| hit.score.unwrap())
            .collect();
        assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
        assert!(results
            .page
            .items
            .iter()
            .all(|hit| hit.area_suitable == Some(false)));
    }
}
