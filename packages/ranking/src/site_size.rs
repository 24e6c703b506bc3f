//! Expected school site area for a number of pupils.

use land_availability_amenity_models::SchoolType;

/// Site area in square meters needed for a school.
///
/// `post16` pupils are included in `pupils`; they only change the figure
/// for secondary schools, where a sixth form needs extra space.
#[must_use]
pub fn school_site_size(pupils: u32, post16: u32, school_type: SchoolType) -> f64 {
    match school_type {
        SchoolType::Primary => 4.1f64.mul_add(f64::from(pupils), 350.0),
        SchoolType::Secondary if post16 > 0 => {
            let under16 = f64::from(pupils) - f64::from(post16);
            6.3f64.mul_add(under16, 1050.0) + 7.0f64.mul_add(f64::from(post16), 350.0)
        }
        SchoolType::Secondary => 6.3f64.mul_add(f64::from(pupils), 1050.0),
    }
}

/// Acceptable `(lower, upper)` site area: 95% to 150% of
/// [`school_site_size`].
#[must_use]
pub fn school_site_size_range(pupils: u32, post16: u32, school_type: SchoolType) -> (f64, f64) {
    let size = school_site_size(pupils, post16, school_type);
    (size * 0.95, size * 1.5)
}

/// Site area per pupil. `None` when there are no pupils.
#[must_use]
pub fn area_per_pupil(area: f64, pupils: u32) -> Option<f64> {
    (pupils > 0).then(|| area / f64::from(pupils))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn empty_schools_need_base_area() {
        assert!(close(school_site_size(0, 0, SchoolType::Primary), 350.0));
        assert!(close(school_site_size(0, 0, SchoolType::Secondary), 1050.0));
    }

    #[test]
    fn primary_range_for_210_pupils() {
        let (lower, upper) = school_site_size_range(210, 0, SchoolType::Primary);
        assert!(close(lower, 1150.45));
        assert!(close(upper, 1816.5));
    }

    #[test]
    fn empty_primary_range() {
        let (lower, upper) = school_site_size_range(0, 0, SchoolType::Primary);
        assert!(close(lower, 332.5));
        assert!(close(upper, 525.0));
    }

    #[test]
    fn sixth_form_adds_space() {
        let area = school_site_size(210, 60, SchoolType::Secondary);
        assert!(close(area, 2765.0));
        let per_pupil = area_per_pupil(area, 210).unwrap();
        assert!((per_pupil - 13.17).abs() < 1e-2);
    }

    #[test]
    fn post16_is_ignored_for_primary() {
        assert!(close(
            school_site_size(100, 40, SchoolType::Primary),
            school_site_size(100, 0, SchoolType::Primary)
        ));
    }

    #[test]
    fn per_pupil_undefined_without_pupils() {
        assert_eq!(area_per_pupil(350.0, 0), None);
    }
}
