use crate::core::material_properties::{
    AIR_FILM_FLOOR_AVERAGE, AIR_FILM_OUTSIDE, CONCRETE, GRAVEL_R_VALUE_PER_INCH, INDOOR_FINISH_SLAB,
};
use crate::input::SlabInput;
use std::f64::consts::PI;

/// Heat flow paths from the slab surface out through the soil to the ground
/// surface beyond the slab edge are averaged over these path radii, in ft.
const PATH_RADII: std::ops::RangeInclusive<u32> = 8..=13;
/// Depth below the top of the slab down to which gravel fill is assumed, in inches
const GRAVEL_FILL_DEPTH: f64 = 12.;

/// F-factor of a slab on grade, in Btu/(hr·ft·°F) per ft of exposed perimeter
///
/// Sums the conductance of semicircular heat flow paths starting one foot
/// apart inward from the slab edge, each passing through concrete, gravel,
/// any insulation it crosses and soil of length π·r − 1 ft.
///
/// Arguments:
/// * `slab` - slab construction and insulation
/// * `ground_conductivity` - soil conductivity, in Btu/(hr·ft·°F)
pub fn slab_f_factor(slab: &SlabInput, ground_conductivity: f64) -> f64 {
    let films = INDOOR_FINISH_SLAB + AIR_FILM_FLOOR_AVERAGE + AIR_FILM_OUTSIDE;
    let concrete_r_value = CONCRETE.r_value(slab.thickness);
    let gravel_r_value = (GRAVEL_R_VALUE_PER_INCH * (GRAVEL_FILL_DEPTH - slab.thickness)).max(0.);

    let path_count = PATH_RADII.clone().count() as f64;

    PATH_RADII
        .map(|path_radius| {
            (0..=path_radius)
                .map(|radius| {
                    let radius = radius as f64;
                    let soil_path_length = (PI * radius - 1.).max(0.);

                    // the path at the very edge leaves through the side of the slab
                    let (slab_r_value, insulation_r_value) = if radius == 0. {
                        let edge_insulation = if slab.perimeter_insulation_depth > 0. {
                            slab.perimeter_insulation_r_value
                        } else {
                            0.
                        };
                        (0., edge_insulation)
                    } else {
                        let mut insulation_r_value = 0.;
                        if slab.under_slab_insulation_spans_entire_slab
                            || radius <= slab.under_slab_insulation_width
                        {
                            insulation_r_value += slab.under_slab_insulation_r_value;
                        }
                        if radius <= slab.perimeter_insulation_depth {
                            insulation_r_value += slab.perimeter_insulation_r_value;
                        }
                        (concrete_r_value + gravel_r_value, insulation_r_value)
                    };

                    1. / (slab_r_value
                        + insulation_r_value
                        + films
                        + soil_path_length / ground_conductivity)
                })
                .sum::<f64>()
        })
        .sum::<f64>()
        / path_count
}

/// U-factor of a basement floor, in Btu/(hr·ft²·°F), following the ASHRAE
/// below-grade floor method
///
/// Arguments:
/// * `slab` - floor construction; `depth_below_grade` gives the depth of the floor
/// * `width` - width of the shortest side of the floor, in ft
/// * `ground_conductivity` - soil conductivity, in Btu/(hr·ft·°F)
pub fn basement_slab_u_factor(slab: &SlabInput, width: f64, ground_conductivity: f64) -> f64 {
    let depth = slab.depth_below_grade;
    let other_r_value = CONCRETE.r_value(slab.thickness)
        + AIR_FILM_FLOOR_AVERAGE
        + slab.under_slab_insulation_r_value;
    let k_r_over_pi = ground_conductivity * other_r_value / PI;

    2. * ground_conductivity / (PI * width)
        * ((width / 2. + depth / 2. + k_r_over_pi).ln() - (depth / 2. + k_r_over_pi).ln())
}

/// Width of the shortest side of a basement floor, in ft
///
/// Uses the width given on the slab, otherwise the short side of a rectangle with
/// the slab's area and exposed perimeter, falling back to a square.
pub fn basement_floor_width(slab: &SlabInput) -> f64 {
    if let Some(width) = slab.width {
        return width;
    }
    let half_perimeter = slab.exposed_perimeter / 2.;
    let discriminant = half_perimeter.powi(2) - 4. * slab.area;
    if slab.exposed_perimeter > 0. && discriminant >= 0. {
        (half_perimeter - discriminant.sqrt()) / 2.
    } else {
        slab.area.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    fn slab(thickness: f64) -> SlabInput {
        SlabInput {
            area: 1000.,
            exposed_perimeter: 130.,
            thickness,
            depth_below_grade: 0.,
            width: None,
            perimeter_insulation_depth: 0.,
            perimeter_insulation_r_value: 0.,
            under_slab_insulation_width: 0.,
            under_slab_insulation_spans_entire_slab: false,
            under_slab_insulation_r_value: 0.,
        }
    }

    #[fixture]
    fn uninsulated_slab() -> SlabInput {
        slab(4.)
    }

    fn with_perimeter_insulation(r_value: f64, depth: f64) -> SlabInput {
        SlabInput {
            perimeter_insulation_r_value: r_value,
            perimeter_insulation_depth: depth,
            ..slab(4.)
        }
    }

    fn with_under_slab_insulation(r_value: f64, width: f64, spans_entire_slab: bool) -> SlabInput {
        SlabInput {
            under_slab_insulation_r_value: r_value,
            under_slab_insulation_width: width,
            under_slab_insulation_spans_entire_slab: spans_entire_slab,
            ..slab(4.)
        }
    }

    #[rstest]
    fn should_match_reference_f_factor_for_uninsulated_slab(uninsulated_slab: SlabInput) {
        let f_factor = slab_f_factor(&uninsulated_slab, 0.8);
        assert_relative_eq!(f_factor, 1.358, max_relative = 0.15);
        assert_relative_eq!(f_factor, 1.3488, max_relative = 1e-3);
    }

    #[rstest]
    fn should_reduce_f_factor_with_lower_soil_conductivity(uninsulated_slab: SlabInput) {
        let high = slab_f_factor(&uninsulated_slab, 1.4);
        let medium = slab_f_factor(&uninsulated_slab, 1.0);
        let low = slab_f_factor(&uninsulated_slab, 0.8);
        assert!(high > medium && medium > low);
    }

    #[rstest]
    #[case(with_perimeter_insulation(5., 2.), with_perimeter_insulation(10., 2.))]
    #[case(with_perimeter_insulation(10., 2.), with_perimeter_insulation(10., 4.))]
    #[case(with_under_slab_insulation(5., 2., false), with_under_slab_insulation(10., 2., false))]
    #[case(with_under_slab_insulation(10., 2., false), with_under_slab_insulation(10., 0., true))]
    #[case(slab(4.), with_perimeter_insulation(5., 2.))]
    #[case(slab(4.), with_under_slab_insulation(5., 2., false))]
    fn should_reduce_f_factor_with_more_insulation(
        #[case] less_insulated: SlabInput,
        #[case] more_insulated: SlabInput,
    ) {
        for ground_conductivity in [0.8, 1.0, 1.4] {
            assert!(
                slab_f_factor(&more_insulated, ground_conductivity)
                    < slab_f_factor(&less_insulated, ground_conductivity)
            );
        }
    }

    #[rstest]
    fn should_reduce_f_factor_with_combined_insulation() {
        let combined = SlabInput {
            perimeter_insulation_r_value: 5.,
            perimeter_insulation_depth: 2.,
            ..with_under_slab_insulation(5., 2., false)
        };
        assert!(
            slab_f_factor(&combined, 0.8) < slab_f_factor(&with_perimeter_insulation(5., 2.), 0.8)
        );
        assert!(
            slab_f_factor(&combined, 0.8)
                < slab_f_factor(&with_under_slab_insulation(5., 2., false), 0.8)
        );
    }

    #[rstest]
    fn should_calculate_basement_slab_u_factor() {
        let basement_floor = SlabInput {
            depth_below_grade: 8.,
            ..slab(4.)
        };
        let u_factor = basement_slab_u_factor(&basement_floor, 20., 0.8);
        assert_relative_eq!(u_factor, 0.0304, max_relative = 0.01);
    }

    #[rstest]
    #[case(0.8)]
    #[case(1.0)]
    #[case(1.4)]
    fn should_reduce_basement_slab_u_factor_with_insulation(#[case] ground_conductivity: f64) {
        let uninsulated = SlabInput {
            depth_below_grade: 8.,
            ..slab(4.)
        };
        let insulated = SlabInput {
            under_slab_insulation_r_value: 10.,
            under_slab_insulation_spans_entire_slab: true,
            ..uninsulated.clone()
        };
        for width in [20., 24., 28., 32.] {
            assert!(
                basement_slab_u_factor(&insulated, width, ground_conductivity)
                    < basement_slab_u_factor(&uninsulated, width, ground_conductivity)
            );
        }
    }

    #[rstest]
    fn should_derive_basement_floor_width_from_area_and_perimeter() {
        let floor = SlabInput {
            area: 800.,
            exposed_perimeter: 120.,
            ..slab(4.)
        };
        assert_relative_eq!(basement_floor_width(&floor), 20., max_relative = 1e-9);

        let partially_exposed = SlabInput {
            area: 900.,
            exposed_perimeter: 30.,
            ..slab(4.)
        };
        assert_relative_eq!(basement_floor_width(&partially_exposed), 30.);
    }
}
