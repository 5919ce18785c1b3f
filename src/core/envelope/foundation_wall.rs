use crate::core::material_properties::{AIR_FILM_OUTSIDE, AIR_FILM_VERTICAL};
use crate::input::{FoundationWallInput, FoundationWallInsulation};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::f64::consts::PI;

/// Below-grade U-factors from the soil path method are reduced by this factor
/// to account for two-dimensional heat flow near the corners.
const BELOW_GRADE_U_FACTOR_ADJUSTMENT: f64 = 0.85;

/// U-factors of the parts of a foundation wall above and below grade,
/// in Btu/(hr·ft²·°F)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FoundationWallUFactors {
    pub below_grade: f64,
    pub above_grade: f64,
}

/// Calculate foundation wall U-factors by slicing the wall horizontally at
/// each foot, at grade and at the edges of each insulation layer. Below
/// grade, heat leaves each slice along a quarter circle through the soil to
/// the ground surface.
///
/// Arguments:
/// * `wall` - construction, geometry and insulation of the wall
/// * `ground_conductivity` - soil conductivity, in Btu/(hr·ft·°F)
pub fn foundation_wall_u_factors(
    wall: &FoundationWallInput,
    ground_conductivity: f64,
) -> FoundationWallUFactors {
    let above_grade_height = wall.height - wall.depth_below_grade;
    let construction_r_value = match wall.insulation_assembly_r_value {
        Some(assembly_r_value) => assembly_r_value,
        None => wall.wall_type.r_value(wall.thickness),
    };
    let insulation_layers = [wall.interior_insulation, wall.exterior_insulation]
        .into_iter()
        .flatten()
        .collect_vec();

    let mut breakpoints = vec![0., wall.height, above_grade_height];
    breakpoints.extend((1..wall.height.ceil() as u32).map(f64::from));
    for layer in &insulation_layers {
        breakpoints.push(layer.distance_to_top);
        breakpoints.push(layer.distance_to_bottom);
    }
    let breakpoints = breakpoints
        .into_iter()
        .filter(|depth| (0. ..=wall.height).contains(depth))
        .map(OrderedFloat)
        .sorted()
        .dedup()
        .map(|depth| depth.0)
        .collect_vec();

    // conductance integrated over height, per ft of wall length
    let mut below_grade_conductance = 0.;
    let mut above_grade_conductance = 0.;

    for (&top, &bottom) in breakpoints.iter().tuple_windows() {
        let midpoint = (top + bottom) / 2.;
        let r_value = construction_r_value
            + insulation_r_value_at(&insulation_layers, midpoint)
            + AIR_FILM_VERTICAL;

        if midpoint < above_grade_height {
            above_grade_conductance += (bottom - top) / (r_value + AIR_FILM_OUTSIDE);
        } else {
            let soil_r_value_per_ft_depth = PI / 2. / ground_conductivity;
            let depth_top = top - above_grade_height;
            let depth_bottom = bottom - above_grade_height;
            below_grade_conductance += ((r_value + soil_r_value_per_ft_depth * depth_bottom)
                / (r_value + soil_r_value_per_ft_depth * depth_top))
                .ln()
                / soil_r_value_per_ft_depth;
        }
    }

    FoundationWallUFactors {
        below_grade: if wall.depth_below_grade > 0. {
            below_grade_conductance / wall.depth_below_grade * BELOW_GRADE_U_FACTOR_ADJUSTMENT
        } else {
            0.
        },
        above_grade: if above_grade_height > 0. {
            above_grade_conductance / above_grade_height
        } else {
            0.
        },
    }
}

fn insulation_r_value_at(layers: &[FoundationWallInsulation], distance_from_top: f64) -> f64 {
    layers
        .iter()
        .filter(|layer| {
            layer.distance_to_top <= distance_from_top && distance_from_top < layer.distance_to_bottom
        })
        .map(|layer| layer.r_value)
        .sum()
}

impl FoundationWallInput {
    pub fn gross_area(&self) -> f64 {
        self.length * self.height
    }

    pub fn below_grade_area(&self) -> f64 {
        self.length * self.depth_below_grade
    }

    pub fn above_grade_area(&self) -> f64 {
        self.length * (self.height - self.depth_below_grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::FoundationWallType;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn wall(
        wall_type: FoundationWallType,
        height: f64,
        depth_below_grade: f64,
        interior_insulation: Option<FoundationWallInsulation>,
    ) -> FoundationWallInput {
        FoundationWallInput {
            length: 30.,
            height,
            depth_below_grade,
            wall_type,
            thickness: 8.,
            insulation_assembly_r_value: None,
            interior_insulation,
            exterior_insulation: None,
            azimuth: 0.,
        }
    }

    fn insulation(r_value: f64, distance_to_top: f64, distance_to_bottom: f64) -> Option<FoundationWallInsulation> {
        Some(FoundationWallInsulation {
            r_value,
            distance_to_top,
            distance_to_bottom,
        })
    }

    #[rstest]
    fn should_match_reference_u_factor_for_insulated_block_basement_wall() {
        let basement_wall = wall(FoundationWallType::ConcreteBlock, 10., 10., insulation(20., 0., 10.));
        let u_factors = foundation_wall_u_factors(&basement_wall, 0.8);
        assert_relative_eq!(u_factors.below_grade, 0.026, max_relative = 0.06);
        assert_relative_eq!(u_factors.below_grade, 0.02700, max_relative = 1e-3);
        assert_eq!(u_factors.above_grade, 0.);
    }

    #[rstest]
    #[case(0.8)]
    #[case(1.0)]
    #[case(1.4)]
    fn should_reduce_below_grade_u_factor_with_full_insulation(#[case] ground_conductivity: f64) {
        for wall_type in [
            FoundationWallType::SolidConcrete,
            FoundationWallType::ConcreteBlock,
            FoundationWallType::Wood,
        ] {
            let uninsulated = wall(wall_type, 8., 7., None);
            let insulated = wall(wall_type, 8., 7., insulation(10., 0., 8.));
            let uninsulated_u = foundation_wall_u_factors(&uninsulated, ground_conductivity);
            let insulated_u = foundation_wall_u_factors(&insulated, ground_conductivity);
            assert!(insulated_u.below_grade < uninsulated_u.below_grade);
            assert!(insulated_u.above_grade < uninsulated_u.above_grade);
        }
    }

    #[rstest]
    fn should_weight_partial_insulation_coverage() {
        let uninsulated = foundation_wall_u_factors(
            &wall(FoundationWallType::SolidConcrete, 8., 7., None),
            0.8,
        );
        let half = foundation_wall_u_factors(
            &wall(FoundationWallType::SolidConcrete, 8., 7., insulation(10., 0., 4.)),
            0.8,
        );
        let full = foundation_wall_u_factors(
            &wall(FoundationWallType::SolidConcrete, 8., 7., insulation(10., 0., 8.)),
            0.8,
        );
        assert!(full.below_grade < half.below_grade);
        assert!(half.below_grade < uninsulated.below_grade);
        // the above grade foot is covered in both cases
        assert_relative_eq!(half.above_grade, full.above_grade);
    }

    #[rstest]
    fn should_combine_interior_and_exterior_insulation() {
        let interior_only = wall(FoundationWallType::SolidConcrete, 8., 8., insulation(5., 0., 8.));
        let both = FoundationWallInput {
            exterior_insulation: insulation(5., 0., 8.),
            ..interior_only.clone()
        };
        assert!(
            foundation_wall_u_factors(&both, 1.).below_grade
                < foundation_wall_u_factors(&interior_only, 1.).below_grade
        );
    }

    #[rstest]
    fn should_use_assembly_r_value_in_place_of_construction() {
        let assembly = FoundationWallInput {
            insulation_assembly_r_value: Some(10.),
            ..wall(FoundationWallType::SolidConcrete, 8., 4., None)
        };
        let u_factors = foundation_wall_u_factors(&assembly, 1.);
        assert_relative_eq!(u_factors.above_grade, 1. / (10. + 0.68 + 0.17), max_relative = 1e-9);
    }

    #[rstest]
    fn should_split_wall_areas_at_grade() {
        let crawlspace_wall = wall(FoundationWallType::SolidConcrete, 4., 1.5, None);
        assert_eq!(crawlspace_wall.gross_area(), 120.);
        assert_eq!(crawlspace_wall.below_grade_area(), 45.);
        assert_eq!(crawlspace_wall.above_grade_area(), 75.);
    }
}
