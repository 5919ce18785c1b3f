use crate::input::FoundationWallType;
use std::sync::LazyLock;

/// This module contains data on the thermal properties of construction materials
/// used by the ground-coupled load calculations, and structs to organise this data.

#[derive(Clone, Copy, Debug)]
pub struct MaterialProperties {
    conductivity: f64, // Btu·in/(hr·ft²·°F)
}

impl MaterialProperties {
    pub fn new(conductivity: f64) -> Self {
        Self { conductivity }
    }

    pub fn conductivity(&self) -> f64 {
        self.conductivity
    }

    /// Return the thermal resistance of a layer of this material, in hr·ft²·°F/Btu
    ///
    /// Arguments:
    /// * `thickness` - thickness of the layer, in inches
    pub fn r_value(&self, thickness: f64) -> f64 {
        thickness / self.conductivity
    }
}

pub static CONCRETE: LazyLock<MaterialProperties> = LazyLock::new(|| MaterialProperties::new(9.1));

/// Gravel bed under slabs, per inch of depth down to 12 inches below the top of slab
pub const GRAVEL_R_VALUE_PER_INCH: f64 = 0.65;

// Air films, in hr·ft²·°F/Btu
pub const AIR_FILM_VERTICAL: f64 = 0.68;
pub const AIR_FILM_OUTSIDE: f64 = 0.17;
pub const AIR_FILM_FLOOR_AVERAGE: f64 = 0.92;
pub const INDOOR_FINISH_SLAB: f64 = 0.05;

impl FoundationWallType {
    /// Thermal resistance of one inch of the wall construction, in hr·ft²·°F/Btu
    pub fn r_value_per_inch(&self) -> f64 {
        match self {
            FoundationWallType::SolidConcrete => 1. / CONCRETE.conductivity(),
            FoundationWallType::ConcreteBlock => 0.25,
            FoundationWallType::ConcreteBlockFoamCore => 0.59,
            FoundationWallType::ConcreteBlockPerliteCore => 0.49,
            FoundationWallType::ConcreteBlockVermiculiteCore => 0.43,
            FoundationWallType::ConcreteBlockSolidCore => 0.125,
            FoundationWallType::DoubleBrick => 0.2,
            FoundationWallType::Wood => 1.0,
        }
    }

    pub fn r_value(&self, thickness: f64) -> f64 {
        self.r_value_per_inch() * thickness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    pub fn matprop() -> MaterialProperties {
        MaterialProperties::new(4.0)
    }

    #[rstest]
    pub fn should_have_correct_conductivity(matprop: MaterialProperties) {
        assert_eq!(matprop.conductivity(), 4.0, "incorrect conductivity returned");
    }

    #[rstest]
    pub fn should_have_correct_r_value(matprop: MaterialProperties) {
        assert_eq!(matprop.r_value(8.0), 2.0, "incorrect R-value returned");
    }

    #[rstest]
    pub fn should_calculate_concrete_slab_r_value() {
        assert_relative_eq!(CONCRETE.r_value(4.0), 0.43956, max_relative = 1e-4);
    }

    #[rstest]
    #[case(FoundationWallType::SolidConcrete, 0.87912)]
    #[case(FoundationWallType::ConcreteBlock, 2.0)]
    #[case(FoundationWallType::ConcreteBlockFoamCore, 4.72)]
    #[case(FoundationWallType::Wood, 8.0)]
    pub fn should_calculate_foundation_wall_construction_r_value(
        #[case] wall_type: FoundationWallType,
        #[case] expected: f64,
    ) {
        assert_relative_eq!(wall_type.r_value(8.0), expected, max_relative = 1e-4);
    }
}
