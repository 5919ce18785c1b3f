pub mod aggregation;
pub mod components;
pub mod ducts;
pub mod infiltration;
pub mod internal_gains;

use indexmap::IndexMap;
use serde::Serialize;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use strum::{Display, EnumIter, IntoEnumIterator};

/// A heating design loss and a cooling design gain, in Btu/h
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DesignLoad {
    pub heating: f64,
    pub cooling_sensible: f64,
    pub cooling_latent: f64,
}

impl DesignLoad {
    pub fn new(heating: f64, cooling_sensible: f64, cooling_latent: f64) -> Self {
        Self {
            heating,
            cooling_sensible,
            cooling_latent,
        }
    }

    pub fn heating(heating: f64) -> Self {
        Self::new(heating, 0., 0.)
    }

    pub fn cooling_total(&self) -> f64 {
        self.cooling_sensible + self.cooling_latent
    }
}

impl Add for DesignLoad {
    type Output = DesignLoad;

    fn add(self, rhs: Self) -> Self::Output {
        DesignLoad::new(
            self.heating + rhs.heating,
            self.cooling_sensible + rhs.cooling_sensible,
            self.cooling_latent + rhs.cooling_latent,
        )
    }
}

impl AddAssign for DesignLoad {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<f64> for DesignLoad {
    type Output = DesignLoad;

    fn mul(self, rhs: f64) -> Self::Output {
        DesignLoad::new(
            self.heating * rhs,
            self.cooling_sensible * rhs,
            self.cooling_latent * rhs,
        )
    }
}

impl Sum for DesignLoad {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Default::default(), |acc, load| acc + load)
    }
}

/// Categories that design loads are reported under.
#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq, Serialize)]
pub enum LoadComponent {
    Windows,
    Skylights,
    Doors,
    Walls,
    Roofs,
    Floors,
    Slabs,
    Ceilings,
    Infiltration,
    Ventilation,
    Ducts,
    #[strum(to_string = "Internal Gains")]
    #[serde(rename = "Internal Gains")]
    InternalGains,
    #[strum(to_string = "Blower Heat")]
    #[serde(rename = "Blower Heat")]
    BlowerHeat,
    #[strum(to_string = "AED Excursion")]
    #[serde(rename = "AED Excursion")]
    AedExcursion,
}

impl LoadComponent {
    /// Components whose loads arise from the air distribution system rather
    /// than from the space itself
    pub fn is_distribution(&self) -> bool {
        matches!(self, LoadComponent::Ducts | LoadComponent::BlowerHeat)
    }
}

/// Design loads of a space, zone or building broken down by component.
///
/// The total is always computed as the sum of the components.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoadBreakdown {
    components: IndexMap<LoadComponent, DesignLoad>,
}

impl Default for LoadBreakdown {
    fn default() -> Self {
        Self {
            components: LoadComponent::iter()
                .map(|component| (component, DesignLoad::default()))
                .collect(),
        }
    }
}

impl LoadBreakdown {
    pub fn add(&mut self, component: LoadComponent, load: DesignLoad) {
        *self.components.entry(component).or_default() += load;
    }

    pub fn get(&self, component: LoadComponent) -> DesignLoad {
        self.components.get(&component).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LoadComponent, DesignLoad)> + '_ {
        self.components
            .iter()
            .map(|(component, load)| (*component, *load))
    }

    pub fn total(&self) -> DesignLoad {
        self.components.values().copied().sum()
    }

    /// Total excluding duct and blower loads
    pub fn non_distribution_total(&self) -> DesignLoad {
        self.iter()
            .filter(|(component, _)| !component.is_distribution())
            .map(|(_, load)| load)
            .sum()
    }

    pub fn merge(&mut self, other: &LoadBreakdown) {
        for (component, load) in other.iter() {
            self.add(component, load);
        }
    }
}

impl Sum for LoadBreakdown {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Default::default(), |mut acc, breakdown| {
            acc.merge(&breakdown);
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn breakdown() -> LoadBreakdown {
        let mut breakdown = LoadBreakdown::default();
        breakdown.add(LoadComponent::Walls, DesignLoad::new(1000., 300., 0.));
        breakdown.add(LoadComponent::Windows, DesignLoad::new(500., 800., 0.));
        breakdown.add(LoadComponent::Infiltration, DesignLoad::new(700., 100., 250.));
        breakdown.add(LoadComponent::Ducts, DesignLoad::new(200., 150., 20.));
        breakdown
    }

    #[rstest]
    fn should_list_every_component_in_report_order() {
        let names = LoadBreakdown::default()
            .iter()
            .map(|(component, _)| component.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names.len(), 14);
        assert_eq!(names[0], "Windows");
        assert_eq!(names[11], "Internal Gains");
        assert_eq!(names[13], "AED Excursion");
    }

    #[rstest]
    fn should_total_components(breakdown: LoadBreakdown) {
        assert_eq!(breakdown.total(), DesignLoad::new(2400., 1350., 270.));
        assert_eq!(
            breakdown.non_distribution_total(),
            DesignLoad::new(2200., 1200., 250.)
        );
    }

    #[rstest]
    fn should_accumulate_into_existing_component(mut breakdown: LoadBreakdown) {
        breakdown.add(LoadComponent::Walls, DesignLoad::heating(250.));
        assert_eq!(breakdown.get(LoadComponent::Walls).heating, 1250.);
    }

    #[rstest]
    fn should_sum_breakdowns(breakdown: LoadBreakdown) {
        let summed: LoadBreakdown = [breakdown.clone(), breakdown.clone()].into_iter().sum();
        assert_eq!(summed.get(LoadComponent::Windows), DesignLoad::new(1000., 1600., 0.));
        assert_eq!(summed.total(), breakdown.total() * 2.);
    }
}
