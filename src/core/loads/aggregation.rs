use crate::compare_floats::max_of_series;
use crate::core::envelope::surfaces::HourlyCurve;
use crate::core::loads::ducts::DuctLoads;
use crate::core::loads::{DesignLoad, LoadBreakdown, LoadComponent};
use crate::statistics::mean;
use indexmap::IndexMap;

/// Fenestration gains above this multiple of the hourly average are an
/// excursion that the equipment must also meet.
const AED_EXCURSION_LIMIT: f64 = 1.3;

/// Design loads of a single space
#[derive(Clone, Debug, PartialEq)]
pub struct SpaceLoads {
    pub floor_area: f64,
    pub volume: f64,
    pub breakdown: LoadBreakdown,
    pub fenestration_curve: HourlyCurve,
}

impl SpaceLoads {
    pub fn total(&self) -> DesignLoad {
        self.breakdown.total()
    }
}

/// Design loads of a zone, held as the loads of its spaces
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneLoads {
    pub spaces: IndexMap<String, SpaceLoads>,
    pub duct_loads: Option<DuctLoads>,
    pub aed_excursion: f64,
}

impl ZoneLoads {
    pub fn breakdown(&self) -> LoadBreakdown {
        self.spaces.values().map(|space| space.breakdown.clone()).sum()
    }

    pub fn total(&self) -> DesignLoad {
        self.spaces.values().map(SpaceLoads::total).sum()
    }

    pub fn floor_area(&self) -> f64 {
        self.spaces.values().map(|space| space.floor_area).sum()
    }

    /// Hourly fenestration gain of the zone, summed over its spaces
    pub fn fenestration_curve(&self) -> HourlyCurve {
        let mut curve = HourlyCurve::default();
        for space in self.spaces.values() {
            curve
                .iter_mut()
                .zip(space.fenestration_curve)
                .for_each(|(total, value)| *total += value);
        }
        curve
    }

    /// Add the AED excursion of the zone to its spaces, in proportion to each
    /// space's fenestration cooling load.
    pub fn apply_aed_excursion(&mut self) {
        let excursion = aed_excursion(&self.fenestration_curve());
        self.aed_excursion = excursion;
        if excursion == 0. {
            return;
        }

        let fenestration_loads = self
            .spaces
            .values()
            .map(|space| fenestration_cooling(&space.breakdown))
            .collect::<Vec<_>>();
        let shares = shares_of(&fenestration_loads, &self.floor_area_weights());

        for (space, share) in self.spaces.values_mut().zip(shares) {
            space.breakdown.add(
                LoadComponent::AedExcursion,
                DesignLoad::new(0., excursion * share, 0.),
            );
        }
    }

    /// Distribute duct and blower loads of the zone's distribution system to its
    /// spaces in proportion to each space's non-duct load, separately for
    /// heating, cooling sensible and cooling latent.
    pub fn distribute_duct_loads(&mut self, duct_loads: DuctLoads) {
        let non_distribution = self
            .spaces
            .values()
            .map(|space| space.breakdown.non_distribution_total())
            .collect::<Vec<_>>();
        let area_weights = self.floor_area_weights();

        let heating_shares = shares_of(
            &non_distribution.iter().map(|load| load.heating).collect::<Vec<_>>(),
            &area_weights,
        );
        let sensible_shares = shares_of(
            &non_distribution
                .iter()
                .map(|load| load.cooling_sensible)
                .collect::<Vec<_>>(),
            &area_weights,
        );
        let latent_shares = shares_of(
            &non_distribution
                .iter()
                .map(|load| load.cooling_latent)
                .collect::<Vec<_>>(),
            &area_weights,
        );

        for (i, space) in self.spaces.values_mut().enumerate() {
            space.breakdown.add(
                LoadComponent::Ducts,
                DesignLoad::new(
                    duct_loads.ducts.heating * heating_shares[i],
                    duct_loads.ducts.cooling_sensible * sensible_shares[i],
                    duct_loads.ducts.cooling_latent * latent_shares[i],
                ),
            );
            space.breakdown.add(
                LoadComponent::BlowerHeat,
                DesignLoad::new(0., duct_loads.blower_heat * sensible_shares[i], 0.),
            );
        }

        self.duct_loads = Some(duct_loads);
    }

    fn floor_area_weights(&self) -> Vec<f64> {
        self.spaces.values().map(|space| space.floor_area).collect()
    }
}

/// Design loads of the whole building
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildingLoads {
    pub zones: IndexMap<String, ZoneLoads>,
}

impl BuildingLoads {
    pub fn breakdown(&self) -> LoadBreakdown {
        self.zones.values().map(ZoneLoads::breakdown).sum()
    }

    pub fn total(&self) -> DesignLoad {
        self.zones.values().map(ZoneLoads::total).sum()
    }

    pub fn spaces_mut(&mut self) -> impl Iterator<Item = &mut SpaceLoads> {
        self.zones
            .values_mut()
            .flat_map(|zone| zone.spaces.values_mut())
    }

    /// Allocate a whole building load to every space in proportion to its volume
    pub fn allocate_by_volume(&mut self, component: LoadComponent, load: DesignLoad) {
        let volumes = self
            .zones
            .values()
            .flat_map(|zone| zone.spaces.values().map(|space| space.volume))
            .collect::<Vec<_>>();
        let shares = shares_of(&volumes, &vec![1.; volumes.len()]);

        for (space, share) in self.spaces_mut().zip(shares) {
            space.breakdown.add(component, load * share);
        }
    }
}

/// Peak fenestration gain in excess of the allowed multiple of the average, in Btu/h
pub fn aed_excursion(curve: &HourlyCurve) -> f64 {
    let Some(peak) = max_of_series(curve) else {
        return 0.;
    };
    (peak - AED_EXCURSION_LIMIT * mean(curve)).max(0.)
}

fn fenestration_cooling(breakdown: &LoadBreakdown) -> f64 {
    breakdown.get(LoadComponent::Windows).cooling_sensible
        + breakdown.get(LoadComponent::Skylights).cooling_sensible
}

/// Normalised shares of `values`, falling back to `fallback_weights` when the
/// values sum to zero
fn shares_of(values: &[f64], fallback_weights: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total != 0. {
        return values.iter().map(|value| value / total).collect();
    }
    let fallback_total: f64 = fallback_weights.iter().sum();
    if fallback_total > 0. {
        fallback_weights
            .iter()
            .map(|weight| weight / fallback_total)
            .collect()
    } else {
        vec![0.; values.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn space(floor_area: f64, walls: DesignLoad, windows: DesignLoad, curve: HourlyCurve) -> SpaceLoads {
        let mut breakdown = LoadBreakdown::default();
        breakdown.add(LoadComponent::Walls, walls);
        breakdown.add(LoadComponent::Windows, windows);
        SpaceLoads {
            floor_area,
            volume: floor_area * 8.,
            breakdown,
            fenestration_curve: curve,
        }
    }

    #[fixture]
    fn zone() -> ZoneLoads {
        let flat = [1000.; 12];
        let mut peaky = [500.; 12];
        peaky[8] = 6000.;
        ZoneLoads {
            spaces: IndexMap::from([
                (
                    "living".to_string(),
                    space(600., DesignLoad::new(3000., 1000., 0.), DesignLoad::new(1000., mean(&flat), 0.), flat),
                ),
                (
                    "bedroom".to_string(),
                    space(400., DesignLoad::new(1000., 500., 0.), DesignLoad::new(500., mean(&peaky), 0.), peaky),
                ),
            ]),
            duct_loads: None,
            aed_excursion: 0.,
        }
    }

    #[rstest]
    fn should_calculate_aed_excursion() {
        assert_eq!(aed_excursion(&[1000.; 12]), 0.);
        let mut curve = [1000.; 12];
        curve[6] = 3000.;
        let average = (11. * 1000. + 3000.) / 12.;
        assert_relative_eq!(aed_excursion(&curve), 3000. - 1.3 * average);
    }

    #[rstest]
    fn should_distribute_aed_excursion_by_fenestration_share(mut zone: ZoneLoads) {
        zone.apply_aed_excursion();
        assert!(zone.aed_excursion > 0.);

        let living = zone.spaces["living"].breakdown.get(LoadComponent::AedExcursion);
        let bedroom = zone.spaces["bedroom"].breakdown.get(LoadComponent::AedExcursion);
        assert_relative_eq!(
            living.cooling_sensible + bedroom.cooling_sensible,
            zone.aed_excursion,
            max_relative = 1e-12
        );
        let living_fenestration = 1000.;
        let bedroom_fenestration = (11. * 500. + 6000.) / 12.;
        assert_relative_eq!(
            living.cooling_sensible / bedroom.cooling_sensible,
            living_fenestration / bedroom_fenestration,
            max_relative = 1e-9
        );
    }

    #[rstest]
    fn should_distribute_duct_loads_by_non_duct_share(mut zone: ZoneLoads) {
        let duct_loads = DuctLoads {
            ducts: DesignLoad::new(1100., 300., 50.),
            blower_heat: 200.,
            ..Default::default()
        };
        let before = zone.total();
        zone.distribute_duct_loads(duct_loads);

        let living_ducts = zone.spaces["living"].breakdown.get(LoadComponent::Ducts);
        // living has 4000 of the 5500 Btu/h non-duct heating load
        assert_relative_eq!(living_ducts.heating, 1100. * 4000. / 5500., max_relative = 1e-12);
        // no latent load in either space, so latent is shared by floor area
        assert_relative_eq!(living_ducts.cooling_latent, 50. * 0.6, max_relative = 1e-12);

        let after = zone.total();
        assert_relative_eq!(after.heating, before.heating + 1100., max_relative = 1e-12);
        assert_relative_eq!(
            after.cooling_sensible,
            before.cooling_sensible + 300. + 200.,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn should_sum_space_totals_to_zone_and_building(zone: ZoneLoads) {
        let space_sum: DesignLoad = zone.spaces.values().map(SpaceLoads::total).sum();
        assert_eq!(zone.total(), space_sum);
        assert_eq!(zone.breakdown().total(), zone.total());

        let building = BuildingLoads {
            zones: IndexMap::from([("main".to_string(), zone.clone())]),
        };
        assert_eq!(building.total(), zone.total());
    }

    #[rstest]
    fn should_allocate_by_volume(zone: ZoneLoads) {
        let mut building = BuildingLoads {
            zones: IndexMap::from([("main".to_string(), zone)]),
        };
        building.allocate_by_volume(LoadComponent::Infiltration, DesignLoad::new(1000., 500., 250.));
        let living = building.zones["main"].spaces["living"]
            .breakdown
            .get(LoadComponent::Infiltration);
        assert_relative_eq!(living.heating, 600.);
        assert_relative_eq!(living.cooling_latent, 150.);
        assert_relative_eq!(
            building.breakdown().get(LoadComponent::Infiltration).cooling_sensible,
            500.
        );
    }

    #[rstest]
    fn should_fall_back_to_weights_when_values_sum_to_zero() {
        assert_eq!(shares_of(&[0., 0.], &[1., 3.]), vec![0.25, 0.75]);
        assert_eq!(shares_of(&[2., 6.], &[1., 1.]), vec![0.25, 0.75]);
        assert_eq!(shares_of(&[0., 0.], &[0., 0.]), vec![0., 0.]);
    }
}
