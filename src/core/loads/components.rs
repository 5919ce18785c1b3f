use crate::core::design_conditions::DesignConditions;
use crate::core::envelope::surfaces::EnvelopeLoadCalculator;
use crate::core::loads::aggregation::{BuildingLoads, SpaceLoads, ZoneLoads};
use crate::core::loads::ducts::{DuctSystem, SupplyAirTemperatures};
use crate::core::loads::infiltration::{air_exchange_loads, InfiltrationModel, VentilationFlows};
use crate::core::loads::internal_gains::internal_gains;
use crate::core::loads::LoadComponent;
use crate::input::Input;
use indexmap::IndexMap;
use tracing::{debug, instrument};

/// Calculate design loads for every space, zone and the whole building.
///
/// Arguments:
/// * `input` - the building description
/// * `conditions` - outdoor and indoor design conditions
/// * `supply_temperatures` - supply air temperatures of ducted equipment, by zone name
#[instrument(skip_all)]
pub fn calculate_building_loads(
    input: &Input,
    conditions: &DesignConditions,
    supply_temperatures: &IndexMap<String, SupplyAirTemperatures>,
) -> anyhow::Result<BuildingLoads> {
    let envelope = EnvelopeLoadCalculator::new(conditions);
    let total_floor_area = input.total_floor_area();

    let mut building = BuildingLoads {
        zones: input
            .zones
            .iter()
            .map(|(zone_name, zone)| {
                let spaces = zone
                    .spaces
                    .iter()
                    .map(|(space_name, space)| {
                        let envelope_loads = envelope.space(space);
                        let mut breakdown = envelope_loads.breakdown;
                        breakdown.add(
                            LoadComponent::InternalGains,
                            internal_gains(space, total_floor_area),
                        );
                        (
                            space_name.clone(),
                            SpaceLoads {
                                floor_area: space.floor_area,
                                volume: space.floor_area * space.ceiling_height,
                                breakdown,
                                fenestration_curve: envelope_loads.fenestration_curve,
                            },
                        )
                    })
                    .collect();
                (
                    zone_name.clone(),
                    ZoneLoads {
                        spaces,
                        ..Default::default()
                    },
                )
            })
            .collect(),
    };

    let infiltration_model =
        InfiltrationModel::from_input(&input.infiltration, input.conditioned_volume())?;
    let ventilation_flows = VentilationFlows::from_fans(&input.mechanical_ventilation);
    let air_exchange = air_exchange_loads(&infiltration_model, &ventilation_flows, conditions);
    building.allocate_by_volume(LoadComponent::Infiltration, air_exchange.infiltration);
    building.allocate_by_volume(LoadComponent::Ventilation, air_exchange.ventilation);

    for (zone_name, zone) in building.zones.iter_mut() {
        zone.apply_aed_excursion();

        if let Some(distribution) = input.air_distribution.get(zone_name) {
            let zone_supply_temperatures = supply_temperatures
                .get(zone_name)
                .copied()
                .unwrap_or_default();
            let duct_system = DuctSystem::new(distribution, conditions, zone_supply_temperatures);
            let duct_loads = duct_system.solve(zone.breakdown().non_distribution_total());
            zone.distribute_duct_loads(duct_loads);
        }

        debug!(zone = zone_name.as_str(), total = ?zone.total(), "Calculated zone loads");
    }

    Ok(building)
}
