use crate::core::design_conditions::DesignConditions;
use crate::core::hvac_sizing::{EquipmentSizer, GeothermalLoopSizer, GeothermalLoopSizing, SystemSizing};
use crate::core::loads::aggregation::BuildingLoads;
use crate::core::loads::components::calculate_building_loads;
use crate::core::loads::ducts::SupplyAirTemperatures;
use crate::input::{HvacSystemType, Input};
use anyhow::anyhow;
use indexmap::IndexMap;
use tracing::{info, instrument, warn};

/// Everything calculated for one building
#[derive(Clone, Debug)]
pub struct SizingResults {
    pub loads: BuildingLoads,
    /// Keyed by system name
    pub systems: IndexMap<String, SystemSizing>,
    pub geothermal_loop: Option<GeothermalLoopSizing>,
    /// Constraints that were clamped or not met
    pub warnings: Vec<String>,
}

/// A building ready to be sized
#[derive(Debug)]
pub struct SizingModel {
    input: Input,
    conditions: DesignConditions,
}

impl SizingModel {
    pub fn from_inputs(input: Input) -> anyhow::Result<Self> {
        let conditions = DesignConditions::from_input(&input.design_conditions, &input.attic)?;
        Ok(Self { input, conditions })
    }

    pub fn conditions(&self) -> &DesignConditions {
        &self.conditions
    }

    /// Supply air temperatures of the ducted systems serving each zone
    fn supply_air_temperatures(&self) -> IndexMap<String, SupplyAirTemperatures> {
        self.input
            .zones
            .keys()
            .map(|zone| {
                let systems = self
                    .input
                    .hvac_systems
                    .iter()
                    .filter(|system| &system.zone == zone)
                    .collect::<Vec<_>>();
                let temperatures = SupplyAirTemperatures {
                    heating: systems
                        .iter()
                        .filter(|system| system.fraction_heat_load_served > 0.)
                        .find_map(|system| system.system_type.heating_supply_air_temperature()),
                    cooling: systems
                        .iter()
                        .filter(|system| system.fraction_cool_load_served > 0.)
                        .find_map(|system| system.system_type.cooling_supply_air_temperature()),
                };
                (zone.clone(), temperatures)
            })
            .collect()
    }

    #[instrument(skip_all)]
    pub fn run(&self) -> anyhow::Result<SizingResults> {
        let loads = calculate_building_loads(&self.input, &self.conditions, &self.supply_air_temperatures())?;
        let total = loads.total();
        info!(
            heating = total.heating,
            cooling_sensible = total.cooling_sensible,
            cooling_latent = total.cooling_latent,
            "Calculated building design loads"
        );

        let sizer = EquipmentSizer::new(&self.conditions, self.input.sizing_controls);
        let mut warnings = vec![];
        let mut systems = IndexMap::new();
        for system in &self.input.hvac_systems {
            let zone_loads = loads
                .zones
                .get(&system.zone)
                .ok_or_else(|| anyhow!("HVAC system {} serves unknown zone {}", system.name, system.zone))?;
            let sizing = sizer.size(system, zone_loads.total())?;
            warnings.extend(sizing.warnings.iter().cloned());
            systems.insert(system.name.clone(), sizing);
        }

        let geothermal_loop = match &self.input.geothermal_loop {
            Some(loop_input) => {
                let mut ground_source = self
                    .input
                    .hvac_systems
                    .iter()
                    .filter(|system| system.system_type == HvacSystemType::GroundToAirHeatPump);
                let system = ground_source
                    .next()
                    .ok_or_else(|| anyhow!("A geothermal loop needs a ground source heat pump"))?;
                if ground_source.next().is_some() {
                    let message = format!(
                        "More than one ground source heat pump; the geothermal loop is sized for {}",
                        system.name
                    );
                    warn!("{message}");
                    warnings.push(message);
                }
                let sizing = GeothermalLoopSizer::new(loop_input, &self.conditions)
                    .size(system, &systems[&system.name])?;
                warnings.extend(sizing.warnings.iter().cloned());
                Some(sizing)
            }
            None => None,
        };

        Ok(SizingResults {
            loads,
            systems,
            geothermal_loop,
            warnings,
        })
    }
}
