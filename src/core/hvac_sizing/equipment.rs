use crate::core::design_conditions::DesignConditions;
use crate::core::hvac_sizing::heat_pump::CapacityCurves;
use crate::core::hvac_sizing::methodology::{
    CapacityMode, HeatPumpRequirement, SizingStage, StagedCapacity,
};
use crate::core::loads::ducts::SupplyAirTemperatures;
use crate::core::loads::DesignLoad;
use crate::core::units::{btu_per_hour_to_tons, SENSIBLE_AIR_FACTOR};
use crate::errors::StageTransitionError;
use crate::input::{HvacSystemInput, HvacSystemType, SizingControls};
use anyhow::bail;
use serde::Serialize;
use tracing::{debug, warn};

const FURNACE_SUPPLY_AIR_TEMPERATURE: f64 = 120.;
const HEAT_PUMP_SUPPLY_AIR_TEMPERATURE: f64 = 105.;
const COOLING_SUPPLY_AIR_TEMPERATURE: f64 = 55.;
const COOLING_AIRFLOW_PER_TON: f64 = 400.;
const DEFAULT_COOLING_SHR: f64 = 0.73;
const MINIMUM_DEFECT_MULTIPLIER: f64 = 0.1;

impl HvacSystemType {
    pub fn is_heat_pump(&self) -> bool {
        matches!(
            self,
            HvacSystemType::AirToAirHeatPump
                | HvacSystemType::MiniSplitHeatPump
                | HvacSystemType::GroundToAirHeatPump
        )
    }

    pub fn provides_heating(&self) -> bool {
        match self {
            HvacSystemType::Furnace
            | HvacSystemType::Boiler
            | HvacSystemType::ElectricResistance
            | HvacSystemType::Stove => true,
            HvacSystemType::CentralAirConditioner
            | HvacSystemType::RoomAirConditioner
            | HvacSystemType::EvaporativeCooler => false,
            _ => self.is_heat_pump(),
        }
    }

    pub fn provides_cooling(&self) -> bool {
        match self {
            HvacSystemType::CentralAirConditioner
            | HvacSystemType::RoomAirConditioner
            | HvacSystemType::EvaporativeCooler => true,
            _ => self.is_heat_pump(),
        }
    }

    /// Whether the system rejects or absorbs heat through an outdoor air coil
    pub fn is_air_cooled(&self) -> bool {
        matches!(
            self,
            HvacSystemType::CentralAirConditioner
                | HvacSystemType::RoomAirConditioner
                | HvacSystemType::AirToAirHeatPump
                | HvacSystemType::MiniSplitHeatPump
        )
    }

    /// Whether capacity is affected by airflow and refrigerant charge defects
    pub fn has_compressor(&self) -> bool {
        self.is_heat_pump()
            || matches!(
                self,
                HvacSystemType::CentralAirConditioner | HvacSystemType::RoomAirConditioner
            )
    }

    /// Supply air temperature in heating, in °F, or None if not a ducted air system
    pub fn heating_supply_air_temperature(&self) -> Option<f64> {
        match self {
            HvacSystemType::Furnace => Some(FURNACE_SUPPLY_AIR_TEMPERATURE),
            HvacSystemType::AirToAirHeatPump
            | HvacSystemType::MiniSplitHeatPump
            | HvacSystemType::GroundToAirHeatPump => Some(HEAT_PUMP_SUPPLY_AIR_TEMPERATURE),
            _ => None,
        }
    }

    /// Supply air temperature in cooling, in °F, or None if not a ducted air system
    pub fn cooling_supply_air_temperature(&self) -> Option<f64> {
        match self {
            HvacSystemType::CentralAirConditioner
            | HvacSystemType::AirToAirHeatPump
            | HvacSystemType::MiniSplitHeatPump
            | HvacSystemType::GroundToAirHeatPump => Some(COOLING_SUPPLY_AIR_TEMPERATURE),
            _ => None,
        }
    }

    pub fn supply_air_temperatures(&self) -> SupplyAirTemperatures {
        SupplyAirTemperatures {
            heating: self.heating_supply_air_temperature(),
            cooling: self.cooling_supply_air_temperature(),
        }
    }

    pub fn default_cooling_shr(&self) -> f64 {
        match self {
            HvacSystemType::EvaporativeCooler => 1.,
            _ => DEFAULT_COOLING_SHR,
        }
    }
}

/// Capacity multiplier for installation defects
///
/// Arguments:
/// * `airflow_defect_ratio` - (actual - design) / design airflow
/// * `charge_defect_ratio` - (actual - design) / design refrigerant charge
pub fn installation_defect_multiplier(airflow_defect_ratio: f64, charge_defect_ratio: f64) -> f64 {
    let airflow = 1. + 0.25 * airflow_defect_ratio.min(0.);
    let charge = if charge_defect_ratio < 0. {
        1. + 0.6 * charge_defect_ratio
    } else {
        1. - 0.2 * charge_defect_ratio
    };
    (airflow * charge).max(MINIMUM_DEFECT_MULTIPLIER)
}

/// Capacity from detailed performance data at one outdoor temperature
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PerformanceCapacity {
    pub outdoor_temperature: f64,
    /// in Btu/h
    pub capacity: f64,
}

/// Sized capacities and airflows of one HVAC system
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SystemSizing {
    pub name: String,
    pub zone: String,
    pub system_type: HvacSystemType,
    /// Share of the zone's design load served by the system
    pub loads_served: DesignLoad,
    pub heating: Option<StagedCapacity>,
    pub cooling: Option<StagedCapacity>,
    pub backup: Option<StagedCapacity>,
    /// Heating output at the heating design temperature, in Btu/h
    pub heating_capacity_at_design: f64,
    /// in cfm
    pub heating_airflow: f64,
    /// in cfm
    pub cooling_airflow: f64,
    pub heating_performance: Vec<PerformanceCapacity>,
    pub cooling_performance: Vec<PerformanceCapacity>,
    #[serde(skip)]
    pub warnings: Vec<String>,
}

impl SystemSizing {
    pub fn heating_capacity(&self) -> f64 {
        self.heating.as_ref().map_or(0., StagedCapacity::value)
    }

    pub fn cooling_capacity(&self) -> f64 {
        self.cooling.as_ref().map_or(0., StagedCapacity::value)
    }

    pub fn backup_capacity(&self) -> f64 {
        self.backup.as_ref().map_or(0., StagedCapacity::value)
    }
}

/// Inputs to the staged sizing of one capacity
struct ModeSizing {
    mode: CapacityMode,
    from_load: f64,
    adjusted: f64,
    fixed: Option<f64>,
    factor: Option<f64>,
    limit: Option<f64>,
}

pub struct EquipmentSizer<'a> {
    conditions: &'a DesignConditions,
    controls: SizingControls,
}

impl<'a> EquipmentSizer<'a> {
    pub fn new(conditions: &'a DesignConditions, controls: SizingControls) -> Self {
        Self {
            conditions,
            controls,
        }
    }

    /// Size heating, cooling and backup capacities of a system for the load
    /// of the zone it serves
    ///
    /// Arguments:
    /// * `system` - the system to size
    /// * `zone_load` - design load of the zone served by the system, in Btu/h
    pub fn size(&self, system: &HvacSystemInput, zone_load: DesignLoad) -> anyhow::Result<SystemSizing> {
        let system_type = system.system_type;
        let curves = CapacityCurves::from_system(system);
        let mut warnings = vec![];

        let loads_served = DesignLoad::new(
            zone_load.heating * system.fraction_heat_load_served,
            zone_load.cooling_sensible * system.fraction_cool_load_served,
            zone_load.cooling_latent * system.fraction_cool_load_served,
        );
        let defect_multiplier = if system_type.has_compressor() {
            installation_defect_multiplier(system.airflow_defect_ratio, system.charge_defect_ratio)
        } else {
            1.
        };

        let cooling_required = if system_type.provides_cooling() {
            let cooling_fraction = curves.cooling_fraction_at(self.conditions.cooling_design_drybulb());
            if cooling_fraction <= 0. {
                bail!(
                    "{} has no cooling capacity at the design temperature of {}°F",
                    system.name,
                    self.conditions.cooling_design_drybulb()
                );
            }
            let shr = system.cooling_shr.unwrap_or(system_type.default_cooling_shr());
            let required = if system_type == HvacSystemType::EvaporativeCooler {
                loads_served.cooling_sensible
            } else {
                (loads_served.cooling_sensible / shr).max(loads_served.cooling_total())
            };
            required / cooling_fraction / defect_multiplier
        } else {
            0.
        };

        let heating_fraction = curves.heating_fraction_at(self.conditions.heating_design_drybulb());
        let heating_required = if !system_type.is_heat_pump() {
            Some(loads_served.heating)
        } else if heating_fraction > 0. {
            Some(loads_served.heating / heating_fraction / defect_multiplier)
        } else {
            None
        };

        let ratio = system.heating_to_cooling_capacity_ratio.unwrap_or(1.);
        let (heating_adjusted, cooling_adjusted) = if system_type.is_heat_pump() {
            let nominal = if loads_served.cooling_total() > 0. {
                self.controls
                    .heat_pump_sizing_methodology
                    .nominal_capacity(&HeatPumpRequirement {
                        cooling_based: cooling_required,
                        heating_based: heating_required.map(|heating| heating / ratio),
                        heating_load: loads_served.heating,
                        cooling_load: loads_served.cooling_total(),
                        heating_to_cooling_ratio: ratio,
                        defect_multiplier,
                    })
            } else {
                heating_required.unwrap_or(loads_served.heating / defect_multiplier) / ratio
            };
            (nominal * ratio, nominal)
        } else {
            (heating_required.unwrap_or(loads_served.heating), cooling_required)
        };

        let (fixed_heating, fixed_cooling) = if system_type.is_heat_pump() {
            (
                system.heating_capacity.or(system.cooling_capacity.map(|cooling| cooling * ratio)),
                system.cooling_capacity.or(system.heating_capacity.map(|heating| heating / ratio)),
            )
        } else {
            (system.heating_capacity, system.cooling_capacity)
        };

        let heating = system_type
            .provides_heating()
            .then(|| {
                self.size_mode(
                    &system.name,
                    ModeSizing {
                        mode: CapacityMode::Heating,
                        from_load: heating_required.unwrap_or(loads_served.heating),
                        adjusted: heating_adjusted,
                        fixed: fixed_heating,
                        factor: system.heating_autosizing_factor,
                        limit: system.heating_autosizing_limit,
                    },
                )
            })
            .transpose()?;
        let cooling = system_type
            .provides_cooling()
            .then(|| {
                self.size_mode(
                    &system.name,
                    ModeSizing {
                        mode: CapacityMode::Cooling,
                        from_load: cooling_required,
                        adjusted: cooling_adjusted,
                        fixed: fixed_cooling,
                        factor: system.cooling_autosizing_factor,
                        limit: system.cooling_autosizing_limit,
                    },
                )
            })
            .transpose()?;

        let heating_capacity = heating.as_ref().map_or(0., StagedCapacity::value);
        let cooling_capacity = cooling.as_ref().map_or(0., StagedCapacity::value);
        let heating_capacity_at_design = heating_capacity * heating_fraction * defect_multiplier;

        let backup = match (&system.backup, system_type.is_heat_pump()) {
            (Some(backup), true) => Some(self.size_mode(
                &system.name,
                ModeSizing {
                    mode: CapacityMode::Backup,
                    from_load: loads_served.heating,
                    adjusted: self
                        .controls
                        .heat_pump_backup_sizing_methodology
                        .backup_capacity(loads_served.heating, heating_capacity_at_design),
                    fixed: backup.capacity,
                    factor: backup.autosizing_factor,
                    limit: backup.autosizing_limit,
                },
            )?),
            _ => None,
        };

        let backup_capacity = backup.as_ref().map_or(0., StagedCapacity::value);
        if system_type.provides_heating()
            && heating_capacity_at_design + backup_capacity < loads_served.heating
        {
            let message = format!(
                "{} provides {:.0} Btu/h at the heating design temperature, less than its heating load of {:.0} Btu/h",
                system.name,
                heating_capacity_at_design + backup_capacity,
                loads_served.heating
            );
            warn!("{message}");
            warnings.push(message);
        }

        let sizing = SystemSizing {
            name: system.name.clone(),
            zone: system.zone.clone(),
            system_type,
            loads_served,
            heating_airflow: self.heating_airflow(system_type, heating_capacity.max(backup_capacity)),
            cooling_airflow: if system_type.provides_cooling()
                && system_type != HvacSystemType::EvaporativeCooler
            {
                btu_per_hour_to_tons(cooling_capacity) * COOLING_AIRFLOW_PER_TON
            } else {
                0.
            },
            heating_performance: curves
                .heating_data()
                .iter()
                .map(|point| PerformanceCapacity {
                    outdoor_temperature: point.outdoor_temperature,
                    capacity: point.capacity_fraction_of_nominal * heating_capacity,
                })
                .collect(),
            cooling_performance: curves
                .cooling_data()
                .iter()
                .map(|point| PerformanceCapacity {
                    outdoor_temperature: point.outdoor_temperature,
                    capacity: point.capacity_fraction_of_nominal * cooling_capacity,
                })
                .collect(),
            heating,
            cooling,
            backup,
            heating_capacity_at_design,
            warnings,
        };
        debug!(
            system = sizing.name.as_str(),
            heating = sizing.heating_capacity(),
            cooling = sizing.cooling_capacity(),
            backup = sizing.backup_capacity(),
            "Sized system"
        );
        Ok(sizing)
    }

    fn size_mode(&self, system: &str, sizing: ModeSizing) -> Result<StagedCapacity, StageTransitionError> {
        let mut capacity = StagedCapacity::new(system, sizing.mode);
        capacity.advance(SizingStage::ComputedFromLoad, sizing.from_load.max(0.))?;

        match sizing.fixed {
            Some(fixed) => {
                let adjusted = if self.controls.allow_increased_fixed_capacities {
                    fixed.max(sizing.adjusted)
                } else {
                    fixed
                };
                capacity.advance(SizingStage::AdjustedByMethodology, adjusted)?;
                capacity.keep(SizingStage::FactorApplied)?;
                capacity.keep(SizingStage::LimitClamped)?;
            }
            None => {
                capacity.advance(SizingStage::AdjustedByMethodology, sizing.adjusted.max(0.))?;
                let factored = capacity.value() * sizing.factor.unwrap_or(1.);
                capacity.advance(SizingStage::FactorApplied, factored)?;
                let limited = match sizing.limit {
                    Some(limit) => factored.min(limit),
                    None => factored,
                };
                capacity.advance(SizingStage::LimitClamped, limited)?;
            }
        }

        capacity.keep(SizingStage::Final)?;
        Ok(capacity)
    }

    fn heating_airflow(&self, system_type: HvacSystemType, heating_capacity: f64) -> f64 {
        let Some(supply_temperature) = system_type.heating_supply_air_temperature() else {
            return 0.;
        };
        let rise = supply_temperature - self.conditions.heating_setpoint();
        if rise <= 0. {
            return 0.;
        }
        heating_capacity / (SENSIBLE_AIR_FACTOR * self.conditions.altitude_correction_factor() * rise)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::design_conditions::tests::design_conditions;
    use crate::core::units::{btu_per_hour_to_watts, watts_to_btu_per_hour};
    use crate::input::{
        BackupHeatInput, HeatPumpBackupSizingMethodology, HeatPumpSizingMethodology,
        PerformanceDataPoint,
    };
    use crate::tests::fixtures::{air_source_heat_pump, furnace};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn controls(methodology: HeatPumpSizingMethodology) -> SizingControls {
        SizingControls {
            heat_pump_sizing_methodology: methodology,
            ..Default::default()
        }
    }

    #[fixture]
    fn zone_load() -> DesignLoad {
        DesignLoad::new(40_000., 18_000., 3_000.)
    }

    #[rstest]
    #[case(0., 0., 1.)]
    #[case(-0.2, 0., 0.95)]
    #[case(0.3, 0., 1.)]
    #[case(0., -0.25, 0.85)]
    #[case(0., 0.25, 0.95)]
    #[case(0., 9., 0.1)]
    fn should_calculate_defect_multiplier(#[case] airflow: f64, #[case] charge: f64, #[case] expected: f64) {
        assert_relative_eq!(installation_defect_multiplier(airflow, charge), expected, max_relative = 1e-12);
    }

    #[rstest]
    fn should_size_furnace_to_heating_load(design_conditions: DesignConditions, furnace: HvacSystemInput, zone_load: DesignLoad) {
        let sizer = EquipmentSizer::new(&design_conditions, SizingControls::default());
        let sizing = sizer.size(&furnace, zone_load).unwrap();
        assert_eq!(sizing.heating_capacity(), 40_000.);
        assert!(sizing.cooling.is_none());
        assert!(sizing.heating.as_ref().unwrap().is_final());
        assert_relative_eq!(sizing.heating_airflow, 40_000. / (1.1 * 50.), max_relative = 1e-9);
    }

    #[rstest]
    fn should_apply_autosizing_factor(design_conditions: DesignConditions, air_source_heat_pump: HvacSystemInput) {
        // 3000 W of cooling load with no heating or latent load
        let sensible = watts_to_btu_per_hour(3000.) * DEFAULT_COOLING_SHR;
        let zone_load = DesignLoad::new(0., sensible, 0.);
        let sizer = EquipmentSizer::new(&design_conditions, controls(HeatPumpSizingMethodology::Acca));

        let base = sizer.size(&air_source_heat_pump, zone_load).unwrap();
        assert_relative_eq!(btu_per_hour_to_watts(base.cooling_capacity()), 3000., max_relative = 1e-9);

        let factored = sizer
            .size(
                &HvacSystemInput {
                    cooling_autosizing_factor: Some(1.2),
                    ..air_source_heat_pump
                },
                zone_load,
            )
            .unwrap();
        assert_relative_eq!(btu_per_hour_to_watts(factored.cooling_capacity()), 3600., max_relative = 1e-3);
    }

    #[rstest]
    fn should_scale_performance_data_with_autosizing_factor(
        design_conditions: DesignConditions,
        air_source_heat_pump: HvacSystemInput,
        zone_load: DesignLoad,
    ) {
        let system = HvacSystemInput {
            heating_performance_data: vec![
                PerformanceDataPoint {
                    outdoor_temperature: 47.,
                    capacity_fraction_of_nominal: 1.,
                    cop: None,
                },
                PerformanceDataPoint {
                    outdoor_temperature: 5.,
                    capacity_fraction_of_nominal: 0.6,
                    cop: None,
                },
            ],
            ..air_source_heat_pump
        };
        let sizer = EquipmentSizer::new(&design_conditions, SizingControls::default());
        let base = sizer.size(&system, zone_load).unwrap();
        let factored = sizer
            .size(
                &HvacSystemInput {
                    heating_autosizing_factor: Some(1.5),
                    ..system
                },
                zone_load,
            )
            .unwrap();
        for (base, factored) in base.heating_performance.iter().zip(&factored.heating_performance) {
            assert_relative_eq!(factored.capacity, base.capacity * 1.5, max_relative = 1e-9);
        }
    }

    #[rstest]
    #[case(10_000., Some(10_000.))]
    #[case(1_000_000., None)]
    fn should_apply_autosizing_limit(
        design_conditions: DesignConditions,
        furnace: HvacSystemInput,
        zone_load: DesignLoad,
        #[case] limit: f64,
        #[case] expected: Option<f64>,
    ) {
        let sizer = EquipmentSizer::new(&design_conditions, SizingControls::default());
        let sizing = sizer
            .size(
                &HvacSystemInput {
                    heating_autosizing_limit: Some(limit),
                    ..furnace
                },
                zone_load,
            )
            .unwrap();
        assert_eq!(sizing.heating_capacity(), expected.unwrap_or(zone_load.heating));
    }

    #[rstest]
    fn should_size_hers_above_loads_when_defective(
        design_conditions: DesignConditions,
        air_source_heat_pump: HvacSystemInput,
        zone_load: DesignLoad,
    ) {
        let sizer = EquipmentSizer::new(&design_conditions, controls(HeatPumpSizingMethodology::Hers));
        let defective = HvacSystemInput {
            charge_defect_ratio: -0.25,
            airflow_defect_ratio: -0.2,
            ..air_source_heat_pump
        };
        let sizing = sizer.size(&defective, zone_load).unwrap();
        let largest_load = zone_load.heating.max(zone_load.cooling_total());
        assert!(sizing.heating_capacity() > largest_load);
        assert!(sizing.cooling_capacity() > largest_load);
    }

    #[rstest]
    fn should_size_max_load_at_least_as_large_as_acca(
        design_conditions: DesignConditions,
        air_source_heat_pump: HvacSystemInput,
        zone_load: DesignLoad,
    ) {
        let acca = EquipmentSizer::new(&design_conditions, controls(HeatPumpSizingMethodology::Acca))
            .size(&air_source_heat_pump, zone_load)
            .unwrap();
        let max_load = EquipmentSizer::new(&design_conditions, controls(HeatPumpSizingMethodology::MaxLoad))
            .size(&air_source_heat_pump, zone_load)
            .unwrap();
        assert!(max_load.cooling_capacity() >= acca.cooling_capacity());
        assert!(max_load.heating_capacity() >= acca.heating_capacity());
    }

    #[rstest]
    fn should_size_supplemental_backup_no_larger_than_emergency(
        design_conditions: DesignConditions,
        air_source_heat_pump: HvacSystemInput,
        zone_load: DesignLoad,
    ) {
        let system = HvacSystemInput {
            backup: Some(BackupHeatInput::default()),
            ..air_source_heat_pump
        };
        let size_with = |backup_methodology| {
            EquipmentSizer::new(
                &design_conditions,
                SizingControls {
                    heat_pump_sizing_methodology: HeatPumpSizingMethodology::Acca,
                    heat_pump_backup_sizing_methodology: backup_methodology,
                    ..Default::default()
                },
            )
            .size(&system, zone_load)
            .unwrap()
        };
        let emergency = size_with(HeatPumpBackupSizingMethodology::Emergency);
        let supplemental = size_with(HeatPumpBackupSizingMethodology::Supplemental);
        assert_eq!(emergency.backup_capacity(), zone_load.heating);
        assert!(supplemental.backup_capacity() <= emergency.backup_capacity());
        assert_relative_eq!(
            supplemental.backup_capacity(),
            zone_load.heating - supplemental.heating_capacity_at_design,
            max_relative = 1e-9
        );
    }

    #[rstest]
    fn should_size_supplemental_backup_from_derated_output_of_defective_heat_pump(
        design_conditions: DesignConditions,
        air_source_heat_pump: HvacSystemInput,
        zone_load: DesignLoad,
    ) {
        let controls = SizingControls {
            heat_pump_sizing_methodology: HeatPumpSizingMethodology::Acca,
            heat_pump_backup_sizing_methodology: HeatPumpBackupSizingMethodology::Supplemental,
            ..Default::default()
        };
        let clean_system = HvacSystemInput {
            backup: Some(BackupHeatInput::default()),
            ..air_source_heat_pump
        };
        let defective_system = HvacSystemInput {
            charge_defect_ratio: -0.25,
            ..clean_system.clone()
        };
        let sizer = EquipmentSizer::new(&design_conditions, controls);
        let clean = sizer.size(&clean_system, zone_load).unwrap();
        let defective = sizer.size(&defective_system, zone_load).unwrap();

        assert!(defective.heating_capacity() > clean.heating_capacity());
        assert_relative_eq!(
            defective.heating_capacity_at_design,
            clean.heating_capacity_at_design,
            max_relative = 1e-9
        );
        assert_relative_eq!(defective.backup_capacity(), clean.backup_capacity(), max_relative = 1e-9);
        assert_relative_eq!(
            defective.backup_capacity(),
            zone_load.heating - defective.heating_capacity_at_design,
            max_relative = 1e-9
        );
    }

    #[rstest]
    fn should_preserve_fixed_capacity_unless_increase_allowed(
        design_conditions: DesignConditions,
        furnace: HvacSystemInput,
        zone_load: DesignLoad,
    ) {
        let fixed = HvacSystemInput {
            heating_capacity: Some(20_000.),
            heating_autosizing_factor: Some(2.),
            ..furnace
        };
        let preserved = EquipmentSizer::new(&design_conditions, SizingControls::default())
            .size(&fixed, zone_load)
            .unwrap();
        assert_eq!(preserved.heating_capacity(), 20_000.);
        assert_eq!(preserved.warnings.len(), 1);

        let increased = EquipmentSizer::new(
            &design_conditions,
            SizingControls {
                allow_increased_fixed_capacities: true,
                ..Default::default()
            },
        )
        .size(&fixed, zone_load)
        .unwrap();
        assert_eq!(increased.heating_capacity(), 40_000.);
    }

    #[rstest]
    fn should_warn_when_locked_out_heat_pump_has_no_backup(
        design_conditions: DesignConditions,
        air_source_heat_pump: HvacSystemInput,
        zone_load: DesignLoad,
    ) {
        let system = HvacSystemInput {
            compressor_lockout_temperature: Some(25.),
            ..air_source_heat_pump
        };
        let sizing = EquipmentSizer::new(&design_conditions, SizingControls::default())
            .size(&system, zone_load)
            .unwrap();
        assert_eq!(sizing.heating_capacity_at_design, 0.);
        assert_eq!(sizing.warnings.len(), 1);
    }

    #[rstest]
    fn should_give_cooling_airflow_per_ton(
        design_conditions: DesignConditions,
        air_source_heat_pump: HvacSystemInput,
        zone_load: DesignLoad,
    ) {
        let sizing = EquipmentSizer::new(&design_conditions, SizingControls::default())
            .size(&air_source_heat_pump, zone_load)
            .unwrap();
        assert_relative_eq!(
            sizing.cooling_airflow,
            sizing.cooling_capacity() / 12_000. * 400.,
            max_relative = 1e-12
        );
    }
}
