use crate::core::design_conditions::DesignConditions;
use crate::core::loads::DesignLoad;
use crate::core::units::{watts_to_btu_per_hour, LATENT_AIR_FACTOR, SENSIBLE_AIR_FACTOR};
use crate::input::{AirDistributionInput, DuctType, Location};
use tracing::{debug, warn};

// Combined inside and outside surface resistance of a duct wall, in hr·ft²·°F/Btu
const DUCT_FILM_R_VALUE: f64 = 0.7;

const MAX_ITERATIONS: usize = 50;
/// Convergence tolerance of the duct load iteration, in Btu/h
const TOLERANCE: f64 = 1.;

/// Supply air temperatures of the systems connected to a duct system, in °F.
/// None where no ducted system provides that mode.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SupplyAirTemperatures {
    pub heating: Option<f64>,
    pub cooling: Option<f64>,
}

/// Thermal properties of the supply or return side of a duct system, outside
/// the conditioned space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct DuctSide {
    /// Conductance to unconditioned locations, in Btu/(hr·°F)
    conductance: f64,
    /// Conductance weighted heating and cooling temperatures of those locations
    heating_temperature: f64,
    cooling_temperature: f64,
    /// Fraction of duct surface area outside conditioned space
    unconditioned_fraction: f64,
    /// Area weighted moisture difference of those locations from indoors, in grains
    grains_difference: f64,
}

impl DuctSide {
    fn new(
        distribution: &AirDistributionInput,
        duct_type: DuctType,
        conditions: &DesignConditions,
    ) -> Self {
        let ducts = distribution
            .ducts
            .iter()
            .filter(|duct| duct.duct_type == duct_type)
            .collect::<Vec<_>>();
        let total_area: f64 = ducts.iter().map(|duct| duct.area).sum();

        let mut side = DuctSide::default();
        let mut unconditioned_area = 0.;
        for duct in ducts
            .iter()
            .filter(|duct| duct.location != Location::ConditionedSpace)
        {
            let conductance = duct.area / (duct.insulation_r_value + DUCT_FILM_R_VALUE);
            side.conductance += conductance;
            side.heating_temperature += conductance * conditions.heating_temperature(duct.location);
            side.cooling_temperature += conductance * conditions.cooling_temperature(duct.location);
            side.grains_difference += duct.area * conditions.cooling_grains_difference_at(duct.location);
            unconditioned_area += duct.area;
        }
        if side.conductance > 0. {
            side.heating_temperature /= side.conductance;
            side.cooling_temperature /= side.conductance;
        }
        if unconditioned_area > 0. {
            side.grains_difference /= unconditioned_area;
        }
        if total_area > 0. {
            side.unconditioned_fraction = unconditioned_area / total_area;
        }

        side
    }
}

/// Duct and blower loads of an air distribution system
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DuctLoads {
    pub ducts: DesignLoad,
    /// Sensible cooling gain from the blower fan motor, in Btu/h
    pub blower_heat: f64,
    /// System airflows at the converged loads, in cfm
    pub heating_airflow: f64,
    pub cooling_airflow: f64,
    pub iterations: usize,
}

/// An air distribution system serving one zone
pub struct DuctSystem<'a> {
    distribution: &'a AirDistributionInput,
    conditions: &'a DesignConditions,
    supply_temperatures: SupplyAirTemperatures,
    supply: DuctSide,
    return_: DuctSide,
}

impl<'a> DuctSystem<'a> {
    /// Arguments:
    /// * `distribution` - ducts and leakage of the system
    /// * `conditions` - design conditions, for adjacent location temperatures
    /// * `supply_temperatures` - supply air temperatures of the connected equipment
    pub fn new(
        distribution: &'a AirDistributionInput,
        conditions: &'a DesignConditions,
        supply_temperatures: SupplyAirTemperatures,
    ) -> Self {
        Self {
            distribution,
            conditions,
            supply_temperatures,
            supply: DuctSide::new(distribution, DuctType::Supply, conditions),
            return_: DuctSide::new(distribution, DuctType::Return, conditions),
        }
    }

    /// Solve for duct and blower loads given the zone load excluding them.
    ///
    /// The system airflow depends on the total load including ducts, so the
    /// loads are found by fixed point iteration.
    pub fn solve(&self, zone_load: DesignLoad) -> DuctLoads {
        let mut result = DuctLoads::default();

        for iteration in 1..=MAX_ITERATIONS {
            let heating_airflow = self.heating_airflow(zone_load.heating + result.ducts.heating);
            let cooling_airflow = self.cooling_airflow(
                zone_load.cooling_sensible + result.ducts.cooling_sensible + result.blower_heat,
            );
            let ducts = self.loads_at_airflow(heating_airflow, cooling_airflow);
            let blower_heat = watts_to_btu_per_hour(
                self.distribution.blower_fan_watts_per_cfm * cooling_airflow,
            );

            let converged = (ducts.heating - result.ducts.heating).abs() < TOLERANCE
                && (ducts.cooling_sensible - result.ducts.cooling_sensible).abs() < TOLERANCE
                && (ducts.cooling_latent - result.ducts.cooling_latent).abs() < TOLERANCE
                && (blower_heat - result.blower_heat).abs() < TOLERANCE;

            result = DuctLoads {
                ducts,
                blower_heat,
                heating_airflow,
                cooling_airflow,
                iterations: iteration,
            };

            if converged {
                debug!(iterations = iteration, ?ducts, blower_heat, "Duct loads converged");
                return result;
            }
        }

        warn!(
            "Duct loads did not converge within {MAX_ITERATIONS} iterations, using last estimate"
        );
        result
    }

    fn sensible_factor(&self) -> f64 {
        SENSIBLE_AIR_FACTOR * self.conditions.altitude_correction_factor()
    }

    /// Heating airflow needed to meet a load at the supply temperature rise, in cfm
    pub fn heating_airflow(&self, heating_load: f64) -> f64 {
        match self.supply_temperatures.heating {
            Some(supply_temperature) => {
                let rise = supply_temperature - self.conditions.heating_setpoint();
                if rise > 0. {
                    heating_load.max(0.) / (self.sensible_factor() * rise)
                } else {
                    0.
                }
            }
            None => 0.,
        }
    }

    /// Cooling airflow needed to meet a sensible load, in cfm
    pub fn cooling_airflow(&self, cooling_sensible_load: f64) -> f64 {
        match self.supply_temperatures.cooling {
            Some(supply_temperature) => {
                let drop = self.conditions.cooling_setpoint() - supply_temperature;
                if drop > 0. {
                    cooling_sensible_load.max(0.) / (self.sensible_factor() * drop)
                } else {
                    0.
                }
            }
            None => 0.,
        }
    }

    fn loads_at_airflow(&self, heating_airflow: f64, cooling_airflow: f64) -> DesignLoad {
        let sensible_factor = self.sensible_factor();
        let latent_factor = LATENT_AIR_FACTOR * self.conditions.altitude_correction_factor();
        let (supply, return_) = (&self.supply, &self.return_);

        let supply_leakage_fraction =
            self.distribution.supply_leakage_fraction * supply.unconditioned_fraction;
        let return_leakage_fraction =
            self.distribution.return_leakage_fraction * return_.unconditioned_fraction;

        let heating = match self.supply_temperatures.heating {
            Some(supply_temperature) if heating_airflow > 0. => {
                let setpoint = self.conditions.heating_setpoint();
                let conduction = supply.conductance
                    * (supply_temperature - supply.heating_temperature)
                    + return_.conductance * (setpoint - return_.heating_temperature);
                let leakage = sensible_factor
                    * heating_airflow
                    * (supply_leakage_fraction * (supply_temperature - supply.heating_temperature)
                        + return_leakage_fraction * (setpoint - return_.heating_temperature));
                conduction + leakage
            }
            _ => 0.,
        };

        let (cooling_sensible, cooling_latent) = match self.supply_temperatures.cooling {
            Some(supply_temperature) if cooling_airflow > 0. => {
                let setpoint = self.conditions.cooling_setpoint();
                let conduction = supply.conductance
                    * (supply.cooling_temperature - supply_temperature)
                    + return_.conductance * (return_.cooling_temperature - setpoint);
                let leakage = sensible_factor
                    * cooling_airflow
                    * (supply_leakage_fraction * (supply.cooling_temperature - supply_temperature)
                        + return_leakage_fraction * (return_.cooling_temperature - setpoint));
                let latent = latent_factor
                    * cooling_airflow
                    * return_leakage_fraction
                    * return_.grains_difference;
                (conduction + leakage, latent)
            }
            _ => (0., 0.),
        };

        DesignLoad::new(heating, cooling_sensible, cooling_latent)
    }
}
