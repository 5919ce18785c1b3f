use crate::input::{CapacityRetention, HvacSystemInput, HvacSystemType, PerformanceDataPoint};
use crate::statistics::np_interp;
use itertools::Itertools;
use ordered_float::OrderedFloat;

/// Rating temperature for heat pump heating capacity, in °F
pub const HEATING_RATING_TEMPERATURE: f64 = 47.;
/// Rating temperature for cooling capacity, in °F
pub const COOLING_RATING_TEMPERATURE: f64 = 95.;
/// Loss of air-cooled cooling capacity per °F above the rating temperature
const COOLING_CAPACITY_LOSS_PER_DEGREE: f64 = 0.01;

const DEFAULT_CAPACITY_RETENTION: CapacityRetention = CapacityRetention {
    fraction: 0.425,
    temperature: 5.,
};
const DEFAULT_MINI_SPLIT_CAPACITY_RETENTION: CapacityRetention = CapacityRetention {
    fraction: 0.5,
    temperature: 5.,
};

/// How the capacity of a system varies with outdoor temperature
#[derive(Clone, Debug, PartialEq)]
pub struct CapacityCurves {
    system_type: HvacSystemType,
    retention: CapacityRetention,
    lockout_temperature: Option<f64>,
    heating_data: Vec<PerformanceDataPoint>,
    cooling_data: Vec<PerformanceDataPoint>,
}

impl CapacityCurves {
    pub fn from_system(system: &HvacSystemInput) -> Self {
        let default_retention = match system.system_type {
            HvacSystemType::MiniSplitHeatPump => DEFAULT_MINI_SPLIT_CAPACITY_RETENTION,
            _ => DEFAULT_CAPACITY_RETENTION,
        };
        Self {
            system_type: system.system_type,
            retention: system.heating_capacity_retention.unwrap_or(default_retention),
            lockout_temperature: system.compressor_lockout_temperature,
            heating_data: sorted_by_temperature(&system.heating_performance_data),
            cooling_data: sorted_by_temperature(&system.cooling_performance_data),
        }
    }

    /// Heat pump heating capacity at an outdoor temperature, as a fraction of
    /// its capacity at 47°F
    pub fn heating_fraction_at(&self, outdoor_temperature: f64) -> f64 {
        if !self.system_type.is_heat_pump() {
            return 1.;
        }
        if self
            .lockout_temperature
            .is_some_and(|lockout| outdoor_temperature < lockout)
        {
            return 0.;
        }
        if self.system_type == HvacSystemType::GroundToAirHeatPump {
            return 1.;
        }
        if !self.heating_data.is_empty() {
            return interpolate(&self.heating_data, outdoor_temperature).max(0.);
        }

        let CapacityRetention {
            fraction,
            temperature,
        } = self.retention;
        let span = HEATING_RATING_TEMPERATURE - temperature;
        if span <= 0. {
            return fraction;
        }
        (1. - (1. - fraction) * (HEATING_RATING_TEMPERATURE - outdoor_temperature) / span).max(0.)
    }

    /// Cooling capacity at an outdoor temperature, as a fraction of rated capacity
    pub fn cooling_fraction_at(&self, outdoor_temperature: f64) -> f64 {
        if !self.cooling_data.is_empty() {
            return interpolate(&self.cooling_data, outdoor_temperature).max(0.);
        }
        if self.system_type.is_air_cooled() {
            1. - COOLING_CAPACITY_LOSS_PER_DEGREE
                * (outdoor_temperature - COOLING_RATING_TEMPERATURE).max(0.)
        } else {
            1.
        }
    }

    pub fn heating_data(&self) -> &[PerformanceDataPoint] {
        &self.heating_data
    }

    pub fn cooling_data(&self) -> &[PerformanceDataPoint] {
        &self.cooling_data
    }
}

fn sorted_by_temperature(data: &[PerformanceDataPoint]) -> Vec<PerformanceDataPoint> {
    data.iter()
        .copied()
        .sorted_by_key(|point| OrderedFloat(point.outdoor_temperature))
        .collect()
}

fn interpolate(data: &[PerformanceDataPoint], outdoor_temperature: f64) -> f64 {
    let temperatures = data
        .iter()
        .map(|point| point.outdoor_temperature)
        .collect::<Vec<_>>();
    let fractions = data
        .iter()
        .map(|point| point.capacity_fraction_of_nominal)
        .collect::<Vec<_>>();
    np_interp(outdoor_temperature, &temperatures, &fractions)
}
