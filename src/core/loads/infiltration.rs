use crate::core::design_conditions::DesignConditions;
use crate::core::loads::DesignLoad;
use crate::core::units::{LATENT_AIR_FACTOR, MINUTES_PER_HOUR, SENSIBLE_AIR_FACTOR};
use crate::input::{InfiltrationInput, MechanicalVentilationFan, VentilationFanType};
use anyhow::bail;
use tracing::debug;

/// Effective leakage area (in²) per cfm of leakage at 50 Pa
const ELA_PER_CFM50: f64 = 0.055;

// LBL stack coefficients, in (cfm/in²)²/°F, by number of stories
const STACK_COEFFICIENTS: [f64; 3] = [0.0150, 0.0299, 0.0449];
// LBL wind coefficients, in (cfm/in²)²/mph², by shielding class then number of stories
const WIND_COEFFICIENTS: [[f64; 3]; 5] = [
    [0.0119, 0.0157, 0.0184],
    [0.0092, 0.0121, 0.0143],
    [0.0065, 0.0086, 0.0101],
    [0.0039, 0.0051, 0.0060],
    [0.0012, 0.0016, 0.0018],
];

/// The LBL (Sherman-Grimsrud) infiltration model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InfiltrationModel {
    effective_leakage_area: f64,
    stack_coefficient: f64,
    wind_coefficient: f64,
}

impl InfiltrationModel {
    pub fn from_input(input: &InfiltrationInput, conditioned_volume: f64) -> anyhow::Result<Self> {
        let cfm50 = match (input.cfm50, input.ach50) {
            (Some(cfm50), None) => cfm50,
            (None, Some(ach50)) => ach50 * conditioned_volume / MINUTES_PER_HOUR as f64,
            _ => bail!("Infiltration must specify exactly one of ach50 or cfm50"),
        };
        if !(1..=5).contains(&input.shielding_class) {
            bail!(
                "Shielding class must be between 1 and 5, got {}",
                input.shielding_class
            );
        }
        let story_index = (input.number_of_stories.clamp(1, 3) - 1) as usize;

        Ok(Self {
            effective_leakage_area: ELA_PER_CFM50 * cfm50,
            stack_coefficient: STACK_COEFFICIENTS[story_index],
            wind_coefficient: WIND_COEFFICIENTS[(input.shielding_class - 1) as usize][story_index],
        })
    }

    pub fn effective_leakage_area(&self) -> f64 {
        self.effective_leakage_area
    }

    /// Infiltration airflow, in cfm
    ///
    /// Arguments:
    /// * `temperature_difference` - indoor/outdoor temperature difference, in °F
    /// * `wind_speed` - in mph
    pub fn airflow(&self, temperature_difference: f64, wind_speed: f64) -> f64 {
        self.effective_leakage_area
            * (self.stack_coefficient * temperature_difference.abs()
                + self.wind_coefficient * wind_speed.powi(2))
            .sqrt()
    }
}

/// Daily average mechanical ventilation flows, in cfm
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VentilationFlows {
    pub supply: f64,
    pub exhaust: f64,
    /// Balanced flow remaining after sensible recovery
    pub balanced_sensible: f64,
    /// Balanced flow remaining after latent recovery
    pub balanced_latent: f64,
}

impl VentilationFlows {
    pub fn from_fans(fans: &[MechanicalVentilationFan]) -> Self {
        fans.iter().fold(Self::default(), |mut flows, fan| {
            let average_flow = fan.flow_rate * fan.hours_in_operation / 24.;
            match fan.fan_type {
                VentilationFanType::Supply | VentilationFanType::CentralFanIntegratedSupply => {
                    flows.supply += average_flow
                }
                VentilationFanType::Exhaust => flows.exhaust += average_flow,
                VentilationFanType::Balanced => {
                    flows.balanced_sensible += average_flow;
                    flows.balanced_latent += average_flow;
                }
                VentilationFanType::HeatRecoveryVentilator => {
                    let sensible_recovery = fan.sensible_recovery_efficiency.unwrap_or(0.);
                    flows.balanced_sensible += average_flow * (1. - sensible_recovery);
                    flows.balanced_latent += average_flow;
                }
                VentilationFanType::EnergyRecoveryVentilator => {
                    let sensible_recovery = fan.sensible_recovery_efficiency.unwrap_or(0.);
                    let total_recovery = fan.total_recovery_efficiency.unwrap_or(0.);
                    flows.balanced_sensible += average_flow * (1. - sensible_recovery);
                    flows.balanced_latent += average_flow * (1. - total_recovery);
                }
            }
            flows
        })
    }

    pub fn unbalanced(&self) -> f64 {
        (self.supply - self.exhaust).abs()
    }
}

/// Whole building infiltration and ventilation design loads
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AirExchangeLoads {
    pub infiltration: DesignLoad,
    pub ventilation: DesignLoad,
    pub heating_infiltration_airflow: f64,
    pub cooling_infiltration_airflow: f64,
}

/// Calculate infiltration and ventilation loads. Unbalanced ventilation is
/// combined with infiltration in quadrature; the increase over infiltration
/// alone and any balanced flow are reported as ventilation.
pub fn air_exchange_loads(
    model: &InfiltrationModel,
    ventilation: &VentilationFlows,
    conditions: &DesignConditions,
) -> AirExchangeLoads {
    let acf = conditions.altitude_correction_factor();
    let sensible_factor = SENSIBLE_AIR_FACTOR * acf;
    let latent_factor = LATENT_AIR_FACTOR * acf;
    let grains = conditions.cooling_grains_difference();

    let heating_infiltration =
        model.airflow(conditions.htd(), conditions.heating_design_wind_speed());
    let cooling_infiltration =
        model.airflow(conditions.ctd(), conditions.cooling_design_wind_speed());

    let combined = |infiltration: f64| infiltration.hypot(ventilation.unbalanced()) - infiltration;
    let heating_unbalanced = combined(heating_infiltration);
    let cooling_unbalanced = combined(cooling_infiltration);

    debug!(
        heating_infiltration,
        cooling_infiltration,
        heating_unbalanced,
        cooling_unbalanced,
        "Calculated air exchange flows"
    );

    AirExchangeLoads {
        infiltration: DesignLoad::new(
            sensible_factor * heating_infiltration * conditions.htd(),
            sensible_factor * cooling_infiltration * conditions.ctd(),
            latent_factor * cooling_infiltration * grains,
        ),
        ventilation: DesignLoad::new(
            sensible_factor * (heating_unbalanced + ventilation.balanced_sensible) * conditions.htd(),
            sensible_factor * (cooling_unbalanced + ventilation.balanced_sensible) * conditions.ctd(),
            latent_factor * (cooling_unbalanced + ventilation.balanced_latent) * grains,
        ),
        heating_infiltration_airflow: heating_infiltration,
        cooling_infiltration_airflow: cooling_infiltration,
    }
}
