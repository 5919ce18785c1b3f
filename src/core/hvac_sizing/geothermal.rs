use crate::core::design_conditions::DesignConditions;
use crate::core::hvac_sizing::equipment::SystemSizing;
use crate::core::hvac_sizing::g_functions::{g_function, GFunction, GFunctionError};
use crate::core::units::{
    btu_per_hour_to_tons, feet_to_metres, inches_to_metres, BTU_PER_HOUR_PER_TON, HOURS_PER_YEAR,
};
use crate::input::{BoreConfiguration, GeothermalLoopInput, HvacSystemInput, UTubeSpacingType};
use anyhow::bail;
use serde::Serialize;
use std::f64::consts::PI;
use tracing::{debug, warn};

pub const MIN_BORE_DEPTH: f64 = 79.;
pub const MAX_BORE_DEPTH: f64 = 500.;
pub const MIN_BORE_HOLES: u32 = 1;
pub const MAX_BORE_HOLES: u32 = 10;
const MAX_LAYOUT_ITERATIONS: usize = 50;

/// in gpm per ton of cooling capacity
const LOOP_FLOW_PER_TON: f64 = 3.;
const PIPE_SDR: f64 = 11.;
/// Loop temperature change across the heat pump, in °F
const LOOP_TEMPERATURE_DIFFERENCE: f64 = 10.;
const DEFAULT_HEATING_COP: f64 = 3.6;
const DEFAULT_COOLING_COP: f64 = 5.3;
/// Indoor balance temperatures used for run-time fractions, in °F
const HEATING_BALANCE_TEMPERATURE: f64 = 71.;
const COOLING_BALANCE_TEMPERATURE: f64 = 76.;
const MIN_RUN_TIME_FRACTION: f64 = 0.25;

impl UTubeSpacingType {
    /// Shape factor coefficients of the grout resistance correlation
    fn grout_shape_factor_coefficients(&self) -> (f64, f64) {
        match self {
            UTubeSpacingType::B => (17.4427, -0.6052),
            UTubeSpacingType::C => (21.9059, -0.3796),
            UTubeSpacingType::As => (20.1004, -0.94467),
        }
    }
}

/// Required bore length per ton of capacity, in ft/ton
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoreLengthPerTon {
    pub heating: f64,
    pub cooling: f64,
    /// Design entering water temperatures, in °F
    pub heating_entering_water_temperature: f64,
    pub cooling_entering_water_temperature: f64,
}

/// Sized ground heat exchanger
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeothermalLoopSizing {
    pub bore_configuration: BoreConfiguration,
    pub num_bore_holes: u32,
    /// in ft
    pub bore_depth: f64,
    /// in ft
    pub bore_spacing: f64,
    /// in ft
    pub total_bore_length: f64,
    /// in gpm
    pub loop_flow: f64,
    pub length_per_ton: BoreLengthPerTon,
    pub g_function: GFunction,
    /// Steady state time scale ts = H²/(9α) of the bore field, in hours
    pub time_scale: f64,
    #[serde(skip)]
    pub warnings: Vec<String>,
}

impl GeothermalLoopSizing {
    /// (time in years, g) at each tabulated ln(t/ts)
    pub fn g_function_in_years(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.g_function
            .pairs()
            .map(|(ln_t_ts, g)| (self.time_scale * ln_t_ts.exp() / HOURS_PER_YEAR, g))
    }
}

pub struct GeothermalLoopSizer<'a> {
    input: &'a GeothermalLoopInput,
    conditions: &'a DesignConditions,
}

impl<'a> GeothermalLoopSizer<'a> {
    pub fn new(input: &'a GeothermalLoopInput, conditions: &'a DesignConditions) -> Self {
        Self { input, conditions }
    }

    fn ground_conductivity(&self) -> f64 {
        self.input
            .ground_conductivity
            .unwrap_or(self.conditions.ground_conductivity())
    }

    /// Bore length needed per ton of heat pump capacity, from the thermal
    /// resistances of ground, grout and pipe
    pub fn length_per_ton(&self, system: &HvacSystemInput) -> anyhow::Result<BoreLengthPerTon> {
        let input = self.input;
        let ground_temperature = self.conditions.deep_ground_temperature();
        let heating_design = self.conditions.heating_design_drybulb();
        let cooling_design = self.conditions.cooling_design_drybulb();

        let ground_resistance =
            (input.bore_spacing / input.bore_diameter * 12.).ln() / (2. * PI * self.ground_conductivity());
        let (beta_0, beta_1) = input.u_tube_spacing_type.grout_shape_factor_coefficients();
        let grout_resistance =
            1. / (input.grout_conductivity * beta_0 * (input.bore_diameter / input.pipe_diameter).powf(beta_1));
        let pipe_inner_diameter = input.pipe_diameter * (1. - 2. / PIPE_SDR);
        let pipe_resistance =
            (input.pipe_diameter / pipe_inner_diameter).ln() / (2. * PI * input.pipe_conductivity);
        let bore_resistance = grout_resistance + pipe_resistance / 2.;

        let heating_run_time = ((HEATING_BALANCE_TEMPERATURE - self.conditions.january_average_drybulb())
            / (HEATING_BALANCE_TEMPERATURE - heating_design))
            .max(MIN_RUN_TIME_FRACTION);
        let cooling_run_time = ((self.conditions.july_average_drybulb() - COOLING_BALANCE_TEMPERATURE)
            / (cooling_design - COOLING_BALANCE_TEMPERATURE))
            .max(MIN_RUN_TIME_FRACTION);

        let cooling_entering_water_temperature = (ground_temperature + 20.).max(85.);
        let heating_entering_water_temperature = (heating_design + 20.).max(32.).min(ground_temperature - 10.);

        let heating_difference =
            ground_temperature - (2. * heating_entering_water_temperature - LOOP_TEMPERATURE_DIFFERENCE) / 2.;
        let cooling_difference =
            (2. * cooling_entering_water_temperature + LOOP_TEMPERATURE_DIFFERENCE) / 2. - ground_temperature;
        if heating_difference <= 0. || cooling_difference <= 0. {
            bail!(
                "Ground temperature of {ground_temperature}°F gives no usable temperature difference for the geothermal loop"
            );
        }

        let heating_cop = system.heating_cop.unwrap_or(DEFAULT_HEATING_COP);
        let cooling_cop = system.cooling_cop.unwrap_or(DEFAULT_COOLING_COP);

        Ok(BoreLengthPerTon {
            heating: (1. - 1. / heating_cop) * (bore_resistance + ground_resistance * heating_run_time)
                / heating_difference
                * BTU_PER_HOUR_PER_TON,
            cooling: (1. + 1. / cooling_cop) * (bore_resistance + ground_resistance * cooling_run_time)
                / cooling_difference
                * BTU_PER_HOUR_PER_TON,
            heating_entering_water_temperature,
            cooling_entering_water_temperature,
        })
    }

    /// Size the bore field for a ground source heat pump
    ///
    /// Arguments:
    /// * `system` - the heat pump served by the loop
    /// * `sizing` - the heat pump's sized capacities
    pub fn size(&self, system: &HvacSystemInput, sizing: &SystemSizing) -> anyhow::Result<GeothermalLoopSizing> {
        let mut warnings = vec![];
        let length_per_ton = self.length_per_ton(system)?;
        let cooling_tons = btu_per_hour_to_tons(sizing.cooling_capacity());
        let total_length = (length_per_ton.heating * btu_per_hour_to_tons(sizing.heating_capacity()))
            .max(length_per_ton.cooling * cooling_tons);

        let (num_bore_holes, bore_depth) = match (self.input.num_bore_holes, self.input.bore_depth) {
            (Some(count), Some(depth)) => (count, depth),
            (Some(count), None) => {
                let depth = (total_length / count as f64).floor();
                (count, clamp_depth(depth, &mut warnings))
            }
            (None, Some(depth)) => {
                let count = (total_length / depth).ceil().max(1.) as u32;
                (clamp_count(count, &mut warnings), depth)
            }
            (None, None) => {
                let (count, depth) = default_layout(total_length, cooling_tons);
                (count, clamp_depth(depth, &mut warnings))
            }
        };

        let configured = self.input.bore_configuration;
        let (bore_configuration, g_function) =
            match self.g_function(configured, num_bore_holes, bore_depth) {
                Ok(g_function) => (configured, g_function),
                Err(GFunctionError::UnsupportedCount { configuration, count }) => {
                    let message = format!(
                        "No {configuration} bore field has {count} bore holes; using a rectangle instead"
                    );
                    warn!("{message}");
                    warnings.push(message);
                    (
                        BoreConfiguration::Rectangle,
                        self.g_function(BoreConfiguration::Rectangle, num_bore_holes, bore_depth)?,
                    )
                }
                Err(error) => return Err(error.into()),
            };

        let sizing = GeothermalLoopSizing {
            bore_configuration,
            num_bore_holes,
            bore_depth,
            bore_spacing: self.input.bore_spacing,
            total_bore_length: num_bore_holes as f64 * bore_depth,
            loop_flow: LOOP_FLOW_PER_TON * cooling_tons.max(1.),
            length_per_ton,
            g_function,
            time_scale: bore_depth.powi(2) / (9. * self.input.ground_diffusivity),
            warnings,
        };
        debug!(
            num_bore_holes = sizing.num_bore_holes,
            bore_depth = sizing.bore_depth,
            required_length = total_length,
            "Sized geothermal loop"
        );
        Ok(sizing)
    }

    fn g_function(
        &self,
        configuration: BoreConfiguration,
        count: u32,
        depth: f64,
    ) -> Result<GFunction, GFunctionError> {
        g_function(
            configuration,
            count,
            feet_to_metres(self.input.bore_spacing),
            feet_to_metres(depth),
            inches_to_metres(self.input.bore_diameter) / 2.,
        )
    }
}

/// Bore count and depth for a total length, starting from one bore per ton
/// and moving the count until the depth is in range
fn default_layout(total_length: f64, cooling_tons: f64) -> (u32, f64) {
    let mut count = ((cooling_tons + 0.5).floor() as u32).clamp(MIN_BORE_HOLES, MAX_BORE_HOLES);
    let mut depth = (total_length / count as f64).floor();
    for _ in 0..MAX_LAYOUT_ITERATIONS {
        if depth < MIN_BORE_DEPTH && count > MIN_BORE_HOLES {
            count -= 1;
        } else if depth > MAX_BORE_DEPTH && count < MAX_BORE_HOLES {
            count += 1;
        } else {
            break;
        }
        depth = (total_length / count as f64).floor();
    }
    (count, depth)
}

fn clamp_depth(depth: f64, warnings: &mut Vec<String>) -> f64 {
    let clamped = depth.clamp(MIN_BORE_DEPTH, MAX_BORE_DEPTH);
    if clamped != depth {
        let message = format!("Bore depth of {depth} ft is outside {MIN_BORE_DEPTH}-{MAX_BORE_DEPTH} ft; using {clamped} ft");
        warn!("{message}");
        warnings.push(message);
    }
    clamped
}

fn clamp_count(count: u32, warnings: &mut Vec<String>) -> u32 {
    let clamped = count.clamp(MIN_BORE_HOLES, MAX_BORE_HOLES);
    if clamped != count {
        let message = format!("{count} bore holes is outside {MIN_BORE_HOLES}-{MAX_BORE_HOLES}; using {clamped}");
        warn!("{message}");
        warnings.push(message);
    }
    clamped
}
