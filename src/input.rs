use anyhow::{anyhow, bail};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::io::{BufReader, Read};
use strum::{Display, EnumIter};

pub fn ingest_for_processing(json: impl Read) -> Result<InputForProcessing, anyhow::Error> {
    InputForProcessing::init_with_json(json)
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Input {
    pub design_conditions: DesignConditionsInput,
    pub zones: IndexMap<String, ZoneInput>,
    pub infiltration: InfiltrationInput,
    #[serde(default)]
    pub mechanical_ventilation: Vec<MechanicalVentilationFan>,
    /// Air distribution systems, keyed by the name of the zone they serve
    #[serde(default)]
    pub air_distribution: IndexMap<String, AirDistributionInput>,
    #[serde(default)]
    pub hvac_systems: Vec<HvacSystemInput>,
    pub geothermal_loop: Option<GeothermalLoopInput>,
    #[serde(default)]
    pub attic: AtticInput,
    #[serde(default)]
    pub sizing_controls: SizingControls,
}

impl Input {
    pub fn spaces(&self) -> impl Iterator<Item = (&str, &str, &SpaceInput)> {
        self.zones.iter().flat_map(|(zone_name, zone)| {
            zone.spaces
                .iter()
                .map(move |(space_name, space)| (zone_name.as_str(), space_name.as_str(), space))
        })
    }

    pub fn total_floor_area(&self) -> f64 {
        self.spaces().map(|(_, _, space)| space.floor_area).sum()
    }

    pub fn conditioned_volume(&self) -> f64 {
        self.infiltration.conditioned_volume.unwrap_or_else(|| {
            self.spaces()
                .map(|(_, _, space)| space.floor_area * space.ceiling_height)
                .sum()
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct DesignConditionsInput {
    /// 99% heating design dry bulb, in °F
    pub heating_design_drybulb: f64,
    /// 1% cooling design dry bulb, in °F
    pub cooling_design_drybulb: f64,
    /// Mean coincident wet bulb at the cooling design dry bulb, in °F
    pub cooling_design_wetbulb: f64,
    /// Mean daily temperature range in the warmest month, in °F
    #[validate(minimum = 0.)]
    pub daily_temperature_range: f64,
    /// Site elevation, in ft
    #[serde(default)]
    #[validate(minimum = -1500.)]
    #[validate(maximum = 15000.)]
    pub elevation: f64,
    /// Site latitude, in degrees north
    #[validate(minimum = -90.)]
    #[validate(maximum = 90.)]
    pub latitude: f64,
    #[serde(default = "default_heating_setpoint")]
    pub heating_setpoint: f64,
    #[serde(default = "default_cooling_setpoint")]
    pub cooling_setpoint: f64,
    #[serde(default = "default_indoor_relative_humidity")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub indoor_relative_humidity: f64,
    /// Annual average deep ground temperature, in °F
    pub deep_ground_temperature: f64,
    /// Soil thermal conductivity, in Btu/(hr·ft·°F)
    #[serde(default = "default_ground_conductivity")]
    #[validate(exclusive_minimum = 0.)]
    pub ground_conductivity: f64,
    pub january_average_drybulb: f64,
    pub july_average_drybulb: f64,
    /// in mph
    #[serde(default = "default_heating_design_wind_speed")]
    #[validate(minimum = 0.)]
    pub heating_design_wind_speed: f64,
    /// in mph
    #[serde(default = "default_cooling_design_wind_speed")]
    #[validate(minimum = 0.)]
    pub cooling_design_wind_speed: f64,
}

fn default_heating_setpoint() -> f64 {
    70.
}

fn default_cooling_setpoint() -> f64 {
    75.
}

fn default_indoor_relative_humidity() -> f64 {
    0.5
}

fn default_heating_design_wind_speed() -> f64 {
    15.
}

fn default_cooling_design_wind_speed() -> f64 {
    7.5
}

/// Where a surface, duct or piece of equipment sits relative to the thermal envelope.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum Location {
    ConditionedSpace,
    Outside,
    Ground,
    VentedAttic,
    UnventedAttic,
    Garage,
    VentedCrawlspace,
    UnventedCrawlspace,
    UnconditionedBasement,
    OtherHousingUnit,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ZoneInput {
    pub spaces: IndexMap<String, SpaceInput>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct SpaceInput {
    /// in ft²
    #[validate(exclusive_minimum = 0.)]
    pub floor_area: f64,
    /// in ft
    #[serde(default = "default_ceiling_height")]
    #[validate(exclusive_minimum = 0.)]
    pub ceiling_height: f64,
    #[validate(minimum = 0.)]
    pub number_of_occupants: Option<f64>,
    /// Overrides the default sensible internal gains of the space, in Btu/h
    pub internal_gains_sensible: Option<f64>,
    /// Overrides the default latent internal gains of the space, in Btu/h
    pub internal_gains_latent: Option<f64>,
    #[serde(default)]
    pub walls: Vec<WallInput>,
    #[serde(default)]
    pub roofs: Vec<RoofInput>,
    #[serde(default)]
    pub ceilings: Vec<CeilingInput>,
    #[serde(default)]
    pub floors: Vec<FloorInput>,
    #[serde(default)]
    pub slabs: Vec<SlabInput>,
    #[serde(default)]
    pub foundation_walls: Vec<FoundationWallInput>,
    #[serde(default)]
    pub windows: Vec<WindowInput>,
    #[serde(default)]
    pub skylights: Vec<SkylightInput>,
    #[serde(default)]
    pub doors: Vec<DoorInput>,
}

fn default_ceiling_height() -> f64 {
    8.
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct WallInput {
    #[validate(minimum = 0.)]
    pub area: f64,
    /// Air-to-air R-value including films, in hr·ft²·°F/Btu
    #[validate(exclusive_minimum = 0.)]
    pub assembly_r_value: f64,
    pub adjacent_to: Location,
    /// Direction the surface faces, in degrees clockwise from north
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 360.)]
    pub azimuth: f64,
    #[serde(default = "default_wall_solar_absorptance")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub solar_absorptance: f64,
}

fn default_wall_solar_absorptance() -> f64 {
    0.7
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct RoofInput {
    #[validate(minimum = 0.)]
    pub area: f64,
    #[validate(exclusive_minimum = 0.)]
    pub assembly_r_value: f64,
    /// Rise over a 12 unit run
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub pitch: f64,
    #[serde(default = "default_south")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 360.)]
    pub azimuth: f64,
    #[serde(default = "default_roof_solar_absorptance")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub solar_absorptance: f64,
}

fn default_south() -> f64 {
    180.
}

fn default_roof_solar_absorptance() -> f64 {
    0.85
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct CeilingInput {
    #[validate(minimum = 0.)]
    pub area: f64,
    #[validate(exclusive_minimum = 0.)]
    pub assembly_r_value: f64,
    pub adjacent_to: Location,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct FloorInput {
    #[validate(minimum = 0.)]
    pub area: f64,
    #[validate(exclusive_minimum = 0.)]
    pub assembly_r_value: f64,
    pub adjacent_to: Location,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct SlabInput {
    /// in ft²
    #[validate(minimum = 0.)]
    pub area: f64,
    /// in ft
    #[validate(minimum = 0.)]
    pub exposed_perimeter: f64,
    /// Slab thickness, in inches
    #[serde(default = "default_slab_thickness")]
    #[validate(minimum = 0.)]
    pub thickness: f64,
    /// Depth of the slab below grade, in ft. Non-zero for basement floors.
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub depth_below_grade: f64,
    /// Width of the shortest side of a basement floor, in ft
    #[validate(exclusive_minimum = 0.)]
    pub width: Option<f64>,
    /// in ft
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub perimeter_insulation_depth: f64,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub perimeter_insulation_r_value: f64,
    /// in ft
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub under_slab_insulation_width: f64,
    #[serde(default)]
    pub under_slab_insulation_spans_entire_slab: bool,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub under_slab_insulation_r_value: f64,
}

fn default_slab_thickness() -> f64 {
    4.
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, EnumIter, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum FoundationWallType {
    #[default]
    SolidConcrete,
    ConcreteBlock,
    ConcreteBlockFoamCore,
    ConcreteBlockPerliteCore,
    ConcreteBlockVermiculiteCore,
    ConcreteBlockSolidCore,
    DoubleBrick,
    Wood,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct FoundationWallInsulation {
    #[validate(minimum = 0.)]
    pub r_value: f64,
    /// Distance from the top of the wall to the top of the insulation, in ft
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub distance_to_top: f64,
    /// Distance from the top of the wall to the bottom of the insulation, in ft
    #[validate(minimum = 0.)]
    pub distance_to_bottom: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct FoundationWallInput {
    /// Horizontal length of the wall, in ft
    #[validate(exclusive_minimum = 0.)]
    pub length: f64,
    /// in ft
    #[validate(exclusive_minimum = 0.)]
    pub height: f64,
    /// in ft
    #[validate(minimum = 0.)]
    pub depth_below_grade: f64,
    #[serde(default)]
    pub wall_type: FoundationWallType,
    /// in inches
    #[serde(default = "default_foundation_wall_thickness")]
    #[validate(exclusive_minimum = 0.)]
    pub thickness: f64,
    /// Air-to-air R-value of the whole assembly; when given, layered insulation is not allowed
    #[validate(exclusive_minimum = 0.)]
    pub insulation_assembly_r_value: Option<f64>,
    pub interior_insulation: Option<FoundationWallInsulation>,
    pub exterior_insulation: Option<FoundationWallInsulation>,
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 360.)]
    pub azimuth: f64,
}

fn default_foundation_wall_thickness() -> f64 {
    8.
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct WindowInput {
    #[validate(minimum = 0.)]
    pub area: f64,
    #[validate(exclusive_minimum = 0.)]
    pub u_factor: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub shgc: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 360.)]
    pub azimuth: f64,
    /// Summer interior shading multiplier on solar gains (blinds, curtains)
    #[serde(default = "default_interior_shading_factor")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub interior_shading_factor: f64,
    /// Summer exterior shading multiplier on beam solar gains (overhangs, neighbours)
    #[serde(default = "default_unshaded")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub exterior_shading_factor: f64,
}

fn default_interior_shading_factor() -> f64 {
    0.7
}

fn default_unshaded() -> f64 {
    1.
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct SkylightInput {
    #[validate(minimum = 0.)]
    pub area: f64,
    #[validate(exclusive_minimum = 0.)]
    pub u_factor: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub shgc: f64,
    /// Pitch of the roof the skylight sits in, rise over a 12 unit run
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub pitch: f64,
    #[serde(default = "default_south")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 360.)]
    pub azimuth: f64,
    #[serde(default = "default_unshaded")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub interior_shading_factor: f64,
    #[serde(default = "default_unshaded")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub exterior_shading_factor: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct DoorInput {
    #[validate(minimum = 0.)]
    pub area: f64,
    #[validate(exclusive_minimum = 0.)]
    pub r_value: f64,
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 360.)]
    pub azimuth: f64,
    pub adjacent_to: Location,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct InfiltrationInput {
    /// Air changes per hour at 50 Pa
    #[validate(exclusive_minimum = 0.)]
    pub ach50: Option<f64>,
    /// Air leakage at 50 Pa, in cfm
    #[validate(exclusive_minimum = 0.)]
    pub cfm50: Option<f64>,
    /// ASHRAE shielding class, 1 (no obstructions) to 5 (very heavy shielding)
    #[serde(default = "default_shielding_class")]
    #[validate(minimum = 1)]
    #[validate(maximum = 5)]
    pub shielding_class: u8,
    /// Number of conditioned stories above grade
    #[serde(default = "default_number_of_stories")]
    #[validate(minimum = 1)]
    pub number_of_stories: u32,
    /// Defaults to the sum of space floor area multiplied by ceiling height, in ft³
    #[validate(exclusive_minimum = 0.)]
    pub conditioned_volume: Option<f64>,
}

fn default_shielding_class() -> u8 {
    3
}

fn default_number_of_stories() -> u32 {
    1
}

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum VentilationFanType {
    Supply,
    Exhaust,
    Balanced,
    HeatRecoveryVentilator,
    EnergyRecoveryVentilator,
    CentralFanIntegratedSupply,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct MechanicalVentilationFan {
    pub fan_type: VentilationFanType,
    /// in cfm
    #[validate(minimum = 0.)]
    pub flow_rate: f64,
    #[serde(default = "default_hours_in_operation")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 24.)]
    pub hours_in_operation: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub sensible_recovery_efficiency: Option<f64>,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub total_recovery_efficiency: Option<f64>,
}

fn default_hours_in_operation() -> f64 {
    24.
}

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum DuctType {
    Supply,
    Return,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct DuctInput {
    pub duct_type: DuctType,
    pub location: Location,
    /// in ft²
    #[validate(minimum = 0.)]
    pub area: f64,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub insulation_r_value: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct AirDistributionInput {
    #[serde(default)]
    pub ducts: Vec<DuctInput>,
    /// Fraction of system airflow leaking from supply ducts
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub supply_leakage_fraction: f64,
    /// Fraction of system airflow drawn into return ducts from outside the envelope
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub return_leakage_fraction: f64,
    #[serde(default = "default_blower_fan_watts_per_cfm")]
    #[validate(minimum = 0.)]
    pub blower_fan_watts_per_cfm: f64,
}

fn default_blower_fan_watts_per_cfm() -> f64 {
    0.5
}

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum HvacSystemType {
    Furnace,
    Boiler,
    ElectricResistance,
    Stove,
    CentralAirConditioner,
    RoomAirConditioner,
    EvaporativeCooler,
    AirToAirHeatPump,
    MiniSplitHeatPump,
    GroundToAirHeatPump,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct CapacityRetention {
    /// Heating capacity at `temperature` as a fraction of capacity at 47°F
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub fraction: f64,
    /// in °F, below 47°F
    #[validate(maximum = 47.)]
    pub temperature: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct PerformanceDataPoint {
    /// in °F
    pub outdoor_temperature: f64,
    #[validate(minimum = 0.)]
    pub capacity_fraction_of_nominal: f64,
    #[validate(exclusive_minimum = 0.)]
    pub cop: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct BackupHeatInput {
    /// Fixed backup capacity, in Btu/h
    #[validate(minimum = 0.)]
    pub capacity: Option<f64>,
    #[validate(exclusive_minimum = 0.)]
    pub autosizing_factor: Option<f64>,
    #[validate(minimum = 0.)]
    pub autosizing_limit: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct HvacSystemInput {
    pub name: String,
    /// Name of the zone served
    pub zone: String,
    pub system_type: HvacSystemType,
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub fraction_heat_load_served: f64,
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub fraction_cool_load_served: f64,
    /// Fixed heating capacity, in Btu/h; autosized when absent
    #[validate(minimum = 0.)]
    pub heating_capacity: Option<f64>,
    /// Fixed cooling capacity, in Btu/h; autosized when absent
    #[validate(minimum = 0.)]
    pub cooling_capacity: Option<f64>,
    #[validate(exclusive_minimum = 0.)]
    pub heating_autosizing_factor: Option<f64>,
    #[validate(exclusive_minimum = 0.)]
    pub cooling_autosizing_factor: Option<f64>,
    /// in Btu/h
    #[validate(minimum = 0.)]
    pub heating_autosizing_limit: Option<f64>,
    /// in Btu/h
    #[validate(minimum = 0.)]
    pub cooling_autosizing_limit: Option<f64>,
    pub backup: Option<BackupHeatInput>,
    pub heating_capacity_retention: Option<CapacityRetention>,
    /// in °F
    pub compressor_lockout_temperature: Option<f64>,
    #[serde(default)]
    pub heating_performance_data: Vec<PerformanceDataPoint>,
    #[serde(default)]
    pub cooling_performance_data: Vec<PerformanceDataPoint>,
    #[validate(exclusive_minimum = 0.)]
    #[validate(maximum = 1.)]
    pub cooling_shr: Option<f64>,
    /// Ratio of heating capacity at 47°F to rated cooling capacity
    #[validate(exclusive_minimum = 0.)]
    pub heating_to_cooling_capacity_ratio: Option<f64>,
    #[serde(default)]
    #[validate(minimum = -0.9)]
    #[validate(maximum = 9.)]
    pub airflow_defect_ratio: f64,
    #[serde(default)]
    #[validate(minimum = -0.9)]
    #[validate(maximum = 9.)]
    pub charge_defect_ratio: f64,
    #[validate(exclusive_minimum = 0.)]
    pub heating_cop: Option<f64>,
    #[validate(exclusive_minimum = 0.)]
    pub cooling_cop: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, EnumIter, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum BoreConfiguration {
    #[default]
    #[serde(rename = "rectangle")]
    Rectangle,
    #[serde(rename = "open rectangle")]
    OpenRectangle,
    C,
    L,
    U,
    #[serde(rename = "lopsided U")]
    LopsidedU,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum UTubeSpacingType {
    /// Legs touching each other at the centre of the bore
    #[default]
    B,
    /// Legs touching the bore wall
    C,
    /// Legs at an intermediate spacing
    As,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct GeothermalLoopInput {
    #[serde(default)]
    pub bore_configuration: BoreConfiguration,
    #[validate(minimum = 1)]
    #[validate(maximum = 10)]
    pub num_bore_holes: Option<u32>,
    /// in ft
    #[validate(exclusive_minimum = 0.)]
    pub bore_depth: Option<f64>,
    /// in ft
    #[serde(default = "default_bore_spacing")]
    #[validate(exclusive_minimum = 0.)]
    pub bore_spacing: f64,
    /// in inches
    #[serde(default = "default_bore_diameter")]
    #[validate(exclusive_minimum = 0.)]
    pub bore_diameter: f64,
    /// in Btu/(hr·ft·°F)
    #[serde(default = "default_grout_conductivity")]
    #[validate(exclusive_minimum = 0.)]
    pub grout_conductivity: f64,
    /// in Btu/(hr·ft·°F)
    #[serde(default = "default_pipe_conductivity")]
    #[validate(exclusive_minimum = 0.)]
    pub pipe_conductivity: f64,
    /// Outside diameter of the U-tube pipe, in inches
    #[serde(default = "default_pipe_diameter")]
    #[validate(exclusive_minimum = 0.)]
    pub pipe_diameter: f64,
    #[serde(default)]
    pub u_tube_spacing_type: UTubeSpacingType,
    /// Overrides the site soil conductivity for the loop, in Btu/(hr·ft·°F)
    #[validate(exclusive_minimum = 0.)]
    pub ground_conductivity: Option<f64>,
    /// in ft²/hr
    #[serde(default = "default_ground_diffusivity")]
    #[validate(exclusive_minimum = 0.)]
    pub ground_diffusivity: f64,
}

fn default_bore_spacing() -> f64 {
    16.4
}

fn default_bore_diameter() -> f64 {
    5.
}

fn default_grout_conductivity() -> f64 {
    0.75
}

fn default_pipe_conductivity() -> f64 {
    0.23
}

fn default_pipe_diameter() -> f64 {
    1.66
}

fn default_ground_conductivity() -> f64 {
    1.
}

fn default_ground_diffusivity() -> f64 {
    0.0208
}

impl Default for GeothermalLoopInput {
    fn default() -> Self {
        Self {
            bore_configuration: Default::default(),
            num_bore_holes: None,
            bore_depth: None,
            bore_spacing: default_bore_spacing(),
            bore_diameter: default_bore_diameter(),
            grout_conductivity: default_grout_conductivity(),
            pipe_conductivity: default_pipe_conductivity(),
            pipe_diameter: default_pipe_diameter(),
            u_tube_spacing_type: Default::default(),
            ground_conductivity: None,
            ground_diffusivity: default_ground_diffusivity(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct AtticInput {
    #[serde(default = "default_roof_solar_absorptance")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub roof_solar_absorptance: f64,
    #[serde(default)]
    pub radiant_barrier: bool,
}

impl Default for AtticInput {
    fn default() -> Self {
        Self {
            roof_solar_absorptance: default_roof_solar_absorptance(),
            radiant_barrier: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, EnumIter, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum HeatPumpSizingMethodology {
    #[serde(rename = "ACCA")]
    Acca,
    #[default]
    #[serde(rename = "HERS")]
    Hers,
    MaxLoad,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, EnumIter, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum HeatPumpBackupSizingMethodology {
    #[default]
    Emergency,
    Supplemental,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct SizingControls {
    #[serde(default)]
    pub heat_pump_sizing_methodology: HeatPumpSizingMethodology,
    #[serde(default)]
    pub heat_pump_backup_sizing_methodology: HeatPumpBackupSizingMethodology,
    #[serde(default)]
    pub allow_increased_fixed_capacities: bool,
}

/// A wrapper around the input that can be checked and adjusted before the
/// calculation is run.
#[derive(Clone, Debug)]
pub struct InputForProcessing {
    input: Input,
}

impl InputForProcessing {
    pub fn init_with_json(json: impl Read) -> anyhow::Result<Self> {
        let reader = BufReader::new(json);
        let input: Input = serde_json::from_reader(reader)?;

        Ok(Self { input })
    }

    pub fn init_with_input(input: Input) -> Self {
        Self { input }
    }

    pub fn sizing_controls(&self) -> &SizingControls {
        &self.input.sizing_controls
    }

    pub fn set_heat_pump_sizing_methodology(&mut self, methodology: HeatPumpSizingMethodology) {
        self.input.sizing_controls.heat_pump_sizing_methodology = methodology;
    }

    pub fn set_heat_pump_backup_sizing_methodology(
        &mut self,
        methodology: HeatPumpBackupSizingMethodology,
    ) {
        self.input.sizing_controls.heat_pump_backup_sizing_methodology = methodology;
    }

    pub fn set_allow_increased_fixed_capacities(&mut self, allow: bool) {
        self.input.sizing_controls.allow_increased_fixed_capacities = allow;
    }

    /// Check numeric ranges of every input object and the references between them.
    pub fn validate(&self) -> anyhow::Result<()> {
        let input = &self.input;

        validated("DesignConditions", &input.design_conditions)?;
        validated("Infiltration", &input.infiltration)?;
        validated("Attic", &input.attic)?;

        if input.infiltration.ach50.is_some() == input.infiltration.cfm50.is_some() {
            bail!("Infiltration must specify exactly one of ach50 or cfm50");
        }

        if input.zones.is_empty() {
            bail!("At least one zone must be provided");
        }
        if let Some(space_name) = input
            .spaces()
            .map(|(_, space_name, _)| space_name)
            .duplicates()
            .next()
        {
            bail!("Space name '{space_name}' is used in more than one zone");
        }

        for (zone_name, space_name, space) in input.spaces() {
            let context = format!("space '{space_name}' in zone '{zone_name}'");
            validated(&context, space)?;
            for wall in &space.walls {
                validated(&context, wall)?;
            }
            for roof in &space.roofs {
                validated(&context, roof)?;
            }
            for ceiling in &space.ceilings {
                validated(&context, ceiling)?;
            }
            for floor in &space.floors {
                validated(&context, floor)?;
            }
            for slab in &space.slabs {
                validated(&context, slab)?;
            }
            for window in &space.windows {
                validated(&context, window)?;
            }
            for skylight in &space.skylights {
                validated(&context, skylight)?;
            }
            for door in &space.doors {
                validated(&context, door)?;
            }
            for foundation_wall in &space.foundation_walls {
                validated(&context, foundation_wall)?;
                if foundation_wall.depth_below_grade > foundation_wall.height {
                    bail!("Foundation wall in {context} is deeper below grade than it is tall");
                }
                if foundation_wall.insulation_assembly_r_value.is_some()
                    && (foundation_wall.interior_insulation.is_some()
                        || foundation_wall.exterior_insulation.is_some())
                {
                    bail!("Foundation wall in {context} specifies both an assembly R-value and insulation layers");
                }
                for layer in [
                    foundation_wall.interior_insulation,
                    foundation_wall.exterior_insulation,
                ]
                .into_iter()
                .flatten()
                {
                    validated(&context, &layer)?;
                    if layer.distance_to_bottom < layer.distance_to_top {
                        bail!("Foundation wall insulation in {context} ends above where it starts");
                    }
                }
            }
        }

        for fan in &input.mechanical_ventilation {
            validated("MechanicalVentilation", fan)?;
        }

        for (zone_name, distribution) in &input.air_distribution {
            if !input.zones.contains_key(zone_name) {
                bail!("Air distribution references unknown zone '{zone_name}'");
            }
            validated(zone_name, distribution)?;
            for duct in &distribution.ducts {
                validated(zone_name, duct)?;
            }
        }

        if let Some(name) = input
            .hvac_systems
            .iter()
            .map(|system| system.name.as_str())
            .duplicates()
            .next()
        {
            bail!("More than one HVAC system is named '{name}'");
        }

        let mut heat_fractions: IndexMap<&str, f64> = Default::default();
        let mut cool_fractions: IndexMap<&str, f64> = Default::default();
        for system in &input.hvac_systems {
            validated(&system.name, system)?;
            if !input.zones.contains_key(&system.zone) {
                bail!(
                    "HVAC system '{}' references unknown zone '{}'",
                    system.name,
                    system.zone
                );
            }
            if let Some(backup) = &system.backup {
                validated(&system.name, backup)?;
            }
            if let Some(retention) = &system.heating_capacity_retention {
                validated(&system.name, retention)?;
            }
            for datum in system
                .heating_performance_data
                .iter()
                .chain(system.cooling_performance_data.iter())
            {
                validated(&system.name, datum)?;
            }
            *heat_fractions.entry(system.zone.as_str()).or_default() +=
                system.fraction_heat_load_served;
            *cool_fractions.entry(system.zone.as_str()).or_default() +=
                system.fraction_cool_load_served;
        }
        for (zone_name, fraction) in heat_fractions.iter().chain(cool_fractions.iter()) {
            if *fraction > 1.0 && !is_close!(*fraction, 1.0, rel_tol = 1e-6) {
                bail!("Fractions of load served by HVAC systems in zone '{zone_name}' sum to {fraction}, which exceeds 1");
            }
        }

        if let Some(geothermal_loop) = &input.geothermal_loop {
            validated("GeothermalLoop", geothermal_loop)?;
            if !input
                .hvac_systems
                .iter()
                .any(|system| system.system_type == HvacSystemType::GroundToAirHeatPump)
            {
                bail!("A geothermal loop was provided without a ground-to-air heat pump");
            }
        }

        Ok(())
    }

    pub fn finalize(self) -> Input {
        self.input
    }
}

fn validated(context: &str, value: &impl Validate) -> anyhow::Result<()> {
    value
        .validate()
        .map_err(|errors| anyhow!("Invalid input for {context}: {errors}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures::{furnace, single_zone_input, two_zone_input};
    use rstest::*;
    use std::fs::File;
    use walkdir::WalkDir;

    #[rstest]
    fn should_successfully_parse_and_validate_all_demo_files() {
        for entry in WalkDir::new("./demos/input")
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| {
                !e.file_type().is_dir() && e.file_name().to_str().unwrap().ends_with("json")
            })
        {
            let parsed = ingest_for_processing(File::open(entry.path()).unwrap());
            assert!(
                parsed.is_ok(),
                "error was {:?} when parsing file {}",
                parsed.as_ref().err().unwrap(),
                entry.file_name().to_str().unwrap()
            );
            let validated = parsed.unwrap().validate();
            assert!(
                validated.is_ok(),
                "error was {:?} when validating file {}",
                validated.err().unwrap(),
                entry.file_name().to_str().unwrap()
            );
        }
    }

    #[rstest]
    fn should_reject_unknown_fields(single_zone_input: Input) {
        let mut json = serde_json::to_value(&single_zone_input).unwrap();
        assert!(ingest_for_processing(json.to_string().as_bytes()).is_ok());
        json["Infiltration"]["leakiness"] = serde_json::json!(1.);
        assert!(ingest_for_processing(json.to_string().as_bytes()).is_err());
    }

    #[rstest]
    fn should_require_exactly_one_infiltration_measure(mut single_zone_input: Input) {
        single_zone_input.infiltration.cfm50 = Some(1000.);
        assert!(InputForProcessing::init_with_input(single_zone_input).validate().is_err());
    }

    #[rstest]
    fn should_reject_system_serving_unknown_zone(mut single_zone_input: Input, furnace: HvacSystemInput) {
        single_zone_input.hvac_systems = vec![HvacSystemInput {
            zone: "garage".to_string(),
            ..furnace
        }];
        let error = InputForProcessing::init_with_input(single_zone_input)
            .validate()
            .unwrap_err();
        assert!(error.to_string().contains("unknown zone 'garage'"));
    }

    #[rstest]
    fn should_reject_duplicate_system_names(mut two_zone_input: Input, furnace: HvacSystemInput) {
        two_zone_input.hvac_systems = vec![
            furnace.clone(),
            HvacSystemInput {
                zone: "upstairs".to_string(),
                ..furnace
            },
        ];
        let error = InputForProcessing::init_with_input(two_zone_input)
            .validate()
            .unwrap_err();
        assert!(error.to_string().contains("named 'furnace'"));
    }

    #[rstest]
    fn should_reject_space_name_repeated_across_zones(mut two_zone_input: Input) {
        let upstairs = &mut two_zone_input.zones["upstairs"];
        let bedrooms = upstairs.spaces.shift_remove("bedrooms").unwrap();
        upstairs.spaces.insert("living".to_string(), bedrooms);
        let error = InputForProcessing::init_with_input(two_zone_input)
            .validate()
            .unwrap_err();
        assert!(error.to_string().contains("Space name 'living'"));
    }

    #[rstest]
    fn should_accept_fractions_summing_to_one_within_tolerance(
        mut single_zone_input: Input,
        furnace: HvacSystemInput,
    ) {
        single_zone_input.hvac_systems = vec![
            HvacSystemInput {
                name: "first".to_string(),
                fraction_heat_load_served: 0.7,
                ..furnace.clone()
            },
            HvacSystemInput {
                name: "second".to_string(),
                fraction_heat_load_served: 0.3 + 1e-9,
                ..furnace
            },
        ];
        assert!(InputForProcessing::init_with_input(single_zone_input).validate().is_ok());
    }

    #[rstest]
    fn should_apply_sizing_overrides(single_zone_input: Input) {
        let mut input = InputForProcessing::init_with_input(single_zone_input);
        input.set_heat_pump_sizing_methodology(HeatPumpSizingMethodology::MaxLoad);
        input.set_allow_increased_fixed_capacities(true);
        assert_eq!(
            input.sizing_controls().heat_pump_sizing_methodology,
            HeatPumpSizingMethodology::MaxLoad
        );
        assert!(input.finalize().sizing_controls.allow_increased_fixed_capacities);
    }
}
