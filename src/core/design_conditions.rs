use crate::core::psychrometrics::{
    altitude_correction_factor, humidity_ratio_from_relative_humidity,
    humidity_ratio_from_wet_bulb, humidity_ratio_to_grains, pressure_at_elevation,
};
use crate::input::{AtticInput, DesignConditionsInput, Location};

/// Hours of the cooling design day (solar time, hour ending) over which hourly
/// cooling loads are evaluated.
pub const DESIGN_HOURS: [usize; 12] = [8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19];

// ASHRAE fraction of the daily range to subtract from the design dry bulb, hours 1 to 24
const DAILY_RANGE_FRACTIONS: [f64; 24] = [
    0.87, 0.92, 0.96, 0.99, 1.00, 0.98, 0.93, 0.84, 0.71, 0.56, 0.39, 0.23, 0.11, 0.03, 0.00,
    0.03, 0.10, 0.21, 0.34, 0.47, 0.58, 0.68, 0.76, 0.82,
];

const GARAGE_HEATING_TEMPERATURE_RISE: f64 = 13.;
const GARAGE_COOLING_TEMPERATURE_RISE: f64 = 11.;
const VENTED_ATTIC_SOLAR_RISE: f64 = 40.;
const UNVENTED_ATTIC_SOLAR_RISE: f64 = 20.;
const RADIANT_BARRIER_REDUCTION: f64 = 10.;

/// Outdoor and indoor design conditions for a site, with derived temperatures
/// for spaces outside the thermal envelope.
#[derive(Clone, Debug)]
pub struct DesignConditions {
    heating_design_drybulb: f64,
    cooling_design_drybulb: f64,
    daily_temperature_range: f64,
    heating_setpoint: f64,
    cooling_setpoint: f64,
    deep_ground_temperature: f64,
    ground_conductivity: f64,
    january_average_drybulb: f64,
    july_average_drybulb: f64,
    heating_design_wind_speed: f64,
    cooling_design_wind_speed: f64,
    latitude: f64,
    altitude_correction_factor: f64,
    outdoor_humidity_ratio: f64,
    indoor_humidity_ratio: f64,
    attic_roof_solar_absorptance: f64,
    attic_radiant_barrier: bool,
}

impl DesignConditions {
    pub fn from_input(input: &DesignConditionsInput, attic: &AtticInput) -> anyhow::Result<Self> {
        let pressure = pressure_at_elevation(input.elevation);
        let outdoor_humidity_ratio = humidity_ratio_from_wet_bulb(
            input.cooling_design_drybulb,
            input.cooling_design_wetbulb,
            pressure,
        )?;
        let indoor_humidity_ratio = humidity_ratio_from_relative_humidity(
            input.cooling_setpoint,
            input.indoor_relative_humidity,
            pressure,
        )?;

        Ok(Self {
            heating_design_drybulb: input.heating_design_drybulb,
            cooling_design_drybulb: input.cooling_design_drybulb,
            daily_temperature_range: input.daily_temperature_range,
            heating_setpoint: input.heating_setpoint,
            cooling_setpoint: input.cooling_setpoint,
            deep_ground_temperature: input.deep_ground_temperature,
            ground_conductivity: input.ground_conductivity,
            january_average_drybulb: input.january_average_drybulb,
            july_average_drybulb: input.july_average_drybulb,
            heating_design_wind_speed: input.heating_design_wind_speed,
            cooling_design_wind_speed: input.cooling_design_wind_speed,
            latitude: input.latitude,
            altitude_correction_factor: altitude_correction_factor(input.elevation),
            outdoor_humidity_ratio,
            indoor_humidity_ratio,
            attic_roof_solar_absorptance: attic.roof_solar_absorptance,
            attic_radiant_barrier: attic.radiant_barrier,
        })
    }

    pub fn heating_design_drybulb(&self) -> f64 {
        self.heating_design_drybulb
    }

    pub fn cooling_design_drybulb(&self) -> f64 {
        self.cooling_design_drybulb
    }

    pub fn heating_setpoint(&self) -> f64 {
        self.heating_setpoint
    }

    pub fn cooling_setpoint(&self) -> f64 {
        self.cooling_setpoint
    }

    pub fn deep_ground_temperature(&self) -> f64 {
        self.deep_ground_temperature
    }

    pub fn ground_conductivity(&self) -> f64 {
        self.ground_conductivity
    }

    pub fn january_average_drybulb(&self) -> f64 {
        self.january_average_drybulb
    }

    pub fn july_average_drybulb(&self) -> f64 {
        self.july_average_drybulb
    }

    pub fn heating_design_wind_speed(&self) -> f64 {
        self.heating_design_wind_speed
    }

    pub fn cooling_design_wind_speed(&self) -> f64 {
        self.cooling_design_wind_speed
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn altitude_correction_factor(&self) -> f64 {
        self.altitude_correction_factor
    }

    /// Heating temperature difference, in °F
    pub fn htd(&self) -> f64 {
        self.heating_setpoint - self.heating_design_drybulb
    }

    /// Cooling temperature difference, in °F
    pub fn ctd(&self) -> f64 {
        self.cooling_design_drybulb - self.cooling_setpoint
    }

    /// Difference between outdoor and indoor moisture content at cooling design
    /// conditions, in grains per lb of dry air. Never negative.
    pub fn cooling_grains_difference(&self) -> f64 {
        humidity_ratio_to_grains(self.outdoor_humidity_ratio - self.indoor_humidity_ratio).max(0.)
    }

    /// Moisture difference between a location and indoors at cooling design
    /// conditions, in grains per lb of dry air. Ground coupled spaces are taken
    /// to be as dry as indoors.
    pub fn cooling_grains_difference_at(&self, location: Location) -> f64 {
        match location {
            Location::ConditionedSpace
            | Location::OtherHousingUnit
            | Location::Ground
            | Location::UnventedCrawlspace
            | Location::UnconditionedBasement => 0.,
            Location::Outside
            | Location::VentedAttic
            | Location::UnventedAttic
            | Location::Garage
            | Location::VentedCrawlspace => self.cooling_grains_difference(),
        }
    }

    /// Outdoor dry bulb temperature on the cooling design day
    ///
    /// Arguments:
    /// * `hour` - hour of the day, 1 to 24
    pub fn outdoor_temperature_at_hour(&self, hour: usize) -> f64 {
        let fraction = DAILY_RANGE_FRACTIONS[(hour.clamp(1, 24)) - 1];
        self.cooling_design_drybulb - fraction * self.daily_temperature_range
    }

    pub fn hourly_outdoor_temperatures(&self) -> [f64; 12] {
        DESIGN_HOURS.map(|hour| self.outdoor_temperature_at_hour(hour))
    }

    /// Design temperature of a location at heating design conditions, in °F
    pub fn heating_temperature(&self, location: Location) -> f64 {
        let outdoor = self.heating_design_drybulb;
        let ground = self.deep_ground_temperature;
        match location {
            Location::ConditionedSpace | Location::OtherHousingUnit => self.heating_setpoint,
            Location::Outside | Location::VentedAttic | Location::UnventedAttic => outdoor,
            Location::Ground => ground,
            Location::Garage => outdoor + GARAGE_HEATING_TEMPERATURE_RISE,
            Location::VentedCrawlspace => outdoor,
            Location::UnventedCrawlspace => (ground + outdoor) / 2.,
            Location::UnconditionedBasement => (2. * ground + outdoor) / 3.,
        }
    }

    /// Design temperature of a location at cooling design conditions, in °F
    pub fn cooling_temperature(&self, location: Location) -> f64 {
        let outdoor = self.cooling_design_drybulb;
        let ground = self.deep_ground_temperature;
        match location {
            Location::ConditionedSpace | Location::OtherHousingUnit => self.cooling_setpoint,
            Location::Outside => outdoor,
            Location::Ground => ground,
            Location::VentedAttic => {
                outdoor + VENTED_ATTIC_SOLAR_RISE * self.attic_roof_solar_absorptance
                    - self.radiant_barrier_reduction()
            }
            Location::UnventedAttic => {
                outdoor + UNVENTED_ATTIC_SOLAR_RISE * self.attic_roof_solar_absorptance
                    - self.radiant_barrier_reduction()
            }
            Location::Garage => outdoor + GARAGE_COOLING_TEMPERATURE_RISE,
            Location::VentedCrawlspace => outdoor,
            Location::UnventedCrawlspace => (ground + outdoor) / 2.,
            Location::UnconditionedBasement => (2. * ground + outdoor) / 3.,
        }
    }

    /// Indoor minus adjacent temperature in heating, in °F
    pub fn heating_temperature_difference(&self, location: Location) -> f64 {
        self.heating_setpoint - self.heating_temperature(location)
    }

    /// Adjacent minus indoor temperature in cooling, in °F
    pub fn cooling_temperature_difference(&self, location: Location) -> f64 {
        self.cooling_temperature(location) - self.cooling_setpoint
    }

    fn radiant_barrier_reduction(&self) -> f64 {
        if self.attic_radiant_barrier {
            RADIANT_BARRIER_REDUCTION
        } else {
            0.
        }
    }
}
