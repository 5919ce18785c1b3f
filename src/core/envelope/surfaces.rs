use crate::core::design_conditions::DesignConditions;
use crate::core::envelope::slab::basement_floor_width;
use crate::core::envelope::{basement_slab_u_factor, foundation_wall_u_factors, slab_f_factor};
use crate::core::loads::{DesignLoad, LoadBreakdown, LoadComponent};
use crate::core::solar::ClearSky;
use crate::core::units::pitch_to_tilt_degrees;
use crate::input::{
    CeilingInput, DoorInput, FloorInput, FoundationWallInput, Location, RoofInput, SkylightInput,
    SlabInput, SpaceInput, WallInput, WindowInput,
};
use crate::statistics::mean;

/// Outside surface heat transfer coefficient in summer, in Btu/(hr·ft²·°F)
const OUTSIDE_SURFACE_COEFFICIENT: f64 = 3.0;
/// Long wave sky correction for a horizontal surface, in °F
const HORIZONTAL_SKY_CORRECTION: f64 = 7.;
const DOOR_SOLAR_ABSORPTANCE: f64 = 0.7;
const VERTICAL: f64 = 90.;

/// Cooling gain of a fenestration surface at each design hour, in Btu/h
pub type HourlyCurve = [f64; 12];

/// Envelope loads of a space, with the hourly fenestration gain curve used to
/// check for a peak excursion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpaceEnvelopeLoads {
    pub breakdown: LoadBreakdown,
    pub fenestration_curve: HourlyCurve,
}

/// Calculates heating losses and cooling gains through envelope surfaces at
/// design conditions.
pub struct EnvelopeLoadCalculator<'a> {
    conditions: &'a DesignConditions,
    clear_sky: ClearSky,
    hourly_outdoor_temperatures: HourlyCurve,
}

impl<'a> EnvelopeLoadCalculator<'a> {
    pub fn new(conditions: &'a DesignConditions) -> Self {
        Self {
            conditions,
            clear_sky: ClearSky::new(conditions.latitude()),
            hourly_outdoor_temperatures: conditions.hourly_outdoor_temperatures(),
        }
    }

    pub fn space(&self, space: &SpaceInput) -> SpaceEnvelopeLoads {
        let mut breakdown = LoadBreakdown::default();
        let mut fenestration_curve = HourlyCurve::default();

        for window in &space.windows {
            let hourly = self.window(window);
            accumulate_curve(&mut fenestration_curve, &hourly);
            breakdown.add(
                LoadComponent::Windows,
                self.fenestration_load(window.area, window.u_factor, &hourly),
            );
        }
        for skylight in &space.skylights {
            let hourly = self.skylight(skylight);
            accumulate_curve(&mut fenestration_curve, &hourly);
            breakdown.add(
                LoadComponent::Skylights,
                self.fenestration_load(skylight.area, skylight.u_factor, &hourly),
            );
        }
        for door in &space.doors {
            breakdown.add(LoadComponent::Doors, self.door(door));
        }
        for wall in &space.walls {
            breakdown.add(LoadComponent::Walls, self.wall(wall));
        }
        for foundation_wall in &space.foundation_walls {
            breakdown.add(LoadComponent::Walls, self.foundation_wall(foundation_wall));
        }
        for roof in &space.roofs {
            breakdown.add(LoadComponent::Roofs, self.roof(roof));
        }
        for floor in &space.floors {
            breakdown.add(LoadComponent::Floors, self.floor(floor));
        }
        for slab in &space.slabs {
            breakdown.add(LoadComponent::Slabs, self.slab(slab));
        }
        for ceiling in &space.ceilings {
            breakdown.add(LoadComponent::Ceilings, self.ceiling(ceiling));
        }

        SpaceEnvelopeLoads {
            breakdown,
            fenestration_curve,
        }
    }

    pub fn wall(&self, wall: &WallInput) -> DesignLoad {
        self.opaque(
            wall.area / wall.assembly_r_value,
            wall.adjacent_to,
            VERTICAL,
            wall.azimuth,
            wall.solar_absorptance,
        )
    }

    pub fn roof(&self, roof: &RoofInput) -> DesignLoad {
        self.opaque(
            roof.area / roof.assembly_r_value,
            Location::Outside,
            pitch_to_tilt_degrees(roof.pitch),
            roof.azimuth,
            roof.solar_absorptance,
        )
    }

    pub fn door(&self, door: &DoorInput) -> DesignLoad {
        self.opaque(
            door.area / door.r_value,
            door.adjacent_to,
            VERTICAL,
            door.azimuth,
            DOOR_SOLAR_ABSORPTANCE,
        )
    }

    pub fn ceiling(&self, ceiling: &CeilingInput) -> DesignLoad {
        self.to_adjacent_space(ceiling.area / ceiling.assembly_r_value, ceiling.adjacent_to)
    }

    pub fn floor(&self, floor: &FloorInput) -> DesignLoad {
        self.to_adjacent_space(floor.area / floor.assembly_r_value, floor.adjacent_to)
    }

    pub fn slab(&self, slab: &SlabInput) -> DesignLoad {
        let ground_conductivity = self.conditions.ground_conductivity();
        let conductance = if slab.depth_below_grade > 0. {
            basement_slab_u_factor(slab, basement_floor_width(slab), ground_conductivity) * slab.area
        } else {
            slab_f_factor(slab, ground_conductivity) * slab.exposed_perimeter
        };

        DesignLoad::heating(conductance * self.conditions.htd())
    }

    pub fn foundation_wall(&self, wall: &FoundationWallInput) -> DesignLoad {
        let u_factors = foundation_wall_u_factors(wall, self.conditions.ground_conductivity());
        let above_grade_conductance = u_factors.above_grade * wall.above_grade_area();
        let below_grade_conductance = u_factors.below_grade * wall.below_grade_area();

        DesignLoad::new(
            (above_grade_conductance + below_grade_conductance) * self.conditions.htd(),
            above_grade_conductance * self.conditions.ctd(),
            0.,
        )
    }

    /// Hourly cooling gain through a window: conduction plus transmitted solar
    pub fn window(&self, window: &WindowInput) -> HourlyCurve {
        self.fenestration_hourly(
            window.area,
            window.u_factor,
            window.shgc,
            window.interior_shading_factor,
            window.exterior_shading_factor,
            VERTICAL,
            window.azimuth,
        )
    }

    pub fn skylight(&self, skylight: &SkylightInput) -> HourlyCurve {
        self.fenestration_hourly(
            skylight.area,
            skylight.u_factor,
            skylight.shgc,
            skylight.interior_shading_factor,
            skylight.exterior_shading_factor,
            pitch_to_tilt_degrees(skylight.pitch),
            skylight.azimuth,
        )
    }

    fn fenestration_hourly(
        &self,
        area: f64,
        u_factor: f64,
        shgc: f64,
        interior_shading_factor: f64,
        exterior_shading_factor: f64,
        tilt: f64,
        azimuth: f64,
    ) -> HourlyCurve {
        let setpoint = self.conditions.cooling_setpoint();
        let irradiance = self.clear_sky.design_day_irradiance(tilt, azimuth);

        std::array::from_fn(|i| {
            let conduction = u_factor * area * (self.hourly_outdoor_temperatures[i] - setpoint);
            let solar = area
                * shgc
                * interior_shading_factor
                * (irradiance[i].beam * exterior_shading_factor
                    + irradiance[i].diffuse
                    + irradiance[i].reflected);
            conduction + solar
        })
    }

    fn fenestration_load(&self, area: f64, u_factor: f64, hourly: &HourlyCurve) -> DesignLoad {
        DesignLoad::new(u_factor * area * self.conditions.htd(), mean(hourly), 0.)
    }

    fn opaque(
        &self,
        conductance: f64,
        adjacent_to: Location,
        tilt: f64,
        azimuth: f64,
        solar_absorptance: f64,
    ) -> DesignLoad {
        if adjacent_to != Location::Outside {
            return self.to_adjacent_space(conductance, adjacent_to);
        }

        let sol_air = self.mean_sol_air_temperature(tilt, azimuth, solar_absorptance);
        DesignLoad::new(
            conductance * self.conditions.htd(),
            conductance * (sol_air - self.conditions.cooling_setpoint()),
            0.,
        )
    }

    fn to_adjacent_space(&self, conductance: f64, adjacent_to: Location) -> DesignLoad {
        DesignLoad::new(
            conductance * self.conditions.heating_temperature_difference(adjacent_to),
            conductance * self.conditions.cooling_temperature_difference(adjacent_to),
            0.,
        )
    }

    /// Mean sol-air temperature over the design hours, in °F
    fn mean_sol_air_temperature(&self, tilt: f64, azimuth: f64, solar_absorptance: f64) -> f64 {
        let irradiance = self.clear_sky.design_day_irradiance(tilt, azimuth);
        let sky_correction = HORIZONTAL_SKY_CORRECTION * tilt.to_radians().cos();
        let hourly: HourlyCurve = std::array::from_fn(|i| {
            self.hourly_outdoor_temperatures[i]
                + solar_absorptance * irradiance[i].total() / OUTSIDE_SURFACE_COEFFICIENT
                - sky_correction
        });

        mean(&hourly)
    }
}

fn accumulate_curve(curve: &mut HourlyCurve, other: &HourlyCurve) {
    curve.iter_mut().zip(other).for_each(|(total, value)| *total += value);
}
