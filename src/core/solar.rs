/// Clear-sky irradiance on building surfaces for the cooling design day
/// (July 21st), using the ASHRAE clear sky model.
use crate::core::design_conditions::DESIGN_HOURS;

const JULY_DECLINATION_DEGREES: f64 = 20.4;
// ASHRAE clear sky coefficients for July
const APPARENT_EXTRATERRESTRIAL_IRRADIANCE: f64 = 1085.; // Btu/(hr·ft²)
const ATMOSPHERIC_EXTINCTION_COEFFICIENT: f64 = 0.207;
const DIFFUSE_RADIATION_FACTOR: f64 = 0.136;
const GROUND_REFLECTANCE: f64 = 0.2;

/// Irradiance incident on a surface, in Btu/(hr·ft²)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceIrradiance {
    pub beam: f64,
    pub diffuse: f64,
    pub reflected: f64,
}

impl SurfaceIrradiance {
    pub fn total(&self) -> f64 {
        self.beam + self.diffuse + self.reflected
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ClearSky {
    latitude: f64,
}

impl ClearSky {
    pub fn new(latitude: f64) -> Self {
        Self { latitude }
    }

    /// Solar altitude and azimuth (from south, positive to the west), in radians
    fn sun_position(&self, hour: usize) -> Option<(f64, f64)> {
        let latitude = self.latitude.to_radians();
        let declination = JULY_DECLINATION_DEGREES.to_radians();
        let hour_angle = (15. * (hour as f64 - 12.)).to_radians();

        let sin_altitude = latitude.cos() * declination.cos() * hour_angle.cos()
            + latitude.sin() * declination.sin();
        if sin_altitude <= 0. {
            return None;
        }
        let altitude = sin_altitude.asin();

        let cos_azimuth = ((sin_altitude * latitude.sin() - declination.sin())
            / (altitude.cos() * latitude.cos()))
        .clamp(-1., 1.);
        let azimuth = cos_azimuth.acos().copysign(hour_angle);

        Some((altitude, azimuth))
    }

    /// Irradiance on a surface at an hour of the design day
    ///
    /// Arguments:
    /// * `hour` - solar hour of the day, 1 to 24
    /// * `tilt` - tilt of the surface from horizontal, in degrees
    /// * `azimuth` - direction the surface faces, in degrees clockwise from north
    pub fn irradiance(&self, hour: usize, tilt: f64, azimuth: f64) -> SurfaceIrradiance {
        let Some((altitude, solar_azimuth)) = self.sun_position(hour) else {
            return Default::default();
        };
        let tilt = tilt.to_radians();
        let surface_azimuth = (azimuth - 180.).to_radians();
        let direct_normal = APPARENT_EXTRATERRESTRIAL_IRRADIANCE
            / (ATMOSPHERIC_EXTINCTION_COEFFICIENT / altitude.sin()).exp();

        let cos_incidence = altitude.cos() * (solar_azimuth - surface_azimuth).cos() * tilt.sin()
            + altitude.sin() * tilt.cos();

        SurfaceIrradiance {
            beam: direct_normal * cos_incidence.max(0.),
            diffuse: DIFFUSE_RADIATION_FACTOR * direct_normal * (1. + tilt.cos()) / 2.,
            reflected: GROUND_REFLECTANCE
                * direct_normal
                * (DIFFUSE_RADIATION_FACTOR + altitude.sin())
                * (1. - tilt.cos())
                / 2.,
        }
    }

    /// Irradiance on a surface for each of the cooling design hours
    pub fn design_day_irradiance(&self, tilt: f64, azimuth: f64) -> [SurfaceIrradiance; 12] {
        DESIGN_HOURS.map(|hour| self.irradiance(hour, tilt, azimuth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn clear_sky() -> ClearSky {
        ClearSky::new(40.)
    }

    #[rstest]
    fn should_have_no_irradiance_at_night(clear_sky: ClearSky) {
        assert_eq!(clear_sky.irradiance(1, 90., 180.), SurfaceIrradiance::default());
    }

    #[rstest]
    fn should_be_symmetric_about_solar_noon_for_east_and_west(clear_sky: ClearSky) {
        let east_morning = clear_sky.irradiance(9, 90., 90.);
        let west_afternoon = clear_sky.irradiance(15, 90., 270.);
        assert_relative_eq!(east_morning.total(), west_afternoon.total(), max_relative = 1e-9);
    }

    #[rstest]
    fn should_give_large_horizontal_beam_at_noon(clear_sky: ClearSky) {
        let noon = clear_sky.irradiance(12, 0., 180.);
        // sun altitude at 40°N on July 21st is about 70°
        assert!(noon.beam > 750. && noon.beam < 900., "got {}", noon.beam);
        assert_eq!(noon.reflected, 0.);
    }

    #[rstest]
    fn should_give_no_beam_on_north_wall_at_noon(clear_sky: ClearSky) {
        let north = clear_sky.irradiance(12, 90., 0.);
        assert_eq!(north.beam, 0.);
        assert!(north.diffuse > 0.);
    }

    #[rstest]
    fn should_give_west_wall_more_afternoon_than_morning(clear_sky: ClearSky) {
        let irradiance = clear_sky.design_day_irradiance(90., 270.);
        assert!(irradiance[8].total() > irradiance[1].total());
    }
}
