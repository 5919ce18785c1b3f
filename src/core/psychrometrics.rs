use crate::core::units::{fahrenheit_to_rankine, GRAINS_PER_POUND, STANDARD_PRESSURE_PSIA};

/// Moist air property functions in inch-pound units, from ASHRAE Handbook of
/// Fundamentals chapter 1.

const RATIO_MOLECULAR_MASS_WATER_AIR: f64 = 0.621945;

/// Standard atmospheric pressure at an elevation, in psia
///
/// Arguments:
/// * `elevation` - site elevation above sea level, in ft
pub fn pressure_at_elevation(elevation: f64) -> f64 {
    STANDARD_PRESSURE_PSIA * (1. - 6.8754e-6 * elevation).powf(5.2559)
}

/// Ratio of air density at the site to air density at sea level, applied to the
/// sensible and latent air factors
pub fn altitude_correction_factor(elevation: f64) -> f64 {
    pressure_at_elevation(elevation) / STANDARD_PRESSURE_PSIA
}

/// Saturation pressure of water vapour over liquid water (or ice below freezing), in psia
pub fn saturation_pressure(temp: f64) -> anyhow::Result<f64> {
    let t = fahrenheit_to_rankine(temp)?;
    let ln_pws = if temp >= 32. {
        -1.0440397e4 / t - 1.1294650e1 - 2.7022355e-2 * t + 1.2890360e-5 * t.powi(2)
            - 2.4780681e-9 * t.powi(3)
            + 6.5459673 * t.ln()
    } else {
        -1.0214165e4 / t - 4.8932428 - 5.3765794e-3 * t
            + 1.9202377e-7 * t.powi(2)
            + 3.5575832e-10 * t.powi(3)
            - 9.0344688e-14 * t.powi(4)
            + 4.1635019 * t.ln()
    };

    Ok(ln_pws.exp())
}

fn humidity_ratio_from_vapour_pressure(vapour_pressure: f64, pressure: f64) -> f64 {
    RATIO_MOLECULAR_MASS_WATER_AIR * vapour_pressure / (pressure - vapour_pressure)
}

/// Humidity ratio (lb water / lb dry air) from dry bulb and wet bulb temperatures
///
/// Arguments:
/// * `dry_bulb` - in °F
/// * `wet_bulb` - in °F, not above the dry bulb
/// * `pressure` - in psia
pub fn humidity_ratio_from_wet_bulb(
    dry_bulb: f64,
    wet_bulb: f64,
    pressure: f64,
) -> anyhow::Result<f64> {
    if wet_bulb > dry_bulb {
        anyhow::bail!("Wet bulb temperature {wet_bulb}°F exceeds dry bulb temperature {dry_bulb}°F");
    }
    let w_sat_wet_bulb =
        humidity_ratio_from_vapour_pressure(saturation_pressure(wet_bulb)?, pressure);
    let w = ((1093. - 0.556 * wet_bulb) * w_sat_wet_bulb - 0.240 * (dry_bulb - wet_bulb))
        / (1093. + 0.444 * dry_bulb - wet_bulb);

    Ok(w.max(0.))
}

/// Humidity ratio (lb water / lb dry air) from dry bulb temperature and relative humidity
pub fn humidity_ratio_from_relative_humidity(
    dry_bulb: f64,
    relative_humidity: f64,
    pressure: f64,
) -> anyhow::Result<f64> {
    let vapour_pressure = relative_humidity * saturation_pressure(dry_bulb)?;
    Ok(humidity_ratio_from_vapour_pressure(vapour_pressure, pressure))
}

pub fn humidity_ratio_to_grains(humidity_ratio: f64) -> f64 {
    humidity_ratio * GRAINS_PER_POUND
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    #[case(70., 0.363277)]
    #[case(20., 0.050489)]
    fn should_calculate_saturation_pressure(#[case] temp: f64, #[case] expected: f64) {
        assert_relative_eq!(
            saturation_pressure(temp).unwrap(),
            expected,
            max_relative = 1e-5
        );
    }

    #[rstest]
    fn should_calculate_pressure_and_altitude_correction_at_elevation() {
        assert_relative_eq!(pressure_at_elevation(0.), STANDARD_PRESSURE_PSIA);
        assert_relative_eq!(pressure_at_elevation(5000.), 12.22783, max_relative = 1e-5);
        assert_relative_eq!(altitude_correction_factor(5000.), 0.832052, max_relative = 1e-5);
    }

    #[rstest]
    fn should_calculate_humidity_ratio_from_relative_humidity() {
        let w = humidity_ratio_from_relative_humidity(75., 0.5, STANDARD_PRESSURE_PSIA).unwrap();
        assert_relative_eq!(w, 0.0092357, max_relative = 1e-4);
        assert_relative_eq!(humidity_ratio_to_grains(w), 64.65, max_relative = 1e-3);
    }

    #[rstest]
    fn should_calculate_humidity_ratio_from_wet_bulb() {
        let w = humidity_ratio_from_wet_bulb(95., 75., STANDARD_PRESSURE_PSIA).unwrap();
        assert_relative_eq!(w, 0.0140652, max_relative = 1e-4);
    }

    #[rstest]
    fn should_reject_wet_bulb_above_dry_bulb() {
        assert!(humidity_ratio_from_wet_bulb(70., 75., STANDARD_PRESSURE_PSIA).is_err());
    }
}
