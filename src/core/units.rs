use thiserror::Error;

pub const BTU_PER_HOUR_PER_WATT: f64 = 3.412142;
pub const BTU_PER_HOUR_PER_TON: f64 = 12_000.;
pub const FEET_PER_METRE: f64 = 3.28084;
pub const INCHES_PER_FOOT: f64 = 12.;
pub const SECONDS_PER_HOUR: u32 = 3_600;
pub const HOURS_PER_DAY: u32 = 24;
pub const HOURS_PER_YEAR: f64 = 8_760.;
pub const MINUTES_PER_HOUR: u32 = 60;
pub const GRAINS_PER_POUND: f64 = 7_000.;

/// Sensible heat factor for standard air, in Btu/(hr·cfm·°F)
pub const SENSIBLE_AIR_FACTOR: f64 = 1.1;
/// Latent heat factor for standard air, in Btu/(hr·cfm·grain/lb)
pub const LATENT_AIR_FACTOR: f64 = 0.68;

/// Standard atmospheric pressure at sea level, in psia
pub const STANDARD_PRESSURE_PSIA: f64 = 14.696;

pub fn btu_per_hour_to_watts(value: f64) -> f64 {
    value / BTU_PER_HOUR_PER_WATT
}

pub fn watts_to_btu_per_hour(value: f64) -> f64 {
    value * BTU_PER_HOUR_PER_WATT
}

pub fn btu_per_hour_to_tons(value: f64) -> f64 {
    value / BTU_PER_HOUR_PER_TON
}

pub fn tons_to_btu_per_hour(value: f64) -> f64 {
    value * BTU_PER_HOUR_PER_TON
}

pub fn feet_to_metres(value: f64) -> f64 {
    value / FEET_PER_METRE
}

pub fn metres_to_feet(value: f64) -> f64 {
    value * FEET_PER_METRE
}

pub fn inches_to_feet(value: f64) -> f64 {
    value / INCHES_PER_FOOT
}

pub fn inches_to_metres(value: f64) -> f64 {
    feet_to_metres(inches_to_feet(value))
}

pub fn fahrenheit_to_celsius(temp_f: f64) -> f64 {
    (temp_f - 32.) / 1.8
}

pub fn celsius_to_fahrenheit(temp_c: f64) -> f64 {
    temp_c * 1.8 + 32.
}

pub(crate) fn fahrenheit_to_rankine(temp_f: f64) -> Result<f64, BelowAbsoluteZeroError> {
    if temp_f < -459.67 {
        Err(BelowAbsoluteZeroError { temp_f })
    } else {
        Ok(temp_f + 459.67)
    }
}

/// Convert a thermal diffusivity in ft²/hr into m²/s
pub fn sq_feet_per_hour_to_sq_metres_per_second(value: f64) -> f64 {
    value / (FEET_PER_METRE * FEET_PER_METRE) / SECONDS_PER_HOUR as f64
}

/// Convert a roof pitch given as rise over 12 into a tilt in degrees from horizontal
pub fn pitch_to_tilt_degrees(pitch: f64) -> f64 {
    (pitch / 12.).atan().to_degrees()
}

#[derive(Debug, Error)]
#[error("A temperature of {temp_f}ºF was encountered, which is less than absolute zero")]
pub(crate) struct BelowAbsoluteZeroError {
    temp_f: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_convert_between_watts_and_btu_per_hour() {
        assert_relative_eq!(watts_to_btu_per_hour(3000.), 10236.426, max_relative = 1e-6);
        assert_relative_eq!(
            btu_per_hour_to_watts(watts_to_btu_per_hour(3600.)),
            3600.,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn should_convert_tons() {
        assert_eq!(btu_per_hour_to_tons(36000.), 3.);
        assert_eq!(tons_to_btu_per_hour(2.5), 30000.);
    }

    #[rstest]
    #[case(32., 0.)]
    #[case(212., 100.)]
    #[case(-40., -40.)]
    fn should_convert_fahrenheit_to_celsius(#[case] temp_f: f64, #[case] expected: f64) {
        assert_relative_eq!(fahrenheit_to_celsius(temp_f), expected, epsilon = 1e-12);
        assert_relative_eq!(celsius_to_fahrenheit(expected), temp_f, epsilon = 1e-12);
    }

    #[rstest]
    fn should_reject_temperature_below_absolute_zero() {
        assert!(fahrenheit_to_rankine(-500.).is_err());
        assert_relative_eq!(fahrenheit_to_rankine(0.).unwrap(), 459.67);
    }

    #[rstest]
    fn should_convert_pitch_to_tilt() {
        assert_relative_eq!(pitch_to_tilt_degrees(12.), 45., epsilon = 1e-12);
        assert_eq!(pitch_to_tilt_degrees(0.), 0.);
    }

    #[rstest]
    fn should_convert_lengths() {
        assert_relative_eq!(metres_to_feet(5.), 16.4042, max_relative = 1e-6);
        assert_relative_eq!(inches_to_metres(12.), 0.3048, max_relative = 1e-5);
    }
}
