use crate::core::loads::DesignLoad;
use crate::input::SpaceInput;

/// Per occupant, in Btu/h
pub const OCCUPANT_SENSIBLE_GAIN: f64 = 230.;
pub const OCCUPANT_LATENT_GAIN: f64 = 200.;
/// Appliance and plug load sensible gain for a whole dwelling, in Btu/h
pub const DWELLING_APPLIANCE_GAIN: f64 = 1600.;

/// Internal gains of a space at cooling design conditions. Internal gains are
/// not credited against the heating load.
///
/// Arguments:
/// * `space` - the space, with its occupant count and any gain overrides
/// * `total_floor_area` - conditioned floor area of the dwelling, in ft²
pub fn internal_gains(space: &SpaceInput, total_floor_area: f64) -> DesignLoad {
    let occupants = space.number_of_occupants.unwrap_or(0.);
    let appliance_share = if total_floor_area > 0. {
        space.floor_area / total_floor_area
    } else {
        0.
    };

    let sensible = space.internal_gains_sensible.unwrap_or_else(|| {
        occupants * OCCUPANT_SENSIBLE_GAIN + DWELLING_APPLIANCE_GAIN * appliance_share
    });
    let latent = space
        .internal_gains_latent
        .unwrap_or(occupants * OCCUPANT_LATENT_GAIN);

    DesignLoad::new(0., sensible, latent)
}
