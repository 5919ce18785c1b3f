pub mod design_conditions;
pub mod envelope;
pub mod hvac_sizing;
pub mod loads;
pub mod material_properties;
pub mod psychrometrics;
pub mod solar;
pub mod units;
