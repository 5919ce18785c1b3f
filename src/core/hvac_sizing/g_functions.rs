//! This module provides borehole field g-functions, the dimensionless thermal
//! response of a field of vertical bores to a constant heat extraction rate.
//!
//! Values are computed from the finite line source solution (with an image
//! source above the ground surface) superposed over every pair of bores in a
//! layout. A library is computed for reference fields of 5 m spacing, 2 m
//! burial depth and 0.08 m radius at a set of reference bore heights, and an
//! actual field is matched to it by its spacing to height ratio.

use crate::input::BoreConfiguration;
use crate::statistics::np_interp;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::Serialize;
use statrs::function::erf::erf;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use thiserror::Error;

/// Standard logarithmic times ln(t/ts) at which g-functions are tabulated
pub const LN_T_TS: [f64; 27] = [
    -8.5, -7.8, -7.2, -6.5, -5.9, -5.2, -4.5, -3.963, -3.27, -2.864, -2.577, -2.171, -1.884,
    -1.191, -0.497, -0.274, -0.051, 0.196, 0.419, 0.642, 0.873, 1.112, 1.335, 1.679, 2.028,
    2.275, 3.003,
];

/// Reference bore heights, in m, in increasing order
const REFERENCE_HEIGHTS: [f64; 5] = [24., 48., 96., 192., 384.];
/// Reference bore spacing, in m
const REFERENCE_SPACING: f64 = 5.;
/// Reference depth of the top of the bore below the ground surface, in m
const REFERENCE_BURIAL_DEPTH: f64 = 2.;
/// Reference bore radius, in m
const REFERENCE_RADIUS: f64 = 0.08;

const INTEGRATION_POINTS: usize = 4000;

#[derive(Debug, Error, PartialEq)]
pub enum GFunctionError {
    #[error("No {configuration} bore field layout has {count} bore holes")]
    UnsupportedCount {
        configuration: BoreConfiguration,
        count: u32,
    },
    #[error("Bore field dimensions must be positive (spacing {spacing} m, height {height} m, radius {radius} m)")]
    InvalidGeometry {
        spacing: f64,
        height: f64,
        radius: f64,
    },
}

/// A g-function tabulated against ln(t/ts)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GFunction {
    pub ln_t_ts: Vec<f64>,
    pub g: Vec<f64>,
}

impl GFunction {
    /// Value at any ln(t/ts), interpolating linearly in log time and holding
    /// the end values outside the tabulated range
    pub fn value_at(&self, ln_t_ts: f64) -> f64 {
        np_interp(ln_t_ts, &self.ln_t_ts, &self.g)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.ln_t_ts.iter().copied().zip(self.g.iter().copied())
    }
}

/// Bore positions of a layout, in units of bore spacing
type Layout = Vec<(f64, f64)>;

/// Bore counts with a layout, for one configuration
pub fn available_counts(configuration: BoreConfiguration) -> Vec<u32> {
    (1..=10)
        .filter(|count| layout(configuration, *count).is_some())
        .collect()
}

fn layout(configuration: BoreConfiguration, count: u32) -> Option<Layout> {
    let count = count as i32;
    match configuration {
        BoreConfiguration::Rectangle => {
            // most nearly square grid
            let rows = (1..=count)
                .filter(|rows| count % rows == 0 && rows * rows <= count)
                .max()?;
            Some(grid(rows, count / rows, |_, _| true))
        }
        BoreConfiguration::OpenRectangle => {
            let (rows, columns) = match count {
                8 => (3, 3),
                10 => (3, 4),
                _ => return None,
            };
            Some(grid(rows, columns, |row, column| {
                row == 0 || row == rows - 1 || column == 0 || column == columns - 1
            }))
        }
        BoreConfiguration::C => {
            let columns = match count {
                5 => 2,
                7 => 3,
                9 => 4,
                _ => return None,
            };
            Some(grid(3, columns, |row, column| row != 1 || column == 0))
        }
        BoreConfiguration::L => {
            if !(3..=10).contains(&count) {
                return None;
            }
            let long_arm = (count + 2) / 2;
            let short_arm = count + 1 - long_arm;
            Some(grid(short_arm, long_arm, |row, column| row == 0 || column == 0))
        }
        BoreConfiguration::U => {
            let (rows, columns) = match count {
                5 => (2, 3),
                6 => (2, 4),
                7 => (3, 3),
                8 => (3, 4),
                9 => (4, 3),
                10 => (4, 4),
                _ => return None,
            };
            Some(grid(rows, columns, |row, column| {
                row == 0 || column == 0 || column == columns - 1
            }))
        }
        BoreConfiguration::LopsidedU => {
            let (rows, columns) = match count {
                6 => (3, 3),
                8 => (4, 3),
                9 => (4, 4),
                _ => return None,
            };
            // right arm one bore shorter than the left
            Some(grid(rows, columns, |row, column| {
                row == 0 || column == 0 || (column == columns - 1 && row < rows - 1)
            }))
        }
    }
}

fn grid(rows: i32, columns: i32, include: impl Fn(i32, i32) -> bool) -> Layout {
    (0..rows)
        .cartesian_product(0..columns)
        .filter(|(row, column)| include(*row, *column))
        .map(|(row, column)| (column as f64, row as f64))
        .collect()
}

fn ierf(x: f64) -> f64 {
    x * erf(x) - (1. - (-x * x).exp()) / PI.sqrt()
}

/// Mean finite line source response between two bores at `distance`, for
/// each lower integration limit in `lower_limits`
fn finite_line_source(distance: f64, height: f64, burial_depth: f64, lower_limits: &[f64]) -> Vec<f64> {
    let Some(lowest) = lower_limits.iter().copied().map(OrderedFloat).min() else {
        return vec![];
    };
    let upper = (12. / distance).max(120. / height);
    let (start, end) = (lowest.0.ln(), upper.ln());
    let step = (end - start) / INTEGRATION_POINTS as f64;

    // integrand in u = ln(s)
    let integrand = |u: f64| {
        let s = u.exp();
        let erf_int = 2. * ierf(height * s) + 2. * ierf((2. * burial_depth + height) * s)
            - ierf(2. * burial_depth * s)
            - ierf((2. * burial_depth + 2. * height) * s);
        (-distance * distance * s * s).exp() / s * erf_int / (2. * height)
    };
    let values = (0..=INTEGRATION_POINTS)
        .map(|i| integrand(start + i as f64 * step))
        .collect::<Vec<_>>();

    // cumulative integral from each grid point to the upper limit
    let mut cumulative = vec![0.; INTEGRATION_POINTS + 1];
    for i in (0..INTEGRATION_POINTS).rev() {
        cumulative[i] = cumulative[i + 1] + 0.5 * (values[i] + values[i + 1]) * step;
    }

    lower_limits
        .iter()
        .map(|limit| {
            let position = (limit.ln() - start) / step;
            let i = (position as usize).min(INTEGRATION_POINTS - 1);
            let fraction = position - i as f64;
            cumulative[i] * (1. - fraction) + cumulative[i + 1] * fraction
        })
        .collect()
}

/// g-function of a reference field
fn reference_g_function(bores: &Layout, height: f64) -> Vec<f64> {
    let lower_limits = LN_T_TS
        .iter()
        .map(|ln_t_ts| 3. / (2. * height * (ln_t_ts / 2.).exp()))
        .collect::<Vec<_>>();

    let distance_counts = bores
        .iter()
        .cartesian_product(bores.iter())
        .map(|(first, second)| {
            let distance = if first == second {
                REFERENCE_RADIUS
            } else {
                REFERENCE_SPACING * (first.0 - second.0).hypot(first.1 - second.1)
            };
            OrderedFloat((distance * 1e6).round() / 1e6)
        })
        .fold(BTreeMap::<OrderedFloat<f64>, usize>::new(), |mut counts, distance| {
            *counts.entry(distance).or_default() += 1;
            counts
        });

    let mut g = vec![0.; LN_T_TS.len()];
    for (distance, count) in distance_counts {
        let response = finite_line_source(distance.0, height, REFERENCE_BURIAL_DEPTH, &lower_limits);
        for (total, value) in g.iter_mut().zip(response) {
            *total += count as f64 * value;
        }
    }
    let bore_count = bores.len() as f64;
    g.iter_mut().for_each(|value| *value /= bore_count);
    g
}

/// g-function of a layout at an actual spacing to height ratio, before the
/// radius correction
fn g_for_layout(bores: &Layout, spacing_to_height: f64) -> Vec<f64> {
    // equivalent reference height, clamped to the library range
    let height = (REFERENCE_SPACING / spacing_to_height)
        .clamp(REFERENCE_HEIGHTS[0], REFERENCE_HEIGHTS[REFERENCE_HEIGHTS.len() - 1]);
    let upper_index = REFERENCE_HEIGHTS
        .iter()
        .position(|reference| *reference >= height)
        .unwrap_or(REFERENCE_HEIGHTS.len() - 1)
        .max(1);
    let (lower_height, upper_height) = (REFERENCE_HEIGHTS[upper_index - 1], REFERENCE_HEIGHTS[upper_index]);

    let lower = reference_g_function(bores, lower_height);
    let upper = reference_g_function(bores, upper_height);

    // linear in B/H between the two reference fields
    let (lower_ratio, upper_ratio) = (REFERENCE_SPACING / lower_height, REFERENCE_SPACING / upper_height);
    let ratio = REFERENCE_SPACING / height;
    let weight = (ratio - lower_ratio) / (upper_ratio - lower_ratio);
    lower
        .iter()
        .zip(&upper)
        .map(|(lower, upper)| lower + weight * (upper - lower))
        .collect()
}

/// g-function for a bore field
///
/// Arguments:
/// * `configuration` - shape of the bore field
/// * `count` - number of bore holes
/// * `spacing` - distance between adjacent bores, in m
/// * `height` - active length of each bore, in m
/// * `radius` - bore radius, in m
pub fn g_function(
    configuration: BoreConfiguration,
    count: u32,
    spacing: f64,
    height: f64,
    radius: f64,
) -> Result<GFunction, GFunctionError> {
    if spacing <= 0. || height <= 0. || radius <= 0. {
        return Err(GFunctionError::InvalidGeometry {
            spacing,
            height,
            radius,
        });
    }
    let spacing_to_height = spacing / height;

    let g = match layout(configuration, count) {
        Some(bores) => g_for_layout(&bores, spacing_to_height),
        None => {
            let counts = available_counts(configuration);
            let unsupported = GFunctionError::UnsupportedCount {
                configuration,
                count,
            };
            let lower = counts.iter().copied().filter(|c| *c < count).max();
            let upper = counts.iter().copied().filter(|c| *c > count).min();
            let (Some(lower), Some(upper)) = (lower, upper) else {
                return Err(unsupported);
            };
            let (Some(lower_bores), Some(upper_bores)) =
                (layout(configuration, lower), layout(configuration, upper))
            else {
                return Err(unsupported);
            };
            let lower_g = g_for_layout(&lower_bores, spacing_to_height);
            let upper_g = g_for_layout(&upper_bores, spacing_to_height);
            let weight = (count - lower) as f64 / (upper - lower) as f64;
            lower_g
                .iter()
                .zip(&upper_g)
                .map(|(lower, upper)| lower + weight * (upper - lower))
                .collect()
        }
    };

    // radius relative to a reference field scaled to the actual spacing
    let scaled_reference_radius = REFERENCE_RADIUS * spacing / REFERENCE_SPACING;
    let radius_correction = (radius / scaled_reference_radius).ln();

    Ok(GFunction {
        ln_t_ts: LN_T_TS.to_vec(),
        g: g.into_iter().map(|value| value - radius_correction).collect(),
    })
}
