#![allow(clippy::too_many_arguments)]

mod compare_floats;
pub mod core;
pub mod errors;
pub mod input;
pub mod model;
pub mod output;
pub mod report;
mod statistics;

#[macro_use]
extern crate is_close;

use crate::errors::{HvacSizingError, PostprocessingError, SizingCoreError};
use crate::input::{
    ingest_for_processing, HeatPumpBackupSizingMethodology, HeatPumpSizingMethodology,
    InputForProcessing,
};
pub use crate::model::SizingResults;
use crate::model::SizingModel;
use crate::output::Output;
use crate::report::{
    write_capacities_csv, write_design_loads_csv, write_geothermal_loop_csv, write_json,
    SizingReport,
};
use std::io::Read;
use strum::{Display, EnumIter};
use tracing::{debug, instrument};

/// Which files results are written as
#[derive(Clone, Copy, Debug, Default, Display, EnumIter, Eq, PartialEq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Both,
}

impl OutputFormat {
    fn csv(&self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Both)
    }

    fn json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

/// Options for a run that take precedence over the input file
#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    pub output_format: OutputFormat,
    pub heat_pump_sizing_methodology: Option<HeatPumpSizingMethodology>,
    pub heat_pump_backup_sizing_methodology: Option<HeatPumpBackupSizingMethodology>,
    pub allow_increased_fixed_capacities: bool,
}

impl RunOptions {
    fn apply(&self, input: &mut InputForProcessing) {
        if let Some(methodology) = self.heat_pump_sizing_methodology {
            input.set_heat_pump_sizing_methodology(methodology);
        }
        if let Some(methodology) = self.heat_pump_backup_sizing_methodology {
            input.set_heat_pump_backup_sizing_methodology(methodology);
        }
        if self.allow_increased_fixed_capacities {
            input.set_allow_increased_fixed_capacities(true);
        }
    }
}

/// Calculate design loads and size equipment for one building, writing
/// reports to `output`.
#[instrument(skip_all)]
pub fn run_project(
    input: impl Read,
    output: impl Output,
    options: &RunOptions,
) -> Result<SizingResults, HvacSizingError> {
    let mut input_for_processing = ingest_for_processing(input)?;
    options.apply(&mut input_for_processing);
    input_for_processing.validate()?;
    let input = input_for_processing.finalize();

    let results = SizingModel::from_inputs(input)
        .and_then(|model| model.run())
        .map_err(SizingCoreError::new)?;

    if !output.is_noop() {
        write_reports(&output, &results, options.output_format)
            .map_err(|error| HvacSizingError::ErrorInPostprocessing(PostprocessingError::new(error)))?;
    }

    Ok(results)
}

fn write_reports(output: &impl Output, results: &SizingResults, format: OutputFormat) -> anyhow::Result<()> {
    let report = SizingReport::from(results);

    if format.csv() {
        debug!("Writing CSV reports");
        write_design_loads_csv(output.writer_for_location_key("design_loads", "csv")?, &report.design_loads)?;
        write_capacities_csv(output.writer_for_location_key("hvac_capacities", "csv")?, &report.hvac_capacities)?;
        if let Some(geothermal_loop) = &report.geothermal_loop {
            write_geothermal_loop_csv(output.writer_for_location_key("geothermal_loop", "csv")?, geothermal_loop)?;
        }
    }
    if format.json() {
        debug!("Writing JSON report");
        write_json(output.writer_for_location_key("results", "json")?, &report)?;
    }

    Ok(())
}
