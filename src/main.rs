extern crate hvac_sizing;

use clap::Parser;
use hvac_sizing::input::{HeatPumpBackupSizingMethodology, HeatPumpSizingMethodology};
use hvac_sizing::output::FileOutput;
use hvac_sizing::{run_project, OutputFormat, RunOptions};
use rayon::prelude::*;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct SizingArgs {
    #[arg(required = true, help = "Building description files in .json format")]
    input_files: Vec<String>,
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Csv, help = "Format of the reports")]
    output_format: OutputFormat,
    #[arg(
        long,
        short = 'd',
        help = "Directory for reports; defaults to a directory next to each input file"
    )]
    output_dir: Option<PathBuf>,
    #[arg(long, value_enum, help = "Override the heat pump sizing methodology of the input")]
    heat_pump_sizing_methodology: Option<HeatPumpSizingMethodology>,
    #[arg(long, value_enum, help = "Override the heat pump backup sizing methodology of the input")]
    heat_pump_backup_sizing_methodology: Option<HeatPumpBackupSizingMethodology>,
    #[clap(
        long,
        default_value_t = false,
        help = "Allow fixed capacities to be increased to meet design loads"
    )]
    allow_increased_fixed_capacities: bool,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
}

fn main() -> anyhow::Result<()> {
    let args = SizingArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(tracing::Level::DEBUG);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let options = RunOptions {
        output_format: args.output_format,
        heat_pump_sizing_methodology: args.heat_pump_sizing_methodology,
        heat_pump_backup_sizing_methodology: args.heat_pump_backup_sizing_methodology,
        allow_increased_fixed_capacities: args.allow_increased_fixed_capacities,
    };

    let failures = args
        .input_files
        .par_iter()
        .filter_map(|input_file| {
            run_input_file(input_file, args.output_dir.as_deref(), &options)
                .map_err(|error| {
                    error!("Sizing {input_file} failed: {error:#}");
                    input_file.as_str()
                })
                .err()
        })
        .collect::<Vec<_>>();

    if !failures.is_empty() {
        anyhow::bail!("Sizing failed for {}", failures.join(", "));
    }

    Ok(())
}

fn run_input_file(input_file: &str, output_dir: Option<&Path>, options: &RunOptions) -> anyhow::Result<()> {
    let input_path = Path::new(input_file);
    let input_file_stem = input_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| anyhow::anyhow!("{input_file} has no file name"))?;

    let output_path = match output_dir {
        Some(directory) => directory.to_path_buf(),
        None => input_path.with_file_name(format!("{input_file_stem}__results")),
    };
    fs::create_dir_all(&output_path)?;
    let file_output = FileOutput::new(output_path, format!("{input_file_stem}__{{}}.{{}}"));

    let results = run_project(BufReader::new(File::open(input_path)?), &file_output, options)?;

    for warning in &results.warnings {
        warn!("{input_file}: {warning}");
    }
    let total = results.loads.total();
    info!(
        "{input_file}: heating {:.0} Btu/h, cooling {:.0} Btu/h sensible and {:.0} Btu/h latent",
        total.heating, total.cooling_sensible, total.cooling_latent
    );

    Ok(())
}
