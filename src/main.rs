extern crate iso_hourly;

use anyhow::Context;
use clap::Parser;
use iso_hourly::output::FileOutput;
use iso_hourly::read_weather_file::weather_data_from_epw;
use iso_hourly::diagnostics::{NoopDiagnostics, TracingDiagnostics};
use iso_hourly::run_project_with_diagnostics;
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct IsoHourlyArgs {
    /// Path to the building input in JSON format
    input_file: String,
    #[arg(long, short, help = "Path to weather file in .epw format")]
    epw_file: String,
    #[arg(
        long,
        short,
        help = "Directory for result files (defaults to <input file stem>__results)"
    )]
    output_dir: Option<PathBuf>,
    #[arg(long, default_value_t = false, help = "Also write a CSV row per simulated hour")]
    hourly: bool,
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = IsoHourlyArgs::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let input_file = args.input_file.as_str();
    let input_file_ext = Path::new(input_file).extension().and_then(OsStr::to_str);
    let input_file_stem = match input_file_ext {
        Some(ext) => &input_file[..(input_file.len() - ext.len() - 1)],
        None => input_file,
    };
    let input_file_name = Path::new(input_file_stem)
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("building");

    let output_path = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(format!("{input_file_stem}__results")));
    fs::create_dir_all(&output_path)?;
    let file_output = FileOutput::new(output_path, format!("{input_file_name}__{{}}.csv"));

    let weather = weather_data_from_epw(BufReader::new(
        File::open(&args.epw_file)
            .with_context(|| format!("Could not open weather file {}", args.epw_file))?,
    ))?;

    let input = BufReader::new(File::open(Path::new(input_file))?);
    let results = if args.verbose {
        run_project_with_diagnostics(
            input,
            &file_output,
            Some(weather),
            args.hourly,
            &TracingDiagnostics,
        )?
    } else {
        run_project_with_diagnostics(
            input,
            &file_output,
            Some(weather),
            args.hourly,
            &NoopDiagnostics,
        )?
    };

    println!(
        "Annual energy use intensity: {:.2} kWh/m2",
        results.energy_use_intensity()
    );

    Ok(())
}
