#![allow(clippy::too_many_arguments)]

mod compare_floats;
pub mod core;
pub mod corpus;
pub mod diagnostics;
pub mod errors;
pub mod external_conditions;
pub mod input;
pub mod output;
pub mod read_weather_file;
pub mod simulation_time;
pub mod solar_radiation;
#[cfg(test)]
mod tests;

pub use crate::corpus::RunResults;
use crate::corpus::Corpus;
use crate::diagnostics::{DiagnosticsSink, NoopDiagnostics, RecordingDiagnostics};
pub use crate::errors::IsoModelError;
use crate::errors::{OutputError, SimulationCoreError, WeatherDataError};
pub use crate::external_conditions::{ExternalConditions, ExternalConditionsCache, WeatherData};
use crate::input::{ingest_for_processing, Input};
use crate::output::{write_hourly_results, write_monthly_results, Output};
use anyhow::anyhow;
use rayon::prelude::*;
use std::io::Read;
use tracing::info;

/// Read a building input, simulate a year against the given weather and write the monthly
/// results (and optionally the hourly records) to `output`.
///
/// Arguments:
/// * `input` - building input as JSON
/// * `output` - where results are written
/// * `weather` - hourly weather for the site; a location in the building input overrides the
///               one carried by the weather
/// * `write_hourly` - whether to also write one row per simulated hour
pub fn run_project(
    input: impl Read,
    output: impl Output,
    weather: Option<WeatherData>,
    write_hourly: bool,
) -> Result<RunResults, IsoModelError> {
    run_project_with_diagnostics(input, output, weather, write_hourly, &NoopDiagnostics)
}

/// As [`run_project`], also reporting intermediate values to `diagnostics`.
pub fn run_project_with_diagnostics(
    input: impl Read,
    output: impl Output,
    weather: Option<WeatherData>,
    write_hourly: bool,
    diagnostics: &impl DiagnosticsSink,
) -> Result<RunResults, IsoModelError> {
    let input = ingest_for_processing(input)?;
    info!("building input ingested and validated");

    let mut weather = weather.ok_or_else(|| {
        IsoModelError::InvalidWeather(WeatherDataError::new(anyhow!(
            "No weather data was provided for the simulation"
        )))
    })?;
    if let Some(location) = input.location {
        weather = weather.with_location(location)?;
    }

    let external_conditions = ExternalConditions::new(weather);
    info!(
        location = ?external_conditions.weather().location(),
        "irradiance table computed"
    );

    let results = if write_hourly {
        let recording = RecordingDiagnostics::new();
        let results =
            simulate_with_diagnostics(&input, &external_conditions, &(&recording, diagnostics))?;
        write_hourly_results(&output, &recording.hours())
            .map_err(|err| IsoModelError::Output(OutputError::new(err)))?;
        results
    } else {
        simulate_with_diagnostics(&input, &external_conditions, diagnostics)?
    };

    write_monthly_results(&output, &results)
        .map_err(|err| IsoModelError::Output(OutputError::new(err)))?;

    Ok(results)
}

/// Simulate one building for a year.
pub fn simulate(
    input: &Input,
    external_conditions: &ExternalConditions,
) -> Result<RunResults, IsoModelError> {
    simulate_with_diagnostics(input, external_conditions, &NoopDiagnostics)
}

/// Simulate one building for a year, reporting intermediate values to `diagnostics`.
pub fn simulate_with_diagnostics(
    input: &Input,
    external_conditions: &ExternalConditions,
    diagnostics: &impl DiagnosticsSink,
) -> Result<RunResults, IsoModelError> {
    let corpus =
        Corpus::from_inputs(input, external_conditions).map_err(SimulationCoreError::new)?;

    Ok(corpus.run(diagnostics))
}

/// Simulate several independent buildings at the same site in parallel. Results are in the
/// same order as `inputs`.
pub fn simulate_many(
    inputs: &[Input],
    external_conditions: &ExternalConditions,
) -> Vec<Result<RunResults, IsoModelError>> {
    info!(buildings = inputs.len(), "simulating buildings in parallel");

    inputs
        .par_iter()
        .map(|input| simulate(input, external_conditions))
        .collect()
}
