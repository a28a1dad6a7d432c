use crate::errors::IsoModelError;
use crate::external_conditions::tests::{chicago, synthetic_weather};
use crate::external_conditions::Location;
use crate::input::tests::small_office_json;
use crate::output::tests::MemoryOutput;
use crate::output::{SinkOutput, HOURLY_RESULTS_KEY, MONTHLY_RESULTS_KEY};
use crate::diagnostics::TracingDiagnostics;
use crate::{run_project, run_project_with_diagnostics};
use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::json;

#[rstest]
fn should_write_monthly_results() {
    let output = MemoryOutput::default();
    let input = small_office_json().to_string();

    let results = run_project(
        input.as_bytes(),
        &output,
        Some(synthetic_weather(chicago())),
        false,
    )
    .unwrap();

    let monthly = output.contents(MONTHLY_RESULTS_KEY).unwrap();
    assert_eq!(monthly.lines().count(), 15);
    assert!(monthly.lines().last().unwrap().starts_with("Annual,"));
    assert!(output.contents(HOURLY_RESULTS_KEY).is_none());
    assert!(results.energy_use_intensity() > 0.);
}

#[rstest]
fn should_write_hourly_results_on_request() {
    let output = MemoryOutput::default();
    let input = small_office_json().to_string();

    run_project(
        input.as_bytes(),
        &output,
        Some(synthetic_weather(chicago())),
        true,
    )
    .unwrap();

    let hourly = output.contents(HOURLY_RESULTS_KEY).unwrap();
    // headings, units and one row per hour
    assert_eq!(hourly.lines().count(), 8762);
}

#[rstest]
fn tracing_run_should_still_write_hourly_results() {
    let output = MemoryOutput::default();
    let input = small_office_json().to_string();

    let traced = run_project_with_diagnostics(
        input.as_bytes(),
        &output,
        Some(synthetic_weather(chicago())),
        true,
        &TracingDiagnostics,
    )
    .unwrap();
    let plain = run_project(
        input.as_bytes(),
        SinkOutput,
        Some(synthetic_weather(chicago())),
        false,
    )
    .unwrap();

    assert_eq!(output.contents(HOURLY_RESULTS_KEY).unwrap().lines().count(), 8762);
    assert_eq!(traced, plain);
}

#[rstest]
fn zero_floor_area_should_give_finite_monthly_results() {
    let mut value = small_office_json();
    value["Structure"]["floor_area"] = json!(0.0);

    let results = run_project(
        value.to_string().as_bytes(),
        SinkOutput,
        Some(synthetic_weather(chicago())),
        false,
    )
    .unwrap();

    assert_eq!(results.monthly.len(), 12);
    for (month_idx, end_uses) in results.monthly.iter().enumerate() {
        for (fuel, category, value) in end_uses.iter() {
            assert!(
                value.is_finite(),
                "{fuel} {category} is not finite in month {month_idx}"
            );
        }
    }
    assert!(results.annual_heating_need.is_finite());
    assert!(results.annual_cooling_need.is_finite());
}

#[rstest]
fn should_reject_invalid_input_before_simulating() {
    let mut value = small_office_json();
    value["Structure"]["floor_area"] = json!(-1.0);

    let result = run_project(
        value.to_string().as_bytes(),
        SinkOutput,
        Some(synthetic_weather(chicago())),
        false,
    );

    assert!(matches!(result, Err(IsoModelError::InvalidRequest(_))));
}

#[rstest]
fn should_reject_unparseable_input() {
    let result = run_project(
        "{ not json".as_bytes(),
        SinkOutput,
        Some(synthetic_weather(chicago())),
        false,
    );

    assert!(matches!(result, Err(IsoModelError::InvalidRequest(_))));
}

#[rstest]
fn should_require_weather() {
    let input = small_office_json().to_string();

    let result = run_project(input.as_bytes(), SinkOutput, None, false);

    assert!(matches!(result, Err(IsoModelError::InvalidWeather(_))));
}

#[rstest]
fn input_location_should_override_weather_location() {
    let southern = Location {
        latitude: -33.95,
        longitude: 151.18,
        timezone: 10.,
    };
    let mut value = small_office_json();
    value["Location"] = json!({
        "latitude": southern.latitude,
        "longitude": southern.longitude,
        "timezone": southern.timezone
    });

    let from_input = run_project(
        value.to_string().as_bytes(),
        SinkOutput,
        Some(synthetic_weather(chicago())),
        false,
    )
    .unwrap();
    let from_weather = run_project(
        value.to_string().as_bytes(),
        SinkOutput,
        Some(synthetic_weather(southern)),
        false,
    )
    .unwrap();

    assert_relative_eq!(
        from_input.energy_use_intensity(),
        from_weather.energy_use_intensity()
    );
}
