use crate::core::end_uses::{EndUseCategory, FuelType};
use crate::core::units::{watt_hours_to_kilowatt_hours, HOURS_PER_YEAR};
use crate::diagnostics::RecordingDiagnostics;
use crate::external_conditions::tests::{chicago, synthetic_weather};
use crate::external_conditions::{ExternalConditions, WeatherData};
use crate::input::tests::{input_from, small_office_json};
use crate::input::Input;
use crate::simulation_time::TimeFrame;
use crate::{simulate, simulate_many, simulate_with_diagnostics};
use approx::{assert_abs_diff_eq, assert_relative_eq};
use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::{json, Value};

#[fixture]
fn external_conditions() -> ExternalConditions {
    ExternalConditions::new(synthetic_weather(chicago()))
}

#[fixture]
fn office_json() -> Value {
    small_office_json()
}

#[fixture]
fn office(office_json: Value) -> Input {
    input_from(&office_json).unwrap()
}

fn recorded_run(input: &Input, external_conditions: &ExternalConditions) -> RecordingDiagnostics {
    let recording = RecordingDiagnostics::new();
    simulate_with_diagnostics(input, external_conditions, &recording).unwrap();
    recording
}

#[rstest]
fn should_give_twelve_months(office: Input, external_conditions: ExternalConditions) {
    let results = simulate(&office, &external_conditions).unwrap();

    assert_eq!(results.monthly.len(), 12);
    assert!(results.energy_use_intensity() > 0.);
}

#[rstest]
fn repeated_runs_should_be_identical(office: Input, external_conditions: ExternalConditions) {
    let first = simulate(&office, &external_conditions).unwrap();
    let second = simulate(&office, &external_conditions).unwrap();

    assert_eq!(first, second);
}

#[rstest]
fn hourly_needs_should_be_non_negative_and_exclusive(
    office: Input,
    external_conditions: ExternalConditions,
) {
    let hours = recorded_run(&office, &external_conditions).hours();

    assert_eq!(hours.len(), HOURS_PER_YEAR);
    for (hour, result) in hours.iter().enumerate() {
        assert!(result.heating_need >= 0., "negative heating at hour {hour}");
        assert!(result.cooling_need >= 0., "negative cooling at hour {hour}");
        assert!(
            result.heating_need == 0. || result.cooling_need == 0.,
            "simultaneous heating and cooling at hour {hour}"
        );
        assert!(result.fans >= 0.);
        assert!(result.pumps >= 0.);
    }
}

#[rstest]
fn synthetic_year_should_need_both_heating_and_cooling(
    office: Input,
    external_conditions: ExternalConditions,
) {
    let results = simulate(&office, &external_conditions).unwrap();

    assert!(results.annual_heating_need > 0.);
    assert!(results.annual_cooling_need > 0.);

    let january = &results.monthly[0];
    let july = &results.monthly[6];
    assert!(
        january.get(FuelType::Gas, EndUseCategory::Heating)
            > july.get(FuelType::Gas, EndUseCategory::Heating)
    );
    assert!(
        july.get(FuelType::Electricity, EndUseCategory::Cooling)
            > january.get(FuelType::Electricity, EndUseCategory::Cooling)
    );
}

#[rstest]
fn monthly_heating_should_equal_the_sum_of_its_hours(
    office: Input,
    external_conditions: ExternalConditions,
) {
    let recording = RecordingDiagnostics::new();
    let results = simulate_with_diagnostics(&office, &external_conditions, &recording).unwrap();
    let hours = recording.hours();
    let efficiency = results.distribution_efficiencies.heating * office.heating.efficiency;

    for (month_idx, end_uses) in results.monthly.iter().enumerate() {
        let (start, end) = TimeFrame::month_start_end_hours(month_idx);
        let expected = hours[start..end]
            .iter()
            .map(|h| watt_hours_to_kilowatt_hours(h.heating_need / efficiency))
            .sum::<f64>();

        assert_relative_eq!(
            end_uses.get(FuelType::Gas, EndUseCategory::Heating),
            expected,
            max_relative = 1e-9
        );
    }

    assert_relative_eq!(
        hours.iter().map(|h| h.heating_need).sum::<f64>(),
        results.annual_heating_need
    );
}

#[rstest]
fn heating_should_follow_the_configured_fuel(
    mut office_json: Value,
    external_conditions: ExternalConditions,
) {
    let gas = simulate(&input_from(&office_json).unwrap(), &external_conditions).unwrap();
    office_json["Heating"]["fuel_type"] = json!("electric");
    let electric = simulate(&input_from(&office_json).unwrap(), &external_conditions).unwrap();

    let gas_annual = gas.annual();
    let electric_annual = electric.annual();

    assert_eq!(gas_annual.get(FuelType::Electricity, EndUseCategory::Heating), 0.);
    assert_eq!(electric_annual.get(FuelType::Gas, EndUseCategory::Heating), 0.);
    assert_relative_eq!(
        gas_annual.get(FuelType::Gas, EndUseCategory::Heating),
        electric_annual.get(FuelType::Electricity, EndUseCategory::Heating)
    );
    assert_eq!(electric_annual.total_for_fuel(FuelType::Gas), 0.);
}

#[rstest]
fn hot_water_should_be_routed_to_its_own_fuel(
    mut office_json: Value,
    external_conditions: ExternalConditions,
) {
    office_json["Heating"]["hot_water_demand"] = json!(100.0);
    office_json["Heating"]["hot_water_fuel_type"] = json!("gas");
    let results = simulate(&input_from(&office_json).unwrap(), &external_conditions).unwrap();
    let annual = results.annual();

    // 100 m3 heated by 40K at 4.1813 MJ/(m3.K), over 500 m2
    let expected = 100. * 40. * 4.1813 / 3.6 / 500.;
    assert_relative_eq!(
        annual.get(FuelType::Gas, EndUseCategory::WaterSystems),
        expected,
        max_relative = 1e-6
    );
    assert_eq!(annual.get(FuelType::Electricity, EndUseCategory::WaterSystems), 0.);
}

/// Everything at 20C, no sun and no internal gains.
fn still_building_json() -> Value {
    let mut value = small_office_json();
    value["Heating"]["setpoint_occupied"] = json!(20.0);
    value["Heating"]["setpoint_unoccupied"] = json!(20.0);
    value["Cooling"]["setpoint_occupied"] = json!(26.0);
    value["Cooling"]["setpoint_unoccupied"] = json!(26.0);
    value["Ventilation"]["supply_rate"] = json!(0.0);
    value["Lighting"]["power_density_occupied"] = json!(0.0);
    value["Lighting"]["power_density_unoccupied"] = json!(0.0);
    value["Building"]["electric_appliance_occupied"] = json!(0.0);
    value["Building"]["electric_appliance_unoccupied"] = json!(0.0);
    value
}

fn still_weather() -> WeatherData {
    WeatherData::new(
        chicago(),
        vec![20.; 8760],
        vec![10.; 8760],
        vec![50.; 8760],
        vec![0.; 8760],
        vec![0.; 8760],
        vec![0.; 8760],
        vec![0.; 8760],
    )
    .unwrap()
}

#[rstest]
fn zone_at_setpoint_without_gains_should_need_no_heating() {
    let input = input_from(&still_building_json()).unwrap();
    let external_conditions = ExternalConditions::new(still_weather());

    let hours = recorded_run(&input, &external_conditions).hours();

    for result in hours {
        assert_abs_diff_eq!(result.heating_need, 0., epsilon = 1e-6);
        assert_eq!(result.cooling_need, 0.);
        assert_abs_diff_eq!(result.temp_air, 20., epsilon = 1e-6);
        assert_abs_diff_eq!(result.temp_mass, 20., epsilon = 1e-6);
    }
}

#[rstest]
fn exterior_lighting_should_only_run_without_sun(
    office: Input,
    external_conditions: ExternalConditions,
) {
    let hours = recorded_run(&office, &external_conditions).hours();
    let irradiance = external_conditions.irradiance();

    for (hour, result) in hours.iter().enumerate() {
        let roof = irradiance.value(hour, crate::core::surface::Surface::Roof);
        if roof > 0. {
            assert_eq!(result.exterior_lighting, 0.);
        } else {
            // 1000 W over 500 m2
            assert_relative_eq!(result.exterior_lighting, 2.);
        }
    }
}

#[rstest]
fn peak_setback_should_reduce_heating(
    mut office_json: Value,
    external_conditions: ExternalConditions,
) {
    let baseline = simulate(&input_from(&office_json).unwrap(), &external_conditions).unwrap();

    office_json["Schedule"] = json!({
        "price_responsive": {
            "peak_hour_start": 8,
            "peak_hour_end": 17,
            "peak_day_start": 1,
            "peak_day_end": 5,
            "heating_setback": 3.0
        }
    });
    let responsive = simulate(&input_from(&office_json).unwrap(), &external_conditions).unwrap();

    assert!(responsive.annual_heating_need < baseline.annual_heating_need);
}

#[rstest]
fn peak_setup_should_reduce_cooling(
    mut office_json: Value,
    external_conditions: ExternalConditions,
) {
    let baseline = simulate(&input_from(&office_json).unwrap(), &external_conditions).unwrap();

    office_json["Schedule"] = json!({
        "price_responsive": {
            "peak_hour_start": 12,
            "peak_hour_end": 17,
            "cooling_setup": 2.0
        }
    });
    let responsive = simulate(&input_from(&office_json).unwrap(), &external_conditions).unwrap();

    assert!(responsive.annual_cooling_need < baseline.annual_cooling_need);
}

#[rstest]
fn external_schedule_should_replace_equipment(
    mut office_json: Value,
    external_conditions: ExternalConditions,
) {
    office_json["Schedule"] = json!({
        "external": {
            "interior_equipment": vec![vec![5.0; 7]; 24]
        }
    });
    let input = input_from(&office_json).unwrap();

    let hours = recorded_run(&input, &external_conditions).hours();

    assert!(hours.iter().all(|h| h.interior_equipment == 5.));
}

#[rstest]
fn malformed_external_schedule_should_fail_before_the_run(
    mut office_json: Value,
    external_conditions: ExternalConditions,
) {
    office_json["Schedule"] = json!({
        "external": {
            "heating_setpoint": vec![vec![20.0; 7]; 23]
        }
    });
    let input = input_from(&office_json).unwrap();

    let result = simulate(&input, &external_conditions);

    assert!(matches!(
        result,
        Err(crate::errors::IsoModelError::FailureInCalculation(_))
    ));
}

#[rstest]
fn parallel_runs_should_match_sequential_runs(
    mut office_json: Value,
    external_conditions: ExternalConditions,
) {
    let mut inputs = vec![input_from(&office_json).unwrap()];
    office_json["Structure"]["floor_area"] = json!(800.0);
    inputs.push(input_from(&office_json).unwrap());
    office_json["Heating"]["fuel_type"] = json!("electric");
    inputs.push(input_from(&office_json).unwrap());

    let parallel = simulate_many(&inputs, &external_conditions);

    assert_eq!(parallel.len(), 3);
    for (input, result) in inputs.iter().zip(parallel) {
        assert_eq!(
            result.unwrap(),
            simulate(input, &external_conditions).unwrap()
        );
    }
}

#[rstest]
fn recording_should_capture_network_constants(
    office: Input,
    external_conditions: ExternalConditions,
) {
    let recording = recorded_run(&office, &external_conditions);

    let constants = recording.constants().unwrap();
    assert_relative_eq!(constants.cm, 160.);
}
