use crate::compare_floats::max_of_2;
use crate::core::surface::{PerSurface, SurfaceOrder, SURFACE_COUNT};
use crate::external_conditions::Location;
use anyhow::{anyhow, bail};
use serde::Deserialize;
use serde_valid::Validate;
use std::io::{BufReader, Read};

/// Parse, validate and normalise a building description.
///
/// Every configuration error is reported here, before any simulation work starts.
pub fn ingest_for_processing(json: impl Read) -> anyhow::Result<Input> {
    let mut input: Input = serde_json::from_reader(BufReader::new(json))
        .map_err(|err| anyhow!("Building input could not be parsed: {err}"))?;
    input
        .validate()
        .map_err(|err| anyhow!("Building input failed validation: {err}"))?;
    input
        .check_consistency()
        .map_err(|err| anyhow!("Building input failed validation: {err}"))?;
    input.normalise_surface_order();
    Ok(input)
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Input {
    /// Order of the per-surface arrays in this document
    #[serde(default)]
    pub surface_order: SurfaceOrder,
    #[validate]
    pub structure: Structure,
    #[validate]
    pub heating: Heating,
    #[validate]
    pub cooling: Cooling,
    #[validate]
    pub ventilation: Ventilation,
    #[validate]
    pub lighting: Lighting,
    #[validate]
    pub building: Building,
    #[validate]
    pub population: Population,
    #[serde(default)]
    #[validate]
    pub simulation_settings: SimulationSettings,
    #[serde(default)]
    #[validate]
    pub physical_quantities: PhysicalQuantities,
    /// Overrides the location read from the weather file header
    pub location: Option<Location>,
    pub schedule: Option<ScheduleInput>,
}

impl Input {
    /// Checks spanning more than one field.
    fn check_consistency(&self) -> anyhow::Result<()> {
        let heating = &self.heating;
        if heating.hot_water_set_temperature < heating.hot_water_supply_temperature {
            bail!(
                "hot_water_set_temperature ({}) is below hot_water_supply_temperature ({})",
                heating.hot_water_set_temperature,
                heating.hot_water_supply_temperature
            );
        }
        if let Some(location) = &self.location {
            location.check_range()?;
        }
        Ok(())
    }

    fn normalise_surface_order(&mut self) {
        let order = self.surface_order;
        let structure = &mut self.structure;
        for values in [
            &mut structure.wall_area,
            &mut structure.wall_u_value,
            &mut structure.wall_solar_absorption,
            &mut structure.window_area,
            &mut structure.window_u_value,
            &mut structure.window_shgc,
            &mut structure.window_scf,
            &mut structure.window_sdf,
        ] {
            values.0 = order.to_surface_order(values.0);
        }
        self.surface_order = SurfaceOrder::SouthFirst;
    }
}

/// Nine non-negative values, one per envelope surface.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(try_from = "Vec<f64>")]
pub struct SurfaceValues(PerSurface<f64>);

impl SurfaceValues {
    pub fn values(&self) -> &PerSurface<f64> {
        &self.0
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl From<PerSurface<f64>> for SurfaceValues {
    fn from(values: PerSurface<f64>) -> Self {
        Self(values)
    }
}

impl TryFrom<Vec<f64>> for SurfaceValues {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        let len = values.len();
        let values: PerSurface<f64> = values.try_into().map_err(|_| {
            format!("expected {SURFACE_COUNT} values (one per surface), found {len}")
        })?;
        if let Some(value) = values.iter().find(|v| !v.is_finite() || **v < 0.) {
            return Err(format!("surface values must be non-negative, found {value}"));
        }
        Ok(Self(values))
    }
}

/// Building envelope and thermal mass
///
/// Arguments:
/// * `floor_area` - conditioned floor area, in m2
/// * `building_height` - in m
/// * `interior_heat_capacity` - areal heat capacity of interior mass, in J/(m2.K) of floor area
/// * `wall_heat_capacity` - areal heat capacity of the envelope walls, in J/(m2.K) of wall area
/// * `total_area_per_floor_area` - ratio of internal surface area to floor area (ISO 13790 7.2.2.2)
/// * `r_se` - external surface thermal resistance, in (m2.K)/W
/// * `irradiance_for_max_shading_use` - irradiance at which movable shading is fully used, in W/m2
/// * `shading_factor_at_max_use` - fraction of movable shading in use at that irradiance
/// * `window_shgc` - normal-incidence solar energy transmittance without movable shading
/// * `window_scf` - solar factor with movable shading in use
/// * `window_sdf` - shading device factor, used for daylight transmittance
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Structure {
    #[validate(minimum = 0.)]
    pub floor_area: f64,
    #[validate(minimum = 0.)]
    pub building_height: f64,
    #[validate(minimum = 0.)]
    pub interior_heat_capacity: f64,
    #[validate(minimum = 0.)]
    pub wall_heat_capacity: f64,
    #[serde(default = "default_total_area_per_floor_area")]
    #[validate(exclusive_minimum = 0.)]
    pub total_area_per_floor_area: f64,
    #[serde(default = "default_r_se")]
    #[validate(minimum = 0.)]
    pub r_se: f64,
    #[serde(default = "default_irradiance_for_max_shading_use")]
    #[validate(exclusive_minimum = 0.)]
    pub irradiance_for_max_shading_use: f64,
    #[serde(default = "default_shading_factor_at_max_use")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub shading_factor_at_max_use: f64,
    pub wall_area: SurfaceValues,
    pub wall_u_value: SurfaceValues,
    pub wall_solar_absorption: SurfaceValues,
    pub window_area: SurfaceValues,
    pub window_u_value: SurfaceValues,
    pub window_shgc: SurfaceValues,
    pub window_scf: SurfaceValues,
    pub window_sdf: SurfaceValues,
}

/// Floor area used in place of a zero one, in m2
pub const MIN_FLOOR_AREA: f64 = 0.0001;

impl Structure {
    /// Floor area as used by the model; every per-m2 quantity divides by this.
    pub fn floor_area_for_calculation(&self) -> f64 {
        max_of_2(self.floor_area, MIN_FLOOR_AREA)
    }
}

fn default_total_area_per_floor_area() -> f64 {
    4.5
}

fn default_r_se() -> f64 {
    0.04
}

fn default_irradiance_for_max_shading_use() -> f64 {
    500.
}

fn default_shading_factor_at_max_use() -> f64 {
    0.5
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum EnergyCarrier {
    #[default]
    Electric,
    Gas,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Heating {
    pub setpoint_occupied: f64,
    pub setpoint_unoccupied: f64,
    #[validate(exclusive_minimum = 0.)]
    pub efficiency: f64,
    pub fuel_type: EnergyCarrier,
    #[validate(minimum = 0.)]
    pub hvac_loss_factor: f64,
    /// waste from simultaneous heating and cooling, applied to both distribution efficiencies
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub hot_cold_waste_factor: f64,
    #[validate(minimum = 0.)]
    pub pump_control_reduction: f64,
    #[serde(default = "default_true")]
    pub forced_air: bool,
    /// supply air temperature above the occupied setpoint, in K
    #[serde(default = "default_supply_temperature_difference")]
    #[validate(exclusive_minimum = 0.)]
    pub supply_temperature_difference: f64,
    /// pump power while heating, in W/m2
    #[serde(default = "default_pump_energy")]
    #[validate(minimum = 0.)]
    pub pump_energy: f64,
    /// in m3/yr
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub hot_water_demand: f64,
    #[serde(default = "default_one")]
    #[validate(exclusive_minimum = 0.)]
    pub hot_water_distribution_efficiency: f64,
    #[serde(default = "default_one")]
    #[validate(exclusive_minimum = 0.)]
    pub hot_water_system_efficiency: f64,
    #[serde(default)]
    pub hot_water_fuel_type: EnergyCarrier,
    #[serde(default = "default_hot_water_set_temperature")]
    pub hot_water_set_temperature: f64,
    #[serde(default = "default_hot_water_supply_temperature")]
    pub hot_water_supply_temperature: f64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Cooling {
    pub setpoint_occupied: f64,
    pub setpoint_unoccupied: f64,
    #[validate(exclusive_minimum = 0.)]
    pub cop: f64,
    #[validate(minimum = 0.)]
    pub hvac_loss_factor: f64,
    #[validate(minimum = 0.)]
    pub pump_control_reduction: f64,
    #[serde(default = "default_true")]
    pub forced_air: bool,
    /// supply air temperature below the occupied setpoint, in K
    #[serde(default = "default_supply_temperature_difference")]
    #[validate(exclusive_minimum = 0.)]
    pub supply_temperature_difference: f64,
    /// pump power while cooling, in W/m2
    #[serde(default = "default_pump_energy")]
    #[validate(minimum = 0.)]
    pub pump_energy: f64,
}

fn default_true() -> bool {
    true
}

fn default_one() -> f64 {
    1.
}

fn default_supply_temperature_difference() -> f64 {
    7.
}

fn default_pump_energy() -> f64 {
    0.25
}

fn default_hot_water_set_temperature() -> f64 {
    60.
}

fn default_hot_water_supply_temperature() -> f64 {
    20.
}

/// Mechanical ventilation and envelope air leakage
///
/// Arguments:
/// * `supply_rate` - ventilation rate while occupied, in L/s
/// * `heat_recovery_efficiency` - fraction of exhaust heat recovered
/// * `fan_power` - specific fan power, in W/(L/s)
/// * `fan_control_factor` - ratio of fan-supplied to exhausted air
/// * `n50` - air changes per hour at 50 Pa
/// * `wind_pressure_coefficient_difference` - dCp across the envelope (ISO 15242)
/// * `stack_height` - effective stack height for the stack-effect correlation, in m
/// * `preheat_temperature` - minimum supply air temperature, in Celsius
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Ventilation {
    #[validate(minimum = 0.)]
    pub supply_rate: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub heat_recovery_efficiency: f64,
    #[validate(minimum = 0.)]
    pub fan_power: f64,
    #[validate(minimum = 0.)]
    pub fan_control_factor: f64,
    #[serde(default = "default_n50")]
    #[validate(minimum = 0.)]
    pub n50: f64,
    #[serde(default = "default_wind_pressure_coefficient_difference")]
    #[validate(minimum = 0.)]
    pub wind_pressure_coefficient_difference: f64,
    #[serde(default = "default_stack_height")]
    pub stack_height: f64,
    #[serde(default = "default_preheat_temperature")]
    pub preheat_temperature: f64,
}

fn default_n50() -> f64 {
    2.
}

fn default_wind_pressure_coefficient_difference() -> f64 {
    0.75
}

fn default_stack_height() -> f64 {
    39.
}

fn default_preheat_temperature() -> f64 {
    -50.
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Lighting {
    /// in W/m2
    #[validate(minimum = 0.)]
    pub power_density_occupied: f64,
    /// in W/m2
    #[validate(minimum = 0.)]
    pub power_density_unoccupied: f64,
    /// daylight sensor dimming fraction; below 1 means daylight-linked control is fitted
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub dimming_fraction: f64,
    /// occupancy sensor dimming fraction; below 1 means presence detection is fitted
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub occupancy_sensor_fraction: f64,
    /// exterior lighting power, in W
    #[validate(minimum = 0.)]
    pub exterior_energy: f64,
    /// fraction of electric lighting that becomes an internal gain
    #[serde(default = "default_one")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub internal_gains_fraction: f64,
    /// in m2
    #[validate(minimum = 0.)]
    pub naturally_lighted_area: f64,
    #[serde(default)]
    pub controls: LightingControls,
}

/// Maximum electric lighting ratio and target illuminance for each control strategy.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LightingControls {
    pub presence_and_automatic: LightingControl,
    pub presence_sensor: LightingControl,
    pub automatic: LightingControl,
    pub manual_switch: LightingControl,
}

impl Default for LightingControls {
    fn default() -> Self {
        Self {
            presence_and_automatic: LightingControl::new(0.6, 300.),
            presence_sensor: LightingControl::new(0.6, 500.),
            automatic: LightingControl::new(0.8, 300.),
            manual_switch: LightingControl::new(1.0, 500.),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LightingControl {
    pub max_electric_ratio: f64,
    /// in lux
    pub illuminance: f64,
}

impl LightingControl {
    pub fn new(max_electric_ratio: f64, illuminance: f64) -> Self {
        Self {
            max_electric_ratio,
            illuminance,
        }
    }
}

/// Plug loads
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Building {
    /// in W/m2
    #[validate(minimum = 0.)]
    pub electric_appliance_occupied: f64,
    /// in W/m2
    #[validate(minimum = 0.)]
    pub electric_appliance_unoccupied: f64,
    /// in W
    #[validate(minimum = 0.)]
    pub external_equipment: f64,
}

/// Occupied period: hours and days are inclusive at both ends. Days count from 0 (the first day
/// of the year) to 6.
#[derive(Clone, Copy, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Population {
    #[validate(maximum = 23)]
    pub hour_start: u32,
    #[validate(maximum = 23)]
    pub hour_end: u32,
    #[validate(maximum = 6)]
    pub day_start: u32,
    #[validate(maximum = 6)]
    pub day_end: u32,
}

#[derive(Clone, Copy, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimulationSettings {
    // (Default value of 0.5 from ISO 13790 C.2 eq C.1)
    #[serde(default = "default_internal_gains_fraction_to_air")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub internal_gains_fraction_to_air: f64,
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub solar_gains_fraction_to_air: f64,
    /// convective heat transfer coefficient, in W/(m2.K)
    #[serde(default = "default_hci")]
    #[validate(exclusive_minimum = 0.)]
    pub hci: f64,
    /// radiative heat transfer coefficient, in W/(m2.K)
    #[serde(default = "default_hri")]
    #[validate(exclusive_minimum = 0.)]
    pub hri: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            internal_gains_fraction_to_air: default_internal_gains_fraction_to_air(),
            solar_gains_fraction_to_air: 0.,
            hci: default_hci(),
            hri: default_hri(),
        }
    }
}

fn default_internal_gains_fraction_to_air() -> f64 {
    0.5
}

fn default_hci() -> f64 {
    2.5
}

fn default_hri() -> f64 {
    5.5
}

#[derive(Clone, Copy, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PhysicalQuantities {
    /// volumetric heat capacity of air, in MJ/(m3.K)
    #[serde(default = "default_rho_cp_air")]
    #[validate(exclusive_minimum = 0.)]
    pub rho_cp_air: f64,
    /// volumetric heat capacity of water, in MJ/(m3.K)
    #[serde(default = "default_rho_cp_water")]
    #[validate(exclusive_minimum = 0.)]
    pub rho_cp_water: f64,
}

impl Default for PhysicalQuantities {
    fn default() -> Self {
        Self {
            rho_cp_air: default_rho_cp_air(),
            rho_cp_water: default_rho_cp_water(),
        }
    }
}

fn default_rho_cp_air() -> f64 {
    // rho = 1.22521 kg/m3, cp = 1.012 kJ/(kg.K)
    1.22521 * 0.001012
}

fn default_rho_cp_water() -> f64 {
    4.1813
}

/// Replacement schedules. Without this section, schedules are derived from the occupied period.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum ScheduleInput {
    PriceResponsive(PriceResponsiveInput),
    External(ExternalScheduleInput),
}

/// Setpoint setback during peak-price hours (inclusive at both ends).
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PriceResponsiveInput {
    pub peak_hour_start: u32,
    pub peak_hour_end: u32,
    #[serde(default)]
    pub peak_day_start: u32,
    #[serde(default = "default_last_day")]
    pub peak_day_end: u32,
    /// reduction applied to the heating setpoint during peak hours, in K
    #[serde(default)]
    pub heating_setback: f64,
    /// increase applied to the cooling setpoint during peak hours, in K
    #[serde(default)]
    pub cooling_setup: f64,
}

fn default_last_day() -> u32 {
    6
}

/// 24 rows (hour of day) of 7 values (day of week)
pub type WeeklyTableInput = Vec<Vec<f64>>;

/// Caller-supplied weekly tables; any channel left out keeps its occupancy-derived schedule.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalScheduleInput {
    /// in L/s
    pub ventilation: Option<WeeklyTableInput>,
    /// in W/m2
    pub interior_equipment: Option<WeeklyTableInput>,
    /// in W
    pub exterior_equipment: Option<WeeklyTableInput>,
    /// in W/m2
    pub interior_lighting: Option<WeeklyTableInput>,
    /// 0 to 1
    pub exterior_lighting: Option<WeeklyTableInput>,
    /// in Celsius
    pub heating_setpoint: Option<WeeklyTableInput>,
    /// in Celsius
    pub cooling_setpoint: Option<WeeklyTableInput>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::{json, Value};

    /// A 500 m2 two-storey office
    pub(crate) fn small_office_json() -> Value {
        json!({
            "Structure": {
                "floor_area": 500.0,
                "building_height": 6.0,
                "interior_heat_capacity": 70000.0,
                "wall_heat_capacity": 100000.0,
                "wall_area": [60.0, 0.0, 40.0, 0.0, 60.0, 0.0, 40.0, 0.0, 250.0],
                "wall_u_value": [0.35, 0.35, 0.35, 0.35, 0.35, 0.35, 0.35, 0.35, 0.2],
                "wall_solar_absorption": [0.6, 0.6, 0.6, 0.6, 0.6, 0.6, 0.6, 0.6, 0.7],
                "window_area": [30.0, 0.0, 15.0, 0.0, 20.0, 0.0, 15.0, 0.0, 0.0],
                "window_u_value": [2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0],
                "window_shgc": [0.4, 0.4, 0.4, 0.4, 0.4, 0.4, 0.4, 0.4, 0.4],
                "window_scf": [0.2, 0.2, 0.2, 0.2, 0.2, 0.2, 0.2, 0.2, 0.2],
                "window_sdf": [0.6, 0.6, 0.6, 0.6, 0.6, 0.6, 0.6, 0.6, 0.6]
            },
            "Heating": {
                "setpoint_occupied": 21.0,
                "setpoint_unoccupied": 15.0,
                "efficiency": 0.85,
                "fuel_type": "gas",
                "hvac_loss_factor": 0.1,
                "hot_cold_waste_factor": 0.05,
                "pump_control_reduction": 0.5
            },
            "Cooling": {
                "setpoint_occupied": 24.0,
                "setpoint_unoccupied": 28.0,
                "cop": 3.0,
                "hvac_loss_factor": 0.1,
                "pump_control_reduction": 0.5
            },
            "Ventilation": {
                "supply_rate": 500.0,
                "heat_recovery_efficiency": 0.0,
                "fan_power": 1.5,
                "fan_control_factor": 1.0
            },
            "Lighting": {
                "power_density_occupied": 10.0,
                "power_density_unoccupied": 1.0,
                "dimming_fraction": 1.0,
                "occupancy_sensor_fraction": 1.0,
                "exterior_energy": 1000.0,
                "naturally_lighted_area": 100.0
            },
            "Building": {
                "electric_appliance_occupied": 12.0,
                "electric_appliance_unoccupied": 2.0,
                "external_equipment": 200.0
            },
            "Population": {
                "hour_start": 8,
                "hour_end": 17,
                "day_start": 1,
                "day_end": 5
            }
        })
    }

    pub(crate) fn input_from(value: &Value) -> anyhow::Result<Input> {
        ingest_for_processing(value.to_string().as_bytes())
    }

    #[rstest]
    fn should_ingest_small_office_with_defaults() {
        let input = input_from(&small_office_json()).unwrap();

        assert_eq!(input.structure.floor_area, 500.);
        assert_eq!(input.structure.total_area_per_floor_area, 4.5);
        assert_eq!(input.structure.r_se, 0.04);
        assert_eq!(input.heating.fuel_type, EnergyCarrier::Gas);
        assert_eq!(input.heating.hot_water_fuel_type, EnergyCarrier::Electric);
        assert_eq!(input.heating.supply_temperature_difference, 7.);
        assert_eq!(input.cooling.pump_energy, 0.25);
        assert_eq!(input.ventilation.n50, 2.);
        assert_eq!(input.ventilation.stack_height, 39.);
        assert_eq!(input.simulation_settings.internal_gains_fraction_to_air, 0.5);
        assert_eq!(input.lighting.controls, LightingControls::default());
        assert!(input.schedule.is_none());
        assert!(input.location.is_none());
    }

    #[rstest]
    fn north_first_arrays_should_be_reordered() {
        let mut value = small_office_json();
        value["SurfaceOrder"] = json!("north_first");
        value["Structure"]["window_area"] = json!([1., 2., 3., 4., 5., 6., 7., 8., 9.]);

        let input = input_from(&value).unwrap();

        assert_eq!(
            input.structure.window_area.values(),
            &[5., 4., 3., 2., 1., 8., 7., 6., 9.]
        );
        assert_eq!(input.surface_order, SurfaceOrder::SouthFirst);
    }

    #[rstest]
    fn should_reject_wrong_number_of_surface_values() {
        let mut value = small_office_json();
        value["Structure"]["wall_u_value"] = json!([0.3, 0.3, 0.3]);

        let error = input_from(&value).unwrap_err().to_string();
        assert!(error.contains("expected 9 values (one per surface), found 3"));
    }

    #[rstest]
    fn should_reject_negative_surface_values() {
        let mut value = small_office_json();
        value["Structure"]["window_area"] = json!([-1., 0., 0., 0., 0., 0., 0., 0., 0.]);

        assert!(input_from(&value).is_err());
    }

    #[rstest]
    #[case("/Structure/floor_area", json!(-1.0))]
    #[case("/Heating/efficiency", json!(0.0))]
    #[case("/Cooling/cop", json!(-1.0))]
    #[case("/Population/hour_end", json!(24))]
    #[case("/Population/day_start", json!(7))]
    #[case("/Ventilation/heat_recovery_efficiency", json!(1.5))]
    fn should_reject_out_of_range_parameters(#[case] pointer: &str, #[case] bad: Value) {
        let mut value = small_office_json();
        *value.pointer_mut(pointer).unwrap() = bad;

        let error = input_from(&value).unwrap_err().to_string();
        assert!(error.starts_with("Building input failed validation"), "{error}");
    }

    #[rstest]
    fn zero_floor_area_should_be_clamped_for_calculation() {
        let mut value = small_office_json();
        value["Structure"]["floor_area"] = json!(0.0);

        let input = input_from(&value).unwrap();

        assert_eq!(input.structure.floor_area, 0.);
        assert_eq!(input.structure.floor_area_for_calculation(), MIN_FLOOR_AREA);
    }

    #[rstest]
    fn should_reject_hot_water_set_below_supply() {
        let mut value = small_office_json();
        value["Heating"]["hot_water_set_temperature"] = json!(10.0);
        value["Heating"]["hot_water_supply_temperature"] = json!(15.0);

        let error = input_from(&value).unwrap_err().to_string();
        assert!(error.starts_with("Building input failed validation"), "{error}");
        assert!(error.contains("below hot_water_supply_temperature"), "{error}");
    }

    #[rstest]
    #[case(json!({"latitude": 95.0, "longitude": 0.0, "timezone": 0.0}), "latitude")]
    #[case(json!({"latitude": 40.0, "longitude": 200.0, "timezone": 0.0}), "longitude")]
    #[case(json!({"latitude": 40.0, "longitude": 0.0, "timezone": -13.0}), "timezone")]
    fn should_reject_out_of_range_location(#[case] location: Value, #[case] field: &str) {
        let mut value = small_office_json();
        value["Location"] = location;

        let error = input_from(&value).unwrap_err().to_string();
        assert!(error.starts_with("Building input failed validation"), "{error}");
        assert!(error.contains(field), "{error}");
    }

    #[rstest]
    fn should_reject_missing_required_parameter() {
        let mut value = small_office_json();
        value["Heating"].as_object_mut().unwrap().remove("efficiency");

        let error = input_from(&value).unwrap_err().to_string();
        assert!(error.contains("missing field `efficiency`"), "{error}");
    }

    #[rstest]
    fn should_reject_unknown_fields() {
        let mut value = small_office_json();
        value["Lighting"]["colour_temperature"] = json!(4000);

        assert!(input_from(&value).is_err());
    }

    #[rstest]
    fn should_reject_unknown_fuel() {
        let mut value = small_office_json();
        value["Heating"]["fuel_type"] = json!("coal");

        assert!(input_from(&value).is_err());
    }

    #[rstest]
    fn should_parse_price_responsive_schedule() {
        let mut value = small_office_json();
        value["Schedule"] = json!({
            "price_responsive": {
                "peak_hour_start": 14,
                "peak_hour_end": 18,
                "cooling_setup": 2.0
            }
        });

        let input = input_from(&value).unwrap();
        match input.schedule {
            Some(ScheduleInput::PriceResponsive(peak)) => {
                assert_eq!((peak.peak_hour_start, peak.peak_hour_end), (14, 18));
                assert_eq!((peak.peak_day_start, peak.peak_day_end), (0, 6));
                assert_eq!(peak.cooling_setup, 2.);
                assert_eq!(peak.heating_setback, 0.);
            }
            other => panic!("unexpected schedule {other:?}"),
        }
    }
}
