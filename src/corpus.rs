use crate::compare_floats::{guard_denominator, max_of_2};
use crate::core::end_uses::{EndUseCategory, EndUses, FuelType};
use crate::core::schedule::{HourlySchedules, OperatingSchedules, ScheduleChannel};
use crate::core::space_heat_demand::daylighting::Daylighting;
use crate::core::space_heat_demand::ventilation::VentilationAirflow;
use crate::core::space_heat_demand::zone::{
    HourConditions, NetworkConstants, NetworkState, ThermalNetwork,
};
use crate::core::surface::Surface;
use crate::core::units::{
    annual_megajoules_to_mean_watts, watt_hours_to_kilowatt_hours,
    CUBIC_METRES_PER_HOUR_PER_LITRE_PER_SECOND, HOURS_PER_YEAR, MONTHS_PER_YEAR,
    SECONDS_PER_HOUR, WATTS_PER_KILOWATT,
};
use crate::diagnostics::DiagnosticsSink;
use crate::external_conditions::ExternalConditions;
use crate::input::{Cooling, Heating, Input, Lighting, PhysicalQuantities, Ventilation};
use crate::simulation_time::sum_hours_by_month;
use strum::IntoEnumIterator;
use tracing::{debug, info};

// Converts MJ/(m3.K) into W.h/(m3.K)
const MEGAJOULES_TO_WATT_HOURS: f64 = 277.777778;

// Floors for the demand shares used in the distribution efficiencies
const MIN_DEMAND_SHARE: f64 = 0.1;

/// Energy flows for one hour, in W/m2 of floor area (equivalently Wh/m2 for the hour), and
/// the zone temperatures at the end of it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HourResult {
    pub heating_need: f64,
    pub cooling_need: f64,
    pub interior_lighting: f64,
    pub exterior_lighting: f64,
    pub fans: f64,
    pub pumps: f64,
    pub interior_equipment: f64,
    pub exterior_equipment: f64,
    pub hot_water: f64,
    pub temp_air: f64,
    pub temp_mass: f64,
}

/// Efficiencies of heat and coolth distribution (ISO 13790 14.3.2), including waste from
/// simultaneous heating and cooling apportioned by each mode's share of annual demand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistributionEfficiencies {
    pub heating: f64,
    pub cooling: f64,
}

impl DistributionEfficiencies {
    pub fn new(
        annual_heating_need: f64,
        annual_cooling_need: f64,
        heating: &Heating,
        cooling: &Cooling,
    ) -> Self {
        let heating_share = max_of_2(
            annual_heating_need
                / guard_denominator(annual_cooling_need + annual_heating_need, 1e-12),
            MIN_DEMAND_SHARE,
        );
        let cooling_share = max_of_2(1. - heating_share, MIN_DEMAND_SHARE);
        let waste = heating.hot_cold_waste_factor;

        Self {
            heating: 1. / (1. + heating.hvac_loss_factor + waste / heating_share),
            cooling: 1. / (1. + cooling.hvac_loss_factor + waste / cooling_share),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunResults {
    /// One record per month, January first, in kWh/m2
    pub monthly: Vec<EndUses>,
    pub distribution_efficiencies: DistributionEfficiencies,
    /// Sum of the hourly heating need before distribution and conversion losses, in Wh/m2
    pub annual_heating_need: f64,
    /// Sum of the hourly cooling need before distribution and conversion losses, in Wh/m2
    pub annual_cooling_need: f64,
}

impl RunResults {
    pub fn annual(&self) -> EndUses {
        self.monthly.iter().sum()
    }

    /// Annual energy use intensity over every fuel and end use, in kWh/m2
    pub fn energy_use_intensity(&self) -> f64 {
        self.annual().total()
    }
}

/// Fans, pumps and exterior lighting.
#[derive(Clone, Copy, Debug, PartialEq)]
struct AuxiliarySystems {
    floor_area: f64,
    temp_supply_heating: f64,
    temp_supply_cooling: f64,
    /// in W.h/(m3.K)
    rho_cp_air: f64,
    forced_air_heating: bool,
    forced_air_cooling: bool,
    /// in W/(L/s)
    fan_power: f64,
    /// in W/m2
    pump_power_heating: f64,
    /// in W/m2
    pump_power_cooling: f64,
    /// in W
    exterior_lighting_power: f64,
}

impl AuxiliarySystems {
    fn new(
        floor_area: f64,
        heating: &Heating,
        cooling: &Cooling,
        ventilation: &Ventilation,
        lighting: &Lighting,
        physical_quantities: &PhysicalQuantities,
    ) -> Self {
        Self {
            floor_area,
            temp_supply_heating: heating.setpoint_occupied + heating.supply_temperature_difference,
            temp_supply_cooling: cooling.setpoint_occupied - cooling.supply_temperature_difference,
            rho_cp_air: physical_quantities.rho_cp_air * MEGAJOULES_TO_WATT_HOURS,
            forced_air_heating: heating.forced_air,
            forced_air_cooling: cooling.forced_air,
            fan_power: ventilation.fan_power,
            pump_power_heating: heating.pump_energy * heating.pump_control_reduction,
            pump_power_cooling: cooling.pump_energy * cooling.pump_control_reduction,
            exterior_lighting_power: lighting.exterior_energy,
        }
    }

    /// Fan energy in W/m2, for the larger of the ventilation airflow and the airflow needed
    /// to deliver the heating or cooling at the supply temperature.
    ///
    /// Arguments:
    /// * `heating_need`, `cooling_need` - in W/m2
    /// * `temp_int_air` - zone air temperature at the start of the hour
    /// * `ventilation_rate` - in m3/h per m2
    fn fan_energy(
        &self,
        heating_need: f64,
        cooling_need: f64,
        temp_int_air: f64,
        ventilation_rate: f64,
    ) -> f64 {
        let airflow_heating = if self.forced_air_heating {
            heating_need
                / guard_denominator(
                    (self.temp_supply_heating - temp_int_air) * self.rho_cp_air,
                    1e-9,
                )
        } else {
            0.
        };
        let airflow_cooling = if self.forced_air_cooling {
            cooling_need
                / guard_denominator(
                    (temp_int_air - self.temp_supply_cooling) * self.rho_cp_air,
                    1e-9,
                )
        } else {
            0.
        };

        let airflow = max_of_2(airflow_heating + airflow_cooling, ventilation_rate);
        airflow * self.fan_power * WATTS_PER_KILOWATT as f64 / SECONDS_PER_HOUR as f64
    }

    /// Pumps run at their full rate in any hour with cooling, otherwise in any hour with
    /// heating.
    fn pump_energy(&self, heating_need: f64, cooling_need: f64) -> f64 {
        if cooling_need > 0. {
            self.pump_power_cooling
        } else if heating_need > 0. {
            self.pump_power_heating
        } else {
            0.
        }
    }

    /// Exterior lighting in W/m2; off whenever there is sun on the roof.
    fn exterior_lighting(&self, roof_irradiance: f64, fraction_on: f64) -> f64 {
        if roof_irradiance > 0. {
            0.
        } else {
            self.exterior_lighting_power * fraction_on / self.floor_area
        }
    }
}

/// Continuous hot water power, in W/m2, spreading annual demand evenly over the year.
fn hot_water_power(
    heating: &Heating,
    physical_quantities: &PhysicalQuantities,
    floor_area: f64,
) -> f64 {
    let annual_energy = heating.hot_water_demand
        * (heating.hot_water_set_temperature - heating.hot_water_supply_temperature)
        * physical_quantities.rho_cp_water;

    annual_megajoules_to_mean_watts(annual_energy)
        / heating.hot_water_distribution_efficiency
        / heating.hot_water_system_efficiency
        / floor_area
}

/// The hourly model of one building at one site.
#[derive(Debug)]
pub struct Corpus<'a> {
    input: &'a Input,
    external_conditions: &'a ExternalConditions,
    schedules: OperatingSchedules,
    hourly_schedules: HourlySchedules,
    network: ThermalNetwork,
    ventilation: VentilationAirflow,
    daylighting: Daylighting,
    auxiliary: AuxiliarySystems,
    hot_water_power: f64,
    /// clamped away from zero
    floor_area: f64,
}

impl<'a> Corpus<'a> {
    pub fn from_inputs(
        input: &'a Input,
        external_conditions: &'a ExternalConditions,
    ) -> anyhow::Result<Self> {
        let structure = &input.structure;
        let floor_area = structure.floor_area_for_calculation();

        let schedules = OperatingSchedules::from_input(input)?;
        let hourly_schedules = schedules.expand(external_conditions.frame());

        let corpus = Self {
            input,
            external_conditions,
            schedules,
            hourly_schedules,
            network: ThermalNetwork::new(NetworkConstants::new(
                structure,
                &input.simulation_settings,
            )),
            ventilation: VentilationAirflow::new(&input.ventilation, structure),
            daylighting: Daylighting::new(structure, &input.lighting),
            auxiliary: AuxiliarySystems::new(
                floor_area,
                &input.heating,
                &input.cooling,
                &input.ventilation,
                &input.lighting,
                &input.physical_quantities,
            ),
            hot_water_power: hot_water_power(
                &input.heating,
                &input.physical_quantities,
                floor_area,
            ),
            floor_area,
        };

        debug!(
            constants = ?corpus.network.constants(),
            q_4pa = corpus.ventilation.q_4pa(),
            lighting_control = ?corpus.daylighting.control(),
            "hourly model initialised"
        );

        Ok(corpus)
    }

    pub fn network_constants(&self) -> &NetworkConstants {
        self.network.constants()
    }

    /// Run all hours of the year in order and aggregate to monthly end uses.
    pub fn run(&self, diagnostics: &impl DiagnosticsSink) -> RunResults {
        if !diagnostics.is_noop() {
            for channel in ScheduleChannel::iter() {
                diagnostics.weekly_schedule(channel, &self.schedules.channel(channel).to_weekly());
            }
            diagnostics.derived_constants(self.network.constants());
        }

        let mut state = NetworkState::default();
        let mut hours = Vec::with_capacity(HOURS_PER_YEAR);
        for hour_of_year in 0..HOURS_PER_YEAR {
            let result = self.calc_hour(hour_of_year, &mut state);
            diagnostics.hour(hour_of_year, &result);
            hours.push(result);
        }

        let results = self.aggregate(&hours);
        info!(
            energy_use_intensity = results.energy_use_intensity(),
            annual_heating_need = results.annual_heating_need,
            annual_cooling_need = results.annual_cooling_need,
            "hourly simulation complete"
        );

        results
    }

    /// Step the model through one hour, updating `state` with the temperatures at its end.
    fn calc_hour(&self, hour_of_year: usize, state: &mut NetworkState) -> HourResult {
        let schedules = &self.hourly_schedules;
        let weather = self.external_conditions.weather();
        let irradiance = self.external_conditions.irradiance().hour(hour_of_year);
        let floor_area = self.floor_area;

        let temp_ext_air = weather.dry_bulb_temperatures()[hour_of_year];
        let wind_speed = weather.wind_speeds()[hour_of_year];

        let ventilation_rate = schedules.ventilation[hour_of_year]
            * CUBIC_METRES_PER_HOUR_PER_LITRE_PER_SECOND
            / floor_area;
        let interior_equipment = schedules.interior_equipment[hour_of_year];
        let exterior_equipment = schedules.exterior_equipment[hour_of_year] / floor_area;

        let daylight = self.daylighting.daylight_and_solar(irradiance);
        let (interior_lighting, lighting_gains) = self
            .daylighting
            .interior_lighting(daylight.lighting_level, schedules.interior_lighting[hour_of_year]);

        let airflow =
            self.ventilation
                .airflow(ventilation_rate, temp_ext_air, wind_speed, state.temp_air);

        let conditions = HourConditions {
            temp_ext_air,
            temp_supply: airflow.temp_entering,
            h_ve: airflow.h_ve,
            gains_solar: daylight.solar_gain,
            gains_internal: interior_equipment + lighting_gains,
        };

        let demand = self.network.power_demand(
            state,
            &conditions,
            schedules.heating_setpoint[hour_of_year],
            schedules.cooling_setpoint[hour_of_year],
        );

        // auxiliary energy uses the air temperature from the start of the hour
        let fans = self.auxiliary.fan_energy(
            demand.heating,
            demand.cooling,
            state.temp_air,
            ventilation_rate,
        );
        let pumps = self.auxiliary.pump_energy(demand.heating, demand.cooling);
        let exterior_lighting = self.auxiliary.exterior_lighting(
            irradiance[Surface::Roof.index()],
            schedules.exterior_lighting[hour_of_year],
        );

        *state = self.network.advance(state, &conditions, demand.phi_hc);

        HourResult {
            heating_need: demand.heating,
            cooling_need: demand.cooling,
            interior_lighting,
            exterior_lighting,
            fans,
            pumps,
            interior_equipment,
            exterior_equipment,
            hot_water: self.hot_water_power,
            temp_air: state.temp_air,
            temp_mass: state.temp_mass,
        }
    }

    /// Apply distribution and conversion efficiencies, route each end use to its fuel and
    /// sum by month.
    fn aggregate(&self, hours: &[HourResult]) -> RunResults {
        let heating = &self.input.heating;
        let cooling = &self.input.cooling;

        let annual_heating_need = hours.iter().map(|h| h.heating_need).sum::<f64>();
        let annual_cooling_need = hours.iter().map(|h| h.cooling_need).sum::<f64>();
        let efficiencies = DistributionEfficiencies::new(
            annual_heating_need,
            annual_cooling_need,
            heating,
            cooling,
        );

        let heating_fuel = FuelType::from(heating.fuel_type);
        let hot_water_fuel = FuelType::from(heating.hot_water_fuel_type);

        type HourlyEnergy<'h> = Box<dyn Fn(&HourResult) -> f64 + 'h>;
        let end_uses: [(FuelType, EndUseCategory, HourlyEnergy); 9] = [
            (
                heating_fuel,
                EndUseCategory::Heating,
                Box::new(move |h: &HourResult| {
                    h.heating_need / efficiencies.heating / heating.efficiency
                }),
            ),
            (
                FuelType::Electricity,
                EndUseCategory::Cooling,
                Box::new(move |h: &HourResult| h.cooling_need / efficiencies.cooling / cooling.cop),
            ),
            (
                FuelType::Electricity,
                EndUseCategory::InteriorLights,
                Box::new(move |h: &HourResult| h.interior_lighting),
            ),
            (
                FuelType::Electricity,
                EndUseCategory::ExteriorLights,
                Box::new(move |h: &HourResult| h.exterior_lighting),
            ),
            (FuelType::Electricity, EndUseCategory::Fans, Box::new(move |h: &HourResult| h.fans)),
            (FuelType::Electricity, EndUseCategory::Pumps, Box::new(move |h: &HourResult| h.pumps)),
            (
                FuelType::Electricity,
                EndUseCategory::InteriorEquipment,
                Box::new(move |h: &HourResult| h.interior_equipment),
            ),
            (
                FuelType::Electricity,
                EndUseCategory::ExteriorEquipment,
                Box::new(move |h: &HourResult| h.exterior_equipment),
            ),
            (
                hot_water_fuel,
                EndUseCategory::WaterSystems,
                Box::new(move |h: &HourResult| h.hot_water),
            ),
        ];

        let mut monthly = vec![EndUses::new(); MONTHS_PER_YEAR];
        for (fuel, category, energy_for_hour) in end_uses {
            let hourly = hours
                .iter()
                .map(|h| watt_hours_to_kilowatt_hours(energy_for_hour(h)))
                .collect::<Vec<_>>();
            for (end_uses, value) in monthly.iter_mut().zip(sum_hours_by_month(&hourly)) {
                end_uses.add(fuel, category, value);
            }
        }

        RunResults {
            monthly,
            distribution_efficiencies: efficiencies,
            annual_heating_need,
            annual_cooling_need,
        }
    }
}
