// This module provides the airflow model for mechanical ventilation and envelope air leakage.
// The calculations are based on the simplified method of ISO 15242, section 6.7.1.

use crate::compare_floats::{guard_denominator, max_of_2};
use crate::input::{Structure, Ventilation};

// (Coefficients from ISO 15242 6.7.1 Step 1)
const C_WIND: f64 = 0.0769;
const C_STACK: f64 = 0.0146;
const FLOW_EXPONENT: f64 = 0.667;

// Volumetric heat capacity of air in W.h/(m3.K), used for the ventilation heat transfer
// coefficient (ISO 13790 9.3.1)
const RHO_CP_AIR_WH: f64 = 0.34;

/// Room temperature assumed on the extract side of the heat recovery unit, in Celsius
const HEAT_RECOVERY_EXTRACT_TEMPERATURE: f64 = 20.;

/// Leakage airflow at 4 Pa per m2 of floor area, from n50 using the ISO 15242 factor of 0.19
/// between the 50 Pa and 4 Pa flows. Floored to keep the stack and wind terms well-defined.
pub fn leakage_at_4pa(n50: f64, floor_area: f64, building_height: f64) -> f64 {
    let leakage_at_4pa = 0.19 * n50 * floor_area * building_height;
    max_of_2(1e-6, leakage_at_4pa / floor_area)
}

/// Airflow into the zone for one hour.
///
/// Airflows are in m3/h per m2 of floor area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Airflow {
    pub supplied_by_system: f64,
    pub through_envelope: f64,
    /// Mixed temperature of everything entering the zone, in Celsius
    pub temp_entering: f64,
    /// Ventilation heat transfer coefficient H_ve, in W/(m2.K)
    pub h_ve: f64,
}

impl Airflow {
    pub fn total_entering(&self) -> f64 {
        self.supplied_by_system + self.through_envelope
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VentilationAirflow {
    q_4pa: f64,
    wind_pressure_coefficient_difference: f64,
    /// effective stack height, in m
    stack_height: f64,
    /// ratio of air supplied by fans to air exhausted
    supply_ratio: f64,
    heat_recovery_efficiency: f64,
    preheat_temperature: f64,
}

impl VentilationAirflow {
    pub fn new(ventilation: &Ventilation, structure: &Structure) -> Self {
        Self {
            q_4pa: leakage_at_4pa(
                ventilation.n50,
                structure.floor_area_for_calculation(),
                structure.building_height,
            ),
            wind_pressure_coefficient_difference: ventilation.wind_pressure_coefficient_difference,
            stack_height: max_of_2(0.1, ventilation.stack_height),
            supply_ratio: max_of_2(1e-5, ventilation.fan_control_factor),
            heat_recovery_efficiency: ventilation.heat_recovery_efficiency,
            preheat_temperature: ventilation.preheat_temperature,
        }
    }

    pub fn q_4pa(&self) -> f64 {
        self.q_4pa
    }

    /// Temperature of fan-supplied air after heat recovery and preheat, in Celsius
    pub fn temp_supply(&self, temp_ext_air: f64) -> f64 {
        let temp_after_recovery = (1. - self.heat_recovery_efficiency) * temp_ext_air
            + self.heat_recovery_efficiency * HEAT_RECOVERY_EXTRACT_TEMPERATURE;
        max_of_2(self.preheat_temperature, temp_after_recovery)
    }

    /// Wind-driven leakage, in m3/h per m2
    pub fn q_wind(&self, wind_speed: f64) -> f64 {
        C_WIND
            * self.q_4pa
            * (self.wind_pressure_coefficient_difference * wind_speed * wind_speed)
                .powf(FLOW_EXPONENT)
    }

    /// Stack-driven leakage, in m3/h per m2
    pub fn q_stack(&self, temp_ext_air: f64, temp_int_air: f64) -> f64 {
        let temp_diff = max_of_2(1e-5, (temp_ext_air - temp_int_air).abs());
        C_STACK * self.q_4pa * (0.5 * self.stack_height * temp_diff).powf(FLOW_EXPONENT)
    }

    /// Airflow for one hour.
    ///
    /// Arguments:
    /// * `exhaust_rate` - mechanical exhaust, in m3/h per m2
    /// * `temp_ext_air` - in Celsius
    /// * `wind_speed` - in m/s
    /// * `temp_int_air_prev` - internal air temperature at the end of the previous hour
    pub fn airflow(
        &self,
        exhaust_rate: f64,
        temp_ext_air: f64,
        wind_speed: f64,
        temp_int_air_prev: f64,
    ) -> Airflow {
        let supplied_by_system = exhaust_rate * self.supply_ratio;
        // ISO 15242 q_{v-diff}
        let exhaust_minus_supply = exhaust_rate - supplied_by_system;

        let q_wind = self.q_wind(wind_speed);
        let q_stack = self.q_stack(temp_ext_air, temp_int_air_prev);

        // ISO 15242 6.7.1 Step 2
        let exfiltration = max_of_2(
            0.,
            max_of_2(q_stack, q_wind)
                - exhaust_minus_supply.abs()
                    * (0.5 * q_stack + 0.667 * q_wind / guard_denominator(q_stack + q_wind, 1e-12)),
        );

        let through_envelope = max_of_2(0., exhaust_minus_supply) + exfiltration;
        let total_entering = guard_denominator(through_envelope + supplied_by_system, 1e-12);

        // ISO 13790 9.3 theta_sup
        let temp_entering = (temp_ext_air * through_envelope
            + self.temp_supply(temp_ext_air) * supplied_by_system)
            / total_entering;

        Airflow {
            supplied_by_system,
            through_envelope,
            temp_entering,
            h_ve: RHO_CP_AIR_WH * total_entering,
        }
    }
}
