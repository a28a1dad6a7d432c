// This module provides the lumped 5R1C thermal network of ISO 13790 Annex C (simple hourly
// method) for a single zone. All conductances and gains are per m2 of floor area.

use crate::compare_floats::{guard_denominator, max_of_2, min_of_2};
use crate::input::{SimulationSettings, Structure};

/// Temperature of both nodes before the first hour, in Celsius
pub const INITIAL_TEMPERATURE: f64 = 20.;

/// Heat flow added to the air node for the second network evaluation, in W/m2
const TEST_POWER: f64 = 10.;

// ISO 13790 12.2.2: dimensionless ratio between the internal surface area and floor area
// applied to h_ri when deriving h_ms
const RADIATIVE_AREA_FACTOR: f64 = 1.2;

// Hours to seconds, with Cm in kJ/(m2.K)
const CM_TO_W_HOURS: f64 = 3.6;

const MIN_CONDUCTANCE: f64 = 1e-6;

/// Effective mass area per floor area from the areal heat capacity, interpolating between
/// the ISO 13790 Table 12 classes.
///
/// Arguments:
/// * `cm` - areal heat capacity, in kJ/(m2.K)
pub fn effective_mass_area_ratio(cm: f64) -> f64 {
    if cm > 370. {
        3.5
    } else if cm > 260. {
        3.0 + 0.5 * ((cm - 260.) / 110.)
    } else if cm > 165. {
        2.5 + 0.5 * ((cm - 165.) / 95.)
    } else {
        2.5
    }
}

/// Loop-invariant conductances and gain splits of the network.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetworkConstants {
    /// heat transfer coefficient between mass and surface, per m2 of mass area
    pub h_ms: f64,
    /// heat transfer coefficient between surface and air, per m2 of surface area
    pub h_is: f64,
    /// H_tr,is
    pub h_tr_is: f64,
    /// H_tr,w
    pub h_tr_w: f64,
    /// H_tr,ms
    pub h_tr_ms: f64,
    /// opaque elements, H_tr,op
    pub h_tr_op: f64,
    /// H_tr,em
    pub h_tr_em: f64,
    /// areal heat capacity, in kJ/(m2.K)
    pub cm: f64,
    /// effective mass area per floor area
    pub am: f64,
    pub surface_fraction_solar: f64,
    pub surface_fraction_internal: f64,
    pub mass_fraction_solar: f64,
    pub mass_fraction_internal: f64,
    pub air_fraction_solar: f64,
    pub air_fraction_internal: f64,
}

impl NetworkConstants {
    pub fn new(structure: &Structure, settings: &SimulationSettings) -> Self {
        let floor_area = structure.floor_area_for_calculation();
        let total_area_ratio = structure.total_area_per_floor_area;

        let h_ms = settings.hci + settings.hri * RADIATIVE_AREA_FACTOR;
        let h_is = 1. / guard_denominator(1. / settings.hci - 1. / h_ms, 1e-12);
        let h_tr_is = h_is * total_area_ratio;

        let cm_interior = structure.interior_heat_capacity / 1000.;
        let cm_envelope =
            structure.wall_heat_capacity * structure.wall_area.sum() / floor_area / 1000.;
        let cm = cm_interior + cm_envelope;
        let am = effective_mass_area_ratio(cm);

        let (h_window, h_wall) = structure
            .window_area
            .values()
            .iter()
            .zip(structure.window_u_value.values())
            .zip(
                structure
                    .wall_area
                    .values()
                    .iter()
                    .zip(structure.wall_u_value.values()),
            )
            .fold((0., 0.), |(h_window, h_wall), ((a_win, u_win), (a_wall, u_wall))| {
                (h_window + a_win * u_win, h_wall + a_wall * u_wall)
            });
        let h_tr_w = h_window / floor_area;

        let surface_fraction =
            (total_area_ratio - am - h_tr_w / h_ms) / total_area_ratio;
        let mass_fraction = am / total_area_ratio;
        let air_fraction_internal = settings.internal_gains_fraction_to_air;
        let air_fraction_solar = settings.solar_gains_fraction_to_air;

        let h_tr_ms = h_ms * am;
        let h_tr_op = max_of_2(h_wall / floor_area, MIN_CONDUCTANCE);
        let h_tr_em = 1. / guard_denominator(1. / h_tr_op - 1. / h_tr_ms, 1e-12);

        Self {
            h_ms,
            h_is,
            h_tr_is,
            h_tr_w,
            h_tr_ms,
            h_tr_op,
            h_tr_em,
            cm,
            am,
            surface_fraction_solar: (1. - air_fraction_solar) * surface_fraction,
            surface_fraction_internal: (1. - air_fraction_internal) * surface_fraction,
            mass_fraction_solar: (1. - air_fraction_solar) * mass_fraction,
            mass_fraction_internal: (1. - air_fraction_internal) * mass_fraction,
            air_fraction_solar,
            air_fraction_internal,
        }
    }
}

/// Temperatures carried from one hour to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetworkState {
    pub temp_mass: f64,
    pub temp_air: f64,
}

impl Default for NetworkState {
    fn default() -> Self {
        Self {
            temp_mass: INITIAL_TEMPERATURE,
            temp_air: INITIAL_TEMPERATURE,
        }
    }
}

/// Boundary conditions and gains for one hour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HourConditions {
    pub temp_ext_air: f64,
    /// mixed temperature of the air entering the zone
    pub temp_supply: f64,
    /// ventilation heat transfer coefficient, in W/(m2.K)
    pub h_ve: f64,
    /// in W/m2
    pub gains_solar: f64,
    /// in W/m2
    pub gains_internal: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTemperatures {
    /// mass temperature at the end of the hour
    pub temp_mass: f64,
    /// mass temperature averaged over the hour
    pub temp_mass_mean: f64,
    pub temp_surface: f64,
    pub temp_air: f64,
}

/// Heating/cooling required to hold the air node between its setpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerDemand {
    /// net power actually supplied to the air node (heating positive), in W/m2
    pub phi_hc: f64,
    pub heating: f64,
    pub cooling: f64,
    /// air temperature with no heating or cooling
    pub temp_air_free: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalNetwork {
    constants: NetworkConstants,
}

impl ThermalNetwork {
    pub fn new(constants: NetworkConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &NetworkConstants {
        &self.constants
    }

    /// Gains to the air node before any heating or cooling, in W/m2
    pub fn phi_air(&self, conditions: &HourConditions) -> f64 {
        self.constants.air_fraction_solar * conditions.gains_solar
            + self.constants.air_fraction_internal * conditions.gains_internal
    }

    /// Solve the network for one hour (ISO 13790 C.3, equations C.1 to C.11).
    ///
    /// Arguments:
    /// * `temp_mass_prev` - mass temperature at the end of the previous hour
    /// * `conditions`
    /// * `phi_air` - total heat flow to the air node, including any heating or cooling
    pub fn solve(
        &self,
        temp_mass_prev: f64,
        conditions: &HourConditions,
        phi_air: f64,
    ) -> NodeTemperatures {
        let c = &self.constants;
        let temp_ext = conditions.temp_ext_air;
        let temp_sup = conditions.temp_supply;
        let h_ve = guard_denominator(conditions.h_ve, 1e-12);

        let phi_st = c.surface_fraction_solar * conditions.gains_solar
            + c.surface_fraction_internal * conditions.gains_internal;
        let phi_m = c.mass_fraction_solar * conditions.gains_solar
            + c.mass_fraction_internal * conditions.gains_internal;

        let h_tr_1 = 1. / (1. / h_ve + 1. / c.h_tr_is);
        let h_tr_2 = h_tr_1 + c.h_tr_w;
        let h_tr_3 = 1. / (1. / h_tr_2 + 1. / c.h_tr_ms);

        let phi_m_tot = phi_m
            + c.h_tr_em * temp_ext
            + h_tr_3 * (phi_st + c.h_tr_w * temp_ext + h_tr_1 * (phi_air / h_ve + temp_sup))
                / h_tr_2;

        let capacity = c.cm / CM_TO_W_HOURS;
        let half_coupling = 0.5 * (h_tr_3 + c.h_tr_em);
        let temp_mass =
            (temp_mass_prev * (capacity - half_coupling) + phi_m_tot) / (capacity + half_coupling);
        let temp_mass_mean = 0.5 * (temp_mass_prev + temp_mass);

        let temp_surface = (c.h_tr_ms * temp_mass_mean
            + phi_st
            + c.h_tr_w * temp_ext
            + h_tr_1 * (temp_sup + phi_air / h_ve))
            / (c.h_tr_ms + c.h_tr_w + h_tr_1);
        let temp_air = (c.h_tr_is * temp_surface + h_ve * temp_sup + phi_air) / (c.h_tr_is + h_ve);

        NodeTemperatures {
            temp_mass,
            temp_mass_mean,
            temp_surface,
            temp_air,
        }
    }

    /// Heating or cooling needed this hour, by evaluating the free-floating network and the
    /// network with a fixed extra power on the air node, then interpolating to the setpoint.
    pub fn power_demand(
        &self,
        state: &NetworkState,
        conditions: &HourConditions,
        temp_setpnt_heat: f64,
        temp_setpnt_cool: f64,
    ) -> PowerDemand {
        let phi_air = self.phi_air(conditions);
        let free = self.solve(state.temp_mass, conditions, phi_air);
        let perturbed = self.solve(state.temp_mass, conditions, phi_air + TEST_POWER);

        let temp_rise_per_watt =
            guard_denominator(perturbed.temp_air - free.temp_air, 1e-12) / TEST_POWER;
        let phi_heating = (temp_setpnt_heat - free.temp_air) / temp_rise_per_watt;
        let phi_cooling = (temp_setpnt_cool - free.temp_air) / temp_rise_per_watt;
        let phi_hc = max_of_2(0., phi_heating) + min_of_2(phi_cooling, 0.);

        PowerDemand {
            phi_hc,
            heating: max_of_2(0., phi_hc),
            cooling: max_of_2(0., -phi_hc),
            temp_air_free: free.temp_air,
        }
    }

    /// State at the end of the hour with the heating or cooling actually supplied.
    pub fn advance(
        &self,
        state: &NetworkState,
        conditions: &HourConditions,
        phi_hc: f64,
    ) -> NetworkState {
        let temperatures =
            self.solve(state.temp_mass, conditions, phi_hc + self.phi_air(conditions));

        NetworkState {
            temp_mass: temperatures.temp_mass,
            temp_air: temperatures.temp_air,
        }
    }
}
