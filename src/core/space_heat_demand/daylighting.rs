// This module provides the per-hour daylighting and solar gain terms: how much electric
// lighting is still needed given the daylight entering through the windows, and how much
// solar heat reaches the zone through windows and opaque elements.

use crate::compare_floats::{max_of_2, min_of_2};
use crate::core::surface::{PerSurface, SURFACE_COUNT};
use crate::input::{Lighting, LightingControl, Structure};

/// Light transmittance of the reference glazing used to normalise the shading device factor
const REFERENCE_GLAZING_TRANSMITTANCE: f64 = 0.87;

/// Luminous efficacy of daylight, in lux per W/m2 of irradiance
const DAYLIGHT_EFFICACY: f64 = 53.;

/// Smallest naturally lighted area used, in m2
const MIN_NATURALLY_LIGHTED_AREA: f64 = 0.0001;

/// Select the lighting control strategy from the fitted sensors. A dimming fraction below 1
/// means that kind of sensor is present.
pub fn select_lighting_control(lighting: &Lighting) -> LightingControl {
    let has_occupancy_sensor = lighting.occupancy_sensor_fraction < 1.;
    let has_daylight_sensor = lighting.dimming_fraction < 1.;
    let controls = &lighting.controls;

    match (has_occupancy_sensor, has_daylight_sensor) {
        (true, true) => controls.presence_and_automatic,
        (true, false) => controls.presence_sensor,
        (false, true) => controls.automatic,
        (false, false) => controls.manual_switch,
    }
}

/// Per-surface coefficients, per m2 of floor area, for converting surface irradiance into
/// daylight and solar gain with and without movable shading in use.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceGainRatios {
    pub natural_light: PerSurface<f64>,
    /// change in natural light ratio when movable shading is fully in use
    pub natural_light_shade_reduction: PerSurface<f64>,
    pub solar: PerSurface<f64>,
    /// change in solar ratio when movable shading is fully in use
    pub solar_shade_reduction: PerSurface<f64>,
}

impl SurfaceGainRatios {
    pub fn new(structure: &Structure) -> Self {
        let floor_area = structure.floor_area_for_calculation();
        let mut ratios = Self {
            natural_light: [0.; SURFACE_COUNT],
            natural_light_shade_reduction: [0.; SURFACE_COUNT],
            solar: [0.; SURFACE_COUNT],
            solar_shade_reduction: [0.; SURFACE_COUNT],
        };

        for i in 0..SURFACE_COUNT {
            let wall_area = structure.wall_area.values()[i];
            let window_area = structure.window_area.values()[i];

            let window_transmittance =
                structure.window_sdf.values()[i] / REFERENCE_GLAZING_TRANSMITTANCE;
            let natural_lighted_area = window_area * window_transmittance;
            // movable shading does not change the daylight area
            let natural_lighted_area_shaded = natural_lighted_area;

            let opaque_solar_area = wall_area
                * structure.wall_solar_absorption.values()[i]
                * structure.wall_u_value.values()[i]
                * structure.r_se;
            let solar_area_shaded =
                opaque_solar_area + window_area * structure.window_scf.values()[i];
            let solar_area = opaque_solar_area + window_area * structure.window_shgc.values()[i];

            ratios.natural_light[i] = natural_lighted_area / floor_area;
            ratios.natural_light_shade_reduction[i] =
                natural_lighted_area_shaded / floor_area - ratios.natural_light[i];
            ratios.solar[i] = solar_area / floor_area;
            ratios.solar_shade_reduction[i] = solar_area_shaded / floor_area - ratios.solar[i];
        }

        ratios
    }
}

/// Daylight and solar gain for one hour, per m2 of floor area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DaylightAndSolar {
    /// daylight illuminance reaching the naturally lighted area, in lux
    pub lighting_level: f64,
    /// in W/m2
    pub solar_gain: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Daylighting {
    ratios: SurfaceGainRatios,
    irradiance_for_max_shading_use: f64,
    shading_use_per_irradiance: f64,
    naturally_lighted_ratio: f64,
    control: LightingControl,
    internal_gains_fraction: f64,
}

impl Daylighting {
    pub fn new(structure: &Structure, lighting: &Lighting) -> Self {
        let naturally_lighted_area =
            max_of_2(MIN_NATURALLY_LIGHTED_AREA, lighting.naturally_lighted_area);

        Self {
            ratios: SurfaceGainRatios::new(structure),
            irradiance_for_max_shading_use: structure.irradiance_for_max_shading_use,
            shading_use_per_irradiance: structure.shading_factor_at_max_use
                / structure.irradiance_for_max_shading_use,
            naturally_lighted_ratio: naturally_lighted_area
                / structure.floor_area_for_calculation(),
            control: select_lighting_control(lighting),
            internal_gains_fraction: lighting.internal_gains_fraction,
        }
    }

    pub fn ratios(&self) -> &SurfaceGainRatios {
        &self.ratios
    }

    pub fn control(&self) -> LightingControl {
        self.control
    }

    pub fn naturally_lighted_ratio(&self) -> f64 {
        self.naturally_lighted_ratio
    }

    /// Daylight and solar gain from the irradiance on each surface, in W/m2.
    ///
    /// Movable shading use grows linearly with irradiance up to its maximum.
    pub fn daylight_and_solar(&self, irradiance: &PerSurface<f64>) -> DaylightAndSolar {
        let efficacy_per_lighted_ratio = DAYLIGHT_EFFICACY / self.naturally_lighted_ratio;
        let ratios = &self.ratios;

        let mut lighting_level = 0.;
        let mut solar_gain = 0.;
        for (i, &irradiance) in irradiance.iter().enumerate() {
            let shading_use = self.shading_use_per_irradiance
                * min_of_2(self.irradiance_for_max_shading_use, irradiance);

            lighting_level += efficacy_per_lighted_ratio
                * irradiance
                * (ratios.natural_light[i] + shading_use * ratios.natural_light_shade_reduction[i]);
            solar_gain += irradiance
                * (ratios.solar[i] + shading_use * ratios.solar_shade_reduction[i]);
        }

        DaylightAndSolar {
            lighting_level,
            solar_gain,
        }
    }

    /// Fraction of the installed lighting power still needed over the whole floor area.
    pub fn electric_lighting_fraction(&self, lighting_level: f64) -> f64 {
        let max_ratio = self.control.max_electric_ratio;
        let for_naturally_lighted_area =
            max_of_2(0., max_ratio * (1. - lighting_level / self.control.illuminance));

        for_naturally_lighted_area * self.naturally_lighted_ratio
            + (1. - self.naturally_lighted_ratio) * max_ratio
    }

    /// Lighting energy and the part of it that becomes internal gain, both in W/m2.
    pub fn interior_lighting(&self, lighting_level: f64, power_density: f64) -> (f64, f64) {
        let energy = self.electric_lighting_fraction(lighting_level) * power_density;
        (energy, energy * self.internal_gains_fraction)
    }
}
