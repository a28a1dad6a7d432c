use crate::compare_floats::{clamp_to_unit, max_of_2};
use crate::core::surface::{PerSurface, Surface, FACADE_COUNT, SURFACE_COUNT};
use crate::core::units::{HOURS_PER_DAY, MONTHS_PER_YEAR};
use crate::external_conditions::{Location, WeatherData};
use crate::simulation_time::TimeFrame;
use statrs::statistics::Statistics;
use std::f64::consts::PI;
use strum::IntoEnumIterator;

/// Ground reflectance (albedo) used for the ground-reflected component
const GROUND_REFLECTANCE: f64 = 0.14;

/// Tilt of the vertical facades from the horizontal, in radians
const FACADE_TILT: f64 = PI / 2.;

/// Lower bound on cos(altitude) so that the azimuth terms never divide by zero when the sun is
/// at the zenith
const MIN_COS_ALTITUDE: f64 = 1e-9;

/// Day-level values are precomputed for every possible day-of-year value, including day 365
/// of a leap year.
const DAYS_PRECOMPUTED: usize = 366;

/// Total incident irradiance, in W/m2, for every hour of the year on every envelope surface.
#[derive(Clone, Debug, PartialEq)]
pub struct IrradianceTable {
    rows: Vec<PerSurface<f64>>,
}

impl IrradianceTable {
    pub fn hour(&self, hour_of_year: usize) -> &PerSurface<f64> {
        &self.rows[hour_of_year]
    }

    pub fn value(&self, hour_of_year: usize, surface: Surface) -> f64 {
        self.rows[hour_of_year][surface.index()]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PerSurface<f64>> {
        self.rows.iter()
    }
}

/// Terms that depend only on the day of the year
#[derive(Clone, Copy, Debug)]
struct DayTerms {
    /// equation of time, in minutes
    equation_of_time: f64,
    /// solar declination, in radians
    declination: f64,
}

/// Position of the sun for one hour, as sines and cosines
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolarPosition {
    pub sin_altitude: f64,
    pub cos_altitude: f64,
    pub sin_azimuth: f64,
    pub cos_azimuth: f64,
}

impl SolarPosition {
    pub fn altitude(&self) -> f64 {
        self.sin_altitude.atan2(self.cos_altitude)
    }

    /// Azimuth from south, east negative, in radians
    pub fn azimuth(&self) -> f64 {
        self.sin_azimuth.atan2(self.cos_azimuth)
    }
}

/// Solar position and irradiance model for a site.
///
/// Facades are vertical and face the eight compass points. The roof is not evaluated by the
/// surface model: its column carries the measured global horizontal irradiance.
#[derive(Clone, Debug)]
pub struct SolarRadiation {
    /// radians
    latitude: f64,
    /// radians
    longitude: f64,
    /// radians
    local_meridian: f64,
    ground_reflectance: f64,
    sin_tilt: f64,
    cos_tilt: f64,
    surface_tilt: f64,
    surface_sin: [f64; FACADE_COUNT],
    surface_cos: [f64; FACADE_COUNT],
    day_terms: Vec<DayTerms>,
}

impl SolarRadiation {
    pub fn new(location: &Location) -> Self {
        let mut surface_sin = [0.; FACADE_COUNT];
        let mut surface_cos = [0.; FACADE_COUNT];
        for surface in Surface::iter() {
            if let Some(azimuth) = surface.azimuth() {
                surface_sin[surface.index()] = azimuth.sin();
                surface_cos[surface.index()] = azimuth.cos();
            }
        }

        let day_terms = (0..DAYS_PRECOMPUTED)
            .map(|day| {
                let revolution = revolution_angle(day as u32);
                DayTerms {
                    equation_of_time: equation_of_time(revolution),
                    declination: solar_declination(revolution),
                }
            })
            .collect();

        Self {
            latitude: location.latitude.to_radians(),
            longitude: location.longitude.to_radians(),
            local_meridian: (location.timezone * 15.).to_radians(),
            ground_reflectance: GROUND_REFLECTANCE,
            sin_tilt: FACADE_TILT.sin(),
            cos_tilt: FACADE_TILT.cos(),
            surface_tilt: FACADE_TILT,
            surface_sin,
            surface_cos,
            day_terms,
        }
    }

    /// Sun position for an hour of the day on a day of the year (0-indexed)
    pub fn solar_position(&self, day_of_year: u32, hour_of_day: u32) -> SolarPosition {
        let day = self.day_terms[day_of_year as usize];
        let solar_time = apparent_solar_time(
            hour_of_day,
            day.equation_of_time,
            self.longitude,
            self.local_meridian,
        );
        solar_position(self.latitude, day.declination, solar_hour_angle(solar_time))
    }

    /// Total irradiance on each facade, plus the ground-reflected component shared by all
    /// facades, for one hour.
    ///
    /// Arguments:
    /// * `position` - sun position for the hour
    /// * `beam` - direct normal irradiance, in W/m2
    /// * `diffuse` - diffuse horizontal irradiance, in W/m2
    pub fn facade_irradiance(
        &self,
        position: &SolarPosition,
        beam: f64,
        diffuse: f64,
    ) -> [f64; FACADE_COUNT] {
        let ground = ground_reflected_irradiance(
            beam,
            diffuse,
            self.ground_reflectance,
            position.sin_altitude,
            self.cos_tilt,
        );

        let mut totals = [0.; FACADE_COUNT];
        for (i, total) in totals.iter_mut().enumerate() {
            let cos_incidence = self.cos_tilt * position.sin_altitude
                + position.cos_altitude
                    * self.sin_tilt
                    * (position.cos_azimuth * self.surface_cos[i]
                        + position.sin_azimuth * self.surface_sin[i]);
            let direct = direct_beam_irradiance(beam, cos_incidence);
            let sky = diffuse_irradiance(
                diffuse,
                diffuse_incidence_factor(cos_incidence),
                self.surface_tilt,
                self.sin_tilt,
                self.cos_tilt,
            );
            *total = direct + sky + ground;
        }
        totals
    }

    /// Build the 8760 x 9 irradiance table for the weather year.
    pub fn irradiance_table(&self, frame: &TimeFrame, weather: &WeatherData) -> IrradianceTable {
        let beam = weather.direct_beam_radiation();
        let diffuse = weather.diffuse_horizontal_radiation();
        let global_horizontal = weather.global_horizontal_radiation();

        let rows = frame
            .iter()
            .enumerate()
            .map(|(hour, entry)| {
                let position = self.solar_position(entry.day_of_year, entry.hour_of_day);
                let facades = self.facade_irradiance(&position, beam[hour], diffuse[hour]);

                let mut row = [0.; SURFACE_COUNT];
                row[..FACADE_COUNT].copy_from_slice(&facades);
                row[Surface::Roof.index()] = global_horizontal[hour];
                row
            })
            .collect();

        IrradianceTable { rows }
    }
}

/// Angle of the earth's orbit from the start of the year, in radians (day is 0-indexed)
pub fn revolution_angle(day_of_year: u32) -> f64 {
    2. * PI * day_of_year as f64 / 365.
}

/// Equation of time, in minutes (Spencer's Fourier series)
pub fn equation_of_time(revolution: f64) -> f64 {
    2.2918
        * (0.0075 + 0.1868 * revolution.cos()
            - 3.2077 * revolution.sin()
            - 1.4615 * (2. * revolution).cos()
            - 4.089 * (2. * revolution).sin())
}

/// Solar declination, in radians
// (Duffie & Beckman, Solar Engineering of Thermal Processes, eq. 1.6.1b)
pub fn solar_declination(revolution: f64) -> f64 {
    0.006918 - 0.399912 * revolution.cos() + 0.070257 * revolution.sin()
        - 0.006758 * (2. * revolution).cos()
        + 0.000907 * (2. * revolution).sin()
        - 0.002697 * (3. * revolution).cos()
        + 0.00148 * (3. * revolution).sin()
}

/// Apparent solar time, in hours
///
/// Arguments:
/// * `hour_of_day` - clock hour, 0 to 23
/// * `equation_of_time` - in minutes
/// * `longitude` - site longitude, in radians
/// * `local_meridian` - time-zone meridian, in radians
pub fn apparent_solar_time(
    hour_of_day: u32,
    equation_of_time: f64,
    longitude: f64,
    local_meridian: f64,
) -> f64 {
    hour_of_day as f64 + equation_of_time / 60. + (longitude - local_meridian) / (PI / 12.)
}

/// Solar hour angle, in radians; negative before solar noon
pub fn solar_hour_angle(apparent_solar_time: f64) -> f64 {
    (15. * (apparent_solar_time - 12.)).to_radians()
}

/// Sun altitude and azimuth from latitude, declination and hour angle (all radians).
pub fn solar_position(latitude: f64, declination: f64, hour_angle: f64) -> SolarPosition {
    let sin_altitude = clamp_to_unit(
        latitude.cos() * declination.cos() * hour_angle.cos() + latitude.sin() * declination.sin(),
    );
    let cos_altitude = max_of_2(
        max_of_2(0., 1. - sin_altitude * sin_altitude).sqrt(),
        MIN_COS_ALTITUDE,
    );

    let azimuth_sin = hour_angle.sin() * declination.cos() / cos_altitude;
    let azimuth_cos = (hour_angle.cos() * declination.cos() * latitude.sin()
        - declination.sin() * latitude.cos())
        / cos_altitude;
    let azimuth = azimuth_sin.atan2(azimuth_cos);

    SolarPosition {
        sin_altitude,
        cos_altitude,
        sin_azimuth: azimuth.sin(),
        cos_azimuth: azimuth.cos(),
    }
}

/// Ground-reflected irradiance on a tilted surface, in W/m2. Independent of surface azimuth.
pub fn ground_reflected_irradiance(
    beam: f64,
    diffuse: f64,
    reflectance: f64,
    sin_altitude: f64,
    cos_tilt: f64,
) -> f64 {
    (beam * sin_altitude + diffuse) * reflectance * (1. - cos_tilt) / 2.
}

/// Beam irradiance on a surface; zero when the sun is behind it.
pub fn direct_beam_irradiance(beam: f64, cos_incidence: f64) -> f64 {
    beam * max_of_2(cos_incidence, 0.)
}

/// Anisotropy factor Y applied to sky diffuse on near-vertical surfaces
pub fn diffuse_incidence_factor(cos_incidence: f64) -> f64 {
    max_of_2(
        0.45,
        0.55 + 0.437 * cos_incidence + 0.313 * cos_incidence * cos_incidence,
    )
}

/// Sky diffuse irradiance on a surface. Surfaces tilted past vertical get no isotropic term.
pub fn diffuse_irradiance(
    diffuse: f64,
    incidence_factor: f64,
    tilt: f64,
    sin_tilt: f64,
    cos_tilt: f64,
) -> f64 {
    if tilt > PI / 2. {
        diffuse * incidence_factor * sin_tilt
    } else {
        diffuse * (incidence_factor * sin_tilt + cos_tilt)
    }
}

/// Monthly and hour-of-day averages of weather and surface irradiance.
///
/// Monthly values are means over every hour of the month; hour-of-day values are means over
/// the days of the month for that hour.
#[derive(Clone, Debug, PartialEq)]
pub struct SolarAverages {
    pub monthly_dry_bulb_temperature: [f64; MONTHS_PER_YEAR],
    pub monthly_dew_point_temperature: [f64; MONTHS_PER_YEAR],
    pub monthly_relative_humidity: [f64; MONTHS_PER_YEAR],
    pub monthly_wind_speed: [f64; MONTHS_PER_YEAR],
    pub monthly_global_horizontal_radiation: [f64; MONTHS_PER_YEAR],
    pub monthly_surface_irradiance: [PerSurface<f64>; MONTHS_PER_YEAR],
    pub hourly_dry_bulb_temperature: [[f64; 24]; MONTHS_PER_YEAR],
    pub hourly_dew_point_temperature: [[f64; 24]; MONTHS_PER_YEAR],
    pub hourly_global_horizontal_radiation: [[f64; 24]; MONTHS_PER_YEAR],
}

impl SolarAverages {
    pub fn new(weather: &WeatherData, irradiance: &IrradianceTable) -> Self {
        let monthly = |series: &[f64]| -> [f64; MONTHS_PER_YEAR] {
            std::array::from_fn(|month_idx| {
                let (start, end) = TimeFrame::month_start_end_hours(month_idx);
                series[start..end].iter().mean()
            })
        };
        let hour_of_day = |series: &[f64]| -> [[f64; 24]; MONTHS_PER_YEAR] {
            std::array::from_fn(|month_idx| {
                let (start, end) = TimeFrame::month_start_end_hours(month_idx);
                std::array::from_fn(|hour| {
                    (start + hour..end)
                        .step_by(HOURS_PER_DAY as usize)
                        .map(|h| series[h])
                        .mean()
                })
            })
        };

        let monthly_surface_irradiance = std::array::from_fn(|month_idx| {
            let (start, end) = TimeFrame::month_start_end_hours(month_idx);
            std::array::from_fn(|surface| {
                (start..end)
                    .map(|h| irradiance.hour(h)[surface])
                    .mean()
            })
        });

        Self {
            monthly_dry_bulb_temperature: monthly(weather.dry_bulb_temperatures()),
            monthly_dew_point_temperature: monthly(weather.dew_point_temperatures()),
            monthly_relative_humidity: monthly(weather.relative_humidities()),
            monthly_wind_speed: monthly(weather.wind_speeds()),
            monthly_global_horizontal_radiation: monthly(weather.global_horizontal_radiation()),
            monthly_surface_irradiance,
            hourly_dry_bulb_temperature: hour_of_day(weather.dry_bulb_temperatures()),
            hourly_dew_point_temperature: hour_of_day(weather.dew_point_temperatures()),
            hourly_global_horizontal_radiation: hour_of_day(
                weather.global_horizontal_radiation(),
            ),
        }
    }
}
