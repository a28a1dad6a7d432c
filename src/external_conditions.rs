use crate::core::units::HOURS_PER_YEAR;
use crate::simulation_time::TimeFrame;
use crate::solar_radiation::{IrradianceTable, SolarRadiation};
use anyhow::bail;
use indexmap::IndexMap;
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::sync::Arc;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumCount, EnumIter};

/// Geographic position of the weather station.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Location {
    /// degrees north
    pub latitude: f64,
    /// degrees east (west is negative)
    pub longitude: f64,
    /// hours offset from UTC, e.g. -6 for US Central
    pub timezone: f64,
}

const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;
const TIMEZONE_RANGE: RangeInclusive<f64> = -12.0..=14.0;

impl Location {
    pub(crate) fn check_range(&self) -> anyhow::Result<()> {
        for (name, value, range) in [
            ("latitude", self.latitude, LATITUDE_RANGE),
            ("longitude", self.longitude, LONGITUDE_RANGE),
            ("timezone", self.timezone, TIMEZONE_RANGE),
        ] {
            if !range.contains(&value) {
                bail!(
                    "{name} {value} is outside {} to {}",
                    range.start(),
                    range.end()
                );
            }
        }
        Ok(())
    }
}

/// The seven hourly weather series, in column order.
#[derive(Clone, Copy, Debug, Display, EnumCount, EnumIter, Eq, PartialEq)]
pub enum WeatherField {
    DryBulbTemperature,
    DewPointTemperature,
    RelativeHumidity,
    GlobalHorizontalRadiation,
    DirectBeamRadiation,
    DiffuseHorizontalRadiation,
    WindSpeed,
}

/// A year of hourly weather, one value per hour of the representative year.
///
/// Arguments:
/// * `dry_bulb_temperatures` - outdoor air temperature, in Celsius
/// * `dew_point_temperatures` - in Celsius
/// * `relative_humidities` - in %
/// * `global_horizontal_radiation` - total irradiance on the horizontal plane, in W/m2
/// * `direct_beam_radiation` - direct normal irradiance, in W/m2
/// * `diffuse_horizontal_radiation` - in W/m2
/// * `wind_speeds` - in m/s
#[derive(Clone, Debug)]
pub struct WeatherData {
    location: Location,
    series: [Vec<f64>; 7],
}

impl WeatherData {
    pub fn new(
        location: Location,
        dry_bulb_temperatures: Vec<f64>,
        dew_point_temperatures: Vec<f64>,
        relative_humidities: Vec<f64>,
        global_horizontal_radiation: Vec<f64>,
        direct_beam_radiation: Vec<f64>,
        diffuse_horizontal_radiation: Vec<f64>,
        wind_speeds: Vec<f64>,
    ) -> anyhow::Result<Self> {
        let series = [
            dry_bulb_temperatures,
            dew_point_temperatures,
            relative_humidities,
            global_horizontal_radiation,
            direct_beam_radiation,
            diffuse_horizontal_radiation,
            wind_speeds,
        ];

        for (values, field) in series.iter().zip(WeatherField::iter()) {
            if values.len() != HOURS_PER_YEAR {
                bail!(
                    "{field} series has {} values but {HOURS_PER_YEAR} are required",
                    values.len()
                );
            }
            if let Some(hour) = values.iter().position(|v| !v.is_finite()) {
                bail!("{field} series has a non-numeric value at hour {hour}");
            }
        }

        location.check_range()?;

        Ok(Self { location, series })
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Replace the station location, e.g. when the building input overrides the file header.
    pub fn with_location(mut self, location: Location) -> anyhow::Result<Self> {
        location.check_range()?;
        self.location = location;
        Ok(self)
    }

    pub fn series(&self, field: WeatherField) -> &[f64] {
        &self.series[field as usize]
    }

    pub fn dry_bulb_temperatures(&self) -> &[f64] {
        self.series(WeatherField::DryBulbTemperature)
    }

    pub fn dew_point_temperatures(&self) -> &[f64] {
        self.series(WeatherField::DewPointTemperature)
    }

    pub fn relative_humidities(&self) -> &[f64] {
        self.series(WeatherField::RelativeHumidity)
    }

    pub fn global_horizontal_radiation(&self) -> &[f64] {
        self.series(WeatherField::GlobalHorizontalRadiation)
    }

    pub fn direct_beam_radiation(&self) -> &[f64] {
        self.series(WeatherField::DirectBeamRadiation)
    }

    pub fn diffuse_horizontal_radiation(&self) -> &[f64] {
        self.series(WeatherField::DiffuseHorizontalRadiation)
    }

    pub fn wind_speeds(&self) -> &[f64] {
        self.series(WeatherField::WindSpeed)
    }
}

/// Weather together with the irradiance table derived from it.
///
/// Both are read-only once built, so one instance can be shared between any number of
/// simulation runs for buildings at the same site.
#[derive(Clone, Debug)]
pub struct ExternalConditions {
    frame: Arc<TimeFrame>,
    weather: Arc<WeatherData>,
    irradiance: Arc<IrradianceTable>,
}

impl ExternalConditions {
    pub fn new(weather: WeatherData) -> Self {
        let frame = TimeFrame::new();
        let irradiance = SolarRadiation::new(weather.location()).irradiance_table(&frame, &weather);

        Self {
            frame: Arc::new(frame),
            weather: Arc::new(weather),
            irradiance: Arc::new(irradiance),
        }
    }

    pub fn frame(&self) -> &TimeFrame {
        &self.frame
    }

    pub fn weather(&self) -> &WeatherData {
        &self.weather
    }

    pub fn irradiance(&self) -> &IrradianceTable {
        &self.irradiance
    }
}

/// Identifies one weather year at one site. The timezone is part of the key because it moves
/// the local meridian and so the irradiance table.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct CacheKey {
    weather_id: String,
    latitude: u64,
    longitude: u64,
    timezone: u64,
}

impl CacheKey {
    fn new(weather_id: &str, location: &Location) -> Self {
        Self {
            weather_id: weather_id.to_string(),
            latitude: location.latitude.to_bits(),
            longitude: location.longitude.to_bits(),
            timezone: location.timezone.to_bits(),
        }
    }
}

/// Cache of external conditions keyed by weather source and site, so that repeated runs
/// against the same weather do not recompute the irradiance table.
#[derive(Debug, Default)]
pub struct ExternalConditionsCache {
    entries: IndexMap<CacheKey, ExternalConditions>,
}

impl ExternalConditionsCache {
    pub fn new() -> Self {
        Default::default()
    }

    /// Return the cached conditions for this weather source at `location`, building them with
    /// `weather` on a miss. The built weather is placed at `location`, so that the cached table
    /// always matches its key.
    ///
    /// Arguments:
    /// * `weather_id` - identifies the weather series, e.g. the path of the EPW file; different
    ///                  series at the same site must use different ids
    /// * `location`
    /// * `weather` - only called on a miss
    pub fn get_or_insert_with(
        &mut self,
        weather_id: &str,
        location: &Location,
        weather: impl FnOnce() -> anyhow::Result<WeatherData>,
    ) -> anyhow::Result<ExternalConditions> {
        let key = CacheKey::new(weather_id, location);
        if let Some(conditions) = self.entries.get(&key) {
            return Ok(conditions.clone());
        }

        let conditions = ExternalConditions::new(weather()?.with_location(*location)?);
        self.entries.insert(key, conditions.clone());
        Ok(conditions)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    pub(crate) fn chicago() -> Location {
        Location {
            latitude: 41.98,
            longitude: -87.92,
            timezone: -6.,
        }
    }

    /// A synthetic year: a cold-winter/warm-summer temperature swing and a clear-sky-ish
    /// daytime irradiance pattern, with no sun outside 07:00-17:00.
    pub(crate) fn synthetic_weather(location: Location) -> WeatherData {
        let frame = TimeFrame::new();
        let mut dry_bulb = vec![];
        let mut global_horizontal = vec![];
        let mut beam = vec![];
        let mut diffuse = vec![];
        for entry in frame.iter() {
            let seasonal = -((entry.day_of_year as f64 + 10.) / 365. * 2. * std::f64::consts::PI).cos();
            let diurnal = -((entry.hour_of_day as f64 - 3.) / 24. * 2. * std::f64::consts::PI).cos();
            dry_bulb.push(10. + 15. * seasonal + 4. * diurnal);

            let daylight = (7..=17).contains(&entry.hour_of_day);
            let strength = if daylight {
                ((entry.hour_of_day as f64 - 6.) / 12. * std::f64::consts::PI).sin()
            } else {
                0.
            };
            beam.push(500. * strength);
            diffuse.push(120. * strength);
            global_horizontal.push(450. * strength);
        }

        WeatherData::new(
            location,
            dry_bulb,
            vec![2.; 8760],
            vec![60.; 8760],
            global_horizontal,
            beam,
            diffuse,
            vec![4.; 8760],
        )
        .unwrap()
    }

    #[rstest]
    fn should_reject_short_series() {
        let result = WeatherData::new(
            chicago(),
            vec![0.; 8759],
            vec![0.; 8760],
            vec![0.; 8760],
            vec![0.; 8760],
            vec![0.; 8760],
            vec![0.; 8760],
            vec![0.; 8760],
        );
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("DryBulbTemperature series has 8759 values"));
    }

    #[rstest]
    fn should_reject_non_finite_values() {
        let mut wind = vec![0.; 8760];
        wind[100] = f64::NAN;
        let result = WeatherData::new(
            chicago(),
            vec![0.; 8760],
            vec![0.; 8760],
            vec![0.; 8760],
            vec![0.; 8760],
            vec![0.; 8760],
            vec![0.; 8760],
            wind,
        );
        assert!(result.unwrap_err().to_string().contains("hour 100"));
    }

    #[rstest]
    fn should_expose_series_by_field() {
        let weather = synthetic_weather(chicago());
        assert_eq!(weather.wind_speeds()[0], 4.);
        assert_eq!(weather.relative_humidities()[8759], 60.);
        assert_eq!(
            weather.series(WeatherField::DirectBeamRadiation),
            weather.direct_beam_radiation()
        );
    }

    #[rstest]
    fn cache_should_build_conditions_once_per_site() {
        let mut cache = ExternalConditionsCache::new();
        let mut builds = 0;

        for _ in 0..3 {
            cache
                .get_or_insert_with("chicago.epw", &chicago(), || {
                    builds += 1;
                    Ok(synthetic_weather(chicago()))
                })
                .unwrap();
        }

        assert_eq!(builds, 1);
        assert_eq!(cache.len(), 1);
    }

    fn constant_weather(location: Location, dry_bulb: f64) -> WeatherData {
        WeatherData::new(
            location,
            vec![dry_bulb; 8760],
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
    fn cache_should_keep_different_weather_years_at_one_site_apart() {
        let mut cache = ExternalConditionsCache::new();

        let typical = cache
            .get_or_insert_with("chicago_tmy3.epw", &chicago(), || {
                Ok(synthetic_weather(chicago()))
            })
            .unwrap();
        let heatwave = cache
            .get_or_insert_with("chicago_heatwave.epw", &chicago(), || {
                Ok(constant_weather(chicago(), 35.))
            })
            .unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(heatwave.weather().dry_bulb_temperatures()[0], 35.);
        assert_ne!(typical.weather().dry_bulb_temperatures()[0], 35.);
    }

    #[rstest]
    fn cache_should_key_on_timezone() {
        let mut cache = ExternalConditionsCache::new();
        let mut shifted = chicago();
        shifted.timezone = -5.;

        cache
            .get_or_insert_with("chicago.epw", &chicago(), || Ok(synthetic_weather(chicago())))
            .unwrap();
        let conditions = cache
            .get_or_insert_with("chicago.epw", &shifted, || Ok(synthetic_weather(chicago())))
            .unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(conditions.weather().location().timezone, -5.);
    }

    #[rstest]
    #[case(Location { latitude: 90.5, longitude: 0., timezone: 0. }, "latitude 90.5")]
    #[case(Location { latitude: 0., longitude: -181., timezone: 0. }, "longitude -181")]
    #[case(Location { latitude: 0., longitude: 0., timezone: 15. }, "timezone 15")]
    fn should_reject_out_of_range_location(#[case] location: Location, #[case] message: &str) {
        let weather = synthetic_weather(chicago());

        let error = weather.with_location(location).unwrap_err().to_string();

        assert!(error.contains(message), "{error}");
    }
}
