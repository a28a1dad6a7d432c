use crate::external_conditions::{Location, WeatherData};
use anyhow::{anyhow, Context};
use csv::ReaderBuilder as CsvReaderBuilder;
use std::io::Read;

// header (LOCATION row) columns
const COLUMN_LATITUDE: usize = 6;
const COLUMN_LONGITUDE: usize = 7;
const COLUMN_TIMEZONE: usize = 8;

// data row columns
const COLUMN_AIR_TEMP: usize = 6; // dry bulb temp in degrees
const COLUMN_DEW_POINT: usize = 7; // dew point temp in degrees
const COLUMN_RELATIVE_HUMIDITY: usize = 8; // in %
const COLUMN_GLOBAL_HOR_RAD: usize = 13; // global horizontal irradiation in Wh/m2
const COLUMN_DNI_RAD: usize = 14; // direct beam normal irradiation in Wh/m2
const COLUMN_DIF_RAD: usize = 15; // diffuse irradiation (horizontal plane) in Wh/m2
const COLUMN_WIND_SPEED: usize = 21; // wind speed in m/sec

/// EPW files have eight header rows before the hourly data
const FIRST_DATA_ROW: usize = 8;

/// Read an EnergyPlus weather (EPW) file into hourly weather series.
pub fn weather_data_from_epw(file: impl Read) -> anyhow::Result<WeatherData> {
    let mut reader = CsvReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(file);

    let mut location: Option<Location> = None;
    let mut air_temperatures = vec![];
    let mut dew_points = vec![];
    let mut relative_humidities = vec![];
    let mut global_hor_rad = vec![];
    let mut dir_beam_rad = vec![];
    let mut diff_hor_rad = vec![];
    let mut wind_speeds = vec![];

    for (i, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Could not read row {i} of weather file"))?;
        if i == 0 {
            location = Some(Location {
                latitude: parse_field(&record, COLUMN_LATITUDE, i)?,
                longitude: parse_field(&record, COLUMN_LONGITUDE, i)?,
                timezone: parse_field(&record, COLUMN_TIMEZONE, i)?,
            });
        } else if i >= FIRST_DATA_ROW {
            air_temperatures.push(parse_field(&record, COLUMN_AIR_TEMP, i)?);
            dew_points.push(parse_field(&record, COLUMN_DEW_POINT, i)?);
            relative_humidities.push(parse_field(&record, COLUMN_RELATIVE_HUMIDITY, i)?);
            global_hor_rad.push(parse_field(&record, COLUMN_GLOBAL_HOR_RAD, i)?);
            dir_beam_rad.push(parse_field(&record, COLUMN_DNI_RAD, i)?);
            diff_hor_rad.push(parse_field(&record, COLUMN_DIF_RAD, i)?);
            wind_speeds.push(parse_field(&record, COLUMN_WIND_SPEED, i)?);
        }
    }

    let location = location.ok_or_else(|| anyhow!("Weather file was empty"))?;

    WeatherData::new(
        location,
        air_temperatures,
        dew_points,
        relative_humidities,
        global_hor_rad,
        dir_beam_rad,
        diff_hor_rad,
        wind_speeds,
    )
}

fn parse_field(record: &csv::StringRecord, column: usize, row: usize) -> anyhow::Result<f64> {
    let field = record
        .get(column)
        .ok_or_else(|| anyhow!("Weather file row {row} has no column {column}"))?;
    field.trim().parse().with_context(|| {
        format!("Weather file row {row} column {column} was not a number: '{field}'")
    })
}
