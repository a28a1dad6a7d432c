pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const MEGAJOULES_PER_KILOWATT_HOUR: f64 = 3.6;
/// 1 L/s expressed in m3/h
pub const CUBIC_METRES_PER_HOUR_PER_LITRE_PER_SECOND: f64 = 3.6;
pub const SECONDS_PER_HOUR: u32 = 3_600;
pub const HOURS_PER_DAY: u32 = 24;
pub const DAYS_PER_WEEK: u32 = 7;
pub const DAYS_PER_YEAR: u32 = 365;
pub const HOURS_PER_YEAR: usize = 8_760;
pub const MONTHS_PER_YEAR: usize = 12;
pub const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Convert an hourly power intensity in W/m2 into energy in kWh/m2 for that hour
pub fn watt_hours_to_kilowatt_hours(value: f64) -> f64 {
    value / WATTS_PER_KILOWATT as f64
}

/// Average continuous power in W over a year that delivers the given energy in MJ
pub fn annual_megajoules_to_mean_watts(energy: f64) -> f64 {
    energy / MEGAJOULES_PER_KILOWATT_HOUR * WATTS_PER_KILOWATT as f64 / HOURS_PER_YEAR as f64
}
