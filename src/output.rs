use crate::core::end_uses::{EndUseCategory, EndUses, FuelType};
use crate::corpus::{HourResult, RunResults};
use anyhow::anyhow;
use csv::WriterBuilder;
use formatx::formatx;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use strum::IntoEnumIterator;

pub(crate) const MONTHLY_RESULTS_KEY: &str = "results_monthly";
pub(crate) const HOURLY_RESULTS_KEY: &str = "results_hourly";

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub trait Output: Debug {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    /// `file_template` names each file, with `{}` standing in for the location key,
    /// e.g. `"office__{}.csv"`.
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        let file_name = formatx!(&self.file_template, location_key)
            .map_err(|err| anyhow!("Output file template could not be used: {err:?}"))?;
        Ok(BufWriter::new(File::create(
            self.directory_path.join(file_name),
        )?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(&self, _location_key: &str) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

fn end_use_headings() -> impl Iterator<Item = String> {
    FuelType::iter().flat_map(|fuel| {
        EndUseCategory::iter().map(move |category| format!("{fuel} {category}"))
    })
}

fn end_use_row(label: &str, end_uses: &EndUses) -> Vec<String> {
    let mut row = vec![label.to_string()];
    row.extend(end_uses.iter().map(|(_, _, value)| value.to_string()));
    row.push(end_uses.total().to_string());
    row
}

/// Write monthly end uses as CSV: a heading row, a units row, one row per month and a row
/// for the annual totals.
pub fn write_monthly_results(output: &impl Output, results: &RunResults) -> anyhow::Result<()> {
    if output.is_noop() {
        return Ok(());
    }

    let writer = output.writer_for_location_key(MONTHLY_RESULTS_KEY)?;
    let mut writer = WriterBuilder::new().flexible(false).from_writer(writer);

    let headings = end_use_headings().collect::<Vec<_>>();
    let mut heading_row = vec!["Month".to_string()];
    heading_row.extend(headings.iter().cloned());
    heading_row.push("Total".to_string());
    writer.write_record(&heading_row)?;

    let mut units_row = vec![String::new()];
    units_row.extend(vec!["[kWh/m2]".to_string(); headings.len() + 1]);
    writer.write_record(&units_row)?;

    for (month, end_uses) in MONTH_NAMES.iter().zip(&results.monthly) {
        writer.write_record(end_use_row(month, end_uses))?;
    }
    writer.write_record(end_use_row("Annual", &results.annual()))?;

    writer.flush()?;
    Ok(())
}

const HOURLY_HEADINGS: [(&str, &str); 12] = [
    ("Hour", "[count]"),
    ("Heating need", "[W/m2]"),
    ("Cooling need", "[W/m2]"),
    ("Interior lighting", "[W/m2]"),
    ("Exterior lighting", "[W/m2]"),
    ("Fans", "[W/m2]"),
    ("Pumps", "[W/m2]"),
    ("Interior equipment", "[W/m2]"),
    ("Exterior equipment", "[W/m2]"),
    ("Hot water", "[W/m2]"),
    ("Internal air temp", "[deg C]"),
    ("Mass temp", "[deg C]"),
];

/// Write one CSV row per simulated hour.
pub fn write_hourly_results(output: &impl Output, hours: &[HourResult]) -> anyhow::Result<()> {
    if output.is_noop() {
        return Ok(());
    }

    let writer = output.writer_for_location_key(HOURLY_RESULTS_KEY)?;
    let mut writer = WriterBuilder::new().flexible(false).from_writer(writer);

    writer.write_record(HOURLY_HEADINGS.iter().map(|(heading, _)| heading))?;
    writer.write_record(HOURLY_HEADINGS.iter().map(|(_, unit)| unit))?;

    for (hour, result) in hours.iter().enumerate() {
        writer.write_record(&[
            hour.to_string(),
            result.heating_need.to_string(),
            result.cooling_need.to_string(),
            result.interior_lighting.to_string(),
            result.exterior_lighting.to_string(),
            result.fans.to_string(),
            result.pumps.to_string(),
            result.interior_equipment.to_string(),
            result.exterior_equipment.to_string(),
            result.hot_water.to_string(),
            result.temp_air.to_string(),
            result.temp_mass.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
