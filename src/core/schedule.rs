use crate::core::units::{DAYS_PER_WEEK, HOURS_PER_DAY};
use crate::input::{ExternalScheduleInput, Input, Population, PriceResponsiveInput, ScheduleInput};
use crate::simulation_time::TimeFrame;
use anyhow::bail;
use std::fmt::Debug;
use strum_macros::{Display, EnumCount, EnumIter};

const HOURS: usize = HOURS_PER_DAY as usize;
const DAYS: usize = DAYS_PER_WEEK as usize;

/// Source of one operating-schedule channel, looked up by hour of day (0-23) and day of week
/// (0-6, day 0 being the first day of the year).
pub trait ScheduleProvider: Debug + Send + Sync {
    fn value_at(&self, hour_of_day: usize, day_of_week: usize) -> f64;

    /// Expand into one value per hour of the year.
    fn expand(&self, frame: &TimeFrame) -> Vec<f64> {
        frame
            .iter()
            .map(|entry| self.value_at(entry.hour_of_day as usize, entry.day_of_week as usize))
            .collect()
    }

    /// The provider sampled as a 24x7 table.
    fn to_weekly(&self) -> WeeklySchedule {
        let mut values = [[0.; DAYS]; HOURS];
        for (hour, row) in values.iter_mut().enumerate() {
            for (day, value) in row.iter_mut().enumerate() {
                *value = self.value_at(hour, day);
            }
        }
        WeeklySchedule { values }
    }
}

/// Occupied period, inclusive at both ends for hours and days.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OccupancyWindow {
    hour_start: usize,
    hour_end: usize,
    day_start: usize,
    day_end: usize,
}

impl OccupancyWindow {
    pub fn new(hour_start: usize, hour_end: usize, day_start: usize, day_end: usize) -> Self {
        Self {
            hour_start,
            hour_end,
            day_start,
            day_end,
        }
    }

    pub fn hour_occupied(&self, hour_of_day: usize) -> bool {
        (self.hour_start..=self.hour_end).contains(&hour_of_day)
    }

    pub fn day_occupied(&self, day_of_week: usize) -> bool {
        (self.day_start..=self.day_end).contains(&day_of_week)
    }

    pub fn is_occupied(&self, hour_of_day: usize, day_of_week: usize) -> bool {
        self.hour_occupied(hour_of_day) && self.day_occupied(day_of_week)
    }
}

impl From<&Population> for OccupancyWindow {
    fn from(population: &Population) -> Self {
        Self::new(
            population.hour_start as usize,
            population.hour_end as usize,
            population.day_start as usize,
            population.day_end as usize,
        )
    }
}

/// A 24x7 table of values, indexed `[hour_of_day][day_of_week]`.
#[derive(Clone, Debug, PartialEq)]
pub struct WeeklySchedule {
    values: [[f64; DAYS]; HOURS],
}

impl WeeklySchedule {
    pub fn constant(value: f64) -> Self {
        Self {
            values: [[value; DAYS]; HOURS],
        }
    }

    /// `occupied` inside the window, `unoccupied` outside it.
    pub fn from_occupancy(window: &OccupancyWindow, occupied: f64, unoccupied: f64) -> Self {
        let mut values = [[unoccupied; DAYS]; HOURS];
        for (hour, row) in values.iter_mut().enumerate() {
            for (day, value) in row.iter_mut().enumerate() {
                if window.is_occupied(hour, day) {
                    *value = occupied;
                }
            }
        }
        Self { values }
    }

    /// `occupied` during occupied hours on every day of the week.
    pub fn from_occupied_hours(window: &OccupancyWindow, occupied: f64, unoccupied: f64) -> Self {
        let mut values = [[unoccupied; DAYS]; HOURS];
        for (hour, row) in values.iter_mut().enumerate() {
            if window.hour_occupied(hour) {
                *row = [occupied; DAYS];
            }
        }
        Self { values }
    }

    /// Build from 24 rows of 7 values.
    pub fn from_rows(rows: &[Vec<f64>]) -> anyhow::Result<Self> {
        if rows.len() != HOURS {
            bail!("Weekly schedule needs {HOURS} rows (one per hour of day), found {}", rows.len());
        }
        let mut values = [[0.; DAYS]; HOURS];
        for (hour, (row, source)) in values.iter_mut().zip(rows).enumerate() {
            if source.len() != DAYS {
                bail!(
                    "Weekly schedule row {hour} needs {DAYS} values (one per day of week), found {}",
                    source.len()
                );
            }
            if let Some(value) = source.iter().find(|v| !v.is_finite()) {
                bail!("Weekly schedule row {hour} has a non-finite value {value}");
            }
            row.copy_from_slice(source);
        }
        Ok(Self { values })
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64; DAYS]> {
        self.values.iter()
    }
}

impl ScheduleProvider for WeeklySchedule {
    fn value_at(&self, hour_of_day: usize, day_of_week: usize) -> f64 {
        self.values[hour_of_day % HOURS][day_of_week % DAYS]
    }
}

/// A caller-supplied weekly table.
#[derive(Clone, Debug, PartialEq)]
pub struct ExternalSchedule {
    table: WeeklySchedule,
}

impl ExternalSchedule {
    pub fn new(rows: &[Vec<f64>]) -> anyhow::Result<Self> {
        Ok(Self {
            table: WeeklySchedule::from_rows(rows)?,
        })
    }
}

impl ScheduleProvider for ExternalSchedule {
    fn value_at(&self, hour_of_day: usize, day_of_week: usize) -> f64 {
        self.table.value_at(hour_of_day, day_of_week)
    }
}

/// Shifts a base schedule by a fixed offset during peak-price hours.
#[derive(Debug)]
pub struct PriceResponsiveSchedule {
    base: Box<dyn ScheduleProvider>,
    peak: OccupancyWindow,
    offset: f64,
}

impl PriceResponsiveSchedule {
    pub fn new(base: Box<dyn ScheduleProvider>, peak: OccupancyWindow, offset: f64) -> Self {
        Self { base, peak, offset }
    }
}

impl ScheduleProvider for PriceResponsiveSchedule {
    fn value_at(&self, hour_of_day: usize, day_of_week: usize) -> f64 {
        let base = self.base.value_at(hour_of_day, day_of_week);
        if self.peak.is_occupied(hour_of_day, day_of_week) {
            base + self.offset
        } else {
            base
        }
    }
}

#[derive(Clone, Copy, Debug, Display, EnumCount, EnumIter, Eq, PartialEq)]
pub enum ScheduleChannel {
    Ventilation,
    InteriorEquipment,
    ExteriorEquipment,
    InteriorLighting,
    ExteriorLighting,
    HeatingSetpoint,
    CoolingSetpoint,
}

/// One schedule provider per operating channel, chosen when the model is built.
#[derive(Debug)]
pub struct OperatingSchedules {
    /// in L/s
    ventilation: Box<dyn ScheduleProvider>,
    /// in W/m2
    interior_equipment: Box<dyn ScheduleProvider>,
    /// in W
    exterior_equipment: Box<dyn ScheduleProvider>,
    /// in W/m2
    interior_lighting: Box<dyn ScheduleProvider>,
    /// on/off fraction; exterior lights only ever run at night
    exterior_lighting: Box<dyn ScheduleProvider>,
    heating_setpoint: Box<dyn ScheduleProvider>,
    cooling_setpoint: Box<dyn ScheduleProvider>,
}

impl OperatingSchedules {
    /// Fixed weekly schedules derived from the occupied period.
    pub fn from_occupancy(input: &Input) -> Self {
        let window = OccupancyWindow::from(&input.population);

        Self {
            ventilation: Box::new(WeeklySchedule::from_occupied_hours(
                &window,
                input.ventilation.supply_rate,
                0.,
            )),
            interior_equipment: Box::new(WeeklySchedule::from_occupancy(
                &window,
                input.building.electric_appliance_occupied,
                input.building.electric_appliance_unoccupied,
            )),
            exterior_equipment: Box::new(WeeklySchedule::constant(
                input.building.external_equipment,
            )),
            interior_lighting: Box::new(WeeklySchedule::from_occupancy(
                &window,
                input.lighting.power_density_occupied,
                input.lighting.power_density_unoccupied,
            )),
            exterior_lighting: Box::new(WeeklySchedule::constant(1.)),
            heating_setpoint: Box::new(WeeklySchedule::from_occupancy(
                &window,
                input.heating.setpoint_occupied,
                input.heating.setpoint_unoccupied,
            )),
            cooling_setpoint: Box::new(WeeklySchedule::from_occupancy(
                &window,
                input.cooling.setpoint_occupied,
                input.cooling.setpoint_unoccupied,
            )),
        }
    }

    /// Schedules selected by the input's `Schedule` section.
    pub fn from_input(input: &Input) -> anyhow::Result<Self> {
        let schedules = Self::from_occupancy(input);

        match &input.schedule {
            None => Ok(schedules),
            Some(ScheduleInput::PriceResponsive(peak)) => {
                Ok(schedules.with_price_response(peak))
            }
            Some(ScheduleInput::External(tables)) => schedules.with_external_tables(tables),
        }
    }

    fn with_price_response(mut self, peak: &PriceResponsiveInput) -> Self {
        let window = OccupancyWindow::new(
            peak.peak_hour_start as usize,
            peak.peak_hour_end as usize,
            peak.peak_day_start as usize,
            peak.peak_day_end as usize,
        );
        self.heating_setpoint = Box::new(PriceResponsiveSchedule::new(
            self.heating_setpoint,
            window,
            -peak.heating_setback,
        ));
        self.cooling_setpoint = Box::new(PriceResponsiveSchedule::new(
            self.cooling_setpoint,
            window,
            peak.cooling_setup,
        ));
        self
    }

    fn with_external_tables(mut self, tables: &ExternalScheduleInput) -> anyhow::Result<Self> {
        for (channel, table) in [
            (ScheduleChannel::Ventilation, &tables.ventilation),
            (ScheduleChannel::InteriorEquipment, &tables.interior_equipment),
            (ScheduleChannel::ExteriorEquipment, &tables.exterior_equipment),
            (ScheduleChannel::InteriorLighting, &tables.interior_lighting),
            (ScheduleChannel::ExteriorLighting, &tables.exterior_lighting),
            (ScheduleChannel::HeatingSetpoint, &tables.heating_setpoint),
            (ScheduleChannel::CoolingSetpoint, &tables.cooling_setpoint),
        ] {
            if let Some(rows) = table {
                let schedule = ExternalSchedule::new(rows)
                    .map_err(|err| err.context(format!("{channel} schedule is invalid")))?;
                *self.channel_mut(channel) = Box::new(schedule);
            }
        }
        Ok(self)
    }

    pub fn channel(&self, channel: ScheduleChannel) -> &dyn ScheduleProvider {
        match channel {
            ScheduleChannel::Ventilation => self.ventilation.as_ref(),
            ScheduleChannel::InteriorEquipment => self.interior_equipment.as_ref(),
            ScheduleChannel::ExteriorEquipment => self.exterior_equipment.as_ref(),
            ScheduleChannel::InteriorLighting => self.interior_lighting.as_ref(),
            ScheduleChannel::ExteriorLighting => self.exterior_lighting.as_ref(),
            ScheduleChannel::HeatingSetpoint => self.heating_setpoint.as_ref(),
            ScheduleChannel::CoolingSetpoint => self.cooling_setpoint.as_ref(),
        }
    }

    fn channel_mut(&mut self, channel: ScheduleChannel) -> &mut Box<dyn ScheduleProvider> {
        match channel {
            ScheduleChannel::Ventilation => &mut self.ventilation,
            ScheduleChannel::InteriorEquipment => &mut self.interior_equipment,
            ScheduleChannel::ExteriorEquipment => &mut self.exterior_equipment,
            ScheduleChannel::InteriorLighting => &mut self.interior_lighting,
            ScheduleChannel::ExteriorLighting => &mut self.exterior_lighting,
            ScheduleChannel::HeatingSetpoint => &mut self.heating_setpoint,
            ScheduleChannel::CoolingSetpoint => &mut self.cooling_setpoint,
        }
    }

    /// Expand every channel to hourly values for the year.
    pub fn expand(&self, frame: &TimeFrame) -> HourlySchedules {
        HourlySchedules {
            ventilation: self.ventilation.expand(frame),
            interior_equipment: self.interior_equipment.expand(frame),
            exterior_equipment: self.exterior_equipment.expand(frame),
            interior_lighting: self.interior_lighting.expand(frame),
            exterior_lighting: self.exterior_lighting.expand(frame),
            heating_setpoint: self.heating_setpoint.expand(frame),
            cooling_setpoint: self.cooling_setpoint.expand(frame),
        }
    }
}

/// Operating schedules flattened to one value per hour of the year.
#[derive(Clone, Debug, PartialEq)]
pub struct HourlySchedules {
    pub ventilation: Vec<f64>,
    pub interior_equipment: Vec<f64>,
    pub exterior_equipment: Vec<f64>,
    pub interior_lighting: Vec<f64>,
    pub exterior_lighting: Vec<f64>,
    pub heating_setpoint: Vec<f64>,
    pub cooling_setpoint: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tests::{input_from, small_office_json};
    use crate::simulation_time::TimeFrame;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;
    use strum::IntoEnumIterator;

    #[fixture]
    fn window() -> OccupancyWindow {
        OccupancyWindow::new(8, 17, 1, 5)
    }

    #[fixture]
    fn input() -> Input {
        input_from(&small_office_json()).unwrap()
    }

    #[rstest]
    #[case(7, 1, false)]
    #[case(8, 1, true)]
    #[case(17, 5, true)]
    #[case(18, 5, false)]
    #[case(12, 0, false)]
    #[case(12, 6, false)]
    fn occupancy_window_should_be_closed_at_both_ends(
        window: OccupancyWindow,
        #[case] hour: usize,
        #[case] day: usize,
        #[case] expected: bool,
    ) {
        assert_eq!(window.is_occupied(hour, day), expected);
    }

    #[rstest]
    fn occupancy_schedule_should_cover_every_slot_exactly_once(window: OccupancyWindow) {
        let schedule = WeeklySchedule::from_occupancy(&window, 1., 0.);
        let occupied: f64 = schedule.rows().flatten().sum();

        // 10 hours (8..=17) on 5 days (1..=5)
        assert_eq!(occupied, 50.);
        assert_eq!(schedule.rows().count(), 24);
    }

    #[rstest]
    fn occupied_hours_schedule_should_ignore_day(window: OccupancyWindow) {
        let schedule = WeeklySchedule::from_occupied_hours(&window, 500., 0.);
        assert_eq!(schedule.value_at(8, 0), 500.);
        assert_eq!(schedule.value_at(17, 6), 500.);
        assert_eq!(schedule.value_at(18, 3), 0.);
    }

    #[rstest]
    fn expand_should_follow_the_calendar(window: OccupancyWindow) {
        let frame = TimeFrame::new();
        let hourly = WeeklySchedule::from_occupancy(&window, 21., 15.).expand(&frame);

        assert_eq!(hourly.len(), 8760);
        // hour 0 is midnight on day 0
        assert_eq!(hourly[0], 15.);
        // 08:00 on day 1
        assert_eq!(hourly[24 + 8], 21.);
        // 08:00 on day 7 wraps to day-of-week 0
        assert_eq!(hourly[7 * 24 + 8], 15.);
    }

    #[rstest]
    fn should_reject_malformed_tables() {
        assert!(WeeklySchedule::from_rows(&vec![vec![0.; 7]; 23]).is_err());

        let mut rows = vec![vec![0.; 7]; 24];
        rows[5] = vec![0.; 6];
        let error = WeeklySchedule::from_rows(&rows).unwrap_err();
        assert!(error.to_string().contains("row 5"));
    }

    #[rstest]
    fn price_response_should_only_shift_peak_hours() {
        let base = Box::new(WeeklySchedule::constant(24.));
        let schedule =
            PriceResponsiveSchedule::new(base, OccupancyWindow::new(14, 18, 0, 6), 2.);

        assert_eq!(schedule.value_at(13, 2), 24.);
        assert_eq!(schedule.value_at(14, 2), 26.);
        assert_eq!(schedule.value_at(18, 2), 26.);
        assert_eq!(schedule.value_at(19, 2), 24.);
    }

    #[rstest]
    fn occupancy_schedules_should_use_input_values(input: Input) {
        let schedules = OperatingSchedules::from_input(&input).unwrap();

        assert_eq!(schedules.channel(ScheduleChannel::HeatingSetpoint).value_at(10, 2), 21.);
        assert_eq!(schedules.channel(ScheduleChannel::HeatingSetpoint).value_at(10, 0), 15.);
        assert_eq!(schedules.channel(ScheduleChannel::CoolingSetpoint).value_at(3, 3), 28.);
        assert_eq!(schedules.channel(ScheduleChannel::Ventilation).value_at(10, 0), 500.);
        assert_eq!(schedules.channel(ScheduleChannel::ExteriorLighting).value_at(3, 3), 1.);
        assert_eq!(
            schedules.channel(ScheduleChannel::ExteriorEquipment).value_at(3, 3),
            200.
        );
    }

    #[rstest]
    fn price_responsive_input_should_move_setpoints() {
        let mut value = small_office_json();
        value["Schedule"] = json!({
            "price_responsive": {
                "peak_hour_start": 14,
                "peak_hour_end": 16,
                "heating_setback": 3.0,
                "cooling_setup": 2.0
            }
        });
        let input = input_from(&value).unwrap();
        let schedules = OperatingSchedules::from_input(&input).unwrap();

        assert_eq!(schedules.channel(ScheduleChannel::HeatingSetpoint).value_at(15, 2), 18.);
        assert_eq!(schedules.channel(ScheduleChannel::CoolingSetpoint).value_at(15, 2), 26.);
        assert_eq!(schedules.channel(ScheduleChannel::CoolingSetpoint).value_at(12, 2), 24.);
    }

    #[rstest]
    fn external_tables_should_replace_only_given_channels() {
        let mut value = small_office_json();
        value["Schedule"] = json!({
            "external": {
                "interior_equipment": vec![vec![5.0; 7]; 24]
            }
        });
        let input = input_from(&value).unwrap();
        let schedules = OperatingSchedules::from_input(&input).unwrap();

        assert_eq!(schedules.channel(ScheduleChannel::InteriorEquipment).value_at(10, 2), 5.);
        assert_eq!(schedules.channel(ScheduleChannel::InteriorLighting).value_at(10, 2), 10.);
    }

    #[rstest]
    fn external_table_errors_should_name_the_channel() {
        let mut value = small_office_json();
        value["Schedule"] = json!({
            "external": {
                "cooling_setpoint": vec![vec![24.0; 7]; 12]
            }
        });
        let input = input_from(&value).unwrap();
        let error = OperatingSchedules::from_input(&input).unwrap_err();

        assert_eq!(error.to_string(), "CoolingSetpoint schedule is invalid");
    }

    #[rstest]
    fn expand_should_give_a_year_for_every_channel(input: Input) {
        let frame = TimeFrame::new();
        let schedules = OperatingSchedules::from_input(&input).unwrap();
        let hourly = schedules.expand(&frame);

        for channel in ScheduleChannel::iter() {
            assert_eq!(schedules.channel(channel).expand(&frame).len(), 8760);
        }
        assert_eq!(hourly.heating_setpoint.len(), 8760);
        assert_eq!(hourly.ventilation[24 + 10], 500.);
    }
}
