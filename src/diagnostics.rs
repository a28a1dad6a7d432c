use crate::core::schedule::{ScheduleChannel, WeeklySchedule};
use crate::core::space_heat_demand::zone::NetworkConstants;
use crate::corpus::HourResult;
use itertools::Itertools;
use parking_lot::Mutex;
use std::fmt::Debug;
use tracing::{debug, trace};

/// Receives intermediate values from a simulation run.
///
/// Every method defaults to doing nothing, so a sink only overrides what it is interested in.
pub trait DiagnosticsSink: Debug {
    /// A schedule channel sampled as a 24x7 table, before the hourly loop starts.
    fn weekly_schedule(&self, _channel: ScheduleChannel, _schedule: &WeeklySchedule) {}

    /// The loop-invariant network constants.
    fn derived_constants(&self, _constants: &NetworkConstants) {}

    fn hour(&self, _hour_of_year: usize, _result: &HourResult) {}

    /// Whether the sink discards everything, so that callers can skip building its inputs.
    fn is_noop(&self) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDiagnostics;

impl DiagnosticsSink for NoopDiagnostics {
    fn is_noop(&self) -> bool {
        true
    }
}

/// Forwards everything to `tracing`: schedules and constants at debug level, hours at trace.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn weekly_schedule(&self, channel: ScheduleChannel, schedule: &WeeklySchedule) {
        for (hour, row) in schedule.rows().enumerate() {
            debug!(%channel, hour, values = %row.iter().join(","), "weekly schedule");
        }
    }

    fn derived_constants(&self, constants: &NetworkConstants) {
        debug!(?constants, "derived network constants");
    }

    fn hour(&self, hour_of_year: usize, result: &HourResult) {
        trace!(hour_of_year, ?result);
    }
}

/// Keeps every hourly record in memory, in hour order.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    constants: Mutex<Option<NetworkConstants>>,
    hours: Mutex<Vec<HourResult>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn constants(&self) -> Option<NetworkConstants> {
        *self.constants.lock()
    }

    pub fn hours(&self) -> Vec<HourResult> {
        self.hours.lock().clone()
    }
}

impl DiagnosticsSink for RecordingDiagnostics {
    fn derived_constants(&self, constants: &NetworkConstants) {
        *self.constants.lock() = Some(*constants);
    }

    fn hour(&self, _hour_of_year: usize, result: &HourResult) {
        self.hours.lock().push(*result);
    }
}

impl<T: DiagnosticsSink> DiagnosticsSink for &T {
    fn weekly_schedule(&self, channel: ScheduleChannel, schedule: &WeeklySchedule) {
        (*self).weekly_schedule(channel, schedule)
    }

    fn derived_constants(&self, constants: &NetworkConstants) {
        (*self).derived_constants(constants)
    }

    fn hour(&self, hour_of_year: usize, result: &HourResult) {
        (*self).hour(hour_of_year, result)
    }

    fn is_noop(&self) -> bool {
        (*self).is_noop()
    }
}

/// Sends everything to both sinks.
impl<A: DiagnosticsSink, B: DiagnosticsSink> DiagnosticsSink for (A, B) {
    fn weekly_schedule(&self, channel: ScheduleChannel, schedule: &WeeklySchedule) {
        self.0.weekly_schedule(channel, schedule);
        self.1.weekly_schedule(channel, schedule);
    }

    fn derived_constants(&self, constants: &NetworkConstants) {
        self.0.derived_constants(constants);
        self.1.derived_constants(constants);
    }

    fn hour(&self, hour_of_year: usize, result: &HourResult) {
        self.0.hour(hour_of_year, result);
        self.1.hour(hour_of_year, result);
    }

    fn is_noop(&self) -> bool {
        self.0.is_noop() && self.1.is_noop()
    }
}
