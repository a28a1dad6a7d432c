pub mod end_uses;
pub mod schedule;
pub mod space_heat_demand;
pub mod surface;
pub mod units;
