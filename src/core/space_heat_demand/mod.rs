pub mod daylighting;
pub mod ventilation;
pub mod zone;
