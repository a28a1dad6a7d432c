use thiserror::Error;

#[derive(Debug, Error)]
pub enum IsoModelError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Weather data could not be used: {0}")]
    InvalidWeather(WeatherDataError),
    #[error("Error identified while building the hourly model: {0}")]
    FailureInCalculation(#[from] SimulationCoreError),
    #[error("Error while writing results: {0}")]
    Output(OutputError),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct SimulationCoreError {
    error: anyhow::Error,
}

impl SimulationCoreError {
    pub(crate) fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct WeatherDataError {
    error: anyhow::Error,
}

impl WeatherDataError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct OutputError {
    error: anyhow::Error,
}

impl OutputError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}
