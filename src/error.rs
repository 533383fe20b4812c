use thiserror::Error;

pub(crate) const PERIOD_FORMATS: &str =
    "Expected a period (eg. '2017', '2017-01', '2017-01-01', 'month:2017-01', 'year:2017-01:3', 'ETERNITY')";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FiscalisError {
    #[error("Invalid unit: '{0}'. Expecting any of day, month, year, eternity.")]
    InvalidUnit(String),
    #[error("Invalid size: {0}. Expecting a positive integer.")]
    InvalidSize(i64),
    #[error("Invalid offset: '{0}'. Expecting an integer, 'first-of' or 'last-of'.")]
    InvalidOffset(String),
    #[error("Invalid date: {year:04}-{month:02}-{day:02} is not a calendar date.")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("{message}; got: '{value}'.")]
    InvalidPeriod { value: String, message: String },
    #[error(
        "You tried to compute the variable '{variable}' for the entity '{entity}'; \
         however the variable '{variable}' is defined for '{defined_for}'."
    )]
    EntityMismatch { variable: String, entity: String, defined_for: String },
    #[error("Variable '{0}' was not found.")]
    VariableNotFound(String),
    #[error("Invalid roles for '{0}': a group entity needs a list of roles.")]
    InvalidRoles(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl FiscalisError {
    pub(crate) fn invalid_period(value: impl ToString) -> Self {
        Self::InvalidPeriod {
            value: value.to_string(),
            message: String::from(PERIOD_FORMATS),
        }
    }
}

pub type Result<T> = std::result::Result<T, FiscalisError>;

// Helper conversions
impl From<config::ConfigError> for FiscalisError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
