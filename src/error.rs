use thiserror::Error;

use crate::domain::Sex;

/// Exit code for bad input files, unreadable CSVs and invalid flags.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for a covariate that cannot be assigned at all.
pub const EXIT_CONFIGURATION: u8 = 3;
/// Exit code for failures while writing outputs.
pub const EXIT_OUTPUT: u8 = 4;

/// Which interpolation axis a configuration error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Age,
    Time,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Age => write!(f, "age"),
            Axis::Time => write!(f, "time"),
        }
    }
}

/// A covariate whose lookup structure cannot be built.
///
/// Fatal for the whole covariate: no partial column is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("Covariate dataset is empty.")]
    EmptyDataset,

    #[error("Covariate is flagged by_age but record {index} has no age midpoint.")]
    MissingAge { index: usize },

    #[error("Covariate record {index} has a non-finite age, time or value.")]
    NonFiniteRecord { index: usize },

    #[error("Covariate is flagged by_sex but record {index} is for both sexes.")]
    BothSexInBySexCovariate { index: usize },

    #[error("Covariate is flagged by_sex but has no {0} records.")]
    MissingSex(Sex),

    #[error("Neither age nor time has more than one distinct value; nothing to interpolate over.")]
    NoInterpolationAxis,

    #[error("The {sex} records have fewer than two distinct {axis} values.")]
    DegenerateAxis { sex: Sex, axis: Axis },

    #[error("The {sex} grid has no value at age={age}, time={time}.")]
    IncompleteGrid { sex: Sex, age: f64, time: f64 },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::new(EXIT_OUTPUT, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ConfigurationError> for AppError {
    fn from(err: ConfigurationError) -> Self {
        Self::new(EXIT_CONFIGURATION, format!("Covariate configuration error: {err}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
