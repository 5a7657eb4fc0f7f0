use thiserror::Error;

/// Input rejected before any state is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Subject code is required")]
    MissingSubject,
    #[error("Name is required")]
    MissingName,
    #[error("Roll number is required")]
    MissingRollNumber,
    #[error("Period must be a positive number, got {0}")]
    InvalidPeriod(u32),
    #[error("Period {0} is configured more than once")]
    DuplicatePeriod(u32),
    #[error("No class with id '{0}'")]
    UnknownClass(String),
}
