use std::fmt;

/// Error parsing a `"2024/25"` style tax year label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTaxYearError {
    label: String,
}

impl ParseTaxYearError {
    pub(crate) fn new(label: &str) -> Self {
        ParseTaxYearError {
            label: label.to_string(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for ParseTaxYearError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid tax year label {:?} (expected e.g. \"2024/25\")",
            self.label
        )
    }
}

impl std::error::Error for ParseTaxYearError {}

/// Errors building simulation inputs through the builder DSL
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    /// End age is not after start age
    InvalidAgeRange { start: u8, end: u8 },
    /// A monetary input was negative or non-finite
    InvalidAmount { field: &'static str, value: f64 },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::InvalidAgeRange { start, end } => {
                write!(f, "end age {end} must be after start age {start}")
            }
            BuildError::InvalidAmount { field, value } => {
                write!(f, "{field} must be a non-negative finite amount, got {value}")
            }
        }
    }
}

impl std::error::Error for BuildError {}
