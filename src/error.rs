#[cfg(feature = "python")]
use pyo3::exceptions::{PyRuntimeError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubtotalError {
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Duplicate dimension: {0}")]
    DuplicateDimension(String),

    #[error("Duplicate aggregation target: {0}")]
    DuplicateAggregation(String),

    #[error("Column '{0}' is used both as a dimension and as an aggregation target")]
    OverlappingColumn(String),

    #[error("Aggregation spec is empty")]
    EmptyAggregation,

    #[error("Unknown reduction: '{0}'. Must be one of sum, max, min, mean, count")]
    UnknownReduction(String),

    #[error("Dimension column '{column}' already contains the sentinel value '{sentinel}'")]
    SentinelCollision { column: String, sentinel: String },

    #[error("Type mismatch in column '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: String,
    },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("InvalidData: {0}")]
    InvalidData(String),
}

impl SubtotalError {
    /// True for errors caused by the caller's dimension list or aggregation
    /// spec not fitting the input table.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn(_)
                | Self::DuplicateDimension(_)
                | Self::DuplicateAggregation(_)
                | Self::OverlappingColumn(_)
                | Self::EmptyAggregation
                | Self::UnknownReduction(_)
                | Self::SentinelCollision { .. }
        )
    }
}

#[cfg(feature = "python")]
impl From<SubtotalError> for PyErr {
    fn from(err: SubtotalError) -> PyErr {
        if err.is_configuration() || matches!(err, SubtotalError::TypeMismatch { .. }) {
            PyValueError::new_err(err.to_string())
        } else {
            PyRuntimeError::new_err(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_classified() {
        assert!(SubtotalError::MissingColumn("tier".into()).is_configuration());
        assert!(SubtotalError::SentinelCollision {
            column: "tier".into(),
            sentinel: "Total".into()
        }
        .is_configuration());
        assert!(!SubtotalError::TypeMismatch {
            column: "tier".into(),
            expected: "String",
            found: "i64".into()
        }
        .is_configuration());
        assert!(!SubtotalError::InvalidData("x".into()).is_configuration());
    }

    #[test]
    fn messages_name_the_column() {
        let err = SubtotalError::TypeMismatch {
            column: "tier".into(),
            expected: "String",
            found: "i64".into(),
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch in column 'tier': expected String, found i64"
        );
    }
}
