use thiserror::Error;

use crate::na::DType;

/// Error type for the grouping and rolling engines
#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", shape_mismatch_message(.label, .expected, .actual))]
    ShapeMismatch {
        label: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("{operation} does not support element type {dtype}: it cannot hold a missing value, convert to a floating type first")]
    TypeUnsupported {
        dtype: DType,
        operation: &'static str,
    },

    #[error("rolling windows must share the same `win`: expected {expected}, found {found}")]
    WindowMismatch { expected: usize, found: usize },

    #[error("length mismatch: expected {expected}, actual {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error")]
    Io(#[source] std::io::Error),

    #[error("TOML error")]
    Toml(#[source] toml::de::Error),

    #[error("JSON error")]
    Json(#[source] serde_json::Error),
}

impl Error {
    /// Whether a `ShapeMismatch` looks like an unselected multi-valued result,
    /// i.e. the leading (groups, width) dimensions agree and only trailing ones differ.
    pub fn is_multiple_outputs(&self) -> bool {
        match self {
            Error::ShapeMismatch {
                expected, actual, ..
            } => leading_dims_match(expected, actual),
            _ => false,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

fn leading_dims_match(expected: &[usize], actual: &[usize]) -> bool {
    expected.len() >= 2 && actual.len() >= 2 && expected[..2] == actual[..2]
}

fn shape_mismatch_message(label: &str, expected: &[usize], actual: &[usize]) -> String {
    if leading_dims_match(expected, actual) {
        format!(
            "the downstream needs shape {:?}, and the input `{}` has shape {:?}. \
             It looks like `{}` has multiple return values, select one of them before using it",
            expected, label, actual, label
        )
    } else {
        format!(
            "the data shape {:?} of `{}` must match the expected shape {:?}",
            actual, label, expected
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_plain() {
        let err = Error::ShapeMismatch {
            label: "alpha".to_string(),
            expected: vec![3, 4],
            actual: vec![3, 5],
        };
        assert!(!err.is_multiple_outputs());
        let msg = err.to_string();
        assert!(msg.contains("[3, 5]"));
        assert!(msg.contains("[3, 4]"));
        assert!(msg.contains("alpha"));
        assert!(!msg.contains("multiple return values"));
    }

    #[test]
    fn test_shape_mismatch_multiple_outputs() {
        let err = Error::ShapeMismatch {
            label: "beta".to_string(),
            expected: vec![3, 4],
            actual: vec![3, 4, 2],
        };
        assert!(err.is_multiple_outputs());
        let msg = err.to_string();
        assert!(msg.contains("multiple return values"));
        assert!(msg.contains("beta"));
        assert!(msg.contains("[3, 4, 2]"));
    }

    #[test]
    fn test_type_unsupported_message() {
        let err = Error::TypeUnsupported {
            dtype: DType::Int64,
            operation: "split",
        };
        assert!(err.to_string().contains("int64"));
        assert!(err.to_string().contains("split"));
    }
}
