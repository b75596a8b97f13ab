//! Error types for backdrop.
//!
//! Only the edges of the engine can fail: parsing or loading a parameter set,
//! applying a mistyped change notification, and writing an export to disk.
//! The frame loop itself is infallible; numerical faults are handled by the
//! sanitizer instead of surfacing as errors.

use std::path::PathBuf;

/// Errors raised while reading, writing or modifying a parameter set.
#[derive(thiserror::Error, Debug)]
pub enum ParamError {
    /// A color string was not `#rgb` or `#rrggbb` hex.
    #[error("invalid hex color {0:?}")]
    InvalidColor(String),

    /// A change notification carried a value of the wrong type for its key.
    #[error("parameter {key} expects {expected}, got {found}")]
    TypeMismatch {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// The parameter file could not be parsed.
    #[error("failed to parse parameters: {0}")]
    Parse(#[from] serde_json::Error),

    /// The parameter file could not be read or written.
    #[error("failed to access parameter file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while writing a standalone export.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// The output file could not be written.
    #[error("failed to write export to {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ParamError::InvalidColor("#zz".into());
        assert!(err.to_string().contains("invalid hex color"));

        let err = ParamError::TypeMismatch {
            key: "count",
            expected: "number",
            found: "bool",
        };
        assert_eq!(err.to_string(), "parameter count expects number, got bool");
    }

    #[test]
    fn test_io_preserves_source() {
        let err = ExportError::Io {
            path: "out.html".into(),
            source: std::io::Error::other("disk full"),
        };
        assert!(err.to_string().contains("disk full"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
