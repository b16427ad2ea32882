/// Error types for mesh loading and frustum reconstruction
use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the core
pub type Result<T> = std::result::Result<T, Error>;

/// Which raw attribute array a face corner refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Position,
    Normal,
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Attribute::Position => f.write_str("position"),
            Attribute::Normal => f.write_str("normal"),
        }
    }
}

/// Which matrix failed to invert while rebuilding a frustum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixRole {
    Projection,
    View,
}

impl std::fmt::Display for MatrixRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixRole::Projection => f.write_str("projection"),
            MatrixRole::View => f.write_str("view"),
        }
    }
}

/// Errors raised by the loader, the assembler and the frustum builder.
///
/// None of these are transient: they describe malformed static input or a
/// degenerate camera, so callers abort the operation that produced them.
#[derive(Debug, Error)]
pub enum Error {
    /// A face line declared fewer than three corners.
    #[error("line {line}: face has {corners} corner(s), at least 3 are required")]
    MalformedFace { line: usize, corners: usize },

    /// A face corner points past the end of an attribute array.
    #[error("{attribute} index {index} is out of range ({len} parsed)")]
    IndexOutOfRange {
        attribute: Attribute,
        /// 1-based index as written in the file.
        index: usize,
        len: usize,
    },

    /// A face corner has no reference for a required attribute.
    #[error("face corner has no {attribute} reference")]
    MissingAttribute { attribute: Attribute },

    /// The assembled buffer does not have the expected shape.
    #[error("mesh buffer shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },

    /// A camera matrix could not be inverted or de-homogenized.
    #[error("{which} matrix is singular or degenerate")]
    SingularMatrix { which: MatrixRole },

    /// A line could not be parsed.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The model file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
