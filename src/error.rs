//! Error types for table loading, render validation and emission.
//!
//! Validation errors are raised before anything is written. Render errors
//! raised after emission began leave a partially written stream behind.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by a [`CellRenderer`](crate::render::CellRenderer).
pub type CellError = Box<dyn std::error::Error + Send + Sync>;

/// A violated precondition of [`render`](crate::render::render).
///
/// One variant per checked constraint. Variants that concern columns carry
/// the offending column names.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("`data` must have at least one row")]
    EmptyTable,

    #[error("`data` must have at least two columns, found {0}")]
    TooFewColumns(usize),

    #[error("`layout` must start with at least three colons (`:::`), got {0:?}")]
    InvalidLayout(String),

    #[error("`heading_levels` must not be empty")]
    EmptyHeadingLevels,

    #[error("`heading_levels` must contain only finite numbers, found {0}")]
    NonFiniteHeadingLevel(f64),

    #[error("`heading_levels` must contain only positive levels, found {0}")]
    NonPositiveHeadingLevel(f64),

    #[error("`heading_levels` must not exceed {max}, found {found}")]
    HeadingLevelTooDeep { found: f64, max: usize },

    #[error("`tabset_vars` must select at least one column")]
    NoTabsetColumns,

    #[error("`tabset_vars` must not select list columns: {}", .0.join(", "))]
    ListTabsetColumns(Vec<String>),

    #[error("`heading_levels` has length {levels}, but `tabset_vars` selects {tabsets} columns")]
    HeadingLevelsLength { levels: usize, tabsets: usize },

    #[error("`output_vars` must select at least one column")]
    NoOutputColumns,

    #[error("`tabset_vars` and `output_vars` must not share columns: {}", .0.join(", "))]
    OverlappingColumns(Vec<String>),

    #[error("`{argument}` selects columns that don't exist: {}", .columns.join(", "))]
    UnknownColumns {
        argument: &'static str,
        columns: Vec<String>,
    },
}

/// Failure while producing the panel stream.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to render a value of column `{column}`")]
    Cell {
        column: String,
        #[source]
        source: CellError,
    },

    #[error("failed to write rendered output")]
    Io(#[from] io::Error),
}

/// A table whose shape breaks the column invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("column `{column}` has {found} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("column `{0}` appears more than once")]
    DuplicateColumn(String),

    #[error("column `{0}` not found")]
    UnknownColumn(String),

    #[error("factor column `{column}` has code {code} but only {levels} levels")]
    CodeOutOfRange {
        column: String,
        code: usize,
        levels: usize,
    },

    #[error("factor column `{column}` has value {value:?} which is not among its levels")]
    UnknownLevel { column: String, value: String },

    #[error("factor column `{column}` lists level {level:?} twice")]
    DuplicateLevel { column: String, level: String },

    #[error("column `{column}` row {row}: expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        row: usize,
        expected: String,
        found: String,
    },

    #[error("column `{column}` of type {found} cannot be converted to a factor")]
    NotFactorable { column: String, found: String },
}

/// Failure while reading a table from disk or stdin.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot tell the table format of {}; pass --format json or --format csv", .0.display())]
    UnknownFormat(PathBuf),

    #[error("invalid JSON table")]
    Json(#[from] serde_json::Error),

    #[error("JSON table must be an array of row objects or an object with `columns` and `rows`")]
    JsonShape,

    #[error("JSON row {0} is not an object")]
    JsonRow(usize),

    #[error("invalid CSV table")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Table(#[from] TableError),
}
