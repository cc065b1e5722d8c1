//! Typed, column-oriented tables.
//!
//! A [`Table`] is the input of a render. Each [`Column`] stores its cells in a
//! homogeneous vector, so every row shares the same column set by
//! construction. Factor columns keep their level order for sorting and are
//! turned into text labels before emission.

pub mod load;

pub use load::{InputFormat, load_table, parse_csv, parse_json};

use crate::error::TableError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use strum::{Display, EnumString};

/// Declared type of a column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ColumnType {
    Logical,
    Integer,
    Double,
    Text,
    Factor,
    /// Opaque values (JSON objects and arrays), the equivalent of list columns
    Object,
}

/// How the cells of a column are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    /// Concatenated as text, no type markers
    Plain,
    /// Printed through the rich renderer, may span several lines
    Rich,
}

/// Cell storage of one column. `None` is a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Logical(Vec<Option<bool>>),
    Integer(Vec<Option<i64>>),
    Double(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    /// Categorical values: `codes` index into `levels`
    Factor {
        levels: Vec<String>,
        codes: Vec<Option<usize>>,
    },
    Object(Vec<serde_json::Value>),
}

/// A borrowed view of a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Missing,
    Logical(bool),
    Integer(i64),
    Double(f64),
    Text(&'a str),
    Factor { code: usize, label: &'a str },
    Object(&'a serde_json::Value),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Logical(v) => v.len(),
            ColumnData::Integer(v) => v.len(),
            ColumnData::Double(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Factor { codes, .. } => codes.len(),
            ColumnData::Object(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Logical(_) => ColumnType::Logical,
            ColumnData::Integer(_) => ColumnType::Integer,
            ColumnData::Double(_) => ColumnType::Double,
            ColumnData::Text(_) => ColumnType::Text,
            ColumnData::Factor { .. } => ColumnType::Factor,
            ColumnData::Object(_) => ColumnType::Object,
        }
    }

    /// Render kind, fixed by the column type.
    pub fn render_kind(&self) -> RenderKind {
        match self {
            ColumnData::Object(_) => RenderKind::Rich,
            _ => RenderKind::Plain,
        }
    }

    /// Cell at `row`. Panics if `row` is out of bounds.
    pub fn value(&self, row: usize) -> Value<'_> {
        match self {
            ColumnData::Logical(v) => v[row].map_or(Value::Missing, Value::Logical),
            ColumnData::Integer(v) => v[row].map_or(Value::Missing, Value::Integer),
            ColumnData::Double(v) => v[row].map_or(Value::Missing, Value::Double),
            ColumnData::Text(v) => v[row].as_deref().map_or(Value::Missing, Value::Text),
            ColumnData::Factor { levels, codes } => match codes[row] {
                Some(code) => Value::Factor {
                    code,
                    label: &levels[code],
                },
                None => Value::Missing,
            },
            ColumnData::Object(v) => Value::Object(&v[row]),
        }
    }

    /// Compare two rows of this column in ascending natural order.
    ///
    /// Missing values sort last. Doubles use a total order in which `-0.0`
    /// equals `0.0`, factors their level order. Object cells compare equal.
    pub fn compare(&self, a: usize, b: usize) -> Ordering {
        fn missing_last<T>(
            a: &Option<T>,
            b: &Option<T>,
            cmp: impl Fn(&T, &T) -> Ordering,
        ) -> Ordering {
            match (a, b) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => cmp(a, b),
            }
        }

        match self {
            ColumnData::Logical(v) => missing_last(&v[a], &v[b], Ord::cmp),
            ColumnData::Integer(v) => missing_last(&v[a], &v[b], Ord::cmp),
            ColumnData::Double(v) => missing_last(&v[a], &v[b], |a, b| {
                unsigned_zero(*a).total_cmp(&unsigned_zero(*b))
            }),
            ColumnData::Text(v) => missing_last(&v[a], &v[b], Ord::cmp),
            ColumnData::Factor { codes, .. } => missing_last(&codes[a], &codes[b], Ord::cmp),
            ColumnData::Object(_) => Ordering::Equal,
        }
    }

    /// Whether two rows hold the same value. Missing equals missing.
    pub fn same_value(&self, a: usize, b: usize) -> bool {
        match self {
            ColumnData::Object(v) => v[a] == v[b],
            _ => self.compare(a, b) == Ordering::Equal,
        }
    }

    /// Copy of the column with rows rearranged to `order`.
    pub fn take(&self, order: &[usize]) -> ColumnData {
        fn pick<T: Clone>(v: &[T], order: &[usize]) -> Vec<T> {
            order.iter().map(|&i| v[i].clone()).collect()
        }

        match self {
            ColumnData::Logical(v) => ColumnData::Logical(pick(v, order)),
            ColumnData::Integer(v) => ColumnData::Integer(pick(v, order)),
            ColumnData::Double(v) => ColumnData::Double(pick(v, order)),
            ColumnData::Text(v) => ColumnData::Text(pick(v, order)),
            ColumnData::Factor { levels, codes } => ColumnData::Factor {
                levels: levels.clone(),
                codes: pick(codes, order),
            },
            ColumnData::Object(v) => ColumnData::Object(pick(v, order)),
        }
    }

    /// Replace factor codes by their labels. Other columns are returned as is.
    pub fn into_labels(self) -> ColumnData {
        match self {
            ColumnData::Factor { levels, codes } => ColumnData::Text(
                codes
                    .into_iter()
                    .map(|code| code.map(|c| levels[c].clone()))
                    .collect(),
            ),
            other => other,
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

fn unsigned_zero(x: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x }
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn logical(name: impl Into<String>, values: impl IntoIterator<Item = bool>) -> Self {
        Self::new(name, ColumnData::Logical(values.into_iter().map(Some).collect()))
    }

    pub fn integer(name: impl Into<String>, values: impl IntoIterator<Item = i64>) -> Self {
        Self::new(name, ColumnData::Integer(values.into_iter().map(Some).collect()))
    }

    pub fn double(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(name, ColumnData::Double(values.into_iter().map(Some).collect()))
    }

    pub fn text<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            name,
            ColumnData::Text(values.into_iter().map(|s| Some(s.into())).collect()),
        )
    }

    /// Factor column from labels; the level order is the order of `levels`.
    pub fn factor<S: AsRef<str>>(
        name: impl Into<String>,
        levels: impl IntoIterator<Item = S>,
        values: impl IntoIterator<Item = S>,
    ) -> Result<Self, TableError> {
        let name = name.into();
        let levels: Vec<String> = levels.into_iter().map(|l| l.as_ref().to_string()).collect();
        let codes = values
            .into_iter()
            .map(|v| level_code(&name, &levels, v.as_ref()).map(Some))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, ColumnData::Factor { levels, codes }))
    }

    pub fn object(
        name: impl Into<String>,
        values: impl IntoIterator<Item = serde_json::Value>,
    ) -> Self {
        Self::new(name, ColumnData::Object(values.into_iter().collect()))
    }

    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    pub fn render_kind(&self) -> RenderKind {
        self.data.render_kind()
    }
}

fn level_code(column: &str, levels: &[String], value: &str) -> Result<usize, TableError> {
    levels
        .iter()
        .position(|l| l == value)
        .ok_or_else(|| TableError::UnknownLevel {
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// An ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    nrows: usize,
}

impl Table {
    /// Build a table, checking lengths, name uniqueness and factor codes.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let nrows = columns.first().map_or(0, |c| c.data.len());
        let mut seen = HashSet::new();

        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
            if column.data.len() != nrows {
                return Err(TableError::LengthMismatch {
                    column: column.name.clone(),
                    expected: nrows,
                    found: column.data.len(),
                });
            }
            if let ColumnData::Factor { levels, codes } = &column.data {
                check_factor(&column.name, levels, codes)?;
            }
        }

        Ok(Self { columns, nrows })
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Turn a text column into a factor with the given level order.
    ///
    /// A factor column is re-levelled by label. Every present value must be
    /// one of `levels`.
    pub fn into_factor(mut self, name: &str, levels: Vec<String>) -> Result<Self, TableError> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))?;

        let labels: Vec<Option<String>> = match &column.data {
            ColumnData::Text(values) => values.clone(),
            ColumnData::Factor { levels, codes } => codes
                .iter()
                .map(|code| code.map(|c| levels[c].clone()))
                .collect(),
            other => {
                return Err(TableError::NotFactorable {
                    column: name.to_string(),
                    found: other.column_type().to_string(),
                });
            }
        };

        let codes = labels
            .iter()
            .map(|label| {
                label
                    .as_deref()
                    .map(|l| level_code(name, &levels, l))
                    .transpose()
            })
            .collect::<Result<Vec<_>, _>>()?;
        check_factor(name, &levels, &codes)?;

        column.data = ColumnData::Factor { levels, codes };
        Ok(self)
    }

    /// Columns named in `names`, in that order. Unknown names are skipped.
    pub(crate) fn project(&self, names: &[String]) -> Vec<&Column> {
        names.iter().filter_map(|n| self.column(n)).collect()
    }
}

fn check_factor(
    name: &str,
    levels: &[String],
    codes: &[Option<usize>],
) -> Result<(), TableError> {
    let mut seen = HashSet::new();
    for level in levels {
        if !seen.insert(level) {
            return Err(TableError::DuplicateLevel {
                column: name.to_string(),
                level: level.clone(),
            });
        }
    }
    if let Some(&code) = codes.iter().flatten().find(|&&c| c >= levels.len()) {
        return Err(TableError::CodeOutOfRange {
            column: name.to_string(),
            code,
            levels: levels.len(),
        });
    }
    Ok(())
}
