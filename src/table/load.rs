//! Reading tables from JSON and CSV.
//!
//! JSON input is either an array of row objects, whose column types are
//! inferred, or a document with explicit column declarations:
//!
//! ```json
//! {
//!   "columns": [
//!     { "name": "size", "type": "factor", "levels": ["small", "large"] },
//!     { "name": "n", "type": "integer" }
//!   ],
//!   "rows": [{ "size": "large", "n": 3 }, { "size": "small", "n": null }]
//! }
//! ```
//!
//! CSV input needs a header row. Empty fields and `NA` are missing values.

use super::{Column, ColumnData, ColumnType, Table};
use crate::error::{LoadError, TableError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::io::Read;
use std::path::{Path, PathBuf};
use strum::{Display, EnumString};

/// Input format of a table file.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InputFormat {
    /// Pick by file extension, or by content for stdin
    #[default]
    Auto,
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
struct TableDocument {
    columns: Vec<ColumnSpec>,
    #[serde(default)]
    rows: Vec<IndexMap<String, Json>>,
}

#[derive(Debug, Deserialize)]
struct ColumnSpec {
    name: String,
    #[serde(rename = "type")]
    column_type: ColumnType,
    #[serde(default)]
    levels: Vec<String>,
}

/// Load a table from `path`, or from stdin when `path` is `-`.
pub fn load_table(path: &Path, format: InputFormat) -> Result<Table, LoadError> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?
    };

    let format = match format {
        InputFormat::Auto => detect_format(path, &content)?,
        explicit => explicit,
    };
    tracing::debug!(path = %path.display(), %format, bytes = content.len(), "loading table");

    match format {
        InputFormat::Csv => parse_csv(content.as_bytes()),
        _ => parse_json(&content),
    }
}

/// Decide the format from the extension, falling back to the first
/// non-blank character for stdin.
fn detect_format(path: &Path, content: &str) -> Result<InputFormat, LoadError> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match ext.as_deref() {
        Some("json") => Ok(InputFormat::Json),
        Some("csv") => Ok(InputFormat::Csv),
        _ if path == Path::new("-") => match content.trim_start().chars().next() {
            Some('[') | Some('{') => Ok(InputFormat::Json),
            _ => Ok(InputFormat::Csv),
        },
        _ => Err(LoadError::UnknownFormat(PathBuf::from(path))),
    }
}

/// Parse a JSON table: an array of row objects or a typed document.
pub fn parse_json(content: &str) -> Result<Table, LoadError> {
    let json: Json = serde_json::from_str(content)?;
    match json {
        Json::Array(rows) => {
            let rows = rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| match row {
                    Json::Object(map) => Ok(map.into_iter().collect::<IndexMap<_, _>>()),
                    _ => Err(LoadError::JsonRow(i + 1)),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records_to_table(rows)?)
        }
        Json::Object(map) if map.contains_key("columns") => {
            let doc: TableDocument = serde_json::from_value(Json::Object(map))?;
            Ok(document_to_table(doc)?)
        }
        _ => Err(LoadError::JsonShape),
    }
}

fn records_to_table(rows: Vec<IndexMap<String, Json>>) -> Result<Table, TableError> {
    let mut names: Vec<&String> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !names.contains(&key) {
                names.push(key);
            }
        }
    }

    let columns = names
        .iter()
        .map(|&name| {
            let cells: Vec<Json> = rows
                .iter()
                .map(|row| row.get(name).cloned().unwrap_or(Json::Null))
                .collect();
            Column::new(name.clone(), infer_json_column(cells))
        })
        .collect();

    Table::new(columns)
}

/// Narrowest column type holding every non-null cell.
fn infer_json_column(cells: Vec<Json>) -> ColumnData {
    let present = || cells.iter().filter(|c| !c.is_null());

    if present().all(Json::is_boolean) {
        ColumnData::Logical(cells.iter().map(Json::as_bool).collect())
    } else if present().all(|c| c.is_i64()) {
        ColumnData::Integer(cells.iter().map(Json::as_i64).collect())
    } else if present().all(Json::is_number) {
        ColumnData::Double(cells.iter().map(Json::as_f64).collect())
    } else if present().all(Json::is_string) {
        ColumnData::Text(
            cells
                .iter()
                .map(|c| c.as_str().map(str::to_string))
                .collect(),
        )
    } else {
        ColumnData::Object(cells)
    }
}

fn document_to_table(doc: TableDocument) -> Result<Table, TableError> {
    let columns = doc
        .columns
        .into_iter()
        .map(|spec| {
            let cells: Vec<&Json> = doc
                .rows
                .iter()
                .map(|row| row.get(&spec.name).unwrap_or(&Json::Null))
                .collect();
            typed_column(spec, &cells)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Table::new(columns)
}

fn typed_column(spec: ColumnSpec, cells: &[&Json]) -> Result<Column, TableError> {
    let mismatch = |row: usize, cell: &Json| TableError::TypeMismatch {
        column: spec.name.clone(),
        row: row + 1,
        expected: spec.column_type.to_string(),
        found: json_kind(cell).to_string(),
    };

    fn convert<T>(
        cells: &[&Json],
        get: impl Fn(&Json) -> Option<T>,
        mismatch: impl Fn(usize, &Json) -> TableError,
    ) -> Result<Vec<Option<T>>, TableError> {
        cells
            .iter()
            .enumerate()
            .map(|(i, &cell)| match cell {
                Json::Null => Ok(None),
                _ => get(cell).map(Some).ok_or_else(|| mismatch(i, cell)),
            })
            .collect()
    }

    let data = match spec.column_type {
        ColumnType::Logical => ColumnData::Logical(convert(cells, Json::as_bool, mismatch)?),
        ColumnType::Integer => ColumnData::Integer(convert(cells, Json::as_i64, mismatch)?),
        ColumnType::Double => ColumnData::Double(convert(cells, Json::as_f64, mismatch)?),
        ColumnType::Text => ColumnData::Text(convert(
            cells,
            |c| c.as_str().map(str::to_string),
            mismatch,
        )?),
        ColumnType::Factor => {
            let labels = convert(cells, |c| c.as_str().map(str::to_string), mismatch)?;
            let codes = labels
                .iter()
                .map(|label| {
                    label
                        .as_ref()
                        .map(|l| {
                            spec.levels.iter().position(|level| level == l).ok_or_else(|| {
                                TableError::UnknownLevel {
                                    column: spec.name.clone(),
                                    value: l.clone(),
                                }
                            })
                        })
                        .transpose()
                })
                .collect::<Result<Vec<_>, _>>()?;
            ColumnData::Factor {
                levels: spec.levels.clone(),
                codes,
            }
        }
        ColumnType::Object => ColumnData::Object(cells.iter().map(|&c| c.clone()).collect()),
    };

    Ok(Column::new(spec.name, data))
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Parse a CSV table with a header row, inferring each column's type.
pub fn parse_csv<R: Read>(reader: R) -> Result<Table, LoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut fields: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (i, field) in record.iter().enumerate().take(headers.len()) {
            fields[i].push(match field.trim() {
                "" | "NA" => None,
                _ => Some(field.to_string()),
            });
        }
    }

    let columns = headers
        .iter()
        .zip(fields)
        .map(|(name, cells)| Column::new(name, infer_csv_column(cells)))
        .collect();

    Ok(Table::new(columns)?)
}

fn infer_csv_column(cells: Vec<Option<String>>) -> ColumnData {
    fn parse_all<T>(
        cells: &[Option<String>],
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<Vec<Option<T>>> {
        cells
            .iter()
            .map(|cell| match cell {
                None => Some(None),
                Some(s) => parse(s.trim()).map(Some),
            })
            .collect()
    }

    let logical = |s: &str| match s {
        "TRUE" | "true" | "True" => Some(true),
        "FALSE" | "false" | "False" => Some(false),
        _ => None,
    };

    if let Some(values) = parse_all(&cells, logical) {
        ColumnData::Logical(values)
    } else if let Some(values) = parse_all(&cells, |s| s.parse::<i64>().ok()) {
        ColumnData::Integer(values)
    } else if let Some(values) = parse_all(&cells, |s| s.parse::<f64>().ok()) {
        ColumnData::Double(values)
    } else {
        ColumnData::Text(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    #[test]
    fn test_parse_json_records() {
        let table = parse_json(
            r#"[
                {"g": "A", "n": 1, "x": 1.5, "ok": true, "obj": {"k": 1}},
                {"g": "B", "n": 2, "x": 2, "ok": null, "obj": [1, 2]}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["g", "n", "x", "ok", "obj"]
        );
        let types: Vec<_> = table.columns().iter().map(Column::column_type).collect();
        assert_eq!(
            types,
            vec![
                ColumnType::Text,
                ColumnType::Integer,
                ColumnType::Double,
                ColumnType::Logical,
                ColumnType::Object
            ]
        );
        assert_eq!(table.column("ok").unwrap().data.value(1), Value::Missing);
        assert_eq!(table.column("x").unwrap().data.value(1), Value::Double(2.0));
    }

    #[test]
    fn test_parse_json_keeps_key_order() {
        let table = parse_json(r#"[{"zeta": 1, "alpha": {"y": 1, "b": [2, 1]}}]"#).unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);

        match table.column("alpha").unwrap().data.value(0) {
            Value::Object(json) => {
                assert_eq!(serde_json::to_string(json).unwrap(), r#"{"y":1,"b":[2,1]}"#);
            }
            other => panic!("expected an object cell, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_json_missing_keys_are_missing() {
        let table = parse_json(r#"[{"a": "x"}, {"a": "y", "b": 3}]"#).unwrap();
        assert_eq!(table.ncols(), 2);
        assert_eq!(table.column("b").unwrap().data.value(0), Value::Missing);
    }

    #[test]
    fn test_parse_json_mixed_kinds_become_objects() {
        let table = parse_json(r#"[{"a": "x", "b": 1}, {"a": 2, "b": 2}]"#).unwrap();
        assert_eq!(table.column("a").unwrap().column_type(), ColumnType::Object);
    }

    #[test]
    fn test_parse_json_document() {
        let table = parse_json(
            r#"{
                "columns": [
                    {"name": "size", "type": "factor", "levels": ["small", "large"]},
                    {"name": "n", "type": "integer"}
                ],
                "rows": [{"size": "large", "n": 3}, {"size": "small", "n": null}]
            }"#,
        )
        .unwrap();

        let size = &table.column("size").unwrap().data;
        assert_eq!(size.value(0), Value::Factor { code: 1, label: "large" });
        assert_eq!(table.column("n").unwrap().data.value(1), Value::Missing);
    }

    #[test]
    fn test_parse_json_document_type_mismatch() {
        let err = parse_json(
            r#"{"columns": [{"name": "n", "type": "integer"}], "rows": [{"n": "three"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Table(TableError::TypeMismatch { row: 1, .. })
        ));
    }

    #[test]
    fn test_parse_json_rejects_scalars() {
        assert!(matches!(parse_json("42"), Err(LoadError::JsonShape)));
        assert!(matches!(parse_json("[1, 2]"), Err(LoadError::JsonRow(1))));
    }

    #[test]
    fn test_parse_csv_infers_types() {
        let csv = "g,n,x,flag,label\nA,1,1.5,TRUE,foo\nB,NA,2,false,\n";
        let table = parse_csv(csv.as_bytes()).unwrap();

        let types: Vec<_> = table.columns().iter().map(Column::column_type).collect();
        assert_eq!(
            types,
            vec![
                ColumnType::Text,
                ColumnType::Integer,
                ColumnType::Double,
                ColumnType::Logical,
                ColumnType::Text
            ]
        );
        assert_eq!(table.column("n").unwrap().data.value(1), Value::Missing);
        assert_eq!(table.column("label").unwrap().data.value(1), Value::Missing);
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format(Path::new("data.JSON"), "").unwrap(),
            InputFormat::Json
        );
        assert_eq!(
            detect_format(Path::new("data.csv"), "").unwrap(),
            InputFormat::Csv
        );
        assert_eq!(
            detect_format(Path::new("-"), "  [{}]").unwrap(),
            InputFormat::Json
        );
        assert_eq!(
            detect_format(Path::new("-"), "a,b\n1,2").unwrap(),
            InputFormat::Csv
        );
        assert!(matches!(
            detect_format(Path::new("data.txt"), ""),
            Err(LoadError::UnknownFormat(_))
        ));
    }
}
