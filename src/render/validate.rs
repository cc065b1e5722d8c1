//! Argument checks run before anything is written.

use super::RenderOptions;
use super::markup::{HeadingLevel, Layout, MAX_HEADING_LEVEL, PanelStyle};
use crate::error::ValidationError;
use crate::table::{ColumnType, Table};

/// Normalized render arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub tabset_vars: Vec<String>,
    pub output_vars: Vec<String>,
    /// One entry per tabset column, outermost first
    pub heading_levels: Vec<HeadingLevel>,
    pub layout: Option<Layout>,
    pub panel_style: PanelStyle,
    pub pills: bool,
}

impl RenderPlan {
    /// Number of nesting levels.
    pub fn depth(&self) -> usize {
        self.tabset_vars.len()
    }
}

/// Check `options` against `table` and resolve them into a [`RenderPlan`].
///
/// Checks run in a fixed order and the first failure is returned.
pub fn validate(table: &Table, options: &RenderOptions) -> Result<RenderPlan, ValidationError> {
    if table.nrows() == 0 {
        return Err(ValidationError::EmptyTable);
    }
    if table.ncols() < 2 {
        return Err(ValidationError::TooFewColumns(table.ncols()));
    }

    let layout = options.layout.as_deref().map(Layout::parse).transpose()?;

    let heading_levels = options
        .heading_levels
        .as_deref()
        .map(normalize_heading_levels)
        .transpose()?;

    let tabset_vars = resolve_columns(table, &options.tabset_vars, "tabset_vars")?;
    if tabset_vars.is_empty() {
        return Err(ValidationError::NoTabsetColumns);
    }
    let list_columns: Vec<String> = tabset_vars
        .iter()
        .filter(|name| {
            table
                .column(name)
                .is_some_and(|c| c.column_type() == ColumnType::Object)
        })
        .cloned()
        .collect();
    if !list_columns.is_empty() {
        return Err(ValidationError::ListTabsetColumns(list_columns));
    }

    let heading_levels = match heading_levels {
        Some(levels) if levels.len() != tabset_vars.len() => {
            return Err(ValidationError::HeadingLevelsLength {
                levels: levels.len(),
                tabsets: tabset_vars.len(),
            });
        }
        Some(levels) => levels,
        None => vec![HeadingLevel::Panel; tabset_vars.len()],
    };

    let output_vars = resolve_columns(table, &options.output_vars, "output_vars")?;
    if output_vars.is_empty() {
        return Err(ValidationError::NoOutputColumns);
    }
    let overlap: Vec<String> = output_vars
        .iter()
        .filter(|name| tabset_vars.contains(name))
        .cloned()
        .collect();
    if !overlap.is_empty() {
        return Err(ValidationError::OverlappingColumns(overlap));
    }

    Ok(RenderPlan {
        tabset_vars,
        output_vars,
        heading_levels,
        layout,
        panel_style: options.panel_style,
        pills: options.pills,
    })
}

/// Existing column names in selection order, duplicates dropped.
fn resolve_columns(
    table: &Table,
    selection: &[String],
    argument: &'static str,
) -> Result<Vec<String>, ValidationError> {
    let unknown: Vec<String> = selection
        .iter()
        .filter(|name| table.column(name).is_none())
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(ValidationError::UnknownColumns {
            argument,
            columns: unknown,
        });
    }

    let mut resolved: Vec<String> = Vec::with_capacity(selection.len());
    for name in selection {
        if !resolved.contains(name) {
            resolved.push(name.clone());
        }
    }
    Ok(resolved)
}

/// `None` entries become panels; numbers are truncated to integer levels.
fn normalize_heading_levels(levels: &[Option<f64>]) -> Result<Vec<HeadingLevel>, ValidationError> {
    if levels.is_empty() {
        return Err(ValidationError::EmptyHeadingLevels);
    }

    levels
        .iter()
        .map(|level| match *level {
            None => Ok(HeadingLevel::Panel),
            Some(x) if !x.is_finite() => Err(ValidationError::NonFiniteHeadingLevel(x)),
            Some(x) if x.trunc() < 1.0 => Err(ValidationError::NonPositiveHeadingLevel(x)),
            Some(x) if x.trunc() > MAX_HEADING_LEVEL as f64 => {
                Err(ValidationError::HeadingLevelTooDeep {
                    found: x,
                    max: MAX_HEADING_LEVEL,
                })
            }
            Some(x) => Ok(HeadingLevel::Heading(x.trunc() as usize)),
        })
        .collect()
}
