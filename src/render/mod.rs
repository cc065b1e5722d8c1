//! Rendering grouped tables as nested panel tabsets.
//!
//! A render runs in three phases:
//!
//! 1. [`validate`](validate::validate) checks the arguments against the table
//!    and resolves them into a [`RenderPlan`];
//! 2. [`partition`](partition::partition) projects and sorts the table and
//!    computes the [`BoundaryTable`];
//! 3. [`Emitter`] walks the sorted rows and writes the markup.
//!
//! The first two phases write nothing, so a call that fails validation leaves
//! the sink untouched.

pub mod cell;
pub mod emit;
pub mod markup;
pub mod partition;
pub mod validate;

pub use cell::{CellRenderer, DefaultRenderer, plain_text};
pub use emit::Emitter;
pub use markup::{HeadingLevel, Layout, PanelStyle};
pub use partition::{Boundary, BoundaryTable, Partition};
pub use validate::RenderPlan;

use crate::error::RenderError;
use crate::table::Table;
use std::io::Write;

/// Arguments of a render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    /// Columns whose values become nested tabs, outermost first
    pub tabset_vars: Vec<String>,
    /// Columns printed as the content of each innermost tab
    pub output_vars: Vec<String>,
    /// Layout div wrapped around each content block, e.g. `::: {layout-ncol=2}`
    pub layout: Option<String>,
    /// Per level: `None` for a panel tabset, `Some(n)` for level-`n` headings
    pub heading_levels: Option<Vec<Option<f64>>>,
    pub panel_style: PanelStyle,
    /// Render tabs as pills
    pub pills: bool,
}

impl RenderOptions {
    pub fn new<T, O>(
        tabset_vars: impl IntoIterator<Item = T>,
        output_vars: impl IntoIterator<Item = O>,
    ) -> Self
    where
        T: Into<String>,
        O: Into<String>,
    {
        Self {
            tabset_vars: tabset_vars.into_iter().map(Into::into).collect(),
            output_vars: output_vars.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn with_heading_levels(mut self, levels: impl IntoIterator<Item = Option<f64>>) -> Self {
        self.heading_levels = Some(levels.into_iter().collect());
        self
    }

    pub fn with_panel_style(mut self, style: PanelStyle) -> Self {
        self.panel_style = style;
        self
    }

    pub fn with_pills(mut self, pills: bool) -> Self {
        self.pills = pills;
        self
    }
}

/// Render `table` into `out` as nested panel tabsets.
///
/// Validation failures are returned before anything is written. A failure
/// during emission (a rich cell render or a write) leaves `out` holding a
/// partial document.
///
/// # Example
///
/// ```
/// use tabset::render::{DefaultRenderer, RenderOptions, render};
/// use tabset::table::{Column, Table};
///
/// let table = Table::new(vec![
///     Column::text("fruit", ["apple", "pear"]),
///     Column::integer("count", [3, 5]),
/// ])?;
///
/// let mut out = Vec::new();
/// render(&table, &RenderOptions::new(["fruit"], ["count"]), &DefaultRenderer, &mut out)?;
///
/// let text = String::from_utf8(out)?;
/// assert!(text.starts_with("::: {.panel-tabset}\n\n# apple\n\n3\n\n"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn render<W: Write>(
    table: &Table,
    options: &RenderOptions,
    renderer: &dyn CellRenderer,
    out: W,
) -> Result<(), RenderError> {
    let plan = validate::validate(table, options)?;
    tracing::debug!(
        rows = table.nrows(),
        tabset_vars = ?plan.tabset_vars,
        output_vars = ?plan.output_vars,
        "rendering tabsets"
    );

    let partition = partition::partition(table, &plan);
    Emitter::new(&plan, renderer, out).emit(&partition)
}

/// Render into a string with the [`DefaultRenderer`].
pub fn render_to_string(table: &Table, options: &RenderOptions) -> Result<String, RenderError> {
    let mut out = Vec::new();
    render(table, options, &DefaultRenderer, &mut out)?;
    // Every fragment written is valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::table::{Column, Table};
    use serde_json::json;

    fn table() -> Table {
        Table::new(vec![
            Column::text("g1", ["B", "A", "A"]),
            Column::text("g2", ["X", "Y", "X"]),
            Column::integer("v", [30, 20, 10]),
            Column::object("obj", [json!(1), json!(2), json!(3)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_render_is_idempotent() {
        let options = RenderOptions::new(["g1", "g2"], ["v"]);
        let first = render_to_string(&table(), &options).unwrap();
        let second = render_to_string(&table(), &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_ignores_input_order() {
        let shuffled = Table::new(vec![
            Column::text("g1", ["A", "B", "A"]),
            Column::text("g2", ["Y", "X", "X"]),
            Column::integer("v", [20, 30, 10]),
            Column::object("obj", [json!(2), json!(1), json!(3)]),
        ])
        .unwrap();
        let options = RenderOptions::new(["g1", "g2"], ["v"]);
        assert_eq!(
            render_to_string(&table(), &options).unwrap(),
            render_to_string(&shuffled, &options).unwrap()
        );
    }

    #[test]
    fn test_validation_failure_writes_nothing() {
        let mut out = Vec::new();
        let err = render(
            &table(),
            &RenderOptions::new(["obj"], ["v"]),
            &DefaultRenderer,
            &mut out,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            RenderError::Validation(ValidationError::ListTabsetColumns(ref cols)) if cols == &["obj"]
        ));
        assert!(err.to_string().contains("obj"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_oversized_heading_level_rejected() {
        let options = RenderOptions::new(["g1"], ["v"]).with_heading_levels([Some(1e300)]);
        let err = render_to_string(&table(), &options).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Validation(ValidationError::HeadingLevelTooDeep { max: 6, .. })
        ));

        let deepest = RenderOptions::new(["g1"], ["v"]).with_heading_levels([Some(6.9)]);
        let out = render_to_string(&table(), &deepest).unwrap();
        assert!(out.starts_with("###### A\n\n"));
    }

    #[test]
    fn test_signed_zero_is_one_group() {
        let table = Table::new(vec![
            Column::double("g", [-0.0, 1.0, 0.0]),
            Column::integer("v", [1, 2, 3]),
        ])
        .unwrap();
        let out = render_to_string(&table, &RenderOptions::new(["g"], ["v"])).unwrap();
        let headings: Vec<_> = out.lines().filter(|l| l.starts_with("# ")).collect();
        assert_eq!(headings, vec!["# 0", "# 1"]);
    }

    #[test]
    fn test_panels_balanced() {
        let table = Table::new(vec![
            Column::text("a", ["p", "q", "p", "r", "q"]),
            Column::text("b", ["1", "1", "2", "1", "2"]),
            Column::text("c", ["x", "y", "x", "x", "z"]),
            Column::integer("v", [1, 2, 3, 4, 5]),
        ])
        .unwrap();
        let out = render_to_string(&table, &RenderOptions::new(["a", "b", "c"], ["v"])).unwrap();

        let opens = out.lines().filter(|l| l.starts_with("::: {")).count();
        let closes = out.lines().filter(|l| *l == ":::").count();
        assert_eq!(opens, closes);

        // One outer tabset, one per distinct `a`, one per distinct (a, b)
        assert_eq!(opens, 1 + 3 + 5);

        // Nesting depth never goes negative and ends at zero
        let mut depth = 0i32;
        for line in out.lines() {
            if line.starts_with("::: {") {
                depth += 1;
            } else if line == ":::" {
                depth -= 1;
                assert!(depth >= 0);
            }
        }
        assert_eq!(depth, 0);
    }
}
