//! The row walk that writes panel fences, headings and leaf content.

use super::cell::CellRenderer;
use super::markup::{self, PANEL_CLOSE};
use super::partition::Partition;
use super::validate::RenderPlan;
use crate::error::RenderError;
use crate::table::{RenderKind, Value};
use std::io::Write;

/// Writes one partitioned table as nested panel markup.
pub struct Emitter<'a, W: Write> {
    plan: &'a RenderPlan,
    renderer: &'a dyn CellRenderer,
    panel_open: String,
    out: W,
}

impl<'a, W: Write> Emitter<'a, W> {
    pub fn new(plan: &'a RenderPlan, renderer: &'a dyn CellRenderer, out: W) -> Self {
        Self {
            plan,
            renderer,
            panel_open: markup::panel_open(plan.panel_style, plan.pills),
            out,
        }
    }

    /// Emit every row in order. Stops at the first failing cell or write.
    pub fn emit(&mut self, partition: &Partition) -> Result<(), RenderError> {
        for row in 0..partition.nrows() {
            self.emit_row(partition, row)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn emit_row(&mut self, partition: &Partition, row: usize) -> Result<(), RenderError> {
        let plan = self.plan;
        let levels = &plan.heading_levels;
        let depth = plan.depth();
        let boundaries = &partition.boundaries;

        if levels[0].is_panel() && boundaries.get(row, 0).starts {
            Self::block(&mut self.out, &self.panel_open)?;
        }

        // Entering a new parent value announces it, then opens the child tabset
        for level in 1..depth {
            if boundaries.get(row, level).starts {
                let parent = partition.tabset_column(level - 1);
                let text = self.renderer.render_plain(&parent.data.value(row));
                let heading = markup::heading(levels[level - 1].level_or(level), &text);
                Self::block(&mut self.out, &heading)?;
                if levels[level].is_panel() {
                    Self::block(&mut self.out, &self.panel_open)?;
                }
            }
        }

        let leaf = partition.tabset_column(depth - 1);
        let text = self.renderer.render_plain(&leaf.data.value(row));
        let heading = markup::heading(levels[depth - 1].level_or(depth), &text);
        Self::block(&mut self.out, &heading)?;

        if let Some(layout) = &plan.layout {
            Self::block(&mut self.out, layout.open())?;
        }

        for column in partition.output_columns() {
            let value = column.data.value(row);
            let text = match (column.render_kind(), value) {
                (RenderKind::Rich, Value::Object(json)) => {
                    self.renderer
                        .render_rich(json)
                        .map_err(|source| RenderError::Cell {
                            column: column.name.clone(),
                            source,
                        })?
                }
                (_, value) => self.renderer.render_plain(&value),
            };
            Self::block(&mut self.out, &text)?;
        }

        if let Some(layout) = &plan.layout {
            Self::block(&mut self.out, layout.close())?;
        }

        for level in (0..depth).rev() {
            if levels[level].is_panel() && boundaries.get(row, level).ends {
                Self::block(&mut self.out, PANEL_CLOSE)?;
            }
        }

        Ok(())
    }

    /// Write `text` followed by a blank line.
    fn block(out: &mut W, text: &str) -> Result<(), RenderError> {
        write!(out, "{}\n\n", text)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CellError;
    use crate::render::{RenderOptions, partition, validate};
    use crate::table::{Column, Table};
    use serde_json::json;

    fn emit(table: &Table, options: &RenderOptions) -> String {
        emit_with(table, options, &crate::render::DefaultRenderer).unwrap()
    }

    fn emit_with(
        table: &Table,
        options: &RenderOptions,
        renderer: &dyn CellRenderer,
    ) -> Result<String, RenderError> {
        let plan = validate::validate(table, options)?;
        let part = partition::partition(table, &plan);
        let mut emitter = Emitter::new(&plan, renderer, Vec::new());
        emitter.emit(&part)?;
        Ok(String::from_utf8(emitter.into_inner()).unwrap())
    }

    /// Non-empty lines of the stream.
    fn lines(out: &str) -> Vec<&str> {
        out.lines().filter(|l| !l.is_empty()).collect()
    }

    fn two_level_table() -> Table {
        Table::new(vec![
            Column::text("g1", ["A", "A", "B"]),
            Column::text("g2", ["X", "Y", "X"]),
            Column::integer("v", [10, 20, 30]),
        ])
        .unwrap()
    }

    #[test]
    fn test_two_level_panels() {
        let out = emit(&two_level_table(), &RenderOptions::new(["g1", "g2"], ["v"]));
        assert_eq!(
            lines(&out),
            vec![
                "::: {.panel-tabset}",
                "# A",
                "::: {.panel-tabset}",
                "## X",
                "10",
                "## Y",
                "20",
                ":::",
                "# B",
                "::: {.panel-tabset}",
                "## X",
                "30",
                ":::",
                ":::",
            ]
        );
        // Every fragment is followed by a blank line
        assert!(out.starts_with("::: {.panel-tabset}\n\n# A\n\n"));
        assert!(out.ends_with(":::\n\n:::\n\n"));
    }

    #[test]
    fn test_single_level() {
        let table = Table::new(vec![
            Column::text("g", ["b", "a"]),
            Column::text("v", ["second", "first"]),
        ])
        .unwrap();
        let out = emit(&table, &RenderOptions::new(["g"], ["v"]));
        assert_eq!(
            out,
            "::: {.panel-tabset}\n\n# a\n\nfirst\n\n# b\n\nsecond\n\n:::\n\n"
        );
    }

    #[test]
    fn test_heading_level_replaces_outer_panel() {
        let options =
            RenderOptions::new(["g1", "g2"], ["v"]).with_heading_levels([Some(2.0), None]);
        let out = emit(&two_level_table(), &options);
        assert_eq!(
            lines(&out),
            vec![
                "## A",
                "::: {.panel-tabset}",
                "## X",
                "10",
                "## Y",
                "20",
                ":::",
                "## B",
                "::: {.panel-tabset}",
                "## X",
                "30",
                ":::",
            ]
        );
    }

    #[test]
    fn test_heading_level_replaces_inner_panel() {
        let options =
            RenderOptions::new(["g1", "g2"], ["v"]).with_heading_levels([None, Some(3.0)]);
        let out = emit(&two_level_table(), &options);
        assert_eq!(
            lines(&out),
            vec![
                "::: {.panel-tabset}",
                "# A",
                "### X",
                "10",
                "### Y",
                "20",
                "# B",
                "### X",
                "30",
                ":::",
            ]
        );
    }

    #[test]
    fn test_heading_level_in_middle_of_three() {
        let table = Table::new(vec![
            Column::text("g1", ["A", "A", "A", "B"]),
            Column::text("g2", ["X", "X", "Y", "X"]),
            Column::text("g3", ["p", "q", "p", "p"]),
            Column::integer("v", [1, 2, 3, 4]),
        ])
        .unwrap();
        let options = RenderOptions::new(["g1", "g2", "g3"], ["v"])
            .with_heading_levels([None, Some(2.0), None]);
        let out = emit(&table, &options);
        let lines = lines(&out);

        assert_eq!(
            lines,
            vec![
                "::: {.panel-tabset}",
                "# A",
                "## X",
                "::: {.panel-tabset}",
                "### p",
                "1",
                "### q",
                "2",
                ":::",
                "## Y",
                "::: {.panel-tabset}",
                "### p",
                "3",
                ":::",
                "# B",
                "## X",
                "::: {.panel-tabset}",
                "### p",
                "4",
                ":::",
                ":::",
            ]
        );

        let opens = lines.iter().filter(|l| l.starts_with("::: {")).count();
        let closes = lines.iter().filter(|l| **l == ":::").count();
        assert_eq!(opens, closes);
        // One heading per distinct (g1, g2) group
        assert_eq!(lines.iter().filter(|l| l.starts_with("## ")).count(), 3);
    }

    #[test]
    fn test_single_level_heading_only() {
        let table = Table::new(vec![
            Column::text("g", ["a", "b"]),
            Column::integer("v", [1, 2]),
        ])
        .unwrap();
        let options = RenderOptions::new(["g"], ["v"]).with_heading_levels([Some(4.0)]);
        assert_eq!(emit(&table, &options), "#### a\n\n1\n\n#### b\n\n2\n\n");
    }

    #[test]
    fn test_layout_wraps_each_row() {
        let options =
            RenderOptions::new(["g1", "g2"], ["v"]).with_layout(r#":::  {layout="[2,3]"}"#);
        let out = emit(&two_level_table(), &options);
        let lines = lines(&out);
        assert_eq!(
            &lines[4..8],
            &[r#":::  {layout="[2,3]"}"#, "10", ":::", "## Y"]
        );
        assert_eq!(
            lines.iter().filter(|l| l.starts_with(":::  {layout")).count(),
            3
        );
    }

    #[test]
    fn test_panel_style_and_pills() {
        let options = RenderOptions::new(["g1", "g2"], ["v"])
            .with_panel_style(crate::render::PanelStyle::Justified)
            .with_pills(true);
        let out = emit(&two_level_table(), &options);
        assert_eq!(
            lines(&out)[0],
            "::: {.panel-tabset .nav-pills .nav-justified}"
        );
        assert_eq!(
            lines(&out)
                .iter()
                .filter(|l| **l == "::: {.panel-tabset .nav-pills .nav-justified}")
                .count(),
            3
        );
    }

    #[test]
    fn test_multiple_outputs_in_order() {
        let table = Table::new(vec![
            Column::text("g", ["a"]),
            Column::text("first", ["one"]),
            Column::text("second", ["two"]),
        ])
        .unwrap();
        let out = emit(&table, &RenderOptions::new(["g"], ["second", "first"]));
        assert_eq!(lines(&out), vec!["::: {.panel-tabset}", "# a", "two", "one", ":::"]);
    }

    #[test]
    fn test_factor_output_prints_labels() {
        let table = Table::new(vec![
            Column::text("g", ["x", "y", "z"]),
            Column::factor("f", ["a", "b", "c"], ["a", "b", "c"]).unwrap(),
        ])
        .unwrap();
        let out = emit(&table, &RenderOptions::new(["g"], ["f"]));
        let lines = lines(&out);
        for label in ["a", "b", "c"] {
            assert!(lines.contains(&label));
        }
        for code in ["0", "1", "2", "3"] {
            assert!(!lines.contains(&code));
        }
    }

    #[test]
    fn test_object_output_rendered_rich() {
        let table = Table::new(vec![
            Column::text("g", ["a"]),
            Column::object("o", [json!({"k": [1, 2]})]),
        ])
        .unwrap();
        let out = emit(&table, &RenderOptions::new(["g"], ["o"]));
        assert!(out.contains("{\n  \"k\": [\n    1,\n    2\n  ]\n}\n\n"));
    }

    struct FailingRenderer;

    impl CellRenderer for FailingRenderer {
        fn render_rich(&self, _value: &serde_json::Value) -> Result<String, CellError> {
            Err("device not available".into())
        }
    }

    #[test]
    fn test_rich_render_failure_propagates() {
        let table = Table::new(vec![
            Column::text("g", ["a", "b"]),
            Column::object("plot", [json!(1), json!(2)]),
        ])
        .unwrap();
        let err = emit_with(&table, &RenderOptions::new(["g"], ["plot"]), &FailingRenderer)
            .unwrap_err();
        match err {
            RenderError::Cell { column, source } => {
                assert_eq!(column, "plot");
                assert_eq!(source.to_string(), "device not available");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
