//! Sorting rows into tabset order and finding where each tabset begins and
//! ends.
//!
//! Level `j` (0-based here) holds one panel tabset per distinct value of the
//! tabset columns `0..j`, the parent prefix. A row *starts* level `j` when it
//! is the first row of its parent-prefix run and *ends* it when it is the
//! last. At level 0 the prefix is empty, so only the first and the last row
//! of the table are boundaries. Because runs are taken over the whole prefix,
//! a value that repeats under a different parent opens a fresh tabset.

use super::validate::RenderPlan;
use crate::table::{Column, ColumnData, Table};
use std::cmp::Ordering;

/// Start and end flags of one row at one level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Boundary {
    pub starts: bool,
    pub ends: bool,
}

/// Boundary flags of every row and level, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryTable {
    depth: usize,
    flags: Vec<Boundary>,
}

impl BoundaryTable {
    /// Flags from the first differing tabset column between each row and
    /// its predecessor (`depth` when the whole tuple is equal).
    fn from_first_differences(depth: usize, first_diff: &[usize]) -> Self {
        let nrows = first_diff.len();
        let mut flags = Vec::with_capacity(nrows * depth);

        for row in 0..nrows {
            for level in 0..depth {
                // The prefix 0..level changes iff the first difference lies inside it
                let starts = row == 0 || first_diff[row] < level;
                let ends = row + 1 == nrows || first_diff[row + 1] < level;
                flags.push(Boundary { starts, ends });
            }
        }

        Self { depth, flags }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn nrows(&self) -> usize {
        if self.depth == 0 {
            0
        } else {
            self.flags.len() / self.depth
        }
    }

    /// Flags of `row` at 0-based `level`.
    pub fn get(&self, row: usize, level: usize) -> Boundary {
        self.flags[row * self.depth + level]
    }
}

/// The projected, sorted table together with its boundaries.
///
/// Columns are the tabset columns followed by the output columns. Factor
/// columns have been replaced by their labels.
#[derive(Debug, Clone)]
pub struct Partition {
    pub columns: Vec<Column>,
    pub boundaries: BoundaryTable,
}

impl Partition {
    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    /// Tabset column at 0-based `level`.
    pub fn tabset_column(&self, level: usize) -> &Column {
        &self.columns[level]
    }

    /// Output columns, in selection order.
    pub fn output_columns(&self) -> &[Column] {
        &self.columns[self.boundaries.depth()..]
    }
}

/// Sort `table` by the plan's tabset columns and compute its boundaries.
///
/// The sort is stable, so rows with equal tabset values keep their input
/// order.
pub fn partition(table: &Table, plan: &RenderPlan) -> Partition {
    let depth = plan.depth();
    let selection: Vec<String> = plan
        .tabset_vars
        .iter()
        .chain(&plan.output_vars)
        .cloned()
        .collect();
    let projected = table.project(&selection);
    let keys: Vec<&ColumnData> = projected[..depth].iter().map(|c| &c.data).collect();

    let mut order: Vec<usize> = (0..table.nrows()).collect();
    order.sort_by(|&a, &b| {
        keys.iter()
            .fold(Ordering::Equal, |acc, key| acc.then_with(|| key.compare(a, b)))
    });

    let columns: Vec<Column> = projected
        .iter()
        .map(|column| Column::new(column.name.clone(), column.data.take(&order).into_labels()))
        .collect();

    let first_diff: Vec<usize> = (0..order.len())
        .map(|row| {
            if row == 0 {
                return 0;
            }
            columns[..depth]
                .iter()
                .position(|c| !c.data.same_value(row - 1, row))
                .unwrap_or(depth)
        })
        .collect();

    let boundaries = BoundaryTable::from_first_differences(depth, &first_diff);
    tracing::debug!(
        rows = order.len(),
        depth,
        tabsets = boundaries.flags.iter().filter(|b| b.starts).count(),
        "partitioned table"
    );

    Partition {
        columns,
        boundaries,
    }
}
