//! # tabset
//!
//! Render grouped tabular data as nested Quarto panel tabsets.
//!
//! Given a table, an ordered list of tabset columns and a list of output
//! columns, the crate sorts the rows by the tabset columns and writes one tab
//! (or heading) per distinct combination of their values, nesting each level
//! inside the previous one. The output columns are printed inside the
//! innermost tab.
//!
//! ## Example
//!
//! ```rust
//! use tabset::render::{RenderOptions, render_to_string};
//! use tabset::table::{Column, Table};
//!
//! let table = Table::new(vec![
//!     Column::text("region", ["north", "north", "south"]),
//!     Column::text("year", ["2023", "2024", "2023"]),
//!     Column::integer("sales", [10, 20, 30]),
//! ])?;
//!
//! let markup = render_to_string(&table, &RenderOptions::new(["region", "year"], ["sales"]))?;
//! assert_eq!(
//!     markup.lines().filter(|l| !l.is_empty()).collect::<Vec<_>>(),
//!     [
//!         "::: {.panel-tabset}",
//!         "# north",
//!         "::: {.panel-tabset}",
//!         "## 2023",
//!         "10",
//!         "## 2024",
//!         "20",
//!         ":::",
//!         "# south",
//!         "::: {.panel-tabset}",
//!         "## 2023",
//!         "30",
//!         ":::",
//!         ":::",
//!     ]
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Configuration module for persisted render defaults.
pub mod config;

/// Error types for loading, validation and rendering.
pub mod error;

/// Tabset rendering: validation, partitioning and emission.
///
/// ## Example
///
/// ```
/// use tabset::render::{RenderOptions, render_to_string};
/// use tabset::table::{Column, Table};
///
/// let table = Table::new(vec![Column::text("g", ["a"]), Column::integer("v", [1])])?;
/// let options = RenderOptions::new(["g"], ["v"]).with_heading_levels([Some(3.0)]);
/// assert_eq!(render_to_string(&table, &options)?, "### a\n\n1\n\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod render;

/// Typed tables and their JSON/CSV loaders.
pub mod table;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{LoadError, RenderError, TableError, ValidationError};
pub use render::{CellRenderer, DefaultRenderer, RenderOptions, render_to_string};
pub use table::{Column, ColumnData, Table};
