//! # tabset
//!
//! Render grouped tabular data as nested Quarto panel tabsets.
//!
//! ## Usage
//!
//! Two nested tabsets, one tab per region and year:
//! ```sh
//! tabset sales.csv -t region -t year -o chart
//! ```
//!
//! Inspect the columns of a table:
//! ```sh
//! tabset sales.csv --columns
//! ```
//!
//! Write straight into a Quarto document's include file:
//! ```sh
//! tabset sales.json -t region -o summary --pills --out _tabs.qmd
//! ```

mod cli;

use clap::Parser as ClapParser;
use cli::Cli;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use std::io::{BufWriter, Write};
use std::path::Path;
use tabset::Config;
use tabset::render::{DefaultRenderer, RenderOptions, render};
use tabset::table::{InputFormat, Table};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    color_eyre::install()?;

    // Handle dynamic shell completions
    #[cfg(feature = "unstable-dynamic")]
    clap_complete::CompleteEnv::with_factory(|| {
        use clap::CommandFactory;
        Cli::command()
    })
    .complete();

    let args = Cli::parse();

    // Priority: CLI args > config file > defaults
    let mut config = match args.config.as_deref() {
        Some(path) => Config::load_from(path)
            .map_err(|e| color_eyre::eyre::eyre!(e))
            .wrap_err_with(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load(),
    };

    init_tracing(&config);

    let format = args
        .format
        .map(InputFormat::from)
        .unwrap_or(config.input.format);
    let mut table = tabset::table::load_table(&args.file, format)
        .wrap_err_with(|| format!("Failed to load table {}", args.file.display()))?;

    for factor in &args.factors {
        table = table
            .into_factor(&factor.column, factor.levels.clone())
            .wrap_err_with(|| format!("Invalid --factor for column '{}'", factor.column))?;
    }

    if args.columns {
        print_columns(&table);
        return Ok(());
    }

    let mut options = RenderOptions::new(args.tabset_vars.clone(), args.output_vars.clone())
        .with_panel_style(
            args.panel_style
                .map(Into::into)
                .unwrap_or(config.render.panel_style),
        )
        .with_pills(args.pills().unwrap_or(config.render.pills));
    options.layout = args.layout.clone();
    options.heading_levels = args
        .heading_levels
        .as_ref()
        .map(|levels| levels.iter().map(|level| level.0).collect());
    let options = config.render.apply(options);

    if args.save_defaults {
        config.remember(&options);
        let path = config
            .save()
            .map_err(|e| color_eyre::eyre::eyre!(e))
            .wrap_err("Failed to save config")?;
        tracing::info!(path = %path.display(), "saved render defaults");
    }

    match args.out.as_deref() {
        Some(path) => render_to_file(&table, &options, path)?,
        None => {
            let stdout = std::io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            render(&table, &options, &DefaultRenderer, &mut out)?;
            out.flush()?;
        }
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    // Markup goes to stdout, so logs stay on stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Render into a temp file next to `path`, then rename it into place.
fn render_to_file(table: &Table, options: &RenderOptions, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir)
        .wrap_err_with(|| format!("Failed to create temp file in {}", parent_dir.display()))?;

    render(table, options, &DefaultRenderer, BufWriter::new(temp_file.as_file_mut()))?;

    // Atomic rename (same filesystem guarantees atomicity)
    temp_file
        .persist(path)
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), "wrote tabsets");
    Ok(())
}

fn print_columns(table: &Table) {
    let width = table
        .column_names()
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0);

    println!("Columns:");
    for column in table.columns() {
        println!("  {:<width$}  {}", column.name, column.column_type());
    }
    println!("\nTotal: {} columns, {} rows", table.ncols(), table.nrows());
}
