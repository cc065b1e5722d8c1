use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;
use tabset::render::PanelStyle;
use tabset::table::InputFormat;

#[cfg(feature = "unstable-dynamic")]
use clap_complete::engine::{ArgValueCompleter, CompletionCandidate, ValueCompleter};

#[derive(Parser, Debug)]
#[command(name = "tabset")]
#[command(version)]
#[command(about = "Render grouped tabular data as nested Quarto panel tabsets")]
#[command(
    long_about = "tabset - Turn a table into nested Quarto panel tabsets.\n\n\
    Rows are sorted by the tabset columns; every distinct combination of their values\n\
    becomes a tab (or a heading), and the output columns are printed inside the\n\
    innermost tab. The markup is written to stdout or to --out.\n\n\
    Examples:\n  \
    tabset data.csv -t region -t year -o plot         # Two nested tabsets\n  \
    tabset data.json -t region -o summary --pills     # Pill-styled tabs\n  \
    tabset data.csv -t a -t b -o v --heading-levels 2,NA\n  \
    tabset data.csv --columns                         # Inspect column types"
)]
pub struct Cli {
    /// Table to render (.json or .csv), or '-' for stdin
    ///
    /// JSON input is an array of row objects or a document with explicit
    /// column types ({"columns": [...], "rows": [...]}).
    /// CSV input needs a header row; empty fields and NA are missing values.
    #[arg(add = table_file_completer())]
    pub file: PathBuf,

    /// Column whose values become tabs (repeat for nesting, outermost first)
    #[arg(
        short = 't',
        long = "tabset",
        value_name = "COLUMN",
        required_unless_present = "columns"
    )]
    pub tabset_vars: Vec<String>,

    /// Column printed inside each innermost tab (repeatable)
    #[arg(
        short = 'o',
        long = "output",
        value_name = "COLUMN",
        required_unless_present = "columns"
    )]
    pub output_vars: Vec<String>,

    /// Layout div wrapped around each tab's content
    ///
    /// Must start with at least three colons. The closing fence is the
    /// leading run of colons.
    ///
    /// Example: --layout '::: {layout-ncol=2}'
    #[arg(long = "layout", value_name = "DIV")]
    pub layout: Option<String>,

    /// Render levels as headings instead of tabsets
    ///
    /// Comma-separated, one entry per --tabset column. NA keeps the level
    /// as a tabset; a number prints that level as headings of that level.
    ///
    /// Example: --heading-levels 2,NA
    #[arg(
        long = "heading-levels",
        value_name = "LEVELS",
        value_delimiter = ',',
        allow_hyphen_values = true
    )]
    pub heading_levels: Option<Vec<HeadingLevelArg>>,

    /// Width of the tab bar
    #[arg(long = "panel-style", value_name = "STYLE")]
    pub panel_style: Option<PanelStyleArg>,

    /// Render tabs as pills
    #[arg(long = "pills", overrides_with = "no_pills")]
    pub pills: bool,

    /// Render tabs as plain tabs, even if the config enables pills
    #[arg(long = "no-pills", overrides_with = "pills")]
    pub no_pills: bool,

    /// Treat a column as categorical with the given level order
    ///
    /// Tabs follow the level order instead of alphabetical order.
    ///
    /// Example: --factor size=small,medium,large
    #[arg(long = "factor", value_name = "COLUMN=LEVELS")]
    pub factors: Vec<FactorArg>,

    /// Input format (default: by file extension)
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub format: Option<FormatArg>,

    /// Write the markup to a file instead of stdout
    #[arg(long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// List the table's columns and their types instead of rendering
    #[arg(long = "columns")]
    pub columns: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Save --panel-style, --pills and --layout as the new defaults
    #[arg(long = "save-defaults")]
    pub save_defaults: bool,
}

impl Cli {
    /// Pill setting given on the command line, if any. The last flag wins.
    pub fn pills(&self) -> Option<bool> {
        match (self.pills, self.no_pills) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PanelStyleArg {
    /// Tabs as wide as their titles
    Default,
    /// Tabs fill the available width
    Fill,
    /// Tabs fill the available width with equal sizes
    Justified,
}

impl From<PanelStyleArg> for PanelStyle {
    fn from(arg: PanelStyleArg) -> Self {
        match arg {
            PanelStyleArg::Default => PanelStyle::Default,
            PanelStyleArg::Fill => PanelStyle::Fill,
            PanelStyleArg::Justified => PanelStyle::Justified,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// By file extension, or by content for stdin
    Auto,
    Json,
    Csv,
}

impl From<FormatArg> for InputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Auto => InputFormat::Auto,
            FormatArg::Json => InputFormat::Json,
            FormatArg::Csv => InputFormat::Csv,
        }
    }
}

/// One `--heading-levels` entry: `NA` (or empty) for a tabset, else a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingLevelArg(pub Option<f64>);

impl FromStr for HeadingLevelArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "NA" | "na" => Ok(Self(None)),
            other => other
                .parse::<f64>()
                .map(|level| Self(Some(level)))
                .map_err(|_| format!("expected a number or NA, got '{}'", other)),
        }
    }
}

/// A `--factor COLUMN=level1,level2,...` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorArg {
    pub column: String,
    pub levels: Vec<String>,
}

impl FromStr for FactorArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, levels) = s
            .split_once('=')
            .ok_or_else(|| format!("expected COLUMN=LEVELS, got '{}'", s))?;
        if column.is_empty() {
            return Err("factor column name is empty".to_string());
        }
        Ok(Self {
            column: column.to_string(),
            levels: levels.split(',').map(str::to_string).collect(),
        })
    }
}

#[cfg(feature = "unstable-dynamic")]
fn table_file_completer() -> ArgValueCompleter {
    use std::ffi::OsStr;
    use std::path::Path;

    struct TableCompleter;

    impl ValueCompleter for TableCompleter {
        fn complete(&self, current: &OsStr) -> Vec<CompletionCandidate> {
            // e.g., "../data/sal" -> directory="../data", prefix="sal"
            let input_str = current.to_string_lossy();
            let input_path = Path::new(input_str.as_ref());

            let search_dir: &Path;
            let prefix: String;

            if input_str.is_empty() {
                search_dir = Path::new(".");
                prefix = String::new();
            } else if input_str.ends_with('/') || input_str.ends_with('\\') {
                search_dir = input_path;
                prefix = String::new();
            } else {
                // NOTE: parent() returns Some("") for simple filenames like "d"
                let parent = input_path.parent().unwrap_or(Path::new("."));
                search_dir = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
                prefix = input_path
                    .file_name()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
            };

            let entries = match std::fs::read_dir(search_dir) {
                Ok(entries) => entries,
                Err(_) => return vec![],
            };

            entries
                .filter_map(Result::ok)
                .filter_map(|entry| {
                    let path = entry.path();
                    let file_name = path.file_name()?.to_string_lossy().to_string();

                    if !prefix.is_empty()
                        && !file_name.to_lowercase().starts_with(&prefix.to_lowercase())
                    {
                        return None;
                    }

                    let completion_value = if search_dir == Path::new(".") {
                        file_name.clone()
                    } else {
                        search_dir.join(&file_name).to_string_lossy().to_string()
                    };

                    if path.is_dir() {
                        let mut dir_completion = completion_value;
                        if !dir_completion.ends_with('/') {
                            dir_completion.push('/');
                        }
                        return Some(
                            CompletionCandidate::new(dir_completion).help(Some("directory".into())),
                        );
                    }

                    let ext = path.extension()?.to_string_lossy().to_lowercase();
                    match ext.as_str() {
                        "json" | "csv" => Some(CompletionCandidate::new(completion_value)),
                        _ => None,
                    }
                })
                .collect::<Vec<_>>()
        }
    }

    ArgValueCompleter::new(TableCompleter)
}

#[cfg(not(feature = "unstable-dynamic"))]
fn table_file_completer() -> clap::builder::ValueHint {
    clap::ValueHint::FilePath
}
