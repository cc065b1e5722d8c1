//! Quarto markup fragments: panel fences, headings and layout wrappers.

use crate::error::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use strum::{Display, EnumString};

/// Closing fence of a panel tabset.
pub const PANEL_CLOSE: &str = ":::";

/// Width of the tab bar in a panel tabset.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PanelStyle {
    /// Tabs only as wide as their titles
    #[default]
    Default,
    /// Tabs fill the available width
    Fill,
    /// Tabs fill the available width with equal sizes
    Justified,
}

impl PanelStyle {
    /// Class appended to the panel fence, if any.
    pub fn class(&self) -> Option<&'static str> {
        match self {
            PanelStyle::Default => None,
            PanelStyle::Fill => Some(".nav-fill"),
            PanelStyle::Justified => Some(".nav-justified"),
        }
    }
}

/// Opening fence of a panel tabset, e.g. `::: {.panel-tabset .nav-pills}`.
pub fn panel_open(style: PanelStyle, pills: bool) -> String {
    let mut classes = vec![".panel-tabset"];
    if pills {
        classes.push(".nav-pills");
    }
    classes.extend(style.class());
    format!("::: {{{}}}", classes.join(" "))
}

/// An ATX heading line, without trailing newline.
/// Deepest heading Markdown can express.
pub const MAX_HEADING_LEVEL: usize = 6;

pub fn heading(level: usize, text: &str) -> String {
    format!("{} {}", "#".repeat(level), text)
}

/// How one nesting level is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    /// As a panel tabset whose tabs are the level's values
    Panel,
    /// As headings of the given level
    Heading(usize),
}

impl HeadingLevel {
    pub fn is_panel(&self) -> bool {
        matches!(self, HeadingLevel::Panel)
    }

    /// Heading level to print, `fallback` for panel levels.
    pub fn level_or(&self, fallback: usize) -> usize {
        match self {
            HeadingLevel::Panel => fallback,
            HeadingLevel::Heading(level) => *level,
        }
    }
}

/// A layout div wrapped around each block of leaf content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    open: String,
    close: String,
}

impl Layout {
    /// Parse a layout directive such as `::: {layout-ncol=2}`.
    ///
    /// The closing fence is the leading run of colons.
    pub fn parse(directive: &str) -> Result<Self, ValidationError> {
        static FENCE: OnceLock<Regex> = OnceLock::new();
        let fence = FENCE.get_or_init(|| Regex::new(r"^:{3,}").unwrap());

        match fence.find(directive) {
            Some(m) => Ok(Self {
                open: directive.to_string(),
                close: m.as_str().to_string(),
            }),
            None => Err(ValidationError::InvalidLayout(directive.to_string())),
        }
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }
}
