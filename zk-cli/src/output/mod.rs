//! Output formatting for the zkviz run summary.
//!
//! Two formats: table (human-readable, coloured on a TTY) and json
//! (machine-readable). Colors are turned off automatically when stdout is
//! piped unless the config forces them.

use clap::ValueEnum;
use serde::Serialize;
use std::io::IsTerminal;
use std::str::FromStr;

mod json;

pub use self::json::JsonOutput;

/// Output format for CLI results
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary (default)
    #[default]
    Table,
    /// JSON format for machine consumption
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: '{}'", s)),
        }
    }
}

/// Configuration for output rendering
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub no_color: bool,
    /// Single-line JSON
    pub compact: bool,
}

impl OutputConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            no_color: false,
            compact: false,
        }
    }

    /// Create an OutputConfig with TTY detection and optional color override.
    ///
    /// `Some(true)` forces colors on, `Some(false)` forces them off, `None`
    /// enables them only when stdout is a terminal.
    pub fn auto_detect(format: OutputFormat, color_override: Option<bool>) -> Self {
        let use_color = color_override.unwrap_or_else(|| std::io::stdout().is_terminal());
        Self {
            no_color: !use_color,
            ..Self::new(format)
        }
    }

    pub fn use_colors(&self) -> bool {
        !self.no_color
    }
}

/// Types that can be displayed as a summary table
pub trait TableDisplay: Serialize {
    fn to_table(&self) -> String;
}

/// Types that can be rendered in every supported format
pub trait Outputter: Serialize + Sized {
    fn to_table(&self, config: &OutputConfig) -> String;

    fn to_json(&self, config: &OutputConfig) -> String {
        JsonOutput::format(self, config)
    }

    /// Render using the format specified in config
    fn render(&self, config: &OutputConfig) -> String {
        match config.format {
            OutputFormat::Table => self.to_table(config),
            OutputFormat::Json => self.to_json(config),
        }
    }
}

impl<T: TableDisplay> Outputter for T {
    fn to_table(&self, _config: &OutputConfig) -> String {
        TableDisplay::to_table(self)
    }
}

/// Result wrapper that prints in the configured format
pub struct Output<T> {
    data: T,
    config: OutputConfig,
}

impl<T: Outputter> Output<T> {
    pub fn new(data: T, config: OutputConfig) -> Self {
        if config.use_colors() {
            colored::control::unset_override();
        } else {
            colored::control::set_override(false);
        }
        Self { data, config }
    }

    /// Print to stdout
    pub fn render(&self) -> anyhow::Result<()> {
        println!("{}", self.render_to_string());
        Ok(())
    }

    pub fn render_to_string(&self) -> String {
        self.data.render(&self.config)
    }
}
