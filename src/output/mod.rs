//
//  teamcity-client
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Output formatting for the `tc` CLI:
//!
//! - **Table format**: Human-readable output for interactive terminal use
//! - **JSON format**: Machine-readable output for scripting (`--json`)
//!
//! ## Architecture
//!
//! - [`table`]: Table formatting utilities using `comfy_table`
//! - [`json`]: JSON serialization utilities using `serde_json`
//!
//! ## Example
//!
//! ```rust,ignore
//! use teamcity_client::output::{OutputWriter, OutputFormat};
//!
//! let writer = OutputWriter::new(OutputFormat::Json);
//! writer.write(&build)?;
//! writer.write_success("Build 4211 cancelled");
//! ```

pub mod json;
pub mod table;

pub use json::*;
pub use table::*;

use serde::Serialize;

/// Represents the available output formats for CLI output.
///
/// # Variants
///
/// * `Table` - Human-readable format, best for interactive terminal sessions
/// * `Json` - Machine-readable JSON format, ideal for scripting and piping to other tools
///
/// # Notes
///
/// The default output format is [`OutputFormat::Table`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OutputFormat {
    /// Human-readable table format with optional color support.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Picks the format from the global `--json` flag.
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Table
        }
    }
}

/// Writes command results in the selected format.
///
/// Status messages (`write_success`, `write_warning`) are plain text in every
/// format; warnings go to stderr.
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    /// Creates a writer, detecting color support from the terminal.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    pub fn color_enabled(&self) -> bool {
        self.color
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Writes a single value.
    pub fn write<T: Serialize + TableOutput>(&self, value: &T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(value)?,
            OutputFormat::Table => value.print_table(self.color),
        }
        Ok(())
    }

    /// Writes a list; tables get one shared header.
    pub fn write_list<T: Serialize + TableRow>(&self, values: &[T]) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(&values)?,
            OutputFormat::Table => {
                if values.is_empty() {
                    println!("No results");
                    return Ok(());
                }
                TableBuilder::new()
                    .color(self.color)
                    .headers(T::headers().iter().copied())
                    .rows(values.iter().map(|v| v.row(self.color)))
                    .print();
            }
        }
        Ok(())
    }

    pub fn write_warning(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("warning:").yellow().bold(), msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }

    pub fn write_success(&self, msg: &str) {
        use console::style;
        if self.color {
            println!("{} {}", style("✓").green().bold(), msg);
        } else {
            println!("✓ {}", msg);
        }
    }
}

/// Types that render themselves as a detail view.
pub trait TableOutput {
    /// Prints the value to stdout.
    fn print_table(&self, color: bool);
}

/// Types that render as one row of a list table.
pub trait TableRow {
    /// Column headers.
    fn headers() -> &'static [&'static str];

    /// Cell values, in header order.
    fn row(&self, color: bool) -> Vec<String>;
}

/// Prints a bold header line with an underline.
pub fn print_header(text: &str) {
    use console::style;
    println!("{}", style(text).bold());
    println!("{}", "-".repeat(text.chars().count()));
}

/// Prints a `key: value` line, dimming the key when color is on.
pub fn print_field(key: &str, value: &str, color: bool) {
    use console::style;
    if color {
        println!("{}: {}", style(key).dim(), value);
    } else {
        println!("{}: {}", key, value);
    }
}
