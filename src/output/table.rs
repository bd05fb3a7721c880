//
//  teamcity-client
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Table Output Formatting
//!
//! Table rendering with `comfy_table`, plus colored formatting of TeamCity build
//! states and statuses.
//!
//! ## Example
//!
//! ```rust,ignore
//! use teamcity_client::output::table::TableBuilder;
//!
//! TableBuilder::new()
//!     .headers(["ID", "Number", "Status"])
//!     .row(["4211", "118", "FAILURE"])
//!     .print();
//! ```

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

/// Creates an empty table with the shared preset.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Builder for list tables.
pub struct TableBuilder {
    table: Table,
    color: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            table: create_table(),
            color: console::colors_enabled(),
        }
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(|s| s.into()).collect();
        if self.color {
            let header_cells: Vec<Cell> = headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect();
            self.table.set_header(header_cells);
        } else {
            self.table.set_header(headers);
        }
        self
    }

    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = cells.into_iter().map(|s| s.into()).collect();
        self.table.add_row(row);
        self
    }

    pub fn rows<I, R, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            let row: Vec<String> = row.into_iter().map(|s| s.into()).collect();
            self.table.add_row(row);
        }
        self
    }

    pub fn print(self) {
        println!("{}", self.table);
    }

    pub fn build(self) -> Table {
        self.table
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Colors a build state or status.
///
/// | Value | Color |
/// |-------|-------|
/// | `SUCCESS` | green |
/// | `FAILURE`, `ERROR` | red |
/// | `running` | cyan |
/// | `queued` | yellow |
/// | `UNKNOWN`, `finished` | default |
pub fn format_status(status: &str, color: bool) -> String {
    if !color {
        return status.to_string();
    }

    use console::style;
    match status.to_lowercase().as_str() {
        "success" => style(status).green().to_string(),
        "failure" | "error" => style(status).red().to_string(),
        "running" => style(status).cyan().to_string(),
        "queued" => style(status).yellow().to_string(),
        _ => status.to_string(),
    }
}

pub fn format_bool(value: bool, color: bool) -> String {
    if color {
        use console::style;
        if value {
            style("Yes").green().to_string()
        } else {
            style("No").dim().to_string()
        }
    } else if value {
        "Yes".to_string()
    } else {
        "No".to_string()
    }
}
