//! Turns screen results into text for the terminal.
//!
//! Every screen produces a [`View`]: either a table (headers plus rows of
//! already formatted cells) or a short message. Rendering is the only place
//! that knows about column widths and the output format.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum View {
    Table {
        title: String,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        footer: Option<String>,
    },
    Message {
        title: String,
        lines: Vec<String>,
    },
}

impl View {
    pub fn table(title: impl Into<String>, headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        View::Table {
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
            footer: None,
        }
    }

    pub fn message(title: impl Into<String>, lines: Vec<String>) -> Self {
        View::Message {
            title: title.into(),
            lines,
        }
    }

    /// Sets the line printed under a table. No effect on messages.
    pub fn with_footer(mut self, text: impl Into<String>) -> Self {
        if let View::Table { footer, .. } = &mut self {
            *footer = Some(text.into());
        }
        self
    }

    pub fn render(&self, format: Format) -> String {
        match format {
            Format::Table => self.to_text(),
            Format::Json => serde_json::to_string_pretty(self).unwrap_or_default(),
        }
    }

    fn to_text(&self) -> String {
        let mut out = String::new();
        match self {
            View::Table {
                title,
                headers,
                rows,
                footer,
            } => {
                let _ = writeln!(out, "{title}");
                if rows.is_empty() {
                    out.push_str("(no rows)\n");
                } else {
                    let widths = column_widths(headers, rows);
                    push_row(&mut out, headers, &widths);
                    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                    push_row(&mut out, &rule, &widths);
                    for row in rows {
                        push_row(&mut out, row, &widths);
                    }
                }
                if let Some(footer) = footer {
                    let _ = writeln!(out, "{footer}");
                }
            }
            View::Message { title, lines } => {
                let _ = writeln!(out, "{title}");
                for line in lines {
                    let _ = writeln!(out, "  {line}");
                }
            }
        }
        out
    }
}

fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }
    widths
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

// Cell formatting shared by the screens.

pub fn timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

pub fn opt_timestamp(value: Option<&DateTime<Utc>>) -> String {
    value.map(timestamp).unwrap_or_else(|| "-".to_string())
}

pub fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

pub fn opt_text(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}
