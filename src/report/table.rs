use serde_json::Value;
use std::fmt::Write;

use super::buffer::{ReportRow, columns};
use crate::utils::escape_html;

/// Padding added to header widths, matching common pipe-table output.
const HEADER_PADDING: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn alignment(rows: &[ReportRow], column: &str) -> Align {
    let mut values = rows
        .iter()
        .filter_map(|row| row.get(column))
        .filter(|value| !value.is_null())
        .peekable();
    if values.peek().is_some() && values.all(Value::is_number) {
        Align::Right
    } else {
        Align::Left
    }
}

fn pad(text: &str, width: usize, align: Align) -> String {
    match align {
        Align::Left => format!("{text:<width$}"),
        Align::Right => format!("{text:>width$}"),
    }
}

/// Pipe-delimited table with a leading row-number column.
///
/// `first_index` is the buffer position of `rows[0]`.
pub fn pipe_table(rows: &[ReportRow], first_index: usize) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let names = columns(rows);
    let mut headers = vec![String::new()];
    headers.extend(names.iter().cloned());

    let mut aligns = vec![Align::Right];
    aligns.extend(names.iter().map(|name| alignment(rows, name)));

    let body: Vec<Vec<String>> = rows
        .iter()
        .enumerate()
        .map(|(offset, row)| {
            let mut cells = vec![(first_index + offset).to_string()];
            cells.extend(names.iter().map(|name| cell(row.get(name))));
            cells
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            body.iter()
                .map(|cells| cells[i].chars().count())
                .chain(std::iter::once(header.chars().count() + HEADER_PADDING))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .zip(&aligns)
            .map(|((text, &width), &align)| pad(text, width, align))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let rule: Vec<String> = widths
        .iter()
        .zip(&aligns)
        .map(|(&width, align)| match align {
            Align::Left => format!(":{}", "-".repeat(width + 1)),
            Align::Right => format!("{}:", "-".repeat(width + 1)),
        })
        .collect();

    let mut out = line(headers.as_slice());
    out.push('\n');
    let _ = write!(out, "|{}|", rule.join("|"));
    for cells in &body {
        out.push('\n');
        out.push_str(&line(cells.as_slice()));
    }
    out
}

/// HTML table with a row-number header column.
pub fn html_table(rows: &[ReportRow], first_index: usize) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let names = columns(rows);
    let mut out = String::from("<table border=\"1\" class=\"dataframe\">\n");
    out.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n      <th></th>\n");
    for name in &names {
        let _ = writeln!(out, "      <th>{}</th>", escape_html(name));
    }
    out.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for (offset, row) in rows.iter().enumerate() {
        out.push_str("    <tr>\n");
        let _ = writeln!(out, "      <th>{}</th>", first_index + offset);
        for name in &names {
            let _ = writeln!(out, "      <td>{}</td>", escape_html(&cell(row.get(name))));
        }
        out.push_str("    </tr>\n");
    }
    out.push_str("  </tbody>\n</table>");
    out
}
