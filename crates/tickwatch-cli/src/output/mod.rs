use std::io::{self, Write};

use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(entries: &[Value], format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_entries(&mut out, entries, format, pretty)?;
    out.flush()?;
    Ok(())
}

fn write_entries<W: Write>(
    out: &mut W,
    entries: &[Value],
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(entries)?
            } else {
                serde_json::to_string(entries)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Ndjson => {
            for entry in entries {
                writeln!(out, "{}", serde_json::to_string(entry)?)?;
            }
        }
        OutputFormat::Table => write_table(out, entries)?,
    }

    Ok(())
}

/// Columns are the union of object keys in first-seen order; missing
/// cells print as `-`.
fn write_table<W: Write>(out: &mut W, entries: &[Value]) -> io::Result<()> {
    let mut columns: Vec<&str> = Vec::new();
    for entry in entries {
        if let Value::Object(fields) = entry {
            for key in fields.keys() {
                if !columns.contains(&key.as_str()) {
                    columns.push(key.as_str());
                }
            }
        }
    }

    if columns.is_empty() {
        return writeln!(out, "(no results)");
    }

    let rows = entries
        .iter()
        .map(|entry| {
            columns
                .iter()
                .map(|column| cell(entry.get(*column)))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let widths = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            rows.iter()
                .map(|row| row[index].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    let header = columns.iter().map(|column| column.to_string()).collect::<Vec<_>>();
    write_row(out, &header, &widths)?;
    for row in &rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_row<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let padding = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::from("-"),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
