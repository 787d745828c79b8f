//! Tabular exports - Spreadsheet (CSV) and printable text renderings.
//!
//! An [`ExportSpec`] names its columns by data key; rows are JSON objects so
//! any `Serialize` model can be exported. Missing keys render as empty cells.

use crate::errors::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Write;

/// One exported row
pub type Row = Map<String, Value>;

/// Column of an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportColumn {
    /// Header text
    pub header: String,
    /// Key looked up in each row
    pub data_key: String,
}

impl ExportColumn {
    /// Builds a column
    pub fn new(header: impl Into<String>, data_key: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            data_key: data_key.into(),
        }
    }
}

/// Everything needed to render an export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpec {
    /// Title printed above the text table
    pub title: String,
    /// File name without extension
    pub file_name: String,
    /// Ordered columns
    pub columns: Vec<ExportColumn>,
    /// Data rows
    pub rows: Vec<Row>,
}

/// Converts serializable items into export rows.
///
/// # Errors
/// Returns [`Error::Export`] if an item does not serialize to a JSON object.
pub fn rows_from<T: Serialize>(items: &[T]) -> Result<Vec<Row>> {
    items
        .iter()
        .map(|item| match serde_json::to_value(item) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(Error::Export {
                message: format!("ligne non exportable : {other}"),
            }),
            Err(e) => Err(Error::Export {
                message: e.to_string(),
            }),
        })
        .collect()
}

/// Text of one cell
#[must_use]
pub fn cell(row: &Row, key: &str) -> String {
    match row.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => if *b { "Oui" } else { "Non" }.to_string(),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) => format!("{f:.2}"),
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

impl ExportSpec {
    /// File name with the given extension
    #[must_use]
    pub fn file_name_with(&self, extension: &str) -> String {
        format!("{}.{extension}", self.file_name)
    }

    fn table(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| self.columns.iter().map(|c| cell(row, &c.data_key)).collect())
            .collect()
    }

    /// Renders the export as `;`-separated CSV with a header line.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .from_writer(Vec::new());
        let export_err = |e: csv::Error| Error::Export {
            message: e.to_string(),
        };

        writer
            .write_record(self.columns.iter().map(|c| c.header.as_str()))
            .map_err(export_err)?;
        for line in self.table() {
            writer.write_record(&line).map_err(export_err)?;
        }

        let bytes = writer.into_inner().map_err(|e| Error::Export {
            message: e.to_string(),
        })?;
        String::from_utf8(bytes).map_err(|e| Error::Export {
            message: e.to_string(),
        })
    }

    /// Renders the export as an aligned plain-text table for printing.
    pub fn to_text(&self) -> Result<String> {
        let table = self.table();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                table
                    .iter()
                    .map(|line| line[i].chars().count())
                    .chain(std::iter::once(c.header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        writeln!(out, "{}", self.title)?;
        writeln!(out)?;
        write_line(&mut out, self.columns.iter().map(|c| c.header.as_str()), &widths)?;
        let total: usize = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
        writeln!(out, "{}", "-".repeat(total))?;
        for line in &table {
            write_line(&mut out, line.iter().map(String::as_str), &widths)?;
        }
        if table.is_empty() {
            writeln!(out, "Aucune donnée")?;
        }
        Ok(out)
    }
}

fn write_line<'a>(
    out: &mut String,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> Result<()> {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(text, width)| format!("{text:<width$}"))
        .collect();
    writeln!(out, "{}", padded.join(" | ").trim_end())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    fn spec() -> ExportSpec {
        let rows = vec![
            json!({"nom": "Mbarga", "montant": 5000.5, "actif": true}),
            json!({"nom": "Ngono", "montant": 120, "notes": null}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();
        ExportSpec {
            title: "Cotisations".into(),
            file_name: "cotisations_2024".into(),
            columns: vec![
                ExportColumn::new("Nom", "nom"),
                ExportColumn::new("Montant", "montant"),
                ExportColumn::new("Actif", "actif"),
            ],
            rows,
        }
    }

    #[test]
    fn test_to_csv() {
        let csv = spec().to_csv().unwrap();
        assert_eq!(csv, "Nom;Montant;Actif\nMbarga;5000.50;Oui\nNgono;120;\n");
    }

    #[test]
    fn test_to_text_is_aligned() {
        let text = spec().to_text().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Cotisations");
        assert_eq!(lines[2], "Nom    | Montant | Actif");
        assert_eq!(lines[3], "-".repeat(6 + 7 + 5 + 6));
        assert_eq!(lines[4], "Mbarga | 5000.50 | Oui");
        assert_eq!(lines[5], "Ngono  | 120     |");
    }

    #[test]
    fn test_empty_export() {
        let mut s = spec();
        s.rows.clear();
        assert!(s.to_text().unwrap().contains("Aucune donnée"));
        assert_eq!(s.to_csv().unwrap(), "Nom;Montant;Actif\n");
        assert_eq!(s.file_name_with("csv"), "cotisations_2024.csv");
    }

    #[test]
    fn test_rows_from_models() {
        #[derive(Serialize)]
        struct Line {
            nom: &'static str,
            montant: f64,
        }
        let rows = rows_from(&[Line { nom: "A", montant: 1.0 }]).unwrap();
        assert_eq!(cell(&rows[0], "nom"), "A");
        assert_eq!(cell(&rows[0], "montant"), "1.00");
        assert!(rows_from(&[1, 2]).is_err());
    }
}
