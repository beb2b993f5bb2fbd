use std::fmt;
use std::io::Write;

use serde::Serialize;

use crate::config::TableConfig;
use crate::error::PipelineError;
use crate::precision_recall::PrecisionRecallCurve;

pub const CURVE_COLUMNS: [&str; 3] = ["precision", "recall", "threshold"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveRow {
    pub precision: f64,
    pub recall: f64,
    pub threshold: f64,
}

impl CurveRow {
    pub fn f1(&self) -> f64 {
        let total = self.precision + self.recall;
        if total > 0.0 {
            2.0 * self.precision * self.recall / total
        } else {
            0.0
        }
    }
}

/// One row per distinct test probability, in increasing threshold order.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveTable {
    rows: Vec<CurveRow>,
}

impl CurveTable {
    /// Drop the trailing boundary point of `precision`/`recall` so each remaining
    /// element lines up with its threshold.
    pub fn from_curve(curve: &PrecisionRecallCurve) -> Result<Self, PipelineError> {
        let rows = curve.thresholds.len();
        for length in [curve.precision.len(), curve.recall.len()] {
            if length != rows + 1 {
                return Err(PipelineError::ShapeMismatch {
                    context: "curve table",
                    expected: rows + 1,
                    actual: length,
                });
            }
        }

        let rows = curve.precision[..rows]
            .iter()
            .zip(&curve.recall[..rows])
            .zip(&curve.thresholds)
            .map(|((&precision, &recall), &threshold)| CurveRow {
                precision,
                recall,
                threshold,
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CurveRow] {
        &self.rows
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let pick: fn(&CurveRow) -> f64 = match name {
            "precision" => |row| row.precision,
            "recall" => |row| row.recall,
            "threshold" => |row| row.threshold,
            _ => return None,
        };
        Some(self.rows.iter().map(pick).collect())
    }

    /// Row with the highest F1 score; the first one wins ties.
    pub fn best_f1(&self) -> Option<&CurveRow> {
        self.rows
            .iter()
            .fold(None, |best: Option<&CurveRow>, row| match best {
                Some(current) if current.f1() >= row.f1() => Some(current),
                _ => Some(row),
            })
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PipelineError> {
        let mut writer = csv::Writer::from_writer(writer);

        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush().map_err(csv::Error::from)?;

        Ok(())
    }

    /// Render as a fixed-width text table with a row index column. Long tables keep
    /// `min_rows / 2` rows from each end around an ellipsis row.
    pub fn render(&self, config: &TableConfig) -> String {
        if self.rows.is_empty() {
            return format!(
                "Empty DataFrame\nColumns: [{}]\nIndex: []",
                CURVE_COLUMNS.join(", ")
            );
        }

        let truncated = self.rows.len() > config.max_rows;
        let visible: Vec<(usize, &CurveRow)> = if truncated {
            let half = config.min_rows / 2;
            let tail_start = self.rows.len() - half;
            self.rows
                .iter()
                .enumerate()
                .filter(|(index, _)| *index < half || *index >= tail_start)
                .collect()
        } else {
            self.rows.iter().enumerate().collect()
        };

        let mut index_cells: Vec<String> = visible.iter().map(|(i, _)| i.to_string()).collect();
        let mut value_cells: Vec<Vec<String>> = CURVE_COLUMNS
            .iter()
            .map(|&name| {
                let values: Vec<f64> = visible
                    .iter()
                    .map(|(_, row)| match name {
                        "precision" => row.precision,
                        "recall" => row.recall,
                        _ => row.threshold,
                    })
                    .collect();
                format_float_column(&values, config.precision)
            })
            .collect();

        if truncated {
            let at = (config.min_rows / 2).min(index_cells.len());
            index_cells.insert(at, "..".to_string());
            for cells in &mut value_cells {
                cells.insert(at, "...".to_string());
            }
        }

        let index_width = index_cells.iter().map(String::len).max().unwrap_or(0);
        let widths: Vec<usize> = CURVE_COLUMNS
            .iter()
            .zip(&value_cells)
            .map(|(header, cells)| {
                cells
                    .iter()
                    .map(String::len)
                    .chain(std::iter::once(header.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(index_cells.len() + 1);
        let mut header = " ".repeat(index_width);
        for (name, &width) in CURVE_COLUMNS.iter().zip(&widths) {
            header.push_str(&format!("  {name:>width$}"));
        }
        lines.push(header);

        for (row, index) in index_cells.iter().enumerate() {
            let mut line = format!("{index:<index_width$}");
            for (cells, &width) in value_cells.iter().zip(&widths) {
                line.push_str(&format!("  {:>width$}", cells[row]));
            }
            lines.push(line);
        }

        let mut rendered = lines.join("\n");
        if truncated {
            rendered.push_str(&format!(
                "\n\n[{} rows x {} columns]",
                self.rows.len(),
                CURVE_COLUMNS.len()
            ));
        }
        rendered
    }
}

impl fmt::Display for CurveTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&TableConfig::default()))
    }
}

/// Fixed-point format, then trim trailing zeros shared by every value in the column
/// while keeping at least one decimal digit.
fn format_float_column(values: &[f64], precision: usize) -> Vec<String> {
    let mut cells: Vec<String> = values
        .iter()
        .map(|value| format!("{value:.precision$}"))
        .collect();

    let trimmable = |cell: &String| {
        cell.ends_with('0')
            && cell
                .find('.')
                .is_some_and(|dot| cell.len() - dot > 2)
    };
    while !cells.is_empty() && cells.iter().all(trimmable) {
        for cell in &mut cells {
            cell.pop();
        }
    }

    cells
}
