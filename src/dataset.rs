use std::io::Write;

use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::error::PipelineError;

pub const FEATURES: usize = 2;
pub const COLUMNS: [&str; 3] = ["is_spam", "feature_1", "feature_2"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Record {
    pub is_spam: u8,
    pub feature_1: f64,
    pub feature_2: f64,
}

impl Record {
    pub fn features(&self) -> [f64; FEATURES] {
        [self.feature_1, self.feature_2]
    }
}

/// Immutable, fixed-schema table of synthetic records.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Zip the label column with both feature columns; all three must have equal length.
    pub fn assemble(
        labels: &[u8],
        feature_1: &[f64],
        feature_2: &[f64],
    ) -> Result<Self, PipelineError> {
        for column in [feature_1.len(), feature_2.len()] {
            if column != labels.len() {
                return Err(PipelineError::ShapeMismatch {
                    context: "dataset assembly",
                    expected: labels.len(),
                    actual: column,
                });
            }
        }

        let records = labels
            .iter()
            .zip(feature_1)
            .zip(feature_2)
            .map(|((&is_spam, &feature_1), &feature_2)| Record {
                is_spam,
                feature_1,
                feature_2,
            })
            .collect();

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_names(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn labels(&self) -> Array1<u8> {
        self.records.iter().map(|r| r.is_spam).collect()
    }

    /// Feature matrix with one row per record, columns in `feature_1, feature_2` order.
    pub fn feature_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.records.len(), FEATURES), |(row, column)| {
            self.records[row].features()[column]
        })
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PipelineError> {
        let mut writer = csv::Writer::from_writer(writer);

        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(csv::Error::from)?;

        Ok(())
    }
}
