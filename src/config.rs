use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_BLOCK_SIZE: usize = 200;
pub const DEFAULT_POSITIVE_RATES: [f64; 5] = [0.1, 0.2, 0.4, 0.6, 0.9];

/// One contiguous stratum of synthetic records sharing a positive rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub size: usize,
    pub positive_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Inverse L2 regularization strength; smaller values regularize harder.
    pub regularization: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            regularization: 1.0,
            tolerance: 1e-4,
            max_iterations: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Tables longer than this are truncated to `min_rows` around an ellipsis row.
    pub max_rows: usize,
    pub min_rows: usize,
    pub precision: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_rows: 60,
            min_rows: 10,
            precision: 6,
        }
    }
}

/// Every knob of the demo pipeline. `Default` reproduces the blog post setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub seed: Option<u64>,
    pub blocks: Vec<BlockSpec>,
    pub feature_1_noise: f64,
    pub feature_2_noise: f64,
    pub test_fraction: f64,
    pub classifier: ClassifierConfig,
    pub table: TableConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            blocks: DEFAULT_POSITIVE_RATES
                .iter()
                .map(|&positive_rate| BlockSpec {
                    size: DEFAULT_BLOCK_SIZE,
                    positive_rate,
                })
                .collect(),
            feature_1_noise: 1.0,
            feature_2_noise: 0.1,
            test_fraction: 0.25,
            classifier: ClassifierConfig::default(),
            table: TableConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file; missing keys fall back to the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn record_count(&self) -> usize {
        self.blocks.iter().map(|block| block.size).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blocks.is_empty() || self.record_count() == 0 {
            return Err(invalid("blocks", "at least one non-empty block is required"));
        }
        if let Some(block) = self
            .blocks
            .iter()
            .find(|block| !(0.0..=1.0).contains(&block.positive_rate))
        {
            return Err(invalid(
                "blocks",
                format!("positive rate {} is outside [0, 1]", block.positive_rate),
            ));
        }
        for (field, std_dev) in [
            ("feature_1_noise", self.feature_1_noise),
            ("feature_2_noise", self.feature_2_noise),
        ] {
            if !std_dev.is_finite() || std_dev < 0.0 {
                return Err(invalid(field, format!("{std_dev} is not a valid standard deviation")));
            }
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(invalid("test_fraction", "must lie strictly between 0 and 1"));
        }
        if self.classifier.regularization <= 0.0 || !self.classifier.regularization.is_finite() {
            return Err(invalid("classifier.regularization", "must be positive"));
        }
        if !(self.classifier.tolerance > 0.0) {
            return Err(invalid("classifier.tolerance", "must be positive"));
        }
        if self.classifier.max_iterations == 0 {
            return Err(invalid("classifier.max_iterations", "must be at least 1"));
        }
        if self.table.min_rows > self.table.max_rows {
            return Err(invalid("table.min_rows", "must not exceed table.max_rows"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_matches_demo_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.record_count(), 1000);
        let rates: Vec<f64> = config.blocks.iter().map(|b| b.positive_rate).collect();
        assert_eq!(rates, DEFAULT_POSITIVE_RATES);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            "seed = 7\ntest_fraction = 0.3\n\n[classifier]\nmax_iterations = 50\n",
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert!((config.test_fraction - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.classifier.max_iterations, 50);
        assert!((config.classifier.regularization - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.blocks.len(), 5);
    }

    #[test]
    fn custom_blocks_parse() {
        let config = PipelineConfig::from_toml_str(
            "[[blocks]]\nsize = 10\npositive_rate = 0.5\n\n[[blocks]]\nsize = 20\npositive_rate = 1.0\n",
        )
        .unwrap();
        assert_eq!(config.record_count(), 30);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            PipelineConfig::from_toml_str("test_fraction = 1.0"),
            Err(ConfigError::Invalid { field: "test_fraction", .. })
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("[[blocks]]\nsize = 5\npositive_rate = 1.5\n"),
            Err(ConfigError::Invalid { field: "blocks", .. })
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("feature_2_noise = -0.1"),
            Err(ConfigError::Invalid { field: "feature_2_noise", .. })
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("seed = \"abc\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn nan_tolerance_is_rejected() {
        let mut config = PipelineConfig::default();
        config.classifier.tolerance = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "classifier.tolerance",
                ..
            })
        ));

        config.classifier.tolerance = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 42").unwrap();
        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.seed, Some(42));

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            PipelineConfig::load(&missing),
            Err(ConfigError::Read { .. })
        ));
    }
}
