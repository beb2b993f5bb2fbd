use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("shape mismatch in {context}: expected {expected} rows, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{context} received no rows")]
    EmptyInput { context: &'static str },
    #[error("invalid positive rate {rate} for block {block}")]
    InvalidProbability { block: usize, rate: f64 },
    #[error("invalid noise standard deviation {std_dev}")]
    InvalidNoise { std_dev: f64 },
    #[error("invalid test fraction {fraction} for {rows} rows")]
    InvalidSplit { fraction: f64, rows: usize },
    #[error("training labels contain a single class ({class})")]
    SingleClass { class: u8 },
    #[error("newton system is not positive definite at iteration {iteration}")]
    SingularHessian { iteration: usize },
    #[error("logistic regression did not converge after {iterations} iterations (gradient norm {gradient_norm:e})")]
    NotConverged {
        iterations: usize,
        gradient_norm: f64,
    },
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("plot rendering failed: {0}")]
    Plot(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}
