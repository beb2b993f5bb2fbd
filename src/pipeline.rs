use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::dataset::Dataset;
use crate::error::PipelineError;
use crate::logistic_regression::{FittedLogisticRegression, LogisticRegression};
use crate::precision_recall::precision_recall_curve;
use crate::report::CurveTable;
use crate::split::{train_test_split, Split};
use crate::synthetic::{generate_feature, generate_labels};

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub dataset: Dataset,
    pub split: Split,
    pub model: FittedLogisticRegression,
    pub test_probabilities: Array1<f64>,
    pub table: CurveTable,
}

/// Seeded generator when the config pins a seed, OS entropy otherwise.
pub fn rng_from_config(config: &PipelineConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Generate, split, fit and evaluate in one forward pass.
pub fn run<R: Rng + ?Sized>(
    config: &PipelineConfig,
    rng: &mut R,
) -> Result<PipelineOutcome, PipelineError> {
    config.validate()?;

    let labels = generate_labels(&config.blocks, rng)?;
    let count = labels.len();
    let feature_1 = generate_feature(count, config.feature_1_noise, rng)?;
    let feature_2 = generate_feature(count, config.feature_2_noise, rng)?;
    let dataset = Dataset::assemble(&labels, &feature_1, &feature_2)?;
    info!(
        rows = dataset.len(),
        positives = labels.iter().filter(|&&label| label == 1).count(),
        "synthetic dataset assembled"
    );

    let split = train_test_split(&dataset, config.test_fraction, rng)?;
    debug!(
        train = split.train_indices.len(),
        test = split.test_indices.len(),
        "train/test split"
    );

    let model = LogisticRegression::from_config(&config.classifier)
        .fit(split.train_features.view(), split.train_labels.view())?;
    info!(
        weights = ?model.weights.to_vec(),
        bias = model.bias,
        iterations = model.iterations,
        "classifier fitted"
    );

    let test_probabilities = model.predict_proba(split.test_features.view())?;
    let curve = precision_recall_curve(split.test_labels.view(), test_probabilities.view())?;
    let table = CurveTable::from_curve(&curve)?;
    if let Some(best) = table.best_f1() {
        info!(
            threshold = best.threshold,
            precision = best.precision,
            recall = best.recall,
            f1 = best.f1(),
            "best F1 threshold"
        );
    }

    Ok(PipelineOutcome {
        dataset,
        split,
        model,
        test_probabilities,
        table,
    })
}
