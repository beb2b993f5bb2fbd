use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::config::ClassifierConfig;
use crate::error::PipelineError;

const ARMIJO_SLOPE: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 40;

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

/// L2-penalized logistic regression with an unpenalized intercept, fitted by
/// Newton's method with a backtracking line search.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    /// Inverse regularization strength.
    pub regularization: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FittedLogisticRegression {
    pub weights: Array1<f64>,
    pub bias: f64,
    pub iterations: usize,
}

impl LogisticRegression {
    pub fn new(regularization: f64, tolerance: f64, max_iterations: usize) -> Self {
        Self {
            regularization,
            tolerance,
            max_iterations,
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.regularization, config.tolerance, config.max_iterations)
    }

    pub fn fit(
        &self,
        features: ArrayView2<f64>,
        labels: ArrayView1<u8>,
    ) -> Result<FittedLogisticRegression, PipelineError> {
        let (samples_count, features_count) = features.dim();
        if samples_count == 0 {
            return Err(PipelineError::EmptyInput {
                context: "logistic regression fit",
            });
        }
        if labels.len() != samples_count {
            return Err(PipelineError::ShapeMismatch {
                context: "logistic regression fit",
                expected: samples_count,
                actual: labels.len(),
            });
        }

        let positives = labels.iter().filter(|&&label| label == 1).count();
        if positives == 0 || positives == samples_count {
            return Err(PipelineError::SingleClass { class: labels[0] });
        }

        let targets = labels.mapv(f64::from);
        // X with a trailing column of ones for the intercept
        let design = Array2::from_shape_fn((samples_count, features_count + 1), |(i, j)| {
            if j < features_count {
                features[(i, j)]
            } else {
                1.0
            }
        });
        // penalty applies to weights only
        let penalty = Array1::from_shape_fn(features_count + 1, |j| {
            if j < features_count {
                1.0 / self.regularization
            } else {
                0.0
            }
        });

        let mut theta = Array1::<f64>::zeros(features_count + 1);
        let mut iteration = 0;

        loop {
            let probabilities = design.dot(&theta).mapv(sigmoid);
            let residuals = &probabilities - &targets;
            let gradient = design.t().dot(&residuals) + &penalty * &theta;
            let gradient_norm =
                gradient.iter().fold(0.0_f64, |max, g| max.max(g.abs())) / samples_count as f64;

            tracing::trace!(iteration, gradient_norm, "newton iteration");

            if gradient_norm < self.tolerance {
                tracing::debug!(iterations = iteration, "logistic regression converged");
                return Ok(FittedLogisticRegression {
                    weights: theta.iter().take(features_count).copied().collect(),
                    bias: theta[features_count],
                    iterations: iteration,
                });
            }
            if iteration >= self.max_iterations {
                return Err(PipelineError::NotConverged {
                    iterations: iteration,
                    gradient_norm,
                });
            }

            let curvature = probabilities.mapv(|p| p * (1.0 - p));
            let weighted = &design * &curvature.insert_axis(Axis(1));
            let hessian = design.t().dot(&weighted) + Array2::from_diag(&penalty);

            let dimension = features_count + 1;
            let hessian = DMatrix::from_fn(dimension, dimension, |i, j| hessian[(i, j)]);
            let cholesky = hessian
                .cholesky()
                .ok_or(PipelineError::SingularHessian { iteration })?;
            let step = cholesky.solve(&DVector::from_iterator(dimension, gradient.iter().copied()));
            let direction: Array1<f64> = step.iter().map(|value| -value).collect();

            theta = line_search(
                iteration,
                &design,
                &targets,
                &penalty,
                &theta,
                &gradient,
                &direction,
            )?;
            iteration += 1;
        }
    }
}

fn line_search(
    iteration: usize,
    design: &Array2<f64>,
    targets: &Array1<f64>,
    penalty: &Array1<f64>,
    theta: &Array1<f64>,
    gradient: &Array1<f64>,
    direction: &Array1<f64>,
) -> Result<Array1<f64>, PipelineError> {
    let objective = |parameters: &Array1<f64>| {
        let logits = design.dot(parameters);
        let log_loss: f64 = logits
            .iter()
            .zip(targets)
            .map(|(&z, &y)| softplus(z) - y * z)
            .sum();
        log_loss + 0.5 * (penalty * parameters * parameters).sum()
    };

    let current = objective(theta);
    let slope = gradient.dot(direction);
    let mut step_size = 1.0;

    for _ in 0..MAX_BACKTRACKS {
        let candidate = theta + &(direction * step_size);
        if objective(&candidate) <= current + ARMIJO_SLOPE * step_size * slope {
            return Ok(candidate);
        }
        step_size *= 0.5;
    }

    Err(PipelineError::NotConverged {
        iterations: iteration,
        gradient_norm: gradient.iter().fold(0.0_f64, |max, g| max.max(g.abs()))
            / design.nrows() as f64,
    })
}

impl FittedLogisticRegression {
    pub fn decision_function(
        &self,
        features: ArrayView2<f64>,
    ) -> Result<Array1<f64>, PipelineError> {
        if features.ncols() != self.weights.len() {
            return Err(PipelineError::ShapeMismatch {
                context: "logistic regression predict",
                expected: self.weights.len(),
                actual: features.ncols(),
            });
        }

        Ok(features.dot(&self.weights) + self.bias)
    }

    /// Probability of the positive class for every row.
    pub fn predict_proba(&self, features: ArrayView2<f64>) -> Result<Array1<f64>, PipelineError> {
        Ok(self.decision_function(features)?.mapv(sigmoid))
    }

    pub fn predict(
        &self,
        features: ArrayView2<f64>,
        threshold: f64,
    ) -> Result<Array1<u8>, PipelineError> {
        Ok(self
            .predict_proba(features)?
            .mapv(|probability| u8::from(probability >= threshold)))
    }
}
