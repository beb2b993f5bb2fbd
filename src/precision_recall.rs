use ndarray::ArrayView1;

use crate::error::PipelineError;

/// Precision/recall at every distinct score, ordered by increasing threshold.
///
/// `precision` and `recall` carry one trailing boundary point (1.0, 0.0) with no
/// matching threshold, so they are one element longer than `thresholds`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecisionRecallCurve {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub thresholds: Vec<f64>,
}

/// Cumulative true/false positive counts at each distinct score, highest score first.
struct ThresholdCounts {
    true_positives: Vec<f64>,
    false_positives: Vec<f64>,
    thresholds: Vec<f64>,
}

fn binary_counts(labels: ArrayView1<u8>, scores: ArrayView1<f64>) -> ThresholdCounts {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut counts = ThresholdCounts {
        true_positives: Vec::new(),
        false_positives: Vec::new(),
        thresholds: Vec::new(),
    };
    let mut true_positives = 0.0;
    let mut false_positives = 0.0;

    for (position, &index) in order.iter().enumerate() {
        if labels[index] == 1 {
            true_positives += 1.0;
        } else {
            false_positives += 1.0;
        }

        let score = scores[index];
        let last_of_run = match order.get(position + 1) {
            Some(&next) => scores[next].total_cmp(&score).is_ne(),
            None => true,
        };

        if last_of_run {
            counts.true_positives.push(true_positives);
            counts.false_positives.push(false_positives);
            counts.thresholds.push(score);
        }
    }

    counts
}

pub fn precision_recall_curve(
    labels: ArrayView1<u8>,
    scores: ArrayView1<f64>,
) -> Result<PrecisionRecallCurve, PipelineError> {
    if labels.len() != scores.len() {
        return Err(PipelineError::ShapeMismatch {
            context: "precision-recall curve",
            expected: labels.len(),
            actual: scores.len(),
        });
    }
    if labels.is_empty() {
        return Err(PipelineError::EmptyInput {
            context: "precision-recall curve",
        });
    }

    let counts = binary_counts(labels, scores);
    let total_positives = counts.true_positives.last().copied().unwrap_or(0.0);
    if total_positives == 0.0 {
        tracing::warn!("no positive labels; recall is set to 1.0 at every threshold");
    }

    let mut precision: Vec<f64> = counts
        .true_positives
        .iter()
        .zip(&counts.false_positives)
        .map(|(&tp, &fp)| if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 })
        .rev()
        .collect();
    let mut recall: Vec<f64> = counts
        .true_positives
        .iter()
        .map(|&tp| if total_positives > 0.0 { tp / total_positives } else { 1.0 })
        .rev()
        .collect();
    let thresholds: Vec<f64> = counts.thresholds.into_iter().rev().collect();

    precision.push(1.0);
    recall.push(0.0);

    Ok(PrecisionRecallCurve {
        precision,
        recall,
        thresholds,
    })
}
