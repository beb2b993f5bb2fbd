use rand::distr::{Bernoulli, Distribution};
use rand::Rng;
use rand_distr::Normal;

use crate::config::BlockSpec;
use crate::error::PipelineError;

/// Draw one Bernoulli label per record, block by block, in block order.
pub fn generate_labels<R: Rng + ?Sized>(
    blocks: &[BlockSpec],
    rng: &mut R,
) -> Result<Vec<u8>, PipelineError> {
    let total = blocks.iter().map(|block| block.size).sum();
    let mut labels = Vec::with_capacity(total);

    for (index, block) in blocks.iter().enumerate() {
        let trial = Bernoulli::new(block.positive_rate).map_err(|_| {
            PipelineError::InvalidProbability {
                block: index,
                rate: block.positive_rate,
            }
        })?;

        labels.extend((0..block.size).map(|_| u8::from(trial.sample(rng))));
    }

    Ok(labels)
}

/// `index + N(0, std_dev)` for every index in `0..count`.
pub fn generate_feature<R: Rng + ?Sized>(
    count: usize,
    std_dev: f64,
    rng: &mut R,
) -> Result<Vec<f64>, PipelineError> {
    if !std_dev.is_finite() || std_dev < 0.0 {
        return Err(PipelineError::InvalidNoise { std_dev });
    }
    let noise = Normal::new(0.0, std_dev).map_err(|_| PipelineError::InvalidNoise { std_dev })?;

    Ok((0..count)
        .map(|index| index as f64 + noise.sample(rng))
        .collect())
}
