use spam_threshold::{
    config::PipelineConfig,
    logging,
    pipeline::{rng_from_config, run},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init()?;

    let config = PipelineConfig::default();
    let mut rng = rng_from_config(&config);

    let outcome = run(&config, &mut rng)?;
    println!("{}", outcome.table.render(&config.table));

    Ok(())
}
