use anyhow::Result;
use kinfish::mrw::{Sampler, TraceWriter};
use kinfish::shared::data::load_histograms;
use kinfish::shared::Configuration;
use std::path::Path;

fn main() -> Result<()> {
    // usage: kinfish [config.json]  (default run without argument)
    let config = match std::env::args().nth(1) {
        Some(path) => Configuration::load(Path::new(&path))?,
        None => Configuration::default(),
    };
    let family = config.model_family()?;

    let histograms = load_histograms(
        &config.data,
        family,
        config.max_mrna,
        &config.time_points,
    )?;
    let trace = TraceWriter::create(
        &config.output_directory,
        &config.data.code,
        config.family,
        config.max_mrna,
        config.seed,
        config.time_points.len(),
    )?;

    let (summary, _) = Sampler::new(&config, histograms, trace)?.run()?;
    println!(
        "{} iterations, acceptance rate {:.3}, final log-likelihood {:.6}",
        summary.iterations,
        summary.acceptance_rate(),
        summary.log_likelihood.iter().sum::<f64>()
    );
    Ok(())
}
