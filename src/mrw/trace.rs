// Whitespace-separated traces of the walk: parameters and log-likelihoods

use crate::shared::parameters::KineticParameters;
use anyhow::{anyhow, Context, Result};
use csv::{Writer, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub struct TraceWriter<W: Write> {
    parameters: Writer<W>,
    log_likelihood: Writer<W>,
    time_points: usize,
}

impl TraceWriter<File> {
    /// Open `MRW_<code>_N<family>(<max_mrna>)_s<seed>_{Par,logL}.dat` in
    /// `directory`.
    pub fn create(
        directory: &Path,
        code: &str,
        family: u8,
        max_mrna: usize,
        seed: u64,
        time_points: usize,
    ) -> Result<TraceWriter<File>> {
        let stem = format!("MRW_{}_N{}({})_s{}", code, family, max_mrna, seed);
        let open = |suffix: &str| {
            let path = directory.join(format!("{}_{}.dat", stem, suffix));
            File::create(&path).with_context(|| format!("Cannot create {}", path.display()))
        };
        TraceWriter::new(open("Par")?, open("logL")?, time_points)
    }
}

impl<W: Write> TraceWriter<W> {
    /// Wrap two writers and write the column headers.
    pub fn new(parameters: W, log_likelihood: W, time_points: usize) -> Result<TraceWriter<W>> {
        let builder = || {
            let mut b = WriterBuilder::new();
            b.delimiter(b' ').has_headers(false);
            b
        };
        let mut trace = TraceWriter {
            parameters: builder().from_writer(parameters),
            log_likelihood: builder().from_writer(log_likelihood),
            time_points,
        };

        let mut header = vec!["Iteration".to_string(), "[B/S]".to_string()];
        header.extend(KineticParameters::NAMES.iter().map(|s| s.to_string()));
        trace.parameters.write_record(&header)?;

        let mut header = vec!["Iteration".to_string()];
        header.extend((0..time_points).map(|t| format!("logL[{}]", t)));
        trace.log_likelihood.write_record(&header)?;
        Ok(trace)
    }

    /// One row per regime in the parameter trace, one row in the
    /// log-likelihood trace.
    pub fn record(
        &mut self,
        iteration: usize,
        basal: &KineticParameters,
        stimulus: &KineticParameters,
        log_likelihood: &[f64],
    ) -> Result<()> {
        if log_likelihood.len() != self.time_points {
            return Err(anyhow!(
                "{} log-likelihood values for {} time points",
                log_likelihood.len(),
                self.time_points
            ));
        }
        for (label, p) in [("B", basal), ("S", stimulus)] {
            let mut row = vec![iteration.to_string(), label.to_string()];
            row.extend(p.to_array().iter().map(|v| format!("{:.3e}", v)));
            self.parameters.write_record(&row)?;
        }
        let mut row = vec![iteration.to_string()];
        row.extend(log_likelihood.iter().map(|l| format!("{:.5e}", l)));
        self.log_likelihood.write_record(&row)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.parameters.flush()?;
        self.log_likelihood.flush()?;
        Ok(())
    }

    /// Flush and return the underlying (parameters, log-likelihood) writers.
    pub fn into_inner(self) -> Result<(W, W)> {
        let parameters = self
            .parameters
            .into_inner()
            .map_err(|e| anyhow!("Cannot flush the parameter trace: {}", e.error()))?;
        let log_likelihood = self
            .log_likelihood
            .into_inner()
            .map_err(|e| anyhow!("Cannot flush the log-likelihood trace: {}", e.error()))?;
        Ok((parameters, log_likelihood))
    }
}
