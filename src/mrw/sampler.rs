//! The sampling loop: build the model once, then propose, evaluate and
//! accept or reject for a fixed number of iterations.
use crate::mrw::trace::TraceWriter;
use crate::mrw::walker::ParameterWalker;
use crate::shared::config::Configuration;
use crate::shared::distributions::{evolve, stationary, validate_schedule, ProbabilityVector};
use crate::shared::errors::ModelError;
use crate::shared::generator::assemble;
use crate::shared::likelihood::{bucket_count, score, ObservedHistogram};
use crate::shared::parameters::KineticParameters;
use crate::shared::state_space::{build, StateSpace, TransitionIndex};
use anyhow::Result;
#[cfg(feature = "kdam")]
use kdam::{tqdm, BarExt};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use std::io::Write;

/// State space, transition index and observations: everything needed to
/// score a (basal, stimulus) pair of parameter sets.
#[derive(Clone, Debug)]
pub struct LikelihoodModel {
    space: StateSpace,
    index: TransitionIndex,
    histograms: Vec<ObservedHistogram>,
    time_points: Vec<u32>,
    time_step: u32,
}

impl LikelihoodModel {
    pub fn new(
        family: u8,
        max_mrna: usize,
        time_points: Vec<u32>,
        time_step: u32,
        histograms: Vec<ObservedHistogram>,
    ) -> Result<LikelihoodModel, ModelError> {
        let (space, index) = build(family, max_mrna)?;
        validate_schedule(&time_points, time_step)?;
        if histograms.len() != time_points.len() {
            return Err(ModelError::DataUnavailable(format!(
                "{} histograms for {} time points",
                histograms.len(),
                time_points.len()
            )));
        }
        let shape = (max_mrna + 1, bucket_count(space.family()));
        for (h, t) in histograms.iter().zip(&time_points) {
            if h.counts().dim() != shape {
                return Err(ModelError::DataUnavailable(format!(
                    "the histogram at t={} has shape {:?}, expected {:?}",
                    t,
                    h.counts().dim(),
                    shape
                )));
            }
        }
        Ok(LikelihoodModel {
            space,
            index,
            histograms,
            time_points,
            time_step,
        })
    }

    pub fn from_configuration(
        config: &Configuration,
        histograms: Vec<ObservedHistogram>,
    ) -> Result<LikelihoodModel, ModelError> {
        LikelihoodModel::new(
            config.family,
            config.max_mrna,
            config.time_points.clone(),
            config.time_step,
            histograms,
        )
    }

    pub fn state_space(&self) -> &StateSpace {
        &self.space
    }

    pub fn transition_index(&self) -> &TransitionIndex {
        &self.index
    }

    pub fn time_points(&self) -> &[u32] {
        &self.time_points
    }

    /// Model distribution at every time point: stationary under the basal
    /// rates at the first one, then evolved under the stimulus rates.
    pub fn distributions(
        &self,
        basal: &KineticParameters,
        stimulus: &KineticParameters,
    ) -> Result<Vec<ProbabilityVector>, ModelError> {
        let a_basal = assemble(&self.space, &self.index, basal);
        let a_stimulus = assemble(&self.space, &self.index, stimulus);
        let p0 = stationary(&a_basal)?;
        evolve(&a_stimulus, &p0, &self.time_points, self.time_step)
    }

    /// Log-likelihood of the observations at every time point.
    pub fn log_likelihood(
        &self,
        basal: &KineticParameters,
        stimulus: &KineticParameters,
    ) -> Result<Vec<f64>, ModelError> {
        let scores = self
            .distributions(basal, stimulus)?
            .iter()
            .zip(&self.histograms)
            .map(|(p, x)| score(x, p))
            .collect::<Result<Vec<f64>, ModelError>>()?;
        if let Some(t) = scores.iter().position(|l| !l.is_finite()) {
            return Err(ModelError::NumericalFailure(format!(
                "non-finite log-likelihood at t={}",
                self.time_points[t]
            )));
        }
        Ok(scores)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Accepted,
    Rejected,
    /// rejected before evaluation (non-physical rates)
    Filtered,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub iterations: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub filtered: usize,
    pub basal: KineticParameters,
    pub stimulus: KineticParameters,
    pub log_likelihood: Vec<f64>,
}

impl RunSummary {
    pub fn acceptance_rate(&self) -> f64 {
        let steps = self.accepted + self.rejected + self.filtered;
        if steps == 0 {
            0.
        } else {
            self.accepted as f64 / steps as f64
        }
    }
}

pub struct Sampler<W: Write> {
    model: LikelihoodModel,
    walker: ParameterWalker,
    rng: SmallRng,
    coin: Uniform<f64>,
    trace: TraceWriter<W>,
    iterations: usize,
    progress: bool,
    accepted: usize,
    rejected: usize,
    filtered: usize,
}

impl<W: Write> Sampler<W> {
    pub fn new(
        config: &Configuration,
        histograms: Vec<ObservedHistogram>,
        trace: TraceWriter<W>,
    ) -> Result<Sampler<W>> {
        config.validate()?;
        let model = LikelihoodModel::from_configuration(config, histograms)?;
        let walker = ParameterWalker::new(
            config.fixed_rates,
            config.basal.clone(),
            config.stimulus.clone(),
            config.rejection_floor,
        );
        Ok(Sampler {
            model,
            walker,
            rng: SmallRng::seed_from_u64(config.seed),
            coin: Uniform::new(0., 1.),
            trace,
            iterations: config.iterations,
            progress: config.progress,
            accepted: 0,
            rejected: 0,
            filtered: 0,
        })
    }

    pub fn model(&self) -> &LikelihoodModel {
        &self.model
    }

    pub fn walker(&self) -> &ParameterWalker {
        &self.walker
    }

    /// Draw the initial parameters and evaluate them.
    pub fn initialize(&mut self) -> Result<()> {
        self.walker.initialize(&mut self.rng)?;
        let log_likelihood = self
            .model
            .log_likelihood(self.walker.basal(), self.walker.stimulus())?;
        self.walker.set_log_likelihood(log_likelihood)?;
        Ok(())
    }

    /// One Metropolis step.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let proposal = self.walker.propose(&mut self.rng)?;
        if !self.walker.is_physical(&proposal) {
            self.walker.reject()?;
            self.filtered += 1;
            return Ok(StepOutcome::Filtered);
        }
        let log_likelihood = self
            .model
            .log_likelihood(&proposal.basal, &proposal.stimulus)?;
        let coin = self.coin.sample(&mut self.rng);
        if self.walker.decide(log_likelihood, coin)? {
            self.accepted += 1;
            Ok(StepOutcome::Accepted)
        } else {
            self.rejected += 1;
            Ok(StepOutcome::Rejected)
        }
    }

    fn record(&mut self, iteration: usize) -> Result<()> {
        self.trace.record(
            iteration,
            self.walker.basal(),
            self.walker.stimulus(),
            self.walker.log_likelihood(),
        )
    }

    /// Run the whole chain. Iteration 1 is the initial state, every following
    /// iteration is one step; the current state is traced after each of them.
    pub fn run(mut self) -> Result<(RunSummary, TraceWriter<W>)> {
        info!(
            "Sampling {} iterations over {} states ({} transitions)",
            self.iterations,
            self.model.state_space().len(),
            self.model.transition_index().len()
        );
        self.initialize()?;
        self.record(1)?;

        #[cfg(feature = "kdam")]
        let mut bar = tqdm!(
            total = self.iterations.saturating_sub(1),
            disable = !self.progress
        );
        #[cfg(not(feature = "kdam"))]
        let _ = self.progress;

        for iteration in 2..=self.iterations {
            let outcome = self.step()?;
            debug!(
                "Iteration {}: {:?}, log-likelihood {}",
                iteration,
                outcome,
                self.walker.total_log_likelihood()
            );
            self.record(iteration)?;
            #[cfg(feature = "kdam")]
            bar.update(1)?;
        }
        self.trace.flush()?;

        let summary = RunSummary {
            iterations: self.iterations,
            accepted: self.accepted,
            rejected: self.rejected,
            filtered: self.filtered,
            basal: *self.walker.basal(),
            stimulus: *self.walker.stimulus(),
            log_likelihood: self.walker.log_likelihood().to_vec(),
        };
        info!(
            "Done: {} accepted, {} rejected, {} filtered (acceptance rate {:.3})",
            summary.accepted,
            summary.rejected,
            summary.filtered,
            summary.acceptance_rate()
        );
        Ok((summary, self.trace))
    }
}
