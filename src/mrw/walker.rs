//! Metropolis random walk over the basal and stimulus kinetic parameters.
//!
//! Random draws happen in a fixed order, so that a seed always reproduces the
//! same chain:
//! - `initialize`: one uniform per varying basal parameter, then one per
//!   varying stimulus parameter, in parameter order;
//! - `propose`: one standard normal per varying basal parameter, then one per
//!   varying stimulus parameter;
//! - the acceptance coin, drawn by the caller, only for proposals that were
//!   not filtered out by `is_physical`.
use crate::shared::parameters::{KineticParameters, RegimeSettings, N_PARAMETERS};
use anyhow::{anyhow, Result};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, Uniform};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkerPhase {
    Uninitialized,
    Ready,
    ProposalPending,
    Accepted,
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Proposal {
    pub basal: KineticParameters,
    pub stimulus: KineticParameters,
}

/// min(1, exp(proposed - current))
pub fn acceptance_probability(current: f64, proposed: f64) -> f64 {
    if proposed.is_nan() {
        0.
    } else if proposed > current {
        1.
    } else {
        (proposed - current).exp().min(1.)
    }
}

/// Metropolis decision for a uniform draw `coin` in [0, 1).
pub fn metropolis_accept(current: f64, proposed: f64, coin: f64) -> bool {
    coin < acceptance_probability(current, proposed)
}

#[derive(Clone, Debug)]
pub struct ParameterWalker {
    basal_settings: RegimeSettings,
    stimulus_settings: RegimeSettings,
    basal: KineticParameters,
    stimulus: KineticParameters,
    // log-likelihood of the current state, per time point
    log_likelihood: Vec<f64>,
    proposal: Option<Proposal>,
    phase: WalkerPhase,
    floor: f64,
}

impl ParameterWalker {
    /// `fixed` holds the value of every parameter that is not fitted.
    pub fn new(
        fixed: KineticParameters,
        basal_settings: RegimeSettings,
        stimulus_settings: RegimeSettings,
        floor: f64,
    ) -> ParameterWalker {
        ParameterWalker {
            basal_settings,
            stimulus_settings,
            basal: fixed,
            stimulus: fixed,
            log_likelihood: Vec::new(),
            proposal: None,
            phase: WalkerPhase::Uninitialized,
            floor,
        }
    }

    /// Draw the varying parameters uniformly within their bounds. Locked
    /// stimulus parameters copy the basal value. Fails, leaving the walker
    /// uninitialized, if a varying parameter has inverted or non-finite bounds.
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) -> Result<()> {
        if self.phase != WalkerPhase::Uninitialized {
            return Err(anyhow!("The walker is already initialized"));
        }
        let mut basal = self.basal.to_array();
        draw_within_bounds(&mut basal, &self.basal_settings, rng)?;
        let mut stimulus = basal;
        draw_within_bounds(&mut stimulus, &self.stimulus_settings, rng)?;

        self.basal = KineticParameters::from_array(basal);
        self.stimulus = KineticParameters::from_array(stimulus);
        self.phase = WalkerPhase::Ready;
        Ok(())
    }

    /// Store the log-likelihood of the initial state.
    pub fn set_log_likelihood(&mut self, log_likelihood: Vec<f64>) -> Result<()> {
        if self.phase != WalkerPhase::Ready {
            return Err(anyhow!("The walker must be initialized first"));
        }
        self.log_likelihood = log_likelihood;
        Ok(())
    }

    /// Gaussian step of variance `sigma` on every varying parameter. Locked
    /// stimulus parameters are set to the proposed basal value.
    pub fn propose<R: Rng>(&mut self, rng: &mut R) -> Result<Proposal> {
        match self.phase {
            WalkerPhase::Ready | WalkerPhase::Accepted | WalkerPhase::Rejected => {}
            WalkerPhase::Uninitialized => {
                return Err(anyhow!("The walker must be initialized first"))
            }
            WalkerPhase::ProposalPending => {
                return Err(anyhow!("The previous proposal was not resolved"))
            }
        }

        let mut basal = self.basal.to_array();
        add_noise(&mut basal, &self.basal_settings, rng);

        let mut stimulus = self.stimulus.to_array();
        let locked = self.stimulus_settings.sigma.to_array();
        for i in 0..N_PARAMETERS {
            if locked[i] == 0. {
                stimulus[i] = basal[i];
            }
        }
        add_noise(&mut stimulus, &self.stimulus_settings, rng);

        let proposal = Proposal {
            basal: KineticParameters::from_array(basal),
            stimulus: KineticParameters::from_array(stimulus),
        };
        self.proposal = Some(proposal);
        self.phase = WalkerPhase::ProposalPending;
        Ok(proposal)
    }

    /// False if a varying parameter of the proposal is at or below the floor.
    pub fn is_physical(&self, proposal: &Proposal) -> bool {
        above_floor(&proposal.basal, &self.basal_settings, self.floor)
            && above_floor(&proposal.stimulus, &self.stimulus_settings, self.floor)
    }

    /// Drop the pending proposal without evaluating it.
    pub fn reject(&mut self) -> Result<()> {
        self.take_proposal()?;
        self.phase = WalkerPhase::Rejected;
        Ok(())
    }

    /// Metropolis test of the pending proposal, given its log-likelihood per
    /// time point and a uniform draw. Returns true if the proposal was
    /// accepted.
    pub fn decide(&mut self, proposal_log_likelihood: Vec<f64>, coin: f64) -> Result<bool> {
        let proposal = self.take_proposal()?;
        let current = self.total_log_likelihood();
        let proposed: f64 = proposal_log_likelihood.iter().sum();
        if metropolis_accept(current, proposed, coin) {
            self.basal = proposal.basal;
            self.stimulus = proposal.stimulus;
            self.log_likelihood = proposal_log_likelihood;
            self.phase = WalkerPhase::Accepted;
            Ok(true)
        } else {
            self.phase = WalkerPhase::Rejected;
            Ok(false)
        }
    }

    fn take_proposal(&mut self) -> Result<Proposal> {
        if self.phase != WalkerPhase::ProposalPending {
            return Err(anyhow!("No proposal is pending"));
        }
        self.proposal
            .take()
            .ok_or_else(|| anyhow!("No proposal is pending"))
    }

    pub fn basal(&self) -> &KineticParameters {
        &self.basal
    }

    pub fn stimulus(&self) -> &KineticParameters {
        &self.stimulus
    }

    pub fn log_likelihood(&self) -> &[f64] {
        &self.log_likelihood
    }

    pub fn total_log_likelihood(&self) -> f64 {
        self.log_likelihood.iter().sum()
    }

    pub fn phase(&self) -> WalkerPhase {
        self.phase
    }

    pub fn pending_proposal(&self) -> Option<&Proposal> {
        self.proposal.as_ref()
    }
}

fn draw_within_bounds<R: Rng>(
    values: &mut [f64; N_PARAMETERS],
    settings: &RegimeSettings,
    rng: &mut R,
) -> Result<()> {
    let (lower, upper) = (settings.lower.to_array(), settings.upper.to_array());
    for i in settings.varying() {
        if !(lower[i].is_finite() && upper[i].is_finite() && lower[i] <= upper[i]) {
            return Err(anyhow!(
                "Invalid initialization bounds [{}, {}] for {}",
                lower[i],
                upper[i],
                KineticParameters::NAMES[i]
            ));
        }
        values[i] = Uniform::new_inclusive(lower[i], upper[i]).sample(rng);
    }
    Ok(())
}

fn add_noise<R: Rng>(values: &mut [f64; N_PARAMETERS], settings: &RegimeSettings, rng: &mut R) {
    let sigma = settings.sigma.to_array();
    for i in settings.varying() {
        let noise: f64 = StandardNormal.sample(rng);
        values[i] += noise * sigma[i].sqrt();
    }
}

fn above_floor(p: &KineticParameters, settings: &RegimeSettings, floor: f64) -> bool {
    let values = p.to_array();
    settings.varying().into_iter().all(|i| values[i] > floor)
}
