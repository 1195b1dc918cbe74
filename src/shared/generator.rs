//! Fill the numeric propensities of a parameter set into the transition
//! index. Column `j` of the generator holds the rates out of state `j`, so
//! that `dP/dt = A P`.
use crate::shared::parameters::KineticParameters;
use crate::shared::state_space::{ReactionKind, State, StateSpace, TransitionIndex};
use nalgebra::DMatrix;

pub type GeneratorMatrix = DMatrix<f64>;

/// Propensity of a reaction fired from `source`.
pub fn propensity(kind: ReactionKind, source: &State, p: &KineticParameters) -> f64 {
    let promoter = &source.promoter;
    let off = promoter.inactive() as f64;
    let on = promoter.active as f64;
    let super_on = promoter.super_active as f64;
    match kind {
        ReactionKind::Diagonal => 0.,
        ReactionKind::Activation => p.k_on * off,
        ReactionKind::Deactivation => p.k_off * on,
        ReactionKind::SuperActivation => p.k_on_super * on,
        ReactionKind::SuperDeactivation => p.k_off_super * super_on,
        ReactionKind::Synthesis => p.mu0 * off + p.mu * on + p.mu_super * super_on,
        ReactionKind::Degradation => p.d * source.mrna as f64,
    }
}

/// Assemble the generator matrix of `p`.
///
/// The diagonal entry of a state is minus the sum of the propensities that
/// actually leave it within the state space, so synthesis at `max_mrna` is
/// not counted and every column sums to zero.
pub fn assemble(
    space: &StateSpace,
    index: &TransitionIndex,
    p: &KineticParameters,
) -> GeneratorMatrix {
    let n = space.len();
    let mut a = DMatrix::zeros(n, n);
    let mut outflow = vec![0.; n];
    for t in index.iter() {
        if t.kind == ReactionKind::Diagonal {
            continue;
        }
        let rate = propensity(t.kind, space.state(t.source), p);
        a[(t.target, t.source)] = rate;
        outflow[t.source] += rate;
    }
    for t in index.iter().filter(|t| t.kind == ReactionKind::Diagonal) {
        a[(t.target, t.source)] = -outflow[t.source];
    }
    a
}
