//! Probability distributions over the CTMC states: the stationary
//! distribution of the basal regime and its evolution after the stimulus.
use crate::shared::errors::ModelError;
use crate::shared::generator::GeneratorMatrix;
use log::warn;
use nalgebra::{DMatrix, DVector, Schur, SVD};

pub type ProbabilityVector = DVector<f64>;

// convergence of the Schur and SVD iterations
const EPSILON: f64 = f64::EPSILON;
const MAX_ITERATIONS: usize = 100_000;
// two eigenvalues closer than this (relative to the largest rate) are
// considered equally minimal
const DEGENERACY_TOLERANCE: f64 = 1e-10;

/// Stationary distribution of the generator `a`.
///
/// The eigenvalues of `a` are obtained from its real Schur decomposition and
/// the one of smallest modulus is selected (the theoretical zero eigenvalue).
/// When several eigenvalues share the minimal modulus, the first one in the
/// order of the Schur diagonal is taken. The eigenvector is then the right
/// singular vector of `a - λI` associated with its smallest singular value
/// (first one on ties), taken in absolute value and normalized to one. For a
/// reducible chain the result is therefore a deterministic mixture of the
/// stationary distributions of the closed classes.
pub fn stationary(a: &GeneratorMatrix) -> Result<ProbabilityVector, ModelError> {
    let n = a.nrows();
    if n == 0 || a.ncols() != n {
        return Err(ModelError::NumericalFailure(format!(
            "the generator must be a non-empty square matrix, got {}x{}",
            a.nrows(),
            a.ncols()
        )));
    }
    check_finite(a.iter(), "generator matrix")?;

    let schur = Schur::try_new(a.clone(), EPSILON, MAX_ITERATIONS).ok_or_else(|| {
        ModelError::NumericalFailure("the eigen-decomposition did not converge".to_string())
    })?;
    let eigenvalues = schur.complex_eigenvalues();
    let moduli: Vec<f64> = eigenvalues.iter().map(|z| z.re.hypot(z.im)).collect();
    check_finite(moduli.iter(), "eigenvalues")?;
    let selected = first_argmin(&moduli);

    let scale = a.amax().max(1.);
    let degenerate = moduli
        .iter()
        .filter(|&&m| m - moduli[selected] <= DEGENERACY_TOLERANCE * scale)
        .count();
    if degenerate > 1 {
        warn!(
            "{} eigenvalues are numerically zero, the chain is reducible",
            degenerate
        );
    }

    let mut shifted = a.clone();
    let lambda = eigenvalues[selected].re;
    for i in 0..n {
        shifted[(i, i)] -= lambda;
    }
    let svd = SVD::try_new(shifted, false, true, EPSILON, MAX_ITERATIONS).ok_or_else(|| {
        ModelError::NumericalFailure("the singular value decomposition did not converge".into())
    })?;
    let v_t = svd.v_t.ok_or_else(|| {
        ModelError::NumericalFailure("no right singular vectors were computed".to_string())
    })?;
    let k = first_argmin(svd.singular_values.as_slice());

    let eigenvector: ProbabilityVector = v_t.row(k).transpose().map(f64::abs);
    let total = eigenvector.sum();
    if !(total.is_finite() && total > 0.) {
        return Err(ModelError::NumericalFailure(format!(
            "the stationary eigenvector cannot be normalized (sum = {})",
            total
        )));
    }
    Ok(eigenvector / total)
}

/// `exp(A * step)`, applied repeatedly to move a distribution forward in
/// time by multiples of `step`.
#[derive(Clone, Debug)]
pub struct Propagator {
    step: u32,
    matrix: DMatrix<f64>,
}

impl Propagator {
    pub fn new(a: &GeneratorMatrix, step: u32) -> Result<Propagator, ModelError> {
        let matrix = (a * step as f64).exp();
        check_finite(matrix.iter(), "matrix exponential")?;
        Ok(Propagator { step, matrix })
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Move `p` forward by `steps` base steps.
    pub fn apply(&self, p: &ProbabilityVector, steps: u32) -> ProbabilityVector {
        let mut current = p.clone();
        for _ in 0..steps {
            current = &self.matrix * current;
        }
        current
    }
}

/// Check that the time points are strictly increasing and spaced by multiples
/// of `step`. Returns the number of base steps between consecutive points.
pub fn validate_schedule(time_points: &[u32], step: u32) -> Result<Vec<u32>, ModelError> {
    if time_points.is_empty() {
        return Err(ModelError::InvalidTimeSchedule(
            "at least one time point is needed".to_string(),
        ));
    }
    if step == 0 {
        return Err(ModelError::InvalidTimeSchedule(
            "the base time step must be positive".to_string(),
        ));
    }
    time_points
        .windows(2)
        .map(|w| {
            if w[1] <= w[0] {
                return Err(ModelError::InvalidTimeSchedule(format!(
                    "time points must be strictly increasing ({} then {})",
                    w[0], w[1]
                )));
            }
            let gap = w[1] - w[0];
            if gap % step != 0 {
                return Err(ModelError::InvalidTimeSchedule(format!(
                    "the gap between {} and {} is not a multiple of {}",
                    w[0], w[1], step
                )));
            }
            Ok(gap / step)
        })
        .collect()
}

/// Distribution at every time point: `p0` at the first one, then `p0`
/// propagated under the stimulus generator `a_s`.
pub fn evolve(
    a_s: &GeneratorMatrix,
    p0: &ProbabilityVector,
    time_points: &[u32],
    step: u32,
) -> Result<Vec<ProbabilityVector>, ModelError> {
    let gaps = validate_schedule(time_points, step)?;
    if p0.len() != a_s.nrows() {
        return Err(ModelError::NumericalFailure(format!(
            "initial distribution of length {} for a generator of size {}",
            p0.len(),
            a_s.nrows()
        )));
    }

    let mut distributions = Vec::with_capacity(time_points.len());
    distributions.push(p0.clone());
    if gaps.is_empty() {
        return Ok(distributions);
    }

    let propagator = Propagator::new(a_s, step)?;
    let mut current = p0.clone();
    for steps in gaps {
        current = propagator.apply(&current, steps);
        check_finite(current.iter(), "propagated distribution")?;
        distributions.push(current.clone());
    }
    Ok(distributions)
}

fn first_argmin(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v < values[best] {
            best = i;
        }
    }
    best
}

fn check_finite<'a>(
    mut values: impl Iterator<Item = &'a f64>,
    what: &str,
) -> Result<(), ModelError> {
    if values.all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(ModelError::NumericalFailure(format!(
            "non-finite value in the {}",
            what
        )))
    }
}
