//! Metropolis random walk over the kinetic parameters
pub mod sampler;
pub mod trace;
pub mod walker;

pub use sampler::{LikelihoodModel, RunSummary, Sampler, StepOutcome};
pub use trace::TraceWriter;
pub use walker::{acceptance_probability, metropolis_accept, ParameterWalker, Proposal, WalkerPhase};
