#![warn(clippy::large_types_passed_by_value)]

pub mod mrw;
pub mod shared;

pub use crate::mrw::{LikelihoodModel, ParameterWalker, RunSummary, Sampler, TraceWriter};
pub use crate::shared::{
    assemble, build, evolve, score, stationary, Configuration, GeneratorMatrix, KineticParameters,
    ModelError, ModelFamily, ObservedHistogram, ProbabilityVector, ReactionKind, RegimeSettings,
    StateSpace, TransitionIndex,
};
