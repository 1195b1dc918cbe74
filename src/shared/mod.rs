//! CTMC model of the two gene copies and the associated probability
//! computations, shared by the sampler and the binary.
pub mod config;
pub mod data;
pub mod distributions;
pub mod errors;
pub mod generator;
pub mod likelihood;
pub mod parameters;
pub mod state_space;

pub use config::{Configuration, DataSource};
pub use distributions::{evolve, stationary, validate_schedule, ProbabilityVector, Propagator};
pub use errors::ModelError;
pub use generator::{assemble, GeneratorMatrix};
pub use likelihood::{bucket_count, bucket_index, score, ObservedHistogram};
pub use parameters::{KineticParameters, RegimeSettings};
pub use state_space::{
    build, ModelFamily, PromoterState, ReactionKind, State, StateSpace, Transition,
    TransitionIndex,
};
