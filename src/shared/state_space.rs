//! Enumeration of the CTMC states and of the structurally non-zero entries
//! of the generator.
//!
//! A cell carries two copies of the gene. Each copy is OFF, ON or (three
//! promoter family only) super-ON, and the cell holds between 0 and `max_mrna`
//! mRNA molecules. States are ordered with the promoter configuration outside
//! and the mRNA count inside, so that state `c * (max_mrna + 1) + m` is the
//! configuration `c` with `m` molecules. That ordering is also the column
//! order of the observation histograms.
//!
//! The transition index only depends on the geometry of the state space, it
//! is computed once and reused for every parameter set.

use crate::shared::errors::ModelError;
use itertools::iproduct;

/// Number of gene copies per cell
pub const PROMOTER_COPIES: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    /// OFF <-> ON
    TwoState,
    /// OFF <-> ON <-> super-ON
    ThreeState,
}

impl TryFrom<u8> for ModelFamily {
    type Error = ModelError;
    fn try_from(n: u8) -> Result<Self, ModelError> {
        match n {
            2 => Ok(ModelFamily::TwoState),
            3 => Ok(ModelFamily::ThreeState),
            _ => Err(ModelError::UnsupportedModelFamily(n)),
        }
    }
}

impl From<ModelFamily> for u8 {
    fn from(family: ModelFamily) -> u8 {
        family.promoter_states()
    }
}

impl ModelFamily {
    /// Number of states a single promoter copy can be in (N).
    pub fn promoter_states(&self) -> u8 {
        match self {
            ModelFamily::TwoState => 2,
            ModelFamily::ThreeState => 3,
        }
    }

    /// Number of configurations of the two copies, N + N(N-1)/2.
    pub fn configurations(&self) -> usize {
        let n = self.promoter_states() as usize;
        n + n * (n - 1) / 2
    }

    /// The promoter configurations, in state-space order.
    pub fn promoter_configurations(&self) -> Vec<PromoterState> {
        match self {
            ModelFamily::TwoState => (0..=PROMOTER_COPIES)
                .map(|active| PromoterState {
                    active,
                    super_active: 0,
                })
                .collect(),
            ModelFamily::ThreeState => (0..=PROMOTER_COPIES)
                .flat_map(|super_active| {
                    (0..=(PROMOTER_COPIES - super_active)).map(move |active| PromoterState {
                        active,
                        super_active,
                    })
                })
                .collect(),
        }
    }

    /// Position of a promoter configuration in `promoter_configurations`.
    pub fn configuration_index(&self, promoter: &PromoterState) -> Option<usize> {
        let (a, s) = (promoter.active, promoter.super_active);
        if a + s > PROMOTER_COPIES {
            return None;
        }
        match self {
            ModelFamily::TwoState if s == 0 => Some(a as usize),
            ModelFamily::TwoState => None,
            ModelFamily::ThreeState => {
                let (a, s) = (a as usize, s as usize);
                // each super-ON level leaves one fewer ON/OFF split
                Some(3 * s - s * s.saturating_sub(1) / 2 + a)
            }
        }
    }

    /// Elementary reactions of the family (the diagonal marker excluded).
    pub fn reactions(&self) -> &'static [ReactionKind] {
        match self {
            ModelFamily::TwoState => &[
                ReactionKind::Activation,
                ReactionKind::Deactivation,
                ReactionKind::Synthesis,
                ReactionKind::Degradation,
            ],
            ModelFamily::ThreeState => &[
                ReactionKind::Activation,
                ReactionKind::Deactivation,
                ReactionKind::SuperActivation,
                ReactionKind::SuperDeactivation,
                ReactionKind::Synthesis,
                ReactionKind::Degradation,
            ],
        }
    }
}

/// How many of the two copies are ON and super-ON.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PromoterState {
    pub active: u8,
    pub super_active: u8,
}

impl PromoterState {
    pub fn inactive(&self) -> u8 {
        PROMOTER_COPIES - self.active - self.super_active
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct State {
    pub promoter: PromoterState,
    pub mrna: usize,
}

impl State {
    /// (ON, super-ON, mRNA) difference `self - other`
    fn difference(&self, other: &State) -> (i64, i64, i64) {
        (
            self.promoter.active as i64 - other.promoter.active as i64,
            self.promoter.super_active as i64 - other.promoter.super_active as i64,
            self.mrna as i64 - other.mrna as i64,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReactionKind {
    Diagonal,
    Activation,
    Deactivation,
    SuperActivation,
    SuperDeactivation,
    Synthesis,
    Degradation,
}

impl ReactionKind {
    /// State change (ON, super-ON, mRNA) produced by the reaction.
    pub fn signature(&self) -> (i64, i64, i64) {
        match self {
            ReactionKind::Diagonal => (0, 0, 0),
            ReactionKind::Activation => (1, 0, 0),
            ReactionKind::Deactivation => (-1, 0, 0),
            ReactionKind::SuperActivation => (-1, 1, 0),
            ReactionKind::SuperDeactivation => (1, -1, 0),
            ReactionKind::Synthesis => (0, 0, 1),
            ReactionKind::Degradation => (0, 0, -1),
        }
    }

    fn classify(family: ModelFamily, difference: (i64, i64, i64)) -> Option<ReactionKind> {
        if difference == ReactionKind::Diagonal.signature() {
            return Some(ReactionKind::Diagonal);
        }
        family
            .reactions()
            .iter()
            .find(|r| r.signature() == difference)
            .copied()
    }
}

/// One structurally non-zero entry `A[target, source]` of the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
    pub kind: ReactionKind,
    pub target: usize,
    pub source: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StateSpace {
    family: ModelFamily,
    max_mrna: usize,
    states: Vec<State>,
}

impl StateSpace {
    pub fn new(family: ModelFamily, max_mrna: usize) -> StateSpace {
        let states = family
            .promoter_configurations()
            .into_iter()
            .flat_map(|promoter| (0..=max_mrna).map(move |mrna| State { promoter, mrna }))
            .collect();
        StateSpace {
            family,
            max_mrna,
            states,
        }
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    pub fn max_mrna(&self) -> usize {
        self.max_mrna
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, index: usize) -> &State {
        &self.states[index]
    }

    pub fn index_of(&self, state: &State) -> Option<usize> {
        if state.mrna > self.max_mrna {
            return None;
        }
        let config = self.family.configuration_index(&state.promoter)?;
        Some(config * (self.max_mrna + 1) + state.mrna)
    }

    /// State reached from `source` through `kind`, if it exists.
    fn neighbor(&self, source: &State, kind: ReactionKind) -> Option<usize> {
        let (da, ds, dm) = kind.signature();
        let active = source.promoter.active as i64 + da;
        let super_active = source.promoter.super_active as i64 + ds;
        let mrna = source.mrna as i64 + dm;
        if active < 0 || super_active < 0 || mrna < 0 {
            return None;
        }
        self.index_of(&State {
            promoter: PromoterState {
                active: u8::try_from(active).ok()?,
                super_active: u8::try_from(super_active).ok()?,
            },
            mrna: mrna as usize,
        })
    }
}

/// Structurally non-zero generator entries, sorted by source then target.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionIndex {
    transitions: Vec<Transition>,
}

impl TransitionIndex {
    /// Compare every ordered pair of states against the reaction signatures.
    /// Quadratic in the number of states, kept as the reference construction.
    pub fn scan(space: &StateSpace) -> TransitionIndex {
        let states = space.states();
        let transitions = iproduct!(0..states.len(), 0..states.len())
            .filter_map(|(source, target)| {
                let difference = states[target].difference(&states[source]);
                ReactionKind::classify(space.family(), difference).map(|kind| Transition {
                    kind,
                    target,
                    source,
                })
            })
            .collect();
        TransitionIndex { transitions }
    }

    /// Same entries as `scan`, obtained by applying each reaction to each state.
    pub fn derive(space: &StateSpace) -> TransitionIndex {
        let per_state = space.family().reactions().len() + 1;
        let mut transitions = Vec::with_capacity(space.len() * per_state);
        for (source, state) in space.states().iter().enumerate() {
            let mut local: Vec<Transition> = std::iter::once(ReactionKind::Diagonal)
                .chain(space.family().reactions().iter().copied())
                .filter_map(|kind| {
                    space.neighbor(state, kind).map(|target| Transition {
                        kind,
                        target,
                        source,
                    })
                })
                .collect();
            local.sort_by_key(|t| t.target);
            transitions.extend(local);
        }
        TransitionIndex { transitions }
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transition> {
        self.transitions.iter()
    }

    pub fn as_slice(&self) -> &[Transition] {
        &self.transitions
    }
}

/// Build the state space and its transition index for a model family.
pub fn build(family: u8, max_mrna: usize) -> Result<(StateSpace, TransitionIndex), ModelError> {
    let family = ModelFamily::try_from(family)?;
    let space = StateSpace::new(family, max_mrna);
    let index = TransitionIndex::derive(&space);
    Ok((space, index))
}
