use kinfish::mrw::{acceptance_probability, metropolis_accept, ParameterWalker, Proposal, WalkerPhase};
use kinfish::shared::{KineticParameters, RegimeSettings};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn settings(sigma: KineticParameters, lower: KineticParameters, upper: KineticParameters) -> RegimeSettings {
    RegimeSettings {
        sigma,
        lower,
        upper,
    }
}

/// Basal kON and mu vary, stimulus kON varies, everything else is locked.
fn walker() -> ParameterWalker {
    let fixed = KineticParameters {
        k_off: 0.02,
        mu0: 0.05,
        d: 0.1,
        ..Default::default()
    };
    let basal = settings(
        KineticParameters {
            k_on: 1e-4,
            mu: 1e-2,
            ..Default::default()
        },
        KineticParameters {
            k_on: 0.01,
            mu: 0.5,
            ..Default::default()
        },
        KineticParameters {
            k_on: 0.02,
            mu: 1.,
            ..Default::default()
        },
    );
    let stimulus = settings(
        KineticParameters {
            k_on: 1e-4,
            ..Default::default()
        },
        KineticParameters {
            k_on: 0.1,
            ..Default::default()
        },
        KineticParameters {
            k_on: 0.2,
            ..Default::default()
        },
    );
    ParameterWalker::new(fixed, basal, stimulus, 1e-8)
}

#[test]
fn acceptance() {
    assert_eq!(acceptance_probability(-10., -5.), 1.);
    assert_eq!(acceptance_probability(-10., -10.), 1.);
    assert!((acceptance_probability(-10., -12.) - (-2f64).exp()).abs() < 1e-15);
    assert_eq!(acceptance_probability(-10., f64::NAN), 0.);
    assert_eq!(acceptance_probability(-10., f64::NEG_INFINITY), 0.);

    assert!(metropolis_accept(-10., -5., 0.999999));
    assert!(metropolis_accept(-10., -12., 0.1));
    assert!(!metropolis_accept(-10., -12., 0.2));
    assert!(!metropolis_accept(-10., f64::NAN, 0.));
}

#[test]
fn initialization_within_bounds() {
    let mut rng = SmallRng::seed_from_u64(11);
    for _ in 0..50 {
        let mut w = walker();
        assert_eq!(w.phase(), WalkerPhase::Uninitialized);
        w.initialize(&mut rng).unwrap();
        assert_eq!(w.phase(), WalkerPhase::Ready);
        let (b, s) = (*w.basal(), *w.stimulus());
        assert!((0.01..=0.02).contains(&b.k_on));
        assert!((0.5..=1.).contains(&b.mu));
        assert_eq!((b.k_off, b.mu0, b.d), (0.02, 0.05, 0.1));
        assert!((0.1..=0.2).contains(&s.k_on));
        // locked stimulus parameters start at the basal value
        assert_eq!(s.mu, b.mu);
        assert_eq!((s.k_off, s.mu0, s.d), (0.02, 0.05, 0.1));
    }
}

#[test]
fn locked_stimulus_follows_basal_proposal() {
    let mut rng = SmallRng::seed_from_u64(5);
    let mut w = walker();
    w.initialize(&mut rng).unwrap();
    w.set_log_likelihood(vec![-100.]).unwrap();
    for _ in 0..20 {
        let current = (*w.basal(), *w.stimulus());
        let proposal = w.propose(&mut rng).unwrap();
        assert_eq!(w.phase(), WalkerPhase::ProposalPending);
        assert_eq!(w.pending_proposal(), Some(&proposal));
        assert_eq!(proposal.stimulus.mu, proposal.basal.mu);
        assert_ne!(proposal.basal.mu, current.0.mu);
        assert_ne!(proposal.stimulus.k_on, current.1.k_on);
        assert_eq!(proposal.basal.k_off, 0.02);
        assert_eq!(proposal.stimulus.d, 0.1);
        w.decide(vec![-100.], 0.5).unwrap();
        assert_eq!(w.phase(), WalkerPhase::Accepted);
        assert_eq!(*w.basal(), proposal.basal);
        assert_eq!(*w.stimulus(), proposal.stimulus);
    }
}

#[test]
fn decisions_update_the_state() {
    let mut rng = SmallRng::seed_from_u64(8);
    let mut w = walker();
    w.initialize(&mut rng).unwrap();
    w.set_log_likelihood(vec![-50., -50.]).unwrap();
    let before = (*w.basal(), *w.stimulus());

    w.propose(&mut rng).unwrap();
    assert!(!w.decide(vec![-60., -50.], 0.5).unwrap());
    assert_eq!(w.phase(), WalkerPhase::Rejected);
    assert_eq!((*w.basal(), *w.stimulus()), before);
    assert_eq!(w.log_likelihood(), &[-50., -50.]);
    assert!(w.pending_proposal().is_none());

    let proposal = w.propose(&mut rng).unwrap();
    assert!(w.decide(vec![-40., -45.], 0.999).unwrap());
    assert_eq!(*w.basal(), proposal.basal);
    assert_eq!(w.total_log_likelihood(), -85.);
}

#[test]
fn floor_filter() {
    let mut rng = SmallRng::seed_from_u64(2);
    let mut w = walker();
    w.initialize(&mut rng).unwrap();
    let good = Proposal {
        basal: *w.basal(),
        stimulus: *w.stimulus(),
    };
    assert!(w.is_physical(&good));

    let mut bad = good;
    bad.basal.mu = -0.1;
    assert!(!w.is_physical(&bad));
    let mut bad = good;
    bad.stimulus.k_on = 1e-9;
    assert!(!w.is_physical(&bad));
    // locked parameters are not checked
    let mut locked = good;
    locked.basal.k_on_super = 0.;
    assert!(w.is_physical(&locked));

    w.set_log_likelihood(vec![-1.]).unwrap();
    w.propose(&mut rng).unwrap();
    w.reject().unwrap();
    assert_eq!(w.phase(), WalkerPhase::Rejected);
    assert_eq!(*w.basal(), good.basal);
}

#[test]
fn phase_errors() {
    let mut rng = SmallRng::seed_from_u64(0);
    let mut w = walker();
    assert!(w.propose(&mut rng).is_err());
    assert!(w.set_log_likelihood(vec![0.]).is_err());
    assert!(w.reject().is_err());
    w.initialize(&mut rng).unwrap();
    assert!(w.initialize(&mut rng).is_err());
    assert!(w.decide(vec![0.], 0.).is_err());
    w.set_log_likelihood(vec![0.]).unwrap();
    w.propose(&mut rng).unwrap();
    assert!(w.propose(&mut rng).is_err());
    assert!(w.set_log_likelihood(vec![0.]).is_err());
    w.reject().unwrap();
    assert!(w.reject().is_err());
}

#[test]
fn seeded_walks_are_reproducible() {
    let run = |seed| {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut w = walker();
        w.initialize(&mut rng).unwrap();
        w.set_log_likelihood(vec![0.]).unwrap();
        let mut proposals = Vec::new();
        for i in 0..10 {
            proposals.push(w.propose(&mut rng).unwrap());
            w.decide(vec![-(i as f64)], 0.5).unwrap();
        }
        proposals
    };
    assert_eq!(run(17), run(17));
    assert_ne!(run(17), run(18));
}

#[test]
fn invalid_bounds_fail_initialization() {
    let mut rng = SmallRng::seed_from_u64(1);
    let sigma = KineticParameters {
        k_on: 1e-4,
        ..Default::default()
    };
    for (lower, upper) in [(0.2, 0.1), (f64::NAN, 0.1), (0.01, f64::INFINITY)] {
        let bounds = settings(
            sigma,
            KineticParameters {
                k_on: lower,
                ..Default::default()
            },
            KineticParameters {
                k_on: upper,
                ..Default::default()
            },
        );
        let mut w = ParameterWalker::new(KineticParameters::default(), bounds, RegimeSettings::default(), 1e-8);
        assert!(w.initialize(&mut rng).is_err());
        assert_eq!(w.phase(), WalkerPhase::Uninitialized);
    }
}
