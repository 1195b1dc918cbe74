mod common;
use approx::assert_abs_diff_eq;
use kinfish::shared::distributions::{evolve, stationary, validate_schedule, Propagator};
use kinfish::shared::generator::assemble;
use kinfish::shared::state_space::build;
use kinfish::shared::{KineticParameters, ModelError};

#[test]
fn stationary_distribution_properties() {
    for (family, rates) in [(2, common::golden_rates()), (3, common::three_state_rates())] {
        let (space, index) = build(family, 15).unwrap();
        let a = assemble(&space, &index, &rates);
        let p = stationary(&a).unwrap();
        assert_eq!(p.len(), space.len());
        assert!(p.iter().all(|&x| x >= 0.));
        assert_abs_diff_eq!(p.sum(), 1., epsilon = 1e-12);
        assert!((&a * &p).amax() < 1e-10);
    }
}

#[test]
fn stationary_golden_value() {
    let (space, index) = build(2, 5).unwrap();
    let p = stationary(&assemble(&space, &index, &common::golden_rates())).unwrap();
    assert_abs_diff_eq!(p[0], 0.12222932066150642, epsilon = 1e-10);
}

#[test]
fn stationary_without_synthesis_is_binomial() {
    // no mRNA is produced, each copy is ON with probability kON / (kON + kOFF)
    let rates = KineticParameters {
        k_on: 0.01,
        k_off: 0.03,
        d: 0.1,
        ..Default::default()
    };
    let max_mrna = 4;
    let (space, index) = build(2, max_mrna).unwrap();
    let p = stationary(&assemble(&space, &index, &rates)).unwrap();
    let on = 0.25;
    assert_abs_diff_eq!(p[0], (1. - on) * (1. - on), epsilon = 1e-10);
    assert_abs_diff_eq!(p[max_mrna + 1], 2. * on * (1. - on), epsilon = 1e-10);
    assert_abs_diff_eq!(p[2 * (max_mrna + 1)], on * on, epsilon = 1e-10);
}

#[test]
fn stationary_of_a_reducible_chain_is_deterministic() {
    // only degradation: every configuration with 0 mRNA is absorbing, so the
    // zero eigenvalue has multiplicity 3
    let rates = KineticParameters {
        d: 0.1,
        ..Default::default()
    };
    let max_mrna = 3;
    let (space, index) = build(2, max_mrna).unwrap();
    let a = assemble(&space, &index, &rates);
    let p = stationary(&a).unwrap();
    let q = stationary(&a).unwrap();
    assert_eq!(p, q);
    assert!(p.iter().all(|&x| x >= 0.));
    assert_abs_diff_eq!(p.sum(), 1., epsilon = 1e-12);
    assert!((&a * &p).amax() < 1e-10);
    for (i, state) in space.states().iter().enumerate() {
        if state.mrna > 0 {
            assert_abs_diff_eq!(p[i], 0., epsilon = 1e-10);
        }
    }
}

#[test]
fn stationary_rejects_non_finite_generators() {
    let (space, index) = build(2, 2).unwrap();
    let mut a = assemble(&space, &index, &common::golden_rates());
    a[(0, 1)] = f64::NAN;
    assert!(matches!(
        stationary(&a),
        Err(ModelError::NumericalFailure(_))
    ));
}

#[test]
fn propagation_composes() {
    let (space, index) = build(2, 10).unwrap();
    let basal = assemble(&space, &index, &common::golden_rates());
    let stimulus = assemble(
        &space,
        &index,
        &KineticParameters {
            k_on: 0.1,
            ..common::golden_rates()
        },
    );
    let p0 = stationary(&basal).unwrap();

    let once = Propagator::new(&stimulus, 5).unwrap();
    let twice = Propagator::new(&stimulus, 10).unwrap();
    let squared = once.matrix() * once.matrix();
    assert!((twice.matrix() - squared).amax() < 1e-12);

    let direct = evolve(&stimulus, &p0, &[0, 10], 5).unwrap();
    let stepped = evolve(&stimulus, &p0, &[0, 5, 10], 5).unwrap();
    assert_eq!(direct.len(), 2);
    assert_eq!(stepped.len(), 3);
    assert_eq!(direct[0], p0);
    assert!((&direct[1] - &stepped[2]).amax() < 1e-12);
    assert!((&twice.apply(&p0, 1) - &direct[1]).amax() < 1e-12);
    for p in stepped {
        assert_abs_diff_eq!(p.sum(), 1., epsilon = 1e-10);
    }
}

#[test]
fn evolution_under_the_basal_rates_is_stationary() {
    let (space, index) = build(3, 6).unwrap();
    let a = assemble(&space, &index, &common::three_state_rates());
    let p0 = stationary(&a).unwrap();
    let trajectory = evolve(&a, &p0, &[0, 5, 15, 25], 5).unwrap();
    for p in trajectory.iter().skip(1) {
        assert!((p - &p0).amax() < 1e-9);
    }
}

#[test]
fn invalid_time_schedules() {
    assert_eq!(validate_schedule(&[0, 5, 15, 25], 5).unwrap(), vec![1, 2, 2]);
    assert_eq!(validate_schedule(&[10], 5).unwrap(), Vec::<u32>::new());
    for (times, step) in [
        (vec![], 5),
        (vec![0, 5], 0),
        (vec![0, 7], 5),
        (vec![0, 5, 5], 5),
        (vec![10, 5], 5),
    ] {
        assert!(matches!(
            validate_schedule(&times, step),
            Err(ModelError::InvalidTimeSchedule(_))
        ));
    }

    let (space, index) = build(2, 2).unwrap();
    let a = assemble(&space, &index, &common::golden_rates());
    let p0 = stationary(&a).unwrap();
    assert!(matches!(
        evolve(&a, &p0, &[0, 3], 5),
        Err(ModelError::InvalidTimeSchedule(_))
    ));
}
