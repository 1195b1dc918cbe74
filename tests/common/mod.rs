use kinfish::shared::{Configuration, KineticParameters, ModelFamily, ObservedHistogram};
use ndarray::Array2;
use std::path::PathBuf;

/// Log-likelihood of 100 cells at (OFF/OFF, 0 mRNA) under `golden_rates`,
/// family 2, max_mrna 5: 100 * ln(0.12222932066150642).
#[allow(dead_code)]
pub const GOLDEN_LOG_LIKELIHOOD: f64 = -210.18563210787664;

#[cfg(test)]
#[allow(dead_code)]
pub fn golden_rates() -> KineticParameters {
    KineticParameters {
        k_on: 0.01,
        k_off: 0.02,
        mu0: 0.05,
        mu: 0.5,
        d: 0.1,
        ..Default::default()
    }
}

#[cfg(test)]
#[allow(dead_code)]
pub fn three_state_rates() -> KineticParameters {
    KineticParameters {
        k_on: 0.02,
        k_off: 0.03,
        k_on_super: 0.01,
        k_off_super: 0.05,
        mu0: 0.05,
        mu: 0.5,
        mu_super: 1.5,
        d: 0.1,
    }
}

#[cfg(test)]
#[allow(dead_code)]
pub fn single_bin_histogram(
    family: ModelFamily,
    max_mrna: usize,
    mrna: usize,
    bucket: usize,
    count: u64,
) -> ObservedHistogram {
    let mut counts = Array2::zeros((max_mrna + 1, family.configurations()));
    counts[[mrna, bucket]] = count;
    ObservedHistogram::new(counts, family, max_mrna).unwrap()
}

/// Family 2, max_mrna 5, a single time point and no varying parameter: the
/// walk only re-evaluates `golden_rates`.
#[cfg(test)]
#[allow(dead_code)]
pub fn locked_configuration() -> Configuration {
    Configuration {
        family: 2,
        max_mrna: 5,
        time_points: vec![0],
        time_step: 5,
        iterations: 2,
        seed: 3,
        fixed_rates: golden_rates(),
        basal: Default::default(),
        stimulus: Default::default(),
        progress: false,
        ..Default::default()
    }
}

/// Small walk over kON, kOFF, mu0, mu (basal) and kON, mu (stimulus).
#[cfg(test)]
#[allow(dead_code)]
pub fn varying_configuration() -> Configuration {
    let mut config = Configuration {
        family: 2,
        max_mrna: 12,
        time_points: vec![0, 5, 15],
        time_step: 5,
        iterations: 20,
        seed: 42,
        fixed_rates: KineticParameters {
            d: 0.1,
            ..Default::default()
        },
        progress: false,
        ..Default::default()
    };
    config.basal.sigma = KineticParameters {
        k_on: 1e-6,
        k_off: 1e-6,
        mu0: 1e-6,
        mu: 1e-4,
        ..Default::default()
    };
    config.basal.lower = KineticParameters {
        k_on: 0.005,
        k_off: 0.01,
        mu0: 0.01,
        mu: 0.1,
        ..Default::default()
    };
    config.basal.upper = KineticParameters {
        k_on: 0.02,
        k_off: 0.05,
        mu0: 0.1,
        mu: 1.,
        ..Default::default()
    };
    config.stimulus.sigma = KineticParameters {
        k_on: 1e-6,
        mu: 1e-4,
        ..Default::default()
    };
    config.stimulus.lower = KineticParameters {
        k_on: 0.05,
        mu: 0.5,
        ..Default::default()
    };
    config.stimulus.upper = KineticParameters {
        k_on: 0.1,
        mu: 2.,
        ..Default::default()
    };
    config
}

#[cfg(test)]
#[allow(dead_code)]
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kinfish_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
