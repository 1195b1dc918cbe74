//! Run configuration, read from a JSON file.
use crate::shared::distributions::validate_schedule;
use crate::shared::errors::ModelError;
use crate::shared::parameters::{KineticParameters, RegimeSettings};
use crate::shared::state_space::ModelFamily;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Where the histogram loader finds the observations
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSource {
    pub directory: PathBuf,
    // files are named `myData_<code>_t<time>_List.txt`
    pub code: String,
    // three promoter family: intensity above which a site is super-ON
    pub intensity_threshold: f64,
}

impl Default for DataSource {
    fn default() -> DataSource {
        DataSource {
            directory: PathBuf::from("."),
            code: "Fos".to_string(),
            intensity_threshold: 0.,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    // number of promoter states, 2 or 3
    pub family: u8,
    pub max_mrna: usize,
    // observation times, the first one is the basal (pre-stimulus) state
    pub time_points: Vec<u32>,
    pub time_step: u32,
    // total number of recorded iterations, the initial state included
    pub iterations: usize,
    pub seed: u64,
    // values of the parameters that are not fitted (e.g. the degradation rate)
    pub fixed_rates: KineticParameters,
    pub basal: RegimeSettings,
    pub stimulus: RegimeSettings,
    pub data: DataSource,
    pub output_directory: PathBuf,
    pub progress: bool,
    // proposals with a varying rate at or below this value are rejected
    // without being evaluated
    pub rejection_floor: f64,
}

impl Default for Configuration {
    fn default() -> Configuration {
        let basal = RegimeSettings {
            sigma: KineticParameters {
                k_on: 1e-5,
                k_off: 1e-5,
                mu0: 1e-5,
                mu: 0.01,
                ..Default::default()
            },
            lower: KineticParameters {
                k_on: 1e-6,
                k_off: 1e-4,
                mu0: 1e-5,
                mu: 1e-3,
                ..Default::default()
            },
            upper: KineticParameters {
                k_on: 1e-2,
                k_off: 1.,
                mu0: 1e-1,
                mu: 1.,
                ..Default::default()
            },
        };
        let stimulus = RegimeSettings {
            sigma: KineticParameters {
                k_on: 1e-5,
                k_off: 1e-5,
                mu: 0.01,
                ..Default::default()
            },
            lower: KineticParameters {
                k_on: 1e-4,
                k_off: 1e-6,
                mu: 0.01,
                ..Default::default()
            },
            upper: KineticParameters {
                k_on: 1.,
                k_off: 1e-2,
                mu: 10.,
                ..Default::default()
            },
        };
        Configuration {
            family: 2,
            max_mrna: 300,
            time_points: vec![0, 5, 15, 25],
            time_step: 5,
            iterations: 3,
            seed: 1,
            fixed_rates: KineticParameters {
                d: 0.0462,
                ..Default::default()
            },
            basal,
            stimulus,
            data: DataSource::default(),
            output_directory: PathBuf::from("."),
            progress: true,
            rejection_floor: 1e-8,
        }
    }
}

impl Configuration {
    pub fn model_family(&self) -> Result<ModelFamily, ModelError> {
        ModelFamily::try_from(self.family)
    }

    pub fn load(path: &Path) -> Result<Configuration> {
        let file = File::open(path)
            .with_context(|| format!("Cannot open the configuration file {}", path.display()))?;
        let config: Configuration = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Cannot parse the configuration file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.model_family()?;
        validate_schedule(&self.time_points, self.time_step)?;
        if self.iterations == 0 {
            return Err(ModelError::InvalidConfiguration(
                "the number of iterations must be positive".to_string(),
            ));
        }
        if !(self.rejection_floor.is_finite() && self.rejection_floor >= 0.) {
            return Err(ModelError::InvalidConfiguration(format!(
                "invalid rejection floor {}",
                self.rejection_floor
            )));
        }
        if !self.fixed_rates.all_finite_non_negative() {
            return Err(ModelError::InvalidConfiguration(
                "fixed rates must be finite and non-negative".to_string(),
            ));
        }
        for (name, regime) in [("basal", &self.basal), ("stimulus", &self.stimulus)] {
            for (what, p) in [
                ("sigma", &regime.sigma),
                ("lower", &regime.lower),
                ("upper", &regime.upper),
            ] {
                if !p.all_finite_non_negative() {
                    return Err(ModelError::InvalidConfiguration(format!(
                        "{} {} values must be finite and non-negative",
                        name, what
                    )));
                }
            }
            let (lower, upper) = (regime.lower.to_array(), regime.upper.to_array());
            for i in regime.varying() {
                if lower[i] > upper[i] {
                    return Err(ModelError::InvalidConfiguration(format!(
                        "{} {}: lower bound {} above upper bound {}",
                        name,
                        KineticParameters::NAMES[i],
                        lower[i],
                        upper[i]
                    )));
                }
            }
        }
        Ok(())
    }
}
