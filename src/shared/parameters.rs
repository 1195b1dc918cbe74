//! The kinetic rates of the model and the per-regime settings of the walk
use serde::{Deserialize, Serialize};

pub const N_PARAMETERS: usize = 8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KineticParameters {
    // promoter activation rate (OFF -> ON)
    #[serde(rename = "kON")]
    pub k_on: f64,
    // promoter deactivation rate (ON -> OFF)
    #[serde(rename = "kOFF")]
    pub k_off: f64,
    // promoter super-activation rate (ON -> super-ON)
    #[serde(rename = "kONs")]
    pub k_on_super: f64,
    // promoter super-deactivation rate (super-ON -> ON)
    #[serde(rename = "kOFFs")]
    pub k_off_super: f64,
    // mRNA synthesis from an OFF / ON / super-ON copy
    pub mu0: f64,
    pub mu: f64,
    #[serde(rename = "muS")]
    pub mu_super: f64,
    // mRNA degradation rate (per molecule)
    pub d: f64,
}

impl KineticParameters {
    /// Column names, in the order of `to_array`
    pub const NAMES: [&'static str; N_PARAMETERS] =
        ["kON", "kOFF", "kONs", "kOFFs", "mu0", "mu", "muS", "d"];

    pub fn to_array(&self) -> [f64; N_PARAMETERS] {
        [
            self.k_on,
            self.k_off,
            self.k_on_super,
            self.k_off_super,
            self.mu0,
            self.mu,
            self.mu_super,
            self.d,
        ]
    }

    pub fn from_array(p: [f64; N_PARAMETERS]) -> KineticParameters {
        KineticParameters {
            k_on: p[0],
            k_off: p[1],
            k_on_super: p[2],
            k_off_super: p[3],
            mu0: p[4],
            mu: p[5],
            mu_super: p[6],
            d: p[7],
        }
    }

    pub fn all_finite_non_negative(&self) -> bool {
        self.to_array().iter().all(|x| x.is_finite() && *x >= 0.)
    }
}

/// Proposal variances and initialization bounds for one regime (basal or
/// stimulus). A zero `sigma` locks the parameter: basal parameters keep their
/// fixed value, stimulus parameters follow the basal value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeSettings {
    pub sigma: KineticParameters,
    pub lower: KineticParameters,
    pub upper: KineticParameters,
}

impl RegimeSettings {
    /// Indices of the parameters that move during the walk
    pub fn varying(&self) -> Vec<usize> {
        let sigma = self.sigma.to_array();
        (0..N_PARAMETERS).filter(|&i| sigma[i] != 0.).collect()
    }
}
