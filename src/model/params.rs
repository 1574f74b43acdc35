use serde::{Deserialize, Serialize};

pub const NUM_PARAMS: usize = 8;

/// Positional names of the SVCJ parameter vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Factor {
    Mu,
    Kappa,
    Theta,
    SigmaV,
    Rho,
    Lambda,
    MuJ,
    SigmaJ,
}

impl Factor {
    pub const ALL: [Factor; NUM_PARAMS] = [
        Factor::Mu,
        Factor::Kappa,
        Factor::Theta,
        Factor::SigmaV,
        Factor::Rho,
        Factor::Lambda,
        Factor::MuJ,
        Factor::SigmaJ,
    ];

    /// Factors re-estimated from every window. The rest are carried from the warm start.
    pub const ESTIMATED: [Factor; 4] =
        [Factor::Kappa, Factor::Theta, Factor::SigmaV, Factor::Lambda];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Factor::Mu => "mu",
            Factor::Kappa => "kappa",
            Factor::Theta => "theta",
            Factor::SigmaV => "sigma_v",
            Factor::Rho => "rho",
            Factor::Lambda => "lambda",
            Factor::MuJ => "mu_J",
            Factor::SigmaJ => "sigma_J",
        }
    }

    pub fn is_estimated(self) -> bool {
        Self::ESTIMATED.contains(&self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterVector(pub [f64; NUM_PARAMS]);

impl Default for ParameterVector {
    fn default() -> Self {
        Self([0.05, 2.0, 0.04, 0.5, -0.6, 0.2, -0.03, 0.05])
    }
}

impl ParameterVector {
    pub fn new(values: [f64; NUM_PARAMS]) -> Self {
        Self(values)
    }

    pub fn get(&self, factor: Factor) -> f64 {
        self.0[factor.index()]
    }

    pub fn set(&mut self, factor: Factor, value: f64) {
        self.0[factor.index()] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn mu(&self) -> f64 {
        self.get(Factor::Mu)
    }

    pub fn kappa(&self) -> f64 {
        self.get(Factor::Kappa)
    }

    pub fn theta(&self) -> f64 {
        self.get(Factor::Theta)
    }

    pub fn sigma_v(&self) -> f64 {
        self.get(Factor::SigmaV)
    }

    pub fn rho(&self) -> f64 {
        self.get(Factor::Rho)
    }

    pub fn lambda(&self) -> f64 {
        self.get(Factor::Lambda)
    }

    pub fn mu_j(&self) -> f64 {
        self.get(Factor::MuJ)
    }

    pub fn sigma_j(&self) -> f64 {
        self.get(Factor::SigmaJ)
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}
