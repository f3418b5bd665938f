//! Basin-hopping optimizer configuration.
use crate::errors::{HopError, Result};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2};

use serde::{Deserialize, Serialize};

/// Default number of agreeing local minima values required to stop
pub const AGREEMENT_TARGET_DEFAULT: usize = 5;
/// Default tolerance of the local optimizer
pub const LOCAL_TOL_DEFAULT: f64 = 1e-5;
/// Default absolute tolerance used to decide two minima values agree
pub const AGREEMENT_TOL_DEFAULT: f64 = 1e-5;
/// Default max number of trials
pub const MAX_ITERS_DEFAULT: usize = 1000;
/// Default max number of objective evaluations of one local optimization
pub const LOCAL_MAX_EVAL_DEFAULT: usize = 2000;

/// Basin-hopping optimizer configuration
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct HopConfig {
    /// Number of mutually agreeing best values required to declare convergence
    pub(crate) agreement_target: usize,
    /// Tolerance passed to the local optimizer as its stopping criterion
    pub(crate) local_tol: f64,
    /// Absolute tolerance under which two objective values are considered
    /// to be the same minimum
    pub(crate) agreement_tol: f64,
    /// Starting point, its length gives the dimension of the problem
    pub(crate) initial: Option<Array1<f64>>,
    /// Standard deviations of the random step, one per component
    pub(crate) step_noise: Option<Array1<f64>>,
    /// Optional (nx, 2) matrix of [lower bound, upper bound] of the nx components of x.
    /// Infinite values mark unbounded sides.
    pub(crate) bounds: Option<Array2<f64>>,
    /// Max number of trials (aka local optimizations after the initial one)
    pub(crate) max_iters: usize,
    /// Temperature of the Metropolis acceptance test
    pub(crate) temperature: f64,
    /// Max number of objective evaluations allocated to one local optimization
    pub(crate) local_max_eval: usize,
    /// A random generator seed used to get reproductible results.
    pub(crate) seed: Option<u64>,
}

impl Default for HopConfig {
    fn default() -> Self {
        HopConfig {
            agreement_target: AGREEMENT_TARGET_DEFAULT,
            local_tol: LOCAL_TOL_DEFAULT,
            agreement_tol: AGREEMENT_TOL_DEFAULT,
            initial: None,
            step_noise: None,
            bounds: None,
            max_iters: MAX_ITERS_DEFAULT,
            temperature: 1.0,
            local_max_eval: LOCAL_MAX_EVAL_DEFAULT,
            seed: None,
        }
    }
}

impl HopConfig {
    /// Sets the number of agreeing local minima values required to stop
    pub fn agreement_target(mut self, agreement_target: usize) -> Self {
        self.agreement_target = agreement_target;
        self
    }

    /// Sets the stopping tolerance of the local optimizer
    pub fn local_tol(mut self, tol: f64) -> Self {
        self.local_tol = tol;
        self
    }

    /// Sets the absolute tolerance used to decide whether two minima values agree
    pub fn agreement_tol(mut self, tol: f64) -> Self {
        self.agreement_tol = tol;
        self
    }

    /// Sets the starting point
    pub fn initial(mut self, initial: &ArrayBase<impl Data<Elem = f64>, Ix1>) -> Self {
        self.initial = Some(initial.to_owned());
        self
    }

    /// Sets the standard deviation of the random step of each component
    pub fn step_noise(mut self, noise: &ArrayBase<impl Data<Elem = f64>, Ix1>) -> Self {
        self.step_noise = Some(noise.to_owned());
        self
    }

    /// Sets bounds as a (nx, 2) matrix [[lower, upper], ...].
    ///
    /// Use `f64::NEG_INFINITY` or `f64::INFINITY` to leave a side unbounded.
    pub fn bounds(mut self, xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Self {
        self.bounds = Some(xlimits.to_owned());
        self
    }

    /// Removes any previously specified bounds
    pub fn unbounded(mut self) -> Self {
        self.bounds = None;
        self
    }

    /// Sets max number of trials
    pub fn max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Sets the temperature of the Metropolis acceptance test.
    ///
    /// It should be comparable to the difference of objective values between local minima.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the max number of objective evaluations of one local optimization
    pub fn local_max_eval(mut self, max_eval: usize) -> Self {
        self.local_max_eval = max_eval;
        self
    }

    /// Allow to specify a seed for random number generator to allow
    /// reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the configuration and return a validated one
    pub fn check(self) -> Result<ValidHopConfig> {
        let initial = match self.initial {
            Some(ref initial) if !initial.is_empty() => initial.clone(),
            Some(_) => {
                return Err(HopError::InvalidConfigError(
                    "Initial point should not be empty".to_string(),
                ))
            }
            None => {
                return Err(HopError::InvalidConfigError(
                    "Initial point should be specified".to_string(),
                ))
            }
        };
        let step_noise = self.step_noise.clone().ok_or_else(|| {
            HopError::InvalidConfigError("Step noise should be specified".to_string())
        })?;
        if initial.len() != step_noise.len() {
            return Err(HopError::InvalidConfigError(format!(
                "Step noise and initial conditions must be equal length, got {} and {}",
                step_noise.len(),
                initial.len()
            )));
        }
        if step_noise.iter().any(|s| !s.is_finite() || *s < 0.) {
            return Err(HopError::InvalidConfigError(format!(
                "Step noise should be made of finite positive values, got {step_noise}"
            )));
        }
        if self.agreement_target == 0 {
            return Err(HopError::InvalidConfigError(
                "Agreement target should be a positive integer".to_string(),
            ));
        }
        if self.local_tol.is_nan() || self.local_tol < 0. {
            return Err(HopError::InvalidConfigError(format!(
                "Local tolerance should be positive, got {}",
                self.local_tol
            )));
        }
        if self.agreement_tol.is_nan() || self.agreement_tol < 0. {
            return Err(HopError::InvalidConfigError(format!(
                "Agreement tolerance should be positive, got {}",
                self.agreement_tol
            )));
        }
        if self.temperature.is_nan() || self.temperature <= 0. {
            return Err(HopError::InvalidConfigError(format!(
                "Temperature should be strictly positive, got {}",
                self.temperature
            )));
        }
        if let Some(bounds) = self.bounds.as_ref() {
            if bounds.nrows() != initial.len() || bounds.ncols() != 2 {
                return Err(HopError::InvalidConfigError(format!(
                    "Bounds should be a ({}, 2) matrix, got {:?}",
                    initial.len(),
                    bounds.shape()
                )));
            }
            for (i, row) in bounds.outer_iter().enumerate() {
                if row[0].is_nan() || row[1].is_nan() || row[0] > row[1] {
                    return Err(HopError::InvalidConfigError(format!(
                        "Bounds of component {i} should be ordered numbers, got [{}, {}]",
                        row[0], row[1]
                    )));
                }
            }
        }
        Ok(ValidHopConfig {
            initial,
            step_noise,
            config: self,
        })
    }
}

/// A checked [`HopConfig`]: initial point and step noise are given
/// with consistent lengths and all settings are in their valid range.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ValidHopConfig {
    initial: Array1<f64>,
    step_noise: Array1<f64>,
    config: HopConfig,
}

impl ValidHopConfig {
    /// Dimension of the problem
    pub fn dim(&self) -> usize {
        self.initial().len()
    }

    /// Starting point
    pub fn initial(&self) -> &Array1<f64> {
        &self.initial
    }

    /// Step standard deviations
    pub fn step_noise(&self) -> &Array1<f64> {
        &self.step_noise
    }

    /// Bounds as (lower, upper) pairs, unbounded components get infinite bounds
    pub fn bound_pairs(&self) -> Vec<(f64, f64)> {
        match self.config.bounds.as_ref() {
            Some(bounds) => bounds.outer_iter().map(|row| (row[0], row[1])).collect(),
            None => vec![(f64::NEG_INFINITY, f64::INFINITY); self.dim()],
        }
    }

    /// Whether some bounds were given
    pub fn is_bounded(&self) -> bool {
        self.config.bounds.is_some()
    }
}

impl std::ops::Deref for ValidHopConfig {
    type Target = HopConfig;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}
