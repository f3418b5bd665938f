//! Random displacement of the current point used to seed the next local search.
use ndarray::{Array1, ArrayBase, Data, Ix1, Zip};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

/// Gaussian step generator with a fixed per-component standard deviation.
///
/// No bound clipping is done here, out-of-bounds candidates are handled
/// by the bounded local optimizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    noise: Array1<f64>,
}

impl Perturbation {
    /// Constructor given standard deviations of the step components.
    ///
    /// Length consistency with the points to be perturbed is checked
    /// by [`crate::HopConfig::check()`].
    pub fn new(noise: &ArrayBase<impl Data<Elem = f64>, Ix1>) -> Self {
        Perturbation {
            noise: noise.to_owned(),
        }
    }

    /// Standard deviations of the step components
    pub fn noise(&self) -> &Array1<f64> {
        &self.noise
    }

    /// Returns a copy of `x` where each component i is moved by
    /// an independent draw of N(0, noise_i^2)
    pub fn perturb<R: Rng>(
        &self,
        x: &ArrayBase<impl Data<Elem = f64>, Ix1>,
        rng: &mut R,
    ) -> Array1<f64> {
        let mut x_new = x.to_owned();
        Zip::from(&mut x_new)
            .and(&self.noise)
            .for_each(|xi, &sigma| {
                let z: f64 = StandardNormal.sample(&mut *rng);
                *xi += sigma * z;
            });
        x_new
    }
}
