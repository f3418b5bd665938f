//! This library implements the basin-hopping global optimization method
//! with a stopping rule based on the repeated agreement of local minima.
//!
//! Basin-hopping alternates random perturbations of the current point with
//! bounded local optimizations started from the perturbed points. Each local
//! minimum found is accepted or not as the next current point using a
//! Metropolis test. Instead of relying only on a fixed budget of trials, the
//! optimizer stops once a given number of accepted local minima have agreed,
//! within an absolute tolerance, on the lowest value found so far. Any better
//! minimum found along the way resets the agreement count.
//!
//! # Examples
//!
//! ```
//! use ndarray::{array, ArrayView1};
//! use basinhop::HopBuilder;
//!
//! // A one-dimensional test function, x in [0., 25.] and min xsinx(x) ~ -15.1 at x ~ 18.9
//! fn xsinx(x: &ArrayView1<f64>) -> f64 {
//!     (x[0] - 3.5) * ((x[0] - 3.5) / std::f64::consts::PI).sin()
//! }
//!
//! let res = HopBuilder::optimize(xsinx)
//!     .configure(|config| {
//!         config
//!             .initial(&array![0.])
//!             .step_noise(&array![10.])
//!             .agreement_tol(1e-3)
//!             .seed(42)
//!     })
//!     .min_within(&array![[0.0, 25.0]])
//!     .expect("optimizer configured")
//!     .run()
//!     .expect("xsinx minimized");
//! println!("Minimum found f(x) = {} at x = {}", res.y_opt, res.x_opt);
//! ```
//!
//! # Usage
//!
//! The [`HopBuilder`] is used to set the objective function and the optimizer
//! configuration. The `min_within()` and `min_unbounded()` methods validate the
//! configuration and return a [`Hop`] object, the optimizer, which is consumed by
//! its `run()` method.
//!
//! Some of the most useful options are:
//!
//! * The number of agreeing local minima required to stop (default 5)
//!
//! ```no_run
//! # use basinhop::HopConfig;
//! # let hop_config = HopConfig::default();
//!     hop_config.agreement_target(10);
//! ```
//!
//! * The absolute tolerance used to decide that two local minima values agree (default 1e-5)
//!   and the tolerance of the local optimizer (default 1e-5)
//!
//! ```no_run
//! # use basinhop::HopConfig;
//! # let hop_config = HopConfig::default();
//!     hop_config.agreement_tol(1e-3).local_tol(1e-8);
//! ```
//!
//! * The max number of trials (default 1000) used as a safety net when the agreement
//!   is never reached. Reaching it is not an error, the best point found is returned.
//!
//! ```no_run
//! # use basinhop::HopConfig;
//! # let hop_config = HopConfig::default();
//!     hop_config.max_iters(200);
//! ```
//!
//! * The temperature of the Metropolis acceptance test (default 1.0), which should be
//!   comparable to the typical difference of objective values between local minima.
//!
//! * A debug hook, given to the builder, called with the local minimum found at each trial
//!
//! ```no_run
//! # use ndarray::{array, ArrayView1};
//! # use basinhop::HopBuilder;
//! let hop = HopBuilder::optimize(|x: &ArrayView1<f64>| x.dot(x))
//!     .configure(|config| config.initial(&array![1., 1.]).step_noise(&array![0.5, 0.5]))
//!     .debug(|x: &ArrayView1<f64>| println!("trial x = {x}"))
//!     .min_unbounded();
//! ```
//!
//! Objective functions which may fail are handled by implementing `argmin::core::CostFunction`
//! and using the [`HopSolver`] with the `argmin::core::Executor` directly: their errors
//! are propagated unchanged to the caller.
//!
//! Log messages are emitted through the `log` facade, the level being controlled by the
//! `BASINHOP_LOG` environment variable (default `info`).
//!
//! # References
//!
//! Wales, David J., and Jonathan P. K. Doye. [Global optimization by basin-hopping and the lowest
//! energy structures of Lennard-Jones clusters containing up to 110 atoms](https://doi.org/10.1021/jp970984n).
//! The Journal of Physical Chemistry A 101.28 (1997): 5111-5116.
//!
//! Kraft, Dieter. A software package for sequential quadratic programming.
//! Forschungsbericht, Deutsche Forschungs- und Versuchsanstalt für Luft- und Raumfahrt (1988).
//!
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

mod errors;
mod hop;
mod solver;
mod types;

pub use crate::errors::*;
pub use crate::hop::*;
pub use crate::solver::*;
pub use crate::types::*;

mod optimizers;
