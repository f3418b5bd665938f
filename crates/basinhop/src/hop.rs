//! Basin-hopping optimizer with a stopping rule based on the agreement of local minima.
//!
//! The optimizer is built with [`HopBuilder`] which specifies the function to be minimized
//! and the optimizer configuration. The build validates the configuration, hence
//! an inconsistent configuration fails before any evaluation of the objective.
//!
//! ```no_run
//! # use ndarray::{array, ArrayView1};
//! # use basinhop::HopBuilder;
//! use argmin_testfunctions::rastrigin;
//!
//! // Rastrigin test function: global minimum y_opt = 0 at x_opt = (0, 0)
//! // surrounded by a regular grid of local minima
//! fn rastr(x: &ArrayView1<f64>) -> f64 {
//!     rastrigin(&x.to_vec())
//! }
//!
//! let res = HopBuilder::optimize(rastr)
//!     .configure(|config| {
//!         config
//!             .initial(&array![3.2, -4.1])
//!             .step_noise(&array![1., 1.])
//!             .agreement_target(10)
//!             .agreement_tol(1e-4)
//!             .max_iters(500)
//!     })
//!     .min_within(&array![[-5.12, 5.12], [-5.12, 5.12]])
//!     .expect("optimizer configured")
//!     .run()
//!     .expect("Rastrigin minimization");
//! println!("Rastrigin min result = {:?}", res);
//! ```
//!
use crate::errors::{HopError, Result};
use crate::types::*;
use crate::HopConfig;
use crate::HopSolver;
use crate::HopState;

use argmin::core::observers::{Observe, ObserverMode};
use argmin::core::{Error, Executor, State, KV};
use log::info;
use ndarray::{ArrayBase, ArrayView1, Data, Ix2};

/// Hook called with the local minimum found at each trial
pub type DebugHook = Box<dyn FnMut(&ArrayView1<f64>) + Send>;

/// Basin-hopping optimizer builder allowing to specify the function to be minimized
/// and the optimizer configuration.
pub struct HopFactory<O: ScalarFunc> {
    fobj: O,
    config: HopConfig,
    debug: Option<DebugHook>,
}

impl<O: ScalarFunc> HopFactory<O> {
    /// Function to be minimized, its domain is R^nx where nx is
    /// given by the length of the initial point.
    pub fn optimize(fobj: O) -> Self {
        HopFactory {
            fobj,
            config: HopConfig::default(),
            debug: None,
        }
    }

    /// Set configuration of the optimizer
    pub fn configure<F: FnOnce(HopConfig) -> HopConfig>(mut self, init: F) -> Self {
        self.config = init(self.config);
        self
    }

    /// Set a hook called with the local minimum found at each trial,
    /// whether it is accepted or not. It has no effect on the optimization.
    pub fn debug(mut self, hook: impl FnMut(&ArrayView1<f64>) + Send + 'static) -> Self {
        self.debug = Some(Box::new(hook));
        self
    }

    /// Build a basin-hopping optimizer to minimize the function within
    /// the `xlimits` specified as [[lower, upper], ...] array where the
    /// number of rows gives the dimension of the inputs and the ith row
    /// is the interval of the ith component of the input x.
    ///
    /// Infinite values are allowed to leave one side of an interval open.
    pub fn min_within(self, xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Hop<O>> {
        let config = self.config.bounds(xlimits).check()?;
        Ok(Hop {
            fobj: ObjFunc::new(self.fobj),
            solver: HopSolver::new(config),
            debug: self.debug,
        })
    }

    /// Build a basin-hopping optimizer to minimize the function over R^nx
    pub fn min_unbounded(self) -> Result<Hop<O>> {
        let config = self.config.unbounded().check()?;
        Ok(Hop {
            fobj: ObjFunc::new(self.fobj),
            solver: HopSolver::new(config),
            debug: self.debug,
        })
    }
}

/// Basin-hopping optimizer structure used to parameterize the underlying `argmin::Solver`
/// and trigger the optimization using `argmin::Executor`.
///
/// The optimizer is meant to run once: `run()` consumes it.
pub struct Hop<O: ScalarFunc> {
    fobj: ObjFunc<O>,
    solver: HopSolver,
    debug: Option<DebugHook>,
}

impl<O: ScalarFunc> Hop<O> {
    /// Runs the basin-hopping optimization of the objective function.
    ///
    /// Stopping on the max number of trials is not an error: the termination
    /// reason is available in the returned state.
    pub fn run(self) -> Result<OptimResult> {
        info!("{:?}", self.solver.config());

        let exec = Executor::new(self.fobj, self.solver);
        let exec = if let Some(hook) = self.debug {
            exec.add_observer(DebugObserver { hook }, ObserverMode::Always)
        } else {
            exec
        };
        let result = exec.run().map_err(from_argmin)?;
        info!("{}", result);

        let state = result.state;
        let x_opt = state
            .get_best_param()
            .cloned()
            .ok_or_else(|| HopError::InvalidValue("No local minimum found".to_string()))?;
        let y_opt = state.get_best_cost();
        info!(
            "Optim Result: min f(x)={} at x={} after {} trials ({} accepted)",
            y_opt,
            x_opt,
            state.get_iter(),
            state.n_accepted
        );

        Ok(OptimResult {
            x_opt,
            y_opt,
            state,
        })
    }
}

// Errors raised by the solver itself are given back unwrapped
fn from_argmin(err: Error) -> HopError {
    match err.downcast::<HopError>() {
        Ok(err) => err,
        Err(err) => HopError::ArgminError(err),
    }
}

// Forwards the local minimum of each trial to the user debug hook
struct DebugObserver {
    hook: DebugHook,
}

impl Observe<HopState> for DebugObserver {
    fn observe_iter(&mut self, state: &HopState, _kv: &KV) -> std::result::Result<(), Error> {
        if let Some(trial) = state.get_trial() {
            (self.hook)(&trial.x.view());
        }
        Ok(())
    }
}

/// Basin-hopping optimizer builder
pub type HopBuilder<O> = HopFactory<O>;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use argmin::core::{ArgminError, CostFunction, TerminationReason};
    use argmin_testfunctions::rosenbrock;
    use ndarray::{array, Array1};
    use std::sync::{Arc, Mutex};

    fn xsinx(x: &ArrayView1<f64>) -> f64 {
        (x[0] - 3.5) * ((x[0] - 3.5) / std::f64::consts::PI).sin()
    }

    #[test]
    fn test_xsinx_hop_builder() {
        let res = HopBuilder::optimize(xsinx)
            .configure(|config| {
                config
                    .initial(&array![0.])
                    .step_noise(&array![10.])
                    .local_tol(1e-8)
                    .agreement_tol(1e-3)
                    .seed(42)
            })
            .min_within(&array![[0.0, 25.0]])
            .expect("optimizer configured")
            .run()
            .expect("xsinx minimized");
        assert_abs_diff_eq!(res.x_opt[0], 18.935, epsilon = 1e-1);
        assert_abs_diff_eq!(res.y_opt, -15.125, epsilon = 1e-2);
        assert_eq!(
            res.state.get_termination_reason(),
            Some(&TerminationReason::SolverConverged)
        );
        assert!(res.state.get_func_counts()["cost_count"] > 0);
    }

    #[test]
    fn test_rosenbrock_hop_builder() {
        let res = HopBuilder::optimize(|x: &ArrayView1<f64>| rosenbrock(&x.to_vec()))
            .configure(|config| {
                config
                    .initial(&array![-1.2, 1.])
                    .step_noise(&array![0.2, 0.2])
                    .local_tol(1e-10)
                    .agreement_tol(1e-4)
                    .local_max_eval(5000)
                    .seed(0)
            })
            .min_within(&array![[-2., 2.], [-2., 2.]])
            .expect("optimizer configured")
            .run()
            .expect("Rosenbrock minimized");
        assert_abs_diff_eq!(res.x_opt, array![1., 1.], epsilon = 5e-2);
        assert_abs_diff_eq!(res.y_opt, 0., epsilon = 1e-3);
    }

    #[test]
    fn test_mismatched_lengths_fail_before_search() {
        let res = HopBuilder::optimize(|_x: &ArrayView1<f64>| -> f64 {
            panic!("objective should not be evaluated")
        })
        .configure(|config| config.initial(&array![0., 0.]).step_noise(&array![1.]))
        .min_unbounded();
        assert!(matches!(res, Err(HopError::InvalidConfigError(_))));
    }

    #[test]
    fn test_debug_hook_sees_every_trial() {
        let seen: Arc<Mutex<Vec<Array1<f64>>>> = Arc::new(Mutex::new(vec![]));
        let recorder = seen.clone();
        let res = HopBuilder::optimize(|x: &ArrayView1<f64>| x.dot(x))
            .configure(|config| {
                config
                    .initial(&array![1., -1.])
                    .step_noise(&array![0.5, 0.5])
                    .max_iters(20)
                    .seed(42)
            })
            .debug(move |x: &ArrayView1<f64>| recorder.lock().unwrap().push(x.to_owned()))
            .min_unbounded()
            .expect("optimizer configured")
            .run()
            .expect("sphere minimized");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len() as u64, res.state.get_iter());
        assert!(seen.iter().all(|x| x.len() == 2));
    }

    #[test]
    fn test_no_debug_hook() {
        let res = HopBuilder::optimize(|x: &ArrayView1<f64>| x.dot(x))
            .configure(|config| config.initial(&array![2.]).step_noise(&array![1.]).seed(1))
            .min_unbounded()
            .expect("optimizer configured")
            .run()
            .expect("sphere minimized");
        assert_abs_diff_eq!(res.x_opt[0], 0., epsilon = 1e-3);
        assert_eq!(res.state.agreement_count(), 5);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = || {
            HopBuilder::optimize(xsinx)
                .configure(|config| {
                    config
                        .initial(&array![5.])
                        .step_noise(&array![5.])
                        .agreement_tol(1e-3)
                        .max_iters(30)
                        .seed(7)
                })
                .min_within(&array![[0.0, 25.0]])
                .expect("optimizer configured")
                .run()
                .expect("xsinx minimized")
        };
        let res1 = run();
        let res2 = run();
        assert_eq!(res1.x_opt, res2.x_opt);
        assert_eq!(res1.y_opt, res2.y_opt);
        assert_eq!(res1.state.get_iter(), res2.state.get_iter());
        assert_eq!(res1.state.n_accepted, res2.state.n_accepted);
    }

    #[test]
    fn test_max_iters_is_not_an_error() {
        let res = HopBuilder::optimize(xsinx)
            .configure(|config| {
                config
                    .initial(&array![0.])
                    .step_noise(&array![10.])
                    .agreement_target(100)
                    .max_iters(5)
                    .seed(42)
            })
            .min_within(&array![[0.0, 25.0]])
            .expect("optimizer configured")
            .run()
            .expect("xsinx run to max iters");
        assert_eq!(
            res.state.get_termination_reason(),
            Some(&TerminationReason::MaxItersReached)
        );
        assert_eq!(res.state.get_iter(), 5);
        assert!(!res.state.is_converged());
        assert!(res.y_opt <= xsinx(&array![0.].view()));
    }

    #[test]
    fn test_nan_objective_is_an_invalid_value() {
        let res = HopBuilder::optimize(|_x: &ArrayView1<f64>| f64::NAN)
            .configure(|config| config.initial(&array![0.5]).step_noise(&array![1.]))
            .min_within(&array![[0., 1.]])
            .expect("optimizer configured")
            .run();
        assert!(matches!(res, Err(HopError::InvalidValue(_))));
    }

    struct Fragile;

    impl CostFunction for Fragile {
        type Param = Array1<f64>;
        type Output = f64;

        fn cost(&self, p: &Self::Param) -> std::result::Result<Self::Output, Error> {
            if p[0].abs() > 2. {
                Err(ArgminError::InvalidParameter {
                    text: "objective undefined beyond 2".to_string(),
                }
                .into())
            } else {
                Ok(p[0] * p[0])
            }
        }
    }

    #[test]
    fn test_objective_error_is_propagated() {
        let config = HopConfig::default()
            .initial(&array![1.])
            .step_noise(&array![100.])
            .max_iters(50)
            .seed(3)
            .check()
            .expect("valid configuration");
        let res: Result<_> = Executor::new(Fragile, HopSolver::new(config))
            .run()
            .map_err(HopError::from);
        match res {
            Err(HopError::ArgminError(err)) => {
                assert!(err.to_string().contains("objective undefined beyond 2"))
            }
            _ => panic!("objective error expected"),
        }
    }
}
