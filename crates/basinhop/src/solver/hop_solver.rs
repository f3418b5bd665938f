//! Basin-hopping implementation as a [argmin::core::Solver] to be used to benefit from
//! features coming with the argmin framework such as observers.
//!
//! Note: Depending on your need you can either use the `HopSolver` or the provided
//! `HopBuilder` which allows to build a `Hop` struct which wraps the `argmin::Executor`
//! running a `HopSolver` on `ObjFunc`. See [`crate::HopBuilder`]
//!
//! Using the solver directly allows to minimize any `argmin::core::CostFunction`
//! taking `Array1<f64>` and returning `f64`, including fallible ones.
//!
//! ```no_run
//! use ndarray::{array, ArrayView1};
//! use basinhop::{HopConfig, HopSolver, ObjFunc};
//! use argmin::core::Executor;
//! use argmin_testfunctions::rosenbrock;
//!
//! let fobj = ObjFunc::new(|x: &ArrayView1<f64>| rosenbrock(&x.to_vec()));
//! let config = HopConfig::default()
//!     .initial(&array![-1.2, 1.])
//!     .step_noise(&array![0.5, 0.5])
//!     .bounds(&array![[-2., 2.], [-2., 2.]])
//!     .seed(42)
//!     .check()
//!     .expect("configuration validated");
//! let res = Executor::new(fobj, HopSolver::new(config))
//!     .run()
//!     .expect("Rosenbrock minimized");
//! println!("Rosenbrock min result = {:?}", res.state);
//! ```
//!
use crate::errors::HopError;
use crate::optimizers::LocalOptimizer;
use crate::solver::convergence::ConvergenceTracker;
use crate::solver::hop_state::{HopState, Trial};
use crate::solver::perturbation::Perturbation;
use crate::types::LocalResult;
use crate::ValidHopConfig;

use argmin::argmin_error_closure;
use argmin::core::{
    CostFunction, Error, Problem, Solver, State, TerminationReason, TerminationStatus, KV,
};
use env_logger::{Builder, Env};
use log::{debug, info};
use ndarray::Array1;
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Environment variable used to set the log level (default `info`)
pub const BASINHOP_LOG: &str = "BASINHOP_LOG";

/// Implementation of `argmin::core::Solver` for the basin-hopping optimizer.
///
/// Each iteration is a trial: the current point is perturbed, a local optimization
/// is run from the perturbed point and its result is accepted or not with the
/// Metropolis criterion. The trial outcome is recorded by a [`ConvergenceTracker`]
/// and the solver terminates once enough accepted trials agree on the best value.
#[derive(Clone, Serialize, Deserialize)]
pub struct HopSolver {
    pub(crate) config: ValidHopConfig,
    step: Perturbation,
    local: LocalOptimizer,
}

impl HopSolver {
    /// Constructor of the basin-hopping solver given a validated configuration
    pub fn new(config: ValidHopConfig) -> Self {
        let env = Env::new().filter_or(BASINHOP_LOG, "info");
        let mut builder = Builder::from_env(env);
        let builder = builder.target(env_logger::Target::Stdout);
        builder.try_init().ok();

        let mut local = LocalOptimizer::new(&config.bound_pairs());
        local.tol(config.local_tol).max_eval(config.local_max_eval);
        HopSolver {
            step: Perturbation::new(config.step_noise()),
            local,
            config,
        }
    }

    /// Solver configuration
    pub fn config(&self) -> &ValidHopConfig {
        &self.config
    }

    /// Metropolis acceptance test of a local optimization result `res`
    /// against the current cost.
    ///
    /// A failed local optimization is only accepted if the current one failed too.
    fn accept_test<R: Rng>(
        &self,
        res: &LocalResult,
        cost: f64,
        local_success: bool,
        rng: &mut R,
    ) -> bool {
        if res.fun.is_nan() {
            return false;
        }
        let w = (-(res.fun - cost) / self.config.temperature).min(0.).exp();
        let u: f64 = rng.gen();
        w >= u && (res.success || !local_success)
    }
}

impl<O> Solver<O, HopState> for HopSolver
where
    O: CostFunction<Param = Array1<f64>, Output = f64>,
{
    const NAME: &'static str = "BasinHopping";

    fn init(
        &mut self,
        problem: &mut Problem<O>,
        state: HopState,
    ) -> std::result::Result<(HopState, Option<KV>), Error> {
        let rng = if let Some(seed) = self.config.seed {
            Xoshiro256Plus::seed_from_u64(seed)
        } else {
            Xoshiro256Plus::from_entropy()
        };

        info!(
            "Initial local optimization from x={}",
            self.config.initial()
        );
        let res = self.local.minimize(problem, self.config.initial())?;
        // a NaN current point would be propagated to every trial
        if res.fun.is_nan() || res.x.iter().any(|v| v.is_nan()) {
            return Err(HopError::InvalidValue(format!(
                "Initial local optimization from x={} ended with fun(x)={} at x={}",
                self.config.initial(),
                res.fun,
                res.x
            ))
            .into());
        }
        let tracker =
            ConvergenceTracker::new(self.config.agreement_target, self.config.agreement_tol);

        let mut initial_state = state
            .param(res.x.clone())
            .cost(res.fun)
            .tracker(tracker)
            .rng(rng)
            .max_iters(self.config.max_iters as u64);
        initial_state.local_success = res.success;
        debug!("Initial State = {initial_state:?}");

        info!(
            "********* Initialization: fun(x)={} at x={}",
            res.fun, res.x
        );
        Ok((initial_state, None))
    }

    fn next_iter(
        &mut self,
        problem: &mut Problem<O>,
        mut state: HopState,
    ) -> std::result::Result<(HopState, Option<KV>), Error> {
        debug!(
            "********* Start trial {}/{}",
            state.get_iter() + 1,
            state.get_max_iters()
        );
        let now = Instant::now();

        let mut rng = state.take_rng().ok_or_else(argmin_error_closure!(
            NotInitialized,
            "HopSolver: random generator not initialized"
        ))?;
        let mut tracker = state.take_tracker().ok_or_else(argmin_error_closure!(
            NotInitialized,
            "HopSolver: convergence tracker not initialized"
        ))?;
        let x = state.get_param().ok_or_else(argmin_error_closure!(
            NotInitialized,
            "HopSolver: current point not initialized"
        ))?;

        let candidate = self.step.perturb(x, &mut rng);
        let res = self.local.minimize(problem, &candidate)?;
        let accepted = self.accept_test(&res, state.cost, state.local_success, &mut rng);

        if accepted {
            debug!(
                "Trial accepted: {:?} fun(x)={} against best {:?}",
                tracker.classify(res.fun),
                res.fun,
                tracker.current_best()
            );
        } else {
            debug!(
                "Trial rejected: fun(x)={} vs current {}",
                res.fun, state.cost
            );
        }
        let stop = tracker.record_trial(res.fun, accepted);

        let mut new_state = if accepted {
            if res.fun < state.best_cost {
                info!("New best fun(x)={} at x={}", res.fun, res.x);
            }
            let mut new_state = state.param(res.x.clone()).cost(res.fun);
            new_state.local_success = res.success;
            new_state.n_accepted += 1;
            new_state
        } else {
            state
        };
        new_state.trial = Some(Trial {
            x: res.x,
            fun: res.fun,
            accepted,
        });

        info!(
            "********* End trial {}/{} in {:.3}s: agreements {}/{}, best fun(x)={}{}",
            new_state.get_iter() + 1,
            new_state.get_max_iters(),
            now.elapsed().as_secs_f64(),
            tracker.count(),
            tracker.target(),
            new_state.best_cost.min(new_state.cost),
            if stop { " => converged" } else { "" }
        );

        Ok((new_state.tracker(tracker).rng(rng), None))
    }

    fn terminate(&mut self, state: &HopState) -> TerminationStatus {
        if state.is_converged() {
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        } else {
            TerminationStatus::NotTerminated
        }
    }
}
