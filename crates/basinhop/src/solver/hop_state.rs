/// Implementation of `argmin::State` for the basin-hopping optimizer
use crate::solver::convergence::ConvergenceTracker;

use argmin::core::{Problem, State, TerminationReason, TerminationStatus};
use ndarray::Array1;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of the last basin-hopping trial
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// Local minimum found from the perturbed point
    pub x: Array1<f64>,
    /// Objective value at `x`
    pub fun: f64,
    /// Whether the trial passed the acceptance test
    pub accepted: bool,
}

/// Maintains the state from iteration to iteration of the [crate::HopSolver].
///
/// This struct is passed from one iteration of an algorithm to the next.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HopState {
    /// Current parameter vector, i.e. the last accepted local minimum
    pub param: Option<Array1<f64>>,
    /// Previous parameter vector
    pub prev_param: Option<Array1<f64>>,
    /// Current best parameter vector
    pub best_param: Option<Array1<f64>>,
    /// Previous best parameter vector
    pub prev_best_param: Option<Array1<f64>>,

    /// Current cost function value
    pub cost: f64,
    /// Previous cost function value
    pub prev_cost: f64,
    /// Current best cost function value
    pub best_cost: f64,
    /// Previous best cost function value
    pub prev_best_cost: f64,
    /// Target cost function value
    pub target_cost: f64,
    /// Whether the local optimization leading to the current parameter succeeded
    pub local_success: bool,

    /// Last trial outcome
    pub trial: Option<Trial>,
    /// Number of accepted trials
    pub n_accepted: u64,
    /// Agreement record deciding convergence
    pub tracker: Option<ConvergenceTracker>,

    /// Current iteration
    pub iter: u64,
    /// Iteration number of last best cost
    pub last_best_iter: u64,
    /// Maximum number of iterations
    pub max_iters: u64,
    /// Evaluation counts
    pub counts: HashMap<String, u64>,
    /// Time required so far
    pub time: Option<web_time::Duration>,
    /// Optimization status
    pub termination_status: TerminationStatus,

    /// Random number generator for reproducibility
    pub rng: Option<Xoshiro256Plus>,
}

impl HopState {
    /// Set parameter vector. This shifts the stored parameter vector to the previous parameter
    /// vector.
    ///
    /// # Example
    ///
    /// ```
    /// # use argmin::core::State;
    /// # use basinhop::HopState;
    /// # use ndarray::array;
    /// # let state = HopState::new();
    /// # let state = state.param(array![1.0f64, 2.0f64]);
    /// # assert!(state.prev_param.is_none());
    /// let state = state.param(array![0.0f64, 3.0f64]);
    /// # assert_eq!(state.prev_param.as_ref().unwrap()[0], 1.0);
    /// # assert_eq!(state.param.as_ref().unwrap()[1], 3.0);
    /// ```
    #[must_use]
    pub fn param(mut self, param: Array1<f64>) -> Self {
        std::mem::swap(&mut self.prev_param, &mut self.param);
        self.param = Some(param);
        self
    }

    /// Set the current cost function value. This shifts the stored cost function value to the
    /// previous cost function value.
    #[must_use]
    pub fn cost(mut self, cost: f64) -> Self {
        std::mem::swap(&mut self.prev_cost, &mut self.cost);
        self.cost = cost;
        self
    }

    /// Set maximum number of iterations
    ///
    /// # Example
    ///
    /// ```
    /// # use basinhop::HopState;
    /// # use argmin::core::State;
    /// # let state = HopState::new();
    /// # assert_eq!(state.max_iters, u64::MAX);
    /// let state = state.max_iters(1000);
    /// # assert_eq!(state.max_iters, 1000);
    /// ```
    #[must_use]
    pub fn max_iters(mut self, iters: u64) -> Self {
        self.max_iters = iters;
        self
    }

    /// Set the convergence tracker
    #[must_use]
    pub fn tracker(mut self, tracker: ConvergenceTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Moves the convergence tracker out and replaces it internally with `None`.
    pub fn take_tracker(&mut self) -> Option<ConvergenceTracker> {
        self.tracker.take()
    }

    /// Set the random number generator used to draw random steps
    #[must_use]
    pub fn rng(mut self, rng: Xoshiro256Plus) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Moves the current random number generator out and replaces it internally with `None`.
    pub fn take_rng(&mut self) -> Option<Xoshiro256Plus> {
        self.rng.take()
    }

    /// Returns the last trial outcome
    pub fn get_trial(&self) -> Option<&Trial> {
        self.trial.as_ref()
    }

    /// Whether the agreement-based stopping rule is satisfied
    pub fn is_converged(&self) -> bool {
        self.tracker.as_ref().is_some_and(|t| t.is_converged())
    }

    /// Number of currently agreeing best values
    pub fn agreement_count(&self) -> usize {
        self.tracker.as_ref().map_or(0, |t| t.count())
    }
}

impl State for HopState {
    /// Type of parameter vector
    type Param = Array1<f64>;
    /// Floating point precision
    type Float = f64;

    /// Create new `HopState` instance
    ///
    /// # Example
    ///
    /// ```
    /// # use std::collections::HashMap;
    /// # use argmin::core::{State, TerminationStatus};
    /// use basinhop::HopState;
    /// let state = HopState::new();
    ///
    /// # assert!(state.param.is_none());
    /// # assert!(state.best_param.is_none());
    /// # assert_eq!(state.cost, f64::INFINITY);
    /// # assert_eq!(state.best_cost, f64::INFINITY);
    /// # assert_eq!(state.target_cost, f64::NEG_INFINITY);
    /// # assert_eq!(state.iter, 0);
    /// # assert_eq!(state.max_iters, u64::MAX);
    /// # assert_eq!(state.counts, HashMap::new());
    /// # assert_eq!(state.termination_status, TerminationStatus::NotTerminated);
    /// ```
    fn new() -> Self {
        HopState {
            param: None,
            prev_param: None,
            best_param: None,
            prev_best_param: None,

            cost: f64::INFINITY,
            prev_cost: f64::INFINITY,
            best_cost: f64::INFINITY,
            prev_best_cost: f64::INFINITY,
            target_cost: f64::NEG_INFINITY,
            local_success: false,

            trial: None,
            n_accepted: 0,
            tracker: None,

            iter: 0,
            last_best_iter: 0,
            max_iters: u64::MAX,
            counts: HashMap::new(),
            time: Some(web_time::Duration::new(0, 0)),
            termination_status: TerminationStatus::NotTerminated,

            rng: Some(Xoshiro256Plus::from_entropy()),
        }
    }

    /// Checks if the current parameter vector is better than the previous best parameter value. If
    /// a new best parameter vector was found, the state is updated accordingly.
    ///
    /// The current parameter only changes on accepted trials, hence the best
    /// parameter is the lowest accepted local minimum.
    ///
    /// # Example
    ///
    /// ```
    /// # use argmin::core::State;
    /// # use ndarray::array;
    /// # use basinhop::HopState;
    /// let mut state = HopState::new();
    /// state.param = Some(array![1.0f64]);
    /// state.cost = 10.0;
    /// state.update();
    /// # assert_eq!(state.best_param.as_ref().unwrap()[0], 1.0);
    /// # assert_eq!(state.best_cost, 10.0);
    /// assert!(state.is_best());
    /// ```
    fn update(&mut self) {
        if let Some(param) = self.param.as_ref() {
            if self.cost < self.best_cost || self.best_param.is_none() {
                let param = param.clone();
                std::mem::swap(&mut self.prev_best_param, &mut self.best_param);
                self.best_param = Some(param);
                std::mem::swap(&mut self.prev_best_cost, &mut self.best_cost);
                self.best_cost = self.cost;
                self.last_best_iter = self.iter;
            }
        }
    }

    /// Returns a reference to the current parameter vector
    fn get_param(&self) -> Option<&Array1<f64>> {
        self.param.as_ref()
    }

    /// Returns a reference to the current best parameter vector
    fn get_best_param(&self) -> Option<&Array1<f64>> {
        self.best_param.as_ref()
    }

    /// Sets the termination status to [`Terminated`](`TerminationStatus::Terminated`) with the given reason
    ///
    /// # Example
    ///
    /// ```
    /// # use argmin::core::{State, TerminationReason, TerminationStatus};
    /// # use basinhop::HopState;
    /// # let mut state = HopState::new();
    /// # assert_eq!(state.termination_status, TerminationStatus::NotTerminated);
    /// let state = state.terminate_with(TerminationReason::MaxItersReached);
    /// # assert_eq!(state.termination_status, TerminationStatus::Terminated(TerminationReason::MaxItersReached));
    /// ```
    fn terminate_with(mut self, reason: TerminationReason) -> Self {
        self.termination_status = TerminationStatus::Terminated(reason);
        self
    }

    /// Sets the time required so far.
    fn time(&mut self, time: Option<web_time::Duration>) -> &mut Self {
        self.time = time;
        self
    }

    /// Returns current cost function value.
    fn get_cost(&self) -> Self::Float {
        self.cost
    }

    /// Returns current best cost function value.
    fn get_best_cost(&self) -> Self::Float {
        self.best_cost
    }

    /// Returns target cost function value.
    fn get_target_cost(&self) -> Self::Float {
        self.target_cost
    }

    /// Returns current number of iterations.
    fn get_iter(&self) -> u64 {
        self.iter
    }

    /// Returns iteration number of last best parameter vector.
    fn get_last_best_iter(&self) -> u64 {
        self.last_best_iter
    }

    /// Returns the maximum number of iterations.
    fn get_max_iters(&self) -> u64 {
        self.max_iters
    }

    /// Returns the termination status.
    fn get_termination_status(&self) -> &TerminationStatus {
        &self.termination_status
    }

    /// Returns the termination reason if terminated, otherwise None.
    fn get_termination_reason(&self) -> Option<&TerminationReason> {
        match &self.termination_status {
            TerminationStatus::Terminated(reason) => Some(reason),
            TerminationStatus::NotTerminated => None,
        }
    }

    /// Returns the time elapsed since the start of the optimization.
    fn get_time(&self) -> Option<web_time::Duration> {
        self.time
    }

    /// Increments the number of iterations by one
    fn increment_iter(&mut self) {
        self.iter += 1;
    }

    /// Set all function evaluation counts to the evaluation counts of another `Problem`.
    fn func_counts<O>(&mut self, problem: &Problem<O>) {
        for (k, &v) in problem.counts.iter() {
            let count = self.counts.entry(k.to_string()).or_insert(0);
            *count = v
        }
    }

    /// Returns function evaluation counts
    fn get_func_counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    /// Returns whether the current parameter vector is also the best parameter vector found so
    /// far.
    fn is_best(&self) -> bool {
        self.last_best_iter == self.iter
    }
}
