use crate::HopState;
use argmin::core::CostFunction;
use ndarray::{Array1, ArrayView1};

/// Optimization result
#[derive(Clone, Debug)]
pub struct OptimResult {
    /// Optimum x value, the lowest accepted local minimum
    pub x_opt: Array1<f64>,
    /// Optimum y value (e.g. f(x_opt))
    pub y_opt: f64,
    /// HopSolver final state
    pub state: HopState,
}

/// Outcome of one local minimization
#[derive(Clone, Debug, PartialEq)]
pub struct LocalResult {
    /// Local minimum location
    pub x: Array1<f64>,
    /// Objective value at `x`
    pub fun: f64,
    /// Whether the local optimizer reported success
    pub success: bool,
}

/// An interface for the scalar objective function to be minimized
///
/// The function maps a point of dimension `nx` to a real value
/// and may be non-convex.
pub trait ScalarFunc: Fn(&ArrayView1<f64>) -> f64 {}
impl<T> ScalarFunc for T where T: Fn(&ArrayView1<f64>) -> f64 {}

/// A structure to handle the objective function for implementing
/// `argmin::CostFunction` to be used with argmin framework.
///
/// Objective functions which may fail should implement `CostFunction`
/// directly and be given to [`crate::HopSolver`]: their errors are
/// propagated unchanged.
pub struct ObjFunc<O: ScalarFunc> {
    fobj: O,
}

impl<O: ScalarFunc> ObjFunc<O> {
    /// Constructor given the objective function
    pub fn new(fobj: O) -> Self {
        ObjFunc { fobj }
    }
}

impl<O: ScalarFunc> CostFunction for ObjFunc<O> {
    /// Type of the parameter vector
    type Param = Array1<f64>;
    /// Type of the return value computed by the cost function
    type Output = f64;

    /// Apply the cost function to a parameter `p`
    fn cost(&self, p: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        Ok((self.fobj)(&p.view()))
    }
}

/// A function type for constraints of the local optimizer,
/// only used to type the empty constraint list.
pub(crate) type Cstr = fn(&[f64], Option<&mut [f64]>, &mut ()) -> f64;
