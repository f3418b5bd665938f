use crate::types::{Cstr, LocalResult};
use argmin::core::{CostFunction, Error, Problem};
use finitediff::FiniteDiff;
use log::debug;
use ndarray::{Array1, ArrayBase, Data, Ix1};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Facade for the bounded gradient-based local optimizer (SLSQP)
/// run once per basin-hopping trial.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct LocalOptimizer {
    bounds: Vec<(f64, f64)>,
    tol: f64,
    max_eval: usize,
}

impl LocalOptimizer {
    pub fn new(bounds: &[(f64, f64)]) -> Self {
        LocalOptimizer {
            bounds: bounds.to_vec(),
            tol: crate::LOCAL_TOL_DEFAULT,
            max_eval: crate::LOCAL_MAX_EVAL_DEFAULT,
        }
    }

    pub fn tol(&mut self, tol: f64) -> &mut Self {
        self.tol = tol;
        self
    }

    pub fn max_eval(&mut self, max_eval: usize) -> &mut Self {
        self.max_eval = max_eval;
        self
    }

    /// Minimize the problem cost function starting from `xinit`,
    /// first projected within bounds.
    ///
    /// Gradients are computed by central finite differences. An error raised
    /// by the cost function stops the optimization and is returned unchanged.
    pub fn minimize<O>(
        &self,
        problem: &mut Problem<O>,
        xinit: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    ) -> Result<LocalResult, Error>
    where
        O: CostFunction<Param = Array1<f64>, Output = f64>,
    {
        let xinit: Vec<f64> = xinit
            .iter()
            .zip(self.bounds.iter())
            .map(|(x, (lower, upper))| x.clamp(*lower, *upper))
            .collect();

        let failure: RefCell<Option<Error>> = RefCell::new(None);
        let problem = RefCell::new(problem);
        let eval = |x: &[f64]| -> f64 {
            if failure.borrow().is_some() {
                return f64::NAN;
            }
            match problem.borrow_mut().cost(&Array1::from_vec(x.to_vec())) {
                Ok(y) => y,
                Err(err) => {
                    *failure.borrow_mut() = Some(err);
                    f64::NAN
                }
            }
        };
        let obj = |x: &[f64], gradient: Option<&mut [f64]>, _u: &mut ()| -> f64 {
            if let Some(grad) = gradient {
                let f = |x: &Vec<f64>| -> f64 { eval(x) };
                grad[..].copy_from_slice(&x.to_vec().central_diff(&f));
            }
            eval(x)
        };

        let cstrs: Vec<Cstr> = vec![];
        let res = slsqp::minimize(
            obj,
            &xinit,
            &self.bounds,
            &cstrs,
            (),
            self.max_eval,
            Some(slsqp::StopTols {
                ftol_rel: self.tol,
                ftol_abs: self.tol,
                ..slsqp::StopTols::default()
            }),
        );

        if let Some(err) = failure.into_inner() {
            return Err(err);
        }
        let res = match res {
            Ok((_, x_opt, y_opt)) => LocalResult {
                x: Array1::from_vec(x_opt),
                fun: y_opt,
                success: true,
            },
            Err((_, x_opt, y_opt)) => LocalResult {
                x: Array1::from_vec(x_opt),
                fun: y_opt,
                success: false,
            },
        };
        debug!(
            "... end local optimization: f(x)={} at x={} (success={})",
            res.fun, res.x, res.success
        );
        Ok(res)
    }
}
