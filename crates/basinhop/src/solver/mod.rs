mod convergence;
mod hop_config;
mod hop_solver;
mod hop_state;
mod perturbation;

pub use convergence::*;
pub use hop_config::*;
pub use hop_solver::*;
pub use hop_state::*;
pub use perturbation::*;
