pub mod collision;
pub mod concurrency;
pub mod counters;
pub mod diagnostics;
pub mod error;
pub mod field_state;
pub mod forces;
pub mod lattice;
pub mod macroscopic;
pub mod simulation;
pub mod simulation_parameters;
pub mod streaming;
pub mod thermal;

#[cfg(feature = "double-precision")]
pub mod floating_type_mod {
    pub type FT = f64;
}

#[cfg(not(feature = "double-precision"))]
pub mod floating_type_mod {
    pub type FT = f32;
}

use floating_type_mod::FT;

use nalgebra::SVector;

pub type V<FT, const D: usize> = SVector<FT, D>;

pub type V2 = V<FT, 2>;

pub fn vec2f(x: FT, y: FT) -> V2 {
    [x, y].into()
}

pub use diagnostics::FieldStatistics;
pub use error::{LavaError, Result};
pub use field_state::FieldState;
pub use simulation::*;
pub use simulation_parameters::SimulationParams;
