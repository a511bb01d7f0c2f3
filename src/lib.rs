/*!
Two-phase thermal lattice-Boltzmann "lava lamp".

Wax (phase A) and water (phase B) share a D2Q9 lattice and interact through a
Shan-Chen pseudopotential. The wax viscosity and buoyancy are gated by a
temperature field that is heated at the bottom, cooled at the top and carried
along with the wax mass flux.

The library exposes the solver ([`LavaLampSimulation`]) and its parameters;
the binary in `main.rs` wraps it into a headless runner.
*/

mod platform;
mod simulation;

pub use simulation::*;

#[cfg(not(target_arch = "wasm32"))]
pub use platform::start;
