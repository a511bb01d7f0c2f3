//! Shan-Chen interaction forces plus the temperature dependent body forces on
//! the wax phase.

use crate::{
    concurrency::par_iter_mut2,
    field_state::Grid,
    floating_type_mod::FT,
    lattice::{direction, C, Q, W},
    simulation_parameters::SimulationParams,
    vec2f, V2,
};

#[inline]
pub fn sigmoid(x: FT) -> FT {
    1. / (1. + FT::exp(-x))
}

/// Read-only snapshot the forces are computed from.
#[derive(Clone, Copy)]
pub struct ForceInputs<'a> {
    pub grid: Grid,
    pub psi_a: &'a [FT],
    pub psi_b: &'a [FT],
    pub rho_a: &'a [FT],
    pub temp: &'a [FT],
}

/// Lattice-weighted sum of `psi` over the 8 neighbors. Horizontal neighbors
/// wrap, vertical neighbors are clamped to the wall row.
#[inline]
fn neighbor_sum(grid: Grid, psi: &[FT], x: usize, y: usize) -> V2 {
    let mut sum = vec2f(0., 0.);
    for k in 1..Q {
        let nx = grid.wrap_x(x as isize + C[k][0] as isize);
        let ny = grid.clamp_y(y as isize + C[k][1] as isize);
        sum += W[k] * psi[grid.idx(nx, ny)] * direction(k);
    }
    sum
}

/// Gravity (reduced by thermal expansion) and the gated buoyancy lift.
#[inline]
pub fn wax_body_force(params: &SimulationParams, rho_a: FT, temp: FT) -> V2 {
    let gravity = -params.gravity * rho_a * (1. - params.thermal_expansion * temp);

    let gate = sigmoid(params.buoyancy_sharpness * (temp - params.buoyancy_threshold));
    let excess = FT::max(0., temp - params.buoyancy_threshold);
    let lift = params.buoyancy * rho_a * gate * (1. + 3. * excess);

    vec2f(0., gravity + lift)
}

pub fn compute_forces(params: &SimulationParams, input: ForceInputs, force_a: &mut [V2], force_b: &mut [V2]) {
    let grid = input.grid;

    par_iter_mut2(force_a, force_b, |i, fa, fb| {
        let (x, y) = grid.coords(i);
        let sum_a = neighbor_sum(grid, input.psi_a, x, y);
        let sum_b = neighbor_sum(grid, input.psi_b, x, y);

        *fa = -input.psi_a[i] * (params.g_aa * sum_a + params.g_ab * sum_b);
        *fb = -input.psi_b[i] * (params.g_ab * sum_a + params.g_bb * sum_b);

        *fa += wax_body_force(params, input.rho_a[i], input.temp[i]);
    });
}
