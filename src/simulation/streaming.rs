//! Pull streaming: every destination cell gathers its populations from the
//! fixed set of upwind neighbors, so cells can be processed in parallel.
//!
//! Populations that would come from outside the top/bottom walls are the ones
//! that left this very cell towards the wall; they are bounced back into the
//! opposite direction (no-slip, mass conserving).

use crate::{
    concurrency::{par_iter_mut1, par_iter_mut2},
    field_state::Grid,
    floating_type_mod::FT,
    lattice::{Populations, C, OPPOSITE, Q},
};

/// Cells receiving less wax than this keep their previous temperature.
pub const MIN_ADVECTED_MASS: FT = 0.01;

/// Source cell of the population arriving at `(x, y)` along direction `k`,
/// together with the direction it is stored under in the source cell.
#[inline(always)]
fn upwind(grid: Grid, x: usize, y: usize, k: usize) -> (usize, usize) {
    let sx = grid.wrap_x(x as isize - C[k][0] as isize);
    match grid.checked_y(y as isize - C[k][1] as isize) {
        Some(sy) => (grid.idx(sx, sy), k),
        None => (grid.idx(x, y), OPPOSITE[k]),
    }
}

pub fn stream(grid: Grid, f_post: &[Populations], f: &mut [Populations]) {
    par_iter_mut1(f, |i, f_i| {
        let (x, y) = grid.coords(i);
        for k in 0..Q {
            let (src, src_k) = upwind(grid, x, y, k);
            f_i[k] = f_post[src][src_k];
        }
    });
}

/// Streams the wax populations and carries the temperature with them: the new
/// temperature is the mass weighted mean of the arriving populations' source
/// temperatures.
pub fn stream_with_temperature(
    grid: Grid,
    f_post: &[Populations],
    temp: &[FT],
    f: &mut [Populations],
    temp_next: &mut [FT],
) {
    par_iter_mut2(f, temp_next, |i, f_i, temp_i| {
        let (x, y) = grid.coords(i);
        let mut mass = 0.;
        let mut heat = 0.;
        for k in 0..Q {
            let (src, src_k) = upwind(grid, x, y, k);
            let value = f_post[src][src_k];
            f_i[k] = value;
            mass += value;
            heat += value * temp[src];
        }

        *temp_i = if mass >= MIN_ADVECTED_MASS { heat / mass } else { temp[i] };
    });
}
