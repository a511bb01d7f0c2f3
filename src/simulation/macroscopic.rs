//! Density, pseudopotential and barycentric velocity from the populations.

use crate::{
    concurrency::par_iter_mut2,
    floating_type_mod::FT,
    lattice::{density, momentum, Populations},
};

/// Below this (total) density velocities and pseudopotentials are zero.
pub const DENSITY_EPS: FT = 0.001;

#[inline]
pub fn pseudopotential(rho: FT) -> FT {
    if rho > DENSITY_EPS {
        1. - FT::exp(-rho)
    } else {
        0.
    }
}

/// Writes `rho` and `psi` of one phase.
pub fn update_phase(f: &[Populations], rho: &mut [FT], psi: &mut [FT]) {
    par_iter_mut2(rho, psi, |i, rho, psi| {
        *rho = density(&f[i]);
        *psi = pseudopotential(*rho);
    });
}

/// Combined momentum of both phases divided by the combined density.
pub fn update_velocity(
    f_a: &[Populations],
    f_b: &[Populations],
    rho_a: &[FT],
    rho_b: &[FT],
    ux: &mut [FT],
    uy: &mut [FT],
) {
    par_iter_mut2(ux, uy, |i, ux, uy| {
        let rho = rho_a[i] + rho_b[i];
        if rho > DENSITY_EPS {
            let p = momentum(&f_a[i]) + momentum(&f_b[i]);
            *ux = p.x / rho;
            *uy = p.y / rho;
        } else {
            *ux = 0.;
            *uy = 0.;
        }
    });
}
