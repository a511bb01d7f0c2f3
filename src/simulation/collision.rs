//! BGK collision with Guo forcing.

use crate::{
    concurrency::par_iter_mut1,
    floating_type_mod::FT,
    forces::sigmoid,
    lattice::{direction, Populations, Q, W},
    macroscopic::DENSITY_EPS,
    simulation_parameters::SimulationParams,
    vec2f, V2,
};

/// How a phase picks its relaxation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Relaxation {
    /// Blends between a cold and a hot relaxation time around `transition`.
    TemperatureGated {
        cold: FT,
        hot: FT,
        transition: FT,
        sharpness: FT,
    },
    Fixed(FT),
}

impl Relaxation {
    pub fn wax(params: &SimulationParams) -> Relaxation {
        Relaxation::TemperatureGated {
            cold: params.tau_wax_cold,
            hot: params.tau_wax_hot,
            transition: params.transition_temp,
            sharpness: params.transition_sharpness,
        }
    }

    pub fn water(params: &SimulationParams) -> Relaxation {
        Relaxation::Fixed(params.tau_water)
    }

    #[inline]
    pub fn tau(&self, temp: FT) -> FT {
        match *self {
            Relaxation::TemperatureGated {
                cold,
                hot,
                transition,
                sharpness,
            } => {
                let softness = sigmoid(sharpness * (temp - transition));
                cold * (1. - softness) + hot * softness
            }
            Relaxation::Fixed(tau) => tau,
        }
    }
}

/// Read-only snapshot of one phase.
#[derive(Clone, Copy)]
pub struct CollisionInputs<'a> {
    pub f: &'a [Populations],
    pub rho: &'a [FT],
    pub ux: &'a [FT],
    pub uy: &'a [FT],
    pub force: &'a [V2],
    pub temp: &'a [FT],
}

#[inline]
pub fn equilibrium(k: usize, rho: FT, v: V2) -> FT {
    let cv = direction(k).dot(&v);
    W[k] * rho * (1. + 3. * cv + 4.5 * cv * cv - 1.5 * v.norm_squared())
}

/// Guo forcing term for direction `k`.
#[inline]
pub fn guo_source(k: usize, v: V2, force: V2, force_factor: FT) -> FT {
    let c = direction(k);
    let cv = c.dot(&v);
    let weighted: V2 = 3. * (c - v) + 9. * cv * c;
    W[k] * force_factor * weighted.dot(&force)
}

/// Equilibrium velocity: barycentric velocity shifted by half the force
/// impulse, clamped to `max_velocity`.
#[inline]
pub fn equilibrium_velocity(u: V2, force: V2, rho: FT, max_velocity: FT) -> V2 {
    let mut v = if rho > DENSITY_EPS { u + force / (2. * rho) } else { u };

    let speed = v.norm();
    if speed > max_velocity {
        v *= max_velocity / speed;
    }
    v
}

/// Collides a single cell.
#[inline]
pub fn collide_cell(f: &Populations, rho: FT, v: V2, force: V2, tau: FT) -> Populations {
    let inv_tau = 1. / tau;
    let force_factor = 1. - 0.5 * inv_tau;

    let mut out = [0.; Q];
    for k in 0..Q {
        let feq = equilibrium(k, rho, v);
        out[k] = f[k] - (f[k] - feq) * inv_tau + guo_source(k, v, force, force_factor);
    }
    out
}

/// Writes the post-collision populations of one phase into `f_post`.
pub fn collide(params: &SimulationParams, relaxation: Relaxation, input: CollisionInputs, f_post: &mut [Populations]) {
    let max_velocity = params.max_velocity;

    par_iter_mut1(f_post, |i, f_post| {
        let u = vec2f(input.ux[i], input.uy[i]);
        let v = equilibrium_velocity(u, input.force[i], input.rho[i], max_velocity);
        let tau = relaxation.tau(input.temp[i]);
        *f_post = collide_cell(&input.f[i], input.rho[i], v, input.force[i], tau);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{density, momentum, rest_populations};
    use approx::assert_relative_eq;

    #[test]
    fn equilibrium_moments() {
        let v = vec2f(0.05, -0.02);
        let feq: Populations = std::array::from_fn(|k| equilibrium(k, 1.2, v));
        assert_relative_eq!(density(&feq), 1.2, epsilon = 1e-5);
        let p = momentum(&feq);
        assert_relative_eq!(p.x, 1.2 * 0.05, epsilon = 1e-5);
        assert_relative_eq!(p.y, 1.2 * -0.02, epsilon = 1e-5);
    }

    #[test]
    fn collision_conserves_mass_and_adds_force_impulse() {
        let mut f = rest_populations(1.);
        f[1] += 0.02;
        f[3] -= 0.01;
        let rho = density(&f);
        let force = vec2f(0.001, 0.002);
        let u = momentum(&f) / rho;
        let v = equilibrium_velocity(u, force, rho, 0.1);
        let out = collide_cell(&f, rho, v, force, 0.8);

        assert_relative_eq!(density(&out), rho, epsilon = 1e-5);
        // Guo forcing: post-collision momentum = rho * v + F / 2 with v = u + F / (2 rho)
        let p = momentum(&out);
        assert_relative_eq!(p.x, momentum(&f).x + force.x, epsilon = 1e-5);
        assert_relative_eq!(p.y, momentum(&f).y + force.y, epsilon = 1e-5);
    }

    #[test]
    fn rest_state_is_a_fixed_point_for_unit_tau() {
        let f = rest_populations(0.7);
        let out = collide_cell(&f, 0.7, vec2f(0., 0.), vec2f(0., 0.), 1.);
        for k in 0..Q {
            assert_relative_eq!(out[k], f[k], epsilon = 1e-7);
        }
    }

    #[test]
    fn equilibrium_velocity_is_clamped() {
        let v = equilibrium_velocity(vec2f(0.3, 0.4), vec2f(0., 0.), 1., 0.1);
        assert_relative_eq!(v.norm(), 0.1, epsilon = 1e-6);
        assert_relative_eq!(v.x / v.y, 0.75, epsilon = 1e-5);
    }

    #[test]
    fn near_empty_cells_ignore_the_force_shift() {
        let v = equilibrium_velocity(vec2f(0.01, 0.), vec2f(1., 1.), 0.0001, 0.1);
        assert_eq!(v, vec2f(0.01, 0.));
    }

    #[test]
    fn wax_softens_when_hot() {
        let params = SimulationParams::default();
        let wax = Relaxation::wax(&params);
        assert!(wax.tau(0.) > 0.99 * params.tau_wax_cold);
        assert!(wax.tau(1.) < 1.01 * params.tau_wax_hot);
        let mid = wax.tau(params.transition_temp);
        assert_relative_eq!(mid, 0.5 * (params.tau_wax_cold + params.tau_wax_hot), epsilon = 1e-6);
        assert_eq!(Relaxation::water(&params).tau(0.9), params.tau_water);
    }
}
