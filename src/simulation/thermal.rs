//! Temperature diffusion through the wax plus the heater at the bottom and the
//! cooling zone at the top.

use crate::{
    concurrency::par_iter_mut1, field_state::Grid, floating_type_mod::FT, simulation_parameters::SimulationParams,
};

const NEIGHBORS: [[isize; 2]; 4] = [[1, 0], [-1, 0], [0, 1], [0, -1]];

#[derive(Clone, Copy)]
pub struct ThermalInputs<'a> {
    pub grid: Grid,
    pub temp: &'a [FT],
    pub rho_a: &'a [FT],
}

/// Five-point smoothing where each neighbor counts with the wax density it
/// shares with this cell. Missing weight is filled up with the cell's own
/// temperature, so thin wax diffuses less.
fn diffused(params: &SimulationParams, input: &ThermalInputs, x: usize, y: usize) -> FT {
    let grid = input.grid;
    let i = grid.idx(x, y);
    let t = input.temp[i];

    let mut count = 0.;
    let mut weight_sum = 0.;
    let mut weighted = 0.;
    for [dx, dy] in NEIGHBORS {
        let ny = match grid.checked_y(y as isize + dy) {
            Some(ny) => ny,
            None => continue, // insulated wall
        };
        let j = grid.idx(grid.wrap_x(x as isize + dx), ny);
        let w = (FT::min(input.rho_a[i], input.rho_a[j]) / params.wax_density).clamp(0., 1.);

        count += 1.;
        weight_sum += w;
        weighted += w * input.temp[j];
    }

    let avg = (weighted + (count - weight_sum) * t) / count;
    t + params.diffusion_rate * (avg - t)
}

/// Heat added at `(x, y)`, zero outside the heater band.
pub fn heating(params: &SimulationParams, grid: Grid, x: usize, y: usize) -> FT {
    let band = params.heat_zone_height * grid.height as FT;
    let y = y as FT;
    if y >= band {
        return 0.;
    }
    let vertical = 1. - y / band;

    let center = (grid.width as FT - 1.) * 0.5;
    let halfwidth = params.heat_zone_halfwidth * grid.width as FT;
    let dist = (x as FT - center).abs();
    if dist >= halfwidth {
        return 0.;
    }
    let horizontal = (1. - dist / halfwidth).powi(2);

    params.heat_rate * vertical * horizontal
}

/// Heat removed at row `y`, strongest at the top row.
pub fn cooling(params: &SimulationParams, grid: Grid, y: usize) -> FT {
    let band = params.cool_zone_height * grid.height as FT;
    let depth = (grid.height - 1 - y) as FT;
    if depth >= band {
        return 0.;
    }
    params.cool_rate * (1. - depth / band)
}

/// Writes the new temperature into `temp_next`, clamped to `[0, 1]`.
pub fn evolve(params: &SimulationParams, input: ThermalInputs, temp_next: &mut [FT]) {
    let grid = input.grid;

    par_iter_mut1(temp_next, |i, t_next| {
        let (x, y) = grid.coords(i);
        let mut t = diffused(params, &input, x, y);

        if input.rho_a[i] > params.wax_presence_threshold {
            t += heating(params, grid, x, y);
            t -= cooling(params, grid, y);
        }

        *t_next = t.clamp(0., 1.);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn no_sources() -> SimulationParams {
        SimulationParams {
            heat_rate: 0.,
            cool_rate: 0.,
            ..SimulationParams::default()
        }
    }

    #[test]
    fn diffusion_preserves_uniform_temperature() {
        let grid = Grid::new(6, 5).unwrap();
        let n = grid.num_cells();
        let temp = vec![0.42; n];
        let rho_a = vec![1.; n];
        let mut next = vec![0.; n];
        evolve(
            &no_sources(),
            ThermalInputs {
                grid,
                temp: &temp,
                rho_a: &rho_a,
            },
            &mut next,
        );
        for t in next {
            assert_relative_eq!(t, 0.42, epsilon = 1e-6);
        }
    }

    #[test]
    fn no_diffusion_without_wax() {
        let grid = Grid::new(4, 4).unwrap();
        let n = grid.num_cells();
        let temp: Vec<FT> = (0..n).map(|i| (i % 3) as FT * 0.3).collect();
        let rho_a = vec![0.; n];
        let mut next = vec![0.; n];
        evolve(
            &no_sources(),
            ThermalInputs {
                grid,
                temp: &temp,
                rho_a: &rho_a,
            },
            &mut next,
        );
        for i in 0..n {
            assert_relative_eq!(next[i], temp[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn hot_spot_spreads_to_wax_neighbors() {
        let grid = Grid::new(5, 5).unwrap();
        let n = grid.num_cells();
        let mut temp = vec![0.; n];
        temp[grid.idx(2, 2)] = 1.;
        let rho_a = vec![1.; n];
        let mut next = vec![0.; n];
        evolve(
            &no_sources(),
            ThermalInputs {
                grid,
                temp: &temp,
                rho_a: &rho_a,
            },
            &mut next,
        );
        let rate = no_sources().diffusion_rate;
        assert_relative_eq!(next[grid.idx(2, 2)], 1. - rate, epsilon = 1e-6);
        assert_relative_eq!(next[grid.idx(2, 3)], rate * 0.25, epsilon = 1e-6);
        assert_eq!(next[grid.idx(0, 0)], 0.);
    }

    #[test]
    fn heater_peaks_at_bottom_center() {
        let params = SimulationParams::default();
        let grid = Grid::new(51, 75).unwrap();
        let peak = heating(&params, grid, 25, 0);
        assert_relative_eq!(peak, params.heat_rate, epsilon = 1e-7);
        assert!(heating(&params, grid, 20, 0) < peak);
        assert!(heating(&params, grid, 25, 3) < peak);
        assert_eq!(heating(&params, grid, 25, 74), 0.);
        assert_eq!(heating(&params, grid, 0, 0), 0.);
    }

    #[test]
    fn cooler_only_acts_near_the_top() {
        let params = SimulationParams::default();
        let grid = Grid::new(50, 75).unwrap();
        assert_relative_eq!(cooling(&params, grid, 74), params.cool_rate, epsilon = 1e-7);
        assert_eq!(cooling(&params, grid, 0), 0.);
    }

    #[test]
    fn result_is_clamped() {
        let params = SimulationParams {
            heat_rate: 5.,
            cool_rate: 5.,
            ..SimulationParams::default()
        };
        let grid = Grid::new(10, 10).unwrap();
        let n = grid.num_cells();
        let temp = vec![0.5; n];
        let rho_a = vec![1.; n];
        let mut next = vec![0.5; n];
        evolve(
            &params,
            ThermalInputs {
                grid,
                temp: &temp,
                rho_a: &rho_a,
            },
            &mut next,
        );
        assert_eq!(next[grid.idx(4, 0)], 1.);
        assert_eq!(next[grid.idx(4, 9)], 0.);
        assert!(next.iter().all(|t| (0. ..=1.).contains(t)));
    }
}
