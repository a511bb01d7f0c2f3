//! Read-only statistics of the current state, used by tests and the runner to
//! judge whether the model is still healthy.

use serde::Serialize;

use crate::{
    field_state::FieldState,
    floating_type_mod::FT,
    lattice::{density, Populations},
};

/// Cells with more wax than this count as occupied.
pub const OCCUPIED_DENSITY: FT = 0.1;
pub const THIN_DENSITY_BANDS: [FT; 2] = [0.2, 0.5];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldStatistics {
    pub mass_a: FT,
    pub mass_b: FT,

    pub occupied_cells: usize,
    // over occupied cells only, zero if there are none
    pub min_density_a: FT,
    pub avg_density_a: FT,
    pub max_density_a: FT,
    pub cells_below_0_2: usize,
    pub cells_below_0_5: usize,

    pub max_temp: FT,

    /// Rows from the bottom wall up to (and including) the topmost row that
    /// contains wax above the presence threshold.
    pub plume_height: usize,
    /// Cells where both phases exceed the presence threshold.
    pub mixed_cells: usize,

    pub negative_populations: usize,
    pub non_finite_cells: usize,
}

impl FieldStatistics {
    pub fn is_finite(&self) -> bool {
        self.non_finite_cells == 0 && self.mass_a.is_finite() && self.mass_b.is_finite()
    }
}

fn count_negative(f: &Populations) -> usize {
    f.iter().filter(|&&v| v < 0.).count()
}

pub fn compute_statistics(state: &FieldState, wax_presence_threshold: FT) -> FieldStatistics {
    let grid = state.grid;

    let mut stats = FieldStatistics {
        mass_a: 0.,
        mass_b: 0.,
        occupied_cells: 0,
        min_density_a: FT::INFINITY,
        avg_density_a: 0.,
        max_density_a: 0.,
        cells_below_0_2: 0,
        cells_below_0_5: 0,
        max_temp: 0.,
        plume_height: 0,
        mixed_cells: 0,
        negative_populations: 0,
        non_finite_cells: 0,
    };

    let mut occupied_sum = 0.;

    for i in 0..grid.num_cells() {
        let rho_a = density(&state.f_a[i]);
        let rho_b = density(&state.f_b[i]);
        let temp = state.temp[i];

        if !rho_a.is_finite() || !rho_b.is_finite() || !temp.is_finite() {
            stats.non_finite_cells += 1;
            continue;
        }

        stats.mass_a += rho_a;
        stats.mass_b += rho_b;
        stats.max_temp = FT::max(stats.max_temp, temp);
        stats.negative_populations += count_negative(&state.f_a[i]) + count_negative(&state.f_b[i]);

        if rho_a > OCCUPIED_DENSITY {
            stats.occupied_cells += 1;
            occupied_sum += rho_a;
            stats.min_density_a = FT::min(stats.min_density_a, rho_a);
            stats.max_density_a = FT::max(stats.max_density_a, rho_a);
            if rho_a < THIN_DENSITY_BANDS[0] {
                stats.cells_below_0_2 += 1;
            }
            if rho_a < THIN_DENSITY_BANDS[1] {
                stats.cells_below_0_5 += 1;
            }
        }

        if rho_a > wax_presence_threshold {
            let (_, y) = grid.coords(i);
            stats.plume_height = stats.plume_height.max(y + 1);
            if rho_b > wax_presence_threshold {
                stats.mixed_cells += 1;
            }
        }
    }

    if stats.occupied_cells > 0 {
        stats.avg_density_a = occupied_sum / stats.occupied_cells as FT;
    } else {
        stats.min_density_a = 0.;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn statistics_of_a_two_layer_state() {
        let mut state = FieldState::uniform(4, 6, 0.05, 1., 0.2).unwrap();
        for x in 0..4 {
            state.set_cell(x, 0, 1., 0.05, 0.7);
            state.set_cell(x, 1, 0.4, 0.6, 0.4);
            state.set_cell(x, 2, 0.15, 0.9, 0.3);
        }

        let stats = compute_statistics(&state, 0.3);
        assert_relative_eq!(stats.mass_a, 4. * (1. + 0.4 + 0.15) + 12. * 0.05, epsilon = 1e-4);
        assert_relative_eq!(stats.mass_b, 4. * (0.05 + 0.6 + 0.9) + 12., epsilon = 1e-4);
        assert_eq!(stats.occupied_cells, 12);
        assert_relative_eq!(stats.min_density_a, 0.15, epsilon = 1e-6);
        assert_relative_eq!(stats.max_density_a, 1., epsilon = 1e-6);
        assert_relative_eq!(stats.avg_density_a, (1. + 0.4 + 0.15) / 3., epsilon = 1e-5);
        assert_eq!(stats.cells_below_0_2, 4);
        assert_eq!(stats.cells_below_0_5, 8);
        assert_relative_eq!(stats.max_temp, 0.7, epsilon = 1e-6);
        // row 1 is the topmost row above the presence threshold
        assert_eq!(stats.plume_height, 2);
        // only row 1 holds more than 0.3 of both phases
        assert_eq!(stats.mixed_cells, 4);
        assert_eq!(stats.negative_populations, 0);
        assert!(stats.is_finite());
    }

    #[test]
    fn instability_is_reported_not_raised() {
        let mut state = FieldState::uniform(3, 3, 1., 1., 0.5).unwrap();
        state.f_a[0][1] = -0.2;
        state.f_b[4][2] = FT::NAN;

        let stats = compute_statistics(&state, 0.3);
        assert_eq!(stats.negative_populations, 1);
        assert_eq!(stats.non_finite_cells, 1);
        assert!(!stats.is_finite());
    }
}
