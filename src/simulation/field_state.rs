use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    error::{LavaError, Result},
    floating_type_mod::FT,
    lattice::{rest_populations, Populations},
    simulation_parameters::SimulationParams,
    V2,
};
use nalgebra::zero;

/// Row-major cell addressing. `x` wraps around, `y = 0` is the bottom wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Result<Grid> {
        if width < 3 || height < 3 {
            return Err(LavaError::GridTooSmall { width, height });
        }
        Ok(Grid { width, height })
    }

    #[inline(always)]
    pub fn num_cells(&self) -> usize {
        self.width * self.height
    }

    #[inline(always)]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        x + y * self.width
    }

    #[inline(always)]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }

    #[inline(always)]
    pub fn wrap_x(&self, x: isize) -> usize {
        x.rem_euclid(self.width as isize) as usize
    }

    #[inline(always)]
    pub fn clamp_y(&self, y: isize) -> usize {
        y.clamp(0, self.height as isize - 1) as usize
    }

    /// `None` if `y` lies outside the walls.
    #[inline(always)]
    pub fn checked_y(&self, y: isize) -> Option<usize> {
        if y >= 0 && y < self.height as isize {
            Some(y as usize)
        } else {
            None
        }
    }
}

/// All per-cell buffers of the simulation.
///
/// `f_a`/`f_b` hold the populations between ticks, `f_a_post`/`f_b_post` the
/// post-collision populations within a tick. Streaming pulls from the post
/// buffers back into `f_a`/`f_b`. The temperature is double buffered with
/// `temp_next` and swapped after every phase that writes it.
#[derive(Clone)]
pub struct FieldState {
    pub grid: Grid,

    pub f_a: Vec<Populations>,
    pub f_b: Vec<Populations>,
    pub f_a_post: Vec<Populations>,
    pub f_b_post: Vec<Populations>,

    pub rho_a: Vec<FT>,
    pub rho_b: Vec<FT>,
    pub psi_a: Vec<FT>,
    pub psi_b: Vec<FT>,
    pub ux: Vec<FT>,
    pub uy: Vec<FT>,

    pub force_a: Vec<V2>,
    pub force_b: Vec<V2>,

    pub temp: Vec<FT>,
    pub temp_next: Vec<FT>,
}

impl FieldState {
    /// Both phases at rest with spatially constant density and temperature.
    pub fn uniform(width: usize, height: usize, rho_a: FT, rho_b: FT, temp: FT) -> Result<FieldState> {
        let grid = Grid::new(width, height)?;
        let n = grid.num_cells();

        Ok(FieldState {
            grid,
            f_a: vec![rest_populations(rho_a); n],
            f_b: vec![rest_populations(rho_b); n],
            f_a_post: vec![[0.; 9]; n],
            f_b_post: vec![[0.; 9]; n],
            rho_a: vec![rho_a; n],
            rho_b: vec![rho_b; n],
            psi_a: vec![0.; n],
            psi_b: vec![0.; n],
            ux: vec![0.; n],
            uy: vec![0.; n],
            force_a: vec![zero(); n],
            force_b: vec![zero(); n],
            temp: vec![temp.clamp(0., 1.); n],
            temp_next: vec![0.; n],
        })
    }

    /// Wax band at the bottom, water above, separated by a `tanh` interface.
    pub fn lava_lamp(width: usize, height: usize, params: &SimulationParams) -> Result<FieldState> {
        let mut state = FieldState::uniform(width, height, 0., 0., 0.)?;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let interface_y = params.wax_band_fraction * height as FT;
        let interface_width = FT::max(params.interface_width, 1e-3);

        for y in 0..height {
            // 1 deep inside the wax band, 0 inside the water
            let s = 0.5 * (1. - FT::tanh((y as FT - interface_y) / interface_width));

            for x in 0..width {
                let rho_a = params.wax_density * s + params.density_floor * (1. - s);
                let rho_b = params.water_density * (1. - s) + params.density_floor * s;
                let noise_a = 1. + params.noise_amplitude * (2. * rng.gen::<FT>() - 1.);
                let noise_b = 1. + params.noise_amplitude * (2. * rng.gen::<FT>() - 1.);
                let temp = params.wax_init_temp * s + params.water_init_temp * (1. - s);

                state.set_cell(x, y, rho_a * noise_a, rho_b * noise_b, temp);
            }
        }

        Ok(state)
    }

    /// Puts the cell at rest with the given densities and temperature.
    pub fn set_cell(&mut self, x: usize, y: usize, rho_a: FT, rho_b: FT, temp: FT) {
        let i = self.grid.idx(x, y);
        self.f_a[i] = rest_populations(rho_a);
        self.f_b[i] = rest_populations(rho_b);
        self.rho_a[i] = rho_a;
        self.rho_b[i] = rho_b;
        self.temp[i] = temp.clamp(0., 1.);
    }

    pub fn num_cells(&self) -> usize {
        self.grid.num_cells()
    }
}
