use std::mem;

use crate::{
    collision::{collide, CollisionInputs, Relaxation},
    counters::{write_statistics, PerformanceCounters, ValueCounters},
    diagnostics::{compute_statistics, FieldStatistics},
    error::Result,
    field_state::FieldState,
    floating_type_mod::FT,
    forces::{compute_forces, ForceInputs},
    macroscopic::{update_phase, update_velocity},
    simulation_parameters::SimulationParams,
    streaming::{stream, stream_with_temperature},
    thermal::{evolve, ThermalInputs},
};

/// Owns every buffer of the lava lamp and advances it tick by tick.
///
/// A tick runs the phases in a fixed order, each reading the results of the
/// previous phases and writing its own buffer:
/// macroscopic → forces → collision (wax) → collision (water) →
/// streaming (wax, carrying temperature) → streaming (water) → thermal.
pub struct LavaLampSimulation {
    params: SimulationParams,
    wax_relaxation: Relaxation,
    water_relaxation: Relaxation,
    fields: FieldState,
    tick_count: usize,

    pcounters: PerformanceCounters,
    vcounters: ValueCounters,
}

impl LavaLampSimulation {
    /// Lava lamp initial condition: a wax band at the bottom, water above.
    pub fn new(width: usize, height: usize, params: SimulationParams) -> Result<Self> {
        params.validate()?;
        let fields = FieldState::lava_lamp(width, height, &params)?;
        Self::from_state(fields, params)
    }

    /// Starts from a caller-provided state (populations and temperature).
    pub fn from_state(fields: FieldState, params: SimulationParams) -> Result<Self> {
        params.validate()?;

        log::info!(
            "lava lamp {}x{} ({} cells), wax tau {}..{}, water tau {}",
            fields.grid.width,
            fields.grid.height,
            fields.num_cells(),
            params.tau_wax_cold,
            params.tau_wax_hot,
            params.tau_water
        );

        let mut simulation = LavaLampSimulation {
            wax_relaxation: Relaxation::wax(&params),
            water_relaxation: Relaxation::water(&params),
            params,
            fields,
            tick_count: 0,
            pcounters: PerformanceCounters::new(false),
            vcounters: ValueCounters::new(false),
        };
        simulation.macroscopic();
        Ok(simulation)
    }

    /// Enables per-phase timing and per-report value tracking.
    pub fn with_counters(mut self, enabled: bool) -> Self {
        self.pcounters = PerformanceCounters::new(enabled);
        self.vcounters = ValueCounters::new(enabled);
        self
    }

    fn macroscopic(&mut self) {
        let s = &mut self.fields;
        update_phase(&s.f_a, &mut s.rho_a, &mut s.psi_a);
        update_phase(&s.f_b, &mut s.rho_b, &mut s.psi_b);
        update_velocity(&s.f_a, &s.f_b, &s.rho_a, &s.rho_b, &mut s.ux, &mut s.uy);
    }

    fn forces(&mut self) {
        let s = &mut self.fields;
        compute_forces(
            &self.params,
            ForceInputs {
                grid: s.grid,
                psi_a: &s.psi_a,
                psi_b: &s.psi_b,
                rho_a: &s.rho_a,
                temp: &s.temp,
            },
            &mut s.force_a,
            &mut s.force_b,
        );
    }

    fn collision(&mut self) {
        let s = &mut self.fields;
        collide(
            &self.params,
            self.wax_relaxation,
            CollisionInputs {
                f: &s.f_a,
                rho: &s.rho_a,
                ux: &s.ux,
                uy: &s.uy,
                force: &s.force_a,
                temp: &s.temp,
            },
            &mut s.f_a_post,
        );
        collide(
            &self.params,
            self.water_relaxation,
            CollisionInputs {
                f: &s.f_b,
                rho: &s.rho_b,
                ux: &s.ux,
                uy: &s.uy,
                force: &s.force_b,
                temp: &s.temp,
            },
            &mut s.f_b_post,
        );
    }

    fn streaming(&mut self) {
        let s = &mut self.fields;
        stream_with_temperature(s.grid, &s.f_a_post, &s.temp, &mut s.f_a, &mut s.temp_next);
        mem::swap(&mut s.temp, &mut s.temp_next);
        stream(s.grid, &s.f_b_post, &mut s.f_b);
    }

    fn thermal(&mut self) {
        let s = &mut self.fields;
        evolve(
            &self.params,
            ThermalInputs {
                grid: s.grid,
                temp: &s.temp,
                rho_a: &s.rho_a,
            },
            &mut s.temp_next,
        );
        mem::swap(&mut s.temp, &mut s.temp_next);
    }

    /// Advances the simulation by one tick.
    pub fn tick(&mut self) {
        self.pcounters.begin("tick");

        self.pcounters.begin("macroscopic");
        self.macroscopic();
        self.pcounters.end("macroscopic");

        self.pcounters.begin("forces");
        self.forces();
        self.pcounters.end("forces");

        self.pcounters.begin("collision");
        self.collision();
        self.pcounters.end("collision");

        self.pcounters.begin("streaming");
        self.streaming();
        self.pcounters.end("streaming");

        self.pcounters.begin("thermal");
        self.thermal();
        self.pcounters.end("thermal");

        self.tick_count += 1;
        self.pcounters.end("tick");
    }

    pub fn step(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Statistics of the current populations and temperature.
    pub fn statistics(&self) -> FieldStatistics {
        compute_statistics(&self.fields, self.params.wax_presence_threshold)
    }

    /// Like [`statistics`](Self::statistics), but also feeds the value
    /// counters if they are enabled.
    pub fn record_statistics(&mut self) -> FieldStatistics {
        let stats = self.statistics();
        self.vcounters.add_value("mass-a", stats.mass_a);
        self.vcounters.add_value("mass-b", stats.mass_b);
        self.vcounters.add_value("max-temp", stats.max_temp);
        self.vcounters.add_value("plume-height", stats.plume_height as FT);
        self.vcounters.add_value("mixed-cells", stats.mixed_cells as FT);
        stats
    }

    pub fn counter_report(&self) -> String {
        write_statistics(&self.pcounters, &self.vcounters)
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn fields(&self) -> &FieldState {
        &self.fields
    }

    pub fn width(&self) -> usize {
        self.fields.grid.width
    }

    pub fn height(&self) -> usize {
        self.fields.grid.height
    }

    pub fn tick_count(&self) -> usize {
        self.tick_count
    }

    // All field slices are row-major with row 0 at the bottom wall.

    /// Wax density from the macroscopic pass at the start of the last tick,
    /// i.e. one streaming step behind [`temp`](Self::temp).
    pub fn rho_a(&self) -> &[FT] {
        &self.fields.rho_a
    }

    /// Water density, one streaming step behind [`temp`](Self::temp) like
    /// [`rho_a`](Self::rho_a).
    pub fn rho_b(&self) -> &[FT] {
        &self.fields.rho_b
    }

    /// Temperature after the last thermal pass.
    pub fn temp(&self) -> &[FT] {
        &self.fields.temp
    }

    /// Barycentric x velocity from the start of the last tick.
    pub fn ux(&self) -> &[FT] {
        &self.fields.ux
    }

    /// Barycentric y velocity from the start of the last tick.
    pub fn uy(&self) -> &[FT] {
        &self.fields.uy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::LavaError,
        lattice::{density, Q},
    };
    use approx::assert_relative_eq;

    /// No interaction, no body forces, no heat sources, every tau equal to 1.
    fn inert_params() -> SimulationParams {
        SimulationParams {
            g_aa: 0.,
            g_ab: 0.,
            g_bb: 0.,
            tau_wax_cold: 1.,
            tau_wax_hot: 1.,
            tau_water: 1.,
            gravity: 0.,
            buoyancy: 0.,
            heat_rate: 0.,
            cool_rate: 0.,
            ..SimulationParams::default()
        }
    }

    #[test]
    fn invalid_relaxation_time_fails_at_construction() {
        let params = SimulationParams {
            tau_water: 0.4,
            ..SimulationParams::default()
        };
        assert!(matches!(
            LavaLampSimulation::new(10, 10, params),
            Err(LavaError::InvalidRelaxationTime { name: "tau_water", .. })
        ));
    }

    #[test]
    fn uniform_rest_state_is_a_fixed_point() {
        let fields = FieldState::uniform(12, 10, 0.8, 0.6, 0.4).unwrap();
        let mut sim = LavaLampSimulation::from_state(fields, inert_params()).unwrap();
        sim.step(200);

        let fields = sim.fields();
        for i in 0..fields.num_cells() {
            for k in 0..Q {
                assert_relative_eq!(fields.f_a[i][k], crate::lattice::W[k] * 0.8, epsilon = 1e-6);
                assert_relative_eq!(fields.f_b[i][k], crate::lattice::W[k] * 0.6, epsilon = 1e-6);
            }
            assert_relative_eq!(fields.temp[i], 0.4, epsilon = 1e-6);
        }
        assert!(sim.ux().iter().chain(sim.uy()).all(|u| u.abs() < 1e-6));
    }

    #[test]
    fn mass_is_conserved_by_the_closed_box() {
        let mut sim = LavaLampSimulation::new(30, 40, SimulationParams::default()).unwrap();
        let initial = sim.statistics();
        sim.step(300);
        let stats = sim.statistics();

        assert!(stats.is_finite());
        assert_relative_eq!(stats.mass_a, initial.mass_a, max_relative = 1e-3);
        assert_relative_eq!(stats.mass_b, initial.mass_b, max_relative = 1e-3);
    }

    #[test]
    fn temperature_stays_in_unit_interval_every_tick() {
        let params = SimulationParams {
            heat_rate: 0.2,
            cool_rate: 0.2,
            ..SimulationParams::default()
        };
        let mut sim = LavaLampSimulation::new(20, 30, params).unwrap();
        for _ in 0..100 {
            sim.tick();
            assert!(sim.temp().iter().all(|t| (0. ..=1.).contains(t)));
        }
    }

    #[test]
    fn symmetric_start_stays_mirror_symmetric() {
        let params = SimulationParams {
            noise_amplitude: 0.,
            ..SimulationParams::default()
        };
        let (width, height) = (20, 30);
        let mut fields = FieldState::lava_lamp(width, height, &params).unwrap();
        // a hot wax blob straddling the centerline
        for y in 5..9 {
            for x in 7..13 {
                fields.set_cell(x, y, 1.0, 0.05, 0.9);
            }
        }
        let mut sim = LavaLampSimulation::from_state(fields, params).unwrap();
        sim.step(60);

        let mirror = |x: usize, y: usize| (width - 1 - x) + y * width;
        for y in 0..height {
            for x in 0..width / 2 {
                let i = x + y * width;
                let j = mirror(x, y);
                assert_relative_eq!(sim.rho_a()[i], sim.rho_a()[j], epsilon = 1e-3);
                assert_relative_eq!(sim.rho_b()[i], sim.rho_b()[j], epsilon = 1e-3);
                assert_relative_eq!(sim.temp()[i], sim.temp()[j], epsilon = 1e-3);
                assert_relative_eq!(sim.ux()[i], -sim.ux()[j], epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn counters_track_every_phase() {
        let mut sim = LavaLampSimulation::new(10, 12, SimulationParams::default())
            .unwrap()
            .with_counters(true);
        sim.step(3);
        sim.record_statistics();
        let report = sim.counter_report();
        let phases = ["macroscopic", "forces", "collision", "streaming", "thermal"];
        for phase in phases.iter().chain(&["mass-a", "mixed-cells"]) {
            assert!(report.contains(phase), "missing {} in {}", phase, report);
        }
        assert_eq!(sim.tick_count(), 3);
    }

    #[test]
    fn statistics_query_leaves_counters_untouched() {
        let mut sim = LavaLampSimulation::new(10, 12, SimulationParams::default())
            .unwrap()
            .with_counters(true);
        let stats = sim.statistics();
        assert!(!sim.counter_report().contains("mass-a"));
        assert_eq!(sim.record_statistics(), stats);
        assert!(sim.counter_report().contains("mass-a"));
    }

    #[test]
    fn densities_lag_one_streaming_step_behind_temperature() {
        let mut sim = LavaLampSimulation::new(12, 16, SimulationParams::default()).unwrap();
        sim.step(5);
        let before = sim.fields().clone();
        sim.tick();

        // densities come from the populations at the start of the tick
        for i in 0..before.num_cells() {
            assert_relative_eq!(sim.rho_a()[i], density(&before.f_a[i]), epsilon = 1e-6);
            assert_relative_eq!(sim.rho_b()[i], density(&before.f_b[i]), epsilon = 1e-6);
        }
        // while the temperature is the freshly updated field
        assert_eq!(sim.temp(), &sim.fields().temp[..]);
        assert_ne!(sim.temp(), &before.temp[..]);
    }
}
