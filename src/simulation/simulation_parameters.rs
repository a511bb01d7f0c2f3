use std::{collections::HashMap, path::Path};

use crate::{
    error::{LavaError, Result},
    floating_type_mod::FT,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    // Shan-Chen interaction strengths (negative = cohesion, positive = repulsion)
    pub g_aa: FT,
    pub g_ab: FT,
    pub g_bb: FT,

    // initial condition
    pub wax_density: FT,
    pub water_density: FT,
    // minor-phase density on the "wrong" side of the interface
    pub density_floor: FT,
    pub wax_band_fraction: FT,
    // tanh interface width in cells
    pub interface_width: FT,
    // relative amplitude of the multiplicative density noise
    pub noise_amplitude: FT,
    pub seed: u64,
    pub wax_init_temp: FT,
    pub water_init_temp: FT,

    // relaxation times, all must be > 0.5
    pub tau_wax_cold: FT,
    pub tau_wax_hot: FT,
    pub tau_water: FT,
    pub transition_temp: FT,
    pub transition_sharpness: FT,

    // upper bound for the force-corrected equilibrium velocity
    pub max_velocity: FT,

    // body forces on the wax phase
    pub gravity: FT,
    pub thermal_expansion: FT,
    pub buoyancy: FT,
    pub buoyancy_threshold: FT,
    pub buoyancy_sharpness: FT,

    // heating / cooling zones, heights as fraction of the grid height
    pub heat_rate: FT,
    pub heat_zone_height: FT,
    // as fraction of the grid width
    pub heat_zone_halfwidth: FT,
    pub cool_rate: FT,
    pub cool_zone_height: FT,
    pub diffusion_rate: FT,
    pub wax_presence_threshold: FT,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            g_aa: -1.0,
            g_ab: 3.0,
            g_bb: 0.0,

            wax_density: 1.0,
            water_density: 1.0,
            density_floor: 0.03,
            wax_band_fraction: 0.25,
            interface_width: 2.0,
            noise_amplitude: 0.01,
            seed: 42,
            wax_init_temp: 0.3,
            water_init_temp: 0.2,

            tau_wax_cold: 1.6,
            tau_wax_hot: 0.8,
            tau_water: 1.0,
            transition_temp: 0.5,
            transition_sharpness: 12.0,

            max_velocity: 0.1,

            gravity: 0.0004,
            thermal_expansion: 0.6,
            buoyancy: 0.0008,
            buoyancy_threshold: 0.55,
            buoyancy_sharpness: 10.0,

            heat_rate: 0.004,
            heat_zone_height: 0.15,
            heat_zone_halfwidth: 0.3,
            cool_rate: 0.003,
            cool_zone_height: 0.2,
            diffusion_rate: 0.1,
            wax_presence_threshold: 0.3,
        }
    }
}

impl SimulationParams {
    /// Checks everything that would make the solver diverge or index out of range.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("tau_wax_cold", self.tau_wax_cold),
            ("tau_wax_hot", self.tau_wax_hot),
            ("tau_water", self.tau_water),
        ] {
            if !value.is_finite() || value <= 0.5 {
                return Err(LavaError::InvalidRelaxationTime { name, value });
            }
        }

        for (name, value) in self.named_values() {
            if !value.is_finite() {
                return Err(LavaError::InvalidParameter(format!("`{}` is not finite ({})", name, value)));
            }
        }

        for (name, value) in [
            ("wax_density", self.wax_density),
            ("water_density", self.water_density),
        ] {
            if value <= 0. {
                return Err(LavaError::InvalidParameter(format!(
                    "`{}` must be positive, got {}",
                    name, value
                )));
            }
        }

        for (name, value) in [
            ("density_floor", self.density_floor),
            ("interface_width", self.interface_width),
            ("noise_amplitude", self.noise_amplitude),
            ("max_velocity", self.max_velocity),
            ("gravity", self.gravity),
            ("thermal_expansion", self.thermal_expansion),
            ("buoyancy", self.buoyancy),
            ("heat_rate", self.heat_rate),
            ("cool_rate", self.cool_rate),
        ] {
            if value < 0. {
                return Err(LavaError::InvalidParameter(format!(
                    "`{}` must not be negative, got {}",
                    name, value
                )));
            }
        }

        for (name, value) in [
            ("wax_band_fraction", self.wax_band_fraction),
            ("wax_init_temp", self.wax_init_temp),
            ("water_init_temp", self.water_init_temp),
            ("heat_zone_height", self.heat_zone_height),
            ("heat_zone_halfwidth", self.heat_zone_halfwidth),
            ("cool_zone_height", self.cool_zone_height),
            ("diffusion_rate", self.diffusion_rate),
            ("noise_amplitude", self.noise_amplitude),
        ] {
            if !(0. ..=1.).contains(&value) {
                return Err(LavaError::InvalidParameter(format!(
                    "`{}` must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    fn named_values(&self) -> [(&'static str, FT); 29] {
        [
            ("g_aa", self.g_aa),
            ("g_ab", self.g_ab),
            ("g_bb", self.g_bb),
            ("wax_density", self.wax_density),
            ("water_density", self.water_density),
            ("density_floor", self.density_floor),
            ("wax_band_fraction", self.wax_band_fraction),
            ("interface_width", self.interface_width),
            ("noise_amplitude", self.noise_amplitude),
            ("wax_init_temp", self.wax_init_temp),
            ("water_init_temp", self.water_init_temp),
            ("tau_wax_cold", self.tau_wax_cold),
            ("tau_wax_hot", self.tau_wax_hot),
            ("tau_water", self.tau_water),
            ("transition_temp", self.transition_temp),
            ("transition_sharpness", self.transition_sharpness),
            ("max_velocity", self.max_velocity),
            ("gravity", self.gravity),
            ("thermal_expansion", self.thermal_expansion),
            ("buoyancy", self.buoyancy),
            ("buoyancy_threshold", self.buoyancy_threshold),
            ("buoyancy_sharpness", self.buoyancy_sharpness),
            ("heat_rate", self.heat_rate),
            ("heat_zone_height", self.heat_zone_height),
            ("heat_zone_halfwidth", self.heat_zone_halfwidth),
            ("cool_rate", self.cool_rate),
            ("cool_zone_height", self.cool_zone_height),
            ("diffusion_rate", self.diffusion_rate),
            ("wax_presence_threshold", self.wax_presence_threshold),
        ]
    }

    /// Parses a YAML parameter set; missing keys fall back to the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<SimulationParams> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads `path` and replaces every key listed in `overwrite_path` (if given).
    pub fn load(path: &Path, overwrite_path: Option<&Path>) -> Result<SimulationParams> {
        let params_yaml = std::fs::read_to_string(path)?;
        let mut params_serde: serde_yaml::Value = serde_yaml::from_str(&params_yaml)?;

        if let Some(overwrite_path) = overwrite_path {
            let overwrite_str = std::fs::read_to_string(overwrite_path)?;
            let overwrite: HashMap<String, serde_yaml::Value> = serde_yaml::from_str(&overwrite_str)?;

            let mapping = params_serde.as_mapping_mut().ok_or_else(|| {
                LavaError::InvalidParameter(format!("{} does not contain a mapping", path.display()))
            })?;
            for (k, v) in overwrite.into_iter() {
                mapping.insert(serde_yaml::Value::String(k), v);
            }
        }

        Ok(serde_yaml::from_value(params_serde)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
