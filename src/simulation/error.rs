//! Error types for the lava lamp solver.

use thiserror::Error;

use crate::floating_type_mod::FT;

#[derive(Debug, Error)]
pub enum LavaError {
    #[error("relaxation time `{name}` is {value}, it must be larger than 0.5")]
    InvalidRelaxationTime { name: &'static str, value: FT },

    #[error("grid of {width}x{height} cells is too small, at least 3x3 is required")]
    GridTooSmall { width: usize, height: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("export failed: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, LavaError>;
