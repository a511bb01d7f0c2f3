//! D2Q9 velocity set.
//!
//! ```text
//!   6   2   5
//!    \  |  /
//!   3 - 0 - 1
//!    /  |  \
//!   7   4   8
//! ```
//!
//! `+y` points up, away from the heated bottom wall.

use crate::{floating_type_mod::FT, vec2f, V2};

/// Number of discrete velocities.
pub const Q: usize = 9;

/// Discrete velocities `[cx, cy]`.
pub const C: [[i32; 2]; Q] = [
    [0, 0],   // 0: rest
    [1, 0],   // 1: east
    [0, 1],   // 2: north
    [-1, 0],  // 3: west
    [0, -1],  // 4: south
    [1, 1],   // 5: northeast
    [-1, 1],  // 6: northwest
    [-1, -1], // 7: southwest
    [1, -1],  // 8: southeast
];

pub const W: [FT; Q] = [
    4. / 9.,
    1. / 9.,
    1. / 9.,
    1. / 9.,
    1. / 9.,
    1. / 36.,
    1. / 36.,
    1. / 36.,
    1. / 36.,
];

/// Reverse direction of every velocity, used for bounce-back.
pub const OPPOSITE: [usize; Q] = [0, 3, 4, 1, 2, 7, 8, 5, 6];

pub type Populations = [FT; Q];

#[inline(always)]
pub fn direction(k: usize) -> V2 {
    vec2f(C[k][0] as FT, C[k][1] as FT)
}

/// Populations of a fluid at rest with density `rho`.
pub fn rest_populations(rho: FT) -> Populations {
    let mut f = [0.; Q];
    for k in 0..Q {
        f[k] = W[k] * rho;
    }
    f
}

#[inline(always)]
pub fn density(f: &Populations) -> FT {
    f.iter().sum()
}

#[inline]
pub fn momentum(f: &Populations) -> V2 {
    let mut p = vec2f(0., 0.);
    for k in 1..Q {
        p += f[k] * direction(k);
    }
    p
}
