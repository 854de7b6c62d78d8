//! Physical and astrodynamic constants for Mars.
//!
//! Primitive constants are plain `pub const` items; the areostationary
//! quantities that need non-const math (cube root, arccos) are derived once
//! behind a [`std::sync::LazyLock`] and are read-only for the life of the
//! process.

use std::sync::LazyLock;

/// Mars gravitational parameter (m³/s²)
pub const MU_MARS: f64 = 4.282837e13;

/// Mars equatorial radius (m)
pub const R_EQUATORIAL_M: f64 = 3.39619e6;

/// Mars polar radius (m)
pub const R_POLAR_M: f64 = 3.37620e6;

/// Mars volumetric mean radius (m)
pub const R_MEAN_M: f64 = 3.3895e6;

/// Flattening (derived from equatorial and polar radii)
pub const FLATTENING: f64 = (R_EQUATORIAL_M - R_POLAR_M) / R_EQUATORIAL_M;

/// Seconds per Mars sidereal day
pub const SIDEREAL_DAY_S: f64 = 88_642.663;

/// Seconds per Mars solar day (sol)
pub const SOL_S: f64 = 88_775.244;

/// Mars rotation rate (rad/s)
pub const OMEGA_MARS: f64 = TAU / SIDEREAL_DAY_S;

/// Speed of light in vacuum (m/s)
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Numeric tolerance for near-degenerate comparisons (circular limit,
/// grazing horizon).
pub const EPSILON: f64 = 1e-10;

/// Two pi
pub const TAU: f64 = std::f64::consts::TAU;

/// Degrees to radians
pub const DEG2RAD: f64 = std::f64::consts::PI / 180.0;

/// Radians to degrees
pub const RAD2DEG: f64 = 180.0 / std::f64::consts::PI;

/// Derived quantities for the ideal circular equatorial orbit whose period
/// matches the Mars sidereal day.
#[derive(Debug, Clone, Copy)]
pub struct AreostationaryOrbit {
    /// Semi-major axis (m): cbrt(μ/ω²).
    pub semi_major_axis_m: f64,
    /// Altitude above the mean radius (m).
    pub altitude_m: f64,
    /// Half-angle of the coverage cone to the geometric horizon (rad):
    /// arccos(R_mean / a).
    pub coverage_half_angle_rad: f64,
    /// One-way light time from the sub-satellite point to the satellite (s).
    pub boresight_light_time_s: f64,
}

static AREOSTATIONARY: LazyLock<AreostationaryOrbit> = LazyLock::new(|| {
    let semi_major_axis_m = (MU_MARS / (OMEGA_MARS * OMEGA_MARS)).cbrt();
    let altitude_m = semi_major_axis_m - R_MEAN_M;
    AreostationaryOrbit {
        semi_major_axis_m,
        altitude_m,
        coverage_half_angle_rad: (R_MEAN_M / semi_major_axis_m).acos(),
        boresight_light_time_s: altitude_m / SPEED_OF_LIGHT_M_S,
    }
});

/// The process-wide areostationary derivation, computed on first use.
pub fn areostationary() -> &'static AreostationaryOrbit {
    &AREOSTATIONARY
}
