//! Line-of-sight, coverage-cone and footprint geometry.
//!
//! Pure functions over [`GroundPoint`]s and raw Mars-fixed vectors. The
//! module is independent of the propagator: any source of fixed-frame
//! positions works, which keeps link-budget queries usable against recorded
//! or externally supplied ephemerides.
//!
//! All spherical formulas clamp their trigonometric intermediates to absorb
//! floating round-off at grazing-horizon and antipodal limits; degenerate
//! inputs yield defined values (−π/2 elevation, +∞ path loss) rather than
//! errors.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{DegenerateGeometryError, InvalidParameterError};
use crate::ground::GroundPoint;

/// Additive slack on footprint boundary comparisons (rad), to keep points
/// sitting exactly on the rim from flapping in and out.
const FOOTPRINT_TOLERANCE_RAD: f64 = 1e-12;

/// Minimum vertex count for a footprint polygon.
const MIN_CIRCLE_SAMPLES: usize = 4;

/// Free-space reference term 20·log₁₀(4π/c) for range in meters and
/// frequency in hertz (dB).
const FSPL_M_HZ_CONST_DB: f64 = -147.55221677811664;

/// The geometry of one ground-to-orbiter sight line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkGeometry {
    /// True iff elevation meets the requested minimum.
    pub visible: bool,
    /// Elevation of the orbiter above the local horizon (rad).
    pub elevation_rad: f64,
    /// Slant range (m).
    pub range_m: f64,
    /// One-way light time over the slant range (s).
    pub one_way_light_time_s: f64,
    /// Central angle between the ground point and the sub-object point (rad).
    pub central_angle_rad: f64,
    /// Ground point directly beneath the orbiter.
    pub subsatellite: GroundPoint,
}

/// Canonical LOS query: elevation, range, light time and central angle of
/// a Mars-fixed orbiter position as seen from `ground`, with `visible` set
/// iff elevation ≥ `min_elevation_rad`.
pub fn evaluate_ground_to_satellite(
    ground: &GroundPoint,
    sat_fixed_m: [f64; 3],
    min_elevation_rad: f64,
) -> Result<LinkGeometry, DegenerateGeometryError> {
    let subsatellite = GroundPoint::from_fixed_m(sat_fixed_m)?;
    Ok(evaluate_with_subsatellite(
        ground,
        sat_fixed_m,
        &subsatellite,
        min_elevation_rad,
    ))
}

/// LOS query with an already-derived sub-object point, e.g. from
/// [`crate::propagator::TwoBodyPropagator::subsatellite_point`]. Total:
/// the caller vouches that `subsatellite` belongs to `sat_fixed_m`.
pub fn evaluate_with_subsatellite(
    ground: &GroundPoint,
    sat_fixed_m: [f64; 3],
    subsatellite: &GroundPoint,
    min_elevation_rad: f64,
) -> LinkGeometry {
    let elevation_rad = ground.elevation_rad_to(sat_fixed_m);
    let range_m = ground.range_to_m(sat_fixed_m);
    LinkGeometry {
        visible: elevation_rad >= min_elevation_rad,
        elevation_rad,
        range_m,
        one_way_light_time_s: range_m / SPEED_OF_LIGHT_M_S,
        central_angle_rad: ground.central_angle_rad(subsatellite),
        subsatellite: *subsatellite,
    }
}

/// LOS query against the geometric horizon (zero minimum elevation).
pub fn evaluate_horizon(
    ground: &GroundPoint,
    sat_fixed_m: [f64; 3],
) -> Result<LinkGeometry, DegenerateGeometryError> {
    evaluate_ground_to_satellite(ground, sat_fixed_m, 0.0)
}

/// Half-angle of the coverage cone to the geometric horizon for an orbiter
/// at altitude `altitude_m` above a sphere of radius `radius_m` (rad):
/// arccos(R/(R+h)). A negative altitude is treated as 0 for this formula.
pub fn horizon_half_angle_rad(radius_m: f64, altitude_m: f64) -> f64 {
    let h = altitude_m.max(0.0);
    (radius_m / (radius_m + h)).clamp(-1.0, 1.0).acos()
}

/// Maximum central angle at which a ground site at radius `ground_radius_m`
/// still sees an orbiter at radius `sat_radius_m` above a minimum elevation
/// (rad).
///
/// Exact two-radius spherical form: with ρ = R_g/R_s,
/// cos α = ρ·cos²ε + sin ε·√(1 − ρ²cos²ε). Reduces to the horizon
/// half-angle at ε = 0 and to 0 at ε = π/2; the square-root argument is
/// clamped at 0 to tolerate round-off at the horizon limit.
pub fn max_central_angle_for_min_elevation_rad(
    ground_radius_m: f64,
    sat_radius_m: f64,
    min_elevation_rad: f64,
) -> f64 {
    let rho = ground_radius_m / sat_radius_m;
    let (sin_e, cos_e) = min_elevation_rad.sin_cos();
    let root = (1.0 - rho * rho * cos_e * cos_e).max(0.0).sqrt();
    let cos_alpha = rho * cos_e * cos_e + sin_e * root;
    cos_alpha.clamp(-1.0, 1.0).acos()
}

/// Whether `point` lies inside the footprint centered on `subsatellite`
/// with the given maximum central angle. A small additive tolerance keeps
/// rim points stable.
pub fn is_within_footprint(
    point: &GroundPoint,
    subsatellite: &GroundPoint,
    max_central_angle_rad: f64,
) -> bool {
    point.central_angle_rad(subsatellite) <= max_central_angle_rad + FOOTPRINT_TOLERANCE_RAD
}

/// Free-space path loss (dB) for a slant range in meters and a carrier
/// frequency in hertz: 20·log₁₀(d) + 20·log₁₀(f) + 20·log₁₀(4π/c).
///
/// Non-positive range or frequency yields +∞ — a monotone physical limit,
/// not an error.
pub fn fspl_db(range_m: f64, frequency_hz: f64) -> f64 {
    if range_m <= 0.0 || frequency_hz <= 0.0 {
        return f64::INFINITY;
    }
    20.0 * range_m.log10() + 20.0 * frequency_hz.log10() + FSPL_M_HZ_CONST_DB
}

/// Closed polygon of `samples` ground points at a constant central angle
/// around `center`, traced through evenly spaced bearings. Consumers close
/// the ring by joining the last vertex back to the first.
pub fn circle_on_sphere(
    center: &GroundPoint,
    half_angle_rad: f64,
    samples: usize,
) -> Result<Vec<GroundPoint>, InvalidParameterError> {
    if samples < MIN_CIRCLE_SAMPLES {
        return Err(InvalidParameterError::TooFewSamples {
            got: samples,
            min: MIN_CIRCLE_SAMPLES,
        });
    }
    let mut vertices = Vec::with_capacity(samples);
    for k in 0..samples {
        let bearing = TAU * k as f64 / samples as f64;
        vertices.push(center.destination(bearing, half_angle_rad));
    }
    Ok(vertices)
}

/// Horizon footprint polygon for an orbiter at `sat_altitude_m` above the
/// sub-object point `subsatellite`.
pub fn footprint_circle(
    subsatellite: &GroundPoint,
    sat_altitude_m: f64,
    samples: usize,
) -> Result<Vec<GroundPoint>, InvalidParameterError> {
    let half_angle = horizon_half_angle_rad(R_MEAN_M, sat_altitude_m);
    circle_on_sphere(subsatellite, half_angle, samples)
}
