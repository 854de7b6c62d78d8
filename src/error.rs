//! Error taxonomy for the geometry engine.
//!
//! Every error here is raised eagerly at the point of construction or call.
//! Near-degenerate numerical situations (coincident sight vectors, grazing
//! horizon, poles) are handled by clamping or reflection and return a
//! well-defined value instead of an error. There is no non-convergence
//! variant: Kepler's equation is contractive for 0 ≤ e < 1, so exhausting
//! the iteration cap indicates an invariant violation upstream and panics.

use thiserror::Error;

/// Rejected orbital-element input.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InvalidElementError {
    #[error("Semi-major axis must be finite and positive, got {0} m")]
    SemiMajorAxis(f64),

    #[error("Eccentricity must be in [0, 1), got {0}")]
    Eccentricity(f64),

    #[error("Angle '{name}' must be finite, got {value} rad")]
    NonFiniteAngle { name: &'static str, value: f64 },

    #[error("Mean motion must be finite and positive, got {0} rad/s")]
    MeanMotion(f64),
}

/// Rejected explicit parameter of a propagator or geometry query.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InvalidParameterError {
    #[error("Gravitational parameter must be finite and positive, got {0} m³/s²")]
    GravitationalParameter(f64),

    #[error("Polygon sample count must be at least {min}, got {got}")]
    TooFewSamples { got: usize, min: usize },

    #[error("Time step must be finite and positive, got {0} s")]
    TimeStep(f64),
}

/// A ground point whose inputs produce no usable local geometry.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum DegenerateGeometryError {
    #[error("Altitude {altitude_m} m makes the local radius non-positive (mean radius {radius_m} m)")]
    NonPositiveRadius { altitude_m: f64, radius_m: f64 },

    #[error("Ground point input '{name}' must be finite, got {value}")]
    NonFiniteInput { name: &'static str, value: f64 },
}
