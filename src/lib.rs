//! # AREOLINK
//!
//! **Areo**centric orbit propagation and **link**-geometry toolkit.
//!
//! Answers two questions deterministically: where is an orbiting object at
//! time t, in both the inertial and Mars-fixed frames — and can a given
//! ground location see it, with what elevation, range, light time and
//! footprint. Provides Mars physical constants, classical orbital element
//! handling, a two-body propagator with rotating-frame conversion,
//! planetocentric ground points, and line-of-sight/coverage geometry for
//! relay analysis.
//!
//! Everything is a pure computation over immutable value types: no shared
//! mutable state, no I/O, safe to call from any number of threads.

pub mod access;
pub mod constants;
pub mod elements;
pub mod epoch;
pub mod error;
pub mod ground;
pub mod propagator;
pub mod visibility;

pub use elements::OrbitalElements;
pub use epoch::Epoch;
pub use error::{DegenerateGeometryError, InvalidElementError, InvalidParameterError};
pub use ground::GroundPoint;
pub use propagator::{Frame, RotationReference, StateVector, TwoBodyPropagator};
pub use visibility::LinkGeometry;

#[cfg(feature = "python")]
mod pybridge;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn areolink(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pybridge::register(m)?;
    Ok(())
}
