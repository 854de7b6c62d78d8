//! Two-body (Keplerian) orbit propagation with Mars-fixed frame conversion.
//!
//! The propagator is stateless after construction: it owns an immutable
//! element set, a gravitational parameter, and a rotation reference, and
//! precomputes the perifocal basis once. Every query is a pure function of
//! the requested time, so a single instance can serve concurrent callers.
//!
//! Frame conventions: the inertial frame is the one the elements are
//! expressed in; the fixed frame co-rotates with Mars at the uniform rate
//! ω. The prime-meridian angle θ(t) grows linearly from the rotation
//! reference, and fixed-frame velocity carries the transport term
//! v_fixed = R(θ)·(v_inertial − ω × r_inertial).

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::elements::{eccentric_from_mean, normalize_angle, OrbitalElements};
use crate::epoch::Epoch;
use crate::error::InvalidParameterError;
use crate::ground::GroundPoint;

/// Which frame a state vector is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    /// Non-rotating areocentric frame (elements' natural frame).
    Inertial,
    /// Mars-fixed rotating frame (longitudes are stationary).
    Fixed,
}

/// A position/velocity pair in a named frame.
///
/// Components are plain `[f64; 3]` values: copy semantics mean no two
/// state vectors can alias the same storage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    /// Frame the components are expressed in.
    pub frame: Frame,
    /// Instant this state is valid at.
    pub epoch: Epoch,
    /// Position (m): [x, y, z]
    pub r_m: [f64; 3],
    /// Velocity (m/s): [vx, vy, vz]
    pub v_mps: [f64; 3],
}

impl StateVector {
    /// Position magnitude (m).
    pub fn r_mag_m(&self) -> f64 {
        norm(self.r_m)
    }

    /// Velocity magnitude (m/s).
    pub fn v_mag_mps(&self) -> f64 {
        norm(self.v_mps)
    }

    /// Altitude above the mean radius (m).
    pub fn altitude_m(&self) -> f64 {
        self.r_mag_m() - R_MEAN_M
    }
}

/// Reference fixing the rotating frame to the inertial frame: the prime
/// meridian sits at `prime_meridian_rad` east of the inertial +X axis at
/// `epoch`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationReference {
    /// Reference instant.
    pub epoch: Epoch,
    /// Prime-meridian angle at the reference instant (rad).
    pub prime_meridian_rad: f64,
}

impl Default for RotationReference {
    fn default() -> Self {
        RotationReference {
            epoch: Epoch::J2000,
            prime_meridian_rad: 0.0,
        }
    }
}

/// Keplerian two-body propagator around Mars.
pub struct TwoBodyPropagator {
    elements: OrbitalElements,
    mu: f64,
    rotation: RotationReference,
    /// Unit vector toward periapsis (inertial frame). Invariant under
    /// two-body motion, so computed once.
    p_hat: [f64; 3],
    /// Unit vector 90° ahead of periapsis in the direction of motion.
    q_hat: [f64; 3],
}

impl TwoBodyPropagator {
    /// Create a propagator with the Mars gravitational parameter and the
    /// default rotation reference.
    pub fn new(elements: OrbitalElements) -> Self {
        let (p_hat, q_hat) = perifocal_basis(&elements);
        TwoBodyPropagator {
            elements,
            mu: MU_MARS,
            rotation: RotationReference::default(),
            p_hat,
            q_hat,
        }
    }

    /// Override the gravitational parameter (m³/s²).
    pub fn with_mu(mut self, mu: f64) -> Result<Self, InvalidParameterError> {
        if !mu.is_finite() || mu <= 0.0 {
            return Err(InvalidParameterError::GravitationalParameter(mu));
        }
        self.mu = mu;
        Ok(self)
    }

    /// Override the fixed-frame rotation reference.
    pub fn with_rotation_reference(mut self, rotation: RotationReference) -> Self {
        self.rotation = rotation;
        self
    }

    /// The element set this propagator was built from.
    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    /// Gravitational parameter in use (m³/s²).
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Mean motion under the propagator's μ (rad/s).
    pub fn mean_motion(&self) -> f64 {
        (self.mu / self.elements.semi_major_axis_m().powi(3)).sqrt()
    }

    /// Inertial state at an arbitrary time (before or after epoch).
    pub fn propagate_inertial(&self, t: Epoch) -> StateVector {
        let a = self.elements.semi_major_axis_m();
        let e = self.elements.eccentricity();
        let m = normalize_angle(
            self.elements.mean_anomaly_at_epoch_rad() + self.mean_motion() * self.elements.elapsed_seconds(t),
        );
        let ea = eccentric_from_mean(m, e);

        let beta = (1.0 - e * e).sqrt();
        let (sin_ea, cos_ea) = ea.sin_cos();
        let x_pf = a * (cos_ea - e);
        let y_pf = a * beta * sin_ea;
        let r_mag = a * (1.0 - e * cos_ea);
        let v_scale = (self.mu * a).sqrt() / r_mag;

        StateVector {
            frame: Frame::Inertial,
            epoch: t,
            r_m: [
                x_pf * self.p_hat[0] + y_pf * self.q_hat[0],
                x_pf * self.p_hat[1] + y_pf * self.q_hat[1],
                x_pf * self.p_hat[2] + y_pf * self.q_hat[2],
            ],
            v_mps: [
                v_scale * (-sin_ea * self.p_hat[0] + beta * cos_ea * self.q_hat[0]),
                v_scale * (-sin_ea * self.p_hat[1] + beta * cos_ea * self.q_hat[1]),
                v_scale * (-sin_ea * self.p_hat[2] + beta * cos_ea * self.q_hat[2]),
            ],
        }
    }

    /// Prime-meridian angle θ(t) = wrap(θ₀ + ω·(t − t_ref)) (rad).
    pub fn rotation_angle_rad(&self, t: Epoch) -> f64 {
        normalize_angle(
            self.rotation.prime_meridian_rad + OMEGA_MARS * t.duration_since(&self.rotation.epoch),
        )
    }

    /// Convert an inertial state to the Mars-fixed frame at time `t`.
    ///
    /// Position is a rigid rotation by θ(t); velocity subtracts the
    /// transport term ω × r before rotating. Dropping that term leaves
    /// positions correct but velocities wrong, so it is applied here and
    /// nowhere else.
    pub fn inertial_to_fixed(&self, state: &StateVector, t: Epoch) -> StateVector {
        debug_assert_eq!(state.frame, Frame::Inertial);
        let theta = self.rotation_angle_rad(t);
        let omega_cross_r = [
            -OMEGA_MARS * state.r_m[1],
            OMEGA_MARS * state.r_m[0],
            0.0,
        ];
        let v_rel = [
            state.v_mps[0] - omega_cross_r[0],
            state.v_mps[1] - omega_cross_r[1],
            state.v_mps[2] - omega_cross_r[2],
        ];
        StateVector {
            frame: Frame::Fixed,
            epoch: t,
            r_m: rotate_about_z(state.r_m, theta),
            v_mps: rotate_about_z(v_rel, theta),
        }
    }

    /// Mars-fixed state at an arbitrary time.
    pub fn propagate_fixed(&self, t: Epoch) -> StateVector {
        let inertial = self.propagate_inertial(t);
        self.inertial_to_fixed(&inertial, t)
    }

    /// The ground point directly beneath the orbiting object at time `t`.
    pub fn subsatellite_point(&self, t: Epoch) -> GroundPoint {
        let state = self.propagate_fixed(t);
        let [x, y, z] = state.r_m;
        let r = norm(state.r_m);
        // r ≥ a(1 − e) > 0 by element construction, so the projection is
        // always well defined.
        let lat = z.atan2((x * x + y * y).sqrt());
        let lon = y.atan2(x);
        GroundPoint::new_canonical(lat, lon, r - R_MEAN_M)
    }
}

/// Perifocal unit vectors (periapsis direction and its 90°-lead companion)
/// from (i, Ω, ω).
fn perifocal_basis(elements: &OrbitalElements) -> ([f64; 3], [f64; 3]) {
    let (sin_i, cos_i) = elements.inclination_rad().sin_cos();
    let (sin_raan, cos_raan) = elements.raan_rad().sin_cos();
    let (sin_aop, cos_aop) = elements.argument_of_periapsis_rad().sin_cos();

    let p_hat = [
        cos_raan * cos_aop - sin_raan * sin_aop * cos_i,
        sin_raan * cos_aop + cos_raan * sin_aop * cos_i,
        sin_aop * sin_i,
    ];
    let q_hat = [
        -cos_raan * sin_aop - sin_raan * cos_aop * cos_i,
        -sin_raan * sin_aop + cos_raan * cos_aop * cos_i,
        cos_aop * sin_i,
    ];
    (p_hat, q_hat)
}

/// Express a vector in axes rotated by +theta about z (frame transform).
fn rotate_about_z(v: [f64; 3], theta: f64) -> [f64; 3] {
    let (sin_t, cos_t) = theta.sin_cos();
    [
        v[0] * cos_t + v[1] * sin_t,
        -v[0] * sin_t + v[1] * cos_t,
        v[2],
    ]
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
