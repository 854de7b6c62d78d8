//! Classical orbital element representation and anomaly conversions.
//!
//! [`OrbitalElements`] is an immutable value type: every invariant is
//! enforced once at construction and any "modification" (epoch shift,
//! renormalization) returns a new instance. The Kepler-equation machinery
//! lives here as free functions so the propagator can reuse it with an
//! overridden gravitational parameter.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::epoch::Epoch;
use crate::error::InvalidElementError;

/// Newton-Raphson iteration cap for the Kepler solve.
const MAX_KEPLER_ITER: usize = 50;

/// Convergence threshold on the eccentric-anomaly correction (rad).
const KEPLER_TOL: f64 = 1e-12;

/// Classical (Keplerian) orbital elements with epoch.
///
/// Fields are private: the only way to obtain an instance is through the
/// validating constructors, so every live value satisfies a > 0,
/// 0 ≤ e < 1, i ∈ [0, π] and Ω, ω, M₀ ∈ [0, 2π).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawElements", into = "RawElements")]
pub struct OrbitalElements {
    /// Semi-major axis (m)
    a_m: f64,
    /// Eccentricity (dimensionless)
    e: f64,
    /// Inclination (rad), normalized into [0, π]
    i_rad: f64,
    /// Right ascension of ascending node (rad)
    raan_rad: f64,
    /// Argument of periapsis (rad)
    aop_rad: f64,
    /// Mean anomaly at epoch (rad)
    m0_rad: f64,
    /// Epoch of the mean anomaly
    epoch: Epoch,
}

/// Canonical six-number-plus-epoch wire form. Deserialization funnels
/// through [`OrbitalElements::new`] so persisted data is re-validated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawElements {
    a_m: f64,
    e: f64,
    i_rad: f64,
    raan_rad: f64,
    aop_rad: f64,
    m0_rad: f64,
    epoch: Epoch,
}

impl From<OrbitalElements> for RawElements {
    fn from(el: OrbitalElements) -> Self {
        RawElements {
            a_m: el.a_m,
            e: el.e,
            i_rad: el.i_rad,
            raan_rad: el.raan_rad,
            aop_rad: el.aop_rad,
            m0_rad: el.m0_rad,
            epoch: el.epoch,
        }
    }
}

impl TryFrom<RawElements> for OrbitalElements {
    type Error = InvalidElementError;
    fn try_from(raw: RawElements) -> Result<Self, Self::Error> {
        OrbitalElements::new(
            raw.a_m, raw.e, raw.i_rad, raw.raan_rad, raw.aop_rad, raw.m0_rad, raw.epoch,
        )
    }
}

impl OrbitalElements {
    /// Create elements from SI units and radians.
    ///
    /// An inclination past π is folded back (i' = 2π − i) with a
    /// compensating π-shift of Ω and ω, which describes the same orbit
    /// plane and line of apsides.
    pub fn new(
        a_m: f64,
        e: f64,
        i_rad: f64,
        raan_rad: f64,
        aop_rad: f64,
        m0_rad: f64,
        epoch: Epoch,
    ) -> Result<Self, InvalidElementError> {
        if !a_m.is_finite() || a_m <= 0.0 {
            return Err(InvalidElementError::SemiMajorAxis(a_m));
        }
        if !e.is_finite() || !(0.0..1.0).contains(&e) {
            return Err(InvalidElementError::Eccentricity(e));
        }
        for (name, value) in [
            ("inclination", i_rad),
            ("raan", raan_rad),
            ("argument of periapsis", aop_rad),
            ("mean anomaly", m0_rad),
        ] {
            if !value.is_finite() {
                return Err(InvalidElementError::NonFiniteAngle { name, value });
            }
        }

        let mut i = normalize_angle(i_rad);
        let mut raan = raan_rad;
        let mut aop = aop_rad;
        if i > std::f64::consts::PI {
            i = TAU - i;
            raan += std::f64::consts::PI;
            aop += std::f64::consts::PI;
        }

        Ok(OrbitalElements {
            a_m,
            e,
            i_rad: i,
            raan_rad: normalize_angle(raan),
            aop_rad: normalize_angle(aop),
            m0_rad: normalize_angle(m0_rad),
            epoch,
        })
    }

    /// Create elements from kilometers and degrees (convenience constructor).
    pub fn from_km_deg(
        a_km: f64,
        e: f64,
        i_deg: f64,
        raan_deg: f64,
        aop_deg: f64,
        m0_deg: f64,
        epoch: Epoch,
    ) -> Result<Self, InvalidElementError> {
        Self::new(
            a_km * 1000.0,
            e,
            i_deg * DEG2RAD,
            raan_deg * DEG2RAD,
            aop_deg * DEG2RAD,
            m0_deg * DEG2RAD,
            epoch,
        )
    }

    /// Create elements from a mean motion, solving a = cbrt(μ/n²) with the
    /// Mars gravitational parameter.
    pub fn from_mean_motion(
        n_rad_s: f64,
        e: f64,
        i_rad: f64,
        raan_rad: f64,
        aop_rad: f64,
        m0_rad: f64,
        epoch: Epoch,
    ) -> Result<Self, InvalidElementError> {
        if !n_rad_s.is_finite() || n_rad_s <= 0.0 {
            return Err(InvalidElementError::MeanMotion(n_rad_s));
        }
        let a_m = (MU_MARS / (n_rad_s * n_rad_s)).cbrt();
        Self::new(a_m, e, i_rad, raan_rad, aop_rad, m0_rad, epoch)
    }

    /// The ideal equatorial, circular, zero-phase areostationary orbit.
    pub fn areostationary(epoch: Epoch) -> Self {
        OrbitalElements {
            a_m: areostationary().semi_major_axis_m,
            e: 0.0,
            i_rad: 0.0,
            raan_rad: 0.0,
            aop_rad: 0.0,
            m0_rad: 0.0,
            epoch,
        }
    }

    // ── Accessors ──

    /// Semi-major axis (m).
    pub fn semi_major_axis_m(&self) -> f64 {
        self.a_m
    }

    /// Eccentricity.
    pub fn eccentricity(&self) -> f64 {
        self.e
    }

    /// Inclination (rad), in [0, π].
    pub fn inclination_rad(&self) -> f64 {
        self.i_rad
    }

    /// Right ascension of ascending node (rad), in [0, 2π).
    pub fn raan_rad(&self) -> f64 {
        self.raan_rad
    }

    /// Argument of periapsis (rad), in [0, 2π).
    pub fn argument_of_periapsis_rad(&self) -> f64 {
        self.aop_rad
    }

    /// Mean anomaly at epoch (rad), in [0, 2π).
    pub fn mean_anomaly_at_epoch_rad(&self) -> f64 {
        self.m0_rad
    }

    /// Epoch of the mean anomaly.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Inclination (degrees).
    pub fn inclination_deg(&self) -> f64 {
        self.i_rad * RAD2DEG
    }

    // ── Derived quantities ──

    /// Mean motion n = sqrt(μ/a³) (rad/s).
    pub fn mean_motion(&self) -> f64 {
        (MU_MARS / self.a_m.powi(3)).sqrt()
    }

    /// Orbital period (seconds).
    pub fn period_s(&self) -> f64 {
        TAU / self.mean_motion()
    }

    /// Semi-latus rectum p = a(1 − e²) (m).
    pub fn semi_latus_rectum_m(&self) -> f64 {
        self.a_m * (1.0 - self.e * self.e)
    }

    /// Periapsis radius a(1 − e) (m).
    pub fn periapsis_radius_m(&self) -> f64 {
        self.a_m * (1.0 - self.e)
    }

    /// Apoapsis radius a(1 + e) (m).
    pub fn apoapsis_radius_m(&self) -> f64 {
        self.a_m * (1.0 + self.e)
    }

    // ── Time operations ──

    /// Seconds elapsed from the element epoch to `t` (signed, exact).
    pub fn elapsed_seconds(&self, t: Epoch) -> f64 {
        t.duration_since(&self.epoch)
    }

    /// Mean anomaly at an arbitrary time: wrap(M₀ + n·Δt) (rad).
    pub fn mean_anomaly_at(&self, t: Epoch) -> f64 {
        normalize_angle(self.m0_rad + self.mean_motion() * self.elapsed_seconds(t))
    }

    /// Eccentric anomaly at an arbitrary time (rad).
    pub fn eccentric_anomaly_at(&self, t: Epoch) -> f64 {
        eccentric_from_mean(self.mean_anomaly_at(t), self.e)
    }

    /// True anomaly at an arbitrary time (rad).
    pub fn true_anomaly_at(&self, t: Epoch) -> f64 {
        true_from_eccentric(self.eccentric_anomaly_at(t), self.e)
    }

    /// New elements re-referenced to `t`, preserving the orbital phase:
    /// the new M₀ is the mean anomaly evaluated at `t`.
    pub fn shift_epoch(&self, t: Epoch) -> Self {
        OrbitalElements {
            m0_rad: self.mean_anomaly_at(t),
            epoch: t,
            ..*self
        }
    }

    /// New elements with M₀ rewrapped into [0, 2π). Idempotent.
    pub fn normalized(&self) -> Self {
        OrbitalElements {
            m0_rad: normalize_angle(self.m0_rad),
            ..*self
        }
    }
}

// ── Kepler's equation ──

/// Solve Kepler's equation M = E − e·sin(E) for the eccentric anomaly.
///
/// Newton-Raphson from the Danby seed E₀ = M + 0.85·e·sign(sin M). For a
/// valid eccentricity the iteration is contractive, so hitting the cap
/// without meeting tolerance is an upstream invariant violation and panics
/// rather than returning a silently wrong anomaly.
pub fn eccentric_from_mean(m: f64, e: f64) -> f64 {
    let m = normalize_angle(m);
    if e < EPSILON {
        // Circular limit: E == M.
        return m;
    }

    let mut ea = m + 0.85 * e * m.sin().signum();
    for _ in 0..MAX_KEPLER_ITER {
        let f = ea - e * ea.sin() - m;
        let fp = 1.0 - e * ea.cos();
        let delta = f / fp;
        ea -= delta;
        if delta.abs() < KEPLER_TOL {
            return normalize_angle(ea);
        }
    }
    panic!("Kepler solve failed to converge for M={m}, e={e}; eccentricity escaped validation");
}

/// True anomaly from eccentric anomaly: atan2(√(1−e²)·sinE, cosE − e),
/// wrapped into [0, 2π).
pub fn true_from_eccentric(ea: f64, e: f64) -> f64 {
    let beta = (1.0 - e * e).sqrt();
    normalize_angle((beta * ea.sin()).atan2(ea.cos() - e))
}

/// Normalize angle to [0, 2π).
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle % TAU;
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

/// Normalize angle to [-π, π).
pub fn normalize_angle_pm(angle: f64) -> f64 {
    let a = normalize_angle(angle);
    if a >= std::f64::consts::PI {
        a - TAU
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn low_areo_orbit() -> OrbitalElements {
        OrbitalElements::from_km_deg(4_500.0, 0.01, 30.0, 40.0, 50.0, 60.0, Epoch::J2000).unwrap()
    }

    #[test]
    fn test_rejects_bad_semi_major_axis() {
        for a in [0.0, -1.0e6, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                OrbitalElements::new(a, 0.1, 0.0, 0.0, 0.0, 0.0, Epoch::J2000),
                Err(InvalidElementError::SemiMajorAxis(_))
            ));
        }
    }

    #[test]
    fn test_rejects_bad_eccentricity() {
        for e in [-0.1, 1.0, 1.5, f64::NAN] {
            assert!(matches!(
                OrbitalElements::new(4.5e6, e, 0.0, 0.0, 0.0, 0.0, Epoch::J2000),
                Err(InvalidElementError::Eccentricity(_))
            ));
        }
    }

    #[test]
    fn test_inclination_folding_preserves_geometry() {
        // i = 200° folds to 160° with Ω and ω shifted by 180°.
        let el = OrbitalElements::from_km_deg(4_500.0, 0.0, 200.0, 10.0, 20.0, 0.0, Epoch::J2000)
            .unwrap();
        assert_relative_eq!(el.inclination_deg(), 160.0, epsilon = 1e-9);
        assert_relative_eq!(el.raan_rad() * RAD2DEG, 190.0, epsilon = 1e-9);
        assert_relative_eq!(el.argument_of_periapsis_rad() * RAD2DEG, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_kepler_round_trip_identity() {
        // E − e·sinE must reproduce M across eccentricity and anomaly grids.
        for e in [0.0, 0.05, 0.3, 0.7, 0.95] {
            for k in 0..16 {
                let m = k as f64 * TAU / 16.0;
                let ea = eccentric_from_mean(m, e);
                let m_back = normalize_angle(ea - e * ea.sin());
                assert_relative_eq!(m_back, m, epsilon = 1e-9, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn test_circular_limit_is_exact() {
        for m in [0.0, 1.0, 3.0, 6.0] {
            assert_eq!(eccentric_from_mean(m, 0.0), normalize_angle(m));
        }
    }

    #[test]
    fn test_normalize_angle_pm_range() {
        assert_relative_eq!(normalize_angle_pm(3.0 * std::f64::consts::PI), -std::f64::consts::PI);
        assert_relative_eq!(normalize_angle_pm(-0.5), -0.5, epsilon = 1e-15);
        assert_relative_eq!(normalize_angle_pm(TAU + 0.25), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_anomalies_coincide_for_circular_orbit() {
        let el = OrbitalElements::areostationary(Epoch::J2000);
        let t = Epoch::from_seconds(10_000.0);
        let m = el.mean_anomaly_at(t);
        assert_eq!(el.eccentric_anomaly_at(t), m);
        assert_relative_eq!(el.true_anomaly_at(t), m, epsilon = 1e-12);
    }

    #[test]
    fn test_true_anomaly_leads_mean_below_apoapsis() {
        // For 0 < M < π the true anomaly runs ahead of the mean anomaly.
        let ea = eccentric_from_mean(1.0, 0.5);
        let nu = true_from_eccentric(ea, 0.5);
        assert!(nu > 1.0);
    }

    #[test]
    fn test_normalized_is_idempotent() {
        let el = low_areo_orbit();
        let once = el.normalized();
        let twice = once.normalized();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_shift_epoch_preserves_phase() {
        let el = low_areo_orbit();
        let t_new = Epoch::from_seconds(12_345.678);
        let shifted = el.shift_epoch(t_new);
        for probe in [0.0, 500.0, 90_000.0, -3_600.0] {
            let t = Epoch::from_seconds(probe);
            assert_relative_eq!(
                shifted.mean_anomaly_at(t),
                el.mean_anomaly_at(t),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_from_mean_motion_recovers_synchronous_axis() {
        let el =
            OrbitalElements::from_mean_motion(OMEGA_MARS, 0.0, 0.0, 0.0, 0.0, 0.0, Epoch::J2000)
                .unwrap();
        assert_relative_eq!(
            el.semi_major_axis_m(),
            areostationary().semi_major_axis_m,
            epsilon = 1.0
        );
    }

    #[test]
    fn test_areostationary_period_matches_sidereal_day() {
        let el = OrbitalElements::areostationary(Epoch::J2000);
        assert_relative_eq!(el.period_s(), SIDEREAL_DAY_S, epsilon = 1e-3);
    }

    #[test]
    fn test_apsis_radii() {
        let el = low_areo_orbit();
        assert_relative_eq!(el.periapsis_radius_m(), 4_500_000.0 * 0.99, epsilon = 1e-6);
        assert_relative_eq!(el.apoapsis_radius_m(), 4_500_000.0 * 1.01, epsilon = 1e-6);
        assert!(el.semi_latus_rectum_m() < el.semi_major_axis_m());
    }

    #[test]
    fn test_serde_round_trip_and_tamper_rejection() {
        let el = low_areo_orbit();
        let json = serde_json::to_string(&el).unwrap();
        let back: OrbitalElements = serde_json::from_str(&json).unwrap();
        assert_eq!(el, back);

        // e ≥ 1 in persisted data must be rejected at the boundary.
        let tampered = json.replace("\"e\":0.01", "\"e\":1.5");
        assert_ne!(json, tampered);
        assert!(serde_json::from_str::<OrbitalElements>(&tampered).is_err());
    }
}
