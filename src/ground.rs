//! Planetocentric ground locations and local spherical geometry.
//!
//! A [`GroundPoint`] is an immutable surface/near-surface location on the
//! reference sphere: planetocentric latitude, east-positive longitude and
//! altitude above the mean radius. All derived quantities (Cartesian
//! Mars-fixed vector, local frame, central angles, elevation to a target)
//! are pure functions of the three stored fields; nothing is cached.
//!
//! Geodesy here is deliberately spherical. Surface distance uses the mean
//! radius plus the average of the two endpoint altitudes, not a great
//! ellipse, and downstream consumers depend on that exact output.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::DegenerateGeometryError;

/// An immutable planetocentric location: latitude, longitude, altitude.
///
/// Canonical ranges are enforced at construction: latitude in [−π/2, π/2]
/// (a pole-crossing input is reflected with an antipodal longitude shift),
/// longitude in (−π, π], and a local radius R_mean + altitude that is
/// strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGroundPoint", into = "RawGroundPoint")]
pub struct GroundPoint {
    /// Planetocentric latitude (rad), north positive.
    lat_rad: f64,
    /// East-positive longitude (rad).
    lon_rad: f64,
    /// Altitude above the mean radius (m). May be negative.
    alt_m: f64,
}

/// Wire form; deserialization re-validates through [`GroundPoint::new`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawGroundPoint {
    lat_rad: f64,
    lon_rad: f64,
    alt_m: f64,
}

impl From<GroundPoint> for RawGroundPoint {
    fn from(p: GroundPoint) -> Self {
        RawGroundPoint {
            lat_rad: p.lat_rad,
            lon_rad: p.lon_rad,
            alt_m: p.alt_m,
        }
    }
}

impl TryFrom<RawGroundPoint> for GroundPoint {
    type Error = DegenerateGeometryError;
    fn try_from(raw: RawGroundPoint) -> Result<Self, Self::Error> {
        GroundPoint::new(raw.lat_rad, raw.lon_rad, raw.alt_m)
    }
}

impl GroundPoint {
    /// Create a ground point from radians and meters.
    pub fn new(lat_rad: f64, lon_rad: f64, alt_m: f64) -> Result<Self, DegenerateGeometryError> {
        for (name, value) in [
            ("latitude", lat_rad),
            ("longitude", lon_rad),
            ("altitude", alt_m),
        ] {
            if !value.is_finite() {
                return Err(DegenerateGeometryError::NonFiniteInput { name, value });
            }
        }
        if R_MEAN_M + alt_m <= 0.0 {
            return Err(DegenerateGeometryError::NonPositiveRadius {
                altitude_m: alt_m,
                radius_m: R_MEAN_M,
            });
        }
        Ok(Self::new_canonical(lat_rad, lon_rad, alt_m))
    }

    /// Create a ground point from degrees and meters.
    pub fn from_deg(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Result<Self, DegenerateGeometryError> {
        Self::new(lat_deg * DEG2RAD, lon_deg * DEG2RAD, alt_m)
    }

    /// Project a Mars-fixed Cartesian vector (m) onto the reference sphere:
    /// the sub-object point of an orbiting position, or the location of any
    /// fixed-frame vector.
    pub fn from_fixed_m(r_m: [f64; 3]) -> Result<Self, DegenerateGeometryError> {
        let [x, y, z] = r_m;
        for (name, value) in [("x", x), ("y", y), ("z", z)] {
            if !value.is_finite() {
                return Err(DegenerateGeometryError::NonFiniteInput { name, value });
            }
        }
        let r = (x * x + y * y + z * z).sqrt();
        if r <= 0.0 {
            return Err(DegenerateGeometryError::NonPositiveRadius {
                altitude_m: -R_MEAN_M,
                radius_m: R_MEAN_M,
            });
        }
        let lat = z.atan2((x * x + y * y).sqrt());
        let lon = y.atan2(x);
        Ok(Self::new_canonical(lat, lon, r - R_MEAN_M))
    }

    /// Canonicalize already-finite inputs: fold latitude across the poles
    /// (rotating longitude by π), wrap longitude into (−π, π].
    pub(crate) fn new_canonical(lat_rad: f64, lon_rad: f64, alt_m: f64) -> Self {
        let mut lat = normalize_pm_pi(lat_rad);
        let mut lon = lon_rad;
        if lat > std::f64::consts::FRAC_PI_2 {
            lat = std::f64::consts::PI - lat;
            lon += std::f64::consts::PI;
        } else if lat < -std::f64::consts::FRAC_PI_2 {
            lat = -std::f64::consts::PI - lat;
            lon += std::f64::consts::PI;
        }
        GroundPoint {
            lat_rad: lat,
            lon_rad: normalize_lon(lon),
            alt_m,
        }
    }

    // ── Accessors ──

    /// Planetocentric latitude (rad), in [−π/2, π/2].
    pub fn latitude_rad(&self) -> f64 {
        self.lat_rad
    }

    /// East-positive longitude (rad), in (−π, π].
    pub fn longitude_rad(&self) -> f64 {
        self.lon_rad
    }

    /// Altitude above the mean radius (m).
    pub fn altitude_m(&self) -> f64 {
        self.alt_m
    }

    /// Latitude (degrees).
    pub fn latitude_deg(&self) -> f64 {
        self.lat_rad * RAD2DEG
    }

    /// Longitude (degrees), east positive.
    pub fn longitude_deg(&self) -> f64 {
        self.lon_rad * RAD2DEG
    }

    /// Distance from the planet center (m): mean radius + altitude.
    pub fn radius_m(&self) -> f64 {
        R_MEAN_M + self.alt_m
    }

    // ── Frame conversions ──

    /// Mars-fixed Cartesian position (m).
    pub fn to_fixed_m(&self) -> [f64; 3] {
        let r = self.radius_m();
        let (sin_lat, cos_lat) = self.lat_rad.sin_cos();
        let (sin_lon, cos_lon) = self.lon_rad.sin_cos();
        [r * cos_lat * cos_lon, r * cos_lat * sin_lon, r * sin_lat]
    }

    /// Local zenith unit vector (radially outward).
    pub fn local_up(&self) -> [f64; 3] {
        let (sin_lat, cos_lat) = self.lat_rad.sin_cos();
        let (sin_lon, cos_lon) = self.lon_rad.sin_cos();
        [cos_lat * cos_lon, cos_lat * sin_lon, sin_lat]
    }

    /// Local east unit vector (tangent, toward increasing longitude).
    pub fn local_east(&self) -> [f64; 3] {
        let (sin_lon, cos_lon) = self.lon_rad.sin_cos();
        [-sin_lon, cos_lon, 0.0]
    }

    /// Local north unit vector (tangent, toward increasing latitude).
    pub fn local_north(&self) -> [f64; 3] {
        let (sin_lat, cos_lat) = self.lat_rad.sin_cos();
        let (sin_lon, cos_lon) = self.lon_rad.sin_cos();
        [-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat]
    }

    // ── Spherical geometry ──

    /// Central angle to another point using the haversine formula (rad).
    ///
    /// Numerically robust for both near-zero and near-antipodal
    /// separations; the haversine term is clamped into [0, 1] to absorb
    /// round-off before the arcsine.
    pub fn central_angle_rad(&self, other: &GroundPoint) -> f64 {
        let dlat = other.lat_rad - self.lat_rad;
        let dlon = other.lon_rad - self.lon_rad;
        let h = (dlat / 2.0).sin().powi(2)
            + self.lat_rad.cos() * other.lat_rad.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * h.clamp(0.0, 1.0).sqrt().asin()
    }

    /// Surface distance to another point (m): central angle times an
    /// effective radius of R_mean plus the average of the two altitudes.
    pub fn surface_distance_m(&self, other: &GroundPoint) -> f64 {
        let effective_radius = R_MEAN_M + (self.alt_m + other.alt_m) / 2.0;
        self.central_angle_rad(other) * effective_radius
    }

    /// Elevation of an arbitrary Mars-fixed target above the local horizon
    /// plane (rad). Positive means above the horizon.
    ///
    /// A coincident target (zero-length sight vector) returns −π/2,
    /// straight down, as a defined value rather than an error.
    pub fn elevation_rad_to(&self, target_fixed_m: [f64; 3]) -> f64 {
        let site = self.to_fixed_m();
        let los = [
            target_fixed_m[0] - site[0],
            target_fixed_m[1] - site[1],
            target_fixed_m[2] - site[2],
        ];
        let los_mag = (los[0] * los[0] + los[1] * los[1] + los[2] * los[2]).sqrt();
        if los_mag <= 0.0 {
            return -std::f64::consts::FRAC_PI_2;
        }
        let up = self.local_up();
        let cos_zenith = (up[0] * los[0] + up[1] * los[1] + up[2] * los[2]) / los_mag;
        cos_zenith.clamp(-1.0, 1.0).asin()
    }

    /// Slant range to a Mars-fixed target (m).
    pub fn range_to_m(&self, target_fixed_m: [f64; 3]) -> f64 {
        let site = self.to_fixed_m();
        let dx = target_fixed_m[0] - site[0];
        let dy = target_fixed_m[1] - site[1];
        let dz = target_fixed_m[2] - site[2];
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// One-way light time to a Mars-fixed target (s).
    pub fn one_way_light_time_s(&self, target_fixed_m: [f64; 3]) -> f64 {
        self.range_to_m(target_fixed_m) / SPEED_OF_LIGHT_M_S
    }

    /// Initial great-circle bearing to another point (rad), clockwise from
    /// north, in [0, 2π).
    pub fn bearing_to_rad(&self, other: &GroundPoint) -> f64 {
        let dlon = other.lon_rad - self.lon_rad;
        let y = dlon.sin() * other.lat_rad.cos();
        let x = self.lat_rad.cos() * other.lat_rad.sin()
            - self.lat_rad.sin() * other.lat_rad.cos() * dlon.cos();
        crate::elements::normalize_angle(y.atan2(x))
    }

    /// The point reached by traveling a central angle along an initial
    /// bearing (direct spherical geodesic). Altitude is carried over.
    pub fn destination(&self, bearing_rad: f64, central_angle_rad: f64) -> GroundPoint {
        let (sin_lat, cos_lat) = self.lat_rad.sin_cos();
        let (sin_d, cos_d) = central_angle_rad.sin_cos();
        let sin_lat2 = (sin_lat * cos_d + cos_lat * sin_d * bearing_rad.cos()).clamp(-1.0, 1.0);
        let lat2 = sin_lat2.asin();
        let lon2 = self.lon_rad
            + (bearing_rad.sin() * sin_d * cos_lat).atan2(cos_d - sin_lat * sin_lat2);
        Self::new_canonical(lat2, lon2, self.alt_m)
    }
}

impl std::fmt::Display for GroundPoint {
    /// Cardinal-direction form, e.g. `18.4° N 77.5° E`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ns = if self.lat_rad >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lon_rad >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}° {} {:.4}° {}",
            self.latitude_deg().abs(),
            ns,
            self.longitude_deg().abs(),
            ew
        )
    }
}

/// Wrap an angle into [−π, π].
fn normalize_pm_pi(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a > std::f64::consts::PI {
        a - TAU
    } else {
        a
    }
}

/// Wrap a longitude into (−π, π].
fn normalize_lon(lon: f64) -> f64 {
    let l = lon.rem_euclid(TAU);
    if l > std::f64::consts::PI {
        l - TAU
    } else {
        l
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_crushing_altitude() {
        assert!(matches!(
            GroundPoint::new(0.0, 0.0, -R_MEAN_M),
            Err(DegenerateGeometryError::NonPositiveRadius { .. })
        ));
        // Just above the center is still constructible.
        assert!(GroundPoint::new(0.0, 0.0, -R_MEAN_M + 1.0).is_ok());
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(GroundPoint::new(f64::NAN, 0.0, 0.0).is_err());
        assert!(GroundPoint::new(0.0, f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_pole_reflection() {
        // 100° N is 80° N on the far meridian.
        let p = GroundPoint::from_deg(100.0, 10.0, 0.0).unwrap();
        assert_relative_eq!(p.latitude_deg(), 80.0, epsilon = 1e-9);
        assert_relative_eq!(p.longitude_deg(), -170.0, epsilon = 1e-9);
    }

    #[test]
    fn test_longitude_wrap() {
        let p = GroundPoint::from_deg(0.0, 270.0, 0.0).unwrap();
        assert_relative_eq!(p.longitude_deg(), -90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fixed_round_trip() {
        let p = GroundPoint::from_deg(-14.57, 175.47, 2_500.0).unwrap();
        let back = GroundPoint::from_fixed_m(p.to_fixed_m()).unwrap();
        assert_relative_eq!(back.latitude_rad(), p.latitude_rad(), epsilon = 1e-9);
        assert_relative_eq!(back.longitude_rad(), p.longitude_rad(), epsilon = 1e-9);
        assert_relative_eq!(back.altitude_m(), p.altitude_m(), epsilon = 1e-4);
    }

    #[test]
    fn test_local_frame_is_orthonormal() {
        let p = GroundPoint::from_deg(40.0, -70.0, 0.0).unwrap();
        let (up, east, north) = (p.local_up(), p.local_east(), p.local_north());
        for v in [up, east, north] {
            let mag = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert_relative_eq!(mag, 1.0, epsilon = 1e-12);
        }
        let dot = |a: [f64; 3], b: [f64; 3]| a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
        assert_relative_eq!(dot(up, east), 0.0, epsilon = 1e-12);
        assert_relative_eq!(dot(up, north), 0.0, epsilon = 1e-12);
        assert_relative_eq!(dot(east, north), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_central_angle_symmetry_and_identity() {
        let a = GroundPoint::from_deg(18.4, 77.5, 0.0).unwrap();
        let b = GroundPoint::from_deg(-4.5, 137.4, -4_500.0).unwrap();
        assert_relative_eq!(a.central_angle_rad(&b), b.central_angle_rad(&a), epsilon = 1e-15);
        assert_eq!(a.central_angle_rad(&a), 0.0);
    }

    #[test]
    fn test_central_angle_quarter_circle() {
        let equator = GroundPoint::from_deg(0.0, 0.0, 0.0).unwrap();
        let pole = GroundPoint::from_deg(90.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(
            equator.central_angle_rad(&pole),
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_surface_distance_uses_mean_altitude() {
        let a = GroundPoint::from_deg(0.0, 0.0, 2_000.0).unwrap();
        let b = GroundPoint::from_deg(0.0, 90.0, 4_000.0).unwrap();
        let expected = std::f64::consts::FRAC_PI_2 * (R_MEAN_M + 3_000.0);
        assert_relative_eq!(a.surface_distance_m(&b), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_elevation_of_overhead_target() {
        let p = GroundPoint::from_deg(0.0, 0.0, 0.0).unwrap();
        let overhead = [R_MEAN_M + 400_000.0, 0.0, 0.0];
        assert_relative_eq!(
            p.elevation_rad_to(overhead),
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_elevation_of_coincident_target_is_straight_down() {
        let p = GroundPoint::from_deg(10.0, 20.0, 0.0).unwrap();
        assert_eq!(
            p.elevation_rad_to(p.to_fixed_m()),
            -std::f64::consts::FRAC_PI_2
        );
    }

    #[test]
    fn test_bearing_due_east() {
        let a = GroundPoint::from_deg(0.0, 0.0, 0.0).unwrap();
        let b = GroundPoint::from_deg(0.0, 10.0, 0.0).unwrap();
        assert_relative_eq!(
            a.bearing_to_rad(&b),
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_destination_round_trip() {
        let a = GroundPoint::from_deg(22.3, -49.97, 0.0).unwrap();
        let b = GroundPoint::from_deg(-8.6, 30.2, 0.0).unwrap();
        let reached = a.destination(a.bearing_to_rad(&b), a.central_angle_rad(&b));
        assert_relative_eq!(reached.latitude_rad(), b.latitude_rad(), epsilon = 1e-9);
        assert_relative_eq!(reached.longitude_rad(), b.longitude_rad(), epsilon = 1e-9);
    }

    #[test]
    fn test_range_and_light_time() {
        let p = GroundPoint::from_deg(0.0, 0.0, 0.0).unwrap();
        let target = [R_MEAN_M + 299_792_458.0, 0.0, 0.0];
        assert_relative_eq!(p.range_to_m(target), 299_792_458.0, epsilon = 1e-3);
        assert_relative_eq!(p.one_way_light_time_s(target), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_display_cardinal_form() {
        let p = GroundPoint::from_deg(-14.5, 175.4, 0.0).unwrap();
        let s = format!("{p}");
        assert!(s.contains('S') && s.contains('E'), "got {s}");
    }

    #[test]
    fn test_serde_rejects_crushing_altitude() {
        let json = format!("{{\"lat_rad\":0.0,\"lon_rad\":0.0,\"alt_m\":{}}}", -2.0 * R_MEAN_M);
        assert!(serde_json::from_str::<GroundPoint>(&json).is_err());
    }
}
