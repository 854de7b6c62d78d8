//! Batch sweeps over time and station networks.
//!
//! Composes the propagator and the visibility queries into the shapes the
//! surrounding simulation consumes: sampled ground tracks for map overlays,
//! whole-network link snapshots, and rise/set access windows for a single
//! station.

use serde::{Deserialize, Serialize};

use crate::epoch::Epoch;
use crate::error::InvalidParameterError;
use crate::ground::GroundPoint;
use crate::propagator::TwoBodyPropagator;
use crate::visibility::{evaluate_with_subsatellite, LinkGeometry};

/// One sampled point of a ground track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Sample instant.
    pub epoch: Epoch,
    /// Sub-object point at that instant.
    pub point: GroundPoint,
}

/// A contiguous interval during which a station sees the orbiter above its
/// elevation mask.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccessWindow {
    /// Start of visibility (clipped to the scan start if already visible).
    pub rise: Epoch,
    /// End of visibility (clipped to the scan end if still visible).
    pub set: Epoch,
    /// Highest sampled elevation inside the window (rad).
    pub max_elevation_rad: f64,
}

impl AccessWindow {
    /// Window length (seconds).
    pub fn duration_s(&self) -> f64 {
        self.set.duration_since(&self.rise)
    }
}

/// Sample the sub-object track over `[start, start + duration_s]` at a
/// fixed step. The final sample always lands on the interval end.
pub fn sample_ground_track(
    prop: &TwoBodyPropagator,
    start: Epoch,
    duration_s: f64,
    step_s: f64,
) -> Result<Vec<TrackPoint>, InvalidParameterError> {
    if !step_s.is_finite() || step_s <= 0.0 {
        return Err(InvalidParameterError::TimeStep(step_s));
    }
    let n_steps = (duration_s / step_s).ceil() as usize;
    let mut track = Vec::with_capacity(n_steps + 1);
    for i in 0..=n_steps {
        let t = start.add_seconds((i as f64 * step_s).min(duration_s));
        track.push(TrackPoint {
            epoch: t,
            point: prop.subsatellite_point(t),
        });
    }
    Ok(track)
}

/// Evaluate link geometry from every station of a network to one orbiter
/// at a single instant, in parallel.
pub fn evaluate_network(
    prop: &TwoBodyPropagator,
    stations: &[(String, GroundPoint)],
    t: Epoch,
    min_elevation_rad: f64,
) -> Vec<(String, LinkGeometry)> {
    use rayon::prelude::*;

    let state = prop.propagate_fixed(t);
    let subsatellite = prop.subsatellite_point(t);

    stations
        .par_iter()
        .map(|(name, ground)| {
            let link =
                evaluate_with_subsatellite(ground, state.r_m, &subsatellite, min_elevation_rad);
            (name.clone(), link)
        })
        .collect()
}

/// Scan `[start, start + duration_s]` for intervals where `station` sees
/// the orbiter at or above `min_elevation_rad`.
///
/// Crossings between samples are refined by bisection to millisecond
/// resolution; the reported maximum elevation is taken at the sample
/// cadence, so a coarse `step_s` coarsens it accordingly.
pub fn access_windows(
    prop: &TwoBodyPropagator,
    station: &GroundPoint,
    start: Epoch,
    duration_s: f64,
    step_s: f64,
    min_elevation_rad: f64,
) -> Result<Vec<AccessWindow>, InvalidParameterError> {
    if !step_s.is_finite() || step_s <= 0.0 {
        return Err(InvalidParameterError::TimeStep(step_s));
    }

    let elevation_at = |t: Epoch| station.elevation_rad_to(prop.propagate_fixed(t).r_m);
    let end = start.add_seconds(duration_s.max(0.0));

    let mut windows = Vec::new();
    let mut t_prev = start;
    let first_elevation = elevation_at(start);
    let mut above_prev = first_elevation >= min_elevation_rad;
    let mut rise = if above_prev { Some(start) } else { None };
    let mut max_elevation = if above_prev {
        first_elevation
    } else {
        f64::NEG_INFINITY
    };

    let n_steps = (duration_s.max(0.0) / step_s).ceil() as usize;
    for i in 1..=n_steps {
        let t = start.add_seconds((i as f64 * step_s).min(duration_s));
        let elevation = elevation_at(t);
        let above = elevation >= min_elevation_rad;

        if above {
            max_elevation = max_elevation.max(elevation);
        }
        if above != above_prev {
            let crossing = refine_crossing(&elevation_at, t_prev, t, min_elevation_rad, above);
            if above {
                rise = Some(crossing);
            } else if let Some(r) = rise.take() {
                windows.push(AccessWindow {
                    rise: r,
                    set: crossing,
                    max_elevation_rad: max_elevation,
                });
                max_elevation = f64::NEG_INFINITY;
            }
        }
        t_prev = t;
        above_prev = above;
    }

    // Still visible at scan end: close the window there.
    if let Some(r) = rise {
        windows.push(AccessWindow {
            rise: r,
            set: end,
            max_elevation_rad: max_elevation,
        });
    }
    Ok(windows)
}

/// Bisect a visibility transition inside `(lo, hi)` down to 1 ms.
/// `rising` tells which side of the mask the upper endpoint is on.
fn refine_crossing(
    elevation_at: &impl Fn(Epoch) -> f64,
    mut lo: Epoch,
    mut hi: Epoch,
    min_elevation_rad: f64,
    rising: bool,
) -> Epoch {
    for _ in 0..60 {
        if hi.duration_since(&lo) < 1e-3 {
            break;
        }
        let mid = lo.add_seconds(hi.duration_since(&lo) / 2.0);
        let above = elevation_at(mid) >= min_elevation_rad;
        if above == rising {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::elements::OrbitalElements;
    use approx::assert_relative_eq;

    fn low_equatorial() -> TwoBodyPropagator {
        // ~1,110 km circular equatorial orbit, initially over 0° longitude.
        let el =
            OrbitalElements::from_km_deg(4_500.0, 0.0, 0.0, 0.0, 0.0, 0.0, Epoch::J2000).unwrap();
        TwoBodyPropagator::new(el)
    }

    #[test]
    fn test_track_rejects_bad_step() {
        let prop = low_equatorial();
        assert!(matches!(
            sample_ground_track(&prop, Epoch::J2000, 100.0, 0.0),
            Err(InvalidParameterError::TimeStep(_))
        ));
    }

    #[test]
    fn test_track_sample_count_and_endpoints() {
        let prop = low_equatorial();
        let track = sample_ground_track(&prop, Epoch::J2000, 600.0, 60.0).unwrap();
        assert_eq!(track.len(), 11);
        assert_eq!(track[0].epoch, Epoch::J2000);
        assert_relative_eq!(
            track.last().unwrap().epoch.to_seconds(),
            600.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_areostationary_track_is_a_point() {
        let prop = TwoBodyPropagator::new(OrbitalElements::areostationary(Epoch::J2000));
        let track = sample_ground_track(&prop, Epoch::J2000, SIDEREAL_DAY_S, 3_600.0).unwrap();
        let lon0 = track[0].point.longitude_rad();
        for tp in &track {
            assert_relative_eq!(tp.point.longitude_rad(), lon0, epsilon = 1e-6);
            assert_relative_eq!(tp.point.latitude_rad(), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_network_snapshot_splits_near_and_far_stations() {
        let prop = TwoBodyPropagator::new(OrbitalElements::areostationary(Epoch::J2000));
        let stations = vec![
            (
                "subsat".to_string(),
                GroundPoint::from_deg(0.0, 0.0, 0.0).unwrap(),
            ),
            (
                "farside".to_string(),
                GroundPoint::from_deg(0.0, 180.0, 0.0).unwrap(),
            ),
        ];
        let links = evaluate_network(&prop, &stations, Epoch::J2000, 0.0);
        assert_eq!(links.len(), 2);
        let by_name: std::collections::HashMap<_, _> =
            links.into_iter().collect();
        assert!(by_name["subsat"].visible);
        assert!(!by_name["farside"].visible);
    }

    #[test]
    fn test_areostationary_access_is_one_continuous_window() {
        let prop = TwoBodyPropagator::new(OrbitalElements::areostationary(Epoch::J2000));
        let station = GroundPoint::from_deg(0.0, 0.0, 0.0).unwrap();
        let windows =
            access_windows(&prop, &station, Epoch::J2000, 2.0 * SIDEREAL_DAY_S, 600.0, 0.0)
                .unwrap();
        assert_eq!(windows.len(), 1);
        let w = &windows[0];
        assert_eq!(w.rise, Epoch::J2000);
        assert_relative_eq!(w.duration_s(), 2.0 * SIDEREAL_DAY_S, epsilon = 1e-6);
        assert_relative_eq!(
            w.max_elevation_rad,
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_low_orbit_rise_and_set_land_on_the_mask() {
        let prop = low_equatorial();
        let station = GroundPoint::from_deg(0.0, 0.0, 0.0).unwrap();
        let mask = 5.0 * DEG2RAD;
        let windows =
            access_windows(&prop, &station, Epoch::J2000, 25_000.0, 60.0, mask).unwrap();

        // Synodic period ~10,200 s with ~2,000 s of visibility per pass.
        assert!(windows.len() >= 2, "got {} windows", windows.len());
        let elevation_at =
            |t: Epoch| station.elevation_rad_to(prop.propagate_fixed(t).r_m);
        for w in &windows {
            assert!(w.set > w.rise);
            assert!(w.max_elevation_rad >= mask);
            // Interior crossings sit on the mask; the first window opened
            // mid-pass at the scan start.
            if w.rise != Epoch::J2000 {
                assert_relative_eq!(elevation_at(w.rise), mask, epsilon = 1e-4);
            }
        }
    }
}
