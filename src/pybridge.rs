//! Python bindings via PyO3 for AREOLINK.
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::constants;
use crate::elements::OrbitalElements;
use crate::epoch::Epoch;
use crate::ground::GroundPoint;
use crate::propagator::TwoBodyPropagator;
use crate::visibility;

fn value_err<E: std::fmt::Display>(e: E) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(e.to_string())
}

// OrbitalElements
#[pyclass(name = "OrbitalElements")]
#[derive(Clone)]
pub struct PyOrbitalElements {
    pub(crate) inner: OrbitalElements,
}

#[pymethods]
impl PyOrbitalElements {
    /// Elements from kilometers/degrees and an epoch in seconds past J2000.
    #[new]
    fn new(
        a_km: f64,
        e: f64,
        i_deg: f64,
        raan_deg: f64,
        aop_deg: f64,
        m0_deg: f64,
        epoch_s: f64,
    ) -> PyResult<Self> {
        OrbitalElements::from_km_deg(
            a_km,
            e,
            i_deg,
            raan_deg,
            aop_deg,
            m0_deg,
            Epoch::from_seconds(epoch_s),
        )
        .map(|inner| PyOrbitalElements { inner })
        .map_err(value_err)
    }

    /// The ideal equatorial areostationary orbit.
    #[staticmethod]
    fn areostationary(epoch_s: f64) -> Self {
        PyOrbitalElements {
            inner: OrbitalElements::areostationary(Epoch::from_seconds(epoch_s)),
        }
    }

    fn period_s(&self) -> f64 {
        self.inner.period_s()
    }

    fn mean_motion(&self) -> f64 {
        self.inner.mean_motion()
    }

    fn mean_anomaly_at(&self, t_s: f64) -> f64 {
        self.inner.mean_anomaly_at(Epoch::from_seconds(t_s))
    }

    fn shift_epoch(&self, t_s: f64) -> Self {
        PyOrbitalElements {
            inner: self.inner.shift_epoch(Epoch::from_seconds(t_s)),
        }
    }

    #[getter] fn a_km(&self) -> f64 { self.inner.semi_major_axis_m() / 1000.0 }
    #[getter] fn e(&self) -> f64 { self.inner.eccentricity() }
    #[getter] fn i_deg(&self) -> f64 { self.inner.inclination_deg() }
    #[getter] fn raan_deg(&self) -> f64 { self.inner.raan_rad() * constants::RAD2DEG }
    #[getter] fn aop_deg(&self) -> f64 { self.inner.argument_of_periapsis_rad() * constants::RAD2DEG }
    #[getter] fn m0_deg(&self) -> f64 { self.inner.mean_anomaly_at_epoch_rad() * constants::RAD2DEG }
    #[getter] fn epoch_s(&self) -> f64 { self.inner.epoch().to_seconds() }

    fn __repr__(&self) -> String {
        format!(
            "OrbitalElements(a={:.3} km, e={:.6}, i={:.4}°, RAAN={:.4}°, AoP={:.4}°, M0={:.4}°)",
            self.a_km(),
            self.e(),
            self.i_deg(),
            self.raan_deg(),
            self.aop_deg(),
            self.m0_deg(),
        )
    }
}

// GroundPoint
#[pyclass(name = "GroundPoint")]
#[derive(Clone)]
pub struct PyGroundPoint {
    pub(crate) inner: GroundPoint,
}

#[pymethods]
impl PyGroundPoint {
    #[new]
    #[pyo3(signature = (lat_deg, lon_deg, alt_m=0.0))]
    fn new(lat_deg: f64, lon_deg: f64, alt_m: f64) -> PyResult<Self> {
        GroundPoint::from_deg(lat_deg, lon_deg, alt_m)
            .map(|inner| PyGroundPoint { inner })
            .map_err(value_err)
    }

    fn central_angle_rad(&self, other: &PyGroundPoint) -> f64 {
        self.inner.central_angle_rad(&other.inner)
    }

    fn surface_distance_m(&self, other: &PyGroundPoint) -> f64 {
        self.inner.surface_distance_m(&other.inner)
    }

    fn bearing_to_rad(&self, other: &PyGroundPoint) -> f64 {
        self.inner.bearing_to_rad(&other.inner)
    }

    /// Mars-fixed Cartesian position [x, y, z] in meters.
    fn to_fixed_m(&self) -> Vec<f64> {
        self.inner.to_fixed_m().to_vec()
    }

    #[getter] fn lat_deg(&self) -> f64 { self.inner.latitude_deg() }
    #[getter] fn lon_deg(&self) -> f64 { self.inner.longitude_deg() }
    #[getter] fn alt_m(&self) -> f64 { self.inner.altitude_m() }

    fn __repr__(&self) -> String {
        format!("GroundPoint({})", self.inner)
    }
}

// Propagator
#[pyclass(name = "TwoBodyPropagator")]
pub struct PyPropagator {
    inner: TwoBodyPropagator,
}

#[pymethods]
impl PyPropagator {
    /// Create a propagator; `mu` defaults to the Mars gravitational
    /// parameter.
    #[new]
    #[pyo3(signature = (elements, mu=None))]
    fn new(elements: &PyOrbitalElements, mu: Option<f64>) -> PyResult<Self> {
        let mut prop = TwoBodyPropagator::new(elements.inner);
        if let Some(mu) = mu {
            prop = prop.with_mu(mu).map_err(value_err)?;
        }
        Ok(PyPropagator { inner: prop })
    }

    /// Inertial state at `t_s` seconds past J2000:
    /// [x, y, z, vx, vy, vz] in meters and meters/second.
    fn propagate_inertial(&self, t_s: f64) -> Vec<f64> {
        let sv = self.inner.propagate_inertial(Epoch::from_seconds(t_s));
        vec![sv.r_m[0], sv.r_m[1], sv.r_m[2], sv.v_mps[0], sv.v_mps[1], sv.v_mps[2]]
    }

    /// Mars-fixed state at `t_s` seconds past J2000.
    fn propagate_fixed(&self, t_s: f64) -> Vec<f64> {
        let sv = self.inner.propagate_fixed(Epoch::from_seconds(t_s));
        vec![sv.r_m[0], sv.r_m[1], sv.r_m[2], sv.v_mps[0], sv.v_mps[1], sv.v_mps[2]]
    }

    fn subsatellite_point(&self, t_s: f64) -> PyGroundPoint {
        PyGroundPoint {
            inner: self.inner.subsatellite_point(Epoch::from_seconds(t_s)),
        }
    }

    /// Link geometry from a ground point at time `t_s`, as a dict.
    fn link_geometry(
        &self,
        ground: &PyGroundPoint,
        t_s: f64,
        min_elevation_rad: f64,
        py: Python<'_>,
    ) -> PyResult<Py<PyDict>> {
        let t = Epoch::from_seconds(t_s);
        let state = self.inner.propagate_fixed(t);
        let subsat = self.inner.subsatellite_point(t);
        let link = visibility::evaluate_with_subsatellite(
            &ground.inner,
            state.r_m,
            &subsat,
            min_elevation_rad,
        );
        let dict = PyDict::new_bound(py);
        dict.set_item("visible", link.visible)?;
        dict.set_item("elevation_rad", link.elevation_rad)?;
        dict.set_item("range_m", link.range_m)?;
        dict.set_item("one_way_light_time_s", link.one_way_light_time_s)?;
        dict.set_item("central_angle_rad", link.central_angle_rad)?;
        dict.set_item("subsatellite_lat_deg", link.subsatellite.latitude_deg())?;
        dict.set_item("subsatellite_lon_deg", link.subsatellite.longitude_deg())?;
        Ok(dict.into())
    }
}

// Free functions
#[pyfunction]
fn horizon_half_angle_rad(radius_m: f64, altitude_m: f64) -> f64 {
    visibility::horizon_half_angle_rad(radius_m, altitude_m)
}

#[pyfunction]
fn fspl_db(range_m: f64, frequency_hz: f64) -> f64 {
    visibility::fspl_db(range_m, frequency_hz)
}

#[pyfunction]
fn footprint_circle(
    subsatellite: &PyGroundPoint,
    sat_altitude_m: f64,
    samples: usize,
) -> PyResult<Vec<PyGroundPoint>> {
    visibility::footprint_circle(&subsatellite.inner, sat_altitude_m, samples)
        .map(|ring| ring.into_iter().map(|inner| PyGroundPoint { inner }).collect())
        .map_err(value_err)
}

// Module registration
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyOrbitalElements>()?;
    m.add_class::<PyGroundPoint>()?;
    m.add_class::<PyPropagator>()?;
    m.add_function(wrap_pyfunction!(horizon_half_angle_rad, m)?)?;
    m.add_function(wrap_pyfunction!(fspl_db, m)?)?;
    m.add_function(wrap_pyfunction!(footprint_circle, m)?)?;
    m.add("MU_MARS", constants::MU_MARS)?;
    m.add("R_MEAN_M", constants::R_MEAN_M)?;
    m.add("SIDEREAL_DAY_S", constants::SIDEREAL_DAY_S)?;
    m.add(
        "AREOSTATIONARY_SEMI_MAJOR_AXIS_M",
        constants::areostationary().semi_major_axis_m,
    )?;
    Ok(())
}
