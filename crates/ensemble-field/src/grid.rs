//! Access to static `(latitude, longitude)` shaped variables.

use ndarray::Array2;

use crate::error::{FieldError, Result};
use crate::geometry::Geometry;
use crate::store::{read_all, ArrayStore};

/// Read `name` as an `(n_lat, n_lon)` grid.
///
/// The variable must hold exactly `n_lat * n_lon` values; leading singleton
/// axes are fine, anything else is a shape mismatch.
pub(crate) fn read_lat_lon<S: ArrayStore + ?Sized>(
    store: &S,
    name: &str,
    n_lat: usize,
    n_lon: usize,
) -> Result<Array2<f32>> {
    let expected = n_lat * n_lon;
    let actual = store
        .variable_len(name)
        .ok_or_else(|| FieldError::missing_variable(store.label(), name))?;
    if actual != expected {
        return Err(FieldError::ShapeMismatch {
            file: store.label().to_string(),
            variable: name.to_string(),
            expected,
            actual,
        });
    }
    let values = read_all(store, name)?;
    Array2::from_shape_vec((n_lat, n_lon), values).map_err(|e| {
        FieldError::storage(store.label(), format!("reshaping '{}': {}", name, e))
    })
}

/// Read any per-gridpoint static variable (coordinates, elevation, land
/// fraction, ...) as a grid shaped like the file's fields.
pub fn read_grid<S: ArrayStore + ?Sized>(
    store: &S,
    geometry: &Geometry,
    name: &str,
) -> Result<Array2<f32>> {
    read_lat_lon(store, name, geometry.n_lat(), geometry.n_lon())
}
