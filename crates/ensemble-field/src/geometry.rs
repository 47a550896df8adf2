//! File geometry: extents plus the latitude, longitude and elevation grids.

use ndarray::Array2;

use crate::config::{DimensionNames, FieldConfig};
use crate::error::{FieldError, Result};
use crate::grid::read_lat_lon;
use crate::store::{read_all, ArrayStore};

/// Extents and coordinate grids of one file, fixed at open.
///
/// All three grids are `(n_lat, n_lon)`, the same as the first two axes of
/// every [`Field`](crate::Field) read from the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    n_time: usize,
    n_ens: usize,
    n_lat: usize,
    n_lon: usize,
    latitudes: Array2<f32>,
    longitudes: Array2<f32>,
    elevations: Array2<f32>,
}

fn dimension<S: ArrayStore + ?Sized>(store: &S, name: &str) -> Result<usize> {
    store
        .dimension_len(name)
        .ok_or_else(|| FieldError::missing_dimension(store.label(), name))
}

/// Expand a coordinate variable to a full grid.
///
/// A 1-D array of length `axis_len` is replicated along the other axis
/// (`along_lat` selects which axis it varies on). An array that already
/// holds `n_lat * n_lon` values is taken as is.
fn coordinate_grid<S: ArrayStore + ?Sized>(
    store: &S,
    name: &str,
    n_lat: usize,
    n_lon: usize,
    along_lat: bool,
) -> Result<Array2<f32>> {
    let values = read_all(store, name)?;
    let axis_len = if along_lat { n_lat } else { n_lon };
    if values.len() == axis_len {
        let grid = Array2::from_shape_fn((n_lat, n_lon), |(i, j)| {
            if along_lat {
                values[i]
            } else {
                values[j]
            }
        });
        return Ok(grid);
    }
    if values.len() == n_lat * n_lon {
        return read_lat_lon(store, name, n_lat, n_lon);
    }
    Err(FieldError::ShapeMismatch {
        file: store.label().to_string(),
        variable: name.to_string(),
        expected: axis_len,
        actual: values.len(),
    })
}

impl Geometry {
    /// Read extents and coordinate grids from `store`.
    ///
    /// Any absent dimension or coordinate variable is an error: nothing read
    /// afterwards could be placed correctly.
    pub fn resolve<S: ArrayStore + ?Sized>(store: &S, config: &FieldConfig) -> Result<Self> {
        let dims = &config.dimensions;
        let n_time = dimension(store, &dims.time)?;
        let n_ens = dimension(store, &dims.ensemble)?;
        let n_lat = dimension(store, &dims.latitude)?;
        let n_lon = dimension(store, &dims.longitude)?;

        let coords = &config.coordinates;
        let latitudes = coordinate_grid(store, &coords.latitude, n_lat, n_lon, true)?;
        let longitudes = coordinate_grid(store, &coords.longitude, n_lat, n_lon, false)?;
        let elevations = read_lat_lon(store, &coords.elevation, n_lat, n_lon)?;

        let geometry = Self {
            n_time,
            n_ens,
            n_lat,
            n_lon,
            latitudes,
            longitudes,
            elevations,
        };
        tracing::info!(
            file = store.label(),
            dimensions = %geometry.dimension_summary(dims),
            "Resolved file geometry"
        );
        Ok(geometry)
    }

    pub fn n_time(&self) -> usize {
        self.n_time
    }

    pub fn n_ens(&self) -> usize {
        self.n_ens
    }

    pub fn n_lat(&self) -> usize {
        self.n_lat
    }

    pub fn n_lon(&self) -> usize {
        self.n_lon
    }

    /// Latitude of every grid point.
    pub fn latitudes(&self) -> &Array2<f32> {
        &self.latitudes
    }

    /// Longitude of every grid point.
    pub fn longitudes(&self) -> &Array2<f32> {
        &self.longitudes
    }

    /// Elevation of every grid point.
    pub fn elevations(&self) -> &Array2<f32> {
        &self.elevations
    }

    /// Shape of a field, `[n_lat, n_lon, n_ens]`.
    pub fn field_shape(&self) -> [usize; 3] {
        [self.n_lat, self.n_lon, self.n_ens]
    }

    /// Values in one time step of one variable.
    pub fn block_len(&self) -> usize {
        self.n_ens * self.n_lat * self.n_lon
    }

    /// E.g. `time=2, ensemble_member=2, latitude=10, longitude=10`.
    pub fn dimension_summary(&self, names: &DimensionNames) -> String {
        format!(
            "{}={}, {}={}, {}={}, {}={}",
            names.time,
            self.n_time,
            names.ensemble,
            self.n_ens,
            names.latitude,
            self.n_lat,
            names.longitude,
            self.n_lon
        )
    }
}
