//! Common test fixtures for ensemble field tests.
//!
//! This module provides pre-defined grids, names and packing parameters
//! that match the ensemble NetCDF convention.

/// Common ensemble grid specifications for testing.
pub mod grid {
    /// 10x10 grid, 2 members, 2 time steps
    pub const SIMPLE_10X10: EnsembleGridSpec = EnsembleGridSpec {
        n_time: 2,
        n_ens: 2,
        n_lat: 10,
        n_lon: 10,
        first_lat: 55.0,
        first_lon: 5.0,
        step: 0.5,
    };

    /// Non-square grid, useful to catch swapped latitude/longitude axes
    pub const NARROW_3X7: EnsembleGridSpec = EnsembleGridSpec {
        n_time: 3,
        n_ens: 4,
        n_lat: 3,
        n_lon: 7,
        first_lat: 58.0,
        first_lon: 2.0,
        step: 0.25,
    };

    /// Ensemble grid specification for testing.
    #[derive(Debug, Clone, Copy)]
    pub struct EnsembleGridSpec {
        pub n_time: usize,
        pub n_ens: usize,
        pub n_lat: usize,
        pub n_lon: usize,
        pub first_lat: f32,
        pub first_lon: f32,
        /// Spacing in degrees along both axes
        pub step: f32,
    }

    impl EnsembleGridSpec {
        /// Values in one `(ensemble, lat, lon)` block.
        pub fn block_len(&self) -> usize {
            self.n_ens * self.n_lat * self.n_lon
        }

        /// Values in a `(time, ensemble, lat, lon)` variable.
        pub fn variable_len(&self) -> usize {
            self.n_time * self.block_len()
        }

        /// Field shape `[n_lat, n_lon, n_ens]`.
        pub fn field_shape(&self) -> [usize; 3] {
            [self.n_lat, self.n_lon, self.n_ens]
        }

        pub fn latitudes(&self) -> Vec<f32> {
            crate::generators::coordinate_axis(self.first_lat, self.step, self.n_lat)
        }

        pub fn longitudes(&self) -> Vec<f32> {
            crate::generators::coordinate_axis(self.first_lon, self.step, self.n_lon)
        }
    }
}

/// Names used by the EC ensemble convention.
pub mod names {
    pub const TIME: &str = "time";
    pub const ENSEMBLE: &str = "ensemble_member";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const SURFACE: &str = "surface";
    pub const ALTITUDE: &str = "altitude";

    pub const TEMPERATURE: &str = "t";
    pub const PRECIPITATION: &str = "precipitation_amount";
    pub const PRECIPITATION_ACC: &str = "precipitation_amount_acc";
    pub const CLOUD: &str = "cloud_area_fraction";

    /// Dimensions of a time-varying field without a surface axis.
    pub const FIELD_DIMS: [&str; 4] = [TIME, ENSEMBLE, LATITUDE, LONGITUDE];
}

/// Typical packing parameters as `(scale_factor, add_offset, sentinel)`.
pub mod packing {
    /// Unpacked float with a -999 sentinel
    pub const PLAIN: (f32, f32, f32) = (1.0, 0.0, -999.0);

    /// Temperature in Kelvin packed into short integers
    pub const TEMPERATURE_SHORT: (f32, f32, f32) = (0.01, 273.15, -32767.0);
}
