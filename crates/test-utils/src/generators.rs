//! Test data generators for creating synthetic ensemble data.
//!
//! Blocks are flat `Vec<f32>` in storage order: ensemble member slowest,
//! then latitude, then longitude.

/// Creates an ensemble block with predictable values.
///
/// Each value is calculated as: `member * 10000 + lat * 100 + lon`
///
/// This makes it easy to verify that the storage order is respected by
/// checking that field[(lat, lon, member)] == member * 10000 + lat * 100 + lon.
///
/// # Example
///
/// ```
/// use test_utils::create_index_block;
///
/// let block = create_index_block(2, 3, 4);
/// assert_eq!(block.len(), 24);
/// assert_eq!(block[1], 1.0);      // member 0, lat 0, lon 1
/// assert_eq!(block[4], 100.0);    // member 0, lat 1, lon 0
/// assert_eq!(block[12], 10000.0); // member 1, lat 0, lon 0
/// ```
pub fn create_index_block(n_ens: usize, n_lat: usize, n_lon: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(n_ens * n_lat * n_lon);
    for member in 0..n_ens {
        for lat in 0..n_lat {
            for lon in 0..n_lon {
                data.push((member * 10000 + lat * 100 + lon) as f32);
            }
        }
    }
    data
}

/// Creates an ensemble block with temperature-like values in Kelvin.
///
/// A 250K to 310K gradient across the grid, shifted by 0.5K per member so
/// members are distinguishable.
pub fn create_temperature_block(n_ens: usize, n_lat: usize, n_lon: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(n_ens * n_lat * n_lon);
    for member in 0..n_ens {
        for lat in 0..n_lat {
            for lon in 0..n_lon {
                let x_factor = lon as f32 / n_lon.max(1) as f32;
                let y_factor = lat as f32 / n_lat.max(1) as f32;
                let temp = 250.0 + (x_factor * 30.0) + (y_factor * 30.0) + member as f32 * 0.5;
                data.push(temp);
            }
        }
    }
    data
}

/// Creates a block with every value set to `value`.
pub fn create_constant_block(n_ens: usize, n_lat: usize, n_lon: usize, value: f32) -> Vec<f32> {
    vec![value; n_ens * n_lat * n_lon]
}

/// Replaces every `interval`-th value (starting at 0) with `sentinel`.
///
/// # Panics
///
/// Panics if `interval` is zero.
pub fn with_sentinel_every(mut data: Vec<f32>, interval: usize, sentinel: f32) -> Vec<f32> {
    assert!(interval > 0, "interval must be positive");
    for value in data.iter_mut().step_by(interval) {
        *value = sentinel;
    }
    data
}

/// Evenly spaced coordinate values: `first, first + step, ...`.
pub fn coordinate_axis(first: f32, step: f32, len: usize) -> Vec<f32> {
    (0..len).map(|i| first + step * i as f32).collect()
}

/// Packs physical values with `raw = (physical - offset) / scale`.
pub fn pack_values(physical: &[f32], scale: f32, offset: f32) -> Vec<f32> {
    physical.iter().map(|v| (v - offset) / scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_block_order() {
        let block = create_index_block(2, 2, 3);
        assert_eq!(block.len(), 12);
        assert_eq!(block[0], 0.0);
        assert_eq!(block[2], 2.0);
        assert_eq!(block[3], 100.0);
        assert_eq!(block[6], 10000.0);
        assert_eq!(block[11], 10102.0);
    }

    #[test]
    fn test_temperature_block_range() {
        let block = create_temperature_block(3, 10, 10);
        assert_eq!(block.len(), 300);
        for &t in &block {
            assert!((250.0..=311.0).contains(&t), "temperature {} out of range", t);
        }
        // Same grid point, next member
        assert_eq!(block[100] - block[0], 0.5);
    }

    #[test]
    fn test_with_sentinel_every() {
        let data = with_sentinel_every(create_constant_block(1, 2, 3, 1.0), 2, -999.0);
        assert_eq!(data, vec![-999.0, 1.0, -999.0, 1.0, -999.0, 1.0]);
    }

    #[test]
    fn test_coordinate_axis() {
        let axis = coordinate_axis(60.0, 0.5, 4);
        assert_eq!(axis, vec![60.0, 60.5, 61.0, 61.5]);
        assert!(coordinate_axis(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_pack_values() {
        let raw = pack_values(&[255.0, 250.0], 0.1, 250.0);
        assert!((raw[0] - 50.0).abs() < 1e-3);
        assert_eq!(raw[1], 0.0);
    }
}
