//! Storage engine contract and its adapters.
//!
//! The access layer never talks to a file format directly. It goes through
//! [`ArrayStore`], which exposes the handful of primitives a self-describing
//! array file offers: dimension lookup, variable lookup, strided typed
//! reads and writes, attribute lookup and variable creation.

mod memory;
mod netcdf;

pub use memory::MemoryStore;
pub use self::netcdf::{silence_hdf5_errors, NetcdfStore};

use crate::error::Result;

/// Default fill value of a NetCDF `float` variable (`NC_FILL_FLOAT`).
pub const NC_FILL_FLOAT: f32 = 9.969_209_968_386_869e36;

/// Primitive operations of a multi-dimensional array store.
///
/// `start` and `count` give one entry per variable dimension, slowest-varying
/// first. Values are exchanged as flat row-major `f32` buffers.
pub trait ArrayStore {
    /// Human-readable location of the store, used in diagnostics.
    fn label(&self) -> &str;

    /// Whether the store accepts writes.
    fn is_writable(&self) -> bool {
        true
    }

    /// Length of a dimension, or `None` if it does not exist.
    fn dimension_len(&self, name: &str) -> Option<usize>;

    /// Whether a variable exists.
    fn has_variable(&self, name: &str) -> bool;

    /// Dimension names of a variable, or `None` if it does not exist.
    fn variable_dimensions(&self, name: &str) -> Option<Vec<String>>;

    /// Total element count of a variable, or `None` if it does not exist.
    fn variable_len(&self, name: &str) -> Option<usize>;

    /// Read a hyperslab of a variable as `f32`.
    fn read_f32(&self, name: &str, start: &[usize], count: &[usize]) -> Result<Vec<f32>>;

    /// Numeric attribute of a variable. `Ok(None)` if the attribute is absent.
    fn attribute_f32(&self, name: &str, attribute: &str) -> Result<Option<f32>>;

    /// Add a dimension.
    fn create_dimension(&mut self, name: &str, len: usize) -> Result<()>;

    /// Add an `f32` variable over existing dimensions.
    fn create_variable_f32(&mut self, name: &str, dimensions: &[&str]) -> Result<()>;

    /// Set a numeric attribute on a variable.
    fn put_attribute_f32(&mut self, name: &str, attribute: &str, value: f32) -> Result<()>;

    /// Write a hyperslab of a variable.
    fn write_f32(
        &mut self,
        name: &str,
        start: &[usize],
        count: &[usize],
        values: &[f32],
    ) -> Result<()>;
}

/// Read every element of a variable.
pub(crate) fn read_all<S: ArrayStore + ?Sized>(store: &S, name: &str) -> Result<Vec<f32>> {
    let dims = store
        .variable_dimensions(name)
        .ok_or_else(|| crate::FieldError::missing_variable(store.label(), name))?;
    let count = dims
        .iter()
        .map(|dim| {
            store
                .dimension_len(dim)
                .ok_or_else(|| crate::FieldError::missing_dimension(store.label(), dim.as_str()))
        })
        .collect::<Result<Vec<_>>>()?;
    let start = vec![0; count.len()];
    store.read_f32(name, &start, &count)
}
