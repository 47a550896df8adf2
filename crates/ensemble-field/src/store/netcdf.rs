//! [`ArrayStore`] backed by the native netcdf library.
//!
//! Files are opened either read-only or in append mode. Both go straight
//! through libnetcdf (and HDF5 for NetCDF-4 files); nothing is buffered on
//! the Rust side, so a block handed to [`ArrayStore::write_f32`] is in the
//! library's hands when the call returns and on disk once the store drops.

use std::path::Path;
use std::sync::Once;

use netcdf::Extent;

use super::ArrayStore;
use crate::error::{FieldError, Result};

/// Silence HDF5's automatic error printing to stderr.
///
/// Probing for optional attributes such as `scale_factor` makes the HDF5 C
/// library print diagnostics like
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// even though the absence is handled. This disables that output by calling
/// H5Eset_auto2 with null handlers. Safe to call any number of times; only the
/// first call has an effect. [`NetcdfStore`] calls it before opening a file.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a
        // documented way to disable automatic error printing.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

enum Handle {
    ReadOnly(netcdf::File),
    Append(netcdf::FileMut),
}

/// A NetCDF file opened through the netcdf crate.
pub struct NetcdfStore {
    path: String,
    handle: Handle,
}

impl std::fmt::Debug for NetcdfStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetcdfStore")
            .field("path", &self.path)
            .field("writable", &self.is_writable())
            .finish()
    }
}

impl NetcdfStore {
    /// Open an existing file read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        silence_hdf5_errors();
        let label = path.as_ref().display().to_string();
        let file = netcdf::open(path.as_ref()).map_err(|e| FieldError::storage(&label, e))?;
        Ok(Self {
            path: label,
            handle: Handle::ReadOnly(file),
        })
    }

    /// Open an existing file for reading and writing.
    pub fn append(path: impl AsRef<Path>) -> Result<Self> {
        silence_hdf5_errors();
        let label = path.as_ref().display().to_string();
        let file = netcdf::append(path.as_ref()).map_err(|e| FieldError::storage(&label, e))?;
        Ok(Self {
            path: label,
            handle: Handle::Append(file),
        })
    }

    fn file(&self) -> &netcdf::File {
        match &self.handle {
            Handle::ReadOnly(file) => file,
            Handle::Append(file) => file,
        }
    }

    fn file_mut(&mut self) -> Result<&mut netcdf::FileMut> {
        match &mut self.handle {
            Handle::Append(file) => Ok(file),
            Handle::ReadOnly(_) => Err(FieldError::ReadOnly {
                file: self.path.clone(),
            }),
        }
    }

    fn variable(&self, name: &str) -> Result<netcdf::Variable<'_>> {
        self.file()
            .variable(name)
            .ok_or_else(|| FieldError::missing_variable(&self.path, name))
    }
}

/// Convert start/count pairs into netcdf extents.
fn extents(start: &[usize], count: &[usize]) -> Vec<Extent> {
    start
        .iter()
        .zip(count)
        .map(|(&s, &c)| (s..s + c).into())
        .collect()
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Numeric attribute as f32. Any numeric storage type converts, doubles included.
fn get_f32_attr(var: &netcdf::Variable, name: &str) -> Option<f32> {
    if !has_attr(var, name) {
        return None;
    }
    let value = var.attribute_value(name)?.ok()?;
    f32::try_from(value).ok()
}

impl ArrayStore for NetcdfStore {
    fn label(&self) -> &str {
        &self.path
    }

    fn is_writable(&self) -> bool {
        matches!(self.handle, Handle::Append(_))
    }

    fn dimension_len(&self, name: &str) -> Option<usize> {
        self.file().dimension(name).map(|dim| dim.len())
    }

    fn has_variable(&self, name: &str) -> bool {
        self.file().variable(name).is_some()
    }

    fn variable_dimensions(&self, name: &str) -> Option<Vec<String>> {
        let var = self.file().variable(name)?;
        Some(
            var.dimensions()
                .iter()
                .map(|dim| dim.name().to_string())
                .collect(),
        )
    }

    fn variable_len(&self, name: &str) -> Option<usize> {
        self.file().variable(name).map(|var| var.len())
    }

    fn read_f32(&self, name: &str, start: &[usize], count: &[usize]) -> Result<Vec<f32>> {
        let var = self.variable(name)?;
        let extents = extents(start, count);
        var.get_values::<f32, _>(extents.as_slice())
            .map_err(|e| FieldError::storage(&self.path, format!("reading '{}': {}", name, e)))
    }

    fn attribute_f32(&self, name: &str, attribute: &str) -> Result<Option<f32>> {
        let var = self.variable(name)?;
        Ok(get_f32_attr(&var, attribute))
    }

    fn create_dimension(&mut self, name: &str, len: usize) -> Result<()> {
        let path = self.path.clone();
        self.file_mut()?
            .add_dimension(name, len)
            .map(|_| ())
            .map_err(|e| FieldError::storage(path, format!("adding dimension '{}': {}", name, e)))
    }

    fn create_variable_f32(&mut self, name: &str, dimensions: &[&str]) -> Result<()> {
        let path = self.path.clone();
        self.file_mut()?
            .add_variable::<f32>(name, dimensions)
            .map(|_| ())
            .map_err(|e| FieldError::storage(path, format!("adding variable '{}': {}", name, e)))
    }

    fn put_attribute_f32(&mut self, name: &str, attribute: &str, value: f32) -> Result<()> {
        let path = self.path.clone();
        let mut var = self
            .file_mut()?
            .variable_mut(name)
            .ok_or_else(|| FieldError::missing_variable(&path, name))?;
        var.put_attribute(attribute, value)
            .map(|_| ())
            .map_err(|e| {
                FieldError::storage(path, format!("setting {}:{}: {}", name, attribute, e))
            })
    }

    fn write_f32(
        &mut self,
        name: &str,
        start: &[usize],
        count: &[usize],
        values: &[f32],
    ) -> Result<()> {
        let path = self.path.clone();
        let extents = extents(start, count);
        let mut var = self
            .file_mut()?
            .variable_mut(name)
            .ok_or_else(|| FieldError::missing_variable(&path, name))?;
        var.put_values(values, extents.as_slice())
            .map_err(|e| FieldError::storage(path, format!("writing '{}': {}", name, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;

    #[test]
    fn test_open_missing_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = NetcdfStore::open(dir.path().join("absent.nc"))
            .err()
            .expect("opening a missing file must fail");
        assert_eq!(err.class(), ErrorClass::Storage);
        assert!(err.to_string().contains("absent.nc"));
    }

    #[test]
    fn test_silence_is_idempotent() {
        silence_hdf5_errors();
        silence_hdf5_errors();
    }

    #[test]
    fn test_extents_pairs_start_and_count() {
        let ext = extents(&[3, 0, 0], &[1, 2, 10]);
        assert_eq!(ext.len(), 3);
    }

    #[test]
    fn test_attribute_f32_converts_storage_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attrs.nc");
        {
            let mut file = netcdf::create(&path).unwrap();
            file.add_dimension("x", 2).unwrap();
            let mut var = file.add_variable::<f32>("v", &["x"]).unwrap();
            var.put_attribute("scale_factor", 0.25f64).unwrap();
            var.put_attribute("add_offset", 10.5f32).unwrap();
            var.put_attribute("_FillValue", -999.0f32).unwrap();
            var.put_attribute("missing_value", -32767i16).unwrap();
            var.put_attribute("units", "K").unwrap();
        }

        let store = NetcdfStore::open(&path).unwrap();
        assert_eq!(store.attribute_f32("v", "scale_factor").unwrap(), Some(0.25));
        assert_eq!(store.attribute_f32("v", "add_offset").unwrap(), Some(10.5));
        assert_eq!(store.attribute_f32("v", "missing_value").unwrap(), Some(-32767.0));
        assert_eq!(store.attribute_f32("v", "units").unwrap(), None);
        assert_eq!(store.attribute_f32("v", "valid_min").unwrap(), None);
    }
}
