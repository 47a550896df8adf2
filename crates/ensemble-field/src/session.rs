//! An open ensemble file: geometry resolved once, fields read and written
//! through the variable's own quantization.

use std::path::Path;

use ndarray::Array2;

use crate::config::FieldConfig;
use crate::error::{FieldError, Result};
use crate::field::{Field, FieldSource};
use crate::geometry::Geometry;
use crate::grid;
use crate::quantization::{Quantization, MISSING_ATTRS};
use crate::schema;
use crate::store::{ArrayStore, NetcdfStore};
use crate::variable::VariableKind;

/// Outcome of [`EnsembleFile::write`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Variables created by this write.
    pub created: Vec<String>,
    /// Variables that already existed.
    pub reused: Vec<String>,
    pub steps_written: usize,
    /// Steps for which the source had no field.
    pub steps_skipped: usize,
}

/// A file following the ensemble convention, opened over an [`ArrayStore`].
pub struct EnsembleFile<S: ArrayStore = NetcdfStore> {
    store: S,
    config: FieldConfig,
    geometry: Geometry,
}

impl<S: ArrayStore + std::fmt::Debug> std::fmt::Debug for EnsembleFile<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnsembleFile")
            .field("store", &self.store)
            .field("geometry", &self.geometry)
            .finish()
    }
}

impl EnsembleFile<NetcdfStore> {
    /// Open a NetCDF file read-only.
    pub fn open_path(path: impl AsRef<Path>, config: FieldConfig) -> Result<Self> {
        Self::open(NetcdfStore::open(path)?, config)
    }

    /// Open a NetCDF file for reading and writing.
    pub fn open_path_mut(path: impl AsRef<Path>, config: FieldConfig) -> Result<Self> {
        Self::open(NetcdfStore::append(path)?, config)
    }
}

impl<S: ArrayStore> EnsembleFile<S> {
    /// Validate the store against the convention and resolve its geometry.
    pub fn open(store: S, config: FieldConfig) -> Result<Self> {
        config.validate()?;
        schema::validate(&store, &config)?;
        let geometry = Geometry::resolve(&store, &config)?;
        Ok(Self {
            store,
            config,
            geometry,
        })
    }

    /// Check whether `store` follows the convention. Never fails.
    pub fn is_valid(store: &S, config: &FieldConfig) -> bool {
        schema::is_valid(store, config)
    }

    /// Native variable name for `kind`, if the convention maps it.
    pub fn variable_name(&self, kind: VariableKind) -> Option<&str> {
        self.config.variables.resolve(kind)
    }

    /// Whether `kind` is mapped and its variable is present.
    pub fn has_variable(&self, kind: VariableKind) -> bool {
        self.variable_name(kind)
            .map_or(false, |name| self.store.has_variable(name))
    }

    fn resolve_name(&self, kind: VariableKind) -> Result<String> {
        self.variable_name(kind)
            .map(str::to_string)
            .ok_or_else(|| FieldError::UnresolvedVariable {
                file: self.store.label().to_string(),
                kind,
            })
    }

    fn check_time(&self, variable: &str, time: usize) -> Result<()> {
        let n_time = self.geometry.n_time();
        if time >= n_time {
            return Err(FieldError::TimeOutOfRange {
                file: self.store.label().to_string(),
                variable: variable.to_string(),
                time,
                n_time,
            });
        }
        Ok(())
    }

    /// Hyperslab of one `(ensemble, lat, lon)` block at `time`.
    ///
    /// Once singleton axes (such as `surface`) are set aside, the variable
    /// must be laid out as `(time, ensemble, latitude, longitude)` exactly.
    /// Singleton axes are taken at index 0.
    fn block_extents(&self, variable: &str, time: usize) -> Result<(Vec<usize>, Vec<usize>)> {
        let label = self.store.label();
        let dims = self
            .store
            .variable_dimensions(variable)
            .ok_or_else(|| FieldError::missing_variable(label, variable))?;
        let names = &self.config.dimensions;
        let geo = &self.geometry;
        let layout = [
            &names.time,
            &names.ensemble,
            &names.latitude,
            &names.longitude,
        ];

        let mut core = Vec::with_capacity(layout.len());
        let mut start = Vec::with_capacity(dims.len());
        let mut count = Vec::with_capacity(dims.len());
        for dim in &dims {
            let extent = if *dim == names.time {
                Some((time, 1))
            } else if *dim == names.ensemble {
                Some((0, geo.n_ens()))
            } else if *dim == names.latitude {
                Some((0, geo.n_lat()))
            } else if *dim == names.longitude {
                Some((0, geo.n_lon()))
            } else {
                None
            };
            match extent {
                Some((s, c)) => {
                    core.push(dim.as_str());
                    start.push(s);
                    count.push(c);
                }
                None if self.store.dimension_len(dim) == Some(1) => {
                    start.push(0);
                    count.push(1);
                }
                None => core.push(dim.as_str()),
            }
        }

        if core.iter().copied().ne(layout.iter().map(|name| name.as_str())) {
            return Err(FieldError::Layout {
                file: label.to_string(),
                variable: variable.to_string(),
                expected: layout.iter().map(|name| name.to_string()).collect(),
                actual: dims,
            });
        }

        Ok((start, count))
    }

    /// Read `kind` at time step `time` as physical values.
    pub fn read(&self, kind: VariableKind, time: usize) -> Result<Field> {
        let name = self.resolve_name(kind)?;
        self.check_time(&name, time)?;
        if !self.store.has_variable(&name) {
            return Err(FieldError::missing_variable(self.store.label(), name));
        }

        let (start, count) = self.block_extents(&name, time)?;
        let quant = Quantization::from_store(&self.store, &name)?;
        let raw = self.store.read_f32(&name, &start, &count)?;
        let geo = &self.geometry;
        if raw.len() != geo.block_len() {
            return Err(FieldError::ShapeMismatch {
                file: self.store.label().to_string(),
                variable: name,
                expected: geo.block_len(),
                actual: raw.len(),
            });
        }

        tracing::debug!(
            file = self.store.label(),
            variable = %name,
            time,
            scale = quant.scale,
            offset = quant.offset,
            sentinel = ?quant.missing,
            "Decoding field"
        );
        Ok(quant.decode_block(
            &raw,
            geo.n_ens(),
            geo.n_lat(),
            geo.n_lon(),
            self.config.missing_value,
        ))
    }

    /// Create the output variable for `name` if it does not exist yet.
    ///
    /// Returns whether it was created.
    fn ensure_variable(&mut self, name: &str) -> Result<bool> {
        if self.store.has_variable(name) {
            return Ok(false);
        }
        let layout = self.config.dimensions.output_layout();
        let surface = &self.config.dimensions.surface;
        if self.store.dimension_len(surface).is_none() {
            self.store.create_dimension(surface, 1)?;
        }
        self.store.create_variable_f32(name, &layout)?;
        self.store
            .put_attribute_f32(name, MISSING_ATTRS[0], self.config.created_fill_value)?;
        tracing::debug!(
            file = self.store.label(),
            variable = name,
            dimensions = ?layout,
            fill_value = self.config.created_fill_value,
            "Created output variable"
        );
        Ok(true)
    }

    /// Write every time step of each kind that `source` can supply.
    ///
    /// All kinds are resolved, and existing variables checked for layout,
    /// before anything is created or written. Missing variables are created
    /// first. Steps for which the source returns `None` are skipped and
    /// whatever the file already holds there is kept. Each field is encoded
    /// with the destination variable's own packing.
    pub fn write<F>(&mut self, kinds: &[VariableKind], source: &mut F) -> Result<WriteSummary>
    where
        F: FieldSource + ?Sized,
    {
        if !self.store.is_writable() {
            return Err(FieldError::ReadOnly {
                file: self.store.label().to_string(),
            });
        }

        let names = kinds
            .iter()
            .map(|&kind| self.resolve_name(kind))
            .collect::<Result<Vec<_>>>()?;
        for name in &names {
            if self.store.has_variable(name) {
                self.block_extents(name, 0)?;
            }
        }

        let mut summary = WriteSummary::default();
        let expected = self.geometry.field_shape();
        for (&kind, name) in kinds.iter().zip(names) {
            if self.ensure_variable(&name)? {
                summary.created.push(name.clone());
            } else {
                summary.reused.push(name.clone());
            }

            for time in 0..self.geometry.n_time() {
                let Some(field) = source.field(kind, time) else {
                    tracing::warn!(
                        file = self.store.label(),
                        variable = %name,
                        time,
                        "No field supplied, skipping time step"
                    );
                    summary.steps_skipped += 1;
                    continue;
                };
                if field.shape() != expected {
                    return Err(FieldError::FieldShape {
                        file: self.store.label().to_string(),
                        variable: name,
                        expected,
                        actual: field.shape(),
                    });
                }

                let quant = Quantization::from_store(&self.store, &name)?;
                let raw = quant.encode_block(&field, self.config.missing_value);
                let (start, count) = self.block_extents(&name, time)?;
                tracing::debug!(
                    file = self.store.label(),
                    variable = %name,
                    time,
                    scale = quant.scale,
                    offset = quant.offset,
                    sentinel = ?quant.missing,
                    "Encoding field"
                );
                self.store.write_f32(&name, &start, &count, &raw)?;
                summary.steps_written += 1;
            }
        }
        Ok(summary)
    }

    /// Read a static `(lat, lon)` variable such as land fraction.
    pub fn read_grid(&self, name: &str) -> Result<Array2<f32>> {
        grid::read_grid(&self.store, &self.geometry, name)
    }

    pub fn latitudes(&self) -> &Array2<f32> {
        self.geometry.latitudes()
    }

    pub fn longitudes(&self) -> &Array2<f32> {
        self.geometry.longitudes()
    }

    pub fn elevations(&self) -> &Array2<f32> {
        self.geometry.elevations()
    }

    /// A field of this file's shape with every value missing.
    pub fn empty_field(&self) -> Field {
        let [n_lat, n_lon, n_ens] = self.geometry.field_shape();
        Field::missing(n_lat, n_lon, n_ens, self.config.missing_value)
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn dimension_summary(&self) -> String {
        self.geometry.dimension_summary(&self.config.dimensions)
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Close the session, handing back the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }
}
