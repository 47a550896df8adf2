//! Gridded Field Access Layer for Ensemble Forecast Files
//!
//! This crate exposes ensemble, time-stepped forecast data stored in NetCDF
//! files as physical-unit fields for calibrators. It:
//!
//! - **Resolves geometry**: time/ensemble/latitude/longitude extents plus the
//!   latitude, longitude and elevation grids, once per file
//! - **Decodes packed values**: applies `scale_factor`/`add_offset` and maps the
//!   variable's own sentinel to one canonical missing value
//! - **Re-encodes on write**: uses the destination variable's packing and
//!   creates output variables on first use
//!
//! # Architecture
//!
//! ```text
//! Calibrator
//!      │
//!      ▼
//! EnsembleFile::read(kind, t) / write(kinds, source)
//!      │
//!      ├─► NameTable: kind → native variable name
//!      │
//!      ├─► Geometry (resolved at open, validated by schema)
//!      │
//!      ├─► Quantization: re-read per call from the variable's attributes
//!      │         │
//!      │         ├─► decode: raw → physical, sentinel → canonical missing
//!      │         │
//!      │         └─► encode: physical → raw, canonical missing → sentinel
//!      │
//!      └─► ArrayStore (NetcdfStore / MemoryStore)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ensemble_field::{EnsembleFile, FieldConfig, FieldSet, VariableKind};
//!
//! let mut file = EnsembleFile::open_path_mut("ec_ens.nc", FieldConfig::default())?;
//! let mut field = file.read(VariableKind::Temperature, 0)?;
//! field[(5, 2, 0)] += 0.5;
//!
//! let mut out = FieldSet::new();
//! out.insert(VariableKind::Temperature, 0, field);
//! let summary = file.write(&[VariableKind::Temperature], &mut out)?;
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod geometry;
pub mod grid;
pub mod quantization;
pub mod schema;
pub mod session;
pub mod store;
pub mod variable;

// Re-export commonly used types at crate root
pub use config::{CoordinateNames, DimensionNames, FieldConfig, MissingValue};
pub use error::{ErrorClass, FieldError, Result};
pub use field::{Field, FieldSet, FieldSource};
pub use geometry::Geometry;
pub use grid::read_grid;
pub use quantization::Quantization;
pub use schema::{is_valid, is_valid_path, validate};
pub use session::{EnsembleFile, WriteSummary};
pub use store::{silence_hdf5_errors, ArrayStore, MemoryStore, NetcdfStore, NC_FILL_FLOAT};
pub use variable::{NameTable, VariableKind};
