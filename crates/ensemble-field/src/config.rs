//! Configuration for ensemble file access.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result};
use crate::store::NC_FILL_FLOAT;
use crate::variable::NameTable;

/// The in-memory value meaning "no data".
///
/// Shared by every producer and consumer of [`Field`](crate::Field) values,
/// independent of any file's own sentinel. A NaN sentinel matches any NaN.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissingValue(f32);

impl MissingValue {
    /// NaN sentinel (the default).
    pub const NAN: MissingValue = MissingValue(f32::NAN);

    /// Use `value` as the sentinel.
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// The sentinel itself, for filling buffers.
    pub fn value(&self) -> f32 {
        self.0
    }

    /// Whether `value` means "no data".
    pub fn is_missing(&self, value: f32) -> bool {
        if self.0.is_nan() {
            value.is_nan()
        } else {
            value == self.0
        }
    }
}

impl Default for MissingValue {
    fn default() -> Self {
        Self::NAN
    }
}

impl PartialEq for MissingValue {
    fn eq(&self, other: &Self) -> bool {
        self.is_missing(other.0)
    }
}

/// Names of the dimensions the convention relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionNames {
    pub time: String,
    pub ensemble: String,
    pub latitude: String,
    pub longitude: String,
    /// Singleton vertical axis used when creating output variables.
    pub surface: String,
}

impl Default for DimensionNames {
    fn default() -> Self {
        Self {
            time: "time".to_string(),
            ensemble: "ensemble_member".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            surface: "surface".to_string(),
        }
    }
}

impl DimensionNames {
    /// Dimensions of a created output variable, slowest-varying first.
    pub fn output_layout(&self) -> [&str; 5] {
        [
            &self.time,
            &self.surface,
            &self.ensemble,
            &self.latitude,
            &self.longitude,
        ]
    }
}

/// Names of the coordinate and static variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateNames {
    pub latitude: String,
    pub longitude: String,
    pub elevation: String,
}

impl Default for CoordinateNames {
    fn default() -> Self {
        Self {
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            elevation: "altitude".to_string(),
        }
    }
}

/// Configuration for a file-access session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Canonical missing value used in every [`Field`](crate::Field).
    pub missing_value: MissingValue,

    /// Dimension names.
    pub dimensions: DimensionNames,

    /// Coordinate variable names.
    pub coordinates: CoordinateNames,

    /// Per-kind overrides of native variable names.
    pub variables: NameTable,

    /// `_FillValue` stamped on variables created by a write.
    pub created_fill_value: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            missing_value: MissingValue::default(),
            dimensions: DimensionNames::default(),
            coordinates: CoordinateNames::default(),
            variables: NameTable::default(),
            created_fill_value: NC_FILL_FLOAT,
        }
    }
}

impl FieldConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("FIELD_MISSING_VALUE") {
            if val.eq_ignore_ascii_case("nan") {
                config.missing_value = MissingValue::NAN;
            } else if let Ok(value) = val.parse() {
                config.missing_value = MissingValue::new(value);
            }
        }

        if let Ok(val) = std::env::var("FIELD_CREATED_FILL_VALUE") {
            if let Ok(value) = val.parse() {
                config.created_fill_value = value;
            }
        }

        let dims = &mut config.dimensions;
        for (key, slot) in [
            ("FIELD_TIME_DIM", &mut dims.time),
            ("FIELD_ENSEMBLE_DIM", &mut dims.ensemble),
            ("FIELD_LATITUDE_DIM", &mut dims.latitude),
            ("FIELD_LONGITUDE_DIM", &mut dims.longitude),
            ("FIELD_SURFACE_DIM", &mut dims.surface),
        ] {
            if let Ok(val) = std::env::var(key) {
                *slot = val;
            }
        }

        let coords = &mut config.coordinates;
        for (key, slot) in [
            ("FIELD_LATITUDE_VAR", &mut coords.latitude),
            ("FIELD_LONGITUDE_VAR", &mut coords.longitude),
            ("FIELD_ELEVATION_VAR", &mut coords.elevation),
        ] {
            if let Ok(val) = std::env::var(key) {
                *slot = val;
            }
        }

        config
    }

    /// Parse configuration from a YAML document. Absent keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            FieldError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let layout = self.dimensions.output_layout();
        if let Some(empty) = layout.iter().position(|name| name.is_empty()) {
            return Err(FieldError::Config(format!(
                "dimension name #{} is empty",
                empty
            )));
        }
        for (i, name) in layout.iter().enumerate() {
            if layout[..i].contains(name) {
                return Err(FieldError::Config(format!(
                    "dimension name '{}' is used twice",
                    name
                )));
            }
        }

        let coords = &self.coordinates;
        if coords.latitude.is_empty() || coords.longitude.is_empty() || coords.elevation.is_empty()
        {
            return Err(FieldError::Config(
                "coordinate variable names must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
