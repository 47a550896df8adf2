//! Checks that a file follows the ensemble convention.

use std::path::Path;

use crate::config::FieldConfig;
use crate::error::{FieldError, Result};
use crate::store::{ArrayStore, NetcdfStore};

/// First required dimension or coordinate variable absent from `store`.
fn first_missing<S: ArrayStore + ?Sized>(store: &S, config: &FieldConfig) -> Option<String> {
    let dims = &config.dimensions;
    for name in [&dims.time, &dims.ensemble, &dims.longitude, &dims.latitude] {
        if store.dimension_len(name).is_none() {
            return Some(format!("dimension '{}'", name));
        }
    }
    let coords = &config.coordinates;
    for name in [&coords.latitude, &coords.longitude] {
        if !store.has_variable(name) {
            return Some(format!("variable '{}'", name));
        }
    }
    None
}

/// Whether `store` has every dimension and coordinate variable the
/// convention requires. Never fails, so callers can check several
/// conventions in turn.
pub fn is_valid<S: ArrayStore + ?Sized>(store: &S, config: &FieldConfig) -> bool {
    first_missing(store, config).is_none()
}

/// [`is_valid`] for a file on disk. Files that cannot be opened are not valid.
pub fn is_valid_path(path: impl AsRef<Path>, config: &FieldConfig) -> bool {
    match NetcdfStore::open(path.as_ref()) {
        Ok(store) => is_valid(&store, config),
        Err(e) => {
            tracing::debug!(path = %path.as_ref().display(), error = %e, "Schema check could not open file");
            false
        }
    }
}

/// Like [`is_valid`], but reports what is missing.
pub fn validate<S: ArrayStore + ?Sized>(store: &S, config: &FieldConfig) -> Result<()> {
    match first_missing(store, config) {
        None => Ok(()),
        Some(missing) => Err(FieldError::Schema {
            file: store.label().to_string(),
            missing,
        }),
    }
}
