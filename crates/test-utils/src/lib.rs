//! Shared test utilities for the ensemble-field workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Test data path helpers and a skip macro for optional NetCDF files
//! - Ensemble block and coordinate axis generators
//! - Grid specifications, convention names and packing fixtures
//! - Approximate float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{require_test_file, fixtures};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Resolve a sample NetCDF file through [`find_test_file`], or return early.
///
/// Real ensemble files are large and not checked in. When the file is not
/// under `TEST_DATA_DIR` or the workspace `testdata/` directories, the test
/// logs which file it wanted and passes without running.
///
/// ```ignore
/// #[test]
/// fn test_real_ec_file() {
///     let path = require_test_file!("ec_ens_sample.nc");
///     let file = EnsembleFile::open_path(&path, FieldConfig::default()).unwrap();
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        let name: &str = $name;
        match $crate::find_test_file(name) {
            Some(path) => path,
            None => {
                eprintln!("skipping: ensemble sample '{}' not found (set TEST_DATA_DIR)", name);
                return;
            }
        }
    }};
}

/// Assert two decoded values agree within a tolerance.
///
/// Decoded fields use NaN as the missing value, so two NaNs compare equal
/// here while NaN against a number fails. The tolerance defaults to `1e-5`.
///
/// ```ignore
/// assert_approx_eq!(field[(5, 2, 1)], 0.5 * 10503.0 + 250.0, 1e-2);
/// assert_approx_eq!(field[(0, 0, 0)], f32::NAN);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr) => {
        $crate::assert_approx_eq!($left, $right, 1e-5)
    };
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left = $left as f64;
        let right = $right as f64;
        let epsilon = $epsilon as f64;
        let agree = if left.is_nan() || right.is_nan() {
            left.is_nan() && right.is_nan()
        } else {
            (left - right).abs() <= epsilon
        };
        if !agree {
            panic!(
                "values differ: {} = {}, {} = {} (tolerance {})",
                stringify!($left),
                left,
                stringify!($right),
                right,
                epsilon
            );
        }
    }};
}
