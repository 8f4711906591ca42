//! Shared test utilities for the GOES scene toolkit workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Test data path helpers
//! - Skip macros for optional test data
//! - Synthetic field and flight-track generators
//! - A NetCDF scene fixture writer
//! - A local HTTP file server for download tests
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
//! use test_utils::{require_test_file, write_scene_fixture, FileServer};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;
pub mod server;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;
pub use server::FileServer;

/// Return the path of an optional data file, or skip the test.
///
/// Real ABI scenes are hundreds of megabytes and are not checked in. Tests
/// that want one call this macro; when the file is missing they print a
/// note and return early instead of failing.
///
/// ```ignore
/// #[test]
/// fn test_real_full_disk_scene() {
///     let path = test_utils::require_test_file!("OR_ABI-L2-CMIPF-M6C13_G19_sample.nc");
///     let scene = netcdf_scene::open_scene(&path).unwrap();
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!("SKIPPED: '{}' not found (set TEST_DATA_DIR to run this test)", $name);
                return;
            }
        }
    }};
}

/// Assert that two numbers differ by at most `epsilon`.
///
/// Both sides are widened to `f64`, so `f32` field values can be compared
/// with literal expectations directly.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: {} is not within {} of {} (diff {})",
                left, epsilon, right, diff
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(200.004_f32, 200.0, 0.01);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_rejects_nan() {
        assert_approx_eq!(f64::NAN, 1.0, 0.001);
    }

    #[test]
    fn test_require_test_file_skips_missing() {
        let _path = require_test_file!("definitely-not-a-real-scene.nc");
        unreachable!("missing files return early");
    }
}
