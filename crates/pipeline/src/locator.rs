//! Input file resolution.
//!
//! Gallery inputs live either in the working directory or in a
//! directory named by the `EARTHDATA_DIR` environment variable. No
//! existence check happens here; a bad path surfaces when the reader
//! tries to open it.

use std::env;
use std::path::PathBuf;

/// Directory-override environment variable consulted by [`resolve`].
pub const DATA_DIR_VAR: &str = "EARTHDATA_DIR";

/// Resolve a product's default filename to the path to open.
pub fn resolve(default_name: &str) -> PathBuf {
    match env::var_os(DATA_DIR_VAR) {
        Some(dir) => PathBuf::from(dir).join(default_name),
        None => PathBuf::from(default_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_and_without_override() {
        // Both cases in one test: the variable is process-global and
        // tests in this binary run concurrently.
        env::remove_var(DATA_DIR_VAR);
        assert_eq!(resolve("x.h5"), PathBuf::from("x.h5"));

        env::set_var(DATA_DIR_VAR, "/data");
        assert_eq!(resolve("x.h5"), PathBuf::from("/data/x.h5"));
        env::remove_var(DATA_DIR_VAR);
    }
}
