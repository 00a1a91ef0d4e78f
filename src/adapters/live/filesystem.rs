//! Live filesystem adapter using `std::fs`.

use std::path::Path;

use crate::ports::filesystem::FileSystem;

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()).into())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
