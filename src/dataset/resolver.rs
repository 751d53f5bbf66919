//! Image path resolution and decoding.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};
use tracing::trace;

use crate::utils::error::{Result, ResultExt};

/// Resolves image identifiers against a configured root directory
#[derive(Debug, Clone)]
pub struct ImageResolver {
    root_dir: PathBuf,
}

impl ImageResolver {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Full path for an identifier. Absolute identifiers are returned as-is.
    pub fn resolve(&self, identifier: &str) -> PathBuf {
        self.root_dir.join(identifier)
    }

    /// Open and decode the image behind `identifier`
    pub fn load(&self, identifier: &str) -> Result<DynamicImage> {
        let path = self.resolve(identifier);
        trace!("Decoding {:?}", path);

        ImageReader::open(&path)
            .resource_context(&path)?
            .with_guessed_format()
            .resource_context(&path)?
            .decode()
            .resource_context(&path)
    }
}
