//! The call contract between the export pipeline and a compression backend

use crate::error::Result;
use crate::options::CompressionOptions;
use crate::package::SceneExportPackage;
use std::path::{Path, PathBuf};

/// Outcome of a successful backend call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendReport {
    /// Files left on disk by the backend
    pub files: Vec<PathBuf>,
    /// Whether mesh data was Draco-compressed
    pub draco_applied: bool,
}

/// Encoder that turns a [`SceneExportPackage`] into files on disk
///
/// The backend alone decides how the output is partitioned (single binary,
/// JSON plus buffer, zipped archive). The orchestrator calls [`probe`]
/// before touching any scene object and [`compress`] exactly once per export.
///
/// [`probe`]: CompressionBackend::probe
/// [`compress`]: CompressionBackend::compress
pub trait CompressionBackend {
    /// Backend name used in logs and errors
    fn name(&self) -> &str;

    /// Check that the backend can be used
    ///
    /// Returns [`Error::BackendUnavailable`](crate::Error::BackendUnavailable)
    /// when it cannot be loaded or initialized.
    fn probe(&self) -> Result<()> {
        Ok(())
    }

    /// Encode the package into `output_folder`, named after `output_filepath`
    fn compress(
        &mut self,
        package: &SceneExportPackage,
        output_folder: &Path,
        output_filepath: &Path,
        options: &CompressionOptions,
    ) -> Result<BackendReport>;
}

impl<B: CompressionBackend + ?Sized> CompressionBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn probe(&self) -> Result<()> {
        (**self).probe()
    }

    fn compress(
        &mut self,
        package: &SceneExportPackage,
        output_folder: &Path,
        output_filepath: &Path,
        options: &CompressionOptions,
    ) -> Result<BackendReport> {
        (**self).compress(package, output_folder, output_filepath, options)
    }
}
