//! Unified error handling for gltfcomp
//!
//! This module provides the error type shared by the export pipeline,
//! the compression backends and the command-line front end.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all gltfcomp operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output folder could not be created
    #[error("Cannot create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ==================== Configuration Errors ====================

    /// Compression option outside its documented range
    #[error("Invalid option {field} = {value} (expected {expected})")]
    InvalidOptions {
        field: &'static str,
        value: i64,
        expected: &'static str,
    },

    // ==================== Extraction Errors ====================

    /// Scene collaborator returned mesh data that cannot be normalized
    #[error("Malformed mesh on object '{object}': {message}")]
    MalformedMesh {
        object: String,
        message: String,
    },

    /// Embedded image whose pixel buffer contradicts its declared shape
    #[error("Malformed image '{image}': {message}")]
    MalformedImage {
        image: String,
        message: String,
    },

    // ==================== Backend Errors ====================

    /// Compression backend could not be located or initialized
    #[error("Compression backend '{backend}' unavailable: {reason}")]
    BackendUnavailable {
        backend: String,
        reason: String,
    },

    /// Compression backend failed while encoding the package
    #[error("Compression backend '{backend}' failed: {message}")]
    Backend {
        backend: String,
        message: String,
    },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a malformed mesh error
    pub fn malformed_mesh(object: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedMesh {
            object: object.into(),
            message: message.into(),
        }
    }

    /// Create a malformed image error
    pub fn malformed_image(image: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedImage {
            image: image.into(),
            message: message.into(),
        }
    }

    /// Create a backend failure error
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Check if this error only concerns a single scene object
    ///
    /// The orchestrator logs these and carries on with the next object;
    /// everything else aborts the export.
    pub fn is_object_local(&self) -> bool {
        match self {
            Error::MalformedMesh { .. } | Error::MalformedImage { .. } => true,
            Error::WithContext { source, .. } => source.is_object_local(),
            _ => false,
        }
    }

    /// Check if this error is fatal for the whole export
    pub fn is_fatal(&self) -> bool {
        !self.is_object_local()
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
