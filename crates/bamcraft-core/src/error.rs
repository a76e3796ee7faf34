//! Unified error handling for bamcraft
//!
//! This module provides a single error type that covers every fatal
//! condition the export pipeline can raise. Recoverable anomalies are not
//! errors; they are logged and the export continues.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all bamcraft operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // ==================== Scene Errors ====================

    /// An object kind the converter does not know about.
    /// This aborts the whole export.
    #[error("Object '{object}' has a non implemented kind: '{kind}'")]
    UnsupportedObjectKind { object: String, kind: String },

    /// Bone parent pointers do not form a tree
    #[error("Armature '{armature}' is corrupted: bone '{bone}' is part of a parent cycle")]
    CorruptArmature { armature: String, bone: String },

    // ==================== Texture Errors ====================

    /// Texture materialization mode that is intentionally unsupported
    #[error("Texture mode {mode} is not supported")]
    UnsupportedTextureMode { mode: String },

    /// Saving or copying an image to disk failed
    #[error("Error during image export of '{image}': {message}")]
    ImageSave { image: String, message: String },

    // ==================== Configuration Errors ====================

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Unparsable output format version string
    #[error("Invalid format version: '{version}' (expected e.g. \"6.41\")")]
    InvalidVersion { version: String },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },

    /// External error (from other crates)
    #[error("{0}")]
    External(String),
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

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }

    /// Check if this is a scene-data error (as opposed to an I/O or
    /// configuration problem)
    pub fn is_scene_error(&self) -> bool {
        match self {
            Error::UnsupportedObjectKind { .. } | Error::CorruptArmature { .. } => true,
            Error::WithContext { source, .. } => source.is_scene_error(),
            _ => false,
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_context() {
        let err = Error::UnsupportedTextureMode {
            mode: "INCLUDE".into(),
        };
        let contextualized = err.with_context("while resolving slot 'Base_Color'");

        assert!(contextualized.to_string().contains("Base_Color"));
        assert!(contextualized.to_string().contains("INCLUDE"));
    }

    #[test]
    fn test_is_scene_error() {
        let err = Error::UnsupportedObjectKind {
            object: "Suzanne".into(),
            kind: "META".into(),
        };
        assert!(err.is_scene_error());
        assert!(err.with_context("object 'Suzanne'").is_scene_error());
        assert!(!Error::FileNotFound(PathBuf::from("/test")).is_scene_error());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::InvalidVersion {
            version: "abc".into(),
        });
        let with_context = result.context("loading settings");

        assert!(with_context.is_err());
        assert!(
            with_context
                .unwrap_err()
                .to_string()
                .contains("loading settings")
        );
    }
}
