#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the sluggable crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

/// Unified error type returned by the behavior, its collaborators and the CLI.
///
/// Configuration problems are reported once, when a
/// [`SluggableBehavior`](crate::SluggableBehavior) is constructed. Per-record
/// failures ([`Error::ResolutionExhausted`], [`Error::StoreUnavailable`] and
/// [`Error::Producer`]) abort the save before the slug field is written.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// The behavior was configured without a usable slug source or with
    /// invalid options.
    #[error("invalid slug configuration: {message}")]
    Configuration {
        /// Human readable message describing the configuration problem.
        message: String
    },
    /// The uniqueness search ran past its iteration cap.
    #[error("no free slug found for '{base}' after {attempts} attempts")]
    ResolutionExhausted {
        /// Base slug the search started from.
        base:     String,
        /// Number of existence checks performed before giving up.
        attempts: u32
    },
    /// The existence check could not reach its backing store.
    #[error("slug store unavailable: {message}")]
    StoreUnavailable {
        /// Description reported by the store.
        message: String
    },
    /// A custom value producer failed to produce a slug.
    #[error("slug value producer failed: {message}")]
    Producer {
        /// Description reported by the producer.
        message: String
    },
    /// Wraps I/O errors that occur while reading configuration files.
    #[error("failed to read configuration from {path:?}: {source}")]
    Io {
        /// Location of the configuration file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Wraps serialization errors when writing records as JSON.
    #[error("failed to serialize record: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// Wraps I/O errors that occur while writing CLI output.
    #[error("failed to write output: {source}")]
    Output {
        /// Underlying I/O error.
        source: std::io::Error
    }
}

impl Error {
    /// Constructs a configuration error from the provided message.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the configuration problem.
    pub fn configuration<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Configuration {
            message: message.into()
        }
    }

    /// Constructs a store error from the provided message.
    ///
    /// Existence-check implementations use this to report backend failures.
    pub fn store_unavailable<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::StoreUnavailable {
            message: message.into()
        }
    }

    /// Constructs a producer error from the provided message.
    pub fn producer<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Producer {
            message: message.into()
        }
    }

    /// Returns `true` when retrying the whole resolve-and-save sequence may
    /// succeed.
    ///
    /// Exhaustion and store outages are transient from the caller's point of
    /// view; configuration and producer errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ResolutionExhausted { .. } | Self::StoreUnavailable { .. }
        )
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the configuration file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}
