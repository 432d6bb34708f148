// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for the composition engine.
//!
//! Every error here is local and never retried by the engine itself; the
//! front-end shows the message and the user repeats the action if wanted.

use std::path::PathBuf;

/// Failure to turn an image reference into a Composition Surface.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("failed to read image file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch image from {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("failed to decode image")]
    Decode(#[from] image::ImageError),

    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("failed to prepare image backdrop: {0}")]
    Backdrop(#[from] RenderError),
}

/// Failure to produce a PNG from the current composition.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export: no image is loaded")]
    NoSurface,

    #[error("failed to render composition")]
    Render(#[from] RenderError),

    #[error("failed to encode PNG")]
    Encode(#[from] image::ImageError),

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to hand a finished composition to the publishing collaborator.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("you must be logged in to post memes")]
    NotAuthenticated,

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Sink(#[from] anyhow::Error),
}

/// Rasterization failures.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("font error: {0}")]
    Font(String),

    #[error("cannot allocate a {width}x{height} surface")]
    Surface { width: u32, height: u32 },
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),
}

impl RenderError {
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            ExportError::NoSurface.to_string(),
            "nothing to export: no image is loaded"
        );
        assert_eq!(
            PublishError::NotAuthenticated.to_string(),
            "you must be logged in to post memes"
        );
        assert!(ImageLoadError::InvalidDataUrl("x".into())
            .to_string()
            .starts_with("invalid data URL"));
    }

    #[test]
    fn export_error_wraps_into_publish_error() {
        let err: PublishError = ExportError::NoSurface.into();
        assert!(matches!(err, PublishError::Export(ExportError::NoSurface)));
        assert_eq!(err.to_string(), ExportError::NoSurface.to_string());
    }
}
