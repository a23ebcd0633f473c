// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for surfaces and draw callbacks.

use thiserror::Error;

/// Errors raised while creating or resizing surfaces and images.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The requested pixel size can't back a raster surface.
    #[error("invalid surface size {width}x{height}")]
    InvalidSize {
        /// Requested width in device pixels.
        width: u32,
        /// Requested height in device pixels.
        height: u32,
    },
    /// Image data length doesn't match `width * height * 4`.
    #[error("image data has {actual} bytes, expected {expected}")]
    ImageData {
        /// Bytes required by the declared size.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
}

/// Failure reported by a layer's draw callback.
///
/// A failing layer is skipped for the frame; the rest of the scene still renders.
#[derive(Debug, Error)]
pub enum DrawError {
    /// A surface operation inside the callback failed.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    /// Application-level failure.
    #[error("{0}")]
    Message(String),
}

impl DrawError {
    /// Build a [`DrawError::Message`].
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Result alias for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;
