// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised by the layer manager.

use stratum_surface::{MAX_LAYER_ID, SurfaceError};
use thiserror::Error;

/// Layer manager failures.
#[derive(Debug, Error)]
pub enum LayerError {
    /// Every encodable layer id has been handed out.
    #[error("layer ids exhausted: at most {MAX_LAYER_ID} layers per session")]
    IdsExhausted,
    /// Allocating or resizing the drawing surfaces failed.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    /// The configuration couldn't be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
