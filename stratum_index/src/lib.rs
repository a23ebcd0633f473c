// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stratum Index: a generic 2D AABB index used for visibility culling.
//!
//! - Insert, move, and remove axis-aligned bounding boxes (AABBs) with user payloads.
//! - Query by point or intersecting rectangle; queries use closed intervals, so
//!   boxes that merely touch the query edge are reported.
//! - Bulk-load large sets in one packing pass.
//!
//! It is generic over the scalar type `T` and does not depend on any geometry crate.
//! Higher layers compute world-space boxes (normalizing arbitrary corners with
//! [`Aabb2D::from_corners`]) and feed them here.
//!
//! # Example
//!
//! ```rust
//! use stratum_index::{Aabb2D, Index};
//!
//! let mut idx = Index::<f64, u32>::with_rtree();
//! let a = idx.insert(Aabb2D::new(0.0, 0.0, 100.0, 100.0), 1);
//! let _b = idx.insert(Aabb2D::new(500.0, 500.0, 600.0, 600.0), 2);
//!
//! // Everything overlapping the visible area.
//! let visible: Vec<_> = idx
//!     .query_rect(Aabb2D::new(50.0, 50.0, 200.0, 200.0))
//!     .map(|(_, id)| id)
//!     .collect();
//! assert_eq!(visible, vec![1]);
//!
//! // Move a box; the next query sees it immediately.
//! idx.update(a, Aabb2D::new(1000.0, 0.0, 1100.0, 100.0));
//! assert_eq!(idx.query_point(10.0, 10.0).count(), 0);
//! ```
//!
//! ## Choosing a backend
//!
//! - `FlatVec` (default): simplest and smallest, linear scans. Good for very small sets
//!   and as a reference when testing other backends.
//! - `RTreeF32`/`RTreeF64`/`RTreeI64`: R-tree with margin/overlap splits and sort-tile
//!   bulk loading; the general-purpose choice for scenes with thousands of boxes.
//!   See the [`backends`] docs for how splits are chosen.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates.

#![no_std]

extern crate alloc;

pub mod backend;
pub mod backends;
pub mod index;
pub mod types;

pub use backend::Backend;
pub use backends::flatvec::FlatVec;
pub use backends::rtree::{RTree, RTreeF32, RTreeF64, RTreeI64};
pub use index::{Index, IndexGeneric, Key, RTreeIndex};
pub use types::{Aabb2D, Scalar};
