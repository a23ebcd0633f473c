// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flatvec`: flat vector with linear scans. Small, simple, and the reference
//!   the R-tree is tested against.
//! - `rtree`: R-tree generic over `T: Scalar` (aliases: `RTreeI64`, `RTreeF32`, `RTreeF64`).
//!
//! R-tree notes
//! ------------
//! Inserts descend by least area enlargement (ties broken by smaller area).
//! Overflowing nodes split along the axis whose candidate distributions have
//! the smallest summed margins, at the index with the least overlap between
//! halves (ties broken by smaller total area).
//!
//! Bulk loading packs sorted tiles top-down: items are sorted by `min_x`, cut
//! into vertical slices, each slice sorted by `min_y` and cut into child groups,
//! recursively, which yields nearly full nodes with little overlap.

pub mod flatvec;
pub mod rtree;
