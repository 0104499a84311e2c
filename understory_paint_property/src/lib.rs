// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Paint Property: per-object paint property tree nodes.
//!
//! Painting walks four independent property trees (transform, effect, clip,
//! and scroll). Every layout object contributes zero or more nodes to those
//! trees; [`ObjectPaintProperties`] owns them, one [`NodeSlot`] per node kind.
//!
//! ## Core Concepts
//!
//! ### Nodes
//!
//! A [`PaintPropertyNode`] is reference counted and shared: it is owned by the
//! object that created it and referenced as the parent of nodes created by
//! other objects. Each node carries a state payload ([`TransformState`],
//! [`EffectState`], [`ClipState`], [`ScrollState`]) and records the most
//! severe change since it was last synced.
//!
//! ### Change types
//!
//! Every update reports a [`PaintPropertyChangeType`]. Only
//! [`NodeAddedOrRemoved`](PaintPropertyChangeType::NodeAddedOrRemoved) alters
//! the tree shape; compositor mirrors keyed by node index stay valid for every
//! other variant.
//!
//! ### Storage
//!
//! Objects store their nodes in one of two layouts, [`DenseStorage`] or
//! [`SparseStorage`], which behave identically. The layout is chosen once per
//! process with [`select_backend`] (see [`config`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_paint_property::{
//!     AnimationState, ObjectPaintProperties, PaintPropertyChangeType, SparseStorage,
//!     TransformAndOrigin, TransformPaintPropertyNode, TransformSlot, TransformState,
//! };
//!
//! let root = TransformPaintPropertyNode::root(TransformState::default());
//! let mut properties = ObjectPaintProperties::<SparseStorage>::default();
//!
//! let offset = TransformState::new(TransformAndOrigin::translation(10.0, 20.0));
//! let change = properties
//!     .update_transform(TransformSlot::PaintOffsetTranslation, &root, offset, AnimationState::empty())
//!     .unwrap();
//! assert_eq!(change, PaintPropertyChangeType::NodeAddedOrRemoved);
//!
//! // Moving the object is a simple value change.
//! let moved = TransformState::new(TransformAndOrigin::translation(15.0, 20.0));
//! let change = properties
//!     .update_transform(TransformSlot::PaintOffsetTranslation, &root, moved, AnimationState::empty())
//!     .unwrap();
//! assert_eq!(change, PaintPropertyChangeType::ChangedOnlySimpleValues);
//!
//! assert!(properties.has_transform_node());
//! assert!(properties.clear_transform(TransformSlot::PaintOffsetTranslation).unwrap());
//! assert!(properties.is_empty());
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to Kurbo and Peniko.
//! - `libm`: `no_std` math for Kurbo and Peniko.
//! - `sparse`: make [`SparseStorage`] the default backend.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod change;
pub mod config;
mod dense;
mod error;
mod node;
mod properties;
mod slot;
mod sparse;
mod state;
mod storage;

pub use change::{AnimationState, PaintPropertyChangeType};
pub use config::{BackendKind, select_backend, selected_backend};
pub use error::{PaintPropertyError, PaintPropertyInvariant};
pub use node::{
    ClipPaintPropertyNode, EffectPaintPropertyNode, PaintPropertyNode, ScrollPaintPropertyNode,
    TransformPaintPropertyNode,
};
pub use properties::ObjectPaintProperties;
pub use slot::{ClipSlot, EffectSlot, NodeSlot, PropertyTree, TransformSlot};
pub use state::{
    BackfaceVisibility, ClipState, CompositingReasons, CompositorElementId, EffectState,
    NodeState, ScrollState, TransformAndOrigin, TransformState,
};
pub use storage::{Backend, DenseStorage, NodeRef, PaintPropertyStorage, SparseStorage};
