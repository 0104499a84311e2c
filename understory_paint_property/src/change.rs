// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change classification and animation state for property node updates.

/// How much a property node changed in an update.
///
/// Variants are ordered by severity, so `max` combines two changes. Only
/// [`NodeAddedOrRemoved`](Self::NodeAddedOrRemoved) changes the shape of a
/// property tree; everything below it is a value change that keeps compositor
/// side node indices valid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PaintPropertyChangeType {
    /// Nothing changed.
    #[default]
    Unchanged,
    /// Only values that the compositor already applied directly changed.
    ChangedOnlyCompositedValues,
    /// Only values that do not require re-rasterization changed.
    ChangedOnlyNonRerasterValues,
    /// Only simple values changed (2D translation, opacity).
    ChangedOnlySimpleValues,
    /// Arbitrary values changed, with the same parent.
    ChangedOnlyValues,
    /// A node was added, removed, or reparented.
    NodeAddedOrRemoved,
}

impl PaintPropertyChangeType {
    /// Returns `true` if the tree shape changed.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(self, Self::NodeAddedOrRemoved)
    }

    /// Returns `true` if anything changed.
    #[must_use]
    pub const fn is_changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

bitflags::bitflags! {
    /// Animation context of an update.
    ///
    /// Supplied by the caller with each update. A value change that is
    /// entirely driven by an animation already running on the compositor is
    /// reported as [`PaintPropertyChangeType::ChangedOnlyCompositedValues`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AnimationState: u8 {
        /// A transform animation is running on the compositor.
        const TRANSFORM_ON_COMPOSITOR = 0b0000_0001;
        /// An opacity animation is running on the compositor.
        const OPACITY_ON_COMPOSITOR = 0b0000_0010;
        /// A backdrop-filter animation is running on the compositor.
        const BACKDROP_FILTER_ON_COMPOSITOR = 0b0000_0100;
    }
}
