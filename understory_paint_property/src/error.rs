// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract violations reported by paint property storage.

use crate::change::PaintPropertyChangeType;
use crate::config::BackendKind;
use crate::slot::NodeSlot;

/// A consistency rule between slots of one object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PaintPropertyInvariant {
    /// A scroll translation and a replaced content transform are both present.
    ScrollTranslationWithReplacedContent,
    /// A clip-path clip and a clip-path mask are both present.
    ClipPathClipWithClipPathMask,
    /// Some, but not all, isolation nodes are present.
    PartialIsolation,
}

/// Errors returned by [`ObjectPaintProperties`](crate::ObjectPaintProperties).
///
/// All of these are caller bugs: they signal that the update pipeline asked
/// for something the object cannot do in its current state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PaintPropertyError {
    /// A direct update targeted a node that does not exist.
    #[error("no {0:?} node is present")]
    MissingNode(NodeSlot),
    /// A mutation was attempted while the properties were immutable.
    #[error("{slot:?} would change ({change:?}) while paint properties are immutable")]
    ImmutabilityViolated {
        /// Slot that would have changed.
        slot: NodeSlot,
        /// The change that was rejected.
        change: PaintPropertyChangeType,
    },
    /// [`validate`](crate::ObjectPaintProperties::validate) found an inconsistent slot combination.
    #[error("paint property invariant violated: {0:?}")]
    InvariantViolated(PaintPropertyInvariant),
    /// A different storage backend was already selected for this process.
    #[error("cannot select the {requested:?} backend, {selected:?} is already in use")]
    BackendAlreadySelected {
        /// The backend that was requested.
        requested: BackendKind,
        /// The backend in use.
        selected: BackendKind,
    },
}
