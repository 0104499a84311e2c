// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot storage backends.
//!
//! [`ObjectPaintProperties`](crate::ObjectPaintProperties) is generic over a
//! [`PaintPropertyStorage`]. Two layouts are provided:
//!
//! - [`DenseStorage`] reserves one pointer per slot, so every lookup is a
//!   direct index.
//! - [`SparseStorage`] keeps only present nodes in a
//!   [`SparseVector`](understory_sparse_vec::SparseVector), trading a
//!   popcount per lookup for a much smaller footprint on objects with few
//!   nodes (the common case).
//!
//! [`Backend`] picks one of the two at runtime, following
//! [`selected_backend`](crate::selected_backend).

use alloc::rc::Rc;
use core::fmt;

use crate::change::PaintPropertyChangeType;
use crate::config::{BackendKind, selected_backend};
use crate::node::{
    ClipPaintPropertyNode, EffectPaintPropertyNode, PaintPropertyNode, ScrollPaintPropertyNode,
    TransformPaintPropertyNode,
};
use crate::slot::{NodeSlot, PropertyTree};
use crate::state::NodeState;

pub use crate::dense::DenseStorage;
pub use crate::sparse::SparseStorage;

/// An owned reference to a node of any tree.
#[derive(Clone, Debug)]
pub enum NodeRef {
    /// A transform node.
    Transform(Rc<TransformPaintPropertyNode>),
    /// An effect node.
    Effect(Rc<EffectPaintPropertyNode>),
    /// A clip node.
    Clip(Rc<ClipPaintPropertyNode>),
    /// A scroll node.
    Scroll(Rc<ScrollPaintPropertyNode>),
}

impl NodeRef {
    /// Tree of the referenced node.
    #[must_use]
    pub fn tree(&self) -> PropertyTree {
        match self {
            Self::Transform(_) => PropertyTree::Transform,
            Self::Effect(_) => PropertyTree::Effect,
            Self::Clip(_) => PropertyTree::Clip,
            Self::Scroll(_) => PropertyTree::Scroll,
        }
    }

    /// Most severe change recorded on the node.
    #[must_use]
    pub fn changed(&self) -> PaintPropertyChangeType {
        match self {
            Self::Transform(node) => node.changed(),
            Self::Effect(node) => node.changed(),
            Self::Clip(node) => node.changed(),
            Self::Scroll(node) => node.changed(),
        }
    }

    /// Resets the node's recorded change.
    pub fn clear_changed(&self) {
        match self {
            Self::Transform(node) => node.clear_changed(),
            Self::Effect(node) => node.clear_changed(),
            Self::Clip(node) => node.clear_changed(),
            Self::Scroll(node) => node.clear_changed(),
        }
    }

    /// Returns `true` if both references point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Transform(a), Self::Transform(b)) => Rc::ptr_eq(a, b),
            (Self::Effect(a), Self::Effect(b)) => Rc::ptr_eq(a, b),
            (Self::Clip(a), Self::Clip(b)) => Rc::ptr_eq(a, b),
            (Self::Scroll(a), Self::Scroll(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

pub(crate) mod sealed {
    #[allow(unnameable_types, reason = "sealed supertrait")]
    pub trait Sealed {}
}

pub(crate) mod stored {
    use alloc::rc::Rc;

    use super::{DenseStorage, NodeRef};
    use crate::node::PaintPropertyNode;
    use crate::state::{ClipState, EffectState, ScrollState, TransformState};

    /// Where nodes of one state type live in each backend. Also seals
    /// [`NodeState`](crate::NodeState).
    #[allow(unnameable_types, reason = "sealed supertrait")]
    pub trait StoredState: Sized {
        fn wrap(node: Rc<PaintPropertyNode<Self>>) -> NodeRef;

        fn unwrap(node: &NodeRef) -> Option<&Rc<PaintPropertyNode<Self>>>;

        fn dense(storage: &DenseStorage) -> &[Option<Rc<PaintPropertyNode<Self>>>];

        fn dense_mut(storage: &mut DenseStorage) -> &mut [Option<Rc<PaintPropertyNode<Self>>>];
    }

    macro_rules! stored_state {
        ($state:ty, $variant:ident, $field:ident) => {
            impl StoredState for $state {
                fn wrap(node: Rc<PaintPropertyNode<Self>>) -> NodeRef {
                    NodeRef::$variant(node)
                }

                fn unwrap(node: &NodeRef) -> Option<&Rc<PaintPropertyNode<Self>>> {
                    match node {
                        NodeRef::$variant(node) => Some(node),
                        _ => None,
                    }
                }

                fn dense(storage: &DenseStorage) -> &[Option<Rc<PaintPropertyNode<Self>>>] {
                    &storage.$field
                }

                fn dense_mut(
                    storage: &mut DenseStorage,
                ) -> &mut [Option<Rc<PaintPropertyNode<Self>>>] {
                    &mut storage.$field
                }
            }
        };
    }

    stored_state!(TransformState, Transform, transforms);
    stored_state!(EffectState, Effect, effects);
    stored_state!(ClipState, Clip, clips);

    impl StoredState for ScrollState {
        fn wrap(node: Rc<PaintPropertyNode<Self>>) -> NodeRef {
            NodeRef::Scroll(node)
        }

        fn unwrap(node: &NodeRef) -> Option<&Rc<PaintPropertyNode<Self>>> {
            match node {
                NodeRef::Scroll(node) => Some(node),
                _ => None,
            }
        }

        fn dense(storage: &DenseStorage) -> &[Option<Rc<PaintPropertyNode<Self>>>] {
            core::slice::from_ref(&storage.scroll)
        }

        fn dense_mut(storage: &mut DenseStorage) -> &mut [Option<Rc<PaintPropertyNode<Self>>>] {
            core::slice::from_mut(&mut storage.scroll)
        }
    }
}

/// Slot storage for one object's nodes.
///
/// Callers must pass slots that belong to `S::TREE`; the typed accessors on
/// [`ObjectPaintProperties`](crate::ObjectPaintProperties) guarantee this.
/// Both backends must be observationally identical.
pub trait PaintPropertyStorage: sealed::Sealed + Default + fmt::Debug {
    /// Returns the node in `slot`.
    fn node<S: NodeState>(&self, slot: NodeSlot) -> Option<&Rc<PaintPropertyNode<S>>>;

    /// Stores `node` in `slot`, replacing any previous node.
    fn insert_node<S: NodeState>(&mut self, slot: NodeSlot, node: Rc<PaintPropertyNode<S>>);

    /// Empties `slot`, returning `true` if it held a node.
    fn remove_node(&mut self, slot: NodeSlot) -> bool;

    /// Returns an owned reference to the node in `slot`.
    fn node_ref(&self, slot: NodeSlot) -> Option<NodeRef>;

    /// Returns `true` if `slot` holds a node.
    fn contains(&self, slot: NodeSlot) -> bool;

    /// Returns `true` if any slot of `tree` holds a node.
    fn has_node_in(&self, tree: PropertyTree) -> bool {
        let first = tree.first_slot() as usize;
        let last = tree.last_slot() as usize;
        NodeSlot::ALL[first..=last]
            .iter()
            .any(|slot| self.contains(*slot))
    }

    /// Number of occupied slots.
    fn node_count(&self) -> usize;

    /// Kind of this storage.
    fn kind(&self) -> BackendKind;
}

/// Storage chosen at runtime.
///
/// `Default` follows [`selected_backend`], latching the process-wide choice.
#[derive(Debug)]
pub enum Backend {
    /// Dense layout.
    Dense(DenseStorage),
    /// Sparse layout.
    Sparse(SparseStorage),
}

impl Backend {
    /// Creates empty storage of the given kind.
    #[must_use]
    pub fn with_kind(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Dense => Self::Dense(DenseStorage::default()),
            BackendKind::Sparse => Self::Sparse(SparseStorage::default()),
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::with_kind(selected_backend())
    }
}

impl sealed::Sealed for Backend {}

macro_rules! delegate {
    ($self:ident, $storage:ident => $body:expr) => {
        match $self {
            Backend::Dense($storage) => $body,
            Backend::Sparse($storage) => $body,
        }
    };
}

impl PaintPropertyStorage for Backend {
    #[inline]
    fn node<S: NodeState>(&self, slot: NodeSlot) -> Option<&Rc<PaintPropertyNode<S>>> {
        delegate!(self, storage => storage.node(slot))
    }

    #[inline]
    fn insert_node<S: NodeState>(&mut self, slot: NodeSlot, node: Rc<PaintPropertyNode<S>>) {
        delegate!(self, storage => storage.insert_node(slot, node));
    }

    #[inline]
    fn remove_node(&mut self, slot: NodeSlot) -> bool {
        delegate!(self, storage => storage.remove_node(slot))
    }

    #[inline]
    fn node_ref(&self, slot: NodeSlot) -> Option<NodeRef> {
        delegate!(self, storage => storage.node_ref(slot))
    }

    #[inline]
    fn contains(&self, slot: NodeSlot) -> bool {
        delegate!(self, storage => storage.contains(slot))
    }

    #[inline]
    fn has_node_in(&self, tree: PropertyTree) -> bool {
        delegate!(self, storage => storage.has_node_in(tree))
    }

    #[inline]
    fn node_count(&self) -> usize {
        delegate!(self, storage => storage.node_count())
    }

    fn kind(&self) -> BackendKind {
        delegate!(self, storage => storage.kind())
    }
}
