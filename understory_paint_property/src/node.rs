// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference-counted property tree nodes.

use alloc::rc::Rc;
use core::cell::{Cell, Ref, RefCell};
use core::fmt;

use crate::change::{AnimationState, PaintPropertyChangeType};
use crate::state::{ClipState, EffectState, NodeState, ScrollState, TransformAndOrigin, TransformState};

/// A node in one of the property trees.
///
/// Nodes are shared: a node is owned by the [`ObjectPaintProperties`](crate::ObjectPaintProperties)
/// that created it and referenced by its children, which may belong to other
/// objects. Only the owner mutates a node, through `&self` methods, because
/// children keep the node alive while it is updated in place.
///
/// A node remembers the most severe change since its flag was last cleared
/// ([`changed`](Self::changed)), so a compositor mirror can find what to sync.
pub struct PaintPropertyNode<S> {
    parent: RefCell<Option<Rc<Self>>>,
    state: RefCell<S>,
    changed: Cell<PaintPropertyChangeType>,
    animation: Cell<AnimationState>,
    is_alias: bool,
}

/// A transform tree node.
pub type TransformPaintPropertyNode = PaintPropertyNode<TransformState>;
/// An effect tree node.
pub type EffectPaintPropertyNode = PaintPropertyNode<EffectState>;
/// A clip tree node.
pub type ClipPaintPropertyNode = PaintPropertyNode<ClipState>;
/// A scroll tree node.
pub type ScrollPaintPropertyNode = PaintPropertyNode<ScrollState>;

impl<S: NodeState> PaintPropertyNode<S> {
    /// Creates a parentless root node.
    #[must_use]
    pub fn root(state: S) -> Rc<Self> {
        Rc::new(Self {
            parent: RefCell::new(None),
            state: RefCell::new(state),
            changed: Cell::new(PaintPropertyChangeType::Unchanged),
            animation: Cell::new(AnimationState::empty()),
            is_alias: false,
        })
    }

    /// Creates a node under `parent`.
    ///
    /// New nodes start out flagged as [`NodeAddedOrRemoved`](PaintPropertyChangeType::NodeAddedOrRemoved).
    #[must_use]
    pub fn create(parent: &Rc<Self>, state: S, animation: AnimationState) -> Rc<Self> {
        Rc::new(Self {
            parent: RefCell::new(Some(Rc::clone(parent))),
            state: RefCell::new(state),
            changed: Cell::new(PaintPropertyChangeType::NodeAddedOrRemoved),
            animation: Cell::new(animation),
            is_alias: false,
        })
    }

    /// Creates a stateless alias of `parent`, marking an isolation boundary.
    #[must_use]
    pub fn create_alias(parent: &Rc<Self>) -> Rc<Self> {
        Rc::new(Self {
            parent: RefCell::new(Some(Rc::clone(parent))),
            state: RefCell::new(S::default()),
            changed: Cell::new(PaintPropertyChangeType::NodeAddedOrRemoved),
            animation: Cell::new(AnimationState::empty()),
            is_alias: true,
        })
    }

    /// Returns the parent node, `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<Rc<Self>> {
        self.parent.borrow().clone()
    }

    /// Returns `true` if `parent` is this node's parent.
    #[must_use]
    pub fn has_parent(&self, parent: &Rc<Self>) -> bool {
        self.parent
            .borrow()
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, parent))
    }

    /// Borrows the current state.
    ///
    /// Alias nodes always report the default state.
    #[must_use]
    pub fn state(&self) -> Ref<'_, S> {
        self.state.borrow()
    }

    /// Returns `true` for isolation aliases.
    #[must_use]
    pub fn is_alias(&self) -> bool {
        self.is_alias
    }

    /// Returns `true` if this node has no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.borrow().is_none()
    }

    /// Returns the nearest inclusive ancestor that is not an alias.
    #[must_use]
    pub fn unalias(self: &Rc<Self>) -> Rc<Self> {
        let mut node = Rc::clone(self);
        while node.is_alias {
            let Some(parent) = node.parent() else { break };
            node = parent;
        }
        node
    }

    /// Returns `true` if this node is a strict ancestor of `node`.
    #[must_use]
    pub fn is_ancestor_of(&self, node: &Self) -> bool {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if core::ptr::eq(&*ancestor, self) {
                return true;
            }
            current = ancestor.parent();
        }
        false
    }

    /// Returns the most severe change recorded since the last [`clear_changed`](Self::clear_changed).
    #[must_use]
    pub fn changed(&self) -> PaintPropertyChangeType {
        self.changed.get()
    }

    /// Resets the recorded change.
    pub fn clear_changed(&self) {
        self.changed.set(PaintPropertyChangeType::Unchanged);
    }

    /// Animation state supplied with the last update.
    #[must_use]
    pub fn animation_state(&self) -> AnimationState {
        self.animation.get()
    }

    /// Computes what [`update`](Self::update) would report, without applying it.
    #[must_use]
    pub fn preview_update(
        &self,
        parent: &Rc<Self>,
        state: &S,
        animation: AnimationState,
    ) -> PaintPropertyChangeType {
        if !self.has_parent(parent) {
            return PaintPropertyChangeType::NodeAddedOrRemoved;
        }
        self.preview_state(state, animation)
    }

    /// Updates parent and state.
    ///
    /// Reparenting is reported as [`NodeAddedOrRemoved`](PaintPropertyChangeType::NodeAddedOrRemoved):
    /// the node moves to a different place in the tree.
    pub fn update(
        &self,
        parent: &Rc<Self>,
        state: S,
        animation: AnimationState,
    ) -> PaintPropertyChangeType {
        debug_assert!(!self.is_alias, "alias nodes are updated through set_parent");
        if self.has_parent(parent) {
            return self.update_state(state, animation);
        }
        *self.parent.borrow_mut() = Some(Rc::clone(parent));
        *self.state.borrow_mut() = state;
        self.animation.set(animation);
        self.add_changed(PaintPropertyChangeType::NodeAddedOrRemoved);
        PaintPropertyChangeType::NodeAddedOrRemoved
    }

    /// Computes what [`update_state`](Self::update_state) would report.
    #[must_use]
    pub fn preview_state(&self, state: &S, animation: AnimationState) -> PaintPropertyChangeType {
        self.state.borrow().compute_change(state, animation)
    }

    /// Updates the state, keeping the parent.
    pub fn update_state(&self, state: S, animation: AnimationState) -> PaintPropertyChangeType {
        let change = self.preview_state(&state, animation);
        self.animation.set(animation);
        if change.is_changed() {
            *self.state.borrow_mut() = state;
            self.add_changed(change);
        }
        change
    }

    /// Reparents an alias node.
    ///
    /// Moving an alias is a value change: the isolation boundary stays in place.
    pub fn set_parent(&self, parent: &Rc<Self>) -> PaintPropertyChangeType {
        debug_assert!(self.is_alias, "only alias nodes are reparented directly");
        if self.has_parent(parent) {
            return PaintPropertyChangeType::Unchanged;
        }
        *self.parent.borrow_mut() = Some(Rc::clone(parent));
        self.add_changed(PaintPropertyChangeType::ChangedOnlyValues);
        PaintPropertyChangeType::ChangedOnlyValues
    }

    pub(crate) fn edited(&self, edit: impl FnOnce(&mut S)) -> S {
        let mut next = self.state.borrow().clone();
        edit(&mut next);
        next
    }

    fn add_changed(&self, change: PaintPropertyChangeType) {
        self.changed.set(self.changed.get().max(change));
    }
}

impl TransformPaintPropertyNode {
    /// Replaces the matrix and origin in place, keeping all other state.
    pub fn directly_update_transform_and_origin(
        &self,
        transform_and_origin: TransformAndOrigin,
        animation: AnimationState,
    ) -> PaintPropertyChangeType {
        let next = self.edited(|state| state.transform_and_origin = transform_and_origin);
        self.update_state(next, animation)
    }

    /// Returns the current matrix and origin.
    #[must_use]
    pub fn transform_and_origin(&self) -> TransformAndOrigin {
        self.state().transform_and_origin
    }
}

impl EffectPaintPropertyNode {
    /// Replaces the opacity in place, keeping all other state.
    pub fn directly_update_opacity(
        &self,
        opacity: f32,
        animation: AnimationState,
    ) -> PaintPropertyChangeType {
        let next = self.edited(|state| state.opacity = opacity);
        self.update_state(next, animation)
    }

    /// Returns the current opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.state().opacity
    }
}

impl<S: NodeState> fmt::Debug for PaintPropertyNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Parents are summarized; printing them would walk to the root.
        f.debug_struct("PaintPropertyNode")
            .field("tree", &S::TREE)
            .field("is_alias", &self.is_alias)
            .field("is_root", &self.is_root())
            .field("changed", &self.changed.get())
            .field("animation", &self.animation.get())
            .field("state", &*self.state.borrow())
            .finish()
    }
}
