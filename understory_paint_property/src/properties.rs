// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object paint property nodes.

use alloc::rc::Rc;

use crate::change::{AnimationState, PaintPropertyChangeType};
use crate::config::BackendKind;
use crate::error::{PaintPropertyError, PaintPropertyInvariant};
use crate::node::{
    ClipPaintPropertyNode, EffectPaintPropertyNode, PaintPropertyNode, ScrollPaintPropertyNode,
    TransformPaintPropertyNode,
};
use crate::slot::{ClipSlot, EffectSlot, NodeSlot, PropertyTree, TransformSlot};
use crate::state::{ClipState, EffectState, NodeState, ScrollState, TransformAndOrigin, TransformState};
use crate::storage::{Backend, NodeRef, PaintPropertyStorage};

/// The paint property nodes created for one layout object.
///
/// Each [`NodeSlot`] holds at most one node. Nodes are created on the first
/// update of an empty slot, updated in place afterwards, and dropped by the
/// matching `clear_*` call. Every update reports a [`PaintPropertyChangeType`]
/// so the caller can tell value changes from changes to the tree shape.
///
/// The storage layout is a type parameter. [`ObjectPaintProperties::new`]
/// uses the process-wide [`Backend`]; [`DenseStorage`](crate::DenseStorage)
/// and [`SparseStorage`](crate::SparseStorage) can be named directly.
///
/// While [immutable](Self::set_immutable), any update that would change a
/// node is rejected with [`PaintPropertyError::ImmutabilityViolated`] and has
/// no effect.
#[derive(Debug, Default)]
pub struct ObjectPaintProperties<B: PaintPropertyStorage = Backend> {
    storage: B,
    immutable: bool,
}

impl ObjectPaintProperties<Backend> {
    /// Creates an empty object using the [selected backend](crate::selected_backend).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: PaintPropertyStorage> ObjectPaintProperties<B> {
    /// Storage layout in use.
    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.storage.kind()
    }

    // Transform tree.

    /// Returns the transform node in `slot`.
    #[must_use]
    pub fn transform(&self, slot: TransformSlot) -> Option<&Rc<TransformPaintPropertyNode>> {
        self.storage.node(slot.into())
    }

    /// Creates or updates the transform node in `slot`.
    pub fn update_transform(
        &mut self,
        slot: TransformSlot,
        parent: &Rc<TransformPaintPropertyNode>,
        state: TransformState,
        animation: AnimationState,
    ) -> Result<PaintPropertyChangeType, PaintPropertyError> {
        self.update_node(slot.into(), parent, state, animation)
    }

    /// Removes the transform node in `slot`, returning `true` if one was present.
    pub fn clear_transform(&mut self, slot: TransformSlot) -> Result<bool, PaintPropertyError> {
        self.clear_node(slot.into())
    }

    /// Returns the transform isolation alias.
    #[must_use]
    pub fn transform_isolation_node(&self) -> Option<&Rc<TransformPaintPropertyNode>> {
        self.storage.node(NodeSlot::TransformIsolationNode)
    }

    /// Creates the transform isolation alias under `parent`, or reparents it.
    pub fn update_transform_isolation_node(
        &mut self,
        parent: &Rc<TransformPaintPropertyNode>,
    ) -> Result<PaintPropertyChangeType, PaintPropertyError> {
        self.update_alias(NodeSlot::TransformIsolationNode, parent)
    }

    /// Removes the transform isolation alias.
    pub fn clear_transform_isolation_node(&mut self) -> Result<bool, PaintPropertyError> {
        self.clear_node(NodeSlot::TransformIsolationNode)
    }

    /// The CSS transform nodes, outermost first: `translate`, `rotate`,
    /// `scale`, `offset`, then `transform`. Absent nodes are `None`.
    #[must_use]
    pub fn all_css_transform_properties_outside_to_inside(
        &self,
    ) -> [Option<&Rc<TransformPaintPropertyNode>>; 5] {
        [
            TransformSlot::Translate,
            TransformSlot::Rotate,
            TransformSlot::Scale,
            TransformSlot::Offset,
            TransformSlot::Transform,
        ]
        .map(|slot| self.transform(slot))
    }

    // Effect tree.

    /// Returns the effect node in `slot`.
    #[must_use]
    pub fn effect(&self, slot: EffectSlot) -> Option<&Rc<EffectPaintPropertyNode>> {
        self.storage.node(slot.into())
    }

    /// Creates or updates the effect node in `slot`.
    pub fn update_effect(
        &mut self,
        slot: EffectSlot,
        parent: &Rc<EffectPaintPropertyNode>,
        state: EffectState,
        animation: AnimationState,
    ) -> Result<PaintPropertyChangeType, PaintPropertyError> {
        self.update_node(slot.into(), parent, state, animation)
    }

    /// Removes the effect node in `slot`, returning `true` if one was present.
    pub fn clear_effect(&mut self, slot: EffectSlot) -> Result<bool, PaintPropertyError> {
        self.clear_node(slot.into())
    }

    /// Returns the effect isolation alias.
    #[must_use]
    pub fn effect_isolation_node(&self) -> Option<&Rc<EffectPaintPropertyNode>> {
        self.storage.node(NodeSlot::EffectIsolationNode)
    }

    /// Creates the effect isolation alias under `parent`, or reparents it.
    pub fn update_effect_isolation_node(
        &mut self,
        parent: &Rc<EffectPaintPropertyNode>,
    ) -> Result<PaintPropertyChangeType, PaintPropertyError> {
        self.update_alias(NodeSlot::EffectIsolationNode, parent)
    }

    /// Removes the effect isolation alias.
    pub fn clear_effect_isolation_node(&mut self) -> Result<bool, PaintPropertyError> {
        self.clear_node(NodeSlot::EffectIsolationNode)
    }

    // Clip tree.

    /// Returns the clip node in `slot`.
    #[must_use]
    pub fn clip(&self, slot: ClipSlot) -> Option<&Rc<ClipPaintPropertyNode>> {
        self.storage.node(slot.into())
    }

    /// Creates or updates the clip node in `slot`.
    pub fn update_clip(
        &mut self,
        slot: ClipSlot,
        parent: &Rc<ClipPaintPropertyNode>,
        state: ClipState,
        animation: AnimationState,
    ) -> Result<PaintPropertyChangeType, PaintPropertyError> {
        self.update_node(slot.into(), parent, state, animation)
    }

    /// Removes the clip node in `slot`, returning `true` if one was present.
    pub fn clear_clip(&mut self, slot: ClipSlot) -> Result<bool, PaintPropertyError> {
        self.clear_node(slot.into())
    }

    /// Returns the clip isolation alias.
    #[must_use]
    pub fn clip_isolation_node(&self) -> Option<&Rc<ClipPaintPropertyNode>> {
        self.storage.node(NodeSlot::ClipIsolationNode)
    }

    /// Creates the clip isolation alias under `parent`, or reparents it.
    pub fn update_clip_isolation_node(
        &mut self,
        parent: &Rc<ClipPaintPropertyNode>,
    ) -> Result<PaintPropertyChangeType, PaintPropertyError> {
        self.update_alias(NodeSlot::ClipIsolationNode, parent)
    }

    /// Removes the clip isolation alias.
    pub fn clear_clip_isolation_node(&mut self) -> Result<bool, PaintPropertyError> {
        self.clear_node(NodeSlot::ClipIsolationNode)
    }

    // Scroll tree.

    /// Returns the scroll node.
    #[must_use]
    pub fn scroll(&self) -> Option<&Rc<ScrollPaintPropertyNode>> {
        self.storage.node(NodeSlot::Scroll)
    }

    /// Creates or updates the scroll node.
    pub fn update_scroll(
        &mut self,
        parent: &Rc<ScrollPaintPropertyNode>,
        state: ScrollState,
    ) -> Result<PaintPropertyChangeType, PaintPropertyError> {
        self.update_node(NodeSlot::Scroll, parent, state, AnimationState::empty())
    }

    /// Removes the scroll node, returning `true` if one was present.
    pub fn clear_scroll(&mut self) -> Result<bool, PaintPropertyError> {
        self.clear_node(NodeSlot::Scroll)
    }

    // Aggregates.

    /// Returns `true` if any transform slot, including the isolation alias, is populated.
    #[must_use]
    pub fn has_transform_node(&self) -> bool {
        self.storage.has_node_in(PropertyTree::Transform)
    }

    /// Returns `true` if any effect slot, including the isolation alias, is populated.
    #[must_use]
    pub fn has_effect_node(&self) -> bool {
        self.storage.has_node_in(PropertyTree::Effect)
    }

    /// Returns `true` if any clip slot, including the isolation alias, is populated.
    #[must_use]
    pub fn has_clip_node(&self) -> bool {
        self.storage.has_node_in(PropertyTree::Clip)
    }

    /// Returns `true` if the scroll slot is populated.
    #[must_use]
    pub fn has_scroll_node(&self) -> bool {
        self.storage.has_node_in(PropertyTree::Scroll)
    }

    /// Returns `true` if no slot is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.node_count() == 0
    }

    /// Number of populated slots.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.storage.node_count()
    }

    /// Returns the node in any slot.
    #[must_use]
    pub fn node_ref(&self, slot: NodeSlot) -> Option<NodeRef> {
        self.storage.node_ref(slot)
    }

    /// Iterates populated slots whose node recorded a change.
    pub fn changed_slots(&self) -> impl Iterator<Item = (NodeSlot, PaintPropertyChangeType)> + '_ {
        NodeSlot::ALL.into_iter().filter_map(|slot| {
            let change = self.storage.node_ref(slot)?.changed();
            change.is_changed().then_some((slot, change))
        })
    }

    /// Clears the recorded change on every node, typically after the
    /// compositor mirror has been synced.
    pub fn clear_all_changed(&self) {
        for slot in NodeSlot::ALL {
            if let Some(node) = self.storage.node_ref(slot) {
                node.clear_changed();
            }
        }
    }

    // Direct updates.

    /// Replaces the matrix and origin of the [`Transform`](TransformSlot::Transform)
    /// node, keeping the rest of its state.
    ///
    /// Used by animations that know the node exists. Fails with
    /// [`PaintPropertyError::MissingNode`] otherwise.
    pub fn directly_update_transform_and_origin(
        &mut self,
        transform_and_origin: TransformAndOrigin,
        animation: AnimationState,
    ) -> Result<PaintPropertyChangeType, PaintPropertyError> {
        let slot = NodeSlot::Transform;
        let Some(node) = self.storage.node::<TransformState>(slot) else {
            tracing::warn!(?slot, "direct transform update without a transform node");
            return Err(PaintPropertyError::MissingNode(slot));
        };
        if self.immutable {
            let next = node.edited(|state| state.transform_and_origin = transform_and_origin);
            guard(slot, node.preview_state(&next, animation))?;
        }
        Ok(node.directly_update_transform_and_origin(transform_and_origin, animation))
    }

    /// Replaces the opacity of the [`Effect`](EffectSlot::Effect) node,
    /// keeping the rest of its state.
    ///
    /// Fails with [`PaintPropertyError::MissingNode`] if there is no effect node.
    pub fn directly_update_opacity(
        &mut self,
        opacity: f32,
        animation: AnimationState,
    ) -> Result<PaintPropertyChangeType, PaintPropertyError> {
        let slot = NodeSlot::Effect;
        let Some(node) = self.storage.node::<EffectState>(slot) else {
            tracing::warn!(?slot, "direct opacity update without an effect node");
            return Err(PaintPropertyError::MissingNode(slot));
        };
        if self.immutable {
            let next = node.edited(|state| state.opacity = opacity);
            guard(slot, node.preview_state(&next, animation))?;
        }
        Ok(node.directly_update_opacity(opacity, animation))
    }

    // Consistency.

    /// Checks the slot combination rules.
    ///
    /// Meant to run after a complete update pass; intermediate states may
    /// violate these rules.
    pub fn validate(&self) -> Result<(), PaintPropertyError> {
        let has = |slot| self.storage.contains(slot);
        if has(NodeSlot::ScrollTranslation) && has(NodeSlot::ReplacedContentTransform) {
            return Err(PaintPropertyError::InvariantViolated(
                PaintPropertyInvariant::ScrollTranslationWithReplacedContent,
            ));
        }
        if has(NodeSlot::ClipPathClip) && has(NodeSlot::ClipPathMask) {
            return Err(PaintPropertyError::InvariantViolated(
                PaintPropertyInvariant::ClipPathClipWithClipPathMask,
            ));
        }
        let isolation = [
            NodeSlot::TransformIsolationNode,
            NodeSlot::EffectIsolationNode,
            NodeSlot::ClipIsolationNode,
        ]
        .into_iter()
        .filter(|slot| has(*slot))
        .count();
        if isolation != 0 && isolation != 3 {
            return Err(PaintPropertyError::InvariantViolated(
                PaintPropertyInvariant::PartialIsolation,
            ));
        }
        Ok(())
    }

    /// Panics in debug builds if [`validate`](Self::validate) fails.
    #[track_caller]
    pub fn debug_validate(&self) {
        if cfg!(debug_assertions)
            && let Err(error) = self.validate()
        {
            panic!("{error}");
        }
    }

    // Immutability.

    /// Rejects further changes until [`set_mutable`](Self::set_mutable).
    pub fn set_immutable(&mut self) {
        self.immutable = true;
    }

    /// Allows changes again.
    pub fn set_mutable(&mut self) {
        self.immutable = false;
    }

    /// Returns `true` while changes are rejected.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    fn update_node<S: NodeState>(
        &mut self,
        slot: NodeSlot,
        parent: &Rc<PaintPropertyNode<S>>,
        state: S,
        animation: AnimationState,
    ) -> Result<PaintPropertyChangeType, PaintPropertyError> {
        if let Some(node) = self.storage.node::<S>(slot) {
            if self.immutable {
                guard(slot, node.preview_update(parent, &state, animation))?;
            }
            return Ok(node.update(parent, state, animation));
        }
        if self.immutable {
            guard(slot, PaintPropertyChangeType::NodeAddedOrRemoved)?;
        }
        self.storage
            .insert_node(slot, PaintPropertyNode::create(parent, state, animation));
        tracing::trace!(?slot, "created paint property node");
        Ok(PaintPropertyChangeType::NodeAddedOrRemoved)
    }

    fn update_alias<S: NodeState>(
        &mut self,
        slot: NodeSlot,
        parent: &Rc<PaintPropertyNode<S>>,
    ) -> Result<PaintPropertyChangeType, PaintPropertyError> {
        if let Some(node) = self.storage.node::<S>(slot) {
            if self.immutable && !node.has_parent(parent) {
                guard(slot, PaintPropertyChangeType::ChangedOnlyValues)?;
            }
            return Ok(node.set_parent(parent));
        }
        if self.immutable {
            guard(slot, PaintPropertyChangeType::NodeAddedOrRemoved)?;
        }
        self.storage
            .insert_node(slot, PaintPropertyNode::create_alias(parent));
        tracing::trace!(?slot, "created isolation node");
        Ok(PaintPropertyChangeType::NodeAddedOrRemoved)
    }

    fn clear_node(&mut self, slot: NodeSlot) -> Result<bool, PaintPropertyError> {
        if !self.storage.contains(slot) {
            return Ok(false);
        }
        if self.immutable {
            guard(slot, PaintPropertyChangeType::NodeAddedOrRemoved)?;
        }
        let removed = self.storage.remove_node(slot);
        tracing::trace!(?slot, "removed paint property node");
        Ok(removed)
    }
}

fn guard(slot: NodeSlot, change: PaintPropertyChangeType) -> Result<(), PaintPropertyError> {
    if change.is_changed() {
        Err(PaintPropertyError::ImmutabilityViolated { slot, change })
    } else {
        Ok(())
    }
}
