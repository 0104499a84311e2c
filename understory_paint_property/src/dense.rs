// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;

use crate::config::BackendKind;
use crate::node::{
    ClipPaintPropertyNode, EffectPaintPropertyNode, PaintPropertyNode, ScrollPaintPropertyNode,
    TransformPaintPropertyNode,
};
use crate::slot::{NodeSlot, PropertyTree};
use crate::state::NodeState;
use crate::storage::{NodeRef, PaintPropertyStorage, sealed};

/// One pointer per slot, grouped by tree.
#[derive(Debug, Default)]
pub struct DenseStorage {
    pub(crate) transforms: [Option<Rc<TransformPaintPropertyNode>>; 12],
    pub(crate) effects: [Option<Rc<EffectPaintPropertyNode>>; 9],
    pub(crate) clips: [Option<Rc<ClipPaintPropertyNode>>; 10],
    pub(crate) scroll: Option<Rc<ScrollPaintPropertyNode>>,
}

impl sealed::Sealed for DenseStorage {}

impl PaintPropertyStorage for DenseStorage {
    #[inline]
    fn node<S: NodeState>(&self, slot: NodeSlot) -> Option<&Rc<PaintPropertyNode<S>>> {
        debug_assert_eq!(slot.tree(), S::TREE, "{slot:?} is not a {:?} slot", S::TREE);
        S::dense(self).get(slot.tree_index())?.as_ref()
    }

    #[inline]
    fn insert_node<S: NodeState>(&mut self, slot: NodeSlot, node: Rc<PaintPropertyNode<S>>) {
        debug_assert_eq!(slot.tree(), S::TREE, "{slot:?} is not a {:?} slot", S::TREE);
        if let Some(entry) = S::dense_mut(self).get_mut(slot.tree_index()) {
            *entry = Some(node);
        }
    }

    fn remove_node(&mut self, slot: NodeSlot) -> bool {
        let index = slot.tree_index();
        match slot.tree() {
            PropertyTree::Transform => self.transforms[index].take().is_some(),
            PropertyTree::Effect => self.effects[index].take().is_some(),
            PropertyTree::Clip => self.clips[index].take().is_some(),
            PropertyTree::Scroll => self.scroll.take().is_some(),
        }
    }

    fn node_ref(&self, slot: NodeSlot) -> Option<NodeRef> {
        let index = slot.tree_index();
        match slot.tree() {
            PropertyTree::Transform => self.transforms[index].clone().map(NodeRef::Transform),
            PropertyTree::Effect => self.effects[index].clone().map(NodeRef::Effect),
            PropertyTree::Clip => self.clips[index].clone().map(NodeRef::Clip),
            PropertyTree::Scroll => self.scroll.clone().map(NodeRef::Scroll),
        }
    }

    #[inline]
    fn contains(&self, slot: NodeSlot) -> bool {
        let index = slot.tree_index();
        match slot.tree() {
            PropertyTree::Transform => self.transforms[index].is_some(),
            PropertyTree::Effect => self.effects[index].is_some(),
            PropertyTree::Clip => self.clips[index].is_some(),
            PropertyTree::Scroll => self.scroll.is_some(),
        }
    }

    fn has_node_in(&self, tree: PropertyTree) -> bool {
        match tree {
            PropertyTree::Transform => self.transforms.iter().any(Option::is_some),
            PropertyTree::Effect => self.effects.iter().any(Option::is_some),
            PropertyTree::Clip => self.clips.iter().any(Option::is_some),
            PropertyTree::Scroll => self.scroll.is_some(),
        }
    }

    fn node_count(&self) -> usize {
        self.transforms.iter().filter(|n| n.is_some()).count()
            + self.effects.iter().filter(|n| n.is_some()).count()
            + self.clips.iter().filter(|n| n.is_some()).count()
            + usize::from(self.scroll.is_some())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Dense
    }
}
