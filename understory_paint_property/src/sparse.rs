// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;

use understory_sparse_vec::SparseVector;

use crate::config::BackendKind;
use crate::node::PaintPropertyNode;
use crate::slot::{NodeSlot, PropertyTree};
use crate::state::NodeState;
use crate::storage::{NodeRef, PaintPropertyStorage, sealed};

/// Present nodes only, packed in slot order.
#[derive(Debug, Default)]
pub struct SparseStorage {
    nodes: SparseVector<NodeSlot, NodeRef>,
}

impl sealed::Sealed for SparseStorage {}

impl PaintPropertyStorage for SparseStorage {
    #[inline]
    fn node<S: NodeState>(&self, slot: NodeSlot) -> Option<&Rc<PaintPropertyNode<S>>> {
        debug_assert_eq!(slot.tree(), S::TREE, "{slot:?} is not a {:?} slot", S::TREE);
        self.nodes.field(slot).and_then(S::unwrap)
    }

    #[inline]
    fn insert_node<S: NodeState>(&mut self, slot: NodeSlot, node: Rc<PaintPropertyNode<S>>) {
        debug_assert_eq!(slot.tree(), S::TREE, "{slot:?} is not a {:?} slot", S::TREE);
        self.nodes.set_field(slot, S::wrap(node));
    }

    fn remove_node(&mut self, slot: NodeSlot) -> bool {
        self.nodes.clear_field(slot)
    }

    fn node_ref(&self, slot: NodeSlot) -> Option<NodeRef> {
        self.nodes.field(slot).cloned()
    }

    #[inline]
    fn contains(&self, slot: NodeSlot) -> bool {
        self.nodes.has_field(slot)
    }

    #[inline]
    fn has_node_in(&self, tree: PropertyTree) -> bool {
        self.nodes
            .has_any_field_in(tree.first_slot()..=tree.last_slot())
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Sparse
    }
}
