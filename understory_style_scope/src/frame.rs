// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element style recalc frames.

use core::cell::{OnceCell, RefCell};
use core::fmt;
use core::hash::Hash;
use std::rc::Rc;

use hashbrown::{HashMap, HashSet};

use crate::activation::StyleScopeActivations;
use crate::sheet::ScopeHandle;
use crate::tree::ScopeTree;

/// A persistent set of scopes.
///
/// Clones share storage. The first insertion of a scope not already present
/// into a shared set copies it; after that the copy is owned and grows in
/// place.
#[derive(Clone, Debug, Default)]
pub struct ScopeSet {
    scopes: Rc<HashSet<ScopeHandle>>,
}

impl ScopeSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `scope` is in the set.
    #[must_use]
    pub fn contains(&self, scope: &ScopeHandle) -> bool {
        self.scopes.contains(scope)
    }

    /// Adds `scope`. Returns `true` if it was not present.
    pub fn insert(&mut self, scope: &ScopeHandle) -> bool {
        if self.contains(scope) {
            return false;
        }
        Rc::make_mut(&mut self.scopes).insert(scope.clone())
    }

    /// Number of scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Iterates the scopes in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &ScopeHandle> + '_ {
        self.scopes.iter()
    }

    /// Returns `true` if both sets share one allocation.
    #[must_use]
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.scopes, &other.scopes)
    }

    fn insert_triggered_by<T: ScopeTree + ?Sized>(&mut self, tree: &T, element: T::Element) {
        if let Some(data) = tree.style_scope_data(element) {
            for scope in data.triggered_scopes() {
                self.insert(scope);
            }
        }
    }
}

/// One element's frame in a depth-first style recalc.
///
/// Frames live on the traversal's call stack and link to the frame of an
/// enclosing element, which need not be the immediate parent when recalc
/// starts below the root or skips clean subtrees. Everything a frame computes
/// is cached for its lifetime; scope membership of the ancestor chain cannot
/// change during one pass.
///
/// ```
/// use understory_style_scope::StyleScopeFrame;
///
/// let root = StyleScopeFrame::new(0_u32, None);
/// let child = StyleScopeFrame::new(1, Some(&root));
/// assert!(child.parent_frame_or_none(0).is_some());
/// assert!(child.parent_frame_or_none(7).is_none());
/// ```
pub struct StyleScopeFrame<'a, E> {
    element: E,
    parent: Option<&'a StyleScopeFrame<'a, E>>,
    seen: OnceCell<ScopeSet>,
    activations: RefCell<HashMap<ScopeHandle, Rc<StyleScopeActivations<E>>>>,
}

impl<'a, E: Copy + Eq + Hash + fmt::Debug> StyleScopeFrame<'a, E> {
    /// Creates a frame for `element` below `parent`.
    #[must_use]
    pub fn new(element: E, parent: Option<&'a Self>) -> Self {
        Self {
            element,
            parent,
            seen: OnceCell::new(),
            activations: RefCell::new(HashMap::new()),
        }
    }

    /// The frame's element.
    #[must_use]
    pub fn element(&self) -> E {
        self.element
    }

    /// The enclosing frame, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&'a Self> {
        self.parent
    }

    /// Returns the enclosing frame only if it is the frame for `element`.
    #[must_use]
    pub fn parent_frame_or_none(&self, element: E) -> Option<&'a Self> {
        self.parent.filter(|parent| parent.element == element)
    }

    /// Returns `true` if `scope` is triggered by this element or any ancestor.
    pub fn has_seen_implicit_scope<T>(&self, tree: &T, scope: &ScopeHandle) -> bool
    where
        T: ScopeTree<Element = E> + ?Sized,
    {
        self.seen_scopes(tree).contains(scope)
    }

    /// Implicit scopes triggered along the inclusive ancestor chain.
    ///
    /// With the frame for the parent-or-shadow-host on the stack, this starts
    /// from that frame's set and shares it unless this element triggers a new
    /// scope. Otherwise it walks the whole ancestor chain.
    pub fn seen_scopes<T>(&self, tree: &T) -> &ScopeSet
    where
        T: ScopeTree<Element = E> + ?Sized,
    {
        self.seen.get_or_init(|| {
            let parent = tree.parent_or_shadow_host(self.element);
            let mut seen = match parent.and_then(|parent| self.parent_frame_or_none(parent)) {
                Some(frame) => frame.seen_scopes(tree).clone(),
                None => {
                    tracing::trace!(element = ?self.element, "walking ancestors for seen scopes");
                    let mut seen = ScopeSet::new();
                    let mut ancestor = parent;
                    while let Some(element) = ancestor {
                        seen.insert_triggered_by(tree, element);
                        ancestor = tree.parent_or_shadow_host(element);
                    }
                    seen
                }
            };
            seen.insert_triggered_by(tree, self.element);
            seen
        })
    }

    pub(crate) fn cached_activations(
        &self,
        scope: &ScopeHandle,
    ) -> Option<Rc<StyleScopeActivations<E>>> {
        self.activations.borrow().get(scope).cloned()
    }

    pub(crate) fn cache_activations(
        &self,
        scope: &ScopeHandle,
        activations: Rc<StyleScopeActivations<E>>,
    ) {
        self.activations
            .borrow_mut()
            .insert(scope.clone(), activations);
    }
}

impl<E: fmt::Debug> fmt::Debug for StyleScopeFrame<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleScopeFrame")
            .field("element", &self.element)
            .field("parent", &self.parent.map(|parent| &parent.element))
            .field("seen", &self.seen.get())
            .field("activations", &self.activations.borrow().len())
            .finish()
    }
}
