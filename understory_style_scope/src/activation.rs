// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scoping roots active at an element.

use std::rc::Rc;

use smallvec::SmallVec;

use crate::frame::StyleScopeFrame;
use crate::sheet::ScopeHandle;
use crate::tree::ScopeTree;

/// A scoping root in effect at some element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StyleScopeActivation<E> {
    /// The root element, or `None` for the document itself.
    pub root: Option<E>,
    /// Hops from the root down to the element.
    pub proximity: u32,
}

/// The scoping roots of one scope that are in effect at one element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleScopeActivations<E> {
    activations: SmallVec<[StyleScopeActivation<E>; 1]>,
}

impl<E: Copy> StyleScopeActivations<E> {
    fn empty() -> Self {
        Self {
            activations: SmallVec::new(),
        }
    }

    /// The activation used for scopes without an enclosing scope: rooted at
    /// the document, infinitely far away.
    #[must_use]
    pub fn document() -> Self {
        let mut activations = SmallVec::new();
        activations.push(StyleScopeActivation {
            root: None,
            proximity: u32::MAX,
        });
        Self { activations }
    }

    /// Activations, outermost root first.
    #[must_use]
    pub fn as_slice(&self) -> &[StyleScopeActivation<E>] {
        &self.activations
    }

    /// Returns `true` if the scope is not in effect.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activations.is_empty()
    }

    /// The activation with the nearest root, which wins in the cascade.
    #[must_use]
    pub fn nearest(&self) -> Option<StyleScopeActivation<E>> {
        self.activations
            .iter()
            .min_by_key(|activation| activation.proximity)
            .copied()
    }
}

/// Computes the roots of `scope` that are in effect at `element`.
///
/// Roots are inherited from the parent element unless `element` is a scoping
/// limit (`to`) for that root. `element` becomes a new root if it matches
/// `from` (with `:scope` meaning the enclosing scope's root) or, for an
/// implicit scope, if it triggers the scope. Nested scopes only look for
/// roots within their enclosing scope's roots.
///
/// `frame` must be the frame for `element` if given. Results are cached in it
/// and in enclosing frames, so repeated queries during one recalc stay linear
/// in the tree size.
pub fn calculate_activations<T>(
    tree: &T,
    element: T::Element,
    scope: &ScopeHandle,
    frame: Option<&StyleScopeFrame<'_, T::Element>>,
) -> Rc<StyleScopeActivations<T::Element>>
where
    T: ScopeTree + ?Sized,
{
    debug_assert!(
        frame.is_none_or(|frame| frame.element() == element),
        "frame must belong to the element"
    );
    let outer = match scope.parent() {
        Some(parent) => calculate_activations(tree, element, &parent, frame),
        None => Rc::new(StyleScopeActivations::document()),
    };
    ensure_activations(tree, element, scope, &outer, frame)
}

fn ensure_activations<T>(
    tree: &T,
    element: T::Element,
    scope: &ScopeHandle,
    outer: &StyleScopeActivations<T::Element>,
    frame: Option<&StyleScopeFrame<'_, T::Element>>,
) -> Rc<StyleScopeActivations<T::Element>>
where
    T: ScopeTree + ?Sized,
{
    if let Some(cached) = frame.and_then(|frame| frame.cached_activations(scope)) {
        return cached;
    }
    let activations = Rc::new(compute_activations(tree, element, scope, outer, frame));
    if let Some(frame) = frame {
        frame.cache_activations(scope, Rc::clone(&activations));
    }
    activations
}

fn compute_activations<T>(
    tree: &T,
    element: T::Element,
    scope: &ScopeHandle,
    outer: &StyleScopeActivations<T::Element>,
    frame: Option<&StyleScopeFrame<'_, T::Element>>,
) -> StyleScopeActivations<T::Element>
where
    T: ScopeTree + ?Sized,
{
    let mut activations = StyleScopeActivations::empty();
    let Some(ceiling) = outer.activations.first() else {
        return activations;
    };

    // Stay within the outermost enclosing root.
    if ceiling.root != Some(element)
        && let Some(parent) = tree.parent_or_shadow_host(element)
    {
        let parent_frame = frame.and_then(|frame| frame.parent_frame_or_none(parent));
        let inherited = ensure_activations(tree, parent, scope, outer, parent_frame);
        for activation in &inherited.activations {
            if !is_scoping_limit(tree, scope, activation.root, element) {
                activations.activations.push(StyleScopeActivation {
                    root: activation.root,
                    proximity: activation.proximity.saturating_add(1),
                });
            }
        }
    }

    let style_scope = scope.scope();
    for outer_activation in &outer.activations {
        let is_root = match style_scope.from() {
            Some(from) => from.matches(tree, element, outer_activation.root),
            None => tree
                .style_scope_data(element)
                .is_some_and(|data| data.triggers_scope(scope)),
        };
        if is_root {
            // `@scope (.x) to (.x)` limits its own roots.
            if !is_scoping_limit(tree, scope, Some(element), element) {
                activations.activations.push(StyleScopeActivation {
                    root: Some(element),
                    proximity: 0,
                });
            }
            break;
        }
    }
    activations
}

fn is_scoping_limit<T>(
    tree: &T,
    scope: &ScopeHandle,
    root: Option<T::Element>,
    element: T::Element,
) -> bool
where
    T: ScopeTree + ?Sized,
{
    scope
        .scope()
        .to()
        .is_some_and(|to| to.matches(tree, element, root))
}
