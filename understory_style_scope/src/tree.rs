// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt::Debug;
use core::hash::Hash;

use crate::data::StyleScopeData;

/// The element tree that scopes are matched against.
///
/// Implemented by the embedder's DOM. Elements are small copyable keys
/// (indices or ids); the tree answers structural and selector queries for them.
pub trait ScopeTree {
    /// Element key.
    type Element: Copy + Eq + Hash + Debug;

    /// Parent element, or the shadow host for the root of a shadow tree.
    fn parent_or_shadow_host(&self, element: Self::Element) -> Option<Self::Element>;

    /// Scopes triggered at `element`, if the element has any scope data.
    fn style_scope_data(&self, element: Self::Element) -> Option<&StyleScopeData>;

    /// Lowercase local name.
    fn local_name(&self, element: Self::Element) -> &str;

    /// The `id` attribute.
    fn id(&self, element: Self::Element) -> Option<&str>;

    /// Returns `true` if `element` has `class` in its class list.
    fn has_class(&self, element: Self::Element, class: &str) -> bool;

    /// Returns `true` if the dynamic pseudo-class `name` (without the colon)
    /// applies to `element`. Defaults to never matching.
    fn has_pseudo_class(&self, element: Self::Element, name: &str) -> bool {
        let _ = (element, name);
        false
    }
}
