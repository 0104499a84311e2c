// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Style Scope: implicit CSS `@scope` tracking for style recalc.
//!
//! An `@scope` rule limits its style rules to a subtree. Its prelude names the
//! scoping roots (`from`) and the limits below which the scope stops (`to`):
//!
//! ```css
//! @scope (.card) to (.content) { img { border: 1px solid } }
//! ```
//!
//! A rule without `from` is *implicit*: its root is the element that owns the
//! style sheet. This crate records which elements are implicit roots and
//! answers, during a depth-first recalc, which scopes are in effect.
//!
//! ## Core Concepts
//!
//! - [`StyleScope`]: one rule's boundaries, parsed from its prelude, linked to
//!   its enclosing rule by [`ScopeId`].
//! - [`StyleSheetContents`] and [`StyleSheetCache`]: parsed sheets. Textually
//!   identical sheets share one contents object, so their scopes share one
//!   identity, a [`ScopeHandle`].
//! - [`StyleScopeData`]: the implicit scopes an element triggers.
//! - [`StyleScopeFrame`]: one element's frame in the recalc stack. It caches
//!   which implicit scopes its ancestor chain has seen, sharing the parent
//!   frame's set until the element adds a scope of its own.
//! - [`calculate_activations`]: the roots of a scope in effect at an element,
//!   with their proximity.
//!
//! The element tree is abstract; embedders implement [`ScopeTree`].
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_style_scope::{ScopeTree, StyleScopeData, StyleScopeFrame, StyleSheetCache};
//!
//! // html > [body > style-owner > p, aside]
//! struct Tree {
//!     parents: [Option<usize>; 5],
//!     data: [Option<StyleScopeData>; 5],
//! }
//!
//! impl ScopeTree for Tree {
//!     type Element = usize;
//!
//!     fn parent_or_shadow_host(&self, element: usize) -> Option<usize> {
//!         self.parents[element]
//!     }
//!     fn style_scope_data(&self, element: usize) -> Option<&StyleScopeData> {
//!         self.data[element].as_ref()
//!     }
//!     fn local_name(&self, _: usize) -> &str {
//!         "div"
//!     }
//!     fn id(&self, _: usize) -> Option<&str> {
//!         None
//!     }
//!     fn has_class(&self, _: usize, _: &str) -> bool {
//!         false
//!     }
//! }
//!
//! let mut cache = StyleSheetCache::new();
//! let contents = cache.get_or_parse("@scope { p { color: green } }");
//! let scope = contents.implicit_scopes().next().unwrap();
//!
//! let mut owner = StyleScopeData::new();
//! owner.attach_sheet(&contents);
//! let tree = Tree {
//!     parents: [None, Some(0), Some(1), Some(2), Some(0)],
//!     data: [None, None, Some(owner), None, None],
//! };
//!
//! let html = StyleScopeFrame::new(0, None);
//! let body = StyleScopeFrame::new(1, Some(&html));
//! let owner = StyleScopeFrame::new(2, Some(&body));
//! let p = StyleScopeFrame::new(3, Some(&owner));
//! assert!(p.has_seen_implicit_scope(&tree, &scope));
//!
//! let aside = StyleScopeFrame::new(4, Some(&html));
//! assert!(!aside.has_seen_implicit_scope(&tree, &scope));
//! ```
//!
//! ## Selectors
//!
//! Scope boundaries use a selector subset; see [`selector`]. Malformed or
//! unsupported preludes drop the rule and are logged with `tracing` at debug
//! level, as CSS requires of invalid at-rules.

mod activation;
mod data;
mod error;
mod frame;
mod scope;
pub mod selector;
mod sheet;
mod tree;

pub use activation::{StyleScopeActivation, StyleScopeActivations, calculate_activations};
pub use data::StyleScopeData;
pub use error::{ScopeParseError, ScopeParseErrorKind};
pub use frame::{ScopeSet, StyleScopeFrame};
pub use scope::{ScopeId, StyleScope, StyleScopeTable};
pub use selector::SelectorList;
pub use sheet::{ScopeHandle, StyleSheetCache, StyleSheetContents};
pub use tree::ScopeTree;
