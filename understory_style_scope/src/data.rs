// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use smallvec::SmallVec;

use crate::sheet::{ScopeHandle, StyleSheetContents};

/// Per-element record of the implicit scopes the element is the root of.
///
/// An element owning a `<style>` sheet triggers every implicit `@scope` in
/// that sheet. Most elements trigger none or one, so the list is inline for a
/// single entry.
#[derive(Clone, Debug, Default)]
pub struct StyleScopeData {
    triggered: SmallVec<[ScopeHandle; 1]>,
}

impl StyleScopeData {
    /// Creates empty scope data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that this element triggers `scope`. Adding a scope twice is a
    /// no-op.
    pub fn add_triggered_implicit_scope(&mut self, scope: ScopeHandle) {
        if !self.triggers_scope(&scope) {
            self.triggered.push(scope);
        }
    }

    /// Removes `scope`. Returns `true` if it was present.
    pub fn remove_triggered_implicit_scope(&mut self, scope: &ScopeHandle) -> bool {
        let Some(index) = self.triggered.iter().position(|s| s == scope) else {
            return false;
        };
        self.triggered.remove(index);
        true
    }

    /// Returns `true` if this element triggers `scope`.
    #[must_use]
    pub fn triggers_scope(&self, scope: &ScopeHandle) -> bool {
        self.triggered.iter().any(|s| s == scope)
    }

    /// The triggered scopes, in insertion order.
    #[must_use]
    pub fn triggered_scopes(&self) -> &[ScopeHandle] {
        &self.triggered
    }

    /// Returns `true` if nothing is triggered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggered.is_empty()
    }

    /// Triggers every implicit scope of `contents`, as when a sheet is
    /// attached to its owner element. Returns the number of scopes added.
    pub fn attach_sheet(&mut self, contents: &Rc<StyleSheetContents>) -> usize {
        let before = self.triggered.len();
        for scope in contents.implicit_scopes() {
            self.add_triggered_implicit_scope(scope);
        }
        self.triggered.len() - before
    }

    /// Removes every scope belonging to `contents`. Returns the number removed.
    pub fn detach_sheet(&mut self, contents: &Rc<StyleSheetContents>) -> usize {
        let before = self.triggered.len();
        self.triggered
            .retain(|scope| !Rc::ptr_eq(scope.contents(), contents));
        before - self.triggered.len()
    }
}
