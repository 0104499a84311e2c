// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared element tree for scope integration tests.

#![allow(
    missing_docs,
    reason = "Integration-test helper module; not part of the public API."
)]
#![allow(
    dead_code,
    reason = "Each test binary uses a different subset of the helpers."
)]

use std::rc::Rc;

use understory_style_scope::{ScopeTree, StyleScopeData, StyleSheetContents};

#[derive(Debug, Default)]
struct Node {
    parent: Option<usize>,
    name: String,
    id: Option<String>,
    classes: Vec<String>,
    scope_data: Option<StyleScopeData>,
}

/// Elements are indices into a flat node list.
#[derive(Debug, Default)]
pub(crate) struct TestTree {
    nodes: Vec<Node>,
}

impl TestTree {
    /// Creates a tree holding a single `html` root, element 0.
    pub(crate) fn new() -> Self {
        let mut tree = Self::default();
        tree.nodes.push(Node {
            name: "html".into(),
            ..Node::default()
        });
        tree
    }

    pub(crate) fn append(&mut self, parent: usize, name: &str) -> usize {
        assert!(parent < self.nodes.len(), "unknown parent {parent}");
        self.nodes.push(Node {
            parent: Some(parent),
            name: name.into(),
            ..Node::default()
        });
        self.nodes.len() - 1
    }

    /// Appends an element with classes given as `name.class.class`.
    pub(crate) fn append_with_classes(&mut self, parent: usize, selector: &str) -> usize {
        let mut parts = selector.split('.');
        let element = self.append(parent, parts.next().unwrap_or("div"));
        for class in parts {
            self.add_class(element, class);
        }
        element
    }

    pub(crate) fn set_id(&mut self, element: usize, id: &str) {
        self.nodes[element].id = Some(id.into());
    }

    pub(crate) fn add_class(&mut self, element: usize, class: &str) {
        self.nodes[element].classes.push(class.into());
    }

    pub(crate) fn scope_data_mut(&mut self, element: usize) -> &mut StyleScopeData {
        self.nodes[element].scope_data.get_or_insert_with(StyleScopeData::new)
    }

    /// Attaches a `<style>` sheet owned by `element`.
    pub(crate) fn attach_sheet(&mut self, element: usize, contents: &Rc<StyleSheetContents>) {
        self.scope_data_mut(element).attach_sheet(contents);
    }

    /// Inclusive ancestors of `element`, root first.
    pub(crate) fn path_from_root(&self, element: usize) -> Vec<usize> {
        let mut path: Vec<_> =
            std::iter::successors(Some(element), |&e| self.nodes[e].parent).collect();
        path.reverse();
        path
    }
}

impl ScopeTree for TestTree {
    type Element = usize;

    fn parent_or_shadow_host(&self, element: usize) -> Option<usize> {
        self.nodes[element].parent
    }

    fn style_scope_data(&self, element: usize) -> Option<&StyleScopeData> {
        self.nodes[element].scope_data.as_ref()
    }

    fn local_name(&self, element: usize) -> &str {
        &self.nodes[element].name
    }

    fn id(&self, element: usize) -> Option<&str> {
        self.nodes[element].id.as_deref()
    }

    fn has_class(&self, element: usize, class: &str) -> bool {
        self.nodes[element].classes.iter().any(|c| c == class)
    }
}
