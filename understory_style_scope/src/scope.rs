// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `@scope` rules.

use core::cell::OnceCell;
use core::ops::Index;

use cssparser::{ParseError, Parser, ParserInput, ToCss, Token};

use crate::error::{ScopeParseError, ScopeParseErrorKind};
use crate::selector::SelectorList;

/// Index of a [`StyleScope`] in its [`StyleScopeTable`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    /// Position in the table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The boundaries of one `@scope` rule.
///
/// `from` places scoping roots and `to` places scoping limits. A scope without
/// `from` is *implicit*: its root is the owner element of the sheet. Nested
/// rules link to their enclosing scope by [`ScopeId`] within the same table.
///
/// Immutable after construction; [`copy_with_parent`](Self::copy_with_parent)
/// makes a re-parented copy.
#[derive(Debug)]
pub struct StyleScope {
    from: Option<SelectorList>,
    to: Option<SelectorList>,
    parent: Option<ScopeId>,
    specificity: OnceCell<u32>,
}

impl StyleScope {
    /// Creates a scope from parsed boundaries.
    #[must_use]
    pub fn new(from: Option<SelectorList>, to: Option<SelectorList>, parent: Option<ScopeId>) -> Self {
        Self {
            from,
            to,
            parent,
            specificity: OnceCell::new(),
        }
    }

    /// Parses a prelude and appends the scope to `table`.
    ///
    /// Returns `None` if the prelude is malformed; the rule is dropped.
    pub fn parse(prelude: &str, table: &mut StyleScopeTable, parent: Option<ScopeId>) -> Option<ScopeId> {
        match Self::try_parse(prelude, parent) {
            Ok(scope) => Some(table.push(scope)),
            Err(error) => {
                tracing::debug!(%error, prelude, "dropping @scope rule");
                None
            }
        }
    }

    /// Parses `[(<from>)]? [to (<to>)]?`.
    pub fn try_parse(prelude: &str, parent: Option<ScopeId>) -> Result<Self, ScopeParseError> {
        let mut input = ParserInput::new(prelude);
        let mut parser = Parser::new(&mut input);
        let (from, to) = parse_prelude(&mut parser)?;
        Ok(Self::new(from, to, parent))
    }

    /// Copies the boundaries under a new parent. `self` is left untouched.
    ///
    /// `parent` refers to the table the copy will be pushed into.
    #[must_use]
    pub fn copy_with_parent(&self, parent: Option<ScopeId>) -> Self {
        Self::new(self.from.clone(), self.to.clone(), parent)
    }

    /// Root selectors, `None` for implicit scopes.
    #[must_use]
    pub fn from(&self) -> Option<&SelectorList> {
        self.from.as_ref()
    }

    /// Limit selectors.
    #[must_use]
    pub fn to(&self) -> Option<&SelectorList> {
        self.to.as_ref()
    }

    /// Enclosing scope.
    #[must_use]
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Returns `true` if the scope has no `from` boundary.
    #[must_use]
    pub fn is_implicit(&self) -> bool {
        self.from.is_none()
    }

    /// Highest `from` specificity plus the parent scope's specificity.
    ///
    /// Computed on first use and memoized. `table` must be the table that
    /// holds this scope's parent.
    pub fn specificity(&self, table: &StyleScopeTable) -> u32 {
        *self.specificity.get_or_init(|| {
            let own = self.from.as_ref().map_or(0, SelectorList::maximum_specificity);
            let inherited = self
                .parent
                .and_then(|parent| table.get(parent))
                .map_or(0, |parent| parent.specificity(table));
            own.saturating_add(inherited)
        })
    }
}

pub(crate) fn parse_prelude<'i>(
    input: &mut Parser<'i, '_>,
) -> Result<(Option<SelectorList>, Option<SelectorList>), ParseError<'i, ScopeParseErrorKind>> {
    let from = parse_boundary(input)?;
    let to = if input.try_parse(|input| input.expect_ident_matching("to")).is_ok() {
        match parse_boundary(input)? {
            Some(to) => Some(to),
            None => {
                return Err(input.new_custom_error(ScopeParseErrorKind::ExpectedSelectorBlock));
            }
        }
    } else {
        None
    };
    let location = input.current_source_location();
    if let Ok(token) = input.next() {
        let kind = match token {
            Token::CloseParenthesis => ScopeParseErrorKind::UnbalancedBlock,
            other => ScopeParseErrorKind::TrailingInput(other.to_css_string()),
        };
        return Err(location.new_custom_error(kind));
    }
    Ok((from, to))
}

fn parse_boundary<'i>(
    input: &mut Parser<'i, '_>,
) -> Result<Option<SelectorList>, ParseError<'i, ScopeParseErrorKind>> {
    input.skip_whitespace();
    let start = input.position();
    let location = input.current_source_location();
    if input
        .try_parse(|input| input.expect_parenthesis_block())
        .is_err()
    {
        return Ok(None);
    }
    let list = input.parse_nested_block(|input| SelectorList::parse_from(input))?;
    // The tokenizer closes blocks at end of input.
    if !input.slice_from(start).ends_with(')') {
        return Err(location.new_custom_error(ScopeParseErrorKind::UnbalancedBlock));
    }
    Ok(Some(list))
}

/// The scopes of one sheet, addressed by [`ScopeId`].
#[derive(Debug, Default)]
pub struct StyleScopeTable {
    scopes: Vec<StyleScope>,
}

impl StyleScopeTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `scope`.
    ///
    /// # Panics
    ///
    /// Panics if the scope's parent is not already in the table, or if the
    /// table holds `u32::MAX` scopes.
    pub fn push(&mut self, scope: StyleScope) -> ScopeId {
        assert!(
            scope.parent.is_none_or(|parent| parent.index() < self.scopes.len()),
            "parent scope must precede its children"
        );
        let id = ScopeId(u32::try_from(self.scopes.len()).expect("scope table overflow"));
        self.scopes.push(scope);
        id
    }

    /// Returns the scope for `id`.
    #[must_use]
    pub fn get(&self, id: ScopeId) -> Option<&StyleScope> {
        self.scopes.get(id.index())
    }

    /// Number of scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Iterates scopes with their ids, in source order.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "push keeps the length within u32"
    )]
    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &StyleScope)> + '_ {
        self.scopes
            .iter()
            .enumerate()
            .map(|(index, scope)| (ScopeId(index as u32), scope))
    }

    /// Walks `id` and its enclosing scopes, innermost first.
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        core::iter::successors(Some(id), |id| self.get(*id).and_then(StyleScope::parent))
    }
}

impl Index<ScopeId> for StyleScopeTable {
    type Output = StyleScope;

    fn index(&self, id: ScopeId) -> &StyleScope {
        &self.scopes[id.index()]
    }
}
