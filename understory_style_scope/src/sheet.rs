// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parsed sheet contents and shared scope identity.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use cssparser::{Delimiter, ParseError, Parser, ParserInput, Token};
use hashbrown::HashMap;

use crate::error::{ScopeParseError, ScopeParseErrorKind};
use crate::scope::{ScopeId, StyleScope, StyleScopeTable, parse_prelude};

/// At-rules whose block holds a nested rule list.
const GROUPING_RULES: &[&str] = &["media", "supports", "layer", "container"];

/// The scope-relevant part of a parsed style sheet.
///
/// Only `@scope` rules are retained, including rules nested in other
/// `@scope` rules and in conditional group rules. Contents are immutable and
/// usually shared through a [`StyleSheetCache`].
#[derive(Debug, Default)]
pub struct StyleSheetContents {
    scopes: StyleScopeTable,
    dropped: usize,
}

impl StyleSheetContents {
    /// Parses sheet text, dropping malformed `@scope` rules with their blocks.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut contents = Self::default();
        let mut input = ParserInput::new(text);
        let mut parser = Parser::new(&mut input);
        contents.parse_rule_list(&mut parser, None);
        contents
    }

    /// The scopes, in source order.
    #[must_use]
    pub fn scopes(&self) -> &StyleScopeTable {
        &self.scopes
    }

    /// Number of `@scope` rules dropped for malformed preludes.
    #[must_use]
    pub fn dropped_rule_count(&self) -> usize {
        self.dropped
    }

    /// Returns a handle for `id`, or `None` if `id` is not in this sheet.
    #[must_use]
    pub fn handle(self: &Rc<Self>, id: ScopeId) -> Option<ScopeHandle> {
        self.scopes.get(id)?;
        Some(ScopeHandle {
            contents: Rc::clone(self),
            id,
        })
    }

    /// Handles for every scope in the sheet.
    pub fn all_scopes(self: &Rc<Self>) -> impl Iterator<Item = ScopeHandle> + '_ {
        self.scopes.iter().map(|(id, _)| ScopeHandle {
            contents: Rc::clone(self),
            id,
        })
    }

    /// Handles for the implicit scopes, whose root is the sheet's owner element.
    pub fn implicit_scopes(self: &Rc<Self>) -> impl Iterator<Item = ScopeHandle> + '_ {
        self.all_scopes().filter(|handle| handle.scope().is_implicit())
    }

    fn parse_rule_list<'i>(&mut self, input: &mut Parser<'i, '_>, parent: Option<ScopeId>) {
        loop {
            let token = match input.next() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
            match token {
                Token::AtKeyword(name) if name.eq_ignore_ascii_case("scope") => {
                    self.parse_scope_rule(input, parent);
                }
                Token::AtKeyword(name)
                    if GROUPING_RULES
                        .iter()
                        .any(|rule| name.eq_ignore_ascii_case(rule)) =>
                {
                    if skip_to_block(input) {
                        self.parse_nested_rules(input, parent);
                    }
                }
                Token::AtKeyword(_) => {
                    skip_to_block(input);
                }
                Token::CurlyBracketBlock | Token::Semicolon => {}
                // A style rule: its prelude runs up to the declaration block.
                _ => {
                    skip_to_block(input);
                }
            }
        }
    }

    fn parse_scope_rule<'i>(&mut self, input: &mut Parser<'i, '_>, parent: Option<ScopeId>) {
        let prelude = input.parse_until_before(
            Delimiter::CurlyBracketBlock | Delimiter::Semicolon,
            |input| parse_prelude(input),
        );
        let has_block = matches!(input.next(), Ok(Token::CurlyBracketBlock));
        let bounds = match prelude {
            Ok(bounds) if has_block => bounds,
            Ok(_) => {
                tracing::debug!("dropping @scope rule without a block");
                self.dropped += 1;
                return;
            }
            Err(error) => {
                let error = ScopeParseError::from(error);
                tracing::debug!(%error, "dropping @scope rule");
                self.dropped += 1;
                if has_block {
                    skip_nested_block(input);
                }
                return;
            }
        };
        let (from, to) = bounds;
        let id = self.scopes.push(StyleScope::new(from, to, parent));
        self.parse_nested_rules(input, Some(id));
    }

    fn parse_nested_rules<'i>(&mut self, input: &mut Parser<'i, '_>, parent: Option<ScopeId>) {
        let _: Result<(), ParseError<'i, ()>> = input.parse_nested_block(|input| {
            self.parse_rule_list(input, parent);
            Ok(())
        });
    }
}

/// Skips a rule prelude. Returns `true` if it ended at a `{}` block, which is
/// then the next thing to parse.
fn skip_to_block(input: &mut Parser<'_, '_>) -> bool {
    loop {
        match input.next() {
            Ok(Token::CurlyBracketBlock) => return true,
            Ok(Token::Semicolon) | Err(_) => return false,
            Ok(_) => {}
        }
    }
}

fn skip_nested_block(input: &mut Parser<'_, '_>) {
    let _: Result<(), ParseError<'_, ScopeParseErrorKind>> =
        input.parse_nested_block(|_| Ok(()));
}

/// Identity of one scope: the shared sheet contents plus the scope's index.
///
/// Two handles are equal only if they point into the *same* contents
/// allocation. Textually identical sheets share contents through
/// [`StyleSheetCache`] and therefore share handles; independently parsed
/// contents never compare equal.
#[derive(Clone)]
pub struct ScopeHandle {
    contents: Rc<StyleSheetContents>,
    id: ScopeId,
}

impl ScopeHandle {
    /// The scope's index in its sheet.
    #[must_use]
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// The sheet contents holding the scope.
    #[must_use]
    pub fn contents(&self) -> &Rc<StyleSheetContents> {
        &self.contents
    }

    /// The scope.
    #[must_use]
    pub fn scope(&self) -> &StyleScope {
        &self.contents.scopes[self.id]
    }

    /// The enclosing scope.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let parent = self.scope().parent()?;
        Some(Self {
            contents: Rc::clone(&self.contents),
            id: parent,
        })
    }

    /// Memoized specificity of the scope.
    #[must_use]
    pub fn specificity(&self) -> u32 {
        self.scope().specificity(&self.contents.scopes)
    }
}

impl PartialEq for ScopeHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.contents, &other.contents) && self.id == other.id
    }
}

impl Eq for ScopeHandle {}

impl Hash for ScopeHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.contents).hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for ScopeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeHandle")
            .field("contents", &Rc::as_ptr(&self.contents))
            .field("id", &self.id)
            .finish()
    }
}

/// Shares parsed contents between textually identical sheets.
#[derive(Debug, Default)]
pub struct StyleSheetCache {
    entries: HashMap<Box<str>, Rc<StyleSheetContents>>,
}

impl StyleSheetCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the contents for `text`, parsing it on first use.
    pub fn get_or_parse(&mut self, text: &str) -> Rc<StyleSheetContents> {
        if let Some(contents) = self.entries.get(text) {
            return Rc::clone(contents);
        }
        let contents = Rc::new(StyleSheetContents::parse(text));
        tracing::trace!(
            scopes = contents.scopes().len(),
            dropped = contents.dropped_rule_count(),
            "parsed style sheet contents"
        );
        self.entries.insert(text.into(), Rc::clone(&contents));
        contents
    }

    /// Number of cached sheets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops contents no longer referenced outside the cache. Returns the
    /// number of entries removed.
    pub fn purge_unused(&mut self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, contents| Rc::strong_count(contents) > 1);
        before - self.entries.len()
    }
}
