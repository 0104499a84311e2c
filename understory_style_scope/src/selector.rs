// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scope boundary selectors.
//!
//! `@scope` boundaries are selector lists. This module supports the subset
//! needed to place scoping roots and limits: type and universal selectors,
//! `#id`, `.class`, pseudo-classes (with `:scope` resolved against the
//! scoping root), and the descendant and child combinators. Anything else is
//! rejected at parse time, which drops the rule.

use core::fmt;

use cssparser::{ParseError, Parser, ParserInput, ToCss, Token};
use smallvec::SmallVec;

use crate::error::{ScopeParseError, ScopeParseErrorKind};
use crate::tree::ScopeTree;

const ID_SPECIFICITY: u32 = 0x10000;
const CLASS_SPECIFICITY: u32 = 0x100;
const TYPE_SPECIFICITY: u32 = 1;

/// A pseudo-class in a compound selector.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    /// `:scope`, the scoping root (or the root element when unscoped).
    Scope,
    /// Any other pseudo-class, answered by [`ScopeTree::has_pseudo_class`].
    Other(Box<str>),
}

/// One simple selector.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleSelector {
    /// `*`.
    Universal,
    /// A lowercase type selector.
    Type(Box<str>),
    /// `#id`.
    Id(Box<str>),
    /// `.class`.
    Class(Box<str>),
    /// `:pseudo`.
    PseudoClass(PseudoClass),
}

impl SimpleSelector {
    fn specificity(&self) -> u32 {
        match self {
            Self::Universal => 0,
            Self::Type(_) => TYPE_SPECIFICITY,
            Self::Id(_) => ID_SPECIFICITY,
            Self::Class(_) | Self::PseudoClass(_) => CLASS_SPECIFICITY,
        }
    }

    fn matches<T: ScopeTree + ?Sized>(
        &self,
        tree: &T,
        element: T::Element,
        scope: Option<T::Element>,
    ) -> bool {
        match self {
            Self::Universal => true,
            Self::Type(name) => tree.local_name(element).eq_ignore_ascii_case(name),
            Self::Id(id) => tree.id(element) == Some(&**id),
            Self::Class(class) => tree.has_class(element, class),
            Self::PseudoClass(PseudoClass::Scope) => match scope {
                Some(scope) => element == scope,
                None => tree.parent_or_shadow_host(element).is_none(),
            },
            Self::PseudoClass(PseudoClass::Other(name)) => tree.has_pseudo_class(element, name),
        }
    }
}

/// Relation between two compounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Whitespace: any ancestor.
    Descendant,
    /// `>`: the parent.
    Child,
}

/// A sequence of simple selectors that all apply to one element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompoundSelector {
    simple: SmallVec<[SimpleSelector; 2]>,
}

impl CompoundSelector {
    /// The simple selectors, in source order.
    #[must_use]
    pub fn simple_selectors(&self) -> &[SimpleSelector] {
        &self.simple
    }

    fn specificity(&self) -> u32 {
        self.simple.iter().map(SimpleSelector::specificity).sum()
    }

    fn matches<T: ScopeTree + ?Sized>(
        &self,
        tree: &T,
        element: T::Element,
        scope: Option<T::Element>,
    ) -> bool {
        self.simple
            .iter()
            .all(|simple| simple.matches(tree, element, scope))
    }

    fn parse<'i>(input: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i, ScopeParseErrorKind>> {
        let mut simple = SmallVec::new();
        loop {
            let state = input.state();
            let token = match input.next_including_whitespace() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
            match token {
                Token::Ident(name) if simple.is_empty() => {
                    simple.push(SimpleSelector::Type(name.to_ascii_lowercase().into()));
                }
                Token::Delim('*') if simple.is_empty() => simple.push(SimpleSelector::Universal),
                Token::IDHash(id) => simple.push(SimpleSelector::Id(Box::from(&*id))),
                Token::Delim('.') => {
                    simple.push(SimpleSelector::Class(expect_adjacent_ident(input)?));
                }
                Token::Colon => {
                    let name = expect_adjacent_ident(input)?;
                    let pseudo = if name.eq_ignore_ascii_case("scope") {
                        PseudoClass::Scope
                    } else {
                        PseudoClass::Other(name.to_ascii_lowercase().into())
                    };
                    simple.push(SimpleSelector::PseudoClass(pseudo));
                }
                Token::WhiteSpace(_) | Token::Delim('>') => {
                    input.reset(&state);
                    break;
                }
                other => {
                    return Err(input.new_custom_error(ScopeParseErrorKind::UnsupportedSelector(
                        other.to_css_string(),
                    )));
                }
            }
        }
        if simple.is_empty() {
            return Err(input.new_custom_error(ScopeParseErrorKind::InvalidSelector));
        }
        Ok(Self { simple })
    }
}

fn expect_adjacent_ident<'i>(
    input: &mut Parser<'i, '_>,
) -> Result<Box<str>, ParseError<'i, ScopeParseErrorKind>> {
    let location = input.current_source_location();
    match input.next_including_whitespace()? {
        Token::Ident(name) => Ok(Box::from(&**name)),
        other => {
            let other = other.clone();
            Err(location.new_unexpected_token_error(other))
        }
    }
}

/// Compounds joined by combinators.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComplexSelector {
    // Rightmost (subject) compound first.
    compounds: Vec<CompoundSelector>,
    // `combinators[i]` relates `compounds[i]` to `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// Specificity: ids, classes and pseudo-classes, types, packed as
    /// `ids * 0x10000 + classes * 0x100 + types`.
    #[must_use]
    pub fn specificity(&self) -> u32 {
        self.compounds.iter().map(CompoundSelector::specificity).sum()
    }

    /// The subject compound.
    #[must_use]
    pub fn subject(&self) -> &CompoundSelector {
        &self.compounds[0]
    }

    /// Returns `true` if `element` matches, resolving `:scope` to `scope`.
    #[must_use]
    pub fn matches<T: ScopeTree + ?Sized>(
        &self,
        tree: &T,
        element: T::Element,
        scope: Option<T::Element>,
    ) -> bool {
        self.matches_from(0, tree, element, scope)
    }

    fn matches_from<T: ScopeTree + ?Sized>(
        &self,
        index: usize,
        tree: &T,
        element: T::Element,
        scope: Option<T::Element>,
    ) -> bool {
        if !self.compounds[index].matches(tree, element, scope) {
            return false;
        }
        let Some(combinator) = self.combinators.get(index) else {
            return true;
        };
        let mut ancestor = tree.parent_or_shadow_host(element);
        match combinator {
            Combinator::Child => {
                ancestor.is_some_and(|parent| self.matches_from(index + 1, tree, parent, scope))
            }
            Combinator::Descendant => {
                while let Some(candidate) = ancestor {
                    if self.matches_from(index + 1, tree, candidate, scope) {
                        return true;
                    }
                    ancestor = tree.parent_or_shadow_host(candidate);
                }
                false
            }
        }
    }

    fn parse<'i>(input: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i, ScopeParseErrorKind>> {
        let mut compounds = vec![CompoundSelector::parse(input)?];
        let mut combinators = Vec::new();
        loop {
            let mut combinator = None;
            loop {
                let state = input.state();
                match input.next_including_whitespace() {
                    Ok(Token::WhiteSpace(_)) => {
                        combinator = combinator.or(Some(Combinator::Descendant));
                    }
                    Ok(Token::Delim('>')) if combinator != Some(Combinator::Child) => {
                        combinator = Some(Combinator::Child);
                    }
                    Ok(_) => {
                        input.reset(&state);
                        break;
                    }
                    Err(_) if combinator == Some(Combinator::Child) => {
                        return Err(input.new_custom_error(ScopeParseErrorKind::UnexpectedEnd));
                    }
                    Err(_) => {
                        compounds.reverse();
                        combinators.reverse();
                        return Ok(Self {
                            compounds,
                            combinators,
                        });
                    }
                }
            }
            let Some(combinator) = combinator else {
                return Err(input.new_custom_error(ScopeParseErrorKind::InvalidSelector));
            };
            compounds.push(CompoundSelector::parse(input)?);
            combinators.push(combinator);
        }
    }
}

/// A comma-separated list of complex selectors.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SelectorList {
    selectors: Box<[ComplexSelector]>,
}

impl SelectorList {
    /// Parses a standalone selector list.
    pub fn parse(text: &str) -> Result<Self, ScopeParseError> {
        let mut input = ParserInput::new(text);
        let mut parser = Parser::new(&mut input);
        Ok(parser.parse_entirely(|input| Self::parse_from(input))?)
    }

    pub(crate) fn parse_from<'i>(
        input: &mut Parser<'i, '_>,
    ) -> Result<Self, ParseError<'i, ScopeParseErrorKind>> {
        let selectors = input.parse_comma_separated(|input| ComplexSelector::parse(input))?;
        Ok(Self {
            selectors: selectors.into_boxed_slice(),
        })
    }

    /// The alternatives.
    #[must_use]
    pub fn selectors(&self) -> &[ComplexSelector] {
        &self.selectors
    }

    /// Highest specificity among the alternatives.
    #[must_use]
    pub fn maximum_specificity(&self) -> u32 {
        self.selectors
            .iter()
            .map(ComplexSelector::specificity)
            .max()
            .unwrap_or(0)
    }

    /// Returns `true` if any alternative matches `element`.
    #[must_use]
    pub fn matches<T: ScopeTree + ?Sized>(
        &self,
        tree: &T,
        element: T::Element,
        scope: Option<T::Element>,
    ) -> bool {
        self.selectors
            .iter()
            .any(|selector| selector.matches(tree, element, scope))
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Universal => f.write_str("*"),
            Self::Type(name) => f.write_str(name),
            Self::Id(id) => write!(f, "#{id}"),
            Self::Class(class) => write!(f, ".{class}"),
            Self::PseudoClass(PseudoClass::Scope) => f.write_str(":scope"),
            Self::PseudoClass(PseudoClass::Other(name)) => write!(f, ":{name}"),
        }
    }
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, compound) in self.compounds.iter().enumerate().rev() {
            for simple in &compound.simple {
                write!(f, "{simple}")?;
            }
            match index.checked_sub(1).map(|i| self.combinators[i]) {
                Some(Combinator::Descendant) => f.write_str(" ")?,
                Some(Combinator::Child) => f.write_str(" > ")?,
                None => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, selector) in self.selectors.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}
