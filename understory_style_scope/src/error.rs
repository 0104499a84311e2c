// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `@scope` prelude parse errors.

use cssparser::{BasicParseErrorKind, ParseError, ParseErrorKind, ToCss};

/// What went wrong while parsing an `@scope` prelude.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScopeParseErrorKind {
    /// A parenthesized boundary was not closed, or a stray `)` appeared.
    #[error("unbalanced parenthesis")]
    UnbalancedBlock,
    /// `to` was not followed by a parenthesized selector list.
    #[error("expected a parenthesized selector list")]
    ExpectedSelectorBlock,
    /// A selector was empty or malformed.
    #[error("invalid selector")]
    InvalidSelector,
    /// A selector used syntax this engine does not match.
    #[error("unsupported selector syntax `{0}`")]
    UnsupportedSelector(String),
    /// An unexpected token.
    #[error("unexpected `{0}`")]
    UnexpectedToken(String),
    /// Input remained after the prelude.
    #[error("unexpected `{0}` after the scope prelude")]
    TrailingInput(String),
    /// The input ended early.
    #[error("unexpected end of input")]
    UnexpectedEnd,
}

/// A malformed `@scope` prelude.
///
/// Parse failures drop the rule; they never fail the containing sheet.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {line}:{column}")]
pub struct ScopeParseError {
    /// What went wrong.
    pub kind: ScopeParseErrorKind,
    /// Zero-based line of the offending token.
    pub line: u32,
    /// One-based column of the offending token.
    pub column: u32,
}

impl<'i> From<ParseError<'i, ScopeParseErrorKind>> for ScopeParseError {
    fn from(error: ParseError<'i, ScopeParseErrorKind>) -> Self {
        let kind = match error.kind {
            ParseErrorKind::Custom(kind) => kind,
            ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => {
                ScopeParseErrorKind::UnexpectedEnd
            }
            ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
                ScopeParseErrorKind::UnexpectedToken(token.to_css_string())
            }
            ParseErrorKind::Basic(_) => ScopeParseErrorKind::InvalidSelector,
        };
        Self {
            kind,
            line: error.location.line,
            column: error.location.column,
        }
    }
}
