//! Diagnostics and error types.
//!
//! Parsing never fails: lines the parser cannot use are skipped and reported
//! as [`ParseWarning`]s. Validation collects [`ValidationError`]s, one per
//! violated rule. [`AdmissionError`] is the strict gate built on top of
//! validation.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::span::Span;

/// Why a line was skipped or a value discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseWarningKind {
    /// Content line that is not a `key: value` pair.
    UnrecognizedLine,
    /// Line indented deeper than the block it appears in.
    UnexpectedIndent,
    /// List item where a map entry was expected.
    StrayListItem,
    /// List item nested inside a list item.
    NestedList,
    /// Blocked key; the entry was dropped.
    DangerousKey,
    /// A later entry replaced an earlier one with the same key.
    DuplicateKey,
}

impl ParseWarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseWarningKind::UnrecognizedLine => "unrecognized_line",
            ParseWarningKind::UnexpectedIndent => "unexpected_indent",
            ParseWarningKind::StrayListItem => "stray_list_item",
            ParseWarningKind::NestedList => "nested_list",
            ParseWarningKind::DangerousKey => "dangerous_key",
            ParseWarningKind::DuplicateKey => "duplicate_key",
        }
    }
}

/// A recoverable parse issue tied to a source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    pub message: String,
    pub span: Span,
    pub kind: ParseWarningKind,
}

impl ParseWarning {
    pub fn new(kind: ParseWarningKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
        }
    }

    pub fn unrecognized_line(span: Span) -> Self {
        Self::new(
            ParseWarningKind::UnrecognizedLine,
            "expected `key: value`, line skipped",
            span,
        )
    }

    pub fn unexpected_indent(span: Span) -> Self {
        Self::new(
            ParseWarningKind::UnexpectedIndent,
            "unexpected indentation, line skipped",
            span,
        )
    }

    pub fn stray_list_item(span: Span) -> Self {
        Self::new(
            ParseWarningKind::StrayListItem,
            "list item outside of a list, line skipped",
            span,
        )
    }

    pub fn nested_list(span: Span) -> Self {
        Self::new(
            ParseWarningKind::NestedList,
            "nested lists are not supported, line skipped",
            span,
        )
    }

    pub fn dangerous_key(key: &str, span: Span) -> Self {
        Self::new(
            ParseWarningKind::DangerousKey,
            format!("key \"{}\" is not allowed, entry dropped", key),
            span,
        )
    }

    pub fn duplicate_key(key: &str, span: Span) -> Self {
        Self::new(
            ParseWarningKind::DuplicateKey,
            format!("duplicate key \"{}\" overrides the earlier value", key),
            span,
        )
    }

    /// 1-based line number the warning refers to.
    #[inline]
    pub fn line(&self) -> u32 {
        self.span.line
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

/// Warnings collected during one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParseWarnings {
    warnings: Vec<ParseWarning>,
}

impl ParseWarnings {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    pub fn push(&mut self, warning: ParseWarning) {
        self.warnings.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseWarning> {
        self.warnings.iter()
    }

    /// Number of warnings of the given kind.
    pub fn count(&self, kind: ParseWarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

impl IntoIterator for ParseWarnings {
    type Item = ParseWarning;
    type IntoIter = std::vec::IntoIter<ParseWarning>;

    fn into_iter(self) -> Self::IntoIter {
        self.warnings.into_iter()
    }
}

/// Stable machine-readable code for each validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    SchemaVersion,
    MissingField,
    InvalidStack,
    EmptyStack,
    StackEntryNotScalar,
    StackWithoutTechnology,
    MissingLinks,
    MissingRequiredLink,
    IdentityMismatch,
    UnparseableProfileUrl,
    LinkNotString,
    InsecureLink,
    TooLong,
    NotAList,
    TooManyItems,
    ItemMissingField,
    DangerousContent,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::SchemaVersion => "schema_version",
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidStack => "invalid_stack",
            ErrorCode::EmptyStack => "empty_stack",
            ErrorCode::StackEntryNotScalar => "stack_entry_not_scalar",
            ErrorCode::StackWithoutTechnology => "stack_without_technology",
            ErrorCode::MissingLinks => "missing_links",
            ErrorCode::MissingRequiredLink => "missing_required_link",
            ErrorCode::IdentityMismatch => "identity_mismatch",
            ErrorCode::UnparseableProfileUrl => "unparseable_profile_url",
            ErrorCode::LinkNotString => "link_not_string",
            ErrorCode::InsecureLink => "insecure_link",
            ErrorCode::TooLong => "too_long",
            ErrorCode::NotAList => "not_a_list",
            ErrorCode::TooManyItems => "too_many_items",
            ErrorCode::ItemMissingField => "item_missing_field",
            ErrorCode::DangerousContent => "dangerous_content",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One violated validation rule.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct ValidationError {
    pub code: ErrorCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Rejection from [`admit`](crate::card::admit).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// At least one string matched a dangerous-content pattern. Reported
    /// ahead of any other problem and carries only the content errors.
    #[error("card contains unsafe content ({} finding(s))", .0.len())]
    UnsafeContent(Vec<ValidationError>),

    /// The card violates one or more schema rules.
    #[error("card failed validation with {} error(s)", .0.len())]
    Invalid(Vec<ValidationError>),
}

impl AdmissionError {
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            AdmissionError::UnsafeContent(errors) | AdmissionError::Invalid(errors) => errors,
        }
    }
}
