//! # devcard core
//!
//! Parser and schema validator for devcard profile documents: a small,
//! indentation-sensitive YAML subset describing a developer's public
//! profile (name, stack, links, projects, narrative fields).
//!
//! ## Quick Start
//!
//! ```rust
//! use devcard_core::{parse, validate};
//!
//! let input = "\
//! schema_version: \"1\"
//! name: Ada Lovelace
//! title: Analyst
//! bio: First programmer.
//! stack:
//!   languages: [rust, python]
//! links:
//!   github: https://github.com/ada
//! ";
//!
//! let doc = parse(input);
//! let errors = validate(&doc, "cards/@ada.yaml");
//! assert!(errors.is_empty(), "{:?}", errors);
//! ```
//!
//! ## Lenient parsing
//!
//! The parser never fails. Lines it cannot use are skipped and reported:
//!
//! ```rust
//! use devcard_core::parse_with_warnings;
//!
//! let result = parse_with_warnings("name: Ada\nthis is not a pair\n__proto__: x\n");
//! assert_eq!(result.document.root.len(), 1);
//! assert_eq!(result.warnings.len(), 2);
//! ```
//!
//! ## Typed view
//!
//! [`Card`] resolves a document into concrete fields with empty defaults;
//! [`admit`] returns it only for documents that pass validation.

pub mod ast;
pub mod card;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod scalar;
pub mod schema;
pub mod span;
pub mod validator;

pub use ast::{Document, Map, Node};
pub use card::{admit, Card};
pub use error::{
    AdmissionError, ErrorCode, ParseWarning, ParseWarningKind, ParseWarnings, ValidationError,
};
pub use parser::{parse, parse_with_warnings, ParseResult, Parser, DANGEROUS_KEYS};
pub use schema::Schema;
pub use validator::{validate, validate_report, ValidationReport, Validator};
