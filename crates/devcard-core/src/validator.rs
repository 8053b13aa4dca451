//! Schema validation for parsed profile documents.
//!
//! Every rule runs on every document; violations accumulate so one pass
//! reports the complete list. The content scan is a lint over obviously
//! dangerous markup, not a guarantee: renderers must still escape.

use serde::Serialize;
use tracing::debug;

use crate::ast::{Document, Node};
use crate::error::{ErrorCode, ValidationError};
use crate::schema::Schema;

/// Characters of an offending string quoted in a content error.
const SNIPPET_CHARS: usize = 80;

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }
}

/// Validates documents against a [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct Validator {
    schema: Schema,
}

impl Validator {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// All rule violations of `doc`, in rule order. `origin` is the file the
    /// document came from and feeds the identity check.
    pub fn validate(&self, doc: &Document<'_>, origin: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        self.check_version(doc, &mut errors);
        self.check_required(doc, &mut errors);
        self.check_stack(doc, &mut errors);
        self.check_required_link(doc, &mut errors);
        self.check_identity(doc, origin, &mut errors);
        self.check_links(doc, &mut errors);
        self.check_lengths(doc, &mut errors);
        self.check_list_limits(doc, &mut errors);
        self.check_items(doc, &mut errors);
        self.check_content(doc, &mut errors);

        debug!(origin, errors = errors.len(), "validated profile document");
        errors
    }

    pub fn report(&self, doc: &Document<'_>, origin: &str) -> ValidationReport {
        ValidationReport::new(self.validate(doc, origin))
    }

    fn check_version(&self, doc: &Document<'_>, errors: &mut Vec<ValidationError>) {
        let expected = &self.schema.version;
        let got = match doc.get("schema_version") {
            Some(Node::Scalar(s)) if s == expected => return,
            Some(Node::Scalar(s)) => s.to_string(),
            Some(other) => format!("({})", other.kind()),
            None => "(missing)".to_string(),
        };
        errors.push(ValidationError::new(
            ErrorCode::SchemaVersion,
            format!("schema_version must be \"{}\", got \"{}\"", expected, got),
        ));
    }

    fn check_required(&self, doc: &Document<'_>, errors: &mut Vec<ValidationError>) {
        for field in &self.schema.required_fields {
            if !has_text(doc.get(field)) {
                errors.push(ValidationError::new(
                    ErrorCode::MissingField,
                    format!("Required field \"{}\" is missing or empty", field),
                ));
            }
        }
    }

    fn check_stack(&self, doc: &Document<'_>, errors: &mut Vec<ValidationError>) {
        let field = &self.schema.stack_field;
        let Some(stack) = doc.get(field).and_then(Node::as_map) else {
            errors.push(ValidationError::new(
                ErrorCode::InvalidStack,
                format!(
                    "Required field \"{}\" must be a map with at least one category",
                    field
                ),
            ));
            return;
        };

        if stack.is_empty() {
            errors.push(ValidationError::new(
                ErrorCode::EmptyStack,
                format!("\"{}\" must contain at least one category", field),
            ));
            return;
        }

        let mut has_technology = false;
        for (category, techs) in stack.iter() {
            let nested_map = match techs {
                Node::Map(_) => true,
                Node::List(items) => items.iter().any(|i| i.as_map().is_some()),
                Node::Scalar(_) => false,
            };
            if nested_map {
                errors.push(ValidationError::new(
                    ErrorCode::StackEntryNotScalar,
                    format!(
                        "{}.{} must be a string or array, not an object",
                        field, category
                    ),
                ));
                continue;
            }
            has_technology |= techs.strings().iter().any(|t| !t.trim().is_empty());
        }

        if !has_technology {
            errors.push(ValidationError::new(
                ErrorCode::StackWithoutTechnology,
                format!("\"{}\" categories must contain at least one technology", field),
            ));
        }
    }

    fn check_required_link(&self, doc: &Document<'_>, errors: &mut Vec<ValidationError>) {
        let path = format!("{}.{}", self.schema.links_field, self.schema.required_link);
        match doc.get(&self.schema.links_field).and_then(Node::as_map) {
            None => errors.push(ValidationError::new(
                ErrorCode::MissingLinks,
                format!(
                    "Required field \"{}\" is missing (no {} section)",
                    path, self.schema.links_field
                ),
            )),
            Some(links) if !has_text(links.get(&self.schema.required_link)) => {
                errors.push(ValidationError::new(
                    ErrorCode::MissingRequiredLink,
                    format!("Required field \"{}\" is missing or empty", path),
                ))
            }
            Some(_) => {}
        }
    }

    /// The origin's username must match the one in the required link.
    fn check_identity(&self, doc: &Document<'_>, origin: &str, errors: &mut Vec<ValidationError>) {
        let Some(file_user) = self.schema.origin_user(origin) else {
            return;
        };
        let link = doc
            .get(&self.schema.links_field)
            .and_then(Node::as_map)
            .and_then(|links| links.get(&self.schema.required_link));
        let Some(link) = link else {
            return;
        };
        let path = format!("{}.{}", self.schema.links_field, self.schema.required_link);

        match link.as_str().and_then(|url| self.schema.profile_url_user(url)) {
            Some(link_user) => {
                if !file_user.eq_ignore_ascii_case(link_user) {
                    errors.push(ValidationError::new(
                        ErrorCode::IdentityMismatch,
                        format!(
                            "Username mismatch: filename says \"{}\" but {} points to \"{}\"",
                            file_user, path, link_user
                        ),
                    ));
                }
            }
            None if link.is_blank_scalar() => {}
            None => {
                let shown = link.as_str().unwrap_or("(not a string)");
                errors.push(ValidationError::new(
                    ErrorCode::UnparseableProfileUrl,
                    format!(
                        "Could not extract username from {} URL: \"{}\"",
                        path, shown
                    ),
                ));
            }
        }
    }

    fn check_links(&self, doc: &Document<'_>, errors: &mut Vec<ValidationError>) {
        let field = &self.schema.links_field;
        let Some(links) = doc.get(field).and_then(Node::as_map) else {
            return;
        };
        let prefix = &self.schema.secure_url_prefix;

        for (label, url) in links.iter() {
            match url.as_str() {
                None => errors.push(ValidationError::new(
                    ErrorCode::LinkNotString,
                    format!("{}.{} must be a string URL, not an object", field, label),
                )),
                Some(url) if !url.trim().is_empty() && !url.starts_with(prefix.as_str()) => {
                    errors.push(ValidationError::new(
                        ErrorCode::InsecureLink,
                        format!("{}.{} must start with {} (got \"{}\")", field, label, prefix, url),
                    ))
                }
                Some(_) => {}
            }
        }
    }

    fn check_lengths(&self, doc: &Document<'_>, errors: &mut Vec<ValidationError>) {
        for (field, max) in &self.schema.max_lengths {
            let Some(text) = doc.get_str(field) else {
                continue;
            };
            let len = text.chars().count();
            if len > *max {
                errors.push(ValidationError::new(
                    ErrorCode::TooLong,
                    format!("\"{}\" exceeds max length of {} (got {})", field, max, len),
                ));
            }
        }
    }

    fn check_list_limits(&self, doc: &Document<'_>, errors: &mut Vec<ValidationError>) {
        for (field, max) in &self.schema.list_limits {
            let Some(node) = doc.get(field) else {
                continue;
            };
            match node.as_list() {
                None => errors.push(not_a_list(field)),
                Some(items) if items.len() > *max => errors.push(ValidationError::new(
                    ErrorCode::TooManyItems,
                    format!("\"{}\" has {} items (max {})", field, items.len(), max),
                )),
                Some(_) => {}
            }
        }
    }

    fn check_items(&self, doc: &Document<'_>, errors: &mut Vec<ValidationError>) {
        for (field, required) in &self.schema.item_requirements {
            let Some(node) = doc.get(field) else {
                continue;
            };
            let Some(items) = node.as_list() else {
                errors.push(not_a_list(field));
                continue;
            };

            for (i, item) in items.iter().enumerate() {
                let entry = item.as_map();
                for sub in required {
                    if !has_text(entry.and_then(|m| m.get(sub))) {
                        errors.push(ValidationError::new(
                            ErrorCode::ItemMissingField,
                            format!("{}[{}] is missing required field \"{}\"", field, i, sub),
                        ));
                    }
                }
            }
        }
    }

    /// One error per string that matches any dangerous pattern.
    fn check_content(&self, doc: &Document<'_>, errors: &mut Vec<ValidationError>) {
        for text in doc.strings() {
            if let Some(pattern) = self.schema.dangerous_match(text) {
                let snippet: String = text.chars().take(SNIPPET_CHARS).collect();
                errors.push(ValidationError::new(
                    ErrorCode::DangerousContent,
                    format!(
                        "Dangerous content detected: \"{}...\" matches {}",
                        snippet,
                        pattern.as_str()
                    ),
                ));
            }
        }
    }
}

/// A scalar with at least one non-whitespace character.
fn has_text(node: Option<&Node<'_>>) -> bool {
    matches!(node, Some(Node::Scalar(s)) if !s.trim().is_empty())
}

fn not_a_list(field: &str) -> ValidationError {
    ValidationError::new(ErrorCode::NotAList, format!("\"{}\" must be an array", field))
}

/// Validate against the default [`Schema`].
pub fn validate(doc: &Document<'_>, origin: &str) -> Vec<ValidationError> {
    Validator::default().validate(doc, origin)
}

/// Validate against the default [`Schema`], as a report.
pub fn validate_report(doc: &Document<'_>, origin: &str) -> ValidationReport {
    Validator::default().report(doc, origin)
}
