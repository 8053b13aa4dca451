//! Typed view of a profile document.
//!
//! Renderers and indexers read cards through [`Card`] instead of probing the
//! tree by key. Every optional field has an empty default, so a card built
//! from a sparse document renders with blank sections instead of failing.

use serde::Serialize;

use crate::ast::{Document, Map, Node};
use crate::error::{AdmissionError, ErrorCode};
use crate::validator::Validator;

/// A technology category and its entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackCategory<'d> {
    pub name: &'d str,
    pub items: Vec<&'d str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link<'d> {
    pub label: &'d str,
    pub url: &'d str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Project<'d> {
    pub name: &'d str,
    pub description: &'d str,
    pub status: &'d str,
    pub url: &'d str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Experience<'d> {
    pub role: &'d str,
    pub company: &'d str,
    pub period: &'d str,
    pub highlight: &'d str,
}

/// A profile card with every field resolved to a concrete type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Card<'d> {
    pub schema_version: &'d str,
    pub name: &'d str,
    pub title: &'d str,
    pub bio: &'d str,
    pub location: &'d str,
    pub archetype: &'d str,
    pub dna: &'d str,
    pub about: &'d str,
    pub private_note: &'d str,
    pub next_project: &'d str,
    pub stack: Vec<StackCategory<'d>>,
    pub links: Vec<Link<'d>>,
    pub interests: Vec<&'d str>,
    pub projects: Vec<Project<'d>>,
    pub experience: Vec<Experience<'d>>,
}

impl<'d> Card<'d> {
    /// Build the typed view. Never fails: missing or mistyped fields become
    /// empty values.
    pub fn from_document(doc: &'d Document<'_>) -> Self {
        let root = &doc.root;
        Card {
            schema_version: text(root, "schema_version"),
            name: text(root, "name"),
            title: text(root, "title"),
            bio: text(root, "bio"),
            location: text(root, "location"),
            archetype: text(root, "archetype"),
            dna: text(root, "dna"),
            about: text(root, "about"),
            private_note: text(root, "private_note"),
            next_project: text(root, "next_project"),
            stack: entries(root, "stack")
                .map(|(name, node)| StackCategory {
                    name,
                    items: node
                        .strings()
                        .into_iter()
                        .filter(|s| !s.trim().is_empty())
                        .collect(),
                })
                .collect(),
            links: entries(root, "links")
                .filter_map(|(label, node)| node.as_str().map(|url| Link { label, url }))
                .filter(|link| !link.url.trim().is_empty())
                .collect(),
            interests: items(root, "interests")
                .filter_map(Node::as_str)
                .collect(),
            projects: items(root, "projects")
                .filter_map(Node::as_map)
                .map(|p| Project {
                    name: text(p, "name"),
                    description: text(p, "description"),
                    status: text(p, "status"),
                    url: text(p, "url"),
                })
                .collect(),
            experience: items(root, "experience")
                .filter_map(Node::as_map)
                .map(|e| Experience {
                    role: text(e, "role"),
                    company: text(e, "company"),
                    period: text(e, "period"),
                    highlight: text(e, "highlight"),
                })
                .collect(),
        }
    }

    /// Whether the card has anything in the narrative "take" section.
    pub fn has_take(&self) -> bool {
        !self.dna.trim().is_empty() || !self.about.trim().is_empty()
    }
}

fn text<'d>(map: &'d Map<'_>, key: &str) -> &'d str {
    map.get_str(key).unwrap_or("")
}

fn entries<'d, 'a>(map: &'d Map<'a>, key: &str) -> impl Iterator<Item = (&'d str, &'d Node<'a>)> {
    map.get(key)
        .and_then(Node::as_map)
        .into_iter()
        .flat_map(|m| m.iter())
}

fn items<'d, 'a>(map: &'d Map<'a>, key: &str) -> impl Iterator<Item = &'d Node<'a>> {
    map.get(key)
        .and_then(Node::as_list)
        .unwrap_or(&[])
        .iter()
}

/// Validate `doc` and hand out its typed view only if it passes.
///
/// Dangerous content blocks the card outright and is reported on its own,
/// ahead of any schema errors.
pub fn admit<'d>(
    doc: &'d Document<'_>,
    origin: &str,
    validator: &Validator,
) -> Result<Card<'d>, AdmissionError> {
    let errors = validator.validate(doc, origin);
    if errors.is_empty() {
        return Ok(Card::from_document(doc));
    }

    let (unsafe_content, rest): (Vec<_>, Vec<_>) = errors
        .into_iter()
        .partition(|e| e.code == ErrorCode::DangerousContent);
    if !unsafe_content.is_empty() {
        return Err(AdmissionError::UnsafeContent(unsafe_content));
    }
    Err(AdmissionError::Invalid(rest))
}
