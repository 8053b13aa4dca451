//! Document tree types produced by the parser.
//!
//! A profile document is a tree of three node kinds:
//!
//! - **Scalar**: leaf text, already unquoted and folded
//! - **List**: ordered items, each a scalar or a map
//! - **Map**: ordered, key-unique entries
//!
//! Scalars borrow from the input (`Cow<'a, str>`) unless unquoting or block
//! folding had to build a new string.

use std::borrow::Cow;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::span::Span;

/// Copy-on-write string slice borrowed from the input.
pub type CowStr<'a> = Cow<'a, str>;

/// A parsed profile document. The root is always a map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document<'a> {
    /// Top-level entries.
    pub root: Map<'a>,
    /// Source span covering the entire input.
    pub span: Span,
}

impl<'a> Document<'a> {
    /// Look up a top-level field.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Node<'a>> {
        self.root.get(key)
    }

    /// Look up a top-level field that is a scalar.
    #[inline]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.root.get(key).and_then(Node::as_str)
    }

    /// Every scalar in the document, depth-first in document order.
    pub fn strings(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for (_, node) in self.root.iter() {
            node.collect_strings(&mut out);
        }
        out
    }
}

impl Serialize for Document<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

/// A value in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    /// Leaf text value.
    Scalar(CowStr<'a>),
    /// Ordered sequence. Items are scalars or maps, never lists.
    List(Vec<Node<'a>>),
    /// Nested mapping.
    Map(Map<'a>),
}

impl<'a> Node<'a> {
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Node<'a>]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&Map<'a>> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the node kind, used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "string",
            Node::List(_) => "list",
            Node::Map(_) => "map",
        }
    }

    /// A scalar that is empty or whitespace only.
    #[inline]
    pub fn is_blank_scalar(&self) -> bool {
        matches!(self, Node::Scalar(s) if s.trim().is_empty())
    }

    /// Every scalar below (and including) this node, in document order.
    pub fn strings(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_strings(&mut out);
        out
    }

    fn collect_strings<'n>(&'n self, out: &mut Vec<&'n str>) {
        match self {
            Node::Scalar(s) => out.push(s.as_ref()),
            Node::List(items) => {
                for item in items {
                    item.collect_strings(out);
                }
            }
            Node::Map(map) => {
                for (_, value) in map.iter() {
                    value.collect_strings(out);
                }
            }
        }
    }
}

impl Serialize for Node<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(s) => serializer.serialize_str(s),
            Node::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Map(map) => map.serialize(serializer),
        }
    }
}

/// Insertion-ordered map with unique keys.
///
/// Inserting an existing key replaces its value in place, so the key keeps
/// the position of its first occurrence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map<'a> {
    entries: Vec<(CowStr<'a>, Node<'a>)>,
}

impl<'a> Map<'a> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert an entry, returning the previous value for the key if any.
    pub fn insert(&mut self, key: impl Into<CowStr<'a>>, value: Node<'a>) -> Option<Node<'a>> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node<'a>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Scalar value of `key`, if present and a scalar.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::as_str)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node<'a>)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_ref())
    }
}

impl<'a> IntoIterator for Map<'a> {
    type Item = (CowStr<'a>, Node<'a>);
    type IntoIter = std::vec::IntoIter<(CowStr<'a>, Node<'a>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Map<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(&**key, value)?;
        }
        map.end()
    }
}
