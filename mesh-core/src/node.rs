//! Node definitions
//!
//! Nodes are the data assets and processes tracked in the lineage graph:
//! data products, tables, jobs, reports. A node is identified by a
//! caller-supplied (or generated) string id and carries a small bag of
//! typed attributes such as owner or domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a lineage node
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node ID from any string-like value without validation
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a node ID, rejecting empty or whitespace-only values
    pub fn parse(id: impl Into<String>) -> Result<Self, crate::Error> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(crate::Error::InvalidNodeId(id));
        }
        Ok(Self(id))
    }

    /// Generate a new random node ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the node ID as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the ID is empty or whitespace-only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Kind of asset or process a node represents
///
/// The set is open: names outside the well-known kinds are kept verbatim
/// in [`NodeKind::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    DataProduct,
    Table,
    Job,
    Report,
    #[default]
    Unknown,
    Other(String),
}

impl NodeKind {
    /// Canonical snake_case name of the kind
    pub fn as_str(&self) -> &str {
        match self {
            Self::DataProduct => "data_product",
            Self::Table => "table",
            Self::Job => "job",
            Self::Report => "report",
            Self::Unknown => "unknown",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for NodeKind {
    fn from(s: &str) -> Self {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "data_product" | "dataproduct" => Self::DataProduct,
            "table" => Self::Table,
            "job" => Self::Job,
            "report" => Self::Report,
            "unknown" | "" => Self::Unknown,
            _ => Self::Other(s.trim().to_string()),
        }
    }
}

impl From<String> for NodeKind {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for NodeKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// Attribute value attached to a node or edge
///
/// Restricted to a small set of primitive types so records stay
/// statically checkable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Parse a raw string, trying bool, then integer, then float, falling back to string
    pub fn infer(raw: &str) -> Self {
        if let Ok(b) = raw.parse::<bool>() {
            return Self::Bool(b);
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Integer(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        Self::String(raw.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// False for NaN and infinite floats, which JSON cannot represent
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Float(f) => f.is_finite(),
            _ => true,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Free-form metadata map, sorted by key for deterministic output
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A data asset or process tracked in the lineage graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,

    /// What the node represents
    pub kind: NodeKind,

    /// Free-form metadata (owner, domain, ...)
    #[serde(default)]
    pub attributes: Attributes,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Create a new node stamped with the current time
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, attributes: Attributes) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            kind,
            attributes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a builder for constructing a node with fluent API
    pub fn builder(id: impl Into<NodeId>) -> NodeBuilder {
        NodeBuilder::new(id)
    }

    /// Update the node's updated_at timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Look up a single attribute
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
}

/// Builder for constructing nodes with a fluent API
pub struct NodeBuilder {
    id: NodeId,
    kind: NodeKind,
    attributes: Attributes,
}

impl NodeBuilder {
    /// Create a new builder with the given id
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Unknown,
            attributes: Attributes::new(),
        }
    }

    /// Set the node kind
    pub fn kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add an attribute
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Build the node
    pub fn build(self) -> Node {
        Node::new(self.id, self.kind, self.attributes)
    }
}
