//! Generic document tree.
//!
//! Brand documents are resolved as plain data before they are turned into
//! typed structs: references are substituted on a [`Node`] tree, and only the
//! fully substituted tree is deserialized into sections such as
//! [`BrandTypography`](crate::BrandTypography).
//!
//! Records keep their declaration order, which is also the order in which the
//! resolver visits fields.
//!
//! ```rust
//! use brandkit::Node;
//!
//! let node = Node::from_yaml_str("primary: red\nsizes: [1, 2]\n").unwrap();
//! let record = node.as_record().unwrap();
//! assert_eq!(record["primary"].as_str(), Some("red"));
//! assert_eq!(record.keys().collect::<Vec<_>>(), ["primary", "sizes"]);
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::BrandError;

/// An ordered map of field name to node.
pub type Record = IndexMap<String, Node>;

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Integer(n) => write!(f, "{}", n),
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::String(s) => write!(f, "{}", s),
        }
    }
}

/// A node in a brand document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A string, number, boolean or null.
    Scalar(Scalar),
    /// An ordered mapping with string keys.
    Record(Record),
    /// A sequence.
    List(Vec<Node>),
}

impl Node {
    /// The null node.
    pub fn null() -> Self {
        Node::Scalar(Scalar::Null)
    }

    /// Parses YAML text into a node tree.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<serde_yaml::Value>(text).map(Node::from)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::Null))
    }

    /// Returns the string value if this node is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Node::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Node::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the node's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(Scalar::Null) => "null",
            Node::Scalar(Scalar::Bool(_)) => "boolean",
            Node::Scalar(Scalar::Integer(_)) | Node::Scalar(Scalar::Float(_)) => "number",
            Node::Scalar(Scalar::String(_)) => "string",
            Node::Record(_) => "mapping",
            Node::List(_) => "sequence",
        }
    }

    /// Deserializes this node into a typed value.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, serde_yaml::Error> {
        serde_yaml::from_value(self.into())
    }

    pub(crate) fn expect_record(&self, key_path: &str) -> crate::Result<&Record> {
        self.as_record().ok_or_else(|| {
            BrandError::invalid(key_path, format!("expected a mapping, found {}", self.kind()))
        })
    }

    pub(crate) fn expect_str(&self, key_path: &str) -> crate::Result<&str> {
        self.as_str().ok_or_else(|| {
            BrandError::invalid(key_path, format!("expected a string, found {}", self.kind()))
        })
    }
}

/// Joins a dotted key path.
pub(crate) fn join_key(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Fails on the first field of `record` not listed in `allowed`.
pub(crate) fn deny_unknown_fields(
    record: &Record,
    key_path: &str,
    allowed: &[&str],
) -> crate::Result<()> {
    match record.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(BrandError::invalid(
            join_key(key_path, key),
            format!("unknown field, expected one of: {}", allowed.join(", ")),
        )),
        None => Ok(()),
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Scalar(Scalar::String(value))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Scalar(Scalar::Integer(value))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Scalar(Scalar::Float(value))
    }
}

impl From<Record> for Node {
    fn from(value: Record) -> Self {
        Node::Record(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::List(value)
    }
}

impl From<serde_yaml::Value> for Node {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => Node::null(),
            Value::Bool(b) => Node::from(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Node::from(i),
                None => Node::from(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Node::from(s),
            Value::Sequence(items) => Node::List(items.into_iter().map(Node::from).collect()),
            Value::Mapping(mapping) => Node::Record(
                mapping
                    .into_iter()
                    .map(|(key, value)| (key_to_string(key), Node::from(value)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Node::from(tagged.value),
        }
    }
}

impl From<Node> for serde_yaml::Value {
    fn from(node: Node) -> Self {
        use serde_yaml::Value;

        match node {
            Node::Scalar(Scalar::Null) => Value::Null,
            Node::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            Node::Scalar(Scalar::Integer(n)) => Value::Number(n.into()),
            Node::Scalar(Scalar::Float(n)) => Value::Number(n.into()),
            Node::Scalar(Scalar::String(s)) => Value::String(s),
            Node::List(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            Node::Record(record) => Value::Mapping(
                record
                    .into_iter()
                    .map(|(key, value)| (Value::String(key), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// YAML allows non-string keys; brand documents address fields by string.
fn key_to_string(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(Scalar::Null) => serializer.serialize_none(),
            Node::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Node::Scalar(Scalar::Integer(n)) => serializer.serialize_i64(*n),
            Node::Scalar(Scalar::Float(n)) => serializer.serialize_f64(*n),
            Node::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
            Node::List(items) => serializer.collect_seq(items),
            Node::Record(record) => {
                let mut map = serializer.serialize_map(Some(record.len()))?;
                for (key, value) in record {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_yaml::Value::deserialize(deserializer).map(Node::from)
    }
}
