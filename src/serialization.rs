use crate::ast::{Node, Pair};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Node::Null,
            serde_json::Value::Bool(b) => Node::Boolean(b),
            serde_json::Value::Number(n) => Node::Number(n),
            serde_json::Value::String(s) => Node::String(s),
            serde_json::Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            // `preserve_order` keeps the map in document order.
            serde_json::Value::Object(map) => Node::Object(
                map.into_iter()
                    .map(|(key, value)| Pair {
                        key,
                        value: Node::from(value),
                    })
                    .collect(),
            ),
        }
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Boolean(b) => serializer.serialize_bool(*b),
            Node::Number(n) => n.serialize(serializer),
            Node::String(s) => serializer.serialize_str(s),
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Object(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for pair in pairs {
                    map.serialize_entry(&pair.key, &pair.value)?;
                }
                map.end()
            }
        }
    }
}

/// Renders a node as compact JSON, keys in document order.
#[must_use]
pub fn render(node: &Node) -> String {
    // Serializing an in-memory tree with string keys cannot fail.
    serde_json::to_string(node).unwrap_or_default()
}
