/// The configuration tree loaded from the placeholder configuration file.
///
/// Replaced wholesale on every reload; never mutated in place once built.
#[derive(Debug, PartialEq, Clone)]
pub struct ConfigDocument {
    pub root: Node,
}

/// A generic, dynamically-typed tree node, the shape JSON text parses into.
#[derive(Debug, PartialEq, Clone)]
pub enum Node {
    Null,
    Boolean(bool),
    Number(serde_json::Number),
    String(String),
    /// Key map in document order. Keys are unique.
    Object(Vec<Pair>),
    Array(Vec<Node>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Pair {
    pub key: String,
    pub value: Node,
}

static NULL: Node = Node::Null;

impl Node {
    /// Looks up `key` in a key map. Case-sensitive, exact match.
    /// Returns `None` for every non-object node.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Object(pairs) => pairs.iter().find(|p| p.key == key).map(|p| &p.value),
            _ => None,
        }
    }

    /// `null` and `false` count as absent when navigating the tree.
    #[must_use]
    pub fn is_falsy(&self) -> bool {
        matches!(self, Node::Null | Node::Boolean(false))
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Keys of a key map, in the map's own order. Empty for anything else.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let pairs: &[Pair] = match self {
            Node::Object(pairs) => pairs,
            _ => &[],
        };
        pairs.iter().map(|p| p.key.as_str())
    }
}

impl ConfigDocument {
    #[must_use]
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    fn placeholder(&self) -> Option<&Node> {
        self.root.get("placeholder")
    }

    /// The `placeholder.data` tree that placeholders resolve against.
    /// A document without it behaves like an empty tree: every lookup breaks
    /// at its first segment.
    #[must_use]
    pub fn data(&self) -> &Node {
        self.placeholder()
            .and_then(|p| p.get("data"))
            .unwrap_or(&NULL)
    }

    /// File-name suffixes from `placeholder.suffixes`, in document order.
    /// Non-string entries are skipped.
    #[must_use]
    pub fn suffixes(&self) -> Vec<String> {
        match self.placeholder().and_then(|p| p.get("suffixes")) {
            Some(Node::Array(items)) => items
                .iter()
                .filter_map(Node::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether `document_name` ends with one of the configured suffixes.
    #[must_use]
    pub fn applies_to(&self, document_name: &str) -> bool {
        self.suffixes()
            .iter()
            .any(|suffix| document_name.ends_with(suffix.as_str()))
    }
}
