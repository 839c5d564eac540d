//! Document model for the collector configuration DSL
//!
//! A configuration is a sequence of [`Fragment`]s. Blocks nest, carry
//! `key value` directives and comment lines in declaration order, and are
//! turned into text by [`render`]. Trees are built bottom-up and never
//! mutated once handed to the renderer.

pub mod render;

pub use render::{render, RenderError};

/// Quoting applied to a directive value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Emitted as-is
    Bare(String),
    /// Emitted as `'value'`
    Single(String),
    /// Emitted as `"value"`
    Double(String),
}

impl Value {
    /// Raw value without quoting
    pub fn as_str(&self) -> &str {
        match self {
            Value::Bare(s) | Value::Single(s) | Value::Double(s) => s,
        }
    }

    pub(crate) fn to_text(&self) -> String {
        match self {
            Value::Bare(s) => s.clone(),
            Value::Single(s) => format!("'{}'", s),
            Value::Double(s) => format!("\"{}\"", s),
        }
    }
}

/// A `key value` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub key: String,
    pub value: Value,
}

/// One item in a block body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Directive(Directive),
    /// A full comment line, including its `#`
    Comment(String),
    Block(Block),
}

/// A `<name selector> ... </name>` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub name: String,
    pub selector: Option<String>,
    /// Comment line emitted right above the opening tag
    pub comment: Option<String>,
    pub body: Vec<Node>,
    /// Suppress the blank line normally emitted before the next sibling block
    pub no_blank_after: bool,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: None,
            comment: None,
            body: Vec::new(),
            no_blank_after: false,
        }
    }

    /// `<label @NAME>`
    pub fn label(label: impl Into<String>) -> Self {
        Self::new("label").selector(label)
    }

    /// `<match pattern>`
    pub fn matching(pattern: impl Into<String>) -> Self {
        Self::new("match").selector(pattern)
    }

    /// `<filter pattern>`
    pub fn filter(pattern: impl Into<String>) -> Self {
        Self::new("filter").selector(pattern)
    }

    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn comment(mut self, line: impl Into<String>) -> Self {
        self.comment = Some(line.into());
        self
    }

    /// Unquoted directive
    pub fn directive(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_directive(key, Value::Bare(value.into()))
    }

    /// Single-quoted directive
    pub fn quoted(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_directive(key, Value::Single(value.into()))
    }

    /// Double-quoted directive
    pub fn double_quoted(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_directive(key, Value::Double(value.into()))
    }

    /// Append every directive in order
    pub fn directives<I>(mut self, directives: I) -> Self
    where
        I: IntoIterator<Item = Directive>,
    {
        self.body
            .extend(directives.into_iter().map(Node::Directive));
        self
    }

    /// Comment line inside the body
    pub fn line_comment(mut self, line: impl Into<String>) -> Self {
        self.body.push(Node::Comment(line.into()));
        self
    }

    pub fn child(mut self, block: Block) -> Self {
        self.body.push(Node::Block(block));
        self
    }

    pub fn children<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.body.extend(blocks.into_iter().map(Node::Block));
        self
    }

    /// Mark this block as followed directly by its next sibling
    pub fn tight(mut self) -> Self {
        self.no_blank_after = true;
        self
    }

    fn push_directive(mut self, key: impl Into<String>, value: Value) -> Self {
        self.body.push(Node::Directive(Directive {
            key: key.into(),
            value,
        }));
        self
    }

    /// Child blocks, in order
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.body.iter().filter_map(|node| match node {
            Node::Block(b) => Some(b),
            _ => None,
        })
    }

    /// Value of the first directive with this key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.iter().find_map(|node| match node {
            Node::Directive(d) if d.key == key => Some(&d.value),
            _ => None,
        })
    }

    /// Whether a directive with this key is present
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl Directive {
    pub fn bare(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Value::Bare(value.into()),
        }
    }

    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Value::Single(value.into()),
        }
    }

    pub fn double(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Value::Double(value.into()),
        }
    }
}

/// A top-level piece of the rendered document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Block(Block),
    /// Hand-composed text emitted verbatim
    Raw(String),
}

impl From<Block> for Fragment {
    fn from(block: Block) -> Self {
        Fragment::Block(block)
    }
}
