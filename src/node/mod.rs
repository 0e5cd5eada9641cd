#![doc = r#"
The tree every `.RPP` file is made of

A [`Node`] is a token, its parameters and, for blocks, its children. Whether
a node is a block is explicit: `contents` is `None` for a one-line struct
(`VOLUME 11`) and `Some` for a block (`<TRACK ... >`), even an empty one.

# Hierarchy
```text
                    |------|
                    | Node |
                    |------|
                   /   |    \
|---------|  |-------|  |--------|
| Generic |  | Notes |  | Plugin |
|---------|  |-------|  |--------|
                           |
                      PluginState
                      (header, chunks, external attributes)
```
"#]

pub mod token;

use crate::{NodeError, ParamValue, PluginState};

/// Build a `Vec<ParamValue>` from mixed literals.
///
/// ```rust
/// # use rppx::prelude::*;
/// let params = rppx::params![1, "QN", 0.5];
/// assert_eq!(params, vec![ParamValue::Int(1), ParamValue::from("QN"), ParamValue::Decimal(0.5)]);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::ParamValue>::new()
    };
    ($($param:expr),+ $(,)?) => {
        ::std::vec![$($crate::ParamValue::from($param)),+]
    };
}

#[doc = r#"
The closed set of node kinds.

The kind is chosen from the token when the node is built. Kinds other than
[`NodeKind::Generic`] change how the node is written, see [`Node::dump`].
"#]
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Any node without special handling
    #[default]
    Generic,
    /// `NOTES`: the trailing string parameter is written as `|` lines
    Notes,
    /// `VST`: a base64 body and attributes living outside the block
    Plugin(Box<PluginState>),
}

impl NodeKind {
    /// The kind a freshly built node with this token gets
    pub fn for_token(token: &str) -> Self {
        match token {
            token::VST => Self::Plugin(Box::default()),
            token::NOTES => Self::Notes,
            _ => Self::Generic,
        }
    }

    /// The trailing string parameter is written as `|` lines
    pub const fn has_multiline_param(&self) -> bool {
        matches!(self, Self::Notes)
    }

    /// The node owns [`ExternalAttributes`](crate::ExternalAttributes)
    pub const fn has_external_attributes(&self) -> bool {
        matches!(self, Self::Plugin(_))
    }

    /// The node is not written with the generic block/struct rules
    pub const fn has_custom_dump(&self) -> bool {
        !matches!(self, Self::Generic)
    }

    /// A short name for error messages
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Notes => "notes",
            Self::Plugin(_) => "plugin",
        }
    }
}

#[doc = r#"
A token, its parameters and optionally its children.

# Example
```rust
# use rppx::prelude::*;
let mut metronome = Node::block("METRONOME", rppx::params![6, 2], vec![]);
metronome.add(Node::new("VOL", rppx::params![0.25, 0.125]));

assert_eq!(metronome.dump(0), "<METRONOME 6 2\n  VOL 0.25 0.125\n>");
```
"#]
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    token: String,
    params: Vec<ParamValue>,
    contents: Option<Vec<Node>>,
    kind: NodeKind,
}

impl Node {
    /// Create a struct: a single `TOKEN params…` line without children.
    ///
    /// A `VST` token always makes a (childless) block.
    pub fn new(token: impl Into<String>, params: Vec<ParamValue>) -> Self {
        let token = token.into();
        let kind = NodeKind::for_token(&token);
        let contents = kind.has_external_attributes().then(Vec::new);
        Self {
            token,
            params,
            contents,
            kind,
        }
    }

    /// Create a block. An empty `contents` still makes a block, written
    /// as `<TOKEN params` followed by `>` on the next line.
    pub fn block(token: impl Into<String>, params: Vec<ParamValue>, contents: Vec<Node>) -> Self {
        let token = token.into();
        let kind = NodeKind::for_token(&token);
        Self {
            token,
            params,
            contents: Some(contents),
            kind,
        }
    }

    /// A fresh `VST` block: five empty parameters, 2-in/2-out routing,
    /// an empty state and no preset.
    pub fn plugin() -> Self {
        Self::block(token::VST, params!["", "", "", "", ""], Vec::new())
    }

    /// A `NOTES` block holding `text`
    pub fn notes(text: impl Into<String>) -> Self {
        Self::block(token::NOTES, vec![ParamValue::String(text.into())], Vec::new())
    }

    /// A fresh, empty FX chain
    pub fn fx_chain() -> Self {
        Self::block(
            token::FXCHAIN,
            Vec::new(),
            vec![
                Node::new("SHOW", params![0]),
                Node::new("LASTSEL", params![0]),
                Node::new("DOCKED", params![0]),
            ],
        )
    }

    /// An FX chain built from a flat list of children, as they appear in a file.
    ///
    /// Attribute lines around each plugin are folded into it, see
    /// [`reassociate`](crate::plugin::reassociate).
    pub fn fx_chain_from_contents(params: Vec<ParamValue>, contents: Vec<Node>) -> Self {
        Self::block(token::FXCHAIN, params, crate::plugin::reassociate(contents))
    }

    pub(crate) fn from_parts(
        token: String,
        params: Vec<ParamValue>,
        contents: Option<Vec<Node>>,
        kind: NodeKind,
    ) -> Self {
        Self {
            token,
            params,
            contents,
            kind,
        }
    }

    /// The token, like `TRACK` or `VOLPAN`
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The node's own parameters
    pub fn params(&self) -> &[ParamValue] {
        &self.params
    }

    /// The node's own parameters
    pub fn params_mut(&mut self) -> &mut Vec<ParamValue> {
        &mut self.params
    }

    /// The parameter at `index`
    pub fn param(&self, index: usize) -> Option<&ParamValue> {
        self.params.get(index)
    }

    /// The children. Empty for structs.
    pub fn contents(&self) -> &[Node] {
        self.contents.as_deref().unwrap_or_default()
    }

    /// The children, `None` for structs
    pub fn contents_mut(&mut self) -> Option<&mut Vec<Node>> {
        self.contents.as_mut()
    }

    /// Replace the children. `None` turns the node into a struct.
    pub fn set_contents(&mut self, contents: Option<Vec<Node>>) {
        self.contents = contents;
    }

    /// True if this node is written as a block
    pub const fn is_block(&self) -> bool {
        self.contents.is_some()
    }

    /// True if this node is a single `TOKEN params…` line
    pub const fn is_struct(&self) -> bool {
        self.contents.is_none()
    }

    /// The node's kind
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// True for `VST` nodes
    pub const fn is_plugin(&self) -> bool {
        self.kind.has_external_attributes()
    }

    /// The plugin state of a `VST` node
    pub fn as_plugin(&self) -> Option<&PluginState> {
        match &self.kind {
            NodeKind::Plugin(state) => Some(state),
            _ => None,
        }
    }

    /// The plugin state of a `VST` node
    pub fn as_plugin_mut(&mut self) -> Option<&mut PluginState> {
        match &mut self.kind {
            NodeKind::Plugin(state) => Some(state),
            _ => None,
        }
    }

    /// The first child with this token
    pub fn find(&self, token: &str) -> Option<&Node> {
        self.contents().iter().find(|n| n.token == token)
    }

    /// The first child with this token
    pub fn find_mut(&mut self, token: &str) -> Option<&mut Node> {
        self.contents.as_mut()?.iter_mut().find(|n| n.token == token)
    }

    /// All children with this token
    pub fn find_all<'a>(&'a self, token: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.contents().iter().filter(move |n| n.token == token)
    }

    /// Append a child, taking ownership of it, and return it for chaining.
    ///
    /// Adding to a struct turns it into a block.
    pub fn add(&mut self, child: Node) -> &mut Node {
        let contents = self.contents.get_or_insert_with(Vec::new);
        contents.push(child);
        let last = contents.len() - 1;
        &mut contents[last]
    }

    /// Append a `VST` node.
    ///
    /// # Errors
    /// if `plugin` is not a plugin node. `self` is left untouched.
    pub fn add_plugin(&mut self, plugin: Node) -> Result<&mut Node, NodeError> {
        if !plugin.is_plugin() {
            return Err(NodeError::TypeMismatch {
                expected: "plugin",
                found: plugin.token,
            });
        }
        Ok(self.add(plugin))
    }
}

#[test]
fn kinds_follow_tokens() {
    assert!(Node::plugin().is_plugin());
    assert!(Node::notes("hi").kind().has_multiline_param());
    assert_eq!(Node::new("VOLUME", params![11]).kind(), &NodeKind::Generic);
    assert!(Node::new("VST", params![]).is_block());
}

#[test]
fn add_returns_the_child() {
    let mut track = Node::block("TRACK", params![], vec![]);
    track.add(Node::block("ITEM", params![], vec![])).add(Node::new("POSITION", params![2.5]));

    assert_eq!(track.contents().len(), 1);
    assert_eq!(track.contents()[0].contents()[0].token(), "POSITION");
}

#[test]
fn add_to_struct_makes_a_block() {
    let mut node = Node::new("NAME", params!["x"]);
    assert!(node.is_struct());
    node.add(Node::new("VOLUME", params![1]));
    assert!(node.is_block());
}

#[test]
fn add_plugin_rejects_other_kinds() {
    let mut chain = Node::fx_chain();
    let err = chain.add_plugin(Node::new("NAME", params!["x"])).unwrap_err();
    assert_eq!(
        err,
        NodeError::TypeMismatch {
            expected: "plugin",
            found: "NAME".to_owned()
        }
    );
    assert_eq!(chain.contents().len(), 3);

    chain.add_plugin(Node::plugin()).unwrap();
    assert_eq!(chain.contents().len(), 4);
}
