use super::{ExternalAttribute, ExternalAttributes};
use crate::Node;

/// How far past a plugin attribute lines are searched for
pub const LOOKAHEAD: usize = 4;

#[doc = r#"
Fold the attribute lines around each plugin of an FX chain into the plugin.

Walks the flat children of a chain block once:

- a `BYPASS` line directly before a plugin moves into its attributes;
- up to [`LOOKAHEAD`] lines after a plugin, stopping early at the next
  plugin, each `PRESETNAME`, `FLOATPOS`, `FXID` and `WAK` line moves into
  its attributes (the first of each kind wins);
- other lines found before that `WAK` become children of the plugin, such
  as the `<PARMENV` envelopes REAPER writes between `FXID` and `WAK`;
- every other node keeps its place relative to the plugins.

Writing the chain puts `BYPASS` right before each block and the others
after it, in the order `PRESETNAME`, `FLOATPOS`, `FXID`, the plugin's
children, `WAK`. The original order among attribute lines is not kept.

# Example
```rust
# use rppx::prelude::*;
let chain = Node::fx_chain_from_contents(
    vec![],
    vec![
        Node::new("BYPASS", rppx::params![0, 0, 0]),
        Node::plugin(),
        Node::new("FXID", rppx::params!["{A}"]),
        Node::new("PRESETNAME", rppx::params!["Init"]),
    ],
);

assert_eq!(chain.contents().len(), 1);
let attrs = chain.contents()[0].as_plugin().unwrap().attributes();
assert_eq!(attrs.get(ExternalAttribute::FxId), Some(&rppx::params!["{A}"][..]));
```
"#]
pub fn reassociate(contents: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(contents.len());
    let mut input = contents.into_iter().peekable();

    while let Some(mut node) = input.next() {
        if !node.is_plugin() {
            out.push(node);
            continue;
        }

        let mut found = ExternalAttributes::default();
        if out.last().is_some_and(|prev| is_attribute_line(prev, ExternalAttribute::Bypass)) {
            if let Some(bypass) = out.pop() {
                found.set(ExternalAttribute::Bypass, into_params(bypass));
            }
        }

        let mut passthrough = Vec::new();
        let mut inner = Vec::new();
        for _ in 0..LOOKAHEAD {
            let Some(next) = input.next_if(|n| !n.is_plugin()) else {
                break;
            };
            match trailing_attribute(&next) {
                Some(attribute) if !found.contains(attribute) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!("Folding {} into plugin {:?}", attribute.token(), node.param(0));
                    if attribute == ExternalAttribute::WindowKeys {
                        inner.append(&mut passthrough);
                    }
                    found.set(attribute, into_params(next));
                }
                _ => passthrough.push(next),
            }
        }

        if let Some(state) = node.as_plugin_mut() {
            state.attributes_mut().merge(found);
        }
        for child in inner {
            node.add(child);
        }
        out.push(node);
        out.extend(passthrough);
    }

    out
}

fn is_attribute_line(node: &Node, attribute: ExternalAttribute) -> bool {
    node.is_struct() && node.token() == attribute.token()
}

fn trailing_attribute(node: &Node) -> Option<ExternalAttribute> {
    ExternalAttribute::TRAILING
        .into_iter()
        .find(|a| is_attribute_line(node, *a))
}

fn into_params(mut node: Node) -> Vec<crate::ParamValue> {
    core::mem::take(node.params_mut())
}

#[cfg(test)]
fn line(token: &str) -> Node {
    Node::new(token, crate::params![token.to_lowercase()])
}

#[cfg(test)]
fn tokens(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(Node::token).collect()
}

#[test]
fn folds_attributes_around_plugins() {
    let out = reassociate(vec![
        line("SHOW"),
        line("BYPASS"),
        Node::plugin(),
        line("PRESETNAME"),
        line("FLOATPOS"),
        line("FXID"),
        line("WAK"),
        line("BYPASS"),
        Node::plugin(),
        line("FXID"),
    ]);
    assert_eq!(tokens(&out), vec!["SHOW", "VST", "VST"]);

    let first = out[1].as_plugin().unwrap().attributes();
    assert_eq!(first.iter().count(), 5);
    let second = out[2].as_plugin().unwrap().attributes();
    assert_eq!(second.get(ExternalAttribute::Bypass), Some(&crate::params!["bypass"][..]));
    assert_eq!(second.get(ExternalAttribute::FxId), Some(&crate::params!["fxid"][..]));
    assert!(!second.contains(ExternalAttribute::PresetName));
}

#[test]
fn lines_before_window_keys_move_into_the_plugin() {
    let out = reassociate(vec![
        Node::plugin(),
        line("FOO"),
        line("FXID"),
        line("BAR"),
        line("WAK"),
        line("BAZ"),
    ]);
    assert_eq!(tokens(&out), vec!["VST", "BAZ"]);
    assert_eq!(tokens(out[0].contents()), vec!["FOO", "BAR"]);
    let attrs = out[0].as_plugin().unwrap().attributes();
    assert!(attrs.contains(ExternalAttribute::FxId));
    assert!(attrs.contains(ExternalAttribute::WindowKeys));
}

#[test]
fn other_lines_keep_their_order() {
    let out = reassociate(vec![Node::plugin(), line("FOO"), line("FXID"), line("BAR")]);
    assert_eq!(tokens(&out), vec!["VST", "FOO", "BAR"]);
    assert!(out[0].contents().is_empty());
}

#[test]
fn lookahead_is_limited() {
    let out = reassociate(vec![
        Node::plugin(),
        line("A"),
        line("B"),
        line("C"),
        line("D"),
        line("FXID"),
    ]);
    assert_eq!(tokens(&out), vec!["VST", "A", "B", "C", "D", "FXID"]);
    assert!(out[0].as_plugin().unwrap().attributes().is_empty());
}

#[test]
fn lookahead_stops_at_next_plugin() {
    let out = reassociate(vec![Node::plugin(), Node::plugin(), line("FXID")]);
    assert_eq!(tokens(&out), vec!["VST", "VST"]);
    assert!(out[0].as_plugin().unwrap().attributes().is_empty());
    assert!(out[1].as_plugin().unwrap().attributes().contains(ExternalAttribute::FxId));
}

#[test]
fn duplicate_attributes_pass_through() {
    let out = reassociate(vec![Node::plugin(), line("FXID"), line("FXID")]);
    assert_eq!(tokens(&out), vec!["VST", "FXID"]);
}

#[test]
fn bypass_after_plugin_goes_to_the_next_one() {
    let out = reassociate(vec![Node::plugin(), line("BYPASS"), Node::plugin()]);
    assert_eq!(tokens(&out), vec!["VST", "VST"]);
    assert!(out[0].as_plugin().unwrap().attributes().is_empty());
    assert!(out[1].as_plugin().unwrap().attributes().contains(ExternalAttribute::Bypass));
}

#[test]
fn bypass_without_plugin_is_untouched() {
    let out = reassociate(vec![line("BYPASS"), line("SHOW")]);
    assert_eq!(tokens(&out), vec!["BYPASS", "SHOW"]);
}
