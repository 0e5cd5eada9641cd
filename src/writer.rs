#![doc = r#"
Writing a [`Node`] tree back to `.RPP` text

Output is indented with two spaces per level and never ends in a newline.
Most nodes follow two rules:

- a struct is one line, `TOKEN params`;
- a block is `<TOKEN params`, its children one level deeper, then `>`.

An empty block still takes two lines (`<TEST 1` and `>`). `NOTES` and `VST`
nodes have their own layout, and event lines inside a `SOURCE MIDI` block
write their hex fields bare.
"#]

use crate::{
    ExternalAttribute, Node, NodeKind, ParamValue, PluginState,
    node::token,
    param::QuoteStyle,
    plugin::CHUNK_LINE_WIDTH,
};

const INDENT: &str = "  ";

/// Join parameters, each prefixed with a single space.
///
/// ```rust
/// # use rppx::writer::dump_params;
/// assert_eq!(dump_params(&rppx::params![0, 1]), " 0 1");
/// assert_eq!(dump_params(&rppx::params!["", "1234{}"]), " \"\" 1234{}");
/// ```
pub fn dump_params(params: &[ParamValue]) -> String {
    params.iter().map(|param| format!(" {param}")).collect()
}

/// Like [`dump_params`], but strings made only of hex digits are written bare
fn dump_event_params(params: &[ParamValue]) -> String {
    params
        .iter()
        .map(|param| match param {
            ParamValue::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit()) => format!(" {s}"),
            param => format!(" {param}"),
        })
        .collect()
}

impl Node {
    #[doc = r#"
Write this node and its children, starting at `indent` levels.

# Example
```rust
# use rppx::prelude::*;
assert_eq!(Node::block("TEST", rppx::params![1], vec![]).dump(0), "<TEST 1\n>");
assert_eq!(Node::new("VOLUME", rppx::params![11]).dump(1), "  VOLUME 11");
```
"#]
    pub fn dump(&self, indent: usize) -> String {
        let mut out = Writer::default();
        out.node(self, indent, false);
        out.finish()
    }
}

#[derive(Default)]
struct Writer {
    out: String,
}

impl Writer {
    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn finish(mut self) -> String {
        if self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out
    }

    fn node(&mut self, node: &Node, indent: usize, in_midi_source: bool) {
        match node.kind() {
            NodeKind::Generic => self.generic(node, indent, in_midi_source),
            NodeKind::Notes => self.notes(node, indent),
            NodeKind::Plugin(state) => self.plugin(node, state, indent),
        }
    }

    fn generic(&mut self, node: &Node, indent: usize, in_midi_source: bool) {
        let params = if in_midi_source && node.is_struct() && token::MIDI_EVENTS.contains(&node.token()) {
            dump_event_params(node.params())
        } else {
            dump_params(node.params())
        };
        let has_carriers = node.params().iter().any(needs_carrier);

        if node.is_struct() && !has_carriers {
            self.line(indent, &format!("{}{params}", node.token()));
            return;
        }

        self.line(indent, &format!("<{}{params}", node.token()));
        self.carriers(node.params(), indent + 1);
        let midi = node.is_midi_source();
        for child in node.contents() {
            self.node(child, indent + 1, midi);
        }
        self.line(indent, ">");
    }

    /// `<NAME` blocks holding strings no delimiter can wrap
    fn carriers(&mut self, params: &[ParamValue], indent: usize) {
        for text in params.iter().filter(|p| needs_carrier(p)).filter_map(ParamValue::as_str) {
            self.line(indent, &format!("<{}", token::NAME));
            self.pipe_lines(text, indent + 1);
            self.line(indent, ">");
        }
    }

    fn pipe_lines(&mut self, text: &str, indent: usize) {
        for line in text.split('\n') {
            self.line(indent, &format!("|{line}"));
        }
    }

    fn notes(&mut self, node: &Node, indent: usize) {
        let (header, text) = match node.params().split_last() {
            Some((ParamValue::String(text), header)) => (header, Some(text)),
            _ => (node.params(), None),
        };

        self.line(indent, &format!("<{}{}", node.token(), dump_params(header)));
        self.carriers(header, indent + 1);
        if let Some(text) = text {
            self.pipe_lines(text, indent + 1);
        }
        for child in node.contents() {
            self.node(child, indent + 1, false);
        }
        self.line(indent, ">");
    }

    fn plugin(&mut self, node: &Node, state: &PluginState, indent: usize) {
        let attributes = state.attributes();
        let attribute_line = |writer: &mut Self, attribute: ExternalAttribute| {
            if let Some(params) = attributes.get(attribute) {
                writer.line(indent, &format!("{}{}", attribute.token(), dump_params(params)));
            }
        };

        attribute_line(self, ExternalAttribute::Bypass);
        self.line(indent, &format!("<{}{}", node.token(), dump_params(node.params())));
        self.carriers(node.params(), indent + 1);
        for chunk in state.chunks() {
            if chunk.is_empty() {
                self.line(indent + 1, "");
            }
            for piece in wrap(&chunk, CHUNK_LINE_WIDTH) {
                self.line(indent + 1, piece);
            }
        }
        self.line(indent, ">");

        attribute_line(self, ExternalAttribute::PresetName);
        attribute_line(self, ExternalAttribute::FloatPos);
        attribute_line(self, ExternalAttribute::FxId);
        for child in node.contents() {
            self.node(child, indent, false);
        }
        attribute_line(self, ExternalAttribute::WindowKeys);
    }
}

fn needs_carrier(param: &ParamValue) -> bool {
    param.quote_style() == QuoteStyle::Multiline
}

/// Split `s` into pieces of at most `width` characters
fn wrap(s: &str, width: usize) -> impl Iterator<Item = &str> {
    let mut rest = s;
    core::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let end = rest.char_indices().nth(width).map_or(rest.len(), |(i, _)| i);
        let (piece, tail) = rest.split_at(end);
        rest = tail;
        Some(piece)
    })
}

#[cfg(test)]
use crate::params;

#[test]
fn one_line_object() {
    assert_eq!(Node::block("TEST", params![1], vec![]).dump(0), "<TEST 1\n>");
}

#[test]
fn objects_with_structs() {
    let mut guitar = Node::block("NAME", params!["GUITAR"], vec![Node::new("VOLUME", params![11])]);
    assert_eq!(guitar.dump(0), "<NAME GUITAR\n  VOLUME 11\n>");

    guitar
        .add(Node::block("METRONOME", params![6, 2], vec![]))
        .add(Node::new("VOL", params![0.25, 0.125]));
    assert_eq!(
        guitar.dump(0),
        "<NAME GUITAR\n  VOLUME 11\n  <METRONOME 6 2\n    VOL 0.25 0.125\n  >\n>"
    );
}

#[test]
fn params_rule() {
    assert_eq!(dump_params(&params![0, 1]), " 0 1");
    assert_eq!(dump_params(&params![5, 10]), " 5 10");
    assert_eq!(dump_params(&params!["ok", 1, 2, 3]), " ok 1 2 3");
    assert_eq!(dump_params(&params!["", "1234{}"]), " \"\" 1234{}");
    assert_eq!(dump_params(&[]), "");
}

#[test]
fn notes() {
    assert_eq!(
        Node::notes("| Line one with extra pipes |\n Second Line").dump(0),
        "<NOTES\n  || Line one with extra pipes |\n  | Second Line\n>"
    );
    assert_eq!(Node::block("NOTES", params![], vec![]).dump(1), "  <NOTES\n  >");
    assert_eq!(Node::block("NOTES", params![0, "x"], vec![]).dump(0), "<NOTES 0\n  |x\n>");
}

#[test]
fn all_delimiters_need_a_carrier() {
    let node = Node::block("NAME", params!["'''```\"\"\""], vec![]);
    assert_eq!(node.dump(0), "<NAME `''''''\"\"\"`\n  <NAME\n    |'''```\"\"\"\n  >\n>");
}

#[test]
fn struct_with_carrier_becomes_a_block() {
    let node = Node::new("NAME", params!["two\nlines"]);
    assert_eq!(node.dump(0), "<NAME `two lines`\n  <NAME\n    |two\n    |lines\n  >\n>");
}

#[test]
fn midi_hex_fields_are_bare() {
    let source = Node::block(
        "SOURCE",
        params!["MIDI"],
        vec![
            Node::new("HASDATA", params![1, 960, "QN"]),
            Node::new("E", params![0, "90", "3c", "60"]),
        ],
    );
    assert_eq!(source.dump(0), "<SOURCE MIDI\n  HASDATA 1 960 QN\n  E 0 90 3c 60\n>");

    // outside a MIDI source the same line keeps its quotes
    let track = Node::block("TRACK", params![], vec![Node::new("E", params![0, "90"])]);
    assert_eq!(track.dump(0), "<TRACK\n  E 0 \"90\"\n>");
}

#[test]
fn fresh_plugin() {
    let mut vst = Node::plugin();
    vst.as_plugin_mut()
        .unwrap()
        .attributes_mut()
        .set(ExternalAttribute::FxId, params!["{A}"]);
    vst.as_plugin_mut()
        .unwrap()
        .attributes_mut()
        .set(ExternalAttribute::Bypass, params![0, 0, 0]);
    assert_eq!(
        vst.dump(1),
        [
            "  BYPASS 0 0 0",
            "  <VST \"\" \"\" \"\" \"\" \"\"",
            "    AAAAAO9e7f4CAAAAAQAAAAAAAAACAAAAAAAAAAIAAAABAAAAAAAAAAIAAAAAAAAAAAAAAAEAAAD//xAA",
            "    ",
            "    AAAQAAAA",
            "  >",
            "  FXID {A}",
        ]
        .join("\n")
    );
}

#[test]
fn wrap_long_chunks() {
    let chunk = "A".repeat(300);
    let pieces: Vec<_> = wrap(&chunk, CHUNK_LINE_WIDTH).map(str::len).collect();
    assert_eq!(pieces, vec![128, 128, 44]);
    assert_eq!(wrap("", CHUNK_LINE_WIDTH).count(), 0);
}
