#![doc = r#"
Line-oriented reader for `.RPP` text

```text
object         := indent '<' TOKEN params? '\n' (struct|object|multilineParam|b64line)* indent '>'
struct         := indent TOKEN params '\n'
params         := (WS (int|decimal|string))*
multilineParam := indent '|' rest-of-line '\n'
```

Every line is one of: a block opening (`<TOKEN`), a block close (`>`), a
`|` line appending to the enclosing block's text, or a struct. Inside a
`VST` block any other line is base64.

When a block closes it is turned into its final [`Node`]:

- `|` lines, joined with `\n`, become its trailing string parameter;
- `<NAME` children holding only `|` lines put the value of a string no
  delimiter could hold back into the parameter they stand in for, see
  [`QuoteStyle::Multiline`](crate::param::QuoteStyle::Multiline);
- `VST` bodies decode into a [`PluginState`];
- `FXCHAIN`, `FXCHAIN_REC` and `TAKEFX` children are reassociated, see
  [`reassociate`];
- `SOURCE MIDI` event lines are cleaned, see [`Node::clean_midi`].
"#]

mod cursor;
mod error;
pub use error::*;

use core::str::FromStr;

use cursor::LineCursor;

use crate::{
    Node, NodeKind, ParamValue, PluginState,
    node::token,
    param::{NumericKind, multiline_placeholder, numeric_kind},
    plugin::{CHUNK_LINE_WIDTH, VstChunkHeader, reassociate},
};

#[doc = r#"
Read a single node, block or struct, from `text`.

Blank lines around the node are ignored. Indentation is not significant.

# Example
```rust
# use rppx::prelude::*;
let node = parse("<NOTES\n  || Line one with extra pipes |\n  | Second Line\n>").unwrap();
assert_eq!(node, Node::notes("| Line one with extra pipes |\n Second Line"));
```

# Errors
if the text is not a single well formed node, or a plugin body or MIDI
source inside it does not decode.
"#]
pub fn parse(text: &str) -> ReadResult<Node> {
    let mut reader = TreeReader::default();
    for (index, line) in text.lines().enumerate() {
        reader.read_line(line, index + 1)?;
    }
    reader.finish()
}

impl FromStr for Node {
    type Err = ReaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Read a parameter list, like the part of a line after its token.
///
/// ```rust
/// # use rppx::prelude::*;
/// # use rppx::reader::parse_params;
/// assert_eq!(parse_params(r#" "" 1234{}"#).unwrap(), rppx::params!["", "1234{}"]);
/// ```
pub fn parse_params(text: &str) -> ReadResult<Vec<ParamValue>> {
    LineCursor::new(text, 1).read_params()
}

/// Read a single string, quoted or bare. Quoted strings end at the next
/// occurrence of their opening delimiter.
pub fn parse_string(text: &str) -> ReadResult<String> {
    let mut cursor = LineCursor::new(text, 1);
    let value = cursor.read_string()?;
    if !cursor.at_end() {
        return Err(cursor.error(ReaderErrorKind::TrailingContent));
    }
    Ok(value)
}

/// Read an integer literal, `-?[0-9]+`
pub fn parse_int(text: &str) -> ReadResult<i64> {
    match numeric_kind(text) {
        Some(NumericKind::Int) => text.parse().map_err(|_| invalid_number(text)),
        _ => Err(invalid_number(text)),
    }
}

/// Read a decimal literal. Integer literals are accepted too.
pub fn parse_decimal(text: &str) -> ReadResult<f64> {
    match numeric_kind(text) {
        Some(_) => text.parse().map_err(|_| invalid_number(text)),
        None => Err(invalid_number(text)),
    }
}

fn invalid_number(text: &str) -> ReaderError {
    ReaderError::new(1, 1, ReaderErrorKind::InvalidNumber(text.to_owned()))
}

/// A closed child, flagged if it only carries a multiline value
struct Child {
    node: Node,
    carrier: bool,
}

/// Accumulates the base64 lines of a `VST` body into chunks.
///
/// A chunk ends at a blank line, a line shorter than [`CHUNK_LINE_WIDTH`]
/// or a line ending in `=`. The state chunk also ends once it reaches the
/// length the header gives for it.
#[derive(Default)]
struct ChunkBuffer {
    chunks: Vec<String>,
    pending: String,
    state_len: Option<usize>,
}

impl ChunkBuffer {
    fn push_line(&mut self, line: &str) {
        if line.is_empty() {
            self.flush();
            self.push_chunk(String::new());
            return;
        }
        self.pending.push_str(line);
        let sized = self.chunks.len() == 1 && self.state_len == Some(self.pending.len());
        if sized || line.len() < CHUNK_LINE_WIDTH || line.ends_with('=') {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            let chunk = core::mem::take(&mut self.pending);
            self.push_chunk(chunk);
        }
    }

    fn push_chunk(&mut self, chunk: String) {
        if self.chunks.is_empty() {
            self.state_len = VstChunkHeader::decode(&chunk)
                .ok()
                .map(|header| header.encoded_state_len());
        }
        self.chunks.push(chunk);
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

/// A block that has been opened but not closed yet
struct Frame {
    token: String,
    params: Vec<ParamValue>,
    children: Vec<Child>,
    pipe: Option<String>,
    chunks: Option<ChunkBuffer>,
    line: usize,
    column: usize,
}

impl Frame {
    fn open(token: &str, params: Vec<ParamValue>, line: usize, column: usize) -> Self {
        Self {
            token: token.to_owned(),
            params,
            children: Vec::new(),
            pipe: None,
            chunks: (token == token::VST).then(ChunkBuffer::default),
            line,
            column,
        }
    }

    fn push_pipe(&mut self, text: &str) {
        match &mut self.pipe {
            Some(pipe) => {
                pipe.push('\n');
                pipe.push_str(text);
            }
            None => self.pipe = Some(text.to_owned()),
        }
    }

    fn close(self) -> ReadResult<Child> {
        let Frame {
            token,
            mut params,
            children,
            pipe,
            chunks,
            line,
            column,
        } = self;
        let error = |kind: ReaderErrorKind| ReaderError::new(line, column, kind);

        let carrier = token == token::NAME && params.is_empty() && children.is_empty() && pipe.is_some();
        let mut contents = substitute_carriers(&mut params, children);
        if let Some(text) = pipe {
            params.push(ParamValue::String(text));
        }

        let kind = match NodeKind::for_token(&token) {
            NodeKind::Plugin(_) => {
                let state = PluginState::from_chunks(chunks.unwrap_or_default().finish())
                    .map_err(|e| error(e.into()))?;
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "Read plugin {:?} with {} inputs, {} outputs",
                    params.first().map(ToString::to_string),
                    state.header().num_inputs(),
                    state.header().num_outputs()
                );
                NodeKind::Plugin(Box::new(state))
            }
            kind => kind,
        };

        if token::CHAINS.contains(&token.as_str()) {
            contents = reassociate(contents);
        }

        let mut node = Node::from_parts(token, params, Some(contents), kind);
        if node.is_midi_source() {
            node.clean_midi().map_err(|e| error(e.into()))?;
            #[cfg(feature = "tracing")]
            tracing::debug!("Read MIDI source with {} lines", node.contents().len());
        }

        #[cfg(feature = "tracing")]
        tracing::trace!("Closed <{} opened at line {line}", node.token());
        Ok(Child { node, carrier })
    }
}

/// Put carried multiline values back into the parameters they stand in for.
///
/// Each carrier replaces the first parameter equal to its placeholder that
/// was not replaced yet. Carriers without a match stay as children.
fn substitute_carriers(params: &mut [ParamValue], children: Vec<Child>) -> Vec<Node> {
    let mut replaced = vec![false; params.len()];
    let mut contents = Vec::with_capacity(children.len());

    for Child { node, carrier } in children {
        if carrier {
            if let Some(text) = node.param(0).and_then(ParamValue::as_str) {
                let placeholder = multiline_placeholder(text);
                let slot = params
                    .iter()
                    .zip(&replaced)
                    .position(|(param, done)| !done && param.as_str() == Some(placeholder.as_str()));
                if let Some(index) = slot {
                    params[index] = ParamValue::String(text.to_owned());
                    replaced[index] = true;
                    continue;
                }
            }
            #[cfg(feature = "tracing")]
            tracing::warn!("Multiline <NAME block matches no parameter, keeping it as a child");
        }
        contents.push(node);
    }

    contents
}

#[derive(Default)]
struct TreeReader {
    stack: Vec<Frame>,
    root: Option<Node>,
}

impl TreeReader {
    fn read_line(&mut self, text: &str, line: usize) -> ReadResult<()> {
        let mut cursor = LineCursor::new(text, line);
        cursor.skip_whitespace();
        let first = cursor.peek();

        if let Some(buffer) = self.stack.last_mut().and_then(|f| f.chunks.as_mut()) {
            if !matches!(first, Some('<' | '>' | '|')) {
                buffer.push_line(cursor.rest().trim_end());
                return Ok(());
            }
        }

        let Some(first) = first else {
            return Ok(());
        };
        if self.stack.is_empty() && self.root.is_some() {
            return Err(cursor.error(match first {
                '>' => ReaderErrorKind::UnexpectedClose,
                _ => ReaderErrorKind::TrailingContent,
            }));
        }

        match first {
            '<' => {
                let column = cursor.column();
                cursor.bump();
                let token = cursor.read_bare();
                if token.is_empty() {
                    return Err(cursor.error(ReaderErrorKind::MissingToken));
                }
                let params = cursor.read_params()?;
                self.stack.push(Frame::open(token, params, line, column));
            }
            '>' => {
                let Some(frame) = self.stack.pop() else {
                    return Err(cursor.error(ReaderErrorKind::UnexpectedClose));
                };
                cursor.bump();
                cursor.skip_whitespace();
                if !cursor.at_end() {
                    return Err(cursor.error(ReaderErrorKind::TrailingGarbage));
                }
                let child = frame.close()?;
                self.attach(child);
            }
            '|' => {
                let Some(frame) = self.stack.last_mut() else {
                    return Err(cursor.error(ReaderErrorKind::StrayPipe));
                };
                cursor.bump();
                frame.push_pipe(cursor.rest());
            }
            _ => {
                let token = cursor.read_bare().to_owned();
                let params = cursor.read_params()?;
                self.attach(Child {
                    node: Node::from_parts(token, params, None, NodeKind::Generic),
                    carrier: false,
                });
            }
        }
        Ok(())
    }

    fn attach(&mut self, child: Child) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(child),
            None => self.root = Some(child.node),
        }
    }

    fn finish(self) -> ReadResult<Node> {
        if let Some(frame) = self.stack.last() {
            return Err(ReaderError::new(
                frame.line,
                frame.column,
                ReaderErrorKind::UnterminatedBlock(frame.token.clone()),
            ));
        }
        self.root.ok_or(ReaderError::new(1, 1, ReaderErrorKind::Empty))
    }
}

#[cfg(test)]
use crate::params;

#[test]
fn one_line_object() {
    assert_eq!(parse("<TEST 1\n>").unwrap(), Node::block("TEST", params![1], vec![]));
}

#[test]
fn objects_with_structs_and_indents() {
    let expected = Node::block("NAME", params!["GUITAR"], vec![Node::new("VOLUME", params![11])]);
    assert_eq!(parse("<NAME \"GUITAR\"\n  VOLUME 11\n>").unwrap(), expected);
    assert_eq!(parse("  <NAME \"GUITAR\"\n    VOLUME 11\n  >").unwrap(), expected);
    assert_eq!(parse("\n\n<NAME GUITAR\nVOLUME 11\n>\n\n").unwrap(), expected);
}

#[test]
fn nested_objects() {
    let node = parse("<NAME \"GUITAR\"\n  VOLUME 11\n  <METRONOME 6 2\n    VOL 0.25 0.125\n  >\n>").unwrap();
    assert_eq!(
        node,
        Node::block(
            "NAME",
            params!["GUITAR"],
            vec![
                Node::new("VOLUME", params![11]),
                Node::block("METRONOME", params![6, 2], vec![Node::new("VOL", params![0.25, 0.125])]),
            ]
        )
    );
}

#[test]
fn root_struct() {
    assert_eq!(parse("VOLUME 11").unwrap(), Node::new("VOLUME", params![11]));
}

#[test]
fn start_rules() {
    assert_eq!(parse_int("0").unwrap(), 0);
    assert_eq!(parse_int("100").unwrap(), 100);
    assert_eq!(parse_int("-10").unwrap(), -10);
    assert_eq!(parse_decimal("0.0").unwrap(), 0.0);
    assert_eq!(parse_decimal("101.555").unwrap(), 101.555);
    assert_eq!(parse_decimal("-10.1234").unwrap(), -10.1234);

    assert_eq!(parse_params(" 0 1").unwrap(), params![0, 1]);
    assert_eq!(parse_params(" 5 10").unwrap(), params![5, 10]);
    assert_eq!(parse_params(" \"ok\" 1 2 3").unwrap(), params!["ok", 1, 2, 3]);
}

#[test]
fn string_rule() {
    for (input, expected) in [
        ("\"Okay this is a string\"", "Okay this is a string"),
        ("\"\"", ""),
        ("aString", "aString"),
        ("hel\"lo", "hel\"lo"),
        ("hello\"", "hello\""),
        ("\"! ok\"", "! ok"),
        ("!@#$%^&*()_+", "!@#$%^&*()_+"),
        ("\"''\"", "''"),
        ("'\"'", "\""),
        ("\"```\"", "```"),
        ("`\"`", "\""),
    ] {
        assert_eq!(parse_string(input).unwrap(), expected, "{input}");
    }
}

#[test]
fn quoted_numbers_stay_strings() {
    assert_eq!(parse_params(" \"10\" 10").unwrap(), vec![ParamValue::from("10"), ParamValue::Int(10)]);
}

#[test]
fn multiline_carrier() {
    let node = parse("<NAME `''''''\"\"\"`\n  <NAME\n    |'''```\"\"\"\n  >\n>").unwrap();
    assert_eq!(node, Node::block("NAME", params!["'''```\"\"\""], vec![]));
}

#[test]
fn unmatched_carrier_stays() {
    let node = parse("<TRACK x\n  <NAME\n    |hello\n  >\n>").unwrap();
    assert_eq!(node.contents().len(), 1);
    assert_eq!(node.contents()[0].params(), &params!["hello"][..]);
}

#[test]
fn vst_chunks() {
    let long = "A".repeat(CHUNK_LINE_WIDTH);
    let text = format!(
        "<VST \"VST: ReaEQ (Cockos)\" reaeq.dll 0\n  AAAAAO9e7f4CAAAAAQAAAAAAAAACAAAAAAAAAAIAAAABAAAAAAAAAAIAAAAAAAAAAAAAAAEAAAD//xAA\n  {long}\n  QUJD\n  AAAQAAAA\n>"
    );
    let node = parse(&text).unwrap();
    let state = node.as_plugin().unwrap();
    assert_eq!(node.params(), &params!["VST: ReaEQ (Cockos)", "reaeq.dll", 0][..]);
    assert_eq!(state.state(), format!("{long}QUJD"));
    assert_eq!(state.preset(), "AAAQAAAA");
    assert!(node.contents().is_empty());
}

#[test]
fn vst_state_length_comes_from_the_header() {
    // 96 bytes of state encode to exactly one full line without padding
    let mut plugin = Node::plugin();
    let state = plugin.as_plugin_mut().unwrap();
    state.set_state("A".repeat(CHUNK_LINE_WIDTH)).unwrap();
    state.set_preset("AEZhY3RvcnkgUHJlc2V0czogRmFjdG9yeSBEZWZhdWx0ABAAAAA=");

    let reread = parse(&plugin.dump(0)).unwrap();
    let state = reread.as_plugin().unwrap();
    assert_eq!(state.header().state_size(), 96);
    assert_eq!(state.state().len(), CHUNK_LINE_WIDTH);
    assert_eq!(state.preset(), "AEZhY3RvcnkgUHJlc2V0czogRmFjdG9yeSBEZWZhdWx0ABAAAAA=");
    assert_eq!(reread, plugin);
}

#[test]
fn vst_blank_line_is_empty_chunk() {
    let text = "<VST a\n  AAAAAO9e7f4CAAAAAQAAAAAAAAACAAAAAAAAAAIAAAABAAAAAAAAAAIAAAAAAAAAAAAAAAEAAAD//xAA\n  \n  AAAQAAAA\n>";
    let state = parse(text).unwrap().as_plugin().unwrap().clone();
    assert_eq!(state.state(), "");
    assert_eq!(state.preset(), "AAAQAAAA");
}

#[test]
fn chains_are_reassociated() {
    let chain = parse("<FXCHAIN\n  SHOW 0\n  BYPASS 1 0 0\n  <VST a b\n  >\n  FXID {X}\n>").unwrap();
    assert_eq!(chain.contents().len(), 2);
    let attributes = chain.contents()[1].as_plugin().unwrap().attributes();
    assert_eq!(attributes.get(crate::ExternalAttribute::Bypass), Some(&params![1, 0, 0][..]));
    assert_eq!(attributes.get(crate::ExternalAttribute::FxId), Some(&params!["{X}"][..]));
}

#[test]
fn midi_sources_are_cleaned() {
    let source = parse("<SOURCE MIDI\n  HASDATA 1 960 QN\n  E 0 90 3c 64\n  E 1920 80 3c 00\n>").unwrap();
    assert_eq!(source.contents()[1].params(), &params![0, "90", "3c", "64"][..]);
    assert_eq!(source.contents()[2].params(), &params![1920, "80", "3c", "00"][..]);
}

#[test]
fn midi_sources_keep_sysex_blocks() {
    let text = "<SOURCE MIDI\n  HASDATA 1 960 QN\n  <X 0 0\n    /w8HCAAAAAAAAAAA\n  >\n  E 0 90 3c 64\n>";
    let source = parse(text).unwrap();
    let sysex = &source.contents()[1];
    assert!(sysex.is_block());
    assert_eq!(sysex.params(), &params![0, 0][..]);
    assert_eq!(sysex.contents()[0].token(), "/w8HCAAAAAAAAAAA");
    assert_eq!(source.contents()[2].params(), &params![0, "90", "3c", "64"][..]);
    assert_eq!(source.dump(0), text);
}

#[cfg(test)]
fn error_at(text: &str) -> (usize, usize, ReaderErrorKind) {
    let err = parse(text).unwrap_err();
    (err.line(), err.column(), err.error_kind().clone())
}

#[test]
fn syntax_errors() {
    use ReaderErrorKind::*;
    assert_eq!(error_at("<TRACK\n  NAME x"), (1, 1, UnterminatedBlock("TRACK".to_owned())));
    assert_eq!(error_at(">"), (1, 1, UnexpectedClose));
    assert_eq!(error_at("<A\n>\n>"), (3, 1, UnexpectedClose));
    assert_eq!(error_at("<A\n> x"), (2, 3, TrailingGarbage));
    assert_eq!(error_at("<\n>"), (1, 2, MissingToken));
    assert_eq!(
        error_at("<A \"x\n>"),
        (1, 4, UnterminatedString(crate::param::Delimiter::Double))
    );
    assert_eq!(error_at("<A\n>\nB"), (3, 1, TrailingContent));
    assert_eq!(error_at("|x"), (1, 1, StrayPipe));
    assert_eq!(error_at("  \n"), (1, 1, Empty));
    assert_eq!(parse_int("1.5").unwrap_err().error_kind(), &InvalidNumber("1.5".to_owned()));
    assert_eq!(parse_string("a b").unwrap_err().error_kind(), &TrailingContent);
}

#[test]
fn hook_errors() {
    assert!(matches!(error_at("<VST a\n  @@@@\n>"), (1, 1, ReaderErrorKind::Vst(_))));
    assert!(matches!(
        error_at("<SOURCE MIDI\n  E 0 90\n>"),
        (1, 1, ReaderErrorKind::Midi(crate::MidiError::MalformedEvent { .. }))
    ));
}
