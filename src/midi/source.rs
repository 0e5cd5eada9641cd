use super::{MidiNote, MidiSettings, notes_to_contents};
use crate::{MidiError, Node, ParamValue, node::token, params};

const MIDI: &str = "MIDI";
const WAVE: &str = "WAVE";

impl Node {
    /// A fresh `<SOURCE WAVE>` block
    pub fn source() -> Self {
        Self::block(token::SOURCE, params![WAVE], Vec::new())
    }

    /// The first parameter of a `SOURCE` node, like `MIDI` or `WAVE`
    pub fn source_type(&self) -> Option<&str> {
        if self.token() != token::SOURCE {
            return None;
        }
        self.param(0).and_then(ParamValue::as_str)
    }

    /// True for `SOURCE MIDI`
    pub fn is_midi_source(&self) -> bool {
        self.source_type() == Some(MIDI)
    }

    /// True for `SOURCE WAVE`
    pub fn is_wave_source(&self) -> bool {
        self.source_type() == Some(WAVE)
    }

    /// Set the source type to `WAVE`. Other parameters and the children stay.
    pub fn make_wave_source(&mut self) -> &mut Self {
        self.set_source_type(WAVE);
        self
    }

    /// Set the source type to `MIDI` and normalize existing event lines,
    /// see [`Node::clean_midi`].
    ///
    /// # Errors
    /// if the node is not a `SOURCE`, or an event line is malformed.
    pub fn make_midi_source(&mut self) -> Result<&mut Self, MidiError> {
        self.ensure_source()?;
        self.set_source_type(MIDI);
        self.clean_midi()?;
        Ok(self)
    }

    #[doc = r#"
Restore the hex fields of the event lines of a `SOURCE MIDI` block.

A field like `90` reads back as a string, but `00` or `64` read back as
integers. This turns every status and data field back into a two character
string: fields 1 to 3 of `E` type events and 2 to 4 of `X` type events, which
carry an extra delta field. Single digit strings get a leading zero.

# Errors
if the node is not a `SOURCE MIDI`, or an event line is missing fields or
has a field that cannot be a two digit hex value.
"#]
    pub fn clean_midi(&mut self) -> Result<&[Node], MidiError> {
        if !self.is_midi_source() {
            return Err(self.not_midi_source());
        }
        for event in self.contents_mut().into_iter().flatten() {
            // sysex and text events are blocks of base64 lines
            if event.is_block() || !token::MIDI_EVENTS.contains(&event.token()) {
                continue;
            }
            let first = if token::is_extended_event(event.token()) { 2 } else { 1 };
            let name = event.token().to_owned();
            let malformed = |reason| MidiError::MalformedEvent {
                token: name.clone(),
                reason,
            };
            if event.params().len() < first + 3 {
                return Err(malformed("missing fields"));
            }
            for index in first..first + 3 {
                let field = match &event.params()[index] {
                    ParamValue::Int(n) if (0..=99).contains(n) => format!("{n:02}"),
                    ParamValue::String(s) if s.len() == 1 => format!("0{s}"),
                    ParamValue::String(s) if s.len() == 2 => continue,
                    _ => return Err(malformed("not a two digit hex field")),
                };
                event.params_mut()[index] = ParamValue::String(field);
            }
        }
        Ok(self.contents())
    }

    /// Replace the children with event lines generated from `notes` and make
    /// this a `SOURCE MIDI`, see [`notes_to_contents`].
    ///
    /// # Errors
    /// if the node is not a `SOURCE` or a note is invalid. Nothing changes in
    /// that case.
    pub fn set_midi_notes(&mut self, notes: &[MidiNote], settings: &MidiSettings) -> Result<(), MidiError> {
        self.ensure_source()?;
        let contents = notes_to_contents(notes, settings)?;
        self.set_source_type(MIDI);
        self.set_contents(Some(contents));
        Ok(())
    }

    fn set_source_type(&mut self, source_type: &str) {
        let value = ParamValue::from(source_type);
        let params = self.params_mut();
        if params.is_empty() {
            params.push(value);
        } else {
            params[0] = value;
        }
    }

    fn ensure_source(&self) -> Result<(), MidiError> {
        if self.token() == token::SOURCE {
            Ok(())
        } else {
            Err(self.not_midi_source())
        }
    }

    fn not_midi_source(&self) -> MidiError {
        MidiError::NotMidiSource {
            token: self.token().to_owned(),
            source_type: self.param(0).map(ToString::to_string),
        }
    }
}

#[test]
fn fresh_source_is_wave() {
    let mut source = Node::source();
    assert!(source.is_wave_source());
    assert!(!source.is_midi_source());
    source.make_midi_source().unwrap();
    assert!(source.is_midi_source());
    source.make_wave_source();
    assert!(source.is_wave_source());
}

#[test]
fn clean_midi_restores_hex_fields() {
    let mut source = Node::block(
        "SOURCE",
        params!["MIDI"],
        vec![
            Node::new("HASDATA", params![1, 960, "QN"]),
            Node::new("E", params![0, 90, 0, 64]),
            Node::new("e", params![10, "b0", "7", 5]),
            Node::new("X", params![1, 4294967295i64, 80, 0, 0]),
            Node::new("CCINTERP", params![32]),
        ],
    );
    let contents = source.clean_midi().unwrap();

    assert_eq!(contents[0].params(), &params![1, 960, "QN"][..]);
    assert_eq!(contents[1].params(), &params![0, "90", "00", "64"][..]);
    assert_eq!(contents[2].params(), &params![10, "b0", "07", "05"][..]);
    assert_eq!(contents[3].params(), &params![1, 4294967295i64, "80", "00", "00"][..]);
    assert_eq!(contents[4].params(), &params![32][..]);
}

#[test]
fn clean_midi_skips_event_blocks() {
    let sysex = Node::block("X", params![0, 0], vec![Node::new("/w8HCAAAAAAAAAAA", params![])]);
    let mut source = Node::block(
        "SOURCE",
        params!["MIDI"],
        vec![sysex.clone(), Node::new("E", params![0, 90, "3c", 64])],
    );
    let contents = source.clean_midi().unwrap();
    assert_eq!(contents[0], sysex);
    assert_eq!(contents[1].params(), &params![0, "90", "3c", "64"][..]);
}

#[test]
fn clean_midi_rejects_bad_events() {
    let mut short = Node::block("SOURCE", params!["MIDI"], vec![Node::new("E", params![0, "90", "3c"])]);
    assert_eq!(
        short.clean_midi().unwrap_err(),
        MidiError::MalformedEvent {
            token: "E".to_owned(),
            reason: "missing fields"
        }
    );

    let mut wave = Node::source();
    assert!(matches!(wave.clean_midi(), Err(MidiError::NotMidiSource { .. })));
}

#[test]
fn set_midi_notes_replaces_contents() {
    let mut source = Node::source();
    source.add(Node::new("FILE", params!["a.wav"]));
    source
        .set_midi_notes(&[MidiNote::new(0., 0.25, 60).with_velocity(0)], &MidiSettings::default())
        .unwrap();

    assert!(source.is_midi_source());
    assert_eq!(source.contents().len(), 3);
    assert_eq!(source.contents()[1].params(), &params![0, "90", "3c", "00"][..]);

    let mut track = Node::block("TRACK", params![], vec![]);
    assert!(track.set_midi_notes(&[], &MidiSettings::default()).is_err());
    assert!(track.params().is_empty());
}
