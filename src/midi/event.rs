use num_enum::{IntoPrimitive, TryFromPrimitive};

use super::{MAX_DELTA, MidiNote, MidiSettings};
use crate::{MidiError, Node, ParamValue, node::token, params};

/// The two channel voice messages notes are made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum NoteStatus {
    /// `8n`
    Off = 0x8,
    /// `9n`
    On = 0x9,
}

/// A single note on or off, timed relative to the previous event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteEvent {
    /// Ticks since the previous event
    pub delta_ticks: u64,
    /// On or off
    pub status: NoteStatus,
    /// 0-15
    pub channel: u8,
    /// 0-127
    pub note: u8,
    /// 0-127, always 0 for note offs
    pub velocity: u8,
}

impl NoteEvent {
    /// True if the delta does not fit an `E` event and an `X` event is written
    pub const fn is_extended(&self) -> bool {
        self.delta_ticks > MAX_DELTA
    }

    /// The event token
    pub const fn token(&self) -> &'static str {
        if self.is_extended() { "X" } else { "E" }
    }

    /// The delta fields of the event line.
    ///
    /// Extended events split the delta into the remainder and the maximum
    /// delta. This is a single split: deltas beyond twice [`MAX_DELTA`] keep
    /// an oversized remainder.
    pub fn delta_fields(&self) -> Vec<u64> {
        if self.is_extended() {
            vec![self.delta_ticks - MAX_DELTA, MAX_DELTA]
        } else {
            vec![self.delta_ticks]
        }
    }
}

/// An event line generated from notes, before it becomes a [`Node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MidiEvent {
    /// The `HASDATA` line declaring the tick resolution
    Meta {
        /// Ticks per quarter note
        ticks_per_quarter_note: u32,
    },
    /// A note on or off
    Note(NoteEvent),
}

impl MidiEvent {
    /// Lower the event into its line
    pub fn into_node(self) -> Node {
        match self {
            Self::Meta {
                ticks_per_quarter_note,
            } => Node::new(token::HASDATA, params![1, ticks_per_quarter_note, "QN"]),
            Self::Note(event) => {
                let mut params: Vec<ParamValue> = event
                    .delta_fields()
                    .into_iter()
                    .map(|delta| ParamValue::Int(delta as i64))
                    .collect();
                params.push(format!("{:x}{:x}", u8::from(event.status), event.channel).into());
                params.push(hex_byte(event.note).into());
                params.push(hex_byte(event.velocity).into());
                Node::new(event.token(), params)
            }
        }
    }

    /// Read an event line back.
    ///
    /// Returns `None` for lines that are neither `HASDATA` nor a note on/off.
    /// The line must have been through [`Node::clean_midi`].
    pub fn from_node(node: &Node) -> Result<Option<Self>, MidiError> {
        let malformed = |reason| MidiError::MalformedEvent {
            token: node.token().to_owned(),
            reason,
        };
        if node.token() == token::HASDATA {
            let tpqn = node
                .param(1)
                .and_then(ParamValue::as_int)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| malformed("missing tick resolution"))?;
            return Ok(Some(Self::Meta {
                ticks_per_quarter_note: tpqn,
            }));
        }
        if node.is_block() || !token::MIDI_EVENTS.contains(&node.token()) {
            return Ok(None);
        }

        let delta_count = if token::is_extended_event(node.token()) { 2 } else { 1 };
        let mut delta_ticks = 0u64;
        for index in 0..delta_count {
            let delta = node
                .param(index)
                .and_then(ParamValue::as_int)
                .and_then(|v| u64::try_from(v).ok())
                .ok_or_else(|| malformed("delta is not a tick count"))?;
            delta_ticks += delta;
        }
        let hex = |index: usize| {
            node.param(delta_count + index)
                .and_then(ParamValue::as_str)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| malformed("not a two digit hex field"))
        };
        let (status, note, velocity) = (hex(0)?, hex(1)?, hex(2)?);
        let Ok(status_kind) = NoteStatus::try_from(status >> 4) else {
            return Ok(None);
        };
        Ok(Some(Self::Note(NoteEvent {
            delta_ticks,
            status: status_kind,
            channel: status & 0x0f,
            note,
            velocity,
        })))
    }
}

fn hex_byte(byte: u8) -> String {
    format!("{byte:02x}")
}

struct Instant {
    tick: u64,
    status: NoteStatus,
    note: MidiNote,
}

fn to_ticks(whole_notes: f64, ticks_per_whole: u64) -> Result<u64, MidiError> {
    let ticks = (whole_notes * ticks_per_whole as f64).round();
    if !ticks.is_finite() || ticks < 0. || ticks > i64::MAX as f64 {
        return Err(MidiError::Time(whole_notes));
    }
    Ok(ticks as u64)
}

#[doc = r#"
Convert absolute-time notes into delta-timed events.

Every note gives a note on at `start` and a note off at `start + length`.
The instants are sorted by tick, keeping input order for ties (each note's
on before its off), and each event carries the ticks elapsed since the
previous one. The first event is always [`MidiEvent::Meta`].

# Errors
if a note has a channel above 15, a note or velocity above 127, or a
negative or non-finite time, or if the resolution is zero.
"#]
pub fn notes_to_events(notes: &[MidiNote], settings: &MidiSettings) -> Result<Vec<MidiEvent>, MidiError> {
    if settings.ticks_per_quarter_note == 0 {
        return Err(MidiError::ZeroResolution);
    }
    let ticks_per_whole = settings.ticks_per_whole_note();

    let mut instants = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        note.validate()?;
        instants.push(Instant {
            tick: to_ticks(note.start, ticks_per_whole)?,
            status: NoteStatus::On,
            note: *note,
        });
        instants.push(Instant {
            tick: to_ticks(note.start + note.length, ticks_per_whole)?,
            status: NoteStatus::Off,
            note: *note,
        });
    }
    instants.sort_by_key(|instant| instant.tick);

    let mut events = Vec::with_capacity(instants.len() + 1);
    events.push(MidiEvent::Meta {
        ticks_per_quarter_note: settings.ticks_per_quarter_note,
    });
    let mut previous = 0;
    for instant in instants {
        let velocity = match instant.status {
            NoteStatus::On => instant.note.velocity,
            NoteStatus::Off => 0,
        };
        events.push(MidiEvent::Note(NoteEvent {
            delta_ticks: instant.tick - previous,
            status: instant.status,
            channel: instant.note.channel,
            note: instant.note.note,
            velocity,
        }));
        previous = instant.tick;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("Generated {} MIDI events from {} notes", events.len(), notes.len());
    Ok(events)
}

/// Convert absolute-time notes into the lines of a `SOURCE MIDI` block,
/// see [`notes_to_events`].
pub fn notes_to_contents(notes: &[MidiNote], settings: &MidiSettings) -> Result<Vec<Node>, MidiError> {
    Ok(notes_to_events(notes, settings)?
        .into_iter()
        .map(MidiEvent::into_node)
        .collect())
}

#[cfg(test)]
fn note_params(node: &Node) -> Vec<String> {
    node.params()
        .iter()
        .map(|p| p.as_str().map_or_else(|| p.to_string(), str::to_owned))
        .collect()
}

#[test]
fn single_note() {
    let contents = notes_to_contents(
        &[MidiNote::new(0., 0.5, 60).with_velocity(100)],
        &MidiSettings::default(),
    )
    .unwrap();

    assert_eq!(contents.len(), 3);
    assert_eq!(contents[0].token(), "HASDATA");
    assert_eq!(contents[0].params(), &params![1, 960, "QN"][..]);
    assert_eq!(contents[1].token(), "E");
    assert_eq!(contents[1].params(), &params![0, "90", "3c", "64"][..]);
    assert_eq!(contents[2].params(), &params![1920, "80", "3c", "00"][..]);
}

#[test]
fn events_are_sorted_with_stable_ties() {
    let notes = [
        MidiNote::new(0.5, 0.25, 64).with_channel(1),
        MidiNote::new(0., 0.5, 60),
        MidiNote::new(0.5, 0., 67).with_channel(15),
    ];
    let contents = notes_to_contents(&notes, &MidiSettings::new(1)).unwrap();
    let lines: Vec<_> = contents[1..].iter().map(note_params).collect();
    assert_eq!(
        lines,
        vec![
            vec!["0", "90", "3c", "40"],
            // everything at tick 2 keeps its input order
            vec!["2", "91", "40", "40"],
            vec!["0", "80", "3c", "00"],
            vec!["0", "9f", "43", "40"],
            vec!["0", "8f", "43", "00"],
            vec!["1", "81", "40", "00"],
        ]
    );
}

#[test]
fn overflow_boundary() {
    let settings = MidiSettings::new(1);
    let max = MAX_DELTA as f64 / 4.;

    let contents = notes_to_contents(&[MidiNote::new(0., max, 60)], &settings).unwrap();
    assert_eq!(contents[2].token(), "E");
    assert_eq!(contents[2].param(0), Some(&ParamValue::Int(MAX_DELTA as i64)));

    let over = (MAX_DELTA + 1) as f64 / 4.;
    let contents = notes_to_contents(&[MidiNote::new(0., over, 60)], &settings).unwrap();
    assert_eq!(contents[2].token(), "X");
    assert_eq!(contents[2].param(0), Some(&ParamValue::Int(1)));
    assert_eq!(contents[2].param(1), Some(&ParamValue::Int(MAX_DELTA as i64)));
    assert_eq!(contents[2].param(2), Some(&ParamValue::from("80")));
}

#[test]
fn overflow_is_a_single_split() {
    let event = NoteEvent {
        delta_ticks: 3 * MAX_DELTA,
        status: NoteStatus::On,
        channel: 0,
        note: 0,
        velocity: 0,
    };
    assert_eq!(event.delta_fields(), vec![2 * MAX_DELTA, MAX_DELTA]);
}

#[test]
fn invalid_notes_fail() {
    let settings = MidiSettings::default();
    assert_eq!(
        notes_to_events(&[MidiNote::new(0., 1., 60).with_channel(16)], &settings),
        Err(MidiError::Channel(16))
    );
    assert_eq!(
        notes_to_events(&[MidiNote::new(0., 1., 60)], &MidiSettings::new(0)),
        Err(MidiError::ZeroResolution)
    );
}

#[test]
fn read_events_back() {
    let events = notes_to_events(&[MidiNote::new(0.25, 1., 61).with_channel(2)], &MidiSettings::default()).unwrap();
    for event in &events {
        assert_eq!(MidiEvent::from_node(&event.into_node()).unwrap(), Some(*event));
    }
    let cc = Node::new("E", params![0, "b0", "7b", "00"]);
    assert_eq!(MidiEvent::from_node(&cc).unwrap(), None);
    let sysex = Node::block("X", params![0, 0], vec![Node::new("8PB+AA==", params![])]);
    assert_eq!(MidiEvent::from_node(&sysex).unwrap(), None);
}
