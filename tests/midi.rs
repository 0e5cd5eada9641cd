use pretty_assertions::assert_eq;
use rppx::{midi::notes_to_events, params, prelude::*};

#[test]
fn one_note_source() {
    let mut source = Node::source();
    source
        .set_midi_notes(&[MidiNote::new(0., 0.5, 60).with_velocity(100)], &MidiSettings::default())
        .unwrap();

    assert_eq!(
        source.dump(0),
        "<SOURCE MIDI\n  HASDATA 1 960 QN\n  E 0 90 3c 64\n  E 1920 80 3c 00\n>"
    );
}

#[test]
fn chord_and_melody() {
    let notes = [
        MidiNote::new(0., 0.25, 60),
        MidiNote::new(0., 0.25, 64),
        MidiNote::new(0., 0.25, 67),
        MidiNote::new(0.25, 0.125, 72).with_channel(1).with_velocity(127),
        MidiNote::new(0.375, 0.125, 71).with_channel(1).with_velocity(1),
    ];
    let mut source = Node::source();
    source.set_midi_notes(&notes, &MidiSettings::new(96)).unwrap();

    assert_eq!(
        source.dump(1),
        [
            "  <SOURCE MIDI",
            "    HASDATA 1 96 QN",
            "    E 0 90 3c 40",
            "    E 0 90 40 40",
            "    E 0 90 43 40",
            "    E 96 80 3c 00",
            "    E 0 80 40 00",
            "    E 0 80 43 00",
            "    E 0 91 48 7f",
            "    E 48 81 48 00",
            "    E 0 91 47 01",
            "    E 48 81 47 00",
            "  >",
        ]
        .join("\n")
    );
}

#[test]
fn events_survive_a_round_trip() {
    let notes = [
        MidiNote::new(0., 1., 36).with_channel(9),
        MidiNote::new(0.5, 0.25, 38).with_channel(9).with_velocity(90),
        MidiNote::new(1.5, 0.03125, 42).with_channel(9),
    ];
    let settings = MidiSettings::default();
    let mut source = Node::source();
    source.set_midi_notes(&notes, &settings).unwrap();

    let reread = parse(&source.dump(0)).unwrap();
    assert_eq!(reread, source);

    let events: Vec<_> = reread
        .contents()
        .iter()
        .filter_map(|node| MidiEvent::from_node(node).unwrap())
        .collect();
    assert_eq!(events, notes_to_events(&notes, &settings).unwrap());
}

#[test]
fn long_gaps_use_extended_events() {
    let settings = MidiSettings::new(1);
    let mut source = Node::source();
    source
        .set_midi_notes(&[MidiNote::new(0., 1073741824., 60)], &settings)
        .unwrap();

    let off = &source.contents()[2];
    assert_eq!(off.token(), "X");
    assert_eq!(off.params(), &params![1, 4294967295i64, "80", "3c", "00"][..]);

    let reread = parse(&source.dump(0)).unwrap();
    assert_eq!(reread.contents()[2], *off);
}

#[test]
fn make_midi_source_cleans_existing_events() {
    let mut source = Node::block(
        "SOURCE",
        params!["WAVE"],
        vec![Node::new("E", params![0, 90, "3c", 64])],
    );
    source.make_midi_source().unwrap();
    assert_eq!(source.contents()[0].params(), &params![0, "90", "3c", "64"][..]);
}

#[test]
fn invalid_notes_leave_the_source_alone() {
    let mut source = Node::source();
    let err = source
        .set_midi_notes(&[MidiNote::new(0., 1., 60).with_channel(16)], &MidiSettings::default())
        .unwrap_err();
    assert_eq!(err, MidiError::Channel(16));
    assert!(source.is_wave_source());
    assert!(source.contents().is_empty());
}
