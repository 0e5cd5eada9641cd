use pretty_assertions::assert_eq;
use rppx::{params, prelude::*};

const LEAD_SYNTH: &str = include_str!("../test-asset/lead_synth.rpp");

#[test]
fn track_dumps_byte_identical() {
    let track = parse(LEAD_SYNTH).unwrap();
    assert_eq!(track.dump(0), LEAD_SYNTH);
}

#[test]
fn track_structure() {
    let track = parse(LEAD_SYNTH).unwrap();

    assert_eq!(track.find("NAME").unwrap().params(), &params!["Lead Synth"][..]);
    assert_eq!(track.find("VOLPAN").unwrap().param(0), Some(&ParamValue::Decimal(0.5)));
    assert_eq!(
        track.find("NOTES").unwrap(),
        &Node::notes("first line\n  second line")
    );

    let chain = track.find("FXCHAIN").unwrap();
    let tokens: Vec<_> = chain.contents().iter().map(Node::token).collect();
    assert_eq!(tokens, vec!["SHOW", "LASTSEL", "DOCKED", "VST"]);

    let item = track.find("ITEM").unwrap();
    assert_eq!(item.find("NAME").unwrap().params(), &params!["say \"hi\" it's me"][..]);
    assert!(item.find("SOURCE").unwrap().is_midi_source());
}

#[test]
fn reparse_is_stable() {
    let track = parse(LEAD_SYNTH).unwrap();
    let again = parse(&track.dump(0)).unwrap();
    assert_eq!(again, track);
    assert_eq!(again.dump(3), track.dump(3));
}

#[test]
fn indentation_is_not_kept() {
    let track = parse(LEAD_SYNTH).unwrap();
    let flat: String = LEAD_SYNTH
        .lines()
        .map(|line| format!("{}\n", line.trim_start()))
        .collect();
    assert_eq!(parse(&flat).unwrap(), track);
}

#[test]
fn pathological_strings() {
    let strings = [
        "",
        " ",
        "10",
        "-0.5",
        "plain",
        "with space",
        "\"",
        "'\"",
        "'\"`",
        "'''```\"\"\"",
        "two\nlines",
        "\n",
        "trailing\n",
        "`tick` 'single' \"double\"\nand a second line",
        "äöü ✓",
    ];
    let mut root = Node::block("ROOT", params![], vec![]);
    for s in strings {
        root.add(Node::block("S", params![s, 1, s], vec![]));
    }

    let dumped = root.dump(0);
    let parsed = parse(&dumped).unwrap();
    assert_eq!(parsed, root, "{dumped}");
}

#[test]
fn numbers_round_trip() {
    let node = Node::new(
        "NUMS",
        params![0, -10, 0.5, 101.555, -10.1234, 0.125, 1.0e-7, 123456789.125, i64::MAX, i64::MIN],
    );
    assert_eq!(parse(&node.dump(0)).unwrap(), node);
}

#[test]
fn from_str() {
    let node: Node = "<TEST 1\n>".parse().unwrap();
    assert_eq!(node, Node::block("TEST", params![1], vec![]));
    assert!("<TEST 1".parse::<Node>().is_err());
}
