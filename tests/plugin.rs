use pretty_assertions::assert_eq;
use rppx::{params, prelude::*};

const STEREO_DELAY: &str = include_str!("../test-asset/stereo_delay.rpp");

#[test]
fn stereo_delay_parses() {
    let vst = parse(STEREO_DELAY).unwrap();
    assert_eq!(
        vst.params(),
        &params![
            "VST3: #TStereo Delay (Tracktion)",
            "#TStereo Delay.vst3",
            0,
            "",
            "1997878177{5653545344656C237473746572656F20}",
            ""
        ][..]
    );

    let state = vst.as_plugin().unwrap();
    let header = state.header();
    assert_eq!(header.vst2_id(), 1997878177);
    assert_eq!(header.magic(), rppx::plugin::DEFAULT_MAGIC);
    assert_eq!(header.input_routing(), &[1, 2]);
    assert_eq!(header.output_routing(), &[1, 2]);
    assert_eq!(header.state_size(), 1298);
    assert!(state.state().starts_with("AgUAAAEAAABWc3RX"));
    assert!(state.state().ends_with("AAAAAAAAAAA="));
    assert_eq!(state.preset(), "AEZhY3RvcnkgUHJlc2V0czogRmFjdG9yeSBEZWZhdWx0ABAAAAA=");
    assert!(state.extra_chunks().is_empty());
}

#[test]
fn stereo_delay_dumps_byte_identical() {
    let vst = parse(STEREO_DELAY).unwrap();
    assert_eq!(vst.dump(0), STEREO_DELAY);
}

#[test]
fn state_size_follows_state() {
    let mut vst = parse(STEREO_DELAY).unwrap();
    let state = vst.as_plugin_mut().unwrap();
    state.set_state("YWJjZA==").unwrap();
    state.initialize_routing(1, 4);

    let reread = parse(&vst.dump(0)).unwrap();
    let header = reread.as_plugin().unwrap().header();
    assert_eq!(header.state_size(), 4);
    assert_eq!(header.input_routing(), &[1]);
    assert_eq!(header.output_routing(), &[1, 2, 4, 8]);
    assert_eq!(header.vst2_id(), 1997878177);
}

#[test]
fn attributes_are_written_around_the_block() {
    // attribute lines in an unusual order, with an unrelated line between them
    let chain = parse(
        "<FXCHAIN
  SHOW 0
  BYPASS 1 0 0
  <VST \"VST: ReaEQ (Cockos)\" reaeq.dll 0 \"\" 1919247729<56535472656571726561657100000000> \"\"
    AAAAAO9e7f4CAAAAAQAAAAAAAAACAAAAAAAAAAIAAAABAAAAAAAAAAIAAAAAAAAAAAAAAAEAAAD//xAA
    YWJj
    AAAQAAAA
  >
  FXID {0F1A}
  COMMENT x
  PRESETNAME Bright
>",
    )
    .unwrap();

    assert_eq!(
        chain.dump(0),
        "<FXCHAIN
  SHOW 0
  BYPASS 1 0 0
  <VST \"VST: ReaEQ (Cockos)\" reaeq.dll 0 \"\" 1919247729<56535472656571726561657100000000> \"\"
    AAAAAO9e7f4CAAAAAQAAAAAAAAACAAAAAAAAAAIAAAABAAAAAAAAAAIAAAAAAAAAAAAAAAEAAAD//xAA
    YWJj
    AAAQAAAA
  >
  PRESETNAME Bright
  FXID {0F1A}
  COMMENT x
>"
    );
}

#[test]
fn build_a_chain() {
    let mut chain = Node::fx_chain();
    let vst = chain.add_plugin(Node::plugin()).unwrap();
    let state = vst.as_plugin_mut().unwrap();
    state.set_vst2_id(1919251321);
    state
        .attributes_mut()
        .set(ExternalAttribute::WindowKeys, params![0, 0]);
    state
        .attributes_mut()
        .set(ExternalAttribute::PresetName, params!["Init"]);

    let text = chain.dump(0);
    assert_eq!(
        text.lines().skip(4).collect::<Vec<_>>(),
        vec![
            "  <VST \"\" \"\" \"\" \"\" \"\"",
            "    eXNlcu9e7f4CAAAAAQAAAAAAAAACAAAAAAAAAAIAAAABAAAAAAAAAAIAAAAAAAAAAAAAAAEAAAD//xAA",
            "    ",
            "    AAAQAAAA",
            "  >",
            "  PRESETNAME Init",
            "  WAK 0 0",
            ">",
        ]
    );

    let reread = parse(&text).unwrap();
    assert_eq!(reread, chain);
}

#[test]
fn add_plugin_needs_a_plugin() {
    let mut chain = Node::fx_chain();
    assert!(chain.add_plugin(Node::new("VOLUME", params![1])).is_err());
    assert_eq!(chain.contents().len(), 3);
}

#[test]
fn envelopes_stay_between_fx_id_and_window_keys() {
    let text = "<FXCHAIN
  SHOW 0
  <VST \"VST: ReaEQ (Cockos)\" reaeq.dll 0 \"\" 1919247729<56535472656571726561657100000000> \"\"
    AAAAAO9e7f4CAAAAAQAAAAAAAAACAAAAAAAAAAIAAAABAAAAAAAAAAIAAAAAAAAAAAAAAAEAAAD//xAA
    YWJj
    AAAQAAAA
  >
  FXID {A}
  <PARMENV 1 0 1 0.5
    EGUARD 0 0 0 0
    ACT 1 -1
    PT 0 0.5 0
  >
  WAK 0 0
>";
    let chain = parse(text).unwrap();
    assert_eq!(chain.contents().len(), 2);
    let vst = &chain.contents()[1];
    assert_eq!(vst.contents()[0].token(), "PARMENV");
    assert_eq!(
        vst.as_plugin().unwrap().attributes().get(ExternalAttribute::WindowKeys),
        Some(&params![0, 0][..])
    );
    assert_eq!(chain.dump(0), text);
}

#[test]
fn state_filling_whole_lines_keeps_its_preset() {
    let preset = "AEZhY3RvcnkgUHJlc2V0czogRmFjdG9yeSBEZWZhdWx0ABAAAAA=";
    let mut vst = parse(STEREO_DELAY).unwrap();
    let state = vst.as_plugin_mut().unwrap();
    state.set_state("A".repeat(256)).unwrap();
    state.set_preset(preset);

    let reread = parse(&vst.dump(0)).unwrap();
    let state = reread.as_plugin().unwrap();
    assert_eq!(state.header().state_size(), 192);
    assert_eq!(state.state(), "A".repeat(256));
    assert_eq!(state.preset(), preset);
    assert_eq!(reread, vst);
}
