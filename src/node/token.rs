//! Tokens with special meaning to the reader and writer

/// A VST plugin block
pub const VST: &str = "VST";
/// A block whose text is stored as `|` lines
pub const NOTES: &str = "NOTES";
/// The synthetic block carrying a string no delimiter can hold
pub const NAME: &str = "NAME";
/// A track or take media source
pub const SOURCE: &str = "SOURCE";
/// The per-track effect chain
pub const FXCHAIN: &str = "FXCHAIN";
/// The record-input effect chain
pub const FXCHAIN_REC: &str = "FXCHAIN_REC";
/// The per-take effect chain
pub const TAKEFX: &str = "TAKEFX";
/// The MIDI source header event
pub const HASDATA: &str = "HASDATA";

/// Tokens of blocks holding plugins and their attribute lines
pub const CHAINS: [&str; 3] = [FXCHAIN, FXCHAIN_REC, TAKEFX];

/// Event tokens inside a `SOURCE MIDI` block.
///
/// Lowercase events are unselected, `m` marks events with attached data.
pub const MIDI_EVENTS: [&str; 8] = ["E", "e", "X", "x", "Em", "em", "Xm", "xm"];

/// True for event tokens with two delta fields
pub fn is_extended_event(token: &str) -> bool {
    token.starts_with(['X', 'x'])
}
