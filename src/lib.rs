#![warn(missing_docs)]
#![doc = r#"
Read and write REAPER project files (`.RPP`).

An `.RPP` file is a tree of tagged blocks:

```text
<REAPER_PROJECT 0.1 "6.80/linux-x86_64" 1681339217
  RIPPLE 0
  <TRACK
    NAME "Lead Synth"
    <FXCHAIN
      BYPASS 0 0 0
      <VST "VSTi: ReaSynth (Cockos)" reasynth.so 0 "" 1919251321<56535472656173726561737974680000> ""
        ...base64...
      >
      FXID {8D1C5E0A-2E4C-4E39-9B1B-0C9E0E5F6A11}
      WAK 0 0
    >
  >
>
```

`rppx` keeps that tree as plain [`Node`]s and guarantees that
`parse(node.dump(0))` gives back the same tree. A few node kinds get
extra handling:

- `VST` blocks hold a base64 body, decoded into a [`PluginState`]
  whose [`VstChunkHeader`] describes channel routing and saved state.
- `BYPASS`, `PRESETNAME`, `FLOATPOS`, `FXID` and `WAK` lines around a
  plugin inside an FX chain are folded into the plugin's
  [`ExternalAttributes`], and written back around it.
- `NOTES` blocks store their text as `|`-prefixed lines.
- `SOURCE MIDI` blocks hold delta-time `E` events, which can be
  generated from absolute-time [`MidiNote`]s.

# Example
```rust
use rppx::prelude::*;

let track = rppx::parse("<TRACK\n  NAME Bass\n  VOLPAN 1 0 -1 -1 1\n>").unwrap();
assert_eq!(track.token(), "TRACK");
assert_eq!(track.contents()[0].params(), &[ParamValue::from("Bass")]);
assert_eq!(track.dump(0), "<TRACK\n  NAME Bass\n  VOLPAN 1 0 -1 -1 1\n>");
```
"#]

mod error;
pub use error::*;

pub mod midi;
pub mod node;
pub mod param;
pub mod plugin;
pub mod reader;
pub mod writer;

pub use midi::{MidiNote, MidiSettings};
pub use node::{Node, NodeKind};
pub use param::ParamValue;
pub use plugin::{ExternalAttribute, ExternalAttributes, PluginState, VstChunkHeader};
pub use reader::{ReadResult, ReaderError, ReaderErrorKind, parse};

/// Commonly used types and functions
pub mod prelude {
    pub use crate::error::*;
    pub use crate::midi::{MidiEvent, MidiNote, MidiSettings, NoteEvent};
    pub use crate::node::{Node, NodeKind};
    pub use crate::param::{Delimiter, ParamValue, QuoteStyle};
    pub use crate::plugin::{ExternalAttribute, ExternalAttributes, PluginState, VstChunkHeader};
    pub use crate::reader::{ReadResult, ReaderError, ReaderErrorKind, parse};
}
