#![doc = r#"
Plugin (`VST`) blocks

A `VST` block has two parts that need more than the generic tree:

- its body is base64, not child lines. The first chunk is a binary
  [`VstChunkHeader`], see [`PluginState`];
- some of its lines sit next to it in the FX chain instead of inside it,
  see [`ExternalAttributes`] and [`reassociate`].
"#]

mod attributes;
pub use attributes::*;

mod chain;
pub use chain::*;

mod header;
pub use header::*;

mod state;
pub use state::*;

/// Width base64 chunks are wrapped at inside a block body
pub const CHUNK_LINE_WIDTH: usize = 128;
