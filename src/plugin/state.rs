use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use super::{ExternalAttributes, VstChunkHeader};
use crate::VstError;

/// The preset chunk REAPER writes when no preset is selected
pub const NO_PRESET: &str = "AAAQAAAA";

#[doc = r#"
Everything a `VST` block carries besides its parameters.

The block body is a list of base64 chunks: the [`VstChunkHeader`], the
plugin's saved state and the selected preset. Any further chunks are kept
as they are.

# Example
```rust
# use rppx::prelude::*;
let mut vst = Node::plugin();
let state = vst.as_plugin_mut().unwrap();
state.set_state("YWJj").unwrap();
state.initialize_routing(1, 2);

assert_eq!(state.header().state_size(), 3);
assert_eq!(state.header().num_inputs(), 1);
```
"#]
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PluginState {
    header: VstChunkHeader,
    state: String,
    preset: String,
    extra_chunks: Vec<String>,
    attributes: ExternalAttributes,
}

impl Default for PluginState {
    fn default() -> Self {
        Self {
            header: VstChunkHeader::default(),
            state: String::new(),
            preset: NO_PRESET.to_owned(),
            extra_chunks: Vec::new(),
            attributes: ExternalAttributes::default(),
        }
    }
}

impl PluginState {
    /// Build the state from the chunks of a block body.
    ///
    /// Missing chunks get their defaults.
    pub fn from_chunks(chunks: Vec<String>) -> Result<Self, VstError> {
        let mut chunks = chunks.into_iter();
        let mut state = Self::default();
        if let Some(header) = chunks.next() {
            state.header = VstChunkHeader::decode(&header)?;
        }
        if let Some(blob) = chunks.next() {
            state.state = blob;
        }
        if let Some(preset) = chunks.next() {
            state.preset = preset;
        }
        state.extra_chunks = chunks.collect();
        Ok(state)
    }

    /// The body chunks in the order they are written, header re-encoded
    pub fn chunks(&self) -> Vec<String> {
        let mut chunks = Vec::with_capacity(3 + self.extra_chunks.len());
        chunks.push(self.header.encode());
        chunks.push(self.state.clone());
        chunks.push(self.preset.clone());
        chunks.extend(self.extra_chunks.iter().cloned());
        chunks
    }

    /// The decoded header
    pub const fn header(&self) -> &VstChunkHeader {
        &self.header
    }

    /// The saved plugin state, base64
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Replace the saved plugin state.
    ///
    /// The header's state size becomes the decoded length of `chunk`.
    ///
    /// # Errors
    /// if `chunk` is not valid base64. Nothing changes in that case.
    pub fn set_state(&mut self, chunk: impl Into<String>) -> Result<(), VstError> {
        let chunk = chunk.into();
        let size = BASE64.decode(&chunk)?.len();
        self.header.set_state_size(size as u32);
        self.state = chunk;
        Ok(())
    }

    /// The selected preset chunk, base64
    pub fn preset(&self) -> &str {
        &self.preset
    }

    /// Replace the selected preset chunk
    pub fn set_preset(&mut self, chunk: impl Into<String>) {
        self.preset = chunk.into();
    }

    /// Chunks after the preset, kept verbatim
    pub fn extra_chunks(&self) -> &[String] {
        &self.extra_chunks
    }

    /// Reset pin counts and routing, see [`VstChunkHeader::initialize_routing`]
    pub fn initialize_routing(&mut self, num_in: u32, num_out: u32) {
        self.header.initialize_routing(num_in, num_out);
    }

    /// Set the VST2 unique id in the header
    pub fn set_vst2_id(&mut self, id: u32) {
        self.header.set_vst2_id(id);
    }

    /// The attribute lines written around the block
    pub const fn attributes(&self) -> &ExternalAttributes {
        &self.attributes
    }

    /// The attribute lines written around the block
    pub fn attributes_mut(&mut self) -> &mut ExternalAttributes {
        &mut self.attributes
    }
}

#[test]
fn fresh_state() {
    let state = PluginState::default();
    assert_eq!(state.header().num_inputs(), 2);
    assert_eq!(state.header().num_outputs(), 2);
    assert_eq!(state.state(), "");
    assert_eq!(state.preset(), NO_PRESET);
    assert!(state.attributes().is_empty());
}

#[test]
fn state_size_is_decoded_length() {
    let mut state = PluginState::default();
    state.set_state("AEZhY3RvcnkgUHJlc2V0czogRmFjdG9yeSBEZWZhdWx0ABAAAAA=").unwrap();
    assert_eq!(state.header().state_size(), 38);

    assert!(state.set_state("@@@@").is_err());
    assert_eq!(state.header().state_size(), 38);
}

#[test]
fn missing_chunks_get_defaults() {
    let header = VstChunkHeader::default().encode();
    let state = PluginState::from_chunks(vec![header.clone()]).unwrap();
    assert_eq!(state.chunks(), vec![header, String::new(), NO_PRESET.to_owned()]);
}

#[test]
fn extra_chunks_are_kept() {
    let chunks: Vec<String> = [VstChunkHeader::default().encode(), "YWJj".into(), NO_PRESET.into(), "ZGVm".into()]
        .into_iter()
        .collect();
    let state = PluginState::from_chunks(chunks.clone()).unwrap();
    assert_eq!(state.extra_chunks(), &["ZGVm".to_owned()]);
    assert_eq!(state.chunks(), chunks);
}
