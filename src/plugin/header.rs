#![doc = r#"
The binary header of a `VST` block

The first base64 chunk of every `VST` block decodes to a little-endian
header REAPER uses to restore the plugin:

```text
offset  size         field
0       4            VST2 unique id
4       4            magic (0xfeed5eef)
8       4            number of inputs (n)
12      8 * n        input pin routing, one bitmask per pin
...     4            number of outputs (m)
...     8 * m        output pin routing, one bitmask per pin
...     4            byte length of the state chunk
...     rest         unknown, kept verbatim
```
"#]

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use crate::VstError;

/// The magic written after the plugin id
pub const DEFAULT_MAGIC: u32 = 0xfeed_5eef;

const DEFAULT_TAIL: [u8; 8] = [0x01, 0x00, 0x00, 0x00, 0xff, 0xff, 0x10, 0x00];

#[doc = r#"
The decoded first chunk of a `VST` block.

# Example
```rust
# use rppx::prelude::*;
let header = VstChunkHeader::decode(
    "oTMVd+9e7f4CAAAAAQAAAAAAAAACAAAAAAAAAAIAAAABAAAAAAAAAAIAAAAAAAAAEgUAAAEAAAD//xAA",
)
.unwrap();

assert_eq!(header.vst2_id(), 1997878177);
assert_eq!(header.num_inputs(), 2);
assert_eq!(header.num_outputs(), 2);
assert_eq!(header.state_size(), 1298);
```
"#]
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VstChunkHeader {
    vst2_id: u32,
    magic: u32,
    input_routing: Vec<u64>,
    output_routing: Vec<u64>,
    state_size: u32,
    tail: Vec<u8>,
}

impl Default for VstChunkHeader {
    fn default() -> Self {
        let mut header = Self {
            vst2_id: 0,
            magic: DEFAULT_MAGIC,
            input_routing: Vec::new(),
            output_routing: Vec::new(),
            state_size: 0,
            tail: DEFAULT_TAIL.to_vec(),
        };
        header.initialize_routing(2, 2);
        header
    }
}

impl VstChunkHeader {
    /// Decode a header from its base64 chunk
    pub fn decode(chunk: &str) -> Result<Self, VstError> {
        let bytes = BASE64.decode(chunk)?;
        Self::from_bytes(&bytes)
    }

    /// Read a header from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VstError> {
        let mut reader = ByteReader { bytes, position: 0 };

        let vst2_id = reader.read_u32()?;
        let magic = reader.read_u32()?;
        let num_in = reader.read_u32()?;
        let input_routing = reader.read_routing(num_in)?;
        let num_out = reader.read_u32()?;
        let output_routing = reader.read_routing(num_out)?;
        let state_size = reader.read_u32()?;

        Ok(Self {
            vst2_id,
            magic,
            input_routing,
            output_routing,
            state_size,
            tail: reader.rest().to_vec(),
        })
    }

    /// The header as raw bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let routing_len = 8 * (self.input_routing.len() + self.output_routing.len());
        let mut out = Vec::with_capacity(20 + routing_len + self.tail.len());
        out.extend_from_slice(&self.vst2_id.to_le_bytes());
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&self.num_inputs().to_le_bytes());
        for mask in &self.input_routing {
            out.extend_from_slice(&mask.to_le_bytes());
        }
        out.extend_from_slice(&self.num_outputs().to_le_bytes());
        for mask in &self.output_routing {
            out.extend_from_slice(&mask.to_le_bytes());
        }
        out.extend_from_slice(&self.state_size.to_le_bytes());
        out.extend_from_slice(&self.tail);
        out
    }

    /// The header as a base64 chunk
    pub fn encode(&self) -> String {
        BASE64.encode(self.to_bytes())
    }

    /// The VST2 unique id of the plugin
    pub const fn vst2_id(&self) -> u32 {
        self.vst2_id
    }

    /// Set the VST2 unique id of the plugin
    pub fn set_vst2_id(&mut self, id: u32) {
        self.vst2_id = id;
    }

    /// The magic following the id
    pub const fn magic(&self) -> u32 {
        self.magic
    }

    /// Number of input pins
    pub fn num_inputs(&self) -> u32 {
        self.input_routing.len() as u32
    }

    /// Number of output pins
    pub fn num_outputs(&self) -> u32 {
        self.output_routing.len() as u32
    }

    /// Track channels each input pin reads from, one bit per channel
    pub fn input_routing(&self) -> &[u64] {
        &self.input_routing
    }

    /// Track channels each output pin writes to, one bit per channel
    pub fn output_routing(&self) -> &[u64] {
        &self.output_routing
    }

    /// Byte length of the state chunk
    pub const fn state_size(&self) -> u32 {
        self.state_size
    }

    /// Length of the state chunk once base64 encoded, padding included
    pub fn encoded_state_len(&self) -> usize {
        (self.state_size as usize).div_ceil(3) * 4
    }

    pub(crate) fn set_state_size(&mut self, size: u32) {
        self.state_size = size;
    }

    /// The unknown bytes following the state size
    pub fn tail(&self) -> &[u8] {
        &self.tail
    }

    /// Reset the pin counts, routing pin `i` to track channel `i`
    pub fn initialize_routing(&mut self, num_in: u32, num_out: u32) {
        self.input_routing = (0..num_in).map(default_mask).collect();
        self.output_routing = (0..num_out).map(default_mask).collect();
    }
}

fn default_mask(pin: u32) -> u64 {
    1u64.checked_shl(pin).unwrap_or(0)
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    fn read_exact<const N: usize>(&mut self) -> Result<[u8; N], VstError> {
        let end = self.position + N;
        let slice = self.bytes.get(self.position..end).ok_or(VstError::Truncated {
            needed: end,
            len: self.bytes.len(),
        })?;
        self.position = end;
        let mut out = [0; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn read_u32(&mut self) -> Result<u32, VstError> {
        self.read_exact().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Result<u64, VstError> {
        self.read_exact().map(u64::from_le_bytes)
    }

    fn read_routing(&mut self, pins: u32) -> Result<Vec<u64>, VstError> {
        // the whole table has to fit before anything is allocated
        let needed = (pins as usize)
            .checked_mul(8)
            .and_then(|len| len.checked_add(self.position))
            .unwrap_or(usize::MAX);
        if needed > self.bytes.len() {
            return Err(VstError::Truncated {
                needed,
                len: self.bytes.len(),
            });
        }
        (0..pins).map(|_| self.read_u64()).collect()
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.position..]
    }
}

#[cfg(test)]
const STEREO_DELAY: &str =
    "oTMVd+9e7f4CAAAAAQAAAAAAAAACAAAAAAAAAAIAAAABAAAAAAAAAAIAAAAAAAAAEgUAAAEAAAD//xAA";

#[test]
fn decode_real_header() {
    let header = VstChunkHeader::decode(STEREO_DELAY).unwrap();
    assert_eq!(header.vst2_id(), 1_997_878_177);
    assert_eq!(header.magic(), DEFAULT_MAGIC);
    assert_eq!(header.input_routing(), &[1, 2]);
    assert_eq!(header.output_routing(), &[1, 2]);
    assert_eq!(header.state_size(), 1298);
    assert_eq!(header.encoded_state_len(), 1732);
    assert_eq!(header.tail(), &DEFAULT_TAIL);
}

#[test]
fn encode_is_bit_exact() {
    let header = VstChunkHeader::decode(STEREO_DELAY).unwrap();
    assert_eq!(header.encode(), STEREO_DELAY);
}

#[test]
fn default_header() {
    let header = VstChunkHeader::default();
    assert_eq!(
        header.encode(),
        "AAAAAO9e7f4CAAAAAQAAAAAAAAACAAAAAAAAAAIAAAABAAAAAAAAAAIAAAAAAAAAAAAAAAEAAAD//xAA"
    );
}

#[test]
fn routing_and_id() {
    let mut header = VstChunkHeader::default();
    header.set_vst2_id(1_919_251_321);
    header.initialize_routing(1, 4);
    header.set_state_size(3);
    assert_eq!(header.output_routing(), &[1, 2, 4, 8]);
    assert_eq!(
        header.encode(),
        "eXNlcu9e7f4BAAAAAQAAAAAAAAAEAAAAAQAAAAAAAAACAAAAAAAAAAQAAAAAAAAACAAAAAAAAAADAAAAAQAAAP//EAA="
    );
}

#[test]
fn unknown_tail_survives() {
    let mut bytes = VstChunkHeader::default().to_bytes();
    bytes.truncate(bytes.len() - DEFAULT_TAIL.len());
    bytes.extend_from_slice(&[9, 8, 7]);
    let header = VstChunkHeader::from_bytes(&bytes).unwrap();
    assert_eq!(header.tail(), &[9, 8, 7]);
    assert_eq!(header.to_bytes(), bytes);
}

#[test]
fn truncated_headers() {
    assert_eq!(
        VstChunkHeader::from_bytes(&[0; 6]),
        Err(VstError::Truncated { needed: 8, len: 6 })
    );

    let mut bytes = vec![0; 8];
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    assert!(matches!(
        VstChunkHeader::from_bytes(&bytes),
        Err(VstError::Truncated { .. })
    ));
}

#[test]
fn invalid_base64() {
    assert!(matches!(VstChunkHeader::decode("not base64!"), Err(VstError::Base64(_))));
}
