#![doc = r#"
MIDI data inside `SOURCE MIDI` blocks

REAPER stores MIDI as one line per event, timed by the number of ticks since
the previous event:

```text
<SOURCE MIDI
  HASDATA 1 960 QN
  E 0 90 3c 64
  E 1920 80 3c 00
>
```

The fields after the delta are the status byte (high nibble: `9` note on,
`8` note off; low nibble: channel) and two data bytes, all as two hex digits.
[`notes_to_contents`] turns absolute-time [`MidiNote`]s into such lines.
"#]

mod event;
pub use event::*;

mod source;

use crate::MidiError;

/// Velocity used by [`MidiNote::new`]
pub const DEFAULT_VELOCITY: u8 = 64;

/// Largest delta an `E` event can carry
pub const MAX_DELTA: u64 = u32::MAX as u64;

#[doc = r#"
A note placed in absolute time, measured in whole notes.

# Example
```rust
# use rppx::prelude::*;
// middle C, one eighth note long, starting on the second beat
let note = MidiNote::new(0.25, 0.125, 60).with_velocity(100).with_channel(9);
assert_eq!(note.channel, 9);
```
"#]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MidiNote {
    /// 0-15
    pub channel: u8,
    /// Start time in whole notes
    pub start: f64,
    /// Length in whole notes
    pub length: f64,
    /// 0-127
    pub note: u8,
    /// 0-127
    pub velocity: u8,
}

impl MidiNote {
    /// A note on channel 0 with velocity [`DEFAULT_VELOCITY`]
    pub const fn new(start: f64, length: f64, note: u8) -> Self {
        Self {
            channel: 0,
            start,
            length,
            note,
            velocity: DEFAULT_VELOCITY,
        }
    }

    /// Set the channel
    pub const fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    /// Set the velocity
    pub const fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity;
        self
    }

    /// Check that every field can be encoded
    pub fn validate(&self) -> Result<(), MidiError> {
        if self.channel > 15 {
            return Err(MidiError::Channel(self.channel));
        }
        if self.note > 127 {
            return Err(MidiError::Note(self.note));
        }
        if self.velocity > 127 {
            return Err(MidiError::Velocity(self.velocity));
        }
        for time in [self.start, self.length] {
            if !time.is_finite() || time < 0. {
                return Err(MidiError::Time(time));
            }
        }
        Ok(())
    }
}

/// Settings for generating MIDI events
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MidiSettings {
    /// Tick resolution, written to the `HASDATA` line
    pub ticks_per_quarter_note: u32,
}

impl Default for MidiSettings {
    fn default() -> Self {
        Self {
            ticks_per_quarter_note: 960,
        }
    }
}

impl MidiSettings {
    /// Settings with the given tick resolution
    pub const fn new(ticks_per_quarter_note: u32) -> Self {
        Self {
            ticks_per_quarter_note,
        }
    }

    /// Ticks in a whole note
    pub const fn ticks_per_whole_note(&self) -> u64 {
        self.ticks_per_quarter_note as u64 * 4
    }
}

#[test]
fn validate_ranges() {
    assert_eq!(MidiNote::new(0., 1., 128).validate(), Err(MidiError::Note(128)));
    assert_eq!(
        MidiNote::new(0., 1., 60).with_channel(16).validate(),
        Err(MidiError::Channel(16))
    );
    assert_eq!(
        MidiNote::new(0., 1., 60).with_velocity(200).validate(),
        Err(MidiError::Velocity(200))
    );
    assert_eq!(MidiNote::new(-1., 1., 60).validate(), Err(MidiError::Time(-1.)));
    assert!(MidiNote::new(0., f64::INFINITY, 60).validate().is_err());
    assert!(MidiNote::new(0., 0., 127).with_channel(15).validate().is_ok());
}
