use thiserror::Error;

#[doc = r#"
Errors raised when a node is put somewhere it does not belong
"#]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// A typed add received a node of the wrong kind.
    ///
    /// The parent is left untouched.
    #[error("Expected a {expected} node, found {found}")]
    TypeMismatch {
        /// The kind the operation requires
        expected: &'static str,
        /// The token of the node that was passed in
        found: String,
    },
}

#[doc = r#"
Errors raised by the MIDI event codec and MIDI source helpers
"#]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MidiError {
    /// Channels are written as a single hex nibble
    #[error("Midi channel has to be between 0 and 15, got {0}")]
    Channel(u8),
    /// Note numbers are 7-bit
    #[error("Midi note has to be between 0 and 127, got {0}")]
    Note(u8),
    /// Velocities are 7-bit
    #[error("Midi velocity has to be between 0 and 127, got {0}")]
    Velocity(u8),
    /// Start or length was negative, NaN or infinite
    #[error("Invalid note time {0} (whole notes)")]
    Time(f64),
    /// The tick resolution must be at least one tick per quarter note
    #[error("Ticks per quarter note must be non-zero")]
    ZeroResolution,
    /// The operation only works on `SOURCE MIDI` nodes
    #[error("Expected a MIDI source, found <{token}> with type {source_type:?}")]
    NotMidiSource {
        /// The token of the node
        token: String,
        /// Its first parameter, if any
        source_type: Option<String>,
    },
    /// An event line is missing fields or carries a value that is not a two digit hex field
    #[error("Malformed {token} event: {reason}")]
    MalformedEvent {
        /// The event token (`E`, `X`, ...)
        token: String,
        /// What was wrong with it
        reason: &'static str,
    },
}

#[doc = r#"
Errors raised by the VST chunk codec
"#]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VstError {
    /// A chunk was not valid base64
    #[error("Invalid base64 chunk: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The header ended before a field could be read
    #[error("Plugin header truncated: needed {needed} bytes, have {len}")]
    Truncated {
        /// How many bytes the next field needed
        needed: usize,
        /// How many bytes the header holds
        len: usize,
    },
}
