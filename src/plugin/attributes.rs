use crate::ParamValue;

#[doc = r#"
A line that belongs to a plugin but is written outside its block.

Inside an FX chain REAPER writes:

```text
BYPASS 0 0 0
<VST ...
>
PRESETNAME "Factory Default"
FLOATPOS 0 0 0 0
FXID {...}
WAK 0 0
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExternalAttribute {
    /// `BYPASS`: bypass, offline and wet flags
    Bypass,
    /// `PRESETNAME`
    PresetName,
    /// `FLOATPOS`: floating window position
    FloatPos,
    /// `FXID`: the effect's GUID
    FxId,
    /// `WAK`: which keys the open plugin window forwards
    WindowKeys,
}

impl ExternalAttribute {
    /// Attributes written after the block, in order
    pub const TRAILING: [ExternalAttribute; 4] = [
        ExternalAttribute::PresetName,
        ExternalAttribute::FloatPos,
        ExternalAttribute::FxId,
        ExternalAttribute::WindowKeys,
    ];

    /// The line's token
    pub const fn token(&self) -> &'static str {
        use ExternalAttribute::*;
        match self {
            Bypass => "BYPASS",
            PresetName => "PRESETNAME",
            FloatPos => "FLOATPOS",
            FxId => "FXID",
            WindowKeys => "WAK",
        }
    }

    /// Identify an attribute line by its token
    pub fn from_token(token: &str) -> Option<Self> {
        use ExternalAttribute::*;
        Some(match token {
            "BYPASS" => Bypass,
            "PRESETNAME" => PresetName,
            "FLOATPOS" => FloatPos,
            "FXID" => FxId,
            "WAK" => WindowKeys,
            _ => return None,
        })
    }
}

/// The attribute lines a plugin owns, stored as their raw parameters
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExternalAttributes {
    bypass: Option<Vec<ParamValue>>,
    preset_name: Option<Vec<ParamValue>>,
    float_pos: Option<Vec<ParamValue>>,
    fx_id: Option<Vec<ParamValue>>,
    window_keys: Option<Vec<ParamValue>>,
}

impl ExternalAttributes {
    fn slot(&self, attribute: ExternalAttribute) -> &Option<Vec<ParamValue>> {
        use ExternalAttribute::*;
        match attribute {
            Bypass => &self.bypass,
            PresetName => &self.preset_name,
            FloatPos => &self.float_pos,
            FxId => &self.fx_id,
            WindowKeys => &self.window_keys,
        }
    }

    fn slot_mut(&mut self, attribute: ExternalAttribute) -> &mut Option<Vec<ParamValue>> {
        use ExternalAttribute::*;
        match attribute {
            Bypass => &mut self.bypass,
            PresetName => &mut self.preset_name,
            FloatPos => &mut self.float_pos,
            FxId => &mut self.fx_id,
            WindowKeys => &mut self.window_keys,
        }
    }

    /// The parameters of an attribute line, if the plugin has one
    pub fn get(&self, attribute: ExternalAttribute) -> Option<&[ParamValue]> {
        self.slot(attribute).as_deref()
    }

    /// True if the plugin has this attribute line
    pub fn contains(&self, attribute: ExternalAttribute) -> bool {
        self.slot(attribute).is_some()
    }

    /// Set an attribute line, returning the previous parameters
    pub fn set(&mut self, attribute: ExternalAttribute, params: Vec<ParamValue>) -> Option<Vec<ParamValue>> {
        self.slot_mut(attribute).replace(params)
    }

    /// Remove an attribute line
    pub fn remove(&mut self, attribute: ExternalAttribute) -> Option<Vec<ParamValue>> {
        self.slot_mut(attribute).take()
    }

    /// True if no attribute line is set
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// The attribute lines that are set, in the order they are written
    pub fn iter(&self) -> impl Iterator<Item = (ExternalAttribute, &[ParamValue])> {
        [ExternalAttribute::Bypass]
            .into_iter()
            .chain(ExternalAttribute::TRAILING)
            .filter_map(|a| self.get(a).map(|params| (a, params)))
    }

    /// Copy every attribute set in `other` over this one
    pub fn merge(&mut self, other: ExternalAttributes) {
        use ExternalAttribute::*;
        let ExternalAttributes {
            bypass,
            preset_name,
            float_pos,
            fx_id,
            window_keys,
        } = other;
        for (attribute, params) in [
            (Bypass, bypass),
            (PresetName, preset_name),
            (FloatPos, float_pos),
            (FxId, fx_id),
            (WindowKeys, window_keys),
        ] {
            if let Some(params) = params {
                self.set(attribute, params);
            }
        }
    }
}

#[test]
fn tokens_round_trip() {
    for attribute in [ExternalAttribute::Bypass].into_iter().chain(ExternalAttribute::TRAILING) {
        assert_eq!(ExternalAttribute::from_token(attribute.token()), Some(attribute));
    }
    assert_eq!(ExternalAttribute::from_token("SHOW"), None);
}

#[test]
fn set_and_merge() {
    let mut attrs = ExternalAttributes::default();
    assert!(attrs.is_empty());
    attrs.set(ExternalAttribute::FxId, crate::params!["{GUID}"]);

    let mut other = ExternalAttributes::default();
    other.set(ExternalAttribute::Bypass, crate::params![0, 0, 0]);
    attrs.merge(other);

    let order: Vec<_> = attrs.iter().map(|(a, _)| a).collect();
    assert_eq!(order, vec![ExternalAttribute::Bypass, ExternalAttribute::FxId]);
    assert_eq!(attrs.remove(ExternalAttribute::FxId), Some(crate::params!["{GUID}"]));
    assert!(!attrs.contains(ExternalAttribute::FxId));
}
