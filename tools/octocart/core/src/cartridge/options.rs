//! Emulator settings carried alongside a program.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Every option a cartridge persists, in the order they are written.
pub const OPTION_FLAGS: [&str; 18] = [
    "tickrate",
    "fillColor",
    "fillColor2",
    "blendColor",
    "backgroundColor",
    "buzzColor",
    "quietColor",
    "shiftQuirks",
    "loadStoreQuirks",
    "vfOrderQuirks",
    "clipQuirks",
    "vBlankQuirks",
    "jumpQuirks",
    "screenRotation",
    "maxSize",
    "touchInputMode",
    "logicQuirks",
    "fontStyle",
];

/// Older cartridges flag XO-CHIP memory with this instead of `maxSize`.
const LEGACY_XO: &str = "enableXO";
const XO_MAX_SIZE: u32 = 65024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    pub tickrate: u32,
    pub fill_color: String,
    pub fill_color2: String,
    pub blend_color: String,
    pub background_color: String,
    pub buzz_color: String,
    pub quiet_color: String,
    pub shift_quirks: bool,
    pub load_store_quirks: bool,
    pub vf_order_quirks: bool,
    pub clip_quirks: bool,
    pub v_blank_quirks: bool,
    pub jump_quirks: bool,
    pub screen_rotation: u32,
    pub max_size: u32,
    pub touch_input_mode: String,
    pub logic_quirks: bool,
    pub font_style: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tickrate: 20,
            fill_color: "#FFCC00".into(),
            fill_color2: "#FF6600".into(),
            blend_color: "#662200".into(),
            background_color: "#996600".into(),
            buzz_color: "#FFAA00".into(),
            quiet_color: "#000000".into(),
            shift_quirks: false,
            load_store_quirks: false,
            vf_order_quirks: false,
            clip_quirks: false,
            v_blank_quirks: false,
            jump_quirks: false,
            screen_rotation: 0,
            max_size: 3584,
            touch_input_mode: "none".into(),
            logic_quirks: false,
            font_style: "octo".into(),
        }
    }
}

impl Options {
    /// Flat object holding exactly the [`OPTION_FLAGS`] keys.
    pub fn pack(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // a struct of strings, numbers and bools always serializes to an object
            other => unreachable!("options serialized to {other:?}"),
        }
    }

    /// Overwrites the options named in `map`. Keys outside [`OPTION_FLAGS`]
    /// are ignored; absent ones keep their current value.
    pub fn unpack(&mut self, map: &Map<String, Value>) -> Result<(), serde_json::Error> {
        let mut merged = self.pack();
        for key in OPTION_FLAGS {
            if let Some(value) = map.get(key) {
                merged.insert(key.to_string(), value.clone());
            }
        }
        *self = serde_json::from_value(Value::Object(merged))?;

        if map.get(LEGACY_XO).is_some_and(truthy) {
            self.max_size = XO_MAX_SIZE;
        }
        Ok(())
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
