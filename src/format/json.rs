//! JSON-line output: one object per message, tagged with the class
//! name. The raw (development) mode prints the class name and a TAB
//! before the object so dumps stay greppable.

use serde_json::{Map, Value};

use crate::format::Formatter;
use crate::message::Message;

pub struct JsonLines {
    /// Development mode: class-name prefix instead of an `mdesc` field.
    dev: bool,
}

impl JsonLines {
    pub fn new(dev: bool) -> JsonLines {
        JsonLines { dev }
    }

    fn object(msg: &Message) -> Map<String, Value> {
        let mut map = Map::new();
        for (key, quantity) in msg.measurements() {
            // Non-finite floats come out as null, which is what "no
            // reading" should look like to consumers.
            let value = serde_json::to_value(&quantity).unwrap_or(Value::Null);
            map.insert(key.to_string(), value);
        }
        map
    }
}

impl Formatter for JsonLines {
    fn format(&mut self, msg: &Message) -> Option<String> {
        let mut map = JsonLines::object(msg);
        if map.is_empty() {
            return None;
        }
        if self.dev {
            return Some(format!(
                "{}\t{}",
                msg.class_name(),
                Value::Object(map)
            ));
        }
        map.insert(
            "mdesc".to_string(),
            Value::String(msg.class_name().to_string()),
        );
        Some(Value::Object(map).to_string())
    }
}
