use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OPEN_LOOP_ARM: &str = "Open Loop Arm";
pub const USE_CONTROLLER_MOTION_MAGIC: &str = "Use Controller Motion Magic";
pub const ARM_PRESET: &str = "Arm Preset";

/// Key/value table shared between the robot and the drive team's dashboard.
/// Reads of a missing or mistyped entry fall back to the caller's default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dashboard {
    entries: BTreeMap<String, Value>,
}

impl Dashboard {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.entries.get(key) {
            Some(Value::Bool(value)) => *value,
            Some(other) => {
                warn!("Dashboard entry {key:?} is not a boolean: {other}");
                default
            }
            None => default,
        }
    }

    pub fn get_number(&self, key: &str, default: f64) -> f64 {
        match self.entries.get(key) {
            Some(value) => value.as_f64().unwrap_or_else(|| {
                warn!("Dashboard entry {key:?} is not a number: {value}");
                default
            }),
            None => default,
        }
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.entries.get(key) {
            Some(Value::String(value)) => value.clone(),
            Some(other) => {
                warn!("Dashboard entry {key:?} is not a string: {other}");
                default.to_owned()
            }
            None => default.to_owned(),
        }
    }

    pub fn put(&mut self, key: &str, value: impl Into<Value>) {
        self.entries.insert(key.to_owned(), value.into());
    }

    /// Creates the entry if it is missing and returns its current value, so
    /// the key shows up on the dashboard with its default.
    pub fn create_bool(&mut self, key: &str, default: bool) -> bool {
        let value = self.get_bool(key, default);
        self.put(key, value);
        value
    }

    pub fn create_number(&mut self, key: &str, default: f64) -> f64 {
        let value = self.get_number(key, default);
        self.put(key, value);
        value
    }

    pub fn create_string(&mut self, key: &str, default: &str) -> String {
        let value = self.get_string(key, default);
        self.put(key, value.clone());
        value
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.entries
    }
}
