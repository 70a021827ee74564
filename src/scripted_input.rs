use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dashboard::Dashboard;
use crate::input::{ControllerPort, InputSource, XboxButton};
use crate::robot_hal::{EncoderId, PresenceSensor};
use crate::robot_hal_mock::RobotHalMock;

/// One timed change to the gamepads, the dashboard or the simulated sensors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptAction {
    Button { port: ControllerPort, button: XboxButton, pressed: bool },
    Axis { port: ControllerPort, axis: usize, value: f64 },
    Pov { port: ControllerPort, angle: Option<u16> },
    Presence { sensor: PresenceSensor, present: bool },
    Encoder { encoder: EncoderId, position: f64 },
    Dashboard { key: String, value: Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub tick: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub events: Vec<ScriptEvent>,
}

impl Script {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Gamepad state driven by a script instead of a driver station.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    axes: HashMap<(ControllerPort, usize), f64>,
    buttons: HashSet<(ControllerPort, usize)>,
    povs: HashMap<ControllerPort, u16>,
    events: Vec<ScriptEvent>,
    next_event: usize,
}

impl ScriptedInput {
    pub fn new(script: Script) -> Self {
        let mut events = script.events;
        events.sort_by_key(|e| e.tick);
        Self { events, ..Default::default() }
    }

    pub fn set_axis(&mut self, port: ControllerPort, axis: usize, value: f64) {
        self.axes.insert((port, axis), value);
    }

    pub fn set_pov(&mut self, port: ControllerPort, angle: Option<u16>) {
        match angle {
            Some(angle) => self.povs.insert(port, angle),
            None => self.povs.remove(&port),
        };
    }

    /// Triggers are driven fully in or out; D-pad directions replace any
    /// other direction held on that pad.
    pub fn set_button(&mut self, port: ControllerPort, button: XboxButton, pressed: bool) {
        if let Some(index) = button.raw_index() {
            if pressed {
                self.buttons.insert((port, index));
            } else {
                self.buttons.remove(&(port, index));
            }
        } else if let Some(axis) = button.trigger_axis() {
            self.set_axis(port, axis, if pressed { 1.0 } else { 0.0 });
        } else if let Some(angle) = button.pov_angle() {
            if pressed {
                self.set_pov(port, Some(angle));
            } else if self.povs.get(&port) == Some(&angle) {
                self.set_pov(port, None);
            }
        }
    }

    /// Applies every event scheduled at or before `tick` that has not been
    /// applied yet.
    pub fn advance(&mut self, tick: u64, hal: &RobotHalMock, dashboard: &mut Dashboard) {
        while let Some(event) = self.events.get(self.next_event) {
            if event.tick > tick {
                break;
            }
            let action = event.action.clone();
            self.next_event += 1;
            debug!("tick {tick}: {action:?}");
            self.apply(action, hal, dashboard);
        }
    }

    fn apply(&mut self, action: ScriptAction, hal: &RobotHalMock, dashboard: &mut Dashboard) {
        match action {
            ScriptAction::Button { port, button, pressed } => self.set_button(port, button, pressed),
            ScriptAction::Axis { port, axis, value } => self.set_axis(port, axis, value),
            ScriptAction::Pov { port, angle } => self.set_pov(port, angle),
            ScriptAction::Presence { sensor, present } => hal.set_presence(sensor, present),
            ScriptAction::Encoder { encoder, position } => hal.set_encoder(encoder, position),
            ScriptAction::Dashboard { key, value } => dashboard.put(&key, value),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.next_event >= self.events.len()
    }

    pub fn last_tick(&self) -> Option<u64> {
        self.events.last().map(|e| e.tick)
    }
}

impl InputSource for ScriptedInput {
    fn raw_axis(&self, port: ControllerPort, axis: usize) -> f64 {
        self.axes.get(&(port, axis)).copied().unwrap_or(0.0)
    }

    fn raw_button(&self, port: ControllerPort, button: usize) -> bool {
        self.buttons.contains(&(port, button))
    }

    fn pov(&self, port: ControllerPort) -> Option<u16> {
        self.povs.get(&port).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::XboxController;
    use crate::robot_hal::SensorGateway;

    const SCRIPT: &str = r#"{
        "events": [
            { "tick": 5, "type": "presence", "sensor": "CARGO_LEFT", "present": true },
            { "tick": 0, "type": "button", "port": "OPERATOR", "button": "A", "pressed": true },
            { "tick": 3, "type": "button", "port": "OPERATOR", "button": "A", "pressed": false },
            { "tick": 3, "type": "axis", "port": "DRIVER", "axis": 1, "value": -0.5 },
            { "tick": 4, "type": "pov", "port": "OPERATOR", "angle": 180 },
            { "tick": 5, "type": "dashboard", "key": "Arm Preset", "value": "LOW" }
        ]
    }"#;

    #[test]
    fn test_applies_events_in_tick_order() {
        let script: Script = serde_json::from_str(SCRIPT).unwrap();
        let mut input = ScriptedInput::new(script);
        let hal = RobotHalMock::new();
        let mut dashboard = Dashboard::new();
        assert_eq!(input.last_tick(), Some(5));

        input.advance(0, &hal, &mut dashboard);
        assert!(XboxController::new(&input, ControllerPort::Operator, 0.7).is_pressed(XboxButton::A));

        input.advance(4, &hal, &mut dashboard);
        let operator = XboxController::new(&input, ControllerPort::Operator, 0.7);
        assert!(!operator.is_pressed(XboxButton::A));
        assert!(operator.is_pressed(XboxButton::DpadDown));
        assert_eq!(input.raw_axis(ControllerPort::Driver, 1), -0.5);
        assert_eq!(hal.presence(PresenceSensor::CargoLeft), Ok(false));
        assert!(!input.is_finished());

        input.advance(5, &hal, &mut dashboard);
        assert_eq!(hal.presence(PresenceSensor::CargoLeft), Ok(true));
        assert_eq!(dashboard.get_string("Arm Preset", ""), "LOW");
        assert!(input.is_finished());
    }

    #[test]
    fn test_release_of_other_dpad_direction_keeps_current() {
        let mut input = ScriptedInput::default();
        input.set_button(ControllerPort::Driver, XboxButton::DpadUp, true);
        input.set_button(ControllerPort::Driver, XboxButton::DpadLeft, false);
        assert_eq!(input.pov(ControllerPort::Driver), Some(0));
        input.set_button(ControllerPort::Driver, XboxButton::DpadUp, false);
        assert_eq!(input.pov(ControllerPort::Driver), None);
    }
}
