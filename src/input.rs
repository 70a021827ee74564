use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControllerPort {
    Driver,
    Operator,
}

/// Raw gamepad state as reported by the driver station.
pub trait InputSource {
    fn raw_axis(&self, port: ControllerPort, axis: usize) -> f64;
    /// `button` is the 1-based joystick button number.
    fn raw_button(&self, port: ControllerPort, button: usize) -> bool;
    /// D-pad angle in degrees, `None` when released.
    fn pov(&self, port: ControllerPort) -> Option<u16>;
}

pub const LEFT_STICK_X: usize = 0;
pub const LEFT_STICK_Y: usize = 1;
pub const LEFT_TRIGGER: usize = 2;
pub const RIGHT_TRIGGER: usize = 3;
pub const RIGHT_STICK_X: usize = 4;
pub const RIGHT_STICK_Y: usize = 5;

/// Xbox pad buttons, including the triggers and D-pad directions which are
/// read as buttons.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum XboxButton {
    A,
    B,
    X,
    Y,
    LeftBumper,
    RightBumper,
    Select,
    Start,
    LeftStick,
    RightStick,
    LeftTrigger,
    RightTrigger,
    DpadUp,
    DpadRight,
    DpadDown,
    DpadLeft,
}

enum ButtonSource {
    Raw(usize),
    Axis(usize),
    Pov(u16),
}

impl XboxButton {
    fn source(self) -> ButtonSource {
        match self {
            XboxButton::A => ButtonSource::Raw(1),
            XboxButton::B => ButtonSource::Raw(2),
            XboxButton::X => ButtonSource::Raw(3),
            XboxButton::Y => ButtonSource::Raw(4),
            XboxButton::LeftBumper => ButtonSource::Raw(5),
            XboxButton::RightBumper => ButtonSource::Raw(6),
            XboxButton::Select => ButtonSource::Raw(7),
            XboxButton::Start => ButtonSource::Raw(8),
            XboxButton::LeftStick => ButtonSource::Raw(9),
            XboxButton::RightStick => ButtonSource::Raw(10),
            XboxButton::LeftTrigger => ButtonSource::Axis(LEFT_TRIGGER),
            XboxButton::RightTrigger => ButtonSource::Axis(RIGHT_TRIGGER),
            XboxButton::DpadUp => ButtonSource::Pov(0),
            XboxButton::DpadRight => ButtonSource::Pov(90),
            XboxButton::DpadDown => ButtonSource::Pov(180),
            XboxButton::DpadLeft => ButtonSource::Pov(270),
        }
    }

    /// 1-based raw button number, for buttons that have one.
    pub fn raw_index(self) -> Option<usize> {
        match self.source() {
            ButtonSource::Raw(index) => Some(index),
            _ => None,
        }
    }

    pub fn trigger_axis(self) -> Option<usize> {
        match self.source() {
            ButtonSource::Axis(axis) => Some(axis),
            _ => None,
        }
    }

    pub fn pov_angle(self) -> Option<u16> {
        match self.source() {
            ButtonSource::Pov(angle) => Some(angle),
            _ => None,
        }
    }
}

/// Typed view of one gamepad.
pub struct XboxController<'a> {
    source: &'a dyn InputSource,
    port: ControllerPort,
    trigger_threshold: f64,
}

impl<'a> XboxController<'a> {
    pub fn new(source: &'a dyn InputSource, port: ControllerPort, trigger_threshold: f64) -> Self {
        Self { source, port, trigger_threshold }
    }

    pub fn left_stick_x(&self) -> f64 {
        self.source.raw_axis(self.port, LEFT_STICK_X)
    }

    pub fn left_stick_y(&self) -> f64 {
        self.source.raw_axis(self.port, LEFT_STICK_Y)
    }

    pub fn right_stick_x(&self) -> f64 {
        self.source.raw_axis(self.port, RIGHT_STICK_X)
    }

    pub fn right_stick_y(&self) -> f64 {
        self.source.raw_axis(self.port, RIGHT_STICK_Y)
    }

    pub fn left_trigger(&self) -> f64 {
        self.source.raw_axis(self.port, LEFT_TRIGGER)
    }

    pub fn right_trigger(&self) -> f64 {
        self.source.raw_axis(self.port, RIGHT_TRIGGER)
    }

    /// Triggers count as pressed past the threshold.
    pub fn is_pressed(&self, button: XboxButton) -> bool {
        match button.source() {
            ButtonSource::Raw(index) => self.source.raw_button(self.port, index),
            ButtonSource::Axis(axis) => self.source.raw_axis(self.port, axis) > self.trigger_threshold,
            ButtonSource::Pov(angle) => self.source.pov(self.port) == Some(angle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted_input::ScriptedInput;

    #[test]
    fn test_raw_buttons_use_standard_numbering() {
        assert_eq!(XboxButton::A.raw_index(), Some(1));
        assert_eq!(XboxButton::Start.raw_index(), Some(8));
        assert_eq!(XboxButton::DpadUp.raw_index(), None);
    }

    #[test]
    fn test_trigger_reads_as_button_past_threshold() {
        let mut input = ScriptedInput::default();
        input.set_axis(ControllerPort::Operator, LEFT_TRIGGER, 0.7);
        let pad = XboxController::new(&input, ControllerPort::Operator, 0.7);
        assert!(!pad.is_pressed(XboxButton::LeftTrigger));
        input.set_axis(ControllerPort::Operator, LEFT_TRIGGER, 0.71);
        let pad = XboxController::new(&input, ControllerPort::Operator, 0.7);
        assert!(pad.is_pressed(XboxButton::LeftTrigger));
        assert!(!pad.is_pressed(XboxButton::RightTrigger));
    }

    #[test]
    fn test_dpad_matches_exact_angle() {
        let mut input = ScriptedInput::default();
        input.set_pov(ControllerPort::Driver, Some(90));
        let pad = XboxController::new(&input, ControllerPort::Driver, 0.7);
        assert!(pad.is_pressed(XboxButton::DpadRight));
        assert!(!pad.is_pressed(XboxButton::DpadUp));

        input.set_pov(ControllerPort::Driver, Some(45));
        let pad = XboxController::new(&input, ControllerPort::Driver, 0.7);
        assert!(!pad.is_pressed(XboxButton::DpadUp));
        assert!(!pad.is_pressed(XboxButton::DpadRight));
    }

    #[test]
    fn test_ports_are_independent() {
        let mut input = ScriptedInput::default();
        input.set_button(ControllerPort::Driver, XboxButton::A, true);
        assert!(XboxController::new(&input, ControllerPort::Driver, 0.7).is_pressed(XboxButton::A));
        assert!(!XboxController::new(&input, ControllerPort::Operator, 0.7).is_pressed(XboxButton::A));
    }
}
