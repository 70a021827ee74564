use log::warn;
use serde::Serialize;

use crate::dashboard::{self, Dashboard};
use crate::height_presets::TargetHeight;
use crate::input::{ControllerPort, InputSource, XboxButton, XboxController};
use crate::robot_config::{ControlsConfig, DriveConfig};

/// What the drive team is asking for this tick, already deadbanded and
/// inverted. Commands read this instead of the gamepads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorIntents {
    pub drive_speed: f64,
    pub turn_rate: f64,
    pub quick_turn: bool,
    pub manual_arm_speed: f64,
    pub open_loop_arm: bool,
    pub use_controller_mm: bool,
    pub dashboard_height: Option<TargetHeight>,
}

impl Default for OperatorIntents {
    fn default() -> Self {
        Self {
            drive_speed: 0.0,
            turn_rate: 0.0,
            quick_turn: false,
            manual_arm_speed: 0.0,
            open_loop_arm: true,
            use_controller_mm: true,
            dashboard_height: None,
        }
    }
}

pub fn handle_deadband(value: f64, deadband: f64) -> f64 {
    if value.abs() > deadband.abs() {
        value
    } else {
        0.0
    }
}

pub struct InputTranslator {
    drive: DriveConfig,
    controls: ControlsConfig,
    last_bad_preset: Option<String>,
}

impl InputTranslator {
    /// Registers the dashboard toggles this translator reads.
    pub fn new(drive: DriveConfig, controls: ControlsConfig, dashboard: &mut Dashboard) -> Self {
        let defaults = OperatorIntents::default();
        dashboard.create_bool(dashboard::OPEN_LOOP_ARM, defaults.open_loop_arm);
        dashboard.create_bool(dashboard::USE_CONTROLLER_MOTION_MAGIC, defaults.use_controller_mm);
        dashboard.create_string(dashboard::ARM_PRESET, TargetHeight::Ground.name());
        Self { drive, controls, last_bad_preset: None }
    }

    pub fn translate(&mut self, input: &dyn InputSource, dashboard: &Dashboard) -> OperatorIntents {
        let driver = XboxController::new(input, ControllerPort::Driver, self.controls.trigger_threshold);
        let operator = XboxController::new(input, ControllerPort::Operator, self.controls.trigger_threshold);
        let defaults = OperatorIntents::default();

        OperatorIntents {
            drive_speed: handle_deadband(self.invert(driver.left_stick_y()), self.drive.deadband),
            turn_rate: driver.right_stick_x(),
            quick_turn: driver.is_pressed(XboxButton::LeftBumper),
            manual_arm_speed: self.manual_arm_speed(operator.left_stick_y()),
            open_loop_arm: dashboard.get_bool(dashboard::OPEN_LOOP_ARM, defaults.open_loop_arm),
            use_controller_mm: dashboard.get_bool(dashboard::USE_CONTROLLER_MOTION_MAGIC, defaults.use_controller_mm),
            dashboard_height: self.dashboard_height(dashboard),
        }
    }

    fn invert(&self, value: f64) -> f64 {
        if self.controls.invert_move_speed {
            -value
        } else {
            value
        }
    }

    fn manual_arm_speed(&self, raw_stick: f64) -> f64 {
        let raw = self.invert(raw_stick);
        if raw.abs() < self.controls.manual_arm_deadband {
            0.0
        } else {
            raw
        }
    }

    fn dashboard_height(&mut self, dashboard: &Dashboard) -> Option<TargetHeight> {
        let selected = dashboard.get_string(dashboard::ARM_PRESET, TargetHeight::Ground.name());
        match selected.parse() {
            Ok(height) => {
                self.last_bad_preset = None;
                Some(height)
            }
            Err(e) => {
                // Once per bad value, not once per tick.
                if self.last_bad_preset.as_deref() != Some(selected.as_str()) {
                    warn!("Ignoring dashboard preset: {e}");
                    self.last_bad_preset = Some(selected);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{LEFT_STICK_Y, RIGHT_STICK_X};
    use crate::robot_config::RobotConfig;
    use crate::scripted_input::ScriptedInput;

    fn translator(dashboard: &mut Dashboard) -> InputTranslator {
        let config = RobotConfig::default();
        InputTranslator::new(config.drive, config.controls, dashboard)
    }

    #[test]
    fn test_registers_dashboard_defaults() {
        let mut dashboard = Dashboard::new();
        translator(&mut dashboard);
        assert!(dashboard.get_bool(dashboard::OPEN_LOOP_ARM, false));
        assert!(dashboard.get_bool(dashboard::USE_CONTROLLER_MOTION_MAGIC, false));
        assert_eq!(dashboard.get_string(dashboard::ARM_PRESET, ""), "GROUND");
    }

    #[test]
    fn test_drive_speed_is_inverted_and_deadbanded() {
        let mut dashboard = Dashboard::new();
        let mut translator = translator(&mut dashboard);
        let mut input = ScriptedInput::default();

        input.set_axis(ControllerPort::Driver, LEFT_STICK_Y, -0.5);
        assert_eq!(translator.translate(&input, &dashboard).drive_speed, 0.5);

        input.set_axis(ControllerPort::Driver, LEFT_STICK_Y, 0.05);
        assert_eq!(translator.translate(&input, &dashboard).drive_speed, 0.0);

        input.set_axis(ControllerPort::Driver, LEFT_STICK_Y, 0.06);
        assert_eq!(translator.translate(&input, &dashboard).drive_speed, -0.06);
    }

    #[test]
    fn test_turn_and_quick_turn_pass_through() {
        let mut dashboard = Dashboard::new();
        let mut translator = translator(&mut dashboard);
        let mut input = ScriptedInput::default();
        input.set_axis(ControllerPort::Driver, RIGHT_STICK_X, 0.01);
        input.set_button(ControllerPort::Driver, XboxButton::LeftBumper, true);
        let intents = translator.translate(&input, &dashboard);
        assert_eq!(intents.turn_rate, 0.01);
        assert!(intents.quick_turn);
    }

    #[test]
    fn test_manual_arm_speed_has_fixed_deadband() {
        let mut dashboard = Dashboard::new();
        let mut translator = translator(&mut dashboard);
        let mut input = ScriptedInput::default();

        input.set_axis(ControllerPort::Operator, LEFT_STICK_Y, -0.19);
        assert_eq!(translator.translate(&input, &dashboard).manual_arm_speed, 0.0);

        input.set_axis(ControllerPort::Operator, LEFT_STICK_Y, -0.2);
        assert_eq!(translator.translate(&input, &dashboard).manual_arm_speed, 0.2);

        input.set_axis(ControllerPort::Operator, LEFT_STICK_Y, 0.8);
        assert_eq!(translator.translate(&input, &dashboard).manual_arm_speed, -0.8);
    }

    #[test]
    fn test_reads_dashboard_toggles_and_preset() {
        let mut dashboard = Dashboard::new();
        let mut translator = translator(&mut dashboard);
        let input = ScriptedInput::default();

        dashboard.put(dashboard::OPEN_LOOP_ARM, false);
        dashboard.put(dashboard::ARM_PRESET, "rocket high");
        let intents = translator.translate(&input, &dashboard);
        assert!(!intents.open_loop_arm);
        assert!(intents.use_controller_mm);
        assert_eq!(intents.dashboard_height, Some(TargetHeight::RocketHigh));

        dashboard.put(dashboard::ARM_PRESET, "COLLECT");
        assert_eq!(translator.translate(&input, &dashboard).dashboard_height, None);
    }
}
