use log::debug;

use crate::arm_commands::{IncrementArmPreset, SetArmFromDashboard, SetArmTargetHeight};
use crate::claw::{SpinMode, TargetMode};
use crate::claw_commands::{SetClawSpinMode, SetClawTargetMode};
use crate::climb_commands::{auto_onto_hab, ClimbingArmActivate, HabLevel, MakeHabOurHome};
use crate::command::Command;
use crate::height_presets::TargetHeight;
use crate::input::{ControllerPort, InputSource, XboxButton, XboxController};
use crate::robot::Robot;
use crate::robot_config::RobotConfig;
use crate::scheduler::{CommandFactory, CommandHandle, CommandScheduler};

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Trigger {
    /// Schedule on the press edge; the command runs to its own end.
    WhenPressed,
    /// Schedule on the press edge and cancel on release.
    WhileHeld,
}

struct Binding {
    port: ControllerPort,
    button: XboxButton,
    trigger: Trigger,
    factory: CommandFactory,
    was_pressed: bool,
    handle: Option<CommandHandle>,
}

/// Gamepad button to command bindings, polled once per tick.
pub struct OperatorInterface {
    bindings: Vec<Binding>,
    trigger_threshold: f64,
}

impl OperatorInterface {
    pub fn new(trigger_threshold: f64) -> Self {
        Self { bindings: Vec::new(), trigger_threshold }
    }

    /// The competition button layout.
    pub fn standard(config: &RobotConfig) -> Self {
        use ControllerPort::{Driver, Operator};

        let mut oi = Self::new(config.controls.trigger_threshold);
        oi.when_pressed(Operator, XboxButton::X, || Box::new(SetClawTargetMode::new(TargetMode::Cargo)));
        oi.when_pressed(Operator, XboxButton::B, || Box::new(SetClawTargetMode::new(TargetMode::Hatch)));
        oi.while_held(Operator, XboxButton::A, || Box::new(SetClawSpinMode::new(SpinMode::Intake)));
        oi.while_held(Operator, XboxButton::Y, || Box::new(SetClawSpinMode::new(SpinMode::Exhaust)));
        oi.when_pressed(Operator, XboxButton::DpadUp, || Box::new(IncrementArmPreset::new(true)));
        oi.when_pressed(Operator, XboxButton::DpadDown, || Box::new(IncrementArmPreset::new(false)));
        oi.when_pressed(Operator, XboxButton::RightBumper, || Box::new(SetArmFromDashboard::new(true)));
        oi.when_pressed(Operator, XboxButton::LeftBumper, || Box::new(SetArmTargetHeight::new(TargetHeight::Ground)));

        let climber = config.climber;
        oi.when_pressed(Driver, XboxButton::Start, move || Box::new(auto_onto_hab(HabLevel::Three, &climber)));
        oi.when_pressed(Driver, XboxButton::Select, move || Box::new(auto_onto_hab(HabLevel::Two, &climber)));
        oi.while_held(Driver, XboxButton::Y, || Box::new(ClimbingArmActivate::new(true)));
        oi.when_pressed(Driver, XboxButton::B, || Box::new(ClimbingArmActivate::new(false)));
        oi.while_held(Driver, XboxButton::X, || Box::new(MakeHabOurHome));
        oi
    }

    pub fn when_pressed(&mut self, port: ControllerPort, button: XboxButton,
                        factory: impl Fn() -> Box<dyn Command> + 'static) {
        self.bind(port, button, Trigger::WhenPressed, Box::new(factory));
    }

    pub fn while_held(&mut self, port: ControllerPort, button: XboxButton,
                      factory: impl Fn() -> Box<dyn Command> + 'static) {
        self.bind(port, button, Trigger::WhileHeld, Box::new(factory));
    }

    fn bind(&mut self, port: ControllerPort, button: XboxButton, trigger: Trigger, factory: CommandFactory) {
        self.bindings.push(Binding {
            port,
            button,
            trigger,
            factory,
            was_pressed: false,
            handle: None,
        });
    }

    /// Schedules and cancels bound commands on button edges.
    pub fn poll(&mut self, input: &dyn InputSource, scheduler: &mut CommandScheduler, robot: &mut Robot) {
        for binding in self.bindings.iter_mut() {
            let pad = XboxController::new(input, binding.port, self.trigger_threshold);
            let pressed = pad.is_pressed(binding.button);
            let was_pressed = std::mem::replace(&mut binding.was_pressed, pressed);
            match (was_pressed, pressed) {
                (false, true) => {
                    debug!("{:?} {:?} pressed", binding.port, binding.button);
                    let handle = scheduler.schedule(robot, (binding.factory)());
                    if binding.trigger == Trigger::WhileHeld {
                        binding.handle = Some(handle);
                    }
                }
                (true, false) => {
                    if let Some(handle) = binding.handle.take() {
                        debug!("{:?} {:?} released", binding.port, binding.button);
                        scheduler.cancel(robot, handle);
                    }
                }
                _ => (),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claw::ControlMode;
    use crate::command::Mechanism;
    use crate::robot::tests::mock_robot;
    use crate::scripted_input::ScriptedInput;

    struct Harness {
        robot: Robot,
        scheduler: CommandScheduler,
        oi: OperatorInterface,
        input: ScriptedInput,
    }

    impl Harness {
        fn new() -> Self {
            let (robot, _) = mock_robot();
            Self {
                robot,
                scheduler: CommandScheduler::new(),
                oi: OperatorInterface::standard(&RobotConfig::default()),
                input: ScriptedInput::default(),
            }
        }

        fn press(&mut self, port: ControllerPort, button: XboxButton, pressed: bool) {
            self.input.set_button(port, button, pressed);
            self.oi.poll(&self.input, &mut self.scheduler, &mut self.robot);
            self.scheduler.tick(&mut self.robot);
        }
    }

    #[test]
    fn test_when_pressed_fires_once_per_press() {
        let mut h = Harness::new();
        h.press(ControllerPort::Operator, XboxButton::DpadUp, true);
        h.press(ControllerPort::Operator, XboxButton::DpadUp, true);
        assert_eq!(h.robot.arm.goal_height(), TargetHeight::Low);

        h.press(ControllerPort::Operator, XboxButton::DpadUp, false);
        h.press(ControllerPort::Operator, XboxButton::DpadUp, true);
        assert_eq!(h.robot.arm.goal_height(), TargetHeight::CargoLoad);
    }

    #[test]
    fn test_target_mode_buttons() {
        let mut h = Harness::new();
        h.press(ControllerPort::Operator, XboxButton::B, true);
        assert_eq!(h.robot.claw.target_mode(), TargetMode::Hatch);
        h.press(ControllerPort::Operator, XboxButton::X, true);
        assert_eq!(h.robot.claw.target_mode(), TargetMode::Cargo);
    }

    #[test]
    fn test_while_held_cancels_on_release() {
        let mut h = Harness::new();
        h.press(ControllerPort::Operator, XboxButton::A, true);
        h.press(ControllerPort::Operator, XboxButton::A, true);
        assert_eq!(h.scheduler.holder_of(Mechanism::Claw), Some("SetClawSpinMode"));
        assert_eq!(h.robot.claw.spin_mode(), SpinMode::Intake);

        h.press(ControllerPort::Operator, XboxButton::A, false);
        assert_eq!(h.scheduler.holder_of(Mechanism::Claw), None);
        assert_eq!(h.robot.claw.control_mode(), ControlMode::Auto);
        assert_eq!(h.robot.claw.spin_mode(), SpinMode::Stop);
    }

    #[test]
    fn test_start_runs_level_three_climb() {
        let mut h = Harness::new();
        h.press(ControllerPort::Driver, XboxButton::Start, true);
        assert_eq!(h.scheduler.holder_of(Mechanism::Climber), Some("AutoOntoHab3"));
        assert_eq!(h.scheduler.holder_of(Mechanism::Drivetrain), Some("AutoOntoHab3"));
        assert!(h.robot.climber.wheels_spinning());

        // Releasing does not stop a when-pressed maneuver.
        h.press(ControllerPort::Driver, XboxButton::Start, false);
        assert_eq!(h.scheduler.holder_of(Mechanism::Climber), Some("AutoOntoHab3"));

        h.press(ControllerPort::Driver, XboxButton::X, true);
        assert_eq!(h.scheduler.holder_of(Mechanism::Climber), Some("MakeHabOurHome"));
        assert!(!h.robot.climber.wheels_spinning());
    }

    #[test]
    fn test_standard_layout_binds_every_button() {
        assert_eq!(OperatorInterface::standard(&RobotConfig::default()).len(), 13);
    }
}
