use derive_new::new;
use log::debug;

use crate::claw::{ControlMode, SpinMode, TargetMode};
use crate::command::{Command, EndReason, Mechanism, Status};
use crate::robot::Robot;
use crate::robot_hal::HalResult;

const CLAW: &[Mechanism] = &[Mechanism::Claw];

/// Keeps the claw reconciled every tick, holding a sensed piece in AUTO.
#[derive(Debug, Default)]
pub struct ClawDefault;

impl Command for ClawDefault {
    fn name(&self) -> &'static str {
        "ClawDefault"
    }

    fn requirements(&self) -> &[Mechanism] {
        CLAW
    }

    fn tick(&mut self, robot: &mut Robot) -> HalResult<Status> {
        robot.claw.reconcile(robot.intents.quick_turn)?;
        Ok(Status::Running)
    }
}

#[derive(Debug, new)]
pub struct SetClawTargetMode {
    mode: TargetMode,
}

impl Command for SetClawTargetMode {
    fn name(&self) -> &'static str {
        "SetClawTargetMode"
    }

    fn requirements(&self) -> &[Mechanism] {
        CLAW
    }

    fn tick(&mut self, robot: &mut Robot) -> HalResult<Status> {
        robot.claw.set_target_mode(self.mode);
        Ok(Status::Done)
    }
}

/// Spins the claw for as long as the command runs, then stops it and hands
/// control back to the sensors.
#[derive(Debug, new)]
pub struct SetClawSpinMode {
    mode: SpinMode,
}

impl Command for SetClawSpinMode {
    fn name(&self) -> &'static str {
        "SetClawSpinMode"
    }

    fn requirements(&self) -> &[Mechanism] {
        CLAW
    }

    fn start(&mut self, robot: &mut Robot) -> HalResult<()> {
        debug!("Claw spin {:?}", self.mode);
        robot.claw.set_control_mode(ControlMode::Manual);
        robot.claw.set_spin_mode(self.mode);
        robot.claw.reconcile(robot.intents.quick_turn)
    }

    fn tick(&mut self, _robot: &mut Robot) -> HalResult<Status> {
        Ok(Status::Running)
    }

    fn cleanup(&mut self, robot: &mut Robot, _reason: EndReason) -> HalResult<()> {
        robot.claw.stop()?;
        robot.claw.set_control_mode(ControlMode::Auto);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandRunner, Lifecycle};
    use crate::robot::tests::mock_robot;
    use crate::robot_hal::{MotorId, PresenceSensor, SolenoidId};

    #[test]
    fn test_default_holds_sensed_cargo() {
        let (mut robot, hal) = mock_robot();
        let mut runner = CommandRunner::new(Box::new(ClawDefault));
        runner.tick(&mut robot).unwrap();
        assert_eq!(robot.claw.spin_mode(), SpinMode::Stop);

        hal.set_presence(PresenceSensor::CargoLeft, true);
        hal.set_presence(PresenceSensor::CargoRight, true);
        runner.tick(&mut robot).unwrap();
        assert_eq!(robot.claw.spin_mode(), SpinMode::Hold);
        assert_eq!(hal.percent_output(MotorId::ClawIntake), -0.1);
    }

    #[test]
    fn test_default_uses_quick_turn_for_hatch_hold() {
        let (mut robot, hal) = mock_robot();
        robot.claw.set_target_mode(TargetMode::Hatch);
        hal.set_presence(PresenceSensor::HatchLeft, true);
        hal.set_presence(PresenceSensor::HatchRight, true);
        robot.intents.quick_turn = true;
        let mut runner = CommandRunner::new(Box::new(ClawDefault));
        runner.tick(&mut robot).unwrap();
        assert_eq!(hal.percent_output(MotorId::ClawIntake), 0.25);
        assert_eq!(hal.binary_writes(SolenoidId::ClawPincer), vec![true]);
    }

    #[test]
    fn test_target_mode_is_instant() {
        let (mut robot, _) = mock_robot();
        let mut runner = CommandRunner::new(Box::new(SetClawTargetMode::new(TargetMode::Hatch)));
        assert_eq!(runner.tick(&mut robot), Ok(Lifecycle::Done));
        assert_eq!(robot.claw.target_mode(), TargetMode::Hatch);
    }

    #[test]
    fn test_spin_mode_runs_until_released() {
        let (mut robot, hal) = mock_robot();
        // A sensed cargo must not turn an intake request into a hold.
        hal.set_presence(PresenceSensor::CargoLeft, true);
        hal.set_presence(PresenceSensor::CargoRight, true);
        let mut runner = CommandRunner::new(Box::new(SetClawSpinMode::new(SpinMode::Intake)));
        runner.tick(&mut robot).unwrap();
        runner.tick(&mut robot).unwrap();
        assert_eq!(robot.claw.control_mode(), ControlMode::Manual);
        assert_eq!(hal.percent_output(MotorId::ClawIntake), -0.4);

        runner.cancel(&mut robot).unwrap();
        assert_eq!(robot.claw.control_mode(), ControlMode::Auto);
        assert_eq!(robot.claw.spin_mode(), SpinMode::Stop);
        assert_eq!(hal.percent_output(MotorId::ClawIntake), 0.0);
    }
}
