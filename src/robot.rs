use crate::arm::Arm;
use crate::claw::Claw;
use crate::climber::Climber;
use crate::drivetrain::Drivetrain;
use crate::input_translator::OperatorIntents;
use crate::robot_config::RobotConfig;
use crate::robot_hal::{HalResult, RobotHal};

/// Every mechanism plus the operator intents for the current tick. Commands
/// receive this mutably; there is no other path to the hardware.
pub struct Robot {
    pub claw: Claw,
    pub arm: Arm,
    pub climber: Climber,
    pub drivetrain: Drivetrain,
    pub intents: OperatorIntents,
}

impl Robot {
    /// `hal_factory` is called once per mechanism.
    pub fn new(config: &RobotConfig, hal_factory: impl Fn() -> Box<dyn RobotHal>) -> Self {
        Self {
            claw: Claw::new(hal_factory(), config.claw),
            arm: Arm::new(hal_factory(), config.arm.clone()),
            climber: Climber::new(hal_factory(), config.climber),
            drivetrain: Drivetrain::new(hal_factory(), config.drive),
            intents: OperatorIntents::default(),
        }
    }

    /// Zeroes every motor. All are attempted; the first failure is returned.
    pub fn disable(&mut self) -> HalResult<()> {
        let results = [
            self.claw.stop(),
            self.arm.set_open_loop_speed(0.0),
            self.climber.stop(),
            self.drivetrain.stop(),
        ];
        results.into_iter().collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::robot_hal::{EncoderId, MotorId};
    use crate::robot_hal_mock::RobotHalMock;

    pub(crate) fn mock_robot_with(config: &RobotConfig) -> (Robot, RobotHalMock) {
        let hal = RobotHalMock::new();
        let shared = hal.clone();
        let robot = Robot::new(config, move || Box::new(shared.clone()));
        hal.clear_history();
        (robot, hal)
    }

    pub(crate) fn mock_robot() -> (Robot, RobotHalMock) {
        mock_robot_with(&RobotConfig::default())
    }

    #[test]
    fn test_disable_zeroes_all_motors() {
        let (mut robot, hal) = mock_robot();
        hal.set_encoder(EncoderId::Arm, 1000.0);
        robot.climber.spin_wheels(true).unwrap();
        robot.climber.extend_legs().unwrap();
        robot.drivetrain.tank_drive(1.0, 1.0).unwrap();
        robot.arm.set_open_loop_speed(1.0).unwrap();

        robot.disable().unwrap();
        for motor in [MotorId::ClawIntake, MotorId::ArmMaster, MotorId::ClimberLegs,
                      MotorId::ClimberWheels, MotorId::DriveLeft, MotorId::DriveRight] {
            assert_eq!(hal.percent_output(motor), 0.0, "{motor:?}");
        }
    }
}
