use crate::command::{Command, Mechanism, Status};
use crate::robot::Robot;
use crate::robot_hal::HalResult;

/// Curvature drive from the driver sticks. Never finishes.
#[derive(Debug, Default)]
pub struct DrivetrainTeleop;

impl Command for DrivetrainTeleop {
    fn name(&self) -> &'static str {
        "DrivetrainTeleop"
    }

    fn requirements(&self) -> &[Mechanism] {
        &[Mechanism::Drivetrain]
    }

    fn tick(&mut self, robot: &mut Robot) -> HalResult<Status> {
        let intents = &robot.intents;
        robot.drivetrain.curvature_drive(intents.drive_speed, intents.turn_rate, intents.quick_turn)?;
        Ok(Status::Running)
    }
}
