use log::trace;

use crate::drive_helper::{DriveHelper, WheelSpeeds};
use crate::robot_config::DriveConfig;
use crate::robot_hal::{HalResult, MotorId, RobotHal};

/// Two-sided chassis. Followers are slaved in the motor controllers, so one
/// output per side is enough.
pub struct Drivetrain {
    hal: Box<dyn RobotHal>,
    helper: DriveHelper,
    output: WheelSpeeds,
}

impl Drivetrain {
    pub fn new(hal: Box<dyn RobotHal>, config: DriveConfig) -> Self {
        Self {
            hal,
            helper: DriveHelper::new(config),
            output: WheelSpeeds::default(),
        }
    }

    /// Arcade drive with squared inputs.
    pub fn arcade_drive(&mut self, x_speed: f64, z_rotation: f64) -> HalResult<()> {
        let speeds = self.helper.arcade(x_speed, z_rotation, true);
        self.set_output(speeds)
    }

    pub fn curvature_drive(&mut self, x_speed: f64, z_rotation: f64, quick_turn: bool) -> HalResult<()> {
        let speeds = self.helper.curvature(x_speed, z_rotation, quick_turn);
        self.set_output(speeds)
    }

    /// Tank drive with squared inputs.
    pub fn tank_drive(&mut self, left: f64, right: f64) -> HalResult<()> {
        let speeds = self.helper.tank(left, right, true);
        self.set_output(speeds)
    }

    pub fn stop(&mut self) -> HalResult<()> {
        self.set_output(WheelSpeeds::default())
    }

    fn set_output(&mut self, speeds: WheelSpeeds) -> HalResult<()> {
        trace!("drive output: {speeds:?}");
        self.hal.set_percent_output(MotorId::DriveLeft, speeds.left)?;
        self.hal.set_percent_output(MotorId::DriveRight, speeds.right)?;
        self.output = speeds;
        Ok(())
    }

    pub fn output(&self) -> WheelSpeeds {
        self.output
    }
}
