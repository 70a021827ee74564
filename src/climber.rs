use log::debug;

use crate::robot_config::ClimberConfig;
use crate::robot_hal::{EncoderId, HalResult, MotorId, RobotHal, SolenoidId};

/// Hab climbing mechanism: telescoping rear legs, front climbing arms on a
/// piston, and the wheels on the end of those arms.
pub struct Climber {
    hal: Box<dyn RobotHal>,
    config: ClimberConfig,
    arms_command: Option<bool>,
    wheels_spinning: bool,
}

impl Climber {
    pub fn new(hal: Box<dyn RobotHal>, config: ClimberConfig) -> Self {
        Self {
            hal,
            config,
            arms_command: None,
            wheels_spinning: false,
        }
    }

    pub fn spin_wheels(&mut self, on: bool) -> HalResult<()> {
        let speed = if on { self.config.wheel_speed } else { 0.0 };
        self.hal.set_percent_output(MotorId::ClimberWheels, speed)?;
        self.wheels_spinning = on;
        Ok(())
    }

    pub fn extend_legs(&mut self) -> HalResult<()> {
        self.hal.set_percent_output(MotorId::ClimberLegs, self.config.leg_speed)
    }

    pub fn retract_legs(&mut self) -> HalResult<()> {
        self.hal.set_percent_output(MotorId::ClimberLegs, self.config.leg_retract_speed)
    }

    /// Wheels and legs unpowered. The arm piston keeps its position.
    pub fn stop(&mut self) -> HalResult<()> {
        self.spin_wheels(false)?;
        self.hal.set_percent_output(MotorId::ClimberLegs, 0.0)
    }

    pub fn extend_arms(&mut self) -> HalResult<()> {
        self.set_arms(true)
    }

    pub fn retract_arms(&mut self) -> HalResult<()> {
        self.set_arms(false)
    }

    fn set_arms(&mut self, extended: bool) -> HalResult<()> {
        if self.arms_command.replace(extended) != Some(extended) {
            debug!("Climbing arms {}", if extended { "extending" } else { "retracting" });
            if let Err(e) = self.hal.set_binary(SolenoidId::ClimberArms, extended) {
                self.arms_command = None;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Zero when the leg encoder cannot be read, so a climb waiting on height
    /// never finishes on a bad reading.
    pub fn leg_height(&self) -> f64 {
        match self.hal.encoder_position(EncoderId::ClimberLegs) {
            Ok(height) => height,
            Err(e) => {
                debug!("Leg height unavailable: {e}");
                0.0
            }
        }
    }

    pub fn arms_extended(&self) -> bool {
        self.arms_command.unwrap_or(false)
    }

    pub fn wheels_spinning(&self) -> bool {
        self.wheels_spinning
    }

    pub fn config(&self) -> &ClimberConfig {
        &self.config
    }
}
