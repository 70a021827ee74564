use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::robot_config::ClawConfig;
use crate::robot_hal::{HalResult, MotorId, PresenceSensor, RobotHal, SolenoidId};

/// Which game piece the claw is configured for. Hatch closes the pincer,
/// cargo opens it.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetMode {
    Hatch,
    Cargo,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpinMode {
    Intake,
    Exhaust,
    Stop,
    Hold,
}

/// In `Auto` the presence sensors decide between hold and stop on every
/// reconcile; in `Manual` the spin mode is left as set.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMode {
    Auto,
    Manual,
}

/// Intake wheels and pincer piston.
pub struct Claw {
    hal: Box<dyn RobotHal>,
    config: ClawConfig,
    target_mode: TargetMode,
    spin_mode: SpinMode,
    control_mode: ControlMode,
    quick_hold: bool,
    intake_output: f64,
    pincer_command: Option<bool>,
}

impl Claw {
    pub fn new(hal: Box<dyn RobotHal>, config: ClawConfig) -> Self {
        let mut claw = Self {
            hal,
            config,
            target_mode: TargetMode::Cargo,
            spin_mode: SpinMode::Stop,
            control_mode: ControlMode::Auto,
            quick_hold: false,
            intake_output: 0.0,
            pincer_command: None,
        };
        if let Err(e) = claw.reconcile(false) {
            warn!("Claw failed to reach its initial state: {e}");
        }
        claw
    }

    pub fn set_target_mode(&mut self, mode: TargetMode) {
        if self.target_mode != mode {
            debug!("Claw target mode: {:?} -> {mode:?}", self.target_mode);
        }
        self.target_mode = mode;
    }

    pub fn set_spin_mode(&mut self, mode: SpinMode) {
        self.spin_mode = mode;
    }

    pub fn set_control_mode(&mut self, mode: ControlMode) {
        if self.control_mode != mode {
            debug!("Claw control mode: {:?} -> {mode:?}", self.control_mode);
        }
        self.control_mode = mode;
    }

    /// Brings the intake and pincer in line with the current modes. Call once
    /// per tick after any mode change. `quick_hold` selects the firmer hatch
    /// hold speed.
    pub fn reconcile(&mut self, quick_hold: bool) -> HalResult<()> {
        self.quick_hold = quick_hold;
        if self.control_mode == ControlMode::Auto {
            self.spin_mode = if self.piece_present(self.target_mode) {
                SpinMode::Hold
            } else {
                SpinMode::Stop
            };
        }

        // Both actuators are attempted; the first failure is returned.
        let speed = self.speed_for(self.target_mode, self.spin_mode, quick_hold);
        let intake = self.hal.set_percent_output(MotorId::ClawIntake, speed);
        if intake.is_ok() {
            self.intake_output = speed;
        }
        intake.and(self.update_pincer())
    }

    fn update_pincer(&mut self) -> HalResult<()> {
        let closed = self.target_mode == TargetMode::Hatch;
        if self.pincer_command.replace(closed) != Some(closed) {
            if let Err(e) = self.hal.set_binary(SolenoidId::ClawPincer, closed) {
                self.pincer_command = None;
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn stop(&mut self) -> HalResult<()> {
        self.set_spin_mode(SpinMode::Stop);
        self.reconcile(self.quick_hold)
    }

    /// Intake speed for a mode pair. Stop is always zero.
    pub fn speed_for(&self, target: TargetMode, spin: SpinMode, quick_hold: bool) -> f64 {
        let c = &self.config;
        match (target, spin) {
            (_, SpinMode::Stop) => 0.0,
            (TargetMode::Cargo, SpinMode::Intake) => c.cargo_intake_speed,
            (TargetMode::Cargo, SpinMode::Exhaust) => c.cargo_exhaust_speed,
            (TargetMode::Cargo, SpinMode::Hold) => c.cargo_hold_speed,
            (TargetMode::Hatch, SpinMode::Intake) => c.hatch_intake_speed,
            (TargetMode::Hatch, SpinMode::Exhaust) => c.hatch_exhaust_speed,
            (TargetMode::Hatch, SpinMode::Hold) if quick_hold => c.hatch_quick_hold_speed,
            (TargetMode::Hatch, SpinMode::Hold) => c.hatch_hold_speed,
        }
    }

    pub fn target_mode(&self) -> TargetMode {
        self.target_mode
    }

    pub fn spin_mode(&self) -> SpinMode {
        self.spin_mode
    }

    pub fn control_mode(&self) -> ControlMode {
        self.control_mode
    }

    pub fn intake_output(&self) -> f64 {
        self.intake_output
    }

    pub fn pincer_closed(&self) -> bool {
        self.pincer_command.unwrap_or(false)
    }

    /// A missing or failing sensor reads as "not present".
    pub fn sensor(&self, sensor: PresenceSensor) -> bool {
        match self.hal.presence(sensor) {
            Ok(present) => present,
            Err(e) => {
                debug!("Reading {sensor:?} failed, assuming empty: {e}");
                false
            }
        }
    }

    pub fn hatch_present(&self) -> bool {
        self.sensor(PresenceSensor::HatchLeft) && self.sensor(PresenceSensor::HatchRight)
    }

    pub fn cargo_present(&self) -> bool {
        self.sensor(PresenceSensor::CargoLeft) && self.sensor(PresenceSensor::CargoRight)
    }

    pub fn holds_piece(&self) -> bool {
        self.hatch_present() || self.cargo_present()
    }

    fn piece_present(&self, target: TargetMode) -> bool {
        match target {
            TargetMode::Hatch => self.hatch_present(),
            TargetMode::Cargo => self.cargo_present(),
        }
    }
}
