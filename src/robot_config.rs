use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::height_presets::{default_preset_positions, TargetHeight};
use crate::robot_hal::MotionProfile;

/// Every tunable the robot uses. Any subset can be overridden from a JSON
/// file; omitted fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub loop_period_ms: u64,
    pub drive: DriveConfig,
    pub claw: ClawConfig,
    pub arm: ArmConfig,
    pub climber: ClimberConfig,
    pub controls: ControlsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub deadband: f64,
    pub quick_stop_deadband: f64,
    pub quick_stop_weight: f64,
    pub quick_stop_scalar: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClawConfig {
    pub cargo_intake_speed: f64,
    pub cargo_exhaust_speed: f64,
    pub cargo_hold_speed: f64,
    pub hatch_intake_speed: f64,
    pub hatch_exhaust_speed: f64,
    pub hatch_hold_speed: f64,
    pub hatch_quick_hold_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmConfig {
    pub min_position: f64,
    pub max_position: f64,
    pub up_profile: MotionProfile,
    pub down_profile: MotionProfile,
    /// Downward open-loop output is divided by this.
    pub descent_divisor: f64,
    /// Goal change per tick at full manual stick in closed-loop mode.
    pub manual_nudge_scale: f64,
    pub base_pulse_width: f64,
    pub presets: BTreeMap<TargetHeight, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimberConfig {
    pub leg_speed: f64,
    pub leg_retract_speed: f64,
    pub wheel_speed: f64,
    pub hab2_leg_height: f64,
    pub hab3_leg_height: f64,
    pub hab_drive_speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub invert_move_speed: bool,
    pub manual_arm_deadband: f64,
    pub trigger_threshold: f64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            loop_period_ms: 20,
            drive: Default::default(),
            claw: Default::default(),
            arm: Default::default(),
            climber: Default::default(),
            controls: Default::default(),
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            deadband: 0.05,
            quick_stop_deadband: 0.2,
            quick_stop_weight: 0.1,
            quick_stop_scalar: 5.0,
        }
    }
}

impl Default for ClawConfig {
    fn default() -> Self {
        Self {
            cargo_intake_speed: -0.4,
            cargo_exhaust_speed: 0.4,
            cargo_hold_speed: -0.1,
            hatch_intake_speed: 0.3,
            hatch_exhaust_speed: -0.3,
            hatch_hold_speed: 0.1,
            hatch_quick_hold_speed: 0.25,
        }
    }
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            min_position: 0.0,
            max_position: 3000.0,
            up_profile: MotionProfile { cruise_velocity: 400.0, acceleration: 800.0 },
            down_profile: MotionProfile { cruise_velocity: 200.0, acceleration: 300.0 },
            descent_divisor: 3.0,
            manual_nudge_scale: 3.0,
            base_pulse_width: 0.0,
            presets: default_preset_positions(),
        }
    }
}

impl Default for ClimberConfig {
    fn default() -> Self {
        Self {
            leg_speed: 0.5,
            // Legs are left unpowered on retract and settle under the robot's weight.
            leg_retract_speed: 0.0,
            wheel_speed: 0.7,
            hab2_leg_height: 10.0,
            hab3_leg_height: 20.0,
            hab_drive_speed: 0.6,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            invert_move_speed: true,
            manual_arm_deadband: 0.2,
            trigger_threshold: 0.7,
        }
    }
}

impl RobotConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Never shorter than 1 ms.
    pub fn loop_period(&self) -> Duration {
        Duration::from_millis(self.loop_period_ms.max(1))
    }
}
