use log::{debug, info, warn};

use crate::height_presets::{HeightPresetRegistry, TargetHeight};
use crate::robot_config::ArmConfig;
use crate::robot_hal::{EncoderId, HalResult, MotorId, RobotHal};

/// Elevating arm driven by a single position-sensing motor controller.
///
/// The goal is held separately from what the motor is doing: setters record
/// intent, `apply_profiled_position` sends it. The goal never leaves
/// `[min_position, max_position]`.
pub struct Arm {
    hal: Box<dyn RobotHal>,
    config: ArmConfig,
    presets: HeightPresetRegistry,
    goal_position: f64,
    goal_height: TargetHeight,
    sensor_present: bool,
}

impl Arm {
    pub fn new(mut hal: Box<dyn RobotHal>, config: ArmConfig) -> Self {
        let sensor_present = match hal.pulse_width_rise_to_rise_us(EncoderId::Arm) {
            Ok(period) => period != 0.0,
            Err(_) => false,
        };
        if sensor_present {
            match hal.pulse_width_position(EncoderId::Arm) {
                Ok(absolute) => {
                    let zeroed = absolute - config.base_pulse_width;
                    if let Err(e) = hal.set_encoder_position(EncoderId::Arm, zeroed) {
                        warn!("Could not zero arm encoder: {e}");
                    } else {
                        info!("Arm encoder zeroed at {zeroed}");
                    }
                }
                Err(e) => warn!("Could not read absolute arm position: {e}"),
            }
        } else {
            warn!("Could not detect arm encoder, closed-loop control will not track");
        }

        Self {
            presets: HeightPresetRegistry::new(&config.presets),
            hal,
            config,
            goal_position: 0.0,
            goal_height: TargetHeight::Ground,
            sensor_present,
        }
    }

    /// Drives the arm directly. Positive is up. Output is cut at the travel
    /// limits and slowed on the way down. Without a position reading the
    /// limits are not enforced.
    pub fn set_open_loop_speed(&mut self, raw_speed: f64) -> HalResult<()> {
        let up = raw_speed > 0.0;
        let mut speed = raw_speed.abs().min(1.0);
        match self.position() {
            Some(position) if up && position >= self.config.max_position => speed = 0.0,
            Some(position) if !up && position <= self.config.min_position => speed = 0.0,
            _ => (),
        }
        if !up {
            speed /= self.config.descent_divisor;
        }
        let output = if up || speed == 0.0 { speed } else { -speed };
        self.hal.set_percent_output(MotorId::ArmMaster, output)
    }

    /// Selects a named preset. Ground is swapped for Low while the claw holds
    /// a piece so the piece is not driven into the floor.
    pub fn set_preset_height(&mut self, preset: TargetHeight, claw_holds_piece: bool) {
        let resolved = if preset == TargetHeight::Ground && claw_holds_piece {
            debug!("Holding a game piece, raising {preset} request to {}", TargetHeight::Low);
            TargetHeight::Low
        } else {
            preset
        };
        self.goal_height = resolved;
        self.set_profiled_position(self.presets.position(resolved));
    }

    pub fn set_profiled_position(&mut self, position: f64) {
        self.goal_position = self.ensure_position_in_range(position);
    }

    /// Sends the goal to the motor controller, with the up profile when the
    /// arm is below the goal and the down profile otherwise.
    pub fn apply_profiled_position(&mut self) -> HalResult<()> {
        self.goal_position = self.ensure_position_in_range(self.goal_position);
        let profile = match self.position() {
            Some(position) if position < self.goal_position => self.config.up_profile,
            _ => self.config.down_profile,
        };
        self.hal.set_profiled_position(MotorId::ArmMaster, self.goal_position, profile)
    }

    pub fn increment_preset(&mut self, forward: bool) {
        self.goal_height = if forward {
            self.goal_height.next()
        } else {
            self.goal_height.previous()
        };
        debug!("Arm preset now {}", self.goal_height);
    }

    pub fn ensure_position_in_range(&self, position: f64) -> f64 {
        position.max(self.config.min_position).min(self.config.max_position)
    }

    pub fn goal_position(&self) -> f64 {
        self.goal_position
    }

    pub fn goal_height(&self) -> TargetHeight {
        self.goal_height
    }

    pub fn sensor_present(&self) -> bool {
        self.sensor_present
    }

    pub fn presets(&self) -> &HeightPresetRegistry {
        &self.presets
    }

    pub fn manual_nudge_scale(&self) -> f64 {
        self.config.manual_nudge_scale
    }

    /// Sensed position, or `None` when the encoder is missing or cannot be
    /// read.
    pub fn position(&self) -> Option<f64> {
        if !self.sensor_present {
            return None;
        }
        match self.hal.encoder_position(EncoderId::Arm) {
            Ok(position) => Some(position),
            Err(e) => {
                debug!("Arm position unavailable: {e}");
                None
            }
        }
    }
}
