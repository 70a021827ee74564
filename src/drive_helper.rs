use serde::Serialize;

use crate::robot_config::DriveConfig;

/// Left/right drive outputs, forward positive, each within [-1, 1].
#[derive(Debug, PartialEq, Copy, Clone, Default, Serialize)]
pub struct WheelSpeeds {
    pub left: f64,
    pub right: f64,
}

impl WheelSpeeds {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

fn limit(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}

fn square_keep_sign(value: f64) -> f64 {
    (value * value).copysign(value)
}

/// Differential drive mixing. Only curvature drive carries state between
/// calls: the quick-stop accumulator that cancels residual rotation after a
/// quick turn is released.
#[derive(Debug, Clone)]
pub struct DriveHelper {
    config: DriveConfig,
    quick_stop_accumulator: f64,
}

impl DriveHelper {
    pub fn new(config: DriveConfig) -> Self {
        Self { config, quick_stop_accumulator: 0.0 }
    }

    /// `x_speed` forward, `z_rotation` clockwise. Squaring softens small inputs.
    pub fn arcade(&self, x_speed: f64, z_rotation: f64, square_inputs: bool) -> WheelSpeeds {
        let mut x = limit(x_speed);
        let mut z = limit(z_rotation);
        if square_inputs {
            x = square_keep_sign(x);
            z = square_keep_sign(z);
        }

        let max_input = x.abs().max(z.abs()).copysign(x);
        let (left, right) = match (x >= 0.0, z >= 0.0) {
            (true, true) => (max_input, x - z),
            (true, false) => (x + z, max_input),
            (false, true) => (x + z, max_input),
            (false, false) => (max_input, x - z),
        };
        WheelSpeeds::new(limit(left), limit(right))
    }

    /// `z_rotation` sets path curvature, except during a quick turn where it
    /// becomes a turn-in-place rate.
    pub fn curvature(&mut self, x_speed: f64, z_rotation: f64, quick_turn: bool) -> WheelSpeeds {
        let x = limit(x_speed);
        let z = limit(z_rotation);

        let angular_power;
        let over_power;
        if quick_turn {
            if x.abs() < self.config.quick_stop_deadband {
                let alpha = self.config.quick_stop_weight;
                self.quick_stop_accumulator =
                    (1.0 - alpha) * self.quick_stop_accumulator + alpha * z * self.config.quick_stop_scalar;
            }
            over_power = true;
            angular_power = z;
        } else {
            over_power = false;
            angular_power = x.abs() * z - self.quick_stop_accumulator;
            self.quick_stop_accumulator = if self.quick_stop_accumulator > 1.0 {
                self.quick_stop_accumulator - 1.0
            } else if self.quick_stop_accumulator < -1.0 {
                self.quick_stop_accumulator + 1.0
            } else {
                0.0
            };
        }

        let mut left = x + angular_power;
        let mut right = x - angular_power;

        // Spill excess from a saturated side onto the other side.
        if over_power {
            if left > 1.0 {
                right -= left - 1.0;
                left = 1.0;
            } else if right > 1.0 {
                left -= right - 1.0;
                right = 1.0;
            } else if left < -1.0 {
                right -= left + 1.0;
                left = -1.0;
            } else if right < -1.0 {
                left -= right + 1.0;
                right = -1.0;
            }
        }

        let max_magnitude = left.abs().max(right.abs());
        if max_magnitude > 1.0 {
            left /= max_magnitude;
            right /= max_magnitude;
        }
        WheelSpeeds::new(left, right)
    }

    pub fn tank(&self, left: f64, right: f64, square_inputs: bool) -> WheelSpeeds {
        let (mut left, mut right) = (limit(left), limit(right));
        if square_inputs {
            left = square_keep_sign(left);
            right = square_keep_sign(right);
        }
        WheelSpeeds::new(left, right)
    }

    pub fn quick_stop_accumulator(&self) -> f64 {
        self.quick_stop_accumulator
    }
}
