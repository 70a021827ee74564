use derive_new::new;
use log::{info, warn};

use crate::command::{Command, Mechanism, Status};
use crate::height_presets::TargetHeight;
use crate::robot::Robot;
use crate::robot_hal::HalResult;

const ARM: &[Mechanism] = &[Mechanism::Arm];

/// Manual arm control. Open-loop follows the stick directly; closed-loop nudges
/// the goal with the stick and keeps the motor controller on the goal.
#[derive(Debug, Default)]
pub struct ArmDefault;

impl Command for ArmDefault {
    fn name(&self) -> &'static str {
        "ArmDefault"
    }

    fn requirements(&self) -> &[Mechanism] {
        ARM
    }

    fn tick(&mut self, robot: &mut Robot) -> HalResult<Status> {
        let intents = &robot.intents;
        let arm = &mut robot.arm;
        if intents.open_loop_arm {
            arm.set_open_loop_speed(intents.manual_arm_speed)?;
        } else {
            if intents.use_controller_mm {
                let nudged = arm.goal_position() + arm.manual_nudge_scale() * intents.manual_arm_speed;
                arm.set_profiled_position(nudged);
            }
            arm.apply_profiled_position()?;
        }
        Ok(Status::Running)
    }
}

#[derive(Debug, new)]
pub struct SetArmTargetHeight {
    height: TargetHeight,
}

impl Command for SetArmTargetHeight {
    fn name(&self) -> &'static str {
        "SetArmTargetHeight"
    }

    fn requirements(&self) -> &[Mechanism] {
        ARM
    }

    fn tick(&mut self, robot: &mut Robot) -> HalResult<Status> {
        let holding = robot.claw.holds_piece();
        robot.arm.set_preset_height(self.height, holding);
        Ok(Status::Done)
    }
}

/// Applies the dashboard preset selector when `from_chooser`, otherwise
/// re-applies the arm's own goal height.
#[derive(Debug, new)]
pub struct SetArmFromDashboard {
    from_chooser: bool,
}

impl Command for SetArmFromDashboard {
    fn name(&self) -> &'static str {
        "SetArmFromDashboard"
    }

    fn requirements(&self) -> &[Mechanism] {
        ARM
    }

    fn tick(&mut self, robot: &mut Robot) -> HalResult<Status> {
        let height = if self.from_chooser {
            match robot.intents.dashboard_height {
                Some(height) => height,
                None => {
                    warn!("No valid preset selected on the dashboard, keeping {}", robot.arm.goal_height());
                    return Ok(Status::Done);
                }
            }
        } else {
            robot.arm.goal_height()
        };
        info!("Arm to {height} from dashboard");
        let holding = robot.claw.holds_piece();
        robot.arm.set_preset_height(height, holding);
        Ok(Status::Done)
    }
}

/// Steps to the next or previous preset and moves there. While the claw
/// holds a piece Ground is stepped over, since it would resolve back to Low.
#[derive(Debug, new)]
pub struct IncrementArmPreset {
    forward: bool,
}

impl Command for IncrementArmPreset {
    fn name(&self) -> &'static str {
        "IncrementArmPreset"
    }

    fn requirements(&self) -> &[Mechanism] {
        ARM
    }

    fn tick(&mut self, robot: &mut Robot) -> HalResult<Status> {
        let holding = robot.claw.holds_piece();
        robot.arm.increment_preset(self.forward);
        if holding && robot.arm.goal_height() == TargetHeight::Ground {
            robot.arm.increment_preset(self.forward);
        }
        robot.arm.set_preset_height(robot.arm.goal_height(), holding);
        Ok(Status::Done)
    }
}
